pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod locator;
pub mod patcher;
pub mod process;
pub mod project;
pub mod resolver;
pub mod ui;

pub use error::{ChangeRevisionError, Result};
