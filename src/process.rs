//! Running an external program and capturing its standard output within a
//! bounded wait.
//!
//! Standard output is read line by line on a worker thread and handed back
//! over a channel. The caller stops waiting when the stream closes and the
//! process exits, or when the deadline passes, whichever comes first. A child
//! that outlives the deadline is left running; whatever it printed so far is
//! returned.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{ChangeRevisionError, Result};

/// Default bounded wait for a single invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured standard output of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Captured lines, each terminated by `\n`
    pub text: String,
    /// The deadline passed before the stream closed or the process exited
    pub timed_out: bool,
    /// Exit status, if the process exited within the deadline
    pub status: Option<ExitStatus>,
}

/// Launches a program without a shell and captures its standard output.
pub struct ProcessRunner {
    program: PathBuf,
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        ProcessRunner {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the program with `args` in `working_dir`.
    ///
    /// A timeout is not an error: the partial (possibly empty) output is
    /// returned with `timed_out` set.
    ///
    /// # Returns
    /// * `Ok(ProcessOutput)` - Captured output
    /// * `Err(ProcessStart)` - If the program could not be launched
    pub fn run(&self, args: &[&str], working_dir: &Path) -> Result<ProcessOutput> {
        debug!(
            program = %self.program.display(),
            ?args,
            dir = %working_dir.display(),
            "spawning"
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ChangeRevisionError::ProcessStart {
                program: self.program.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        let mut output = ProcessOutput::default();

        if let Some(stdout) = child.stdout.take() {
            let (sender, receiver) = mpsc::channel::<String>();

            thread::spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    match line {
                        Ok(line) => {
                            if sender.send(line).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            });

            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(remaining) {
                    Ok(line) => {
                        output.text.push_str(&line);
                        output.text.push('\n');
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        output.timed_out = true;
                        break;
                    }
                }
            }
        }

        if !output.timed_out {
            loop {
                match child.try_wait()? {
                    Some(status) => {
                        output.status = Some(status);
                        break;
                    }
                    None if Instant::now() >= deadline => {
                        output.timed_out = true;
                        break;
                    }
                    None => thread::sleep(EXIT_POLL_INTERVAL),
                }
            }
        }

        if output.timed_out {
            warn!(
                program = %self.program.display(),
                ?args,
                timeout = ?self.timeout,
                captured = output.text.len(),
                "process did not finish in time, using partial output"
            );
        } else {
            debug!(
                status = ?output.status,
                captured = output.text.len(),
                "process finished"
            );
        }

        Ok(output)
    }
}
