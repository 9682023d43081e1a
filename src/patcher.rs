//! In-place rewriting of version values.
//!
//! A [Substitution] matches a version-bearing construct and replaces only its
//! value; every other byte of the file is kept. Files are read whole, all
//! rules are applied in memory, and the result is written back in one go.

use regex::{Captures, Regex};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::{ChangeRevisionError, Result};

/// Comment syntax of the file a rule runs on. Text inside comments is never
/// read or rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSyntax {
    /// `<!-- ... -->`
    Xml,
    /// `// ...` and `/* ... */`, outside string literals
    CSharp,
}

/// A run of text that is either code or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Code(&'a str),
    Comment(&'a str),
}

impl CommentSyntax {
    fn scanner(self) -> &'static Regex {
        static XML: OnceLock<Regex> = OnceLock::new();
        static CSHARP: OnceLock<Regex> = OnceLock::new();
        match self {
            CommentSyntax::Xml => {
                XML.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
            }
            // string literals are matched so a `//` inside one is not taken
            // for a comment; they are kept as code
            CommentSyntax::CSharp => CSHARP.get_or_init(|| {
                Regex::new(r#"(?s)"(?:[^"\\\r\n]|\\.)*"|//[^\r\n]*|/\*.*?\*/"#)
                    .expect("valid regex")
            }),
        }
    }

    fn comment_ranges(self, text: &str) -> Vec<Range<usize>> {
        self.scanner()
            .find_iter(text)
            .filter(|m| !m.as_str().starts_with('"'))
            .map(|m| m.range())
            .collect()
    }

    /// Split `text` into code and comment segments, in order.
    pub fn segments(self, text: &str) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut pos = 0;
        for range in self.comment_ranges(text) {
            if range.start > pos {
                segments.push(Segment::Code(&text[pos..range.start]));
            }
            segments.push(Segment::Comment(&text[range.clone()]));
            pos = range.end;
        }
        if pos < text.len() {
            segments.push(Segment::Code(&text[pos..]));
        }
        segments
    }
}

/// One pattern/replacement rule.
///
/// The pattern has exactly two capture groups, the text before and after the
/// value; whatever lies between them is replaced. Matches are only looked for
/// in code segments, so a pattern never spans a comment.
#[derive(Debug, Clone)]
pub struct Substitution {
    label: String,
    pattern: Regex,
    value: String,
    syntax: CommentSyntax,
}

impl Substitution {
    /// Build a rule from a raw pattern with `prefix` and `suffix` groups.
    pub fn new(
        label: impl Into<String>,
        pattern: &str,
        value: impl Into<String>,
        syntax: CommentSyntax,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ChangeRevisionError::config(format!("invalid pattern: {}", e)))?;
        if pattern.captures_len() != 3 {
            return Err(ChangeRevisionError::config(format!(
                "pattern '{}' must have exactly two capture groups",
                pattern.as_str()
            )));
        }

        Ok(Substitution {
            label: label.into(),
            pattern,
            value: value.into(),
            syntax,
        })
    }

    /// Replace the text content of every uncommented `<name>` element.
    pub fn element(name: &str, value: impl Into<String>) -> Result<Self> {
        let name = regex::escape(name);
        Self::new(
            format!("<{}>", name),
            &format!(r"(<{0}(?:\s[^>]*)?>)[^<]*(</{0}\s*>)", name),
            value,
            CommentSyntax::Xml,
        )
    }

    /// Replace the string argument of every `[assembly: <name>("...")]`
    /// declaration, with or without the `Attribute` suffix.
    ///
    /// The name may be namespace-qualified (`System.Reflection.<name>`) and may
    /// follow other attributes in the same list. Commented-out declarations
    /// are left alone.
    pub fn attribute(name: &str, value: impl Into<String>) -> Result<Self> {
        let name = regex::escape(name);
        Self::new(
            format!("{}(...)", name),
            &format!(
                r#"(\[\s*assembly\s*:(?:(?:[^\]"]|"[^"\r\n]*")*?,)?\s*(?:global::)?(?:[A-Za-z_]\w*\s*\.\s*)*{}(?:Attribute)?\s*\(\s*")[^"\r\n]*("\s*\))"#,
                name
            ),
            value,
            CommentSyntax::CSharp,
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Apply the rule to `text`, returning the new text and the number of
    /// replacements made.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut count = 0;
        for segment in self.syntax.segments(text) {
            match segment {
                Segment::Comment(comment) => out.push_str(comment),
                Segment::Code(code) => {
                    let replaced = self.pattern.replace_all(code, |caps: &Captures| {
                        count += 1;
                        format!("{}{}{}", &caps[1], self.value, &caps[2])
                    });
                    out.push_str(&replaced);
                }
            }
        }
        (out, count)
    }

    /// The current value at the first uncommented match, trimmed.
    pub fn current_value(&self, text: &str) -> Option<String> {
        self.syntax
            .segments(text)
            .into_iter()
            .find_map(|segment| match segment {
                Segment::Code(code) => {
                    let caps = self.pattern.captures(code)?;
                    let start = caps.get(1)?.end();
                    let end = caps.get(2)?.start();
                    Some(code[start..end].trim().to_string())
                }
                Segment::Comment(_) => None,
            })
    }

    /// Whether the rule matches anywhere outside comments.
    pub fn matches(&self, text: &str) -> bool {
        self.current_value(text).is_some()
    }
}

/// Result of patching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub path: PathBuf,
    pub replacements: usize,
    pub written: bool,
}

/// Apply every rule to `text` in order.
pub fn render(text: &str, rules: &[Substitution]) -> (String, usize) {
    let mut current = text.to_string();
    let mut total = 0;
    for rule in rules {
        let (next, count) = rule.apply(&current);
        debug!(rule = rule.label(), count, "applied substitution");
        current = next;
        total += count;
    }
    (current, total)
}

/// Rewrite `path` with `rules`.
///
/// With `dry_run` the file is read and rendered but not written.
pub fn patch_file(path: &Path, rules: &[Substitution], dry_run: bool) -> Result<PatchOutcome> {
    let original = fs::read_to_string(path)?;
    let (patched, replacements) = render(&original, rules);

    let written = !dry_run;
    if written {
        fs::write(path, patched)?;
        info!(path = %path.display(), replacements, "patched file");
    }

    Ok(PatchOutcome {
        path: path.to_path_buf(),
        replacements,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ASSEMBLY_INFO: &str = "using System.Reflection;\r\n\
// [assembly: AssemblyVersion(\"1.0.*\")]\r\n\
[assembly: AssemblyVersion(\"1.2.3\")]\r\n\
[assembly: AssemblyFileVersion(\"1.2.3\")]\r\n\
[assembly: AssemblyFileVersionAttribute(\"1.2.3\")]\r\n";

    #[test]
    fn test_element_keeps_surroundings() {
        let text = "<PropertyGroup>\n    <AssemblyVersion>1.0.0</AssemblyVersion>\n    <!-- keep -->\n</PropertyGroup>\n";
        let rule = Substitution::element("AssemblyVersion", "1.1.7").unwrap();
        let (out, count) = rule.apply(text);

        assert_eq!(count, 1);
        assert_eq!(
            out,
            "<PropertyGroup>\n    <AssemblyVersion>1.1.7</AssemblyVersion>\n    <!-- keep -->\n</PropertyGroup>\n"
        );
    }

    #[test]
    fn test_element_with_attributes() {
        let text = "<Version Condition=\"'$(X)' == ''\">1.0.0</Version>";
        let rule = Substitution::element("Version", "2.0.0").unwrap();
        let (out, _) = rule.apply(text);
        assert_eq!(out, "<Version Condition=\"'$(X)' == ''\">2.0.0</Version>");
    }

    #[test]
    fn test_element_name_is_exact() {
        let text = "<FileVersion>1.0.0</FileVersion><AssemblyFileVersion>9</AssemblyFileVersion>";
        let rule = Substitution::element("FileVersion", "1.0.5").unwrap();
        let (out, count) = rule.apply(text);
        assert_eq!(count, 1);
        assert_eq!(out, "<FileVersion>1.0.5</FileVersion><AssemblyFileVersion>9</AssemblyFileVersion>");
    }

    #[test]
    fn test_attribute_rules_skip_comments() {
        let rules = vec![
            Substitution::attribute("AssemblyVersion", "1.2.42").unwrap(),
            Substitution::attribute("AssemblyFileVersion", "1.2.42").unwrap(),
        ];
        let (out, count) = render(ASSEMBLY_INFO, &rules);

        assert_eq!(count, 3);
        assert!(out.contains("// [assembly: AssemblyVersion(\"1.0.*\")]\r\n"));
        assert!(out.contains("[assembly: AssemblyVersion(\"1.2.42\")]\r\n"));
        assert!(out.contains("[assembly: AssemblyFileVersion(\"1.2.42\")]\r\n"));
        assert!(out.contains("[assembly: AssemblyFileVersionAttribute(\"1.2.42\")]\r\n"));
    }

    #[test]
    fn test_element_leaves_xml_comments() {
        let text = "<!-- <AssemblyVersion>0.9.0</AssemblyVersion> -->\n<AssemblyVersion>1.0.0</AssemblyVersion>\n<!--\n<AssemblyVersion>0.8</AssemblyVersion>\n-->\n";
        let rule = Substitution::element("AssemblyVersion", "1.1.7").unwrap();
        let (out, count) = rule.apply(text);

        assert_eq!(count, 1);
        assert_eq!(
            out,
            "<!-- <AssemblyVersion>0.9.0</AssemblyVersion> -->\n<AssemblyVersion>1.1.7</AssemblyVersion>\n<!--\n<AssemblyVersion>0.8</AssemblyVersion>\n-->\n"
        );
        assert_eq!(rule.current_value(text), Some("1.0.0".to_string()));
    }

    #[test]
    fn test_attribute_qualified_and_listed() {
        let text = "[assembly: System.Reflection.AssemblyFileVersionAttribute(\"1.2.3\")]\n\
[assembly: AssemblyVersion(\"1.2.3\"), AssemblyFileVersion(\"1.2.3\")]\n\
[assembly: global::System.Reflection.AssemblyVersion(\"1.2.3\")]\n";
        let rules = vec![
            Substitution::attribute("AssemblyVersion", "1.2.42").unwrap(),
            Substitution::attribute("AssemblyFileVersion", "1.2.42").unwrap(),
        ];
        let (out, count) = render(text, &rules);

        assert_eq!(count, 4);
        assert!(!out.contains("1.2.3"));
        assert!(out.contains(
            "[assembly: AssemblyVersion(\"1.2.42\"), AssemblyFileVersion(\"1.2.42\")]"
        ));
    }

    #[test]
    fn test_attribute_name_is_exact() {
        let text = "[assembly: AssemblyInformationalVersion(\"1.0-beta\")]\n[assembly: AssemblyFileVersion(\"1.0\")]\n";
        let rule = Substitution::attribute("AssemblyVersion", "2.0").unwrap();
        let (out, count) = rule.apply(text);
        assert_eq!(count, 0);
        assert_eq!(out, text);
    }

    #[test]
    fn test_csharp_segments() {
        let text = "a // x\n\"http://host\" /* y */ b";
        assert_eq!(
            CommentSyntax::CSharp.segments(text),
            vec![
                Segment::Code("a "),
                Segment::Comment("// x"),
                Segment::Code("\n\"http://host\" "),
                Segment::Comment("/* y */"),
                Segment::Code(" b"),
            ]
        );
    }

    #[test]
    fn test_value_with_dollar_is_literal() {
        let rule = Substitution::element("Version", "$1-literal").unwrap();
        let (out, _) = rule.apply("<Version>1</Version>");
        assert_eq!(out, "<Version>$1-literal</Version>");
    }

    #[test]
    fn test_new_rejects_wrong_group_count() {
        assert!(Substitution::new("bad", r"(only)one", "x", CommentSyntax::Xml).is_err());
        assert!(Substitution::new("bad", r"(unclosed", "x", CommentSyntax::Xml).is_err());
    }

    #[test]
    fn test_patch_file_and_dry_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Foo.csproj");
        fs::write(&path, "<Project><Version>1.0.0</Version></Project>").unwrap();
        let rules = vec![Substitution::element("Version", "1.0.9").unwrap()];

        let dry = patch_file(&path, &rules, true).unwrap();
        assert_eq!(dry.replacements, 1);
        assert!(!dry.written);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<Project><Version>1.0.0</Version></Project>"
        );

        let real = patch_file(&path, &rules, false).unwrap();
        assert!(real.written);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<Project><Version>1.0.9</Version></Project>"
        );
    }

    #[test]
    fn test_patch_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let rules = vec![Substitution::element("Version", "1").unwrap()];
        let err = patch_file(&dir.path().join("missing.csproj"), &rules, false).unwrap_err();
        assert!(matches!(err, ChangeRevisionError::Io(_)));
    }
}
