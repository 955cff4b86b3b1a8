//! Extension to content-type mapping.
//!
//! The table is loaded once at startup from a text file of
//! `extension contenttype` pairs and then shared read-only by every
//! connection.

use std::collections::HashMap;
use std::path::Path;

/// Content type used when an extension is missing or unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Outcome of looking up a request target in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeMatch<'a> {
    /// The extension is in the table.
    Known(&'a str),
    /// The final path segment has an extension the table does not list.
    Unknown,
    /// The final path segment has no `.` at all.
    NoExtension,
}

impl<'a> MimeMatch<'a> {
    /// The value to send in `Content-Type`.
    pub fn content_type(&self) -> &'a str {
        match *self {
            MimeMatch::Known(ct) => ct,
            MimeMatch::Unknown | MimeMatch::NoExtension => DEFAULT_CONTENT_TYPE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MimeTable {
    types: HashMap<String, String>,
}

impl MimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the table from `path`.
    ///
    /// A missing or unreadable file yields an empty table, so every
    /// extension falls back to [`DEFAULT_CONTENT_TYPE`].
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let table = Self::parse(&text);
                tracing::info!(path = %path.display(), entries = table.len(), "Loaded mime table");
                table
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not read mime table, serving every file as {}",
                    DEFAULT_CONTENT_TYPE
                );
                Self::new()
            }
        }
    }

    /// Parses whitespace separated `extension contenttype` lines.
    ///
    /// Blank lines, `#` comments and lines without exactly two fields are
    /// skipped. Extensions written without a leading dot get one.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            let mut fields = line.split_whitespace();
            let (Some(ext), Some(content_type), None) = (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            if ext.starts_with('#') {
                continue;
            }
            table.insert(ext, content_type);
        }
        table
    }

    pub fn insert(&mut self, ext: &str, content_type: &str) {
        let key = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        };
        self.types.insert(key, content_type.to_string());
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up the content type for a request target or file name.
    ///
    /// The extension is the literal, case-sensitive suffix of the final
    /// path segment starting at its last `.`.
    pub fn lookup(&self, target: &str) -> MimeMatch<'_> {
        let segment = target.rsplit('/').next().unwrap_or(target);
        match segment.rfind('.') {
            None => MimeMatch::NoExtension,
            Some(dot) => match self.types.get(&segment[dot..]) {
                Some(ct) => MimeMatch::Known(ct.as_str()),
                None => MimeMatch::Unknown,
            },
        }
    }
}
