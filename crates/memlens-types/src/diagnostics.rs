//! Diagnostics sink.
//!
//! Parsing and decoding never print directly. Recoverable problems are pushed
//! into a [`Diagnostics`] collector owned by the parser or decoder and handed
//! back to the caller; each record is also emitted as a `tracing` event so a
//! subscriber installed by the binary sees them as they happen.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity of a diagnostic, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Debug,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Debug => "debug",
            Severity::Info => "info",
        })
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A file could not be opened or read.
    Io,
    /// A token does not name any scalar, struct, union or enum.
    UnresolvedType,
    /// The grammar was violated.
    MalformedSyntax,
    /// A member size does not fit the padding algorithm.
    Alignment,
    /// The decode cursor ran past the end of the buffer.
    BufferOverrun,
    /// The buffer length differs from the size of the decoded type.
    SizeMismatch,
    /// A construct that is understood but deliberately not handled.
    Skipped,
    /// Progress information.
    Note,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Io => "io",
            DiagnosticKind::UnresolvedType => "unresolved-type",
            DiagnosticKind::MalformedSyntax => "malformed-syntax",
            DiagnosticKind::Alignment => "alignment",
            DiagnosticKind::BufferOverrun => "buffer-overrun",
            DiagnosticKind::SizeMismatch => "size-mismatch",
            DiagnosticKind::Skipped => "skipped",
            DiagnosticKind::Note => "note",
        })
    }
}

/// Where a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub file: Option<PathBuf>,
    /// 1-based physical line, 0 when unknown.
    pub line: usize,
}

impl Location {
    pub fn new(file: Option<&Path>, line: usize) -> Self {
        Self {
            file: file.map(Path::to_path_buf),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.display(), self.line),
            None => write!(f, "<input>:{}", self.line),
        }
    }
}

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.kind)?;
        if let Some(location) = &self.location {
            write!(f, " {}", location)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Collector of diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it as a tracing event.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        emit(&diagnostic);
        self.records.push(diagnostic);
    }

    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.report(Severity::Error, kind, message, location);
    }

    pub fn debug(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.report(Severity::Debug, kind, message, location);
    }

    pub fn info(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.report(Severity::Info, kind, message, location);
    }

    fn report(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.push(Diagnostic {
            severity,
            kind,
            message: message.into(),
            location,
        });
    }

    /// Move every record of `other` into this collector without re-emitting.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(move |d| d.kind == kind)
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.of_kind(kind).next().is_some()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn emit(d: &Diagnostic) {
    let location = d
        .location
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    match d.severity {
        Severity::Error => {
            tracing::error!(kind = %d.kind, location = %location, "{}", d.message)
        }
        Severity::Debug => {
            tracing::debug!(kind = %d.kind, location = %location, "{}", d.message)
        }
        Severity::Info => {
            tracing::info!(kind = %d.kind, location = %location, "{}", d.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut diags = Diagnostics::new();
        diags.info(DiagnosticKind::Note, "first", None);
        diags.error(DiagnosticKind::UnresolvedType, "second", None);
        diags.debug(DiagnosticKind::Skipped, "third", None);

        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(diags.len(), 3);
        assert_eq!(diags.errors().count(), 1);
        assert!(diags.has_errors());
        assert!(diags.has_kind(DiagnosticKind::Skipped));
        assert!(!diags.has_kind(DiagnosticKind::Io));
    }

    #[test]
    fn test_display() {
        let d = Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::MalformedSyntax,
            message: "missing ';'".to_string(),
            location: Some(Location::new(Some(Path::new("a.h")), 12)),
        };
        assert_eq!(d.to_string(), "error[malformed-syntax] a.h:12: missing ';'");

        let d = Diagnostic {
            location: None,
            ..d
        };
        assert_eq!(d.to_string(), "error[malformed-syntax]: missing ';'");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error < Severity::Debug);
        assert!(Severity::Debug < Severity::Info);
    }
}
