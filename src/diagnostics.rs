//! Soft failures raised while decoding.
//!
//! A diagnostic never stops a decode: the raw value is kept and the reader
//! moves on. Diagnostics are pushed to a [`DiagnosticSink`] as they happen.

use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Numeric value outside its documented range
    OutOfRange,
    /// Boolean byte other than 0 or 1
    BadBool,
    /// Unrecognised value for a known enumeration
    UnknownTag,
    /// Padding that should have been zero
    NonZeroPadding,
    /// String length above the soft ceiling
    LongString,
    /// Known object class with a subtype not seen before
    UnknownSubtype,
    /// Identifier missing from every configured name table
    UnresolvedName,
    /// Object placed outside the allowed map area
    PositionOutOfBounds,
    /// Non-zero bytes after the last section
    TrailingData,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnresolvedName | DiagnosticKind::UnknownSubtype => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Stream offset of the first byte of the offending field
    pub offset: u64,
    pub value: Option<i64>,
    /// Inclusive expected range, when one applies
    pub expected: Option<(i64, i64)>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, offset: u64, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            offset,
            value: None,
            expected: None,
            message: message.into(),
        }
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_expected(mut self, min: i64, max: i64) -> Self {
        self.expected = Some((min, max));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at offset {:#x}: {}", self.kind, self.offset, self.message)?;
        if let Some(v) = self.value {
            write!(f, " (got {v}")?;
            if let Some((min, max)) = self.expected {
                write!(f, ", expected {min}..={max}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Receiver for soft failures
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Emits every diagnostic as a `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, d: Diagnostic) {
        match d.severity {
            Severity::Warning => tracing::warn!(
                kind = ?d.kind,
                offset = d.offset,
                value = ?d.value,
                expected = ?d.expected,
                "{}",
                d.message
            ),
            Severity::Info => tracing::debug!(
                kind = ?d.kind,
                offset = d.offset,
                value = ?d.value,
                "{}",
                d.message
            ),
        }
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic in memory for later inspection
#[derive(Debug, Default)]
pub struct CollectSink {
    items: RefCell<Vec<Diagnostic>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.borrow().iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items.into_inner()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.items.borrow().clone()
    }
}

impl DiagnosticSink for CollectSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.items.borrow_mut().push(diagnostic);
    }
}
