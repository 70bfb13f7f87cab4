//! Non-fatal diagnostics raised while reflecting.
//!
//! Reflection never fails because a type has a shape the pipeline does not
//! understand. The node degrades to an opaque marker and a [`Warning`] is
//! handed to the caller's [`WarningSink`], anchored at the location of the
//! declaration that requested reflection.

use serde::Serialize;

// =============================================================================
// Source Location
// =============================================================================

/// Where the reflection request originated in the host's source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    /// Zero-based line
    pub line: u32,
    /// Zero-based character within the line
    pub character: u32,
    /// Text of the requesting node
    pub source_text: String,
}

impl SourceLocation {
    #[must_use]
    pub fn new(
        file: impl Into<String>,
        line: u32,
        character: u32,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            character,
            source_text: source_text.into(),
        }
    }
}

// =============================================================================
// Warning
// =============================================================================

/// A non-fatal reflection diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    pub file: String,
    pub line: u32,
    pub character: u32,
    pub source_text: String,
}

impl Warning {
    /// Create a warning anchored at `location`.
    #[must_use]
    pub fn at(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: location.file.clone(),
            line: location.line,
            character: location.character,
            source_text: location.source_text.clone(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tsr: {}: {} {}:{}: {}",
            self.message, self.file, self.line, self.character, self.source_text
        )
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Consumer of non-fatal diagnostics.
pub trait WarningSink {
    fn warn(&mut self, warning: Warning);
}

/// Collects warnings for later inspection.
impl WarningSink for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&mut self, warning: Warning) {
        tracing::warn!(
            file = %warning.file,
            line = warning.line,
            character = warning.character,
            "{warning}"
        );
    }
}
