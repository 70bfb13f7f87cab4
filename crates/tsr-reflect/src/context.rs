//! Per-request context supplied by the host.

use tsr_common::{ScopeId, SourceLocation, Warning, WarningSink};

/// Everything a reflection request needs besides the type itself.
///
/// `S` is the host's symbol handle.
pub struct ReflectContext<'a, S> {
    /// Scope generated identifiers are bound to.
    pub scope: ScopeId,
    /// Declaration that requested reflection; anchors warnings.
    pub location: SourceLocation,
    warnings: &'a mut dyn WarningSink,
    mark_referenced: Option<&'a mut dyn FnMut(&S)>,
}

impl<'a, S> ReflectContext<'a, S> {
    pub fn new(scope: ScopeId, location: SourceLocation, warnings: &'a mut dyn WarningSink) -> Self {
        Self {
            scope,
            location,
            warnings,
            mark_referenced: None,
        }
    }

    /// Install the callback that keeps referenced declarations alive.
    #[must_use]
    pub fn with_mark_referenced(mut self, callback: &'a mut dyn FnMut(&S)) -> Self {
        self.mark_referenced = Some(callback);
        self
    }

    pub(crate) fn report_unknown_type(&mut self, display: &str) {
        self.warn(format!("unknown type, {display}"));
    }

    pub(crate) fn warn(&mut self, message: String) {
        let warning = Warning::at(&self.location, message);
        self.warnings.warn(warning);
    }

    pub(crate) fn mark_referenced(&mut self, symbol: &S) {
        if let Some(callback) = self.mark_referenced.as_mut() {
            callback(symbol);
        }
    }
}
