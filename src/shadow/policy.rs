use crate::shadow::Method;

/// Decides what happens when a field name is declared twice.
pub trait DeclarePolicy {
    /// Returns true if `next` may replace `previous` under `name`.
    fn allow_redeclare(&self, name: &str, previous: &Method, next: &Method) -> bool;
}

/// Last declaration wins. Used for chip-variant overrides of a base table.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverridePolicy {}

impl DeclarePolicy for OverridePolicy {
    fn allow_redeclare(&self, _name: &str, _previous: &Method, _next: &Method) -> bool {
        true
    }
}

/// Any re-declaration is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectPolicy {}

impl DeclarePolicy for RejectPolicy {
    fn allow_redeclare(&self, _name: &str, _previous: &Method, _next: &Method) -> bool {
        false
    }
}
