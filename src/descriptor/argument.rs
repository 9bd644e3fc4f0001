//! Argument descriptor: one parameter of a method or function.

use super::DescriptorId;
use std::sync::OnceLock;

/// A single argument of a method or function.
///
/// Only the type list falls back to the inherited counterpart when empty.
/// Default value, by-reference and variadic flags are always read as stored.
#[derive(Debug, Default)]
pub struct ArgumentDescriptor {
    /// Owning method, used only to find the inherited counterpart.
    pub(crate) method: Option<DescriptorId>,
    types: Vec<String>,
    /// Type list filled in from the inherited counterpart on first read.
    resolved_types: OnceLock<Vec<String>>,
    default: Option<String>,
    by_reference: bool,
    variadic: bool,
}

impl ArgumentDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> Option<DescriptorId> {
        self.method
    }

    /// Types as stored by the populator, without inheritance.
    pub fn local_types(&self) -> &[String] {
        &self.types
    }

    pub fn set_types(&mut self, types: Vec<String>) {
        self.types = types;
        self.resolved_types = OnceLock::new();
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn set_default(&mut self, value: Option<String>) {
        self.default = value;
    }

    pub fn is_by_reference(&self) -> bool {
        self.by_reference
    }

    pub fn set_by_reference(&mut self, by_reference: bool) {
        self.by_reference = by_reference;
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn set_variadic(&mut self, variadic: bool) {
        self.variadic = variadic;
    }

    pub(crate) fn memoized_types(&self) -> Option<&[String]> {
        self.resolved_types.get().map(Vec::as_slice)
    }

    /// Store a resolved type list. Concurrent callers compute the same value,
    /// so whichever store lands first is kept.
    pub(crate) fn memoize_types(&self, types: Vec<String>) -> &[String] {
        self.resolved_types.get_or_init(|| types)
    }
}
