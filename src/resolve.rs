//! Inheritance-aware attribute lookup.
//!
//! Every read follows the same strategy: use the descriptor's own value when
//! it is set and non-empty, otherwise ask the inherited counterpart for the
//! same attribute. Walks are bounded by a visited set, so a misconfigured
//! hierarchy yields [`ResolveError::Cycle`] instead of looping.
//!
//! Argument default values, by-reference and variadic flags are never
//! inherited; read them directly from [`ArgumentDescriptor`].

use crate::descriptor::{ArgumentDescriptor, Descriptor, DescriptorGraph, DescriptorId, DescriptorKind};
use std::borrow::Cow;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Placeholder that pulls the inherited element's text into a docblock.
pub const INHERIT_DOC: &str = "{@inheritDoc}";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("inheritance cycle detected starting at {start}")]
    Cycle { start: DescriptorId },

    #[error("unknown descriptor {0}")]
    UnknownDescriptor(DescriptorId),
}

/// Iterator over a descriptor and its inherited elements, nearest first.
///
/// Yields the start node itself first. On revisiting a node it yields one
/// `Err(Cycle)` and stops.
pub struct Ancestry<'g> {
    graph: &'g DescriptorGraph,
    start: DescriptorId,
    next: Option<DescriptorId>,
    visited: HashSet<DescriptorId>,
    failed: bool,
}

impl Iterator for Ancestry<'_> {
    type Item = Result<DescriptorId, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let current = self.next?;
        if !self.visited.insert(current) {
            self.failed = true;
            return Some(Err(ResolveError::Cycle { start: self.start }));
        }
        self.next = self.graph.inherited_element(current);
        Some(Ok(current))
    }
}

impl DescriptorGraph {
    /// The counterpart this descriptor falls back to for unset attributes.
    ///
    /// - argument: same-named argument of the owning method's inherited method
    /// - method: the overridden or implemented method
    /// - property: same-named property on the nearest ancestor class
    /// - class-like: the extended class
    pub fn inherited_element(&self, id: DescriptorId) -> Option<DescriptorId> {
        let node = self.get(id)?;
        match node.kind() {
            DescriptorKind::Argument => self.inherited_argument(node),
            DescriptorKind::Method => self.method(id)?.inherited_method(),
            DescriptorKind::Property => self.inherited_property(node),
            k if k.is_class_like() => self.class(id)?.extends(),
            _ => None,
        }
    }

    fn inherited_argument(&self, node: &Descriptor) -> Option<DescriptorId> {
        let method = node.as_argument()?.method()?;
        let parent_method = self.method(method)?.inherited_method()?;
        self.method(parent_method)?
            .arguments()
            .iter()
            .copied()
            .find(|&candidate| self.get(candidate).is_some_and(|c| c.name() == node.name()))
    }

    fn inherited_property(&self, node: &Descriptor) -> Option<DescriptorId> {
        let class = node.owner()?;
        // Skip the owning class itself; stop quietly on a cyclic hierarchy.
        for step in self.ancestry(class).skip(1) {
            let ancestor = step.ok()?;
            let found = self.class(ancestor)?.properties().iter().copied().find(|&p| {
                self.get(p).is_some_and(|p| p.name() == node.name())
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Walk `id` and its inherited elements, nearest first.
    pub fn ancestry(&self, id: DescriptorId) -> Ancestry<'_> {
        Ancestry {
            graph: self,
            start: id,
            next: self.get(id).map(|_| id),
            visited: HashSet::new(),
            failed: false,
        }
    }

    /// First value `pick` returns along the ancestry of `id`.
    fn resolve_with<'g, T>(
        &'g self,
        id: DescriptorId,
        pick: impl Fn(&'g Descriptor) -> Option<T>,
    ) -> Result<Option<T>, ResolveError> {
        for step in self.ancestry(id) {
            let node = self.get(step?).ok_or(ResolveError::UnknownDescriptor(id))?;
            if let Some(value) = pick(node) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    // -- Argument types -------------------------------------------------------

    /// Type list of an argument, falling back to its inherited counterpart.
    ///
    /// A non-empty local list always wins. Otherwise the nearest non-empty
    /// list up the chain is memoized on every argument walked, so later reads
    /// are O(1). Cycles are reported and never memoized.
    pub fn try_types(&self, argument: DescriptorId) -> Result<&[String], ResolveError> {
        let arg = self
            .argument(argument)
            .ok_or(ResolveError::UnknownDescriptor(argument))?;
        if !arg.local_types().is_empty() {
            return Ok(arg.local_types());
        }
        if let Some(types) = arg.memoized_types() {
            return Ok(types);
        }

        let mut walked: Vec<&ArgumentDescriptor> = Vec::new();
        let mut resolved: &[String] = &[];
        for step in self.ancestry(argument) {
            let current = step?;
            let Some(candidate) = self.argument(current) else {
                break;
            };
            if !candidate.local_types().is_empty() {
                resolved = candidate.local_types();
                break;
            }
            if let Some(types) = candidate.memoized_types() {
                resolved = types;
                break;
            }
            walked.push(candidate);
        }

        debug!(%argument, types = ?resolved, "memoizing inherited argument types");
        let resolved = resolved.to_vec();
        for candidate in walked.iter().skip(1) {
            candidate.memoize_types(resolved.clone());
        }
        Ok(arg.memoize_types(resolved))
    }

    /// Infallible `try_types`: a cycle is logged and reads as empty.
    pub fn types(&self, argument: DescriptorId) -> &[String] {
        self.try_types(argument).unwrap_or_else(|err| {
            warn!(%argument, error = %err, "argument type resolution failed");
            &[]
        })
    }

    // -- Docblock text --------------------------------------------------------

    /// Summary of `id`, or of its nearest ancestor when empty or `{@inheritDoc}`.
    pub fn try_summary(&self, id: DescriptorId) -> Result<Option<&str>, ResolveError> {
        self.resolve_with(id, |node| node.local_summary().filter(|s| has_own_text(s)))
    }

    pub fn summary(&self, id: DescriptorId) -> Option<&str> {
        self.try_summary(id).unwrap_or_else(|err| {
            warn!(%id, error = %err, "summary resolution failed");
            None
        })
    }

    /// Description of `id` with inheritance.
    ///
    /// An empty description or a bare `{@inheritDoc}` is replaced by the
    /// ancestor's; an inline `{@inheritDoc}` is substituted in place.
    pub fn try_description(&self, id: DescriptorId) -> Result<Option<Cow<'_, str>>, ResolveError> {
        let mut wrappers: Vec<&str> = Vec::new();
        let mut base: Option<&str> = None;
        for step in self.ancestry(id) {
            let node = self.get(step?).ok_or(ResolveError::UnknownDescriptor(id))?;
            let Some(text) = node.local_description().filter(|s| has_own_text(s)) else {
                continue;
            };
            if text.contains(INHERIT_DOC) {
                wrappers.push(text);
                continue;
            }
            base = Some(text);
            break;
        }

        if wrappers.is_empty() {
            return Ok(base.map(Cow::Borrowed));
        }
        let mut text = base.unwrap_or_default().to_string();
        for wrapper in wrappers.iter().rev() {
            text = wrapper.replace(INHERIT_DOC, &text);
        }
        Ok(Some(Cow::Owned(text)))
    }

    pub fn description(&self, id: DescriptorId) -> Option<Cow<'_, str>> {
        self.try_description(id).unwrap_or_else(|err| {
            warn!(%id, error = %err, "description resolution failed");
            None
        })
    }

    /// Return types of a method, falling back to the overridden method.
    pub fn try_return_types(&self, method: DescriptorId) -> Result<&[String], ResolveError> {
        let found = self.resolve_with(method, |node| {
            node.as_method()
                .map(|m| m.returns.as_slice())
                .filter(|r| !r.is_empty())
        })?;
        Ok(found.unwrap_or_default())
    }

    pub fn return_types(&self, method: DescriptorId) -> &[String] {
        self.try_return_types(method).unwrap_or_else(|err| {
            warn!(%method, error = %err, "return type resolution failed");
            &[]
        })
    }

    // -- Validation -----------------------------------------------------------

    /// Report every method or class-like element whose inheritance chain
    /// does not terminate.
    pub fn validate(&self) -> Vec<ResolveError> {
        self.iter()
            .filter(|(_, d)| d.kind() == DescriptorKind::Method || d.kind().is_class_like())
            .filter_map(|(id, _)| self.ancestry(id).find_map(Result::err))
            .collect()
    }
}

/// Text that is neither blank nor just the inheritance placeholder.
fn has_own_text(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed != INHERIT_DOC
}
