//! Routing: map a descriptor or a reference string to an output location.
//!
//! A [`Router`] is an ordered list of [`Rule`]s built once from a
//! [`RuleSet`]. Dispatch is strictly first-match: the first rule whose
//! predicate accepts the subject wins, so rule order is part of a router's
//! configuration.

pub mod external;
pub mod standard;

pub use external::{ExternalLink, ExternalRouter};
pub use standard::StandardRouter;

use crate::descriptor::{Descriptor, DescriptorGraph, DescriptorId, DescriptorKind};
use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What a router is asked to place.
#[derive(Clone, Copy)]
pub enum Subject<'a> {
    /// A descriptor in its graph.
    Node {
        graph: &'a DescriptorGraph,
        id: DescriptorId,
    },
    /// A bare identifier, e.g. a type name or an `@see` target.
    Reference(&'a str),
}

impl<'a> Subject<'a> {
    pub fn node(graph: &'a DescriptorGraph, id: DescriptorId) -> Self {
        Self::Node { graph, id }
    }

    pub fn reference(text: &'a str) -> Self {
        Self::Reference(text)
    }

    pub fn descriptor(&self) -> Option<&'a Descriptor> {
        match *self {
            Self::Node { graph, id } => graph.get(id),
            Self::Reference(_) => None,
        }
    }

    pub fn kind(&self) -> Option<DescriptorKind> {
        self.descriptor().map(Descriptor::kind)
    }

    /// The descriptor's FQSEN, or the reference text itself.
    pub fn fqsen(&self) -> Option<&'a str> {
        match *self {
            Self::Node { .. } => self.descriptor().map(Descriptor::fqsen),
            Self::Reference(text) => Some(text),
        }
    }

    pub fn as_reference(&self) -> Option<&'a str> {
        match *self {
            Self::Reference(text) => Some(text),
            Self::Node { .. } => None,
        }
    }

    /// Owner of the subject's descriptor.
    pub fn owner(&self) -> Option<&'a Descriptor> {
        match *self {
            Self::Node { graph, .. } => graph.get(self.descriptor()?.owner()?),
            Self::Reference(_) => None,
        }
    }
}

impl fmt::Debug for Subject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { id, .. } => f.debug_tuple("Node").field(id).finish(),
            Self::Reference(text) => f.debug_tuple("Reference").field(text).finish(),
        }
    }
}

type Matcher = Box<dyn Fn(&Subject<'_>) -> bool + Send + Sync>;
type Generator = Box<dyn Fn(&Subject<'_>) -> Option<String> + Send + Sync>;

/// A predicate plus the function computing a destination for the subjects
/// it accepts.
pub struct Rule {
    label: String,
    matcher: Matcher,
    generator: Generator,
}

impl Rule {
    pub fn new<M, G>(label: impl Into<String>, matcher: M, generator: G) -> Self
    where
        M: Fn(&Subject<'_>) -> bool + Send + Sync + 'static,
        G: Fn(&Subject<'_>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            matcher: Box::new(matcher),
            generator: Box::new(generator),
        }
    }

    /// Rule that accepts one descriptor kind.
    pub fn for_kind<G>(kind: DescriptorKind, generator: G) -> Self
    where
        G: Fn(&Subject<'_>) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(kind.as_str(), move |s| s.kind() == Some(kind), generator)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, subject: &Subject<'_>) -> bool {
        (self.matcher)(subject)
    }

    /// Destination for a subject this rule accepted. `None` when the
    /// subject lacks what the destination is built from.
    pub fn generate(&self, subject: &Subject<'_>) -> Option<String> {
        (self.generator)(subject)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("label", &self.label).finish()
    }
}

/// Router variant: produces the ordered rules a router is built from.
pub trait RuleSet {
    fn rules(&self) -> Vec<Rule>;
}

impl<F> RuleSet for F
where
    F: Fn() -> Vec<Rule>,
{
    fn rules(&self) -> Vec<Rule> {
        self()
    }
}

/// Ordered, immutable collection of rules with first-match dispatch.
#[derive(Debug)]
pub struct Router {
    name: String,
    rules: Vec<Rule>,
}

impl Router {
    /// Build a router from a rule set. The only time rules are added.
    pub fn configure(name: impl Into<String>, rule_set: &dyn RuleSet) -> Self {
        let name = name.into();
        let rules = rule_set.rules();
        debug!(router = %name, rules = rules.len(), "router configured");
        Self { name, rules }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule, in registration order, that accepts the subject.
    pub fn match_subject(&self, subject: &Subject<'_>) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(subject))
    }

    /// Match and generate in one step.
    pub fn route(&self, subject: &Subject<'_>) -> Option<String> {
        let rule = self.match_subject(subject)?;
        let destination = rule.generate(subject);
        if destination.is_none() {
            debug!(router = %self.name, rule = rule.label(), ?subject, "rule produced no destination");
        }
        destination
    }
}

/// Named router variants known to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterKind {
    Standard,
    External,
}

impl FromStr for RouterKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(Self::Standard),
            "external" => Ok(Self::External),
            _ => Err(anyhow!("unknown router: {}. Use standard or external", s)),
        }
    }
}

impl RouterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::External => "external",
        }
    }
}

/// Routers consulted in order; the first destination produced wins.
#[derive(Debug, Default)]
pub struct RouterQueue {
    routers: Vec<Router>,
}

impl RouterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, router: Router) {
        self.routers.push(router);
    }

    /// The router with the given name, if queued.
    pub fn get(&self, kind: RouterKind) -> Option<&Router> {
        self.routers.iter().find(|r| r.name() == kind.as_str())
    }

    pub fn route(&self, subject: &Subject<'_>) -> Option<String> {
        self.routers.iter().find_map(|router| router.route(subject))
    }
}
