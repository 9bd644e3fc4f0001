//! Descriptor model: one node per documented source element.
//!
//! Descriptors live in a [`DescriptorGraph`] arena and refer to each other by
//! [`DescriptorId`]. Containment (a class owns its methods, a method owns its
//! arguments) and inheritance (a method overrides another method, a class
//! extends another class) are both stored as ids, never as live references.

mod argument;
mod graph;
mod member;

pub use argument::ArgumentDescriptor;
pub use graph::{DescriptorGraph, GraphError};
pub use member::{
    ClassDescriptor, ConstantDescriptor, FileDescriptor, FunctionDescriptor, MethodDescriptor,
    NamespaceDescriptor, PropertyDescriptor,
};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Index of a descriptor inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(u32);

impl DescriptorId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind tag of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    File,
    Namespace,
    Class,
    Interface,
    Trait,
    Function,
    Method,
    Property,
    Constant,
    Argument,
}

impl DescriptorKind {
    /// Class, interface or trait.
    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::Trait)
    }

    /// Methods and functions own arguments.
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Method | Self::Function)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::Constant => "constant",
            Self::Argument => "argument",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

/// Kind-specific payload of a descriptor.
#[derive(Debug)]
pub enum Details {
    File(FileDescriptor),
    Namespace(NamespaceDescriptor),
    ClassLike(ClassDescriptor),
    Function(FunctionDescriptor),
    Method(MethodDescriptor),
    Property(PropertyDescriptor),
    Constant(ConstantDescriptor),
    Argument(ArgumentDescriptor),
}

/// A single documented element.
#[derive(Debug)]
pub struct Descriptor {
    pub(crate) kind: DescriptorKind,
    pub(crate) name: String,
    /// Fully qualified structural element name, e.g. `\App\Foo::run()`.
    pub(crate) fqsen: String,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    /// Containment owner (namespace of a class, class of a method, ...).
    pub(crate) owner: Option<DescriptorId>,
    pub(crate) details: Details,
}

impl Descriptor {
    pub(crate) fn new(kind: DescriptorKind, name: &str, fqsen: String, details: Details) -> Self {
        Self {
            kind,
            name: name.to_string(),
            fqsen,
            summary: None,
            description: None,
            owner: None,
            details,
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    /// Stored name, without any presentation sigil.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name as shown in generated output.
    ///
    /// Arguments are rendered with a `$` sigil: `count` → `$count`.
    pub fn display_name(&self) -> Cow<'_, str> {
        match self.kind {
            DescriptorKind::Argument => Cow::Owned(format!("${}", self.name)),
            _ => Cow::Borrowed(&self.name),
        }
    }

    pub fn fqsen(&self) -> &str {
        &self.fqsen
    }

    /// Locally stored summary; see `DescriptorGraph::summary` for the
    /// inheritance-aware read.
    pub fn local_summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn local_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn owner(&self) -> Option<DescriptorId> {
        self.owner
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn as_argument(&self) -> Option<&ArgumentDescriptor> {
        match &self.details {
            Details::Argument(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDescriptor> {
        match &self.details {
            Details::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDescriptor> {
        match &self.details {
            Details::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDescriptor> {
        match &self.details {
            Details::ClassLike(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDescriptor> {
        match &self.details {
            Details::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&ConstantDescriptor> {
        match &self.details {
            Details::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&NamespaceDescriptor> {
        match &self.details {
            Details::Namespace(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileDescriptor> {
        match &self.details {
            Details::File(f) => Some(f),
            _ => None,
        }
    }

    /// Arguments of a method or function, empty for every other kind.
    pub fn arguments(&self) -> &[DescriptorId] {
        match &self.details {
            Details::Method(m) => &m.arguments,
            Details::Function(f) => &f.arguments,
            _ => &[],
        }
    }
}

/// Split an FQSEN into its namespace and local name.
///
/// `\App\Util\slugify()` → (`\App\Util`, `slugify()`), `\Foo` → (`\`, `Foo`).
pub fn split_namespace(fqsen: &str) -> (&str, &str) {
    match fqsen.rfind('\\') {
        Some(0) => ("\\", &fqsen[1..]),
        Some(pos) => (&fqsen[..pos], &fqsen[pos + 1..]),
        None => ("\\", fqsen),
    }
}
