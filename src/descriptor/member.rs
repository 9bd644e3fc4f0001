//! Payloads for the non-argument descriptor kinds.
//!
//! Edges (arguments, members, inheritance) are crate-private and only change
//! through `DescriptorGraph` setters so both ends stay consistent.

use super::{DescriptorId, Visibility};

/// A source file and the top-level elements it declares.
#[derive(Debug, Default)]
pub struct FileDescriptor {
    pub path: String,
    pub(crate) elements: Vec<DescriptorId>,
}

impl FileDescriptor {
    pub fn elements(&self) -> &[DescriptorId] {
        &self.elements
    }
}

/// A namespace and its direct children (classes, functions, constants).
#[derive(Debug, Default)]
pub struct NamespaceDescriptor {
    pub(crate) children: Vec<DescriptorId>,
}

impl NamespaceDescriptor {
    pub fn children(&self) -> &[DescriptorId] {
        &self.children
    }
}

/// Class, interface or trait.
#[derive(Debug, Default)]
pub struct ClassDescriptor {
    pub(crate) extends: Option<DescriptorId>,
    pub(crate) implements: Vec<DescriptorId>,
    pub(crate) methods: Vec<DescriptorId>,
    pub(crate) properties: Vec<DescriptorId>,
    pub(crate) constants: Vec<DescriptorId>,
    /// Declared parent FQSEN, kept even when the parent is not documented.
    pub parent_name: Option<String>,
    /// Declared interface FQSENs.
    pub interface_names: Vec<String>,
    pub is_abstract: bool,
    pub is_final: bool,
}

impl ClassDescriptor {
    pub fn extends(&self) -> Option<DescriptorId> {
        self.extends
    }

    pub fn implements(&self) -> &[DescriptorId] {
        &self.implements
    }

    pub fn methods(&self) -> &[DescriptorId] {
        &self.methods
    }

    pub fn properties(&self) -> &[DescriptorId] {
        &self.properties
    }

    pub fn constants(&self) -> &[DescriptorId] {
        &self.constants
    }
}

/// A method of a class-like element.
#[derive(Debug, Default)]
pub struct MethodDescriptor {
    pub(crate) arguments: Vec<DescriptorId>,
    /// The method this one overrides or implements.
    pub(crate) inherited: Option<DescriptorId>,
    pub returns: Vec<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

impl MethodDescriptor {
    pub fn arguments(&self) -> &[DescriptorId] {
        &self.arguments
    }

    pub fn inherited_method(&self) -> Option<DescriptorId> {
        self.inherited
    }
}

/// A free function.
#[derive(Debug, Default)]
pub struct FunctionDescriptor {
    pub(crate) arguments: Vec<DescriptorId>,
    pub returns: Vec<String>,
}

impl FunctionDescriptor {
    pub fn arguments(&self) -> &[DescriptorId] {
        &self.arguments
    }
}

#[derive(Debug, Default)]
pub struct PropertyDescriptor {
    pub types: Vec<String>,
    pub default: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
}

#[derive(Debug, Default)]
pub struct ConstantDescriptor {
    pub value: Option<String>,
}
