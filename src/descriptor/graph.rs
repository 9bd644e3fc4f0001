//! Descriptor arena and the populator-facing setters.

use super::*;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while populating the graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown descriptor {0}")]
    UnknownDescriptor(DescriptorId),

    #[error("descriptor {id} is a {found}, expected {expected}")]
    WrongKind {
        id: DescriptorId,
        expected: &'static str,
        found: DescriptorKind,
    },

    #[error("{0} is not a class-like kind")]
    NotClassLike(DescriptorKind),

    #[error("duplicate element {0}")]
    Duplicate(String),
}

/// Arena owning every descriptor of one documentation run.
///
/// Built once by a populator, then read. Reads that memoize (argument type
/// lists) go through `OnceLock`, so a populated graph can be shared across
/// threads.
///
/// Namespaces are indexed apart from every other element: PHP lets a class
/// `\A\B` and a namespace `\A\B` coexist.
#[derive(Debug, Default)]
pub struct DescriptorGraph {
    nodes: Vec<Descriptor>,
    by_fqsen: HashMap<String, DescriptorId>,
    namespaces: HashMap<String, DescriptorId>,
}

impl DescriptorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: DescriptorId) -> Option<&Descriptor> {
        self.nodes.get(id.index())
    }

    /// Find an element by its FQSEN. Arguments are not indexed.
    ///
    /// When a class-like element and a namespace share the FQSEN, the
    /// element wins. Use [`lookup_namespace`](Self::lookup_namespace) to
    /// reach the namespace.
    pub fn lookup(&self, fqsen: &str) -> Option<DescriptorId> {
        self.by_fqsen
            .get(fqsen)
            .or_else(|| self.namespaces.get(fqsen))
            .copied()
    }

    pub fn lookup_namespace(&self, fqsen: &str) -> Option<DescriptorId> {
        self.namespaces.get(fqsen).copied()
    }

    /// FQSENs of every namespace in the graph.
    pub fn namespace_names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DescriptorId, &Descriptor)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, d)| (DescriptorId::from_index(i), d))
    }

    pub fn of_kind(&self, kind: DescriptorKind) -> impl Iterator<Item = (DescriptorId, &Descriptor)> {
        self.iter().filter(move |(_, d)| d.kind == kind)
    }

    pub fn argument(&self, id: DescriptorId) -> Option<&ArgumentDescriptor> {
        self.get(id).and_then(Descriptor::as_argument)
    }

    pub fn method(&self, id: DescriptorId) -> Option<&MethodDescriptor> {
        self.get(id).and_then(Descriptor::as_method)
    }

    pub fn class(&self, id: DescriptorId) -> Option<&ClassDescriptor> {
        self.get(id).and_then(Descriptor::as_class)
    }

    // -- Node creation --------------------------------------------------------

    fn push(&mut self, descriptor: Descriptor, indexed: bool) -> Result<DescriptorId, GraphError> {
        if indexed && self.by_fqsen.contains_key(&descriptor.fqsen) {
            return Err(GraphError::Duplicate(descriptor.fqsen));
        }
        let id = DescriptorId::from_index(self.nodes.len());
        if indexed {
            self.by_fqsen.insert(descriptor.fqsen.clone(), id);
        }
        self.nodes.push(descriptor);
        Ok(id)
    }

    pub fn add_file(&mut self, path: &str) -> Result<DescriptorId, GraphError> {
        let name = path.rsplit('/').next().unwrap_or(path);
        let details = Details::File(FileDescriptor {
            path: path.to_string(),
            elements: Vec::new(),
        });
        self.push(Descriptor::new(DescriptorKind::File, name, path.to_string(), details), true)
    }

    /// Return the namespace with this FQSEN, creating it when missing.
    pub fn namespace(&mut self, fqsen: &str) -> DescriptorId {
        if let Some(id) = self.lookup_namespace(fqsen) {
            return id;
        }
        let (_, name) = split_namespace(fqsen);
        let details = Details::Namespace(NamespaceDescriptor::default());
        let id = DescriptorId::from_index(self.nodes.len());
        self.namespaces.insert(fqsen.to_string(), id);
        self.nodes
            .push(Descriptor::new(DescriptorKind::Namespace, name, fqsen.to_string(), details));
        id
    }

    /// Add a class, interface or trait. Its namespace is created on demand.
    pub fn add_class(&mut self, kind: DescriptorKind, fqsen: &str) -> Result<DescriptorId, GraphError> {
        if !kind.is_class_like() {
            return Err(GraphError::NotClassLike(kind));
        }
        let (ns, name) = split_namespace(fqsen);
        let ns = ns.to_string();
        let details = Details::ClassLike(ClassDescriptor::default());
        let id = self.push(Descriptor::new(kind, name, fqsen.to_string(), details), true)?;
        self.adopt_into_namespace(&ns, id);
        Ok(id)
    }

    pub fn add_function(&mut self, fqsen: &str) -> Result<DescriptorId, GraphError> {
        let (ns, name) = split_namespace(fqsen);
        let name = name.trim_end_matches("()");
        let fqsen = format!("{}()", fqsen.trim_end_matches("()"));
        let ns = ns.to_string();
        let details = Details::Function(FunctionDescriptor::default());
        let id = self.push(Descriptor::new(DescriptorKind::Function, name, fqsen, details), true)?;
        self.adopt_into_namespace(&ns, id);
        Ok(id)
    }

    pub fn add_method(&mut self, class: DescriptorId, name: &str) -> Result<DescriptorId, GraphError> {
        let fqsen = format!("{}::{}()", self.class_fqsen(class)?, name);
        let details = Details::Method(MethodDescriptor::default());
        let id = self.push(Descriptor::new(DescriptorKind::Method, name, fqsen, details), true)?;
        self.nodes[id.index()].owner = Some(class);
        self.class_mut(class)?.methods.push(id);
        Ok(id)
    }

    pub fn add_property(&mut self, class: DescriptorId, name: &str) -> Result<DescriptorId, GraphError> {
        let name = name.trim_start_matches('$');
        let fqsen = format!("{}::${}", self.class_fqsen(class)?, name);
        let details = Details::Property(PropertyDescriptor::default());
        let id = self.push(Descriptor::new(DescriptorKind::Property, name, fqsen, details), true)?;
        self.nodes[id.index()].owner = Some(class);
        self.class_mut(class)?.properties.push(id);
        Ok(id)
    }

    /// Add a constant to a class-like element or a namespace.
    pub fn add_constant(&mut self, owner: DescriptorId, name: &str) -> Result<DescriptorId, GraphError> {
        let owner_node = self.get(owner).ok_or(GraphError::UnknownDescriptor(owner))?;
        let fqsen = match owner_node.kind {
            k if k.is_class_like() => format!("{}::{}", owner_node.fqsen, name),
            DescriptorKind::Namespace if owner_node.fqsen == "\\" => format!("\\{}", name),
            DescriptorKind::Namespace => format!("{}\\{}", owner_node.fqsen, name),
            found => {
                return Err(GraphError::WrongKind {
                    id: owner,
                    expected: "class-like or namespace",
                    found,
                })
            }
        };
        let details = Details::Constant(ConstantDescriptor::default());
        let id = self.push(Descriptor::new(DescriptorKind::Constant, name, fqsen, details), true)?;
        self.nodes[id.index()].owner = Some(owner);
        match &mut self.nodes[owner.index()].details {
            Details::ClassLike(c) => c.constants.push(id),
            Details::Namespace(n) => n.children.push(id),
            _ => {}
        }
        Ok(id)
    }

    /// Create an argument that belongs to no callable yet.
    pub fn add_argument(&mut self, name: &str) -> DescriptorId {
        let name = name.trim_start_matches('$');
        let details = Details::Argument(ArgumentDescriptor::new());
        let id = DescriptorId::from_index(self.nodes.len());
        self.nodes.push(Descriptor::new(
            DescriptorKind::Argument,
            name,
            format!("${}", name),
            details,
        ));
        id
    }

    /// Append an argument to a method or function. For methods the
    /// argument's back-reference is set as well.
    pub fn push_argument(&mut self, callable: DescriptorId, argument: DescriptorId) -> Result<(), GraphError> {
        self.argument_mut(argument)?;
        let owner = self.get(callable).ok_or(GraphError::UnknownDescriptor(callable))?;
        let callable_kind = owner.kind;
        let fqsen = format!("{}::${}", owner.fqsen, self.nodes[argument.index()].name);
        match &mut self.nodes[callable.index()].details {
            Details::Method(m) => m.arguments.push(argument),
            Details::Function(f) => f.arguments.push(argument),
            _ => {
                return Err(GraphError::WrongKind {
                    id: callable,
                    expected: "method or function",
                    found: callable_kind,
                })
            }
        }
        let node = &mut self.nodes[argument.index()];
        node.owner = Some(callable);
        node.fqsen = fqsen;
        if callable_kind == DescriptorKind::Method {
            self.set_method(argument, callable)?;
        }
        Ok(())
    }

    /// `add_argument` followed by `push_argument`.
    pub fn add_argument_to(&mut self, callable: DescriptorId, name: &str) -> Result<DescriptorId, GraphError> {
        let id = self.add_argument(name);
        self.push_argument(callable, id)?;
        Ok(id)
    }

    /// Record a top-level element as declared in a file.
    pub fn add_to_file(&mut self, file: DescriptorId, element: DescriptorId) -> Result<(), GraphError> {
        let err = self.wrong_kind(file, "file");
        match &mut self.node_mut(file)?.details {
            Details::File(f) => {
                f.elements.push(element);
                Ok(())
            }
            _ => Err(err),
        }
    }

    fn adopt_into_namespace(&mut self, ns_fqsen: &str, child: DescriptorId) {
        let ns = self.namespace(ns_fqsen);
        self.nodes[child.index()].owner = Some(ns);
        if let Details::Namespace(n) = &mut self.nodes[ns.index()].details {
            n.children.push(child);
        }
    }

    // -- Setters --------------------------------------------------------------

    pub fn set_summary(&mut self, id: DescriptorId, summary: Option<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.summary = summary;
        Ok(())
    }

    pub fn set_description(&mut self, id: DescriptorId, description: Option<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.description = description;
        Ok(())
    }

    /// Set the argument's owning method. Used only for inheritance lookup.
    pub fn set_method(&mut self, argument: DescriptorId, method: DescriptorId) -> Result<(), GraphError> {
        self.expect_kind(method, DescriptorKind::Method)?;
        self.argument_mut(argument)?.method = Some(method);
        Ok(())
    }

    /// Record that `method` overrides or implements `inherited`.
    ///
    /// Cycles are not rejected here; readers bound their walks and
    /// `DescriptorGraph::validate` reports them.
    pub fn set_inherited_method(&mut self, method: DescriptorId, inherited: DescriptorId) -> Result<(), GraphError> {
        self.expect_kind(inherited, DescriptorKind::Method)?;
        self.method_mut(method)?.inherited = Some(inherited);
        Ok(())
    }

    pub fn set_extends(&mut self, class: DescriptorId, parent: DescriptorId) -> Result<(), GraphError> {
        self.class_fqsen(parent)?;
        self.class_mut(class)?.extends = Some(parent);
        Ok(())
    }

    pub fn add_implements(&mut self, class: DescriptorId, interface: DescriptorId) -> Result<(), GraphError> {
        self.expect_kind(interface, DescriptorKind::Interface)?;
        self.class_mut(class)?.implements.push(interface);
        Ok(())
    }

    pub fn argument_mut(&mut self, id: DescriptorId) -> Result<&mut ArgumentDescriptor, GraphError> {
        let err = self.wrong_kind(id, "argument");
        match &mut self.node_mut(id)?.details {
            Details::Argument(a) => Ok(a),
            _ => Err(err),
        }
    }

    pub fn method_mut(&mut self, id: DescriptorId) -> Result<&mut MethodDescriptor, GraphError> {
        let err = self.wrong_kind(id, "method");
        match &mut self.node_mut(id)?.details {
            Details::Method(m) => Ok(m),
            _ => Err(err),
        }
    }

    pub fn function_mut(&mut self, id: DescriptorId) -> Result<&mut FunctionDescriptor, GraphError> {
        let err = self.wrong_kind(id, "function");
        match &mut self.node_mut(id)?.details {
            Details::Function(f) => Ok(f),
            _ => Err(err),
        }
    }

    pub fn class_mut(&mut self, id: DescriptorId) -> Result<&mut ClassDescriptor, GraphError> {
        let err = self.wrong_kind(id, "class, interface or trait");
        match &mut self.node_mut(id)?.details {
            Details::ClassLike(c) => Ok(c),
            _ => Err(err),
        }
    }

    pub fn property_mut(&mut self, id: DescriptorId) -> Result<&mut PropertyDescriptor, GraphError> {
        let err = self.wrong_kind(id, "property");
        match &mut self.node_mut(id)?.details {
            Details::Property(p) => Ok(p),
            _ => Err(err),
        }
    }

    pub fn constant_mut(&mut self, id: DescriptorId) -> Result<&mut ConstantDescriptor, GraphError> {
        let err = self.wrong_kind(id, "constant");
        match &mut self.node_mut(id)?.details {
            Details::Constant(c) => Ok(c),
            _ => Err(err),
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn node_mut(&mut self, id: DescriptorId) -> Result<&mut Descriptor, GraphError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(GraphError::UnknownDescriptor(id))
    }

    /// Only call once `id` is known to exist.
    fn wrong_kind(&self, id: DescriptorId, expected: &'static str) -> GraphError {
        match self.get(id) {
            Some(node) => GraphError::WrongKind {
                id,
                expected,
                found: node.kind,
            },
            None => GraphError::UnknownDescriptor(id),
        }
    }

    fn expect_kind(&self, id: DescriptorId, kind: DescriptorKind) -> Result<(), GraphError> {
        let node = self.get(id).ok_or(GraphError::UnknownDescriptor(id))?;
        if node.kind != kind {
            return Err(GraphError::WrongKind {
                id,
                expected: kind.as_str(),
                found: node.kind,
            });
        }
        Ok(())
    }

    /// FQSEN of a class-like element, for building member names.
    fn class_fqsen(&self, id: DescriptorId) -> Result<String, GraphError> {
        let node = self.get(id).ok_or(GraphError::UnknownDescriptor(id))?;
        if !node.kind.is_class_like() {
            return Err(GraphError::WrongKind {
                id,
                expected: "class, interface or trait",
                found: node.kind,
            });
        }
        Ok(node.fqsen.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_creates_namespace() {
        let mut g = DescriptorGraph::new();
        let class = g.add_class(DescriptorKind::Class, "\\App\\Foo").unwrap();
        let ns = g.lookup("\\App").unwrap();

        assert_eq!(g.get(class).unwrap().owner(), Some(ns));
        assert_eq!(g.get(ns).unwrap().as_namespace().unwrap().children(), [class]);
        assert_eq!(g.get(class).unwrap().name(), "Foo");
    }

    #[test]
    fn member_fqsens() {
        let mut g = DescriptorGraph::new();
        let class = g.add_class(DescriptorKind::Class, "\\App\\Foo").unwrap();
        let method = g.add_method(class, "run").unwrap();
        let prop = g.add_property(class, "$size").unwrap();
        let constant = g.add_constant(class, "LIMIT").unwrap();
        let arg = g.add_argument_to(method, "count").unwrap();

        assert_eq!(g.get(method).unwrap().fqsen(), "\\App\\Foo::run()");
        assert_eq!(g.get(prop).unwrap().fqsen(), "\\App\\Foo::$size");
        assert_eq!(g.get(constant).unwrap().fqsen(), "\\App\\Foo::LIMIT");
        assert_eq!(g.get(arg).unwrap().fqsen(), "\\App\\Foo::run()::$count");
        assert_eq!(g.lookup("\\App\\Foo::run()"), Some(method));
    }

    #[test]
    fn function_fqsen_has_parens() {
        let mut g = DescriptorGraph::new();
        let f = g.add_function("\\App\\helper").unwrap();
        assert_eq!(g.get(f).unwrap().fqsen(), "\\App\\helper()");
        assert_eq!(g.get(f).unwrap().name(), "helper");
    }

    #[test]
    fn namespace_constant_fqsen() {
        let mut g = DescriptorGraph::new();
        let ns = g.namespace("\\App");
        let global = g.namespace("\\");
        let c = g.add_constant(ns, "VERSION").unwrap();
        let d = g.add_constant(global, "DEBUG").unwrap();
        assert_eq!(g.get(c).unwrap().fqsen(), "\\App\\VERSION");
        assert_eq!(g.get(d).unwrap().fqsen(), "\\DEBUG");
    }

    #[test]
    fn push_argument_sets_method_back_reference() {
        let mut g = DescriptorGraph::new();
        let class = g.add_class(DescriptorKind::Class, "\\Foo").unwrap();
        let method = g.add_method(class, "run").unwrap();
        let arg = g.add_argument_to(method, "x").unwrap();

        assert_eq!(g.argument(arg).unwrap().method(), Some(method));
        assert_eq!(g.get(method).unwrap().arguments(), [arg]);
    }

    #[test]
    fn function_arguments_have_no_method() {
        let mut g = DescriptorGraph::new();
        let f = g.add_function("\\helper").unwrap();
        let arg = g.add_argument_to(f, "x").unwrap();
        assert_eq!(g.argument(arg).unwrap().method(), None);
    }

    #[test]
    fn duplicate_fqsen_rejected() {
        let mut g = DescriptorGraph::new();
        g.add_class(DescriptorKind::Class, "\\Foo").unwrap();
        assert_eq!(
            g.add_class(DescriptorKind::Interface, "\\Foo"),
            Err(GraphError::Duplicate("\\Foo".to_string()))
        );
    }

    #[test]
    fn setters_check_kind() {
        let mut g = DescriptorGraph::new();
        let class = g.add_class(DescriptorKind::Class, "\\Foo").unwrap();
        let method = g.add_method(class, "run").unwrap();

        let err = g.set_inherited_method(method, class).unwrap_err();
        assert!(matches!(err, GraphError::WrongKind { found: DescriptorKind::Class, .. }));

        let err = g.argument_mut(method).unwrap_err();
        assert!(matches!(err, GraphError::WrongKind { expected: "argument", .. }));
    }

    #[test]
    fn add_class_rejects_non_class_kind() {
        let mut g = DescriptorGraph::new();
        assert_eq!(
            g.add_class(DescriptorKind::Method, "\\Foo"),
            Err(GraphError::NotClassLike(DescriptorKind::Method))
        );
        assert!(g.lookup("\\Foo").is_none());
    }

    #[test]
    fn class_then_namespace_of_same_name() {
        let mut g = DescriptorGraph::new();
        let query = g.add_class(DescriptorKind::Class, "\\Orm\\Query").unwrap();
        let expr = g.add_class(DescriptorKind::Class, "\\Orm\\Query\\Expr").unwrap();

        let ns = g.lookup_namespace("\\Orm\\Query").unwrap();
        assert_ne!(ns, query);
        assert_eq!(g.get(ns).unwrap().kind(), DescriptorKind::Namespace);
        assert_eq!(g.get(expr).unwrap().owner(), Some(ns));
        assert_eq!(g.get(ns).unwrap().as_namespace().unwrap().children(), [expr]);
        // Elements take precedence over namespaces.
        assert_eq!(g.lookup("\\Orm\\Query"), Some(query));
    }

    #[test]
    fn namespace_then_class_of_same_name() {
        let mut g = DescriptorGraph::new();
        let expr = g.add_class(DescriptorKind::Class, "\\Orm\\Query\\Expr").unwrap();
        let query = g.add_class(DescriptorKind::Class, "\\Orm\\Query").unwrap();

        let ns = g.lookup_namespace("\\Orm\\Query").unwrap();
        assert_eq!(g.get(expr).unwrap().owner(), Some(ns));
        assert_eq!(g.get(query).unwrap().owner(), g.lookup_namespace("\\Orm"));
        assert_eq!(g.lookup("\\Orm\\Query"), Some(query));
        assert_eq!(g.lookup("\\Orm"), g.lookup_namespace("\\Orm"));
    }

    #[test]
    fn namespace_is_never_a_class() {
        let mut g = DescriptorGraph::new();
        let class = g.add_class(DescriptorKind::Class, "\\App").unwrap();
        let ns = g.namespace("\\App");
        assert_ne!(ns, class);
        assert_eq!(g.get(ns).unwrap().kind(), DescriptorKind::Namespace);
        assert_eq!(g.namespace("\\App"), ns);

        let mut names: Vec<_> = g.namespace_names().collect();
        names.sort();
        assert_eq!(names, ["\\", "\\App"]);
    }
}
