//! Routes for pages generated locally.
//!
//! Class-like elements, namespaces and files get a page of their own;
//! members and functions are anchors on their owner's page:
//!
//! | subject               | destination                          |
//! |-----------------------|--------------------------------------|
//! | `src/Foo.php`         | `files/src.Foo.php.html`             |
//! | `\App`                | `namespaces/App.html`                |
//! | `\App\Foo`            | `classes/App.Foo.html`               |
//! | `\App\helper()`       | `namespaces/App.html#function_helper`|
//! | `\App\Foo::run()`     | `classes/App.Foo.html#method_run`    |
//! | `\App\Foo::$size`     | `classes/App.Foo.html#property_size` |
//! | `\App\Foo::LIMIT`     | `classes/App.Foo.html#constant_LIMIT`|
//!
//! Reference strings are classified by shape and routed the same way.
//! Shape alone cannot tell `\App` or `\App\VERSION` from a class, so a
//! router built [`with_graph`](StandardRouter::with_graph) also knows the
//! graph's namespaces and namespace constants.

use super::{Rule, RuleSet, Subject};
use crate::descriptor::{split_namespace, DescriptorGraph, DescriptorKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

static RE_METHOD_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\\[\w\\]*\w)::(\w+)\(\)$").unwrap());

static RE_PROPERTY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\\[\w\\]*\w)::\$(\w+)$").unwrap());

static RE_CONSTANT_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\\[\w\\]*\w)::(\w+)$").unwrap());

static RE_FUNCTION_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\\(?:[\w\\]*\w\\)?)(\w+)\(\)$").unwrap());

static RE_CLASS_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\[\w\\]*\w$").unwrap());

/// Router for the pages this pipeline writes itself.
#[derive(Debug, Clone)]
pub struct StandardRouter {
    extension: String,
    namespaces: Arc<HashSet<String>>,
    namespace_constants: Arc<HashSet<String>>,
}

impl StandardRouter {
    /// `extension` is the page file extension, without the dot.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            namespaces: Arc::default(),
            namespace_constants: Arc::default(),
        }
    }

    /// Route references to the graph's namespaces and namespace constants
    /// to namespace pages. A namespace shadowed by a class-like element of
    /// the same name keeps routing to the class page.
    pub fn with_graph(mut self, graph: &DescriptorGraph) -> Self {
        let namespaces: HashSet<String> = graph
            .namespace_names()
            .filter(|name| graph.lookup(name) == graph.lookup_namespace(name))
            .map(str::to_string)
            .collect();
        let constants: HashSet<String> = graph
            .of_kind(DescriptorKind::Constant)
            .filter(|(_, d)| {
                d.owner()
                    .and_then(|owner| graph.get(owner))
                    .is_some_and(|owner| owner.kind() == DescriptorKind::Namespace)
            })
            .map(|(_, d)| d.fqsen().to_string())
            .collect();
        self.namespaces = Arc::new(namespaces);
        self.namespace_constants = Arc::new(constants);
        self
    }
}

impl Default for StandardRouter {
    fn default() -> Self {
        Self::new("html")
    }
}

impl RuleSet for StandardRouter {
    fn rules(&self) -> Vec<Rule> {
        let ext = self.extension.clone();
        let mut rules = Vec::new();

        let e = ext.clone();
        rules.push(Rule::for_kind(DescriptorKind::File, move |s| {
            let path = s.descriptor()?.as_file()?.path.as_str();
            Some(file_page(path, &e))
        }));

        let e = ext.clone();
        rules.push(Rule::for_kind(DescriptorKind::Namespace, move |s| {
            Some(namespace_page(s.fqsen()?, &e))
        }));

        let e = ext.clone();
        rules.push(Rule::new(
            "class-like",
            |s| s.kind().is_some_and(DescriptorKind::is_class_like),
            move |s| Some(class_page(s.fqsen()?, &e)),
        ));

        let e = ext.clone();
        rules.push(Rule::for_kind(DescriptorKind::Function, move |s| {
            let d = s.descriptor()?;
            let (ns, _) = split_namespace(d.fqsen());
            Some(format!("{}#function_{}", namespace_page(ns, &e), d.name()))
        }));

        for (kind, prefix) in [
            (DescriptorKind::Method, "method"),
            (DescriptorKind::Property, "property"),
            (DescriptorKind::Constant, "constant"),
        ] {
            let e = ext.clone();
            rules.push(Rule::for_kind(kind, move |s| {
                let owner = s.owner()?;
                let page = match owner.kind() {
                    DescriptorKind::Namespace => namespace_page(owner.fqsen(), &e),
                    _ => class_page(owner.fqsen(), &e),
                };
                Some(format!("{}#{}_{}", page, prefix, s.descriptor()?.name()))
            }));
        }

        for (label, re, prefix) in [
            ("method-ref", &RE_METHOD_REF, "method"),
            ("property-ref", &RE_PROPERTY_REF, "property"),
            ("constant-ref", &RE_CONSTANT_REF, "constant"),
        ] {
            let e = ext.clone();
            rules.push(Rule::new(
                label,
                move |s| s.as_reference().is_some_and(|r| re.is_match(r)),
                move |s| {
                    let caps = re.captures(s.as_reference()?)?;
                    Some(format!("{}#{}_{}", class_page(&caps[1], &e), prefix, &caps[2]))
                },
            ));
        }

        let e = ext.clone();
        rules.push(Rule::new(
            "function-ref",
            |s| s.as_reference().is_some_and(|r| RE_FUNCTION_REF.is_match(r)),
            move |s| {
                let caps = RE_FUNCTION_REF.captures(s.as_reference()?)?;
                let ns = caps[1].trim_end_matches('\\');
                Some(format!("{}#function_{}", namespace_page(ns, &e), &caps[2]))
            },
        ));

        let known = Arc::clone(&self.namespaces);
        let e = ext.clone();
        rules.push(Rule::new(
            "namespace-ref",
            move |s| s.as_reference().is_some_and(|r| known.contains(r)),
            move |s| Some(namespace_page(s.as_reference()?, &e)),
        ));

        let known = Arc::clone(&self.namespace_constants);
        let e = ext.clone();
        rules.push(Rule::new(
            "namespace-constant-ref",
            move |s| s.as_reference().is_some_and(|r| known.contains(r)),
            move |s| {
                let (ns, name) = split_namespace(s.as_reference()?);
                Some(format!("{}#constant_{}", namespace_page(ns, &e), name))
            },
        ));

        rules.push(Rule::new(
            "class-ref",
            |s| s.as_reference().is_some_and(|r| RE_CLASS_REF.is_match(r)),
            move |s| Some(class_page(s.as_reference()?, &ext)),
        ));

        rules
    }
}

/// `\App\Model` → `App.Model`
fn dotted(fqsen: &str) -> String {
    fqsen.trim_start_matches('\\').replace('\\', ".")
}

fn class_page(fqsen: &str, ext: &str) -> String {
    format!("classes/{}.{}", dotted(fqsen), ext)
}

/// The global namespace is written as `default`.
fn namespace_page(fqsen: &str, ext: &str) -> String {
    let name = dotted(fqsen);
    let name = if name.is_empty() { "default".to_string() } else { name };
    format!("namespaces/{}.{}", name, ext)
}

fn file_page(path: &str, ext: &str) -> String {
    let path = path.trim_start_matches("./").trim_start_matches('/');
    format!("files/{}.{}", path.replace('/', "."), ext)
}
