//! Renderer module: trait-based format dispatch.
//!
//! Renderers turn page-owning descriptors (files, namespaces, class-like
//! elements) into documents. Every cross reference goes through the router
//! queue; anything the routers do not place is rendered as plain text.

pub mod html;
pub mod json;
pub mod markdown;

use crate::descriptor::{DescriptorGraph, DescriptorId, DescriptorKind};
use crate::router::{Router, RouterKind, RouterQueue, Subject};
use anyhow::{anyhow, Result};
use std::borrow::Cow;

/// Trait for rendering descriptors into a specific output format.
pub trait Renderer {
    /// Page for a file, namespace or class-like element.
    fn render_page(&self, ctx: &RenderContext<'_>, id: DescriptorId) -> String;
    /// Top-level index listing every page.
    fn render_index(&self, ctx: &RenderContext<'_>) -> String;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "html" => Ok(Box::new(html::HtmlRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!(
            "unknown format: {}. Use markdown, html, or json",
            format
        )),
    }
}

/// What a renderer reads: the graph plus the routers placing things.
pub struct RenderContext<'a> {
    pub graph: &'a DescriptorGraph,
    /// Decides where pages are written.
    pub pages: &'a Router,
    /// Decides where links point, consulted in order.
    pub links: &'a RouterQueue,
}

impl<'a> RenderContext<'a> {
    /// Output path of a page-owning element.
    pub fn page_of(&self, id: DescriptorId) -> Option<String> {
        let kind = self.graph.get(id)?.kind();
        if !owns_page(kind) {
            return None;
        }
        self.pages.route(&Subject::node(self.graph, id))
    }

    /// Link target for a descriptor, relative to the page being written.
    pub fn href(&self, from_page: &str, id: DescriptorId) -> Option<String> {
        let dest = self.links.route(&Subject::node(self.graph, id))?;
        Some(relative(from_page, &dest))
    }

    /// Link target for a name found in docs, e.g. a type.
    ///
    /// Documented elements route as descriptors. Anything else is only
    /// handed to the external router, so no link points at a page this run
    /// does not write.
    pub fn href_for_name(&self, from_page: &str, name: &str) -> Option<String> {
        let trimmed = name.trim_end_matches("[]");
        if let Some(id) = self.graph.lookup(trimmed) {
            return self.href(from_page, id);
        }
        let external = self.links.get(RouterKind::External)?;
        let dest = external.route(&Subject::reference(trimmed))?;
        Some(relative(from_page, &dest))
    }

    /// Every element that gets its own page, in graph order.
    pub fn page_elements(&self) -> Vec<DescriptorId> {
        self.graph
            .iter()
            .filter(|(_, d)| owns_page(d.kind()))
            .map(|(id, _)| id)
            .collect()
    }
}

fn owns_page(kind: DescriptorKind) -> bool {
    matches!(kind, DescriptorKind::File | DescriptorKind::Namespace) || kind.is_class_like()
}

/// Rewrite a root-relative destination so it works from `from_page`.
/// URLs are left alone.
pub fn relative(from_page: &str, dest: &str) -> String {
    if dest.contains("://") {
        return dest.to_string();
    }
    if let Some(anchor) = dest.strip_prefix('#') {
        return format!("#{}", anchor);
    }
    let (page, anchor) = match dest.split_once('#') {
        Some((page, anchor)) => (page, Some(anchor)),
        None => (dest, None),
    };
    let from_dir = from_page.rsplit_once('/').map(|(dir, _)| dir);
    let target = match (from_dir, page.rsplit_once('/')) {
        // Same directory: link by file name only.
        (Some(from), Some((dir, file))) if from == dir => file.to_string(),
        (Some(from), _) => format!("{}{}", "../".repeat(from.split('/').count()), page),
        (None, _) => page.to_string(),
    };
    match anchor {
        Some(anchor) if target.is_empty() => format!("#{}", anchor),
        Some(anchor) => format!("{}#{}", target, anchor),
        None => target,
    }
}

// -- Shared views -------------------------------------------------------------

/// One argument, with inherited types already resolved.
pub struct ArgumentView<'a> {
    pub name: Cow<'a, str>,
    pub types: &'a [String],
    pub default: Option<&'a str>,
    pub by_reference: bool,
    pub variadic: bool,
    pub summary: Option<&'a str>,
}

impl ArgumentView<'_> {
    /// `int|null &...$name = 2`
    pub fn signature(&self) -> String {
        let mut out = String::new();
        if !self.types.is_empty() {
            out.push_str(&self.types.join("|"));
            out.push(' ');
        }
        if self.by_reference {
            out.push('&');
        }
        if self.variadic {
            out.push_str("...");
        }
        out.push_str(&self.name);
        if let Some(default) = self.default {
            out.push_str(" = ");
            out.push_str(default);
        }
        out
    }
}

pub fn arguments(graph: &DescriptorGraph, callable: DescriptorId) -> Vec<ArgumentView<'_>> {
    let Some(node) = graph.get(callable) else {
        return Vec::new();
    };
    node.arguments()
        .iter()
        .filter_map(|&id| {
            let d = graph.get(id)?;
            let a = d.as_argument()?;
            Some(ArgumentView {
                name: d.display_name(),
                types: graph.types(id),
                default: a.default_value(),
                by_reference: a.is_by_reference(),
                variadic: a.is_variadic(),
                summary: graph.summary(id),
            })
        })
        .collect()
}

/// Return types of a method (inherited when unset) or a function.
pub fn return_types(graph: &DescriptorGraph, callable: DescriptorId) -> &[String] {
    match graph.get(callable).map(|d| d.kind()) {
        Some(DescriptorKind::Method) => graph.return_types(callable),
        Some(DescriptorKind::Function) => graph
            .get(callable)
            .and_then(|d| d.as_function())
            .map(|f| f.returns.as_slice())
            .unwrap_or_default(),
        _ => &[],
    }
}

/// One-line declaration of a member or function, without links.
pub fn signature(graph: &DescriptorGraph, id: DescriptorId) -> String {
    let Some(node) = graph.get(id) else {
        return String::new();
    };
    match node.kind() {
        DescriptorKind::Method | DescriptorKind::Function => {
            let mut out = String::new();
            if let Some(m) = node.as_method() {
                out.push_str(m.visibility.as_str());
                out.push(' ');
                for (flag, word) in [
                    (m.is_abstract, "abstract "),
                    (m.is_final, "final "),
                    (m.is_static, "static "),
                ] {
                    if flag {
                        out.push_str(word);
                    }
                }
            }
            let args: Vec<String> = arguments(graph, id).iter().map(ArgumentView::signature).collect();
            out.push_str(&format!("{}({})", node.name(), args.join(", ")));
            let returns = return_types(graph, id);
            if !returns.is_empty() {
                out.push_str(": ");
                out.push_str(&returns.join("|"));
            }
            out
        }
        DescriptorKind::Property => {
            let Some(p) = node.as_property() else {
                return String::new();
            };
            let mut out = format!("{} ", p.visibility.as_str());
            if p.is_static {
                out.push_str("static ");
            }
            if !p.types.is_empty() {
                out.push_str(&p.types.join("|"));
                out.push(' ');
            }
            out.push('$');
            out.push_str(node.name());
            if let Some(ref default) = p.default {
                out.push_str(" = ");
                out.push_str(default);
            }
            out
        }
        DescriptorKind::Constant => match node.as_constant().and_then(|c| c.value.as_deref()) {
            Some(value) => format!("{} = {}", node.name(), value),
            None => node.name().to_string(),
        },
        _ => node.fqsen().to_string(),
    }
}

/// Members of a class-like element grouped as (title, ids).
pub fn member_sections(graph: &DescriptorGraph, class: DescriptorId) -> Vec<(&'static str, Vec<DescriptorId>)> {
    let Some(c) = graph.class(class) else {
        return Vec::new();
    };
    [
        ("Constants", c.constants()),
        ("Properties", c.properties()),
        ("Methods", c.methods()),
    ]
    .into_iter()
    .filter(|(_, ids)| !ids.is_empty())
    .map(|(title, ids)| (title, ids.to_vec()))
    .collect()
}

/// Children of a namespace grouped as (title, ids).
pub fn namespace_sections(graph: &DescriptorGraph, ns: DescriptorId) -> Vec<(&'static str, Vec<DescriptorId>)> {
    let Some(n) = graph.get(ns).and_then(|d| d.as_namespace()) else {
        return Vec::new();
    };
    let pick = |pred: fn(DescriptorKind) -> bool| -> Vec<DescriptorId> {
        n.children()
            .iter()
            .copied()
            .filter(|&id| graph.get(id).is_some_and(|d| pred(d.kind())))
            .collect()
    };
    [
        ("Classes", pick(DescriptorKind::is_class_like)),
        ("Functions", pick(|k| k == DescriptorKind::Function)),
        ("Constants", pick(|k| k == DescriptorKind::Constant)),
    ]
    .into_iter()
    .filter(|(_, ids)| !ids.is_empty())
    .collect()
}

/// Anchor of a member inside its page, taken from the page router.
pub fn anchor(ctx: &RenderContext<'_>, id: DescriptorId) -> Option<String> {
    let dest = ctx.pages.route(&Subject::node(ctx.graph, id))?;
    dest.split_once('#').map(|(_, anchor)| anchor.to_string())
}

/// Shared fixture for renderer tests.
#[cfg(test)]
pub(crate) mod fixture {
    use crate::descriptor::DescriptorGraph;
    use crate::parser::{parse, Populator};
    use crate::router::{ExternalLink, ExternalRouter, Router, RouterQueue, StandardRouter};

    pub const MANIFEST: &str = r#"{
        "files": [{
            "path": "src/Geo.php",
            "namespace": "\\Geo",
            "constants": [{ "name": "PI", "value": "3.14159" }],
            "functions": [{ "fqsen": "\\Geo\\distance", "returns": ["float"], "summary": "Distance between points.",
                            "arguments": [{ "name": "a", "types": ["\\Geo\\Point"] }, { "name": "b", "types": ["\\Geo\\Point"] }] }],
            "classes": [
                { "fqsen": "\\Geo\\Shape", "kind": "interface", "summary": "Anything with an area.",
                  "methods": [{ "name": "area", "summary": "Area of the shape.", "returns": ["float"],
                                "arguments": [{ "name": "precision", "types": ["int"], "default": "2" }] }] },
                { "fqsen": "\\Geo\\Point", "summary": "A point." },
                { "fqsen": "\\Geo\\Circle", "implements": ["\\Geo\\Shape"], "extends": "\\Psr\\Base",
                  "description": "A round <shape>.",
                  "constants": [{ "name": "SIDES", "value": "0" }],
                  "properties": [{ "name": "radius", "types": ["float"], "visibility": "private" }],
                  "methods": [
                    { "name": "area", "arguments": [{ "name": "precision" }] },
                    { "name": "log", "is_static": true,
                      "arguments": [{ "name": "logger", "types": ["\\Psr\\Log\\LoggerInterface"] },
                                    { "name": "items", "types": ["string"], "variadic": true }] }
                  ] }
            ]
        }]
    }"#;

    pub struct Fixture {
        pub graph: DescriptorGraph,
        pub pages: Router,
        pub links: RouterQueue,
    }

    pub fn fixture(ext: &str) -> Fixture {
        let mut populator = Populator::new();
        populator.add_manifest(parse(MANIFEST).unwrap()).unwrap();
        let graph = populator.finish();

        let external = ExternalRouter::new(vec![ExternalLink::new(
            "\\Psr",
            "https://psr.example/{FQSEN}",
        )]);
        let mut links = RouterQueue::new();
        links.push(Router::configure("external", &external));
        links.push(Router::configure("standard", &StandardRouter::new(ext)));

        Fixture {
            graph,
            pages: Router::configure("standard", &StandardRouter::new(ext)),
            links,
        }
    }

    impl Fixture {
        pub fn ctx(&self) -> super::RenderContext<'_> {
            super::RenderContext {
                graph: &self.graph,
                pages: &self.pages,
                links: &self.links,
            }
        }
    }
}
