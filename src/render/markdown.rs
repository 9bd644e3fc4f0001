//! GitHub-flavored markdown renderer.
//!
//! Members get explicit `<a id>` anchors so links produced by the router
//! resolve no matter how headings are slugged.

use super::{
    anchor, arguments, member_sections, namespace_sections, return_types, signature, RenderContext,
    Renderer,
};
use crate::descriptor::{DescriptorId, DescriptorKind};

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render_page(&self, ctx: &RenderContext<'_>, id: DescriptorId) -> String {
        let Some(node) = ctx.graph.get(id) else {
            return String::new();
        };
        let page = ctx.page_of(id).unwrap_or_default();
        let mut lines: Vec<String> = Vec::new();

        match node.kind() {
            DescriptorKind::File => {
                lines.push(format!("# {}\n", node.fqsen()));
                let elements = node.as_file().map(|f| f.elements()).unwrap_or_default();
                if !elements.is_empty() {
                    lines.push("## Elements\n".to_string());
                    for &element in elements {
                        lines.push(format!("* {}", element_link(ctx, &page, element)));
                    }
                    lines.push(String::new());
                }
            }
            DescriptorKind::Namespace => {
                lines.push(format!("# Namespace `{}`\n", node.fqsen()));
                for (title, ids) in namespace_sections(ctx.graph, id) {
                    lines.push(format!("## {}\n", title));
                    if title == "Classes" {
                        for &child in &ids {
                            lines.push(format!("* {}", element_link(ctx, &page, child)));
                        }
                        lines.push(String::new());
                    } else {
                        for &child in &ids {
                            render_member(ctx, &page, child, &mut lines);
                        }
                    }
                }
            }
            _ => {
                lines.push(format!("# {}\n", node.name()));
                lines.push(class_header(ctx, &page, id));
                lines.push(String::new());
                push_docblock(ctx, id, &mut lines);
                for (title, ids) in member_sections(ctx.graph, id) {
                    lines.push(format!("## {}\n", title));
                    for &member in &ids {
                        render_member(ctx, &page, member, &mut lines);
                    }
                }
            }
        }

        let mut output = lines.join("\n");
        if !output.ends_with('\n') {
            output.push('\n');
        }
        output
    }

    fn render_index(&self, ctx: &RenderContext<'_>) -> String {
        let mut lines = vec!["# API Reference\n".to_string()];
        for (title, kind) in [
            ("Namespaces", DescriptorKind::Namespace),
            ("Classes", DescriptorKind::Class),
            ("Interfaces", DescriptorKind::Interface),
            ("Traits", DescriptorKind::Trait),
            ("Files", DescriptorKind::File),
        ] {
            let ids: Vec<DescriptorId> = ctx.graph.of_kind(kind).map(|(id, _)| id).collect();
            if ids.is_empty() {
                continue;
            }
            lines.push(format!("## {}\n", title));
            for id in ids {
                lines.push(format!("* {}", element_link(ctx, "index.md", id)));
            }
            lines.push(String::new());
        }
        lines.join("\n")
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

/// `> class `\Geo\Circle` extends ... implements ...`
fn class_header(ctx: &RenderContext<'_>, page: &str, id: DescriptorId) -> String {
    let Some(node) = ctx.graph.get(id) else {
        return String::new();
    };
    let mut header = format!("> {} `{}`", node.kind(), node.fqsen());
    if let Some(class) = node.as_class() {
        if let Some(ref parent) = class.parent_name {
            header.push_str(" extends ");
            header.push_str(&name_link(ctx, page, parent));
        }
        if !class.interface_names.is_empty() {
            let names: Vec<String> = class
                .interface_names
                .iter()
                .map(|i| name_link(ctx, page, i))
                .collect();
            header.push_str(" implements ");
            header.push_str(&names.join(", "));
        }
    }
    header
}

fn render_member(ctx: &RenderContext<'_>, page: &str, id: DescriptorId, lines: &mut Vec<String>) {
    let Some(node) = ctx.graph.get(id) else {
        return;
    };
    if let Some(anchor) = anchor(ctx, id) {
        lines.push(format!("<a id=\"{}\"></a>", anchor));
    }
    let heading = if node.kind().is_callable() {
        format!("{}()", node.name())
    } else if node.kind() == DescriptorKind::Property {
        format!("${}", node.name())
    } else {
        node.name().to_string()
    };
    lines.push(format!("### {}\n", heading));
    lines.push("```".to_string());
    lines.push(signature(ctx.graph, id));
    lines.push("```\n".to_string());
    push_docblock(ctx, id, lines);

    if let Some(overridden) = ctx.graph.method(id).and_then(|m| m.inherited_method()) {
        let link = element_link(ctx, page, overridden);
        lines.push(format!("_Overrides {}_\n", link));
    }

    if node.kind().is_callable() {
        let args = arguments(ctx.graph, id);
        if !args.is_empty() {
            lines.push("#### Arguments\n".to_string());
            for arg in &args {
                let mut item = format!("* **{}**", arg.name);
                if !arg.types.is_empty() {
                    item.push_str(&format!(" ({})", types_links(ctx, page, arg.types)));
                }
                if let Some(summary) = arg.summary {
                    item.push_str(": ");
                    item.push_str(summary);
                }
                lines.push(item);
            }
            lines.push(String::new());
        }
        let returns = return_types(ctx.graph, id);
        if !returns.is_empty() {
            lines.push("#### Returns\n".to_string());
            lines.push(format!("* {}\n", types_links(ctx, page, returns)));
        }
    }
}

fn push_docblock(ctx: &RenderContext<'_>, id: DescriptorId, lines: &mut Vec<String>) {
    if let Some(summary) = ctx.graph.summary(id) {
        lines.push(summary.to_string());
        lines.push(String::new());
    }
    if let Some(description) = ctx.graph.description(id) {
        lines.push(description.into_owned());
        lines.push(String::new());
    }
}

/// Link to a descriptor, or its FQSEN in code when nothing routes it.
fn element_link(ctx: &RenderContext<'_>, page: &str, id: DescriptorId) -> String {
    let Some(node) = ctx.graph.get(id) else {
        return String::new();
    };
    match ctx.href(page, id) {
        Some(href) => format!("[{}]({})", escape(node.fqsen()), href),
        None => format!("`{}`", node.fqsen()),
    }
}

fn name_link(ctx: &RenderContext<'_>, page: &str, name: &str) -> String {
    match ctx.href_for_name(page, name) {
        Some(href) => format!("[{}]({})", escape(name), href),
        None => format!("`{}`", name),
    }
}

fn types_links(ctx: &RenderContext<'_>, page: &str, types: &[String]) -> String {
    types
        .iter()
        .map(|t| name_link(ctx, page, t))
        .collect::<Vec<_>>()
        .join(" \\| ")
}

/// Escape characters that markdown reads as markup inside link text.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']' | '*' | '_' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixture::fixture;

    fn page(fqsen: &str) -> String {
        let f = fixture("md");
        let id = f.graph.lookup(fqsen).unwrap();
        MarkdownRenderer.render_page(&f.ctx(), id)
    }

    #[test]
    fn class_page_has_member_anchors() {
        let out = page("\\Geo\\Circle");
        assert!(out.starts_with("# Circle\n"));
        assert!(out.contains("<a id=\"method_area\"></a>"));
        assert!(out.contains("<a id=\"property_radius\"></a>"));
        assert!(out.contains("<a id=\"constant_SIDES\"></a>"));
    }

    #[test]
    fn class_page_shows_inherited_docs() {
        let out = page("\\Geo\\Circle");
        assert!(out.contains("Area of the shape."));
        assert!(out.contains("public area(int $precision): float"));
        assert!(out.contains("_Overrides [\\\\Geo\\\\Shape::area()](Geo.Shape.md#method_area)_"));
    }

    #[test]
    fn class_header_links_parents() {
        let out = page("\\Geo\\Circle");
        assert!(out.contains("extends [\\\\Psr\\\\Base](https://psr.example/Psr/Base)"));
        assert!(out.contains("implements [\\\\Geo\\\\Shape](Geo.Shape.md)"));
    }

    #[test]
    fn argument_types_link_out() {
        let out = page("\\Geo\\Circle");
        assert!(out.contains(
            "* **$logger** ([\\\\Psr\\\\Log\\\\LoggerInterface](https://psr.example/Psr/Log/LoggerInterface))"
        ));
        assert!(out.contains("* **$items** (`string`)"));
    }

    #[test]
    fn namespace_page_lists_classes_and_functions() {
        let out = page("\\Geo");
        assert!(out.contains("## Classes"));
        assert!(out.contains("[\\\\Geo\\\\Circle](../classes/Geo.Circle.md)"));
        assert!(out.contains("<a id=\"function_distance\"></a>"));
        assert!(out.contains("<a id=\"constant_PI\"></a>"));
        assert!(out.contains("Distance between points."));
    }

    #[test]
    fn file_page_links_elements() {
        let out = page("src/Geo.php");
        assert!(out.starts_with("# src/Geo.php\n"));
        assert!(out.contains("[\\\\Geo\\\\Shape](../classes/Geo.Shape.md)"));
        assert!(out.contains("[\\\\Geo\\\\distance()](../namespaces/Geo.md#function_distance)"));
    }

    #[test]
    fn index_lists_pages() {
        let f = fixture("md");
        let out = MarkdownRenderer.render_index(&f.ctx());
        assert!(out.starts_with("# API Reference\n"));
        assert!(out.contains("## Interfaces"));
        assert!(out.contains("[\\\\Geo\\\\Shape](classes/Geo.Shape.md)"));
        assert!(out.contains("[src/Geo.php](files/src.Geo.php.md)"));
    }

    #[test]
    fn link_text_is_escaped() {
        assert_eq!(escape("\\Geo\\Circle"), "\\\\Geo\\\\Circle");
        assert_eq!(escape("Shape[]"), "Shape\\[\\]");
        assert_eq!(escape("\\Geo\\get_area*"), "\\\\Geo\\\\get\\_area\\*");
        assert_eq!(escape("`tick`"), "\\`tick\\`");
    }
}
