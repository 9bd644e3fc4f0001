//! HTML renderer: standalone HTML pages with semantic markup.

use super::{
    anchor, arguments, member_sections, namespace_sections, return_types, signature, RenderContext,
    Renderer,
};
use crate::descriptor::{DescriptorId, DescriptorKind};

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render_page(&self, ctx: &RenderContext<'_>, id: DescriptorId) -> String {
        let Some(node) = ctx.graph.get(id) else {
            return String::new();
        };
        let page = ctx.page_of(id).unwrap_or_default();
        let mut out = String::new();

        match node.kind() {
            DescriptorKind::File => {
                head(&mut out, node.fqsen());
                out.push_str(&format!("<h1>{}</h1>\n", html_escape(node.fqsen())));
                let elements = node.as_file().map(|f| f.elements()).unwrap_or_default();
                if !elements.is_empty() {
                    out.push_str("<h2>Elements</h2>\n<ul>\n");
                    for &element in elements {
                        out.push_str(&format!("  <li>{}</li>\n", element_link(ctx, &page, element)));
                    }
                    out.push_str("</ul>\n");
                }
            }
            DescriptorKind::Namespace => {
                head(&mut out, node.fqsen());
                out.push_str(&format!(
                    "<h1>Namespace <code>{}</code></h1>\n",
                    html_escape(node.fqsen())
                ));
                for (title, ids) in namespace_sections(ctx.graph, id) {
                    out.push_str(&format!("<h2>{}</h2>\n", title));
                    if title == "Classes" {
                        out.push_str("<ul>\n");
                        for &child in &ids {
                            out.push_str(&format!("  <li>{}</li>\n", element_link(ctx, &page, child)));
                        }
                        out.push_str("</ul>\n");
                    } else {
                        for &child in &ids {
                            render_member(ctx, &page, child, &mut out);
                        }
                    }
                }
            }
            _ => {
                head(&mut out, node.fqsen());
                out.push_str(&format!("<h1>{}</h1>\n", html_escape(node.name())));
                out.push_str(&class_header(ctx, &page, id));
                push_docblock(ctx, id, &mut out);
                for (title, ids) in member_sections(ctx.graph, id) {
                    out.push_str(&format!("<h2>{}</h2>\n", title));
                    for &member in &ids {
                        render_member(ctx, &page, member, &mut out);
                    }
                }
            }
        }

        out.push_str("</body>\n</html>\n");
        out
    }

    fn render_index(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        head(&mut out, "API Reference");
        out.push_str("<h1>API Reference</h1>\n");
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
            out.push_str(&format!("<h2>{}</h2>\n<ul>\n", title));
            for id in ids {
                out.push_str(&format!("  <li>{}</li>\n", element_link(ctx, "index.html", id)));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</body>\n</html>\n");
        out
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

fn head(out: &mut String, title: &str) {
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    out.push_str("<style>\n");
    out.push_str("body { font-family: system-ui, sans-serif; max-width: 48em; margin: 2em auto; padding: 0 1em; }\n");
    out.push_str("code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }\n");
    out.push_str("pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }\n");
    out.push_str("dt { font-weight: bold; margin-top: 0.5em; }\n");
    out.push_str("dd { margin-left: 1.5em; }\n");
    out.push_str(".kind { display: inline-block; font-size: 0.75em; padding: 0.1em 0.4em; border-radius: 3px; background: #e8e8e8; }\n");
    out.push_str("</style>\n");
    out.push_str("</head>\n<body>\n");
}

fn class_header(ctx: &RenderContext<'_>, page: &str, id: DescriptorId) -> String {
    let Some(node) = ctx.graph.get(id) else {
        return String::new();
    };
    let mut out = format!(
        "<p><span class=\"kind\">{}</span> <code>{}</code>",
        node.kind(),
        html_escape(node.fqsen())
    );
    if let Some(class) = node.as_class() {
        if let Some(ref parent) = class.parent_name {
            out.push_str(" extends ");
            out.push_str(&name_link(ctx, page, parent));
        }
        if !class.interface_names.is_empty() {
            let names: Vec<String> = class
                .interface_names
                .iter()
                .map(|i| name_link(ctx, page, i))
                .collect();
            out.push_str(" implements ");
            out.push_str(&names.join(", "));
        }
    }
    out.push_str("</p>\n");
    out
}

fn render_member(ctx: &RenderContext<'_>, page: &str, id: DescriptorId, out: &mut String) {
    let Some(node) = ctx.graph.get(id) else {
        return;
    };
    let heading = match node.kind() {
        k if k.is_callable() => format!("{}()", node.name()),
        DescriptorKind::Property => format!("${}", node.name()),
        _ => node.name().to_string(),
    };
    match anchor(ctx, id) {
        Some(anchor) => out.push_str(&format!(
            "<h3 id=\"{}\">{}</h3>\n",
            html_escape(&anchor),
            html_escape(&heading)
        )),
        None => out.push_str(&format!("<h3>{}</h3>\n", html_escape(&heading))),
    }
    out.push_str(&format!(
        "<pre><code>{}</code></pre>\n",
        html_escape(&signature(ctx.graph, id))
    ));
    push_docblock(ctx, id, out);

    if let Some(overridden) = ctx.graph.method(id).and_then(|m| m.inherited_method()) {
        out.push_str(&format!(
            "<p><em>Overrides {}</em></p>\n",
            element_link(ctx, page, overridden)
        ));
    }

    if !node.kind().is_callable() {
        return;
    }
    let args = arguments(ctx.graph, id);
    if !args.is_empty() {
        out.push_str("<h4>Arguments</h4>\n<dl>\n");
        for arg in &args {
            out.push_str(&format!("  <dt><code>{}</code>", html_escape(&arg.name)));
            if !arg.types.is_empty() {
                out.push_str(&format!(" {}", types_links(ctx, page, arg.types)));
            }
            out.push_str("</dt>\n");
            if let Some(summary) = arg.summary {
                out.push_str(&format!("  <dd>{}</dd>\n", html_escape(summary)));
            }
        }
        out.push_str("</dl>\n");
    }
    let returns = return_types(ctx.graph, id);
    if !returns.is_empty() {
        out.push_str(&format!(
            "<h4>Returns</h4>\n<p>{}</p>\n",
            types_links(ctx, page, returns)
        ));
    }
}

fn push_docblock(ctx: &RenderContext<'_>, id: DescriptorId, out: &mut String) {
    if let Some(summary) = ctx.graph.summary(id) {
        out.push_str(&format!("<p>{}</p>\n", html_escape(summary)));
    }
    if let Some(description) = ctx.graph.description(id) {
        out.push_str(&format!("<p>{}</p>\n", html_escape(&description)));
    }
}

fn element_link(ctx: &RenderContext<'_>, page: &str, id: DescriptorId) -> String {
    let Some(node) = ctx.graph.get(id) else {
        return String::new();
    };
    link_or_code(ctx.href(page, id), node.fqsen())
}

fn name_link(ctx: &RenderContext<'_>, page: &str, name: &str) -> String {
    link_or_code(ctx.href_for_name(page, name), name)
}

fn link_or_code(href: Option<String>, text: &str) -> String {
    match href {
        Some(href) => format!("<a href=\"{}\">{}</a>", html_escape(&href), html_escape(text)),
        None => format!("<code>{}</code>", html_escape(text)),
    }
}

fn types_links(ctx: &RenderContext<'_>, page: &str, types: &[String]) -> String {
    types
        .iter()
        .map(|t| name_link(ctx, page, t))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
