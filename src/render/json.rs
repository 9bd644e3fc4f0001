//! JSON renderer: structured output for tooling integration.
//!
//! Values are resolved the same way the text renderers see them, so
//! inherited types and summaries appear as if they were declared locally.

use super::{
    anchor, arguments, member_sections, namespace_sections, return_types, signature, RenderContext,
    Renderer,
};
use crate::descriptor::{DescriptorId, DescriptorKind};
use serde_json::{json, Map, Value};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render_page(&self, ctx: &RenderContext<'_>, id: DescriptorId) -> String {
        let Some(node) = ctx.graph.get(id) else {
            return String::new();
        };
        let page = ctx.page_of(id).unwrap_or_default();
        let mut doc = element(ctx, &page, id);

        match node.kind() {
            DescriptorKind::File => {
                let elements: Vec<Value> = node
                    .as_file()
                    .map(|f| f.elements())
                    .unwrap_or_default()
                    .iter()
                    .map(|&e| reference(ctx, &page, e))
                    .collect();
                doc.insert("elements".into(), Value::Array(elements));
            }
            DescriptorKind::Namespace => {
                for (title, ids) in namespace_sections(ctx.graph, id) {
                    let values: Vec<Value> = if title == "Classes" {
                        ids.iter().map(|&c| reference(ctx, &page, c)).collect()
                    } else {
                        ids.iter().map(|&m| Value::Object(member(ctx, &page, m))).collect()
                    };
                    doc.insert(title.to_lowercase(), Value::Array(values));
                }
            }
            _ => {
                if let Some(class) = node.as_class() {
                    doc.insert("extends".into(), json!(class.parent_name));
                    doc.insert("implements".into(), json!(class.interface_names));
                    doc.insert("abstract".into(), json!(class.is_abstract));
                    doc.insert("final".into(), json!(class.is_final));
                }
                for (title, ids) in member_sections(ctx.graph, id) {
                    let values: Vec<Value> =
                        ids.iter().map(|&m| Value::Object(member(ctx, &page, m))).collect();
                    doc.insert(title.to_lowercase(), Value::Array(values));
                }
            }
        }

        pretty(&Value::Object(doc))
    }

    fn render_index(&self, ctx: &RenderContext<'_>) -> String {
        let pages: Vec<Value> = ctx
            .page_elements()
            .into_iter()
            .filter_map(|id| {
                let node = ctx.graph.get(id)?;
                Some(json!({
                    "kind": node.kind(),
                    "fqsen": node.fqsen(),
                    "path": ctx.page_of(id),
                }))
            })
            .collect();
        pretty(&json!({ "pages": pages }))
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn pretty(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
    out.push('\n');
    out
}

/// Fields every element shares.
fn element(ctx: &RenderContext<'_>, page: &str, id: DescriptorId) -> Map<String, Value> {
    let mut map = Map::new();
    let Some(node) = ctx.graph.get(id) else {
        return map;
    };
    map.insert("kind".into(), json!(node.kind()));
    map.insert("name".into(), json!(node.name()));
    map.insert("fqsen".into(), json!(node.fqsen()));
    map.insert("summary".into(), json!(ctx.graph.summary(id)));
    map.insert("description".into(), json!(ctx.graph.description(id)));
    if !page.is_empty() {
        map.insert("path".into(), json!(page));
    }
    map
}

fn reference(ctx: &RenderContext<'_>, page: &str, id: DescriptorId) -> Value {
    let Some(node) = ctx.graph.get(id) else {
        return Value::Null;
    };
    json!({
        "kind": node.kind(),
        "fqsen": node.fqsen(),
        "href": ctx.href(page, id),
    })
}

fn member(ctx: &RenderContext<'_>, page: &str, id: DescriptorId) -> Map<String, Value> {
    let mut map = element(ctx, "", id);
    map.insert("anchor".into(), json!(anchor(ctx, id)));
    map.insert("signature".into(), json!(signature(ctx.graph, id)));

    let Some(node) = ctx.graph.get(id) else {
        return map;
    };
    if node.kind().is_callable() {
        let args: Vec<Value> = arguments(ctx.graph, id)
            .iter()
            .map(|a| {
                json!({
                    "name": a.name,
                    "types": a.types,
                    "default": a.default,
                    "by_reference": a.by_reference,
                    "variadic": a.variadic,
                    "summary": a.summary,
                })
            })
            .collect();
        map.insert("arguments".into(), Value::Array(args));
        map.insert("returns".into(), json!(return_types(ctx.graph, id)));
    }
    if let Some(overridden) = ctx.graph.method(id).and_then(|m| m.inherited_method()) {
        map.insert("overrides".into(), reference(ctx, page, overridden));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixture::fixture;

    fn page(fqsen: &str) -> Value {
        let f = fixture("json");
        let id = f.graph.lookup(fqsen).unwrap();
        serde_json::from_str(&JsonRenderer.render_page(&f.ctx(), id)).unwrap()
    }

    #[test]
    fn class_page_structure() {
        let doc = page("\\Geo\\Circle");
        assert_eq!(doc["kind"], "class");
        assert_eq!(doc["fqsen"], "\\Geo\\Circle");
        assert_eq!(doc["path"], "classes/Geo.Circle.json");
        assert_eq!(doc["extends"], "\\Psr\\Base");
        assert_eq!(doc["implements"][0], "\\Geo\\Shape");
    }

    #[test]
    fn methods_are_resolved() {
        let doc = page("\\Geo\\Circle");
        let area = &doc["methods"][0];
        assert_eq!(area["name"], "area");
        assert_eq!(area["anchor"], "method_area");
        assert_eq!(area["summary"], "Area of the shape.");
        assert_eq!(area["returns"][0], "float");
        assert_eq!(area["arguments"][0]["name"], "$precision");
        assert_eq!(area["arguments"][0]["types"][0], "int");
        assert_eq!(area["arguments"][0]["default"], Value::Null);
        assert_eq!(area["overrides"]["href"], "Geo.Shape.json#method_area");
    }

    #[test]
    fn variadic_flag() {
        let doc = page("\\Geo\\Circle");
        let log = &doc["methods"][1];
        assert_eq!(log["arguments"][1]["variadic"], true);
        assert_eq!(log["arguments"][1]["by_reference"], false);
    }

    #[test]
    fn namespace_page_sections() {
        let doc = page("\\Geo");
        assert_eq!(doc["kind"], "namespace");
        assert_eq!(doc["classes"].as_array().unwrap().len(), 3);
        assert_eq!(doc["functions"][0]["anchor"], "function_distance");
        assert_eq!(doc["constants"][0]["signature"], "PI = 3.14159");
    }

    #[test]
    fn index_lists_every_page() {
        let f = fixture("json");
        let index: Value = serde_json::from_str(&JsonRenderer.render_index(&f.ctx())).unwrap();
        let pages = index["pages"].as_array().unwrap();
        // file, namespace, three class-likes
        assert_eq!(pages.len(), 5);
        assert!(pages.iter().any(|p| p["path"] == "files/src.Geo.php.json"));
    }
}
