//! JSON manifest format and the populator that loads it.
//!
//! ```json
//! { "files": [ {
//!     "path": "src/Shape.php",
//!     "namespace": "\\Geo",
//!     "classes": [ {
//!         "fqsen": "\\Geo\\Circle", "kind": "class", "extends": "\\Geo\\Shape",
//!         "methods": [ { "name": "area", "returns": ["float"],
//!                        "arguments": [ { "name": "precision", "types": ["int"] } ] } ]
//!     } ],
//!     "functions": [], "constants": []
//! } ] }
//! ```

use super::link::{self, PendingLink};
use super::ManifestError;
use crate::descriptor::{DescriptorGraph, DescriptorId, DescriptorKind, Visibility};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileEntry {
    pub path: String,
    /// Namespace of file-level constants.
    pub namespace: Option<String>,
    pub classes: Vec<ClassEntry>,
    pub functions: Vec<FunctionEntry>,
    pub constants: Vec<ConstantEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ClassEntry {
    pub fqsen: String,
    #[serde(default = "class_kind")]
    pub kind: DescriptorKind,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
    #[serde(default)]
    pub constants: Vec<ConstantEntry>,
}

fn class_kind() -> DescriptorKind {
    DescriptorKind::Class
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MethodEntry {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentEntry>,
    pub returns: Vec<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    /// FQSEN of the method this one overrides, when known upstream.
    pub overrides: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArgumentEntry {
    pub name: String,
    pub summary: Option<String>,
    pub types: Vec<String>,
    pub default: Option<String>,
    pub by_reference: bool,
    pub variadic: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FunctionEntry {
    pub fqsen: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentEntry>,
    pub returns: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PropertyEntry {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub types: Vec<String>,
    pub default: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConstantEntry {
    pub name: String,
    pub summary: Option<String>,
    pub value: Option<String>,
}

/// Builds a descriptor graph from one or more manifests.
#[derive(Default)]
pub struct Populator {
    graph: DescriptorGraph,
    pending: Vec<PendingLink>,
}

impl Populator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_manifest(&mut self, manifest: Manifest) -> Result<(), ManifestError> {
        for file in manifest.files {
            self.add_file(file)?;
        }
        Ok(())
    }

    /// Link inheritance and hand over the finished graph.
    pub fn finish(mut self) -> DescriptorGraph {
        link::link(&mut self.graph, self.pending);
        self.graph
    }

    fn add_file(&mut self, file: FileEntry) -> Result<(), ManifestError> {
        debug!(path = %file.path, classes = file.classes.len(), "loading file");
        let file_id = self.graph.add_file(&file.path)?;

        for class in file.classes {
            let id = self.add_class(class)?;
            self.graph.add_to_file(file_id, id)?;
        }

        for function in file.functions {
            let id = self.graph.add_function(&normalize_fqsen(&function.fqsen))?;
            self.graph.set_summary(id, function.summary)?;
            self.graph.set_description(id, function.description)?;
            self.graph.function_mut(id)?.returns = normalize_types(&function.returns);
            self.add_arguments(id, function.arguments)?;
            self.graph.add_to_file(file_id, id)?;
        }

        if !file.constants.is_empty() {
            let ns_fqsen = file
                .namespace
                .as_deref()
                .map(normalize_fqsen)
                .unwrap_or_else(|| "\\".to_string());
            let ns = self.graph.namespace(&ns_fqsen);
            for constant in file.constants {
                let id = self.add_constant(ns, constant)?;
                self.graph.add_to_file(file_id, id)?;
            }
        }
        Ok(())
    }

    fn add_class(&mut self, entry: ClassEntry) -> Result<DescriptorId, ManifestError> {
        let id = self.graph.add_class(entry.kind, &normalize_fqsen(&entry.fqsen))?;
        self.graph.set_summary(id, entry.summary)?;
        self.graph.set_description(id, entry.description)?;

        let parent = entry.extends.as_deref().map(normalize_fqsen);
        let interfaces: Vec<String> = entry.implements.iter().map(|i| normalize_fqsen(i)).collect();
        {
            let class = self.graph.class_mut(id)?;
            class.is_abstract = entry.is_abstract;
            class.is_final = entry.is_final;
            class.parent_name = parent.clone();
            class.interface_names = interfaces.clone();
        }
        if let Some(parent) = parent {
            self.pending.push(PendingLink::Extends { class: id, parent });
        }
        for interface in interfaces {
            self.pending.push(PendingLink::Implements { class: id, interface });
        }

        for constant in entry.constants {
            self.add_constant(id, constant)?;
        }

        for property in entry.properties {
            let pid = self.graph.add_property(id, &property.name)?;
            self.graph.set_summary(pid, property.summary)?;
            self.graph.set_description(pid, property.description)?;
            let p = self.graph.property_mut(pid)?;
            p.types = normalize_types(&property.types);
            p.default = property.default;
            p.visibility = property.visibility;
            p.is_static = property.is_static;
        }

        for method in entry.methods {
            let mid = self.graph.add_method(id, &method.name)?;
            self.graph.set_summary(mid, method.summary)?;
            self.graph.set_description(mid, method.description)?;
            {
                let m = self.graph.method_mut(mid)?;
                m.returns = normalize_types(&method.returns);
                m.visibility = method.visibility;
                m.is_static = method.is_static;
                m.is_abstract = method.is_abstract;
                m.is_final = method.is_final;
            }
            if let Some(target) = method.overrides {
                self.pending.push(PendingLink::Overrides {
                    method: mid,
                    target: normalize_member(&target),
                });
            }
            self.add_arguments(mid, method.arguments)?;
        }

        Ok(id)
    }

    fn add_constant(&mut self, owner: DescriptorId, entry: ConstantEntry) -> Result<DescriptorId, ManifestError> {
        let id = self.graph.add_constant(owner, &entry.name)?;
        self.graph.set_summary(id, entry.summary)?;
        self.graph.constant_mut(id)?.value = entry.value;
        Ok(id)
    }

    fn add_arguments(&mut self, callable: DescriptorId, arguments: Vec<ArgumentEntry>) -> Result<(), ManifestError> {
        for entry in arguments {
            let id = self.graph.add_argument_to(callable, &entry.name)?;
            self.graph.set_summary(id, entry.summary)?;
            let arg = self.graph.argument_mut(id)?;
            arg.set_types(normalize_types(&entry.types));
            arg.set_default(entry.default);
            arg.set_by_reference(entry.by_reference);
            arg.set_variadic(entry.variadic);
        }
        Ok(())
    }
}

/// Ensure a leading namespace separator: `App\Foo` → `\App\Foo`.
pub fn normalize_fqsen(fqsen: &str) -> String {
    let fqsen = fqsen.trim();
    if fqsen.starts_with('\\') {
        fqsen.to_string()
    } else {
        format!("\\{}", fqsen)
    }
}

/// Method references may omit the parentheses: `\A::run` → `\A::run()`.
fn normalize_member(fqsen: &str) -> String {
    let fqsen = normalize_fqsen(fqsen);
    if fqsen.ends_with("()") {
        fqsen
    } else {
        format!("{}()", fqsen)
    }
}

/// Split union notation and drop blanks: `["int|null", ""]` → `["int", "null"]`.
fn normalize_types(types: &[String]) -> Vec<String> {
    types
        .iter()
        .flat_map(|t| t.split('|'))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
