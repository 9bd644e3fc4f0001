//! Linking pass: wire inheritance once every manifest is loaded.
//!
//! Parents, interfaces and explicit overrides are named by FQSEN in the
//! manifest and resolved here. Methods without an explicit override are then
//! matched by name against the nearest ancestor class, falling back to the
//! interfaces implemented along the hierarchy.

use crate::descriptor::{DescriptorGraph, DescriptorId, DescriptorKind};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A reference by name that can only be resolved after loading.
#[derive(Debug)]
pub enum PendingLink {
    Extends { class: DescriptorId, parent: String },
    Implements { class: DescriptorId, interface: String },
    Overrides { method: DescriptorId, target: String },
}

/// Resolve pending links, then infer overrides by name.
///
/// Names that point outside the documented set are expected (framework
/// base classes, PHP built-ins) and are only logged.
pub fn link(graph: &mut DescriptorGraph, pending: Vec<PendingLink>) {
    let mut explicit: HashSet<DescriptorId> = HashSet::new();

    for link in pending {
        let result = match &link {
            PendingLink::Extends { class, parent } => match graph.lookup(parent) {
                Some(target) => graph.set_extends(*class, target),
                None => {
                    debug!(%parent, "parent is not documented");
                    Ok(())
                }
            },
            PendingLink::Implements { class, interface } => match graph.lookup(interface) {
                Some(target) => graph.add_implements(*class, target),
                None => {
                    debug!(%interface, "interface is not documented");
                    Ok(())
                }
            },
            PendingLink::Overrides { method, target } => match graph.lookup(target) {
                Some(found) => {
                    explicit.insert(*method);
                    graph.set_inherited_method(*method, found)
                }
                None => {
                    warn!(%target, "overridden method not found");
                    Ok(())
                }
            },
        };
        if let Err(err) = result {
            warn!(?link, error = %err, "skipping link");
        }
    }

    let read: &DescriptorGraph = graph;
    let inferred: Vec<(DescriptorId, DescriptorId)> = read
        .of_kind(DescriptorKind::Method)
        .filter(|(id, _)| !explicit.contains(id))
        .filter_map(|(id, _)| overridden_method(read, id).map(|target| (id, target)))
        .collect();

    for (method, target) in inferred {
        if let Err(err) = graph.set_inherited_method(method, target) {
            warn!(%method, error = %err, "skipping inferred override");
        }
    }
}

/// Same-named method on the nearest ancestor, else on an implemented
/// interface (own interfaces first, then those of each ancestor).
fn overridden_method(graph: &DescriptorGraph, method: DescriptorId) -> Option<DescriptorId> {
    let node = graph.get(method)?;
    let class = node.owner()?;
    let name = node.name();

    let mut lineage = Vec::new();
    for step in graph.ancestry(class) {
        match step {
            Ok(id) => lineage.push(id),
            Err(err) => {
                warn!(%method, error = %err, "class hierarchy is cyclic");
                break;
            }
        }
    }

    let find_in = |owner: DescriptorId| -> Option<DescriptorId> {
        let fqsen = format!("{}::{}()", graph.get(owner)?.fqsen(), name);
        graph.lookup(&fqsen).filter(|&found| found != method)
    };

    if let Some(found) = lineage.iter().skip(1).find_map(|&ancestor| find_in(ancestor)) {
        return Some(found);
    }

    let mut seen = HashSet::new();
    let mut queue: Vec<DescriptorId> = lineage
        .iter()
        .filter_map(|&c| graph.class(c))
        .flat_map(|c| c.implements().iter().copied())
        .collect();
    // Interfaces may extend further interfaces.
    let mut i = 0;
    while i < queue.len() {
        let interface = queue[i];
        i += 1;
        if !seen.insert(interface) {
            continue;
        }
        if let Some(found) = find_in(interface) {
            return Some(found);
        }
        if let Some(c) = graph.class(interface) {
            queue.extend(c.extends());
            queue.extend(c.implements().iter().copied());
        }
    }
    None
}
