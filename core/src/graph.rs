//! ASCII rendering of flow dependency graphs.
//!
//! Nodes are addressed by display id (the node's `id`, falling back to its
//! `uid`). Rendering starts from every root in lexicographic order; nodes
//! that sit only on cycles are then rendered from the smallest unvisited id.
//! A node is expanded at most once, so shared and cyclic subgraphs print
//! their edges a single time and appear as plain targets afterwards.

use crate::model::{DependencyGraph, Relation};
use std::collections::{BTreeSet, HashMap, HashSet};

pub const TRIGGER_ARROW: &str = "────▶";
pub const TASK_ARROW: &str = "====▶";

const LEGEND: [&str; 4] = [
    "",
    "Legend:",
    "  ────▶ FLOW_TRIGGER  (flow-trigger-based dependency)",
    "  ====▶ FLOW_TASK     (subflow-task-based dependency)",
];

/// Render `graph` as an indented edge list followed by the legend and `context`.
pub fn render_dependencies(graph: &DependencyGraph, context: &str) -> String {
    let uid_to_id: HashMap<&str, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.uid.as_str(), n.display_id()))
        .collect();
    let display = |uid: &str| -> String {
        uid_to_id.get(uid).copied().unwrap_or(uid).to_string()
    };

    let mut all_ids: BTreeSet<String> = uid_to_id.values().map(|s| s.to_string()).collect();
    let mut has_incoming: HashSet<String> = HashSet::new();
    let mut trigger_edges: HashMap<String, Vec<String>> = HashMap::new();
    let mut task_edges: HashMap<String, Vec<String>> = HashMap::new();

    for edge in &graph.edges {
        let source = display(&edge.source);
        let target = display(&edge.target);
        all_ids.insert(source.clone());
        all_ids.insert(target.clone());
        has_incoming.insert(target.clone());

        let bucket = match edge.relation {
            Relation::FlowTrigger => &mut trigger_edges,
            Relation::FlowTask | Relation::Other => &mut task_edges,
        };
        bucket.entry(source).or_default().push(target);
    }

    let mut renderer = Renderer {
        trigger_edges: &trigger_edges,
        task_edges: &task_edges,
        visited: HashSet::new(),
        lines: Vec::new(),
    };

    for root in all_ids.iter().filter(|id| !has_incoming.contains(*id)) {
        renderer.render(root, 0);
    }
    for id in &all_ids {
        if !renderer.visited.contains(id.as_str()) {
            renderer.render(id, 0);
        }
    }

    let mut lines = renderer.lines;
    lines.extend(LEGEND.iter().map(|s| s.to_string()));
    lines.push(context.to_string());
    lines.join("\n")
}

struct Renderer<'a> {
    trigger_edges: &'a HashMap<String, Vec<String>>,
    task_edges: &'a HashMap<String, Vec<String>>,
    visited: HashSet<&'a str>,
    lines: Vec<String>,
}

impl<'a> Renderer<'a> {
    fn edges_of(&self, node: &str) -> Vec<(&'a str, &'static str)> {
        let triggers = self
            .trigger_edges
            .get(node)
            .into_iter()
            .flatten()
            .map(|t| (t.as_str(), TRIGGER_ARROW));
        let tasks = self
            .task_edges
            .get(node)
            .into_iter()
            .flatten()
            .map(|t| (t.as_str(), TASK_ARROW));
        triggers.chain(tasks).collect()
    }

    fn render(&mut self, node: &'a str, indent: usize) {
        if !self.visited.insert(node) {
            return;
        }
        let pad = " ".repeat(indent);
        let edges = self.edges_of(node);
        if edges.is_empty() {
            self.lines.push(format!("{pad}{node}"));
            return;
        }

        for (child, arrow) in edges {
            self.lines.push(format!("{pad}{node} {arrow} {child}"));
            let child_indent = indent + node.chars().count() + 1 + arrow.chars().count() + 1;
            self.render(child, child_indent);
        }
    }
}
