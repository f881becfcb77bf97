use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::model::trace::Trace;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeNode {
    pub span_id: String,
    pub depth: usize,
    pub child_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeLayout {
    /// One node per span, in the trace's span order.
    pub nodes: Vec<TreeNode>,
    /// `orphan-subtree` entries for spans unreachable from the root.
    pub anomalies: Vec<Anomaly>,
}

impl TreeLayout {
    pub fn node(&self, span_id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.span_id == span_id)
    }
}

/// Computes each span's depth (root = 0, child = parent + 1) and its
/// children in span order, via a parent→children index and one walk
/// from the root. Spans the walk never reaches keep depth 0 and are
/// reported as orphan subtrees.
pub fn build_tree(trace: &Trace) -> TreeLayout {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for span in &trace.spans {
        if let Some(parent) = span.parent_span_id.as_deref() {
            children.entry(parent).or_default().push(&span.span_id);
        }
    }

    let mut depths: HashMap<&str, usize> = HashMap::new();
    let mut stack = vec![(trace.root_span_id.as_str(), 0usize)];
    while let Some((id, depth)) = stack.pop() {
        if depths.contains_key(id) {
            continue;
        }
        depths.insert(id, depth);
        if let Some(kids) = children.get(id) {
            for kid in kids.iter().rev() {
                stack.push((*kid, depth + 1));
            }
        }
    }

    let mut nodes = Vec::with_capacity(trace.spans.len());
    let mut anomalies = Vec::new();
    for span in &trace.spans {
        let depth = depths.get(span.span_id.as_str()).copied();
        if depth.is_none() {
            anomalies.push(Anomaly::OrphanSubtree(span.span_id.clone()));
        }
        nodes.push(TreeNode {
            span_id: span.span_id.clone(),
            depth: depth.unwrap_or(0),
            child_ids: children
                .get(span.span_id.as_str())
                .map(|kids| kids.iter().map(|id| (*id).to_string()).collect())
                .unwrap_or_default(),
        });
    }

    TreeLayout { nodes, anomalies }
}
