//! Graph composition: named nodes, static and conditional edges, one entry
//! point, and an END sentinel.
//!
//! Graphs are built once at startup by an explicit top-level wiring function
//! and immutable thereafter. A subgraph can be merged inline (its nodes join
//! the parent namespace under a prefix) or wrapped as a single opaque node by
//! the caller - this module only knows about the inline mode.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::graph::node::Node;
use crate::graph::state::GraphState;

/// Sentinel edge target: reaching it ends the (sub)graph run.
pub const END: &str = "__end__";

/// Decision function for a conditional edge: maps current state to the next
/// node name (or `END`).
pub type EdgeCondition = Arc<dyn Fn(&GraphState) -> String + Send + Sync>;

#[derive(Default)]
pub struct GraphBuilder {
    nodes: HashMap<String, Arc<dyn Node>>,
    static_edges: HashMap<String, String>,
    conditional_edges: HashMap<String, EdgeCondition>,
    entry: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(mut self, name: impl Into<String>, node: Arc<dyn Node>) -> Self {
        self.nodes.insert(name.into(), node);
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.static_edges.insert(from.into(), to.into());
        self
    }

    pub fn add_conditional_edge(
        mut self,
        from: impl Into<String>,
        condition: EdgeCondition,
    ) -> Self {
        self.conditional_edges.insert(from.into(), condition);
        self
    }

    pub fn set_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Mark a node terminal: reaching it (and completing it) ends the run.
    pub fn set_finish_point(self, name: impl Into<String>) -> Self {
        self.add_edge(name, END)
    }

    /// Merge another builder's nodes and edges into this graph's namespace.
    ///
    /// The subgraph's entry node takes the `prefix` name itself; every other
    /// node becomes `prefix.name`. The subgraph's `END` maps to `on_finish`
    /// when given, otherwise to the parent's `END`.
    pub fn add_subgraph_inline(
        mut self,
        prefix: &str,
        subgraph: GraphBuilder,
        on_finish: Option<&str>,
    ) -> Result<Self> {
        let sub_entry = subgraph.entry.clone().ok_or_else(|| {
            CoreError::Graph(format!("inline subgraph '{prefix}' has no entry point"))
        })?;

        let rename = {
            let prefix = prefix.to_string();
            let sub_entry = sub_entry.clone();
            let on_finish = on_finish.map(str::to_string);
            Arc::new(move |name: &str| -> String {
                if name == END {
                    on_finish.clone().unwrap_or_else(|| END.to_string())
                } else if name == sub_entry {
                    prefix.clone()
                } else {
                    format!("{prefix}.{name}")
                }
            })
        };

        for (name, node) in subgraph.nodes {
            self.nodes.insert(rename(&name), node);
        }
        for (from, to) in subgraph.static_edges {
            self.static_edges.insert(rename(&from), rename(&to));
        }
        for (from, condition) in subgraph.conditional_edges {
            let key = rename(&from);
            let rename = Arc::clone(&rename);
            let wrapped: EdgeCondition =
                Arc::new(move |state: &GraphState| rename(&condition(state)));
            self.conditional_edges.insert(key, wrapped);
        }

        Ok(self)
    }

    pub fn compile(self) -> Result<Graph> {
        let entry = self
            .entry
            .ok_or_else(|| CoreError::Graph("graph has no entry point".to_string()))?;

        if !self.nodes.contains_key(&entry) {
            return Err(CoreError::Graph(format!(
                "entry point '{entry}' is not a registered node"
            )));
        }
        for (from, to) in &self.static_edges {
            if !self.nodes.contains_key(from) {
                return Err(CoreError::Graph(format!(
                    "edge from unknown node '{from}'"
                )));
            }
            if to.as_str() != END && !self.nodes.contains_key(to) {
                return Err(CoreError::Graph(format!(
                    "edge '{from}' -> unknown node '{to}'"
                )));
            }
        }
        for from in self.conditional_edges.keys() {
            if !self.nodes.contains_key(from) {
                return Err(CoreError::Graph(format!(
                    "conditional edge from unknown node '{from}'"
                )));
            }
        }

        Ok(Graph {
            nodes: self.nodes,
            static_edges: self.static_edges,
            conditional_edges: self.conditional_edges,
            entry,
        })
    }
}

/// A compiled, immutable graph.
pub struct Graph {
    nodes: HashMap<String, Arc<dyn Node>>,
    static_edges: HashMap<String, String>,
    conditional_edges: HashMap<String, EdgeCondition>,
    entry: String,
}

impl Graph {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn node(&self, name: &str) -> Result<&Arc<dyn Node>> {
        self.nodes
            .get(name)
            .ok_or_else(|| CoreError::Graph(format!("unknown node '{name}'")))
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Where to go after `from` completes. Conditional edges win over static
    /// ones; a node with no outgoing edge ends the run.
    pub fn next_after(&self, from: &str, state: &GraphState) -> Result<String> {
        if let Some(condition) = self.conditional_edges.get(from) {
            let target = condition(state);
            if target != END && !self.nodes.contains_key(&target) {
                return Err(CoreError::Graph(format!(
                    "conditional edge from '{from}' routed to unknown node '{target}'"
                )));
            }
            return Ok(target);
        }
        if let Some(target) = self.static_edges.get(from) {
            return Ok(target.clone());
        }
        Ok(END.to_string())
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("static_edges", &self.static_edges)
            .field(
                "conditional_edges",
                &self.conditional_edges.keys().collect::<Vec<_>>(),
            )
            .field("entry", &self.entry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::{NodeContext, NodeOutcome};
    use crate::graph::state::StateUpdate;
    use async_trait::async_trait;

    struct NoopNode;

    #[async_trait]
    impl Node for NoopNode {
        async fn run(&self, _state: &GraphState, _ctx: &mut NodeContext) -> crate::error::Result<NodeOutcome> {
            Ok(NodeOutcome::Completed(StateUpdate::default()))
        }
    }

    fn noop() -> Arc<dyn Node> {
        Arc::new(NoopNode)
    }

    #[test]
    fn compile_requires_an_entry_point() {
        let err = GraphBuilder::new()
            .add_node("a", noop())
            .compile()
            .unwrap_err();
        assert!(err.to_string().contains("no entry point"));
    }

    #[test]
    fn compile_rejects_dangling_edges() {
        let err = GraphBuilder::new()
            .add_node("a", noop())
            .set_entry_point("a")
            .add_edge("a", "missing")
            .compile()
            .unwrap_err();
        assert!(err.to_string().contains("unknown node 'missing'"));
    }

    #[test]
    fn node_without_outgoing_edge_ends_the_run() {
        let graph = GraphBuilder::new()
            .add_node("a", noop())
            .set_entry_point("a")
            .compile()
            .unwrap();

        let next = graph.next_after("a", &GraphState::default()).unwrap();
        assert_eq!(next, END);
    }

    #[test]
    fn conditional_edge_wins_over_static() {
        let graph = GraphBuilder::new()
            .add_node("a", noop())
            .add_node("b", noop())
            .add_node("c", noop())
            .set_entry_point("a")
            .add_edge("a", "b")
            .add_conditional_edge("a", Arc::new(|_s| "c".to_string()))
            .compile()
            .unwrap();

        let next = graph.next_after("a", &GraphState::default()).unwrap();
        assert_eq!(next, "c");
    }

    #[test]
    fn inline_merge_prefixes_nodes_and_remaps_end() {
        let sub = GraphBuilder::new()
            .add_node("reason", noop())
            .add_node("tools", noop())
            .set_entry_point("reason")
            .add_edge("tools", "reason")
            .add_conditional_edge(
                "reason",
                Arc::new(|_s| END.to_string()),
            );

        let graph = GraphBuilder::new()
            .add_node("after", noop())
            .add_subgraph_inline("Chat", sub, Some("after"))
            .unwrap()
            .set_entry_point("Chat")
            .set_finish_point("after")
            .compile()
            .unwrap();

        assert!(graph.has_node("Chat"));
        assert!(graph.has_node("Chat.tools"));
        // Subgraph END was remapped to the "after" node.
        let next = graph.next_after("Chat", &GraphState::default()).unwrap();
        assert_eq!(next, "after");
        // Static edge renamed on both sides.
        let next = graph.next_after("Chat.tools", &GraphState::default()).unwrap();
        assert_eq!(next, "Chat");
    }
}
