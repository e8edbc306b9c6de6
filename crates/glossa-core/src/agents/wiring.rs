//! Top-level workflow composition.
//!
//! One explicit builder call wires the registered agents into the graph:
//! chat inlined at the entry, the generator and translator as isolated
//! units, and the hand-off edge chain between them. Built once at startup,
//! immutable afterwards.

use crate::error::Result;
use crate::graph::builder::{Graph, GraphBuilder};

use super::{chat, generator, translator};

/// Build the end-to-end agent workflow:
///
/// ```text
///   Chat ──(transfer_to_generator)──► Generator ──► Translator ──► end
///     │
///     └── plain answer ──► end
/// ```
pub fn build_workflow() -> Result<Graph> {
    GraphBuilder::new()
        .add_subgraph_inline(chat::NAME, chat::definition().subgraph(), None)?
        .add_node(generator::NAME, generator::isolated_node()?)
        .add_node(translator::NAME, translator::isolated_node()?)
        .set_entry_point(chat::NAME)
        .add_edge(generator::NAME, translator::NAME)
        .set_finish_point(translator::NAME)
        .compile()
}
