//! The compiled plan (spec.md §3 "Compiled plan"): immutable after
//! construction, `Send + Sync`, safe to share across threads for
//! concurrent evaluations (spec.md §5). Node evaluators live in a
//! [`slotmap::SlotMap`] arena, mirroring `grill-core`'s use of
//! `slotmap::Key` to identify compiled schemas by an opaque key rather
//! than a reference, so the arena has no internal reference cycles
//! (spec.md §9 "Graph ownership").

use std::collections::HashSet;

use slotmap::{new_key_type, SlotMap};

use crate::graph::Guard;
use crate::node::CompiledNode;

new_key_type! {
    pub struct NodeKey;
}

pub struct Plan {
    pub(crate) input_node_id: String,
    pub(crate) nodes: SlotMap<NodeKey, Box<dyn CompiledNode>>,
    pub(crate) scheduled: Vec<(String, Guard, NodeKey)>,
    pub(crate) output_sources: HashSet<String>,
}
