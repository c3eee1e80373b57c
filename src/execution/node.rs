use serde_json_bytes::Value;

use crate::context::Context;
use crate::schema::NodeType;

/// A resolution frame: one target entity bound to the node type it is being
/// read through and the query context. Frames live for the duration of one
/// sub-selection and are never cached across a query.
pub(super) struct Node<'a> {
    pub(super) target: Value,
    pub(super) node_type: &'a NodeType,
    pub(super) context: &'a Context,
}

impl<'a> Node<'a> {
    pub(super) fn new(target: Value, node_type: &'a NodeType, context: &'a Context) -> Self {
        Node {
            target,
            node_type,
            context,
        }
    }
}
