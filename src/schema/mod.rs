//! The schema registry: node types and root calls, keyed by name.
//!
//! Registration happens once, up front; execution only reads. All resolvers
//! are `Send + Sync`, so a built registry can be shared across threads.

mod connection;
mod introspection;
mod node_type;
mod root_call;
pub(crate) mod scalars;

use indexmap::IndexMap;

pub use node_type::FieldDef;
pub use node_type::FieldResolver;
pub use node_type::FieldType;
pub use node_type::NodeType;
pub use node_type::NodeTypeBuilder;
pub use root_call::RootCall;
pub use root_call::RootResolver;
pub use root_call::RootValue;

use crate::ast::Literal;
use crate::error::QueryError;

/// Name of the distinguished root call returning the query context.
const CONTEXT_CALL: &str = "context";

pub struct Schema {
    node_types: IndexMap<String, NodeType>,
    root_calls: IndexMap<String, RootCall>,
}

impl Schema {
    /// An empty registry, preloaded with the built-in scalar node types, the
    /// introspection surface, and the `context` root call.
    pub fn new() -> Self {
        let mut schema = Schema {
            node_types: IndexMap::new(),
            root_calls: IndexMap::new(),
        };
        scalars::install(&mut schema);
        introspection::install(&mut schema);
        schema.insert_root_call(RootCall::new(CONTEXT_CALL, CONTEXT_CALL, |_, _, context| {
            Ok(RootValue::One(context.to_value()))
        }));
        schema
    }

    /// Registers a node type under its schema name.
    pub fn register_node_type(&mut self, node_type: NodeType) -> Result<(), QueryError> {
        if self.node_types.contains_key(&node_type.name) {
            return Err(QueryError::Registration(format!(
                "node type '{}' is already registered",
                node_type.name
            )));
        }
        self.insert_node_type(node_type);
        Ok(())
    }

    pub(crate) fn insert_node_type(&mut self, mut node_type: NodeType) {
        if let Some(element) = node_type.connection_of.clone() {
            let edge_name = format!("{}_edge", node_type.name);
            connection::add_conventional_fields(&mut node_type, &edge_name);
            if !self.node_types.contains_key(&edge_name) {
                self.node_types
                    .insert(edge_name.clone(), connection::edge_type(&edge_name, &element));
            }
        }
        self.node_types.insert(node_type.name.clone(), node_type);
    }

    /// Retrieves a node type by name.
    pub fn lookup(&self, name: &str) -> Result<&NodeType, QueryError> {
        self.node_types
            .get(name)
            .ok_or_else(|| QueryError::TypeNotFound(name.to_string()))
    }

    /// Registers a root call under its schema name.
    pub fn register_root_call(&mut self, root_call: RootCall) -> Result<(), QueryError> {
        if self.root_calls.contains_key(&root_call.name) {
            return Err(QueryError::Registration(format!(
                "root call '{}' is already registered",
                root_call.name
            )));
        }
        self.insert_root_call(root_call);
        Ok(())
    }

    pub(crate) fn insert_root_call(&mut self, root_call: RootCall) {
        self.root_calls.insert(root_call.name.clone(), root_call);
    }

    /// Retrieves a root call by name.
    pub fn resolve_root(&self, name: &str) -> Result<&RootCall, QueryError> {
        self.root_calls
            .get(name)
            .ok_or_else(|| QueryError::RootCallNotFound(name.to_string()))
    }

    /// Resolves a field name against a node type: own fields first, then the
    /// parent chain, first match wins. The visited set guards against
    /// accidental parent cycles.
    pub fn field_on<'a>(
        &'a self,
        node_type: &'a NodeType,
        name: &str,
    ) -> Result<&'a FieldDef, QueryError> {
        let mut current = node_type;
        let mut seen: Vec<&str> = vec![current.name()];
        loop {
            if let Some(field) = current.fields.get(name) {
                return Ok(field);
            }
            let parent = match &current.parent {
                Some(parent) if !seen.contains(&parent.as_str()) => parent,
                _ => break,
            };
            current = self.lookup(parent)?;
            seen.push(current.name());
        }
        Err(QueryError::FieldNotDefined(
            name.to_string(),
            node_type.name.clone(),
        ))
    }

    pub(crate) fn node_types(&self) -> &IndexMap<String, NodeType> {
        &self.node_types
    }

    pub(crate) fn root_calls(&self) -> &IndexMap<String, RootCall> {
        &self.root_calls
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn int_argument(
    arguments: &[Literal],
    index: usize,
    call: &str,
) -> Result<i64, QueryError> {
    arguments
        .get(index)
        .and_then(Literal::as_i64)
        .ok_or_else(|| QueryError::Resolver(format!("call '{call}' expects an integer argument")))
}

pub(crate) fn str_argument<'a>(
    arguments: &'a [Literal],
    index: usize,
    call: &str,
) -> Result<&'a str, QueryError> {
    arguments
        .get(index)
        .and_then(Literal::as_str)
        .ok_or_else(|| QueryError::Resolver(format!("call '{call}' expects a string argument")))
}
