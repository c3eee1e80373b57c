//! Top-level entry points of the query language.

use std::fmt;

use serde_json_bytes::Value;

use crate::ast::Literal;
use crate::context::Context;
use crate::error::QueryError;

use super::node_type::FieldType;
use super::Schema;

/// Resolves a root call. The schema reference lets introspection resolvers
/// read the registry; ordinary resolvers ignore it.
pub type RootResolver =
    Box<dyn Fn(&Schema, &[Literal], &Context) -> Result<RootValue, QueryError> + Send + Sync>;

/// What a root call resolved to: a single target entity, or a sequence of
/// them (one per requested id, in request order).
#[derive(Clone, Debug, PartialEq)]
pub enum RootValue {
    One(Value),
    Many(Vec<Value>),
}

/// A registered root call: name, ordered argument declarations (consumed by
/// introspection; binding is positional), the node type its targets are
/// wrapped in, and the resolver producing them.
pub struct RootCall {
    pub(crate) name: String,
    pub(crate) arguments: Vec<(String, FieldType)>,
    pub(crate) returns: String,
    pub(crate) resolver: RootResolver,
}

impl fmt::Debug for RootCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootCall")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

impl RootCall {
    pub fn new(
        name: &str,
        returns: &str,
        resolver: impl Fn(&Schema, &[Literal], &Context) -> Result<RootValue, QueryError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        RootCall {
            name: name.to_string(),
            arguments: Vec::new(),
            returns: returns.to_string(),
            resolver: Box::new(resolver),
        }
    }

    /// Declares the next positional argument.
    pub fn argument(mut self, name: &str, field_type: FieldType) -> Self {
        self.arguments.push((name.to_string(), field_type));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
