//! Node types and their declared-field surface.

use std::fmt;

use indexmap::IndexMap;
use serde_json_bytes::Value;

use crate::ast::Literal;
use crate::context::Context;
use crate::error::QueryError;
use crate::json_ext::stringified_id;

use super::scalars;

/// Resolves a field against the wrapped target entity, given the call's
/// positional literal arguments and the query context.
pub type FieldResolver =
    Box<dyn Fn(&Value, &[Literal], &Context) -> Result<Value, QueryError> + Send + Sync>;

/// The declared type of a field: a scalar tag, or a reference to a node type
/// by name. Named references are late-bound strings resolved at execution
/// time, which keeps mutually recursive schemas (comment → post → comments)
/// registrable in any order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Named(String),
}

impl FieldType {
    /// Name of the node type a value of this field type is wrapped in when a
    /// chained call or sub-selection follows it.
    pub(crate) fn type_name(&self) -> &str {
        match self {
            FieldType::String => scalars::STRING,
            FieldType::Number => scalars::NUMBER,
            FieldType::Boolean => scalars::BOOLEAN,
            FieldType::Named(name) => name,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One declared field of a node type.
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) field_type: FieldType,
    pub(crate) description: Option<String>,
    pub(crate) resolver: FieldResolver,
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl FieldDef {
    pub(crate) fn new(field_type: FieldType, name: &str) -> Self {
        FieldDef {
            name: name.to_string(),
            field_type,
            description: None,
            resolver: property_resolver(name.to_string()),
        }
    }

    pub(crate) fn with_resolver(
        field_type: FieldType,
        name: &str,
        resolver: impl Fn(&Value, &[Literal], &Context) -> Result<Value, QueryError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        FieldDef {
            name: name.to_string(),
            field_type,
            description: None,
            resolver: Box::new(resolver),
        }
    }
}

// The default resolution reads the same-named property of the wrapped
// target. An absent property yields `Null`; whether that is an error is
// decided where the value is consumed.
fn property_resolver(name: String) -> FieldResolver {
    Box::new(move |target, _arguments, _context| {
        Ok(target
            .as_object()
            .and_then(|object| object.get(name.as_str()))
            .cloned()
            .unwrap_or(Value::Null))
    })
}

/// A registered node type: a schema name, its declared fields, an optional
/// parent for field inheritance, and an optional pairing to an element type
/// when the type wraps a collection.
#[derive(Debug)]
pub struct NodeType {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldDef>,
    pub(crate) parent: Option<String>,
    pub(crate) connection_of: Option<String>,
    pub(crate) id_field: String,
}

impl NodeType {
    pub fn builder(name: &str) -> NodeTypeBuilder {
        NodeTypeBuilder {
            name: name.to_string(),
            fields: IndexMap::new(),
            parent: None,
            connection_of: None,
            id_field: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_connection(&self) -> bool {
        self.connection_of.is_some()
    }

    /// Identity projection: the string form of the target's id property,
    /// used for root result keys and edge cursors.
    pub(crate) fn result_key(&self, target: &Value) -> Option<String> {
        target
            .as_object()
            .and_then(|object| object.get(self.id_field.as_str()))
            .and_then(stringified_id)
    }
}

/// Declares the fields of a node type in order. Each declaration attaches a
/// default resolver reading the same-named property of the target; the
/// `*_with` variants supply an explicit resolver instead.
pub struct NodeTypeBuilder {
    name: String,
    fields: IndexMap<String, FieldDef>,
    parent: Option<String>,
    connection_of: Option<String>,
    id_field: Option<String>,
}

impl NodeTypeBuilder {
    pub fn field(mut self, field_type: FieldType, name: &str) -> Self {
        self.fields
            .insert(name.to_string(), FieldDef::new(field_type, name));
        self
    }

    pub fn field_with(
        mut self,
        field_type: FieldType,
        name: &str,
        resolver: impl Fn(&Value, &[Literal], &Context) -> Result<Value, QueryError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldDef::with_resolver(field_type, name, resolver),
        );
        self
    }

    pub fn string(self, name: &str) -> Self {
        self.field(FieldType::String, name)
    }

    pub fn number(self, name: &str) -> Self {
        self.field(FieldType::Number, name)
    }

    pub fn boolean(self, name: &str) -> Self {
        self.field(FieldType::Boolean, name)
    }

    pub fn node(self, name: &str, type_name: &str) -> Self {
        self.field(FieldType::Named(type_name.to_string()), name)
    }

    pub fn node_with(
        self,
        name: &str,
        type_name: &str,
        resolver: impl Fn(&Value, &[Literal], &Context) -> Result<Value, QueryError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.field_with(FieldType::Named(type_name.to_string()), name, resolver)
    }

    /// Documents the most recently declared field.
    pub fn describe(mut self, description: &str) -> Self {
        if let Some(index) = self.fields.len().checked_sub(1) {
            if let Some((_, field)) = self.fields.get_index_mut(index) {
                field.description = Some(description.to_string());
            }
        }
        self
    }

    /// Names the parent type this type inherits fields from.
    pub fn parent(mut self, name: &str) -> Self {
        self.parent = Some(name.to_string());
        self
    }

    /// Marks this type as a collection wrapper over `element`. Registration
    /// synthesizes the conventional connection fields (`count`, `any`,
    /// `edges`, `first`, `after`) for it.
    pub fn connection_of(mut self, element: &str) -> Self {
        self.connection_of = Some(element.to_string());
        self
    }

    /// Property projected as the identity of targets of this type. For a
    /// connection type this names the id property of its elements.
    pub fn id_field(mut self, name: &str) -> Self {
        self.id_field = Some(name.to_string());
        self
    }

    pub fn build(self) -> NodeType {
        NodeType {
            name: self.name,
            fields: self.fields,
            parent: self.parent,
            connection_of: self.connection_of,
            id_field: self.id_field.unwrap_or_else(|| "id".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json;

    #[test]
    fn default_resolver_reads_the_same_named_property() {
        let field = FieldDef::new(FieldType::String, "title");
        let target = json!({ "title": "My great post" });
        let value = (field.resolver)(&target, &[], &Context::new()).unwrap();
        assert_eq!(value, json!("My great post"));
    }

    #[test]
    fn default_resolver_yields_null_for_absent_properties() {
        let field = FieldDef::new(FieldType::String, "missing");
        let value = (field.resolver)(&json!({}), &[], &Context::new()).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let node_type = NodeType::builder("post")
            .string("title")
            .describe("Headline of the post")
            .string("content")
            .node("published_at", "date")
            .build();
        let names: Vec<_> = node_type.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["title", "content", "published_at"]);
        assert_eq!(
            node_type.fields["title"].description.as_deref(),
            Some("Headline of the post")
        );
    }

    #[test]
    fn result_key_stringifies_the_id_property() {
        let node_type = NodeType::builder("post").build();
        assert_eq!(
            node_type.result_key(&json!({ "id": 123 })),
            Some("123".to_string())
        );
        assert_eq!(node_type.result_key(&json!({})), None);

        let by_name = NodeType::builder("tag").id_field("name").build();
        assert_eq!(
            by_name.result_key(&json!({ "name": "rust" })),
            Some("rust".to_string())
        );
    }
}
