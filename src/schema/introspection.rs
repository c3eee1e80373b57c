//! The engine's own schema, exposed as queryable nodes.
//!
//! `schema()` returns the whole registry; `type(name)` returns one node
//! type. The resolvers serialize the live registry to JSON and the ordinary
//! field machinery does the rest.

use serde_json_bytes::json;
use serde_json_bytes::Value;

use super::node_type::NodeType;
use super::root_call::RootCall;
use super::root_call::RootValue;
use super::str_argument;
use super::FieldType;
use super::Schema;

const SCHEMA_TYPE: &str = "__schema";
const TYPE_TYPE: &str = "__type";
const FIELD_TYPE: &str = "__field";
const ROOT_CALL_TYPE: &str = "__root_call";
const ARGUMENT_TYPE: &str = "__call_argument";

pub(super) fn install(schema: &mut Schema) {
    schema.insert_node_type(
        NodeType::builder(SCHEMA_TYPE)
            .node("types", TYPE_TYPE)
            .node("root_calls", ROOT_CALL_TYPE)
            .build(),
    );
    schema.insert_node_type(
        NodeType::builder(TYPE_TYPE)
            .id_field("name")
            .string("name")
            .string("parent")
            .string("connection_of")
            .node("fields", FIELD_TYPE)
            .build(),
    );
    schema.insert_node_type(
        NodeType::builder(FIELD_TYPE)
            .id_field("name")
            .string("name")
            .string("type")
            .string("description")
            .build(),
    );
    schema.insert_node_type(
        NodeType::builder(ROOT_CALL_TYPE)
            .id_field("name")
            .string("name")
            .string("returns")
            .node("arguments", ARGUMENT_TYPE)
            .build(),
    );
    schema.insert_node_type(
        NodeType::builder(ARGUMENT_TYPE)
            .id_field("name")
            .string("name")
            .string("type")
            .build(),
    );

    schema.insert_root_call(RootCall::new("schema", SCHEMA_TYPE, |schema, _, _| {
        Ok(RootValue::One(describe_schema(schema)))
    }));
    schema.insert_root_call(
        RootCall::new("type", TYPE_TYPE, |schema, arguments, _| {
            let name = str_argument(arguments, 0, "type")?;
            Ok(RootValue::One(describe_type(schema.lookup(name)?)))
        })
        .argument("name", FieldType::String),
    );
}

fn describe_schema(schema: &Schema) -> Value {
    json!({
        "types": schema
            .node_types()
            .values()
            .map(describe_type)
            .collect::<Vec<_>>(),
        "root_calls": schema
            .root_calls()
            .values()
            .map(describe_root_call)
            .collect::<Vec<_>>(),
    })
}

fn describe_type(node_type: &NodeType) -> Value {
    json!({
        "name": node_type.name.as_str(),
        "parent": node_type.parent.as_deref(),
        "connection_of": node_type.connection_of.as_deref(),
        "fields": node_type
            .fields
            .values()
            .map(|field| json!({
                "name": field.name.as_str(),
                "type": field.field_type.to_string(),
                "description": field.description.as_deref(),
            }))
            .collect::<Vec<_>>(),
    })
}

fn describe_root_call(root_call: &RootCall) -> Value {
    json!({
        "name": root_call.name.as_str(),
        "returns": root_call.returns.as_str(),
        "arguments": root_call
            .arguments
            .iter()
            .map(|(name, field_type)| json!({
                "name": name.as_str(),
                "type": field_type.to_string(),
            }))
            .collect::<Vec<_>>(),
    })
}
