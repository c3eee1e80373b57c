//! Conventional fields of collection (connection) node types.
//!
//! A connection wraps a sequence of element entities. Registration gives it
//! `count`, `any`, and `edges`, plus the pagination calls `first(n)` and
//! `after(cursor)`, which return a filtered collection of the same type.
//! Caller-declared fields of the same name win over the synthesized ones.

use serde_json_bytes::json;
use serde_json_bytes::Value;

use crate::error::QueryError;
use crate::json_ext::json_type_name;
use crate::json_ext::stringified_id;

use super::int_argument;
use super::node_type::FieldDef;
use super::node_type::FieldType;
use super::node_type::NodeType;
use super::str_argument;

pub(super) fn add_conventional_fields(connection: &mut NodeType, edge_name: &str) {
    let count = FieldDef::with_resolver(FieldType::Number, "count", |target, _, _| {
        Ok(Value::Number(elements(target)?.len().into()))
    });
    let any = FieldDef::with_resolver(FieldType::Boolean, "any", |target, _, _| {
        Ok(Value::Bool(!elements(target)?.is_empty()))
    });

    let id_field = connection.id_field.clone();
    let edges = FieldDef::with_resolver(
        FieldType::Named(edge_name.to_string()),
        "edges",
        move |target, _, _| {
            let edges = elements(target)?
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    let cursor = element_id(element, &id_field).unwrap_or_else(|| index.to_string());
                    json!({ "cursor": cursor, "node": element })
                })
                .collect();
            Ok(Value::Array(edges))
        },
    );

    let first = FieldDef::with_resolver(
        FieldType::Named(connection.name.clone()),
        "first",
        |target, arguments, _| {
            let n = int_argument(arguments, 0, "first")?;
            let take = usize::try_from(n).unwrap_or(0);
            Ok(Value::Array(elements(target)?.iter().take(take).cloned().collect()))
        },
    );

    let id_field = connection.id_field.clone();
    let after = FieldDef::with_resolver(
        FieldType::Named(connection.name.clone()),
        "after",
        move |target, arguments, _| {
            let cursor = str_argument(arguments, 0, "after")?;
            let elements = elements(target)?;
            // Nothing pages after an unknown cursor.
            let remaining = match elements
                .iter()
                .position(|element| element_id(element, &id_field).as_deref() == Some(cursor))
            {
                Some(position) => elements.iter().skip(position + 1).cloned().collect(),
                None => Vec::new(),
            };
            Ok(Value::Array(remaining))
        },
    );

    for field in [count, any, edges, first, after] {
        if !connection.fields.contains_key(&field.name) {
            connection.fields.insert(field.name.clone(), field);
        }
    }
}

/// The edge type paired with a connection: `cursor` plus the wrapped element.
pub(super) fn edge_type(edge_name: &str, element: &str) -> NodeType {
    NodeType::builder(edge_name)
        .string("cursor")
        .node("node", element)
        .build()
}

fn elements(target: &Value) -> Result<&Vec<Value>, QueryError> {
    target.as_array().ok_or_else(|| {
        QueryError::Resolver(format!(
            "expected a collection, got {}",
            json_type_name(target)
        ))
    })
}

fn element_id(element: &Value, id_field: &str) -> Option<String> {
    element
        .as_object()
        .and_then(|object| object.get(id_field))
        .and_then(stringified_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn connection() -> NodeType {
        let mut node_type = NodeType::builder("comments").connection_of("comment").build();
        add_conventional_fields(&mut node_type, "comments_edge");
        node_type
    }

    fn sample() -> Value {
        json!([
            { "id": 444, "content": "I agree" },
            { "id": 445, "content": "I disagree" },
        ])
    }

    #[test]
    fn count_and_any() {
        let connection = connection();
        let context = Context::new();
        let count = (connection.fields["count"].resolver)(&sample(), &[], &context).unwrap();
        assert_eq!(count, json!(2));
        let any = (connection.fields["any"].resolver)(&sample(), &[], &context).unwrap();
        assert_eq!(any, json!(true));
        let any = (connection.fields["any"].resolver)(&json!([]), &[], &context).unwrap();
        assert_eq!(any, json!(false));
    }

    #[test]
    fn edges_carry_cursors_and_nodes() {
        let connection = connection();
        let edges = (connection.fields["edges"].resolver)(&sample(), &[], &Context::new()).unwrap();
        assert_eq!(
            edges,
            json!([
                { "cursor": "444", "node": { "id": 444, "content": "I agree" } },
                { "cursor": "445", "node": { "id": 445, "content": "I disagree" } },
            ])
        );
    }

    #[test]
    fn first_truncates_the_collection() {
        let connection = connection();
        let first = (connection.fields["first"].resolver)(
            &sample(),
            &[crate::ast::Literal::Int(1)],
            &Context::new(),
        )
        .unwrap();
        assert_eq!(first, json!([{ "id": 444, "content": "I agree" }]));
    }

    #[test]
    fn after_pages_past_the_cursor() {
        let connection = connection();
        let context = Context::new();
        let after = (connection.fields["after"].resolver)(
            &sample(),
            &[crate::ast::Literal::String("444".to_string())],
            &context,
        )
        .unwrap();
        assert_eq!(after, json!([{ "id": 445, "content": "I disagree" }]));

        let after = (connection.fields["after"].resolver)(
            &sample(),
            &[crate::ast::Literal::String("999".to_string())],
            &context,
        )
        .unwrap();
        assert_eq!(after, json!([]));
    }
}
