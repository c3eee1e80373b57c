//! Built-in node types for chainable scalar values.
//!
//! Scalars reached by a chained call or a sub-selection are re-wrapped in one
//! of these types; their fields are the permitted operations. `number` and
//! `boolean` expose no operations, so chaining off them reports an unknown
//! field rather than an unknown type.

use chrono::Datelike;
use chrono::Duration;
use chrono::NaiveDate;
use serde_json_bytes::Value;

use crate::error::QueryError;
use crate::json_ext::json_type_name;

use super::int_argument;
use super::node_type::FieldType;
use super::node_type::NodeType;
use super::Schema;

pub(crate) const STRING: &str = "string";
pub(crate) const NUMBER: &str = "number";
pub(crate) const BOOLEAN: &str = "boolean";
pub(crate) const DATE: &str = "date";

/// Wire form of `date` values.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(super) fn install(schema: &mut Schema) {
    schema.insert_node_type(string_type());
    schema.insert_node_type(NodeType::builder(NUMBER).build());
    schema.insert_node_type(NodeType::builder(BOOLEAN).build());
    schema.insert_node_type(date_type());
}

fn string_type() -> NodeType {
    NodeType::builder(STRING)
        .field_with(FieldType::Number, "length", |target, _, _| {
            let s = string_target(target)?;
            Ok(Value::Number(s.chars().count().into()))
        })
        .field_with(FieldType::String, "from", |target, arguments, _| {
            let s = string_target(target)?;
            let n = int_argument(arguments, 0, "from")?;
            let skip = usize::try_from(n).unwrap_or(0);
            Ok(Value::String(s.chars().skip(skip).collect::<String>().into()))
        })
        .field_with(FieldType::String, "for", |target, arguments, _| {
            let s = string_target(target)?;
            let n = int_argument(arguments, 0, "for")?;
            let take = usize::try_from(n).unwrap_or(0);
            Ok(Value::String(s.chars().take(take).collect::<String>().into()))
        })
        .field_with(FieldType::String, "upcase", |target, _, _| {
            Ok(Value::String(string_target(target)?.to_uppercase().into()))
        })
        .field_with(FieldType::String, "downcase", |target, _, _| {
            Ok(Value::String(string_target(target)?.to_lowercase().into()))
        })
        .build()
}

fn date_type() -> NodeType {
    NodeType::builder(DATE)
        .field_with(FieldType::Number, "year", |target, _, _| {
            Ok(Value::Number(i64::from(date_target(target)?.year()).into()))
        })
        .field_with(FieldType::Number, "month", |target, _, _| {
            Ok(Value::Number(i64::from(date_target(target)?.month()).into()))
        })
        .field_with(FieldType::Number, "day", |target, _, _| {
            Ok(Value::Number(i64::from(date_target(target)?.day()).into()))
        })
        .field_with(
            FieldType::Named(DATE.to_string()),
            "minus_days",
            |target, arguments, _| {
                let days = int_argument(arguments, 0, "minus_days")?;
                shifted(target, -days)
            },
        )
        .field_with(
            FieldType::Named(DATE.to_string()),
            "plus_days",
            |target, arguments, _| {
                let days = int_argument(arguments, 0, "plus_days")?;
                shifted(target, days)
            },
        )
        .build()
}

fn shifted(target: &Value, days: i64) -> Result<Value, QueryError> {
    let date = date_target(target)? + Duration::days(days);
    Ok(Value::String(date.format(DATE_FORMAT).to_string().into()))
}

fn string_target(target: &Value) -> Result<&str, QueryError> {
    target.as_str().ok_or_else(|| {
        QueryError::Resolver(format!(
            "expected a string value, got {}",
            json_type_name(target)
        ))
    })
}

fn date_target(target: &Value) -> Result<NaiveDate, QueryError> {
    let s = string_target(target)?;
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| QueryError::Resolver(format!("invalid date '{s}': {e}")))
}
