//! An in-process engine for a compact, nested field-selection query
//! language.
//!
//! A query names root calls, selects fields off the nodes they return,
//! chains field-level calls with `.`, renames output keys with `as`, and
//! reuses selection sets through `$fragment` definitions:
//!
//! ```text
//! post(123) {
//!     title as headline,
//!     published_at.minus_days(200) { year },
//!     comments.first(1) { edges { cursor, node { content } } },
//! }
//! ```
//!
//! Parsing and execution are separate phases: [`Query::parse`] turns text
//! into an AST without consulting a schema, and [`Query::execute`] walks the
//! AST against a [`Schema`] of registered node types and root calls,
//! producing an insertion-ordered result [`Object`]. The caller-supplied
//! [`Context`] rides along opaquely and is available to every resolver.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

mod ast;
mod context;
mod error;
mod execution;
mod json_ext;
mod schema;

pub use crate::ast::Call;
pub use crate::ast::Fragment;
pub use crate::ast::Literal;
pub use crate::ast::Query;
pub use crate::ast::Selection;
pub use crate::context::Context;
pub use crate::error::QueryError;
pub use crate::error::SyntaxError;
pub use crate::json_ext::Object;
pub use crate::schema::FieldDef;
pub use crate::schema::FieldResolver;
pub use crate::schema::FieldType;
pub use crate::schema::NodeType;
pub use crate::schema::NodeTypeBuilder;
pub use crate::schema::RootCall;
pub use crate::schema::RootResolver;
pub use crate::schema::RootValue;
pub use crate::schema::Schema;

pub use serde_json_bytes::json;
pub use serde_json_bytes::Value;
