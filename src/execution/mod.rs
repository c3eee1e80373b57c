//! AST traversal and result assembly.
//!
//! Execution is synchronous and single-threaded within a query: root calls
//! run in source order, every selection set evaluates in source order, and
//! the output object preserves insertion order throughout.

mod node;

use serde_json_bytes::Value;

use crate::ast::Call;
use crate::ast::Query;
use crate::ast::Selection;
use crate::error::QueryError;
use crate::json_ext::Object;
use crate::schema::FieldType;
use crate::schema::NodeType;
use crate::schema::RootValue;
use crate::schema::Schema;
use node::Node;

impl Query {
    /// Executes the query against `schema`, producing the nested result
    /// mapping.
    #[tracing::instrument(skip_all, level = "trace")]
    pub fn execute(&self, schema: &Schema) -> Result<Object, QueryError> {
        Executor {
            schema,
            query: self,
        }
        .run()
    }
}

struct Executor<'a> {
    schema: &'a Schema,
    query: &'a Query,
}

impl<'a> Executor<'a> {
    fn run(&self) -> Result<Object, QueryError> {
        let mut output = Object::new();
        for call in self.query.root_calls() {
            self.execute_root_call(call, &mut output)?;
        }
        Ok(output)
    }

    fn execute_root_call(&self, call: &Call, output: &mut Object) -> Result<(), QueryError> {
        let root = self.schema.resolve_root(&call.name)?;
        let return_type = self.schema.lookup(&root.returns)?;
        tracing::trace!(root_call = call.name.as_str(), "dispatching root call");

        match (root.resolver)(self.schema, &call.arguments, self.query.context())? {
            RootValue::One(value) => {
                // An argument-less call keys its result under its own name;
                // otherwise the target's identity projection wins. An alias
                // overrides either.
                let key = call
                    .alias
                    .clone()
                    .or_else(|| {
                        if call.arguments.is_empty() {
                            Some(call.name.clone())
                        } else {
                            return_type.result_key(&value)
                        }
                    })
                    .unwrap_or_else(|| call.name.clone());
                let rendered =
                    self.evaluate(value, FieldType::Named(root.returns.clone()), call)?;
                output.insert(key.as_str(), rendered);
            }
            RootValue::Many(values) => {
                for (index, value) in values.into_iter().enumerate() {
                    let key = return_type
                        .result_key(&value)
                        .unwrap_or_else(|| index.to_string());
                    let rendered =
                        self.evaluate(value, FieldType::Named(root.returns.clone()), call)?;
                    output.insert(key.as_str(), rendered);
                }
            }
        }
        Ok(())
    }

    // Applies the chained calls of `call` and then its sub-selections to an
    // already-resolved value of type `field_type`.
    fn evaluate(
        &self,
        value: Value,
        field_type: FieldType,
        call: &Call,
    ) -> Result<Value, QueryError> {
        let (value, field_type) = self.apply_chain(value, field_type, call)?;
        self.render(value, &field_type, &call.selections)
    }

    // Chained calls apply left to right; each hop re-wraps the intermediate
    // value in the node type named by the previous hop's declared type, so
    // scalar values chain through their built-in wrapper types.
    fn apply_chain(
        &self,
        mut value: Value,
        mut field_type: FieldType,
        head: &Call,
    ) -> Result<(Value, FieldType), QueryError> {
        let mut link = head.chained.as_deref();
        while let Some(call) = link {
            let node_type = self.node_type_for(&field_type)?;
            let field = self.schema.field_on(node_type, &call.name)?;
            let node = Node::new(value, node_type, self.query.context());
            value = (field.resolver)(&node.target, &call.arguments, node.context)?;
            field_type = field.field_type.clone();
            link = call.chained.as_deref();
        }
        Ok((value, field_type))
    }

    fn render(
        &self,
        value: Value,
        field_type: &FieldType,
        selections: &[Selection],
    ) -> Result<Value, QueryError> {
        if selections.is_empty() {
            return Ok(value);
        }
        let node_type = self.node_type_for(field_type)?;
        match value {
            // A sequence of a non-connection type renders element-wise
            // (edges, introspection lists). A connection keeps its sequence
            // as the target of a single collection node.
            Value::Array(elements) if !node_type.is_connection() => elements
                .into_iter()
                .map(|element| self.render_node(element, node_type, selections))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => self.render_node(other, node_type, selections),
        }
    }

    fn render_node(
        &self,
        target: Value,
        node_type: &NodeType,
        selections: &[Selection],
    ) -> Result<Value, QueryError> {
        if target.is_null() {
            return Err(QueryError::Resolver(format!(
                "cannot apply a selection set to a null value of type '{}'",
                node_type.name()
            )));
        }
        let node = Node::new(target, node_type, self.query.context());
        let mut output = Object::new();
        self.apply_selection_set(&node, selections, &mut output)?;
        Ok(Value::Object(output))
    }

    fn apply_selection_set(
        &self,
        node: &Node<'_>,
        selections: &[Selection],
        output: &mut Object,
    ) -> Result<(), QueryError> {
        for selection in selections {
            match selection {
                Selection::Field(call) => {
                    let field = self.schema.field_on(node.node_type, &call.name)?;
                    let value = (field.resolver)(&node.target, &call.arguments, node.context)?;
                    let rendered = self.evaluate(value, field.field_type.clone(), call)?;
                    let key = call.alias.as_deref().unwrap_or(call.name.as_str());
                    output.insert(key, rendered);
                }
                Selection::FragmentRef(name) => {
                    let fragment = self
                        .query
                        .fragments()
                        .get(name.as_str())
                        .ok_or_else(|| QueryError::FragmentNotDefined(name.clone()))?;
                    // Spliced inline: the fragment's selections evaluate
                    // against the current node, at the current position.
                    self.apply_selection_set(node, &fragment.selections, output)?;
                }
            }
        }
        Ok(())
    }

    fn node_type_for(&self, field_type: &FieldType) -> Result<&'a NodeType, QueryError> {
        self.schema.lookup(field_type.type_name())
    }
}
