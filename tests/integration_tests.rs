//! End-to-end scenarios against a small blog schema: one post, two comments,
//! two likes.

use nodeql::json;
use nodeql::Context;
use nodeql::FieldType;
use nodeql::Literal;
use nodeql::NodeType;
use nodeql::Object;
use nodeql::Query;
use nodeql::QueryError;
use nodeql::RootCall;
use nodeql::RootValue;
use nodeql::Schema;
use nodeql::Value;
use pretty_assertions::assert_eq;

fn posts() -> Value {
    json!([
        {
            "id": 123,
            "title": "My great post",
            "content": "So many great things",
            "published_at": "2010-01-04",
        },
    ])
}

fn comments() -> Value {
    json!([
        { "id": 444, "post_id": 123, "content": "I agree", "rating": 5 },
        { "id": 445, "post_id": 123, "content": "I disagree", "rating": 1 },
    ])
}

fn likes() -> Value {
    json!([
        { "id": 991, "post_id": 123 },
        { "id": 992, "post_id": 123 },
    ])
}

fn by_ids(data: Value, arguments: &[Literal]) -> Vec<Value> {
    let entities = data.as_array().cloned().unwrap_or_default();
    arguments
        .iter()
        .filter_map(Literal::as_i64)
        .filter_map(|id| {
            entities
                .iter()
                .find(|entity| {
                    entity.as_object().and_then(|o| o.get("id")).and_then(Value::as_i64)
                        == Some(id)
                })
                .cloned()
        })
        .collect()
}

fn related_to(data: Value, post: &Value) -> Value {
    let post_id = post.as_object().and_then(|o| o.get("id")).cloned();
    let related = data
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|entity| entity.as_object().and_then(|o| o.get("post_id")).cloned() == post_id)
        .collect();
    Value::Array(related)
}

fn blog_schema() -> Schema {
    let mut schema = Schema::new();

    schema
        .register_node_type(NodeType::builder("record").number("id").build())
        .unwrap();

    schema
        .register_node_type(
            NodeType::builder("post")
                .parent("record")
                .string("title")
                .describe("Headline of the post")
                .string("content")
                .node("published_at", "date")
                .node_with("comments", "comments", |target, _, _| {
                    Ok(related_to(comments(), target))
                })
                .node_with("likes", "likes", |target, _, _| Ok(related_to(likes(), target)))
                .build(),
        )
        .unwrap();

    schema
        .register_node_type(
            NodeType::builder("comment")
                .parent("record")
                .string("content")
                .number("rating")
                .field_with(FieldType::String, "letters", |target, _, _| {
                    Ok(target
                        .as_object()
                        .and_then(|o| o.get("content"))
                        .cloned()
                        .unwrap_or(Value::Null))
                })
                .build(),
        )
        .unwrap();

    schema
        .register_node_type(
            NodeType::builder("comments")
                .connection_of("comment")
                .field_with(FieldType::Number, "average_rating", |target, _, _| {
                    let elements = target.as_array().cloned().unwrap_or_default();
                    if elements.is_empty() {
                        return Ok(Value::Number(0.into()));
                    }
                    let total: i64 = elements
                        .iter()
                        .filter_map(|c| c.as_object().and_then(|o| o.get("rating")))
                        .filter_map(Value::as_i64)
                        .sum();
                    Ok(Value::Number((total / elements.len() as i64).into()))
                })
                .build(),
        )
        .unwrap();

    schema
        .register_node_type(NodeType::builder("like").parent("record").build())
        .unwrap();
    schema
        .register_node_type(NodeType::builder("likes").connection_of("like").build())
        .unwrap();

    schema
        .register_node_type(NodeType::builder("context").string("viewer").build())
        .unwrap();

    schema
        .register_root_call(
            RootCall::new("post", "post", |_, arguments, _| {
                by_ids(posts(), arguments)
                    .into_iter()
                    .next()
                    .map(RootValue::One)
                    .ok_or_else(|| QueryError::Resolver("no such post".to_string()))
            })
            .argument("id", FieldType::Number),
        )
        .unwrap();

    schema
        .register_root_call(
            RootCall::new("comment", "comment", |_, arguments, _| {
                Ok(RootValue::Many(by_ids(comments(), arguments)))
            })
            .argument("ids", FieldType::Number),
        )
        .unwrap();

    schema
}

fn run(text: &str) -> Object {
    run_with_context(text, Context::new())
}

fn run_with_context(text: &str, context: Context) -> Object {
    Query::parse(text, context)
        .unwrap()
        .execute(&blog_schema())
        .unwrap()
}

fn run_err(text: &str) -> QueryError {
    Query::parse(text, Context::new())
        .unwrap()
        .execute(&blog_schema())
        .unwrap_err()
}

#[test]
fn resolves_scalar_fields_on_a_root_call() {
    let result = run("post(123) { title, content }");
    assert_eq!(
        Value::Object(result),
        json!({
            "123": { "title": "My great post", "content": "So many great things" },
        })
    );
}

#[test]
fn result_keys_follow_selection_order() {
    let result = run("post(123) { content, title }");
    let post = result.get("123").unwrap().as_object().unwrap();
    let keys: Vec<_> = post.keys().map(|k| k.as_str().to_owned()).collect();
    assert_eq!(keys, vec!["content", "title"]);
}

#[test]
fn multiple_root_results_follow_argument_order() {
    let result = run("comment(444, 445) { content }");
    let keys: Vec<_> = result.keys().map(|k| k.as_str().to_owned()).collect();
    assert_eq!(keys, vec!["444", "445"]);

    let result = run("comment(445, 444) { content }");
    let keys: Vec<_> = result.keys().map(|k| k.as_str().to_owned()).collect();
    assert_eq!(keys, vec!["445", "444"]);
}

#[test]
fn date_chains_and_sub_selections() {
    let result = run("post(123) { published_at.minus_days(200) { year } }");
    assert_eq!(
        Value::Object(result),
        json!({ "123": { "published_at": { "year": 2009 } } })
    );
}

#[test]
fn aliases_replace_the_original_key() {
    let result = run("post(123) { title as headline }");
    let post = result.get("123").unwrap().as_object().unwrap();
    assert_eq!(post.get("headline"), Some(&json!("My great post")));
    assert!(!post.contains_key("title"));
}

#[test]
fn first_limits_the_connection() {
    let result = run("post(123) { comments.first(1) { edges { cursor, node { content } } } }");
    assert_eq!(
        Value::Object(result),
        json!({
            "123": {
                "comments": {
                    "edges": [
                        { "cursor": "444", "node": { "content": "I agree" } },
                    ],
                },
            },
        })
    );
}

#[test]
fn string_chains_slice_characters() {
    let result = run("comment(444) { letters.from(3).for(2) as snippet }");
    assert_eq!(Value::Object(result), json!({ "444": { "snippet": "gr" } }));
}

#[test]
fn syntax_errors_report_position_and_excerpt() {
    let error = Query::parse("\n\n<< bogus >>", Context::new()).unwrap_err();
    let QueryError::Syntax(syntax) = &error else {
        panic!("expected a syntax error, got {error:?}");
    };
    assert_eq!(syntax.line, 1);
    assert_eq!(syntax.column, 1);
    assert_eq!(syntax.snippet, "<< bogus >>");
    let message = error.to_string();
    assert!(message.contains("1, 1"), "unexpected message: {message}");
    assert!(message.contains("<< bogus >>"), "unexpected message: {message}");
}

#[test]
fn count_matches_edges_without_pagination() {
    let result = run("post(123) { comments { count, any, edges { cursor } } }");
    assert_eq!(
        Value::Object(result),
        json!({
            "123": {
                "comments": {
                    "count": 2,
                    "any": true,
                    "edges": [{ "cursor": "444" }, { "cursor": "445" }],
                },
            },
        })
    );
}

#[test]
fn after_pages_past_the_cursor() {
    let result = run("post(123) { comments.after(\"444\") { count, edges { node { content } } } }");
    assert_eq!(
        Value::Object(result),
        json!({
            "123": {
                "comments": {
                    "count": 1,
                    "edges": [{ "node": { "content": "I disagree" } }],
                },
            },
        })
    );
}

#[test]
fn collections_support_custom_aggregate_fields() {
    let result = run("post(123) { comments { average_rating } }");
    assert_eq!(
        Value::Object(result),
        json!({ "123": { "comments": { "average_rating": 3 } } })
    );
}

#[test]
fn likes_form_an_independent_connection() {
    let result = run("post(123) { likes { count, edges { cursor } } }");
    assert_eq!(
        Value::Object(result),
        json!({
            "123": { "likes": { "count": 2, "edges": [{ "cursor": "991" }, { "cursor": "992" }] } },
        })
    );
}

#[test]
fn fields_inherit_from_the_parent_type() {
    let result = run("comment(444) { id, content }");
    assert_eq!(
        Value::Object(result),
        json!({ "444": { "id": 444, "content": "I agree" } })
    );
}

#[test]
fn fragments_substitute_against_the_current_node() {
    let result = run("post(123) { $head } $head: { title as headline, content }");
    assert_eq!(
        Value::Object(result),
        json!({
            "123": { "headline": "My great post", "content": "So many great things" },
        })
    );
}

#[test]
fn fragments_are_exposed_with_their_metadata() {
    let query = Query::parse(
        "post(123) { $head } $head: { title, content }",
        Context::new(),
    )
    .unwrap();
    let fragment = &query.fragments()["$head"];
    assert_eq!(fragment.name, "$head");
    assert_eq!(fragment.selections.len(), 2);
}

#[test]
fn context_round_trips_through_the_distinguished_root_call() {
    let context = Context::new();
    context.insert("viewer", "someone").unwrap();
    let result = run_with_context("context { viewer }", context);
    assert_eq!(
        Value::Object(result),
        json!({ "context": { "viewer": "someone" } })
    );
}

#[test]
fn root_call_aliases_rename_single_results() {
    let result = run("post(123) as featured { title }");
    assert_eq!(
        Value::Object(result),
        json!({ "featured": { "title": "My great post" } })
    );
}

#[test]
fn unknown_fields_abort_the_query() {
    assert_eq!(
        run_err("post(123) { nonsense }"),
        QueryError::FieldNotDefined("nonsense".to_string(), "post".to_string())
    );
}

#[test]
fn unknown_fragments_abort_the_query() {
    assert_eq!(
        run_err("post(123) { $missing }"),
        QueryError::FragmentNotDefined("$missing".to_string())
    );
}

#[test]
fn unknown_root_calls_abort_the_query() {
    assert_eq!(
        run_err("page(1) { title }"),
        QueryError::RootCallNotFound("page".to_string())
    );
}

#[test]
fn resolver_errors_propagate_unmodified() {
    assert_eq!(
        run_err("post(999) { title }"),
        QueryError::Resolver("no such post".to_string())
    );
}

#[test]
fn introspects_a_node_type_by_name() {
    let result = run("type(\"post\") { name, connection_of, fields { name, type } }");
    let described = result.get("post").unwrap().as_object().unwrap();
    assert_eq!(described.get("name"), Some(&json!("post")));
    assert_eq!(described.get("connection_of"), Some(&Value::Null));

    let fields = described.get("fields").unwrap().as_array().unwrap();
    let names: Vec<_> = fields
        .iter()
        .map(|f| f.as_object().unwrap().get("name").unwrap().clone())
        .collect();
    assert_eq!(
        names,
        vec![
            json!("title"),
            json!("content"),
            json!("published_at"),
            json!("comments"),
            json!("likes"),
        ]
    );
    assert_eq!(
        fields[2].as_object().unwrap().get("type"),
        Some(&json!("date"))
    );
}

#[test]
fn introspects_the_whole_schema() {
    let result = run("schema() { types { name }, root_calls { name, returns } }");
    let schema = result.get("schema").unwrap().as_object().unwrap();

    let type_names: Vec<_> = schema
        .get("types")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t.as_object().unwrap().get("name").unwrap().as_str())
        .map(str::to_owned)
        .collect();
    for expected in ["string", "date", "post", "comment", "comments", "comments_edge"] {
        assert!(type_names.iter().any(|n| n == expected), "missing {expected}");
    }

    let root_calls = schema.get("root_calls").unwrap().as_array().unwrap();
    assert!(root_calls.iter().any(|c| {
        let call = c.as_object().unwrap();
        call.get("name").unwrap().as_str() == Some("post")
            && call.get("returns").unwrap().as_str() == Some("post")
    }));
}

#[test]
fn underlying_data_is_untouched_by_failures() {
    // The fixtures are rebuilt per resolver call, so all this can assert is
    // that a failing query leaves later queries undisturbed.
    run_err("post(123) { nonsense }");
    let result = run("post(123) { title }");
    assert_eq!(
        Value::Object(result),
        json!({ "123": { "title": "My great post" } })
    );
}
