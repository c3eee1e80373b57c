//! Query text → AST.
//!
//! The grammar, informally:
//!
//! ```text
//! query         ::= selection_list fragment_def*
//! fragment_def  ::= "$" ident ":" "{" selection_list "}"
//! selection_list::= selection ("," selection)*
//! selection     ::= fragment_ref | field
//! fragment_ref  ::= "$" ident
//! field         ::= call ("as" ident)? ("{" selection_list "}")?
//! call          ::= ident ("(" arglist? ")")? ("." call)?
//! arglist       ::= literal ("," literal)*
//! literal       ::= integer | quoted_string
//! ```
//!
//! Whitespace and commas are interchangeable separators. Fragment definitions
//! are collected into [`Query::fragments`] and substituted during execution,
//! not at parse time, so a fragment is always expanded against the node type
//! that encloses its reference.

mod helpers;
mod location;

use indexmap::IndexMap;
use nom::branch::alt;
use nom::character::complete::char;
use nom::character::complete::multispace0;
use nom::combinator::cut;
use nom::combinator::eof;
use nom::combinator::map;
use nom::combinator::not;
use nom::combinator::opt;
use nom::error::Error as NomError;
use nom::error::ErrorKind;
use nom::multi::many0;
use nom::sequence::delimited;
use nom::sequence::preceded;
use serde::Serialize;

use crate::context::Context;
use crate::error::QueryError;
use helpers::identifier;
use helpers::integer_literal;
use helpers::is_ident_char;
use helpers::spaces_or_commas;
use helpers::string_literal;
use location::Span;

type ParseResult<'a, T> = nom::IResult<Span<'a>, T>;

/// A parsed query document, bound to the caller's [`Context`] but not yet to
/// a schema. Parsing and execution are separate phases; see
/// [`Query::execute`](crate::Query::execute).
#[derive(Debug)]
pub struct Query {
    text: String,
    root_calls: Vec<Call>,
    fragments: IndexMap<String, Fragment>,
    context: Context,
}

/// One call: a name, positional literal arguments, and everything the
/// grammar attaches after it. `alias` and `selections` are only populated on
/// the head of a dotted chain; the grammar attaches them after the full
/// chain.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Call {
    pub name: String,
    pub arguments: Vec<Literal>,
    pub alias: Option<String>,
    pub selections: Vec<Selection>,
    pub chained: Option<Box<Call>>,
}

/// A scalar literal argument.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Literal {
    Int(i64),
    String(String),
}

impl Literal {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One entry of a selection list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Selection {
    Field(Call),
    /// Reference to a named fragment, stored with its `$` sigil so it keys
    /// directly into [`Query::fragments`].
    FragmentRef(String),
}

/// A named, reusable selection set defined in the same query document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Fragment {
    /// The identifier, with its `$` sigil.
    pub name: String,
    pub selections: Vec<Selection>,
}

impl Query {
    /// Parses `text` into a query document. No schema is consulted; name
    /// binding happens during execution.
    #[tracing::instrument(skip_all, level = "trace")]
    pub fn parse(text: &str, context: Context) -> Result<Self, QueryError> {
        match document(location::new_span(text)) {
            Ok((_, (root_calls, fragments))) => Ok(Query {
                text: text.to_string(),
                root_calls,
                fragments,
                context,
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let error = location::syntax_error_at(text, e.input);
                tracing::debug!(%error, "rejected query text");
                Err(QueryError::Syntax(error))
            }
            // All parsers here are `complete`; this arm is unreachable in
            // practice but must still produce a sensible error.
            Err(nom::Err::Incomplete(_)) => {
                Err(QueryError::Syntax(location::syntax_error_at(text, location::new_span(text))))
            }
        }
    }

    /// The original query text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The fragment definitions of this document, in source order.
    pub fn fragments(&self) -> &IndexMap<String, Fragment> {
        &self.fragments
    }

    pub(crate) fn root_calls(&self) -> &[Call] {
        &self.root_calls
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }
}

// query ::= selection_list fragment_def*
//
// The root selection list admits only fields: every root selection has to
// dispatch through the root-call registry, so a bare fragment reference at
// the top level is rejected.
fn document(input: Span) -> ParseResult<(Vec<Call>, IndexMap<String, Fragment>)> {
    let (input, root_calls) = many0(preceded(spaces_or_commas, field))(input)?;
    let (input, fragments) = fragment_definitions(input)?;
    let (input, _) = spaces_or_commas(input)?;
    let (input, _) = eof(input)?;
    Ok((input, (root_calls, fragments)))
}

fn fragment_definitions(mut input: Span) -> ParseResult<IndexMap<String, Fragment>> {
    let mut fragments = IndexMap::new();
    loop {
        match fragment_definition(input) {
            Ok((rest, (at, fragment))) => {
                // Fragment identifiers are unique within a query.
                if fragments.insert(fragment.name.clone(), fragment).is_some() {
                    return Err(nom::Err::Failure(NomError::new(at, ErrorKind::Verify)));
                }
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, fragments)),
            Err(e) => return Err(e),
        }
    }
}

// fragment_def ::= "$" ident ":" "{" selection_list "}"
fn fragment_definition(input: Span) -> ParseResult<(Span, Fragment)> {
    let (input, _) = spaces_or_commas(input)?;
    let at = input;
    let (input, _) = char('$')(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = preceded(spaces_or_commas, char(':'))(input)?;
    let (input, selections) = sub_selections(input)?;
    let fragment = Fragment {
        name: format!("${name}"),
        selections,
    };
    Ok((input, (at, fragment)))
}

// selection_list ::= selection ("," selection)*
fn selection_list(input: Span) -> ParseResult<Vec<Selection>> {
    let (rest, selections) = many0(preceded(spaces_or_commas, selection))(input)?;

    // Alias strings must not collide within a single selection set.
    let mut seen: Vec<&str> = Vec::new();
    for selection in &selections {
        if let Selection::Field(call) = selection {
            if let Some(alias) = &call.alias {
                if seen.contains(&alias.as_str()) {
                    return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify)));
                }
                seen.push(alias.as_str());
            }
        }
    }

    Ok((rest, selections))
}

// selection ::= fragment_ref | field
fn selection(input: Span) -> ParseResult<Selection> {
    alt((
        map(fragment_ref, Selection::FragmentRef),
        map(field, Selection::Field),
    ))(input)
}

// fragment_ref ::= "$" ident
//
// A reference is distinguished from a definition by the absence of a
// following ":".
fn fragment_ref(input: Span) -> ParseResult<String> {
    let (input, _) = char('$')(input)?;
    let (input, name) = identifier(input)?;
    let (probe, _) = spaces_or_commas(input)?;
    if probe.fragment().starts_with(':') {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Tag)));
    }
    Ok((input, format!("${name}")))
}

// field ::= call ("as" ident)? ("{" selection_list "}")?
fn field(input: Span) -> ParseResult<Call> {
    let (input, mut call) = call_chain(input)?;
    let (input, alias) = opt(alias_clause)(input)?;
    let (input, selections) = opt(sub_selections)(input)?;
    call.alias = alias;
    call.selections = selections.unwrap_or_default();
    Ok((input, call))
}

// call ("." call)*
fn call_chain(input: Span) -> ParseResult<Call> {
    let (input, mut head) = call(input)?;
    let (input, mut tail) = many0(preceded(
        delimited(multispace0, char('.'), multispace0),
        call,
    ))(input)?;

    // Link the chain back to front.
    let mut chained = None;
    while let Some(mut link) = tail.pop() {
        link.chained = chained;
        chained = Some(Box::new(link));
    }
    head.chained = chained;

    Ok((input, head))
}

// call ::= ident ("(" arglist? ")")?
fn call(input: Span) -> ParseResult<Call> {
    let (input, name) = identifier(input)?;
    let (input, arguments) = opt(call_arguments)(input)?;
    Ok((
        input,
        Call {
            name,
            arguments: arguments.unwrap_or_default(),
            alias: None,
            selections: Vec::new(),
            chained: None,
        },
    ))
}

// arglist ::= literal ("," literal)*
fn call_arguments(input: Span) -> ParseResult<Vec<Literal>> {
    let (input, _) = preceded(multispace0, char('('))(input)?;
    let (input, arguments) = many0(preceded(spaces_or_commas, literal))(input)?;
    let (input, _) = cut(preceded(spaces_or_commas, char(')')))(input)?;
    Ok((input, arguments))
}

// literal ::= integer | quoted_string
fn literal(input: Span) -> ParseResult<Literal> {
    alt((
        map(integer_literal, Literal::Int),
        map(string_literal, Literal::String),
    ))(input)
}

// "as" ident
//
// The keyword needs a word boundary so a field like `assignee` is not read
// as `as signee`. Once the keyword is recognized the identifier is required.
fn alias_clause(input: Span) -> ParseResult<String> {
    let (input, _) = spaces_or_commas(input)?;
    let (input, _) = nom::bytes::complete::tag("as")(input)?;
    let (input, _) = not(nom::character::complete::satisfy(is_ident_char))(input)?;
    let (input, _) = spaces_or_commas(input)?;
    cut(identifier)(input)
}

// "{" selection_list "}"
fn sub_selections(input: Span) -> ParseResult<Vec<Selection>> {
    let (input, _) = preceded(spaces_or_commas, char('{'))(input)?;
    let (input, selections) = selection_list(input)?;
    let (rest, _) = spaces_or_commas(input)?;
    if selections.is_empty() {
        return Err(nom::Err::Failure(NomError::new(rest, ErrorKind::Many1)));
    }
    let (rest, _) = cut(char('}'))(rest)?;
    Ok((rest, selections))
}
