use nom::bytes::complete::take_while;
use nom::character::complete::digit1;
use nom::character::complete::satisfy;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::error::Error as NomError;
use nom::error::ErrorKind;
use nom::sequence::pair;
use nom::Slice;

use super::location::Span;
use super::ParseResult;

pub(super) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// Whitespace and commas are interchangeable separators, and trailing commas
// are permitted wherever a separator is.
pub(super) fn spaces_or_commas(input: Span) -> ParseResult<Span> {
    take_while(|c: char| c.is_whitespace() || c == ',')(input)
}

// Identifier ::= [A-Za-z_] [A-Za-z0-9_]*
pub(super) fn identifier(input: Span) -> ParseResult<String> {
    let (input, name) = recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)?;
    Ok((input, (*name.fragment()).to_string()))
}

// Integer ::= "-"? [0-9]+
pub(super) fn integer_literal(input: Span) -> ParseResult<i64> {
    let (rest, digits) = recognize(pair(opt(nom::character::complete::char('-')), digit1))(input)?;
    match digits.fragment().parse::<i64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Failure(NomError::new(input, ErrorKind::Digit))),
    }
}

// StringLiteral ::=
//   | "'" ("\\" any | [^'])* "'"
//   | '"' ("\\" any | [^"])* '"'
//
// Escapes translate \n and \t; any other escaped character stands for itself.
pub(super) fn string_literal(input: Span) -> ParseResult<String> {
    let source = *input.fragment();
    let mut indices = source.char_indices();

    let quote = match indices.next() {
        Some((_, c @ ('"' | '\''))) => c,
        _ => return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char))),
    };

    let mut value = String::new();
    let mut escaped = false;
    for (i, c) in indices {
        if escaped {
            value.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok((input.slice(i + c.len_utf8()..), value));
        } else {
            value.push(c);
        }
    }

    // Unterminated literal: the quote commits us, so this is fatal.
    Err(nom::Err::Failure(NomError::new(input, ErrorKind::Char)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::location::new_span;

    fn check_string(input: &str, expected: &str, remainder: &str) {
        match string_literal(new_span(input)) {
            Ok((rest, value)) => {
                assert_eq!(value, expected);
                assert_eq!(*rest.fragment(), remainder);
            }
            Err(e) => panic!("error parsing {input:?}: {e:?}"),
        }
    }

    #[test]
    fn test_string_literals() {
        check_string("\"hello\"", "hello", "");
        check_string("'hello'", "hello", "");
        check_string("\"he said \\\"hi\\\"\" rest", "he said \"hi\"", " rest");
        check_string("'line\\nbreak'", "line\nbreak", "");
        check_string("\"\"", "", "");
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        assert!(matches!(
            string_literal(new_span("\"oops")),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_identifiers() {
        let (rest, name) = identifier(new_span("published_at.minus_days")).unwrap();
        assert_eq!(name, "published_at");
        assert_eq!(*rest.fragment(), ".minus_days");

        assert!(identifier(new_span("123abc")).is_err());
        assert!(identifier(new_span("$frag")).is_err());
    }

    #[test]
    fn test_integers() {
        let (_, n) = integer_literal(new_span("123")).unwrap();
        assert_eq!(n, 123);
        let (_, n) = integer_literal(new_span("-45,")).unwrap();
        assert_eq!(n, -45);
    }

    #[test]
    fn test_separators() {
        let (rest, eaten) = spaces_or_commas(new_span(" ,\n\t, title")).unwrap();
        assert_eq!(*eaten.fragment(), " ,\n\t, ");
        assert_eq!(*rest.fragment(), "title");
    }
}
