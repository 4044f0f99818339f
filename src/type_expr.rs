//! Parser for the type expressions carried by the model (`declared_type`,
//! `type_decl()`), for renderers that need to look inside them.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, satisfy},
    combinator::{all_consuming, map, opt, recognize},
    sequence::{pair, preceded, terminated},
};
use std::fmt;

use crate::TypeExprError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `string`, `Pet`, `time.Time`
    Named {
        qualifier: Option<String>,
        name: String,
    },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `interface{}`
    Any,
    /// An inline record; holds the text between the outer braces.
    Record(String),
}

impl TypeExpr {
    /// Innermost named type below pointers and slices.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, .. } => Some(name),
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) => inner.reference_name(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named {
                qualifier: Some(qualifier),
                name,
            } => write!(f, "{}.{}", qualifier, name),
            TypeExpr::Named { name, .. } => write!(f, "{}", name),
            TypeExpr::Pointer(inner) => write!(f, "*{}", inner),
            TypeExpr::Slice(inner) => write!(f, "[]{}", inner),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Any => write!(f, "interface{{}}"),
            TypeExpr::Record(body) => write!(f, "struct {{{}}}", body),
        }
    }
}

pub fn parse_type_expr(input: &str) -> Result<TypeExpr, TypeExprError> {
    match all_consuming(type_expr)(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(TypeExprError::Syntax {
            input: input.to_string(),
            remaining: e.input.to_string(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(TypeExprError::Incomplete(input.to_string())),
    }
}

fn type_expr(input: &str) -> IResult<&str, TypeExpr> {
    alt((pointer, slice, map_type, any, record, named))(input)
}

fn pointer(input: &str) -> IResult<&str, TypeExpr> {
    map(preceded(char('*'), type_expr), |inner| {
        TypeExpr::Pointer(Box::new(inner))
    })(input)
}

fn slice(input: &str) -> IResult<&str, TypeExpr> {
    map(preceded(tag("[]"), type_expr), |inner| {
        TypeExpr::Slice(Box::new(inner))
    })(input)
}

fn map_type(input: &str) -> IResult<&str, TypeExpr> {
    map(
        preceded(tag("map["), pair(terminated(type_expr, char(']')), type_expr)),
        |(key, value)| TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        },
    )(input)
}

fn any(input: &str) -> IResult<&str, TypeExpr> {
    map(tag("interface{}"), |_| TypeExpr::Any)(input)
}

/// `struct {` ... `}` with nested braces balanced. Braces inside `//` line
/// comments and backquoted tags don't count.
fn record(input: &str) -> IResult<&str, TypeExpr> {
    let (rest, _) = tag("struct {")(input)?;

    let mut depth = 1usize;
    let mut in_tag = false;
    let mut in_comment = false;
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if in_tag {
            in_tag = c != '`';
            continue;
        }
        match c {
            '`' => in_tag = true,
            '/' if matches!(chars.peek(), Some((_, '/'))) => in_comment = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let body = rest[..i].to_string();
                    return Ok((&rest[i + 1..], TypeExpr::Record(body)));
                }
            }
            _ => {}
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        rest,
        nom::error::ErrorKind::Char,
    )))
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_identifier_start), take_while(is_identifier_char)))(input)
}

fn named(input: &str) -> IResult<&str, TypeExpr> {
    map(
        pair(identifier, opt(preceded(char('.'), identifier))),
        |(first, second)| match second {
            Some(name) => TypeExpr::Named {
                qualifier: Some(first.to_string()),
                name: name.to_string(),
            },
            None => TypeExpr::Named {
                qualifier: None,
                name: first.to_string(),
            },
        },
    )(input)
}
