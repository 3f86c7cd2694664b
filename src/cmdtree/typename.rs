//! # Type-Name Parser
//!
//! Declared parameter types arrive as text such as `number[]` or `Record<string, number[]>`.
//! This module turns that text into a [`TypeDescriptor`] tree with a small recursive-descent
//! parser over the grammar:
//!
//! ```text
//! TypeExpr   := Identifier ('[' ']')*
//!             | Identifier '<' TypeExpr (',' TypeExpr)* '>'
//! Identifier := [A-Za-z_$][A-Za-z0-9_$]*
//! ```
//!
//! Whitespace between tokens is skipped. The `T[]` shorthand desugars to `Array<T>`, so
//! `number[]` and `Array<number>` produce identical descriptors.
//!
//! Errors carry the character offset where parsing stopped, which is what the user needs to
//! locate a typo in a long nested type.

use crate::error::{CliError, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// Generic base names whose single type parameter is the element type.
pub const ARRAY_LIKE: &[&str] = &["Array", "ReadonlyArray", "Set", "ReadonlySet"];

/// Generic base names whose two type parameters are key then value.
pub const RECORD_LIKE: &[&str] = &["Record", "Map", "ReadonlyMap"];

const ARRAY: &str = "Array";

/// A parsed type-name expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub type_name: String,
    pub type_parameters: Vec<TypeDescriptor>,
}

/// How a descriptor should be decoded from argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape<'a> {
    Array {
        element: &'a TypeDescriptor,
    },
    Record {
        key: &'a TypeDescriptor,
        value: &'a TypeDescriptor,
    },
    Plain,
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            type_name: name.into(),
            type_parameters: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, type_parameters: Vec<TypeDescriptor>) -> Self {
        Self {
            type_name: name.into(),
            type_parameters,
        }
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::generic(ARRAY, vec![element])
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    /// Classifies the descriptor by its base name.
    ///
    /// Known array-like and record-like names must carry exactly one and two type parameters
    /// respectively; anything else is [`TypeShape::Plain`].
    pub fn shape(&self) -> Result<TypeShape<'_>> {
        let name = self.type_name.as_str();
        if ARRAY_LIKE.contains(&name) {
            return match self.type_parameters.as_slice() {
                [element] => Ok(TypeShape::Array { element }),
                other => Err(arity_error(name, 1, other.len())),
            };
        }
        if RECORD_LIKE.contains(&name) {
            return match self.type_parameters.as_slice() {
                [key, value] => Ok(TypeShape::Record { key, value }),
                other => Err(arity_error(name, 2, other.len())),
            };
        }
        Ok(TypeShape::Plain)
    }
}

fn arity_error(name: &str, expected: usize, found: usize) -> CliError {
    CliError::GenericArity {
        name: name.to_string(),
        expected,
        found,
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        if self.type_parameters.is_empty() {
            return Ok(());
        }
        write!(f, "<")?;
        for (i, param) in self.type_parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ">")
    }
}

impl std::str::FromStr for TypeDescriptor {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

/// Parses a type-name expression into a [`TypeDescriptor`].
pub fn parse(text: &str) -> Result<TypeDescriptor> {
    let mut parser = Parser {
        input: text,
        chars: text.char_indices().peekable(),
    };
    let descriptor = parser.type_expr()?;
    parser.skip_whitespace();
    match parser.chars.next() {
        None => Ok(descriptor),
        Some((position, found)) => Err(parser.unexpected(position, found)),
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    /// `TypeExpr := Identifier ('[' ']')* | Identifier '<' TypeExpr (',' TypeExpr)* '>'`
    fn type_expr(&mut self) -> Result<TypeDescriptor> {
        let name = self.identifier()?;
        self.skip_whitespace();

        match self.chars.peek().copied() {
            Some((_, '<')) => {
                self.chars.next();
                let mut params = vec![self.type_expr()?];
                loop {
                    self.skip_whitespace();
                    match self.chars.next() {
                        Some((_, ',')) => params.push(self.type_expr()?),
                        Some((_, '>')) => break,
                        Some((position, found)) => return Err(self.unexpected(position, found)),
                        None => return Err(self.end()),
                    }
                }
                Ok(TypeDescriptor::generic(name, params))
            }
            Some((_, '[')) => {
                let mut descriptor = TypeDescriptor::named(name);
                while let Some((_, '[')) = self.chars.peek().copied() {
                    self.chars.next();
                    self.skip_whitespace();
                    match self.chars.next() {
                        Some((_, ']')) => descriptor = TypeDescriptor::array_of(descriptor),
                        Some((position, found)) => return Err(self.unexpected(position, found)),
                        None => return Err(self.end()),
                    }
                    self.skip_whitespace();
                }
                Ok(descriptor)
            }
            _ => Ok(TypeDescriptor::named(name)),
        }
    }

    fn identifier(&mut self) -> Result<String> {
        self.skip_whitespace();
        let mut name = String::new();
        match self.chars.peek().copied() {
            Some((_, c)) if is_ident_start(c) => {
                name.push(c);
                self.chars.next();
            }
            Some((position, found)) => return Err(self.unexpected(position, found)),
            None => return Err(self.end()),
        }
        while let Some((_, c)) = self.chars.peek().copied() {
            if !is_ident_continue(c) {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        Ok(name)
    }

    fn skip_whitespace(&mut self) {
        while let Some((_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }
    }

    fn unexpected(&self, position: usize, found: char) -> CliError {
        CliError::UnexpectedChar {
            input: self.input.to_string(),
            position,
            found,
        }
    }

    fn end(&self) -> CliError {
        CliError::UnexpectedEnd {
            input: self.input.to_string(),
            position: self.input.len(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
