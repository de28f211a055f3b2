//! Single-variable declarations: `type [*] name [ '[' N ']' ] ;`.

use crate::error::{ParseError, ParseResult};
use crate::lexer::{parse_integer, Token};
use crate::registry::TypeRegistry;
use crate::types::{FieldDecl, WORD_SIZE};

/// Largest declaration accepted, in bytes.
pub const MAX_DECL_SIZE: usize = i32::MAX as usize;

/// Fold multi-word scalar spellings into their registry name.
///
/// Returns the type name and the number of tokens it spans.
pub fn fold_scalar(tokens: &[Token]) -> (&str, usize) {
    let text = |i: usize| tokens.get(i).map(|t| t.text.as_str());
    match (text(0), text(1), text(2)) {
        (Some("long"), Some("long"), Some("int")) => ("long long", 3),
        (Some("long"), Some("long"), _) => ("long long", 2),
        (Some("long"), Some("int"), _) => ("long", 2),
        (Some("long"), Some("double"), _) => ("double", 2),
        (Some("short"), Some("int"), _) => ("short", 2),
        (Some(first), _, _) => (first, 1),
        (None, _, _) => ("", 0),
    }
}

/// Parses one declaration statement against a registry.
pub struct DeclarationParser<'a> {
    registry: &'a TypeRegistry,
    /// Tags whose definition is still open; pointers to them are allowed.
    pending_tags: &'a [String],
}

impl<'a> DeclarationParser<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            pending_tags: &[],
        }
    }

    pub fn with_pending_tags(mut self, pending_tags: &'a [String]) -> Self {
        self.pending_tags = pending_tags;
        self
    }

    /// Parse a full statement, terminator included.
    ///
    /// `line` is only used for error messages. Nothing is mutated on failure.
    pub fn parse(&self, tokens: &[Token], line: usize) -> ParseResult<FieldDecl> {
        if tokens.last().map_or(true, |t| !t.is(";")) {
            return Err(ParseError::malformed(line, "declaration must end with ';'"));
        }
        if tokens.len() < 3 {
            return Err(ParseError::malformed(line, "incomplete declaration"));
        }

        let (type_name, mut idx) = fold_scalar(tokens);

        let mut is_pointer = false;
        while tokens.get(idx).is_some_and(|t| t.is("*")) {
            is_pointer = true;
            idx += 1;
        }

        let element_size = self.element_size(type_name, is_pointer)?;
        let type_name = self.registry.canonical(type_name).to_string();

        let name = match tokens.get(idx) {
            Some(t) if t.is_ident() => t.text.clone(),
            Some(t) => {
                return Err(ParseError::malformed(
                    line,
                    format!("expected variable name, found '{}'", t.text),
                ))
            }
            None => return Err(ParseError::UnexpectedEof { context: "declaration" }),
        };
        idx += 1;

        let mut array_len = 0;
        if tokens.get(idx).is_some_and(|t| t.is("[")) {
            array_len = self.array_length(tokens.get(idx + 1), line)?;
            if !tokens.get(idx + 2).is_some_and(|t| t.is("]")) {
                return Err(ParseError::malformed(line, "expected ']' after array size"));
            }
            idx += 3;
            if tokens.get(idx).is_some_and(|t| t.is("[")) {
                return Err(ParseError::malformed(
                    line,
                    "multi-dimensional arrays are not supported",
                ));
            }
        }

        if idx != tokens.len() - 1 {
            let found = tokens.get(idx).map_or("", |t| t.text.as_str());
            return Err(ParseError::malformed(
                line,
                format!("unexpected '{}' in declaration of {}", found, name),
            ));
        }

        let byte_size = element_size
            .checked_mul(array_len.max(1))
            .filter(|size| *size <= MAX_DECL_SIZE)
            .ok_or_else(|| ParseError::malformed(line, format!("array {} is too large", name)))?;

        Ok(FieldDecl {
            type_name,
            var_name: name,
            array_len,
            is_pointer,
            byte_size,
            padding: false,
        })
    }

    fn element_size(&self, type_name: &str, is_pointer: bool) -> ParseResult<usize> {
        if is_pointer {
            let pending = self.pending_tags.iter().any(|t| t == type_name);
            if pending || self.registry.is_known(type_name) {
                return Ok(WORD_SIZE);
            }
            return Err(ParseError::UnknownType(type_name.to_string()));
        }

        match self.registry.size_of(type_name) {
            Some(0) => Err(ParseError::UnknownType(format!(
                "{} (only pointers may use it)",
                type_name
            ))),
            Some(size) => Ok(size),
            None => Err(ParseError::UnknownType(type_name.to_string())),
        }
    }

    fn array_length(&self, token: Option<&Token>, line: usize) -> ParseResult<usize> {
        let token = token.ok_or(ParseError::UnexpectedEof {
            context: "array size",
        })?;
        let value = parse_integer(&token.text)
            .or_else(|| self.registry.constant(&token.text))
            .ok_or_else(|| ParseError::InvalidNumber(token.text.clone()))?;

        match usize::try_from(value) {
            Ok(len) if len > 0 => Ok(len),
            _ => Err(ParseError::malformed(
                line,
                format!("array size must be positive, got {}", value),
            )),
        }
    }
}
