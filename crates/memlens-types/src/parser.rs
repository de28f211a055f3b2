//! Header parser.
//!
//! This parser handles the subset of C found in data-layout headers:
//! - struct, union and enum definitions, nested and anonymous ones included
//! - typedefs of aggregates, enums and known types
//! - member and variable declarations with one pointer level and one array
//!   dimension
//! - `#include "file"` and `#define NAME NUMBER`
//! - global `int NAME = NUMBER;` constants
//!
//! It does NOT handle:
//! - Macro expansion or conditional compilation
//! - Bit-fields, function pointers and multi-dimensional arrays
//! - Expressions other than a single integer or constant
//! - `typedef struct Tag Alias;` ahead of the definition of `Tag`: the alias
//!   is skipped and later uses of it stay unresolved
//!
//! After a closing brace the grammar is locally ambiguous: the next token
//! may name a typedef alias, start a variable declaration, or end the
//! statement. The parser classifies the tail without backtracking over the
//! already parsed body.

use crate::declaration::{fold_scalar, DeclarationParser};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use crate::error::{ParseError, ParseResult};
use crate::layout;
use crate::lexer::{join_tokens, parse_integer, Token, TokenStream};
use crate::registry::{is_scalar, TypeRegistry};
use crate::source::{HeaderSource, MemoryHeaderSource};
use crate::types::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Keyword that opens a compound construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Construct {
    Aggregate(AggregateKind),
    Enum,
}

impl Construct {
    fn from_token(text: &str) -> Option<Self> {
        match text {
            "struct" => Some(Construct::Aggregate(AggregateKind::Struct)),
            "union" => Some(Construct::Aggregate(AggregateKind::Union)),
            "enum" => Some(Construct::Enum),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Construct::Aggregate(kind) => kind.keyword(),
            Construct::Enum => "enum",
        }
    }
}

/// What a compound construct turned out to be.
#[derive(Debug)]
enum Parsed {
    /// A type definition with no variable.
    Definition(String),
    /// A variable of a named or freshly defined type.
    Variable(FieldDecl),
}

/// Parsed body of a definition, before registration.
#[derive(Debug)]
enum Body {
    Aggregate(AggregateKind, Vec<FieldDecl>),
    Enum(Vec<(String, i64)>),
}

/// Token stream of the file being parsed.
struct FileCursor {
    tokens: TokenStream,
    file: Option<PathBuf>,
}

impl FileCursor {
    fn line_of(&self, statement: usize) -> usize {
        self.tokens.line_of(statement)
    }

    fn location(&self, line: usize) -> Option<Location> {
        Some(Location::new(self.file.as_deref(), line))
    }
}

fn diagnostic_kind(err: &ParseError) -> DiagnosticKind {
    match err {
        ParseError::Io { .. } => DiagnosticKind::Io,
        ParseError::UnknownType(_) => DiagnosticKind::UnresolvedType,
        _ => DiagnosticKind::MalformedSyntax,
    }
}

fn error_line(err: &ParseError) -> usize {
    match err {
        ParseError::MalformedSyntax { line, .. } => *line,
        _ => 0,
    }
}

/// Builds a [`TypeRegistry`] from header files.
pub struct HeaderParser<S: HeaderSource> {
    source: S,
    registry: TypeRegistry,
    diagnostics: Diagnostics,
    /// Canonical paths of files already parsed or being parsed.
    visited: HashSet<PathBuf>,
    /// Tags of aggregates whose body is being parsed, innermost last.
    pending: Vec<String>,
    anonymous_count: usize,
}

impl<S: HeaderSource> HeaderParser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            registry: TypeRegistry::new(),
            diagnostics: Diagnostics::new(),
            visited: HashSet::new(),
            pending: Vec::new(),
            anonymous_count: 0,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consume the parser, returning the finished registry and diagnostics.
    pub fn finish(self) -> (TypeRegistry, Diagnostics) {
        (self.registry, self.diagnostics)
    }

    /// Parse a header file, and depth-first every file it includes.
    ///
    /// A file that was already parsed is skipped. On a fatal error the
    /// types registered so far are kept and the error is both recorded as
    /// a diagnostic and returned.
    pub fn parse_file(&mut self, path: &Path) -> ParseResult<()> {
        let key = self.source.canonicalize(path);
        if !self.visited.insert(key.clone()) {
            self.diagnostics.info(
                DiagnosticKind::Note,
                format!("{} already parsed", key.display()),
                None,
            );
            return Ok(());
        }

        tracing::info!(file = %key.display(), "parsing header");
        let result = self
            .source
            .load(&key)
            .map_err(|source| ParseError::Io {
                path: key.clone(),
                source,
            })
            .and_then(|text| self.parse_text(&text, Some(key.clone())));

        if let Err(err) = &result {
            self.record_failure(Some(&key), err);
        }
        result
    }

    /// Parse header text that does not come from a file.
    pub fn parse_source(&mut self, text: &str) -> ParseResult<()> {
        let result = self.parse_text(text, None);
        if let Err(err) = &result {
            self.record_failure(None, err);
        }
        result
    }

    fn record_failure(&mut self, file: Option<&Path>, err: &ParseError) {
        self.diagnostics.error(
            diagnostic_kind(err),
            err.to_string(),
            Some(Location::new(file, error_line(err))),
        );
    }

    fn parse_text(&mut self, text: &str, file: Option<PathBuf>) -> ParseResult<()> {
        let tokens = TokenStream::from_source(text, file.as_deref(), &mut self.diagnostics);
        let mut cur = FileCursor { tokens, file };
        self.parse_statements(&mut cur)
    }

    // ==================== Top level ====================

    fn parse_statements(&mut self, cur: &mut FileCursor) -> ParseResult<()> {
        while let Some(token) = cur.tokens.next_token() {
            if token.is("#") {
                self.parse_directive(cur, token.statement);
            } else if token.is("typedef") {
                self.parse_typedef(cur, &token)?;
            } else if let Some(construct) = Construct::from_token(&token.text) {
                let parsed = self.parse_compound(cur, construct, token.statement, false)?;
                if let Parsed::Variable(field) = parsed {
                    let line = cur.line_of(token.statement);
                    self.diagnostics.debug(
                        DiagnosticKind::Note,
                        format!(
                            "top-level variable {} of type {} ignored",
                            field.var_name, field.type_name
                        ),
                        cur.location(line),
                    );
                }
            } else if token.is("{") || token.is("}") || token.is(";") {
                continue;
            } else if token.is_punct() {
                cur.tokens.skip_statement(token.statement);
            } else {
                cur.tokens.unread();
                self.parse_top_statement(cur, token.statement);
            }
        }
        Ok(())
    }

    /// A statement at file scope that does not start with a keyword.
    fn parse_top_statement(&mut self, cur: &mut FileCursor, statement: usize) {
        let tokens = cur.tokens.take_statement();
        let line = cur.line_of(statement);

        if let Some((name, value)) = self.parse_assignment(&tokens) {
            tracing::debug!(constant = %name, value, "global constant");
            self.registry.insert_constant(name, value);
            return;
        }

        let (type_name, _) = fold_scalar(&tokens);
        if self.registry.is_known(type_name) {
            match DeclarationParser::new(&self.registry).parse(&tokens, line) {
                Ok(field) => self.diagnostics.debug(
                    DiagnosticKind::Note,
                    format!(
                        "top-level variable {} of type {} ignored",
                        field.var_name, field.type_name
                    ),
                    cur.location(line),
                ),
                Err(err) => self.diagnostics.debug(
                    DiagnosticKind::Skipped,
                    format!("statement '{}' skipped: {}", join_tokens(&tokens), err),
                    cur.location(line),
                ),
            }
            return;
        }

        let looks_like_declaration = tokens.len() >= 3
            && tokens.last().is_some_and(|t| t.is(";"))
            && tokens.get(1).is_some_and(|t| t.is_ident() || t.is("*"));
        if looks_like_declaration {
            self.diagnostics.error(
                DiagnosticKind::UnresolvedType,
                format!("unknown type {}, declaration skipped", type_name),
                cur.location(line),
            );
        } else {
            self.diagnostics.debug(
                DiagnosticKind::Skipped,
                format!("statement '{}' skipped", join_tokens(&tokens)),
                cur.location(line),
            );
        }
    }

    /// `scalar NAME = NUMBER ;`
    fn parse_assignment(&self, tokens: &[Token]) -> Option<(String, i64)> {
        let (type_name, idx) = fold_scalar(tokens);
        if !is_scalar(self.registry.canonical(type_name)) {
            return None;
        }
        match &tokens[idx..] {
            [name, eq, value, semi] if name.is_ident() && eq.is("=") && semi.is(";") => {
                let value = parse_integer(&value.text)
                    .or_else(|| self.registry.constant(&value.text))?;
                Some((name.text.clone(), value))
            }
            _ => None,
        }
    }

    fn parse_typedef(&mut self, cur: &mut FileCursor, typedef: &Token) -> ParseResult<()> {
        let next = cur
            .tokens
            .peek()
            .cloned()
            .ok_or(ParseError::UnexpectedEof { context: "typedef" })?;
        let line = cur.line_of(typedef.statement);

        let Some(construct) = Construct::from_token(&next.text) else {
            self.parse_simple_typedef(cur, line);
            return Ok(());
        };

        cur.tokens.next_token();
        if let Parsed::Variable(field) = self.parse_compound(cur, construct, next.statement, true)? {
            // `typedef struct Tag Alias;` for an already defined tag.
            self.register_alias(cur, &field, line);
        }
        Ok(())
    }

    /// `typedef <known type> [*] ALIAS ;`
    fn parse_simple_typedef(&mut self, cur: &mut FileCursor, line: usize) {
        let tokens = cur.tokens.take_statement();
        let (type_name, idx) = fold_scalar(&tokens);
        let rest = &tokens[idx..];

        match rest {
            [alias, semi] if alias.is_ident() && semi.is(";") => {
                let field = FieldDecl::new(type_name, alias.text.clone(), 0);
                self.register_alias(cur, &field, line);
            }
            [star, alias, semi] if star.is("*") && alias.is_ident() && semi.is(";") => {
                self.diagnostics.debug(
                    DiagnosticKind::Skipped,
                    format!("pointer typedef {} skipped", alias.text),
                    cur.location(line),
                );
            }
            _ => self.diagnostics.debug(
                DiagnosticKind::Skipped,
                format!("unsupported typedef '{}' skipped", join_tokens(&tokens)),
                cur.location(line),
            ),
        }
    }

    fn register_alias(&mut self, cur: &FileCursor, field: &FieldDecl, line: usize) {
        if field.is_pointer || field.is_array() {
            self.diagnostics.debug(
                DiagnosticKind::Skipped,
                format!("pointer or array typedef {} skipped", field.var_name),
                cur.location(line),
            );
            return;
        }
        if let Err(err) = self.registry.insert_alias(&field.var_name, &field.type_name) {
            self.diagnostics
                .error(diagnostic_kind(&err), err.to_string(), cur.location(line));
        }
    }

    // ==================== Directives ====================

    fn parse_directive(&mut self, cur: &mut FileCursor, statement: usize) {
        let line = cur.line_of(statement);
        let tokens = cur.tokens.take_statement();
        let Some(directive) = tokens.first() else {
            return;
        };

        match directive.text.as_str() {
            "include" => self.parse_include(cur, statement, line),
            "define" => self.parse_define(cur, &tokens[1..], line),
            "if" | "ifdef" | "ifndef" | "elif" | "else" | "endif" | "undef" | "pragma" => {
                tracing::trace!(directive = %directive.text, line, "directive ignored");
            }
            other => self.diagnostics.info(
                DiagnosticKind::Skipped,
                format!("#{} directive skipped", other),
                cur.location(line),
            ),
        }
    }

    fn parse_include(&mut self, cur: &FileCursor, statement: usize, line: usize) {
        let text = cur.tokens.statement_text(statement);
        let target = text
            .trim_start_matches('#')
            .trim_start()
            .trim_start_matches("include")
            .trim();

        if target.starts_with('<') {
            self.diagnostics.info(
                DiagnosticKind::Skipped,
                format!("system include {} skipped", target),
                cur.location(line),
            );
            return;
        }

        let Some(name) = target
            .strip_prefix('"')
            .and_then(|rest| rest.find('"').map(|end| rest[..end].to_string()))
        else {
            self.diagnostics.error(
                DiagnosticKind::MalformedSyntax,
                format!("malformed include '{}'", text),
                cur.location(line),
            );
            return;
        };

        match self.source.resolve(&name, cur.file.as_deref()) {
            Some(path) => {
                // Failures are already recorded; the includer carries on.
                let _ = self.parse_file(&path);
            }
            None => self.diagnostics.error(
                DiagnosticKind::Io,
                format!("cannot find include file \"{}\"", name),
                cur.location(line),
            ),
        }
    }

    fn parse_define(&mut self, cur: &FileCursor, tokens: &[Token], line: usize) {
        match tokens {
            [guard] => tracing::trace!(guard = %guard.text, "valueless define"),
            [name, value] if name.is_ident() => {
                match parse_integer(&value.text).or_else(|| self.registry.constant(&value.text)) {
                    Some(v) => {
                        tracing::debug!(constant = %name.text, value = v, "define");
                        self.registry.insert_constant(name.text.clone(), v);
                    }
                    None => self.diagnostics.debug(
                        DiagnosticKind::Skipped,
                        format!("#define {} has no integer value", name.text),
                        cur.location(line),
                    ),
                }
            }
            _ => self.diagnostics.debug(
                DiagnosticKind::Skipped,
                format!("#define {} skipped", join_tokens(tokens)),
                cur.location(line),
            ),
        }
    }

    // ==================== Compound constructs ====================

    /// Parse what follows a `struct`, `union` or `enum` keyword.
    ///
    /// `keyword_statement` is the statement holding the keyword; the
    /// declaration probe only looks at the rest of that statement.
    fn parse_compound(
        &mut self,
        cur: &mut FileCursor,
        construct: Construct,
        keyword_statement: usize,
        typedef: bool,
    ) -> ParseResult<Parsed> {
        if let Some(field) = self.probe_declaration(cur, keyword_statement) {
            return Ok(Parsed::Variable(field));
        }

        let context = construct.keyword();
        let first = cur
            .tokens
            .next_token()
            .ok_or(ParseError::UnexpectedEof { context })?;
        let line = cur.line_of(first.statement);

        let tag = if first.is("{") {
            None
        } else if first.is_ident() {
            let open = cur
                .tokens
                .next_token()
                .ok_or(ParseError::UnexpectedEof { context })?;
            if !open.is("{") {
                return self.parse_forward(cur, construct, first.text, open, typedef);
            }
            Some(first.text)
        } else {
            return Err(ParseError::malformed(
                line,
                format!("expected tag or '{{' after {}, found '{}'", context, first.text),
            ));
        };

        let body = match construct {
            Construct::Enum => Body::Enum(self.parse_enum_body(cur)?),
            Construct::Aggregate(kind) => {
                if let Some(tag) = &tag {
                    self.pending.push(tag.clone());
                }
                let members = self.parse_aggregate_body(cur);
                if tag.is_some() {
                    self.pending.pop();
                }
                Body::Aggregate(kind, members?)
            }
        };

        self.parse_tail(cur, tag, body, typedef)
    }

    /// `struct Tag;` and `typedef struct Tag Alias;` for undefined tags.
    fn parse_forward(
        &mut self,
        cur: &mut FileCursor,
        construct: Construct,
        tag: String,
        next: Token,
        typedef: bool,
    ) -> ParseResult<Parsed> {
        let line = cur.line_of(next.statement);

        if next.is(";") && !typedef {
            self.diagnostics.debug(
                DiagnosticKind::Skipped,
                format!("forward declaration of {} {} skipped", construct.keyword(), tag),
                cur.location(line),
            );
            return Ok(Parsed::Definition(tag));
        }

        if typedef && next.is_ident() && cur.tokens.peek().is_some_and(|t| t.is(";")) {
            cur.tokens.next_token();
            self.diagnostics.debug(
                DiagnosticKind::Skipped,
                format!(
                    "typedef {} of undefined {} {} skipped",
                    next.text,
                    construct.keyword(),
                    tag
                ),
                cur.location(line),
            );
            return Ok(Parsed::Definition(next.text));
        }

        Err(ParseError::malformed(
            line,
            format!(
                "expected '{{' after {} {}, found '{}'",
                construct.keyword(),
                tag,
                next.text
            ),
        ))
    }

    /// Try the rest of the keyword's statement as a plain declaration.
    fn probe_declaration(&self, cur: &mut FileCursor, keyword_statement: usize) -> Option<FieldDecl> {
        let tokens = cur.tokens.statement_tokens();
        if tokens.first()?.statement != keyword_statement {
            return None;
        }

        let line = cur.line_of(keyword_statement);
        let field = DeclarationParser::new(&self.registry)
            .with_pending_tags(&self.pending)
            .parse(tokens, line)
            .ok()?;
        cur.tokens.take_statement();
        Some(field)
    }

    fn parse_aggregate_body(&mut self, cur: &mut FileCursor) -> ParseResult<Vec<FieldDecl>> {
        let mut members = Vec::new();

        loop {
            let token = cur.tokens.next_token().ok_or(ParseError::UnexpectedEof {
                context: "aggregate body",
            })?;
            let line = cur.line_of(token.statement);

            if token.is("}") {
                return Ok(members);
            }
            if token.is(";") {
                continue;
            }
            if token.is("#") {
                cur.tokens.skip_statement(token.statement);
                self.diagnostics.debug(
                    DiagnosticKind::Skipped,
                    "directive inside aggregate body skipped",
                    cur.location(line),
                );
                continue;
            }

            if let Some(construct) = Construct::from_token(&token.text) {
                match self.parse_compound(cur, construct, token.statement, false)? {
                    Parsed::Variable(field) => members.push(field),
                    Parsed::Definition(name) => {
                        return Err(ParseError::malformed(
                            line,
                            format!(
                                "nested {} {} must declare a member",
                                construct.keyword(),
                                name
                            ),
                        ))
                    }
                }
                continue;
            }

            cur.tokens.unread();
            let member = cur.tokens.take_statement_until("}");
            let parsed = DeclarationParser::new(&self.registry)
                .with_pending_tags(&self.pending)
                .parse(&member, line);
            match parsed {
                Ok(field) => members.push(field),
                Err(err) => self.diagnostics.error(
                    diagnostic_kind(&err),
                    format!("member '{}' skipped: {}", join_tokens(&member), err),
                    cur.location(line),
                ),
            }
        }
    }

    /// Enumerators, one per statement:
    /// `L`, `L ,`, `L = V` or `L = V ,`. The comma-less forms end the list.
    fn parse_enum_body(&mut self, cur: &mut FileCursor) -> ParseResult<Vec<(String, i64)>> {
        let mut labels = Vec::new();
        let mut last_value: i64 = -1;
        let mut closed = false;

        loop {
            let token = cur.tokens.next_token().ok_or(ParseError::UnexpectedEof {
                context: "enum body",
            })?;
            if token.is("}") {
                return Ok(labels);
            }

            let line = cur.line_of(token.statement);
            cur.tokens.unread();
            let member = cur.tokens.take_statement_until("}");

            if closed {
                return Err(ParseError::malformed(
                    line,
                    format!("enumerator {} follows the last member without ','", token.text),
                ));
            }

            let (label, value, last) = match member.as_slice() {
                [label] => (label, None, true),
                [label, comma] if comma.is(",") => (label, None, false),
                [label, eq, value] if eq.is("=") => (label, Some(value), true),
                [label, eq, value, comma] if eq.is("=") && comma.is(",") => {
                    (label, Some(value), false)
                }
                _ => {
                    return Err(ParseError::malformed(
                        line,
                        format!("malformed enumerator '{}'", join_tokens(&member)),
                    ))
                }
            };
            if !label.is_ident() {
                return Err(ParseError::malformed(
                    line,
                    format!("invalid enumerator name '{}'", label.text),
                ));
            }

            let value = match value {
                Some(v) => parse_integer(&v.text)
                    .or_else(|| self.registry.constant(&v.text))
                    .ok_or_else(|| ParseError::InvalidNumber(v.text.clone()))?,
                None => last_value.saturating_add(1),
            };

            last_value = value;
            closed = last;
            self.registry.insert_constant(label.text.clone(), value);
            labels.push((label.text.clone(), value));
        }
    }

    /// Classify what follows the closing brace and register the type.
    fn parse_tail(
        &mut self,
        cur: &mut FileCursor,
        tag: Option<String>,
        body: Body,
        typedef: bool,
    ) -> ParseResult<Parsed> {
        let context = "declaration after '}'";
        let next = cur
            .tokens
            .next_token()
            .ok_or(ParseError::UnexpectedEof { context })?;
        let line = cur.line_of(next.statement);

        if typedef {
            if !next.is_ident() {
                return Err(ParseError::malformed(
                    line,
                    format!("expected typedef name after '}}', found '{}'", next.text),
                ));
            }
            let end = cur
                .tokens
                .next_token()
                .ok_or(ParseError::UnexpectedEof { context })?;
            if end.is(",") {
                self.diagnostics.debug(
                    DiagnosticKind::Skipped,
                    format!("extra declarators after typedef {} skipped", next.text),
                    cur.location(line),
                );
                while let Some(t) = cur.tokens.next_token() {
                    if t.is(";") {
                        break;
                    }
                }
            } else if !end.is(";") {
                return Err(ParseError::malformed(
                    line,
                    format!("expected ';' after typedef {}, found '{}'", next.text, end.text),
                ));
            }

            self.register(cur, &next.text, &body, line);
            if let Some(tag) = tag.filter(|t| *t != next.text) {
                self.register(cur, &tag, &body, line);
            }
            return Ok(Parsed::Definition(next.text));
        }

        if next.is(";") {
            let Some(tag) = tag else {
                return Err(ParseError::malformed(
                    line,
                    "definition without tag declares nothing",
                ));
            };
            self.register(cur, &tag, &body, line);
            return Ok(Parsed::Definition(tag));
        }

        let name = match tag {
            Some(tag) => tag,
            None => self.anonymous_name(),
        };
        self.register(cur, &name, &body, line);

        cur.tokens.unread();
        let mut statement = vec![Token {
            text: name,
            statement: next.statement,
        }];
        statement.extend(cur.tokens.take_statement());

        let field = DeclarationParser::new(&self.registry)
            .with_pending_tags(&self.pending)
            .parse(&statement, line)?;
        Ok(Parsed::Variable(field))
    }

    fn anonymous_name(&mut self) -> String {
        self.anonymous_count += 1;
        format!("{}{}", ANONYMOUS_PREFIX, self.anonymous_count)
    }

    /// Lay out and store a definition under `name`.
    fn register(&mut self, cur: &FileCursor, name: &str, body: &Body, line: usize) {
        let location = cur.location(line);

        let (keyword, result) = match body {
            Body::Aggregate(kind, members) => {
                let def = match layout::compute(*kind, members) {
                    Ok(layout) => AggregateDef {
                        name: name.to_string(),
                        kind: *kind,
                        members: layout.members,
                        size: layout.size,
                    },
                    Err(err) => {
                        self.diagnostics.error(
                            DiagnosticKind::Alignment,
                            format!("{} {}: {}", kind, name, err),
                            location.clone(),
                        );
                        AggregateDef {
                            name: name.to_string(),
                            kind: *kind,
                            members: members.clone(),
                            size: 0,
                        }
                    }
                };
                tracing::debug!(type_name = name, kind = %kind, size = def.size, "registering aggregate");
                (kind.keyword(), self.registry.insert_aggregate(def).map(|old| old.is_some()))
            }
            Body::Enum(labels) => {
                let def = EnumDef {
                    name: name.to_string(),
                    labels: labels.clone(),
                };
                tracing::debug!(type_name = name, labels = labels.len(), "registering enum");
                ("enum", self.registry.insert_enum(def).map(|old| old.is_some()))
            }
        };

        match result {
            Ok(false) => {}
            Ok(true) => self.diagnostics.debug(
                DiagnosticKind::Note,
                format!("{} {} redefined, previous definition replaced", keyword, name),
                location,
            ),
            Err(err) => self.diagnostics.error(
                DiagnosticKind::MalformedSyntax,
                err.to_string(),
                location,
            ),
        }
    }
}

/// Parse header text held in memory.
pub fn parse_header(input: &str) -> ParseResult<(TypeRegistry, Diagnostics)> {
    let mut parser = HeaderParser::new(MemoryHeaderSource::new());
    parser.parse_source(input)?;
    Ok(parser.finish())
}
