//! Header preprocessing and tokenization.
//!
//! Raw header text is normalized into a list of [`Statement`]s:
//! - blank lines dropped, every line trimmed
//! - line and block comments removed (several per line, spanning lines)
//! - `\` continuations joined
//! - ordinary lines split after every `,` and `;`, so a statement never
//!   carries more than one declarator (directive lines are left whole)
//!
//! Statements are then cut into a flat [`TokenStream`] in which every token
//! remembers the statement it belongs to. Qualifier keywords carry no layout
//! information and never become tokens.

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use std::path::Path;

/// Characters that end an identifier. Each of them except the blanks is
/// also a token on its own. `_` is absent since identifiers contain it.
const TOKEN_DELIMITERS: &str = " \t#{[(<&|*>)]}?':\",%!=/;+$";

/// Keywords dropped by the tokenizer.
pub const QUALIFIERS: &[&str] = &[
    "static",
    "const",
    "signed",
    "unsigned",
    "far",
    "extern",
    "volatile",
    "auto",
    "register",
    "inline",
    "__attribute__",
];

pub fn is_qualifier(token: &str) -> bool {
    QUALIFIERS.contains(&token)
}

fn is_delimiter(ch: char) -> bool {
    TOKEN_DELIMITERS.contains(ch)
}

/// One normalized statement and the physical line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based physical line number.
    pub line: usize,
    pub text: String,
}

impl Statement {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    pub fn is_directive(&self) -> bool {
        self.text.starts_with('#')
    }
}

/// Normalize header text into statements.
pub fn preprocess(text: &str, file: Option<&Path>, diags: &mut Diagnostics) -> Vec<Statement> {
    let lines = text
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim();
            (!line.is_empty()).then(|| Statement::new(i + 1, line))
        })
        .collect();

    let lines = strip_comments(lines, file, diags);
    let lines = join_continuations(lines, file, diags);
    split_statements(lines)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comment {
    Line,
    Block,
}

fn find_comment(s: &str) -> Option<(usize, Comment)> {
    let bytes = s.as_bytes();
    bytes
        .windows(2)
        .position(|w| w[0] == b'/' && (w[1] == b'/' || w[1] == b'*'))
        .map(|i| {
            let kind = if bytes[i + 1] == b'/' {
                Comment::Line
            } else {
                Comment::Block
            };
            (i, kind)
        })
}

/// Remove comments in a single forward pass.
///
/// An unterminated block is reported and swallows the rest of the file.
fn strip_comments(
    lines: Vec<Statement>,
    file: Option<&Path>,
    diags: &mut Diagnostics,
) -> Vec<Statement> {
    let mut out = Vec::with_capacity(lines.len());
    let mut open_block: Option<usize> = None;

    for line in lines {
        let mut kept = String::new();
        let mut rest = line.text.as_str();

        loop {
            if open_block.is_some() {
                match rest.find("*/") {
                    Some(end) => {
                        rest = &rest[end + 2..];
                        open_block = None;
                        kept.push(' ');
                    }
                    None => break,
                }
            }

            match find_comment(rest) {
                None => {
                    kept.push_str(rest);
                    break;
                }
                Some((at, Comment::Line)) => {
                    kept.push_str(&rest[..at]);
                    break;
                }
                Some((at, Comment::Block)) => {
                    kept.push_str(&rest[..at]);
                    rest = &rest[at + 2..];
                    open_block = Some(line.line);
                }
            }
        }

        let kept = kept.trim();
        if !kept.is_empty() {
            out.push(Statement::new(line.line, kept));
        }
    }

    if let Some(start) = open_block {
        diags.error(
            DiagnosticKind::MalformedSyntax,
            "unterminated comment block",
            Some(Location::new(file, start)),
        );
    }

    out
}

/// Join lines ending in `\` with their successor.
fn join_continuations(
    lines: Vec<Statement>,
    file: Option<&Path>,
    diags: &mut Diagnostics,
) -> Vec<Statement> {
    let mut out = Vec::with_capacity(lines.len());
    let mut pending: Option<Statement> = None;

    for line in lines {
        let joined = match pending.take() {
            Some(mut head) => {
                head.text.push(' ');
                head.text.push_str(&line.text);
                head
            }
            None => line,
        };

        match joined.text.strip_suffix('\\') {
            Some(stripped) => {
                pending = Some(Statement::new(joined.line, stripped.trim_end()));
            }
            None => out.push(joined),
        }
    }

    if let Some(last) = pending {
        diags.error(
            DiagnosticKind::MalformedSyntax,
            "line continuation on the last line",
            Some(Location::new(file, last.line)),
        );
        if !last.text.is_empty() {
            out.push(last);
        }
    }

    out
}

/// Split non-directive lines after each `,` and `;`.
fn split_statements(lines: Vec<Statement>) -> Vec<Statement> {
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        if line.is_directive() {
            out.push(line);
            continue;
        }

        let text = line.text.as_str();
        let mut start = 0;
        for (i, ch) in text.char_indices() {
            if (ch == ',' || ch == ';') && i + 1 < text.len() {
                push_piece(&mut out, line.line, &text[start..=i]);
                start = i + 1;
            }
        }
        push_piece(&mut out, line.line, &text[start..]);
    }

    out
}

fn push_piece(out: &mut Vec<Statement>, line: usize, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(Statement::new(line, piece));
    }
}

/// Splits one statement into raw tokens.
struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn next_raw(&mut self) -> Option<&'a str> {
        self.skip_whitespace();

        let start = self.pos;
        let ch = self.next_char()?;
        if is_delimiter(ch) {
            return Some(&self.input[start..self.pos]);
        }

        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || is_delimiter(ch) {
                break;
            }
            self.next_char();
        }

        Some(&self.input[start..self.pos])
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let token = self.next_raw()?;
            if !is_qualifier(token) {
                return Some(token);
            }
        }
    }
}

/// Tokenize one statement, dropping qualifiers.
pub fn tokenize(text: &str) -> Vec<String> {
    Lexer::new(text).map(str::to_string).collect()
}

/// Parse an integer literal: decimal, `0x` hex or leading-zero octal, with
/// an optional sign and `u`/`l` suffixes.
pub fn parse_integer(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let digits = digits.trim_end_matches(['u', 'U', 'l', 'L']);
    if digits.is_empty() {
        return None;
    }

    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        i64::from_str_radix(hex, 16).ok()?
    } else if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };

    Some(if negative { -value } else { value })
}

/// A token and the index of the statement it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub statement: usize,
}

impl Token {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    /// Single punctuation character such as `{` or `;`.
    pub fn is_punct(&self) -> bool {
        let mut chars = self.text.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if is_delimiter(c))
    }

    /// Identifier-like token (may still be a keyword).
    pub fn is_ident(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self.text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// Flat token stream over a preprocessed file, with a cursor.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    statements: Vec<Statement>,
    pos: usize,
}

impl TokenStream {
    pub fn new(statements: Vec<Statement>) -> Self {
        let tokens = statements
            .iter()
            .enumerate()
            .flat_map(|(index, s)| {
                tokenize(&s.text).into_iter().map(move |text| Token {
                    text,
                    statement: index,
                })
            })
            .collect();

        Self {
            tokens,
            statements,
            pos: 0,
        }
    }

    /// Preprocess and tokenize header text.
    pub fn from_source(text: &str, file: Option<&Path>, diags: &mut Diagnostics) -> Self {
        Self::new(preprocess(text, file, diags))
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consume the next token, crossing statement boundaries.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    /// Step back over the last consumed token.
    pub fn unread(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Tokens from the cursor to the end of the cursor's statement.
    pub fn statement_tokens(&self) -> &[Token] {
        let Some(first) = self.tokens.get(self.pos) else {
            return &[];
        };
        let end = self.tokens[self.pos..]
            .iter()
            .position(|t| t.statement != first.statement)
            .map_or(self.tokens.len(), |n| self.pos + n);
        &self.tokens[self.pos..end]
    }

    /// Consume and return the rest of the cursor's statement.
    pub fn take_statement(&mut self) -> Vec<Token> {
        let taken = self.statement_tokens().to_vec();
        self.pos += taken.len();
        taken
    }

    /// Consume the rest of the cursor's statement, stopping before `stop`.
    pub fn take_statement_until(&mut self, stop: &str) -> Vec<Token> {
        let rest = self.statement_tokens();
        let end = rest.iter().position(|t| t.is(stop)).unwrap_or(rest.len());
        let taken = rest[..end].to_vec();
        self.pos += taken.len();
        taken
    }

    /// Skip every remaining token of `statement`.
    pub fn skip_statement(&mut self, statement: usize) {
        while self.peek().is_some_and(|t| t.statement == statement) {
            self.pos += 1;
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Physical line on which `statement` starts.
    pub fn line_of(&self, statement: usize) -> usize {
        self.statements.get(statement).map_or(0, |s| s.line)
    }

    pub fn statement_text(&self, statement: usize) -> &str {
        self.statements
            .get(statement)
            .map_or("", |s| s.text.as_str())
    }
}

/// Join token texts with single spaces, for messages.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
