//! Expression trees for the construction subset of C#.
//!
//! The parser is deliberately tolerant. It recognizes literals, invocations,
//! object creations (typed and target-typed `new()`), assignments and nested
//! `{ ... }` initializer groups. Anything else (operators, lambdas, casts,
//! array creations, interpolated strings ...) is consumed up to the next
//! balanced delimiter and kept as [`Expr::Unsupported`], so a file full of
//! statements and declarations never fails to parse.
//!
//! [`SyntaxTree`] tokenizes a file once and parses expressions lazily from
//! the candidate sites the resolver asks about:
//!
//! - [`SyntaxTree::assignments`]: `Name = value` where `Name` is a bare
//!   identifier (local declarations such as `var x = ...` are not assignments)
//! - [`SyntaxTree::creations`]: every `new Type(...) { ... }`, nested ones
//!   included, in document order

use crate::error::Result;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::types::Number;

/// Nesting beyond this depth is treated as unsupported.
const MAX_DEPTH: usize = 128;

/// C# keywords that can never be used as a plain identifier.
const RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
    "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

/// Keywords that may start a member-access chain (`int.Parse(...)`, `this.X`).
const CHAIN_HEADS: &[&str] = &[
    "bool", "byte", "char", "decimal", "double", "float", "int", "long", "object", "sbyte",
    "short", "string", "uint", "ulong", "ushort", "this", "base",
];

/// Keywords after which an identifier starts a new expression rather than
/// being the name in a declaration.
const EXPRESSION_LEADERS: &[&str] = &["return", "else", "do", "in", "throw", "case"];

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

/// Node-kind discriminant of [`Expr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal,
    Invocation,
    Creation,
    ImplicitCreation,
    Assignment,
    Initializer,
    Name,
    Index,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Invocation(Invocation),
    /// `new Type(args) { entries }`
    Creation(Creation),
    /// `new(args) { entries }` with the type left to inference.
    ImplicitCreation(ImplicitCreation),
    Assignment(Assignment),
    /// A bare `{ ... }` group, e.g. one pair of a dictionary initializer.
    Initializer(Initializer),
    /// Identifier or member-access chain, e.g. `Status.Active`.
    Name(String),
    /// `[key]` target of an indexer initializer entry.
    Index(String),
    /// Anything outside the supported subset, kept as source text.
    Unsupported(String),
}

impl Expr {
    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Literal(_) => ExprKind::Literal,
            Expr::Invocation(_) => ExprKind::Invocation,
            Expr::Creation(_) => ExprKind::Creation,
            Expr::ImplicitCreation(_) => ExprKind::ImplicitCreation,
            Expr::Assignment(_) => ExprKind::Assignment,
            Expr::Initializer(_) => ExprKind::Initializer,
            Expr::Name(_) => ExprKind::Name,
            Expr::Index(_) => ExprKind::Index,
            Expr::Unsupported(_) => ExprKind::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(Number),
    /// Unescaped string contents.
    String(String),
    /// Character and `default` literals, as written.
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub callee: String,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Creation {
    /// Declared type exactly as written, e.g. `Dictionary<int, string>`.
    pub type_name: String,
    pub arguments: Vec<Expr>,
    pub initializer: Option<Initializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplicitCreation {
    pub arguments: Vec<Expr>,
    pub initializer: Option<Initializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Left-hand side as written.
    pub target: String,
    /// Whether the left-hand side is a single identifier.
    pub bare_identifier: bool,
    pub value: Box<Expr>,
}

/// The entries of a `{ ... }` block, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Initializer {
    pub entries: Vec<Expr>,
}

/// A tokenized source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    tokens: Vec<Token>,
}

impl SyntaxTree {
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Assignments whose left side is a bare identifier, in document order.
    pub fn assignments(&self) -> impl Iterator<Item = Assignment> + '_ {
        (0..self.tokens.len())
            .filter(move |&i| self.is_bare_assignment_at(i))
            .map(move |i| self.assignment_at(i))
    }

    /// The first assignment to the bare identifier `name`.
    pub fn find_assignment(&self, name: &str) -> Option<Assignment> {
        (0..self.tokens.len())
            .filter(|&i| self.tokens[i].ident() == Some(name))
            .find(|&i| self.is_bare_assignment_at(i))
            .map(|i| self.assignment_at(i))
    }

    /// Every typed object creation, outer before inner.
    pub fn creations(&self) -> impl Iterator<Item = Creation> + '_ {
        self.new_positions()
            .filter_map(move |i| self.creation_at(i))
    }

    /// The first object creation whose declared type reads exactly `type_name`.
    pub fn find_creation(&self, type_name: &str) -> Option<Creation> {
        self.new_positions()
            .filter(|&i| self.declared_type_at(i).as_deref() == Some(type_name))
            .find_map(|i| self.creation_at(i))
    }

    fn parser_at(&self, pos: usize) -> Parser<'_> {
        Parser {
            source: &self.source,
            tokens: &self.tokens,
            pos,
            depth: 0,
        }
    }

    fn new_positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.tokens.len()).filter(move |&i| self.tokens[i].ident() == Some("new"))
    }

    /// Parse only the `new ...` node at `pos`, whatever expression surrounds it.
    fn creation_at(&self, pos: usize) -> Option<Creation> {
        match self.parser_at(pos).creation() {
            Expr::Creation(creation) => Some(creation),
            _ => None,
        }
    }

    fn declared_type_at(&self, pos: usize) -> Option<String> {
        let mut parser = self.parser_at(pos + 1);
        let (type_name, is_array) = parser.type_name()?;
        (!is_array).then_some(type_name)
    }

    /// `Name =` where `Name` is not qualified (`a.Name`) and not the declared
    /// name of a local, field or parameter (`Foo Name =`).
    fn is_bare_assignment_at(&self, pos: usize) -> bool {
        let Some(name) = self.tokens[pos].ident() else {
            return false;
        };
        if is_reserved(name) {
            return false;
        }
        if !self.tokens.get(pos + 1).is_some_and(|t| t.is_punct("=")) {
            return false;
        }
        let after_separator = match pos.checked_sub(1).map(|p| &self.tokens[p].kind) {
            None => true,
            Some(TokenKind::Ident(word)) => EXPRESSION_LEADERS.contains(&word.as_str()),
            Some(TokenKind::Punct(p)) => {
                !matches!(*p, "." | "?." | "::" | "->" | ">" | "]" | "?" | "*")
            }
            Some(_) => true,
        };
        after_separator && !self.is_member_declarator_at(pos)
    }

    /// `Name =` inside `new { ... }` or inside an attribute's argument list
    /// declares a member or names an argument; it assigns nothing.
    fn is_member_declarator_at(&self, pos: usize) -> bool {
        let Some(open) = self.enclosing_opener(pos) else {
            return false;
        };
        let opener = &self.tokens[open];
        if opener.is_punct("{") {
            return open
                .checked_sub(1)
                .and_then(|p| self.tokens[p].ident())
                == Some("new");
        }
        opener.is_punct("(")
            && self
                .enclosing_opener(open)
                .is_some_and(|outer| self.is_attribute_list_at(outer))
    }

    /// Index of the innermost unclosed `(`, `[` or `{` before `pos`.
    fn enclosing_opener(&self, pos: usize) -> Option<usize> {
        let mut depth = 0usize;
        for i in (0..pos).rev() {
            match self.tokens[i].kind {
                TokenKind::Punct(")" | "]" | "}") => depth += 1,
                TokenKind::Punct("(" | "[" | "{") => {
                    if depth == 0 {
                        return Some(i);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }

    /// A `[` that opens an attribute list: first in the file or following a
    /// statement, block or another attribute list.
    fn is_attribute_list_at(&self, pos: usize) -> bool {
        if !self.tokens[pos].is_punct("[") {
            return false;
        }
        match pos.checked_sub(1).map(|p| &self.tokens[p].kind) {
            None => true,
            Some(TokenKind::Punct(p)) => matches!(*p, ";" | "{" | "}" | "]"),
            Some(_) => false,
        }
    }

    fn assignment_at(&self, pos: usize) -> Assignment {
        let target = self.tokens[pos].ident().unwrap_or_default().to_string();
        let value = self.parser_at(pos + 2).expression();
        Assignment {
            target,
            bare_identifier: true,
            value: Box::new(value),
        }
    }
}

/// Recursive-descent parser over a token slice. Never fails; see the module
/// docs for how unsupported input is handled.
struct Parser<'t> {
    source: &'t str,
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    fn at_punct(&self, p: &str) -> bool {
        self.peek().is_some_and(|t| t.is_punct(p))
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Source text covered by tokens `start..end`.
    fn text(&self, start: usize, end: usize) -> String {
        if end <= start || end > self.tokens.len() {
            return String::new();
        }
        let from = self.tokens[start].span.start;
        let to = self.tokens[end - 1].span.end;
        self.source[from..to].to_string()
    }

    fn at_end_of_expression(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => matches!(token.kind, TokenKind::Punct("," | ";" | ")" | "]" | "}")),
        }
    }

    fn at_opener(&self) -> bool {
        matches!(
            self.peek().map(|t| &t.kind),
            Some(TokenKind::Punct("(" | "[" | "{"))
        )
    }

    /// Consume a bracketed group starting at the current opener, including
    /// everything nested inside it.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            self.pos += 1;
            match token.kind {
                TokenKind::Punct("(" | "[" | "{") => depth += 1,
                TokenKind::Punct(")" | "]" | "}") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Consume up to (not including) the next delimiter at this nesting level.
    fn skip_to_delimiter(&mut self) {
        while !self.at_end_of_expression() {
            if self.at_opener() {
                self.skip_group();
            } else {
                self.pos += 1;
            }
        }
    }

    fn expression(&mut self) -> Expr {
        let start = self.pos;
        if self.depth >= MAX_DEPTH {
            self.skip_to_delimiter();
            return Expr::Unsupported(self.text(start, self.pos));
        }
        self.depth += 1;
        let expr = self.assignment_or_primary(start);
        self.depth -= 1;
        expr
    }

    fn assignment_or_primary(&mut self, start: usize) -> Expr {
        let left = self.primary();
        if self.at_punct("=") && matches!(left.kind(), ExprKind::Name | ExprKind::Index) {
            let bare_identifier = matches!(left, Expr::Name(_)) && self.pos == start + 1;
            let target = self.text(start, self.pos);
            self.pos += 1;
            let value = self.expression();
            return Expr::Assignment(Assignment {
                target,
                bare_identifier,
                value: Box::new(value),
            });
        }
        if self.at_end_of_expression() {
            return left;
        }
        // Binary operators, lambdas, conditionals ...
        self.skip_to_delimiter();
        Expr::Unsupported(self.text(start, self.pos))
    }

    fn primary(&mut self) -> Expr {
        let start = self.pos;
        let Some(token) = self.peek() else {
            return Expr::Unsupported(String::new());
        };
        match &token.kind {
            TokenKind::Number(text) => {
                self.pos += 1;
                self.number(text, false, start)
            }
            TokenKind::Str(value) => {
                self.pos += 1;
                Expr::Literal(Literal::String(value.clone()))
            }
            TokenKind::Char(text) => {
                self.pos += 1;
                Expr::Literal(Literal::Other(text.clone()))
            }
            TokenKind::Punct("-") => match self.peek_at(1).map(|t| &t.kind) {
                Some(TokenKind::Number(text)) => {
                    self.pos += 2;
                    self.number(text, true, start)
                }
                _ => self.unsupported(start),
            },
            TokenKind::Punct("{") => Expr::Initializer(self.initializer()),
            TokenKind::Punct("[") => {
                self.skip_group();
                Expr::Index(self.text(start, self.pos))
            }
            TokenKind::Ident(word) => match word.as_str() {
                "null" => {
                    self.pos += 1;
                    Expr::Literal(Literal::Null)
                }
                "true" | "false" => {
                    self.pos += 1;
                    Expr::Literal(Literal::Bool(word == "true"))
                }
                "default" if !self.peek_at(1).is_some_and(|t| t.is_punct("(")) => {
                    self.pos += 1;
                    Expr::Literal(Literal::Other(word.clone()))
                }
                "new" => self.creation(),
                w if CHAIN_HEADS.contains(&w) || !is_reserved(w) => self.name_or_invocation(),
                _ => self.unsupported(start),
            },
            _ => self.unsupported(start),
        }
    }

    fn number(&self, text: &str, negative: bool, start: usize) -> Expr {
        match Number::from_literal(text, negative) {
            Some(n) => Expr::Literal(Literal::Number(n)),
            None => Expr::Unsupported(self.text(start, self.pos)),
        }
    }

    /// Consume one token (or one bracketed group) and mark it unsupported.
    fn unsupported(&mut self, start: usize) -> Expr {
        if self.at_opener() {
            self.skip_group();
        } else if !self.at_end_of_expression() {
            self.pos += 1;
        }
        Expr::Unsupported(self.text(start, self.pos))
    }

    fn name_or_invocation(&mut self) -> Expr {
        let start = self.pos;
        self.pos += 1;
        let mut expr = Expr::Name(self.text(start, self.pos));
        loop {
            let member = self.at_punct(".") || self.at_punct("?.") || self.at_punct("::");
            if member && self.peek_at(1).and_then(Token::ident).is_some() {
                self.pos += 2;
                expr = Expr::Name(self.text(start, self.pos));
            } else if self.at_punct("(") {
                let callee = self.text(start, self.pos);
                let arguments = self.arguments();
                expr = Expr::Invocation(Invocation { callee, arguments });
            } else if self.at_punct("[") {
                // element access
                self.skip_group();
                expr = Expr::Unsupported(self.text(start, self.pos));
            } else {
                return expr;
            }
        }
    }

    /// Parse `( arg, name: arg, ... )`. Named-argument labels are dropped.
    fn arguments(&mut self) -> Vec<Expr> {
        self.pos += 1;
        let mut arguments = Vec::new();
        if self.eat_punct(")") {
            return arguments;
        }
        loop {
            let labelled = self.peek().and_then(Token::ident).is_some()
                && self.peek_at(1).is_some_and(|t| t.is_punct(":"));
            if labelled {
                self.pos += 2;
            }
            arguments.push(self.expression());
            if self.eat_punct(",") {
                continue;
            }
            self.eat_punct(")");
            return arguments;
        }
    }

    fn initializer(&mut self) -> Initializer {
        self.pos += 1;
        let mut entries = Vec::new();
        loop {
            if self.peek().is_none() || self.eat_punct("}") {
                break;
            }
            entries.push(self.expression());
            if self.eat_punct(",") {
                continue;
            }
            self.eat_punct("}");
            break;
        }
        Initializer { entries }
    }

    fn optional_initializer(&mut self) -> Option<Initializer> {
        self.at_punct("{").then(|| self.initializer())
    }

    fn creation(&mut self) -> Expr {
        let start = self.pos;
        self.pos += 1;
        if self.at_punct("(") {
            let arguments = self.arguments();
            let initializer = self.optional_initializer();
            return Expr::ImplicitCreation(ImplicitCreation {
                arguments,
                initializer,
            });
        }
        if self.at_punct("{") || self.at_punct("[") {
            // anonymous object or implicitly typed array
            self.skip_group();
            if self.at_punct("{") {
                self.skip_group();
            }
            return Expr::Unsupported(self.text(start, self.pos));
        }
        let Some((type_name, is_array)) = self.type_name() else {
            return Expr::Unsupported(self.text(start, self.pos));
        };
        if is_array {
            if self.at_punct("{") {
                self.skip_group();
            }
            return Expr::Unsupported(self.text(start, self.pos));
        }
        let arguments = if self.at_punct("(") {
            self.arguments()
        } else {
            Vec::new()
        };
        let initializer = self.optional_initializer();
        Expr::Creation(Creation {
            type_name,
            arguments,
            initializer,
        })
    }

    /// Parse a type such as `Ns.Outer.Inner<int, List<string>>?` and report
    /// whether array ranks follow it.
    fn type_name(&mut self) -> Option<(String, bool)> {
        let start = self.pos;
        self.peek()?.ident()?;
        self.pos += 1;
        loop {
            if self.at_punct("<") {
                self.skip_type_arguments()?;
            } else if (self.at_punct(".") || self.at_punct("::"))
                && self.peek_at(1).and_then(Token::ident).is_some()
            {
                self.pos += 2;
            } else {
                break;
            }
        }
        self.eat_punct("?");
        let end = self.pos;
        let is_array = self.at_punct("[");
        while self.at_punct("[") {
            self.skip_group();
        }
        Some((self.text(start, end), is_array))
    }

    fn skip_type_arguments(&mut self) -> Option<()> {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Punct("<") => depth += 1,
                TokenKind::Punct(">") => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Some(());
                    }
                }
                TokenKind::Ident(_) => {}
                TokenKind::Punct("," | "." | "?" | "[" | "]" | "(" | ")" | "::" | "*") => {}
                _ => return None,
            }
            self.pos += 1;
        }
        None
    }
}
