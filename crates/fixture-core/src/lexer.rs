//! Tokenizer for C# source files.
//!
//! Only as much of the lexical grammar as the expression parser needs is
//! modeled in detail: identifiers, numeric/string/character literals and
//! punctuation. Whitespace, comments and preprocessor lines are skipped.
//! Interpolated strings are kept as opaque tokens.
//!
//! `>>` is never produced as a single token so that nested generic argument
//! lists such as `List<List<int>>` close one level at a time.

use crate::error::{FixtureError, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1, take_while_m_n},
    character::complete::{char, digit1, none_of, not_line_ending, one_of, satisfy},
    combinator::{map, opt, recognize, value},
    multi::{many0, many0_count},
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};
use std::ops::Range;

/// A lexical token with its byte span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword, as written (a verbatim `@` prefix is kept).
    Ident(String),
    /// Numeric literal text, suffix included.
    Number(String),
    /// String literal with escapes already resolved.
    Str(String),
    /// Character literal, kept as written (quotes included).
    Char(String),
    /// Interpolated string, kept as written.
    Interpolated(String),
    Punct(&'static str),
    /// A character that cannot start any C# token.
    Unknown(char),
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        matches!(&self.kind, TokenKind::Punct(q) if *q == p)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

type LexResult<'a, T> = IResult<&'a str, T>;

/// Tokenize a whole source file.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = source;

    loop {
        rest = match trivia(rest) {
            Ok((after, _)) => after,
            Err(_) => rest,
        };
        if rest.is_empty() {
            break;
        }
        let start = source.len() - rest.len();
        if rest.starts_with("/*") {
            return Err(FixtureError::syntax_at(source, start, "unterminated block comment"));
        }
        match token(rest) {
            Ok((after, kind)) => {
                let end = source.len() - after.len();
                tokens.push(Token {
                    kind,
                    span: start..end,
                });
                rest = after;
            }
            Err(_) => {
                let message = if rest.starts_with('\'') {
                    "unterminated character literal"
                } else {
                    "unterminated string literal"
                };
                return Err(FixtureError::syntax_at(source, start, message));
            }
        }
    }

    Ok(tokens)
}

// ============================================================================
// Trivia
// ============================================================================

fn trivia(input: &str) -> LexResult<'_, usize> {
    many0_count(alt((
        value((), take_while1(|c: char| c.is_whitespace() || c == '\u{feff}')),
        value((), line_comment),
        value((), block_comment),
        value((), directive),
    )))(input)
}

fn line_comment(input: &str) -> LexResult<'_, &str> {
    recognize(pair(tag("//"), not_line_ending))(input)
}

fn block_comment(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// `#region`, `#if`, `#nullable` ... only ever follow whitespace on a line,
/// and `#` appears nowhere else in C# outside literals.
fn directive(input: &str) -> LexResult<'_, &str> {
    recognize(pair(char('#'), not_line_ending))(input)
}

// ============================================================================
// Tokens
// ============================================================================

fn token(input: &str) -> LexResult<'_, TokenKind> {
    alt((
        map(raw_string, TokenKind::Str),
        map(interpolated_string, |s: &str| TokenKind::Interpolated(s.to_string())),
        map(verbatim_string, TokenKind::Str),
        map(regular_string, TokenKind::Str),
        map(char_literal, |s: &str| TokenKind::Char(s.to_string())),
        map(number, |s: &str| TokenKind::Number(s.to_string())),
        map(identifier, |s: &str| TokenKind::Ident(s.to_string())),
        punctuation,
    ))(input)
}

fn identifier(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((
        opt(char('@')),
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    )))(input)
}

// ----------------------------------------------------------------------------
// Numbers
// ----------------------------------------------------------------------------

fn number(input: &str) -> LexResult<'_, &str> {
    alt((hex_number, binary_number, decimal_number, leading_dot_number))(input)
}

fn digits(input: &str) -> LexResult<'_, &str> {
    recognize(pair(digit1, take_while(|c: char| c.is_ascii_digit() || c == '_')))(input)
}

fn integer_suffix(input: &str) -> LexResult<'_, &str> {
    alt((
        tag_no_case("ul"),
        tag_no_case("lu"),
        tag_no_case("u"),
        tag_no_case("l"),
    ))(input)
}

fn real_suffix(input: &str) -> LexResult<'_, &str> {
    recognize(one_of("fFdDmM"))(input)
}

fn exponent(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digits)))(input)
}

fn hex_number(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((
        tag_no_case("0x"),
        take_while1(|c: char| c.is_ascii_hexdigit() || c == '_'),
        opt(integer_suffix),
    )))(input)
}

fn binary_number(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((
        tag_no_case("0b"),
        take_while1(|c: char| c == '0' || c == '1' || c == '_'),
        opt(integer_suffix),
    )))(input)
}

fn decimal_number(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((
        digits,
        opt(pair(char('.'), digits)),
        opt(exponent),
        opt(alt((integer_suffix, real_suffix))),
    )))(input)
}

fn leading_dot_number(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((char('.'), digits, opt(exponent), opt(real_suffix))))(input)
}

// ----------------------------------------------------------------------------
// Strings and characters
// ----------------------------------------------------------------------------

/// `"..."` with C# escape sequences resolved.
fn regular_string(input: &str) -> LexResult<'_, String> {
    let (input, _) = char('"')(input)?;
    let (input, chars) = many0(alt((escape_sequence, none_of("\"\\\n"))))(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, chars.into_iter().collect()))
}

fn escape_sequence(input: &str) -> LexResult<'_, char> {
    preceded(
        char('\\'),
        alt((
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\0', char('0')),
            value('\u{07}', char('a')),
            value('\u{08}', char('b')),
            value('\u{0C}', char('f')),
            value('\u{0B}', char('v')),
            value('\\', char('\\')),
            value('"', char('"')),
            value('\'', char('\'')),
            unicode_escape,
        )),
    )(input)
}

/// `\uXXXX`, `\UXXXXXXXX` and the variable-length `\xH[H][H][H]`.
fn unicode_escape(input: &str) -> LexResult<'_, char> {
    let (rest, hex) = alt((
        preceded(char('u'), take_while_m_n(4, 4, is_hex)),
        preceded(char('U'), take_while_m_n(8, 8, is_hex)),
        preceded(char('x'), take_while_m_n(1, 4, is_hex)),
    ))(input)?;
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => Ok((rest, c)),
        None => Ok((rest, char::REPLACEMENT_CHARACTER)),
    }
}

fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// `@"..."` where `""` stands for a single quote.
fn verbatim_string(input: &str) -> LexResult<'_, String> {
    let (input, _) = tag("@\"")(input)?;
    let (input, chunks) = many0(alt((value("\"", tag("\"\"")), recognize(none_of("\"")))))(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, chunks.concat()))
}

/// `"""..."""` raw string literal (three or more quotes).
fn raw_string(input: &str) -> LexResult<'_, String> {
    let (body, quotes) = take_while1(|c| c == '"')(input)?;
    if quotes.len() < 3 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (rest, content) = terminated(take_until(quotes), tag(quotes))(body)?;
    Ok((rest, raw_string_value(content)))
}

/// Multi-line raw strings drop the opening and closing line breaks and the
/// whitespace prefix of the closing line from every content line.
fn raw_string_value(content: &str) -> String {
    if !content.contains('\n') {
        return content.to_string();
    }
    let content = content.strip_prefix("\r\n").or_else(|| content.strip_prefix('\n')).unwrap_or(content);
    let (body, indent) = match content.rfind('\n') {
        Some(pos) if content[pos + 1..].trim().is_empty() => (&content[..pos], &content[pos + 1..]),
        _ => (content, ""),
    };
    let body = body.strip_suffix('\r').unwrap_or(body);
    body.split('\n')
        .map(|line| line.strip_prefix(indent).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `$"..."`, `$@"..."` or `@$"..."`. Holes may contain nested strings.
fn interpolated_string(input: &str) -> LexResult<'_, &str> {
    let (after_prefix, prefix) = alt((tag("$@\""), tag("@$\""), tag("$\"")))(input)?;
    let verbatim = prefix.contains('@');
    let mut depth = 0usize;
    let mut rest = after_prefix;
    loop {
        let mut chars = rest.chars();
        let c = match chars.next() {
            Some(c) => c,
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Eof,
                )))
            }
        };
        match c {
            '"' if depth > 0 => {
                let (after, _) = regular_string(rest)?;
                rest = after;
                continue;
            }
            '"' if verbatim && chars.as_str().starts_with('"') => {
                rest = &rest[2..];
                continue;
            }
            '"' => {
                rest = &rest[1..];
                break;
            }
            '\\' if !verbatim && depth == 0 => {
                let (after, _) = escape_sequence(rest)?;
                rest = after;
                continue;
            }
            '{' | '}' if depth == 0 && chars.as_str().starts_with(c) => {
                rest = &rest[2..];
                continue;
            }
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        rest = chars.as_str();
    }
    let consumed = input.len() - rest.len();
    Ok((rest, &input[..consumed]))
}

fn char_literal(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((
        char('\''),
        alt((recognize(escape_sequence), recognize(none_of("'\\\n")))),
        char('\''),
    )))(input)
}

// ----------------------------------------------------------------------------
// Punctuation
// ----------------------------------------------------------------------------

/// Longest operators first; `>>` and `>>=` are deliberately absent.
const PUNCTUATION: &[&str] = &[
    "<<=", "??=", "==", "!=", "<=", ">=", "=>", "&&", "||", "??", "?.", "::", "->", "++",
    "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", "..", "{", "}", "(", ")", "[",
    "]", ";", ",", ".", ":", "?", "=", "<", ">", "+", "-", "*", "/", "%", "&", "|", "^", "!",
    "~",
];

fn punctuation(input: &str) -> LexResult<'_, TokenKind> {
    if let Some(p) = PUNCTUATION.iter().find(|p| input.starts_with(**p)) {
        return Ok((&input[p.len()..], TokenKind::Punct(*p)));
    }
    // Not C# outside a literal; keep lexing past it. Quotes are left to fail
    // so an unterminated literal is reported.
    map(none_of("\"'"), TokenKind::Unknown)(input)
}
