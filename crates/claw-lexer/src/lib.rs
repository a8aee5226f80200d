//! Lexer for claw/volt source text.
//!
//! The lexer is deliberately small: it supports exactly the token set the
//! rest of the toolchain (formatter, analyzer) needs and nothing more. A
//! richer, production lexer (string interpolation, heredocs, regex
//! literals) is explicitly out of scope for this engine — it is an
//! external collaborator here, not a subject of analysis.

#![deny(unsafe_code)]

use claw_token::{Token, TokenTag};

/// Lex `source` into an ordered token sequence terminated by a single `Eof`.
///
/// Never fails: unrecognized bytes are skipped so that the rest of the
/// document can still be tokenized and analyzed. (Malformed input surfaces
/// later as parser errors, not lexer errors — see `claw_ast::parse`.)
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    lexer.run();
    lexer.tokens
}

struct Lexer<'a> {
    chars: Vec<char>,
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { chars: source.chars().collect(), source, pos: 0, line: 1, column: 1, tokens: Vec::new() }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(&mut self) {
        let _ = self.source; // retained for future diagnostics; tokenization is char-based
        loop {
            self.skip_whitespace_and_comments();
            let (start_line, start_col) = (self.line, self.column);
            let Some(c) = self.peek() else {
                self.tokens.push(Token::new(TokenTag::Eof, "", start_line, start_col));
                break;
            };

            if c.is_ascii_digit() {
                self.lex_number(start_line, start_col);
            } else if c == '"' {
                self.lex_string(start_line, start_col);
            } else if is_ident_start(c) {
                self.lex_ident_or_keyword(start_line, start_col);
            } else {
                self.lex_punct_or_operator(start_line, start_col);
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, line: usize, col: usize) {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token::new(TokenTag::Number, lexeme, line, col));
    }

    fn lex_string(&mut self, line: usize, col: usize) {
        let start = self.pos;
        self.advance(); // opening quote
        while let Some(c) = self.peek() {
            if c == '"' {
                self.advance();
                break;
            }
            if c == '\\' {
                self.advance();
                self.advance();
            } else {
                self.advance();
            }
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token::new(TokenTag::Str, lexeme, line, col));
    }

    fn lex_ident_or_keyword(&mut self, line: usize, col: usize) {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.advance();
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        let tag = match lexeme.as_str() {
            "true" | "false" => TokenTag::Bool,
            "nil" => TokenTag::Nil,
            other => TokenTag::KEYWORDS
                .iter()
                .find(|(kw, _)| *kw == other)
                .map(|(_, tag)| *tag)
                .unwrap_or(TokenTag::Ident),
        };
        self.tokens.push(Token::new(tag, lexeme, line, col));
    }

    fn lex_punct_or_operator(&mut self, line: usize, col: usize) {
        let c = self.advance().unwrap_or('\0');
        let two_char = |second: char| self.peek() == Some(second);

        let (tag, lexeme): (TokenTag, String) = match c {
            '{' => (TokenTag::LBrace, "{".into()),
            '}' => (TokenTag::RBrace, "}".into()),
            '(' => (TokenTag::LParen, "(".into()),
            ')' => (TokenTag::RParen, ")".into()),
            '[' => (TokenTag::LBracket, "[".into()),
            ']' => (TokenTag::RBracket, "]".into()),
            ',' => (TokenTag::Comma, ",".into()),
            ':' => (TokenTag::Colon, ":".into()),
            ';' => (TokenTag::Semicolon, ";".into()),
            '.' => (TokenTag::Dot, ".".into()),
            '+' if two_char('=') => {
                self.advance();
                (TokenTag::PlusEq, "+=".into())
            }
            '+' => (TokenTag::Plus, "+".into()),
            '-' if two_char('=') => {
                self.advance();
                (TokenTag::MinusEq, "-=".into())
            }
            '-' => (TokenTag::Minus, "-".into()),
            '*' if two_char('=') => {
                self.advance();
                (TokenTag::StarEq, "*=".into())
            }
            '*' => (TokenTag::Star, "*".into()),
            '/' if two_char('=') => {
                self.advance();
                (TokenTag::SlashEq, "/=".into())
            }
            '/' => (TokenTag::Slash, "/".into()),
            '%' => (TokenTag::Percent, "%".into()),
            '=' if two_char('=') => {
                self.advance();
                (TokenTag::EqEq, "==".into())
            }
            '=' => (TokenTag::Eq, "=".into()),
            '!' if two_char('=') => {
                self.advance();
                (TokenTag::NotEq, "!=".into())
            }
            '<' if two_char('=') => {
                self.advance();
                (TokenTag::LtEq, "<=".into())
            }
            '<' => (TokenTag::Lt, "<".into()),
            '>' if two_char('=') => {
                self.advance();
                (TokenTag::GtEq, ">=".into())
            }
            '>' => (TokenTag::Gt, ">".into()),
            '&' if two_char('&') => {
                self.advance();
                (TokenTag::AndAnd, "&&".into())
            }
            '|' if two_char('|') => {
                self.advance();
                (TokenTag::OrOr, "||".into())
            }
            other => (TokenTag::Ident, other.to_string()),
        };
        self.tokens.push(Token::new(tag, lexeme, line, col));
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_let_binding() {
        let toks = lex("let x = 42\n");
        let tags: Vec<_> = toks.iter().map(|t| t.tag).collect();
        assert_eq!(
            tags,
            vec![TokenTag::Let, TokenTag::Ident, TokenTag::Eq, TokenTag::Number, TokenTag::Eof]
        );
    }

    #[test]
    fn lexes_function_signature() {
        let toks = lex("fn f(a,b){return a+b;}");
        let tags: Vec<_> = toks.iter().map(|t| t.tag).collect();
        assert_eq!(
            tags,
            vec![
                TokenTag::Fn,
                TokenTag::Ident,
                TokenTag::LParen,
                TokenTag::Ident,
                TokenTag::Comma,
                TokenTag::Ident,
                TokenTag::RParen,
                TokenTag::LBrace,
                TokenTag::Return,
                TokenTag::Ident,
                TokenTag::Plus,
                TokenTag::Ident,
                TokenTag::Semicolon,
                TokenTag::RBrace,
                TokenTag::Eof,
            ]
        );
    }

    #[test]
    fn empty_document_yields_only_eof() {
        let toks = lex("");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].tag, TokenTag::Eof);
    }

    #[test]
    fn skips_line_comments() {
        let toks = lex("let x = 1 // trailing comment\n");
        let tags: Vec<_> = toks.iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec![TokenTag::Let, TokenTag::Ident, TokenTag::Eq, TokenTag::Number, TokenTag::Eof]);
    }
}
