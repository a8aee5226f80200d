//! Token-stream formatter for claw/volt.
//!
//! Produces canonical layout directly from a token sequence with no AST
//! input at all — this is what lets `textDocument/formatting` and friends
//! run even over documents with parser errors.

#![deny(unsafe_code)]

use claw_token::{Token, TokenTag};

/// Default indentation width in spaces.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Format a token sequence using the default indent width.
pub fn format_default(tokens: &[Token]) -> String {
    format(tokens, DEFAULT_INDENT_WIDTH)
}

/// Format a token sequence into canonical source text.
///
/// State carried across tokens: the current indent level, whether the
/// cursor is at the start of a line, and the tag of the previously emitted
/// token (used to decide whether two adjacent atoms need a separating
/// space). `Eof` tokens are skipped.
pub fn format(tokens: &[Token], indent_width: usize) -> String {
    let mut out = String::new();
    let mut indent = 0usize;
    let mut at_line_start = true;
    let mut prev_tag: Option<TokenTag> = None;

    for tok in tokens {
        if tok.tag == TokenTag::Eof {
            continue;
        }

        if tok.tag == TokenTag::RBrace {
            if !at_line_start {
                out.push('\n');
            }
            indent = indent.saturating_sub(1);
            push_indent(&mut out, indent, indent_width);
            out.push('}');
            at_line_start = false;
            prev_tag = Some(tok.tag);
            continue;
        }

        if at_line_start {
            push_indent(&mut out, indent, indent_width);
            at_line_start = false;
        }

        match tok.tag {
            TokenTag::LBrace => {
                out.push_str(" {\n");
                indent += 1;
                at_line_start = true;
            }
            TokenTag::Semicolon => {
                out.push_str(";\n");
                at_line_start = true;
            }
            TokenTag::LParen | TokenTag::LBracket | TokenTag::RParen | TokenTag::RBracket => {
                out.push_str(&tok.lexeme);
            }
            TokenTag::Comma => out.push_str(", "),
            TokenTag::Colon => out.push_str(": "),
            tag if tag.is_binary_operator() => {
                out.push(' ');
                out.push_str(&tok.lexeme);
                out.push(' ');
            }
            _ => {
                if prev_tag.is_some_and(|p| p.is_atom()) && tok.tag.is_atom() {
                    out.push(' ');
                }
                out.push_str(&tok.lexeme);
            }
        }
        prev_tag = Some(tok.tag);
    }
    out
}

fn push_indent(out: &mut String, level: usize, width: usize) {
    for _ in 0..(level * width) {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_lexer::lex;

    fn fmt(src: &str) -> String {
        format_default(&lex(src))
    }

    #[test]
    fn formats_function_declaration() {
        let out = fmt("fn f(a,b){return a+b;}");
        assert_eq!(out, "fn f(a, b) {\n  return a + b;\n}");
    }

    #[test]
    fn formatter_is_idempotent() {
        let once = fmt("fn f(a,b){return a+b;}");
        let twice = format_default(&claw_lexer::lex(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn glues_adjacent_atoms_with_a_space() {
        // Two adjacent string/number/identifier lexemes with nothing
        // between them still need a separating space in the output.
        let out = fmt("let x = 1\nlet y = 2\n");
        assert!(out.contains("let x = 1"));
        assert!(out.contains("let y = 2"));
    }

    #[test]
    fn empty_document_formats_to_empty_string() {
        assert_eq!(fmt(""), "");
    }

    #[test]
    fn member_access_has_no_stray_spaces() {
        let out = fmt("arr.push(x);");
        assert_eq!(out, "arr.push(x);\n");
    }
}
