// SPDX-License-Identifier: Apache-2.0

//! Lexer for the supported Verilog/SystemVerilog subset.
//!
//! Whitespace and comments are not discarded: they are attached to the
//! following token as ordered trivia pieces, which is what the marker
//! location machinery in [`crate::syntax`] relies on. String literals are
//! ordinary tokens, so marker text inside a string never reaches a trivia
//! scan.

use crate::syntax::Trivia;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokKind {
    Ident,
    Number,
    Str,
    Sym(char),
    Eof,
}

#[derive(Clone, Debug)]
pub(crate) struct RawToken {
    pub kind: TokKind,
    pub start: usize,
    pub end: usize,
    pub trivia: Vec<Trivia>,
}

impl RawToken {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

pub(crate) fn lex(src: &str) -> Vec<RawToken> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let mut trivia = Vec::new();
        loop {
            let start = pos;
            if pos >= bytes.len() {
                break;
            }
            let b = bytes[pos];
            if b.is_ascii_whitespace() {
                while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
            } else if b == b'/' && pos + 1 < bytes.len() && bytes[pos + 1] == b'/' {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            } else if b == b'/' && pos + 1 < bytes.len() && bytes[pos + 1] == b'*' {
                pos += 2;
                while pos < bytes.len() && !(bytes[pos] == b'*' && bytes.get(pos + 1) == Some(&b'/'))
                {
                    pos += 1;
                }
                pos = (pos + 2).min(bytes.len());
            } else {
                break;
            }
            trivia.push(Trivia {
                text: src[start..pos].to_string(),
            });
        }

        if pos >= bytes.len() {
            tokens.push(RawToken {
                kind: TokKind::Eof,
                start: pos,
                end: pos,
                trivia,
            });
            return tokens;
        }

        let start = pos;
        let b = bytes[pos];
        let kind = if b.is_ascii_alphabetic() || b == b'_' {
            pos += 1;
            while pos < bytes.len() && is_ident_char(bytes[pos]) {
                pos += 1;
            }
            TokKind::Ident
        } else if b.is_ascii_digit() {
            pos += 1;
            while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'_') {
                pos += 1;
            }
            if pos < bytes.len() && bytes[pos] == b'\'' {
                pos = lex_based_tail(bytes, pos + 1);
            }
            TokKind::Number
        } else if b == b'\'' {
            // Unsized literals such as 'b0, '0, '1, 'z.
            pos = lex_based_tail(bytes, pos + 1);
            TokKind::Number
        } else if b == b'"' {
            pos += 1;
            while pos < bytes.len() && bytes[pos] != b'"' {
                if bytes[pos] == b'\\' {
                    pos += 1;
                }
                pos += 1;
            }
            pos = (pos + 1).min(bytes.len());
            TokKind::Str
        } else {
            pos += 1;
            TokKind::Sym(b as char)
        };

        tokens.push(RawToken {
            kind,
            start,
            end: pos,
            trivia,
        });
    }
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn lex_based_tail(bytes: &[u8], mut pos: usize) -> usize {
    if pos < bytes.len() && (bytes[pos] == b's' || bytes[pos] == b'S') {
        pos += 1;
    }
    while pos < bytes.len()
        && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'?')
    {
        pos += 1;
    }
    pos
}
