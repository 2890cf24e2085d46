// SPDX-License-Identifier: Apache-2.0

//! Token-level syntax model consumed by the expansion engine.
//!
//! Comments and whitespace attach to the *following* token as ordered trivia
//! pieces. Absolute positions of trivia are reconstructed by backward
//! accumulation from the token's own start offset, which is what makes
//! byte-exact marker location possible without ever searching the raw source
//! text.

use crate::io::IO;

/// A single piece of non-semantic text (whitespace, line comment, or block
/// comment) preceding a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trivia {
    pub text: String,
}

impl Trivia {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A lexical token position: the byte offset where the token's own text
/// begins, plus the ordered trivia pieces immediately preceding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub trivia: Vec<Trivia>,
}

impl Token {
    pub fn new(offset: usize, trivia: Vec<Trivia>) -> Self {
        Token { offset, trivia }
    }

    /// Returns the byte offset where this token's trivia region begins.
    pub fn trivia_start(&self) -> usize {
        self.offset - self.trivia.iter().map(Trivia::len).sum::<usize>()
    }

    /// Locates the first occurrence of `marker` as a literal substring inside
    /// this token's trivia, returning its absolute byte range. Only trivia is
    /// inspected, so marker text inside string literals or identifiers is
    /// inert by construction. Returns `None` if the marker is not present.
    pub fn locate(&self, marker: &str) -> Option<(usize, usize)> {
        self.locate_after(marker, 0)
    }

    /// Iterates trivia pieces together with their absolute byte offsets.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, &Trivia)> {
        let mut pos = self.trivia_start();
        self.trivia.iter().map(move |piece| {
            let start = pos;
            pos += piece.len();
            (start, piece)
        })
    }

    /// Like [`Token::locate`], but only returns occurrences that begin at or
    /// after the absolute byte offset `from`.
    pub fn locate_after(&self, marker: &str, from: usize) -> Option<(usize, usize)> {
        let mut pos = self.trivia_start();
        for piece in &self.trivia {
            let mut search_from = 0;
            while let Some(found) = piece.text[search_from..].find(marker) {
                let start = pos + search_from + found;
                if start >= from {
                    return Some((start, start + marker.len()));
                }
                search_from += found + 1;
            }
            pos += piece.len();
        }
        None
    }

    /// Returns the absolute byte range of the first whole trivia *piece*
    /// that contains `needle` and begins at or after `from`. Generated text
    /// is always placed relative to the enclosing comment, never inside it,
    /// so insertion points come from piece boundaries rather than from the
    /// needle's own range.
    pub fn find_piece(&self, needle: &str, from: usize) -> Option<(usize, usize)> {
        self.pieces()
            .find(|(start, piece)| *start >= from && piece.text.contains(needle))
            .map(|(start, piece)| (start, start + piece.len()))
    }
}

/// One named connection (`.port (signal)`) in an instantiation's connection
/// list. `token` is the position of the leading `.`.
#[derive(Clone, Debug)]
pub struct InstanceConn {
    pub port: String,
    pub signal: String,
    pub token: Token,
}

/// A module instantiation member.
#[derive(Clone, Debug)]
pub struct Instance {
    pub module_type: String,
    pub inst_name: String,
    /// First token of the instantiation (the module type identifier).
    pub token: Token,
    pub conns: Vec<InstanceConn>,
    /// The `)` closing the connection list.
    pub close_token: Token,
}

/// A signal declaration member (`wire`/`reg`/`logic`/direction keyword, or a
/// composite-typed declaration).
#[derive(Clone, Debug)]
pub struct Decl {
    pub token: Token,
    pub keyword: String,
    pub data_type: crate::io::DataType,
    pub names: Vec<String>,
    /// Identifiers read by inline initializers (`wire x = a & b;`).
    pub init_reads: Vec<String>,
    /// Names declared with an inline initializer, which drives them.
    pub init_driven: Vec<String>,
}

/// A continuous assignment member.
#[derive(Clone, Debug)]
pub struct Assign {
    pub token: Token,
    pub targets: Vec<String>,
    pub reads: Vec<String>,
}

/// A module body member, as a flat tagged variant. Constructs the engine does
/// not model (procedural blocks, parameters, functions) are carried as
/// `Other` so that their leading trivia remains reachable for marker scans.
#[derive(Clone, Debug)]
pub enum Member {
    Instance(Instance),
    Decl(Decl),
    Assign(Assign),
    Other(Token),
}

impl Member {
    /// Returns the leading token of the member.
    pub fn token(&self) -> &Token {
        match self {
            Member::Instance(inst) => &inst.token,
            Member::Decl(decl) => &decl.token,
            Member::Assign(assign) => &assign.token,
            Member::Other(token) => token,
        }
    }
}

/// One entry in a module's header port list.
#[derive(Clone, Debug)]
pub struct HeaderPort {
    pub name: String,
    /// `None` for non-ANSI name-only entries; resolved against body
    /// declarations when the module signature is built.
    pub io: Option<IO>,
    /// First token of the entry.
    pub token: Token,
}

/// A parsed module: header, flat member list, and the tokens that can carry
/// marker trivia at the boundaries.
#[derive(Clone, Debug)]
pub struct ModuleSyntax {
    pub name: String,
    pub header_ports: Vec<HeaderPort>,
    /// The `)` closing the header port list, or the `;` terminating the
    /// header when there is no port list.
    pub header_close: Token,
    pub members: Vec<Member>,
    pub endmodule: Token,
}

impl ModuleSyntax {
    /// Returns every token that can carry marker trivia, in source order:
    /// header port entries, the header close, each member's leading token
    /// (plus connection and close tokens for instances), and `endmodule`.
    pub fn carrier_tokens(&self) -> Vec<&Token> {
        let mut tokens = Vec::new();
        for port in &self.header_ports {
            tokens.push(&port.token);
        }
        tokens.push(&self.header_close);
        for member in &self.members {
            tokens.push(member.token());
            if let Member::Instance(inst) = member {
                for conn in &inst.conns {
                    tokens.push(&conn.token);
                }
                tokens.push(&inst.close_token);
            }
        }
        tokens.push(&self.endmodule);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_trivia(pieces: &[&str], offset: usize) -> Token {
        Token::new(
            offset,
            pieces
                .iter()
                .map(|text| Trivia {
                    text: text.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn locate_accumulates_backward() {
        // Trivia region: "  " + "/*AUTOINST*/" + "\n" = 15 bytes before
        // offset 20, so the region starts at offset 5.
        let token = token_with_trivia(&["  ", "/*AUTOINST*/", "\n"], 20);
        assert_eq!(token.trivia_start(), 5);
        assert_eq!(token.locate("AUTOINST"), Some((9, 17)));
    }

    #[test]
    fn locate_missing_marker() {
        let token = token_with_trivia(&["// nothing here\n"], 16);
        assert_eq!(token.locate("AUTOWIRE"), None);
    }

    #[test]
    fn locate_after_skips_earlier_occurrences() {
        let token = token_with_trivia(&["/*X*/", "/*X*/"], 10);
        assert_eq!(token.locate("X"), Some((2, 3)));
        assert_eq!(token.locate_after("X", 3), Some((7, 8)));
    }
}
