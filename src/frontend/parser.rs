// SPDX-License-Identifier: Apache-2.0

//! Member-level parser for the supported Verilog/SystemVerilog subset.
//!
//! This is not a full language frontend: it recovers exactly what the
//! expansion engine needs (header ports, declarations, continuous
//! assignments, instantiations) and skips everything else with balanced
//! scanning, keeping every skipped construct's leading trivia reachable.
//! Malformed modules are skipped rather than interpreted.

use crate::io::{DataType, IO};
use crate::syntax::{
    Assign, Decl, HeaderPort, Instance, InstanceConn, Member, ModuleSyntax, Token, Trivia,
};

use super::lexer::{RawToken, TokKind, lex};

const NET_KEYWORDS: &[&str] = &[
    "wire", "reg", "logic", "tri", "tri0", "tri1", "wand", "wor", "supply0", "supply1", "bit",
    "int", "integer", "byte", "shortint", "longint", "time", "real", "var",
];

const DIR_KEYWORDS: &[&str] = &["input", "output", "inout"];

/// Parses every well-formed module in `src`. Modules that cannot be parsed
/// are skipped entirely.
pub fn parse_source(src: &str) -> Vec<ModuleSyntax> {
    let mut parser = Parser {
        src,
        toks: lex(src),
        pos: 0,
    };
    let mut modules = Vec::new();
    while !parser.at_eof() {
        if parser.at_ident("module") || parser.at_ident("macromodule") {
            let rescue = parser.pos;
            match parser.parse_module() {
                Some(module) => modules.push(module),
                None => {
                    parser.pos = rescue + 1;
                    parser.skip_past_ident("endmodule");
                }
            }
        } else {
            parser.bump();
        }
    }
    modules
}

struct Parser<'a> {
    src: &'a str,
    toks: Vec<RawToken>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &RawToken {
        &self.toks[self.pos.min(self.toks.len() - 1)]
    }

    fn kind(&self) -> TokKind {
        self.cur().kind
    }

    fn text(&self) -> &'a str {
        self.cur().text(self.src)
    }

    fn at_eof(&self) -> bool {
        self.kind() == TokKind::Eof
    }

    fn at_ident(&self, word: &str) -> bool {
        self.kind() == TokKind::Ident && self.text() == word
    }

    fn at_sym(&self, sym: char) -> bool {
        self.kind() == TokKind::Sym(sym)
    }

    fn bump(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn take(&mut self) -> RawToken {
        let tok = self.cur().clone();
        self.bump();
        tok
    }

    fn eat_sym(&mut self, sym: char) -> bool {
        if self.at_sym(sym) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn to_token(raw: &RawToken) -> Token {
        Token::new(raw.start, raw.trivia.clone())
    }

    /// Builds a token whose trivia is extended on the left with `pending`:
    /// the trivia and text of separator tokens consumed since the previous
    /// entry. Keeping separators as trivia of the following token preserves
    /// backward-accumulation contiguity and keeps marker comments written
    /// before a comma reachable.
    fn merged_token(pending: &mut Vec<Trivia>, raw: &RawToken) -> Token {
        let mut trivia = std::mem::take(pending);
        trivia.extend(raw.trivia.iter().cloned());
        Token::new(raw.start, trivia)
    }

    /// Folds the current token (trivia plus its own text) into `pending` and
    /// advances past it.
    fn fold_into_pending(&mut self, pending: &mut Vec<Trivia>) {
        let raw = self.take();
        pending.extend(raw.trivia.iter().cloned());
        pending.push(Trivia {
            text: raw.text(self.src).to_string(),
        });
    }

    fn peek(&self, ahead: usize) -> &RawToken {
        &self.toks[(self.pos + ahead).min(self.toks.len() - 1)]
    }

    /// Skips a balanced `(...)`, `[...]`, or `{...}` group starting at the
    /// current token (which must be the opener).
    fn skip_balanced(&mut self) {
        let (open, close) = match self.kind() {
            TokKind::Sym('(') => ('(', ')'),
            TokKind::Sym('[') => ('[', ']'),
            TokKind::Sym('{') => ('{', '}'),
            _ => return,
        };
        let mut depth = 0usize;
        while !self.at_eof() {
            if self.kind() == TokKind::Sym(open) {
                depth += 1;
            } else if self.kind() == TokKind::Sym(close) {
                depth -= 1;
                if depth == 0 {
                    self.bump();
                    return;
                }
            }
            self.bump();
        }
    }

    /// Skips to just past the next `;` at group depth zero, stopping short of
    /// `endmodule`.
    fn skip_to_semi(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() && !self.at_ident("endmodule") {
            match self.kind() {
                TokKind::Sym('(') | TokKind::Sym('[') | TokKind::Sym('{') => depth += 1,
                TokKind::Sym(')') | TokKind::Sym(']') | TokKind::Sym('}') => {
                    depth = depth.saturating_sub(1)
                }
                TokKind::Sym(';') if depth == 0 => {
                    self.bump();
                    return;
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Skips past the next occurrence of the given closing keyword.
    fn skip_past_ident(&mut self, word: &str) {
        while !self.at_eof() {
            if self.at_ident(word) {
                self.bump();
                return;
            }
            self.bump();
        }
    }

    /// Skips one procedural statement: event and delay controls, then a
    /// `begin`/`fork`/`case` block, an `if`/`else` chain or loop statement
    /// taken as a whole, or a simple statement ending in `;`. The chain
    /// handling keeps a begin-less `else` branch from being re-read as a
    /// module member.
    fn skip_statement(&mut self) {
        while self.at_sym('@') || self.at_sym('#') {
            self.bump();
            if self.at_sym('(') {
                self.skip_balanced();
            } else {
                self.bump();
            }
        }
        if self.kind() == TokKind::Ident {
            match self.text() {
                "begin" | "fork" | "case" | "casex" | "casez" | "randcase" => {
                    self.skip_block();
                    return;
                }
                "if" => {
                    self.bump();
                    if self.at_sym('(') {
                        self.skip_balanced();
                    }
                    self.skip_statement();
                    if self.at_ident("else") {
                        self.bump();
                        self.skip_statement();
                    }
                    return;
                }
                "for" | "while" | "repeat" => {
                    self.bump();
                    if self.at_sym('(') {
                        self.skip_balanced();
                    }
                    self.skip_statement();
                    return;
                }
                "forever" => {
                    self.bump();
                    self.skip_statement();
                    return;
                }
                "do" => {
                    self.bump();
                    self.skip_statement();
                    if self.at_ident("while") {
                        self.bump();
                        self.skip_balanced();
                    }
                    self.eat_sym(';');
                    return;
                }
                _ => {}
            }
        }
        self.skip_to_semi();
    }

    /// Skips a `begin`/`fork`/`case` block starting at its opening keyword,
    /// matching nested block keywords by depth.
    fn skip_block(&mut self) {
        let mut blocks = 0usize;
        while !self.at_eof() && !self.at_ident("endmodule") {
            if self.kind() == TokKind::Ident {
                match self.text() {
                    "begin" | "fork" | "case" | "casex" | "casez" | "randcase" => blocks += 1,
                    "end" | "join" | "join_any" | "join_none" | "endcase" => {
                        blocks = blocks.saturating_sub(1);
                        if blocks == 0 {
                            self.bump();
                            return;
                        }
                    }
                    _ => {}
                }
            }
            self.bump();
        }
    }

    fn parse_module(&mut self) -> Option<ModuleSyntax> {
        self.bump(); // module keyword
        if self.kind() != TokKind::Ident {
            return None;
        }
        let name = self.text().to_string();
        self.bump();

        if self.at_sym('#') {
            self.bump();
            self.skip_balanced();
        }

        let mut header_ports = Vec::new();
        let header_close;
        if self.at_sym('(') {
            self.bump();
            header_close = self.parse_header_ports(&mut header_ports)?;
            self.eat_sym(';');
        } else {
            while !self.at_eof() && !self.at_sym(';') {
                self.bump();
            }
            header_close = Self::to_token(self.cur());
            self.eat_sym(';');
        }

        let mut members = Vec::new();
        loop {
            if self.at_eof() {
                return None;
            }
            if self.at_ident("endmodule") {
                let endmodule = Self::to_token(self.cur());
                self.bump();
                return Some(ModuleSyntax {
                    name,
                    header_ports,
                    header_close,
                    members,
                    endmodule,
                });
            }
            if let Some(member) = self.parse_member() {
                members.push(member);
            }
        }
    }

    /// Parses the comma-separated entries of an ANSI (or name-only) header
    /// port list, returning the token of the closing `)`.
    fn parse_header_ports(&mut self, out: &mut Vec<HeaderPort>) -> Option<Token> {
        let mut inherited: Option<IO> = None;
        let mut pending: Vec<Trivia> = Vec::new();
        loop {
            if self.at_eof() {
                return None;
            }
            if self.at_sym(')') {
                let close = Self::merged_token(&mut pending, self.cur());
                self.bump();
                return Some(close);
            }
            let entry_token = Self::merged_token(&mut pending, self.cur());
            let entry_start = self.pos;
            let mut depth = 0usize;
            while !self.at_eof() {
                match self.kind() {
                    TokKind::Sym('(') | TokKind::Sym('[') | TokKind::Sym('{') => depth += 1,
                    TokKind::Sym(')') if depth == 0 => break,
                    TokKind::Sym(',') if depth == 0 => break,
                    TokKind::Sym(')') | TokKind::Sym(']') | TokKind::Sym('}') => {
                        depth = depth.saturating_sub(1)
                    }
                    _ => {}
                }
                self.bump();
            }
            let entry_end = self.pos;
            if let Some(port) =
                self.interpret_header_entry(entry_start, entry_end, entry_token, &mut inherited)
            {
                out.push(port);
            }
            if self.at_sym(',') {
                self.fold_into_pending(&mut pending);
            }
        }
    }

    /// Interprets one header entry (tokens `[start, end)`): optional
    /// direction, optional net keywords, optional packed range or composite
    /// type, then the port name. Directionless single-name entries inherit
    /// the previous entry's direction and type.
    fn interpret_header_entry(
        &self,
        start: usize,
        end: usize,
        entry_token: Token,
        inherited: &mut Option<IO>,
    ) -> Option<HeaderPort> {
        let toks = &self.toks[start..end];
        if toks.is_empty() {
            return None;
        }

        // The port name is the last identifier before any `=` default.
        let mut name = None;
        for tok in toks {
            if tok.kind == TokKind::Sym('=') {
                break;
            }
            if tok.kind == TokKind::Ident {
                name = Some(tok.text(self.src).to_string());
            }
        }
        let name = name?;

        let mut idx = 0;
        let dir = if toks[0].kind == TokKind::Ident && DIR_KEYWORDS.contains(&toks[0].text(self.src))
        {
            idx += 1;
            Some(toks[0].text(self.src))
        } else {
            None
        };
        while idx < end - start
            && toks[idx].kind == TokKind::Ident
            && (NET_KEYWORDS.contains(&toks[idx].text(self.src))
                || toks[idx].text(self.src) == "signed"
                || toks[idx].text(self.src) == "unsigned")
        {
            idx += 1;
        }

        let data_type = if idx < end - start && toks[idx].kind == TokKind::Sym('[') {
            self.interpret_range(&toks[idx..])
        } else if idx < end - start
            && toks[idx].kind == TokKind::Ident
            && toks[idx].text(self.src) != name
        {
            DataType::Composite(toks[idx].text(self.src).to_string())
        } else {
            DataType::Vector(1)
        };

        let io = match dir {
            Some("input") => Some(IO::Input(data_type)),
            Some("output") => Some(IO::Output(data_type)),
            Some("inout") => Some(IO::InOut(data_type)),
            _ => {
                // A bare name inherits the previous entry's direction and
                // type, per ANSI list semantics.
                if toks.iter().filter(|t| t.kind == TokKind::Ident).count() == 1 {
                    inherited.clone()
                } else {
                    None
                }
            }
        };
        if io.is_some() {
            *inherited = io.clone();
        }

        Some(HeaderPort {
            name,
            io,
            token: entry_token,
        })
    }

    /// Interprets a packed range `[msb:lsb]` at the start of `toks`. Constant
    /// numeric bounds yield a vector width; anything else is carried as an
    /// opaque composite tag.
    fn interpret_range(&self, toks: &[RawToken]) -> DataType {
        let mut depth = 0usize;
        let mut close = None;
        for (i, tok) in toks.iter().enumerate() {
            match tok.kind {
                TokKind::Sym('[') => depth += 1,
                TokKind::Sym(']') => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = match close {
            Some(i) => i,
            None => return DataType::Vector(1),
        };
        let inner = &toks[1..close];
        if inner.len() == 3
            && inner[0].kind == TokKind::Number
            && inner[1].kind == TokKind::Sym(':')
            && inner[2].kind == TokKind::Number
        {
            let msb = inner[0].text(self.src).replace('_', "").parse::<i64>();
            let lsb = inner[2].text(self.src).replace('_', "").parse::<i64>();
            if let (Ok(msb), Ok(lsb)) = (msb, lsb) {
                return DataType::Vector(((msb - lsb).unsigned_abs() + 1) as usize);
            }
        }
        let raw = &self.src[toks[0].start..toks[close].end];
        DataType::Composite(raw.to_string())
    }

    fn parse_member(&mut self) -> Option<Member> {
        if self.kind() != TokKind::Ident {
            let token = Self::to_token(self.cur());
            if self.at_sym(';') {
                self.bump();
            } else {
                self.bump();
                self.skip_to_semi();
            }
            return Some(Member::Other(token));
        }

        let word = self.text();
        if DIR_KEYWORDS.contains(&word) || NET_KEYWORDS.contains(&word) {
            return Some(Member::Decl(self.parse_decl()));
        }
        match word {
            "assign" => return Some(Member::Assign(self.parse_assign())),
            "parameter" | "localparam" | "typedef" | "import" | "export" | "defparam"
            | "genvar" => {
                let token = Self::to_token(self.cur());
                self.skip_to_semi();
                return Some(Member::Other(token));
            }
            "function" => {
                let token = Self::to_token(self.cur());
                self.skip_past_ident("endfunction");
                return Some(Member::Other(token));
            }
            "task" => {
                let token = Self::to_token(self.cur());
                self.skip_past_ident("endtask");
                return Some(Member::Other(token));
            }
            "generate" => {
                let token = Self::to_token(self.cur());
                self.skip_past_ident("endgenerate");
                return Some(Member::Other(token));
            }
            "specify" => {
                let token = Self::to_token(self.cur());
                self.skip_past_ident("endspecify");
                return Some(Member::Other(token));
            }
            "always" | "always_ff" | "always_comb" | "always_latch" | "initial" | "final" => {
                let token = Self::to_token(self.cur());
                self.bump();
                self.skip_statement();
                return Some(Member::Other(token));
            }
            _ => {}
        }

        // Either an instantiation (`type [#(...)] name [range] (...)`) or a
        // composite-typed declaration (`type name;`).
        if self.peek(1).kind == TokKind::Sym('#') {
            return Some(self.parse_instance());
        }
        if self.peek(1).kind == TokKind::Ident {
            let mut ahead = 2;
            if self.peek(ahead).kind == TokKind::Sym('[') {
                let mut depth = 0usize;
                loop {
                    match self.peek(ahead).kind {
                        TokKind::Sym('[') => depth += 1,
                        TokKind::Sym(']') => {
                            depth -= 1;
                            if depth == 0 {
                                ahead += 1;
                                break;
                            }
                        }
                        TokKind::Eof => break,
                        _ => {}
                    }
                    ahead += 1;
                }
            }
            if self.peek(ahead).kind == TokKind::Sym('(') {
                return Some(self.parse_instance());
            }
            return Some(Member::Decl(self.parse_decl()));
        }

        let token = Self::to_token(self.cur());
        self.bump();
        self.skip_to_semi();
        Some(Member::Other(token))
    }

    /// Parses a declaration starting at the current keyword or composite
    /// type identifier.
    fn parse_decl(&mut self) -> Decl {
        let first = self.take();
        let token = Self::to_token(&first);
        let keyword = first.text(self.src).to_string();

        while self.kind() == TokKind::Ident
            && (NET_KEYWORDS.contains(&self.text())
                || self.text() == "signed"
                || self.text() == "unsigned")
        {
            self.bump();
        }

        let data_type = if self.at_sym('[') {
            let range_start = self.pos;
            self.skip_balanced();
            let range = self.toks[range_start..self.pos].to_vec();
            self.interpret_range(&range)
        } else if !DIR_KEYWORDS.contains(&keyword.as_str())
            && !NET_KEYWORDS.contains(&keyword.as_str())
        {
            DataType::Composite(keyword.clone())
        } else {
            DataType::Vector(1)
        };

        let mut names = Vec::new();
        let mut init_reads = Vec::new();
        let mut init_driven = Vec::new();
        loop {
            if self.at_eof() || self.at_ident("endmodule") {
                break;
            }
            if self.kind() != TokKind::Ident {
                self.skip_to_semi();
                break;
            }
            let name = self.text().to_string();
            self.bump();
            if self.at_sym('[') {
                self.skip_balanced();
            }
            if self.at_sym('=') {
                self.bump();
                init_driven.push(name.clone());
                let mut depth = 0usize;
                while !self.at_eof() && !self.at_ident("endmodule") {
                    match self.kind() {
                        TokKind::Sym('(') | TokKind::Sym('[') | TokKind::Sym('{') => depth += 1,
                        TokKind::Sym(')') | TokKind::Sym(']') | TokKind::Sym('}') => {
                            depth = depth.saturating_sub(1)
                        }
                        TokKind::Sym(',') | TokKind::Sym(';') if depth == 0 => break,
                        TokKind::Ident => init_reads.push(self.text().to_string()),
                        _ => {}
                    }
                    self.bump();
                }
            }
            names.push(name);
            if self.eat_sym(',') {
                continue;
            }
            self.eat_sym(';');
            break;
        }

        Decl {
            token,
            keyword,
            data_type,
            names,
            init_reads,
            init_driven,
        }
    }

    /// Parses `assign [#delay] <targets> = <expr> ;`. Identifiers at bracket
    /// depth zero on the left-hand side are assignment targets (including
    /// every element of a concatenation); identifiers inside index brackets
    /// and everything on the right-hand side are reads.
    fn parse_assign(&mut self) -> Assign {
        let first = self.take();
        let token = Self::to_token(&first);
        if self.at_sym('#') {
            self.bump();
            if self.at_sym('(') {
                self.skip_balanced();
            } else {
                self.bump();
            }
        }

        let mut targets = Vec::new();
        let mut reads = Vec::new();
        let mut brackets = 0usize;
        while !self.at_eof() && !self.at_ident("endmodule") && !self.at_sym(';') {
            match self.kind() {
                TokKind::Sym('=') if brackets == 0 => {
                    self.bump();
                    break;
                }
                TokKind::Sym('[') => brackets += 1,
                TokKind::Sym(']') => brackets = brackets.saturating_sub(1),
                TokKind::Ident => {
                    let name = self.text().to_string();
                    if brackets == 0 {
                        targets.push(name);
                    } else {
                        reads.push(name);
                    }
                }
                _ => {}
            }
            self.bump();
        }

        let mut depth = 0usize;
        while !self.at_eof() && !self.at_ident("endmodule") {
            match self.kind() {
                TokKind::Sym('(') | TokKind::Sym('[') | TokKind::Sym('{') => depth += 1,
                TokKind::Sym(')') | TokKind::Sym(']') | TokKind::Sym('}') => {
                    depth = depth.saturating_sub(1)
                }
                TokKind::Sym(';') if depth == 0 => {
                    self.bump();
                    break;
                }
                TokKind::Ident => reads.push(self.text().to_string()),
                _ => {}
            }
            self.bump();
        }

        Assign {
            token,
            targets,
            reads,
        }
    }

    /// Parses `type [#(...)] name [range] ( conns ) ;`.
    fn parse_instance(&mut self) -> Member {
        let first = self.take();
        let token = Self::to_token(&first);
        let module_type = first.text(self.src).to_string();

        if self.at_sym('#') {
            self.bump();
            self.skip_balanced();
        }

        let inst_name = if self.kind() == TokKind::Ident {
            let name = self.text().to_string();
            self.bump();
            name
        } else {
            String::new()
        };

        // Instance arrays resolve to the single element module type; the
        // range itself is not modeled.
        if self.at_sym('[') {
            self.skip_balanced();
        }

        let mut conns = Vec::new();
        let close_token;
        if self.at_sym('(') {
            self.bump();
            close_token = self.parse_conn_list(&mut conns);
        } else {
            close_token = Self::to_token(self.cur());
        }
        self.skip_to_semi();

        Member::Instance(Instance {
            module_type,
            inst_name,
            token,
            conns,
            close_token,
        })
    }

    fn parse_conn_list(&mut self, conns: &mut Vec<InstanceConn>) -> Token {
        let mut pending: Vec<Trivia> = Vec::new();
        loop {
            if self.at_eof() || self.at_ident("endmodule") {
                return Self::merged_token(&mut pending, self.cur());
            }
            if self.at_sym(')') {
                let close = Self::merged_token(&mut pending, self.cur());
                self.bump();
                return close;
            }
            if self.at_sym(',') {
                self.fold_into_pending(&mut pending);
                continue;
            }
            if self.at_sym('.') {
                let dot = self.take();
                let token = Self::merged_token(&mut pending, &dot);
                if self.at_sym('*') {
                    // `.*` wildcard connections are opaque to the engine.
                    self.bump();
                    continue;
                }
                if self.kind() != TokKind::Ident {
                    continue;
                }
                let port = self.text().to_string();
                self.bump();
                let signal = if self.at_sym('(') {
                    let open_end = self.cur().end;
                    self.skip_balanced();
                    let close_start = self.toks[self.pos - 1].start;
                    self.src[open_end..close_start].trim().to_string()
                } else {
                    // `.name` shorthand for `.name(name)`.
                    port.clone()
                };
                conns.push(InstanceConn {
                    port,
                    signal,
                    token,
                });
                continue;
            }
            // Positional connection: skip the expression.
            pending.clear();
            let mut depth = 0usize;
            while !self.at_eof() {
                match self.kind() {
                    TokKind::Sym('(') | TokKind::Sym('[') | TokKind::Sym('{') => depth += 1,
                    TokKind::Sym(')') if depth == 0 => break,
                    TokKind::Sym(',') if depth == 0 => break,
                    TokKind::Sym(')') | TokKind::Sym(']') | TokKind::Sym('}') => {
                        depth = depth.saturating_sub(1)
                    }
                    _ => {}
                }
                self.bump();
            }
        }
    }
}
