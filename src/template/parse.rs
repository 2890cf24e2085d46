// SPDX-License-Identifier: Apache-2.0

use crate::report::Warning;

use super::{Template, TemplateRule};

/// Parses an AUTO_TEMPLATE comment into a [`Template`]. `text` is the whole
/// comment including delimiters; `offset` is its absolute byte position.
///
/// The accepted shape is
///
/// ```text
/// /* fifo AUTO_TEMPLATE "u_(\d+)" (
///     .din  (fifo_@_din),
///     .dout (fifo_@_dout),
/// ); */
/// ```
///
/// where the quoted instance pattern is optional and expressions are
/// balanced-paren text. A comment that mentions AUTO_TEMPLATE but does not
/// parse emits a [`Warning::MalformedTemplate`] and yields `None`.
pub fn parse_template_comment(
    text: &str,
    offset: usize,
    warnings: &mut Vec<Warning>,
) -> Option<Template> {
    let mut scanner = Scanner {
        text: text.as_bytes(),
        pos: 0,
    };
    match scanner.template(text, offset) {
        Ok(template) => Some(template),
        Err(detail) => {
            warnings.push(Warning::MalformedTemplate { detail });
            None
        }
    }
}

struct Scanner<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn template(&mut self, raw: &'a str, offset: usize) -> Result<Template, String> {
        if raw.starts_with("/*") {
            self.pos = 2;
        }
        let end = if raw.ends_with("*/") {
            raw.len() - 2
        } else {
            raw.len()
        };
        self.text = &raw.as_bytes()[..end];

        let module_name = self
            .word()
            .ok_or_else(|| "missing module name".to_string())?;
        let keyword = self
            .word()
            .ok_or_else(|| "missing AUTO_TEMPLATE keyword".to_string())?;
        if keyword != "AUTO_TEMPLATE" {
            return Err(format!("expected AUTO_TEMPLATE after `{module_name}`"));
        }

        self.skip_ws();
        let inst_pattern = if self.peek() == Some(b'"') {
            Some(self.quoted()?)
        } else {
            None
        };

        self.skip_ws();
        if self.peek() != Some(b'(') {
            return Err("expected `(` opening the rule list".to_string());
        }
        self.pos += 1;

        let mut rules = Vec::new();
        loop {
            self.skip_ws();
            while self.peek() == Some(b',') || self.peek() == Some(b';') {
                self.pos += 1;
                self.skip_ws();
            }
            match self.peek() {
                None => return Err("unterminated rule list".to_string()),
                Some(b')') => break,
                Some(b'.') => {
                    self.pos += 1;
                    rules.push(self.rule()?);
                }
                Some(other) => {
                    return Err(format!("unexpected `{}` in rule list", other as char));
                }
            }
        }

        Ok(Template {
            module_name,
            inst_pattern,
            rules,
            offset,
        })
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> Option<String> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            Some(String::from_utf8_lossy(&self.text[start..self.pos]).into_owned())
        }
    }

    fn quoted(&mut self) -> Result<String, String> {
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'"' {
                let s = String::from_utf8_lossy(&self.text[start..self.pos]).into_owned();
                self.pos += 1;
                return Ok(s);
            }
            self.pos += 1;
        }
        Err("unterminated instance pattern string".to_string())
    }

    /// Consumes one rule after its leading `.`. The rule runs to the next
    /// top-level `,` or the `)` that closes the rule list; its trailing
    /// balanced `( ... )` group is the signal expression, and everything
    /// before that group is the port pattern. Splitting on the *trailing*
    /// group is what allows the pattern itself to contain capture-group
    /// parentheses, as in `.sig_(.*) ($1_q)`.
    fn rule(&mut self) -> Result<TemplateRule, String> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'(' => depth += 1,
                b')' if depth == 0 => break,
                b')' => depth -= 1,
                b',' if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }
        let rule = String::from_utf8_lossy(&self.text[start..self.pos]).into_owned();
        let rule = rule.trim_end();

        let close = rule
            .rfind(')')
            .ok_or_else(|| format!("rule `{rule}` has no signal expression"))?;
        let mut depth = 0usize;
        let mut open = None;
        for (i, b) in rule.bytes().enumerate().take(close + 1).rev() {
            match b {
                b')' => depth += 1,
                b'(' => {
                    depth -= 1;
                    if depth == 0 {
                        open = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let open = open.ok_or_else(|| format!("unbalanced parens in rule `{rule}`"))?;
        let port_pattern = rule[..open].trim().to_string();
        if port_pattern.is_empty() {
            return Err(format!("rule `{rule}` has an empty port pattern"));
        }
        Ok(TemplateRule {
            port_pattern,
            expr: rule[open + 1..close].trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_template() {
        let mut warnings = Vec::new();
        let t = parse_template_comment(
            "/* fifo AUTO_TEMPLATE (\n    .din (fifo_@_din),\n    .clk (sys_clk),\n); */",
            42,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(t.module_name, "fifo");
        assert_eq!(t.inst_pattern, None);
        assert_eq!(t.offset, 42);
        assert_eq!(
            t.rules,
            vec![
                TemplateRule {
                    port_pattern: "din".to_string(),
                    expr: "fifo_@_din".to_string()
                },
                TemplateRule {
                    port_pattern: "clk".to_string(),
                    expr: "sys_clk".to_string()
                },
            ]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn parses_instance_pattern_and_nested_parens() {
        let mut warnings = Vec::new();
        let t = parse_template_comment(
            r#"/* mem AUTO_TEMPLATE "bank_(\d+)" (
                .addr (mod(add(%1, 1), 4)),
            ); */"#,
            0,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(t.inst_pattern.as_deref(), Some(r"bank_(\d+)"));
        assert_eq!(t.rules[0].expr, "mod(add(%1, 1), 4)");
    }

    #[test]
    fn malformed_template_warns() {
        let mut warnings = Vec::new();
        let t = parse_template_comment("/* fifo AUTO_TEMPLATE .din foo */", 0, &mut warnings);
        assert!(t.is_none());
        assert!(matches!(warnings[0], Warning::MalformedTemplate { .. }));
    }
}
