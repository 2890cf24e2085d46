// SPDX-License-Identifier: Apache-2.0

use regex::Regex;

use crate::report::Warning;
use crate::resolve::SigPort;

use super::Template;

/// The evaluated result of a template rule for one port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnExpr {
    /// Connect to the given signal expression.
    Signal(String),
    /// Leave the port unconnected (`.name()`).
    Unconnected,
    /// Tie the port to a constant literal (`'0`, `'1`, `'z`).
    Constant(String),
}

/// Evaluates `template` against an instance name and port. Returns `None`
/// when no rule matches (the caller falls back to the identity connection).
/// All failure modes inside a rule are warnings, never fatal: an invalid
/// regex skips the rule, an unresolved capture substitutes the empty string,
/// and a malformed ternary falls back to identity.
pub fn apply_template(
    template: &Template,
    inst_name: &str,
    port: &SigPort,
    warnings: &mut Vec<Warning>,
) -> Option<ConnExpr> {
    let inst_caps = instance_captures(template, inst_name, warnings)?;

    for rule in &template.rules {
        let re = match Regex::new(&format!("^(?:{})$", rule.port_pattern)) {
            Ok(re) => re,
            Err(err) => {
                warnings.push(Warning::InvalidRegex {
                    pattern: rule.port_pattern.clone(),
                    detail: err.to_string(),
                });
                continue;
            }
        };
        let Some(caps) = re.captures(&port.name) else {
            continue;
        };
        let port_caps: Vec<Option<String>> = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();

        let ctx = EvalCtx {
            inst_name,
            port,
            port_caps: &port_caps,
            inst_caps: &inst_caps,
        };
        return Some(evaluate(&rule.expr, &ctx, warnings));
    }
    None
}

/// Resolves the instance capture vector: index 0 is always the full instance
/// name; further indices come from the instance pattern, or from the default
/// pattern that extracts the first maximal run of digits in the name.
fn instance_captures(
    template: &Template,
    inst_name: &str,
    warnings: &mut Vec<Warning>,
) -> Option<Vec<Option<String>>> {
    let mut caps: Vec<Option<String>> = vec![Some(inst_name.to_string())];
    match &template.inst_pattern {
        Some(pattern) => {
            let re = match Regex::new(pattern) {
                Ok(re) => re,
                Err(err) => {
                    warnings.push(Warning::InvalidRegex {
                        pattern: pattern.clone(),
                        detail: err.to_string(),
                    });
                    return None;
                }
            };
            if let Some(m) = re.captures(inst_name) {
                caps.extend(m.iter().skip(1).map(|g| g.map(|g| g.as_str().to_string())));
            }
        }
        None => {
            if let Some(digits) = first_digit_run(inst_name) {
                caps.push(Some(digits.to_string()));
            }
        }
    }
    Some(caps)
}

fn first_digit_run(name: &str) -> Option<&str> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let rest = &name[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

struct EvalCtx<'a> {
    inst_name: &'a str,
    port: &'a SigPort,
    port_caps: &'a [Option<String>],
    inst_caps: &'a [Option<String>],
}

fn evaluate(expr: &str, ctx: &EvalCtx, warnings: &mut Vec<Warning>) -> ConnExpr {
    // Substitute captures and property accessors to a fixpoint; substituted
    // text may itself contain references.
    let mut text = expr.to_string();
    for _ in 0..10 {
        let next = substitute_once(&text, ctx, warnings);
        if next == text {
            break;
        }
        text = next;
    }

    match eval_ternaries(&text) {
        Ok(reduced) => text = reduced,
        Err(condition) => {
            warnings.push(Warning::MalformedTernary { condition });
            return ConnExpr::Signal(ctx.port.name.clone());
        }
    }

    text = eval_math(&text, warnings);

    let trimmed = text.trim();
    match trimmed {
        "_" => ConnExpr::Unconnected,
        "" => ConnExpr::Unconnected,
        "'0" | "'1" | "'z" | "'Z" => ConnExpr::Constant(trimmed.to_string()),
        _ => ConnExpr::Signal(trimmed.to_string()),
    }
}

/// One substitution round: `$`/`%` capture references (brace form required
/// when a literal digit follows), the `@` alias for `%1`, then property
/// accessors.
fn substitute_once(expr: &str, ctx: &EvalCtx, warnings: &mut Vec<Warning>) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut i = 0;
    while i < expr.len() {
        let c = expr[i..].chars().next().unwrap();
        if c == '$' || c == '%' {
            if let Some((index, consumed)) = parse_capture_ref(&expr.as_bytes()[i + 1..]) {
                let caps = if c == '$' { ctx.port_caps } else { ctx.inst_caps };
                push_capture(&mut out, caps, index, c, expr, warnings);
                i += 1 + consumed;
                continue;
            }
        } else if c == '@' {
            push_capture(&mut out, ctx.inst_caps, 1, '@', expr, warnings);
            i += 1;
            continue;
        }
        out.push(c);
        i += c.len_utf8();
    }

    let port = ctx.port;
    if port.io.width().is_none() {
        for accessor in ["port.width", "port.range"] {
            if out.contains(accessor) {
                warnings.push(Warning::UnresolvedCapture {
                    reference: accessor.to_string(),
                    expr: expr.to_string(),
                });
            }
        }
    }
    let width = || match port.io.width() {
        Some(w) => w.to_string(),
        None => String::new(),
    };
    let range = || match port.io.width() {
        Some(_) => port.io.data_type().range(),
        None => String::new(),
    };
    let flag = |set: bool| if set { "1" } else { "0" };

    out.replace("port.direction", port.io.direction())
        .replace("port.input", flag(port.io.is_input()))
        .replace("port.output", flag(port.io.is_output()))
        .replace("port.inout", flag(port.io.is_inout()))
        .replace("port.width", &width())
        .replace("port.range", &range())
        .replace("port.name", &port.name)
        .replace("inst.name", ctx.inst_name)
}

/// Parses the capture index after a `$` or `%`: either `{digits}` or a
/// maximal run of digits. Returns the index and the number of bytes
/// consumed after the sigil.
fn parse_capture_ref(rest: &[u8]) -> Option<(usize, usize)> {
    if rest.first() == Some(&b'{') {
        let close = rest.iter().position(|&b| b == b'}')?;
        let digits = &rest[1..close];
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let index = std::str::from_utf8(digits).ok()?.parse().ok()?;
        Some((index, close + 1))
    } else {
        let len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if len == 0 {
            return None;
        }
        let index = std::str::from_utf8(&rest[..len]).ok()?.parse().ok()?;
        Some((index, len))
    }
}

fn push_capture(
    out: &mut String,
    caps: &[Option<String>],
    index: usize,
    sigil: char,
    expr: &str,
    warnings: &mut Vec<Warning>,
) {
    match caps.get(index) {
        Some(Some(value)) => out.push_str(value),
        _ => warnings.push(Warning::UnresolvedCapture {
            reference: format!("{sigil}{index}"),
            expr: expr.to_string(),
        }),
    }
}

/// Reduces ternary expressions of the form `cond ? then : else`, where the
/// condition must already have been substituted down to `"0"` or `"1"`.
/// Ternaries nest in either branch; `:` inside a `[...]` range does not
/// split. Returns the offending condition text on failure.
fn eval_ternaries(expr: &str) -> Result<String, String> {
    let Some(question) = expr.find('?') else {
        return Ok(expr.to_string());
    };
    let condition = expr[..question].trim();
    let rest = &expr[question + 1..];

    let mut nesting = 0usize;
    let mut brackets = 0usize;
    let mut split = None;
    for (i, c) in rest.char_indices() {
        match c {
            '?' => nesting += 1,
            '[' => brackets += 1,
            ']' => brackets = brackets.saturating_sub(1),
            ':' if brackets == 0 => {
                if nesting == 0 {
                    split = Some(i);
                    break;
                }
                nesting -= 1;
            }
            _ => {}
        }
    }
    let split = split.ok_or_else(|| condition.to_string())?;

    match condition {
        "1" => eval_ternaries(rest[..split].trim()),
        "0" => eval_ternaries(rest[split + 1..].trim()),
        other => Err(other.to_string()),
    }
}

/// Evaluates `add|sub|mul|div|mod(a, b)` calls, innermost arguments first,
/// replacing each call with its signed decimal result. Division or modulo by
/// zero yields 0 with a warning; operands that do not parse as integers
/// yield 0 with a warning.
fn eval_math(expr: &str, warnings: &mut Vec<Warning>) -> String {
    let call = Regex::new(r"(add|sub|mul|div|mod)\(").unwrap();
    let mut text = expr.to_string();
    loop {
        let Some((start, args_start, op)) = call.captures(&text).map(|m| {
            let whole = m.get(0).unwrap();
            (whole.start(), whole.end(), m[1].to_string())
        }) else {
            break;
        };

        let mut depth = 1usize;
        let mut close = None;
        for (i, b) in text.bytes().enumerate().skip(args_start) {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else {
            // Unbalanced call; leave the text as-is.
            return text;
        };

        let inner = text[args_start..close].to_string();
        let args = split_args(&inner);
        let value = if args.len() == 2 {
            let a = parse_operand(&args[0], warnings);
            let b = parse_operand(&args[1], warnings);
            match op.as_str() {
                "add" => a.wrapping_add(b),
                "sub" => a.wrapping_sub(b),
                "mul" => a.wrapping_mul(b),
                "div" | "mod" => {
                    if b == 0 {
                        warnings.push(Warning::DivisionByZero {
                            expr: text[start..=close].to_string(),
                        });
                        0
                    } else if op == "div" {
                        a.wrapping_div(b)
                    } else {
                        a.wrapping_rem(b)
                    }
                }
                _ => unreachable!(),
            }
        } else {
            warnings.push(Warning::BadOperand {
                operand: inner.clone(),
            });
            0
        };

        text.replace_range(start..=close, &value.to_string());
    }
    text
}

fn split_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in inner.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                args.push(inner[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].to_string());
    args
}

fn parse_operand(arg: &str, warnings: &mut Vec<Warning>) -> i64 {
    let reduced = eval_math(arg, warnings);
    match reduced.trim().parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            warnings.push(Warning::BadOperand {
                operand: reduced.trim().to_string(),
            });
            0
        }
    }
}
