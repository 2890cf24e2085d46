// SPDX-License-Identifier: Apache-2.0

//! AUTO_TEMPLATE parsing and evaluation.
//!
//! A template is an ordered list of `(port pattern, signal expression)`
//! rules for one module type, optionally with an instance-name pattern that
//! supplies `%`-captures. Rules are matched first-match-wins; patterns use
//! Rust `regex` syntax and are anchored to the whole port name.

mod eval;
mod parse;

pub use eval::{ConnExpr, apply_template};
pub use parse::parse_template_comment;

/// One `.pattern (expression)` rule of a template, in file order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateRule {
    pub port_pattern: String,
    pub expr: String,
}

/// A parsed AUTO_TEMPLATE block. `offset` is the absolute byte position of
/// the comment; an instance binds to the nearest preceding template for its
/// module type, so offsets decide binding, not file-wide first-wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pub module_name: String,
    pub inst_pattern: Option<String>,
    pub rules: Vec<TemplateRule>,
    pub offset: usize,
}
