// SPDX-License-Identifier: Apache-2.0

//! Structured diagnostics and replacement records returned to the caller.
//!
//! The engine never prints anything itself; warnings and errors are data,
//! and the driver or server layer decides how to present them.

/// A recoverable condition noticed during expansion. Processing always
/// continues past a warning.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("unresolved capture reference `{reference}` in template expression `{expr}`")]
    UnresolvedCapture { reference: String, expr: String },

    #[error("invalid template regex `{pattern}`: {detail}")]
    InvalidRegex { pattern: String, detail: String },

    #[error("malformed AUTO_TEMPLATE comment: {detail}")]
    MalformedTemplate { detail: String },

    #[error("ternary condition `{condition}` did not reduce to \"0\" or \"1\"")]
    MalformedTernary { condition: String },

    #[error("operand `{operand}` is not an integer in template arithmetic")]
    BadOperand { operand: String },

    #[error("division or modulo by zero in template expression `{expr}`")]
    DivisionByZero { expr: String },

    #[error("constant `{constant}` tied to output port `{port}` of instance `{instance}`")]
    ConstantOutput {
        instance: String,
        port: String,
        constant: String,
    },
}

/// A failure scoped to a single expansion site. The triggering site is
/// skipped; the rest of the module and file are still processed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    #[error("module `{module_type}` not found for instance `{instance}`")]
    ModuleNotFound {
        module_type: String,
        instance: String,
    },
}

/// A single byte-range edit against the original source. Ranges are
/// half-open and non-overlapping by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// Human-readable summary for diagnostics and dry-run display.
    pub description: String,
}

/// Number of markers expanded, per marker kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerCounts {
    pub autoinst: usize,
    pub autowire: usize,
    pub autoreg: usize,
    pub autologic: usize,
    pub autoports: usize,
}

impl MarkerCounts {
    pub fn total(&self) -> usize {
        self.autoinst + self.autowire + self.autoreg + self.autologic + self.autoports
    }
}

/// The result of expanding one module: the edits to apply plus everything
/// the caller needs for user-facing summaries.
#[derive(Clone, Debug, Default)]
pub struct ModuleExpansion {
    pub module: String,
    pub replacements: Vec<Replacement>,
    pub warnings: Vec<Warning>,
    pub errors: Vec<ExpandError>,
    pub counts: MarkerCounts,
}
