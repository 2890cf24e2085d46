// SPDX-License-Identifier: Apache-2.0

//! APPLY: splices byte-range replacements into the original source.

use crate::report::Replacement;

/// Applies `replacements` to `source` and returns the rewritten text. Ranges
/// are non-overlapping; splicing from the highest start offset downward keeps
/// every remaining range valid against the partially edited text.
pub fn apply_replacements(source: &str, replacements: &[Replacement]) -> String {
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut text = source.to_string();
    for replacement in ordered {
        debug_assert!(replacement.start <= replacement.end);
        debug_assert!(replacement.end <= text.len());
        text.replace_range(replacement.start..replacement.end, &replacement.text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repl(start: usize, end: usize, text: &str) -> Replacement {
        Replacement {
            start,
            end,
            text: text.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn splices_in_descending_order() {
        let source = "abc def ghi";
        let replacements = vec![repl(0, 3, "xyz"), repl(8, 11, "qrs")];
        assert_eq!(apply_replacements(source, &replacements), "xyz def qrs");
    }

    #[test]
    fn insertion_at_a_point() {
        let source = "()";
        let replacements = vec![repl(1, 1, "inner")];
        assert_eq!(apply_replacements(source, &replacements), "(inner)");
    }

    #[test]
    fn deletion_leaves_surroundings() {
        let source = "keep DROP keep";
        let replacements = vec![repl(4, 9, "")];
        assert_eq!(apply_replacements(source, &replacements), "keep keep");
    }
}
