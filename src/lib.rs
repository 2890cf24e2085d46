// SPDX-License-Identifier: Apache-2.0

//! Expansion engine for verilog-mode-style AUTO comments.
//!
//! `autostitch` reads Verilog/SystemVerilog source containing marker comments
//! (`/*AUTOINST*/`, `/*AUTOWIRE*/`, `/*AUTOREG*/`, `/*AUTOLOGIC*/`,
//! `/*AUTOPORTS*/`, and `AUTO_TEMPLATE` directives) and rewrites the marked
//! regions with generated connection lists, declarations, and port lists.
//! Everything outside the generated regions is preserved byte for byte, and
//! re-expanding already expanded output is a fixpoint.
//!
//! The pipeline for one module runs in four phases over an immutable syntax
//! model:
//!
//! 1. [`collect`]: find marker sites, templates, user declarations, and
//!    previously generated blocks.
//! 2. [`resolve`]: bind instance ports to signal expressions, applying the
//!    nearest preceding `AUTO_TEMPLATE` for the module type.
//! 3. [`nets`]: aggregate signals across all sites and classify them as
//!    internal, external input, or external output.
//! 4. [`generate`] and [`apply`]: render byte-range replacements and splice
//!    them into the source.
//!
//! The typical entry point is [`Design::expand_text`]:
//!
//! ```
//! use autostitch::Design;
//!
//! let mut design = Design::new();
//! design.add_verilog("module leaf (input wire clk, output wire [7:0] q); endmodule");
//!
//! let (expanded, reports) = design.expand_text(
//!     "module top;\n  leaf u0 (/*AUTOINST*/);\nendmodule\n",
//! );
//! assert!(expanded.contains(".clk(clk)"));
//! assert!(reports[0].errors.is_empty());
//! ```

pub mod apply;
pub mod collect;
pub mod frontend;
pub mod generate;
pub mod io;
pub mod nets;
pub mod report;
pub mod resolve;
pub mod syntax;
pub mod template;

pub use apply::apply_replacements;
pub use frontend::{Design, parse_source, signature_of};
pub use io::{DataType, IO};
pub use report::{ExpandError, MarkerCounts, ModuleExpansion, Replacement, Warning};
pub use resolve::{ModuleLookup, ModuleSignature, SigPort};

use syntax::ModuleSyntax;

/// Expands every AUTO marker of one parsed module against `lookup`, returning
/// the replacements to apply to `source` plus all diagnostics. `source` must
/// be the exact text the module was parsed from; replacement offsets index
/// into it.
pub fn expand_module(
    module: &ModuleSyntax,
    source: &str,
    lookup: &dyn ModuleLookup,
) -> ModuleExpansion {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let info = collect::collect(module, &mut warnings);
    let resolved = resolve::resolve_instances(&info, lookup, &mut warnings, &mut errors);
    let nets = nets::aggregate(&resolved, &info);

    let mut counts = MarkerCounts::default();
    let replacements = generate::generate(&info, &resolved, &nets, source, &mut counts);

    log::debug!(
        "module `{}`: {} markers expanded, {} warnings, {} errors",
        module.name,
        counts.total(),
        warnings.len(),
        errors.len()
    );

    ModuleExpansion {
        module: module.name.clone(),
        replacements,
        warnings,
        errors,
        counts,
    }
}
