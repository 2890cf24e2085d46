// SPDX-License-Identifier: Apache-2.0

//! End-to-end expansion of a module using every marker kind at once.

use autostitch::Design;
use pretty_assertions::assert_eq;

fn design() -> Design {
    let mut design = Design::new();
    design.add_verilog(
        "module producer (output wire [7:0] data, input wire clk, input wire [3:0] mode); endmodule",
    );
    design.add_verilog("module consumer (input wire [7:0] data, output wire done); endmodule");
    design
}

const TOP: &str = "\
module top (
  input wire clk
  /*AUTOPORTS*/
);
  /*AUTOWIRE*/

  producer u0 (/*AUTOINST*/);
  consumer u1 (/*AUTOINST*/);
endmodule
";

const EXPANDED: &str = "\
module top (
  input wire clk
  /*AUTOPORTS*/,
  // Beginning of automatic ports (for connected nets not otherwise declared)
  input  wire [3:0] mode,
  output wire done
  // End of automatics
);
  /*AUTOWIRE*/
  // Beginning of automatic wires (for undeclared instantiation signals)
  wire [7:0] data;
  // End of automatics

  producer u0 (/*AUTOINST*/
               // Outputs
               .data(data),
               // Inputs
               .clk(clk),
               .mode(mode));
  consumer u1 (/*AUTOINST*/
               // Outputs
               .done(done),
               // Inputs
               .data(data));
endmodule
";

#[test]
fn full_module_expansion() {
    let (out, reports) = design().expand_text(TOP);
    assert_eq!(out, EXPANDED);

    let report = &reports[0];
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.counts.autoinst, 2);
    assert_eq!(report.counts.autowire, 1);
    assert_eq!(report.counts.autoports, 1);
    assert_eq!(report.counts.total(), 4);
}

#[test]
fn expansion_is_a_fixpoint() {
    let design = design();
    let (first, _) = design.expand_text(TOP);
    let (second, reports) = design.expand_text(&first);
    assert_eq!(second, first);
    // The markers are still live on the second pass; they regenerate the
    // same bytes.
    assert_eq!(reports[0].counts.total(), 4);
}
