// SPDX-License-Identifier: Apache-2.0

use autostitch::{Design, ExpandError};
use pretty_assertions::assert_eq;

fn leaf_design() -> Design {
    let mut design = Design::new();
    design.add_verilog("module leaf (output wire [7:0] q, input wire clk); endmodule");
    design
}

#[test]
fn expands_connections_by_name() {
    let src = "\
module top (input wire clk);
  wire [7:0] q;
  leaf u0 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = leaf_design().expand_text(src);
    assert_eq!(
        out,
        "\
module top (input wire clk);
  wire [7:0] q;
  leaf u0 (/*AUTOINST*/
           // Outputs
           .q(q),
           // Inputs
           .clk(clk));
endmodule
"
    );
    assert_eq!(reports[0].counts.autoinst, 1);
    assert!(reports[0].errors.is_empty());
}

#[test]
fn manual_connections_are_kept_and_skipped() {
    let src = "\
module top;
  leaf u0 (.clk(sys_clk), /*AUTOINST*/);
endmodule
";
    let (out, _) = leaf_design().expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  leaf u0 (.clk(sys_clk), /*AUTOINST*/
                          // Outputs
                          .q(q));
endmodule
"
    );
}

#[test]
fn separating_comma_is_generated_when_missing() {
    let src = "\
module top;
  leaf u0 (.clk(sys_clk) /*AUTOINST*/);
endmodule
";
    let design = leaf_design();
    let (out, _) = design.expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  leaf u0 (.clk(sys_clk) /*AUTOINST*/,
                         // Outputs
                         .q(q));
endmodule
"
    );
    let (again, _) = design.expand_text(&out);
    assert_eq!(again, out);
}

#[test]
fn missing_module_leaves_marker_untouched() {
    let src = "\
module top;
  ghost u0 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = leaf_design().expand_text(src);
    assert_eq!(out, src);
    assert_eq!(reports[0].counts.total(), 0);
    assert!(matches!(
        &reports[0].errors[0],
        ExpandError::ModuleNotFound { module_type, instance }
            if module_type == "ghost" && instance == "u0"
    ));
}

#[test]
fn markers_inside_string_literals_are_inert() {
    let src = "\
module top;
  initial $display(\"/*AUTOINST*/ and /*AUTOWIRE*/ are plain text\");
endmodule
";
    let (out, reports) = leaf_design().expand_text(src);
    assert_eq!(out, src);
    assert_eq!(reports[0].counts.total(), 0);
    assert!(reports[0].errors.is_empty());
}
