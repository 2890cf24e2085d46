// SPDX-License-Identifier: Apache-2.0

use autostitch::{Design, Warning};
use pretty_assertions::assert_eq;

#[test]
fn rules_apply_first_match_wins_with_default_numbering() {
    let mut design = Design::new();
    design.add_verilog(
        "module fifo (input wire clk, input wire [7:0] din, output wire [7:0] dout); endmodule",
    );
    let src = "\
module top;
  /* fifo AUTO_TEMPLATE (
      .clk (sys_clk),
      .d(.*) (fifo_@_d$1),
  ); */
  fifo u_fifo_3 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = design.expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  /* fifo AUTO_TEMPLATE (
      .clk (sys_clk),
      .d(.*) (fifo_@_d$1),
  ); */
  fifo u_fifo_3 (/*AUTOINST*/
                 // Outputs
                 .dout(fifo_3_dout),
                 // Inputs
                 .clk(sys_clk),
                 .din(fifo_3_din));
endmodule
"
    );
    assert!(reports[0].warnings.is_empty());
}

#[test]
fn instance_pattern_captures_and_arithmetic() {
    let mut design = Design::new();
    design.add_verilog("module node (output wire next, input wire curr); endmodule");
    let src = "\
module top;
  /* node AUTO_TEMPLATE \"ring_(\\d+)\" (
      .next (ring_mod(add(%1, 1), 4)_req),
      .curr (ring_%1_req),
  ); */
  node ring_3 (/*AUTOINST*/);
endmodule
";
    let (out, _) = design.expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  /* node AUTO_TEMPLATE \"ring_(\\d+)\" (
      .next (ring_mod(add(%1, 1), 4)_req),
      .curr (ring_%1_req),
  ); */
  node ring_3 (/*AUTOINST*/
               // Outputs
               .next(ring_0_req),
               // Inputs
               .curr(ring_3_req));
endmodule
"
    );
}

#[test]
fn unconnected_and_constant_results() {
    let mut design = Design::new();
    design.add_verilog(
        "module leaf (output wire dbg, input wire scan_en, input wire nc_probe, input wire clk); endmodule",
    );
    let src = "\
module top;
  /* leaf AUTO_TEMPLATE (
      .dbg ('0),
      .scan_en ('0),
      .nc_(.*) (_),
  ); */
  leaf u0 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = design.expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  /* leaf AUTO_TEMPLATE (
      .dbg ('0),
      .scan_en ('0),
      .nc_(.*) (_),
  ); */
  leaf u0 (/*AUTOINST*/
           // Outputs
           .dbg('0),
           // Inputs
           .scan_en('0),
           .nc_probe(),
           .clk(clk));
endmodule
"
    );
    // Tying an output to a constant is almost always a mistake.
    assert!(matches!(
        &reports[0].warnings[0],
        Warning::ConstantOutput { instance, port, constant }
            if instance == "u0" && port == "dbg" && constant == "'0"
    ));
}

#[test]
fn instances_bind_to_the_nearest_preceding_template() {
    let mut design = Design::new();
    design.add_verilog("module leaf (input wire d); endmodule");
    let src = "\
module top;
  /* leaf AUTO_TEMPLATE (
      .d (first_d),
  ); */
  leaf u0 (/*AUTOINST*/);
  /* leaf AUTO_TEMPLATE (
      .d (second_d),
  ); */
  leaf u1 (/*AUTOINST*/);
endmodule
";
    let (out, _) = design.expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  /* leaf AUTO_TEMPLATE (
      .d (first_d),
  ); */
  leaf u0 (/*AUTOINST*/
           // Inputs
           .d(first_d));
  /* leaf AUTO_TEMPLATE (
      .d (second_d),
  ); */
  leaf u1 (/*AUTOINST*/
           // Inputs
           .d(second_d));
endmodule
"
    );
}

#[test]
fn malformed_template_warns_and_falls_back_to_identity() {
    let mut design = Design::new();
    design.add_verilog("module leaf (output wire [7:0] q, input wire clk); endmodule");
    let src = "\
module top;
  /* leaf AUTO_TEMPLATE missing rules */
  leaf u0 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = design.expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  /* leaf AUTO_TEMPLATE missing rules */
  leaf u0 (/*AUTOINST*/
           // Outputs
           .q(q),
           // Inputs
           .clk(clk));
endmodule
"
    );
    assert!(matches!(
        &reports[0].warnings[0],
        Warning::MalformedTemplate { .. }
    ));
}
