// SPDX-License-Identifier: Apache-2.0

use autostitch::Design;
use pretty_assertions::assert_eq;

fn design() -> Design {
    let mut design = Design::new();
    design.add_verilog("module producer (output wire [7:0] data, input wire clk); endmodule");
    design.add_verilog("module consumer (input wire [7:0] data, output wire done); endmodule");
    design
}

const EXPANDED_WIRE: &str = "\
module top;
  /*AUTOWIRE*/
  // Beginning of automatic wires (for undeclared instantiation signals)
  wire [7:0] data;
  // End of automatics
  producer u0 (/*AUTOINST*/
               // Outputs
               .data(data),
               // Inputs
               .clk(clk));
  consumer u1 (/*AUTOINST*/
               // Outputs
               .done(done),
               // Inputs
               .data(data));
endmodule
";

#[test]
fn autowire_declares_internal_nets() {
    let src = "\
module top;
  /*AUTOWIRE*/
  producer u0 (/*AUTOINST*/);
  consumer u1 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = design().expand_text(src);
    assert_eq!(out, EXPANDED_WIRE);
    assert_eq!(reports[0].counts.autowire, 1);
}

#[test]
fn autoreg_and_autologic_use_their_keyword() {
    let src = "\
module top;
  /*AUTOREG*/
  producer u0 (/*AUTOINST*/);
  consumer u1 (/*AUTOINST*/);
endmodule
";
    let design = design();
    let (out, _) = design.expand_text(src);
    assert!(out.contains(
        "\
  /*AUTOREG*/
  // Beginning of automatic regs (for undeclared instantiation signals)
  reg [7:0] data;
  // End of automatics
"
    ));
    let (again, _) = design.expand_text(&out);
    assert_eq!(again, out);

    let src = src.replace("AUTOREG", "AUTOLOGIC");
    let (out, _) = design.expand_text(&src);
    assert!(out.contains(
        "\
  /*AUTOLOGIC*/
  // Beginning of automatic logics (for undeclared instantiation signals)
  logic [7:0] data;
  // End of automatics
"
    ));
    let (again, _) = design.expand_text(&out);
    assert_eq!(again, out);
}

#[test]
fn generated_block_ends_on_its_own_line() {
    let src = "\
module top;
  producer u0 (/*AUTOINST*/);
  consumer u1 (/*AUTOINST*/);
  /*AUTOWIRE*/ endmodule
";
    let design = design();
    let (out, _) = design.expand_text(src);
    // The block closes with a line comment, so `endmodule` must not be left
    // on the same line as the sentinel.
    assert_eq!(
        out,
        "\
module top;
  producer u0 (/*AUTOINST*/
               // Outputs
               .data(data),
               // Inputs
               .clk(clk));
  consumer u1 (/*AUTOINST*/
               // Outputs
               .done(done),
               // Inputs
               .data(data));
  /*AUTOWIRE*/
  // Beginning of automatic wires (for undeclared instantiation signals)
  wire [7:0] data;
  // End of automatics
 endmodule
"
    );
    let (again, _) = design.expand_text(&out);
    assert_eq!(again, out);
}

#[test]
fn if_else_without_begin_does_not_hide_nets() {
    let src = "\
module top;
  /*AUTOWIRE*/
  producer u0 (/*AUTOINST*/);
  consumer u1 (/*AUTOINST*/);
  always @(posedge clk)
    if (rst) data <= 0;
    else data <= 0;
endmodule
";
    let (out, _) = design().expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  /*AUTOWIRE*/
  // Beginning of automatic wires (for undeclared instantiation signals)
  wire [7:0] data;
  // End of automatics
  producer u0 (/*AUTOINST*/
               // Outputs
               .data(data),
               // Inputs
               .clk(clk));
  consumer u1 (/*AUTOINST*/
               // Outputs
               .done(done),
               // Inputs
               .data(data));
  always @(posedge clk)
    if (rst) data <= 0;
    else data <= 0;
endmodule
"
    );
}

#[test]
fn user_declaration_suppresses_generation() {
    let src = "\
module top;
  wire [7:0] data;
  /*AUTOWIRE*/
  producer u0 (/*AUTOINST*/);
  consumer u1 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = design().expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  wire [7:0] data;
  /*AUTOWIRE*/
  producer u0 (/*AUTOINST*/
               // Outputs
               .data(data),
               // Inputs
               .clk(clk));
  consumer u1 (/*AUTOINST*/
               // Outputs
               .done(done),
               // Inputs
               .data(data));
endmodule
"
    );
    assert_eq!(reports[0].counts.autowire, 0);
    assert_eq!(reports[0].counts.autoinst, 2);
}

#[test]
fn stale_block_is_regenerated_in_place() {
    let src = "\
module top;
  /*AUTOWIRE*/
  // Beginning of automatic wires (for undeclared instantiation signals)
  wire [3:0] stale;
  // End of automatics
  producer u0 (/*AUTOINST*/);
  consumer u1 (/*AUTOINST*/);
endmodule
";
    let (out, _) = design().expand_text(src);
    assert_eq!(out, EXPANDED_WIRE);
}

#[test]
fn obsolete_block_is_removed() {
    let src = "\
module top;
  /*AUTOWIRE*/
  // Beginning of automatic wires (for undeclared instantiation signals)
  wire [3:0] stale;
  // End of automatics
endmodule
";
    let (out, reports) = design().expand_text(src);
    assert_eq!(
        out,
        "\
module top;
  /*AUTOWIRE*/
endmodule
"
    );
    assert_eq!(reports[0].counts.autowire, 1);
}
