// SPDX-License-Identifier: Apache-2.0

use autostitch::Design;
use pretty_assertions::assert_eq;

#[test]
fn connected_nets_become_ports() {
    let mut design = Design::new();
    design.add_verilog("module sink (input wire [7:0] data); endmodule");
    let src = "\
module top (/*AUTOPORTS*/);
  assign {hi, lo} = word;
  sink u1 (/*AUTOINST*/);
endmodule
";
    let (out, reports) = design.expand_text(src);
    // `hi` and `lo` are driven only by the assign, so they stay out of the
    // generated port list; `word` never meets an instance port at all.
    assert_eq!(
        out,
        "\
module top (/*AUTOPORTS*/
            // Beginning of automatic ports (for connected nets not otherwise declared)
            input  wire [7:0] data
            // End of automatics
);
  assign {hi, lo} = word;
  sink u1 (/*AUTOINST*/
           // Inputs
           .data(data));
endmodule
"
    );
    assert_eq!(reports[0].counts.autoports, 1);
}

#[test]
fn assign_read_promotes_net_to_internal() {
    let mut design = Design::new();
    design.add_verilog("module producer (output wire [7:0] data, input wire clk); endmodule");
    let src = "\
module top (/*AUTOPORTS*/);
  /*AUTOWIRE*/
  producer u0 (/*AUTOINST*/);
  assign sum = data + 1;
endmodule
";
    let (out, _) = design.expand_text(src);
    // `data` is driven by the instance and read by the assign, so it is an
    // internal wire rather than an output port.
    assert_eq!(
        out,
        "\
module top (/*AUTOPORTS*/
            // Beginning of automatic ports (for connected nets not otherwise declared)
            input  wire clk
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
               .clk(clk));
  assign sum = data + 1;
endmodule
"
    );
}

#[test]
fn header_ports_are_never_regenerated_as_ports() {
    let mut design = Design::new();
    design.add_verilog("module producer (output wire [7:0] data, input wire clk); endmodule");
    let src = "\
module top (
  input wire clk
  /*AUTOPORTS*/
);
  producer u0 (/*AUTOINST*/);
endmodule
";
    let (out, _) = design.expand_text(src);
    // `clk` is already a user-written header port; only `data` is new.
    assert_eq!(
        out,
        "\
module top (
  input wire clk
  /*AUTOPORTS*/,
  // Beginning of automatic ports (for connected nets not otherwise declared)
  output wire [7:0] data
  // End of automatics
);
  producer u0 (/*AUTOINST*/
               // Outputs
               .data(data),
               // Inputs
               .clk(clk));
endmodule
"
    );
}
