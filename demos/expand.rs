// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use autostitch::Design;

fn main() {
    env_logger::init();

    let mut design = Design::new();

    // Register leaf module signatures, either from files named on the
    // command line or from a small built-in example.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let source = if args.is_empty() {
        design.add_verilog(
            "module fifo (input wire clk, input wire [7:0] din, output wire [7:0] dout); endmodule",
        );
        design.add_verilog("module monitor (input wire [7:0] dout, output wire ok); endmodule");
        "\
module top (
  input wire clk
  /*AUTOPORTS*/
);
  /*AUTOWIRE*/

  fifo u_fifo (/*AUTOINST*/);
  monitor u_mon (/*AUTOINST*/);
endmodule
"
        .to_string()
    } else {
        for leaf in &args[..args.len() - 1] {
            let text = std::fs::read_to_string(PathBuf::from(leaf)).unwrap();
            design.add_verilog(&text);
        }
        std::fs::read_to_string(PathBuf::from(&args[args.len() - 1])).unwrap()
    };

    let (expanded, reports) = design.expand_text(&source);
    print!("{expanded}");

    for report in &reports {
        for replacement in &report.replacements {
            eprintln!("{}: {}", report.module, replacement.description);
        }
        for warning in &report.warnings {
            eprintln!("{}: warning: {warning}", report.module);
        }
        for error in &report.errors {
            eprintln!("{}: error: {error}", report.module);
        }
    }
}
