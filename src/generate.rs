// SPDX-License-Identifier: Apache-2.0

//! GENERATE: renders resolved connections and classified nets into
//! byte-range replacements.
//!
//! AUTOINST regenerates the whole region between its marker comment and the
//! closing paren of the connection list; declaration markers regenerate the
//! region between the marker comment and the end of the recorded sentinel
//! comment, or insert fresh text at the marker when no block exists yet.
//! Rendering is deterministic, which is what makes re-expansion a byte-level
//! fixpoint.

use itertools::Itertools;

use crate::collect::{CollectedInfo, DeclMarker, DeclSite, InstSite};
use crate::io::DataType;
use crate::nets::{Classified, Net, NetMap, base_signal, classify};
use crate::report::{MarkerCounts, Replacement};
use crate::resolve::{Connection, ResolvedInst};
use crate::template::ConnExpr;

/// Renders every marker site of the module into replacements.
pub fn generate(
    info: &CollectedInfo,
    resolved: &[ResolvedInst],
    nets: &NetMap,
    source: &str,
    counts: &mut MarkerCounts,
) -> Vec<Replacement> {
    let mut replacements = Vec::new();

    for inst in resolved {
        let site = &info.inst_sites[inst.site_index];
        if let Some(replacement) = render_autoinst(site, &inst.conns, nets, source) {
            counts.autoinst += 1;
            replacements.push(replacement);
        }
    }

    let classes = classify(nets, info);
    for site in &info.decl_sites {
        let rendered = match site.kind {
            DeclMarker::Ports => render_autoports(site, &classes, source),
            _ => render_decl_block(site, &classes.internal, source),
        };
        if let Some(replacement) = rendered {
            match site.kind {
                DeclMarker::Wire => counts.autowire += 1,
                DeclMarker::Reg => counts.autoreg += 1,
                DeclMarker::Logic => counts.autologic += 1,
                DeclMarker::Ports => counts.autoports += 1,
            }
            replacements.push(replacement);
        }
    }

    replacements.sort_by_key(|r| r.start);
    replacements
}

/// Renders one AUTOINST body: `// Outputs`, `// Inouts`, `// Inputs`
/// sections, each in port-declaration order, one connection per line at the
/// marker's column.
fn render_autoinst(
    site: &InstSite,
    conns: &[Connection],
    nets: &NetMap,
    source: &str,
) -> Option<Replacement> {
    let region = (site.marker_end, site.close_paren);
    if conns.is_empty() {
        if region.0 == region.1 {
            return None;
        }
        return Some(Replacement {
            start: region.0,
            end: region.1,
            text: String::new(),
            description: autoinst_description(site, 0),
        });
    }

    let indent = " ".repeat(column_of(source, site.marker_start));
    let groups: [(&str, Vec<&Connection>); 3] = [
        (
            "// Outputs",
            conns.iter().filter(|c| c.port.io.is_output()).collect(),
        ),
        (
            "// Inouts",
            conns.iter().filter(|c| c.port.io.is_inout()).collect(),
        ),
        (
            "// Inputs",
            conns.iter().filter(|c| c.port.io.is_input()).collect(),
        ),
    ];

    // (is_connection, text) lines; the comma goes after every connection
    // line except the last one overall.
    let mut lines: Vec<(bool, String)> = Vec::new();
    for (label, entries) in groups {
        if entries.is_empty() {
            continue;
        }
        lines.push((false, label.to_string()));
        for conn in entries {
            lines.push((true, format!(".{}({})", conn.port.name, conn_text(conn, nets))));
        }
    }
    let last_conn = lines.iter().rposition(|(is_conn, _)| *is_conn);

    let prefix = if needs_leading_comma(source, site.marker_start) {
        ","
    } else {
        ""
    };
    let body = lines
        .iter()
        .enumerate()
        .map(|(i, (is_conn, line))| {
            let comma = if *is_conn && Some(i) != last_conn { "," } else { "" };
            format!("{indent}{line}{comma}")
        })
        .join("\n");

    Some(Replacement {
        start: region.0,
        end: region.1,
        text: format!("{prefix}\n{body}"),
        description: autoinst_description(site, lines.iter().filter(|(c, _)| *c).count()),
    })
}

fn autoinst_description(site: &InstSite, ports: usize) -> String {
    format!(
        "AUTOINST for instance `{}` of `{}` ({} ports)",
        site.inst_name, site.module_type, ports
    )
}

/// The connection text for one port, with width adaptation against the
/// net's aggregate width. Composite ports and non-identifier expressions
/// connect as written.
fn conn_text(conn: &Connection, nets: &NetMap) -> String {
    match &conn.expr {
        ConnExpr::Unconnected => String::new(),
        ConnExpr::Constant(constant) => constant.clone(),
        ConnExpr::Signal(signal) => {
            let Some(port_width) = conn.port.io.width() else {
                return signal.clone();
            };
            let Some((base, sliced)) = base_signal(signal) else {
                return signal.clone();
            };
            if sliced {
                return signal.clone();
            }
            let Some(net_width) = nets.get(base).and_then(Net::adapt_width) else {
                return signal.clone();
            };
            if port_width == net_width {
                signal.clone()
            } else if port_width < net_width {
                if port_width == 1 {
                    format!("{signal}[0]")
                } else {
                    format!("{signal}[{}:0]", port_width - 1)
                }
            } else {
                format!("{{'0, {signal}}}")
            }
        }
    }
}

/// Renders an AUTOWIRE/AUTOREG/AUTOLOGIC block declaring the internal nets.
fn render_decl_block(site: &DeclSite, internal: &[&Net], source: &str) -> Option<Replacement> {
    if internal.is_empty() && !site.has_existing_block() {
        return None;
    }
    let text = if internal.is_empty() {
        String::new()
    } else {
        let indent = " ".repeat(column_of(source, site.marker_start));
        let mut lines = vec![site.kind.begin_comment().to_string()];
        for net in internal {
            lines.push(decl_line(site.kind, net));
        }
        lines.push(format!("// {}", crate::collect::END_SENTINEL));
        format!(
            "\n{}{}",
            lines.iter().map(|l| format!("{indent}{l}")).join("\n"),
            block_terminator(source, site.replace_end)
        )
    };
    Some(Replacement {
        start: site.marker_end,
        end: site.replace_end,
        text,
        description: format!(
            "{} declarations ({} nets)",
            site.kind.marker(),
            internal.len()
        ),
    })
}

fn decl_line(kind: DeclMarker, net: &Net) -> String {
    match net.decl_type() {
        DataType::Composite(tag) => format!("{tag} {};", net.name),
        ty => {
            let range = ty.range();
            if range.is_empty() {
                format!("{} {};", kind.keyword(), net.name)
            } else {
                format!("{} {range} {};", kind.keyword(), net.name)
            }
        }
    }
}

/// Renders the AUTOPORTS block: external-input entries then external-output
/// entries, comma-separated, inside the begin/end comment pair.
fn render_autoports(site: &DeclSite, classes: &Classified, source: &str) -> Option<Replacement> {
    let total = classes.inputs.len() + classes.outputs.len();
    if total == 0 && !site.has_existing_block() {
        return None;
    }
    let text = if total == 0 {
        String::new()
    } else {
        let indent = " ".repeat(column_of(source, site.marker_start));
        let prefix = if needs_leading_comma(source, site.marker_start) {
            ","
        } else {
            ""
        };
        let mut lines = vec![site.kind.begin_comment().to_string()];
        let entries: Vec<String> = classes
            .inputs
            .iter()
            .map(|net| port_line("input ", net))
            .chain(classes.outputs.iter().map(|net| port_line("output", net)))
            .collect();
        let last = entries.len() - 1;
        for (i, entry) in entries.into_iter().enumerate() {
            let comma = if i != last { "," } else { "" };
            lines.push(format!("{entry}{comma}"));
        }
        lines.push(format!("// {}", crate::collect::END_SENTINEL));
        format!(
            "{prefix}\n{}{}",
            lines.iter().map(|l| format!("{indent}{l}")).join("\n"),
            block_terminator(source, site.replace_end)
        )
    };
    Some(Replacement {
        start: site.marker_end,
        end: site.replace_end,
        text,
        description: format!(
            "AUTOPORTS ({} inputs, {} outputs)",
            classes.inputs.len(),
            classes.outputs.len()
        ),
    })
}

fn port_line(direction: &str, net: &Net) -> String {
    match net.decl_type() {
        DataType::Composite(tag) => format!("{direction} {tag} {}", net.name),
        ty => {
            let range = ty.range();
            if range.is_empty() {
                format!("{direction} wire {}", net.name)
            } else {
                format!("{direction} wire {range} {}", net.name)
            }
        }
    }
}

/// A generated block ends with the sentinel line comment, so when the text
/// after the replaced region continues on the same line the block must close
/// with its own newline or the comment would swallow that text.
fn block_terminator(source: &str, replace_end: usize) -> &'static str {
    if source[replace_end..].starts_with('\n') {
        ""
    } else {
        "\n"
    }
}

/// Column (0-based) of `offset` within its line.
fn column_of(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    offset - line_start
}

/// Whether generated list entries must start with a separating comma: true
/// unless the last meaningful character before the marker comment is the
/// list-opening `(` or an existing `,`.
fn needs_leading_comma(source: &str, marker_start: usize) -> bool {
    match source[..marker_start].trim_end().chars().next_back() {
        Some('(') | Some(',') | None => false,
        Some(_) => true,
    }
}
