// SPDX-License-Identifier: Apache-2.0

//! COLLECT: one pass over a module's members that records everything the
//! later phases need, without mutating anything.
//!
//! Marker location is purely trivia-based. Previously generated blocks are
//! recognized from the recorded begin/end comment pair so that re-expansion
//! replaces them in place, and declarations or header ports that lie inside
//! such a block are treated as generated rather than user-written.

use indexmap::IndexSet;

use crate::report::Warning;
use crate::syntax::{Member, ModuleSyntax, Token};
use crate::template::{Template, parse_template_comment};

/// Marker literal for instance-connection expansion.
pub const AUTOINST: &str = "AUTOINST";

/// Sentinel comment text that closes every generated declaration block.
pub const END_SENTINEL: &str = "End of automatics";

/// The declaration-style markers: each expands into a block delimited by a
/// begin/end comment pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclMarker {
    Wire,
    Reg,
    Logic,
    Ports,
}

impl DeclMarker {
    pub const ALL: [DeclMarker; 4] = [
        DeclMarker::Wire,
        DeclMarker::Reg,
        DeclMarker::Logic,
        DeclMarker::Ports,
    ];

    /// The marker literal searched for in trivia.
    pub fn marker(&self) -> &'static str {
        match self {
            DeclMarker::Wire => "AUTOWIRE",
            DeclMarker::Reg => "AUTOREG",
            DeclMarker::Logic => "AUTOLOGIC",
            DeclMarker::Ports => "AUTOPORTS",
        }
    }

    /// Declaration keyword used when rendering internal nets.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclMarker::Wire => "wire",
            DeclMarker::Reg => "reg",
            DeclMarker::Logic => "logic",
            DeclMarker::Ports => "",
        }
    }

    /// The begin comment placed at the head of the generated block.
    pub fn begin_comment(&self) -> &'static str {
        match self {
            DeclMarker::Wire => {
                "// Beginning of automatic wires (for undeclared instantiation signals)"
            }
            DeclMarker::Reg => {
                "// Beginning of automatic regs (for undeclared instantiation signals)"
            }
            DeclMarker::Logic => {
                "// Beginning of automatic logics (for undeclared instantiation signals)"
            }
            DeclMarker::Ports => {
                "// Beginning of automatic ports (for connected nets not otherwise declared)"
            }
        }
    }
}

/// An AUTOINST expansion site.
#[derive(Clone, Debug)]
pub struct InstSite {
    pub module_type: String,
    pub inst_name: String,
    /// Byte offset of the instantiation's first token; decides which
    /// template the instance binds to.
    pub offset: usize,
    /// Ports already connected by the user, textually before the marker.
    pub manual: IndexSet<String>,
    /// Byte range of the marker's enclosing comment; generated text starts
    /// at `marker_end`.
    pub marker_start: usize,
    pub marker_end: usize,
    /// Offset of the `)` closing the connection list; the region between
    /// marker end and here is regenerated wholesale.
    pub close_paren: usize,
}

/// A declaration-marker expansion site.
#[derive(Clone, Debug)]
pub struct DeclSite {
    pub kind: DeclMarker,
    /// Byte range of the marker's enclosing comment.
    pub marker_start: usize,
    pub marker_end: usize,
    /// End of the existing generated block (the end of its sentinel
    /// comment), or `marker_end` when no block exists yet.
    pub replace_end: usize,
}

impl DeclSite {
    pub fn has_existing_block(&self) -> bool {
        self.replace_end > self.marker_end
    }
}

/// Everything COLLECT learned about one module. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct CollectedInfo {
    pub inst_sites: Vec<InstSite>,
    pub decl_sites: Vec<DeclSite>,
    /// Templates in source order; binding picks the nearest preceding one.
    pub templates: Vec<Template>,
    /// User-written declaration names; never re-declared by generation.
    pub existing_decls: IndexSet<String>,
    /// User-written header port names; excluded from net classification.
    pub user_ports: IndexSet<String>,
    /// Signals driven by `assign` left-hand sides or inline initializers.
    pub assign_driven: IndexSet<String>,
    /// Signals read by `assign` right-hand sides or initializer expressions.
    pub assign_read: IndexSet<String>,
}

impl CollectedInfo {
    pub fn is_user_signal(&self, name: &str) -> bool {
        self.existing_decls.contains(name) || self.user_ports.contains(name)
    }
}

/// Collects all marker sites, templates, and user declarations of `module`.
pub fn collect(module: &ModuleSyntax, warnings: &mut Vec<Warning>) -> CollectedInfo {
    let carriers = module.carrier_tokens();

    // Locate every marker occurrence first; marker positions bound the
    // sentinel searches below, so a later marker's block is never mistaken
    // for an earlier marker's.
    let mut decl_markers: Vec<(DeclMarker, usize, usize, usize)> = Vec::new();
    for (ci, token) in carriers.iter().enumerate() {
        for kind in DeclMarker::ALL {
            if let Some((start, end)) = token.find_piece(kind.marker(), 0) {
                decl_markers.push((kind, ci, start, end));
            }
        }
    }

    let mut inst_markers: Vec<usize> = Vec::new();
    for member in &module.members {
        if let Member::Instance(inst) = member {
            if let Some((start, _)) = locate_inst_marker(inst) {
                inst_markers.push(start);
            }
        }
    }

    let mut bounds: Vec<usize> = decl_markers
        .iter()
        .map(|&(_, _, start, _)| start)
        .chain(inst_markers.iter().copied())
        .collect();
    bounds.sort_unstable();

    let mut decl_sites = Vec::new();
    for &(kind, ci, marker_start, marker_end) in &decl_markers {
        let bound = bounds
            .iter()
            .copied()
            .find(|&b| b > marker_start)
            .unwrap_or(usize::MAX);
        let replace_end = find_sentinel(&carriers[ci..], marker_end, bound).unwrap_or(marker_end);
        decl_sites.push(DeclSite {
            kind,
            marker_start,
            marker_end,
            replace_end,
        });
    }
    decl_sites.sort_by_key(|site| site.marker_start);

    let generated: Vec<(usize, usize)> = decl_sites
        .iter()
        .filter(|site| site.has_existing_block())
        .map(|site| (site.marker_end, site.replace_end))
        .collect();
    let is_generated = |offset: usize| generated.iter().any(|&(lo, hi)| offset >= lo && offset < hi);

    let mut info = CollectedInfo {
        decl_sites,
        ..CollectedInfo::default()
    };

    for port in &module.header_ports {
        if !is_generated(port.token.offset) {
            info.user_ports.insert(port.name.clone());
        }
    }

    for member in &module.members {
        match member {
            Member::Decl(decl) => {
                if is_generated(decl.token.offset) {
                    continue;
                }
                for name in &decl.names {
                    info.existing_decls.insert(name.clone());
                }
                for name in &decl.init_driven {
                    info.assign_driven.insert(name.clone());
                }
                for name in &decl.init_reads {
                    info.assign_read.insert(name.clone());
                }
            }
            Member::Assign(assign) => {
                for name in &assign.targets {
                    info.assign_driven.insert(name.clone());
                }
                for name in &assign.reads {
                    info.assign_read.insert(name.clone());
                }
            }
            Member::Instance(inst) => {
                let Some((marker_start, marker_end)) = locate_inst_marker(inst) else {
                    continue;
                };
                let manual = inst
                    .conns
                    .iter()
                    .filter(|conn| conn.token.offset < marker_start)
                    .map(|conn| conn.port.clone())
                    .collect();
                info.inst_sites.push(InstSite {
                    module_type: inst.module_type.clone(),
                    inst_name: inst.inst_name.clone(),
                    offset: inst.token.offset,
                    manual,
                    marker_start,
                    marker_end,
                    close_paren: inst.close_token.offset,
                });
            }
            Member::Other(_) => {}
        }
    }

    for token in &carriers {
        for (start, piece) in token.pieces() {
            if piece.text.contains("AUTO_TEMPLATE") {
                if let Some(template) = parse_template_comment(&piece.text, start, warnings) {
                    info.templates.push(template);
                }
            }
        }
    }
    info.templates.sort_by_key(|t| t.offset);

    log::debug!(
        "collected module `{}`: {} AUTOINST sites, {} declaration markers, {} templates",
        module.name,
        info.inst_sites.len(),
        info.decl_sites.len(),
        info.templates.len()
    );
    info
}

/// AUTOINST is conventionally the last entry of a connection list, so the
/// marker is searched in the connection tokens and the closing paren.
fn locate_inst_marker(inst: &crate::syntax::Instance) -> Option<(usize, usize)> {
    inst.conns
        .iter()
        .map(|conn| &conn.token)
        .chain(std::iter::once(&inst.close_token))
        .find_map(|token| token.find_piece(AUTOINST, 0))
}

/// Searches the carriers starting at the marker's own token for the end
/// sentinel of an existing generated block. A sentinel at or past `bound`
/// (the next marker) belongs to a different block.
fn find_sentinel(carriers: &[&Token], marker_end: usize, bound: usize) -> Option<usize> {
    for (i, token) in carriers.iter().enumerate() {
        let from = if i == 0 { marker_end } else { 0 };
        if let Some((start, end)) = token.find_piece(END_SENTINEL, from) {
            if start >= bound {
                return None;
            }
            return Some(end);
        }
    }
    None
}
