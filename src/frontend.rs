// SPDX-License-Identifier: Apache-2.0

//! The collaborating language frontend: lexing, member-level parsing, and
//! the [`Design`] symbol table that backs port-signature lookups.
//!
//! The expansion engine itself depends only on [`crate::syntax`] and the
//! [`ModuleLookup`](crate::resolve::ModuleLookup) trait; this module is one
//! implementation of that seam, good for the practical subset of
//! Verilog/SystemVerilog that AUTO-commented sources are written in.

mod lexer;
mod parser;

pub use parser::parse_source;

use indexmap::IndexMap;

use crate::apply::apply_replacements;
use crate::io::{DataType, IO};
use crate::report::ModuleExpansion;
use crate::resolve::{ModuleLookup, ModuleSignature, SigPort};
use crate::syntax::{Member, ModuleSyntax};

/// Builds a module's port signature from its parsed syntax. ANSI header
/// entries carry their own direction and type; name-only entries are
/// resolved against non-ANSI body declarations, defaulting to a one-bit
/// input when no declaration is found.
pub fn signature_of(module: &ModuleSyntax) -> ModuleSignature {
    let mut body_dirs: IndexMap<&str, IO> = IndexMap::new();
    for member in &module.members {
        if let Member::Decl(decl) = member {
            let io = match decl.keyword.as_str() {
                "input" => IO::Input(decl.data_type.clone()),
                "output" => IO::Output(decl.data_type.clone()),
                "inout" => IO::InOut(decl.data_type.clone()),
                _ => continue,
            };
            for name in &decl.names {
                body_dirs.insert(name, io.clone());
            }
        }
    }

    let ports = module
        .header_ports
        .iter()
        .map(|port| SigPort {
            name: port.name.clone(),
            io: port
                .io
                .clone()
                .or_else(|| body_dirs.get(port.name.as_str()).cloned())
                .unwrap_or(IO::Input(DataType::Vector(1))),
        })
        .collect();

    ModuleSignature {
        name: module.name.clone(),
        ports,
    }
}

/// A read-only collection of module port signatures. Lookups are tolerant by
/// construction: an unknown module is simply not found, and a signature is
/// registered from a module's own header regardless of whether anything it
/// instantiates can be resolved.
#[derive(Clone, Debug, Default)]
pub struct Design {
    modules: IndexMap<String, ModuleSignature>,
}

impl Design {
    pub fn new() -> Design {
        Design::default()
    }

    /// Parses `source` and registers a signature for every well-formed
    /// module in it. Returns the number of modules registered.
    pub fn add_verilog(&mut self, source: &str) -> usize {
        let modules = parse_source(source);
        let count = modules.len();
        for module in &modules {
            let sig = signature_of(module);
            log::debug!("registered module `{}` ({} ports)", sig.name, sig.ports.len());
            self.modules.insert(sig.name.clone(), sig);
        }
        count
    }

    /// Registers an externally constructed signature, replacing any previous
    /// signature with the same module name.
    pub fn add_signature(&mut self, sig: ModuleSignature) {
        self.modules.insert(sig.name.clone(), sig);
    }

    /// Expands every AUTO marker in every module of `source`, resolving
    /// instantiated module types against this design plus the modules of
    /// `source` itself. Returns the rewritten text and one report per
    /// module; bytes outside the replaced ranges are identical to the input.
    pub fn expand_text(&self, source: &str) -> (String, Vec<ModuleExpansion>) {
        let modules = parse_source(source);
        let mut local = self.clone();
        for module in &modules {
            let sig = signature_of(module);
            local.modules.insert(sig.name.clone(), sig);
        }

        let mut reports = Vec::new();
        let mut replacements = Vec::new();
        for module in &modules {
            let expansion = crate::expand_module(module, source, &local);
            replacements.extend(expansion.replacements.iter().cloned());
            reports.push(expansion);
        }
        (apply_replacements(source, &replacements), reports)
    }
}

impl ModuleLookup for Design {
    fn lookup_module(&self, name: &str) -> Option<&ModuleSignature> {
        self.modules.get(name)
    }
}
