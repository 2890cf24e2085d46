// SPDX-License-Identifier: Apache-2.0

//! RESOLVE: per-AUTOINST-site port-to-signal binding.
//!
//! Port signatures come from the external symbol table through
//! [`ModuleLookup`]; signal expressions come from the bound template, with
//! identity (signal name = port name) as the fallback. A failed lookup is an
//! error scoped to its one site: the marker is left untouched and every
//! other site still expands.

use crate::collect::CollectedInfo;
use crate::io::IO;
use crate::report::{ExpandError, Warning};
use crate::template::{ConnExpr, Template, apply_template};

/// One port of a module signature, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigPort {
    pub name: String,
    pub io: IO,
}

/// The ordered port signature of a module type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSignature {
    pub name: String,
    pub ports: Vec<SigPort>,
}

/// Read-only port-signature lookup, implemented by the symbol table.
/// Failure is local to the specific lookup: implementations must be able to
/// answer for a module even when unrelated parts of the hierarchy did not
/// elaborate. Instance arrays resolve to the element module type.
pub trait ModuleLookup {
    fn lookup_module(&self, name: &str) -> Option<&ModuleSignature>;
}

/// One auto-generated port binding.
#[derive(Clone, Debug)]
pub struct Connection {
    pub port: SigPort,
    pub expr: ConnExpr,
}

/// All bindings for one AUTOINST site; `site_index` points into
/// [`CollectedInfo::inst_sites`].
#[derive(Clone, Debug)]
pub struct ResolvedInst {
    pub site_index: usize,
    pub conns: Vec<Connection>,
}

/// Builds connection bindings for every AUTOINST site in the module.
pub fn resolve_instances(
    info: &CollectedInfo,
    lookup: &dyn ModuleLookup,
    warnings: &mut Vec<Warning>,
    errors: &mut Vec<ExpandError>,
) -> Vec<ResolvedInst> {
    let mut resolved = Vec::new();
    for (site_index, site) in info.inst_sites.iter().enumerate() {
        let Some(sig) = lookup.lookup_module(&site.module_type) else {
            errors.push(ExpandError::ModuleNotFound {
                module_type: site.module_type.clone(),
                instance: site.inst_name.clone(),
            });
            continue;
        };

        let template = bound_template(info, site.offset, &site.module_type);
        let mut conns = Vec::new();
        for port in &sig.ports {
            if site.manual.contains(&port.name) {
                continue;
            }
            let expr = template
                .and_then(|t| apply_template(t, &site.inst_name, port, warnings))
                .unwrap_or_else(|| ConnExpr::Signal(port.name.clone()));
            if let ConnExpr::Constant(constant) = &expr {
                if port.io.is_output() {
                    warnings.push(Warning::ConstantOutput {
                        instance: site.inst_name.clone(),
                        port: port.name.clone(),
                        constant: constant.clone(),
                    });
                }
            }
            log::trace!(
                "{}.{} -> {:?}",
                site.inst_name,
                port.name,
                expr
            );
            conns.push(Connection {
                port: port.clone(),
                expr,
            });
        }
        resolved.push(ResolvedInst { site_index, conns });
    }
    resolved
}

/// An instance binds to the nearest template for its module type that
/// precedes it in the file, not necessarily the first one.
fn bound_template<'a>(
    info: &'a CollectedInfo,
    inst_offset: usize,
    module_type: &str,
) -> Option<&'a Template> {
    info.templates
        .iter()
        .filter(|t| t.module_name == module_type && t.offset < inst_offset)
        .next_back()
}
