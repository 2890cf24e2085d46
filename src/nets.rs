// SPDX-License-Identifier: Apache-2.0

//! Signal aggregation and classification.
//!
//! Every distinct signal name appearing in auto-generated connections, plus
//! every `assign` target, gets one [`Net`] record. Classification is purely
//! syntactic: a net is driven when an instance output connects to it or an
//! assign targets it, and read when an instance input connects to it or an
//! assign expression mentions it. Procedural blocks are intentionally not
//! modeled.

use indexmap::IndexMap;
use regex::Regex;

use crate::collect::CollectedInfo;
use crate::io::DataType;
use crate::resolve::ResolvedInst;
use crate::template::ConnExpr;

/// Aggregate record for one signal name.
#[derive(Clone, Debug, Default)]
pub struct Net {
    pub name: String,
    /// Maximum width among all connecting vector ports; used for the
    /// declared width of internal nets.
    pub max_width: Option<usize>,
    /// Maximum width among driving (output/inout) ports; width adaptation
    /// compares consumer ports against the driven width when one exists.
    pub driven_width: Option<usize>,
    /// Composite type tag, when any connecting port is composite.
    pub composite: Option<String>,
    pub inst_driven: bool,
    pub inst_read: bool,
    pub assign_driven: bool,
    pub assign_read: bool,
}

impl Net {
    pub fn driven(&self) -> bool {
        self.inst_driven || self.assign_driven
    }

    pub fn read(&self) -> bool {
        self.inst_read || self.assign_read
    }

    /// The width that connections adapt against: the driven width when the
    /// net has a driver, otherwise the overall maximum.
    pub fn adapt_width(&self) -> Option<usize> {
        if self.composite.is_some() {
            return None;
        }
        self.driven_width.or(self.max_width)
    }

    /// The type used when declaring this net.
    pub fn decl_type(&self) -> DataType {
        match &self.composite {
            Some(tag) => DataType::Composite(tag.clone()),
            None => DataType::Vector(self.max_width.unwrap_or(1)),
        }
    }
}

/// All nets of a module, in first-reference order.
#[derive(Clone, Debug, Default)]
pub struct NetMap {
    nets: IndexMap<String, Net>,
}

impl NetMap {
    pub fn get(&self, name: &str) -> Option<&Net> {
        self.nets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Net> {
        self.nets.values()
    }

    fn entry(&mut self, name: &str) -> &mut Net {
        self.nets.entry(name.to_string()).or_insert_with(|| Net {
            name: name.to_string(),
            ..Net::default()
        })
    }
}

/// Splits a connection expression into a base signal name and an optional
/// slice; expressions that are not identifier-shaped (constants,
/// concatenations) contribute no net.
pub(crate) fn base_signal(expr: &str) -> Option<(&str, bool)> {
    let re = signal_shape();
    let caps = re.captures(expr)?;
    let base = caps.get(1).unwrap().as_str();
    Some((base, caps.get(2).is_some()))
}

fn signal_shape() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_$]*)\s*(\[[^\]]*\])?$").unwrap())
}

/// Builds the module-wide net map from all resolved connections plus the
/// collected assign sets.
pub fn aggregate(resolved: &[ResolvedInst], info: &CollectedInfo) -> NetMap {
    let mut nets = NetMap::default();

    for inst in resolved {
        for conn in &inst.conns {
            let ConnExpr::Signal(expr) = &conn.expr else {
                continue;
            };
            let Some((base, sliced)) = base_signal(expr) else {
                continue;
            };
            let net = nets.entry(base);
            if conn.port.io.is_output() || conn.port.io.is_inout() {
                net.inst_driven = true;
            }
            if conn.port.io.is_input() || conn.port.io.is_inout() {
                net.inst_read = true;
            }
            match conn.port.io.width() {
                Some(width) if !sliced => {
                    net.max_width = Some(net.max_width.unwrap_or(0).max(width));
                    if conn.port.io.is_output() || conn.port.io.is_inout() {
                        net.driven_width = Some(net.driven_width.unwrap_or(0).max(width));
                    }
                }
                Some(_) => {}
                None => {
                    if net.composite.is_none() {
                        if let DataType::Composite(tag) = conn.port.io.data_type() {
                            net.composite = Some(tag.clone());
                        }
                    }
                }
            }
        }
    }

    // Assign targets create nets; assign reads only mark existing ones.
    for name in &info.assign_driven {
        nets.entry(name).assign_driven = true;
    }
    for name in &info.assign_read {
        if let Some(net) = nets.nets.get_mut(name) {
            net.assign_read = true;
        }
    }

    nets
}

/// Nets partitioned by classification, preserving first-reference order.
/// User-declared signals and user-written module ports are excluded
/// entirely.
#[derive(Debug, Default)]
pub struct Classified<'a> {
    /// Driven and read inside the module: needs a local declaration.
    pub internal: Vec<&'a Net>,
    /// Read but never driven: becomes a module input port.
    pub inputs: Vec<&'a Net>,
    /// Driven by an instance but never read: becomes a module output port.
    pub outputs: Vec<&'a Net>,
}

pub fn classify<'a>(nets: &'a NetMap, info: &CollectedInfo) -> Classified<'a> {
    let mut classes = Classified::default();
    for net in nets.iter() {
        if info.is_user_signal(&net.name) {
            continue;
        }
        match (net.driven(), net.read()) {
            (true, true) => classes.internal.push(net),
            (false, true) => classes.inputs.push(net),
            (true, false) => {
                // Nets driven only by assigns stay out of AUTOPORTS; the
                // assign-tracking scope is deliberately partial.
                if net.inst_driven {
                    classes.outputs.push(net);
                }
            }
            (false, false) => {}
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_signal_shapes() {
        assert_eq!(base_signal("data"), Some(("data", false)));
        assert_eq!(base_signal("data[7:0]"), Some(("data", true)));
        assert_eq!(base_signal("{a, b}"), None);
        assert_eq!(base_signal("'0"), None);
        assert_eq!(base_signal("8'hff"), None);
    }
}
