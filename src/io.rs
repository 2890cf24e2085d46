// SPDX-License-Identifier: Apache-2.0

/// Represents the data type of a port or net: either a vector with a known
/// bit width, or an opaque composite type (struct, packed array, or a type
/// whose range could not be reduced to a constant). Composite types are
/// carried by name and never decomposed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    Vector(usize),
    Composite(String),
}

impl DataType {
    /// Returns the width of the type in bits, or `None` for composite types.
    pub fn width(&self) -> Option<usize> {
        match self {
            DataType::Vector(width) => Some(*width),
            DataType::Composite(_) => None,
        }
    }

    /// Returns the packed range text for a declaration of this type:
    /// `"[7:0]"` for multi-bit vectors, `""` for single-bit vectors and
    /// composite types.
    pub fn range(&self) -> String {
        match self {
            DataType::Vector(width) if *width > 1 => format!("[{}:0]", width - 1),
            _ => String::new(),
        }
    }
}

/// Represents the direction and data type of a port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IO {
    Input(DataType),
    Output(DataType),
    InOut(DataType),
}

impl IO {
    /// Returns the data type of the port.
    pub fn data_type(&self) -> &DataType {
        match self {
            IO::Input(ty) => ty,
            IO::Output(ty) => ty,
            IO::InOut(ty) => ty,
        }
    }

    /// Returns the width of the port in bits, or `None` for composite ports.
    pub fn width(&self) -> Option<usize> {
        self.data_type().width()
    }

    /// Returns the direction keyword: `"input"`, `"output"`, or `"inout"`.
    pub fn direction(&self) -> &'static str {
        match self {
            IO::Input(_) => "input",
            IO::Output(_) => "output",
            IO::InOut(_) => "inout",
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, IO::Input(_))
    }

    pub fn is_output(&self) -> bool {
        matches!(self, IO::Output(_))
    }

    pub fn is_inout(&self) -> bool {
        matches!(self, IO::InOut(_))
    }
}
