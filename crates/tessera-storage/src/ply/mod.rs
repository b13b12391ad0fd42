//! PLY point interchange.
//!
//! Only the `vertex` element is interpreted. Its `x`, `y`, `z` properties
//! are required and `red`, `green`, `blue` are read when all three are
//! present. Everything else in the file (comments, other elements, list
//! properties, extra vertex properties) is skipped.

mod header;
mod read;
mod write;

pub use header::{Element, Header, Property, PropertyKind, ScalarType};
pub use read::{read_ply, read_ply_file};
pub use write::{vertex_header, write_ply};

/// Byte order of binary PLY output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
    /// Whatever the host uses.
    Native,
}

impl ByteOrder {
    /// Resolve [`ByteOrder::Native`] to the host order.
    #[must_use]
    pub const fn resolve(self) -> Self {
        match self {
            Self::Native if cfg!(target_endian = "big") => Self::Big,
            Self::Native => Self::Little,
            other => other,
        }
    }
}

/// Body encoding of a PLY file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlyEncoding {
    Ascii,
    Binary(ByteOrder),
}

impl Default for PlyEncoding {
    /// Binary little endian, the layout streaming viewers expect.
    fn default() -> Self {
        Self::Binary(ByteOrder::Little)
    }
}

impl PlyEncoding {
    /// Value of the header's `format` line.
    #[must_use]
    pub const fn format_name(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Binary(order) => match order.resolve() {
                ByteOrder::Big => "binary_big_endian",
                _ => "binary_little_endian",
            },
        }
    }

    /// Parse the header's `format` value.
    #[must_use]
    pub fn from_format_name(name: &str) -> Option<Self> {
        match name {
            "ascii" => Some(Self::Ascii),
            "binary_little_endian" => Some(Self::Binary(ByteOrder::Little)),
            "binary_big_endian" => Some(Self::Binary(ByteOrder::Big)),
            _ => None,
        }
    }
}
