//! PLY header model and parser.
//!
//! ```text
//! ply
//! format binary_little_endian 1.0
//! comment anything
//! element vertex 3
//! property double x
//! property list uchar int vertex_indices   <- skipped when reading points
//! end_header
//! <body>
//! ```

use std::io::{self, BufRead, Write};

use crate::error::{PlyError, PlyResult};
use crate::ply::PlyEncoding;

/// Scalar property type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl ScalarType {
    /// Parse a type name. Both the classic (`uchar`) and sized (`uint8`)
    /// spellings are accepted.
    ///
    /// # Errors
    /// [`PlyError::UnknownType`] for anything else.
    pub fn parse(name: &str) -> PlyResult<Self> {
        Ok(match name {
            "char" | "int8" => Self::Int8,
            "uchar" | "uint8" => Self::UInt8,
            "short" | "int16" => Self::Int16,
            "ushort" | "uint16" => Self::UInt16,
            "int" | "int32" => Self::Int32,
            "uint" | "uint32" => Self::UInt32,
            "float" | "float32" => Self::Float32,
            "double" | "float64" => Self::Float64,
            other => return Err(PlyError::UnknownType(other.to_owned())),
        })
    }

    /// Classic spelling, used when writing.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "char",
            Self::UInt8 => "uchar",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Float32 => "float",
            Self::Float64 => "double",
        }
    }

    /// Width in bytes in a binary body.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// Shape of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Scalar(ScalarType),
    /// A length prefix followed by that many items.
    List { count: ScalarType, item: ScalarType },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
}

impl Property {
    #[must_use]
    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Scalar(ty),
        }
    }
}

/// A named element with a row count and per-row properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub count: usize,
    pub properties: Vec<Property>,
}

impl Element {
    /// Index of the scalar property called `name`.
    #[must_use]
    pub fn scalar_index(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| p.name == name && matches!(p.kind, PropertyKind::Scalar(_)))
    }
}

/// A parsed PLY header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub encoding: PlyEncoding,
    pub comments: Vec<String>,
    pub elements: Vec<Element>,
}

impl Header {
    /// Read the header, leaving `reader` positioned at the first body byte.
    ///
    /// # Errors
    /// [`PlyError::MissingMagic`] if the stream is not PLY, and the other
    /// header variants of [`PlyError`] for malformed lines.
    pub fn read<R: BufRead>(reader: &mut R) -> PlyResult<Self> {
        let mut lines = HeaderLines::new(reader);

        match lines.next_line()? {
            Some(magic) if magic.trim() == "ply" => {}
            _ => return Err(PlyError::MissingMagic),
        }

        let mut encoding = None;
        let mut comments = Vec::new();
        let mut elements: Vec<Element> = Vec::new();

        loop {
            let Some(line) = lines.next_line()? else {
                return Err(lines.malformed("missing end_header"));
            };
            let mut words = line.split_ascii_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };

            match keyword {
                "format" => {
                    let name = words.next().ok_or_else(|| lines.malformed("format without a name"))?;
                    encoding = Some(
                        PlyEncoding::from_format_name(name)
                            .ok_or_else(|| PlyError::UnsupportedFormat(name.to_owned()))?,
                    );
                }
                "comment" | "obj_info" => {
                    let text = line.trim_start().strip_prefix(keyword).unwrap_or_default();
                    comments.push(text.trim().to_owned());
                }
                "element" => {
                    let (Some(name), Some(count), None) = (words.next(), words.next(), words.next())
                    else {
                        return Err(lines.malformed("expected `element <name> <count>`"));
                    };
                    let count = count
                        .parse()
                        .map_err(|_| lines.malformed(format!("bad element count {count:?}")))?;
                    elements.push(Element {
                        name: name.to_owned(),
                        count,
                        properties: Vec::new(),
                    });
                }
                "property" => {
                    let words: Vec<&str> = words.collect();
                    let property = match words.as_slice() {
                        ["list", count, item, name] => Property {
                            name: (*name).to_owned(),
                            kind: PropertyKind::List {
                                count: ScalarType::parse(count)?,
                                item: ScalarType::parse(item)?,
                            },
                        },
                        [ty, name] => Property::scalar(*name, ScalarType::parse(ty)?),
                        _ => return Err(lines.malformed("expected `property <type> <name>`")),
                    };
                    let Some(element) = elements.last_mut() else {
                        return Err(lines.malformed("property before any element"));
                    };
                    element.properties.push(property);
                }
                "end_header" => break,
                other => return Err(lines.malformed(format!("unknown keyword {other:?}"))),
            }
        }

        let encoding = encoding.ok_or_else(|| lines.malformed("no format line"))?;
        Ok(Self {
            encoding,
            comments,
            elements,
        })
    }

    /// The `vertex` element.
    ///
    /// # Errors
    /// [`PlyError::MissingVertexElement`] if there is none.
    pub fn vertex(&self) -> PlyResult<&Element> {
        self.elements
            .iter()
            .find(|e| e.name == "vertex")
            .ok_or(PlyError::MissingVertexElement)
    }

    /// Write the header including the trailing `end_header` line.
    ///
    /// # Errors
    /// Any IO error from `writer`.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "ply")?;
        writeln!(writer, "format {} 1.0", self.encoding.format_name())?;
        for comment in &self.comments {
            writeln!(writer, "comment {comment}")?;
        }
        for element in &self.elements {
            writeln!(writer, "element {} {}", element.name, element.count)?;
            for property in &element.properties {
                match property.kind {
                    PropertyKind::Scalar(ty) => {
                        writeln!(writer, "property {} {}", ty.name(), property.name)?;
                    }
                    PropertyKind::List { count, item } => writeln!(
                        writer,
                        "property list {} {} {}",
                        count.name(),
                        item.name(),
                        property.name
                    )?,
                }
            }
        }
        writeln!(writer, "end_header")
    }
}

/// Line reader that keeps a line number for error messages.
struct HeaderLines<'r, R> {
    reader: &'r mut R,
    number: usize,
}

impl<'r, R: BufRead> HeaderLines<'r, R> {
    const fn new(reader: &'r mut R) -> Self {
        Self { reader, number: 0 }
    }

    fn next_line(&mut self) -> PlyResult<Option<String>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.number += 1;
        let line = String::from_utf8(buf).map_err(|_| self.malformed("not ASCII"))?;
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_owned()))
    }

    fn malformed(&self, reason: impl Into<String>) -> PlyError {
        PlyError::MalformedHeader {
            line: self.number,
            reason: reason.into(),
        }
    }
}
