//! PLY body reader.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use tessera_cloud::{Point, PointCloud, PointSchema, Precision, Rgb};
use tracing::{debug, info};

use crate::error::{PlyError, PlyResult, StorageError, StorageResult};
use crate::ply::{ByteOrder, Element, Header, PlyEncoding, PropertyKind, ScalarType};

/// Upper bound on rows reserved up front; the header count is untrusted.
const MAX_RESERVED_ROWS: usize = 1 << 20;

/// Read a point cloud from a PLY file on disk.
///
/// # Errors
/// [`StorageError::Open`] if the file cannot be opened, or
/// [`StorageError::Ply`] if its content is not a readable point cloud.
pub fn read_ply_file(path: &Path) -> StorageResult<PointCloud> {
    let file = File::open(path).map_err(|source| StorageError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let cloud = read_ply(BufReader::new(file))?;
    info!(path = %path.display(), points = cloud.len(), colored = cloud.schema().colored, "read point cloud");
    Ok(cloud)
}

/// Read a point cloud from a PLY stream.
///
/// # Errors
/// Any [`PlyError`]: bad header, missing `x`/`y`/`z`, truncated body or
/// unparsable ASCII values.
pub fn read_ply<R: BufRead>(mut reader: R) -> PlyResult<PointCloud> {
    let header = Header::read(&mut reader)?;
    let vertex = header.vertex()?;
    let layout = VertexLayout::new(vertex)?;
    debug!(
        format = header.encoding.format_name(),
        vertices = vertex.count,
        elements = header.elements.len(),
        "ply header"
    );

    match header.encoding {
        PlyEncoding::Ascii => read_body(&header, &layout, &mut AsciiValues::new(reader)),
        PlyEncoding::Binary(order) => match order.resolve() {
            ByteOrder::Big => read_body(&header, &layout, &mut BinaryValues::<_, BigEndian>::new(reader)),
            _ => read_body(&header, &layout, &mut BinaryValues::<_, LittleEndian>::new(reader)),
        },
    }
}

/// Where the interesting vertex properties sit in a row.
struct VertexLayout {
    position: [usize; 3],
    color: Option<[usize; 3]>,
    precision: Precision,
}

impl VertexLayout {
    fn new(vertex: &Element) -> PlyResult<Self> {
        let find = |name: &'static str| vertex.scalar_index(name).ok_or(PlyError::MissingProperty(name));
        let position = [find("x")?, find("y")?, find("z")?];

        let color = match (
            vertex.scalar_index("red"),
            vertex.scalar_index("green"),
            vertex.scalar_index("blue"),
        ) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            _ => None,
        };

        let precision = match vertex.properties[position[0]].kind {
            PropertyKind::Scalar(ScalarType::Float64) => Precision::Double,
            _ => Precision::Single,
        };

        Ok(Self {
            position,
            color,
            precision,
        })
    }
}

/// A stream of typed body values.
trait ValueSource {
    fn value(&mut self, ty: ScalarType, element: &str) -> PlyResult<f64>;
}

/// Walk the body up to and including the vertex element.
fn read_body<S: ValueSource>(header: &Header, layout: &VertexLayout, source: &mut S) -> PlyResult<PointCloud> {
    for element in &header.elements {
        if element.name != "vertex" {
            skip_element(element, source)?;
            continue;
        }

        let mut row = vec![0.0; element.properties.len()];
        let mut points = Vec::with_capacity(element.count.min(MAX_RESERVED_ROWS));
        for _ in 0..element.count {
            read_row(element, source, &mut row)?;
            let [x, y, z] = layout.position.map(|i| row[i]);
            let mut point = Point::new(x, y, z);
            if let Some(channels) = layout.color {
                let [red, green, blue] = channels.map(|i| to_channel(row[i]));
                point = point.with_color(Rgb::new(red, green, blue));
            }
            points.push(point);
        }

        let schema = PointSchema::new(layout.precision, layout.color.is_some());
        return Ok(PointCloud::with_schema(schema, points));
    }
    Err(PlyError::MissingVertexElement)
}

/// Fill `row` with the element's scalar values; list properties are consumed
/// and leave their slot at zero.
fn read_row<S: ValueSource>(element: &Element, source: &mut S, row: &mut [f64]) -> PlyResult<()> {
    for (slot, property) in row.iter_mut().zip(&element.properties) {
        match property.kind {
            PropertyKind::Scalar(ty) => *slot = source.value(ty, &element.name)?,
            PropertyKind::List { count, item } => {
                skip_list(source, count, item, &element.name)?;
                *slot = 0.0;
            }
        }
    }
    Ok(())
}

fn skip_element<S: ValueSource>(element: &Element, source: &mut S) -> PlyResult<()> {
    for _ in 0..element.count {
        for property in &element.properties {
            match property.kind {
                PropertyKind::Scalar(ty) => {
                    source.value(ty, &element.name)?;
                }
                PropertyKind::List { count, item } => skip_list(source, count, item, &element.name)?,
            }
        }
    }
    Ok(())
}

fn skip_list<S: ValueSource>(source: &mut S, count: ScalarType, item: ScalarType, element: &str) -> PlyResult<()> {
    let len = source.value(count, element)?;
    if len.is_nan() || len < 0.0 || len.fract() > 0.0 {
        return Err(PlyError::InvalidValue(format!("list length {len}")));
    }
    for _ in 0..len as u64 {
        source.value(item, element)?;
    }
    Ok(())
}

/// Color channel from a stored value, clamped to `0..=255`.
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Numbers of an ASCII body, parsed a line at a time.
struct AsciiValues<R> {
    reader: R,
    line: String,
    pending: VecDeque<f64>,
}

impl<R: BufRead> AsciiValues<R> {
    const fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pending: VecDeque::new(),
        }
    }

    fn refill(&mut self, element: &str) -> PlyResult<()> {
        while self.pending.is_empty() {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(PlyError::UnexpectedEof {
                    element: element.to_owned(),
                });
            }
            for token in self.line.split_ascii_whitespace() {
                let value = token
                    .parse()
                    .map_err(|_| PlyError::InvalidValue(token.to_owned()))?;
                self.pending.push_back(value);
            }
        }
        Ok(())
    }
}

impl<R: BufRead> ValueSource for AsciiValues<R> {
    fn value(&mut self, _ty: ScalarType, element: &str) -> PlyResult<f64> {
        self.refill(element)?;
        self.pending.pop_front().ok_or_else(|| PlyError::UnexpectedEof {
            element: element.to_owned(),
        })
    }
}

/// Fixed-width values of a binary body in byte order `B`.
struct BinaryValues<R, B> {
    reader: R,
    order: core::marker::PhantomData<B>,
}

impl<R, B> BinaryValues<R, B> {
    const fn new(reader: R) -> Self {
        Self {
            reader,
            order: core::marker::PhantomData,
        }
    }
}

impl<R: BufRead, B: byteorder::ByteOrder> ValueSource for BinaryValues<R, B> {
    fn value(&mut self, ty: ScalarType, element: &str) -> PlyResult<f64> {
        let r = &mut self.reader;
        let value = match ty {
            ScalarType::Int8 => r.read_i8().map(f64::from),
            ScalarType::UInt8 => r.read_u8().map(f64::from),
            ScalarType::Int16 => r.read_i16::<B>().map(f64::from),
            ScalarType::UInt16 => r.read_u16::<B>().map(f64::from),
            ScalarType::Int32 => r.read_i32::<B>().map(f64::from),
            ScalarType::UInt32 => r.read_u32::<B>().map(f64::from),
            ScalarType::Float32 => r.read_f32::<B>().map(f64::from),
            ScalarType::Float64 => r.read_f64::<B>(),
        };
        value.map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => PlyError::UnexpectedEof {
                element: element.to_owned(),
            },
            _ => PlyError::Io(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_clamp() {
        assert_eq!(to_channel(-3.0), 0);
        assert_eq!(to_channel(12.4), 12);
        assert_eq!(to_channel(300.0), 255);
        assert_eq!(to_channel(f64::NAN), 0);
    }

    #[test]
    fn test_ascii_tokens_span_lines() {
        let mut values = AsciiValues::new("  1 2\n\n3\t4 \n".as_bytes());
        let read: Vec<f64> = (0..4)
            .map(|_| values.value(ScalarType::Float32, "vertex").unwrap())
            .collect();
        assert_eq!(read, [1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            values.value(ScalarType::Float32, "vertex"),
            Err(PlyError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_binary_values_big_endian() {
        let data = [0x00, 0x01, 0x3f, 0x80, 0x00, 0x00, 0xff];
        let mut values = BinaryValues::<_, BigEndian>::new(&data[..]);
        assert_eq!(values.value(ScalarType::Int16, "vertex").unwrap(), 1.0);
        assert_eq!(values.value(ScalarType::Float32, "vertex").unwrap(), 1.0);
        assert_eq!(values.value(ScalarType::Int8, "vertex").unwrap(), -1.0);
        assert!(matches!(
            values.value(ScalarType::Float64, "vertex"),
            Err(PlyError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_missing_coordinate() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nend_header\n1 2\n";
        assert!(matches!(
            read_ply(text.as_bytes()),
            Err(PlyError::MissingProperty("z"))
        ));
    }

    #[test]
    fn test_partial_colors_are_ignored() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\n\
                    property float x\nproperty float y\nproperty float z\n\
                    property uchar red\nproperty uchar green\n\
                    end_header\n1 2 3 4 5\n";
        let cloud = read_ply(text.as_bytes()).unwrap();
        assert!(!cloud.schema().colored);
        assert_eq!(cloud.points()[0], Point::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_oversized_vertex_count_is_truncation() {
        let text = "ply\nformat ascii 1.0\nelement vertex 18446744073709551615\n\
                    property float x\nproperty float y\nproperty float z\n\
                    end_header\n1 2 3\n";
        assert!(matches!(
            read_ply(text.as_bytes()),
            Err(PlyError::UnexpectedEof { .. })
        ));

        let mut binary = b"ply\nformat binary_little_endian 1.0\nelement vertex 4000000000\n\
                           property double x\nproperty double y\nproperty double z\nend_header\n"
            .to_vec();
        binary.extend_from_slice(&[0; 24]);
        assert!(matches!(
            read_ply(binary.as_slice()),
            Err(PlyError::UnexpectedEof { .. })
        ));
    }
}
