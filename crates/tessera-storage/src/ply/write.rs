//! PLY writer.

use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use tessera_cloud::{Point, Precision, Representation};

use crate::error::PlyResult;
use crate::ply::{ByteOrder, Element, Header, PlyEncoding, Property, ScalarType};

/// Header describing `representation` as a single `vertex` element.
#[must_use]
pub fn vertex_header(representation: &Representation, encoding: PlyEncoding) -> Header {
    let schema = representation.schema();
    let coordinate = match schema.precision {
        Precision::Single => ScalarType::Float32,
        Precision::Double => ScalarType::Float64,
    };

    let mut properties = vec![
        Property::scalar("x", coordinate),
        Property::scalar("y", coordinate),
        Property::scalar("z", coordinate),
    ];
    if schema.colored {
        properties.extend(["red", "green", "blue"].map(|c| Property::scalar(c, ScalarType::UInt8)));
    }

    Header {
        encoding,
        comments: vec!["written by tessera".to_owned()],
        elements: vec![Element {
            name: "vertex".to_owned(),
            count: representation.len(),
            properties,
        }],
    }
}

/// Write `representation` as a PLY file with a single `vertex` element.
///
/// Coordinates use the representation's precision; colors are written as
/// `uchar` channels when its schema is colored.
///
/// # Errors
/// Any IO error from `writer`.
pub fn write_ply<W: Write>(mut writer: W, representation: &Representation, encoding: PlyEncoding) -> PlyResult<()> {
    vertex_header(representation, encoding).write(&mut writer)?;

    let schema = representation.schema();
    let points = representation.points();
    match encoding {
        PlyEncoding::Ascii => write_ascii(&mut writer, points, schema.precision, schema.colored)?,
        PlyEncoding::Binary(order) => match order.resolve() {
            ByteOrder::Big => write_binary::<_, BigEndian>(&mut writer, points, schema.precision, schema.colored)?,
            _ => write_binary::<_, LittleEndian>(&mut writer, points, schema.precision, schema.colored)?,
        },
    }
    writer.flush()?;
    Ok(())
}

fn write_ascii<W: Write>(writer: &mut W, points: &[Point], precision: Precision, colored: bool) -> PlyResult<()> {
    for point in points {
        match precision {
            Precision::Single => write!(writer, "{} {} {}", point.x as f32, point.y as f32, point.z as f32)?,
            Precision::Double => write!(writer, "{} {} {}", point.x, point.y, point.z)?,
        }
        if colored {
            let [r, g, b] = point.color.unwrap_or_default().to_array();
            write!(writer, " {r} {g} {b}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_binary<W: Write, B: byteorder::ByteOrder>(
    writer: &mut W,
    points: &[Point],
    precision: Precision,
    colored: bool,
) -> PlyResult<()> {
    for point in points {
        for value in point.position() {
            match precision {
                Precision::Single => writer.write_f32::<B>(value as f32)?,
                Precision::Double => writer.write_f64::<B>(value)?,
            }
        }
        if colored {
            writer.write_all(&point.color.unwrap_or_default().to_array())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tessera_cloud::{PointSchema, Rgb};

    use super::*;

    #[test]
    fn test_ascii_output() {
        let representation = Representation::new(
            PointSchema::new(Precision::Single, true),
            vec![Point::new(1.5, -2.0, 0.25).with_color(Rgb::new(1, 2, 3))],
        );
        let mut out = Vec::new();
        write_ply(&mut out, &representation, PlyEncoding::Ascii).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "ply\n\
             format ascii 1.0\n\
             comment written by tessera\n\
             element vertex 1\n\
             property float x\n\
             property float y\n\
             property float z\n\
             property uchar red\n\
             property uchar green\n\
             property uchar blue\n\
             end_header\n\
             1.5 -2 0.25 1 2 3\n"
        );
    }

    #[test]
    fn test_binary_body_size() {
        let points = vec![Point::new(0.0, 0.0, 0.0); 4];
        for (precision, colored, row) in [
            (Precision::Single, false, 12),
            (Precision::Single, true, 15),
            (Precision::Double, false, 24),
            (Precision::Double, true, 27),
        ] {
            let representation = Representation::new(PointSchema::new(precision, colored), points.clone());
            let encoding = PlyEncoding::Binary(ByteOrder::Big);

            let mut header = Vec::new();
            vertex_header(&representation, encoding).write(&mut header).unwrap();
            let mut out = Vec::new();
            write_ply(&mut out, &representation, encoding).unwrap();

            assert_eq!(out.len() - header.len(), 4 * row);
        }
    }

    #[test]
    fn test_big_endian_layout() {
        let representation = Representation::new(
            PointSchema::new(Precision::Single, false),
            vec![Point::new(1.0, 0.0, 0.0)],
        );
        let mut out = Vec::new();
        write_ply(&mut out, &representation, PlyEncoding::Binary(ByteOrder::Big)).unwrap();
        let body = &out[out.len() - 12..];
        assert_eq!(&body[..4], &1.0f32.to_be_bytes());
    }
}
