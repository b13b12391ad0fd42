//! Compressed geometry segments.
//!
//! A codec turns a position array and an optional parallel color array into
//! one opaque buffer and back. [`DeflateCodec`] is the bundled
//! implementation:
//!
//! ```text
//! +-------+---------+-------+-----------+---------------------------------+
//! | magic | version | flags | count u64 | zlib( positions f64 LE * 3n     |
//! | TSRA  |   u8    |  u8   |    LE     |       [colors u8 * 3n] )        |
//! +-------+---------+-------+-----------+---------------------------------+
//! ```
//!
//! Flag bit 0 marks the presence of colors.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{CodecError, CodecResult};

const MAGIC: [u8; 4] = *b"TSRA";
const VERSION: u8 = 1;
const FLAG_COLORS: u8 = 0b1;
const HEADER_LEN: usize = MAGIC.len() + 2 + 8;

/// Geometry decoded from a compressed buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedGeometry {
    pub positions: Vec<[f64; 3]>,
    pub colors: Option<Vec<[u8; 3]>>,
}

/// Encodes geometry into a compressed buffer.
///
/// Codecs are shared between worker threads.
pub trait GeometryCodec: Send + Sync {
    /// Encode `positions` and, if present, `colors` of the same length.
    ///
    /// # Errors
    /// [`CodecError::ColorCount`] when the arrays differ in length, or an
    /// IO error from the compressor.
    fn encode(&self, positions: &[[f64; 3]], colors: Option<&[[u8; 3]]>) -> CodecResult<Vec<u8>>;

    /// Decode a buffer produced by [`Self::encode`].
    ///
    /// # Errors
    /// A [`CodecError`] if the buffer is not one this codec wrote.
    fn decode(&self, buffer: &[u8]) -> CodecResult<DecodedGeometry>;
}

/// Lossless zlib-compressed geometry.
#[derive(Clone, Copy, Debug)]
pub struct DeflateCodec {
    level: Compression,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl DeflateCodec {
    /// Codec with zlib compression `level` (0 to 9).
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl GeometryCodec for DeflateCodec {
    fn encode(&self, positions: &[[f64; 3]], colors: Option<&[[u8; 3]]>) -> CodecResult<Vec<u8>> {
        if let Some(colors) = colors
            && colors.len() != positions.len()
        {
            return Err(CodecError::ColorCount {
                positions: positions.len(),
                colors: colors.len(),
            });
        }

        let mut out = Vec::with_capacity(HEADER_LEN + positions.len() * 8);
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);
        out.push(if colors.is_some() { FLAG_COLORS } else { 0 });
        out.write_u64::<LittleEndian>(positions.len() as u64)?;

        let mut encoder = ZlibEncoder::new(out, self.level);
        for position in positions {
            for value in position {
                encoder.write_f64::<LittleEndian>(*value)?;
            }
        }
        if let Some(colors) = colors {
            encoder.write_all(colors.as_flattened())?;
        }
        Ok(encoder.finish()?)
    }

    fn decode(&self, buffer: &[u8]) -> CodecResult<DecodedGeometry> {
        if !buffer.starts_with(&MAGIC) {
            return Err(CodecError::BadMagic);
        }
        if buffer.len() < HEADER_LEN {
            return Err(CodecError::Truncated {
                expected: HEADER_LEN,
                actual: buffer.len(),
            });
        }

        let mut header = &buffer[MAGIC.len()..HEADER_LEN];
        let version = header.read_u8()?;
        if version != VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let colored = (header.read_u8()? & FLAG_COLORS) != 0;
        let count = header.read_u64::<LittleEndian>()? as usize;

        let mut payload = Vec::new();
        ZlibDecoder::new(&buffer[HEADER_LEN..]).read_to_end(&mut payload)?;

        let row = if colored { 24 + 3 } else { 24 };
        let expected = count.saturating_mul(row);
        if payload.len() != expected {
            return Err(CodecError::Truncated {
                expected,
                actual: payload.len(),
            });
        }

        let (position_bytes, color_bytes) = payload.split_at(count * 24);
        let positions = position_bytes
            .chunks_exact(24)
            .map(|mut chunk| -> CodecResult<[f64; 3]> {
                let mut position = [0.0; 3];
                for value in &mut position {
                    *value = chunk.read_f64::<LittleEndian>()?;
                }
                Ok(position)
            })
            .collect::<CodecResult<Vec<_>>>()?;
        let colors = colored.then(|| {
            color_bytes
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect()
        });

        Ok(DecodedGeometry { positions, colors })
    }
}
