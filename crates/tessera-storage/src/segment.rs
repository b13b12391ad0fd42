//! Writing representations to segment files.

use core::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tessera_cloud::Representation;
use tracing::debug;

use crate::codec::{DeflateCodec, GeometryCodec};
use crate::error::{StorageError, StorageResult};
use crate::ply::{PlyEncoding, write_ply};

/// On-disk format of a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SegmentFormat {
    /// Standard PLY.
    #[default]
    Ply,
    /// Compressed geometry buffer.
    Compressed,
}

impl SegmentFormat {
    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Ply => "ply",
            Self::Compressed => "pcz",
        }
    }
}

impl fmt::Display for SegmentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serializes representations in one configured format.
#[derive(Clone)]
pub struct SegmentWriter {
    format: SegmentFormat,
    encoding: PlyEncoding,
    codec: Arc<dyn GeometryCodec>,
}

impl fmt::Debug for SegmentWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentWriter")
            .field("format", &self.format)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Default for SegmentWriter {
    fn default() -> Self {
        Self::new(SegmentFormat::default())
    }
}

impl SegmentWriter {
    /// Writer for `format` with binary little endian PLY and the default
    /// [`DeflateCodec`].
    #[must_use]
    pub fn new(format: SegmentFormat) -> Self {
        Self {
            format,
            encoding: PlyEncoding::default(),
            codec: Arc::new(DeflateCodec::default()),
        }
    }

    /// Set the PLY body encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: PlyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Replace the codec used for [`SegmentFormat::Compressed`].
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn GeometryCodec>) -> Self {
        self.codec = codec;
        self
    }

    #[inline]
    #[must_use]
    pub const fn format(&self) -> SegmentFormat {
        self.format
    }

    #[inline]
    #[must_use]
    pub const fn encoding(&self) -> PlyEncoding {
        self.encoding
    }

    /// Serialize `representation` to bytes.
    ///
    /// # Errors
    /// A [`StorageError::Ply`] or [`StorageError::Codec`] from the encoder.
    pub fn encode(&self, representation: &Representation) -> StorageResult<Vec<u8>> {
        match self.format {
            SegmentFormat::Ply => {
                let mut out = Vec::new();
                write_ply(&mut out, representation, self.encoding)?;
                Ok(out)
            }
            SegmentFormat::Compressed => {
                let positions = representation.positions();
                let colors = representation.colors();
                Ok(self.codec.encode(&positions, colors.as_deref())?)
            }
        }
    }

    /// Write `representation` to `path`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    /// [`StorageError::Write`] if the file cannot be created or written, or
    /// an encoding error from [`Self::encode`].
    pub fn write(&self, representation: &Representation, path: &Path) -> StorageResult<u64> {
        let bytes = self.encode(representation)?;
        let write_err = |source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut file = BufWriter::new(File::create(path).map_err(write_err)?);
        file.write_all(&bytes).map_err(write_err)?;
        file.flush().map_err(write_err)?;

        debug!(path = %path.display(), points = representation.len(), bytes = bytes.len(), "wrote segment");
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use tessera_cloud::{Point, PointSchema};

    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(SegmentFormat::Ply.extension(), "ply");
        assert_eq!(SegmentFormat::Compressed.to_string(), "pcz");
    }

    #[test]
    fn test_encode_dispatches_on_format() {
        let representation = Representation::new(PointSchema::default(), vec![Point::new(1.0, 2.0, 3.0)]);

        let ply = SegmentWriter::new(SegmentFormat::Ply).encode(&representation).unwrap();
        assert!(ply.starts_with(b"ply\n"));

        let compressed = SegmentWriter::new(SegmentFormat::Compressed)
            .encode(&representation)
            .unwrap();
        let decoded = DeflateCodec::default().decode(&compressed).unwrap();
        assert_eq!(decoded.positions, [[1.0, 2.0, 3.0]]);
    }
}
