//! Point cloud storage for tessera.
//!
//! Reading clouds from PLY and writing tile representations as segment
//! files:
//!
//! ```text
//! input.ply --read_ply_file--> PointCloud
//!
//! Representation --SegmentWriter--> tile_<n>_<i>.ply   (PLY, ascii or binary)
//!                                   tile_<n>_<i>.pcz   (GeometryCodec)
//! ```

mod codec;
mod error;
pub mod ply;
mod segment;

pub use codec::{DecodedGeometry, DeflateCodec, GeometryCodec};
pub use error::{CodecError, CodecResult, PlyError, PlyResult, StorageError, StorageResult};
pub use ply::{ByteOrder, PlyEncoding, read_ply, read_ply_file, write_ply};
pub use segment::{SegmentFormat, SegmentWriter};
