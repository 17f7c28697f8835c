//! Byte transforms applied to cache files on write and undone on read.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

/// Compression applied to every file of one cache instance.
///
/// The file extension records the codec, so caches written with different codecs
/// live side by side without ever reading each other's files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    Identity,
    Gzip { level: u32 },
    Lz4,
}

impl Default for Codec {
    fn default() -> Self {
        Codec::Gzip { level: 9 }
    }
}

impl Codec {
    /// Gzip with `level` clamped to the valid 0..=9 range.
    pub fn gzip(level: u32) -> Self {
        Codec::Gzip { level: level.min(9) }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Identity => "json",
            Codec::Gzip { .. } => "json.gz",
            Codec::Lz4 => "json.lz4",
        }
    }

    pub fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Codec::Identity => Ok(data.to_vec()),
            Codec::Gzip { level } => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::new((*level).min(9)));
                encoder.write_all(data)?;
                encoder.finish()
            }
            Codec::Lz4 => {
                let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
                encoder.write_all(data)?;
                encoder.finish().map_err(io::Error::other)
            }
        }
    }

    pub fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Codec::Identity => Ok(data.to_vec()),
            Codec::Gzip { .. } => {
                let mut out = Vec::new();
                GzDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
            Codec::Lz4 => {
                let mut out = Vec::new();
                lz4_flex::frame::FrameDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}
