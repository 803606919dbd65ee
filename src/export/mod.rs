//! Schematic export formats.
//!
//! - [`structure`]: generic structure NBT (`.nbt`), gzip-wrapped.
//! - [`sponge`]: Sponge schematic v2 (`.schem`), gzip-wrapped.
//! - [`wire`]: BufferScheme forms used over the worker transport.

pub mod sponge;
pub mod structure;
pub mod wire;

pub use sponge::{read_schem, to_schem, SpongeSchematic};
pub use structure::{read_nbt, to_nbt, StructureNbt};
pub use wire::{decode_dense, decode_nested, decode_palette, encode_dense, encode_palette, encode_sparse};

use crate::error::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Gzip a finished NBT buffer.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_header_and_inverse() {
        let data = b"schematic bytes".repeat(20);
        let packed = gzip(&data).unwrap();
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);
        assert!(packed.len() < data.len());
        assert_eq!(gunzip(&packed).unwrap(), data);
    }

    #[test]
    fn test_gunzip_rejects_plain_bytes() {
        assert!(gunzip(b"not gzip").is_err());
    }
}
