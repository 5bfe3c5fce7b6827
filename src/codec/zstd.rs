//! Zstandard request bodies (`Content-Encoding: zstd`).

use zstd::stream::read::Decoder;

use super::{drain, Encoding};
use crate::error::{DecompressError, Result};

/// Decode a zstd body, including concatenated frames.
pub fn decode(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let decoder = Decoder::with_buffer(data).map_err(|e| DecompressError::DecoderConstruction {
        encoding: Encoding::Zstd,
        message: e.to_string(),
    })?;

    drain(decoder, Encoding::Zstd, limit)
}
