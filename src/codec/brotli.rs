//! Brotli request bodies (`Content-Encoding: br`).
//!
//! Only used when `br` is listed in the enabled encodings.

use brotli::Decompressor;

use super::{drain, Encoding};
use crate::error::Result;

/// Internal buffer size for the Brotli decompressor
const BUFFER_SIZE: usize = 4096;

/// Decode a Brotli body.
pub fn decode(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    drain(Decompressor::new(data, BUFFER_SIZE), Encoding::Brotli, limit)
}
