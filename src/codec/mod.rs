//! Decoders for compressed request bodies.
//!
//! Each supported `Content-Encoding` maps to one variant of the closed
//! [`Encoding`] enum. Decoding is fully buffered: the compressed bytes are
//! already in memory and the decoded output is collected into a new buffer.
//!
//! | Token  | Encoding          | Construction can fail |
//! |--------|-------------------|-----------------------|
//! | `gzip` | [`Encoding::Gzip`]   | yes (header check)    |
//! | `bz2`  | [`Encoding::Bzip2`]  | no                    |
//! | `zstd` | [`Encoding::Zstd`]   | yes (context setup)   |
//! | `br`   | [`Encoding::Brotli`] | no                    |
//!
//! # Usage
//!
//! ```rust,ignore
//! use request_decompress::codec::Encoding;
//!
//! let encoding = Encoding::from_token("gzip").unwrap();
//! let plain = encoding.decode(&compressed, 64 * 1024 * 1024)?;
//! ```

pub mod brotli;
pub mod bz2;
mod encoding;
pub mod gzip;
pub mod zstd;

use std::io::Read;

pub use encoding::Encoding;

use crate::error::{DecompressError, Result};

/// Drain `reader` into memory, failing once more than `limit` bytes come out.
pub(crate) fn drain<R: Read>(reader: R, encoding: Encoding, limit: usize) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut decoded)
        .map_err(|e| DecompressError::DecodeStream {
            encoding,
            message: e.to_string(),
        })?;

    if decoded.len() > limit {
        return Err(DecompressError::DecodedBodyTooLarge { encoding, limit });
    }

    Ok(decoded)
}
