//! bzip2 request bodies (`Content-Encoding: bz2`).

use bzip2::bufread::MultiBzDecoder;

use super::{drain, Encoding};
use crate::error::Result;

/// Decode a bzip2 body, including concatenated streams.
///
/// Building the decoder never fails; a bad magic number or a truncated
/// stream only shows up while draining.
pub fn decode(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    drain(MultiBzDecoder::new(data), Encoding::Bzip2, limit)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bzip2::{write::BzEncoder, Compression};

    use super::*;
    use crate::error::DecompressError;

    fn bzip2(data: &[u8]) -> Vec<u8> {
        let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode() {
        let original = b"Hello, bzip2! This is a test of byte decompression.";
        assert_eq!(decode(&bzip2(original), 1024).unwrap(), original);
    }

    #[test]
    fn test_garbage_fails_while_draining() {
        let err = decode(b"definitely not a bzip2 stream", 1024).unwrap_err();
        assert!(matches!(
            err,
            DecompressError::DecodeStream {
                encoding: Encoding::Bzip2,
                ..
            }
        ));
    }

    #[test]
    fn test_limit() {
        let body = bzip2(&[b'z'; 10_000]);
        assert!(matches!(
            decode(&body, 9_999).unwrap_err(),
            DecompressError::DecodedBodyTooLarge { .. }
        ));
        assert_eq!(decode(&body, 10_000).unwrap().len(), 10_000);
    }
}
