//! gzip request bodies (`Content-Encoding: gzip`).

use flate2::bufread::MultiGzDecoder;

use super::{drain, Encoding};
use crate::error::{DecompressError, Result};

/// Decode a gzip body, including concatenated members.
///
/// The member header is parsed when the decoder is built, so an empty body
/// or one without the gzip magic is rejected before any inflation happens.
pub fn decode(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let decoder = MultiGzDecoder::new(data);
    if decoder.header().is_none() {
        return Err(DecompressError::DecoderConstruction {
            encoding: Encoding::Gzip,
            message: "invalid gzip header".to_string(),
        });
    }

    drain(decoder, Encoding::Gzip, limit)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode() {
        let original = br#"{"model":"gpt-4o","messages":[{"role":"user","content":"Hello"}]}"#;
        let decoded = decode(&gzip(original), 1024).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_concatenated_members() {
        let mut body = gzip(b"hello, ");
        body.extend(gzip(b"world"));

        assert_eq!(decode(&body, 1024).unwrap(), b"hello, world");
    }

    #[test]
    fn test_bad_header_fails_at_construction() {
        let err = decode(b"plain text, not gzip", 1024).unwrap_err();
        assert!(matches!(
            err,
            DecompressError::DecoderConstruction {
                encoding: Encoding::Gzip,
                ..
            }
        ));

        let err = decode(b"", 1024).unwrap_err();
        assert!(matches!(err, DecompressError::DecoderConstruction { .. }));
    }

    #[test]
    fn test_checksum_mismatch_fails_while_draining() {
        let mut body = gzip(b"some payload that will be checksummed");
        let crc_at = body.len() - 8;
        body[crc_at] ^= 0xff;

        let err = decode(&body, 1024).unwrap_err();
        assert!(matches!(
            err,
            DecompressError::DecodeStream {
                encoding: Encoding::Gzip,
                ..
            }
        ));
    }

    #[test]
    fn test_limit() {
        let body = gzip(&[b'a'; 4096]);
        let err = decode(&body, 100).unwrap_err();
        assert!(matches!(
            err,
            DecompressError::DecodedBodyTooLarge { limit: 100, .. }
        ));
    }
}
