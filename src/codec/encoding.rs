//! Content-Encoding tokens and decoder dispatch.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{brotli, bz2, gzip, zstd};
use crate::error::{DecompressError, Result};

/// Request body encodings the decompressor knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// gzip (RFC 1952)
    #[serde(rename = "gzip")]
    Gzip,
    /// bzip2, announced with the `bz2` token
    #[serde(rename = "bz2")]
    Bzip2,
    /// Zstandard (RFC 8878)
    #[serde(rename = "zstd")]
    Zstd,
    /// Brotli (RFC 7932)
    ///
    /// Known to the decoder but not enabled unless configured.
    #[serde(rename = "br")]
    Brotli,
}

impl Encoding {
    /// Get the `Content-Encoding` token for this encoding
    pub fn token(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Bzip2 => "bz2",
            Encoding::Zstd => "zstd",
            Encoding::Brotli => "br",
        }
    }

    /// Parse an encoding from a `Content-Encoding` token (case-insensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|encoding| token.eq_ignore_ascii_case(encoding.token()))
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Gzip => "GZIP",
            Encoding::Bzip2 => "BZIP2",
            Encoding::Zstd => "ZSTD",
            Encoding::Brotli => "BROTLI",
        }
    }

    /// Get every encoding the crate can decode
    pub fn all() -> &'static [Encoding] {
        &[
            Encoding::Gzip,
            Encoding::Bzip2,
            Encoding::Zstd,
            Encoding::Brotli,
        ]
    }

    /// Get the encodings enabled when nothing is configured
    pub fn default_enabled() -> &'static [Encoding] {
        &[Encoding::Gzip, Encoding::Bzip2, Encoding::Zstd]
    }

    /// Decode `data`, refusing to produce more than `limit` bytes.
    pub fn decode(&self, data: &[u8], limit: usize) -> Result<Vec<u8>> {
        match self {
            Encoding::Gzip => gzip::decode(data, limit),
            Encoding::Bzip2 => bz2::decode(data, limit),
            Encoding::Zstd => zstd::decode(data, limit),
            Encoding::Brotli => brotli::decode(data, limit),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Encoding {
    type Err = DecompressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s.trim())
            .ok_or_else(|| DecompressError::UnsupportedEncoding(s.trim().to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_lookup_is_case_insensitive() {
        assert_eq!(Encoding::from_token("gzip"), Some(Encoding::Gzip));
        assert_eq!(Encoding::from_token("GZip"), Some(Encoding::Gzip));
        assert_eq!(Encoding::from_token("BZ2"), Some(Encoding::Bzip2));
        assert_eq!(Encoding::from_token("zstd"), Some(Encoding::Zstd));
        assert_eq!(Encoding::from_token("br"), Some(Encoding::Brotli));
    }

    #[test]
    fn test_unknown_tokens() {
        assert_eq!(Encoding::from_token("deflate"), None);
        assert_eq!(Encoding::from_token("bzip2"), None);
        assert_eq!(Encoding::from_token(""), None);

        let err = "Deflate".parse::<Encoding>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported Content-Encoding: deflate");
    }

    #[test]
    fn test_default_enabled_excludes_brotli() {
        assert!(!Encoding::default_enabled().contains(&Encoding::Brotli));
        assert_eq!(Encoding::all().len(), 4);
    }

    #[test]
    fn test_serde_uses_tokens() {
        let json = serde_json::to_string(&[Encoding::Bzip2, Encoding::Brotli]).unwrap();
        assert_eq!(json, r#"["bz2","br"]"#);

        let parsed: Vec<Encoding> = serde_json::from_str(r#"["gzip","zstd"]"#).unwrap();
        assert_eq!(parsed, vec![Encoding::Gzip, Encoding::Zstd]);
    }
}
