//! SHA-2 digests of text, bytes and files, rendered as lowercase hex.

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::error::Result;

/// Digest algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HashMethod {
    /// SHA-256 (32 bytes).
    #[default]
    Sha256,
    /// SHA-512 (64 bytes).
    Sha512,
}

impl std::fmt::Display for HashMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Sha512 => write!(f, "sha512"),
        }
    }
}

impl std::str::FromStr for HashMethod {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(crate::error::CoreError::InvalidArgument(format!(
                "unknown hash method '{other}' (expected sha256 or sha512)"
            ))),
        }
    }
}

/// Digest `data`, keeping only the first `max_len` bytes when `max_len > 0`.
#[must_use]
pub fn hash_bytes(data: &[u8], method: HashMethod, max_len: usize) -> Vec<u8> {
    let mut digest = match method {
        HashMethod::Sha256 => Sha256::digest(data).to_vec(),
        HashMethod::Sha512 => Sha512::digest(data).to_vec(),
    };

    if max_len > 0 {
        digest.truncate(max_len);
    }
    digest
}

/// Digest the UTF-8 bytes of `text`.
#[must_use]
pub fn hash_text(text: &str, method: HashMethod, max_len: usize) -> Vec<u8> {
    hash_bytes(text.as_bytes(), method, max_len)
}

/// Hex digest of the UTF-8 bytes of `text`.
#[must_use]
pub fn hash_string(text: &str, method: HashMethod, max_len: usize) -> String {
    to_hex_string(&hash_text(text, method, max_len))
}

/// Hex digest of `text` encoded as UTF-16LE, matching hashes computed over
/// XML documents held as UTF-16 strings.
#[must_use]
pub fn xml_hash_string(text: &str, method: HashMethod, max_len: usize) -> String {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    to_hex_string(&hash_bytes(&bytes, method, max_len))
}

/// Hex digest of a file's contents, truncated like [`hash_bytes`].
///
/// # Errors
///
/// Returns [`crate::CoreError::Io`] when the file cannot be read.
pub fn hash_file_string(path: &Path, method: HashMethod, max_len: usize) -> Result<String> {
    let data = fs::read(path)?;
    log::debug!("hashing {} ({} bytes) with {method}", path.display(), data.len());
    Ok(to_hex_string(&hash_bytes(&data, method, max_len)))
}

/// Lowercase, two digits per byte.
#[must_use]
pub fn to_hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(nybble_to_hex(b >> 4));
        out.push(nybble_to_hex(b & 0x0f));
    }
    out
}

const fn nybble_to_hex(n: u8) -> char {
    match n {
        0..=9 => (b'0' + n) as char,
        10..=15 => (b'a' + (n - 10)) as char,
        _ => '0',
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn sha256_test_vector() {
        assert_eq!(hash_string("abc", HashMethod::Sha256, 0), ABC_SHA256);
    }

    #[test]
    fn sha512_length() {
        assert_eq!(hash_text("abc", HashMethod::Sha512, 0).len(), 64);
        assert!(hash_string("abc", HashMethod::Sha512, 0).starts_with("ddaf35a193617aba"));
    }

    #[test]
    fn max_length_truncates_digest() {
        let short = hash_string("abc", HashMethod::Sha256, 4);
        assert_eq!(short, "ba7816bf");
        assert_eq!(hash_text("abc", HashMethod::Sha256, 100).len(), 32);
    }

    #[test]
    fn xml_hash_differs_from_utf8_hash() {
        assert_ne!(
            xml_hash_string("abc", HashMethod::Sha256, 0),
            hash_string("abc", HashMethod::Sha256, 0)
        );
        assert_eq!(
            xml_hash_string("abc", HashMethod::Sha256, 0),
            to_hex_string(&hash_bytes(&[b'a', 0, b'b', 0, b'c', 0], HashMethod::Sha256, 0))
        );
    }

    #[test]
    fn file_hash_matches_text_hash() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"abc").expect("write");
        let digest = hash_file_string(file.path(), HashMethod::Sha256, 0).expect("hash file");
        assert_eq!(digest, ABC_SHA256);
    }

    #[test]
    fn file_hash_truncates_like_text_hash() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"abc").expect("write");
        let digest = hash_file_string(file.path(), HashMethod::Sha512, 6).expect("hash file");
        assert_eq!(digest, hash_string("abc", HashMethod::Sha512, 6));
        assert_eq!(digest.len(), 12);
    }

    #[test]
    fn method_names_parse() {
        assert_eq!("SHA512".parse::<HashMethod>().expect("parse"), HashMethod::Sha512);
        assert!("md5".parse::<HashMethod>().is_err());
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(to_hex_string(&[0x00, 0x0f, 0xab]), "000fab");
    }
}
