use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::error::{Error, IoResultExt, Result};

/// SHA-256 digest used for content addressing
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// parse from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidDigestHex(s.to_string()))?;
        if bytes.len() != 32 {
            return Err(Error::InvalidDigestHex(s.to_string()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..12])
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// compute SHA-256 over all bytes readable from the current position
///
/// the caller is responsible for positioning the reader; nothing is
/// rewound here.
pub fn digest_reader<R: Read>(reader: &mut R) -> Result<Digest> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).with_path("<stream>")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Digest(hasher.finalize().into()))
}

/// compute SHA-256 over an in-memory byte slice
pub fn digest_bytes(bytes: &[u8]) -> Digest {
    Digest(Sha256::digest(bytes).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_digest_hex_roundtrip() {
        let original =
            Digest::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let hex = original.to_hex();
        let parsed = Digest::from_hex(&hex).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_digest_invalid_hex() {
        assert!(Digest::from_hex("not valid hex").is_err());
        assert!(Digest::from_hex("abcd").is_err()); // too short
        assert!(Digest::from_hex(
            "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789ff"
        )
        .is_err()); // too long
    }

    #[test]
    fn test_digest_reader_known_value() {
        // sha256("hello")
        let mut cursor = Cursor::new(b"hello".to_vec());
        let digest = digest_reader(&mut cursor).unwrap();
        assert_eq!(
            digest.to_hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_digest_reader_matches_bytes() {
        let data = vec![7u8; 200_000]; // spans multiple chunks
        let mut cursor = Cursor::new(data.clone());
        assert_eq!(digest_reader(&mut cursor).unwrap(), digest_bytes(&data));
    }

    #[test]
    fn test_digest_reader_from_position() {
        use std::io::Seek;
        let mut cursor = Cursor::new(b"skiphello".to_vec());
        cursor.seek(std::io::SeekFrom::Start(4)).unwrap();
        let digest = digest_reader(&mut cursor).unwrap();
        assert_eq!(digest, digest_bytes(b"hello"));
    }

    #[test]
    fn test_digest_serde_json() {
        let d =
            Digest::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("abcdef"));
        let parsed: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(d, parsed);
    }
}
