use super::*;

/// The previous block hash as sent in `mining.notify`, kept as the raw 32 bytes decoded
/// straight from the wire hex string. Stratum sends this pre-swapped for the header, so no
/// byte reversal happens here; `swap_endian_words` is applied at header-assembly time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrevHash([u8; 32]);

impl PrevHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for PrevHash {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| InternalError::Parse {
            input: s.to_string(),
            message: e.to_string(),
        })?;

        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|bytes: Vec<u8>| InternalError::BadLength {
                expected: 32,
                actual: bytes.len(),
            })?;

        Ok(PrevHash(array))
    }
}

impl fmt::Display for PrevHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PrevHash {
    fn serialize<S: Serializer>(&self, ser: S) -> std::result::Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PrevHash {
    fn deserialize<D: Deserializer<'de>>(de: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000";

    #[test]
    fn rejects_wrong_length() {
        assert!(PrevHash::from_str("abcd").is_err());
    }

    #[test]
    fn rejects_odd_length() {
        assert!(PrevHash::from_str(&SAMPLE[..SAMPLE.len() - 1]).is_err());
    }

    #[test]
    fn accepts_32_bytes() {
        let hash: PrevHash = SAMPLE.parse().unwrap();
        assert_eq!(hash.to_hex(), SAMPLE);
    }

    #[test]
    fn serde_roundtrip() {
        let hash: PrevHash = SAMPLE.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        let back: PrevHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
