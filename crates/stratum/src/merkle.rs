use {
    super::*,
    bitcoin::hashes::Hash as _,
};

/// One right-sibling hash from `mining.notify`'s merkle branch list. Stratum sends these
/// (and `prevhash`) as the natural big-endian hex of the hash, unlike `Txid`/`BlockHash`
/// which Bitcoin displays reversed; so this wraps the raw bytes directly instead of
/// delegating to `sha256d::Hash`'s own (reversed) `Display`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MerkleNode(sha256d::Hash);

impl MerkleNode {
    pub fn as_byte_array(&self) -> &[u8; 32] {
        self.0.as_byte_array()
    }

    pub fn from_byte_array(b: [u8; 32]) -> Self {
        Self(sha256d::Hash::from_byte_array(b))
    }

    pub fn from_raw_hash(h: sha256d::Hash) -> Self {
        Self(h)
    }

    pub fn to_raw_hash(self) -> sha256d::Hash {
        self.0
    }
}

impl FromStr for MerkleNode {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(InternalError::BadLength {
                expected: 32,
                actual: s.len() / 2,
            });
        }

        let mut b = [0u8; 32];
        hex::decode_to_slice(s, &mut b).map_err(|e| InternalError::Parse {
            input: s.to_string(),
            message: e.to_string(),
        })?;

        Ok(MerkleNode(sha256d::Hash::from_byte_array(b)))
    }
}

impl fmt::Display for MerkleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0.as_byte_array()))
    }
}

impl Serialize for MerkleNode {
    fn serialize<S: Serializer>(&self, ser: S) -> std::result::Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MerkleNode {
    fn deserialize<D: Deserializer<'de>>(de: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl From<sha256d::Hash> for MerkleNode {
    fn from(h: sha256d::Hash) -> Self {
        Self(h)
    }
}

impl From<MerkleNode> for sha256d::Hash {
    fn from(n: MerkleNode) -> Self {
        n.0
    }
}

impl From<MerkleNode> for TxMerkleNode {
    fn from(n: MerkleNode) -> Self {
        n.0.into()
    }
}

/// Folds the coinbase and merkle branches from a `mining.notify` template into the block's
/// merkle root, per the Stratum convention of treating every branch as a right sibling.
pub fn merkle_root(
    coinb1: &str,
    coinb2: &str,
    extranonce1: &Extranonce,
    extranonce2: &Extranonce,
    merkle_branches: &[MerkleNode],
) -> Result<MerkleNode, InternalError> {
    let coinbase_hex = format!("{coinb1}{extranonce1}{extranonce2}{coinb2}");
    let coinbase_bin = hex::decode(&coinbase_hex).map_err(|e| InternalError::Parse {
        input: coinbase_hex,
        message: e.to_string(),
    })?;

    let mut root = sha256d::Hash::hash(&coinbase_bin);

    for branch in merkle_branches {
        let mut concat = Vec::with_capacity(64);
        concat.extend_from_slice(&root[..]);
        concat.extend_from_slice(branch.as_byte_array());
        root = sha256d::Hash::hash(&concat);
    }

    Ok(MerkleNode::from_raw_hash(root))
}
