//! Stable hashing helpers for schemas and manifests.

use blake3::Hasher;

use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hash of the column names and encoding choices, in order.
pub fn hash_schema(schema: &Schema) -> Hash256 {
    let mut h = Hasher::new();
    for field in schema.fields() {
        // length-prefix names so ("ab","c") and ("a","bc") differ
        h.update(&(field.name.len() as u64).to_le_bytes());
        h.update(field.name.as_bytes());
        h.update(field.encoding.tag().as_bytes());
    }
    Hash256(h.finalize().into())
}
