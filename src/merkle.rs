//! Merkle audit proofs over the RFC 6962 style tree of `nova_primitives`.
//!
//! A proof is a pruned copy of the tree: the path from the root to the proven
//! value keeps its inner nodes, every subtree off the path collapses to its
//! root hash, and the proven value itself appears as its leaf hash.

use nova_primitives::{largest_power_of_two, merkle_leaf, merkle_node, merkle_root, ct_eq_hash, Hash256};
use serde::{Deserialize, Serialize};

use crate::{
    errors::CodecError,
    json::prefix_hex,
    ser::{Bounds, Packable, Packer, Prefix, Unpacker},
};

const HASH_BOUNDS: Bounds = Bounds::new(Prefix::U8, 32, 32);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    pub l: Box<MerkleProof>,
    pub r: Box<MerkleProof>,
}

/// Root hash of a subtree that is not on the proven path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafHash {
    #[serde(with = "prefix_hex")]
    pub hash: Hash256,
}

/// Leaf hash of the proven value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueHash {
    #[serde(with = "prefix_hex")]
    pub hash: Hash256,
}

tagged_union! {
    pub enum MerkleProof as "MerkleProof" {
        Node(ProofNode) = 0,
        LeafHash(LeafHash) = 1,
        ValueHash(ValueHash) = 2,
    }
}

impl MerkleProof {
    /// Proof that `leaves[index]` is part of `merkle_root(leaves)`.
    pub fn build<T: AsRef<[u8]>>(leaves: &[T], index: usize) -> Result<Self, CodecError> {
        if index >= leaves.len() {
            return Err(CodecError::IndexOutOfRange { index, len: leaves.len() });
        }
        Ok(Self::build_unchecked(leaves, index))
    }

    fn build_unchecked<T: AsRef<[u8]>>(leaves: &[T], index: usize) -> Self {
        let n = leaves.len();
        if n == 1 {
            return Self::ValueHash(ValueHash { hash: merkle_leaf(leaves[0].as_ref()) });
        }
        let k = largest_power_of_two(n);
        let (l, r) = if index < k {
            (Self::build_unchecked(&leaves[..k], index), Self::LeafHash(LeafHash { hash: merkle_root(&leaves[k..]) }))
        } else {
            (Self::LeafHash(LeafHash { hash: merkle_root(&leaves[..k]) }), Self::build_unchecked(&leaves[k..], index - k))
        };
        Self::Node(ProofNode { l: Box::new(l), r: Box::new(r) })
    }

    /// Root hash reconstructed from the proof.
    #[must_use]
    pub fn hash(&self) -> Hash256 {
        match self {
            Self::Node(n) => merkle_node(&n.l.hash(), &n.r.hash()),
            Self::LeafHash(LeafHash { hash }) | Self::ValueHash(ValueHash { hash }) => *hash,
        }
    }

    #[must_use]
    pub fn contains_value(&self, value_hash: &Hash256) -> bool {
        match self {
            Self::Node(n) => n.l.contains_value(value_hash) || n.r.contains_value(value_hash),
            Self::ValueHash(v) => ct_eq_hash(&v.hash, value_hash),
            Self::LeafHash(_) => false,
        }
    }

    fn has_value(&self) -> bool {
        match self {
            Self::Node(n) => n.l.has_value() || n.r.has_value(),
            Self::ValueHash(_) => true,
            Self::LeafHash(_) => false,
        }
    }

    /// Sibling hashes along the proven path, ordered leaf to root.
    #[must_use]
    pub fn siblings(&self) -> Vec<Hash256> {
        match self {
            Self::Node(n) => {
                let (path, sibling) = if n.l.has_value() { (&n.l, &n.r) } else { (&n.r, &n.l) };
                let mut out = path.siblings();
                out.push(sibling.hash());
                out
            }
            Self::LeafHash(_) | Self::ValueHash(_) => Vec::new(),
        }
    }
}

/// True if `proof` proves `leaf` (unhashed bytes) under `root`.
#[must_use]
pub fn verify(proof: &MerkleProof, leaf: &[u8], root: &Hash256) -> bool {
    proof.contains_value(&merkle_leaf(leaf)) && ct_eq_hash(&proof.hash(), root)
}

impl Packable for ProofNode {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.l.pack(p)?;
        self.r.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { l: Box::<MerkleProof>::unpack(u)?, r: Box::<MerkleProof>::unpack(u)? })
    }
}

fn unpack_hash(u: &mut Unpacker<'_>, ty: &'static str) -> Result<Hash256, CodecError> {
    let raw = u.prefixed_bytes(HASH_BOUNDS, ty)?;
    let mut hash = [0u8; 32];
    hash.copy_from_slice(raw);
    Ok(hash)
}

impl Packable for LeafHash {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.prefixed_bytes(HASH_BOUNDS, &self.hash, "LeafHash")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { hash: unpack_hash(u, "LeafHash")? })
    }
}

impl Packable for ValueHash {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.prefixed_bytes(HASH_BOUNDS, &self.hash, "ValueHash")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { hash: unpack_hash(u, "ValueHash")? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::{decode, encode};

    fn leaves(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![u8::try_from(i).unwrap(); 3]).collect()
    }

    #[test]
    fn single_leaf_proof() {
        let data = leaves(1);
        let proof = MerkleProof::build(&data, 0).unwrap();
        assert!(matches!(proof, MerkleProof::ValueHash(_)));
        assert!(proof.siblings().is_empty());
        assert_eq!(proof.hash(), merkle_leaf(&data[0]));
        assert!(verify(&proof, &data[0], &merkle_root(&data)));
    }

    #[test]
    fn every_index_verifies() {
        for n in 1..=13 {
            let data = leaves(n);
            let root = merkle_root(&data);
            for i in 0..n {
                let proof = MerkleProof::build(&data, i).unwrap();
                assert_eq!(proof.hash(), root, "n={n} i={i}");
                assert!(verify(&proof, &data[i], &root));
                assert!(!verify(&proof, b"other", &root));
            }
        }
    }

    #[test]
    fn out_of_range() {
        let data = leaves(3);
        assert_eq!(MerkleProof::build(&data, 3), Err(CodecError::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(MerkleProof::build::<Vec<u8>>(&[], 0), Err(CodecError::IndexOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn siblings_leaf_to_root() {
        let data = leaves(4);
        let proof = MerkleProof::build(&data, 0).unwrap();
        let s = proof.siblings();
        assert_eq!(s, vec![merkle_leaf(&data[1]), merkle_root(&data[2..])]);
    }

    #[test]
    fn wire_layout_and_hash_length() {
        let data = leaves(2);
        let proof = MerkleProof::build(&data, 1).unwrap();
        let bytes = encode(&proof).unwrap();
        // node, leaf hash (1 + 1 + 32), value hash (1 + 1 + 32)
        assert_eq!(bytes.len(), 1 + 34 + 34);
        assert_eq!(&bytes[..3], &[0, 1, 32]);
        assert_eq!(bytes[35], 2);
        assert_eq!(decode::<MerkleProof>(&bytes).unwrap(), proof);

        let mut short = vec![1u8, 31];
        short.extend_from_slice(&[0; 31]);
        assert!(matches!(decode::<MerkleProof>(&short), Err(CodecError::MalformedEncoding { .. })));
    }

    #[test]
    fn json_shape() {
        let proof = MerkleProof::build(&leaves(2), 0).unwrap();
        let v = serde_json::to_value(&proof).unwrap();
        assert_eq!(v["type"], 0);
        assert_eq!(v["l"]["type"], 2);
        assert_eq!(v["r"]["type"], 1);
        assert_eq!(v["r"]["hash"].as_str().unwrap().len(), 66);
        assert_eq!(serde_json::from_value::<MerkleProof>(v).unwrap(), proof);
    }

    #[test]
    fn deep_nesting_is_rejected() {
        // 40 nested node tags with nothing after them
        let bytes = vec![0u8; 40];
        assert!(matches!(decode::<MerkleProof>(&bytes), Err(CodecError::MalformedEncoding { .. })));
    }
}
