//! Fixed-depth incremental Merkle accumulator.
//!
//! Leaves are appended left to right; unoccupied slots hold the zero value
//! and each level above is padded with the precomputed hash of an all-zero
//! subtree. Every level is kept in memory so leaves can be updated in place
//! and sibling paths produced for any occupied index.

use std::collections::HashMap;

use zkauction_common::{fr_to_bytes, poseidon_hash, Fr};

use crate::error::MerkleError;

const MAX_DEPTH: usize = 32;

/// Incremental Merkle accumulator over bn256 field elements.
#[derive(Clone, Debug)]
pub struct MerkleAccumulator {
    depth: usize,
    /// `zeros[l]` is the root of an all-zero subtree of height `l`.
    zeros: Vec<Fr>,
    /// `levels[0]` holds the occupied leaves; `levels[depth]` holds the root.
    /// Each level stores only the nodes touched by occupied leaves.
    levels: Vec<Vec<Fr>>,
    /// First occurrence of each currently stored leaf value.
    indices: HashMap<[u8; 32], usize>,
}

impl MerkleAccumulator {
    pub fn new(depth: usize) -> Result<Self, MerkleError> {
        if depth == 0 || depth > MAX_DEPTH {
            return Err(MerkleError::InvalidDepth(depth));
        }

        let mut zeros = Vec::with_capacity(depth + 1);
        zeros.push(Fr::zero());
        for level in 0..depth {
            let z = zeros[level];
            zeros.push(poseidon_hash(&[z, z]));
        }

        Ok(Self {
            depth,
            zeros,
            levels: vec![Vec::new(); depth + 1],
            indices: HashMap::new(),
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of occupied leaf slots.
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    pub fn capacity(&self) -> usize {
        1usize << self.depth
    }

    pub fn root(&self) -> Fr {
        self.node(self.depth, 0)
    }

    /// Append a leaf into the next free slot and return its index.
    pub fn insert(&mut self, leaf: Fr) -> Result<usize, MerkleError> {
        let index = self.len();
        if index == self.capacity() {
            return Err(MerkleError::TreeFull {
                capacity: self.capacity(),
            });
        }

        self.levels[0].push(leaf);
        self.indices.entry(fr_to_bytes(&leaf)).or_insert(index);
        self.rehash_path(index);
        Ok(index)
    }

    /// Replace the leaf at an occupied index.
    pub fn update(&mut self, index: usize, leaf: Fr) -> Result<(), MerkleError> {
        let occupied = self.len();
        if index >= occupied {
            return Err(MerkleError::IndexOutOfRange { index, occupied });
        }

        let old = self.levels[0][index];
        let old_key = fr_to_bytes(&old);
        if self.indices.get(&old_key) == Some(&index) {
            self.indices.remove(&old_key);
            // Another occurrence of the displaced value may still be stored.
            if let Some((other, _)) = self
                .levels[0]
                .iter()
                .enumerate()
                .find(|(i, l)| *i != index && fr_to_bytes(l) == old_key)
            {
                self.indices.insert(old_key, other);
            }
        }

        self.levels[0][index] = leaf;
        let key = fr_to_bytes(&leaf);
        let entry = self.indices.entry(key).or_insert(index);
        *entry = (*entry).min(index);
        self.rehash_path(index);
        Ok(())
    }

    /// Index of the first occurrence of a stored leaf value.
    pub fn index_of(&self, leaf: &Fr) -> Option<usize> {
        self.indices.get(&fr_to_bytes(leaf)).copied()
    }

    pub fn leaf_at(&self, index: usize) -> Result<Fr, MerkleError> {
        let occupied = self.len();
        if index >= occupied {
            return Err(MerkleError::IndexOutOfRange { index, occupied });
        }
        Ok(self.levels[0][index])
    }

    /// Sibling path (bottom-up) for the leaf at an occupied index.
    pub fn create_proof(&self, index: usize) -> Result<Vec<Fr>, MerkleError> {
        let occupied = self.len();
        if index >= occupied {
            return Err(MerkleError::IndexOutOfRange { index, occupied });
        }

        let mut siblings = Vec::with_capacity(self.depth);
        let mut pos = index;
        for level in 0..self.depth {
            siblings.push(self.node(level, pos ^ 1));
            pos >>= 1;
        }
        Ok(siblings)
    }

    fn node(&self, level: usize, pos: usize) -> Fr {
        self.levels[level]
            .get(pos)
            .copied()
            .unwrap_or(self.zeros[level])
    }

    fn rehash_path(&mut self, index: usize) {
        let mut pos = index;
        for level in 0..self.depth {
            let left = self.node(level, pos & !1);
            let right = self.node(level, (pos & !1) | 1);
            let parent = poseidon_hash(&[left, right]);

            let parent_pos = pos >> 1;
            if parent_pos == self.levels[level + 1].len() {
                self.levels[level + 1].push(parent);
            } else {
                self.levels[level + 1][parent_pos] = parent;
            }
            pos = parent_pos;
        }
    }
}

/// Recompute the root implied by a leaf, its index, and a sibling path.
///
/// Consumes one index bit per sibling; callers are responsible for checking
/// that the path length matches the tree depth.
pub fn compute_root(leaf: Fr, index: usize, siblings: &[Fr]) -> Fr {
    let mut acc = leaf;
    let mut pos = index;
    for sibling in siblings {
        acc = if pos & 1 == 0 {
            poseidon_hash(&[acc, *sibling])
        } else {
            poseidon_hash(&[*sibling, acc])
        };
        pos >>= 1;
    }
    acc
}

/// Check a sibling path against an expected root at a given depth.
pub fn verify_proof(depth: usize, leaf: Fr, index: usize, siblings: &[Fr], root: Fr) -> bool {
    siblings.len() == depth && compute_root(leaf, index, siblings) == root
}
