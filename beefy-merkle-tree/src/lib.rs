// Copyright (C) 2020-2021 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! Positional binary merkle tree.
//!
//! Leaves are hashed and combined pairwise, left to right, without sorting. When a layer has an
//! odd number of nodes the last one is promoted to the next layer unchanged, so proofs for such
//! nodes skip that layer. Verification therefore needs the number of leaves in addition to the
//! leaf index.
//!
//! This is the tree BEEFY uses to commit to a validator set (leaves are Ethereum addresses of the
//! validators, ordered by validator index).

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Output of the hasher, a node of the tree.
pub type Hash = [u8; 32];

/// Hashing algorithm used to construct the tree.
pub trait Hasher {
	/// Hash given arbitrary-length piece of data.
	fn hash(data: &[u8]) -> Hash;
}

/// Keccak-256 [`Hasher`], the one used by Ethereum and BEEFY.
#[cfg(feature = "keccak")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keccak256;

#[cfg(feature = "keccak")]
impl Hasher for Keccak256 {
	fn hash(data: &[u8]) -> Hash {
		use tiny_keccak::{Hasher as _, Keccak};

		let mut keccak = Keccak::v256();
		keccak.update(data);
		let mut output = [0_u8; 32];
		keccak.finalize(&mut output);
		output
	}
}

/// Construct a root hash of a binary merkle tree created from given leaves.
///
/// An empty set of leaves yields the zero hash.
pub fn merkle_root<H, I, T>(leaves: I) -> Hash
where
	H: Hasher,
	I: IntoIterator<Item = T>,
	T: AsRef<[u8]>,
{
	let iter = leaves.into_iter().map(|l| H::hash(l.as_ref()));
	merkelize::<H, _>(iter, &mut ())
}

fn merkelize<H, I>(leaves: I, visitor: &mut impl Visitor) -> Hash
where
	H: Hasher,
	I: Iterator<Item = Hash>,
{
	let upper = Vec::with_capacity(leaves.size_hint().0);
	let mut next = match merkelize_row::<H, _, _>(leaves, upper, visitor) {
		Ok(root) => return root,
		Err(next) if next.is_empty() => return Hash::default(),
		Err(next) => next,
	};

	let mut upper = Vec::with_capacity((next.len() + 1) / 2);
	loop {
		visitor.move_up();

		match merkelize_row::<H, _, _>(next.drain(..), upper, visitor) {
			Ok(root) => return root,
			Err(t) => {
				// swap collections to avoid allocations
				upper = next;
				next = t;
			}
		};
	}
}

/// Observer of the tree construction, used to collect proofs while building the root.
trait Visitor {
	/// We are moving one level up in the tree.
	fn move_up(&mut self);

	/// We are creating an inner node from given `left` and `right` nodes.
	///
	/// Note that in case of last odd node in the row `right` might be empty.
	/// The method will also visit the `root` hash (level 0).
	///
	/// The `index` is an index of `left` item.
	fn visit(&mut self, index: usize, left: &Option<Hash>, right: &Option<Hash>);
}

/// No-op visitor.
impl Visitor for () {
	fn move_up(&mut self) {}
	fn visit(&mut self, _index: usize, _left: &Option<Hash>, _right: &Option<Hash>) {}
}

/// Processes a single row (layer) of a tree by taking pairs of elements,
/// concatenating them, hashing and placing into resulting vector.
///
/// In case only one element is provided it is returned via `Ok` result, in any other case (also an
/// empty iterator) an `Err` with the inner nodes of upper layer is returned.
fn merkelize_row<H, I, V>(mut iter: I, mut next: Vec<Hash>, visitor: &mut V) -> Result<Hash, Vec<Hash>>
where
	H: Hasher,
	V: Visitor,
	I: Iterator<Item = Hash>,
{
	#[cfg(feature = "debug")]
	log::debug!(target: "beefy_merkle_tree", "[merkelize_row]");
	next.clear();

	let mut index = 0;
	let mut combined = [0_u8; 64];
	loop {
		let a = iter.next();
		let b = iter.next();
		visitor.visit(index, &a, &b);

		#[cfg(feature = "debug")]
		log::debug!(
			target: "beefy_merkle_tree",
			"  {:?}\n  {:?}",
			a.as_ref().map(hex::encode),
			b.as_ref().map(hex::encode)
		);

		index += 2;
		match (a, b) {
			(Some(a), Some(b)) => {
				combined[0..32].copy_from_slice(&a);
				combined[32..64].copy_from_slice(&b);

				next.push(H::hash(&combined));
			}
			// Odd number of items. Promote the item to the upper layer.
			(Some(a), None) if !next.is_empty() => {
				next.push(a);
			}
			// Last item = root.
			(Some(a), None) => return Ok(a),
			// Finish up, no more items.
			_ => {
				#[cfg(feature = "debug")]
				log::debug!(
					target: "beefy_merkle_tree",
					"[merkelize_row] Next: {:?}",
					next.iter().map(hex::encode).collect::<Vec<_>>()
				);
				return Err(next);
			}
		}
	}
}

/// A generated merkle proof.
///
/// The structure contains all necessary data to later on verify the proof and the leaf itself.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MerkleProof<T> {
	/// Root hash of generated merkle tree.
	pub root: Hash,
	/// Proof items (does not contain the leaf hash, nor the root obviously).
	///
	/// This vec contains all inner node hashes necessary to reconstruct the root hash given the
	/// leaf hash, ordered from the bottom layer up.
	pub proof: Vec<Hash>,
	/// Number of leaves in the original tree.
	///
	/// This is needed to detect a case where we have an odd number of leaves that "get promoted"
	/// to upper layers.
	pub number_of_leaves: usize,
	/// Index of the leaf the proof is for (0-based).
	pub leaf_index: usize,
	/// Leaf content.
	pub leaf: T,
}

/// Construct a merkle proof for the leaf at `leaf_index`.
///
/// Returns `None` if `leaf_index` is out of bounds.
pub fn merkle_proof<H, I, T>(leaves: I, leaf_index: usize) -> Option<MerkleProof<T>>
where
	H: Hasher,
	I: IntoIterator<Item = T>,
	T: AsRef<[u8]> + Clone,
{
	let mut leaf = None;
	let mut number_of_leaves = 0;
	let hashes = leaves
		.into_iter()
		.enumerate()
		.map(|(idx, l)| {
			let hash = H::hash(l.as_ref());
			if idx == leaf_index {
				leaf = Some(l);
			}
			number_of_leaves += 1;
			hash
		})
		.collect::<Vec<_>>();
	let leaf = leaf?;

	/// Collects the siblings of the tracked node on every layer.
	struct ProofCollection {
		proof: Vec<Hash>,
		position: usize,
	}

	impl Visitor for ProofCollection {
		fn move_up(&mut self) {
			self.position /= 2;
		}

		fn visit(&mut self, index: usize, left: &Option<Hash>, right: &Option<Hash>) {
			// we are at left branch - right goes to the proof.
			if self.position == index {
				if let Some(right) = right {
					self.proof.push(*right);
				}
			}
			// we are at right branch - left goes to the proof.
			if self.position == index + 1 {
				if let Some(left) = left {
					self.proof.push(*left);
				}
			}
		}
	}

	let mut collect_proof = ProofCollection {
		proof: Default::default(),
		position: leaf_index,
	};
	let root = merkelize::<H, _>(hashes.into_iter(), &mut collect_proof);

	#[cfg(feature = "debug")]
	log::debug!(
		target: "beefy_merkle_tree",
		"[merkle_proof] Proof: {:?}",
		collect_proof.proof.iter().map(hex::encode).collect::<Vec<_>>()
	);

	Some(MerkleProof {
		root,
		proof: collect_proof.proof,
		number_of_leaves,
		leaf_index,
		leaf,
	})
}

/// Verify a merkle proof of `leaf` at `leaf_index` in a tree of `number_of_leaves` leaves.
///
/// The leaf is hashed before the proof is applied. At every step the running hash is the right
/// operand if its position is odd or it is the last node of its layer (a promoted node only ever
/// pairs with a left sibling), and the left operand otherwise.
pub fn verify_proof<H, P, T>(root: &Hash, proof: P, number_of_leaves: usize, leaf_index: usize, leaf: T) -> bool
where
	H: Hasher,
	P: IntoIterator<Item = Hash>,
	T: AsRef<[u8]>,
{
	if leaf_index >= number_of_leaves {
		return false;
	}

	let leaf_hash = H::hash(leaf.as_ref());
	let computed = compute_root::<H, _>(leaf_hash, proof, number_of_leaves, leaf_index);

	#[cfg(feature = "debug")]
	log::debug!(
		target: "beefy_merkle_tree",
		"[verify_proof] computed: {}, expected: {}",
		hex::encode(computed),
		hex::encode(root)
	);

	&computed == root
}

fn compute_root<H, P>(leaf_hash: Hash, proof: P, mut width: usize, mut position: usize) -> Hash
where
	H: Hasher,
	P: IntoIterator<Item = Hash>,
{
	let mut combined = [0_u8; 64];
	let mut computed = leaf_hash;
	for item in proof {
		if position % 2 == 1 || position + 1 == width {
			combined[0..32].copy_from_slice(&item);
			combined[32..64].copy_from_slice(&computed);
		} else {
			combined[0..32].copy_from_slice(&computed);
			combined[32..64].copy_from_slice(&item);
		}
		computed = H::hash(&combined);
		position >>= 1;
		width = ((width - 1) >> 1) + 1;
	}
	computed
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	fn init_logger() {
		let _ = env_logger::builder().is_test(true).try_init();
	}

	#[test]
	fn should_generate_empty_root() {
		// given
		init_logger();
		let data: Vec<[u8; 1]> = Default::default();

		// when
		let out = merkle_root::<Keccak256, _, _>(data);

		// then
		assert_eq!(
			hex::encode(&out),
			"0000000000000000000000000000000000000000000000000000000000000000"
		);
	}

	#[test]
	fn should_generate_single_root() {
		// given
		init_logger();
		let data = vec![hex!("E04CC55ebEE1cBCE552f250e85c57B70B2E2625b")];

		// when
		let out = merkle_root::<Keccak256, _, _>(data);

		// then
		assert_eq!(
			hex::encode(&out),
			"aeb47a269393297f4b0a3c9c9cfd00c7a4195255274cf39d83dabc2fcc9ff3d7"
		);
	}

	#[test]
	fn should_generate_root_pow_2() {
		// given
		init_logger();
		let data = vec![
			hex!("E04CC55ebEE1cBCE552f250e85c57B70B2E2625b"),
			hex!("25451A4de12dcCc2D166922fA938E900fCc4ED24"),
		];

		// when
		let out = merkle_root::<Keccak256, _, _>(data);

		// then
		assert_eq!(
			hex::encode(&out),
			"697ea2a8fe5b03468548a7a413424a6292ab44a82a6f5cc594c3fa7dda7ce402"
		);
	}

	#[test]
	fn should_generate_root_complex() {
		init_logger();
		let test = |root, data| {
			assert_eq!(hex::encode(&merkle_root::<Keccak256, _, _>(data)), root);
		};

		test(
			"aff1208e69c9e8be9b584b07ebac4e48a1ee9d15ce3afe20b77a4d29e4175aa3",
			vec!["a", "b", "c"],
		);

		test(
			"b8912f7269068901f231a965adfefbc10f0eedcfa61852b103efd54dac7db3d7",
			vec!["a", "b", "a"],
		);

		test(
			"dc8e73fe6903148ff5079baecc043983625c23b39f31537e322cd0deee09fa9c",
			vec!["a", "b", "a", "b"],
		);

		test(
			"fb3b3be94be9e983ba5e094c9c51a7d96a4fa2e5d8e891df00ca89ba05bb1239",
			vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"],
		);
	}

	#[test]
	fn should_promote_unpaired_node_unchanged() {
		// given
		init_logger();
		let data = vec!["a", "b", "c"];
		let ab = {
			let mut combined = [0_u8; 64];
			combined[0..32].copy_from_slice(&Keccak256::hash(b"a"));
			combined[32..64].copy_from_slice(&Keccak256::hash(b"b"));
			Keccak256::hash(&combined)
		};

		// when
		let proof = merkle_proof::<Keccak256, _, _>(data.clone(), 2).unwrap();

		// then
		assert_eq!(proof.proof, vec![ab]);
		assert_eq!(proof.number_of_leaves, 3);
		assert_eq!(proof.root, merkle_root::<Keccak256, _, _>(data));
		assert!(verify_proof::<Keccak256, _, _>(&proof.root, proof.proof, 3, 2, "c"));
	}

	#[test]
	fn should_generate_and_verify_proofs_for_every_leaf() {
		init_logger();

		for width in 1..=20_usize {
			let data = (0..width).map(|i| format!("leaf-{}", i)).collect::<Vec<_>>();
			let root = merkle_root::<Keccak256, _, _>(data.clone());

			for (index, leaf) in data.iter().enumerate() {
				let proof = merkle_proof::<Keccak256, _, _>(data.clone(), index).unwrap();
				assert_eq!(proof.root, root, "width {} index {}", width, index);
				assert_eq!(&proof.leaf, leaf);
				assert!(
					verify_proof::<Keccak256, _, _>(&root, proof.proof, width, index, leaf),
					"width {} index {}",
					width,
					index
				);
			}
		}
	}

	#[test]
	fn should_reject_tampered_proofs() {
		// given
		init_logger();
		let data = (0..7).map(|i| vec![i as u8; 20]).collect::<Vec<_>>();
		let proof = merkle_proof::<Keccak256, _, _>(data.clone(), 4).unwrap();

		// then
		// wrong leaf
		assert!(!verify_proof::<Keccak256, _, _>(
			&proof.root,
			proof.proof.clone(),
			7,
			4,
			&data[5]
		));
		// wrong index
		assert!(!verify_proof::<Keccak256, _, _>(
			&proof.root,
			proof.proof.clone(),
			7,
			5,
			&data[4]
		));
		// index out of range
		assert!(!verify_proof::<Keccak256, _, _>(
			&proof.root,
			proof.proof.clone(),
			4,
			4,
			&data[4]
		));
		// reversed items
		let mut reversed = proof.proof.clone();
		reversed.reverse();
		assert!(!verify_proof::<Keccak256, _, _>(&proof.root, reversed, 7, 4, &data[4]));
		// and the untouched proof still verifies
		assert!(verify_proof::<Keccak256, _, _>(&proof.root, proof.proof, 7, 4, &data[4]));
	}

	#[test]
	fn should_not_generate_proof_out_of_bounds() {
		let data = vec!["a", "b"];

		assert_eq!(merkle_proof::<Keccak256, _, _>(data, 2), None);
	}
}
