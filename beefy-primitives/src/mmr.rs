// Copyright (C) 2021 Parity Technologies (UK) Ltd.
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

//! MMR leaves and their inclusion proofs.
//!
//! The relay chain appends one [`MmrLeaf`] per block to a Merkle Mountain Range and BEEFY
//! validators sign its root. A leaf proof is "simplified": a flat list of hashes plus, for each
//! of them, whether it is the left operand. Intra-mountain siblings and peak bagging are both
//! expressed by that list, so the verifier doesn't need MMR position arithmetic.

use codec::{Decode, Encode};

use crate::{keccak_256, BlockNumber, ValidatorSet, ValidatorSetId, H256};

/// Upper bound on the number of items of a leaf proof.
pub const MAX_PROOF_ITEMS: usize = 256;

/// Details of the next BEEFY authority set.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Encode, Decode)]
pub struct BeefyNextAuthoritySet {
	/// Id of the next set.
	pub id: ValidatorSetId,
	/// Number of validators in the set.
	pub len: u32,
	/// Merkle Root Hash build from the validators' Ethereum addresses.
	pub root: H256,
}

impl From<BeefyNextAuthoritySet> for ValidatorSet {
	fn from(set: BeefyNextAuthoritySet) -> Self {
		ValidatorSet {
			id: set.id,
			root: set.root,
			length: set.len,
		}
	}
}

/// A MMR leaf structure (should be matching one in Polkadot repo).
#[derive(Debug, Default, PartialEq, Eq, Clone, Encode, Decode)]
pub struct MmrLeaf {
	/// Version of the leaf format.
	pub version: u8,
	/// Current block parent number.
	pub parent_number: BlockNumber,
	/// Current block parent hash.
	pub parent_hash: H256,
	/// Details of the next BEEFY authority set.
	pub next_authority_set: BeefyNextAuthoritySet,
	/// A merkle root of all registered parachain heads.
	pub parachain_heads_root: H256,
}

impl MmrLeaf {
	/// Hash of the SCALE-encoded leaf, as stored in the MMR.
	pub fn hash(&self) -> H256 {
		H256(keccak_256(&self.encode()))
	}
}

/// Verify that `leaf` (its encoding) is part of the MMR committed to by `root`.
///
/// Starting from `keccak256(leaf)`, every proof item is hashed in: as `hash(item ++ acc)` if its
/// order flag is set, `hash(acc ++ item)` otherwise. `proof_items` and `proof_order` must have the
/// same length.
pub fn verify_leaf_proof(root: &H256, leaf: &[u8], proof_items: &[H256], proof_order: &[bool]) -> bool {
	if proof_items.len() != proof_order.len() || proof_items.len() > MAX_PROOF_ITEMS {
		return false;
	}

	let mut acc = keccak_256(leaf);
	let mut combined = [0_u8; 64];
	for (item, is_left) in proof_items.iter().zip(proof_order) {
		if *is_left {
			combined[..32].copy_from_slice(item.as_bytes());
			combined[32..].copy_from_slice(&acc);
		} else {
			combined[..32].copy_from_slice(&acc);
			combined[32..].copy_from_slice(item.as_bytes());
		}
		acc = keccak_256(&combined);
	}

	acc == root.0
}

/// Unpack the relayer's integer encoding of a proof order, bit `i` for item `i`.
pub fn proof_order_from_bits(bits: u64, len: usize) -> Vec<bool> {
	(0..len).map(|i| i < 64 && (bits >> i) & 1 == 1).collect()
}

/// Pack a proof order into an integer, the inverse of [`proof_order_from_bits`].
///
/// Returns `None` for proofs longer than 64 items.
pub fn proof_order_to_bits(order: &[bool]) -> Option<u64> {
	if order.len() > 64 {
		return None;
	}
	Some(
		order
			.iter()
			.enumerate()
			.fold(0_u64, |bits, (i, is_left)| bits | ((*is_left as u64) << i)),
	)
}
