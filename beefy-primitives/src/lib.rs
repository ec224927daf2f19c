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

#![warn(missing_docs)]

//! Primitives for verifying BEEFY finality on a smart-contract chain.
//!
//! The BEEFY validator set signs a [`Commitment`] to the relay chain's MMR root. A verifier on
//! the other side of the bridge only learns the validator set as a merkle root over validator
//! addresses ([`ValidatorSet`]), checks a random sample of signatures selected through a
//! [`Bitfield`], and follows validator set changes through [`mmr::MmrLeaf`] proofs.

use codec::{Decode, Encode};

pub mod bitfield;
pub mod commitment;
pub mod crypto;
pub mod mmr;

pub use bitfield::{Bitfield, BitfieldError};
pub use commitment::{Commitment, Payload, PayloadError, PayloadItem};
pub use crypto::{Signature, ValidatorProof};
pub use primitive_types::{H160, H256, U256};

/// Block number of the relay chain, as it appears in a commitment.
pub type BlockNumber = u32;

/// A typedef for validator set id.
pub type ValidatorSetId = u64;

/// Ethereum address of a validator, derived from its secp256k1 public key.
pub type Address = H160;

/// Hash of the MMR root, the payload BEEFY validators vote on.
pub type MmrRootHash = H256;

/// Keccak-256 of `data`.
pub fn keccak_256(data: &[u8]) -> [u8; 32] {
	use tiny_keccak::{Hasher, Keccak};

	let mut keccak = Keccak::v256();
	keccak.update(data);
	let mut output = [0_u8; 32];
	keccak.finalize(&mut output);
	output
}

/// Minimum number of signatures a set of `len` validators needs to tolerate `f` Byzantine ones,
/// `len - floor((len - 1) / 3)`.
pub fn supermajority(len: u32) -> u32 {
	match len {
		0 => 0,
		n => n - (n - 1) / 3,
	}
}

/// A committed generation of BEEFY validators.
///
/// The validators themselves are not known to the verifier, only the merkle root over their
/// Ethereum addresses, ordered by validator index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct ValidatorSet {
	/// Identifier of the validator set
	pub id: ValidatorSetId,
	/// Merkle root over the validators' addresses.
	pub root: H256,
	/// Number of validators in the set.
	pub length: u32,
}

impl ValidatorSet {
	/// Verify that `address` is the validator at `index` of this set.
	pub fn contains(&self, index: u32, address: &Address, proof: &[H256]) -> bool {
		beefy_merkle_tree::verify_proof::<beefy_merkle_tree::Keccak256, _, _>(
			&self.root.0,
			proof.iter().map(|item| item.0),
			self.length as usize,
			index as usize,
			address.as_bytes(),
		)
	}

	/// Number of signatures required to finalize a commitment of this set.
	pub fn supermajority(&self) -> u32 {
		supermajority(self.length)
	}
}
