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

use rand::Rng;

use beefy_merkle_tree::{merkle_proof, merkle_root, Keccak256};
use beefy_primitives::{
	crypto::address_from_public, mmr::BeefyNextAuthoritySet, Address, Bitfield, Signature, ValidatorProof,
	ValidatorSet, ValidatorSetId, H256,
};

use crate::keyring::{secret_from_seed, sign_prehashed};

/// Builder of a [`TestValidatorSet`] with deterministic keys.
#[derive(Debug, Clone)]
pub struct TestValidatorSetBuilder {
	id: ValidatorSetId,
	length: u32,
	seed: String,
}

impl TestValidatorSetBuilder {
	/// A builder for `length` validators in set `0`.
	pub fn new(length: u32) -> Self {
		TestValidatorSetBuilder {
			id: 0,
			length,
			seed: "validator".into(),
		}
	}

	/// Set the validator set id. Keys differ between ids.
	pub fn id(mut self, id: ValidatorSetId) -> Self {
		self.id = id;
		self
	}

	/// Set the seed all keys are derived from.
	pub fn seed(mut self, seed: &str) -> Self {
		self.seed = seed.into();
		self
	}

	/// Derive the keys and the address merkle tree.
	pub fn build(self) -> TestValidatorSet {
		let secrets = (0..self.length)
			.map(|index| secret_from_seed(format!("//{}/{}/{}", self.seed, self.id, index).as_bytes()))
			.collect::<Vec<_>>();

		let addresses = secrets
			.iter()
			.map(|secret| address_from_public(&libsecp256k1::PublicKey::from_secret_key(secret)))
			.collect::<Vec<_>>();

		let root = H256(merkle_root::<Keccak256, _, _>(addresses.iter().map(|a| a.as_bytes())));

		TestValidatorSet {
			id: self.id,
			secrets,
			addresses,
			root,
		}
	}
}

/// A validator set whose members can sign.
#[derive(Clone)]
pub struct TestValidatorSet {
	id: ValidatorSetId,
	secrets: Vec<libsecp256k1::SecretKey>,
	addresses: Vec<Address>,
	root: H256,
}

impl TestValidatorSet {
	/// The descriptor the light client knows.
	pub fn validator_set(&self) -> ValidatorSet {
		ValidatorSet {
			id: self.id,
			root: self.root,
			length: self.len(),
		}
	}

	/// The descriptor as announced in an MMR leaf.
	pub fn next_authority_set(&self) -> BeefyNextAuthoritySet {
		BeefyNextAuthoritySet {
			id: self.id,
			len: self.len(),
			root: self.root,
		}
	}

	/// Set id.
	pub fn id(&self) -> ValidatorSetId {
		self.id
	}

	/// Number of validators.
	pub fn len(&self) -> u32 {
		self.addresses.len() as u32
	}

	/// Whether the set has no validators.
	pub fn is_empty(&self) -> bool {
		self.addresses.is_empty()
	}

	/// Addresses by validator index.
	pub fn addresses(&self) -> &[Address] {
		&self.addresses
	}

	/// Signature of validator `index` over `commitment_hash`.
	pub fn sign(&self, index: u32, commitment_hash: &H256) -> Signature {
		sign_prehashed(&self.secrets[index as usize], commitment_hash)
	}

	/// Merkle proof of the address of validator `index`.
	pub fn membership_proof(&self, index: u32) -> Vec<H256> {
		merkle_proof::<Keccak256, _, _>(self.addresses.iter().map(|a| a.as_bytes()), index as usize)
			.map(|proof| proof.proof.into_iter().map(H256).collect())
			.unwrap_or_default()
	}

	/// Complete proof of validator `index` for `commitment_hash`.
	pub fn proof(&self, index: u32, commitment_hash: &H256) -> ValidatorProof {
		ValidatorProof {
			signature: self.sign(index, commitment_hash),
			index,
			account: self.addresses[index as usize],
			proof: self.membership_proof(index),
		}
	}

	/// Proofs of every validator in `bitfield`, by ascending index.
	pub fn proofs(&self, bitfield: &Bitfield, commitment_hash: &H256) -> Vec<ValidatorProof> {
		bitfield.set_bits().map(|index| self.proof(index, commitment_hash)).collect()
	}

	/// `count` distinct validator indices chosen by `rng`, ascending.
	pub fn random_signers<R: Rng>(&self, rng: &mut R, count: u32) -> Vec<u32> {
		let mut indices = rand::seq::index::sample(rng, self.len() as usize, count as usize)
			.into_iter()
			.map(|index| index as u32)
			.collect::<Vec<_>>();
		indices.sort_unstable();
		indices
	}
}

impl std::fmt::Debug for TestValidatorSet {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("TestValidatorSet")
			.field("id", &self.id)
			.field("root", &self.root)
			.field("len", &self.addresses.len())
			.finish()
	}
}
