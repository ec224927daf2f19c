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

use beefy_merkle_tree::{merkle_proof, verify_proof, Keccak256};
use beefy_primitives::{Address, H256};
use structopt::StructOpt;

use crate::cli::utils::{parse_address, parse_h256, to_hex};

/// Validator address merkle tree related commands.
#[derive(StructOpt)]
#[structopt(about = "Construct or verify a merkle proof of BEEFY validator addresses.")]
pub enum ValidatorMerkleTree {
	/// Construct a merkle tree of validator addresses, ordered by validator index, and generate a
	/// merkle proof.
	GenerateProof {
		/// Leaf index to generate the proof for.
		leaf_index: usize,
		/// Ethereum addresses of all validators.
		#[structopt(required = true, parse(try_from_str = parse_address))]
		addresses: Vec<Address>,
	},
	/// Verify a merkle proof given root hash and the proof content.
	VerifyProof {
		/// Merkle root hash.
		#[structopt(parse(try_from_str = parse_h256))]
		root: H256,
		/// Index of the leaf the proof is for.
		leaf_index: usize,
		/// Number of leaves in the tree.
		width: usize,
		/// Address the proof is for.
		#[structopt(parse(try_from_str = parse_address))]
		address: Address,
		/// Proof items, bottom up.
		#[structopt(parse(try_from_str = parse_h256))]
		proof: Vec<H256>,
	},
}

impl ValidatorMerkleTree {
	pub fn run(self) -> anyhow::Result<()> {
		match self {
			Self::GenerateProof { leaf_index, addresses } => {
				let (root, proof) = generate_merkle_proof(&addresses, leaf_index)?;
				println!();
				println!("Root: {:?}", root);
				println!("Width: {}", addresses.len());
				println!("Leaf: {:?}", addresses[leaf_index]);
				println!("Proof:");
				for item in proof {
					println!("\t{}", to_hex(item));
				}
				println!();
				Ok(())
			}
			Self::VerifyProof {
				root,
				leaf_index,
				width,
				address,
				proof,
			} => {
				verify_merkle_proof(root, &proof, width, leaf_index, address)?;
				println!("\nProof is correct.\n");
				Ok(())
			}
		}
	}
}

fn generate_merkle_proof(addresses: &[Address], leaf_index: usize) -> anyhow::Result<(H256, Vec<H256>)> {
	let proof = merkle_proof::<Keccak256, _, _>(addresses.iter().map(|a| a.as_bytes()), leaf_index)
		.ok_or_else(|| anyhow::format_err!("Leaf index out of bounds: {} vs {}", leaf_index, addresses.len()))?;

	log::debug!(target: "beefy", "🥩 Generated proof of {} items for leaf {}", proof.proof.len(), leaf_index);

	Ok((H256(proof.root), proof.proof.into_iter().map(H256).collect()))
}

fn verify_merkle_proof(
	root: H256,
	proof: &[H256],
	width: usize,
	leaf_index: usize,
	address: Address,
) -> anyhow::Result<()> {
	if !verify_proof::<Keccak256, _, _>(&root.0, proof.iter().map(|h| h.0), width, leaf_index, address.as_bytes()) {
		anyhow::bail!("Proof is invalid");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generate_proof_should_be_verified_correctly() {
		// given
		let addresses = (1..=5_u8).map(Address::repeat_byte).collect::<Vec<_>>();

		for leaf_index in 0..addresses.len() {
			// when
			let (root, proof) = generate_merkle_proof(&addresses, leaf_index).unwrap();

			// then
			verify_merkle_proof(root, &proof, addresses.len(), leaf_index, addresses[leaf_index]).unwrap();
			assert!(verify_merkle_proof(root, &proof, addresses.len(), leaf_index, Address::zero()).is_err());
		}
	}

	#[test]
	fn out_of_bounds_leaf() {
		let addresses = vec![Address::zero()];

		assert!(generate_merkle_proof(&addresses, 1).is_err());
	}
}
