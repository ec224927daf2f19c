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

use beefy_primitives::{
	mmr::{proof_order_from_bits, verify_leaf_proof, MmrLeaf},
	H256,
};
use parity_scale_codec::Decode;
use structopt::StructOpt;

use crate::cli::utils::{parse_h256, Bytes};

/// MMR related commands
#[derive(StructOpt)]
#[structopt(about = "Merkle Mountain Range related commands.")]
pub enum Mmr {
	/// Decode Polkadot-compatible MMR Leaf.
	DecodeLeaf {
		/// A SCALE-encoded MMR Leaf.
		leaf: Bytes,
		/// The leaf is wrapped in a SCALE-encoded `Vec<u8>`.
		///
		/// That's what the `mmr_generateProof` custom RPC method returns.
		#[structopt(long)]
		wrapped: bool,
	},
	/// Verify a simplified MMR leaf proof.
	VerifyLeafProof {
		/// MMR root hash.
		#[structopt(parse(try_from_str = parse_h256))]
		root: H256,
		/// A SCALE-encoded MMR Leaf.
		leaf: Bytes,
		/// Proof items.
		#[structopt(long, parse(try_from_str = parse_h256))]
		proof: Vec<H256>,
		/// Proof order, bit `i` set if item `i` is the left operand.
		#[structopt(long, default_value = "0")]
		order: u64,
	},
}

impl Mmr {
	pub fn run(self) -> anyhow::Result<()> {
		match self {
			Self::DecodeLeaf { leaf, wrapped } => {
				let leaf = decode_leaf(&leaf.0, wrapped)?;
				println!("{:#?}", leaf);
				println!("Hash: {:?}", leaf.hash());
			}
			Self::VerifyLeafProof {
				root,
				leaf,
				proof,
				order,
			} => {
				verify(root, &leaf.0, &proof, order)?;
				println!("\nProof is correct.\n");
			}
		}
		Ok(())
	}
}

fn decode_leaf(encoded: &[u8], wrapped: bool) -> anyhow::Result<MmrLeaf> {
	let leaf = if wrapped {
		let inner: Vec<u8> = Decode::decode(&mut &*encoded)?;
		MmrLeaf::decode(&mut &*inner)?
	} else {
		MmrLeaf::decode(&mut &*encoded)?
	};

	Ok(leaf)
}

fn verify(root: H256, leaf: &[u8], proof: &[H256], order: u64) -> anyhow::Result<()> {
	if proof.len() > 64 {
		anyhow::bail!("Proof of {} items can't be ordered by a 64-bit mask", proof.len());
	}

	if !verify_leaf_proof(&root, leaf, proof, &proof_order_from_bits(order, proof.len())) {
		anyhow::bail!("Proof is invalid");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use beefy_primitives::{keccak_256, mmr::BeefyNextAuthoritySet};
	use parity_scale_codec::Encode;

	fn leaf() -> MmrLeaf {
		MmrLeaf {
			version: 0,
			parent_number: 42,
			parent_hash: H256::repeat_byte(1),
			next_authority_set: BeefyNextAuthoritySet {
				id: 3,
				len: 10,
				root: H256::repeat_byte(2),
			},
			parachain_heads_root: H256::repeat_byte(3),
		}
	}

	#[test]
	fn decode_plain_and_wrapped() {
		let encoded = leaf().encode();

		assert_eq!(decode_leaf(&encoded, false).unwrap(), leaf());
		assert_eq!(decode_leaf(&encoded.encode(), true).unwrap(), leaf());
		assert!(decode_leaf(&encoded[..50], false).is_err());
	}

	#[test]
	fn verify_single_item_proof() {
		// given
		let encoded = leaf().encode();
		let sibling = H256::repeat_byte(9);
		let mut pair = [0_u8; 64];
		pair[..32].copy_from_slice(sibling.as_bytes());
		pair[32..].copy_from_slice(&keccak_256(&encoded));
		let root = H256(keccak_256(&pair));

		// then
		assert!(verify(root, &encoded, &[sibling], 0b1).is_ok());
		assert!(verify(root, &encoded, &[sibling], 0b0).is_err());
	}
}
