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

use beefy_primitives::{supermajority, Bitfield, U256};
use structopt::StructOpt;

use crate::cli::utils::{parse_u256, to_hex};

/// Bitfield related commands.
#[derive(StructOpt)]
#[structopt(about = "Build the bitfields of a two-phase submission.")]
pub enum BitfieldCommand {
	/// Pack claimed validator indices into the bitfield of the initial submission.
	Initial {
		/// Number of validators in the set.
		#[structopt(long)]
		length: u32,
		/// Indices of the claimed validators.
		#[structopt(required = true)]
		indices: Vec<u32>,
	},
	/// Derive the validators whose signatures the final submission has to prove.
	Final {
		/// Randomness committed to the ticket, decimal or `0x`-prefixed hex.
		#[structopt(long, parse(try_from_str = parse_u256))]
		seed: U256,
		/// Number of validators in the set.
		#[structopt(long)]
		length: u32,
		/// Number of validators to sample, the supermajority of `length` by default.
		#[structopt(long)]
		count: Option<u32>,
		/// Indices of the claimed validators.
		#[structopt(required = true)]
		indices: Vec<u32>,
	},
}

impl BitfieldCommand {
	pub fn run(self) -> anyhow::Result<()> {
		let bitfield = match self {
			Self::Initial { length, indices } => Bitfield::from_indices(indices, length)?,
			Self::Final {
				seed,
				length,
				count,
				indices,
			} => final_bitfield(seed, length, count, indices)?,
		};

		print_bitfield(&bitfield);
		Ok(())
	}
}

fn final_bitfield(seed: U256, length: u32, count: Option<u32>, indices: Vec<u32>) -> anyhow::Result<Bitfield> {
	let claimed = Bitfield::from_indices(indices, length)?;
	let count = count.unwrap_or_else(|| supermajority(length));

	Ok(claimed.derive_sample(seed, count)?)
}

fn print_bitfield(bitfield: &Bitfield) {
	println!("Length: {}", bitfield.length());
	println!("Set bits: {}", bitfield.count_set_bits());
	println!("Indices: {:?}", bitfield.set_bits().collect::<Vec<_>>());
	println!("Words:");
	for word in bitfield.words() {
		let mut bytes = [0_u8; 32];
		word.to_big_endian(&mut bytes);
		println!("\t{}", to_hex(bytes));
	}
	println!("Hash: {:?}", bitfield.hash());
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn final_bitfield_defaults_to_supermajority() {
		// given
		let indices = (0..10).collect::<Vec<_>>();

		// when
		let sample = final_bitfield(U256::from(3_u64), 10, None, indices.clone()).unwrap();

		// then
		assert_eq!(sample.count_set_bits(), 7);
		assert_eq!(
			sample,
			Bitfield::from_indices(indices.clone(), 10)
				.unwrap()
				.derive_sample(U256::from(3_u64), 7)
				.unwrap()
		);
		assert_eq!(final_bitfield(U256::from(3_u64), 10, Some(2), indices).unwrap().count_set_bits(), 2);
	}

	#[test]
	fn final_bitfield_errors() {
		assert!(final_bitfield(U256::zero(), 10, None, vec![0, 1]).is_err());
		assert!(final_bitfield(U256::zero(), 10, None, vec![10]).is_err());
	}
}
