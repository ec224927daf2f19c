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

use beefy_primitives::{Commitment, Payload, H256};
use parity_scale_codec::Encode;
use structopt::StructOpt;

use crate::cli::utils::{parse_h256, to_hex, Bytes};

/// Commitment related commands.
#[derive(StructOpt)]
#[structopt(about = "Encode or hash a BEEFY commitment.")]
pub enum CommitmentCommand {
	/// Print the SCALE encoding of a commitment.
	Encode(CommitmentArgs),
	/// Print the keccak-256 hash validators sign.
	Hash(CommitmentArgs),
}

/// Commitment fields.
#[derive(StructOpt)]
pub struct CommitmentArgs {
	/// Block number of the commitment.
	#[structopt(long)]
	block_number: u32,
	/// Id of the signing validator set.
	#[structopt(long)]
	validator_set_id: u64,
	/// MMR root hash in the payload.
	#[structopt(long, parse(try_from_str = parse_h256))]
	mmr_root: H256,
	/// Encoded payload bytes preceding the MMR root.
	#[structopt(long, default_value = "0x")]
	prefix: Bytes,
	/// Encoded payload bytes following the MMR root.
	#[structopt(long, default_value = "0x")]
	suffix: Bytes,
}

impl From<CommitmentArgs> for Commitment {
	fn from(args: CommitmentArgs) -> Self {
		Commitment {
			payload: Payload {
				mmr_root_hash: args.mmr_root,
				prefix: args.prefix.0,
				suffix: args.suffix.0,
			},
			block_number: args.block_number,
			validator_set_id: args.validator_set_id,
		}
	}
}

impl CommitmentCommand {
	pub fn run(self) -> anyhow::Result<()> {
		match self {
			Self::Encode(args) => println!("{}", to_hex(Commitment::from(args).encode())),
			Self::Hash(args) => println!("{:?}", Commitment::from(args).hash()),
		}
		Ok(())
	}
}
