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

mod authority_address;
mod bitfield;
mod commitment;
mod merkle_tree;
mod mmr;
mod utils;

use structopt::StructOpt;

/// BEEFY light client utilities.
#[derive(StructOpt)]
#[structopt(about = "BEEFY light client utilities")]
pub enum Command {
	AuthorityAddress(authority_address::AuthorityAddress),
	ValidatorMerkleTree(merkle_tree::ValidatorMerkleTree),
	Mmr(mmr::Mmr),
	Commitment(commitment::CommitmentCommand),
	Bitfield(bitfield::BitfieldCommand),
}

impl Command {
	/// Execute the command.
	pub fn run(self) -> anyhow::Result<()> {
		match self {
			Self::AuthorityAddress(cmd) => cmd.run(),
			Self::ValidatorMerkleTree(cmd) => cmd.run(),
			Self::Mmr(cmd) => cmd.run(),
			Self::Commitment(cmd) => cmd.run(),
			Self::Bitfield(cmd) => cmd.run(),
		}
	}
}

/// Parse CLI args.
pub fn parse_args() -> Command {
	Command::from_args()
}
