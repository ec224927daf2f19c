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

use log::trace;
use parking_lot::Mutex;

use beefy_light_client::{BlockNumberProvider, RandomnessSource};
use beefy_primitives::U256;

#[derive(Debug, Default)]
struct State {
	block_number: u64,
	randao: U256,
	randao_reads: Vec<u64>,
}

/// A host whose block number and randomness beacon are set by the test.
///
/// Every read of the beacon is recorded with the block number it happened at, so tests can
/// check when the light client looked at the randomness.
#[derive(Debug, Default)]
pub struct MockHost {
	state: Mutex<State>,
}

impl MockHost {
	/// A host at `block_number` with zero randomness.
	pub fn new(block_number: u64) -> Self {
		MockHost {
			state: Mutex::new(State {
				block_number,
				..Default::default()
			}),
		}
	}

	/// Jump to `block_number`.
	pub fn set_block_number(&self, block_number: u64) {
		self.state.lock().block_number = block_number;
	}

	/// Move `blocks` blocks ahead.
	pub fn advance(&self, blocks: u64) {
		let mut state = self.state.lock();
		state.block_number += blocks;
	}

	/// Set the value returned by the beacon.
	pub fn set_randao(&self, randao: U256) {
		self.state.lock().randao = randao;
	}

	/// Block numbers at which the beacon was read.
	pub fn randao_reads(&self) -> Vec<u64> {
		self.state.lock().randao_reads.clone()
	}
}

impl BlockNumberProvider for MockHost {
	fn block_number(&self) -> u64 {
		self.state.lock().block_number
	}
}

impl RandomnessSource for MockHost {
	fn prev_randao(&self) -> U256 {
		let mut state = self.state.lock();
		let block_number = state.block_number;
		state.randao_reads.push(block_number);
		trace!(target: "beefy", "🥩 Randomness read at block {}", block_number);
		state.randao
	}
}
