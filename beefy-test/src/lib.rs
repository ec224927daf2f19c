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

#![warn(missing_docs)]

//! Test support for the BEEFY light client.
//!
//! Everything here is deterministic: validator keys are derived from seeds, randomness comes from
//! seeded generators and the host is a mock whose block number and beacon are set by the test.

mod host;
mod keyring;
mod mmr;
mod validators;

pub use host::MockHost;
pub use keyring::Keyring;
pub use mmr::TestMmr;
pub use validators::{TestValidatorSet, TestValidatorSetBuilder};

use codec::{Compact, Encode};

use beefy_primitives::{commitment::MMR_ROOT_ID, Commitment, Payload, ValidatorSetId, H256};

/// A commitment to `mmr_root` at `block_number`, with the payload wrapped the way the relay chain
/// does it: a list holding the single MMR root item.
pub fn commitment(block_number: u32, validator_set_id: ValidatorSetId, mmr_root: H256) -> Commitment {
	let mut prefix = Compact(1_u32).encode();
	prefix.extend_from_slice(&MMR_ROOT_ID);
	prefix.extend(Compact(32_u32).encode());

	Commitment {
		payload: Payload {
			mmr_root_hash: mmr_root,
			prefix,
			suffix: vec![],
		},
		block_number,
		validator_set_id,
	}
}

/// Initialize logging for tests.
pub fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}
