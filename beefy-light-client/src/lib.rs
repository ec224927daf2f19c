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

//! A BEEFY light client verifying relay chain finality by signature sampling.
//!
//! Checking every validator signature of a commitment is too expensive for a smart-contract
//! chain. Instead, a relayer goes through three phases with the [`BeefyClient`]:
//!
//! 1. [`BeefyClient::submit_initial`] claims a supermajority of signers with a bitfield and proves
//!    a single signature. A [`Ticket`] is created for the commitment hash.
//! 2. After [`Config::randao_commit_delay`] blocks, [`BeefyClient::commit_prev_randao`] binds the
//!    host's randomness beacon to the ticket. The relayer could not have known that value when it
//!    made its claim.
//! 3. [`BeefyClient::submit_final`] proves the signatures of a random sample of the claimed
//!    signers, derived from the committed randomness, and finalizes the commitment's MMR root.
//!
//! The `_with_handover` variants of phases 1 and 3 work against the next validator set and rotate
//! the validator sets using an MMR leaf proof.

use codec::{Decode, Encode};

use beefy_primitives::{BlockNumber, MmrRootHash, ValidatorSet};

mod client;
mod error;
mod host;
mod store;

pub use client::{BeefyClient, HandoverProof};
pub use error::{Error, ErrorKind};
pub use host::{BlockNumberProvider, RandomnessSource};
pub use store::{MemoryTicketStore, Ticket, TicketStore};

/// Default minimum number of blocks between ticket creation and randomness commitment.
pub const RANDAO_COMMIT_DELAY: u64 = 128;

/// Default number of blocks after the delay during which randomness can still be committed.
pub const RANDAO_COMMIT_EXPIRATION: u64 = 24;

/// Default number of blocks after the randomness window during which a ticket with committed
/// randomness is kept for [`BeefyClient::submit_final`].
pub const TICKET_FINALIZATION_WINDOW: u64 = 256;

/// Light client timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// Minimum number of blocks between [`BeefyClient::submit_initial`] and
	/// [`BeefyClient::commit_prev_randao`].
	pub randao_commit_delay: u64,
	/// Number of blocks after the delay in which randomness can still be committed.
	pub randao_commit_expiration: u64,
	/// Number of blocks after the randomness window before a ticket with committed randomness
	/// may be discarded.
	pub ticket_finalization_window: u64,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			randao_commit_delay: RANDAO_COMMIT_DELAY,
			randao_commit_expiration: RANDAO_COMMIT_EXPIRATION,
			ticket_finalization_window: TICKET_FINALIZATION_WINDOW,
		}
	}
}

impl Config {
	/// Set the randomness commitment delay.
	pub fn with_randao_commit_delay(mut self, delay: u64) -> Self {
		self.randao_commit_delay = delay;
		self
	}

	/// Set the randomness commitment expiration.
	pub fn with_randao_commit_expiration(mut self, expiration: u64) -> Self {
		self.randao_commit_expiration = expiration;
		self
	}

	/// Set the finalization window of tickets with committed randomness.
	pub fn with_ticket_finalization_window(mut self, window: u64) -> Self {
		self.ticket_finalization_window = window;
		self
	}

	/// First block in which randomness may be committed for a ticket created at `created_at`.
	pub fn randao_ready_at(&self, created_at: u64) -> u64 {
		created_at.saturating_add(self.randao_commit_delay)
	}

	/// Last block in which randomness may be committed for a ticket created at `created_at`.
	pub fn randao_expires_at(&self, created_at: u64) -> u64 {
		self.randao_ready_at(created_at).saturating_add(self.randao_commit_expiration)
	}

	/// Last block in which a ticket created at `created_at` is kept once randomness was committed.
	pub fn ticket_expires_at(&self, created_at: u64) -> u64 {
		self.randao_expires_at(created_at).saturating_add(self.ticket_finalization_window)
	}
}

/// Events deposited by the light client.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Event {
	/// A commitment was finalized.
	NewFinalityRoot {
		/// The finalized MMR root.
		mmr_root: MmrRootHash,
		/// The relay chain block it was committed at.
		block_number: BlockNumber,
	},
}

/// Persistent light client state, apart from pending tickets.
#[derive(Debug, Default, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ClientState {
	/// Whether [`BeefyClient::initialize`] was called.
	pub initialized: bool,
	/// The validator set currently signing commitments.
	pub current_validator_set: ValidatorSet,
	/// The validator set taking over at the next handover.
	pub next_validator_set: ValidatorSet,
	/// Latest finalized MMR root.
	pub latest_mmr_root: MmrRootHash,
	/// Relay chain block of [`ClientState::latest_mmr_root`].
	pub latest_beefy_block: BlockNumber,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn config_defaults_and_setters() {
		// given
		let config = Config::default();

		// then
		assert_eq!(config.randao_commit_delay, 128);
		assert_eq!(config.randao_commit_expiration, 24);
		assert_eq!(config.randao_ready_at(10), 138);
		assert_eq!(config.randao_expires_at(10), 162);
		assert_eq!(config.ticket_expires_at(10), 418);

		// when
		let config = config
			.with_randao_commit_delay(3)
			.with_randao_commit_expiration(0)
			.with_ticket_finalization_window(5);

		// then
		assert_eq!(config.randao_ready_at(10), 13);
		assert_eq!(config.randao_expires_at(10), 13);
		assert_eq!(config.randao_expires_at(u64::MAX), u64::MAX);
		assert_eq!(config.ticket_expires_at(10), 18);
		assert_eq!(config.ticket_expires_at(u64::MAX), u64::MAX);
	}

	#[test]
	fn client_state_roundtrip() {
		let state = ClientState {
			initialized: true,
			current_validator_set: ValidatorSet {
				id: 3,
				root: MmrRootHash::repeat_byte(1),
				length: 300,
			},
			next_validator_set: ValidatorSet {
				id: 4,
				root: MmrRootHash::repeat_byte(2),
				length: 301,
			},
			latest_mmr_root: MmrRootHash::repeat_byte(3),
			latest_beefy_block: 42,
		};

		let encoded = state.encode();

		assert_eq!(ClientState::decode(&mut &*encoded), Ok(state));
	}
}
