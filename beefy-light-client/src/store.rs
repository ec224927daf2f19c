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

//! Storage of pending submissions.

use std::collections::BTreeMap;

use codec::{Decode, Encode};
use log::warn;

use beefy_primitives::{ValidatorSetId, H256, U256};

/// A pending two-phase submission, keyed by commitment hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Ticket {
	/// Id of the validator set the claim was made against.
	pub validator_set_id: ValidatorSetId,
	/// Length of that validator set.
	pub validator_set_length: u32,
	/// Root of that validator set, used to check the final proofs.
	pub validator_set_root: H256,
	/// Hash of the claimed bitfield, see [`beefy_primitives::Bitfield::hash`].
	pub bitfield_hash: H256,
	/// Block the ticket was created in.
	pub created_at: u64,
	/// Randomness committed to the ticket, if any yet.
	pub prev_randao: Option<U256>,
}

/// Key-value storage of [`Ticket`]s.
pub trait TicketStore {
	/// Ticket stored for `commitment_hash`.
	fn get(&self, commitment_hash: &H256) -> Option<Ticket>;

	/// Store `ticket`, replacing a previous one for the same hash.
	fn insert(&mut self, commitment_hash: H256, ticket: Ticket);

	/// Remove and return the ticket for `commitment_hash`.
	fn remove(&mut self, commitment_hash: &H256) -> Option<Ticket>;

	/// Number of stored tickets.
	fn len(&self) -> usize;

	/// Whether there are no stored tickets.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// In-memory [`TicketStore`].
///
/// Without a capacity the store grows without bound, like contract storage does. With a capacity,
/// inserting a new ticket into a full store evicts the ticket created first.
#[derive(Debug, Default, Clone)]
pub struct MemoryTicketStore {
	tickets: BTreeMap<H256, Ticket>,
	capacity: Option<usize>,
}

impl MemoryTicketStore {
	/// An unbounded store.
	pub fn new() -> Self {
		Self::default()
	}

	/// A store holding at most `capacity` tickets (at least one).
	pub fn with_capacity(capacity: usize) -> Self {
		MemoryTicketStore {
			tickets: BTreeMap::new(),
			capacity: Some(capacity.max(1)),
		}
	}

	/// Maximum number of tickets, `None` if unbounded.
	pub fn capacity(&self) -> Option<usize> {
		self.capacity
	}

	/// Iterate over all stored tickets, ordered by commitment hash.
	pub fn iter(&self) -> impl Iterator<Item = (&H256, &Ticket)> {
		self.tickets.iter()
	}

	fn evict_oldest(&mut self) {
		let oldest = self
			.tickets
			.iter()
			.min_by_key(|(_, ticket)| ticket.created_at)
			.map(|(hash, _)| *hash);

		if let Some(hash) = oldest {
			if let Some(ticket) = self.tickets.remove(&hash) {
				warn!(
					target: "beefy",
					"🥩 Ticket store full, evicted ticket for {:?} created at block {}",
					hash,
					ticket.created_at
				);
			}
		}
	}
}

impl TicketStore for MemoryTicketStore {
	fn get(&self, commitment_hash: &H256) -> Option<Ticket> {
		self.tickets.get(commitment_hash).copied()
	}

	fn insert(&mut self, commitment_hash: H256, ticket: Ticket) {
		if let Some(capacity) = self.capacity {
			if !self.tickets.contains_key(&commitment_hash) && self.tickets.len() >= capacity {
				self.evict_oldest();
			}
		}

		self.tickets.insert(commitment_hash, ticket);
	}

	fn remove(&mut self, commitment_hash: &H256) -> Option<Ticket> {
		self.tickets.remove(commitment_hash)
	}

	fn len(&self) -> usize {
		self.tickets.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ticket(created_at: u64) -> Ticket {
		Ticket {
			validator_set_id: 0,
			validator_set_length: 3,
			validator_set_root: H256::repeat_byte(1),
			bitfield_hash: H256::repeat_byte(2),
			created_at,
			prev_randao: None,
		}
	}

	#[test]
	fn unbounded_store() {
		// given
		let mut store = MemoryTicketStore::new();

		// when
		for i in 0..100_u64 {
			store.insert(H256::from_low_u64_be(i), ticket(i));
		}

		// then
		assert_eq!(store.len(), 100);
		assert_eq!(store.capacity(), None);
		assert_eq!(store.get(&H256::from_low_u64_be(7)), Some(ticket(7)));
		assert_eq!(store.remove(&H256::from_low_u64_be(7)), Some(ticket(7)));
		assert_eq!(store.get(&H256::from_low_u64_be(7)), None);
		assert_eq!(store.len(), 99);
	}

	#[test]
	fn bounded_store_evicts_oldest() {
		// given
		let mut store = MemoryTicketStore::with_capacity(2);
		let (a, b, c) = (H256::repeat_byte(0xa), H256::repeat_byte(0xb), H256::repeat_byte(0xc));
		store.insert(a, ticket(20));
		store.insert(b, ticket(10));

		// when
		store.insert(c, ticket(30));

		// then
		assert_eq!(store.len(), 2);
		assert!(store.get(&b).is_none());
		assert!(store.get(&a).is_some());
		assert!(store.get(&c).is_some());
	}

	#[test]
	fn replacing_does_not_evict() {
		// given
		let mut store = MemoryTicketStore::with_capacity(2);
		let (a, b) = (H256::repeat_byte(0xa), H256::repeat_byte(0xb));
		store.insert(a, ticket(1));
		store.insert(b, ticket(2));

		// when
		let mut updated = ticket(1);
		updated.prev_randao = Some(U256::from(42_u64));
		store.insert(a, updated);

		// then
		assert_eq!(store.len(), 2);
		assert_eq!(store.get(&a), Some(updated));
		assert_eq!(store.get(&b), Some(ticket(2)));
	}

	#[test]
	fn zero_capacity_still_holds_one_ticket() {
		let mut store = MemoryTicketStore::with_capacity(0);

		store.insert(H256::repeat_byte(1), ticket(1));
		store.insert(H256::repeat_byte(2), ticket(2));

		assert_eq!(store.capacity(), Some(1));
		assert_eq!(store.iter().map(|(hash, _)| *hash).collect::<Vec<_>>(), vec![H256::repeat_byte(2)]);
	}

	#[test]
	fn ticket_encoding_roundtrip() {
		let mut ticket = ticket(5);
		ticket.prev_randao = Some(U256::MAX);

		let encoded = ticket.encode();

		assert_eq!(Ticket::decode(&mut &*encoded), Ok(ticket));
	}
}
