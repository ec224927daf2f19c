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

use codec::Encode;
use log::{debug, info, trace, warn};

use beefy_primitives::{
	mmr::{verify_leaf_proof, MmrLeaf},
	supermajority, Bitfield, BlockNumber, Commitment, MmrRootHash, ValidatorProof, ValidatorSet, H256,
};

use crate::{BlockNumberProvider, ClientState, Config, Error, Event, RandomnessSource, Ticket, TicketStore};

/// Proof that an MMR leaf announcing the validator set after next is part of a commitment's MMR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverProof {
	/// The leaf.
	pub leaf: MmrLeaf,
	/// Simplified MMR proof items.
	pub items: Vec<H256>,
	/// For every item, whether it is the left operand.
	pub order: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signers {
	Current,
	Next,
}

/// Two-phase BEEFY light client.
///
/// Pending submissions live in the ticket store `S`, the block number and the randomness beacon
/// come from the host `H`. All operations either succeed completely or leave the client untouched.
pub struct BeefyClient<S, H> {
	config: Config,
	state: ClientState,
	tickets: S,
	host: H,
	events: Vec<Event>,
}

impl<S, H> BeefyClient<S, H>
where
	S: TicketStore,
	H: BlockNumberProvider + RandomnessSource,
{
	/// Return an uninitialized [`BeefyClient`].
	pub fn new(config: Config, tickets: S, host: H) -> Self {
		Self::from_state(config, ClientState::default(), tickets, host)
	}

	/// Return a [`BeefyClient`] continuing from a persisted state.
	pub fn from_state(config: Config, state: ClientState, tickets: S, host: H) -> Self {
		BeefyClient {
			config,
			state,
			tickets,
			host,
			events: Vec::new(),
		}
	}

	/// Set up the initial validator sets. Must be called exactly once.
	pub fn initialize(&mut self, current: ValidatorSet, next: ValidatorSet) -> Result<(), Error> {
		if self.state.initialized {
			return Err(rejected("initialize", Error::AlreadyInitialized));
		}

		if current.id.checked_add(1) != Some(next.id) {
			return Err(rejected(
				"initialize",
				Error::ValidatorSetIdMismatch {
					expected: current.id.saturating_add(1),
					got: next.id,
				},
			));
		}

		self.state.current_validator_set = current;
		self.state.next_validator_set = next;
		self.state.initialized = true;

		debug!(target: "beefy", "🥩 Initialized with validator sets {} and {}", current.id, next.id);

		Ok(())
	}

	/// Phase 1: claim `bitfield` of signers of `commitment_hash` in the current validator set,
	/// proving one signature.
	pub fn submit_initial(
		&mut self,
		commitment_hash: H256,
		bitfield: &Bitfield,
		proof: &ValidatorProof,
	) -> Result<(), Error> {
		self.create_ticket(commitment_hash, bitfield, proof, Signers::Current)
			.map_err(|err| rejected("submit_initial", err))
	}

	/// Phase 1 for a commitment signed by the next validator set.
	pub fn submit_initial_with_handover(
		&mut self,
		commitment_hash: H256,
		bitfield: &Bitfield,
		proof: &ValidatorProof,
	) -> Result<(), Error> {
		self.create_ticket(commitment_hash, bitfield, proof, Signers::Next)
			.map_err(|err| rejected("submit_initial_with_handover", err))
	}

	/// Phase 2: commit the host's randomness to the ticket of `commitment_hash`.
	///
	/// Calling this twice for the same ticket fails with [`Error::PrevRandaoAlreadyCaptured`].
	pub fn commit_prev_randao(&mut self, commitment_hash: H256) -> Result<(), Error> {
		self.capture_randomness(commitment_hash)
			.map_err(|err| rejected("commit_prev_randao", err))
	}

	/// Phase 3: finalize `commitment` with the signatures of the sampled validators.
	///
	/// `proofs` must hold exactly one proof per validator of the final bitfield (see
	/// [`Self::create_final_bitfield`]), ordered by validator index.
	pub fn submit_final(
		&mut self,
		commitment: &Commitment,
		bitfield: &Bitfield,
		proofs: &[ValidatorProof],
	) -> Result<(), Error> {
		self.finalize(commitment, bitfield, proofs, None)
			.map_err(|err| rejected("submit_final", err))
	}

	/// Phase 3 for a commitment signed by the next validator set, promoting it to the current
	/// one and taking the set announced by `handover.leaf` as next.
	pub fn submit_final_with_handover(
		&mut self,
		commitment: &Commitment,
		bitfield: &Bitfield,
		proofs: &[ValidatorProof],
		handover: &HandoverProof,
	) -> Result<(), Error> {
		self.finalize(commitment, bitfield, proofs, Some(handover))
			.map_err(|err| rejected("submit_final_with_handover", err))
	}

	/// Pack the indices of claimed signers into a bitfield for [`Self::submit_initial`].
	pub fn create_initial_bitfield<I>(indices: I, length: u32) -> Result<Bitfield, Error>
	where
		I: IntoIterator<Item = u32>,
	{
		Ok(Bitfield::from_indices(indices, length)?)
	}

	/// The validators whose proofs [`Self::submit_final`] expects for `commitment_hash`.
	pub fn create_final_bitfield(&self, commitment_hash: H256, bitfield: &Bitfield) -> Result<Bitfield, Error> {
		let ticket = self
			.tickets
			.get(&commitment_hash)
			.ok_or(Error::TicketNotFound(commitment_hash))?;

		final_bitfield(commitment_hash, &ticket, bitfield)
	}

	/// Remove the abandoned ticket of `commitment_hash`.
	///
	/// A ticket without committed randomness is abandoned once its randomness window has passed,
	/// one with committed randomness once the finalization window after that has passed too.
	pub fn discard_stale_ticket(&mut self, commitment_hash: H256) -> Result<(), Error> {
		let ticket = self
			.tickets
			.get(&commitment_hash)
			.ok_or(Error::TicketNotFound(commitment_hash))?;

		let expires_at = match ticket.prev_randao {
			Some(_) => self.config.ticket_expires_at(ticket.created_at),
			None => self.config.randao_expires_at(ticket.created_at),
		};
		if self.host.block_number() <= expires_at {
			return Err(Error::TicketNotExpired(commitment_hash));
		}

		self.tickets.remove(&commitment_hash);
		debug!(target: "beefy", "🥩 Discarded stale ticket for {:?} created at block {}", commitment_hash, ticket.created_at);

		Ok(())
	}

	/// Latest finalized MMR root.
	pub fn latest_mmr_root(&self) -> MmrRootHash {
		self.state.latest_mmr_root
	}

	/// Relay chain block of the latest finalized MMR root.
	pub fn latest_beefy_block(&self) -> BlockNumber {
		self.state.latest_beefy_block
	}

	/// The validator set currently signing commitments.
	pub fn current_validator_set(&self) -> ValidatorSet {
		self.state.current_validator_set
	}

	/// The validator set taking over at the next handover.
	pub fn next_validator_set(&self) -> ValidatorSet {
		self.state.next_validator_set
	}

	/// Pending ticket for `commitment_hash`.
	pub fn ticket(&self, commitment_hash: &H256) -> Option<Ticket> {
		self.tickets.get(commitment_hash)
	}

	/// The persistent client state.
	pub fn state(&self) -> &ClientState {
		&self.state
	}

	/// The timing parameters.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// The ticket store.
	pub fn ticket_store(&self) -> &S {
		&self.tickets
	}

	/// Events deposited so far.
	pub fn events(&self) -> &[Event] {
		&self.events
	}

	/// Drain the deposited events.
	pub fn take_events(&mut self) -> Vec<Event> {
		std::mem::take(&mut self.events)
	}

	fn ensure_initialized(&self) -> Result<(), Error> {
		if self.state.initialized {
			Ok(())
		} else {
			Err(Error::NotInitialized)
		}
	}

	fn signers(&self, signers: Signers) -> ValidatorSet {
		match signers {
			Signers::Current => self.state.current_validator_set,
			Signers::Next => self.state.next_validator_set,
		}
	}

	fn create_ticket(
		&mut self,
		commitment_hash: H256,
		bitfield: &Bitfield,
		proof: &ValidatorProof,
		signers: Signers,
	) -> Result<(), Error> {
		self.ensure_initialized()?;

		if self.tickets.get(&commitment_hash).is_some() {
			return Err(Error::TicketAlreadyExists(commitment_hash));
		}

		let set = self.signers(signers);
		if bitfield.length() != set.length {
			return Err(Error::InvalidBitfield);
		}

		let claims = bitfield.count_set_bits();
		if claims < set.supermajority() {
			return Err(Error::InsufficientClaims {
				got: claims,
				want: set.supermajority(),
			});
		}

		if !bitfield.is_set(proof.index) {
			return Err(Error::UnclaimedValidator(proof.index));
		}

		if !proof.signature.verify(&proof.account, &commitment_hash)
			|| !set.contains(proof.index, &proof.account, &proof.proof)
		{
			return Err(Error::InvalidProof(proof.index));
		}

		let ticket = Ticket {
			validator_set_id: set.id,
			validator_set_length: set.length,
			validator_set_root: set.root,
			bitfield_hash: bitfield.hash(),
			created_at: self.host.block_number(),
			prev_randao: None,
		};
		self.tickets.insert(commitment_hash, ticket);

		debug!(
			target: "beefy",
			"🥩 Ticket for {:?} created at block {} with {} of {} validators claimed",
			commitment_hash,
			ticket.created_at,
			claims,
			set.length
		);

		Ok(())
	}

	fn capture_randomness(&mut self, commitment_hash: H256) -> Result<(), Error> {
		self.ensure_initialized()?;

		let mut ticket = self
			.tickets
			.get(&commitment_hash)
			.ok_or(Error::TicketNotFound(commitment_hash))?;

		if ticket.prev_randao.is_some() {
			return Err(Error::PrevRandaoAlreadyCaptured(commitment_hash));
		}

		let now = self.host.block_number();
		let ready_at = self.config.randao_ready_at(ticket.created_at);
		if now < ready_at {
			return Err(Error::TooEarly { now, ready_at });
		}

		let expired_at = self.config.randao_expires_at(ticket.created_at);
		if now > expired_at {
			return Err(Error::TicketExpired { now, expired_at });
		}

		ticket.prev_randao = Some(self.host.prev_randao());
		self.tickets.insert(commitment_hash, ticket);

		debug!(target: "beefy", "🥩 Randomness committed for {:?} at block {}", commitment_hash, now);

		Ok(())
	}

	fn finalize(
		&mut self,
		commitment: &Commitment,
		bitfield: &Bitfield,
		proofs: &[ValidatorProof],
		handover: Option<&HandoverProof>,
	) -> Result<(), Error> {
		self.ensure_initialized()?;

		let commitment_hash = commitment.hash();
		let ticket = self
			.tickets
			.get(&commitment_hash)
			.ok_or(Error::PrevRandaoNotCaptured(commitment_hash))?;

		let final_bitfield = final_bitfield(commitment_hash, &ticket, bitfield)?;

		if commitment.validator_set_id != ticket.validator_set_id {
			return Err(Error::ValidatorSetIdMismatch {
				expected: ticket.validator_set_id,
				got: commitment.validator_set_id,
			});
		}

		let signers = self.signers(if handover.is_some() { Signers::Next } else { Signers::Current });
		if ticket.validator_set_id != signers.id {
			return Err(Error::ValidatorSetIdMismatch {
				expected: signers.id,
				got: ticket.validator_set_id,
			});
		}

		if commitment.block_number <= self.state.latest_beefy_block {
			return Err(Error::StaleCommitment {
				got: commitment.block_number,
				best_known: self.state.latest_beefy_block,
			});
		}

		// the set as it was when the claim was made
		let set = ValidatorSet {
			id: ticket.validator_set_id,
			root: ticket.validator_set_root,
			length: ticket.validator_set_length,
		};
		verify_sampled_proofs(&commitment_hash, &set, &final_bitfield, proofs)?;

		let next = match handover {
			Some(handover) => Some(self.verify_handover(commitment, handover)?),
			None => None,
		};

		self.state.latest_mmr_root = commitment.payload.mmr_root_hash;
		self.state.latest_beefy_block = commitment.block_number;
		if let Some(next) = next {
			self.state.current_validator_set = self.state.next_validator_set;
			self.state.next_validator_set = next;

			info!(
				target: "beefy",
				"🥩 Validator set handover: current {}, next {} with {} validators",
				self.state.current_validator_set.id,
				next.id,
				next.length
			);
		}
		self.tickets.remove(&commitment_hash);
		self.events.push(Event::NewFinalityRoot {
			mmr_root: commitment.payload.mmr_root_hash,
			block_number: commitment.block_number,
		});

		debug!(
			target: "beefy",
			"🥩 Finalized block {} with MMR root {:?}",
			commitment.block_number,
			commitment.payload.mmr_root_hash
		);

		Ok(())
	}

	fn verify_handover(&self, commitment: &Commitment, handover: &HandoverProof) -> Result<ValidatorSet, Error> {
		let announced = handover.leaf.next_authority_set;
		let expected = self.state.next_validator_set.id.saturating_add(1);
		if announced.id != expected {
			return Err(Error::InvalidMmrLeaf {
				expected,
				got: announced.id,
			});
		}

		if !verify_leaf_proof(
			&commitment.payload.mmr_root_hash,
			&handover.leaf.encode(),
			&handover.items,
			&handover.order,
		) {
			return Err(Error::MmrProofInvalid);
		}

		Ok(announced.into())
	}
}

fn rejected(operation: &str, err: Error) -> Error {
	warn!(target: "beefy", "🥩 {} rejected: {}", operation, err);
	err
}

fn final_bitfield(commitment_hash: H256, ticket: &Ticket, bitfield: &Bitfield) -> Result<Bitfield, Error> {
	let seed = ticket
		.prev_randao
		.ok_or(Error::PrevRandaoNotCaptured(commitment_hash))?;

	if bitfield.length() != ticket.validator_set_length || bitfield.hash() != ticket.bitfield_hash {
		return Err(Error::InvalidBitfield);
	}

	Ok(bitfield.derive_sample(seed, supermajority(ticket.validator_set_length))?)
}

fn verify_sampled_proofs(
	commitment_hash: &H256,
	set: &ValidatorSet,
	sample: &Bitfield,
	proofs: &[ValidatorProof],
) -> Result<(), Error> {
	let want = sample.count_set_bits() as usize;
	if proofs.len() != want {
		return Err(Error::ProofCountMismatch {
			got: proofs.len(),
			want,
		});
	}

	for (position, (proof, index)) in proofs.iter().zip(sample.set_bits()).enumerate() {
		if proof.index != index {
			return Err(Error::ProofOrderMismatch {
				position,
				got: proof.index,
				want: index,
			});
		}
	}

	for proof in proofs {
		if !proof.signature.verify(&proof.account, commitment_hash) {
			return Err(Error::InvalidSignature(proof.index));
		}

		if !set.contains(proof.index, &proof.account, &proof.proof) {
			return Err(Error::InvalidMembership(proof.index));
		}

		trace!(target: "beefy", "🥩 Verified signature of validator {} ({:?})", proof.index, proof.account);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use std::{cell::Cell, rc::Rc};

	use beefy_primitives::{Address, Payload, Signature, U256};

	use super::*;
	use crate::MemoryTicketStore;

	#[derive(Default)]
	struct TestHost {
		block: Cell<u64>,
		randao: Cell<u64>,
	}

	impl BlockNumberProvider for TestHost {
		fn block_number(&self) -> u64 {
			self.block.get()
		}
	}

	impl RandomnessSource for TestHost {
		fn prev_randao(&self) -> U256 {
			U256::from(self.randao.get())
		}
	}

	type TestClient = BeefyClient<MemoryTicketStore, Rc<TestHost>>;

	fn validator_set(id: u64) -> ValidatorSet {
		ValidatorSet {
			id,
			root: H256::repeat_byte(id as u8),
			length: 4,
		}
	}

	fn client() -> (TestClient, Rc<TestHost>) {
		let host = Rc::new(TestHost::default());
		let mut client = BeefyClient::new(Config::default(), MemoryTicketStore::new(), host.clone());
		client.initialize(validator_set(0), validator_set(1)).unwrap();
		(client, host)
	}

	fn ticket(created_at: u64, bitfield: &Bitfield) -> Ticket {
		Ticket {
			validator_set_id: 0,
			validator_set_length: 4,
			validator_set_root: H256::repeat_byte(0),
			bitfield_hash: bitfield.hash(),
			created_at,
			prev_randao: None,
		}
	}

	fn dummy_proof(index: u32) -> ValidatorProof {
		ValidatorProof {
			signature: Signature([0; 65]),
			index,
			account: Address::zero(),
			proof: vec![],
		}
	}

	#[test]
	fn operations_require_initialization() {
		// given
		let host = Rc::new(TestHost::default());
		let mut client: TestClient = BeefyClient::new(Config::default(), MemoryTicketStore::new(), host);
		let bitfield = Bitfield::from_indices(0..4, 4).unwrap();

		// then
		assert_eq!(
			client.submit_initial(H256::zero(), &bitfield, &dummy_proof(0)),
			Err(Error::NotInitialized)
		);
		assert_eq!(client.commit_prev_randao(H256::zero()), Err(Error::NotInitialized));
		assert_eq!(
			client.submit_final(&Commitment::default(), &bitfield, &[]),
			Err(Error::NotInitialized)
		);
	}

	#[test]
	fn initialize_once_with_consecutive_ids() {
		// given
		let host = Rc::new(TestHost::default());
		let mut client: TestClient = BeefyClient::new(Config::default(), MemoryTicketStore::new(), host);

		// then
		assert_eq!(
			client.initialize(validator_set(0), validator_set(2)),
			Err(Error::ValidatorSetIdMismatch { expected: 1, got: 2 })
		);
		assert!(!client.state().initialized);

		assert_eq!(client.initialize(validator_set(5), validator_set(6)), Ok(()));
		assert_eq!(client.current_validator_set(), validator_set(5));
		assert_eq!(client.next_validator_set(), validator_set(6));

		assert_eq!(
			client.initialize(validator_set(6), validator_set(7)),
			Err(Error::AlreadyInitialized)
		);
		assert_eq!(client.current_validator_set(), validator_set(5));
	}

	#[test]
	fn submit_initial_preconditions() {
		// given
		let (mut client, _) = client();
		let hash = H256::repeat_byte(7);

		// wrong length
		let bitfield = Bitfield::from_indices(0..4, 5).unwrap();
		assert_eq!(
			client.submit_initial(hash, &bitfield, &dummy_proof(0)),
			Err(Error::InvalidBitfield)
		);

		// supermajority of 4 is 3
		let bitfield = Bitfield::from_indices(vec![0, 1], 4).unwrap();
		assert_eq!(
			client.submit_initial(hash, &bitfield, &dummy_proof(0)),
			Err(Error::InsufficientClaims { got: 2, want: 3 })
		);

		let bitfield = Bitfield::from_indices(vec![0, 1, 2], 4).unwrap();
		assert_eq!(
			client.submit_initial(hash, &bitfield, &dummy_proof(3)),
			Err(Error::UnclaimedValidator(3))
		);
		assert_eq!(
			client.submit_initial(hash, &bitfield, &dummy_proof(1)),
			Err(Error::InvalidProof(1))
		);

		// then
		assert!(client.ticket_store().is_empty());
	}

	#[test]
	fn submit_initial_rejects_pending_commitment() {
		// given
		let (mut client, _) = client();
		let hash = H256::repeat_byte(7);
		let bitfield = Bitfield::from_indices(0..4, 4).unwrap();
		client.tickets.insert(hash, ticket(0, &bitfield));

		// then
		assert_eq!(
			client.submit_initial(hash, &bitfield, &dummy_proof(0)),
			Err(Error::TicketAlreadyExists(hash))
		);
	}

	#[test]
	fn commit_prev_randao_window() {
		// given
		let (mut client, host) = client();
		let hash = H256::repeat_byte(7);
		let bitfield = Bitfield::from_indices(0..4, 4).unwrap();
		client.tickets.insert(hash, ticket(10, &bitfield));
		host.randao.set(99);

		// then
		assert_eq!(
			client.commit_prev_randao(H256::repeat_byte(8)),
			Err(Error::TicketNotFound(H256::repeat_byte(8)))
		);

		host.block.set(137);
		assert_eq!(
			client.commit_prev_randao(hash),
			Err(Error::TooEarly { now: 137, ready_at: 138 })
		);

		host.block.set(163);
		assert_eq!(
			client.commit_prev_randao(hash),
			Err(Error::TicketExpired { now: 163, expired_at: 162 })
		);
		assert_eq!(client.ticket(&hash).unwrap().prev_randao, None);

		host.block.set(162);
		assert_eq!(client.commit_prev_randao(hash), Ok(()));
		assert_eq!(client.ticket(&hash).unwrap().prev_randao, Some(U256::from(99_u64)));

		host.randao.set(100);
		assert_eq!(
			client.commit_prev_randao(hash),
			Err(Error::PrevRandaoAlreadyCaptured(hash))
		);
		assert_eq!(client.ticket(&hash).unwrap().prev_randao, Some(U256::from(99_u64)));
	}

	#[test]
	fn submit_final_without_ticket() {
		// given
		let (mut client, _) = client();
		let commitment = Commitment {
			payload: Payload::default(),
			block_number: 1,
			validator_set_id: 0,
		};
		let bitfield = Bitfield::from_indices(0..4, 4).unwrap();

		// then
		assert_eq!(
			client.submit_final(&commitment, &bitfield, &[]),
			Err(Error::PrevRandaoNotCaptured(commitment.hash()))
		);

		// when the ticket exists but randomness wasn't committed
		client.tickets.insert(commitment.hash(), ticket(0, &bitfield));

		// then
		assert_eq!(
			client.submit_final(&commitment, &bitfield, &[]),
			Err(Error::PrevRandaoNotCaptured(commitment.hash()))
		);
	}

	#[test]
	fn final_bitfield_is_bound_to_the_claim() {
		// given
		let (mut client, _) = client();
		let hash = H256::repeat_byte(7);
		let claimed = Bitfield::from_indices(0..4, 4).unwrap();
		let mut ticket = ticket(0, &claimed);
		ticket.prev_randao = Some(U256::from(5_u64));
		client.tickets.insert(hash, ticket);

		// when
		let sample = client.create_final_bitfield(hash, &claimed).unwrap();

		// then
		assert_eq!(sample.count_set_bits(), 3);
		assert!(sample.is_subset_of(&claimed));
		assert_eq!(sample, claimed.derive_sample(U256::from(5_u64), 3).unwrap());

		let other = Bitfield::from_indices(0..3, 4).unwrap();
		assert_eq!(client.create_final_bitfield(hash, &other), Err(Error::InvalidBitfield));
		assert_eq!(
			client.create_final_bitfield(H256::zero(), &claimed),
			Err(Error::TicketNotFound(H256::zero()))
		);
	}

	#[test]
	fn create_initial_bitfield_checks_range() {
		assert_eq!(
			TestClient::create_initial_bitfield(vec![0, 2], 3).map(|b| b.count_set_bits()),
			Ok(2)
		);
		assert_eq!(
			TestClient::create_initial_bitfield(vec![3], 3),
			Err(Error::Bitfield(beefy_primitives::BitfieldError::IndexOutOfRange {
				index: 3,
				length: 3
			}))
		);
	}

	#[test]
	fn discard_stale_ticket() {
		// given
		let (mut client, host) = client();
		let hash = H256::repeat_byte(7);
		let bitfield = Bitfield::from_indices(0..4, 4).unwrap();
		client.tickets.insert(hash, ticket(10, &bitfield));

		// then
		host.block.set(162);
		assert_eq!(client.discard_stale_ticket(hash), Err(Error::TicketNotExpired(hash)));

		host.block.set(163);
		assert_eq!(client.discard_stale_ticket(hash), Ok(()));
		assert!(client.ticket(&hash).is_none());
		assert_eq!(client.discard_stale_ticket(hash), Err(Error::TicketNotFound(hash)));
	}

	#[test]
	fn captured_ticket_is_kept_for_finalization_window() {
		// given
		let (mut client, host) = client();
		let hash = H256::repeat_byte(7);
		let bitfield = Bitfield::from_indices(0..4, 4).unwrap();
		let mut ticket = ticket(10, &bitfield);
		ticket.prev_randao = Some(U256::one());
		client.tickets.insert(hash, ticket);

		// then
		host.block.set(163);
		assert_eq!(client.discard_stale_ticket(hash), Err(Error::TicketNotExpired(hash)));

		host.block.set(418);
		assert_eq!(client.discard_stale_ticket(hash), Err(Error::TicketNotExpired(hash)));

		host.block.set(419);
		assert_eq!(client.discard_stale_ticket(hash), Ok(()));
		assert!(client.ticket(&hash).is_none());
	}
}
