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

use beefy_primitives::{BitfieldError, BlockNumber, ValidatorSetId, H256};

/// Coarse classification of an [`Error`], telling a relayer how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum ErrorKind {
	/// Malformed or insufficient input, fixable by the caller.
	Precondition,
	/// A signature or merkle proof didn't verify.
	Cryptographic,
	/// A protocol phase was skipped, repeated or called at the wrong time.
	Timing,
	/// Validator set handover failed. The validator sets are left untouched.
	Handover,
}

/// Light client errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("light client is not initialized")]
	NotInitialized,
	#[error("light client is already initialized")]
	AlreadyInitialized,
	#[error("a ticket for commitment {0:?} already exists")]
	TicketAlreadyExists(H256),
	#[error("{got} validators claimed, {want} required")]
	InsufficientClaims { got: u32, want: u32 },
	#[error("validator {0} is not part of the claimed bitfield")]
	UnclaimedValidator(u32),
	#[error("claimed bitfield does not match the ticket or the validator set")]
	InvalidBitfield,
	#[error(transparent)]
	Bitfield(#[from] BitfieldError),
	#[error("{got} validator proofs submitted, {want} required")]
	ProofCountMismatch { got: usize, want: usize },
	#[error("validator proof at position {position} is for validator {got}, expected {want}")]
	ProofOrderMismatch { position: usize, got: u32, want: u32 },
	#[error("invalid signature or membership proof of validator {0}")]
	InvalidProof(u32),
	#[error("invalid signature of validator {0}")]
	InvalidSignature(u32),
	#[error("invalid membership proof of validator {0}")]
	InvalidMembership(u32),
	#[error("no ticket for commitment {0:?}")]
	TicketNotFound(H256),
	#[error("randomness can be committed from block {ready_at}, now is {now}")]
	TooEarly { now: u64, ready_at: u64 },
	#[error("randomness window closed at block {expired_at}, now is {now}")]
	TicketExpired { now: u64, expired_at: u64 },
	#[error("ticket for commitment {0:?} is still within its randomness window")]
	TicketNotExpired(H256),
	#[error("randomness for commitment {0:?} was already committed")]
	PrevRandaoAlreadyCaptured(H256),
	#[error("no randomness committed for commitment {0:?}")]
	PrevRandaoNotCaptured(H256),
	#[error("commitment for block {got} is stale, best known block is {best_known}")]
	StaleCommitment { got: BlockNumber, best_known: BlockNumber },
	#[error("unexpected validator set id {got}, expected {expected}")]
	ValidatorSetIdMismatch { expected: ValidatorSetId, got: ValidatorSetId },
	#[error("MMR leaf announces validator set {got}, expected {expected}")]
	InvalidMmrLeaf { expected: ValidatorSetId, got: ValidatorSetId },
	#[error("MMR leaf proof is invalid")]
	MmrProofInvalid,
}

impl Error {
	/// The class of this error.
	pub fn kind(&self) -> ErrorKind {
		use Error::*;

		match self {
			NotInitialized
			| AlreadyInitialized
			| InsufficientClaims { .. }
			| UnclaimedValidator(_)
			| InvalidBitfield
			| Bitfield(_)
			| ProofCountMismatch { .. }
			| ProofOrderMismatch { .. } => ErrorKind::Precondition,
			InvalidProof(_) | InvalidSignature(_) | InvalidMembership(_) => ErrorKind::Cryptographic,
			TicketAlreadyExists(_)
			| TicketNotFound(_)
			| TooEarly { .. }
			| TicketExpired { .. }
			| TicketNotExpired(_)
			| PrevRandaoAlreadyCaptured(_)
			| PrevRandaoNotCaptured(_)
			| StaleCommitment { .. } => ErrorKind::Timing,
			ValidatorSetIdMismatch { .. } | InvalidMmrLeaf { .. } | MmrProofInvalid => ErrorKind::Handover,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use strum::IntoEnumIterator;

	#[test]
	fn errors_are_classified() {
		assert_eq!(Error::InsufficientClaims { got: 1, want: 2 }.kind(), ErrorKind::Precondition);
		assert_eq!(
			Error::Bitfield(BitfieldError::IndexOutOfRange { index: 3, length: 3 }).kind(),
			ErrorKind::Precondition
		);
		assert_eq!(Error::InvalidSignature(7).kind(), ErrorKind::Cryptographic);
		assert_eq!(Error::PrevRandaoNotCaptured(H256::zero()).kind(), ErrorKind::Timing);
		assert_eq!(Error::StaleCommitment { got: 1, best_known: 1 }.kind(), ErrorKind::Timing);
		assert_eq!(Error::MmrProofInvalid.kind(), ErrorKind::Handover);
	}

	#[test]
	fn error_kind_display() {
		let kinds = ErrorKind::iter().map(|kind| kind.to_string()).collect::<Vec<_>>();

		assert_eq!(kinds, vec!["Precondition", "Cryptographic", "Timing", "Handover"]);
	}

	#[test]
	fn error_display() {
		assert_eq!(
			Error::ProofOrderMismatch {
				position: 2,
				got: 10,
				want: 12
			}
			.to_string(),
			"validator proof at position 2 is for validator 10, expected 12"
		);
		assert_eq!(
			Error::Bitfield(BitfieldError::StrayBits(10)).to_string(),
			"bits set beyond length 10"
		);
	}
}
