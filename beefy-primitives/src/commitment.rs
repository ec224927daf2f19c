// Copyright (C) 2020-2021 Parity Technologies (UK) Ltd.
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

use codec::{Decode, Encode, Output};

use crate::{keccak_256, BlockNumber, MmrRootHash, ValidatorSetId, H256};

/// Id of the payload item carrying the MMR root hash.
pub const MMR_ROOT_ID: [u8; 2] = *b"mh";

/// A single entry of the generic BEEFY payload list.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct PayloadItem {
	/// Two-byte identifier of the entry, `b"mh"` for the MMR root.
	pub id: [u8; 2],
	/// Opaque, SCALE-encoded data of the entry.
	pub data: Vec<u8>,
}

impl PayloadItem {
	/// Create a new payload item.
	pub fn new(id: [u8; 2], data: impl Into<Vec<u8>>) -> Self {
		PayloadItem { id, data: data.into() }
	}
}

/// Error returned when a payload list can't be split around its MMR root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
	/// There is no `mh` entry in the payload.
	#[error("payload does not contain an MMR root")]
	MissingMmrRoot,
	/// The `mh` entry is not a 32-byte hash.
	#[error("MMR root has invalid length {0}, expected 32")]
	InvalidMmrRootLength(usize),
	/// The MMR root bytes occur more than once in the encoded payload.
	#[error("MMR root occurs {0} times in the encoded payload")]
	AmbiguousMmrRoot(usize),
}

/// The payload of a [`Commitment`], partially encoded.
///
/// Validators sign the SCALE encoding of the full payload list. The verifier only cares about the
/// MMR root, so everything around it is kept as opaque bytes which are reproduced byte for byte
/// when the commitment is hashed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Payload {
	/// The MMR root hash the validators voted on.
	pub mmr_root_hash: MmrRootHash,
	/// Encoded payload bytes preceding the MMR root.
	pub prefix: Vec<u8>,
	/// Encoded payload bytes following the MMR root.
	pub suffix: Vec<u8>,
}

impl Payload {
	/// Split the SCALE encoding of a full payload list around its MMR root entry.
	pub fn from_items(items: &[PayloadItem]) -> Result<Payload, PayloadError> {
		let item = items
			.iter()
			.find(|item| item.id == MMR_ROOT_ID)
			.ok_or(PayloadError::MissingMmrRoot)?;

		if item.data.len() != 32 {
			return Err(PayloadError::InvalidMmrRootLength(item.data.len()));
		}

		let root = H256::from_slice(&item.data);
		let encoded = items.encode();

		let positions = encoded
			.windows(32)
			.enumerate()
			.filter(|(_, window)| *window == root.as_bytes())
			.map(|(pos, _)| pos)
			.collect::<Vec<_>>();

		match positions[..] {
			[pos] => Ok(Payload {
				mmr_root_hash: root,
				prefix: encoded[..pos].to_vec(),
				suffix: encoded[pos + 32..].to_vec(),
			}),
			_ => Err(PayloadError::AmbiguousMmrRoot(positions.len())),
		}
	}
}

/// A commitment signed by BEEFY validators.
///
/// The commitment states that the relay chain finalized block [`Commitment::block_number`] with
/// chain state summarized by the MMR root in the payload, as attested by the validator set
/// [`Commitment::validator_set_id`].
///
/// The SCALE encoding of a commitment is
/// `prefix ++ mmr_root ++ suffix ++ le_u32(block_number) ++ le_u64(validator_set_id)`, which is
/// exactly the encoding of the relay chain's own commitment type, and therefore the message
/// validators sign (after hashing, see [`Commitment::hash`]).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Commitment {
	/// The payload being signed.
	pub payload: Payload,

	/// Finalized block number this commitment is for.
	pub block_number: BlockNumber,

	/// BEEFY validator set supposed to sign this commitment.
	pub validator_set_id: ValidatorSetId,
}

impl Commitment {
	/// Keccak-256 of the encoded commitment, the message BEEFY validators sign.
	pub fn hash(&self) -> H256 {
		H256(keccak_256(&self.encode()))
	}
}

impl Encode for Commitment {
	fn size_hint(&self) -> usize {
		self.payload.prefix.len() + 32 + self.payload.suffix.len() + 4 + 8
	}

	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		dest.write(&self.payload.prefix);
		dest.write(self.payload.mmr_root_hash.as_bytes());
		dest.write(&self.payload.suffix);
		self.block_number.encode_to(dest);
		self.validator_set_id.encode_to(dest);
	}
}
