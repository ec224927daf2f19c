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

//! secp256k1 signatures of BEEFY validators, checked against Ethereum addresses.

use codec::{Decode, Encode};
use log::trace;

use crate::{keccak_256, Address, H256};

/// A recoverable ECDSA signature, `r ++ s ++ v`.
///
/// `v` may be given either as a raw recovery id (`0`, `1`) or Ethereum style (`27`, `28`).
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Signature(pub [u8; 65]);

impl Signature {
	/// Assemble a signature from its 64-byte `r ++ s` part and `v`.
	pub fn new(rs: [u8; 64], v: u8) -> Self {
		let mut raw = [0_u8; 65];
		raw[..64].copy_from_slice(&rs);
		raw[64] = v;
		Signature(raw)
	}

	/// The recovery byte as given.
	pub fn v(&self) -> u8 {
		self.0[64]
	}

	/// Recover the Ethereum address which signed `msg_hash`.
	///
	/// Returns `None` for an invalid recovery byte, an unparsable or non-canonical (high `s`)
	/// signature, or when no public key can be recovered.
	pub fn recover_address(&self, msg_hash: &H256) -> Option<Address> {
		let recovery_id = match self.v() {
			v @ (0 | 1) => v,
			v @ (27 | 28) => v - 27,
			_ => return None,
		};
		let recovery_id = libsecp256k1::RecoveryId::parse(recovery_id).ok()?;

		let signature = libsecp256k1::Signature::parse_standard_slice(&self.0[..64]).ok()?;
		if signature.s.is_high() {
			trace!(target: "beefy", "🥩 Rejecting malleable signature {:?}", self);
			return None;
		}

		let message = libsecp256k1::Message::parse(&msg_hash.0);
		let public = libsecp256k1::recover(&message, &signature, &recovery_id).ok()?;

		Some(address_from_public(&public))
	}

	/// Whether this is a signature of `msg_hash` by `address`.
	pub fn verify(&self, address: &Address, msg_hash: &H256) -> bool {
		self.recover_address(msg_hash).as_ref() == Some(address)
	}
}

impl core::fmt::Debug for Signature {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "Signature(0x")?;
		for byte in self.0.iter() {
			write!(f, "{:02x}", byte)?;
		}
		write!(f, ")")
	}
}

/// Ethereum address of a secp256k1 public key, the last 20 bytes of the keccak-256 hash of the
/// uncompressed key without its `0x04` tag.
pub fn address_from_public(public: &libsecp256k1::PublicKey) -> Address {
	let uncompressed = public.serialize();
	Address::from_slice(&keccak_256(&uncompressed[1..])[12..])
}

/// A validator's signature over a commitment together with the proof of its membership in the
/// validator set.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ValidatorProof {
	/// Signature over the commitment hash.
	pub signature: Signature,
	/// Index of the validator in the set.
	pub index: u32,
	/// Claimed address of the validator.
	pub account: Address,
	/// Merkle proof of `account` at `index` under the validator set root.
	pub proof: Vec<H256>,
}
