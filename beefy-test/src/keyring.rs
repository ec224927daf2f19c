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

use beefy_primitives::{crypto::address_from_public, keccak_256, Address, Signature, H256};

/// Set of named test accounts signing with secp256k1.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Keyring {
	Alice,
	Bob,
	Charlie,
	Dave,
	Eve,
	Ferdie,
	One,
	Two,
}

impl Keyring {
	/// Sign a 32-byte message hash.
	pub fn sign(self, msg_hash: &H256) -> Signature {
		sign_prehashed(&self.secret(), msg_hash)
	}

	/// Return the secret key.
	pub fn secret(self) -> libsecp256k1::SecretKey {
		secret_from_seed(self.to_seed().as_bytes())
	}

	/// Return the uncompressed public key.
	pub fn public(self) -> libsecp256k1::PublicKey {
		libsecp256k1::PublicKey::from_secret_key(&self.secret())
	}

	/// Return the Ethereum address.
	pub fn address(self) -> Address {
		address_from_public(&self.public())
	}

	/// Return seed string.
	pub fn to_seed(self) -> String {
		format!("//{}", self)
	}

	/// Iterator over all test accounts
	pub fn iter() -> impl Iterator<Item = Keyring> {
		<Self as strum::IntoEnumIterator>::iter()
	}
}

/// Derive a secret key from `seed` by hashing it until the result is a valid scalar.
pub(crate) fn secret_from_seed(seed: &[u8]) -> libsecp256k1::SecretKey {
	let mut bytes = keccak_256(seed);
	loop {
		match libsecp256k1::SecretKey::parse(&bytes) {
			Ok(secret) => return secret,
			Err(_) => bytes = keccak_256(&bytes),
		}
	}
}

/// Sign `msg_hash` as is, producing a low-`s` signature with a raw recovery id.
pub(crate) fn sign_prehashed(secret: &libsecp256k1::SecretKey, msg_hash: &H256) -> Signature {
	let message = libsecp256k1::Message::parse(&msg_hash.0);
	let (signature, recovery_id) = libsecp256k1::sign(&message, secret);
	Signature::new(signature.serialize(), recovery_id.serialize())
}

#[cfg(test)]
mod tests {
	use super::Keyring;
	use beefy_primitives::{keccak_256, H256};

	#[test]
	fn verify_should_work() {
		let msg = H256(keccak_256(b"I am Alice!"));
		let sig = Keyring::Alice.sign(&msg);

		assert!(sig.verify(&Keyring::Alice.address(), &msg));

		// different public key -> fail
		assert!(!sig.verify(&Keyring::Bob.address(), &msg));

		let msg = H256(keccak_256(b"I am not Alice!"));

		// different msg -> fail
		assert!(!sig.verify(&Keyring::Alice.address(), &msg));
	}

	#[test]
	fn accounts_are_distinct() {
		let mut addresses = Keyring::iter().map(Keyring::address).collect::<Vec<_>>();
		addresses.sort();
		addresses.dedup();

		assert_eq!(addresses.len(), 8);
	}

	#[test]
	fn seed_works() {
		assert_eq!(Keyring::Alice.to_seed(), "//Alice");
		assert_eq!(Keyring::Two.to_seed(), "//Two");
		assert_eq!(Keyring::Ferdie.secret().serialize(), Keyring::Ferdie.secret().serialize());
	}
}
