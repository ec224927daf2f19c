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

use beefy_primitives::{crypto::address_from_public, Address};
use structopt::StructOpt;

use crate::cli::utils::{to_hex, Bytes};

/// Derive the Ethereum addresses of BEEFY authorities.
#[derive(StructOpt)]
#[structopt(about = "Uncompress BEEFY authority ids and derive their Ethereum addresses")]
pub struct AuthorityAddress {
	/// BEEFY authority ids, compressed (33 bytes) or uncompressed (65 bytes) secp256k1 public keys.
	///
	/// These can be obtained by querying `beefy.authorities`/`beefy.next_authorities` storage item
	/// of BEEFY pallet.
	#[structopt(required = true)]
	pub keys: Vec<Bytes>,
}

impl AuthorityAddress {
	pub fn run(self) -> anyhow::Result<()> {
		for key in self.keys {
			let (uncompressed, address) = authority_address(&key.0)?;
			println!("[{}]", to_hex(&key.0));
			println!("\tUncompressed: {}", to_hex(uncompressed));
			println!("\tAddress: {:?}", address);
		}
		Ok(())
	}
}

fn authority_address(key: &[u8]) -> anyhow::Result<([u8; 65], Address)> {
	let format = match key.len() {
		33 => libsecp256k1::PublicKeyFormat::Compressed,
		65 => libsecp256k1::PublicKeyFormat::Full,
		len => anyhow::bail!("Unexpected key length {}, expected 33 or 65 bytes", len),
	};

	let public = libsecp256k1::PublicKey::parse_slice(key, Some(format))
		.map_err(|err| anyhow::format_err!("Invalid public key {}: {:?}", to_hex(key), err))?;

	Ok((public.serialize(), address_from_public(&public)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	const GENERATOR_COMPRESSED: [u8; 33] = hex!("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
	const GENERATOR_FULL: [u8; 65] = hex!("0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8");

	#[test]
	fn address_of_compressed_and_full_key() {
		// when
		let (uncompressed, address) = authority_address(&GENERATOR_COMPRESSED).unwrap();

		// then
		assert_eq!(uncompressed, GENERATOR_FULL);
		assert_eq!(address, Address::from(hex!("7e5f4552091a69125d5dfcb7b8c2659029395bdf")));
		assert_eq!(authority_address(&GENERATOR_FULL).unwrap().1, address);
	}

	#[test]
	fn invalid_keys() {
		assert!(authority_address(&GENERATOR_COMPRESSED[1..]).is_err());

		let mut not_on_curve = GENERATOR_COMPRESSED;
		not_on_curve[0] = 0x05;
		assert!(authority_address(&not_on_curve).is_err());
	}
}
