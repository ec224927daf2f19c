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

use beefy_primitives::{Address, H256, U256};

/// Parse hex string to a vector of bytes.
pub fn parse_hex(hex: &str) -> anyhow::Result<Vec<u8>> {
	let s = hex.strip_prefix("0x").unwrap_or(hex);

	Ok(hex::decode(s)?)
}

/// Parse a 32-byte hash.
pub fn parse_h256(hex: &str) -> anyhow::Result<H256> {
	let bytes = parse_hex(hex)?;
	if bytes.len() != 32 {
		anyhow::bail!("Expected a 32-byte hash, got {} bytes", bytes.len());
	}

	Ok(H256::from_slice(&bytes))
}

/// Parse a 20-byte Ethereum address.
pub fn parse_address(hex: &str) -> anyhow::Result<Address> {
	let bytes = parse_hex(hex)?;
	if bytes.len() != 20 {
		anyhow::bail!("Expected a 20-byte address, got {} bytes", bytes.len());
	}

	Ok(Address::from_slice(&bytes))
}

/// Parse a 256-bit number, decimal or `0x`-prefixed hex.
pub fn parse_u256(number: &str) -> anyhow::Result<U256> {
	let parsed = match number.strip_prefix("0x") {
		Some(hex) => U256::from_str_radix(hex, 16).map_err(|err| anyhow::format_err!("{:?}", err)),
		None => U256::from_dec_str(number).map_err(|err| anyhow::format_err!("{:?}", err)),
	};

	parsed.map_err(|err| anyhow::format_err!("Invalid number `{}`: {}", number, err))
}

/// A wrapper struct to overcome structopt's `Vec` special handling.
pub struct Bytes(pub Vec<u8>);
impl std::str::FromStr for Bytes {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> anyhow::Result<Self> {
		parse_hex(s).map(Bytes)
	}
}

/// Format `data` as `0x`-prefixed hex.
pub fn to_hex(data: impl AsRef<[u8]>) -> String {
	format!("0x{}", hex::encode(data))
}
