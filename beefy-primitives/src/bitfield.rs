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

//! Sets of validator indices packed into 256-bit words.
//!
//! A relayer first claims a set of signers with a bitfield. Once a random seed becomes known, the
//! verifier derives a sample of the claimed set (see [`Bitfield::derive_sample`]) and only the
//! signatures of the sampled validators have to be presented.

use codec::{Decode, Encode, Input};

use crate::{keccak_256, H256, U256};

const WORD_BITS: usize = 256;

/// Errors of bitfield construction and sampling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitfieldError {
	/// A validator index does not fit into the bitfield.
	#[error("index {index} is out of range for a bitfield of length {length}")]
	IndexOutOfRange {
		/// Offending index.
		index: u32,
		/// Number of addressable positions.
		length: u32,
	},
	/// The number of words doesn't match the bitfield length.
	#[error("bitfield of length {length} needs {expected} words, got {got}")]
	InvalidWordCount {
		/// Number of addressable positions.
		length: u32,
		/// Number of words required.
		expected: usize,
		/// Number of words given.
		got: usize,
	},
	/// Bits are set at positions beyond the bitfield length.
	#[error("bits set beyond length {0}")]
	StrayBits(u32),
	/// Not enough set bits to sample from.
	#[error("cannot sample {required} out of {available} set bits")]
	InsufficientCandidates {
		/// Set bits in the source bitfield.
		available: u32,
		/// Requested sample size.
		required: u32,
	},
}

/// An ordered set of validator indices in `[0, length)`.
///
/// Bit `i` lives in word `i / 256` at bit position `i % 256`. Decoding goes through
/// [`Bitfield::from_words`].
#[derive(Debug, Clone, PartialEq, Eq, Encode)]
pub struct Bitfield {
	length: u32,
	words: Vec<U256>,
}

impl Bitfield {
	/// An empty bitfield addressing `length` validators.
	pub fn new(length: u32) -> Self {
		Bitfield {
			length,
			words: vec![U256::zero(); words_for(length)],
		}
	}

	/// Pack `indices` into a bitfield addressing `length` validators.
	pub fn from_indices<I>(indices: I, length: u32) -> Result<Self, BitfieldError>
	where
		I: IntoIterator<Item = u32>,
	{
		let mut bitfield = Bitfield::new(length);
		for index in indices {
			bitfield.set(index)?;
		}
		Ok(bitfield)
	}

	/// Build a bitfield from raw words, as submitted by a relayer.
	pub fn from_words(words: Vec<U256>, length: u32) -> Result<Self, BitfieldError> {
		let expected = words_for(length);
		if words.len() != expected {
			return Err(BitfieldError::InvalidWordCount {
				length,
				expected,
				got: words.len(),
			});
		}

		let bitfield = Bitfield { length, words };
		let tail = length as usize % WORD_BITS;
		if tail != 0 {
			let last = bitfield.words[expected - 1];
			if !(last >> tail).is_zero() {
				return Err(BitfieldError::StrayBits(length));
			}
		}

		Ok(bitfield)
	}

	/// Number of addressable positions.
	pub fn length(&self) -> u32 {
		self.length
	}

	/// Raw words of the bitfield.
	pub fn words(&self) -> &[U256] {
		&self.words
	}

	/// Whether the validator at `index` is part of the set.
	pub fn is_set(&self, index: u32) -> bool {
		if index >= self.length {
			return false;
		}
		let (word, bit) = position(index);
		self.words.get(word).map_or(false, |word| word.bit(bit))
	}

	/// Add the validator at `index` to the set.
	pub fn set(&mut self, index: u32) -> Result<(), BitfieldError> {
		if index >= self.length {
			return Err(BitfieldError::IndexOutOfRange {
				index,
				length: self.length,
			});
		}
		let (word, bit) = position(index);
		if let Some(word) = self.words.get_mut(word) {
			*word = *word | (U256::one() << bit);
		}
		Ok(())
	}

	/// Number of validators in the set.
	pub fn count_set_bits(&self) -> u32 {
		self.in_range_words()
			.map(|word| word.0.iter().map(|limb| limb.count_ones()).sum::<u32>())
			.sum()
	}

	/// Whether every member of `self` is also a member of `other`.
	pub fn is_subset_of(&self, other: &Bitfield) -> bool {
		self.length == other.length
			&& self
				.in_range_words()
				.zip(other.in_range_words().chain(std::iter::repeat(U256::zero())))
				.all(|(a, b)| (a & !b).is_zero())
	}

	/// Indices of the set bits, ascending.
	pub fn set_bits(&self) -> impl Iterator<Item = u32> + '_ {
		(0..self.length).filter(move |index| self.is_set(*index))
	}

	/// Deterministically select exactly `target` members of this set using `seed`.
	///
	/// Candidates are the set bits in ascending order. In round `i` the candidate at
	/// `keccak256(be(seed) ++ be(i)) mod remaining` is taken out of the candidate list and added
	/// to the sample. The result only depends on `(seed, self, target)`.
	pub fn derive_sample(&self, seed: U256, target: u32) -> Result<Bitfield, BitfieldError> {
		let mut candidates = self.set_bits().collect::<Vec<_>>();
		if (candidates.len() as u32) < target {
			return Err(BitfieldError::InsufficientCandidates {
				available: candidates.len() as u32,
				required: target,
			});
		}

		let mut sample = Bitfield::new(self.length);
		for round in 0..target {
			let pick = make_index(seed, round, candidates.len());
			let index = candidates.swap_remove(pick);
			sample.set(index)?;
		}

		Ok(sample)
	}

	/// Keccak-256 over the little-endian length followed by the big-endian words, used to bind a
	/// claim to a ticket.
	pub fn hash(&self) -> H256 {
		let mut data = Vec::with_capacity(4 + 32 * self.words.len());
		data.extend_from_slice(&self.length.to_le_bytes());
		for word in &self.words {
			data.extend_from_slice(&be_bytes(*word));
		}
		H256(keccak_256(&data))
	}

	/// The words with bits at positions `>= length` masked off.
	fn in_range_words(&self) -> impl Iterator<Item = U256> + '_ {
		let length = self.length as usize;
		self.words.iter().take(words_for(self.length)).enumerate().map(move |(i, word)| {
			let end = (i + 1) * WORD_BITS;
			if end <= length {
				*word
			} else {
				*word & ((U256::one() << (length % WORD_BITS)) - U256::one())
			}
		})
	}
}

impl Decode for Bitfield {
	fn decode<I: Input>(input: &mut I) -> Result<Self, codec::Error> {
		let (length, words) = <(u32, Vec<U256>)>::decode(input)?;
		Bitfield::from_words(words, length).map_err(|_| "Invalid bitfield".into())
	}
}

fn words_for(length: u32) -> usize {
	(length as usize + WORD_BITS - 1) / WORD_BITS
}

fn position(index: u32) -> (usize, usize) {
	let index = index as usize;
	(index / WORD_BITS, index % WORD_BITS)
}

fn be_bytes(value: U256) -> [u8; 32] {
	let mut out = [0_u8; 32];
	value.to_big_endian(&mut out);
	out
}

fn make_index(seed: U256, round: u32, modulus: usize) -> usize {
	let mut data = [0_u8; 64];
	data[..32].copy_from_slice(&be_bytes(seed));
	data[32..].copy_from_slice(&be_bytes(U256::from(round)));
	let hash = U256::from_big_endian(&keccak_256(&data));
	(hash % U256::from(modulus)).as_usize()
}
