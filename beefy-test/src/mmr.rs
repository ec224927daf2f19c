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

use beefy_primitives::{keccak_256, H256};

/// An in-memory Merkle Mountain Range producing simplified leaf proofs.
///
/// Mountains are perfect binary trees, largest first. The root bags the peaks right to left,
/// `hash(bag_of_right_peaks ++ left_peak)`, like Substrate's MMR does.
#[derive(Debug, Default, Clone)]
pub struct TestMmr {
	leaves: Vec<[u8; 32]>,
}

impl TestMmr {
	/// An empty MMR.
	pub fn new() -> Self {
		Self::default()
	}

	/// An MMR over the given encoded leaves.
	pub fn from_leaves<I, T>(leaves: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: AsRef<[u8]>,
	{
		let mut mmr = Self::new();
		for leaf in leaves {
			mmr.push(leaf.as_ref());
		}
		mmr
	}

	/// Append an encoded leaf.
	pub fn push(&mut self, leaf: &[u8]) {
		self.leaves.push(keccak_256(leaf));
	}

	/// Number of leaves.
	pub fn leaf_count(&self) -> usize {
		self.leaves.len()
	}

	/// Number of nodes, leaves included.
	pub fn size(&self) -> usize {
		2 * self.leaves.len() - self.leaves.len().count_ones() as usize
	}

	/// The bagged root, zero for an empty MMR.
	pub fn root(&self) -> H256 {
		let peaks = self.mountains().map(|(start, len)| climb(&self.leaves[start..start + len], 0).0);
		bag(peaks.collect()).map(H256).unwrap_or_default()
	}

	/// Proof items and order flags for the leaf at `index`.
	pub fn proof(&self, index: usize) -> Option<(Vec<H256>, Vec<bool>)> {
		if index >= self.leaves.len() {
			return None;
		}

		let mountains = self.mountains().collect::<Vec<_>>();
		let mountain = mountains
			.iter()
			.position(|(start, len)| index < start + len)?;

		let mut peaks = Vec::with_capacity(mountains.len());
		let mut path = Vec::new();
		for (position, (start, len)) in mountains.iter().enumerate() {
			let leaves = &self.leaves[*start..start + len];
			if position == mountain {
				let (peak, items) = climb(leaves, index - start);
				peaks.push(peak);
				path = items;
			} else {
				peaks.push(climb(leaves, 0).0);
			}
		}

		if let Some(right) = bag(peaks[mountain + 1..].to_vec()) {
			path.push((right, true));
		}
		for left in peaks[..mountain].iter().rev() {
			path.push((*left, false));
		}

		Some(path.into_iter().map(|(item, is_left)| (H256(item), is_left)).unzip())
	}

	// (first leaf, number of leaves) of every mountain
	fn mountains(&self) -> impl Iterator<Item = (usize, usize)> {
		let count = self.leaves.len();
		(0..usize::BITS)
			.rev()
			.map(|height| 1_usize << height)
			.filter(move |len| count & len != 0)
			.scan(0, |start, len| {
				let mountain = (*start, len);
				*start += len;
				Some(mountain)
			})
	}
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
	let mut combined = [0_u8; 64];
	combined[..32].copy_from_slice(left);
	combined[32..].copy_from_slice(right);
	keccak_256(&combined)
}

// Peak of a perfect tree over `leaves` and the path of `index` to it.
fn climb(leaves: &[[u8; 32]], mut index: usize) -> ([u8; 32], Vec<([u8; 32], bool)>) {
	let mut layer = leaves.to_vec();
	let mut path = Vec::new();

	while layer.len() > 1 {
		let sibling = index ^ 1;
		path.push((layer[sibling], sibling < index));
		layer = layer.chunks(2).map(|pair| hash_pair(&pair[0], &pair[1])).collect();
		index >>= 1;
	}

	(layer[0], path)
}

fn bag(peaks: Vec<[u8; 32]>) -> Option<[u8; 32]> {
	let mut peaks = peaks.into_iter().rev();
	let last = peaks.next()?;
	Some(peaks.fold(last, |bag, left| hash_pair(&bag, &left)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use beefy_primitives::mmr::verify_leaf_proof;

	fn leaves(count: u32) -> Vec<Vec<u8>> {
		(0..count).map(|i| format!("leaf {}", i).into_bytes()).collect()
	}

	#[test]
	fn sizes() {
		assert_eq!(TestMmr::from_leaves(leaves(1)).size(), 1);
		assert_eq!(TestMmr::from_leaves(leaves(4)).size(), 7);
		assert_eq!(TestMmr::from_leaves(leaves(7)).size(), 11);
		assert_eq!(TestMmr::from_leaves(leaves(15)).size(), 26);
	}

	#[test]
	fn root_bags_right_to_left() {
		// given
		let leaves = leaves(3);
		let mmr = TestMmr::from_leaves(&leaves);
		let hashes = leaves.iter().map(|l| keccak_256(l)).collect::<Vec<_>>();

		// then
		let left_peak = hash_pair(&hashes[0], &hashes[1]);
		assert_eq!(mmr.root(), H256(hash_pair(&hashes[2], &left_peak)));
		assert_eq!(TestMmr::new().root(), H256::zero());
		assert_eq!(TestMmr::from_leaves(&leaves[..1]).root(), H256(hashes[0]));
	}

	#[test]
	fn every_leaf_proof_verifies() {
		for count in 1..=33 {
			let leaves = leaves(count);
			let mmr = TestMmr::from_leaves(&leaves);
			let root = mmr.root();

			for (index, leaf) in leaves.iter().enumerate() {
				let (items, order) = mmr.proof(index).unwrap();
				assert!(verify_leaf_proof(&root, leaf, &items, &order), "{} of {}", index, count);
			}
			assert!(mmr.proof(leaves.len()).is_none());
		}
	}
}
