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

//! Capabilities the light client needs from its host environment.

use std::{rc::Rc, sync::Arc};

use beefy_primitives::U256;

/// Source of the host's notion of "now".
pub trait BlockNumberProvider {
	/// Number of the block currently being executed.
	fn block_number(&self) -> u64;
}

/// The host's per-block randomness beacon.
///
/// The value must not be predictable by a submitter before the block it is read in was built.
/// The light client only reads it when randomness is committed to a ticket.
pub trait RandomnessSource {
	/// Randomness of the previous block.
	fn prev_randao(&self) -> U256;
}

macro_rules! forward_host_impls {
	($($wrapper:ty),*) => {
		$(
			impl<T: BlockNumberProvider + ?Sized> BlockNumberProvider for $wrapper {
				fn block_number(&self) -> u64 {
					(**self).block_number()
				}
			}

			impl<T: RandomnessSource + ?Sized> RandomnessSource for $wrapper {
				fn prev_randao(&self) -> U256 {
					(**self).prev_randao()
				}
			}
		)*
	};
}

forward_host_impls!(&T, Box<T>, Rc<T>, Arc<T>);

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	struct Counter(Cell<u64>);

	impl BlockNumberProvider for Counter {
		fn block_number(&self) -> u64 {
			self.0.set(self.0.get() + 1);
			self.0.get()
		}
	}

	impl RandomnessSource for Counter {
		fn prev_randao(&self) -> U256 {
			U256::from(self.0.get())
		}
	}

	fn read<H: BlockNumberProvider + RandomnessSource>(host: H) -> (u64, U256) {
		(host.block_number(), host.prev_randao())
	}

	#[test]
	fn wrappers_forward_to_the_host() {
		let host = Arc::new(Counter(Cell::new(0)));

		assert_eq!(read(&*host), (1, U256::from(1_u64)));
		assert_eq!(read(host.clone()), (2, U256::from(2_u64)));
		assert_eq!(read(Box::new(Counter(Cell::new(9)))), (10, U256::from(10_u64)));
	}
}
