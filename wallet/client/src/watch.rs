// This file is part of Parity Wallet Core.

// Copyright (C) Parity Technologies (UK) Ltd.
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

//! Publish/subscribe of extrinsic watch outcomes.

use crate::LOG_TARGET;

use parking_lot::RwLock;
use sp_core::H256;
use std::{collections::BTreeMap, sync::Arc};

/// Receiver of extrinsic watch outcomes.
pub trait WatchListener: Send + Sync {
	/// Called once per watched extrinsic, when it's included in a block (`success` is true and
	/// `block_hash` is set) or when it's rejected by the node.
	fn on_status(&self, tx_hash: H256, success: bool, block_hash: Option<H256>);
}

impl<F> WatchListener for F
where
	F: Fn(H256, bool, Option<H256>) + Send + Sync,
{
	fn on_status(&self, tx_hash: H256, success: bool, block_hash: Option<H256>) {
		self(tx_hash, success, block_hash)
	}
}

/// Named watch listeners.
#[derive(Default)]
pub struct WatchDispatcher {
	listeners: RwLock<BTreeMap<String, Arc<dyn WatchListener>>>,
}

impl WatchDispatcher {
	/// Create dispatcher without listeners.
	pub fn new() -> Self {
		WatchDispatcher::default()
	}

	/// Subscribe listener. Listener with the same name is replaced and returned.
	pub fn subscribe(
		&self,
		name: impl Into<String>,
		listener: Arc<dyn WatchListener>,
	) -> Option<Arc<dyn WatchListener>> {
		let name = name.into();
		tracing::trace!(target: LOG_TARGET, "Subscribing watch listener {name}");
		self.listeners.write().insert(name, listener)
	}

	/// Unsubscribe listener. Returns false if there was no listener with that name.
	pub fn unsubscribe(&self, name: &str) -> bool {
		self.listeners.write().remove(name).is_some()
	}

	/// Number of subscribed listeners.
	pub fn len(&self) -> usize {
		self.listeners.read().len()
	}

	/// Returns true if nobody listens.
	pub fn is_empty(&self) -> bool {
		self.listeners.read().is_empty()
	}

	/// Notify every listener.
	pub fn dispatch(&self, tx_hash: H256, success: bool, block_hash: Option<H256>) {
		// listeners may (un)subscribe from the callback
		let listeners = self.listeners.read().values().cloned().collect::<Vec<_>>();
		tracing::trace!(
			target: LOG_TARGET,
			?tx_hash,
			success,
			?block_hash,
			"Dispatching watch outcome to {} listeners",
			listeners.len(),
		);
		for listener in listeners {
			listener.on_status(tx_hash, success, block_hash);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parking_lot::Mutex;

	#[test]
	fn dispatches_to_named_listeners() {
		let dispatcher = WatchDispatcher::new();
		let received = Arc::new(Mutex::new(Vec::new()));

		let first = received.clone();
		dispatcher.subscribe(
			"first",
			Arc::new(move |hash: H256, success: bool, _: Option<H256>| {
				first.lock().push(("first", hash, success))
			}),
		);
		let second = received.clone();
		dispatcher.subscribe(
			"second",
			Arc::new(move |hash: H256, success: bool, _: Option<H256>| {
				second.lock().push(("second", hash, success))
			}),
		);

		let hash = H256::repeat_byte(1);
		dispatcher.dispatch(hash, true, Some(H256::repeat_byte(2)));
		assert!(dispatcher.unsubscribe("second"));
		assert!(!dispatcher.unsubscribe("second"));
		dispatcher.dispatch(hash, false, None);

		assert_eq!(
			*received.lock(),
			vec![("first", hash, true), ("second", hash, true), ("first", hash, false)],
		);
	}

	#[test]
	fn same_name_replaces_listener() {
		let dispatcher = WatchDispatcher::new();
		let noop = |_: H256, _: bool, _: Option<H256>| {};
		assert!(dispatcher.subscribe("history", Arc::new(noop)).is_none());
		assert!(dispatcher.subscribe("history", Arc::new(noop)).is_some());
		assert_eq!(dispatcher.len(), 1);
	}
}
