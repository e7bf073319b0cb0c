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

//! Debounced history change notifications.

use crate::LOG_TARGET;

use std::{
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
	time::Duration,
};
use tokio::sync::watch;

struct Shared {
	/// Number of `notify` calls so far.
	generation: AtomicU64,
	revision: watch::Sender<u64>,
	syncing: watch::Sender<bool>,
}

impl Shared {
	/// Publish changes, unless there have been more changes after `generation`.
	fn publish(&self, generation: u64) {
		if self.generation.load(Ordering::SeqCst) != generation {
			return
		}
		self.revision.send_modify(|revision| *revision += 1);
		self.syncing.send_replace(false);
	}
}

/// Coalesces bursts of history changes into a single notification.
///
/// Every change raises the sync indicator immediately. The change revision is bumped (and
/// the indicator is lowered) once no changes have happened for the debounce delay.
#[derive(Clone)]
pub struct ChangeNotifier {
	debounce: Duration,
	shared: Arc<Shared>,
}

impl ChangeNotifier {
	/// Create notifier with given debounce delay.
	pub fn new(debounce: Duration) -> Self {
		ChangeNotifier {
			debounce,
			shared: Arc::new(Shared {
				generation: AtomicU64::new(0),
				revision: watch::channel(0).0,
				syncing: watch::channel(false).0,
			}),
		}
	}

	/// Revision of the history, bumped after every burst of changes.
	pub fn changes(&self) -> watch::Receiver<u64> {
		self.shared.revision.subscribe()
	}

	/// True while there are changes that haven't been published yet.
	pub fn sync_indicator(&self) -> watch::Receiver<bool> {
		self.shared.syncing.subscribe()
	}

	/// Schedule change notification. Pending notification is postponed.
	pub fn notify(&self) {
		self.shared.syncing.send_replace(true);
		let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				let debounce = self.debounce;
				let shared = self.shared.clone();
				handle.spawn(async move {
					tokio::time::sleep(debounce).await;
					shared.publish(generation);
				});
			},
			Err(_) => {
				tracing::trace!(target: LOG_TARGET, "No runtime to debounce changes. Publishing now");
				self.shared.publish(generation);
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const DEBOUNCE: Duration = Duration::from_millis(700);

	#[tokio::test(start_paused = true)]
	async fn coalesces_bursts() {
		let notifier = ChangeNotifier::new(DEBOUNCE);
		let mut changes = notifier.changes();
		let syncing = notifier.sync_indicator();

		notifier.notify();
		tokio::time::sleep(Duration::from_millis(300)).await;
		notifier.notify();
		notifier.notify();
		assert!(*syncing.borrow());
		assert!(!changes.has_changed().unwrap());

		// the delay restarts with every change
		tokio::time::sleep(Duration::from_millis(401)).await;
		assert!(!changes.has_changed().unwrap());
		tokio::time::sleep(Duration::from_millis(300)).await;
		assert!(changes.has_changed().unwrap());
		assert_eq!(*changes.borrow_and_update(), 1);
		assert!(!*syncing.borrow());

		notifier.notify();
		tokio::time::sleep(DEBOUNCE + Duration::from_millis(1)).await;
		assert_eq!(*changes.borrow_and_update(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn steady_changes_are_published_once_quiet() {
		let notifier = ChangeNotifier::new(DEBOUNCE);
		let mut changes = notifier.changes();

		for _ in 0..4 {
			notifier.notify();
			tokio::time::sleep(Duration::from_millis(500)).await;
		}
		assert!(!changes.has_changed().unwrap());
		assert!(*notifier.sync_indicator().borrow());

		tokio::time::sleep(Duration::from_millis(201)).await;
		assert_eq!(*changes.borrow_and_update(), 1);
		tokio::time::sleep(DEBOUNCE * 2).await;
		assert!(!changes.has_changed().unwrap());
	}

	#[test]
	fn publishes_immediately_without_runtime() {
		let notifier = ChangeNotifier::new(DEBOUNCE);
		let changes = notifier.changes();
		notifier.notify();
		assert_eq!(*changes.borrow(), 1);
		assert!(!*notifier.sync_indicator().borrow());
	}
}
