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

//! Runtime metadata manager.
//!
//! The manager owns the current [`RuntimeSnapshot`]. The first access builds the snapshot from
//! the cached (or bundled) metadata without touching the network and then asks the chain for
//! its runtime version. If the chain runs a newer runtime, its metadata is fetched, the new
//! snapshot is built and persisted, and only then it replaces the current one. Any failure
//! along the way leaves the current snapshot untouched.
//!
//! Builds are single-flight: they run under one async mutex and everyone who has been waiting
//! for the mutex gets the snapshot built by the first caller.

use crate::{
	cache::{CachedMetadata, MetadataCache},
	error::{Error, Result},
	snapshot::{RuntimeSnapshot, RuntimeVersion},
	transport::RuntimeTransport,
	LOG_TARGET,
};

use futures::{Stream, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};

/// State of the runtime metadata manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimeState {
	/// No snapshot has been requested yet, or the runtime version has been reset.
	Uninitialized,
	/// Snapshot is being built from the cached metadata.
	LoadingFromCache,
	/// Snapshot is ready.
	Ready,
	/// Metadata of the new runtime is being fetched.
	Upgrading,
}

/// Runtime metadata manager configuration.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
	/// Metadata that is used when nothing is cached yet.
	pub bundled: Option<CachedMetadata>,
	/// Address prefix that is used if the runtime doesn't declare one.
	pub address_prefix_fallback: u16,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		RuntimeConfig {
			bundled: None,
			address_prefix_fallback: wallet_utils::config::DEFAULT_ADDRESS_PREFIX,
		}
	}
}

/// State that is only accessed under the build mutex.
#[derive(Debug, Default)]
struct BuildState {
	/// Cached metadata belongs to the previous chain (after runtime version reset).
	cache_is_stale: bool,
}

#[derive(Debug)]
struct Current {
	snapshot: Option<Arc<RuntimeSnapshot>>,
	/// Whether the snapshot is known to match the runtime of the chain.
	remote_checked: bool,
	state: RuntimeState,
}

/// Owner of the current runtime snapshot.
pub struct RuntimeManager<T, C> {
	transport: T,
	cache: C,
	config: RuntimeConfig,
	build: Mutex<BuildState>,
	current: RwLock<Current>,
}

impl<T: RuntimeTransport, C: MetadataCache> RuntimeManager<T, C> {
	/// Create runtime manager. Nothing is loaded until the first access.
	pub fn new(transport: T, cache: C, config: RuntimeConfig) -> Self {
		RuntimeManager {
			transport,
			cache,
			config,
			build: Mutex::new(BuildState::default()),
			current: RwLock::new(Current {
				snapshot: None,
				remote_checked: false,
				state: RuntimeState::Uninitialized,
			}),
		}
	}

	/// Returns reference to the transport.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Current state of the manager.
	pub fn state(&self) -> RuntimeState {
		self.current.read().state
	}

	/// Returns current snapshot without any I/O, if it has been built already.
	pub fn cached_snapshot(&self) -> Option<Arc<RuntimeSnapshot>> {
		self.current.read().snapshot.clone()
	}

	/// Address prefix of the current runtime, or the configured fallback if there's no
	/// snapshot yet.
	pub fn address_prefix(&self) -> u16 {
		self.cached_snapshot()
			.map(|snapshot| snapshot.address_prefix())
			.unwrap_or(self.config.address_prefix_fallback)
	}

	/// Returns current snapshot, building it on first access.
	pub async fn snapshot(&self) -> Result<Arc<RuntimeSnapshot>> {
		{
			let current = self.current.read();
			if let (true, Some(snapshot)) = (current.remote_checked, &current.snapshot) {
				return Ok(snapshot.clone())
			}
		}

		let mut build = self.build.lock().await;
		// someone else has built the snapshot while we've been waiting for the lock
		{
			let current = self.current.read();
			if let (true, Some(snapshot)) = (current.remote_checked, &current.snapshot) {
				return Ok(snapshot.clone())
			}
		}

		self.set_state(RuntimeState::LoadingFromCache);
		if self.cached_snapshot().is_none() {
			self.load_from_cache().await;
		}
		self.sync_with_chain(&mut build).await
	}

	/// Ask the chain for its runtime version and upgrade the snapshot if it has changed.
	pub async fn refresh(&self) -> Result<Arc<RuntimeSnapshot>> {
		let mut build = self.build.lock().await;
		if self.cached_snapshot().is_none() {
			self.load_from_cache().await;
		}
		self.sync_with_chain(&mut build).await
	}

	/// Handle runtime version that has been pushed by the node.
	pub async fn on_runtime_version(&self, version: RuntimeVersion) -> Result<Arc<RuntimeSnapshot>> {
		let mut build = self.build.lock().await;
		if self.cached_snapshot().is_none() {
			self.load_from_cache().await;
		}
		if !self.upgrade_if_required(&mut build, version).await {
			// retried on the next access
			self.current.write().remote_checked = false;
		}
		self.current_or_unavailable("no runtime metadata has been loaded yet")
	}

	/// Forget the runtime version of the current chain.
	///
	/// The next access treats cached metadata as stale and fetches metadata from the chain,
	/// even if the chain reports a lower runtime version. Until then the current snapshot is
	/// kept.
	pub async fn reset_runtime_version(&self) {
		let mut build = self.build.lock().await;
		build.cache_is_stale = true;

		let mut current = self.current.write();
		current.remote_checked = false;
		current.state = RuntimeState::Uninitialized;
		tracing::info!(target: LOG_TARGET, "Runtime version has been reset");
	}

	/// Spawn task that upgrades the snapshot whenever the node pushes a new runtime version.
	pub fn spawn_version_watcher<S>(self: Arc<Self>, versions: S) -> JoinHandle<()>
	where
		T: 'static,
		C: 'static,
		S: Stream<Item = RuntimeVersion> + Send + 'static,
	{
		tokio::spawn(async move {
			let mut versions = std::pin::pin!(versions);
			while let Some(version) = versions.next().await {
				if let Err(e) = self.on_runtime_version(version).await {
					tracing::warn!(target: LOG_TARGET, error=?e, "Failed to handle runtime version");
				}
			}
			tracing::debug!(target: LOG_TARGET, "Runtime version subscription has ended");
		})
	}

	async fn load_from_cache(&self) {
		self.set_state(RuntimeState::LoadingFromCache);

		let cached = match self.cache.load().await {
			Ok(cached) => cached,
			Err(e) => {
				tracing::warn!(target: LOG_TARGET, error=?e, "Failed to read runtime metadata cache");
				None
			},
		};

		for (source, metadata) in
			[("cached", cached.as_ref()), ("bundled", self.config.bundled.as_ref())]
		{
			let Some(metadata) = metadata else { continue };
			match RuntimeSnapshot::build(
				&metadata.blob,
				&metadata.version,
				self.config.address_prefix_fallback,
			) {
				Ok(snapshot) => {
					tracing::debug!(
						target: LOG_TARGET,
						"Loaded {source} runtime metadata of spec version {}",
						snapshot.spec_version(),
					);
					self.install(Arc::new(snapshot));
					return
				},
				Err(e) => tracing::warn!(
					target: LOG_TARGET,
					error=?e,
					"Failed to build snapshot from {source} runtime metadata",
				),
			}
		}
	}

	async fn sync_with_chain(&self, build: &mut BuildState) -> Result<Arc<RuntimeSnapshot>> {
		let up_to_date = match self.transport.runtime_version().await {
			Ok(version) => self.upgrade_if_required(build, version).await,
			Err(e) => {
				// offline start: the cached snapshot is served, and the next access asks again
				tracing::warn!(target: LOG_TARGET, error=?e, "Failed to read runtime version");
				false
			},
		};
		self.current.write().remote_checked = up_to_date;

		self.set_state(RuntimeState::Ready);
		self.current_or_unavailable("nothing is cached and the node is unreachable")
	}

	/// Returns true if the installed snapshot matches the runtime of given version.
	async fn upgrade_if_required(&self, build: &mut BuildState, version: RuntimeVersion) -> bool {
		let current_version = self.cached_snapshot().map(|snapshot| snapshot.spec_version());
		let is_required = build.cache_is_stale ||
			current_version.map_or(true, |current| version.spec_version > current);
		if !is_required {
			return true
		}

		self.set_state(RuntimeState::Upgrading);
		let upgraded = match self.upgrade(version).await {
			Ok(snapshot) => {
				match current_version {
					Some(current) => tracing::info!(
						target: LOG_TARGET,
						"Runtime upgraded from spec version {current} to {}",
						snapshot.spec_version(),
					),
					None => tracing::info!(
						target: LOG_TARGET,
						"Loaded runtime of spec version {}",
						snapshot.spec_version(),
					),
				}
				build.cache_is_stale = false;
				self.install(snapshot);
				true
			},
			Err(e) => {
				tracing::warn!(
					target: LOG_TARGET,
					error=?e,
					"Failed to upgrade runtime. Keeping spec version {current_version:?}",
				);
				false
			},
		};
		self.set_state(RuntimeState::Ready);
		upgraded
	}

	async fn upgrade(&self, version: RuntimeVersion) -> Result<Arc<RuntimeSnapshot>> {
		let blob = self.transport.metadata().await?;
		let snapshot =
			RuntimeSnapshot::build(&blob, &version, self.config.address_prefix_fallback)?;

		let cached = CachedMetadata { version, blob };
		if let Err(e) = self.cache.store(&cached).await {
			// the chain already runs the new runtime, so the snapshot is installed anyway
			tracing::warn!(target: LOG_TARGET, error=?e, "Failed to persist runtime metadata");
		}

		Ok(Arc::new(snapshot))
	}

	fn install(&self, snapshot: Arc<RuntimeSnapshot>) {
		self.current.write().snapshot = Some(snapshot);
	}

	fn set_state(&self, state: RuntimeState) {
		self.current.write().state = state;
	}

	fn current_or_unavailable(&self, reason: &str) -> Result<Arc<RuntimeSnapshot>> {
		self.cached_snapshot().ok_or_else(|| Error::Unavailable(reason.into()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{cache::StoreMetadataCache, test_utils};
	use assert_matches::assert_matches;
	use async_trait::async_trait;
	use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
	use wallet_utils::MemStore;

	#[derive(Default)]
	struct TestTransport {
		spec_version: AtomicU32,
		offline: AtomicBool,
		metadata_calls: AtomicUsize,
		/// Number of metadata requests to fail before serving metadata again.
		metadata_failures: AtomicUsize,
	}

	impl TestTransport {
		fn new(spec_version: u32) -> Arc<Self> {
			Arc::new(TestTransport { spec_version: AtomicU32::new(spec_version), ..Default::default() })
		}
	}

	#[async_trait]
	impl RuntimeTransport for TestTransport {
		async fn runtime_version(&self) -> Result<RuntimeVersion> {
			if self.offline.load(Ordering::SeqCst) {
				return Err(Error::Transport("connection refused".into()))
			}
			Ok(test_utils::runtime_version(self.spec_version.load(Ordering::SeqCst)))
		}

		async fn metadata(&self) -> Result<Vec<u8>> {
			self.metadata_calls.fetch_add(1, Ordering::SeqCst);
			// make concurrent callers pile up on the build mutex
			tokio::time::sleep(std::time::Duration::from_millis(10)).await;
			let failing = self
				.metadata_failures
				.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
				.is_ok();
			if failing || self.offline.load(Ordering::SeqCst) {
				return Err(Error::Transport("connection refused".into()))
			}
			Ok(test_utils::metadata_blob())
		}
	}

	type TestManager = RuntimeManager<Arc<TestTransport>, Arc<StoreMetadataCache<MemStore>>>;

	async fn cache_with_version(spec_version: u32) -> Arc<StoreMetadataCache<MemStore>> {
		let cache = Arc::new(StoreMetadataCache::new(MemStore::new()));
		cache
			.store(&CachedMetadata {
				version: test_utils::runtime_version(spec_version),
				blob: test_utils::metadata_blob(),
			})
			.await
			.unwrap();
		cache
	}

	fn manager(
		transport: Arc<TestTransport>,
		cache: Arc<StoreMetadataCache<MemStore>>,
	) -> Arc<TestManager> {
		Arc::new(RuntimeManager::new(transport, cache, RuntimeConfig::default()))
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn concurrent_callers_share_single_upgrade() {
		let transport = TestTransport::new(7);
		let cache = cache_with_version(5).await;
		let manager = manager(transport.clone(), cache.clone());

		let snapshots = futures::future::join_all((0..8).map(|_| {
			let manager = manager.clone();
			tokio::spawn(async move { manager.snapshot().await.unwrap().spec_version() })
		}))
		.await;

		assert!(snapshots.into_iter().all(|version| version.unwrap() == 7));
		assert_eq!(transport.metadata_calls.load(Ordering::SeqCst), 1);
		assert_eq!(manager.state(), RuntimeState::Ready);
		assert_eq!(cache.load().await.unwrap().unwrap().version.spec_version, 7);
		assert_eq!(manager.address_prefix(), test_utils::SS58_PREFIX);
	}

	#[tokio::test]
	async fn same_version_is_not_refetched() {
		let transport = TestTransport::new(5);
		let manager = manager(transport.clone(), cache_with_version(5).await);

		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 5);
		assert_eq!(manager.refresh().await.unwrap().spec_version(), 5);
		assert_eq!(transport.metadata_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn failed_upgrade_keeps_previous_snapshot() {
		let transport = TestTransport::new(5);
		let cache = cache_with_version(5).await;
		let manager = manager(transport.clone(), cache.clone());
		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 5);

		// the node reports an upgrade, but its metadata can't be fetched
		transport.spec_version.store(9, Ordering::SeqCst);
		transport.offline.store(true, Ordering::SeqCst);
		let snapshot = manager.on_runtime_version(test_utils::runtime_version(9)).await.unwrap();
		assert_eq!(snapshot.spec_version(), 5);
		assert_eq!(cache.load().await.unwrap().unwrap().version.spec_version, 5);

		transport.offline.store(false, Ordering::SeqCst);
		assert_eq!(manager.refresh().await.unwrap().spec_version(), 9);
	}

	#[tokio::test]
	async fn failed_metadata_fetch_is_retried_on_next_access() {
		let transport = TestTransport::new(7);
		transport.metadata_failures.store(1, Ordering::SeqCst);
		let manager = manager(transport.clone(), cache_with_version(5).await);

		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 5);
		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 7);
		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 7);
		assert_eq!(transport.metadata_calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn spec_version_never_decreases() {
		let transport = TestTransport::new(5);
		let manager = manager(transport.clone(), cache_with_version(8).await);

		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 8);
		manager.on_runtime_version(test_utils::runtime_version(6)).await.unwrap();
		assert_eq!(manager.refresh().await.unwrap().spec_version(), 8);
		assert_eq!(transport.metadata_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn offline_cold_start_uses_cache() {
		let transport = TestTransport::new(5);
		transport.offline.store(true, Ordering::SeqCst);

		let manager = manager(transport.clone(), cache_with_version(4).await);
		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 4);

		// the node comes back with a newer runtime
		transport.offline.store(false, Ordering::SeqCst);
		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 5);
		transport.offline.store(true, Ordering::SeqCst);

		let empty = self::manager(transport, Arc::new(StoreMetadataCache::new(MemStore::new())));
		assert_matches!(empty.snapshot().await, Err(Error::Unavailable(_)));
		assert_eq!(empty.address_prefix(), wallet_utils::config::DEFAULT_ADDRESS_PREFIX);
	}

	#[tokio::test]
	async fn bundled_metadata_is_used_without_cache() {
		let transport = TestTransport::new(3);
		transport.offline.store(true, Ordering::SeqCst);
		let config = RuntimeConfig {
			bundled: Some(CachedMetadata {
				version: test_utils::runtime_version(3),
				blob: test_utils::metadata_blob(),
			}),
			..Default::default()
		};

		let manager = RuntimeManager::new(
			transport,
			Arc::new(StoreMetadataCache::new(MemStore::new())),
			config,
		);
		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 3);
	}

	#[tokio::test]
	async fn reset_forces_metadata_fetch() {
		let transport = TestTransport::new(8);
		let manager = manager(transport.clone(), cache_with_version(8).await);
		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 8);
		assert_eq!(transport.metadata_calls.load(Ordering::SeqCst), 0);

		// another chain with lower runtime version
		transport.spec_version.store(2, Ordering::SeqCst);
		manager.reset_runtime_version().await;
		assert_eq!(manager.state(), RuntimeState::Uninitialized);

		assert_eq!(manager.snapshot().await.unwrap().spec_version(), 2);
		assert_eq!(transport.metadata_calls.load(Ordering::SeqCst), 1);
		assert_eq!(manager.state(), RuntimeState::Ready);
	}

	#[tokio::test]
	async fn version_watcher_upgrades_snapshot() {
		let transport = TestTransport::new(5);
		let manager = manager(transport.clone(), cache_with_version(5).await);
		manager.snapshot().await.unwrap();

		let (sender, receiver) = futures::channel::mpsc::unbounded();
		let watcher = manager.clone().spawn_version_watcher(receiver);
		sender.unbounded_send(test_utils::runtime_version(6)).unwrap();
		drop(sender);
		watcher.await.unwrap();

		assert_eq!(manager.cached_snapshot().unwrap().spec_version(), 6);
	}
}
