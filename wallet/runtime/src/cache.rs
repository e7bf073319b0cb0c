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

//! Persistent cache of the runtime metadata.

use crate::{
	error::{Error, Result},
	snapshot::RuntimeVersion,
	LOG_TARGET,
};

use async_trait::async_trait;
use codec::{Decode, Encode};
use std::{path::PathBuf, sync::Arc};
use wallet_utils::{FileStore, KeyValueStore};

/// Store key of the cached metadata.
pub const METADATA_CACHE_KEY: &str = "runtime-metadata";

/// Metadata blob together with the runtime version it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedMetadata {
	/// Runtime version.
	pub version: RuntimeVersion,
	/// SCALE-encoded metadata.
	pub blob: Vec<u8>,
}

#[derive(Encode, Decode)]
struct CacheRecord {
	spec_version: u32,
	transaction_version: u32,
	spec_name: Option<String>,
	blob: Vec<u8>,
}

/// Persistent storage of the last known runtime metadata.
#[async_trait]
pub trait MetadataCache: Send + Sync {
	/// Load cached metadata. Returns `None` if nothing has been cached yet.
	async fn load(&self) -> Result<Option<CachedMetadata>>;

	/// Replace cached metadata. Blob and version are stored together.
	async fn store(&self, metadata: &CachedMetadata) -> Result<()>;
}

/// Metadata cache on top of the keyed store.
///
/// Blob and version live in one record under one key, so they can't get out of sync.
#[derive(Clone, Debug)]
pub struct StoreMetadataCache<S> {
	store: S,
}

/// Metadata cache in the file system directory.
pub type FileMetadataCache = StoreMetadataCache<FileStore>;

impl<S> StoreMetadataCache<S> {
	/// Create cache on top of the given store.
	pub fn new(store: S) -> Self {
		StoreMetadataCache { store }
	}
}

impl FileMetadataCache {
	/// Open metadata cache in the given directory.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
		Ok(StoreMetadataCache::new(FileStore::open(dir)?))
	}
}

#[async_trait]
impl<C: MetadataCache + ?Sized> MetadataCache for Arc<C> {
	async fn load(&self) -> Result<Option<CachedMetadata>> {
		(**self).load().await
	}

	async fn store(&self, metadata: &CachedMetadata) -> Result<()> {
		(**self).store(metadata).await
	}
}

#[async_trait]
impl<S: KeyValueStore> MetadataCache for StoreMetadataCache<S> {
	async fn load(&self) -> Result<Option<CachedMetadata>> {
		let Some(encoded) = self.store.get(METADATA_CACHE_KEY)? else { return Ok(None) };
		let record = match CacheRecord::decode(&mut &encoded[..]) {
			Ok(record) => record,
			Err(e) => {
				tracing::warn!(
					target: LOG_TARGET,
					error=?e,
					"Cached runtime metadata is corrupted. Ignoring it",
				);
				return Ok(None)
			},
		};

		Ok(Some(CachedMetadata {
			version: RuntimeVersion {
				spec_name: record.spec_name,
				spec_version: record.spec_version,
				transaction_version: record.transaction_version,
			},
			blob: record.blob,
		}))
	}

	async fn store(&self, metadata: &CachedMetadata) -> Result<()> {
		let record = CacheRecord {
			spec_version: metadata.version.spec_version,
			transaction_version: metadata.version.transaction_version,
			spec_name: metadata.version.spec_name.clone(),
			blob: metadata.blob.clone(),
		};
		self.store.put(METADATA_CACHE_KEY, &record.encode()).map_err(Error::from)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils;
	use wallet_utils::MemStore;

	#[tokio::test]
	async fn stores_blob_with_version() {
		let cache = StoreMetadataCache::new(MemStore::new());
		assert_eq!(cache.load().await.unwrap(), None);

		let metadata =
			CachedMetadata { version: test_utils::runtime_version(3), blob: vec![1, 2, 3] };
		cache.store(&metadata).await.unwrap();
		assert_eq!(cache.load().await.unwrap(), Some(metadata));
	}

	#[tokio::test]
	async fn corrupted_record_is_ignored() {
		let store = Arc::new(MemStore::new());
		store.put(METADATA_CACHE_KEY, &[0xff]).unwrap();

		let cache = StoreMetadataCache::new(store);
		assert_eq!(cache.load().await.unwrap(), None);
	}
}
