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

//! Opaque keyed store the wallet core persists its data into.
//!
//! The core never assumes a particular storage engine: values are opaque bytes addressed by
//! string keys. Applications embedding the core usually provide their own implementation,
//! [`MemStore`] and [`FileStore`] are the ones used by tests and by the command line wallet.

use crate::error::{Error, Result};

use parking_lot::RwLock;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

/// Keyed read/write access to the local persistent store.
pub trait KeyValueStore: Send + Sync {
	/// Read value stored under the `key`.
	fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
	/// Write value under the `key`, replacing existing one.
	fn put(&self, key: &str, value: &[u8]) -> Result<()>;
	/// Remove value stored under the `key`. Removing missing key is not an error.
	fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
	fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		(**self).get(key)
	}

	fn put(&self, key: &str, value: &[u8]) -> Result<()> {
		(**self).put(key, value)
	}

	fn remove(&self, key: &str) -> Result<()> {
		(**self).remove(key)
	}
}

/// This implements `KeyValueStore` as an in-memory hash map.
#[derive(Debug, Default)]
pub struct MemStore(RwLock<HashMap<String, Vec<u8>>>);

impl MemStore {
	/// Create a new instance.
	pub fn new() -> Self {
		MemStore::default()
	}

	/// Number of stored values.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true if nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

impl KeyValueStore for MemStore {
	fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		Ok(self.0.read().get(key).cloned())
	}

	fn put(&self, key: &str, value: &[u8]) -> Result<()> {
		self.0.write().insert(key.into(), value.to_vec());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.0.write().remove(key);
		Ok(())
	}
}

/// Store that keeps every value in its own file inside the given directory.
///
/// Writes go to a temporary file first and are then renamed over the target, so a reader
/// never observes a partially written value.
#[derive(Debug, Clone)]
pub struct FileStore {
	root: PathBuf,
}

impl FileStore {
	/// Open (and create, if required) the store directory.
	pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
		let root = root.into();
		std::fs::create_dir_all(&root).map_err(|error| Error::Io { path: root.clone(), error })?;
		Ok(FileStore { root })
	}

	/// Directory the store lives in.
	pub fn root(&self) -> &Path {
		&self.root
	}

	fn path_of(&self, key: &str) -> Result<PathBuf> {
		let is_valid = !key.is_empty() &&
			key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) &&
			!key.starts_with('.');
		if !is_valid {
			return Err(Error::InvalidKey(key.into()))
		}

		Ok(self.root.join(key))
	}
}

impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		let path = self.path_of(key)?;
		match std::fs::read(&path) {
			Ok(value) => Ok(Some(value)),
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(error) => Err(Error::Io { path, error }),
		}
	}

	fn put(&self, key: &str, value: &[u8]) -> Result<()> {
		let path = self.path_of(key)?;
		let tmp_path = self.root.join(format!(".{key}.tmp"));
		std::fs::write(&tmp_path, value)
			.map_err(|error| Error::Io { path: tmp_path.clone(), error })?;
		std::fs::rename(&tmp_path, &path).map_err(|error| Error::Io { path, error })
	}

	fn remove(&self, key: &str) -> Result<()> {
		let path = self.path_of(key)?;
		match std::fs::remove_file(&path) {
			Ok(()) => Ok(()),
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(error) => Err(Error::Io { path, error }),
		}
	}
}
