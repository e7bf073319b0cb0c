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

//! Errors of the shared utilities.

use std::path::PathBuf;

/// Result type used by the shared utilities.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may happen while reading configuration or accessing the local store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Failed to read or write a file.
	#[error("I/O error at {path:?}: {error}")]
	Io {
		/// File the operation was performed on.
		path: PathBuf,
		/// Underlying error.
		error: std::io::Error,
	},
	/// The configuration file is not valid TOML or has invalid values.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	/// Store key contains characters that can't be mapped to the storage engine.
	#[error("Invalid store key: {0:?}")]
	InvalidKey(String),
}
