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

//! Runtime metadata manager errors.

/// Result type used by the runtime metadata manager.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors of the runtime metadata manager and of the snapshot it builds.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Metadata blob can't be decoded.
	#[error("Failed to decode runtime metadata: {0}")]
	MetadataDecode(codec::Error),
	/// Metadata blob doesn't start with the metadata magic number.
	#[error("Runtime metadata has invalid magic number {0:#x}")]
	InvalidMagic(u32),
	/// There's no registry builder for this metadata version.
	#[error("Unsupported runtime metadata version {0}")]
	UnsupportedMetadata(u32),
	/// Metadata is decodable, but is inconsistent.
	#[error("Invalid runtime metadata: {0}")]
	InvalidMetadata(String),
	/// Type is missing from the type registry.
	#[error("Unknown type {0:?}")]
	UnknownType(String),
	/// Value can't be encoded using given type, or type can't be decoded into value.
	#[error("Value {value} doesn't match type {ty:?}")]
	TypeMismatch {
		/// Type name.
		ty: String,
		/// Short description of the value.
		value: String,
	},
	/// Type definitions are nested too deep (or are recursive without an end).
	#[error("Type {0:?} is nested too deep")]
	RecursionLimit(String),
	/// Pallet is missing from the runtime.
	#[error("Pallet {0} is missing from the runtime")]
	PalletNotFound(String),
	/// Call is missing from the pallet.
	#[error("Call {pallet}.{call} is missing from the runtime")]
	CallNotFound {
		/// Pallet name.
		pallet: String,
		/// Call name.
		call: String,
	},
	/// Constant is missing from the pallet.
	#[error("Constant {pallet}.{constant} is missing from the runtime")]
	ConstantNotFound {
		/// Pallet name.
		pallet: String,
		/// Constant name.
		constant: String,
	},
	/// Storage entry is missing from the pallet.
	#[error("Storage entry {pallet}.{entry} is missing from the runtime")]
	StorageEntryNotFound {
		/// Pallet name.
		pallet: String,
		/// Storage entry name.
		entry: String,
	},
	/// Call or storage key has been given wrong number of arguments.
	#[error("{item} expects {expected} arguments, got {actual}")]
	ArgumentCount {
		/// Call or storage entry name.
		item: String,
		/// Expected number of arguments.
		expected: usize,
		/// Actual number of arguments.
		actual: usize,
	},
	/// Encoding or decoding failed.
	#[error("Codec error: {0}")]
	Codec(#[from] codec::Error),
	/// Node couldn't be reached or has returned an error.
	#[error("Transport error: {0}")]
	Transport(String),
	/// Runtime metadata cache can't be read or written.
	#[error("Runtime metadata cache error: {0}")]
	Cache(String),
	/// No runtime snapshot can be built: nothing is cached and the node is unreachable.
	#[error("Runtime is not available: {0}")]
	Unavailable(String),
}

impl From<wallet_utils::Error> for Error {
	fn from(error: wallet_utils::Error) -> Self {
		Error::Cache(error.to_string())
	}
}
