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

//! Type registry builders.
//!
//! Runtimes with metadata `V14` and later describe every type they use in the portable type
//! registry. Older runtimes only give us type names, so their registry is assembled from the
//! bundled set of named type definitions instead.

use crate::{
	error::{Error, Result},
	registry::{Field, TypeName, TypeRegistry},
};

use frame_metadata::RuntimeMetadata;
use std::collections::BTreeMap;

pub use legacy::LegacyRegistryBuilder;
pub use portable::PortableRegistryBuilder;

mod legacy;
mod portable;

/// The first metadata version that carries the portable type registry.
pub const PORTABLE_METADATA_VERSION: u32 = 14;

/// Storage key hasher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageHasher {
	/// 128-bit Blake2 hash.
	Blake2_128,
	/// 256-bit Blake2 hash.
	Blake2_256,
	/// 128-bit Blake2 hash, followed by the key itself.
	Blake2_128Concat,
	/// 128-bit XX hash.
	Twox128,
	/// 256-bit XX hash.
	Twox256,
	/// 64-bit XX hash, followed by the key itself.
	Twox64Concat,
	/// The key itself.
	Identity,
}

impl StorageHasher {
	/// Hash encoded storage key.
	pub fn hash(&self, encoded_key: &[u8]) -> Vec<u8> {
		use sp_crypto_hashing::{blake2_128, blake2_256, twox_128, twox_256, twox_64};
		match self {
			StorageHasher::Blake2_128 => blake2_128(encoded_key).to_vec(),
			StorageHasher::Blake2_256 => blake2_256(encoded_key).to_vec(),
			StorageHasher::Blake2_128Concat =>
				blake2_128(encoded_key).iter().chain(encoded_key).copied().collect(),
			StorageHasher::Twox128 => twox_128(encoded_key).to_vec(),
			StorageHasher::Twox256 => twox_256(encoded_key).to_vec(),
			StorageHasher::Twox64Concat =>
				twox_64(encoded_key).iter().chain(encoded_key).copied().collect(),
			StorageHasher::Identity => encoded_key.to_vec(),
		}
	}
}

/// Storage entry of the pallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEntry {
	/// Storage prefix of the pallet.
	pub prefix: String,
	/// Entry name.
	pub name: String,
	/// Hashers of the map keys. Empty for plain entries.
	pub hashers: Vec<StorageHasher>,
	/// Types of the map keys. Empty for plain entries.
	pub key_types: Vec<TypeName>,
	/// Value type.
	pub value_type: TypeName,
	/// Encoded default value.
	pub default: Vec<u8>,
}

/// Dispatchable call of the pallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallMetadata {
	/// Call name.
	pub name: String,
	/// Call index within the pallet.
	pub index: u8,
	/// Call arguments.
	pub arguments: Vec<Field>,
}

/// Constant of the pallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantMetadata {
	/// Constant name.
	pub name: String,
	/// Constant type.
	pub ty: TypeName,
	/// Encoded constant value.
	pub value: Vec<u8>,
}

/// Pallet of the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PalletMetadata {
	/// Pallet name.
	pub name: String,
	/// Pallet index, the first byte of every pallet call.
	pub index: u8,
	/// Pallet storage entries.
	pub storage: Vec<StorageEntry>,
	/// Pallet calls.
	pub calls: Vec<CallMetadata>,
	/// Pallet constants.
	pub constants: Vec<ConstantMetadata>,
}

/// Signed extension, which is appended to every signed extrinsic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedExtension {
	/// Extension identifier, like `CheckNonce`.
	pub identifier: String,
	/// Type of data that is included in the extrinsic.
	pub extra: TypeName,
	/// Type of data that is only included in the signed payload.
	pub additional: TypeName,
}

/// Format of extrinsics, accepted by the runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtrinsicFormat {
	/// Extrinsic format version.
	pub version: u8,
	/// Ordered signed extensions.
	pub signed_extensions: Vec<SignedExtension>,
}

/// Everything the registry builder has extracted from the metadata.
#[derive(Clone, Debug, Default)]
pub struct BuiltRuntime {
	/// Type registry.
	pub registry: TypeRegistry,
	/// Pallets, keyed by name.
	pub pallets: BTreeMap<String, PalletMetadata>,
	/// Extrinsic format.
	pub extrinsic: ExtrinsicFormat,
}

impl BuiltRuntime {
	/// Insert pallet, rejecting duplicate names.
	pub(crate) fn insert_pallet(&mut self, pallet: PalletMetadata) -> Result<()> {
		match self.pallets.insert(pallet.name.clone(), pallet) {
			Some(previous) =>
				Err(Error::InvalidMetadata(format!("duplicate pallet {}", previous.name))),
			None => Ok(()),
		}
	}
}

/// Strategy that turns decoded runtime metadata into type registry and metadata tree.
pub trait TypeRegistryBuilder: Send + Sync {
	/// Builder name, used in logs.
	fn name(&self) -> &'static str;

	/// Build registry from the metadata.
	fn build(&self, metadata: RuntimeMetadata) -> Result<BuiltRuntime>;
}

/// Select registry builder for the given metadata version.
pub fn builder_for(metadata_version: u32) -> Box<dyn TypeRegistryBuilder> {
	if metadata_version >= PORTABLE_METADATA_VERSION {
		Box::new(PortableRegistryBuilder)
	} else {
		Box::new(LegacyRegistryBuilder::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_is_selected_by_metadata_version() {
		assert_eq!(builder_for(13).name(), "legacy");
		assert_eq!(builder_for(14).name(), "portable");
		assert_eq!(builder_for(15).name(), "portable");
	}

	#[test]
	fn concat_hashers_keep_the_key() {
		let key = 42u32.to_le_bytes();
		let hashed = StorageHasher::Twox64Concat.hash(&key);
		assert_eq!(hashed.len(), 8 + key.len());
		assert_eq!(&hashed[8..], &key[..]);
		assert_eq!(StorageHasher::Blake2_128Concat.hash(&key).len(), 16 + key.len());
		assert_eq!(StorageHasher::Identity.hash(&key), key.to_vec());
	}
}
