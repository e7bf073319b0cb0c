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

//! Immutable decoding schema of one runtime version.

use crate::{
	builder::{
		builder_for, BuiltRuntime, CallMetadata, ConstantMetadata, ExtrinsicFormat,
		PalletMetadata, StorageEntry,
	},
	error::{Error, Result},
	registry::{TypeRegistry, Value},
	LOG_TARGET,
};

use codec::Decode;
use frame_metadata::{RuntimeMetadataPrefixed, META_RESERVED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the system pallet.
pub const SYSTEM_PALLET: &str = "System";
/// Name of the address prefix constant of the system pallet.
pub const SS58_PREFIX_CONSTANT: &str = "SS58Prefix";

/// Runtime version, as reported by `state_getRuntimeVersion`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
	/// Runtime name.
	#[serde(default)]
	pub spec_name: Option<String>,
	/// Runtime spec version. Increased with every runtime upgrade.
	pub spec_version: u32,
	/// Version of the extrinsics format.
	pub transaction_version: u32,
}

/// Decoding schema of one runtime version.
///
/// Snapshots are never mutated. When the runtime is upgraded, a new snapshot replaces the
/// current one and everyone who holds the old snapshot keeps using it until they're done.
#[derive(Debug)]
pub struct RuntimeSnapshot {
	spec_version: u32,
	transaction_version: u32,
	metadata_version: u32,
	builder: &'static str,
	registry: TypeRegistry,
	pallets: BTreeMap<String, PalletMetadata>,
	extrinsic: ExtrinsicFormat,
	address_prefix: u16,
	metadata_blob: Vec<u8>,
}

impl RuntimeSnapshot {
	/// Build snapshot from SCALE-encoded metadata blob.
	///
	/// The address prefix is read from the `System.SS58Prefix` constant. If the constant is
	/// missing or can't be decoded, `fallback_prefix` is used.
	pub fn build(blob: &[u8], version: &RuntimeVersion, fallback_prefix: u16) -> Result<Self> {
		let RuntimeMetadataPrefixed(magic, metadata) =
			RuntimeMetadataPrefixed::decode(&mut &blob[..]).map_err(Error::MetadataDecode)?;
		if magic != META_RESERVED {
			return Err(Error::InvalidMagic(magic))
		}

		let metadata_version = metadata.version();
		let builder = builder_for(metadata_version);
		let BuiltRuntime { registry, pallets, extrinsic } = builder.build(metadata)?;

		let mut snapshot = RuntimeSnapshot {
			spec_version: version.spec_version,
			transaction_version: version.transaction_version,
			metadata_version,
			builder: builder.name(),
			registry,
			pallets,
			extrinsic,
			address_prefix: fallback_prefix,
			metadata_blob: blob.to_vec(),
		};
		snapshot.address_prefix = match snapshot.read_address_prefix() {
			Ok(prefix) => prefix,
			Err(e) => {
				tracing::warn!(
					target: LOG_TARGET,
					error=?e,
					"Failed to read address prefix of runtime {}. Using {fallback_prefix}",
					version.spec_version,
				);
				fallback_prefix
			},
		};

		tracing::debug!(
			target: LOG_TARGET,
			spec_version=%snapshot.spec_version,
			metadata_version=%metadata_version,
			builder=%snapshot.builder,
			pallets=%snapshot.pallets.len(),
			"Built runtime snapshot",
		);

		Ok(snapshot)
	}

	/// SCALE-encoded metadata the snapshot has been built from.
	pub fn metadata_blob(&self) -> &[u8] {
		&self.metadata_blob
	}

	/// Runtime spec version.
	pub fn spec_version(&self) -> u32 {
		self.spec_version
	}

	/// Runtime transaction version.
	pub fn transaction_version(&self) -> u32 {
		self.transaction_version
	}

	/// Version of the metadata format.
	pub fn metadata_version(&self) -> u32 {
		self.metadata_version
	}

	/// Name of the registry builder that has been used to build this snapshot.
	pub fn builder(&self) -> &'static str {
		self.builder
	}

	/// Address prefix of the chain.
	pub fn address_prefix(&self) -> u16 {
		self.address_prefix
	}

	/// Type registry.
	pub fn registry(&self) -> &TypeRegistry {
		&self.registry
	}

	/// Extrinsic format of the runtime.
	pub fn extrinsic(&self) -> &ExtrinsicFormat {
		&self.extrinsic
	}

	/// Names of all runtime pallets.
	pub fn pallet_names(&self) -> impl Iterator<Item = &str> {
		self.pallets.keys().map(String::as_str)
	}

	/// Pallet metadata.
	pub fn pallet(&self, pallet: &str) -> Result<&PalletMetadata> {
		self.pallets.get(pallet).ok_or_else(|| Error::PalletNotFound(pallet.into()))
	}

	/// Call metadata.
	pub fn call(&self, pallet: &str, call: &str) -> Result<&CallMetadata> {
		self.pallet(pallet)?
			.calls
			.iter()
			.find(|c| c.name == call)
			.ok_or_else(|| Error::CallNotFound { pallet: pallet.into(), call: call.into() })
	}

	/// Constant metadata.
	pub fn constant(&self, pallet: &str, constant: &str) -> Result<&ConstantMetadata> {
		self.pallet(pallet)?.constants.iter().find(|c| c.name == constant).ok_or_else(|| {
			Error::ConstantNotFound { pallet: pallet.into(), constant: constant.into() }
		})
	}

	/// Storage entry metadata.
	pub fn storage_entry(&self, pallet: &str, entry: &str) -> Result<&StorageEntry> {
		self.pallet(pallet)?
			.storage
			.iter()
			.find(|e| e.name == entry)
			.ok_or_else(|| Error::StorageEntryNotFound { pallet: pallet.into(), entry: entry.into() })
	}

	/// Encode call: pallet index, call index and the encoded arguments.
	pub fn encode_call(&self, pallet: &str, call: &str, args: &[Value]) -> Result<Vec<u8>> {
		let pallet_index = self.pallet(pallet)?.index;
		let call_metadata = self.call(pallet, call)?;
		if call_metadata.arguments.len() != args.len() {
			return Err(Error::ArgumentCount {
				item: format!("{pallet}.{call}"),
				expected: call_metadata.arguments.len(),
				actual: args.len(),
			})
		}

		let mut encoded = vec![pallet_index, call_metadata.index];
		for (argument, value) in call_metadata.arguments.iter().zip(args) {
			self.registry.encode_to(&argument.ty, value, &mut encoded)?;
		}

		Ok(encoded)
	}

	/// Decode constant value.
	pub fn decode_constant(&self, pallet: &str, constant: &str) -> Result<Value> {
		let constant = self.constant(pallet, constant)?;
		self.registry.decode(&constant.ty, &constant.value)
	}

	/// Compute storage key of the entry. Map entries require one value per map key.
	pub fn storage_key(&self, pallet: &str, entry: &str, keys: &[Value]) -> Result<Vec<u8>> {
		let entry_metadata = self.storage_entry(pallet, entry)?;
		if entry_metadata.key_types.len() != keys.len() {
			return Err(Error::ArgumentCount {
				item: format!("{pallet}.{entry}"),
				expected: entry_metadata.key_types.len(),
				actual: keys.len(),
			})
		}

		let mut storage_key = Vec::new();
		storage_key.extend(sp_crypto_hashing::twox_128(entry_metadata.prefix.as_bytes()));
		storage_key.extend(sp_crypto_hashing::twox_128(entry_metadata.name.as_bytes()));
		for ((hasher, key_type), key) in
			entry_metadata.hashers.iter().zip(&entry_metadata.key_types).zip(keys)
		{
			storage_key.extend(hasher.hash(&self.registry.encode(key_type, key)?));
		}

		Ok(storage_key)
	}

	/// Decode storage value. Missing value is decoded from the entry default.
	pub fn decode_storage(&self, pallet: &str, entry: &str, value: Option<&[u8]>) -> Result<Value> {
		let entry = self.storage_entry(pallet, entry)?;
		self.registry.decode(&entry.value_type, value.unwrap_or(&entry.default))
	}

	/// Encode value of the registry type.
	pub fn encode(&self, ty: &str, value: &Value) -> Result<Vec<u8>> {
		self.registry.encode(ty, value)
	}

	/// Decode value of the registry type.
	pub fn decode(&self, ty: &str, bytes: &[u8]) -> Result<Value> {
		self.registry.decode(ty, bytes)
	}

	fn read_address_prefix(&self) -> Result<u16> {
		match self.decode_constant(SYSTEM_PALLET, SS58_PREFIX_CONSTANT)? {
			Value::UInt(prefix) => u16::try_from(prefix).map_err(|_| Error::TypeMismatch {
				ty: SS58_PREFIX_CONSTANT.into(),
				value: prefix.to_string(),
			}),
			value => Err(Error::TypeMismatch {
				ty: SS58_PREFIX_CONSTANT.into(),
				value: value.to_string(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{self, AccountData, AccountId32, BalancesCall, MultiAddress, RuntimeCall};
	use assert_matches::assert_matches;
	use codec::Encode;

	fn snapshot() -> RuntimeSnapshot {
		RuntimeSnapshot::build(&test_utils::metadata_blob(), &test_utils::runtime_version(7), 69)
			.unwrap()
	}

	#[test]
	fn reads_address_prefix_from_metadata() {
		let snapshot = snapshot();
		assert_eq!(snapshot.spec_version(), 7);
		assert_eq!(snapshot.metadata_version(), 14);
		assert_eq!(snapshot.builder(), "portable");
		assert_eq!(snapshot.address_prefix(), test_utils::SS58_PREFIX);
	}

	#[test]
	fn falls_back_to_default_address_prefix() {
		let snapshot = RuntimeSnapshot::build(
			&test_utils::metadata_blob_without_prefix(),
			&test_utils::runtime_version(7),
			69,
		)
		.unwrap();
		assert_eq!(snapshot.address_prefix(), 69);
	}

	#[test]
	fn rejects_invalid_blobs() {
		let version = test_utils::runtime_version(1);
		assert_matches!(
			RuntimeSnapshot::build(&[1, 2, 3], &version, 69),
			Err(Error::MetadataDecode(_))
		);

		let mut blob = test_utils::metadata_blob();
		blob[0] ^= 0xff;
		assert_matches!(RuntimeSnapshot::build(&blob, &version, 69), Err(Error::InvalidMagic(_)));
	}

	#[test]
	fn encodes_calls_like_the_runtime() {
		let snapshot = snapshot();
		let dest = [9u8; 32];

		let encoded = snapshot
			.encode_call(
				"Balances",
				"transfer_keep_alive",
				&[Value::variant("Id", vec![Value::bytes(dest)]), Value::uint(42u8)],
			)
			.unwrap();
		assert_eq!(
			encoded,
			RuntimeCall::Balances(BalancesCall::transfer_keep_alive {
				dest: MultiAddress::Id(AccountId32(dest)),
				value: 42,
			})
			.encode(),
		);

		assert_matches!(
			snapshot.encode_call("Balances", "transfer_keep_alive", &[]),
			Err(Error::ArgumentCount { expected: 2, actual: 0, .. })
		);
		assert_matches!(
			snapshot.encode_call("Balances", "burn", &[]),
			Err(Error::CallNotFound { .. })
		);
		assert_matches!(snapshot.encode_call("Staking", "bond", &[]), Err(Error::PalletNotFound(_)));
	}

	#[test]
	fn batch_accepts_encoded_calls() {
		let snapshot = snapshot();
		let transfer = RuntimeCall::Balances(BalancesCall::transfer_allow_death {
			dest: MultiAddress::Raw(vec![1, 2]),
			value: 1,
		});

		let encoded = snapshot
			.encode_call("Utility", "batch_all", &[Value::Sequence(vec![Value::Encoded(
				transfer.encode(),
			)])])
			.unwrap();
		assert_eq!(
			encoded,
			RuntimeCall::Utility(test_utils::UtilityCall::batch_all { calls: vec![transfer] })
				.encode(),
		);
	}

	#[test]
	fn storage_keys_and_values() {
		let snapshot = snapshot();
		let account = [1u8; 32];

		let key = snapshot.storage_key("Balances", "Account", &[Value::bytes(account)]).unwrap();
		let mut expected = sp_crypto_hashing::twox_128(b"Balances").to_vec();
		expected.extend(sp_crypto_hashing::twox_128(b"Account"));
		expected.extend(sp_crypto_hashing::blake2_128(&account));
		expected.extend(account);
		assert_eq!(key, expected);

		let data = AccountData { free: 100, ..Default::default() };
		let value = snapshot.decode_storage("Balances", "Account", Some(&data.encode())).unwrap();
		assert_eq!(value.field("free"), Some(&Value::uint(100u8)));

		let default = snapshot.decode_storage("Balances", "Account", None).unwrap();
		assert_eq!(default.field("free"), Some(&Value::uint(0u8)));

		assert_eq!(
			snapshot.decode_constant("Balances", "ExistentialDeposit").unwrap(),
			Value::uint(test_utils::EXISTENTIAL_DEPOSIT),
		);
	}
}
