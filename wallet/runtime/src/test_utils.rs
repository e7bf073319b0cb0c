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

//! Runtime metadata of a small test chain.
//!
//! The metadata is generated from Rust types, so it matches what real runtimes expose for
//! pallets that the wallet uses.

#![allow(missing_docs)]

use crate::snapshot::RuntimeVersion;

use codec::{Compact, Decode, Encode};
use frame_metadata::{
	v14::{
		ExtrinsicMetadata, PalletCallMetadata, PalletConstantMetadata, PalletEventMetadata,
		PalletMetadata, PalletStorageMetadata, RuntimeMetadataV14, SignedExtensionMetadata,
		StorageEntryMetadata, StorageEntryModifier, StorageEntryType, StorageHasher,
	},
	RuntimeMetadataPrefixed,
};
use scale_info::{meta_type, TypeInfo};
use std::marker::PhantomData;

/// Address prefix of the test chain.
pub const SS58_PREFIX: u16 = 42;
/// Index of the `System` pallet.
pub const SYSTEM_PALLET_INDEX: u8 = 0;
/// Index of the `Balances` pallet.
pub const BALANCES_PALLET_INDEX: u8 = 5;
/// Index of the `Utility` pallet.
pub const UTILITY_PALLET_INDEX: u8 = 40;
/// Existential deposit of the test chain.
pub const EXISTENTIAL_DEPOSIT: u128 = 500;
/// Path of the `AccountData` type in the portable registry.
pub const ACCOUNT_DATA_PATH: &str = "wallet_runtime::test_utils::AccountData";
/// Signed extensions of the test chain.
pub const SIGNED_EXTENSIONS: [&str; 8] = [
	"CheckNonZeroSender",
	"CheckSpecVersion",
	"CheckTxVersion",
	"CheckGenesis",
	"CheckMortality",
	"CheckNonce",
	"CheckWeight",
	"ChargeTransactionPayment",
];

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct AccountId32(pub [u8; 32]);

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum MultiAddress {
	#[codec(index = 0)]
	Id(AccountId32),
	#[codec(index = 3)]
	Raw(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum MultiSignature {
	#[codec(index = 1)]
	Sr25519([u8; 64]),
}

/// Only the type parameters matter: tools read address, call and signature types from them.
#[derive(TypeInfo)]
pub struct UncheckedExtrinsic<Address, Call, Signature, Extra>(
	PhantomData<(Address, Call, Signature, Extra)>,
);

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct AccountData {
	pub free: u128,
	pub reserved: u128,
	pub frozen: u128,
	pub flags: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct AccountInfo {
	pub nonce: u32,
	pub consumers: u32,
	pub providers: u32,
	pub sufficients: u32,
	pub data: AccountData,
}

#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum BalancesCall {
	#[codec(index = 0)]
	transfer_allow_death {
		dest: MultiAddress,
		#[codec(compact)]
		value: u128,
	},
	#[codec(index = 3)]
	transfer_keep_alive {
		dest: MultiAddress,
		#[codec(compact)]
		value: u128,
	},
}

#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum UtilityCall {
	#[codec(index = 2)]
	batch_all { calls: Vec<RuntimeCall> },
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum SystemEvent {
	#[codec(index = 0)]
	ExtrinsicSuccess,
	#[codec(index = 1)]
	ExtrinsicFailed,
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum RuntimeEvent {
	#[codec(index = 0)]
	System(SystemEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct EventRecord {
	pub event: RuntimeEvent,
	pub topics: Vec<[u8; 32]>,
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum RuntimeCall {
	#[codec(index = 5)]
	Balances(BalancesCall),
	#[codec(index = 40)]
	Utility(UtilityCall),
}

/// Test chain runtime version.
pub fn runtime_version(spec_version: u32) -> RuntimeVersion {
	RuntimeVersion { spec_name: Some("wallet-test".into()), spec_version, transaction_version: 1 }
}

/// Test chain metadata. `System.SS58Prefix` is omitted if `ss58_prefix` is `None`.
pub fn metadata(ss58_prefix: Option<u16>) -> RuntimeMetadataPrefixed {
	let system = PalletMetadata {
		name: "System",
		storage: Some(PalletStorageMetadata {
			prefix: "System",
			entries: vec![
				StorageEntryMetadata {
					name: "Account",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Map {
						hashers: vec![StorageHasher::Blake2_128Concat],
						key: meta_type::<AccountId32>(),
						value: meta_type::<AccountInfo>(),
					},
					default: AccountInfo::default().encode(),
					docs: vec![],
				},
				StorageEntryMetadata {
					name: "Events",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Plain(meta_type::<Vec<EventRecord>>()),
					default: Vec::<EventRecord>::new().encode(),
					docs: vec![],
				},
			],
		}),
		calls: None,
		event: Some(PalletEventMetadata { ty: meta_type::<SystemEvent>() }),
		constants: ss58_prefix
			.map(|prefix| PalletConstantMetadata {
				name: "SS58Prefix",
				ty: meta_type::<u16>(),
				value: prefix.encode(),
				docs: vec![],
			})
			.into_iter()
			.collect(),
		error: None,
		index: SYSTEM_PALLET_INDEX,
	};
	let balances = PalletMetadata {
		name: "Balances",
		storage: Some(PalletStorageMetadata {
			prefix: "Balances",
			entries: vec![
				StorageEntryMetadata {
					name: "Account",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Map {
						hashers: vec![StorageHasher::Blake2_128Concat],
						key: meta_type::<AccountId32>(),
						value: meta_type::<AccountData>(),
					},
					default: AccountData::default().encode(),
					docs: vec![],
				},
				StorageEntryMetadata {
					name: "TotalIssuance",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Plain(meta_type::<u128>()),
					default: 0u128.encode(),
					docs: vec![],
				},
			],
		}),
		calls: Some(PalletCallMetadata { ty: meta_type::<BalancesCall>() }),
		event: None,
		constants: vec![PalletConstantMetadata {
			name: "ExistentialDeposit",
			ty: meta_type::<u128>(),
			value: EXISTENTIAL_DEPOSIT.encode(),
			docs: vec![],
		}],
		error: None,
		index: BALANCES_PALLET_INDEX,
	};
	let utility = PalletMetadata {
		name: "Utility",
		storage: None,
		calls: Some(PalletCallMetadata { ty: meta_type::<UtilityCall>() }),
		event: None,
		constants: vec![],
		error: None,
		index: UTILITY_PALLET_INDEX,
	};

	let signed_extension = |identifier, ty, additional_signed| SignedExtensionMetadata {
		identifier,
		ty,
		additional_signed,
	};
	let extrinsic = ExtrinsicMetadata {
		ty: meta_type::<UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, ()>>(),
		version: 4,
		signed_extensions: vec![
			signed_extension("CheckNonZeroSender", meta_type::<()>(), meta_type::<()>()),
			signed_extension("CheckSpecVersion", meta_type::<()>(), meta_type::<u32>()),
			signed_extension("CheckTxVersion", meta_type::<()>(), meta_type::<u32>()),
			signed_extension("CheckGenesis", meta_type::<()>(), meta_type::<[u8; 32]>()),
			signed_extension("CheckMortality", meta_type::<u8>(), meta_type::<[u8; 32]>()),
			signed_extension("CheckNonce", meta_type::<Compact<u32>>(), meta_type::<()>()),
			signed_extension("CheckWeight", meta_type::<()>(), meta_type::<()>()),
			signed_extension(
				"ChargeTransactionPayment",
				meta_type::<Compact<u128>>(),
				meta_type::<()>(),
			),
		],
	};

	RuntimeMetadataV14::new(vec![system, balances, utility], extrinsic, meta_type::<()>()).into()
}

/// SCALE-encoded test chain metadata, as returned by `state_getMetadata`.
pub fn metadata_blob() -> Vec<u8> {
	metadata(Some(SS58_PREFIX)).encode()
}

/// SCALE-encoded test chain metadata without the address prefix constant.
pub fn metadata_blob_without_prefix() -> Vec<u8> {
	metadata(None).encode()
}
