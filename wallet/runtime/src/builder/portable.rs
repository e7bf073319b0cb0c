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

//! Registry builder for metadata that carries the portable type registry (`V14` and later).

use super::{
	BuiltRuntime, CallMetadata, ConstantMetadata, ExtrinsicFormat, PalletMetadata,
	SignedExtension, StorageEntry, StorageHasher, TypeRegistryBuilder,
};
use crate::{
	error::{Error, Result},
	registry::{Field, Primitive, TypeDef, TypeName, TypeRegistry, Variant},
	LOG_TARGET,
};

use frame_metadata::{v14, RuntimeMetadata};
use scale_info::{
	form::PortableForm, PortableRegistry, TypeDef as PortableTypeDef, TypeDefPrimitive,
};
use std::collections::HashMap;

/// Registry builder for `V14` and `V15` metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortableRegistryBuilder;

// `V14` and `V15` pallets and extrinsic metadata share field names, but not types.
macro_rules! build_runtime {
	($metadata:expr) => {{
		let metadata = $metadata;
		let types = &metadata.types;
		let mut runtime = BuiltRuntime { registry: registry_from(types), ..Default::default() };

		for pallet in metadata.pallets {
			let storage = match pallet.storage {
				Some(storage) => storage
					.entries
					.into_iter()
					.map(|entry| storage_entry(types, &storage.prefix, entry))
					.collect::<Result<Vec<_>>>()?,
				None => Vec::new(),
			};
			let calls = match pallet.calls {
				Some(calls) => calls_of(types, &pallet.name, calls.ty.id)?,
				None => Vec::new(),
			};
			let constants = pallet
				.constants
				.into_iter()
				.map(|constant| ConstantMetadata {
					name: constant.name,
					ty: type_name(constant.ty.id),
					value: constant.value,
				})
				.collect();

			runtime.insert_pallet(PalletMetadata {
				name: pallet.name,
				index: pallet.index,
				storage,
				calls,
				constants,
			})?;
		}

		runtime.extrinsic = ExtrinsicFormat {
			version: metadata.extrinsic.version,
			signed_extensions: metadata
				.extrinsic
				.signed_extensions
				.into_iter()
				.map(|extension| SignedExtension {
					identifier: extension.identifier,
					extra: type_name(extension.ty.id),
					additional: type_name(extension.additional_signed.id),
				})
				.collect(),
		};

		Ok(runtime)
	}};
}

impl TypeRegistryBuilder for PortableRegistryBuilder {
	fn name(&self) -> &'static str {
		"portable"
	}

	fn build(&self, metadata: RuntimeMetadata) -> Result<BuiltRuntime> {
		match metadata {
			RuntimeMetadata::V14(metadata) => build_runtime!(metadata),
			RuntimeMetadata::V15(metadata) => build_runtime!(metadata),
			metadata => Err(Error::UnsupportedMetadata(metadata.version())),
		}
	}
}

/// Name of the portable type in our registry.
pub fn type_name(id: u32) -> TypeName {
	format!("#{id}")
}

fn registry_from(types: &PortableRegistry) -> TypeRegistry {
	let mut registry = TypeRegistry::new();
	let mut paths: HashMap<String, Vec<u32>> = HashMap::new();
	for ty in &types.types {
		registry.insert(type_name(ty.id), type_def(&ty.ty.type_def));
		if !ty.ty.path.segments.is_empty() {
			paths.entry(ty.ty.path.segments.join("::")).or_default().push(ty.id);
		}
	}

	// generic types have several instances with the same path, so we can't alias them
	for (path, ids) in paths {
		if let [id] = ids[..] {
			registry.insert(path, TypeDef::Alias(type_name(id)));
		}
	}

	tracing::trace!(target: LOG_TARGET, "Converted {} portable types", types.types.len());

	registry
}

fn type_def(def: &PortableTypeDef<PortableForm>) -> TypeDef {
	match def {
		PortableTypeDef::Composite(composite) =>
			TypeDef::Composite(composite.fields.iter().map(field).collect()),
		PortableTypeDef::Variant(variant) => TypeDef::Variant(
			variant
				.variants
				.iter()
				.map(|variant| Variant {
					name: variant.name.clone(),
					index: variant.index,
					fields: variant.fields.iter().map(field).collect(),
				})
				.collect(),
		),
		PortableTypeDef::Sequence(sequence) => TypeDef::Sequence(type_name(sequence.type_param.id)),
		PortableTypeDef::Array(array) => TypeDef::Array(array.len, type_name(array.type_param.id)),
		PortableTypeDef::Tuple(tuple) =>
			TypeDef::Tuple(tuple.fields.iter().map(|ty| type_name(ty.id)).collect()),
		PortableTypeDef::Primitive(primitive) => TypeDef::Primitive(match primitive {
			TypeDefPrimitive::Bool => Primitive::Bool,
			TypeDefPrimitive::Char => Primitive::Char,
			TypeDefPrimitive::Str => Primitive::Str,
			TypeDefPrimitive::U8 => Primitive::U8,
			TypeDefPrimitive::U16 => Primitive::U16,
			TypeDefPrimitive::U32 => Primitive::U32,
			TypeDefPrimitive::U64 => Primitive::U64,
			TypeDefPrimitive::U128 => Primitive::U128,
			TypeDefPrimitive::U256 => Primitive::U256,
			TypeDefPrimitive::I8 => Primitive::I8,
			TypeDefPrimitive::I16 => Primitive::I16,
			TypeDefPrimitive::I32 => Primitive::I32,
			TypeDefPrimitive::I64 => Primitive::I64,
			TypeDefPrimitive::I128 => Primitive::I128,
			TypeDefPrimitive::I256 => Primitive::I256,
		}),
		PortableTypeDef::Compact(compact) => TypeDef::Compact(type_name(compact.type_param.id)),
		PortableTypeDef::BitSequence(_) => TypeDef::BitSequence,
	}
}

fn field(field: &scale_info::Field<PortableForm>) -> Field {
	Field { name: field.name.clone(), ty: type_name(field.ty.id) }
}

fn calls_of(types: &PortableRegistry, pallet: &str, calls_type: u32) -> Result<Vec<CallMetadata>> {
	let ty = types.resolve(calls_type).ok_or_else(|| {
		Error::InvalidMetadata(format!("calls type {calls_type} of pallet {pallet} is missing"))
	})?;
	match ty.type_def {
		PortableTypeDef::Variant(ref calls) => Ok(calls
			.variants
			.iter()
			.map(|call| CallMetadata {
				name: call.name.clone(),
				index: call.index,
				arguments: call.fields.iter().map(field).collect(),
			})
			.collect()),
		_ => Err(Error::InvalidMetadata(format!("calls type of pallet {pallet} is not an enum"))),
	}
}

fn storage_entry(
	types: &PortableRegistry,
	prefix: &str,
	entry: v14::StorageEntryMetadata<PortableForm>,
) -> Result<StorageEntry> {
	let (hashers, key_types, value_type) = match entry.ty {
		v14::StorageEntryType::Plain(value) => (Vec::new(), Vec::new(), type_name(value.id)),
		v14::StorageEntryType::Map { hashers, key, value } => {
			let hashers = hashers.iter().map(hasher).collect::<Vec<_>>();
			let key_types = match hashers.len() {
				1 => vec![type_name(key.id)],
				// multi-key maps have a tuple key, every tuple item is hashed separately
				len => match types.resolve(key.id).map(|ty| &ty.type_def) {
					Some(PortableTypeDef::Tuple(tuple)) if tuple.fields.len() == len =>
						tuple.fields.iter().map(|ty| type_name(ty.id)).collect(),
					_ =>
						return Err(Error::InvalidMetadata(format!(
							"storage map {prefix}.{} has {len} hashers, but its key is not a tuple \
							of {len} items",
							entry.name,
						))),
				},
			};
			(hashers, key_types, type_name(value.id))
		},
	};

	Ok(StorageEntry {
		prefix: prefix.into(),
		name: entry.name,
		hashers,
		key_types,
		value_type,
		default: entry.default,
	})
}

fn hasher(hasher: &v14::StorageHasher) -> StorageHasher {
	match hasher {
		v14::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
		v14::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
		v14::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
		v14::StorageHasher::Twox128 => StorageHasher::Twox128,
		v14::StorageHasher::Twox256 => StorageHasher::Twox256,
		v14::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
		v14::StorageHasher::Identity => StorageHasher::Identity,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{registry::Value, test_utils};
	use codec::{Compact, Decode, Encode};
	use frame_metadata::RuntimeMetadataPrefixed;
	use pretty_assertions::assert_eq;

	fn built() -> BuiltRuntime {
		let metadata = RuntimeMetadataPrefixed::decode(&mut &test_utils::metadata_blob()[..])
			.unwrap()
			.1;
		PortableRegistryBuilder.build(metadata).unwrap()
	}

	#[test]
	fn extracts_pallets_and_extrinsic_format() {
		let runtime = built();

		let balances = &runtime.pallets["Balances"];
		assert_eq!(balances.index, test_utils::BALANCES_PALLET_INDEX);
		assert_eq!(
			balances.calls.iter().map(|call| call.name.as_str()).collect::<Vec<_>>(),
			vec!["transfer_allow_death", "transfer_keep_alive"],
		);
		assert_eq!(balances.storage[0].hashers, vec![StorageHasher::Blake2_128Concat]);
		assert_eq!(balances.storage[0].key_types.len(), 1);

		let utility = &runtime.pallets["Utility"];
		assert_eq!(utility.calls[0].name, "batch_all");
		assert_eq!(utility.calls[0].index, 2);

		assert_eq!(runtime.extrinsic.version, 4);
		assert_eq!(
			runtime
				.extrinsic
				.signed_extensions
				.iter()
				.map(|extension| extension.identifier.as_str())
				.collect::<Vec<_>>(),
			test_utils::SIGNED_EXTENSIONS.to_vec(),
		);
	}

	#[test]
	fn call_arguments_use_registry_types() {
		let runtime = built();
		let call = &runtime.pallets["Balances"].calls[0];
		let args = vec![
			Value::variant("Id", vec![Value::bytes([7u8; 32])]),
			Value::uint(1_000_000_000_000u64),
		];

		let mut encoded = Vec::new();
		for (argument, value) in call.arguments.iter().zip(&args) {
			runtime.registry.encode_to(&argument.ty, value, &mut encoded).unwrap();
		}
		assert_eq!(encoded, (0u8, [7u8; 32], Compact(1_000_000_000_000u128)).encode());
	}

	#[test]
	fn unique_paths_are_aliased() {
		let runtime = built();
		let account_data =
			test_utils::AccountData { free: 10, reserved: 20, frozen: 30, flags: 40 };

		let decoded =
			runtime.registry.decode(test_utils::ACCOUNT_DATA_PATH, &account_data.encode()).unwrap();
		assert_eq!(decoded.field("reserved"), Some(&Value::uint(20u8)));
	}
}
