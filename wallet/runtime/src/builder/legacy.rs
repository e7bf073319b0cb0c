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

//! Registry builder for metadata that only names its types (`V13`).
//!
//! Type names are resolved using the set of named type definitions. The bundled set covers
//! the types used by wallet calls, storage entries and signed extensions. Definitions follow
//! the well-known JSON layout: a string is an alias expression, an object with `_enum` key is
//! an enum, and any other object is a struct.

use super::{
	BuiltRuntime, CallMetadata, ConstantMetadata, ExtrinsicFormat, PalletMetadata,
	SignedExtension, StorageEntry, StorageHasher, TypeRegistryBuilder,
};
use crate::{
	error::{Error, Result},
	registry::{Field, Primitive, TypeDef, TypeName, TypeRegistry, Variant},
	LOG_TARGET,
};

use frame_metadata::{decode_different::DecodeDifferent, v13, RuntimeMetadata};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::{
	borrow::Cow,
	collections::{HashMap, HashSet},
};

/// Bundled named type definitions.
const BUNDLED_TYPES: &str = include_str!("legacy_types.json");

/// Registry builder for `V13` metadata.
#[derive(Clone, Debug)]
pub struct LegacyRegistryBuilder {
	preset: Cow<'static, str>,
}

impl Default for LegacyRegistryBuilder {
	fn default() -> Self {
		LegacyRegistryBuilder { preset: Cow::Borrowed(BUNDLED_TYPES) }
	}
}

impl LegacyRegistryBuilder {
	/// Use custom JSON type definitions instead of the bundled ones.
	pub fn with_preset(preset: String) -> Self {
		LegacyRegistryBuilder { preset: Cow::Owned(preset) }
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Preset {
	types: Map<String, JsonValue>,
	#[serde(default)]
	signed_extensions: HashMap<String, ExtensionTypes>,
}

#[derive(Debug, Deserialize)]
struct ExtensionTypes {
	extra: String,
	additional: String,
}

impl TypeRegistryBuilder for LegacyRegistryBuilder {
	fn name(&self) -> &'static str {
		"legacy"
	}

	fn build(&self, metadata: RuntimeMetadata) -> Result<BuiltRuntime> {
		let metadata = match metadata {
			RuntimeMetadata::V13(metadata) => metadata,
			metadata => return Err(Error::UnsupportedMetadata(metadata.version())),
		};
		let preset: Preset = serde_json::from_str(&self.preset)
			.map_err(|e| Error::InvalidMetadata(format!("invalid legacy type definitions: {e}")))?;

		let mut types = NamedTypes::new(&preset.types);
		let mut runtime = BuiltRuntime::default();
		for module in decoded(metadata.modules)? {
			let name = decoded(module.name)?;

			let mut storage = Vec::new();
			if let Some(module_storage) = module.storage {
				let module_storage = decoded(module_storage)?;
				let prefix = decoded(module_storage.prefix)?;
				for entry in decoded(module_storage.entries)? {
					storage.push(storage_entry(&mut types, &prefix, entry)?);
				}
			}

			let mut calls = Vec::new();
			let module_calls = module.calls.map(decoded).transpose()?.unwrap_or_default();
			for (index, call) in module_calls.into_iter().enumerate() {
				let index = u8::try_from(index).map_err(|_| {
					Error::InvalidMetadata(format!("pallet {name} has too many calls"))
				})?;
				let arguments = decoded(call.arguments)?
					.into_iter()
					.map(|argument| {
						let ty = types.register(&decoded(argument.ty)?);
						Ok(Field::named(decoded(argument.name)?, ty))
					})
					.collect::<Result<_>>()?;
				calls.push(CallMetadata { name: decoded(call.name)?, index, arguments });
			}

			let constants = decoded(module.constants)?
				.into_iter()
				.map(|constant| {
					Ok(ConstantMetadata {
						name: decoded(constant.name)?,
						ty: types.register(&decoded(constant.ty)?),
						value: decoded(constant.value)?,
					})
				})
				.collect::<Result<_>>()?;

			runtime.insert_pallet(PalletMetadata {
				name,
				index: module.index,
				storage,
				calls,
				constants,
			})?;
		}

		let mut signed_extensions = Vec::new();
		for identifier in metadata.extrinsic.signed_extensions {
			let identifier = decoded(identifier)?;
			let (extra, additional) = match preset.signed_extensions.get(&identifier) {
				Some(ext) => (types.register(&ext.extra), types.register(&ext.additional)),
				None => {
					tracing::debug!(
						target: LOG_TARGET,
						"No type definitions for signed extension {identifier}",
					);
					(types.register("()"), types.register("()"))
				},
			};
			signed_extensions.push(SignedExtension { identifier, extra, additional });
		}
		runtime.extrinsic = ExtrinsicFormat { version: metadata.extrinsic.version, signed_extensions };

		// make every named type available, even if metadata never mentions it
		for name in preset.types.keys() {
			types.register(name);
		}
		runtime.registry = types.registry;

		Ok(runtime)
	}
}

fn decoded<B: 'static, O: 'static>(value: DecodeDifferent<B, O>) -> Result<O> {
	match value {
		DecodeDifferent::Decoded(value) => Ok(value),
		DecodeDifferent::Encode(_) =>
			Err(Error::InvalidMetadata("legacy metadata has not been decoded".into())),
	}
}

fn storage_entry(
	types: &mut NamedTypes,
	prefix: &str,
	entry: v13::StorageEntryMetadata,
) -> Result<StorageEntry> {
	let (hashers, key_types, value_type) = match entry.ty {
		v13::StorageEntryType::Plain(value) =>
			(Vec::new(), Vec::new(), types.register(&decoded(value)?)),
		v13::StorageEntryType::Map { hasher: key_hasher, key, value, .. } => (
			vec![hasher(&key_hasher)],
			vec![types.register(&decoded(key)?)],
			types.register(&decoded(value)?),
		),
		v13::StorageEntryType::DoubleMap { hasher: key1_hasher, key1, key2, value, key2_hasher } => (
			vec![hasher(&key1_hasher), hasher(&key2_hasher)],
			vec![types.register(&decoded(key1)?), types.register(&decoded(key2)?)],
			types.register(&decoded(value)?),
		),
		v13::StorageEntryType::NMap { keys, hashers, value } => {
			let keys = decoded(keys)?;
			let hashers = decoded(hashers)?;
			if keys.len() != hashers.len() {
				return Err(Error::InvalidMetadata(format!(
					"storage map {prefix} has {} keys and {} hashers",
					keys.len(),
					hashers.len(),
				)))
			}
			(
				hashers.iter().map(hasher).collect(),
				keys.iter().map(|key| types.register(key)).collect(),
				types.register(&decoded(value)?),
			)
		},
	};

	Ok(StorageEntry {
		prefix: prefix.into(),
		name: decoded(entry.name)?,
		hashers,
		key_types,
		value_type,
		default: decoded(entry.default)?,
	})
}

fn hasher(hasher: &v13::StorageHasher) -> StorageHasher {
	match hasher {
		v13::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
		v13::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
		v13::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
		v13::StorageHasher::Twox128 => StorageHasher::Twox128,
		v13::StorageHasher::Twox256 => StorageHasher::Twox256,
		v13::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
		v13::StorageHasher::Identity => StorageHasher::Identity,
	}
}

/// Registry that is filled from type name expressions.
struct NamedTypes<'a> {
	definitions: &'a Map<String, JsonValue>,
	registry: TypeRegistry,
	visiting: HashSet<String>,
}

impl<'a> NamedTypes<'a> {
	fn new(definitions: &'a Map<String, JsonValue>) -> Self {
		NamedTypes { definitions, registry: TypeRegistry::new(), visiting: HashSet::new() }
	}

	/// Register type expression (and every type it references) and return its registry name.
	///
	/// Types that can't be resolved are left out of the registry. Encoding or decoding them
	/// fails later with [`Error::UnknownType`].
	fn register(&mut self, expr: &str) -> TypeName {
		let name = normalize(expr);
		// recursive types reference themselves by name
		if self.registry.contains(&name) || !self.visiting.insert(name.clone()) {
			return name
		}

		match self.definition(&name) {
			Some(def) => self.registry.insert(name.clone(), def),
			None => tracing::debug!(target: LOG_TARGET, "Type {name} is not defined"),
		}
		self.visiting.remove(&name);

		name
	}

	fn definition(&mut self, name: &str) -> Option<TypeDef> {
		if let Some(primitive) = Primitive::from_name(name) {
			return Some(TypeDef::Primitive(primitive))
		}
		if name == "Bytes" {
			return Some(TypeDef::Sequence(self.register("u8")))
		}
		if let Some(items) = name.strip_prefix('(').and_then(|n| n.strip_suffix(')')) {
			return Some(TypeDef::Tuple(
				split_top_level(items).iter().map(|item| self.register(item)).collect(),
			))
		}
		if let Some(array) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
			let (item, len) = array.rsplit_once(';')?;
			return Some(TypeDef::Array(len.parse().ok()?, self.register(item)))
		}
		if let Some((outer, args)) = generic(name) {
			let args = split_top_level(args);
			return Some(match (outer, args.as_slice()) {
				("Vec" | "VecDeque" | "BTreeSet" | "BoundedVec" | "WeakBoundedVec", [item, ..]) =>
					TypeDef::Sequence(self.register(item)),
				("Compact", [inner]) => TypeDef::Compact(self.register(inner)),
				("Option", [inner]) => TypeDef::Option(self.register(inner)),
				("Box" | "Rc" | "Arc", [inner]) => TypeDef::Alias(self.register(inner)),
				("BTreeMap" | "HashMap", [key, value]) =>
					TypeDef::Sequence(self.register(&format!("({key},{value})"))),
				// generic parameters of named types don't change their encoding
				_ => TypeDef::Alias(self.register(outer)),
			})
		}

		let definitions = self.definitions;
		match definitions.get(name)? {
			JsonValue::String(expr) => Some(TypeDef::Alias(self.register(expr))),
			JsonValue::Object(object) => match object.get("_enum") {
				Some(JsonValue::Array(names)) => names
					.iter()
					.enumerate()
					.map(|(index, name)| {
						Some(Variant {
							name: name.as_str()?.into(),
							index: u8::try_from(index).ok()?,
							fields: Vec::new(),
						})
					})
					.collect::<Option<_>>()
					.map(TypeDef::Variant),
				Some(JsonValue::Object(variants)) => variants
					.iter()
					.enumerate()
					.map(|(index, (name, fields))| {
						Some(Variant {
							name: name.clone(),
							index: u8::try_from(index).ok()?,
							fields: self.variant_fields(fields)?,
						})
					})
					.collect::<Option<_>>()
					.map(TypeDef::Variant),
				Some(_) => None,
				None => object
					.iter()
					.map(|(name, ty)| Some(Field::named(name, self.register(ty.as_str()?))))
					.collect::<Option<_>>()
					.map(TypeDef::Composite),
			},
			_ => None,
		}
	}

	fn variant_fields(&mut self, fields: &JsonValue) -> Option<Vec<Field>> {
		match fields {
			JsonValue::Null => Some(Vec::new()),
			JsonValue::String(expr) if expr == "Null" || expr == "()" => Some(Vec::new()),
			JsonValue::String(expr) => Some(vec![Field::unnamed(self.register(expr))]),
			JsonValue::Object(fields) => fields
				.iter()
				.map(|(name, ty)| Some(Field::named(name, self.register(ty.as_str()?))))
				.collect(),
			_ => None,
		}
	}
}

/// Strip trait qualifications and whitespace from the type expression.
fn normalize(expr: &str) -> String {
	let mut expr = expr.to_owned();
	// `<T as Config>::Balance` is `Balance`
	while let Some(qualifier) = expr.find(" as ") {
		let open = expr[..qualifier].rfind('<');
		let close = expr[qualifier..].find(">::").map(|close| qualifier + close);
		match (open, close) {
			(Some(open), Some(close)) => expr.replace_range(open..close + 3, ""),
			_ => break,
		}
	}

	let mut normalized = String::with_capacity(expr.len());
	let mut rest = expr.as_str();
	while !rest.is_empty() {
		let at_word_start =
			normalized.chars().last().map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
		if at_word_start {
			if let Some(stripped) = rest.strip_prefix("T::") {
				rest = stripped;
				continue
			}
		}

		let mut chars = rest.chars();
		if let Some(c) = chars.next() {
			if !c.is_whitespace() {
				normalized.push(c);
			}
		}
		rest = chars.as_str();
	}

	normalized
}

/// Split `Outer<Args>` into `Outer` and `Args`.
fn generic(name: &str) -> Option<(&str, &str)> {
	let args = name.strip_suffix('>')?;
	let start = args.find('<')?;
	(start > 0).then(|| (&args[..start], &args[start + 1..]))
}

/// Split comma-separated list, ignoring commas of nested expressions.
fn split_top_level(list: &str) -> Vec<String> {
	let mut items = Vec::new();
	let mut depth = 0i32;
	let mut current = String::new();
	for c in list.chars() {
		match c {
			'<' | '(' | '[' => depth += 1,
			'>' | ')' | ']' => depth -= 1,
			',' if depth == 0 => {
				items.push(std::mem::take(&mut current));
				continue
			},
			_ => {},
		}
		current.push(c);
	}
	if !current.is_empty() {
		items.push(current);
	}

	items
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::Value;
	use assert_matches::assert_matches;
	use codec::{Compact, Encode};

	fn d<B: 'static, O: 'static>(value: O) -> DecodeDifferent<B, O> {
		DecodeDifferent::Decoded(value)
	}

	fn function(name: &str, arguments: &[(&str, &str)]) -> v13::FunctionMetadata {
		v13::FunctionMetadata {
			name: d(name.into()),
			arguments: d(arguments
				.iter()
				.map(|(name, ty)| v13::FunctionArgumentMetadata {
					name: d(name.to_string()),
					ty: d(ty.to_string()),
				})
				.collect()),
			documentation: d(Vec::new()),
		}
	}

	fn module(name: &str, index: u8) -> v13::ModuleMetadata {
		v13::ModuleMetadata {
			name: d(name.into()),
			storage: None,
			calls: None,
			event: None,
			constants: d(Vec::new()),
			errors: d(Vec::new()),
			index,
		}
	}

	fn metadata() -> RuntimeMetadata {
		let mut system = module("System", 0);
		system.storage = Some(d(v13::StorageMetadata {
			prefix: d("System".into()),
			entries: d(vec![v13::StorageEntryMetadata {
				name: d("Account".into()),
				modifier: v13::StorageEntryModifier::Default,
				ty: v13::StorageEntryType::Map {
					hasher: v13::StorageHasher::Blake2_128Concat,
					key: d("T::AccountId".into()),
					value: d("AccountInfo<T::Index, T::AccountData>".into()),
					unused: false,
				},
				default: d(vec![0; 80]),
				documentation: d(Vec::new()),
			}]),
		}));
		system.constants = d(vec![v13::ModuleConstantMetadata {
			name: d("SS58Prefix".into()),
			ty: d("u8".into()),
			value: d(vec![69]),
			documentation: d(Vec::new()),
		}]);

		let mut assets = module("Assets", 21);
		assets.calls = Some(d(vec![
			function("register", &[("symbol", "AssetSymbol")]),
			function(
				"transfer",
				&[("asset_id", "AssetIdOf<T>"), ("to", "T::AccountId"), ("amount", "Balance")],
			),
		]));

		let mut balances = module("Balances", 2);
		balances.calls = Some(d(vec![
			function(
				"transfer",
				&[("dest", "<T::Lookup as StaticLookup>::Source"), ("value", "Compact<T::Balance>")],
			),
			function("set_lock", &[("reasons", "T::WithdrawReasons")]),
		]));

		RuntimeMetadata::V13(v13::RuntimeMetadataV13 {
			modules: d(vec![system, assets, balances]),
			extrinsic: v13::ExtrinsicMetadata {
				version: 4,
				signed_extensions: vec![d("CheckNonce".into()), d("CheckUnknown".into())],
			},
		})
	}

	#[test]
	fn normalizes_type_expressions() {
		assert_eq!(normalize("<T as frame_system::Config>::AccountId"), "AccountId");
		assert_eq!(normalize("Vec<T::AccountId>"), "Vec<AccountId>");
		assert_eq!(normalize("Compact<T::Balance>"), "Compact<Balance>");
		assert_eq!(normalize("[u8; 32]"), "[u8;32]");
		assert_eq!(normalize("BTreeMap<AssetId, (Balance, u32)>"), "BTreeMap<AssetId,(Balance,u32)>");
		assert_eq!(normalize("<T::Lookup as StaticLookup>::Source"), "Source");
		assert_eq!(normalize("Vec<<T as Config>::Call>"), "Vec<Call>");
		assert_eq!(normalize("NFT::Id"), "NFT::Id");
		assert_eq!(
			split_top_level("AssetId,(Balance,u32),Vec<u8>"),
			vec!["AssetId", "(Balance,u32)", "Vec<u8>"],
		);
	}

	#[test]
	fn builds_registry_from_named_types() {
		let runtime = LegacyRegistryBuilder::default().build(metadata()).unwrap();

		let assets = &runtime.pallets["Assets"];
		assert_eq!(assets.index, 21);
		let transfer = &assets.calls[1];
		assert_eq!(transfer.name, "transfer");
		assert_eq!(transfer.index, 1);

		let args = [Value::bytes([1u8; 32]), Value::bytes([2u8; 32]), Value::uint(100u8)];
		let mut encoded = Vec::new();
		for (argument, value) in transfer.arguments.iter().zip(&args) {
			runtime.registry.encode_to(&argument.ty, value, &mut encoded).unwrap();
		}
		assert_eq!(encoded, ([1u8; 32], [2u8; 32], 100u128).encode());

		let account_info = runtime
			.registry
			.decode(&runtime.pallets["System"].storage[0].value_type, &[0u8; 80])
			.unwrap();
		assert_eq!(account_info.field("nonce"), Some(&Value::uint(0u8)));

		assert_eq!(
			runtime
				.registry
				.encode("MultiAddress", &Value::variant("Index", vec![Value::uint(5u8)]))
				.unwrap(),
			(1u8, Compact(5u32)).encode(),
		);
	}

	#[test]
	fn unknown_types_and_extensions_are_tolerated() {
		let runtime = LegacyRegistryBuilder::default().build(metadata()).unwrap();

		let transfer = &runtime.pallets["Balances"].calls[0];
		let dest = Value::variant("Id", vec![Value::bytes([3u8; 32])]);
		assert_eq!(
			runtime.registry.encode(&transfer.arguments[0].ty, &dest).unwrap(),
			(0u8, [3u8; 32]).encode(),
		);

		let set_lock = &runtime.pallets["Balances"].calls[1];
		assert_matches!(
			runtime.registry.encode(&set_lock.arguments[0].ty, &Value::uint(1u8)),
			Err(Error::UnknownType(_))
		);

		let extensions = &runtime.extrinsic.signed_extensions;
		assert_eq!(extensions[0].extra, "Compact<Index>");
		assert_eq!(extensions[1].identifier, "CheckUnknown");
		assert_eq!(extensions[1].extra, "()");
	}

	#[test]
	fn rejects_portable_metadata() {
		let metadata = crate::test_utils::metadata(Some(42)).1;
		assert_matches!(
			LegacyRegistryBuilder::default().build(metadata),
			Err(Error::UnsupportedMetadata(14))
		);
		assert_matches!(
			LegacyRegistryBuilder::with_preset("{".into()).build(self::metadata()),
			Err(Error::InvalidMetadata(_))
		);
	}
}
