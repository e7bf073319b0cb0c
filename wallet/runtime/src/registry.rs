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

//! Type registry: named types with their SCALE encoding and decoding rules.
//!
//! The registry is the strategy object of a runtime snapshot. It's filled once by one of the
//! registry builders and is never mutated after the snapshot is built, so callers don't need
//! to know which metadata version the definitions came from.

use crate::error::{Error, Result};

use codec::{Compact, Decode, Encode, Input};
use std::{collections::HashMap, fmt};

/// Name of the type in the registry.
pub type TypeName = String;

/// Max depth of nested type definitions that we are able to encode or decode.
const MAX_TYPE_DEPTH: usize = 128;

/// Primitive types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
	/// `bool`.
	Bool,
	/// `char`, encoded as `u32`.
	Char,
	/// UTF-8 string.
	Str,
	/// `u8`.
	U8,
	/// `u16`.
	U16,
	/// `u32`.
	U32,
	/// `u64`.
	U64,
	/// `u128`.
	U128,
	/// 256-bit unsigned integer.
	U256,
	/// `i8`.
	I8,
	/// `i16`.
	I16,
	/// `i32`.
	I32,
	/// `i64`.
	I64,
	/// `i128`.
	I128,
	/// 256-bit signed integer.
	I256,
}

impl Primitive {
	/// Parse primitive type from its Rust name.
	pub fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"bool" => Primitive::Bool,
			"char" => Primitive::Char,
			"str" | "String" | "Text" => Primitive::Str,
			"u8" => Primitive::U8,
			"u16" => Primitive::U16,
			"u32" => Primitive::U32,
			"u64" => Primitive::U64,
			"u128" => Primitive::U128,
			"u256" | "U256" => Primitive::U256,
			"i8" => Primitive::I8,
			"i16" => Primitive::I16,
			"i32" => Primitive::I32,
			"i64" => Primitive::I64,
			"i128" => Primitive::I128,
			"i256" | "I256" => Primitive::I256,
			_ => return None,
		})
	}
}

/// Field of composite type or variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
	/// Field name. `None` for tuple-like types.
	pub name: Option<String>,
	/// Field type.
	pub ty: TypeName,
}

impl Field {
	/// Named field.
	pub fn named(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
		Field { name: Some(name.into()), ty: ty.into() }
	}

	/// Unnamed field.
	pub fn unnamed(ty: impl Into<TypeName>) -> Self {
		Field { name: None, ty: ty.into() }
	}
}

/// Enum variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
	/// Variant name.
	pub name: String,
	/// Variant index, encoded as the first byte.
	pub index: u8,
	/// Variant fields.
	pub fields: Vec<Field>,
}

/// Type definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDef {
	/// Primitive type.
	Primitive(Primitive),
	/// Compact-encoded integer (or single-field wrapper of an integer).
	Compact(TypeName),
	/// Length-prefixed sequence.
	Sequence(TypeName),
	/// Fixed-length array.
	Array(u32, TypeName),
	/// Tuple.
	Tuple(Vec<TypeName>),
	/// Struct.
	Composite(Vec<Field>),
	/// Enum.
	Variant(Vec<Variant>),
	/// Legacy `Option<T>`. New metadata expresses options as variants.
	Option(TypeName),
	/// Another name of some other type.
	Alias(TypeName),
	/// Bit sequence. We never need to encode or decode those.
	BitSequence,
}

/// Dynamic value that is encoded or decoded using registry types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
	/// Boolean.
	Bool(bool),
	/// Character.
	Char(char),
	/// String.
	String(String),
	/// Any unsigned integer, including compact-encoded ones.
	UInt(u128),
	/// Any signed integer.
	Int(i128),
	/// Sequence or array of bytes, or a raw 256-bit integer.
	Bytes(Vec<u8>),
	/// Sequence, array, tuple or unnamed composite.
	Sequence(Vec<Value>),
	/// Named composite.
	Composite(Vec<(String, Value)>),
	/// Enum variant with its fields.
	Variant(String, Vec<Value>),
	/// Already encoded value of any type, like a call of the batch.
	Encoded(Vec<u8>),
}

impl Value {
	/// Unsigned integer value.
	pub fn uint(value: impl Into<u128>) -> Self {
		Value::UInt(value.into())
	}

	/// Bytes value.
	pub fn bytes(value: impl AsRef<[u8]>) -> Self {
		Value::Bytes(value.as_ref().to_vec())
	}

	/// Variant value.
	pub fn variant(name: impl Into<String>, fields: Vec<Value>) -> Self {
		Value::Variant(name.into(), fields)
	}

	/// Named composite value.
	pub fn named<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
		Value::Composite(fields.into_iter().map(|(name, value)| (name.into(), value)).collect())
	}

	/// `None` option.
	pub fn none() -> Self {
		Value::Variant("None".into(), Vec::new())
	}

	/// `Some(value)` option.
	pub fn some(value: Value) -> Self {
		Value::Variant("Some".into(), vec![value])
	}

	/// Returns integer if the value is an unsigned integer.
	pub fn as_u128(&self) -> Option<u128> {
		match *self {
			Value::UInt(value) => Some(value),
			_ => None,
		}
	}

	/// Returns named field of composite value.
	pub fn field(&self, name: &str) -> Option<&Value> {
		match self {
			Value::Composite(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
			_ => None,
		}
	}

	fn kind(&self) -> &'static str {
		match self {
			Value::Bool(_) => "bool",
			Value::Char(_) => "char",
			Value::String(_) => "string",
			Value::UInt(_) => "unsigned integer",
			Value::Int(_) => "signed integer",
			Value::Bytes(_) => "bytes",
			Value::Sequence(_) => "sequence",
			Value::Composite(_) => "composite",
			Value::Variant(_, _) => "variant",
			Value::Encoded(_) => "encoded",
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Value::Bool(value) => write!(f, "{value}"),
			Value::Char(value) => write!(f, "{value:?}"),
			Value::String(value) => write!(f, "{value:?}"),
			Value::UInt(value) => write!(f, "{value}"),
			Value::Int(value) => write!(f, "{value}"),
			Value::Bytes(value) | Value::Encoded(value) => write!(f, "0x{}", hex::encode(value)),
			Value::Sequence(_) | Value::Composite(_) | Value::Variant(_, _) =>
				write!(f, "<{}>", self.kind()),
		}
	}
}

/// Named types with their encoding rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeRegistry {
	types: HashMap<TypeName, TypeDef>,
}

impl TypeRegistry {
	/// Create empty registry.
	pub fn new() -> Self {
		TypeRegistry::default()
	}

	/// Register type. Existing definition with the same name is replaced.
	pub fn insert(&mut self, name: impl Into<TypeName>, def: TypeDef) {
		self.types.insert(name.into(), def);
	}

	/// Returns true if type with given name is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.types.contains_key(name)
	}

	/// Number of registered types (aliases included).
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Returns true if the registry has no types.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Resolve type definition, following aliases.
	pub fn resolve(&self, name: &str) -> Result<&TypeDef> {
		let mut current = name;
		for _ in 0..MAX_TYPE_DEPTH {
			match self.types.get(current) {
				Some(TypeDef::Alias(target)) => current = target,
				Some(def) => return Ok(def),
				None => return Err(Error::UnknownType(current.into())),
			}
		}

		Err(Error::RecursionLimit(name.into()))
	}

	/// Encode value using given type.
	pub fn encode(&self, ty: &str, value: &Value) -> Result<Vec<u8>> {
		let mut encoded = Vec::new();
		self.encode_to(ty, value, &mut encoded)?;
		Ok(encoded)
	}

	/// Encode value using given type, appending the result to `dest`.
	pub fn encode_to(&self, ty: &str, value: &Value, dest: &mut Vec<u8>) -> Result<()> {
		self.encode_with_depth(ty, value, dest, 0)
	}

	/// Decode value of given type. The whole input must be consumed.
	pub fn decode(&self, ty: &str, mut input: &[u8]) -> Result<Value> {
		let value = self.decode_from(ty, &mut input)?;
		if !input.is_empty() {
			return Err(Error::TypeMismatch {
				ty: ty.into(),
				value: format!("{} trailing bytes", input.len()),
			})
		}

		Ok(value)
	}

	/// Decode value of given type from the input, leaving the rest of input untouched.
	pub fn decode_from(&self, ty: &str, input: &mut &[u8]) -> Result<Value> {
		self.decode_with_depth(ty, input, 0)
	}

	fn encode_with_depth(
		&self,
		ty: &str,
		value: &Value,
		dest: &mut Vec<u8>,
		depth: usize,
	) -> Result<()> {
		if depth > MAX_TYPE_DEPTH {
			return Err(Error::RecursionLimit(ty.into()))
		}
		let mismatch = || Error::TypeMismatch { ty: ty.into(), value: value.to_string() };

		// pre-encoded values don't need the type definition
		if let Value::Encoded(encoded) = value {
			dest.extend_from_slice(encoded);
			return Ok(())
		}

		match (self.resolve(ty)?, value) {
			(TypeDef::Primitive(primitive), value) =>
				encode_primitive(*primitive, value, dest).ok_or_else(mismatch),
			(TypeDef::Compact(inner), value) => {
				let value = self.compact_value(inner, value).ok_or_else(mismatch)?;
				Compact(value).encode_to(dest);
				Ok(())
			},
			(TypeDef::Sequence(inner), Value::Bytes(bytes)) if self.is_byte(inner) => {
				bytes.encode_to(dest);
				Ok(())
			},
			(TypeDef::Sequence(inner), Value::Sequence(items)) => {
				Compact(items.len() as u32).encode_to(dest);
				items.iter().try_for_each(|item| self.encode_with_depth(inner, item, dest, depth + 1))
			},
			(TypeDef::Array(len, inner), Value::Bytes(bytes))
				if self.is_byte(inner) && bytes.len() == *len as usize =>
			{
				dest.extend_from_slice(bytes);
				Ok(())
			},
			(TypeDef::Array(len, inner), Value::Sequence(items)) if items.len() == *len as usize =>
				items.iter().try_for_each(|item| self.encode_with_depth(inner, item, dest, depth + 1)),
			(TypeDef::Tuple(types), Value::Sequence(items)) if types.len() == items.len() => types
				.iter()
				.zip(items)
				.try_for_each(|(ty, item)| self.encode_with_depth(ty, item, dest, depth + 1)),
			(TypeDef::Tuple(types), value) if types.len() == 1 =>
				self.encode_with_depth(&types[0], value, dest, depth + 1),
			(TypeDef::Composite(fields), value) =>
				self.encode_fields(ty, fields, value, dest, depth),
			(TypeDef::Variant(variants), Value::Variant(name, values)) => {
				let variant = variants.iter().find(|v| &v.name == name).ok_or_else(mismatch)?;
				dest.push(variant.index);
				match values.as_slice() {
					// named fields may be passed as a single composite
					[fields @ Value::Composite(_)] if variant.fields.len() > 1 =>
						self.encode_fields(ty, &variant.fields, fields, dest, depth),
					values if values.len() == variant.fields.len() => variant
						.fields
						.iter()
						.zip(values)
						.try_for_each(|(field, value)| {
							self.encode_with_depth(&field.ty, value, dest, depth + 1)
						}),
					_ => Err(mismatch()),
				}
			},
			(TypeDef::Option(inner), Value::Variant(name, values)) =>
				match (name.as_str(), values.as_slice()) {
					("None", []) => {
						dest.push(0);
						Ok(())
					},
					("Some", [value]) => {
						dest.push(1);
						self.encode_with_depth(inner, value, dest, depth + 1)
					},
					_ => Err(mismatch()),
				},
			_ => Err(mismatch()),
		}
	}

	fn encode_fields(
		&self,
		ty: &str,
		fields: &[Field],
		value: &Value,
		dest: &mut Vec<u8>,
		depth: usize,
	) -> Result<()> {
		let mismatch = || Error::TypeMismatch { ty: ty.into(), value: value.to_string() };
		match value {
			Value::Composite(values) if values.len() == fields.len() => {
				for field in fields {
					let name = field.name.as_deref().ok_or_else(mismatch)?;
					let (_, value) =
						values.iter().find(|(n, _)| n == name).ok_or_else(mismatch)?;
					self.encode_with_depth(&field.ty, value, dest, depth + 1)?;
				}
				Ok(())
			},
			Value::Sequence(values) if values.len() == fields.len() => fields
				.iter()
				.zip(values)
				.try_for_each(|(field, value)| {
					self.encode_with_depth(&field.ty, value, dest, depth + 1)
				}),
			// single-field wrappers (like `AccountId32([u8; 32])`) are transparent
			value if fields.len() == 1 =>
				self.encode_with_depth(&fields[0].ty, value, dest, depth + 1),
			_ => Err(mismatch()),
		}
	}

	fn decode_with_depth(&self, ty: &str, input: &mut &[u8], depth: usize) -> Result<Value> {
		if depth > MAX_TYPE_DEPTH {
			return Err(Error::RecursionLimit(ty.into()))
		}

		Ok(match self.resolve(ty)? {
			TypeDef::Primitive(primitive) => decode_primitive(*primitive, input)?,
			TypeDef::Compact(_) => Value::UInt(Compact::<u128>::decode(input)?.0),
			TypeDef::Sequence(inner) => {
				let len = Compact::<u32>::decode(input)?.0 as usize;
				self.decode_items(inner, len, input, depth)?
			},
			TypeDef::Array(len, inner) => self.decode_items(inner, *len as usize, input, depth)?,
			TypeDef::Tuple(types) => Value::Sequence(
				types
					.iter()
					.map(|ty| self.decode_with_depth(ty, input, depth + 1))
					.collect::<Result<_>>()?,
			),
			TypeDef::Composite(fields) => self.decode_fields(fields, input, depth)?,
			TypeDef::Variant(variants) => {
				let index = u8::decode(input)?;
				let variant = variants.iter().find(|v| v.index == index).ok_or_else(|| {
					Error::TypeMismatch { ty: ty.into(), value: format!("variant #{index}") }
				})?;
				let fields = variant
					.fields
					.iter()
					.map(|field| self.decode_with_depth(&field.ty, input, depth + 1))
					.collect::<Result<_>>()?;
				Value::Variant(variant.name.clone(), fields)
			},
			TypeDef::Option(inner) => match u8::decode(input)? {
				0 => Value::none(),
				1 => Value::some(self.decode_with_depth(inner, input, depth + 1)?),
				index => {
					return Err(Error::TypeMismatch {
						ty: ty.into(),
						value: format!("option #{index}"),
					})
				},
			},
			TypeDef::Alias(_) => unreachable!("aliases are followed by `resolve`; qed"),
			TypeDef::BitSequence =>
				return Err(Error::TypeMismatch { ty: ty.into(), value: "bit sequence".into() }),
		})
	}

	fn decode_items(
		&self,
		inner: &str,
		len: usize,
		input: &mut &[u8],
		depth: usize,
	) -> Result<Value> {
		if self.is_byte(inner) {
			if input.len() < len {
				return Err(codec::Error::from("Not enough data to fill buffer").into())
			}
			let mut bytes = vec![0u8; len];
			input.read(&mut bytes)?;
			return Ok(Value::Bytes(bytes))
		}

		// every item takes at least one byte, so the length can't exceed the input length
		if len > input.len() {
			return Err(codec::Error::from("Sequence is longer than the input").into())
		}
		(0..len)
			.map(|_| self.decode_with_depth(inner, input, depth + 1))
			.collect::<Result<_>>()
			.map(Value::Sequence)
	}

	fn decode_fields(&self, fields: &[Field], input: &mut &[u8], depth: usize) -> Result<Value> {
		let is_named = !fields.is_empty() && fields.iter().all(|f| f.name.is_some());
		if is_named {
			return fields
				.iter()
				.map(|field| {
					let name = field.name.clone().unwrap_or_default();
					self.decode_with_depth(&field.ty, input, depth + 1).map(|v| (name, v))
				})
				.collect::<Result<_>>()
				.map(Value::Composite)
		}

		let mut values = fields
			.iter()
			.map(|field| self.decode_with_depth(&field.ty, input, depth + 1))
			.collect::<Result<Vec<_>>>()?;
		Ok(if values.len() == 1 { values.remove(0) } else { Value::Sequence(values) })
	}

	fn compact_value(&self, inner: &str, value: &Value) -> Option<u128> {
		match (self.resolve(inner).ok()?, value) {
			(
				TypeDef::Primitive(
					Primitive::U8 |
					Primitive::U16 |
					Primitive::U32 |
					Primitive::U64 |
					Primitive::U128,
				),
				Value::UInt(value),
			) => Some(*value),
			(TypeDef::Composite(fields), value) if fields.len() == 1 =>
				self.compact_value(&fields[0].ty, value),
			(TypeDef::Tuple(types), _) if types.is_empty() => Some(0),
			_ => None,
		}
	}

	fn is_byte(&self, ty: &str) -> bool {
		matches!(self.resolve(ty), Ok(TypeDef::Primitive(Primitive::U8)))
	}
}

fn encode_primitive(primitive: Primitive, value: &Value, dest: &mut Vec<u8>) -> Option<()> {
	match (primitive, value) {
		(Primitive::Bool, Value::Bool(value)) => value.encode_to(dest),
		(Primitive::Char, Value::Char(value)) => (*value as u32).encode_to(dest),
		(Primitive::Str, Value::String(value)) => value.encode_to(dest),
		(Primitive::U8, Value::UInt(value)) => u8::try_from(*value).ok()?.encode_to(dest),
		(Primitive::U16, Value::UInt(value)) => u16::try_from(*value).ok()?.encode_to(dest),
		(Primitive::U32, Value::UInt(value)) => u32::try_from(*value).ok()?.encode_to(dest),
		(Primitive::U64, Value::UInt(value)) => u64::try_from(*value).ok()?.encode_to(dest),
		(Primitive::U128, Value::UInt(value)) => value.encode_to(dest),
		(Primitive::U256, Value::UInt(value)) => {
			value.encode_to(dest);
			dest.extend_from_slice(&[0u8; 16]);
		},
		(Primitive::U256 | Primitive::I256, Value::Bytes(value)) if value.len() == 32 =>
			dest.extend_from_slice(value),
		(Primitive::I8, Value::Int(value)) => i8::try_from(*value).ok()?.encode_to(dest),
		(Primitive::I16, Value::Int(value)) => i16::try_from(*value).ok()?.encode_to(dest),
		(Primitive::I32, Value::Int(value)) => i32::try_from(*value).ok()?.encode_to(dest),
		(Primitive::I64, Value::Int(value)) => i64::try_from(*value).ok()?.encode_to(dest),
		(Primitive::I128, Value::Int(value)) => value.encode_to(dest),
		(Primitive::I256, Value::Int(value)) => {
			value.encode_to(dest);
			let sign_extension = if *value < 0 { 0xff } else { 0x00 };
			dest.extend_from_slice(&[sign_extension; 16]);
		},
		_ => return None,
	}

	Some(())
}

fn decode_primitive(primitive: Primitive, input: &mut &[u8]) -> Result<Value> {
	Ok(match primitive {
		Primitive::Bool => Value::Bool(bool::decode(input)?),
		Primitive::Char => {
			let code = u32::decode(input)?;
			Value::Char(char::from_u32(code).ok_or_else(|| codec::Error::from("Invalid char"))?)
		},
		Primitive::Str => Value::String(String::decode(input)?),
		Primitive::U8 => Value::UInt(u8::decode(input)?.into()),
		Primitive::U16 => Value::UInt(u16::decode(input)?.into()),
		Primitive::U32 => Value::UInt(u32::decode(input)?.into()),
		Primitive::U64 => Value::UInt(u64::decode(input)?.into()),
		Primitive::U128 => Value::UInt(u128::decode(input)?),
		Primitive::U256 | Primitive::I256 => Value::Bytes(<[u8; 32]>::decode(input)?.to_vec()),
		Primitive::I8 => Value::Int(i8::decode(input)?.into()),
		Primitive::I16 => Value::Int(i16::decode(input)?.into()),
		Primitive::I32 => Value::Int(i32::decode(input)?.into()),
		Primitive::I64 => Value::Int(i64::decode(input)?.into()),
		Primitive::I128 => Value::Int(i128::decode(input)?),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	fn registry() -> TypeRegistry {
		let mut registry = TypeRegistry::new();
		registry.insert("u8", TypeDef::Primitive(Primitive::U8));
		registry.insert("u32", TypeDef::Primitive(Primitive::U32));
		registry.insert("u128", TypeDef::Primitive(Primitive::U128));
		registry.insert("Balance", TypeDef::Alias("u128".into()));
		registry.insert("Compact<Balance>", TypeDef::Compact("Balance".into()));
		registry.insert("[u8; 32]", TypeDef::Array(32, "u8".into()));
		registry.insert("AccountId", TypeDef::Composite(vec![Field::unnamed("[u8; 32]")]));
		registry.insert("Vec<u8>", TypeDef::Sequence("u8".into()));
		registry.insert("Option<u32>", TypeDef::Option("u32".into()));
		registry.insert("Vec<Call>", TypeDef::Sequence("Call".into()));
		registry.insert(
			"MultiAddress",
			TypeDef::Variant(vec![
				Variant { name: "Id".into(), index: 0, fields: vec![Field::unnamed("AccountId")] },
				Variant { name: "Raw".into(), index: 3, fields: vec![Field::unnamed("Vec<u8>")] },
			]),
		);
		registry.insert(
			"AccountData",
			TypeDef::Composite(vec![
				Field::named("free", "Balance"),
				Field::named("reserved", "Balance"),
			]),
		);
		registry.insert("Loop", TypeDef::Alias("Loop".into()));
		registry
	}

	#[test]
	fn encodes_like_static_types() {
		let registry = registry();

		assert_eq!(
			registry.encode("Compact<Balance>", &Value::uint(1_000_000u32)).unwrap(),
			Compact(1_000_000u128).encode(),
		);
		assert_eq!(
			registry
				.encode("MultiAddress", &Value::variant("Id", vec![Value::bytes([1u8; 32])]))
				.unwrap(),
			(0u8, [1u8; 32]).encode(),
		);
		assert_eq!(
			registry
				.encode(
					"AccountData",
					&Value::named([("reserved", Value::uint(2u8)), ("free", Value::uint(1u8))]),
				)
				.unwrap(),
			(1u128, 2u128).encode(),
		);
		assert_eq!(
			registry.encode("Option<u32>", &Value::some(Value::uint(7u8))).unwrap(),
			Some(7u32).encode(),
		);
		assert_eq!(
			registry
				.encode("Vec<Call>", &Value::Sequence(vec![Value::Encoded(vec![5, 0, 1])]))
				.unwrap(),
			vec![4, 5, 0, 1],
		);
	}

	#[test]
	fn decodes_encoded_values() {
		let registry = registry();

		let encoded = (3u8, vec![1u8, 2, 3]).encode();
		assert_eq!(
			registry.decode("MultiAddress", &encoded).unwrap(),
			Value::variant("Raw", vec![Value::bytes([1u8, 2, 3])]),
		);

		let encoded = (5u128, 6u128).encode();
		assert_eq!(
			registry.decode("AccountData", &encoded).unwrap(),
			Value::named([("free", Value::uint(5u8)), ("reserved", Value::uint(6u8))]),
		);
		assert_eq!(registry.decode("Option<u32>", &[0]).unwrap(), Value::none());
	}

	#[test]
	fn rejects_mismatched_values() {
		let registry = registry();

		assert_matches!(
			registry.encode("u32", &Value::uint(u64::MAX)),
			Err(Error::TypeMismatch { .. })
		);
		assert_matches!(
			registry.encode("MultiAddress", &Value::variant("Index", vec![])),
			Err(Error::TypeMismatch { .. })
		);
		assert_matches!(registry.encode("Unknown", &Value::Bool(true)), Err(Error::UnknownType(_)));
		assert_matches!(registry.resolve("Loop"), Err(Error::RecursionLimit(_)));
		assert_matches!(registry.decode("u32", &[1, 0, 0, 0, 0]), Err(Error::TypeMismatch { .. }));
		assert_matches!(registry.decode("Vec<u8>", &[0x10, 1]), Err(Error::Codec(_)));
	}
}
