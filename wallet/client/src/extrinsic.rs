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

//! Signed extrinsic encoding.
//!
//! Runtimes with portable metadata (`V14` and newer) are signed with the subxt offline client,
//! which knows every standard signed extension. Older runtimes, and runtimes that take plain
//! account ids as signers, go through the encoder below.
//!
//! The signed payload is `call ++ extra ++ additional`, where `extra` and `additional` are
//! produced by the runtime's signed extensions in the order the metadata lists them. Payloads
//! longer than 256 bytes are hashed before signing.

use crate::error::{Error, Result};

use codec::{Compact, Decode, Encode};
use sp_core::H256;
use subxt::{
	client::RuntimeVersion as SubxtRuntimeVersion,
	config::polkadot::PolkadotExtrinsicParamsBuilder,
	ext::subxt_core::Error as SubxtCoreError,
	tx::Payload,
	utils::{AccountId32, MultiSignature},
	OfflineClient, PolkadotConfig,
};
use wallet_keys::{Keypair, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use wallet_runtime::{
	builder::{ExtrinsicFormat, SignedExtension},
	registry::TypeDef,
	RuntimeSnapshot,
};

/// The only extrinsic format version we're able to produce.
pub const EXTRINSIC_FORMAT_VERSION: u8 = 4;
/// Signed payloads longer than this are hashed before signing.
pub const MAX_UNHASHED_PAYLOAD_LENGTH: usize = 256;

const SIGNED_EXTRINSIC_BIT: u8 = 0b1000_0000;
const IMMORTAL_ERA: u8 = 0;
const MULTI_ADDRESS_ID: u8 = 0;
const MULTI_SIGNATURE_SR25519: u8 = 1;

/// How the runtime expects the signer to be encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressEncoding {
	/// `MultiAddress::Id(AccountId32)`.
	#[default]
	MultiAddress,
	/// Plain `AccountId32`.
	AccountId,
}

/// Parameters that are committed to by the extrinsic signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningParams {
	/// Runtime spec version.
	pub spec_version: u32,
	/// Runtime transaction version.
	pub transaction_version: u32,
	/// Genesis hash of the chain.
	pub genesis_hash: H256,
	/// Sender nonce.
	pub nonce: u32,
	/// Tip for the block author.
	pub tip: u128,
}

impl SigningParams {
	/// Signing parameters for the runtime of given snapshot.
	pub fn new(snapshot: &RuntimeSnapshot, genesis_hash: H256, nonce: u32) -> Self {
		SigningParams {
			spec_version: snapshot.spec_version(),
			transaction_version: snapshot.transaction_version(),
			genesis_hash,
			nonce,
			tip: 0,
		}
	}
}

/// Encoded data of all signed extensions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedExtra {
	/// Data that is included in the extrinsic.
	pub extra: Vec<u8>,
	/// Data that is only included in the signed payload.
	pub additional: Vec<u8>,
}

impl SignedExtra {
	/// Encode signed extensions of the runtime.
	pub fn new(snapshot: &RuntimeSnapshot, params: &SigningParams) -> Result<Self> {
		let format = snapshot.extrinsic();
		if format.version != EXTRINSIC_FORMAT_VERSION {
			return Err(Error::UnsupportedExtrinsicVersion(format.version))
		}

		let mut signed_extra = SignedExtra::default();
		for extension in &format.signed_extensions {
			signed_extra.push(snapshot, extension, params)?;
		}

		Ok(signed_extra)
	}

	fn push(
		&mut self,
		snapshot: &RuntimeSnapshot,
		extension: &SignedExtension,
		params: &SigningParams,
	) -> Result<()> {
		let SignedExtra { extra, additional } = self;
		match extension.identifier.as_str() {
			"CheckSpecVersion" => params.spec_version.encode_to(additional),
			"CheckTxVersion" => params.transaction_version.encode_to(additional),
			"CheckGenesis" => params.genesis_hash.encode_to(additional),
			"CheckMortality" | "CheckEra" => {
				extra.push(IMMORTAL_ERA);
				params.genesis_hash.encode_to(additional);
			},
			"CheckNonce" => Compact(params.nonce).encode_to(extra),
			"ChargeTransactionPayment" => Compact(params.tip).encode_to(extra),
			"ChargeAssetTxPayment" => {
				Compact(params.tip).encode_to(extra);
				// fee is paid in the native asset
				None::<()>.encode_to(extra);
			},
			"CheckMetadataHash" => {
				// metadata hash verification is disabled
				0u8.encode_to(extra);
				None::<H256>.encode_to(additional);
			},
			identifier if is_empty_type(snapshot, &extension.extra) &&
				is_empty_type(snapshot, &extension.additional) =>
			{
				tracing::trace!(target: crate::LOG_TARGET, "Skipping empty extension {identifier}");
			},
			identifier => return Err(Error::UnsupportedSignedExtension(identifier.into())),
		}

		Ok(())
	}
}

/// Returns true if values of the type are always encoded as zero bytes.
fn is_empty_type(snapshot: &RuntimeSnapshot, ty: &str) -> bool {
	match snapshot.registry().resolve(ty) {
		Ok(TypeDef::Tuple(items)) => items.iter().all(|item| is_empty_type(snapshot, item)),
		Ok(TypeDef::Composite(fields)) => fields.iter().all(|field| is_empty_type(snapshot, &field.ty)),
		Ok(TypeDef::Array(0, _)) => true,
		_ => false,
	}
}

/// Payload that is signed by the extrinsic sender.
pub fn signed_payload(call: &[u8], signed_extra: &SignedExtra) -> Vec<u8> {
	let mut payload =
		Vec::with_capacity(call.len() + signed_extra.extra.len() + signed_extra.additional.len());
	payload.extend_from_slice(call);
	payload.extend_from_slice(&signed_extra.extra);
	payload.extend_from_slice(&signed_extra.additional);

	if payload.len() > MAX_UNHASHED_PAYLOAD_LENGTH {
		sp_crypto_hashing::blake2_256(&payload).to_vec()
	} else {
		payload
	}
}

/// Encode signed extrinsic.
pub fn encode_signed_extrinsic(
	address_encoding: AddressEncoding,
	signer: &[u8; PUBLIC_KEY_LENGTH],
	signature: &[u8; SIGNATURE_LENGTH],
	signed_extra: &SignedExtra,
	call: &[u8],
) -> Vec<u8> {
	let mut body = Vec::with_capacity(
		2 + PUBLIC_KEY_LENGTH + 1 + SIGNATURE_LENGTH + signed_extra.extra.len() + call.len(),
	);
	body.push(SIGNED_EXTRINSIC_BIT | EXTRINSIC_FORMAT_VERSION);
	if address_encoding == AddressEncoding::MultiAddress {
		body.push(MULTI_ADDRESS_ID);
	}
	body.extend_from_slice(signer);
	body.push(MULTI_SIGNATURE_SR25519);
	body.extend_from_slice(signature);
	body.extend_from_slice(&signed_extra.extra);
	body.extend_from_slice(call);

	// extrinsic is encoded as `Vec<u8>`
	body.encode()
}

/// Hash of the encoded extrinsic, as computed by the node.
pub fn extrinsic_hash(extrinsic: &[u8]) -> H256 {
	H256(sp_crypto_hashing::blake2_256(extrinsic))
}

/// Identifiers of the signed extensions, for logs.
pub fn signed_extension_names(format: &ExtrinsicFormat) -> Vec<&str> {
	format.signed_extensions.iter().map(|extension| extension.identifier.as_str()).collect()
}

/// Sender of the extrinsic.
#[derive(Clone, Copy)]
pub enum ExtrinsicSigner<'a> {
	/// Extrinsic is signed by the keypair.
	Keypair(&'a Keypair),
	/// Extrinsic of the account carries zero signature. Only good for fee estimation.
	Placeholder([u8; PUBLIC_KEY_LENGTH]),
}

impl ExtrinsicSigner<'_> {
	/// Public key of the sender.
	pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
		match self {
			ExtrinsicSigner::Keypair(keypair) => keypair.public_key(),
			ExtrinsicSigner::Placeholder(public_key) => *public_key,
		}
	}

	/// Signature of the payload.
	pub fn signature(&self, payload: &[u8]) -> [u8; SIGNATURE_LENGTH] {
		match self {
			ExtrinsicSigner::Keypair(keypair) => keypair.sign(payload),
			ExtrinsicSigner::Placeholder(_) => [0; SIGNATURE_LENGTH],
		}
	}
}

impl subxt::tx::Signer<PolkadotConfig> for ExtrinsicSigner<'_> {
	fn account_id(&self) -> AccountId32 {
		AccountId32(self.public_key())
	}

	fn sign(&self, signer_payload: &[u8]) -> MultiSignature {
		MultiSignature::Sr25519(self.signature(signer_payload))
	}
}

/// Call that has been encoded against the runtime snapshot.
struct EncodedCall<'a>(&'a [u8]);

impl Payload for EncodedCall<'_> {
	fn encode_call_data_to(
		&self,
		_metadata: &subxt::Metadata,
		out: &mut Vec<u8>,
	) -> std::result::Result<(), SubxtCoreError> {
		out.extend_from_slice(self.0);
		Ok(())
	}
}

/// Offline signer of one runtime version of one chain.
pub struct OfflineSigner {
	client: OfflineClient<PolkadotConfig>,
	spec_version: u32,
	genesis_hash: H256,
}

impl OfflineSigner {
	/// Returns true if extrinsics of the runtime are signed by subxt.
	pub fn supports(snapshot: &RuntimeSnapshot, address_encoding: AddressEncoding) -> bool {
		snapshot.metadata_version() >= 14 && address_encoding == AddressEncoding::MultiAddress
	}

	/// Create signer for the runtime of given snapshot.
	pub fn new(snapshot: &RuntimeSnapshot, genesis_hash: H256) -> Result<Self> {
		let metadata = subxt::Metadata::decode(&mut snapshot.metadata_blob())
			.map_err(|e| Error::UnsupportedMetadata(e.to_string()))?;
		let runtime_version = SubxtRuntimeVersion {
			spec_version: snapshot.spec_version(),
			transaction_version: snapshot.transaction_version(),
		};
		let genesis = subxt::utils::H256::from(genesis_hash.to_fixed_bytes());

		Ok(OfflineSigner {
			client: OfflineClient::new(genesis, runtime_version, metadata),
			spec_version: snapshot.spec_version(),
			genesis_hash,
		})
	}

	/// Returns true if the signer has been created for the runtime and chain.
	pub fn is_for(&self, snapshot: &RuntimeSnapshot, genesis_hash: H256) -> bool {
		self.spec_version == snapshot.spec_version() && self.genesis_hash == genesis_hash
	}

	/// Sign and encode extrinsic. The extrinsic is immortal and pays no tip.
	pub fn sign(&self, call: &[u8], signer: &ExtrinsicSigner, nonce: u32) -> Result<Vec<u8>> {
		let params =
			PolkadotExtrinsicParamsBuilder::<PolkadotConfig>::new().nonce(u64::from(nonce)).build();
		let mut partial = self.client.tx().create_partial_offline(&EncodedCall(call), params)?;
		Ok(partial.sign(signer).into_encoded())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_chain;
	use assert_matches::assert_matches;
	use wallet_runtime::Value;

	#[test]
	fn encodes_extensions_in_metadata_order() {
		let snapshot = test_chain::snapshot();
		let genesis_hash = H256::repeat_byte(0xaa);
		let params = SigningParams { tip: 5, ..SigningParams::new(&snapshot, genesis_hash, 3) };

		let signed_extra = SignedExtra::new(&snapshot, &params).unwrap();
		// era, nonce, tip
		assert_eq!(signed_extra.extra, (IMMORTAL_ERA, Compact(3u32), Compact(5u128)).encode());
		// spec version, tx version, genesis, era birth block
		assert_eq!(
			signed_extra.additional,
			(snapshot.spec_version(), snapshot.transaction_version(), genesis_hash, genesis_hash)
				.encode(),
		);
	}

	#[test]
	fn long_payloads_are_hashed() {
		let signed_extra = SignedExtra { extra: vec![1], additional: vec![2] };
		assert_eq!(signed_payload(&[0; 10], &signed_extra).len(), 12);

		let long_call = vec![0; MAX_UNHASHED_PAYLOAD_LENGTH];
		let payload = signed_payload(&long_call, &signed_extra);
		let mut expected = long_call.clone();
		expected.extend([1, 2]);
		assert_eq!(payload, sp_crypto_hashing::blake2_256(&expected).to_vec());
	}

	#[test]
	fn signed_extrinsic_layout() {
		let signed_extra = SignedExtra { extra: vec![0, 4, 0], additional: vec![] };
		let extrinsic = encode_signed_extrinsic(
			AddressEncoding::MultiAddress,
			&[1; 32],
			&[2; 64],
			&signed_extra,
			&[5, 0],
		);

		let body = Vec::<u8>::decode(&mut &extrinsic[..]).unwrap();
		assert_eq!(body[0], 0x84);
		assert_eq!(body[1], MULTI_ADDRESS_ID);
		assert_eq!(&body[2..34], &[1; 32]);
		assert_eq!(body[34], MULTI_SIGNATURE_SR25519);
		assert_eq!(&body[35..99], &[2; 64]);
		assert_eq!(&body[99..], &[0, 4, 0, 5, 0]);

		let without_multi_address = encode_signed_extrinsic(
			AddressEncoding::AccountId,
			&[1; 32],
			&[2; 64],
			&signed_extra,
			&[5, 0],
		);
		assert_eq!(without_multi_address.len(), extrinsic.len() - 1);
	}

	#[test]
	fn unknown_extensions_are_rejected() {
		let snapshot = test_chain::snapshot_with_extensions(&["CheckNonce", "ChargeSomethingElse"]);
		let params = SigningParams::new(&snapshot, H256::zero(), 0);
		assert_matches!(
			SignedExtra::new(&snapshot, &params),
			Err(Error::UnsupportedSignedExtension(identifier)) if identifier == "ChargeSomethingElse"
		);
	}

	#[test]
	fn offline_signer_agrees_with_extension_encoder() {
		let snapshot = test_chain::snapshot();
		let keypair = wallet_keys::derive_from_mnemonic_with_path(
			"bottom drive obey lake curtain smoke basket hold race lonely fit walk",
			"//Alice",
		)
		.unwrap();
		let genesis_hash = H256::repeat_byte(0xaa);
		let call = snapshot
			.encode_call(
				"Balances",
				"transfer_keep_alive",
				&[Value::variant("Id", vec![Value::bytes([8u8; 32])]), Value::uint(1_000u32)],
			)
			.unwrap();
		assert!(OfflineSigner::supports(&snapshot, AddressEncoding::MultiAddress));
		assert!(!OfflineSigner::supports(&snapshot, AddressEncoding::AccountId));

		let signer = OfflineSigner::new(&snapshot, genesis_hash).unwrap();
		assert!(signer.is_for(&snapshot, genesis_hash));
		assert!(!signer.is_for(&snapshot, H256::zero()));

		let signed_extra =
			SignedExtra::new(&snapshot, &SigningParams::new(&snapshot, genesis_hash, 3)).unwrap();
		let placeholder = signer
			.sign(&call, &ExtrinsicSigner::Placeholder(keypair.public_key()), 3)
			.unwrap();
		assert_eq!(
			placeholder,
			encode_signed_extrinsic(
				AddressEncoding::MultiAddress,
				&keypair.public_key(),
				&[0; SIGNATURE_LENGTH],
				&signed_extra,
				&call,
			),
		);

		let extrinsic = signer.sign(&call, &ExtrinsicSigner::Keypair(&keypair), 3).unwrap();
		let body = Vec::<u8>::decode(&mut &extrinsic[..]).unwrap();
		let signature: [u8; SIGNATURE_LENGTH] = body[35..99].try_into().unwrap();
		assert!(keypair.verify(&signed_payload(&call, &signed_extra), &signature));
	}
}
