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

//! Extrinsic submission and watch service.
//!
//! Submission is split in two steps. [`ExtrinsicService::prepare`] signs the extrinsic and
//! reports its hash, so that callers may remember the transaction before anything is sent.
//! [`ExtrinsicService::watch`] then submits it and publishes the outcome to listeners.

use crate::{
	call::BuildCall,
	error::{Error, Result},
	extrinsic::{
		encode_signed_extrinsic, extrinsic_hash, signed_extension_names, signed_payload,
		AddressEncoding, ExtrinsicSigner, OfflineSigner, SignedExtra, SigningParams,
	},
	transport::{ChainTransport, TransactionStatus},
	watch::{WatchDispatcher, WatchListener},
	LOG_TARGET,
};

use futures::StreamExt;
use parking_lot::Mutex;
use sp_core::H256;
use std::sync::Arc;
use wallet_keys::{public_key_of, Keypair};
use wallet_runtime::{MetadataCache, RuntimeManager, RuntimeSnapshot, Value};

/// Outcome of the watched extrinsic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtrinsicSubmitStatus {
	/// True if the extrinsic has been included in a block.
	pub success: bool,
	/// Extrinsic hash.
	pub tx_hash: H256,
	/// Hash of the block the extrinsic has been included in.
	pub block_hash: Option<H256>,
}

/// Signed extrinsic that hasn't been submitted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedExtrinsic {
	tx_hash: H256,
	encoded: Vec<u8>,
}

impl PreparedExtrinsic {
	/// Hash the extrinsic will have in the pool and in the block.
	pub fn tx_hash(&self) -> H256 {
		self.tx_hash
	}

	/// SCALE-encoded extrinsic.
	pub fn encoded(&self) -> &[u8] {
		&self.encoded
	}
}

/// Signs, submits and watches extrinsics.
pub struct ExtrinsicService<T, C> {
	runtime: Arc<RuntimeManager<T, C>>,
	listeners: WatchDispatcher,
	address_encoding: AddressEncoding,
	offline_signer: Mutex<Option<Arc<OfflineSigner>>>,
}

impl<T: ChainTransport, C: MetadataCache> ExtrinsicService<T, C> {
	/// Create service that submits extrinsics to the chain of given runtime manager.
	pub fn new(runtime: Arc<RuntimeManager<T, C>>) -> Self {
		ExtrinsicService {
			runtime,
			listeners: WatchDispatcher::new(),
			address_encoding: AddressEncoding::default(),
			offline_signer: Mutex::new(None),
		}
	}

	/// Use different encoding of the extrinsic signer.
	pub fn with_address_encoding(mut self, address_encoding: AddressEncoding) -> Self {
		self.address_encoding = address_encoding;
		self
	}

	/// Runtime manager.
	pub fn runtime(&self) -> &Arc<RuntimeManager<T, C>> {
		&self.runtime
	}

	/// Subscribe to outcomes of all watched extrinsics. Listener with the same name is
	/// replaced.
	pub fn subscribe(&self, name: impl Into<String>, listener: Arc<dyn WatchListener>) {
		self.listeners.subscribe(name, listener);
	}

	/// Unsubscribe from watch outcomes. Returns false if there was no listener with that name.
	pub fn unsubscribe(&self, name: &str) -> bool {
		self.listeners.unsubscribe(name)
	}

	/// Sign extrinsic against the current runtime, without submitting it.
	pub async fn prepare(
		&self,
		from: &str,
		keypair: &Keypair,
		call: &impl BuildCall,
	) -> Result<PreparedExtrinsic> {
		let encoded = self.signed_extrinsic(from, Some(keypair), call).await?;
		Ok(PreparedExtrinsic { tx_hash: extrinsic_hash(&encoded), encoded })
	}

	/// Sign and submit extrinsic without watching it.
	pub async fn submit(
		&self,
		from: &str,
		keypair: &Keypair,
		call: &impl BuildCall,
	) -> Result<H256> {
		let prepared = self.prepare(from, keypair, call).await?;
		let tx_hash = self.runtime.transport().submit_extrinsic(prepared.encoded()).await?;
		tracing::debug!(target: LOG_TARGET, ?tx_hash, "Submitted extrinsic");
		Ok(tx_hash)
	}

	/// Sign and submit extrinsic, and watch it until it's included in a block or rejected.
	///
	/// Same as [`Self::prepare`] followed by [`Self::watch`].
	pub async fn submit_and_watch(
		&self,
		from: &str,
		keypair: &Keypair,
		call: &impl BuildCall,
	) -> Result<ExtrinsicSubmitStatus> {
		let prepared = self.prepare(from, keypair, call).await?;
		self.watch(&prepared).await
	}

	/// Submit prepared extrinsic and watch it until it's included in a block or rejected.
	///
	/// The node rejecting the extrinsic is reported as unsuccessful status. Errors are only
	/// returned if the node can't be reached, and then listeners aren't notified.
	pub async fn watch(&self, prepared: &PreparedExtrinsic) -> Result<ExtrinsicSubmitStatus> {
		let tx_hash = prepared.tx_hash();
		let mut statuses = match self.runtime.transport().submit_and_watch(prepared.encoded()).await
		{
			Ok(statuses) => statuses,
			Err(e) if e.is_rejection() => {
				tracing::info!(target: LOG_TARGET, ?tx_hash, error=?e, "Extrinsic has been rejected");
				return Ok(self.complete(tx_hash, None))
			},
			Err(e) => return Err(e),
		};

		while let Some(status) = statuses.next().await {
			let status = match status {
				Ok(status) => status,
				Err(e) => {
					tracing::warn!(target: LOG_TARGET, ?tx_hash, error=?e, "Extrinsic watch has failed");
					return Ok(self.complete(tx_hash, None))
				},
			};

			tracing::trace!(target: LOG_TARGET, ?tx_hash, ?status, "Extrinsic status");
			match status {
				TransactionStatus::Future |
				TransactionStatus::Ready |
				TransactionStatus::Broadcast(_) |
				TransactionStatus::Retracted(_) => continue,
				TransactionStatus::InBlock(block_hash) |
				TransactionStatus::Finalized(block_hash) |
				TransactionStatus::FinalityTimeout(block_hash) => {
					tracing::info!(
						target: LOG_TARGET,
						?tx_hash,
						?block_hash,
						"Extrinsic has been included in block",
					);
					return Ok(self.complete(tx_hash, Some(block_hash)))
				},
				TransactionStatus::Usurped(_) |
				TransactionStatus::Dropped |
				TransactionStatus::Invalid => {
					tracing::info!(target: LOG_TARGET, ?tx_hash, ?status, "Extrinsic has failed");
					return Ok(self.complete(tx_hash, None))
				},
			}
		}

		tracing::warn!(target: LOG_TARGET, ?tx_hash, "Extrinsic watch has ended unexpectedly");
		Ok(self.complete(tx_hash, None))
	}

	/// Estimate fee of the extrinsic. Any failure is reported as `None`.
	pub async fn calc_fee(&self, from: &str, call: &impl BuildCall) -> Option<u128> {
		let fee = async {
			let extrinsic = self.signed_extrinsic(from, None, call).await?;
			self.runtime.transport().query_fee(&extrinsic).await
		};
		match fee.await {
			Ok(fee) => Some(fee),
			Err(e) => {
				tracing::debug!(target: LOG_TARGET, error=?e, "Failed to estimate fee");
				None
			},
		}
	}

	/// Read and decode storage entry at the best block. Missing entries decode to their
	/// default value.
	pub async fn query_storage(&self, pallet: &str, entry: &str, keys: &[Value]) -> Result<Value> {
		let snapshot = self.runtime.snapshot().await?;
		let key = snapshot.storage_key(pallet, entry, keys)?;
		let data = self.runtime.transport().storage(&key).await?;
		tracing::trace!(
			target: LOG_TARGET,
			key=%hex::encode(&key),
			found=data.is_some(),
			"Read {pallet}.{entry}",
		);
		Ok(snapshot.decode_storage(pallet, entry, data.as_deref())?)
	}

	fn complete(&self, tx_hash: H256, block_hash: Option<H256>) -> ExtrinsicSubmitStatus {
		let status = ExtrinsicSubmitStatus { success: block_hash.is_some(), tx_hash, block_hash };
		self.listeners.dispatch(status.tx_hash, status.success, status.block_hash);
		status
	}

	/// Signed extrinsic. Without keypair the signature is zeroed, which is enough for fee
	/// estimation.
	async fn signed_extrinsic(
		&self,
		from: &str,
		keypair: Option<&Keypair>,
		call: &impl BuildCall,
	) -> Result<Vec<u8>> {
		let (public_key, _) = public_key_of(from)?;
		let signer = match keypair {
			Some(keypair) if keypair.public_key() != public_key =>
				return Err(Error::SignerMismatch(from.into())),
			Some(keypair) => ExtrinsicSigner::Keypair(keypair),
			None => ExtrinsicSigner::Placeholder(public_key),
		};

		let snapshot = self.runtime.snapshot().await?;
		let call = call.build_call(&snapshot)?;

		let transport = self.runtime.transport();
		let genesis_hash = transport.genesis_hash().await?;
		let nonce = transport.account_next_index(from).await?;

		tracing::trace!(
			target: LOG_TARGET,
			spec_version=%snapshot.spec_version(),
			%nonce,
			extensions=?signed_extension_names(snapshot.extrinsic()),
			"Preparing signed extrinsic",
		);

		if OfflineSigner::supports(&snapshot, self.address_encoding) {
			return self.offline_signer(&snapshot, genesis_hash)?.sign(&call, &signer, nonce)
		}

		let params = SigningParams::new(&snapshot, genesis_hash, nonce);
		let signed_extra = SignedExtra::new(&snapshot, &params)?;
		let signature = signer.signature(&signed_payload(&call, &signed_extra));
		Ok(encode_signed_extrinsic(
			self.address_encoding,
			&public_key,
			&signature,
			&signed_extra,
			&call,
		))
	}

	/// Signer of the snapshot runtime, recreated after runtime upgrades.
	fn offline_signer(
		&self,
		snapshot: &RuntimeSnapshot,
		genesis_hash: H256,
	) -> Result<Arc<OfflineSigner>> {
		let mut cached = self.offline_signer.lock();
		match &*cached {
			Some(signer) if signer.is_for(snapshot, genesis_hash) => Ok(signer.clone()),
			_ => {
				let signer = Arc::new(OfflineSigner::new(snapshot, genesis_hash)?);
				*cached = Some(signer.clone());
				Ok(signer)
			},
		}
	}
}
