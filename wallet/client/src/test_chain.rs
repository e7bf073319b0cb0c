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

//! In-memory chain used by the client tests.

#![allow(missing_docs)]

use crate::{
	error::{Error, Result},
	extrinsic::extrinsic_hash,
	service::ExtrinsicService,
	transport::{ChainTransport, TransactionStatus, TransactionStatusStream},
};

use async_trait::async_trait;
use codec::{Decode, Encode};
use frame_metadata::{v14::SignedExtensionMetadata, RuntimeMetadata, RuntimeMetadataPrefixed};
use futures::{stream::BoxStream, StreamExt};
use jsonrpsee::{core::ClientError, types::ErrorObject};
use parking_lot::Mutex;
use sp_core::H256;
use std::{
	collections::BTreeMap,
	sync::{
		atomic::{AtomicBool, AtomicU32, Ordering},
		Arc,
	},
};
use wallet_runtime::{
	test_utils, RuntimeConfig, RuntimeManager, RuntimeSnapshot, RuntimeTransport, RuntimeVersion,
	StoreMetadataCache,
};
use wallet_utils::MemStore;

pub type TestManager = RuntimeManager<Arc<TestChain>, StoreMetadataCache<MemStore>>;
pub type TestService = ExtrinsicService<Arc<TestChain>, StoreMetadataCache<MemStore>>;

/// Snapshot of the test runtime.
pub fn snapshot() -> RuntimeSnapshot {
	RuntimeSnapshot::build(&test_utils::metadata_blob(), &test_utils::runtime_version(7), 69)
		.unwrap()
}

/// Snapshot of the test runtime with given signed extensions. Types of the extensions are
/// copied from `CheckNonce`.
pub fn snapshot_with_extensions(identifiers: &[&str]) -> RuntimeSnapshot {
	let blob = test_utils::metadata_blob();
	let RuntimeMetadataPrefixed(magic, RuntimeMetadata::V14(mut v14)) =
		RuntimeMetadataPrefixed::decode(&mut &blob[..]).unwrap()
	else {
		panic!("test metadata is V14")
	};

	let check_nonce = v14
		.extrinsic
		.signed_extensions
		.iter()
		.find(|extension| extension.identifier == "CheckNonce")
		.cloned()
		.unwrap();
	v14.extrinsic.signed_extensions = identifiers
		.iter()
		.map(|identifier| SignedExtensionMetadata {
			identifier: identifier.to_string(),
			..check_nonce.clone()
		})
		.collect();

	let blob = RuntimeMetadataPrefixed(magic, RuntimeMetadata::V14(v14)).encode();
	RuntimeSnapshot::build(&blob, &test_utils::runtime_version(7), 69).unwrap()
}

/// Chain that accepts everything and reports scripted extrinsic statuses.
pub struct TestChain {
	spec_version: AtomicU32,
	offline: AtomicBool,
	rejecting: AtomicBool,
	statuses: Mutex<Vec<TransactionStatus>>,
	submitted: Mutex<Vec<Vec<u8>>>,
	storage: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl TestChain {
	pub const FEE: u128 = 1_250_000;
	pub const NONCE: u32 = 11;

	pub fn new() -> Arc<Self> {
		Arc::new(TestChain {
			spec_version: AtomicU32::new(7),
			offline: AtomicBool::new(false),
			rejecting: AtomicBool::new(false),
			statuses: Mutex::new(vec![TransactionStatus::InBlock(H256::repeat_byte(0xbb))]),
			submitted: Mutex::new(Vec::new()),
			storage: Mutex::new(BTreeMap::new()),
		})
	}

	pub fn manager(self: &Arc<Self>) -> Arc<TestManager> {
		Arc::new(RuntimeManager::new(
			self.clone(),
			StoreMetadataCache::new(MemStore::new()),
			RuntimeConfig::default(),
		))
	}

	pub fn genesis(&self) -> H256 {
		H256::repeat_byte(0x99)
	}

	pub fn nonce(&self) -> u32 {
		Self::NONCE
	}

	pub fn spec_version(&self) -> u32 {
		self.spec_version.load(Ordering::SeqCst)
	}

	pub fn upgrade_runtime(&self, spec_version: u32) {
		self.spec_version.store(spec_version, Ordering::SeqCst);
	}

	pub fn set_offline(&self, offline: bool) {
		self.offline.store(offline, Ordering::SeqCst);
	}

	/// Make the node reject submitted extrinsics.
	pub fn set_rejecting(&self, rejecting: bool) {
		self.rejecting.store(rejecting, Ordering::SeqCst);
	}

	pub fn set_statuses(&self, statuses: Vec<TransactionStatus>) {
		*self.statuses.lock() = statuses;
	}

	/// Put raw value to the best block storage.
	pub fn set_storage(&self, key: Vec<u8>, value: Vec<u8>) {
		self.storage.lock().insert(key, value);
	}

	pub fn submitted(&self) -> Vec<Vec<u8>> {
		self.submitted.lock().clone()
	}

	fn ensure_online(&self) -> Result<()> {
		if self.offline.load(Ordering::SeqCst) {
			return Err(Error::Transport("connection refused".into()))
		}
		Ok(())
	}

	fn accept(&self, extrinsic: &[u8]) -> Result<H256> {
		self.ensure_online()?;
		if self.rejecting.load(Ordering::SeqCst) {
			return Err(ClientError::Call(ErrorObject::owned(
				1010,
				"Invalid Transaction",
				Some("Inability to pay some fees"),
			))
			.into())
		}
		self.submitted.lock().push(extrinsic.to_vec());
		Ok(extrinsic_hash(extrinsic))
	}
}

#[async_trait]
impl RuntimeTransport for TestChain {
	async fn runtime_version(&self) -> wallet_runtime::Result<RuntimeVersion> {
		self.ensure_online()?;
		Ok(test_utils::runtime_version(self.spec_version()))
	}

	async fn metadata(&self) -> wallet_runtime::Result<Vec<u8>> {
		self.ensure_online()?;
		Ok(test_utils::metadata_blob())
	}
}

#[async_trait]
impl ChainTransport for TestChain {
	async fn genesis_hash(&self) -> Result<H256> {
		self.ensure_online()?;
		Ok(self.genesis())
	}

	async fn account_next_index(&self, _address: &str) -> Result<u32> {
		self.ensure_online()?;
		Ok(self.nonce())
	}

	async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
		self.ensure_online()?;
		Ok(self.storage.lock().get(key).cloned())
	}

	async fn query_fee(&self, _extrinsic: &[u8]) -> Result<u128> {
		self.ensure_online()?;
		Ok(Self::FEE)
	}

	async fn submit_extrinsic(&self, extrinsic: &[u8]) -> Result<H256> {
		self.accept(extrinsic)
	}

	async fn submit_and_watch(&self, extrinsic: &[u8]) -> Result<TransactionStatusStream> {
		self.accept(extrinsic)?;
		let statuses = self.statuses.lock().clone();
		Ok(futures::stream::iter(statuses.into_iter().map(Ok)).boxed())
	}

	async fn subscribe_runtime_version(&self) -> Result<BoxStream<'static, RuntimeVersion>> {
		self.ensure_online()?;
		Ok(futures::stream::empty().boxed())
	}
}
