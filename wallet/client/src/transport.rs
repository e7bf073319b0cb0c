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

//! Node calls used by the extrinsic service.

use crate::error::Result;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use sp_core::H256;
use std::sync::Arc;
use wallet_runtime::{RuntimeTransport, RuntimeVersion};

/// Status of the watched extrinsic, as reported by `author_submitAndWatchExtrinsic`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
	/// Extrinsic is part of the future queue.
	Future,
	/// Extrinsic is part of the ready queue.
	Ready,
	/// Extrinsic has been broadcast to the given peers.
	Broadcast(Vec<String>),
	/// Extrinsic has been included in the block with given hash.
	InBlock(H256),
	/// The block this extrinsic was included in has been retracted.
	Retracted(H256),
	/// Maximum number of finality watchers has been reached.
	FinalityTimeout(H256),
	/// Extrinsic has been finalized by a finality-gadget.
	Finalized(H256),
	/// Extrinsic has been replaced in the pool by another extrinsic with the same nonce.
	Usurped(H256),
	/// Extrinsic has been dropped from the pool because of the limit.
	Dropped,
	/// Extrinsic is no longer valid in the current state.
	Invalid,
}

impl TransactionStatus {
	/// Returns true if the node won't send any updates after this status.
	pub fn is_final(&self) -> bool {
		matches!(
			self,
			TransactionStatus::Finalized(_) |
				TransactionStatus::FinalityTimeout(_) |
				TransactionStatus::Usurped(_) |
				TransactionStatus::Dropped |
				TransactionStatus::Invalid
		)
	}
}

/// Stream of statuses of the watched extrinsic.
pub type TransactionStatusStream = BoxStream<'static, Result<TransactionStatus>>;

/// Access to the chain node.
#[async_trait]
pub trait ChainTransport: RuntimeTransport {
	/// Hash of the genesis block.
	async fn genesis_hash(&self) -> Result<H256>;

	/// Next nonce of the account, including extrinsics from the pool.
	async fn account_next_index(&self, address: &str) -> Result<u32>;

	/// Read raw storage value at the best block.
	async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

	/// Estimate partial fee of the signed extrinsic.
	async fn query_fee(&self, extrinsic: &[u8]) -> Result<u128>;

	/// Submit extrinsic to the pool.
	async fn submit_extrinsic(&self, extrinsic: &[u8]) -> Result<H256>;

	/// Submit extrinsic to the pool and watch its status.
	async fn submit_and_watch(&self, extrinsic: &[u8]) -> Result<TransactionStatusStream>;

	/// Subscribe to runtime version updates.
	async fn subscribe_runtime_version(&self) -> Result<BoxStream<'static, RuntimeVersion>>;
}

#[async_trait]
impl<T: ChainTransport + ?Sized> ChainTransport for Arc<T> {
	async fn genesis_hash(&self) -> Result<H256> {
		(**self).genesis_hash().await
	}

	async fn account_next_index(&self, address: &str) -> Result<u32> {
		(**self).account_next_index(address).await
	}

	async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
		(**self).storage(key).await
	}

	async fn query_fee(&self, extrinsic: &[u8]) -> Result<u128> {
		(**self).query_fee(extrinsic).await
	}

	async fn submit_extrinsic(&self, extrinsic: &[u8]) -> Result<H256> {
		(**self).submit_extrinsic(extrinsic).await
	}

	async fn submit_and_watch(&self, extrinsic: &[u8]) -> Result<TransactionStatusStream> {
		(**self).submit_and_watch(extrinsic).await
	}

	async fn subscribe_runtime_version(&self) -> Result<BoxStream<'static, RuntimeVersion>> {
		(**self).subscribe_runtime_version().await
	}
}
