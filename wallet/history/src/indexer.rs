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

//! Remote transaction indexer boundary.

use crate::error::Result;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Transaction record of the remote indexer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedTransactionRecord {
	/// Extrinsic hash.
	pub hash: String,
	/// Hash of the block the extrinsic has been included in.
	pub block_hash: Option<String>,
	/// Pallet name, as the indexer spells it (e.g. `assets`).
	pub module: String,
	/// Call name, as the indexer spells it (e.g. `transfer`).
	pub method: String,
	/// Block timestamp in seconds.
	pub timestamp: u64,
	/// Network fee, as a decimal string in the fee asset.
	pub network_fee: String,
	/// Whether the extrinsic has been executed successfully.
	pub success: bool,
	/// Call parameters. For batches, an array of `{ module, method, data }` objects.
	pub data: JsonValue,
}

/// One page of indexer records, newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexerPage {
	/// Records of the page.
	pub records: Vec<IndexedTransactionRecord>,
	/// No more pages after this one.
	pub end_reached: bool,
}

/// Remote transaction indexer.
#[async_trait]
pub trait Indexer: Send + Sync {
	/// Fetch page of the account transactions. Pages are numbered from 1.
	async fn page(&self, account: &str, page: u32, page_size: u32) -> Result<IndexerPage>;

	/// Fetch transaction by its hash.
	async fn transaction(&self, hash: &str) -> Result<Option<IndexedTransactionRecord>>;

	/// Addresses the account has transferred to that contain `query`.
	async fn search_peers(&self, account: &str, query: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<I: Indexer + ?Sized> Indexer for Arc<I> {
	async fn page(&self, account: &str, page: u32, page_size: u32) -> Result<IndexerPage> {
		(**self).page(account, page, page_size).await
	}

	async fn transaction(&self, hash: &str) -> Result<Option<IndexedTransactionRecord>> {
		(**self).transaction(hash).await
	}

	async fn search_peers(&self, account: &str, query: &str) -> Result<Vec<String>> {
		(**self).search_peers(account, query).await
	}
}
