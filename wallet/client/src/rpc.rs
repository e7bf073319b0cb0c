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

//! Node transport over JSON-RPC WebSocket connection.

use crate::{
	error::{Error, Result},
	transport::{ChainTransport, TransactionStatus, TransactionStatusStream},
	LOG_TARGET,
};

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use jsonrpsee::{
	core::{
		client::{ClientT, SubscriptionClientT},
		rpc_params,
	},
	ws_client::{WsClient, WsClientBuilder},
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sp_core::H256;
use wallet_runtime::{RuntimeTransport, RuntimeVersion};

/// Node transport over JSON-RPC WebSocket connection.
pub struct RpcTransport {
	url: String,
	client: WsClient,
}

impl std::fmt::Debug for RpcTransport {
	fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
		fmt.debug_struct("RpcTransport").field("url", &self.url).finish()
	}
}

impl RpcTransport {
	/// Connect to the node.
	pub async fn connect(url: &str) -> Result<Self> {
		tracing::debug!(target: LOG_TARGET, "Connecting to {url}");
		let client = WsClientBuilder::default().build(url).await?;
		Ok(RpcTransport { url: url.into(), client })
	}

	/// Node URL.
	pub fn url(&self) -> &str {
		&self.url
	}

	/// Returns true if the connection is still alive.
	pub fn is_connected(&self) -> bool {
		self.client.is_connected()
	}

	async fn fetch_runtime_version(&self) -> Result<RuntimeVersion> {
		Ok(self.client.request("state_getRuntimeVersion", rpc_params![]).await?)
	}

	async fn fetch_metadata(&self) -> Result<Vec<u8>> {
		let metadata: String = self.client.request("state_getMetadata", rpc_params![]).await?;
		decode_hex("state_getMetadata", &metadata)
	}
}

#[async_trait]
impl RuntimeTransport for RpcTransport {
	async fn runtime_version(&self) -> wallet_runtime::Result<RuntimeVersion> {
		Ok(self.fetch_runtime_version().await?)
	}

	async fn metadata(&self) -> wallet_runtime::Result<Vec<u8>> {
		Ok(self.fetch_metadata().await?)
	}
}

#[async_trait]
impl ChainTransport for RpcTransport {
	async fn genesis_hash(&self) -> Result<H256> {
		Ok(self.client.request("chain_getBlockHash", rpc_params![0u32]).await?)
	}

	async fn account_next_index(&self, address: &str) -> Result<u32> {
		Ok(self.client.request("system_accountNextIndex", rpc_params![address]).await?)
	}

	async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
		let value: Option<String> =
			self.client.request("state_getStorage", rpc_params![to_hex(key)]).await?;
		value.map(|value| decode_hex("state_getStorage", &value)).transpose()
	}

	async fn query_fee(&self, extrinsic: &[u8]) -> Result<u128> {
		let info: FeeInfo =
			self.client.request("payment_queryInfo", rpc_params![to_hex(extrinsic)]).await?;
		parse_fee(&info.partial_fee)
	}

	async fn submit_extrinsic(&self, extrinsic: &[u8]) -> Result<H256> {
		Ok(self.client.request("author_submitExtrinsic", rpc_params![to_hex(extrinsic)]).await?)
	}

	async fn submit_and_watch(&self, extrinsic: &[u8]) -> Result<TransactionStatusStream> {
		let subscription = self
			.client
			.subscribe::<TransactionStatus, _>(
				"author_submitAndWatchExtrinsic",
				rpc_params![to_hex(extrinsic)],
				"author_unwatchExtrinsic",
			)
			.await?;

		Ok(subscription
			.map(|status| {
				status.map_err(|e| Error::InvalidResponse {
					method: "author_submitAndWatchExtrinsic",
					reason: e.to_string(),
				})
			})
			.boxed())
	}

	async fn subscribe_runtime_version(&self) -> Result<BoxStream<'static, RuntimeVersion>> {
		let subscription = self
			.client
			.subscribe::<RuntimeVersion, _>(
				"state_subscribeRuntimeVersion",
				rpc_params![],
				"state_unsubscribeRuntimeVersion",
			)
			.await?;

		Ok(subscription
			.filter_map(|version| async move {
				version
					.map_err(|e| {
						tracing::warn!(target: LOG_TARGET, error=?e, "Invalid runtime version")
					})
					.ok()
			})
			.boxed())
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeInfo {
	partial_fee: JsonValue,
}

/// Fee is a decimal string on most nodes, but some nodes return numbers or hex strings.
fn parse_fee(fee: &JsonValue) -> Result<u128> {
	let invalid = || Error::InvalidResponse {
		method: "payment_queryInfo",
		reason: format!("invalid partial fee {fee}"),
	};
	match fee {
		JsonValue::Number(number) => number.as_u64().map(Into::into).ok_or_else(invalid),
		JsonValue::String(fee) => match fee.strip_prefix("0x") {
			Some(hex) => u128::from_str_radix(hex, 16).map_err(|_| invalid()),
			None => fee.parse().map_err(|_| invalid()),
		},
		_ => Err(invalid()),
	}
}

fn to_hex(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

fn decode_hex(method: &'static str, value: &str) -> Result<Vec<u8>> {
	hex::decode(value.trim_start_matches("0x"))
		.map_err(|e| Error::InvalidResponse { method, reason: e.to_string() })
}
