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

//! GraphQL client of the SubQuery transaction indexer.

use crate::{
	error::{Error, Result},
	indexer::{IndexedTransactionRecord, Indexer, IndexerPage},
	LOG_TARGET,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeSet;

/// Number of transfers that are scanned for peer suggestions.
const PEER_SEARCH_LIMIT: u32 = 100;

const HISTORY_ELEMENT_FIELDS: &str =
	"id blockHash module method timestamp networkFee execution data";

/// SubQuery indexer client.
#[derive(Clone, Debug)]
pub struct SubqueryIndexer {
	url: String,
	client: Client,
}

impl SubqueryIndexer {
	/// Create client of the indexer at given URL.
	pub fn new(url: impl Into<String>) -> Self {
		SubqueryIndexer { url: url.into(), client: Client::new() }
	}

	/// Indexer URL.
	pub fn url(&self) -> &str {
		&self.url
	}

	async fn query<T: DeserializeOwned>(&self, query: String, variables: JsonValue) -> Result<T> {
		tracing::trace!(target: LOG_TARGET, url=%self.url, %variables, "Querying indexer");
		let response: GraphQlResponse<T> = self
			.client
			.post(&self.url)
			.json(&json!({ "query": query, "variables": variables }))
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		response.into_result()
	}
}

#[async_trait]
impl Indexer for SubqueryIndexer {
	async fn page(&self, account: &str, page: u32, page_size: u32) -> Result<IndexerPage> {
		let query = format!(
			"query HistoryElements($address: String!, $first: Int!, $offset: Int!) {{
				historyElements(
					first: $first
					offset: $offset
					orderBy: TIMESTAMP_DESC
					filter: {{
						or: [
							{{ address: {{ equalTo: $address }} }}
							{{ data: {{ contains: {{ to: $address }} }} }}
						]
					}}
				) {{
					nodes {{ {HISTORY_ELEMENT_FIELDS} }}
					pageInfo {{ hasNextPage }}
				}}
			}}"
		);
		let offset = page.max(1).saturating_sub(1).saturating_mul(page_size);
		let data: HistoryElementsData = self
			.query(query, json!({ "address": account, "first": page_size, "offset": offset }))
			.await?;

		let elements = data.history_elements;
		Ok(IndexerPage {
			end_reached: !elements.page_info.has_next_page,
			records: elements.nodes.into_iter().map(Into::into).collect(),
		})
	}

	async fn transaction(&self, hash: &str) -> Result<Option<IndexedTransactionRecord>> {
		let query = format!(
			"query HistoryElement($id: String!) {{
				historyElements(filter: {{ id: {{ equalToInsensitive: $id }} }}, first: 1) {{
					nodes {{ {HISTORY_ELEMENT_FIELDS} }}
					pageInfo {{ hasNextPage }}
				}}
			}}"
		);
		let data: HistoryElementsData = self.query(query, json!({ "id": hash })).await?;
		Ok(data.history_elements.nodes.into_iter().next().map(Into::into))
	}

	async fn search_peers(&self, account: &str, query: &str) -> Result<Vec<String>> {
		let graphql = format!(
			"query Peers($address: String!, $first: Int!) {{
				historyElements(
					first: $first
					orderBy: TIMESTAMP_DESC
					filter: {{
						address: {{ equalTo: $address }}
						module: {{ equalTo: \"assets\" }}
						method: {{ equalTo: \"transfer\" }}
					}}
				) {{
					nodes {{ {HISTORY_ELEMENT_FIELDS} }}
					pageInfo {{ hasNextPage }}
				}}
			}}"
		);
		let data: HistoryElementsData = self
			.query(graphql, json!({ "address": account, "first": PEER_SEARCH_LIMIT }))
			.await?;

		let transfers = data.history_elements.nodes.into_iter().map(Into::into).collect::<Vec<_>>();
		Ok(matching_peers(&transfers, account, query))
	}
}

/// Distinct receivers of the transfers that contain `query`, case-insensitively, in order of
/// the most recent transfer.
fn matching_peers(transfers: &[IndexedTransactionRecord], account: &str, query: &str) -> Vec<String> {
	let query = query.trim().to_lowercase();
	let mut seen = BTreeSet::new();
	transfers
		.iter()
		.filter_map(|transfer| transfer.data.get("to").and_then(JsonValue::as_str))
		.filter(|peer| *peer != account && peer.to_lowercase().contains(&query))
		.filter(|peer| seen.insert(peer.to_string()))
		.map(Into::into)
		.collect()
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
	data: Option<T>,
	#[serde(default)]
	errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
	message: String,
}

impl<T> GraphQlResponse<T> {
	fn into_result(self) -> Result<T> {
		if !self.errors.is_empty() {
			let messages = self.errors.into_iter().map(|error| error.message).collect::<Vec<_>>();
			return Err(Error::Indexer(messages.join("; ")))
		}
		self.data.ok_or_else(|| Error::InvalidResponse("neither data nor errors".into()))
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryElementsData {
	history_elements: HistoryElements,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryElements {
	nodes: Vec<HistoryElement>,
	page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
	has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryElement {
	id: String,
	block_hash: Option<String>,
	module: String,
	method: String,
	#[serde(deserialize_with = "timestamp")]
	timestamp: u64,
	#[serde(default)]
	network_fee: Option<String>,
	#[serde(default)]
	execution: Option<Execution>,
	#[serde(default)]
	data: JsonValue,
}

#[derive(Debug, Deserialize)]
struct Execution {
	success: bool,
}

/// Timestamps are either numbers or strings, depending on the indexer version.
fn timestamp<'de, D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
	match JsonValue::deserialize(deserializer)? {
		JsonValue::Number(number) =>
			number.as_u64().ok_or_else(|| serde::de::Error::custom("negative timestamp")),
		JsonValue::String(string) => string.parse().map_err(serde::de::Error::custom),
		value => Err(serde::de::Error::custom(format!("invalid timestamp {value}"))),
	}
}

impl From<HistoryElement> for IndexedTransactionRecord {
	fn from(element: HistoryElement) -> Self {
		IndexedTransactionRecord {
			hash: element.id,
			block_hash: element.block_hash,
			module: element.module,
			method: element.method,
			timestamp: element.timestamp,
			network_fee: element.network_fee.unwrap_or_default(),
			// elements without execution info are only indexed once executed successfully
			success: element.execution.map_or(true, |execution| execution.success),
			data: element.data,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_history_page() {
		let response: GraphQlResponse<HistoryElementsData> = serde_json::from_value(json!({
			"data": {
				"historyElements": {
					"nodes": [{
						"id": "0xAA",
						"blockHash": "0xbb",
						"module": "assets",
						"method": "transfer",
						"timestamp": "1700000000",
						"networkFee": "0.0007",
						"execution": { "success": false },
						"data": { "from": "a", "to": "b", "amount": "1", "assetId": "0x02" },
					}],
					"pageInfo": { "hasNextPage": false },
				},
			},
		}))
		.unwrap();

		let elements = response.into_result().unwrap().history_elements;
		assert!(!elements.page_info.has_next_page);
		let records = elements.nodes.into_iter().map(IndexedTransactionRecord::from).collect::<Vec<_>>();
		assert_eq!(
			records,
			vec![IndexedTransactionRecord {
				hash: "0xAA".into(),
				block_hash: Some("0xbb".into()),
				module: "assets".into(),
				method: "transfer".into(),
				timestamp: 1_700_000_000,
				network_fee: "0.0007".into(),
				success: false,
				data: json!({ "from": "a", "to": "b", "amount": "1", "assetId": "0x02" }),
			}],
		);
	}

	#[test]
	fn graphql_errors_are_reported() {
		let response: GraphQlResponse<HistoryElementsData> = serde_json::from_value(json!({
			"data": null,
			"errors": [{ "message": "first" }, { "message": "second" }],
		}))
		.unwrap();
		assert_matches!(response.into_result(), Err(Error::Indexer(message)) if message == "first; second");

		let response: GraphQlResponse<HistoryElementsData> =
			serde_json::from_value(json!({})).unwrap();
		assert_matches!(response.into_result(), Err(Error::InvalidResponse(_)));
	}

	#[test]
	fn peers_are_distinct_and_matching() {
		let transfer = |to: &str| IndexedTransactionRecord {
			hash: "0x00".into(),
			block_hash: None,
			module: "assets".into(),
			method: "transfer".into(),
			timestamp: 0,
			network_fee: String::new(),
			success: true,
			data: json!({ "from": "me", "to": to }),
		};
		let transfers =
			vec![transfer("cnBob"), transfer("me"), transfer("cnCarol"), transfer("cnBob")];

		assert_eq!(matching_peers(&transfers, "me", "CN"), vec!["cnBob", "cnCarol"]);
		assert_eq!(matching_peers(&transfers, "me", "carol"), vec!["cnCarol"]);
		assert!(matching_peers(&transfers, "me", "dave").is_empty());
	}
}
