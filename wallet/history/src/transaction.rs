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

//! Typed transactions of the history feed.

use crate::{indexer::IndexedTransactionRecord, LOG_TARGET};

use serde_json::Value as JsonValue;
use wallet_client::H256;

/// Precision of assets that are missing from the token list.
pub const DEFAULT_PRECISION: u8 = 18;

/// Asset known to the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
	/// Asset identifier.
	pub id: String,
	/// Ticker.
	pub symbol: String,
	/// Number of decimals.
	pub precision: u8,
}

impl Token {
	/// Create token.
	pub fn new(id: impl Into<String>, symbol: impl Into<String>, precision: u8) -> Self {
		Token { id: id.into(), symbol: symbol.into(), precision }
	}
}

/// Status of the transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
	/// Submitted, but not included in a block yet.
	Pending,
	/// Included in a block.
	Committed,
	/// Rejected by the node, or failed on chain.
	Rejected,
}

/// What the transaction does. Amounts are in the smallest units of the asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionKind {
	/// `assets.transfer`.
	Transfer {
		/// Transferred asset.
		token_id: String,
		/// Transferred amount.
		amount: u128,
		/// The other side of the transfer.
		peer: String,
		/// The account is the receiver.
		incoming: bool,
	},
	/// `liquidityProxy.swap`.
	Swap {
		/// Asset that has been sold.
		input_token_id: String,
		/// Amount that has been sold.
		input_amount: u128,
		/// Asset that has been bought.
		output_token_id: String,
		/// Amount that has been bought.
		output_amount: u128,
		/// Liquidity provider fee, in the fee asset.
		lp_fee: u128,
	},
	/// `poolXYK.depositLiquidity`.
	AddLiquidity {
		/// Base asset of the pool.
		base_token_id: String,
		/// Deposited base asset amount.
		base_amount: u128,
		/// Target asset of the pool.
		target_token_id: String,
		/// Deposited target asset amount.
		target_amount: u128,
	},
	/// `poolXYK.withdrawLiquidity`.
	RemoveLiquidity {
		/// Base asset of the pool.
		base_token_id: String,
		/// Withdrawn base asset amount.
		base_amount: u128,
		/// Target asset of the pool.
		target_token_id: String,
		/// Withdrawn target asset amount.
		target_amount: u128,
	},
	/// `referrals.reserve`.
	ReferralBond {
		/// Bonded amount of the fee asset.
		amount: u128,
	},
	/// `referrals.unreserve`.
	ReferralUnbond {
		/// Unbonded amount of the fee asset.
		amount: u128,
	},
	/// `referrals.setReferrer`.
	SetReferrer {
		/// The other side of the referral relation.
		peer: String,
		/// The peer has become the referrer of the account.
		is_my_referrer: bool,
	},
	/// `utility.batchAll`. Calls are either applied all together, or not at all.
	Batch(Vec<TransactionKind>),
}

impl TransactionKind {
	/// Assets that are referenced by the call itself (not by nested calls of a batch).
	pub fn token_ids(&self) -> Vec<&str> {
		match self {
			TransactionKind::Transfer { token_id, .. } => vec![token_id.as_str()],
			TransactionKind::Swap { input_token_id, output_token_id, .. } =>
				vec![input_token_id.as_str(), output_token_id.as_str()],
			TransactionKind::AddLiquidity { base_token_id, target_token_id, .. } |
			TransactionKind::RemoveLiquidity { base_token_id, target_token_id, .. } =>
				vec![base_token_id.as_str(), target_token_id.as_str()],
			TransactionKind::ReferralBond { .. } |
			TransactionKind::ReferralUnbond { .. } |
			TransactionKind::SetReferrer { .. } |
			TransactionKind::Batch(_) => vec![],
		}
	}

	/// Returns true if it is a call of the referrals pallet.
	pub fn is_referral(&self) -> bool {
		matches!(
			self,
			TransactionKind::ReferralBond { .. } |
				TransactionKind::ReferralUnbond { .. } |
				TransactionKind::SetReferrer { .. }
		)
	}

	/// Returns true if the transaction should be shown in the history of the given asset.
	///
	/// Referral calls only move the fee asset, so they're shown in its history.
	pub fn matches_token(&self, token_id: &str, fee_asset_id: &str) -> bool {
		match self {
			TransactionKind::Batch(calls) =>
				calls.iter().any(|call| call.matches_token(token_id, fee_asset_id)),
			kind if kind.is_referral() => token_id == fee_asset_id,
			kind => kind.token_ids().contains(&token_id),
		}
	}
}

/// Transaction of the history feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
	/// Extrinsic hash, `0x`-prefixed lowercase hex.
	pub hash: String,
	/// Hash of the block the extrinsic has been included in.
	pub block_hash: Option<String>,
	/// Milliseconds since the Unix epoch.
	pub timestamp: u64,
	/// Network fee in the smallest units of the fee asset.
	pub fee: u128,
	/// Transaction status.
	pub status: TransactionStatus,
	/// What the transaction does.
	pub kind: TransactionKind,
}

impl Transaction {
	/// Transaction that has just been submitted.
	pub fn pending(hash: H256, kind: TransactionKind, fee: u128, timestamp: u64) -> Self {
		Transaction {
			hash: hash_to_string(&hash),
			block_hash: None,
			timestamp,
			fee,
			status: TransactionStatus::Pending,
			kind,
		}
	}

	/// Map indexer record into transaction. Returns `None` for calls the wallet doesn't show,
	/// and for calls of assets that are missing from `tokens`.
	pub fn from_record(
		record: &IndexedTransactionRecord,
		tokens: &[Token],
		account: &str,
		fee_asset_id: &str,
	) -> Option<Self> {
		let mapper = RecordMapper { tokens, account, fee_asset_id };
		let kind = mapper.map(&record.module, &record.method, &record.data)?;
		Some(Transaction {
			hash: normalize_hash(&record.hash),
			block_hash: record.block_hash.as_deref().map(normalize_hash),
			timestamp: record.timestamp.saturating_mul(1_000),
			fee: parse_amount(&record.network_fee, mapper.fee_precision()),
			status: if record.success {
				TransactionStatus::Committed
			} else {
				TransactionStatus::Rejected
			},
			kind,
		})
	}
}

struct RecordMapper<'a> {
	tokens: &'a [Token],
	account: &'a str,
	fee_asset_id: &'a str,
}

impl<'a> RecordMapper<'a> {
	fn map(&self, module: &str, method: &str, data: &JsonValue) -> Option<TransactionKind> {
		let kind = match (module, method) {
			("assets", "transfer") => {
				let (token_id, precision) = self.token(data, "assetId")?;
				let from = str_field(data, "from")?;
				let to = str_field(data, "to")?;
				let incoming = to == self.account && from != self.account;
				TransactionKind::Transfer {
					token_id,
					amount: amount_field(data, "amount", precision),
					peer: (if incoming { from } else { to }).into(),
					incoming,
				}
			},
			("liquidityProxy", "swap") => {
				let (input_token_id, input_precision) = self.token(data, "baseAssetId")?;
				let (output_token_id, output_precision) = self.token(data, "targetAssetId")?;
				TransactionKind::Swap {
					input_amount: amount_field(data, "baseAssetAmount", input_precision),
					output_amount: amount_field(data, "targetAssetAmount", output_precision),
					lp_fee: amount_field(data, "liquidityProviderFee", self.fee_precision()),
					input_token_id,
					output_token_id,
				}
			},
			("poolXYK", "depositLiquidity") | ("poolXYK", "withdrawLiquidity") => {
				let (base_token_id, base_precision) = self.token(data, "baseAssetId")?;
				let (target_token_id, target_precision) = self.token(data, "targetAssetId")?;
				let base_amount = amount_field(data, "baseAssetAmount", base_precision);
				let target_amount = amount_field(data, "targetAssetAmount", target_precision);
				if method == "depositLiquidity" {
					TransactionKind::AddLiquidity {
						base_token_id,
						base_amount,
						target_token_id,
						target_amount,
					}
				} else {
					TransactionKind::RemoveLiquidity {
						base_token_id,
						base_amount,
						target_token_id,
						target_amount,
					}
				}
			},
			("referrals", "reserve") => TransactionKind::ReferralBond {
				amount: amount_field(data, "amount", self.fee_precision()),
			},
			("referrals", "unreserve") => TransactionKind::ReferralUnbond {
				amount: amount_field(data, "amount", self.fee_precision()),
			},
			("referrals", "setReferrer") => {
				let referral = str_field(data, "from")?;
				let referrer = str_field(data, "to")?;
				let is_my_referrer = referral == self.account;
				TransactionKind::SetReferrer {
					peer: (if is_my_referrer { referrer } else { referral }).into(),
					is_my_referrer,
				}
			},
			("utility", "batchAll") => {
				let calls = data
					.as_array()?
					.iter()
					.filter_map(|call| {
						self.map(str_field(call, "module")?, str_field(call, "method")?, &call["data"])
					})
					.collect::<Vec<_>>();
				if calls.is_empty() {
					return None
				}
				TransactionKind::Batch(calls)
			},
			_ => {
				tracing::trace!(target: LOG_TARGET, "Skipping unknown call {module}.{method}");
				return None
			},
		};
		Some(kind)
	}

	fn token(&self, data: &JsonValue, field: &str) -> Option<(String, u8)> {
		let id = str_field(data, field)?;
		match self.tokens.iter().find(|token| token.id == id) {
			Some(token) => Some((token.id.clone(), token.precision)),
			None => {
				tracing::trace!(target: LOG_TARGET, "Skipping call of unknown asset {id}");
				None
			},
		}
	}

	fn fee_precision(&self) -> u8 {
		self.tokens
			.iter()
			.find(|token| token.id == self.fee_asset_id)
			.map(|token| token.precision)
			.unwrap_or(DEFAULT_PRECISION)
	}
}

fn str_field<'a>(data: &'a JsonValue, field: &str) -> Option<&'a str> {
	data.get(field).and_then(JsonValue::as_str)
}

fn amount_field(data: &JsonValue, field: &str, precision: u8) -> u128 {
	match data.get(field) {
		Some(JsonValue::String(amount)) => parse_amount(amount, precision),
		Some(JsonValue::Number(amount)) => parse_amount(&amount.to_string(), precision),
		_ => 0,
	}
}

/// Parse decimal amount (e.g. `"1.25"`) into the smallest units of the asset with given
/// precision. Anything that isn't a non-negative decimal number that fits into `u128` is zero.
/// Digits beyond the precision are truncated.
pub fn parse_amount(amount: &str, precision: u8) -> u128 {
	let amount = amount.trim();
	let (integer, fraction) = amount.split_once('.').unwrap_or((amount, ""));
	let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
	if (integer.is_empty() && fraction.is_empty()) || !is_digits(integer) || !is_digits(fraction) {
		return 0
	}

	let precision = precision as usize;
	let fraction = &fraction[..fraction.len().min(precision)];
	let digits = format!("{integer}{fraction:0<precision$}");
	let digits = digits.trim_start_matches('0');
	if digits.is_empty() {
		return 0
	}
	digits.parse().unwrap_or(0)
}

/// `0x`-prefixed lowercase hex of the hash.
pub fn hash_to_string(hash: &H256) -> String {
	format!("0x{}", hex::encode(hash.as_bytes()))
}

/// Indexers don't agree on the hash case.
pub(crate) fn normalize_hash(hash: &str) -> String {
	let hash = hash.trim();
	let hex = hash.strip_prefix("0x").or_else(|| hash.strip_prefix("0X")).unwrap_or(hash);
	format!("0x{}", hex.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	pub const XOR: &str = "0x0200000000000000000000000000000000000000000000000000000000000000";
	pub const VAL: &str = "0x0200040000000000000000000000000000000000000000000000000000000000";
	pub const ALICE: &str = "cnVkoGs3rEMqLqY27c2nfVXJRGdzNJk2ns78DcqtppaSRe8qm";
	pub const BOB: &str = "cnUVLAjzRsrXrzEiqjxMpBwvb6YgdBy8DKibonvZgtcQY5ZKe";

	fn tokens() -> Vec<Token> {
		vec![Token::new(XOR, "XOR", 18), Token::new(VAL, "VAL", 18)]
	}

	fn record(module: &str, method: &str, data: JsonValue) -> IndexedTransactionRecord {
		IndexedTransactionRecord {
			hash: "0xABCD".into(),
			block_hash: Some("0x01".into()),
			module: module.into(),
			method: method.into(),
			timestamp: 1_700_000_000,
			network_fee: "0.0007".into(),
			success: true,
			data,
		}
	}

	fn map(record: &IndexedTransactionRecord) -> Option<Transaction> {
		Transaction::from_record(record, &tokens(), ALICE, XOR)
	}

	#[test]
	fn parses_amounts() {
		assert_eq!(parse_amount("1", 2), 100);
		assert_eq!(parse_amount("1.5", 2), 150);
		assert_eq!(parse_amount("0.001", 2), 0);
		assert_eq!(parse_amount(".5", 1), 5);
		assert_eq!(parse_amount("5.", 1), 50);
		assert_eq!(parse_amount("0.0007", 18), 700_000_000_000_000);
		assert_eq!(parse_amount(" 12.34 ", 18), 12_340_000_000_000_000_000);
		for invalid in ["", ".", "-1", "1e5", "abc", "1.2.3", "NaN", "1,5"] {
			assert_eq!(parse_amount(invalid, 18), 0, "{invalid}");
		}
		// doesn't fit into u128
		assert_eq!(parse_amount("1000000000000000000000", 18), 0);
	}

	#[test]
	fn maps_transfers() {
		let outgoing = map(&record(
			"assets",
			"transfer",
			json!({ "from": ALICE, "to": BOB, "amount": "5", "assetId": VAL }),
		))
		.unwrap();
		assert_eq!(outgoing.hash, "0xabcd");
		assert_eq!(outgoing.timestamp, 1_700_000_000_000);
		assert_eq!(outgoing.fee, 700_000_000_000_000);
		assert_eq!(outgoing.status, TransactionStatus::Committed);
		assert_eq!(
			outgoing.kind,
			TransactionKind::Transfer {
				token_id: VAL.into(),
				amount: 5_000_000_000_000_000_000,
				peer: BOB.into(),
				incoming: false,
			},
		);

		let incoming = map(&record(
			"assets",
			"transfer",
			json!({ "from": BOB, "to": ALICE, "amount": "not a number", "assetId": XOR }),
		))
		.unwrap();
		assert_eq!(
			incoming.kind,
			TransactionKind::Transfer { token_id: XOR.into(), amount: 0, peer: BOB.into(), incoming: true },
		);
	}

	#[test]
	fn maps_liquidity_and_referrals() {
		let data = json!({
			"baseAssetId": XOR,
			"targetAssetId": VAL,
			"baseAssetAmount": "1",
			"targetAssetAmount": "2",
		});
		assert_matches::assert_matches!(
			map(&record("poolXYK", "depositLiquidity", data.clone())).unwrap().kind,
			TransactionKind::AddLiquidity { base_amount: 1_000_000_000_000_000_000, .. }
		);
		assert_matches::assert_matches!(
			map(&record("poolXYK", "withdrawLiquidity", data)).unwrap().kind,
			TransactionKind::RemoveLiquidity { target_amount: 2_000_000_000_000_000_000, .. }
		);

		assert_eq!(
			map(&record("referrals", "setReferrer", json!({ "from": ALICE, "to": BOB })))
				.unwrap()
				.kind,
			TransactionKind::SetReferrer { peer: BOB.into(), is_my_referrer: true },
		);
		assert_eq!(
			map(&record("referrals", "reserve", json!({ "amount": "0.5" }))).unwrap().kind,
			TransactionKind::ReferralBond { amount: 500_000_000_000_000_000 },
		);
	}

	#[test]
	fn unknown_calls_and_assets_are_dropped() {
		assert_eq!(map(&record("staking", "bond", json!({}))), None);
		assert_eq!(
			map(&record(
				"assets",
				"transfer",
				json!({ "from": ALICE, "to": BOB, "amount": "1", "assetId": "0xdead" }),
			)),
			None,
		);
		assert_eq!(map(&record("utility", "batchAll", json!([]))), None);
	}

	#[test]
	fn maps_batches() {
		let batch = map(&record(
			"utility",
			"batchAll",
			json!([
				{ "module": "staking", "method": "bond", "data": {} },
				{
					"module": "liquidityProxy",
					"method": "swap",
					"data": {
						"baseAssetId": XOR,
						"targetAssetId": VAL,
						"baseAssetAmount": "1",
						"targetAssetAmount": "3",
						"liquidityProviderFee": "0.003",
					},
				},
			]),
		))
		.unwrap();
		assert_eq!(
			batch.kind,
			TransactionKind::Batch(vec![TransactionKind::Swap {
				input_token_id: XOR.into(),
				input_amount: 1_000_000_000_000_000_000,
				output_token_id: VAL.into(),
				output_amount: 3_000_000_000_000_000_000,
				lp_fee: 3_000_000_000_000_000,
			}]),
		);
	}

	#[test]
	fn token_filter() {
		let transfer = TransactionKind::Transfer {
			token_id: VAL.into(),
			amount: 1,
			peer: BOB.into(),
			incoming: false,
		};
		assert!(transfer.matches_token(VAL, XOR));
		assert!(!transfer.matches_token(XOR, XOR));

		let batch = TransactionKind::Batch(vec![transfer]);
		assert!(batch.matches_token(VAL, XOR));
		assert!(!batch.matches_token(XOR, XOR));

		let bond = TransactionKind::ReferralBond { amount: 1 };
		assert!(bond.matches_token(XOR, XOR));
		assert!(!bond.matches_token(VAL, XOR));
	}

	#[test]
	fn hashes_are_normalized() {
		assert_eq!(normalize_hash("0xABcd"), "0xabcd");
		assert_eq!(normalize_hash("ABcd"), "0xabcd");
		assert_eq!(hash_to_string(&H256::repeat_byte(0xab)), format!("0x{}", "ab".repeat(32)));
	}
}
