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

//! Merges pending transactions of the active account with the indexer records.
//!
//! Pending transactions live in a scope that belongs to one account. Switching the account
//! replaces the scope, so whatever still holds the old scope (an in-flight page fetch, a
//! late watch outcome) can't leak transactions into the feed of the new account. The active
//! account is compared when the fetch completes, not when it starts.

use crate::{
	indexer::{IndexedTransactionRecord, Indexer},
	notifier::ChangeNotifier,
	transaction::{hash_to_string, normalize_hash, Token, Transaction, TransactionStatus},
	LOG_TARGET,
};

use parking_lot::{Mutex, RwLock};
use std::{
	collections::{BTreeMap, HashSet},
	sync::Arc,
	time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::watch;
use wallet_client::{WatchListener, H256};
use wallet_utils::WalletConfig;

/// History reconciler configuration.
#[derive(Clone, Debug)]
pub struct HistoryConfig {
	/// Number of records requested from the indexer per page.
	pub page_size: u32,
	/// Pending transactions older than this are evicted from the feed.
	pub pending_ttl: Duration,
	/// Delay used to coalesce change notifications.
	pub notification_debounce: Duration,
	/// Asset the chain charges fees in.
	pub fee_asset_id: String,
}

impl From<&WalletConfig> for HistoryConfig {
	fn from(config: &WalletConfig) -> Self {
		HistoryConfig {
			page_size: config.history_page_size,
			pending_ttl: config.pending_ttl(),
			notification_debounce: config.notification_debounce(),
			fee_asset_id: config.fee_asset_id.clone(),
		}
	}
}

impl Default for HistoryConfig {
	fn default() -> Self {
		HistoryConfig::from(&WalletConfig::default())
	}
}

/// One page of the merged transaction feed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryPage {
	/// Transactions, newest first.
	pub items: Vec<Transaction>,
	/// No more pages after this one.
	pub end_reached: bool,
	/// Indexer error, if the page couldn't be fetched.
	pub error: Option<String>,
}

/// Pending transactions of one account.
struct AccountScope {
	account: String,
	pending: Mutex<BTreeMap<String, Transaction>>,
}

impl AccountScope {
	fn new(account: String) -> Arc<Self> {
		Arc::new(AccountScope { account, pending: Mutex::new(BTreeMap::new()) })
	}
}

/// Transaction history of the active account.
pub struct HistoryReconciler<I> {
	indexer: I,
	config: HistoryConfig,
	scope: RwLock<Arc<AccountScope>>,
	notifier: ChangeNotifier,
}

impl<I: Indexer> HistoryReconciler<I> {
	/// Create reconciler. No account is active until [`Self::set_account`] is called.
	pub fn new(indexer: I, config: HistoryConfig) -> Self {
		HistoryReconciler {
			notifier: ChangeNotifier::new(config.notification_debounce),
			indexer,
			config,
			scope: RwLock::new(AccountScope::new(String::new())),
		}
	}

	/// Active account.
	pub fn account(&self) -> String {
		self.scope.read().account.clone()
	}

	/// Make the account active. Pending transactions of the previous account are forgotten.
	pub fn set_account(&self, account: &str) {
		{
			let mut scope = self.scope.write();
			if scope.account == account {
				return
			}
			*scope = AccountScope::new(account.into());
		}
		tracing::debug!(target: LOG_TARGET, "Active account has been changed to {account}");
		self.notifier.notify();
	}

	/// Revision of the feed, bumped after every (debounced) burst of changes.
	pub fn changes(&self) -> watch::Receiver<u64> {
		self.notifier.changes()
	}

	/// True while there are feed changes that haven't been published yet.
	pub fn sync_indicator(&self) -> watch::Receiver<bool> {
		self.notifier.sync_indicator()
	}

	/// Remember transaction that has been submitted by the active account.
	pub fn save_transaction(&self, transaction: Transaction) {
		let scope = self.scope.read().clone();
		let hash = normalize_hash(&transaction.hash);
		tracing::debug!(target: LOG_TARGET, %hash, status=?transaction.status, "Saving transaction");
		scope.pending.lock().insert(hash.clone(), Transaction { hash, ..transaction });
		self.notifier.notify();
	}

	/// Pending transactions of the active account, newest first.
	pub fn pending_transactions(&self) -> Vec<Transaction> {
		let scope = self.scope.read().clone();
		let pending = scope.pending.lock();
		sorted_newest_first(pending.values().cloned().collect())
	}

	/// Apply watch outcome of the extrinsic. Unknown transactions are ignored.
	pub fn on_watch_outcome(&self, tx_hash: H256, success: bool, block_hash: Option<H256>) {
		let scope = self.scope.read().clone();
		let hash = hash_to_string(&tx_hash);
		{
			let mut pending = scope.pending.lock();
			let Some(transaction) = pending.get_mut(&hash) else {
				tracing::trace!(target: LOG_TARGET, %hash, "Ignoring outcome of unknown transaction");
				return
			};
			transaction.status =
				if success { TransactionStatus::Committed } else { TransactionStatus::Rejected };
			transaction.block_hash = block_hash.as_ref().map(hash_to_string);
		}
		tracing::debug!(target: LOG_TARGET, %hash, success, "Pending transaction has been updated");
		self.notifier.notify();
	}

	/// Fetch page of the account history, merged with pending transactions.
	///
	/// Pending transactions that the indexer has reported are forgotten. The remaining pending
	/// transactions are put before the first page. If the indexer can't be reached, only the
	/// pending transactions are returned, together with the error message.
	pub async fn get_transaction_history(
		&self,
		page: u32,
		tokens: &[Token],
		account: &str,
		filter_token_id: Option<&str>,
	) -> HistoryPage {
		let page = page.max(1);
		let fetched = self.indexer.page(account, page, self.config.page_size).await;
		// the account might have been switched while we've been waiting for the indexer
		let scope = self.active_scope(account);

		let (records, end_reached, error) = match fetched {
			Ok(fetched) => (fetched.records, fetched.end_reached, None),
			Err(e) => {
				tracing::warn!(target: LOG_TARGET, page, error=?e, "Failed to fetch history page");
				(Vec::new(), false, Some(e.to_string()))
			},
		};

		let pending = match scope {
			Some(scope) => self.merge(&scope, &records, page == 1),
			None => Vec::new(),
		};

		let mut items = self.filter(pending, filter_token_id);
		items.extend(self.filter(self.map_records(&records, tokens, account), filter_token_id));
		HistoryPage { items, end_reached, error }
	}

	/// The most recent `count` transactions of the account, merged the same way as the first
	/// history page.
	pub async fn get_last_transactions(
		&self,
		account: &str,
		tokens: &[Token],
		count: usize,
		filter_token_id: Option<&str>,
	) -> HistoryPage {
		let mut page = self.get_transaction_history(1, tokens, account, filter_token_id).await;
		if page.items.len() > count {
			page.items.truncate(count);
			page.end_reached = false;
		}
		page
	}

	/// Refresh single transaction of the active account.
	///
	/// The indexer record wins over the pending transaction with the same hash.
	pub async fn get_transaction(
		&self,
		hash: &str,
		tokens: &[Token],
		account: &str,
	) -> crate::Result<Option<Transaction>> {
		let hash = normalize_hash(hash);
		let record = self.indexer.transaction(&hash).await?;
		let scope = self.active_scope(account);

		if let Some(record) = record {
			if let Some(scope) = &scope {
				if scope.pending.lock().remove(&hash).is_some() {
					tracing::debug!(target: LOG_TARGET, %hash, "Pending transaction has been indexed");
					self.notifier.notify();
				}
			}
			if let Some(transaction) =
				Transaction::from_record(&record, tokens, account, &self.config.fee_asset_id)
			{
				return Ok(Some(transaction))
			}
		}

		Ok(scope.and_then(|scope| scope.pending.lock().get(&hash).cloned()))
	}

	/// Addresses the account has transferred to, that contain `query`.
	pub async fn search_peers(&self, account: &str, query: &str) -> crate::Result<Vec<String>> {
		self.indexer.search_peers(account, query).await
	}

	fn active_scope(&self, account: &str) -> Option<Arc<AccountScope>> {
		let scope = self.scope.read().clone();
		if scope.account != account {
			tracing::debug!(target: LOG_TARGET, "Account {account} is no longer active");
			return None
		}
		Some(scope)
	}

	/// Forget superseded and expired pending transactions. Returns the remaining ones, if
	/// they should be shown.
	fn merge(
		&self,
		scope: &AccountScope,
		records: &[IndexedTransactionRecord],
		show_pending: bool,
	) -> Vec<Transaction> {
		let indexed = records.iter().map(|record| normalize_hash(&record.hash)).collect::<HashSet<_>>();
		let now = now_millis();
		let ttl = self.config.pending_ttl.as_millis().min(u64::MAX as u128) as u64;

		let (remaining, changed) = {
			let mut pending = scope.pending.lock();
			let before = pending.len();
			pending.retain(|hash, transaction| {
				if indexed.contains(hash) {
					tracing::debug!(target: LOG_TARGET, %hash, "Pending transaction has been indexed");
					return false
				}
				if now.saturating_sub(transaction.timestamp) > ttl {
					tracing::info!(
						target: LOG_TARGET,
						%hash,
						status=?transaction.status,
						"Pending transaction has expired",
					);
					return false
				}
				true
			});
			let changed = pending.len() != before;
			let remaining = if show_pending { pending.values().cloned().collect() } else { Vec::new() };
			(remaining, changed)
		};

		if changed {
			self.notifier.notify();
		}
		sorted_newest_first(remaining)
	}

	fn map_records(
		&self,
		records: &[IndexedTransactionRecord],
		tokens: &[Token],
		account: &str,
	) -> Vec<Transaction> {
		records
			.iter()
			.filter_map(|record| {
				Transaction::from_record(record, tokens, account, &self.config.fee_asset_id)
			})
			.collect()
	}

	fn filter(&self, transactions: Vec<Transaction>, token_id: Option<&str>) -> Vec<Transaction> {
		match token_id {
			Some(token_id) => transactions
				.into_iter()
				.filter(|transaction| {
					transaction.kind.matches_token(token_id, &self.config.fee_asset_id)
				})
				.collect(),
			None => transactions,
		}
	}
}

impl<I: Indexer> WatchListener for HistoryReconciler<I> {
	fn on_status(&self, tx_hash: H256, success: bool, block_hash: Option<H256>) {
		self.on_watch_outcome(tx_hash, success, block_hash)
	}
}

fn sorted_newest_first(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
	transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.hash.cmp(&b.hash)));
	transactions
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as u64)
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{error::Error, indexer::IndexerPage, transaction::TransactionKind};
	use async_trait::async_trait;
	use pretty_assertions::assert_eq;
	use serde_json::json;
	use tokio::sync::Notify;
	use wallet_client::{
		test_chain::TestChain, CallBuilder, ExtrinsicService,
		TransactionStatus as ClientTransactionStatus,
	};
	use wallet_keys::derive_from_mnemonic_with_path;
	use wallet_runtime::Value;

	const XOR: &str = "0x0200000000000000000000000000000000000000000000000000000000000000";
	const VAL: &str = "0x0200040000000000000000000000000000000000000000000000000000000000";
	const ALICE: &str = "cnVkoGs3rEMqLqY27c2nfVXJRGdzNJk2ns78DcqtppaSRe8qm";
	const BOB: &str = "cnUVLAjzRsrXrzEiqjxMpBwvb6YgdBy8DKibonvZgtcQY5ZKe";

	#[derive(Default)]
	struct TestIndexer {
		records: Mutex<Vec<IndexedTransactionRecord>>,
		offline: std::sync::atomic::AtomicBool,
		gate: Option<Arc<Notify>>,
	}

	impl TestIndexer {
		fn index(&self, record: IndexedTransactionRecord) {
			self.records.lock().insert(0, record);
		}

		fn set_offline(&self, offline: bool) {
			self.offline.store(offline, std::sync::atomic::Ordering::SeqCst);
		}

		fn check_online(&self) -> crate::Result<()> {
			if self.offline.load(std::sync::atomic::Ordering::SeqCst) {
				return Err(Error::Indexer("service unavailable".into()))
			}
			Ok(())
		}
	}

	#[async_trait]
	impl Indexer for TestIndexer {
		async fn page(&self, _account: &str, page: u32, page_size: u32) -> crate::Result<IndexerPage> {
			if let Some(gate) = &self.gate {
				gate.notified().await;
			}
			self.check_online()?;
			let records = self.records.lock().clone();
			let start = ((page - 1) * page_size) as usize;
			let end = (start + page_size as usize).min(records.len());
			Ok(IndexerPage {
				records: records.get(start..end).map(|page| page.to_vec()).unwrap_or_default(),
				end_reached: end >= records.len(),
			})
		}

		async fn transaction(&self, hash: &str) -> crate::Result<Option<IndexedTransactionRecord>> {
			self.check_online()?;
			Ok(self.records.lock().iter().find(|record| normalize_hash(&record.hash) == hash).cloned())
		}

		async fn search_peers(&self, _account: &str, query: &str) -> crate::Result<Vec<String>> {
			self.check_online()?;
			Ok(vec![BOB.into()].into_iter().filter(|peer: &String| peer.contains(query)).collect())
		}
	}

	fn tokens() -> Vec<Token> {
		vec![Token::new(XOR, "XOR", 18), Token::new(VAL, "VAL", 18)]
	}

	fn transfer_kind(token_id: &str, amount: u128) -> TransactionKind {
		TransactionKind::Transfer { token_id: token_id.into(), amount, peer: BOB.into(), incoming: false }
	}

	fn pending(hash: u8, token_id: &str, timestamp: u64) -> Transaction {
		Transaction::pending(H256::repeat_byte(hash), transfer_kind(token_id, 5), 7, timestamp)
	}

	fn indexed(hash: u8, token_id: &str, timestamp_secs: u64) -> IndexedTransactionRecord {
		IndexedTransactionRecord {
			// indexers may report uppercase hashes
			hash: format!("0x{}", hex::encode_upper([hash; 32])),
			block_hash: Some("0xabc".into()),
			module: "assets".into(),
			method: "transfer".into(),
			timestamp: timestamp_secs,
			network_fee: "0.0007".into(),
			success: true,
			data: json!({ "from": ALICE, "to": BOB, "amount": "5", "assetId": token_id }),
		}
	}

	fn reconciler(indexer: Arc<TestIndexer>) -> HistoryReconciler<Arc<TestIndexer>> {
		let reconciler = HistoryReconciler::new(indexer, HistoryConfig::default());
		reconciler.set_account(ALICE);
		reconciler
	}

	fn hashes(page: &HistoryPage) -> Vec<String> {
		page.items.iter().map(|transaction| transaction.hash.clone()).collect()
	}

	#[tokio::test]
	async fn pending_transaction_is_shown_once() {
		let indexer = Arc::new(TestIndexer::default());
		let history = reconciler(indexer.clone());
		let now = now_millis();
		let hash = H256::repeat_byte(1);

		history.save_transaction(pending(1, VAL, now));
		history.on_watch_outcome(hash, true, Some(H256::repeat_byte(0xab)));

		let page = history.get_transaction_history(1, &tokens(), ALICE, None).await;
		assert_eq!(hashes(&page), vec![hash_to_string(&hash)]);
		assert_eq!(page.items[0].status, TransactionStatus::Committed);
		assert_eq!(page.items[0].block_hash, Some(hash_to_string(&H256::repeat_byte(0xab))));

		indexer.index(indexed(1, VAL, now / 1_000));
		for _ in 0..2 {
			let page = history.get_transaction_history(1, &tokens(), ALICE, None).await;
			assert_eq!(hashes(&page), vec![hash_to_string(&hash)]);
			assert_eq!(page.items[0].block_hash.as_deref(), Some("0xabc"));
		}
		assert!(history.pending_transactions().is_empty());
	}

	#[tokio::test]
	async fn late_watch_outcome_does_not_resurrect_transaction() {
		let indexer = Arc::new(TestIndexer::default());
		let history = reconciler(indexer.clone());
		let now = now_millis();

		history.save_transaction(pending(1, VAL, now));
		indexer.index(indexed(1, VAL, now / 1_000));
		history.get_transaction_history(1, &tokens(), ALICE, None).await;

		history.on_watch_outcome(H256::repeat_byte(1), false, None);
		assert!(history.pending_transactions().is_empty());
		let page = history.get_transaction_history(1, &tokens(), ALICE, None).await;
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].status, TransactionStatus::Committed);
	}

	#[tokio::test]
	async fn pending_transactions_survive_indexer_failure() {
		let indexer = Arc::new(TestIndexer::default());
		let history = reconciler(indexer.clone());
		let now = now_millis();

		history.save_transaction(pending(1, VAL, now - 10));
		history.save_transaction(pending(2, VAL, now));
		indexer.set_offline(true);

		let page = history.get_transaction_history(1, &tokens(), ALICE, None).await;
		assert_eq!(
			hashes(&page),
			vec![hash_to_string(&H256::repeat_byte(2)), hash_to_string(&H256::repeat_byte(1))],
		);
		assert_eq!(page.end_reached, false);
		assert_eq!(page.error, Some(Error::Indexer("service unavailable".into()).to_string()));

		// pending transactions are only prepended to the first page
		let page = history.get_transaction_history(2, &tokens(), ALICE, None).await;
		assert!(page.items.is_empty());
		assert!(page.error.is_some());
	}

	#[tokio::test]
	async fn pending_transactions_precede_indexed_ones() {
		let indexer = Arc::new(TestIndexer::default());
		let history = reconciler(indexer.clone());
		let now = now_millis();
		indexer.index(indexed(3, VAL, now / 1_000 - 100));
		indexer.index(indexed(4, XOR, now / 1_000 - 50));
		history.save_transaction(pending(1, XOR, now));

		let page = history.get_transaction_history(1, &tokens(), ALICE, None).await;
		assert_eq!(
			hashes(&page),
			vec![
				hash_to_string(&H256::repeat_byte(1)),
				hash_to_string(&H256::repeat_byte(4)),
				hash_to_string(&H256::repeat_byte(3)),
			],
		);
		assert!(page.end_reached);

		let page = history.get_transaction_history(1, &tokens(), ALICE, Some(XOR)).await;
		assert_eq!(
			hashes(&page),
			vec![hash_to_string(&H256::repeat_byte(1)), hash_to_string(&H256::repeat_byte(4))],
		);

		let page = history.get_last_transactions(ALICE, &tokens(), 2, None).await;
		assert_eq!(page.items.len(), 2);
		assert!(!page.end_reached);
	}

	#[tokio::test]
	async fn expired_pending_transactions_are_evicted() {
		let indexer = Arc::new(TestIndexer::default());
		let history = reconciler(indexer.clone());
		let now = now_millis();
		let ttl = HistoryConfig::default().pending_ttl.as_millis() as u64;

		history.save_transaction(pending(1, VAL, now - ttl - 1));
		history.save_transaction(pending(2, VAL, now));

		let page = history.get_transaction_history(1, &tokens(), ALICE, None).await;
		assert_eq!(hashes(&page), vec![hash_to_string(&H256::repeat_byte(2))]);
		assert_eq!(history.pending_transactions().len(), 1);
	}

	#[tokio::test]
	async fn account_switch_drops_pending_transactions() {
		let gate = Arc::new(Notify::new());
		let indexer = Arc::new(TestIndexer { gate: Some(gate.clone()), ..Default::default() });
		let history = Arc::new(reconciler(indexer.clone()));
		let now = now_millis();
		history.save_transaction(pending(1, VAL, now));
		indexer.index(indexed(1, VAL, now / 1_000));

		let fetch = tokio::spawn({
			let history = history.clone();
			async move { history.get_transaction_history(1, &tokens(), ALICE, None).await }
		});
		history.set_account(BOB);
		history.save_transaction(pending(1, VAL, now));
		gate.notify_one();

		// the fetch has completed after the switch, so it doesn't touch pending transactions
		// of the new account
		let page = fetch.await.unwrap();
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].status, TransactionStatus::Committed);
		assert_eq!(history.pending_transactions().len(), 1);

		history.set_account(ALICE);
		assert!(history.pending_transactions().is_empty());
	}

	#[tokio::test]
	async fn refreshes_single_transaction() {
		let indexer = Arc::new(TestIndexer::default());
		let history = reconciler(indexer.clone());
		let now = now_millis();
		history.save_transaction(pending(1, VAL, now));
		history.save_transaction(pending(2, VAL, now));
		indexer.index(indexed(2, VAL, now / 1_000));

		let first = hash_to_string(&H256::repeat_byte(1));
		let second = hash_to_string(&H256::repeat_byte(2));
		assert_eq!(
			history.get_transaction(&first, &tokens(), ALICE).await.unwrap().map(|tx| tx.status),
			Some(TransactionStatus::Pending),
		);
		assert_eq!(
			history.get_transaction(&second, &tokens(), ALICE).await.unwrap().map(|tx| tx.status),
			Some(TransactionStatus::Committed),
		);
		assert_eq!(history.pending_transactions().len(), 1);
		assert_eq!(history.get_transaction("0x00", &tokens(), ALICE).await.unwrap(), None);
	}

	#[tokio::test]
	async fn watch_outcomes_are_published() {
		let indexer = Arc::new(TestIndexer::default());
		let history = Arc::new(reconciler(indexer));
		let listener: Arc<dyn WatchListener> = history.clone();

		history.save_transaction(pending(1, VAL, now_millis()));
		listener.on_status(H256::repeat_byte(1), false, None);
		listener.on_status(H256::repeat_byte(9), true, None);

		let pending = history.pending_transactions();
		assert_eq!(pending.len(), 1);
		assert_eq!(pending[0].status, TransactionStatus::Rejected);
		assert!(*history.sync_indicator().borrow());
	}

	#[tokio::test]
	async fn submitted_extrinsic_is_committed_in_feed() {
		let chain = TestChain::new();
		let service = ExtrinsicService::new(chain.manager());
		let history = Arc::new(reconciler(Arc::new(TestIndexer::default())));
		let keypair = derive_from_mnemonic_with_path(
			"bottom drive obey lake curtain smoke basket hold race lonely fit walk",
			"//Alice",
		)
		.unwrap();
		let from = keypair.address(42);
		let block_hash = H256::repeat_byte(0xab);
		history.set_account(&from);
		service.subscribe("history", history.clone());
		chain.set_statuses(vec![
			ClientTransactionStatus::Ready,
			ClientTransactionStatus::InBlock(block_hash),
		]);

		let call = CallBuilder::new(
			"Balances",
			"transfer_keep_alive",
			vec![Value::variant("Id", vec![Value::bytes([8u8; 32])]), Value::uint(5u32)],
		);
		let prepared = service.prepare(&from, &keypair, &call).await.unwrap();
		history.save_transaction(Transaction::pending(
			prepared.tx_hash(),
			transfer_kind(XOR, 5),
			TestChain::FEE,
			now_millis(),
		));
		assert_eq!(history.pending_transactions()[0].status, TransactionStatus::Pending);

		let status = service.watch(&prepared).await.unwrap();
		assert!(status.success);

		let page = history.get_transaction_history(1, &tokens(), &from, None).await;
		assert_eq!(hashes(&page), vec![hash_to_string(&prepared.tx_hash())]);
		assert_eq!(page.items[0].status, TransactionStatus::Committed);
		assert_eq!(page.items[0].block_hash, Some(hash_to_string(&block_hash)));
	}

	#[tokio::test]
	async fn searches_peers() {
		let history = reconciler(Arc::new(TestIndexer::default()));
		assert_eq!(history.search_peers(ALICE, "cnU").await.unwrap(), vec![BOB.to_string()]);
		assert!(history.search_peers(ALICE, "zz").await.unwrap().is_empty());
	}

	#[test]
	fn config_follows_wallet_config() {
		let config = HistoryConfig::from(&WalletConfig {
			history_page_size: 10,
			pending_ttl_secs: 60,
			..Default::default()
		});
		assert_eq!(config.page_size, 10);
		assert_eq!(config.pending_ttl, Duration::from_secs(60));
		assert_eq!(config.notification_debounce, Duration::from_millis(700));
	}
}
