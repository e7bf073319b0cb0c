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

//! Transaction history of the active account.
//!
//! The feed merges transactions that the wallet has submitted itself (pending transactions)
//! with records of the remote indexer. Pending transactions are kept until the indexer
//! reports the same hash, so the feed shows every transaction exactly once even if the
//! indexer lags behind the node.

#![warn(missing_docs)]

pub mod error;
pub mod indexer;
pub mod notifier;
pub mod reconciler;
pub mod subquery;
pub mod transaction;

pub use error::{Error, Result};
pub use indexer::{IndexedTransactionRecord, Indexer, IndexerPage};
pub use notifier::ChangeNotifier;
pub use reconciler::{now_millis, HistoryConfig, HistoryPage, HistoryReconciler};
pub use subquery::SubqueryIndexer;
pub use transaction::{Token, Transaction, TransactionKind, TransactionStatus};

/// Log target of the history reconciler.
pub const LOG_TARGET: &str = "wallet::history";
