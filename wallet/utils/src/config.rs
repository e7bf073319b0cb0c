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

//! Wallet configuration.
//!
//! Configuration is read from a TOML file. Every field has a default, so a missing file (or
//! a file that only overrides a couple of fields) yields a usable configuration.

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Address prefix used when the runtime doesn't expose `System::SS58Prefix`.
pub const DEFAULT_ADDRESS_PREFIX: u16 = 69;
/// Default number of records requested from the indexer per page.
pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = 100;
/// Default delay used to coalesce bursts of history updates.
pub const DEFAULT_NOTIFICATION_DEBOUNCE_MS: u64 = 700;
/// Default lifetime of a pending transaction that the indexer never reports.
pub const DEFAULT_PENDING_TTL_SECS: u64 = 24 * 60 * 60;
/// Identifier of the asset that the chain charges transaction fees in.
pub const DEFAULT_FEE_ASSET_ID: &str =
	"0x0200000000000000000000000000000000000000000000000000000000000000";

/// Wallet core configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalletConfig {
	/// WebSocket URL of the chain node.
	pub node_url: String,
	/// HTTP URL of the transaction indexer.
	pub indexer_url: String,
	/// Address prefix used until the runtime metadata tells otherwise.
	pub address_prefix_fallback: u16,
	/// Number of records requested from the indexer per page.
	pub history_page_size: u32,
	/// Delay (in milliseconds) used to coalesce history change notifications.
	pub notification_debounce_ms: u64,
	/// Lifetime (in seconds) of pending transactions that never show up in the indexer.
	pub pending_ttl_secs: u64,
	/// Identifier of the asset that the chain charges transaction fees in.
	pub fee_asset_id: String,
	/// Directory the runtime metadata cache is kept in.
	pub metadata_cache_dir: Option<String>,
}

impl Default for WalletConfig {
	fn default() -> Self {
		WalletConfig {
			node_url: "ws://127.0.0.1:9944".into(),
			indexer_url: "http://127.0.0.1:3000".into(),
			address_prefix_fallback: DEFAULT_ADDRESS_PREFIX,
			history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
			notification_debounce_ms: DEFAULT_NOTIFICATION_DEBOUNCE_MS,
			pending_ttl_secs: DEFAULT_PENDING_TTL_SECS,
			fee_asset_id: DEFAULT_FEE_ASSET_ID.into(),
			metadata_cache_dir: None,
		}
	}
}

impl WalletConfig {
	/// Parse configuration from TOML string.
	pub fn from_toml(source: &str) -> Result<Self> {
		let config: WalletConfig =
			toml::from_str(source).map_err(|e| Error::InvalidConfig(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Read configuration from the file. Missing file means default configuration.
	pub fn load(path: &Path) -> Result<Self> {
		match std::fs::read_to_string(path) {
			Ok(source) => Self::from_toml(&source),
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(
					target: "wallet",
					"Configuration file {:?} is missing. Using defaults",
					path,
				);
				Ok(Self::default())
			},
			Err(error) => Err(Error::Io { path: path.into(), error }),
		}
	}

	/// History change notification debounce delay.
	pub fn notification_debounce(&self) -> Duration {
		Duration::from_millis(self.notification_debounce_ms)
	}

	/// Pending transaction lifetime.
	pub fn pending_ttl(&self) -> Duration {
		Duration::from_secs(self.pending_ttl_secs)
	}

	fn validate(&self) -> Result<()> {
		if self.history_page_size == 0 {
			return Err(Error::InvalidConfig("history_page_size must be positive".into()))
		}
		if self.node_url.is_empty() {
			return Err(Error::InvalidConfig("node_url must not be empty".into()))
		}

		Ok(())
	}
}
