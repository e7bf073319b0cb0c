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

//! Commands of the `wallet` tool.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use wallet_client::{CallBuilder, ChainTransport, ExtrinsicService, RpcTransport};
use wallet_history::{
	now_millis, HistoryConfig, HistoryReconciler, SubqueryIndexer, Token, Transaction,
	TransactionKind,
};
use wallet_keys::Keypair;
use wallet_runtime::{FileMetadataCache, RuntimeConfig, RuntimeManager, Value};
use wallet_utils::WalletConfig;

/// Directory the runtime metadata is cached in, unless configured otherwise.
const DEFAULT_METADATA_CACHE_DIR: &str = ".wallet/metadata";

type Runtime = RuntimeManager<RpcTransport, FileMetadataCache>;

/// Wallet core command line tool.
#[derive(Parser, Debug)]
#[command(name = "wallet", author, version, about)]
pub struct Command {
	#[command(flatten)]
	pub shared: SharedParams,

	#[command(subcommand)]
	pub subcommand: Subcommands,
}

/// Parameters shared by all commands.
#[derive(Args, Debug)]
pub struct SharedParams {
	/// Path to the TOML configuration file.
	#[arg(long, global = true, default_value = "wallet.toml", env = "WALLET_CONFIG")]
	pub config: PathBuf,

	/// Node WebSocket URL. Overrides the configuration file.
	#[arg(long, global = true)]
	pub node_url: Option<String>,

	/// Indexer URL. Overrides the configuration file.
	#[arg(long, global = true)]
	pub indexer_url: Option<String>,

	/// Print timestamps in logs.
	#[arg(long, global = true)]
	pub log_timestamps: bool,
}

impl SharedParams {
	fn config(&self) -> anyhow::Result<WalletConfig> {
		let mut config = WalletConfig::load(&self.config)
			.with_context(|| format!("Failed to read configuration from {:?}", self.config))?;
		if let Some(node_url) = &self.node_url {
			config.node_url = node_url.clone();
		}
		if let Some(indexer_url) = &self.indexer_url {
			config.indexer_url = indexer_url.clone();
		}
		Ok(config)
	}
}

/// Keys of the account.
#[derive(Args, Debug)]
pub struct SecretParams {
	/// Mnemonic phrase.
	#[arg(long, conflicts_with = "seed", required_unless_present = "seed")]
	pub phrase: Option<String>,

	/// Derivation path of the mnemonic, e.g. `//polkadot//0`.
	#[arg(long, requires = "phrase")]
	pub path: Option<String>,

	/// `0x`-prefixed raw seed.
	#[arg(long)]
	pub seed: Option<String>,
}

impl SecretParams {
	fn keypair(&self) -> anyhow::Result<Keypair> {
		let keypair = match (&self.phrase, &self.path, &self.seed) {
			(Some(phrase), Some(path), _) => wallet_keys::derive_from_mnemonic_with_path(phrase, path)?,
			(Some(phrase), None, _) => wallet_keys::derive_from_mnemonic(phrase)?,
			(None, _, Some(seed)) => wallet_keys::derive_from_seed(seed)?,
			(None, _, None) => return Err(anyhow!("Either phrase or seed is required")),
		};
		Ok(keypair)
	}
}

/// Transfer parameters.
#[derive(Args, Debug)]
pub struct TransferParams {
	/// Receiver address.
	#[arg(long)]
	pub to: String,

	/// Amount in the smallest units of the asset.
	#[arg(long)]
	pub amount: u128,

	/// Asset to transfer with `Assets.transfer`. The native token is transferred with
	/// `Balances.transfer_keep_alive` if omitted.
	#[arg(long)]
	pub asset_id: Option<String>,
}

impl TransferParams {
	fn call(&self) -> anyhow::Result<CallBuilder> {
		let (to, _) = wallet_keys::public_key_of(&self.to)?;
		let call = match &self.asset_id {
			Some(asset_id) => {
				let asset_id = hex::decode(asset_id.trim_start_matches("0x"))
					.with_context(|| format!("Invalid asset id {asset_id}"))?;
				CallBuilder::new(
					"Assets",
					"transfer",
					vec![Value::bytes(asset_id), Value::bytes(to), Value::uint(self.amount)],
				)
			},
			None => CallBuilder::new(
				"Balances",
				"transfer_keep_alive",
				vec![Value::variant("Id", vec![Value::bytes(to)]), Value::uint(self.amount)],
			),
		};
		Ok(call)
	}

	/// Pending history record of the transfer.
	fn kind(&self, fee_asset_id: &str) -> TransactionKind {
		TransactionKind::Transfer {
			token_id: self.asset_id.clone().unwrap_or_else(|| fee_asset_id.into()),
			amount: self.amount,
			peer: self.to.clone(),
			incoming: false,
		}
	}
}

/// Wallet commands.
#[derive(Subcommand, Debug)]
pub enum Subcommands {
	/// Generate new mnemonic phrase.
	Generate {
		/// Number of words.
		#[arg(long, default_value = "12")]
		words: usize,
	},
	/// Print address of the account.
	Derive {
		#[command(flatten)]
		secret: SecretParams,

		/// Address prefix. The configured fallback prefix is used if omitted.
		#[arg(long)]
		prefix: Option<u16>,
	},
	/// Check whether the phrase or the raw seed is valid.
	Validate {
		/// Mnemonic phrase.
		#[arg(long, conflicts_with = "seed", required_unless_present = "seed")]
		phrase: Option<String>,

		/// `0x`-prefixed raw seed.
		#[arg(long)]
		seed: Option<String>,
	},
	/// Print runtime of the chain.
	Runtime,
	/// Estimate fee of the transfer.
	Fee {
		/// Sender address.
		#[arg(long)]
		from: String,

		#[command(flatten)]
		transfer: TransferParams,
	},
	/// Transfer tokens and wait until the transfer is included in a block.
	Transfer {
		#[command(flatten)]
		secret: SecretParams,

		#[command(flatten)]
		transfer: TransferParams,
	},
	/// Print free balance of the native token.
	Balance {
		/// Account address.
		#[arg(long)]
		account: String,
	},
	/// Print transaction history of the account.
	History {
		/// Account address.
		#[arg(long)]
		account: String,

		/// Page number, starting from 1.
		#[arg(long, default_value = "1")]
		page: u32,

		/// Only show transactions of this asset.
		#[arg(long)]
		filter_token_id: Option<String>,

		/// Known assets, as `id:symbol:precision`. Transactions of other assets are skipped.
		#[arg(long = "token", value_parser = parse_token)]
		tokens: Vec<Token>,
	},
}

impl Command {
	/// Run the command.
	pub async fn run(self) -> anyhow::Result<()> {
		let config = self.shared.config()?;
		match self.subcommand {
			Subcommands::Generate { words } => {
				println!("{}", wallet_keys::generate_mnemonic(words)?);
			},
			Subcommands::Derive { secret, prefix } => {
				let keypair = secret.keypair()?;
				let prefix = prefix.unwrap_or(config.address_prefix_fallback);
				println!("Address:    {}", keypair.address(prefix));
				println!("Public key: 0x{}", hex::encode(keypair.public_key()));
			},
			Subcommands::Validate { phrase, seed } => {
				let valid = match (phrase, seed) {
					(Some(phrase), _) => wallet_keys::validate_mnemonic(&phrase),
					(None, Some(seed)) => wallet_keys::validate_raw_seed(&seed),
					(None, None) => false,
				};
				println!("{}", if valid { "valid" } else { "invalid" });
			},
			Subcommands::Runtime => {
				let runtime = runtime(&config).await?;
				let snapshot = runtime.snapshot().await?;
				println!("Spec version:        {}", snapshot.spec_version());
				println!("Transaction version: {}", snapshot.transaction_version());
				let pallets = snapshot.pallet_names().collect::<Vec<_>>();
				println!("Metadata version:    {}", snapshot.metadata_version());
				println!("Registry builder:    {}", snapshot.builder());
				println!("Address prefix:      {}", snapshot.address_prefix());
				println!("Pallets:             {}", pallets.join(", "));
			},
			Subcommands::Fee { from, transfer } => {
				let service = ExtrinsicService::new(runtime(&config).await?);
				match service.calc_fee(&from, &transfer.call()?).await {
					Some(fee) => println!("{fee}"),
					None => println!("unknown"),
				}
			},
			Subcommands::Transfer { secret, transfer } => {
				let keypair = secret.keypair()?;
				let runtime = runtime(&config).await?;
				let versions = runtime.transport().subscribe_runtime_version().await?;
				let watcher = runtime.clone().spawn_version_watcher(versions);

				let service = ExtrinsicService::new(runtime.clone());
				let from = keypair.address(runtime.snapshot().await?.address_prefix());
				let history = Arc::new(HistoryReconciler::new(
					SubqueryIndexer::new(config.indexer_url.clone()),
					HistoryConfig::from(&config),
				));
				history.set_account(&from);
				service.subscribe("history", history.clone());

				let call = transfer.call()?;
				let status = async {
					let fee = service.calc_fee(&from, &call).await.unwrap_or_default();
					let prepared = service.prepare(&from, &keypair, &call).await?;
					history.save_transaction(Transaction::pending(
						prepared.tx_hash(),
						transfer.kind(&config.fee_asset_id),
						fee,
						now_millis(),
					));
					service.watch(&prepared).await
				}
				.await;
				watcher.abort();

				let status = status?;
				for transaction in history.pending_transactions() {
					tracing::debug!(
						target: "wallet",
						hash=%transaction.hash,
						status=?transaction.status,
						"Pending transaction",
					);
				}
				match status.block_hash {
					Some(block_hash) if status.success =>
						println!("{:?} has been included in block {block_hash:?}", status.tx_hash),
					_ => return Err(anyhow!("{:?} has been rejected", status.tx_hash)),
				}
			},
			Subcommands::Balance { account } => {
				let (public_key, _) = wallet_keys::public_key_of(&account)?;
				let service = ExtrinsicService::new(runtime(&config).await?);
				let info = service
					.query_storage("System", "Account", &[Value::bytes(public_key)])
					.await?;
				let free = info
					.field("data")
					.and_then(|data| data.field("free"))
					.and_then(Value::as_u128)
					.ok_or_else(|| anyhow!("Unexpected layout of System.Account: {info}"))?;
				println!("{free}");
			},
			Subcommands::History { account, page, filter_token_id, tokens } => {
				let history = HistoryReconciler::new(
					SubqueryIndexer::new(config.indexer_url.clone()),
					HistoryConfig::from(&config),
				);
				history.set_account(&account);
				let tokens = if tokens.is_empty() {
					vec![Token::new(config.fee_asset_id.clone(), "XOR", 18)]
				} else {
					tokens
				};

				let page = history
					.get_transaction_history(page, &tokens, &account, filter_token_id.as_deref())
					.await;
				for transaction in &page.items {
					println!(
						"{} {:?} {}",
						transaction.hash,
						transaction.status,
						describe(&transaction.kind, &tokens),
					);
				}
				if let Some(error) = page.error {
					return Err(anyhow!("Failed to fetch history: {error}"))
				}
				if !page.end_reached {
					tracing::info!(target: "wallet", "There are more transactions on the next page");
				}
			},
		}
		Ok(())
	}
}

async fn runtime(config: &WalletConfig) -> anyhow::Result<Arc<Runtime>> {
	let transport = RpcTransport::connect(&config.node_url)
		.await
		.with_context(|| format!("Failed to connect to {}", config.node_url))?;
	let cache_dir = config.metadata_cache_dir.as_deref().unwrap_or(DEFAULT_METADATA_CACHE_DIR);
	let cache = FileMetadataCache::open(cache_dir)?;
	Ok(Arc::new(RuntimeManager::new(
		transport,
		cache,
		RuntimeConfig { bundled: None, address_prefix_fallback: config.address_prefix_fallback },
	)))
}

fn parse_token(token: &str) -> Result<Token, String> {
	let mut parts = token.splitn(3, ':');
	match (parts.next(), parts.next(), parts.next()) {
		(Some(id), Some(symbol), Some(precision)) if !id.is_empty() => {
			let precision = precision.parse().map_err(|e| format!("Invalid precision: {e}"))?;
			Ok(Token::new(id, symbol, precision))
		},
		_ => Err(format!("Expected `id:symbol:precision`, got `{token}`")),
	}
}

fn symbol<'a>(tokens: &'a [Token], token_id: &'a str) -> &'a str {
	tokens.iter().find(|token| token.id == token_id).map_or(token_id, |token| token.symbol.as_str())
}

fn describe(kind: &TransactionKind, tokens: &[Token]) -> String {
	match kind {
		TransactionKind::Transfer { token_id, amount, peer, incoming: true } =>
			format!("received {amount} {} from {peer}", symbol(tokens, token_id)),
		TransactionKind::Transfer { token_id, amount, peer, incoming: false } =>
			format!("sent {amount} {} to {peer}", symbol(tokens, token_id)),
		TransactionKind::Swap { input_token_id, input_amount, output_token_id, output_amount, .. } =>
			format!(
				"swapped {input_amount} {} for {output_amount} {}",
				symbol(tokens, input_token_id),
				symbol(tokens, output_token_id),
			),
		TransactionKind::AddLiquidity { base_token_id, target_token_id, .. } => format!(
			"added liquidity to {}/{}",
			symbol(tokens, base_token_id),
			symbol(tokens, target_token_id),
		),
		TransactionKind::RemoveLiquidity { base_token_id, target_token_id, .. } => format!(
			"removed liquidity from {}/{}",
			symbol(tokens, base_token_id),
			symbol(tokens, target_token_id),
		),
		TransactionKind::ReferralBond { amount } => format!("bonded {amount} for referrals"),
		TransactionKind::ReferralUnbond { amount } => format!("unbonded {amount} from referrals"),
		TransactionKind::SetReferrer { peer, is_my_referrer: true } =>
			format!("set {peer} as referrer"),
		TransactionKind::SetReferrer { peer, is_my_referrer: false } =>
			format!("became referrer of {peer}"),
		TransactionKind::Batch(calls) => calls
			.iter()
			.map(|call| describe(call, tokens))
			.collect::<Vec<_>>()
			.join(", then "),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	#[test]
	fn parses_commands() {
		let command = Command::try_parse_from([
			"wallet",
			"--node-url",
			"ws://node:9944",
			"history",
			"--account",
			"cnAlice",
			"--token",
			"0x02:XOR:18",
			"--token",
			"0x0200040000:VAL:18",
		])
		.unwrap();
		assert_eq!(command.shared.node_url.as_deref(), Some("ws://node:9944"));
		assert_matches!(
			command.subcommand,
			Subcommands::History { page: 1, tokens, .. } if tokens.len() == 2 && tokens[1].symbol == "VAL"
		);

		assert!(Command::try_parse_from(["wallet", "derive"]).is_err());
		assert!(Command::try_parse_from(["wallet", "derive", "--phrase", "a", "--seed", "0x00"])
			.is_err());
	}

	#[test]
	fn transfers_are_recorded_in_fee_asset_by_default() {
		let command = Command::try_parse_from([
			"wallet", "transfer", "--seed", "0x00", "--to", "cnBob", "--amount", "5",
		])
		.unwrap();
		let Subcommands::Transfer { transfer, .. } = command.subcommand else {
			panic!("transfer command expected")
		};
		assert_eq!(
			transfer.kind("0x02"),
			TransactionKind::Transfer {
				token_id: "0x02".into(),
				amount: 5,
				peer: "cnBob".into(),
				incoming: false,
			},
		);

		let command =
			Command::try_parse_from(["wallet", "balance", "--account", "cnBob"]).unwrap();
		assert_matches!(command.subcommand, Subcommands::Balance { account } if account == "cnBob");
	}

	#[test]
	fn parses_tokens() {
		assert_eq!(parse_token("0x02:XOR:18"), Ok(Token::new("0x02", "XOR", 18)));
		assert!(parse_token("0x02:XOR").is_err());
		assert!(parse_token("0x02:XOR:many").is_err());
		assert!(parse_token(":XOR:18").is_err());
	}

	#[test]
	fn describes_batches() {
		let tokens = vec![Token::new("0x02", "XOR", 18)];
		let batch = TransactionKind::Batch(vec![
			TransactionKind::Transfer {
				token_id: "0x02".into(),
				amount: 5,
				peer: "cnBob".into(),
				incoming: false,
			},
			TransactionKind::ReferralBond { amount: 1 },
		]);
		assert_eq!(describe(&batch, &tokens), "sent 5 XOR to cnBob, then bonded 1 for referrals");
	}
}
