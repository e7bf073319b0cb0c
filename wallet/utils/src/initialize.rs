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

//! Wallet logger initialization.

use tracing::Level;
use tracing_subscriber::{
	fmt::{time::OffsetTime, SubscriberBuilder},
	EnvFilter,
};

/// Initialize wallet logger instance.
///
/// The default filter prints warnings from every crate and `info` from the `wallet::*`
/// targets. `RUST_LOG` overrides both.
pub fn initialize_logger(with_timestamp: bool) {
	let format = time::format_description::parse(
		"[year]-[month]-[day] \
		[hour repr:24]:[minute]:[second] [offset_hour sign:mandatory]",
	)
	.expect("static format string is valid");

	let local_time = OffsetTime::new(
		time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC),
		format,
	);

	let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
		Ok(_) => EnvFilter::builder().with_default_directive(Level::WARN.into()).from_env_lossy(),
		Err(_) => EnvFilter::new("warn,wallet=info"),
	};

	let builder = SubscriberBuilder::default().with_env_filter(env_filter);

	// the logger may already be installed by an embedding application (or another test)
	let result = if with_timestamp {
		builder.with_timer(local_time).try_init()
	} else {
		builder.without_time().try_init()
	};
	if let Err(error) = result {
		tracing::debug!(target: "wallet", "Logger is already initialized: {error}");
	}
}
