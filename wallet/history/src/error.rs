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

//! Transaction history errors.

/// Result type used by the history crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors of the remote indexer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Indexer can't be reached.
	#[error("Indexer request has failed: {0}")]
	Http(#[from] reqwest::Error),
	/// Indexer has reported an error.
	#[error("Indexer error: {0}")]
	Indexer(String),
	/// Indexer has returned a response we can't understand.
	#[error("Invalid indexer response: {0}")]
	InvalidResponse(String),
}
