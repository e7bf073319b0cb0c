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

/// Result type used by the key derivation service.
pub type Result<T> = std::result::Result<T, Error>;

/// Key derivation errors.
///
/// These are always caused by the caller input: the derivation itself can't fail once the
/// input has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// Mnemonic phrase, raw seed or derivation path is malformed.
	#[error("Invalid credential input: {0}")]
	InvalidCredentialInput(String),
	/// String is not a valid chain address.
	#[error("Invalid address {address:?}: {reason}")]
	InvalidAddress {
		/// The rejected address.
		address: String,
		/// Why it has been rejected.
		reason: String,
	},
}
