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

//! Key derivation service of the wallet core.
//!
//! Turns a mnemonic phrase or a raw seed into an sr25519 [`Keypair`] and renders public keys
//! as chain addresses. Everything here is a pure transform: the same input always produces
//! the same keypair and nothing is persisted.

#![warn(missing_docs)]

mod address;
mod derivation;
mod error;
mod keypair;

pub use address::{address_of, public_key_of};
pub use derivation::{
	derive_from_mnemonic, derive_from_mnemonic_with_path, derive_from_seed, generate_mnemonic,
	validate_mnemonic, validate_raw_seed,
};
pub use error::{Error, Result};
pub use keypair::{Keypair, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

const LOG_TARGET: &str = "wallet::keys";
