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

//! Utilities shared by the wallet core crates: logger initialization, wallet configuration
//! and the opaque keyed store the core persists its caches into.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod initialize;
pub mod store;

pub use config::WalletConfig;
pub use error::{Error, Result};
pub use store::{FileStore, KeyValueStore, MemStore};
