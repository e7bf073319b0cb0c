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

//! Node transport, extrinsic signing, submission and watch.
//!
//! Extrinsics are always built against the runtime snapshot that is current at the moment of
//! submission. Watch outcomes are published to every listener that has subscribed to the
//! [`ExtrinsicService`].

#![warn(missing_docs)]

pub mod call;
pub mod error;
pub mod extrinsic;
pub mod rpc;
pub mod service;
pub mod transport;
pub mod watch;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_chain;

pub use call::{BuildCall, CallBuilder};
pub use error::{Error, Result};
pub use extrinsic::{AddressEncoding, ExtrinsicSigner, SigningParams};
pub use rpc::RpcTransport;
pub use service::{ExtrinsicService, ExtrinsicSubmitStatus, PreparedExtrinsic};
pub use sp_core::H256;
pub use transport::{ChainTransport, TransactionStatus};
pub use watch::{WatchDispatcher, WatchListener};

/// Log target of the extrinsic submission and watch service.
pub const LOG_TARGET: &str = "wallet::extrinsic";
