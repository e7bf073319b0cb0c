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

//! Runtime metadata acquisition, versioning and schema-driven encoding.
//!
//! The [`RuntimeManager`] keeps one immutable [`RuntimeSnapshot`] per process and replaces it
//! whenever the chain is upgraded to a runtime with a greater spec version. Everything that
//! encodes calls or decodes storage does that through the snapshot.

#![warn(missing_docs)]

pub mod builder;
pub mod cache;
pub mod error;
pub mod manager;
pub mod registry;
pub mod snapshot;
pub mod transport;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use cache::{CachedMetadata, FileMetadataCache, MetadataCache, StoreMetadataCache};
pub use error::{Error, Result};
pub use manager::{RuntimeConfig, RuntimeManager, RuntimeState};
pub use registry::{TypeRegistry, Value};
pub use snapshot::{RuntimeSnapshot, RuntimeVersion};
pub use transport::RuntimeTransport;

/// Log target of the runtime metadata manager.
pub const LOG_TARGET: &str = "wallet::runtime";
