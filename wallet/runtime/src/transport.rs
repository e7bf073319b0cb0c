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

//! Node calls the runtime metadata manager needs.

use crate::{error::Result, snapshot::RuntimeVersion};

use async_trait::async_trait;
use std::sync::Arc;

/// Access to the runtime of the chain node.
#[async_trait]
pub trait RuntimeTransport: Send + Sync {
	/// Read current runtime version of the chain.
	async fn runtime_version(&self) -> Result<RuntimeVersion>;

	/// Read SCALE-encoded metadata of the current runtime.
	async fn metadata(&self) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: RuntimeTransport + ?Sized> RuntimeTransport for Arc<T> {
	async fn runtime_version(&self) -> Result<RuntimeVersion> {
		(**self).runtime_version().await
	}

	async fn metadata(&self) -> Result<Vec<u8>> {
		(**self).metadata().await
	}
}
