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

//! Extrinsic submission and node transport errors.

use jsonrpsee::core::ClientError as RpcError;

/// Result type used by the node client.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may happen when talking to the node or preparing extrinsics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Node RPC call has failed.
	#[error("RPC error: {0}")]
	Rpc(#[from] RpcError),
	/// Node has returned a response we can't understand.
	#[error("Invalid response of {method}: {reason}")]
	InvalidResponse {
		/// RPC method.
		method: &'static str,
		/// What's wrong with the response.
		reason: String,
	},
	/// Connection to the node has been lost, or was never established.
	#[error("Transport error: {0}")]
	Transport(String),
	/// Runtime metadata or encoding error.
	#[error(transparent)]
	Runtime(#[from] wallet_runtime::Error),
	/// Invalid address or keys.
	#[error(transparent)]
	Keys(#[from] wallet_keys::Error),
	/// Sender address doesn't belong to the signing keypair.
	#[error("Extrinsic sender {0} doesn't match the signing keypair")]
	SignerMismatch(String),
	/// Runtime expects extrinsics of the version we can't produce.
	#[error("Unsupported extrinsic version {0}")]
	UnsupportedExtrinsicVersion(u8),
	/// Runtime expects signed extension we know nothing about.
	#[error("Unsupported signed extension {0}")]
	UnsupportedSignedExtension(String),
	/// Runtime metadata can't be used to sign extrinsics.
	#[error("Unsupported runtime metadata: {0}")]
	UnsupportedMetadata(String),
	/// Extrinsic can't be built by subxt.
	#[error("Subxt error: {0}")]
	Subxt(#[from] subxt::Error),
}

impl Error {
	/// Returns true if the node has received the request and has rejected it.
	pub fn is_rejection(&self) -> bool {
		matches!(self, Error::Rpc(RpcError::Call(_)))
	}
}

impl From<Error> for wallet_runtime::Error {
	fn from(error: Error) -> Self {
		match error {
			Error::Runtime(error) => error,
			error => wallet_runtime::Error::Transport(error.to_string()),
		}
	}
}
