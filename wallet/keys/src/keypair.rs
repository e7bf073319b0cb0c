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

//! Signing keypair handed out by the derivation service.

use crate::address::address_of;

use sp_core::{sr25519, Pair};
use zeroize::Zeroize;

/// Length of the public key (and account id) in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// Length of the sr25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Private/public key material plus derivation nonce.
///
/// The keypair is owned exclusively by the caller that derived it. It is never persisted by
/// the wallet core and its `Debug` implementation only reveals the public key.
#[derive(Clone)]
pub struct Keypair {
	pair: sr25519::Pair,
}

impl Keypair {
	pub(crate) fn from_pair(pair: sr25519::Pair) -> Self {
		Keypair { pair }
	}

	/// Raw public key.
	pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
		let mut public = [0u8; PUBLIC_KEY_LENGTH];
		public.copy_from_slice(self.pair.public().as_ref());
		public
	}

	/// Raw private key.
	pub fn private_key(&self) -> [u8; 32] {
		self.secret_half(0)
	}

	/// Derivation nonce that sr25519 mixes into every signature.
	pub fn nonce(&self) -> [u8; 32] {
		self.secret_half(1)
	}

	/// Public key rendered as an address with the given prefix.
	pub fn address(&self, address_prefix: u16) -> String {
		address_of(&self.public_key(), address_prefix)
	}

	/// Sign the message.
	pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
		let signature = self.pair.sign(message);
		let mut raw = [0u8; SIGNATURE_LENGTH];
		raw.copy_from_slice(signature.as_ref());
		raw
	}

	/// Verify that the signature has been produced by this keypair.
	pub fn verify(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> bool {
		let signature = sr25519::Signature::from_raw(*signature);
		sr25519::Pair::verify(&signature, message, &self.pair.public())
	}

	fn secret_half(&self, index: usize) -> [u8; 32] {
		let mut secret = self.pair.to_raw_vec();
		let mut half = [0u8; 32];
		half.copy_from_slice(&secret[index * 32..(index + 1) * 32]);
		secret.zeroize();
		half
	}
}

impl std::fmt::Debug for Keypair {
	fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
		fmt.debug_struct("Keypair")
			.field("public", &format_args!("0x{}", hex::encode(self.public_key())))
			.finish_non_exhaustive()
	}
}

impl PartialEq for Keypair {
	fn eq(&self, other: &Self) -> bool {
		self.public_key() == other.public_key() && self.nonce() == other.nonce()
	}
}

impl Eq for Keypair {}
