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

//! SS58 address rendering.

use crate::{
	error::{Error, Result},
	keypair::PUBLIC_KEY_LENGTH,
};

use sp_core::{
	crypto::{Ss58AddressFormat, Ss58Codec},
	sr25519,
};

/// Render the raw public key as an address with the given prefix.
pub fn address_of(public_key: &[u8; PUBLIC_KEY_LENGTH], address_prefix: u16) -> String {
	sr25519::Public::from_raw(*public_key)
		.to_ss58check_with_version(Ss58AddressFormat::custom(address_prefix))
}

/// Parse the address, returning the raw public key and the address prefix.
pub fn public_key_of(address: &str) -> Result<([u8; PUBLIC_KEY_LENGTH], u16)> {
	let (public, format) = sr25519::Public::from_ss58check_with_version(address).map_err(|e| {
		Error::InvalidAddress { address: address.into(), reason: format!("{e:?}") }
	})?;

	let mut raw = [0u8; PUBLIC_KEY_LENGTH];
	raw.copy_from_slice(public.as_ref());
	Ok((raw, u16::from(format)))
}
