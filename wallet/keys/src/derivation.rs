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

//! Mnemonic and raw seed to keypair derivation.
//!
//! The pipeline is fixed for the whole process: phrase → BIP-39 entropy → substrate seed
//! (PBKDF2 over the entropy with the password of the derivation path, empty by default) →
//! sr25519 mini-secret → keypair.

use crate::{
	error::{Error, Result},
	keypair::Keypair,
	LOG_TARGET,
};

use bip39::{Language, Mnemonic};
use rand::RngCore;
use sp_core::{
	crypto::{ExposeSecret, SecretUri},
	sr25519, Pair,
};
use std::str::FromStr;
use zeroize::Zeroize;

/// Length of the sr25519 mini-secret that the raw seed must decode to.
const RAW_SEED_LENGTH: usize = 32;

/// Derive keypair from the mnemonic phrase.
pub fn derive_from_mnemonic(phrase: &str) -> Result<Keypair> {
	derive_from_mnemonic_with_path(phrase, "")
}

/// Derive keypair from the mnemonic phrase and apply the derivation path to it.
///
/// The path is a sequence of junctions: `//name` is a hard junction and `/name` is a soft
/// junction. It may end with `///password`, the password of the seed. Empty path means the
/// root keypair.
pub fn derive_from_mnemonic_with_path(phrase: &str, derivation_path: &str) -> Result<Keypair> {
	let mnemonic = parse_mnemonic(phrase)?;
	let path = parse_derivation_path(derivation_path)?;
	let password = path.password.as_ref().map_or("", |password| password.expose_secret().as_str());

	let mut entropy = mnemonic.to_entropy();
	let seed = substrate_bip39::seed_from_entropy(&entropy, password);
	entropy.zeroize();
	let mut seed =
		seed.map_err(|e| Error::InvalidCredentialInput(format!("Invalid entropy: {e:?}")))?;

	let pair = sr25519::Pair::from_seed_slice(&seed[..RAW_SEED_LENGTH]);
	seed.zeroize();
	let pair = pair.map_err(|e| Error::InvalidCredentialInput(format!("Invalid seed: {e:?}")))?;

	let pair = if path.junctions.is_empty() {
		pair
	} else {
		pair.derive(path.junctions.into_iter(), None)
			.map_err(|e| {
				Error::InvalidCredentialInput(format!("Invalid derivation path: {e:?}"))
			})?
			.0
	};

	tracing::debug!(target: LOG_TARGET, "Keys were created from mnemonic");
	Ok(Keypair::from_pair(pair))
}

/// Derive keypair from the `0x`-prefixed hex-encoded raw seed.
pub fn derive_from_seed(raw_seed_hex: &str) -> Result<Keypair> {
	let mut seed = decode_raw_seed(raw_seed_hex)?;
	let pair = sr25519::Pair::from_seed_slice(&seed);
	seed.zeroize();
	let pair = pair.map_err(|e| Error::InvalidCredentialInput(format!("Invalid seed: {e:?}")))?;

	tracing::debug!(target: LOG_TARGET, "Keys were created from raw seed");
	Ok(Keypair::from_pair(pair))
}

/// Returns true if the phrase is a valid English BIP-39 mnemonic.
pub fn validate_mnemonic(phrase: &str) -> bool {
	parse_mnemonic(phrase).is_ok()
}

/// Returns true if the string is a `0x`-prefixed, even-length hex string that decodes to a
/// raw seed.
pub fn validate_raw_seed(raw_seed_hex: &str) -> bool {
	match decode_raw_seed(raw_seed_hex) {
		Ok(mut seed) => {
			seed.zeroize();
			true
		},
		Err(_) => false,
	}
}

/// Generate new random English mnemonic with the given number of words.
pub fn generate_mnemonic(words: usize) -> Result<String> {
	if !matches!(words, 12 | 15 | 18 | 21 | 24) {
		return Err(Error::InvalidCredentialInput(format!(
			"Unsupported mnemonic length: {words} words"
		)))
	}

	let mut entropy = vec![0u8; words / 3 * 4];
	rand::thread_rng().fill_bytes(&mut entropy);
	let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy);
	entropy.zeroize();

	mnemonic
		.map(|mnemonic| mnemonic.to_string())
		.map_err(|e| Error::InvalidCredentialInput(format!("Invalid entropy: {e}")))
}

fn parse_mnemonic(phrase: &str) -> Result<Mnemonic> {
	Mnemonic::parse_in_normalized(Language::English, phrase)
		.map_err(|e| Error::InvalidCredentialInput(format!("Invalid mnemonic: {e}")))
}

fn decode_raw_seed(raw_seed_hex: &str) -> Result<Vec<u8>> {
	let hex_seed = raw_seed_hex
		.strip_prefix("0x")
		.ok_or_else(|| Error::InvalidCredentialInput("Raw seed must start with 0x".into()))?;
	if hex_seed.len() % 2 != 0 {
		return Err(Error::InvalidCredentialInput("Raw seed has odd length".into()))
	}

	let mut seed = hex::decode(hex_seed)
		.map_err(|e| Error::InvalidCredentialInput(format!("Raw seed is not hex: {e}")))?;
	if seed.len() != RAW_SEED_LENGTH {
		let len = seed.len();
		seed.zeroize();
		return Err(Error::InvalidCredentialInput(format!(
			"Raw seed must be {RAW_SEED_LENGTH} bytes long, got {len}"
		)))
	}

	Ok(seed)
}

/// Junctions and password of the path. The path can't carry a phrase of its own, so it
/// either is empty or starts with a junction.
fn parse_derivation_path(path: &str) -> Result<SecretUri> {
	let invalid = || Error::InvalidCredentialInput(format!("Invalid derivation path: {path:?}"));
	if !path.is_empty() && !path.starts_with('/') {
		return Err(invalid())
	}
	SecretUri::from_str(path).map_err(|_| invalid())
}
