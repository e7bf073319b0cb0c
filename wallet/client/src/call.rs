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

//! Runtime calls that are built against the current runtime snapshot.

use wallet_runtime::{RuntimeSnapshot, Value};

/// Name of the utility pallet.
pub const UTILITY_PALLET: &str = "Utility";
/// Name of the atomic batch call of the utility pallet.
pub const BATCH_ALL_CALL: &str = "batch_all";

/// Something that encodes runtime call using the runtime snapshot.
///
/// Calls are built right before signing, so they always use the snapshot that is current at
/// the moment of submission.
pub trait BuildCall: Send + Sync {
	/// Encode call.
	fn build_call(&self, snapshot: &RuntimeSnapshot) -> wallet_runtime::Result<Vec<u8>>;
}

impl<F> BuildCall for F
where
	F: Fn(&RuntimeSnapshot) -> wallet_runtime::Result<Vec<u8>> + Send + Sync,
{
	fn build_call(&self, snapshot: &RuntimeSnapshot) -> wallet_runtime::Result<Vec<u8>> {
		self(snapshot)
	}
}

/// Dynamic runtime call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallBuilder {
	/// Call of the pallet with its arguments.
	Call {
		/// Pallet name.
		pallet: String,
		/// Call name.
		call: String,
		/// Call arguments, in the order of declaration.
		args: Vec<Value>,
	},
	/// Calls that are dispatched atomically by `Utility.batch_all`: if any call fails, the
	/// whole batch is reverted.
	BatchAll(Vec<CallBuilder>),
}

impl CallBuilder {
	/// Call of the pallet.
	pub fn new(pallet: impl Into<String>, call: impl Into<String>, args: Vec<Value>) -> Self {
		CallBuilder::Call { pallet: pallet.into(), call: call.into(), args }
	}

	/// Wrap calls into `Utility.batch_all`.
	pub fn batch_all(calls: Vec<CallBuilder>) -> Self {
		CallBuilder::BatchAll(calls)
	}
}

impl BuildCall for CallBuilder {
	fn build_call(&self, snapshot: &RuntimeSnapshot) -> wallet_runtime::Result<Vec<u8>> {
		match self {
			CallBuilder::Call { pallet, call, args } => snapshot.encode_call(pallet, call, args),
			CallBuilder::BatchAll(calls) => {
				let calls = calls
					.iter()
					.map(|call| call.build_call(snapshot).map(Value::Encoded))
					.collect::<wallet_runtime::Result<Vec<_>>>()?;
				snapshot.encode_call(UTILITY_PALLET, BATCH_ALL_CALL, &[Value::Sequence(calls)])
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_chain;
	use codec::Encode;
	use wallet_runtime::test_utils::{AccountId32, BalancesCall, MultiAddress, RuntimeCall, UtilityCall};

	fn transfer(dest: u8, value: u128) -> (CallBuilder, RuntimeCall) {
		(
			CallBuilder::new(
				"Balances",
				"transfer_allow_death",
				vec![Value::variant("Id", vec![Value::bytes([dest; 32])]), Value::uint(value)],
			),
			RuntimeCall::Balances(BalancesCall::transfer_allow_death {
				dest: MultiAddress::Id(AccountId32([dest; 32])),
				value,
			}),
		)
	}

	#[test]
	fn batch_all_wraps_calls() {
		let snapshot = test_chain::snapshot();
		let (first, first_expected) = transfer(1, 10);
		let (second, second_expected) = transfer(2, 20);

		let batch = CallBuilder::batch_all(vec![first, second]);
		assert_eq!(
			batch.build_call(&snapshot).unwrap(),
			RuntimeCall::Utility(UtilityCall::batch_all {
				calls: vec![first_expected, second_expected]
			})
			.encode(),
		);
	}

	#[test]
	fn closures_build_calls() {
		let snapshot = test_chain::snapshot();
		let (call, expected) = transfer(3, 30);
		let builder = move |snapshot: &RuntimeSnapshot| call.build_call(snapshot);
		assert_eq!(builder.build_call(&snapshot).unwrap(), expected.encode());
	}
}
