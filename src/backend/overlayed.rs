use alloc::collections::BTreeMap;

use exvm_interpreter::{
	ExitError, RuntimeBackend, RuntimeBaseBackend, RuntimeEnvironment, Scope,
};
use primitive_types::U256;

/// Writes buffered by an [OverlayedBackend].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OverlayedChangeSet {
	/// Every `(scope, key)` written, with its last value.
	pub storages: BTreeMap<(Scope, U256), U256>,
}

impl OverlayedChangeSet {
	/// Whether nothing was written.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.storages.is_empty()
	}

	/// Number of distinct entries written.
	#[must_use]
	pub fn len(&self) -> usize {
		self.storages.len()
	}
}

/// Read-through write buffer over a base backend.
pub struct OverlayedBackend<B> {
	backend: B,
	substate: Substate,
}

impl<B> OverlayedBackend<B> {
	pub fn new(backend: B) -> Self {
		Self {
			backend,
			substate: Substate::default(),
		}
	}

	pub fn deconstruct(self) -> (B, OverlayedChangeSet) {
		(
			self.backend,
			OverlayedChangeSet {
				storages: self.substate.storages,
			},
		)
	}
}

impl<B: RuntimeEnvironment> RuntimeEnvironment for OverlayedBackend<B> {
	fn block_number(&self) -> U256 {
		self.backend.block_number()
	}

	fn block_timestamp(&self) -> U256 {
		self.backend.block_timestamp()
	}
}

impl<B: RuntimeBaseBackend> RuntimeBaseBackend for OverlayedBackend<B> {
	fn storage(&self, scope: Scope, key: U256) -> U256 {
		if let Some(value) = self.substate.known_storage(scope, key) {
			value
		} else {
			self.backend.storage(scope, key)
		}
	}
}

impl<B: RuntimeBaseBackend> RuntimeBackend for OverlayedBackend<B> {
	fn set_storage(&mut self, scope: Scope, key: U256, value: U256) -> Result<(), ExitError> {
		self.substate.storages.insert((scope, key), value);
		Ok(())
	}
}

#[derive(Default)]
struct Substate {
	storages: BTreeMap<(Scope, U256), U256>,
}

impl Substate {
	pub fn known_storage(&self, scope: Scope, key: U256) -> Option<U256> {
		self.storages.get(&(scope, key)).copied()
	}
}
