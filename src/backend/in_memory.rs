use alloc::collections::BTreeMap;

use exvm_interpreter::{
	ExitError, RuntimeBackend, RuntimeBaseBackend, RuntimeEnvironment, Scope,
};
use primitive_types::U256;

use crate::backend::{ApplyBackend, OverlayedChangeSet};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InMemoryEnvironment {
	pub block_number: U256,
	pub block_timestamp: U256,
}

/// Durable store kept in memory. Unset entries read zero, and writing zero
/// removes the entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InMemoryBackend {
	pub environment: InMemoryEnvironment,
	pub storage: BTreeMap<(Scope, U256), U256>,
}

impl InMemoryBackend {
	pub fn new(environment: InMemoryEnvironment) -> Self {
		Self {
			environment,
			storage: BTreeMap::new(),
		}
	}

	fn write(&mut self, scope: Scope, key: U256, value: U256) {
		if value.is_zero() {
			self.storage.remove(&(scope, key));
		} else {
			self.storage.insert((scope, key), value);
		}
	}
}

impl RuntimeEnvironment for InMemoryBackend {
	fn block_number(&self) -> U256 {
		self.environment.block_number
	}

	fn block_timestamp(&self) -> U256 {
		self.environment.block_timestamp
	}
}

impl RuntimeBaseBackend for InMemoryBackend {
	fn storage(&self, scope: Scope, key: U256) -> U256 {
		self.storage
			.get(&(scope, key))
			.copied()
			.unwrap_or_default()
	}
}

impl RuntimeBackend for InMemoryBackend {
	fn set_storage(&mut self, scope: Scope, key: U256, value: U256) -> Result<(), ExitError> {
		self.write(scope, key, value);
		Ok(())
	}
}

impl ApplyBackend for InMemoryBackend {
	fn apply_overlayed(&mut self, changeset: &OverlayedChangeSet) {
		for ((scope, key), value) in &changeset.storages {
			self.write(*scope, *key, *value);
		}
	}
}

#[cfg(test)]
mod tests {
	use primitive_types::H160;

	use super::*;

	#[test]
	fn zero_writes_remove_entries() {
		let scope = Scope::host(H160::repeat_byte(7));
		let mut backend = InMemoryBackend::default();

		backend.set_storage(scope, U256::one(), U256::from(3)).unwrap();
		assert_eq!(backend.storage.len(), 1);
		backend.set_storage(scope, U256::one(), U256::zero()).unwrap();
		assert!(backend.storage.is_empty());
		assert_eq!(backend.storage(scope, U256::one()), U256::zero());
	}

	#[test]
	fn applies_changesets() {
		let scope = Scope::host(H160::repeat_byte(7));
		let mut backend = InMemoryBackend::default();
		backend.set_storage(scope, U256::one(), U256::from(3)).unwrap();

		let mut changeset = OverlayedChangeSet::default();
		changeset
			.storages
			.insert((scope, U256::one()), U256::zero());
		changeset
			.storages
			.insert((scope, U256::from(2)), U256::from(5));
		backend.apply_overlayed(&changeset);

		assert_eq!(backend.storage(scope, U256::one()), U256::zero());
		assert_eq!(backend.storage(scope, U256::from(2)), U256::from(5));
		assert_eq!(backend.storage.len(), 1);
	}
}
