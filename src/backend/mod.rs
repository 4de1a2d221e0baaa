//! Storage backends.
//!
//! [InMemoryBackend] is the durable store. [OverlayedBackend] buffers the
//! writes of one evaluation on top of any base backend; the buffered
//! [OverlayedChangeSet] is merged back only when the evaluation succeeds.

mod in_memory;
mod overlayed;

pub use exvm_interpreter::{RuntimeBackend, RuntimeBaseBackend, RuntimeEnvironment, Scope};

pub use self::in_memory::{InMemoryBackend, InMemoryEnvironment};
pub use self::overlayed::{OverlayedBackend, OverlayedChangeSet};

/// Merge strategy of a change set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeStrategy {
	/// Write the change set into the base backend.
	Commit,
	/// Drop the change set.
	Discard,
}

/// A backend that can take a change set produced by an overlay.
#[auto_impl::auto_impl(&mut, Box)]
pub trait ApplyBackend: RuntimeBaseBackend {
	/// Apply every write of `changeset`.
	fn apply_overlayed(&mut self, changeset: &OverlayedChangeSet);
}
