use exvm_interpreter::IntegrityConfig;

/// Invoker configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct Config {
	/// Limits applied when an expression is attached.
	pub integrity: IntegrityConfig,
	/// Require every flow transfer to be sent by the caller or the host.
	pub flow_party_check: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self::standard()
	}
}

impl Config {
	/// Default limits with the flow party check enabled.
	#[must_use]
	pub const fn standard() -> Config {
		Config {
			integrity: IntegrityConfig {
				stack_limit: 1024,
				source_limit: 32,
				work_limit: 1 << 16,
			},
			flow_party_check: true,
		}
	}

	/// Standard configuration without the flow party check, for hosts that
	/// authorise transfers themselves.
	#[must_use]
	pub const fn unchecked_flow() -> Config {
		Config {
			flow_party_check: false,
			..Self::standard()
		}
	}

	/// Replace the integrity limits.
	#[must_use]
	pub const fn with_integrity(mut self, integrity: IntegrityConfig) -> Config {
		self.integrity = integrity;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn standard_matches_integrity_default() {
		assert_eq!(Config::default().integrity, IntegrityConfig::default());
		assert!(Config::default().flow_party_check);
		assert!(!Config::unchecked_flow().flow_party_check);
	}
}
