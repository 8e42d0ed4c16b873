//! Resolver configuration.

use serde::Deserialize;

/// Knobs that change how a [`Resolver`](crate::resolver::Resolver) behaves.
///
/// Deserializable so hosts can load it from their own settings files;
/// missing fields take their defaults.
///
/// ```
/// use arbor_inject::ResolverConfig;
///
/// let config = ResolverConfig::default()
///     .with_force_injection(false)
///     .with_ambiguity_listing_limit(3);
/// assert!(!config.force_injection);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Create missing dependencies for members that request it.
    pub force_injection: bool,
    /// Invoke completion callbacks after successful assignments.
    pub completion_callbacks: bool,
    /// Maximum number of candidates spelled out in an ambiguity message.
    pub ambiguity_listing_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            force_injection: true,
            completion_callbacks: true,
            ambiguity_listing_limit: 8,
        }
    }
}

impl ResolverConfig {
    /// Enables or disables fallback creation.
    #[must_use]
    pub fn with_force_injection(mut self, enabled: bool) -> Self {
        self.force_injection = enabled;
        self
    }

    /// Enables or disables completion callbacks.
    #[must_use]
    pub fn with_completion_callbacks(mut self, enabled: bool) -> Self {
        self.completion_callbacks = enabled;
        self
    }

    /// Sets how many candidates an ambiguity message lists.
    #[must_use]
    pub fn with_ambiguity_listing_limit(mut self, limit: usize) -> Self {
        self.ambiguity_listing_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{ "completion_callbacks": false }"#).unwrap();

        assert!(config.force_injection);
        assert!(!config.completion_callbacks);
        assert_eq!(config.ambiguity_listing_limit, 8);
    }
}
