//! Tunable constants for the transport engine.

/// Maximum payload bytes a single chunk/frame can carry.
pub const MAX_CHUNK_PAYLOAD: usize = 26;

/// Default number of retransmission attempts before giving up on a chunk.
pub const DEFAULT_MAX_RETRIES: u8 = 5;

/// Default single-chunk ACK timeout, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Engine configuration.
///
/// The defaults match the protocol's own constants (§4.4 of the
/// specification); most callers never need to touch this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of retransmissions attempted for a chunk before the send
    /// is abandoned with `SendTimeoutExceeded`.
    pub max_retries: u8,

    /// How long the sender waits for a chunk ACK before retransmitting.
    pub timeout_ms: u64,

    /// Whether the sender waits for a distinct `PACKET_ACK` after the
    /// final chunk's ACK, rather than completing on the last chunk ACK.
    pub wait_for_packet_ack: bool,
}

impl EngineConfig {
    /// Creates a config with the protocol's default constants.
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            wait_for_packet_ack: true,
        }
    }

    /// Returns a builder seeded with these defaults.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Copy)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Creates a new builder seeded with [`EngineConfig::default`].
    pub const fn new() -> Self {
        Self {
            config: EngineConfig::new(),
        }
    }

    /// Sets the maximum retransmission attempts per chunk.
    pub const fn max_retries(mut self, max_retries: u8) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Sets the per-chunk ACK timeout, in milliseconds.
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Sets whether the sender waits for a whole-packet ACK.
    pub const fn wait_for_packet_ack(mut self, wait: bool) -> Self {
        self.config.wait_for_packet_ack = wait;
        self
    }

    /// Builds the final [`EngineConfig`].
    pub const fn build(self) -> EngineConfig {
        self.config
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout_ms, 1000);
        assert!(config.wait_for_packet_ack);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = EngineConfig::builder()
            .max_retries(3)
            .timeout_ms(250)
            .wait_for_packet_ack(false)
            .build();

        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout_ms, 250);
        assert!(!config.wait_for_packet_ack);
    }
}
