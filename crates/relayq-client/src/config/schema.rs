use serde::Deserialize;
use relayq_core::error::{RelayError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub queue: QueueSection,

    #[serde(default)]
    pub transport: TransportSection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            queue: QueueSection::default(),
            transport: TransportSection::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.transport.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSection {
    /// Outstanding count that triggers a pressure event. 0 disables.
    #[serde(default)]
    pub pending_warning_threshold: usize,

    /// Re-send entries still in flight from a lost connection when a new one
    /// comes up. Off by default: they stay in flight and are only resolved by
    /// a late response, `cancel`, or teardown.
    #[serde(default)]
    pub resend_in_flight_on_reconnect: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSection {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl TransportSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.channel_capacity) {
            return Err(RelayError::Config(
                "transport.channel_capacity must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_channel_capacity() -> usize {
    256
}
