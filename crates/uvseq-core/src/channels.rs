//! UV channel selection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Channels a four-head device exposes.
pub const DEFAULT_CHANNELS: [u8; 4] = [1, 2, 3, 4];

/// Toggle set over the device's available channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSelection {
    available: Vec<u8>,
    selected: BTreeSet<u8>,
}

impl Default for ChannelSelection {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNELS.to_vec())
    }
}

impl ChannelSelection {
    pub fn new(available: Vec<u8>) -> Self {
        Self {
            available,
            selected: BTreeSet::new(),
        }
    }

    pub fn available(&self) -> &[u8] {
        &self.available
    }

    /// Flip a channel. Returns whether it is now selected.
    ///
    /// Channels the device does not have are ignored.
    pub fn toggle(&mut self, channel: u8) -> bool {
        if !self.available.contains(&channel) {
            warn!(channel, available = ?self.available, "ignoring unknown channel");
            return false;
        }
        if !self.selected.remove(&channel) {
            self.selected.insert(channel);
            return true;
        }
        false
    }

    pub fn is_selected(&self, channel: u8) -> bool {
        self.selected.contains(&channel)
    }

    /// Selected channels in ascending order.
    pub fn selected(&self) -> Vec<u8> {
        self.selected.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
