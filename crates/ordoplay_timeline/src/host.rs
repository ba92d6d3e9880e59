// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host identity for timelines.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the host context (owning object) a timeline was created for.
///
/// A nested timeline must share its parent's host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostId(pub Uuid);

impl HostId {
    /// Create a new random host ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HostId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
