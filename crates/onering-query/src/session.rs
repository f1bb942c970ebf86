//! Display flags toggled by CLUSTER, COLOR and LINEARISE
//!
//! The flags belong to the caller's session and are only read by the
//! visualization layer; they never affect the store.

use serde::{Deserialize, Serialize};

/// One of the three display modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayFlag {
    Cluster,
    Color,
    Linearise,
}

/// Current display modes of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub cluster: bool,
    pub color: bool,
    pub linearise: bool,
}

impl DisplayFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, flag: DisplayFlag, enabled: bool) {
        match flag {
            DisplayFlag::Cluster => self.cluster = enabled,
            DisplayFlag::Color => self.color = enabled,
            DisplayFlag::Linearise => self.linearise = enabled,
        }
    }

    pub fn get(&self, flag: DisplayFlag) -> bool {
        match flag {
            DisplayFlag::Cluster => self.cluster,
            DisplayFlag::Color => self.color,
            DisplayFlag::Linearise => self.linearise,
        }
    }
}
