use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

/// Position of a contact in the sales funnel.
///
/// Variants are declared in funnel order, so `Ord` follows the progression
/// from `Lead` to `ActiveClient`. Moves in either direction are allowed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Lead,
    WarmLead,
    Prospect,
    WarmProspect,
    Client,
    ActiveClient,
}

impl Stage {
    /// All stages in funnel order.
    pub const ALL: [Stage; 6] = [
        Stage::Lead,
        Stage::WarmLead,
        Stage::Prospect,
        Stage::WarmProspect,
        Stage::Client,
        Stage::ActiveClient,
    ];

    /// String label for SQL storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Lead => "lead",
            Stage::WarmLead => "warm_lead",
            Stage::Prospect => "prospect",
            Stage::WarmProspect => "warm_prospect",
            Stage::Client => "client",
            Stage::ActiveClient => "active_client",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Lead => "Lead",
            Stage::WarmLead => "Warm Lead",
            Stage::Prospect => "Prospect",
            Stage::WarmProspect => "Warm Prospect",
            Stage::Client => "Client",
            Stage::ActiveClient => "Active Client",
        }
    }

    /// Client or active client.
    pub fn is_client(&self) -> bool {
        matches!(self, Stage::Client | Stage::ActiveClient)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("stage", s))
    }
}
