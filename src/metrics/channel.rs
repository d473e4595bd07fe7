use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use ts_rs::TS;

use super::TS_EXPORT_PATH;

/// Lead channel identifier, unique across all users
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(transparent)]
pub struct ChannelId(#[ts(type = "number")] pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-defined lead source (Website, Referrals, ...)
///
/// `is_active` only controls whether the channel shows up in entry forms;
/// historical totals always include every channel the user ever had.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub is_active: bool,
    pub sort_order: i32,
}

impl Channel {
    /// Grid column key, e.g. `lead_12`
    pub fn key(&self) -> String {
        format!("lead_{}", self.id)
    }
}

/// Which channels a read path sums over
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    AsRefStr,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub enum ChannelScope {
    /// Every channel the user owns, active or not (history, reports)
    #[default]
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    AllKnown,
    /// Only channels currently offered in the entry form
    #[serde(rename = "active")]
    #[strum(serialize = "active")]
    ActiveOnly,
}

impl ChannelScope {
    pub fn includes(self, channel: &Channel) -> bool {
        match self {
            ChannelScope::AllKnown => true,
            ChannelScope::ActiveOnly => channel.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn channel(id: i64, active: bool) -> Channel {
        Channel {
            id: ChannelId(id),
            name: format!("Channel {}", id),
            is_active: active,
            sort_order: 0,
        }
    }

    #[test]
    fn test_channel_key() {
        assert_eq!(channel(7, true).key(), "lead_7");
    }

    #[test]
    fn test_scope_includes() {
        let inactive = channel(3, false);
        assert!(ChannelScope::AllKnown.includes(&inactive));
        assert!(!ChannelScope::ActiveOnly.includes(&inactive));
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(ChannelScope::from_str("all").unwrap(), ChannelScope::AllKnown);
        assert_eq!(
            ChannelScope::from_str("active").unwrap(),
            ChannelScope::ActiveOnly
        );
        assert!(ChannelScope::from_str("inactive").is_err());
    }
}
