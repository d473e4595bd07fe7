use std::fmt;
use std::str::FromStr;

use crate::errors::KpiError;

use super::{ChannelId, MetricKind, PipelineField};

const CHANNEL_KEY_PREFIX: &str = "lead_";

/// Address of one grid cell column: a pipeline field or a lead channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    Pipeline(PipelineField),
    Channel(ChannelId),
}

impl MetricKey {
    pub fn kind(self) -> MetricKind {
        match self {
            MetricKey::Pipeline(field) => field.kind(),
            MetricKey::Channel(_) => MetricKind::Count,
        }
    }
}

impl FromStr for MetricKey {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(raw_id) = s.strip_prefix(CHANNEL_KEY_PREFIX) {
            return match raw_id.parse::<i64>() {
                Ok(id) if id > 0 && !raw_id.starts_with('+') => {
                    Ok(MetricKey::Channel(ChannelId(id)))
                }
                _ => Err(KpiError::validation(format!(
                    "Invalid channel key: '{}'",
                    s
                ))),
            };
        }

        PipelineField::from_str(s)
            .map(MetricKey::Pipeline)
            .map_err(|_| KpiError::validation(format!("Unknown metric key: '{}'", s)))
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKey::Pipeline(field) => write!(f, "{}", field),
            MetricKey::Channel(id) => write!(f, "{}{}", CHANNEL_KEY_PREFIX, id),
        }
    }
}
