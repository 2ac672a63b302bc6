// Derived qualitative states, one record per cycle. Categories are
// independent; every enum carries an Unknown variant for cycles where the
// inputs were unavailable, rendered distinctly from any real label.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemLoad {
    Idle,
    Balanced,
    Stressed,
    HeavyLoad,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Spiking,
    Dropping,
    Stable,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkTraffic {
    Normal,
    UploadHeavy,
    DownloadHeavy,
    Congested,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bottleneck {
    None,
    CpuLimited,
    MemoryLimited,
    DiskLimited,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityState {
    Secure,
    FileModifications,
    SuspiciousActivity,
    Unknown,
}

impl SystemLoad {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Balanced => "balanced",
            Self::Stressed => "stressed",
            Self::HeavyLoad => "heavy_load",
            Self::Unknown => "unknown",
        }
    }
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spiking => "spiking",
            Self::Dropping => "dropping",
            Self::Stable => "stable",
            Self::Unknown => "unknown",
        }
    }
}

impl NetworkTraffic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::UploadHeavy => "upload_heavy",
            Self::DownloadHeavy => "download_heavy",
            Self::Congested => "congested",
            Self::Unknown => "unknown",
        }
    }
}

impl Bottleneck {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CpuLimited => "cpu_limited",
            Self::MemoryLimited => "memory_limited",
            Self::DiskLimited => "disk_limited",
            Self::Unknown => "unknown",
        }
    }
}

impl SecurityState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::FileModifications => "file_modifications",
            Self::SuspiciousActivity => "suspicious_activity",
            Self::Unknown => "unknown",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

impl_display!(SystemLoad, Trend, NetworkTraffic, Bottleneck, SecurityState);

/// One cycle's classification output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedState {
    pub timestamp_ms: u64,
    pub system_load: SystemLoad,
    pub cpu_trend: Trend,
    pub memory_trend: Trend,
    pub network_traffic: NetworkTraffic,
    pub bottleneck: Bottleneck,
    pub security: SecurityState,
}
