use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The work status an employee reports.
///
/// Serialized with the backend's wire strings (`"starting working"`, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkStatus {
    #[serde(rename = "starting working")]
    StartingWorking,
    #[serde(rename = "breaking")]
    Breaking,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "ending")]
    Ending,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 4] = [
        WorkStatus::StartingWorking,
        WorkStatus::Breaking,
        WorkStatus::Moving,
        WorkStatus::Ending,
    ];

    /// The string the backend expects in `StatusEvent.status`
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            WorkStatus::StartingWorking => "starting working",
            WorkStatus::Breaking => "breaking",
            WorkStatus::Moving => "moving",
            WorkStatus::Ending => "ending",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkStatus::StartingWorking => "Start Work",
            WorkStatus::Breaking => "Taking a Break",
            WorkStatus::Moving => "Traveling",
            WorkStatus::Ending => "End Work",
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            WorkStatus::StartingWorking => "start",
            WorkStatus::Breaking => "break",
            WorkStatus::Moving => "travel",
            WorkStatus::Ending => "end",
        }
    }

    /// Parse from the wire string, the display label, or a short alias.
    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL.into_iter().find(|status| {
            needle.eq_ignore_ascii_case(status.as_wire_str())
                || needle.eq_ignore_ascii_case(status.label())
                || needle.eq_ignore_ascii_case(status.alias())
        })
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for WorkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "unknown status '{}' (expected one of: start, break, travel, end)",
                s.trim()
            )
        })
    }
}

/// A latitude/longitude pair.
///
/// Sent to the backend as text in the form `"<lat>, <lng>"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both coordinates are finite and within range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected '<lat>, <lng>', got '{}'", s))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: WorkStatus,
    pub location: String,
}

impl StatusEvent {
    pub fn new(status: WorkStatus, location: Location) -> Self {
        Self {
            status,
            location: location.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLogEntry {
    pub description: String,
}
