use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/* Volts, amperes, watts, degrees */
type Volt = f64;
type Ampere = f64;
type Degree = f64;

pub type PanelId = u64;
pub type AlertId = u64;

#[derive(Debug, Clone)]
pub struct Api {
    pub api_url: String,
    pub client: reqwest::Client,
}

/// Operational state reported by the backend for a panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum PanelStatus {
    Active,
    Warning,
    Faulty,
    Other(String),
}

impl PanelStatus {
    pub fn name(&self) -> &str {
        match self {
            PanelStatus::Active => "Active",
            PanelStatus::Warning => "Warning",
            PanelStatus::Faulty => "Faulty",
            PanelStatus::Other(name) => name,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PanelStatus::Active => "#28a745",
            PanelStatus::Warning => "#ffc107",
            PanelStatus::Faulty => "#dc3545",
            PanelStatus::Other(_) => "#6c757d",
        }
    }
}

impl From<&str> for PanelStatus {
    fn from(name: &str) -> Self {
        match name {
            "Active" => PanelStatus::Active,
            "Warning" => PanelStatus::Warning,
            "Faulty" => PanelStatus::Faulty,
            other => PanelStatus::Other(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Other(String),
}

impl Severity {
    pub fn name(&self) -> &str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
            Severity::Other(name) => name,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Severity::Info => "green",
            Severity::Warning => "orange",
            Severity::Critical => "red",
            Severity::Other(_) => "gray",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

impl From<&str> for Severity {
    fn from(name: &str) -> Self {
        match name {
            "Info" => Severity::Info,
            "Warning" => Severity::Warning,
            "Critical" => Severity::Critical,
            other => Severity::Other(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub id: PanelId,
    pub serial_number: String,
    pub model: String,
    pub orientation: Degree,
    pub inclination: Degree,
    pub voltage_voc: Volt,
    pub current_isc: Ampere,
    pub voltage_vmp: Volt,
    pub current_imp: Ampere,
    pub installation_date: Option<NaiveDate>,
    pub status: PanelStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub panel_id: Option<PanelId>,
    pub timestamp: DateTime<Utc>,
    pub voltage: Volt,
    pub current: Ampere,
    pub temperature: f64,
    pub performance_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyAggregate {
    pub hour: DateTime<Utc>,
    pub avg_voltage: Volt,
    pub avg_current: Ampere,
    pub avg_temperature: f64,
    pub avg_performance_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: AlertId,
    pub alert_type: String,
    pub description: String,
    pub severity: Severity,
    pub panel_id: PanelId,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Validated body of `POST /api/newAlert`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlert {
    pub alert_type: String,
    pub description: String,
    pub severity: String,
    pub panel_id: PanelId,
    pub status: String,
}
