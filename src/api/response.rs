use crate::model;
use serde::Deserialize;

/// Deserializers tolerating the shapes the backend actually emits: Postgres `numeric` columns
/// arrive as strings, dates arrive either as plain dates or full timestamps.
pub mod lenient {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(d)?;
        as_f64(&value).ok_or_else(|| D::Error::custom(format!("expected number, got {}", value)))
    }

    /* Missing or null aggregates are reported as 0 */
    pub fn number_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(d)?;
        match value {
            Value::Null => Ok(0.0),
            _ => as_f64(&value)
                .ok_or_else(|| D::Error::custom(format!("expected number, got {}", value))),
        }
    }

    /* null text columns read as empty */
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(d)?;
        match &value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| D::Error::custom(format!("expected identifier, got {}", value)))
    }

    pub fn optional_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            value => id(value).map(Some).map_err(D::Error::custom),
        }
    }

    fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|ts| Utc.from_utc_datetime(&ts))
            })
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        parse_timestamp(&s).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", s)))
    }

    pub fn optional_timestamp<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<String>::deserialize(d)?
            .as_deref()
            .and_then(parse_timestamp))
    }

    pub fn optional_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.and_then(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .ok()
                .or_else(|| parse_timestamp(&s).map(|ts| ts.date_naive()))
        }))
    }
}

#[derive(Deserialize)]
pub struct Panel {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(deserialize_with = "lenient::text", default)]
    pub serial_number: String,
    #[serde(deserialize_with = "lenient::text", default)]
    pub model: String,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub orientation: f64,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub inclination: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub voltage_voc: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub current_isc: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub voltage_vmp: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub current_imp: f64,
    #[serde(deserialize_with = "lenient::optional_date", default)]
    pub installation_date: Option<chrono::NaiveDate>,
    #[serde(deserialize_with = "lenient::text", default)]
    pub status: String,
}

impl From<Panel> for model::Panel {
    fn from(p: Panel) -> Self {
        model::Panel {
            id: p.id,
            serial_number: p.serial_number,
            model: p.model,
            orientation: p.orientation,
            inclination: p.inclination,
            voltage_voc: p.voltage_voc,
            current_isc: p.current_isc,
            voltage_vmp: p.voltage_vmp,
            current_imp: p.current_imp,
            installation_date: p.installation_date,
            status: model::PanelStatus::from(p.status.as_str()),
        }
    }
}

#[derive(Deserialize)]
pub struct Measurement {
    #[serde(deserialize_with = "lenient::optional_id", default)]
    pub panel_id: Option<u64>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(deserialize_with = "lenient::number")]
    pub voltage: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub current: f64,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub temperature: f64,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub performance_ratio: f64,
}

impl From<Measurement> for model::Measurement {
    fn from(m: Measurement) -> Self {
        model::Measurement {
            panel_id: m.panel_id,
            timestamp: m.timestamp,
            voltage: m.voltage,
            current: m.current,
            temperature: m.temperature,
            performance_ratio: m.performance_ratio,
        }
    }
}

#[derive(Deserialize)]
pub struct HourlyAggregate {
    #[serde(deserialize_with = "lenient::timestamp")]
    pub hour: chrono::DateTime<chrono::Utc>,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub avg_voltage: f64,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub avg_current: f64,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub avg_temperature: f64,
    #[serde(deserialize_with = "lenient::number_or_zero", default)]
    pub avg_performance_ratio: f64,
}

impl From<HourlyAggregate> for model::HourlyAggregate {
    fn from(h: HourlyAggregate) -> Self {
        model::HourlyAggregate {
            hour: h.hour,
            avg_voltage: h.avg_voltage,
            avg_current: h.avg_current,
            avg_temperature: h.avg_temperature,
            avg_performance_ratio: h.avg_performance_ratio,
        }
    }
}

#[derive(Deserialize)]
pub struct Alert {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(deserialize_with = "lenient::text", default)]
    pub alert_type: String,
    #[serde(deserialize_with = "lenient::text", default)]
    pub description: String,
    #[serde(deserialize_with = "lenient::text", default)]
    pub severity: String,
    #[serde(deserialize_with = "lenient::id")]
    pub panel_id: u64,
    #[serde(deserialize_with = "lenient::text", default)]
    pub status: String,
    #[serde(deserialize_with = "lenient::optional_timestamp", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Alert> for model::Alert {
    fn from(a: Alert) -> Self {
        model::Alert {
            id: a.id,
            alert_type: a.alert_type,
            description: a.description,
            severity: model::Severity::from(a.severity.as_str()),
            panel_id: a.panel_id,
            status: a.status,
            created_at: a.created_at,
        }
    }
}

/* `{ info: [...] }`, used by every panel endpoint */
#[derive(Deserialize)]
pub struct InfoList<T> {
    pub info: Vec<T>,
}

/* `{ data: [...] }`, used by the alerts endpoint; a null list means no alerts */
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DataList<T> {
    #[serde(deserialize_with = "Option::deserialize")]
    pub data: Option<Vec<T>>,
}

/* Generic error */
#[derive(Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/* Answers of `POST /api/newAlert` */
#[derive(Deserialize)]
#[serde(untagged)]
pub enum NewAlertResponse {
    Created(Alert),
    Wrapped { data: Alert },
    Error(ErrorResponse),
    Other(serde_json::Value),
}
