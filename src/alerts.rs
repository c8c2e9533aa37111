use crate::api::Error;
use crate::model::{Alert, AlertId, NewAlert, Severity};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};

/* alerts are always opened as active, whatever the client asked for */
const NEW_ALERT_STATUS: &str = "Active";

#[async_trait]
pub trait AlertSource: Send + Sync {
    async fn alerts(&self) -> Result<Vec<Alert>, Error>;
    async fn create_alert(&self, alert: &NewAlert) -> Result<Option<Alert>, Error>;
    async fn delete_alert(&self, id: AlertId) -> Result<(), Error>;
}

/* form fields may arrive as `"3"` or `3` */
fn text_or_number<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Alert creation form as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewAlertForm {
    #[serde(default)]
    pub alert_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(deserialize_with = "text_or_number", default)]
    pub panel_id: String,
    /* accepted for compatibility, never forwarded */
    #[serde(default)]
    pub status: Option<String>,
}

impl NewAlertForm {
    pub fn validate(&self) -> Result<NewAlert, Error> {
        let alert_type = self.alert_type.trim();
        let description = self.description.trim();
        let panel_id = self.panel_id.trim();

        if alert_type.is_empty() || description.is_empty() || panel_id.is_empty() {
            return Err(Error::ValidationError(String::from(
                "Please fill in all fields.",
            )));
        }

        let panel_id = panel_id.parse().map_err(|_| {
            Error::ValidationError(format!("Panel reference must be a number: {}", panel_id))
        })?;

        let severity = match self.severity.as_deref().map(str::trim) {
            None | Some("") => Severity::default(),
            Some(name) => match Severity::from(name) {
                Severity::Other(name) => {
                    return Err(Error::ValidationError(format!(
                        "Unknown severity: {}",
                        name
                    )))
                }
                severity => severity,
            },
        };

        Ok(NewAlert {
            alert_type: alert_type.to_owned(),
            description: description.to_owned(),
            severity: severity.name().to_owned(),
            panel_id,
            status: String::from(NEW_ALERT_STATUS),
        })
    }
}

/// Client-side cache of the alert list. Every mutation is followed by a full re-fetch.
pub struct AlertBoard<A> {
    source: A,
    alerts: Mutex<Vec<Alert>>,
}

impl<A: AlertSource> AlertBoard<A> {
    pub fn new(source: A) -> Self {
        AlertBoard {
            source,
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-fetch the list. On failure the previous list is kept.
    pub async fn refresh(&self) {
        match self.source.alerts().await {
            Ok(alerts) => {
                log::debug!("received {} alerts", alerts.len());
                *self.alerts.lock().unwrap_or_else(PoisonError::into_inner) = alerts;
            }
            Err(e) => log::error!("Failed to fetch alerts: {}", e),
        }
    }

    /// Validate and submit `form`. Nothing is sent when validation fails.
    pub async fn create(&self, form: &NewAlertForm) -> Result<Option<Alert>, Error> {
        let alert = form.validate()?;

        let created = self.source.create_alert(&alert).await.map_err(|e| {
            log::error!("Failed to create alert: {}", e);
            e
        })?;
        log::info!(
            "alert {:?} created for panel {}",
            created.as_ref().map(|a| a.id),
            alert.panel_id
        );

        self.refresh().await;
        Ok(created)
    }

    pub async fn delete(&self, id: AlertId) -> Result<(), Error> {
        self.source.delete_alert(id).await.map_err(|e| {
            log::error!("Failed to delete alert {}: {}", id, e);
            e
        })?;
        log::info!("alert {} resolved", id);

        self.refresh().await;
        Ok(())
    }
}
