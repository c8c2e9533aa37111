pub mod endpoint;
pub mod error;
pub mod response;

use crate::alerts::AlertSource;
use crate::dashboard::PanelSource;
use crate::model;
use async_trait::async_trait;
pub use error::Error;
use response::{DataList, ErrorResponse, InfoList, NewAlertResponse};
use serde::de::DeserializeOwned;

pub fn api(api_url: &str) -> Result<model::Api, Error> {
    let client = reqwest::ClientBuilder::new()
        .build()
        .or(Err(Error::InternalError))?;

    Ok(model::Api {
        api_url: api_url.trim_end_matches('/').to_owned(),
        client,
    })
}

/// Map Non-2xx API response to Error
fn map_api_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(http::StatusCode::TOO_MANY_REQUESTS) => Error::RateExceeded(error.to_string()),
        _ => Error::ApiError(error.to_string()),
    }
}

async fn get<T: DeserializeOwned>(api: &model::Api, path: &str) -> Result<T, Error> {
    let url = format!("{}{}", api.api_url, path);

    let response_text = api
        .client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(map_api_err)?
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))?;

    log::trace!("endpoint: {}, response_text: {}", path, response_text);

    serde_json::from_str(&response_text)
        .map_err(|e| Error::InvalidResponse(response_text, e.to_string()))
}

/// Read the current panel snapshot.
pub async fn panels(api: &model::Api) -> Result<Vec<model::Panel>, Error> {
    get::<InfoList<response::Panel>>(api, endpoint::PANELS)
        .await
        .map(|response| response.info.into_iter().map(Into::into).collect())
}

/// Read the measurement window of panel `id`, oldest reading first.
pub async fn measurements(
    api: &model::Api,
    id: model::PanelId,
) -> Result<Vec<model::Measurement>, Error> {
    let path = format!("{}/{}", endpoint::MEASUREMENTS, id);

    get::<InfoList<response::Measurement>>(api, &path)
        .await
        .map(|response| {
            let mut series: Vec<model::Measurement> =
                response.info.into_iter().map(Into::into).collect();
            series.sort_by_key(|m| m.timestamp);
            series
        })
}

pub async fn performance(
    api: &model::Api,
    id: model::PanelId,
) -> Result<Vec<model::HourlyAggregate>, Error> {
    let path = format!("{}/{}", endpoint::PERFORMANCE, id);

    get::<InfoList<response::HourlyAggregate>>(api, &path)
        .await
        .map(|response| {
            let mut hours: Vec<model::HourlyAggregate> =
                response.info.into_iter().map(Into::into).collect();
            hours.sort_by_key(|h| h.hour);
            hours
        })
}

pub async fn alerts(api: &model::Api) -> Result<Vec<model::Alert>, Error> {
    get::<DataList<response::Alert>>(api, endpoint::ALERTS)
        .await
        .map(|response| {
            response
                .data
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect()
        })
}

/// Submit `alert`. The created alert is returned when the backend echoes it back.
pub async fn create_alert(
    api: &model::Api,
    alert: &model::NewAlert,
) -> Result<Option<model::Alert>, Error> {
    let url = format!("{}{}", api.api_url, endpoint::NEW_ALERT);

    let response = api
        .client
        .post(url)
        .json(alert)
        .send()
        .await
        .map_err(map_api_err)?;
    let status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))?;

    log::trace!(
        "endpoint: {}, data: {:#?}, status: {}, response_text: {}",
        endpoint::NEW_ALERT,
        alert,
        status,
        response_text
    );

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&response_text)
            .map(|e| e.message)
            .unwrap_or_else(|_| String::from("Failed to create alert."));

        return match status {
            http::StatusCode::TOO_MANY_REQUESTS => Err(Error::RateExceeded(message)),
            _ => Err(Error::ApiError(message)),
        };
    }

    match serde_json::from_str::<NewAlertResponse>(&response_text) {
        Ok(NewAlertResponse::Created(created))
        | Ok(NewAlertResponse::Wrapped { data: created }) => Ok(Some(created.into())),
        Ok(NewAlertResponse::Error(e)) => {
            log::info!("alert accepted: {}", e.message);
            Ok(None)
        }
        Ok(NewAlertResponse::Other(_)) | Err(_) => Ok(None),
    }
}

pub async fn delete_alert(api: &model::Api, id: model::AlertId) -> Result<(), Error> {
    let url = format!("{}{}/{}", api.api_url, endpoint::ALERTS, id);

    api.client
        .delete(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(map_api_err)
        .map(|_| ())
}

#[async_trait]
impl PanelSource for model::Api {
    async fn panels(&self) -> Result<Vec<model::Panel>, Error> {
        panels(self).await
    }

    async fn measurements(&self, id: model::PanelId) -> Result<Vec<model::Measurement>, Error> {
        measurements(self, id).await
    }

    async fn performance(&self, id: model::PanelId) -> Result<Vec<model::HourlyAggregate>, Error> {
        performance(self, id).await
    }
}

#[async_trait]
impl AlertSource for model::Api {
    async fn alerts(&self) -> Result<Vec<model::Alert>, Error> {
        alerts(self).await
    }

    async fn create_alert(&self, alert: &model::NewAlert) -> Result<Option<model::Alert>, Error> {
        create_alert(self, alert).await
    }

    async fn delete_alert(&self, id: model::AlertId) -> Result<(), Error> {
        delete_alert(self, id).await
    }
}
