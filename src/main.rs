#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use rocket::serde::json::Json;
use rocket::State;
use solarview_rs::contact::EMAILJS_API_URL;
use solarview_rs::model::{Api, PanelId};
use solarview_rs::view::{self, AlertList, Chart, DashboardView, Tooltip};
use solarview_rs::{api, AlertBoard, ContactForm, Dashboard, EmailJs, Intervals, NewAlertForm};
use std::time::Duration;

mod metrics;

const API_URL: &str = "http://localhost:3000";

#[derive(Clone, serde::Deserialize)]
pub struct SolarViewConfig {
    api_url: String,
    /// seconds between panel snapshots
    panel_interval: u64,
    /// seconds between measurement refreshes of the selected panel
    measurement_interval: u64,
    email_api_url: String,
    email_service_id: Option<String>,
    email_template_id: Option<String>,
    email_public_key: Option<String>,
}

/// Structure containing state for API handlers.
pub struct StateData {
    dashboard: Dashboard<Api>,
    alerts: AlertBoard<Api>,
    /// `None` when the email service is not configured
    mailer: Option<EmailJs>,
}

impl StateData {
    fn alert_list(&self) -> AlertList {
        view::alert_list(&self.alerts.alerts(), self.dashboard.state().panels())
    }
}

pub fn read_settings() -> Result<SolarViewConfig, config::ConfigError> {
    let mut settings = Config::default();
    settings
        .merge(config::Environment::with_prefix("SV"))?
        .set_default("api_url", API_URL)?
        .set_default("panel_interval", 60_i64)?
        .set_default("measurement_interval", 15 * 60_i64)?
        .set_default("email_api_url", EMAILJS_API_URL)?;

    settings.try_into()
}

fn mailer(settings: &SolarViewConfig) -> Result<Option<EmailJs>, api::Error> {
    match (
        &settings.email_service_id,
        &settings.email_template_id,
        &settings.email_public_key,
    ) {
        (Some(service_id), Some(template_id), Some(public_key)) => EmailJs::new(
            settings.email_api_url.clone(),
            service_id.clone(),
            template_id.clone(),
            public_key.clone(),
        )
        .map(Some),
        _ => {
            log::warn!("email service not configured; contact form is disabled");
            Ok(None)
        }
    }
}

#[get("/dashboard")]
fn dashboard_route(state: &State<StateData>) -> Json<DashboardView> {
    Json(state.dashboard.render())
}

#[post("/dashboard/select/<id>")]
fn select_route(state: &State<StateData>, id: PanelId) -> Result<Json<DashboardView>, api::Error> {
    state.dashboard.select(id)?;
    Ok(Json(state.dashboard.render()))
}

#[put("/dashboard/chart/<chart_view>")]
fn chart_route(state: &State<StateData>, chart_view: &str) -> Result<Json<Chart>, api::Error> {
    state.dashboard.set_chart_view(chart_view.parse()?);
    Ok(Json(view::chart(&state.dashboard.state())))
}

#[put("/dashboard/hover/<id>?<x>&<y>")]
fn hover_route(
    state: &State<StateData>,
    id: PanelId,
    x: f64,
    y: f64,
) -> Result<Json<Option<Tooltip>>, api::Error> {
    state.dashboard.hover(id, x, y)?;
    Ok(Json(state.dashboard.tooltip()))
}

#[delete("/dashboard/hover")]
fn unhover_route(state: &State<StateData>) {
    state.dashboard.clear_hover();
}

#[get("/dashboard/tooltip")]
fn tooltip_route(state: &State<StateData>) -> Option<Json<Tooltip>> {
    state.dashboard.tooltip().map(Json)
}

#[get("/alerts")]
async fn alerts_route(state: &State<StateData>) -> Json<AlertList> {
    state.alerts.refresh().await;
    Json(state.alert_list())
}

#[post("/alerts", data = "<form>")]
async fn create_alert_route(
    state: &State<StateData>,
    form: Json<NewAlertForm>,
) -> Result<Json<AlertList>, api::Error> {
    state.alerts.create(&form).await?;
    Ok(Json(state.alert_list()))
}

#[delete("/alerts/<id>")]
async fn delete_alert_route(
    state: &State<StateData>,
    id: u64,
) -> Result<Json<AlertList>, api::Error> {
    state.alerts.delete(id).await?;
    Ok(Json(state.alert_list()))
}

#[post("/contact", data = "<form>")]
async fn contact_route(
    state: &State<StateData>,
    form: Json<ContactForm>,
) -> Result<&'static str, api::Error> {
    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| api::Error::MailError(String::from("contact form is not configured")))?;

    form.into_inner().submit(mailer).await?;
    Ok("Message sent successfully!")
}

#[get("/metrics")]
fn metrics_route(state: &State<StateData>) -> Result<String, api::Error> {
    metrics::collect(&state.dashboard.state(), state.alerts.alerts().len());
    metrics::read()
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = read_settings()?;
    let api = api::api(&settings.api_url)?;
    log::info!("polling panels from {}", api.api_url);

    let intervals = Intervals {
        panels: Duration::from_secs(settings.panel_interval),
        measurements: Duration::from_secs(settings.measurement_interval),
    };
    let alerts = AlertBoard::new(api.clone());
    alerts.refresh().await;

    let state = StateData {
        dashboard: Dashboard::start(api, intervals),
        alerts,
        mailer: mailer(&settings)?,
    };

    let _rocket = rocket::build()
        .manage(state)
        .mount(
            "/",
            routes![
                dashboard_route,
                select_route,
                chart_route,
                hover_route,
                unhover_route,
                tooltip_route,
                alerts_route,
                create_alert_route,
                delete_alert_route,
                contact_route,
                metrics_route
            ],
        )
        .launch()
        .await?;

    Ok(())
}
