//! View models of the dashboard. Everything here is a pure function of [`DashboardState`].

use crate::api::Error;
use crate::dashboard::DashboardState;
use crate::model::{Alert, Panel, PanelId};
use crate::stats::{self, FleetStats};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::str::FromStr;

/* tooltip is drawn this far right and below the cursor */
const TOOLTIP_OFFSET: f64 = 10.0;
const UNSELECTED_BORDER: &str = "transparent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartView {
    Power,
    Electrical,
    Temperature,
    PerformanceRatio,
    Hourly,
}

impl Default for ChartView {
    fn default() -> Self {
        ChartView::Power
    }
}

impl FromStr for ChartView {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power" => Ok(ChartView::Power),
            "electrical" => Ok(ChartView::Electrical),
            "temperature" => Ok(ChartView::Temperature),
            "performance-ratio" => Ok(ChartView::PerformanceRatio),
            "hourly" => Ok(ChartView::Hourly),
            other => Err(Error::ValidationError(format!(
                "Unknown chart view: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    pub timestamp: DateTime<Utc>,
    pub power: f64,
    pub temperature: f64,
    pub performance_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub panel_count: usize,
    pub active_panels: usize,
    pub active_percent: f64,
    pub total_wattage: f64,
    pub average_efficiency: f64,
    pub latest: Option<LatestReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelTile {
    pub id: PanelId,
    pub serial_number: String,
    pub status: String,
    pub status_color: &'static str,
    pub selected: bool,
    pub border_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub tiles: Vec<PanelTile>,
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub panel_id: PanelId,
    pub left: f64,
    pub top: f64,
    pub title: String,
    pub orientation: f64,
    pub inclination: f64,
    pub voltage_voc: f64,
    pub voltage_vmp: f64,
    pub current_isc: f64,
    pub current_imp: f64,
    pub wattage: f64,
    pub installed: Option<String>,
    pub status: String,
    pub status_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDetail {
    pub id: PanelId,
    pub heading: String,
    pub status: String,
    pub status_color: &'static str,
    pub orientation: f64,
    pub inclination: f64,
    pub voltage_voc: f64,
    pub voltage_vmp: f64,
    pub current_isc: f64,
    pub current_imp: f64,
    pub wattage: f64,
    pub efficiency: f64,
    pub installation_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub t: DateTime<Utc>,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: &'static str,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub view: ChartView,
    pub title: &'static str,
    pub unit: &'static str,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub summary: Summary,
    pub grid: Grid,
    pub detail: Option<PanelDetail>,
    pub tooltip: Option<Tooltip>,
    pub chart: Chart,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCard {
    pub id: u64,
    pub alert_type: String,
    pub description: String,
    pub severity: String,
    pub color: &'static str,
    pub created: Option<String>,
    pub panel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertList {
    pub count: usize,
    pub alerts: Vec<AlertCard>,
    pub message: Option<&'static str>,
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Human-readable name of panel `id`: its serial number when the snapshot knows it.
pub fn panel_label(panels: &[Panel], id: PanelId) -> String {
    panels
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.serial_number.clone())
        .unwrap_or_else(|| format!("Panel #{}", id))
}

pub fn summary(state: &DashboardState) -> Summary {
    let fleet = FleetStats::of(state.panels());

    Summary {
        panel_count: fleet.panel_count,
        active_panels: fleet.active_count,
        active_percent: round_to(fleet.active_fraction * 100.0, 1),
        total_wattage: fleet.total_wattage.round(),
        average_efficiency: round_to(fleet.average_efficiency, 1),
        latest: stats::latest(state.measurements()).map(|m| LatestReading {
            timestamp: m.timestamp,
            power: round_to(stats::measurement_power(m), 1),
            temperature: m.temperature,
            performance_ratio: m.performance_ratio,
        }),
    }
}

pub fn grid(state: &DashboardState) -> Grid {
    let selected = state.selected_id();
    let tiles: Vec<PanelTile> = state
        .panels()
        .iter()
        .map(|p| {
            let is_selected = selected == Some(p.id);
            PanelTile {
                id: p.id,
                serial_number: p.serial_number.clone(),
                status: p.status.name().to_owned(),
                status_color: p.status.color(),
                selected: is_selected,
                border_color: if is_selected {
                    p.status.color()
                } else {
                    UNSELECTED_BORDER
                },
            }
        })
        .collect();

    let message = if tiles.is_empty() {
        Some("Loading panels...")
    } else {
        None
    };
    Grid { tiles, message }
}

pub fn tooltip(state: &DashboardState) -> Option<Tooltip> {
    let hover = state.hover()?;
    let panel = state.panel(hover.panel_id)?;

    Some(Tooltip {
        panel_id: panel.id,
        left: hover.x + TOOLTIP_OFFSET,
        top: hover.y + TOOLTIP_OFFSET,
        title: format!("{} ({})", panel.model, panel.serial_number),
        orientation: panel.orientation,
        inclination: panel.inclination,
        voltage_voc: panel.voltage_voc,
        voltage_vmp: panel.voltage_vmp,
        current_isc: panel.current_isc,
        current_imp: panel.current_imp,
        wattage: stats::wattage(panel).round(),
        installed: panel.installation_date.map(format_date),
        status: panel.status.name().to_owned(),
        status_color: panel.status.color(),
    })
}

pub fn detail(state: &DashboardState) -> Option<PanelDetail> {
    let panel = state.selection().panel()?;

    Some(PanelDetail {
        id: panel.id,
        heading: format!("{} - {}", panel.serial_number, panel.model),
        status: panel.status.name().to_owned(),
        status_color: panel.status.color(),
        orientation: panel.orientation,
        inclination: panel.inclination,
        voltage_voc: panel.voltage_voc,
        voltage_vmp: panel.voltage_vmp,
        current_isc: panel.current_isc,
        current_imp: panel.current_imp,
        wattage: stats::wattage(panel).round(),
        efficiency: round_to(stats::efficiency_percent(panel), 1),
        installation_date: panel.installation_date.map(format_date),
    })
}

pub fn chart(state: &DashboardState) -> Chart {
    let series_of = |label, value: &dyn Fn(&crate::model::Measurement) -> f64| Series {
        label,
        points: state
            .measurements()
            .iter()
            .map(|m| Point {
                t: m.timestamp,
                y: value(m),
            })
            .collect(),
    };
    let hourly_of = |label, value: &dyn Fn(&crate::model::HourlyAggregate) -> f64| Series {
        label,
        points: state
            .performance()
            .iter()
            .map(|h| Point {
                t: h.hour,
                y: value(h),
            })
            .collect(),
    };

    let view = state.chart_view();
    let (title, unit, series) = match view {
        ChartView::Power => (
            "Power output",
            "W",
            vec![series_of("Power", &stats::measurement_power)],
        ),
        ChartView::Electrical => (
            "Voltage and current",
            "V / A",
            vec![
                series_of("Voltage", &|m| m.voltage),
                series_of("Current", &|m| m.current),
            ],
        ),
        ChartView::Temperature => (
            "Temperature",
            "°C",
            vec![series_of("Temperature", &|m| m.temperature)],
        ),
        ChartView::PerformanceRatio => (
            "Performance ratio",
            "ratio",
            vec![series_of("Performance ratio", &|m| m.performance_ratio)],
        ),
        ChartView::Hourly => (
            "Hourly performance",
            "W / ratio",
            vec![
                hourly_of("Average power", &|h| h.avg_voltage * h.avg_current),
                hourly_of("Average performance ratio", &|h| h.avg_performance_ratio),
            ],
        ),
    };

    Chart {
        view,
        title,
        unit,
        series,
    }
}

pub fn render(state: &DashboardState) -> DashboardView {
    let errors = state
        .snapshot_error()
        .into_iter()
        .chain(state.measurement_error())
        .map(str::to_owned)
        .collect();

    DashboardView {
        summary: summary(state),
        grid: grid(state),
        detail: detail(state),
        tooltip: tooltip(state),
        chart: chart(state),
        errors,
    }
}

pub fn alert_list(alerts: &[Alert], panels: &[Panel]) -> AlertList {
    let cards: Vec<AlertCard> = alerts
        .iter()
        .map(|a| AlertCard {
            id: a.id,
            alert_type: a.alert_type.clone(),
            description: a.description.clone(),
            severity: a.severity.name().to_owned(),
            color: a.severity.color(),
            created: a.created_at.map(|ts| format_date(ts.date_naive())),
            panel: panel_label(panels, a.panel_id),
        })
        .collect();

    AlertList {
        count: cards.len(),
        message: if cards.is_empty() {
            Some("No alerts found.")
        } else {
            None
        },
        alerts: cards,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{HourlyAggregate, Measurement, PanelStatus, Severity};
    use crate::stats::test::panel;
    use chrono::TimeZone;

    fn state_with(panels: Vec<Panel>) -> DashboardState {
        let mut state = DashboardState::default();
        state.apply_snapshot(panels);
        state
    }

    fn reading(minute: u32, voltage: f64, current: f64) -> Measurement {
        Measurement {
            panel_id: Some(1),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 9, minute, 0).unwrap(),
            voltage,
            current,
            temperature: 25.0 + minute as f64,
            performance_ratio: 0.8,
        }
    }

    #[test]
    fn single_panel_dashboard() {
        let state = state_with(vec![panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)]);
        let view = render(&state);

        assert_eq!(150.0, view.summary.total_wattage);
        assert_eq!(100.0, view.summary.active_percent);
        assert_eq!(17.4, view.summary.average_efficiency);

        let detail = view.detail.unwrap();
        assert_eq!("SP1001 - X22", detail.heading);
        assert_eq!(150.0, detail.wattage);
        assert_eq!(17.4, detail.efficiency);
        assert!(view.errors.is_empty());
    }

    #[test]
    fn empty_grid_is_loading() {
        let view = render(&DashboardState::default());

        assert_eq!(Some("Loading panels..."), view.grid.message);
        assert_eq!(0.0, view.summary.active_percent);
        assert!(view.detail.is_none());
        assert!(view.chart.series[0].points.is_empty());
    }

    #[test]
    fn selected_tile_uses_status_border() {
        let mut state = state_with(vec![
            panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
            panel(2, PanelStatus::Faulty, 30.0, 5.0, 36.0, 6.0),
        ]);
        state.select(2).unwrap();
        let grid = grid(&state);

        assert_eq!("transparent", grid.tiles[0].border_color);
        assert!(grid.tiles[1].selected);
        assert_eq!("#dc3545", grid.tiles[1].border_color);
    }

    #[test]
    fn tooltip_follows_cursor() {
        let mut state = state_with(vec![
            panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
            panel(2, PanelStatus::Warning, 31.3, 9.33, 37.0, 10.0),
        ]);
        assert!(tooltip(&state).is_none());

        state.set_hover(2, 200.0, 50.0).unwrap();
        let tip = tooltip(&state).unwrap();

        assert_eq!(210.0, tip.left);
        assert_eq!(60.0, tip.top);
        assert_eq!("X22 (SP1002)", tip.title);
        assert_eq!(292.0, tip.wattage);
        assert_eq!("#ffc107", tip.status_color);

        state.clear_hover();
        assert!(tooltip(&state).is_none());
    }

    #[test]
    fn chart_views_switch_series() {
        let mut state = state_with(vec![panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)]);
        let generation = state.generation();
        state.apply_measurements(
            generation,
            Ok(vec![reading(0, 30.0, 5.0), reading(15, 29.0, 4.0)]),
            Ok(vec![HourlyAggregate {
                hour: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
                avg_voltage: 29.5,
                avg_current: 4.0,
                avg_temperature: 30.0,
                avg_performance_ratio: 0.79,
            }]),
        );

        let power = chart(&state);
        assert_eq!(ChartView::Power, power.view);
        assert_eq!(
            vec![150.0, 116.0],
            power.series[0].points.iter().map(|p| p.y).collect::<Vec<_>>()
        );

        state.set_chart_view(ChartView::Electrical);
        let electrical = chart(&state);
        assert_eq!(2, electrical.series.len());
        assert_eq!("Current", electrical.series[1].label);

        state.set_chart_view("hourly".parse().unwrap());
        let hourly = chart(&state);
        assert_eq!(118.0, hourly.series[0].points[0].y);
        assert_eq!(0.79, hourly.series[1].points[0].y);

        let latest = summary(&state).latest.unwrap();
        assert_eq!(116.0, latest.power);
        assert_eq!(40.0, latest.temperature);
    }

    #[test]
    fn unknown_chart_view() {
        assert!("pie".parse::<ChartView>().is_err());
        assert_eq!(Ok(ChartView::PerformanceRatio), "performance-ratio".parse());
    }

    #[test]
    fn errors_are_surfaced() {
        let mut state = state_with(vec![panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)]);
        state.fail_snapshot(&Error::ApiError(String::from("connection refused")));

        let view = render(&state);
        assert_eq!(1, view.errors.len());
        assert_eq!(1, view.grid.tiles.len());
    }

    #[test]
    fn status_and_severity_colors() {
        assert_eq!("#28a745", PanelStatus::Active.color());
        assert_eq!("#ffc107", PanelStatus::Warning.color());
        assert_eq!("#dc3545", PanelStatus::Faulty.color());
        assert_eq!("#6c757d", PanelStatus::from("Offline").color());

        assert_eq!("green", Severity::Info.color());
        assert_eq!("orange", Severity::Warning.color());
        assert_eq!("red", Severity::Critical.color());
        assert_eq!("gray", Severity::from("Emergency").color());
    }

    #[test]
    fn alert_cards() {
        let panels = vec![panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)];
        let alerts = vec![
            Alert {
                id: 3,
                alert_type: String::from("Overheating"),
                description: String::from("Too hot"),
                severity: Severity::Critical,
                panel_id: 1,
                status: String::from("Active"),
                created_at: Some(Utc.with_ymd_and_hms(2025, 5, 31, 12, 0, 0).unwrap()),
            },
            Alert {
                id: 4,
                alert_type: String::from("Low output"),
                description: String::new(),
                severity: Severity::from("Notice"),
                panel_id: 42,
                status: String::from("Active"),
                created_at: None,
            },
        ];
        let list = alert_list(&alerts, &panels);

        assert_eq!(2, list.count);
        assert_eq!("SP1001", list.alerts[0].panel);
        assert_eq!(Some(String::from("2025-05-31")), list.alerts[0].created);
        assert_eq!("Panel #42", list.alerts[1].panel);
        assert_eq!("gray", list.alerts[1].color);

        assert_eq!(Some("No alerts found."), alert_list(&[], &panels).message);
    }
}
