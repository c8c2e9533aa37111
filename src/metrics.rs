use prometheus::{Encoder, Gauge, GaugeVec, TextEncoder};
use solarview_rs::dashboard::DashboardState;
use solarview_rs::stats::{self, FleetStats};

lazy_static! {
    static ref TOTAL_WATTAGE_GAUGE: Gauge = register_gauge!(opts!(
        "fleet_total_wattage",
        "sum of rated power of all panels (in W)",
    ))
    .unwrap();
    static ref ACTIVE_FRACTION_GAUGE: Gauge = register_gauge!(opts!(
        "fleet_active_fraction",
        "share of panels reporting status Active",
    ))
    .unwrap();
    static ref AVERAGE_EFFICIENCY_GAUGE: Gauge = register_gauge!(opts!(
        "fleet_average_efficiency",
        "mean derived efficiency of all panels (in %)",
    ))
    .unwrap();
    static ref PANEL_WATTAGE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("panel_wattage", "rated power at maximum power point (in W)",),
        &["panel_id", "serial_number"],
    )
    .unwrap();
    static ref PANEL_EFFICIENCY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("panel_efficiency", "derived panel efficiency (in %)",),
        &["panel_id", "serial_number"],
    )
    .unwrap();
    static ref ALERTS_GAUGE: Gauge =
        register_gauge!(opts!("alerts", "number of open alerts",)).unwrap();
}

/// Feed the current dashboard state and alert count to the Prometheus registry.
pub fn collect(state: &DashboardState, alert_count: usize) {
    let fleet = FleetStats::of(state.panels());

    TOTAL_WATTAGE_GAUGE.set(fleet.total_wattage);
    ACTIVE_FRACTION_GAUGE.set(fleet.active_fraction);
    AVERAGE_EFFICIENCY_GAUGE.set(fleet.average_efficiency);
    ALERTS_GAUGE.set(alert_count as f64);

    /* panels that left the snapshot must not keep reporting */
    PANEL_WATTAGE_GAUGE.reset();
    PANEL_EFFICIENCY_GAUGE.reset();
    for panel in state.panels() {
        let id = panel.id.to_string();
        let labels = [id.as_str(), panel.serial_number.as_str()];

        PANEL_WATTAGE_GAUGE
            .with_label_values(&labels)
            .set(stats::wattage(panel));
        PANEL_EFFICIENCY_GAUGE
            .with_label_values(&labels)
            .set(stats::efficiency_percent(panel));
    }
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, solarview_rs::Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode(&metric_families, &mut buffer)
        .or(Err(solarview_rs::Error::FormatError))?;
    String::from_utf8(buffer).or(Err(solarview_rs::Error::FormatError))
}
