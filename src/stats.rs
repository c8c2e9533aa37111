//! Metrics derived from panel and measurement state. Recomputed on every render, never stored.

use crate::model::{Measurement, Panel, PanelStatus};
use serde::Serialize;

/// Efficiency is never reported below this percentage.
pub const EFFICIENCY_FLOOR: f64 = 15.0;
/// Efficiency reported for a panel running exactly at its open-circuit/short-circuit product.
pub const EFFICIENCY_SCALE: f64 = 25.0;

/// Power at the maximum power point, in watts.
pub fn wattage(panel: &Panel) -> f64 {
    panel.voltage_vmp * panel.current_imp
}

pub fn efficiency_percent(panel: &Panel) -> f64 {
    let theoretical = panel.voltage_voc * panel.current_isc;
    let denominator = if theoretical == 0.0 { 1.0 } else { theoretical };

    /* f64::max ignores NaN, so degenerate input also lands on the floor */
    EFFICIENCY_FLOOR.max(EFFICIENCY_SCALE * wattage(panel) / denominator)
}

pub fn measurement_power(measurement: &Measurement) -> f64 {
    measurement.voltage * measurement.current
}

pub fn latest(series: &[Measurement]) -> Option<&Measurement> {
    series.iter().max_by_key(|m| m.timestamp)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FleetStats {
    pub panel_count: usize,
    pub active_count: usize,
    pub total_wattage: f64,
    /// 0 when there are no panels
    pub active_fraction: f64,
    /// 0 when there are no panels
    pub average_efficiency: f64,
}

impl FleetStats {
    pub fn of(panels: &[Panel]) -> Self {
        let panel_count = panels.len();
        let active_count = panels
            .iter()
            .filter(|p| p.status == PanelStatus::Active)
            .count();
        let total_wattage = panels.iter().map(wattage).sum();

        let (active_fraction, average_efficiency) = if panel_count == 0 {
            (0.0, 0.0)
        } else {
            let n = panel_count as f64;
            (
                active_count as f64 / n,
                panels.iter().map(efficiency_percent).sum::<f64>() / n,
            )
        };

        FleetStats {
            panel_count,
            active_count,
            total_wattage,
            active_fraction,
            average_efficiency,
        }
    }
}
