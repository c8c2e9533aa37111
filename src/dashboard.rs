use crate::api::Error;
use crate::model::{HourlyAggregate, Measurement, Panel, PanelId};
use crate::poll::PollHandle;
use crate::selection::Selection;
use crate::view::{self, ChartView, DashboardView, Tooltip};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Where the dashboard reads panels and their readings from.
#[async_trait]
pub trait PanelSource: Send + Sync + 'static {
    async fn panels(&self) -> Result<Vec<Panel>, Error>;
    async fn measurements(&self, id: PanelId) -> Result<Vec<Measurement>, Error>;
    async fn performance(&self, id: PanelId) -> Result<Vec<HourlyAggregate>, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intervals {
    pub panels: Duration,
    pub measurements: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Intervals {
            panels: Duration::from_secs(60),
            measurements: Duration::from_secs(15 * 60),
        }
    }
}

/// Cursor position over a panel tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub panel_id: PanelId,
    pub x: f64,
    pub y: f64,
}

/// Everything the view is rendered from.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    panels: Vec<Panel>,
    selection: Selection,
    /* bumped whenever the selected id changes; fetches carry the value they started with */
    generation: u64,
    measurements: Vec<Measurement>,
    performance: Vec<HourlyAggregate>,
    chart_view: ChartView,
    hover: Option<Hover>,
    snapshot_error: Option<String>,
    measurement_error: Option<String>,
}

impl DashboardState {
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_id(&self) -> Option<PanelId> {
        self.selection.id()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn performance(&self) -> &[HourlyAggregate] {
        &self.performance
    }

    pub fn chart_view(&self) -> ChartView {
        self.chart_view
    }

    pub fn hover(&self) -> Option<Hover> {
        self.hover
    }

    pub fn snapshot_error(&self) -> Option<&str> {
        self.snapshot_error.as_deref()
    }

    pub fn measurement_error(&self) -> Option<&str> {
        self.measurement_error.as_deref()
    }

    fn selection_moved(&mut self, before: Option<PanelId>) -> bool {
        if self.selection.id() == before {
            return false;
        }
        self.generation += 1;
        /* the previous window belongs to another panel */
        self.measurements.clear();
        self.performance.clear();
        self.measurement_error = None;
        true
    }

    /// Replace the panel collection with `snapshot` and reconcile the selection.
    ///
    /// Returns `true` when the selected id changed, i.e. the measurement poller must be rebound.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Panel>) -> bool {
        let before = self.selection.id();

        self.selection = std::mem::take(&mut self.selection).reconcile(&snapshot);
        if let Some(hover) = self.hover {
            if !snapshot.iter().any(|p| p.id == hover.panel_id) {
                self.hover = None;
            }
        }
        self.panels = snapshot;
        self.snapshot_error = None;

        self.selection_moved(before)
    }

    /// Keep the previous collection; remember the failure for the view.
    pub fn fail_snapshot(&mut self, error: &Error) {
        self.snapshot_error = Some(error.to_string());
    }

    /// Select panel `id` from the current snapshot. Returns `true` when the selected id changed.
    pub fn select(&mut self, id: PanelId) -> Result<bool, Error> {
        let selection = Selection::choose(&self.panels, id).ok_or(Error::UnknownPanel(id))?;
        let before = self.selection.id();
        self.selection = selection;
        Ok(self.selection_moved(before))
    }

    /// Apply the result of a measurement fetch started under `generation`.
    ///
    /// Responses from an older generation are dropped and `false` is returned. A failed fetch
    /// clears the corresponding series.
    pub fn apply_measurements(
        &mut self,
        generation: u64,
        series: Result<Vec<Measurement>, Error>,
        hours: Result<Vec<HourlyAggregate>, Error>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        self.measurement_error = None;
        match series {
            Ok(series) => self.measurements = series,
            Err(e) => {
                log::error!("Failed to fetch measurements: {}", e);
                self.measurements.clear();
                self.measurement_error = Some(e.to_string());
            }
        }
        match hours {
            Ok(hours) => self.performance = hours,
            Err(e) => {
                log::error!("Failed to fetch hourly performance: {}", e);
                self.performance.clear();
                self.measurement_error.get_or_insert_with(|| e.to_string());
            }
        }
        true
    }

    pub fn set_chart_view(&mut self, view: ChartView) {
        self.chart_view = view;
    }

    pub fn set_hover(&mut self, panel_id: PanelId, x: f64, y: f64) -> Result<(), Error> {
        if self.panel(panel_id).is_none() {
            return Err(Error::UnknownPanel(panel_id));
        }
        self.hover = Some(Hover { panel_id, x, y });
        Ok(())
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
    }
}

#[derive(Default)]
struct Inner {
    state: DashboardState,
    measurement_task: Option<PollHandle>,
}

struct Shared<S> {
    source: S,
    intervals: Intervals,
    inner: Mutex<Inner>,
}

impl<S> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Spawn a measurement poller bound to the current selection, dropping (and thereby aborting)
/// the one bound to the previous selection.
fn rebind_measurements<S: PanelSource>(shared: &Arc<Shared<S>>, inner: &mut Inner) {
    let selected = inner.state.selected_id();
    let generation = inner.state.generation();

    inner.measurement_task = selected.map(|id| {
        let weak = Arc::downgrade(shared);
        PollHandle::spawn(
            format!("measurements[{}]", id),
            shared.intervals.measurements,
            move || {
                let weak = weak.clone();
                async move {
                    if let Some(shared) = weak.upgrade() {
                        refresh_measurements(&shared, id, generation).await;
                    }
                }
            },
        )
    });
}

async fn refresh_panels<S: PanelSource>(shared: &Arc<Shared<S>>) {
    let result = shared.source.panels().await;

    let mut inner = shared.lock();
    match result {
        Ok(snapshot) => {
            log::debug!("received snapshot of {} panels", snapshot.len());
            if inner.state.apply_snapshot(snapshot) {
                log::info!("selected panel is now {:?}", inner.state.selected_id());
                rebind_measurements(shared, &mut inner);
            }
        }
        Err(e) => {
            log::error!("Failed to refresh panels: {}", e);
            inner.state.fail_snapshot(&e);
        }
    }
}

async fn refresh_measurements<S: PanelSource>(
    shared: &Arc<Shared<S>>,
    id: PanelId,
    generation: u64,
) {
    let (series, hours) = tokio::join!(
        shared.source.measurements(id),
        shared.source.performance(id)
    );

    let mut inner = shared.lock();
    if !inner.state.apply_measurements(generation, series, hours) {
        log::debug!(
            "discarding measurements of panel {} fetched for an earlier selection",
            id
        );
    }
}

/// Live dashboard: polls the panel snapshot and the selected panel's measurements until dropped.
pub struct Dashboard<S: PanelSource> {
    shared: Arc<Shared<S>>,
    _snapshots: PollHandle,
}

impl<S: PanelSource> Dashboard<S> {
    pub fn start(source: S, intervals: Intervals) -> Self {
        let shared = Arc::new(Shared {
            source,
            intervals,
            inner: Mutex::new(Inner::default()),
        });

        let weak = Arc::downgrade(&shared);
        let snapshots = PollHandle::spawn("panels", intervals.panels, move || {
            let weak = weak.clone();
            async move {
                if let Some(shared) = weak.upgrade() {
                    refresh_panels(&shared).await;
                }
            }
        });

        Dashboard {
            shared,
            _snapshots: snapshots,
        }
    }

    pub fn select(&self, id: PanelId) -> Result<(), Error> {
        let mut inner = self.shared.lock();
        if inner.state.select(id)? {
            log::info!("panel {} selected", id);
            rebind_measurements(&self.shared, &mut inner);
        }
        Ok(())
    }

    pub fn set_chart_view(&self, view: ChartView) {
        self.shared.lock().state.set_chart_view(view);
    }

    pub fn hover(&self, panel_id: PanelId, x: f64, y: f64) -> Result<(), Error> {
        self.shared.lock().state.set_hover(panel_id, x, y)
    }

    pub fn clear_hover(&self) {
        self.shared.lock().state.clear_hover();
    }

    pub fn state(&self) -> DashboardState {
        self.shared.lock().state.clone()
    }

    pub fn render(&self) -> DashboardView {
        view::render(&self.shared.lock().state)
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        view::tooltip(&self.shared.lock().state)
    }
}

impl<S: PanelSource> Drop for Dashboard<S> {
    fn drop(&mut self) {
        let measurement_task = self.shared.lock().measurement_task.take();
        drop(measurement_task);
    }
}
