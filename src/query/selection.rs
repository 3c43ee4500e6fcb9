use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{DatasetSnapshot, PublishedDataset};
use crate::error::{ForecastError, Result};
use crate::models::{DisplayDomain, TimeSeriesPayload};
use crate::utils::constants::{CHART_PLACEHOLDER, STATION_ID_ALIASES};

/// A click on a station marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub station_id: String,
}

impl SelectionEvent {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
        }
    }

    /// Extract a selection from a click payload. Accepts `{"station_id": ..}`
    /// or a GeoJSON feature whose properties carry the id. Clicks on empty
    /// map space (null or id-less payloads) yield `None`.
    pub fn from_click_data(data: &Value) -> Option<Self> {
        if data.is_null() {
            return None;
        }

        let source = match data.get("properties") {
            Some(properties) if properties.is_object() => properties,
            _ => data,
        };

        STATION_ID_ALIASES
            .iter()
            .find_map(|key| source.get(*key).and_then(station_id_from_value))
            .map(Self::new)
    }
}

fn station_id_from_value(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SelectionState {
    #[default]
    Idle,
    Selected {
        station_id: String,
    },
}

impl SelectionState {
    pub fn selected_station(&self) -> Option<&str> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected { station_id } => Some(station_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartView {
    Placeholder { message: String },
    Series(TimeSeriesPayload),
}

/// Range slider state: the station's value bounds inside the absolute domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeControl {
    pub enabled: bool,
    pub value: [f64; 2],
    pub domain: [f64; 2],
}

impl RangeControl {
    pub fn disabled(domain: DisplayDomain) -> Self {
        Self {
            enabled: false,
            value: [0.0, 0.0],
            domain: domain.as_pair(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub chart: ChartView,
    pub range: RangeControl,
}

impl DashboardView {
    pub fn idle(domain: DisplayDomain) -> Self {
        Self {
            chart: ChartView::Placeholder {
                message: CHART_PLACEHOLDER.to_string(),
            },
            range: RangeControl::disabled(domain),
        }
    }

    fn series(payload: TimeSeriesPayload) -> Self {
        let range = RangeControl {
            enabled: true,
            value: payload.value_bounds,
            domain: payload.display_domain,
        };
        Self {
            chart: ChartView::Series(payload),
            range,
        }
    }
}

/// Apply one selection event. On an unknown station the caller keeps its
/// previous state.
pub fn transition(
    _state: &SelectionState,
    event: &SelectionEvent,
    snapshot: &DatasetSnapshot,
) -> Result<(SelectionState, DashboardView)> {
    let payload = snapshot.station_series(&event.station_id).ok_or_else(|| {
        ForecastError::SelectionNotFound {
            station_id: event.station_id.clone(),
        }
    })?;

    let state = SelectionState::Selected {
        station_id: event.station_id.clone(),
    };
    Ok((state, DashboardView::series(payload)))
}

/// Render the view for a state without changing it
pub fn render(state: &SelectionState, snapshot: &DatasetSnapshot) -> DashboardView {
    state
        .selected_station()
        .and_then(|id| snapshot.station_series(id))
        .map(DashboardView::series)
        .unwrap_or_else(|| DashboardView::idle(snapshot.display_domain()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResponse {
    pub state: SelectionState,
    pub view: DashboardView,
    pub warning: Option<String>,
}

/// Selection state for one session
#[derive(Debug, Default)]
pub struct SelectionHandler {
    state: SelectionState,
    generation: Option<u64>,
}

impl SelectionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn handle(
        &mut self,
        dataset: &PublishedDataset,
        event: Option<SelectionEvent>,
    ) -> SelectionResponse {
        if self.generation != Some(dataset.generation) {
            if self.generation.is_some() && self.state != SelectionState::Idle {
                tracing::debug!(
                    "Dataset generation changed to {}, resetting selection",
                    dataset.generation
                );
            }
            self.state = SelectionState::Idle;
            self.generation = Some(dataset.generation);
        }

        let snapshot = dataset.snapshot.as_ref();
        let Some(event) = event else {
            return SelectionResponse {
                state: self.state.clone(),
                view: render(&self.state, snapshot),
                warning: None,
            };
        };

        match transition(&self.state, &event, snapshot) {
            Ok((state, view)) => {
                self.state = state;
                SelectionResponse {
                    state: self.state.clone(),
                    view,
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!("{}", e);
                SelectionResponse {
                    state: self.state.clone(),
                    view: render(&self.state, snapshot),
                    warning: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::snapshot::fixtures::sample_snapshot;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn published(generation: u64) -> PublishedDataset {
        PublishedDataset {
            generation,
            snapshot: Arc::new(sample_snapshot()),
        }
    }

    #[test]
    fn test_click_data_parsing() {
        assert_eq!(
            SelectionEvent::from_click_data(&json!({"station_id": "96001"})),
            Some(SelectionEvent::new("96001"))
        );
        assert_eq!(
            SelectionEvent::from_click_data(&json!({
                "type": "Feature",
                "properties": {"lokasi": 96001}
            })),
            Some(SelectionEvent::new("96001"))
        );
        assert_eq!(SelectionEvent::from_click_data(&Value::Null), None);
        assert_eq!(SelectionEvent::from_click_data(&json!({"properties": {}})), None);
        assert_eq!(SelectionEvent::from_click_data(&json!({"station_id": " "})), None);
    }

    #[test]
    fn test_idle_view() {
        let snapshot = sample_snapshot();
        let view = render(&SelectionState::Idle, &snapshot);

        assert_eq!(
            view.chart,
            ChartView::Placeholder {
                message: CHART_PLACEHOLDER.to_string()
            }
        );
        assert_eq!(
            view.range,
            RangeControl {
                enabled: false,
                value: [0.0, 0.0],
                domain: [0.0, 38.0],
            }
        );
    }

    #[test]
    fn test_selection_emits_series_and_bounds() {
        let snapshot = sample_snapshot();
        let (state, view) =
            transition(&SelectionState::Idle, &SelectionEvent::new("96001"), &snapshot).unwrap();

        assert_eq!(state.selected_station(), Some("96001"));
        assert!(view.range.enabled);
        assert_eq!(view.range.value, [15.2, 16.8]);
        assert_eq!(view.range.domain, [0.0, 38.0]);
        match view.chart {
            ChartView::Series(payload) => assert_eq!(payload.points.len(), 2),
            other => panic!("expected series, got {:?}", other),
        }
    }

    #[test]
    fn test_reselection_is_idempotent() {
        let snapshot = sample_snapshot();
        let event = SelectionEvent::new("96001");

        let (first_state, first_view) = transition(&SelectionState::Idle, &event, &snapshot).unwrap();
        let (second_state, second_view) = transition(&first_state, &event, &snapshot).unwrap();

        assert_eq!(first_state, second_state);
        assert_eq!(first_view, second_view);
    }

    #[test]
    fn test_absent_station_leaves_state_unchanged() {
        let dataset = published(1);
        let mut handler = SelectionHandler::new();
        handler.handle(&dataset, Some(SelectionEvent::new("96001")));

        // metadata only, no summary
        let response = handler.handle(&dataset, Some(SelectionEvent::new("96002")));

        assert_eq!(response.state.selected_station(), Some("96001"));
        assert!(response.warning.unwrap().contains("96002"));
        assert!(response.view.range.enabled);

        let err = transition(
            &SelectionState::Idle,
            &SelectionEvent::new("missing"),
            &dataset.snapshot,
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::SelectionNotFound { .. }));
    }

    #[test]
    fn test_null_event_keeps_state() {
        let dataset = published(1);
        let mut handler = SelectionHandler::new();
        handler.handle(&dataset, Some(SelectionEvent::new("96001")));

        let response = handler.handle(&dataset, None);

        assert_eq!(response.state.selected_station(), Some("96001"));
        assert_eq!(response.warning, None);
    }

    #[test]
    fn test_reload_resets_to_idle() {
        let mut handler = SelectionHandler::new();
        handler.handle(&published(1), Some(SelectionEvent::new("96001")));
        assert_eq!(handler.state().selected_station(), Some("96001"));

        let response = handler.handle(&published(2), None);

        assert_eq!(response.state, SelectionState::Idle);
        assert!(!response.view.range.enabled);
    }
}
