pub mod selection;

pub use selection::{
    render, transition, ChartView, DashboardView, RangeControl, SelectionEvent, SelectionHandler,
    SelectionResponse, SelectionState,
};
