//! PDF report pipeline
//!
//! records → [`compose`] (layout + charts) → [`Document::finalize`] → [`encode`] → bytes

pub mod chart;
pub mod compose;
pub mod document;
pub mod encoder;
pub mod format;
pub mod layout;
pub mod metrics;
pub mod theme;

pub use chart::{ChartData, ChartKind, ChartRenderer, ChartStyle, Series};
pub use compose::{
    compose, AppointmentsData, GeneralData, HistoryData, HistoryEntry, PatientRecordData, ReportInput, ReportKind,
    SensorData,
};
pub use document::{Document, DrawOp, FooterStyle, Margins, Page, PageSize, RasterImage, A4};
pub use encoder::encode;
pub use layout::LayoutEngine;
