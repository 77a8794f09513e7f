//! Paginated PDF reports for personal-finance data.
//!
//! A [`ReportGenerator`] turns [`ReportData`] into PDF bytes, either by
//! slicing a captured [`VisualElement`] into pages or by drawing the report
//! with text and rule primitives.

pub mod builder;
pub mod canvas;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod format;
pub mod generator;
pub mod model;
pub mod sections;
pub mod snapshot;
pub mod table;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use error::{CaptureError, ReportError};
pub use format::{Locale, NumericFormatter};
pub use generator::{GeneratorOptions, RenderStrategy, RenderedReport, ReportGenerator};
pub use model::{ReportData, ReportType, ReportVariant};
pub use snapshot::VisualElement;
