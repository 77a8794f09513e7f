//! Error types returned by the report generator.

use thiserror::Error;

use crate::model::ReportType;

/// Errors that abort document generation. No partial document is produced when
/// any of these is returned.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The variant content does not belong to the declared report type.
    #[error("report declares type `{expected}` but carries `{found}` data")]
    VariantMismatch {
        expected: ReportType,
        found: ReportType,
    },

    /// The report payload could not be parsed.
    #[error("invalid report payload: {0}")]
    Json(#[from] serde_json::Error),

    /// No usable font family could be located.
    #[error("failed to load fonts: {0}")]
    FontLoad(#[source] genpdf::error::Error),

    /// The PDF backend failed while laying out or serializing the document.
    #[error("failed to render PDF: {0}")]
    Pdf(#[source] genpdf::error::Error),

    /// Writing the document to disk failed.
    #[error("failed to save report: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding the section outline failed.
    #[cfg(feature = "bookmarks")]
    #[error("failed to embed bookmarks: {0}")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),
}

/// Failure of the snapshot capture step. Always recovered by falling back to
/// programmatic rendering.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The visual element could not be rasterized.
    #[error("failed to capture visual element: {0}")]
    Capture(String),

    /// The captured image could not be decoded.
    #[error("failed to decode captured image: {0}")]
    Decode(#[from] image::ImageError),

    /// The captured image has no pixels to paginate.
    #[error("captured image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}
