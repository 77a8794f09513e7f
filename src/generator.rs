//! Report generation entry point.
//!
//! [`ReportGenerator`] picks one of two [`DocumentRenderer`] strategies:
//! the snapshot renderer when a [`VisualElement`] is supplied, and the
//! programmatic renderer otherwise. A failed capture is never surfaced to the
//! caller; the generator logs it and renders programmatically instead.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use crate::builder::DocumentBuilder;
use crate::canvas::{DocumentCanvas, Page, PageGeometry};
use crate::error::{CaptureError, ReportError};
use crate::format::{Locale, NumericFormatter};
use crate::model::{ReportData, ReportType, ReportVariant};
use crate::sections::{self, HeaderInfo};
use crate::snapshot::{self, VisualElement};
use crate::table::{TableOptions, TableRenderer, TABLE_TITLE};

/// Default document title printed in the header and stored as PDF metadata.
pub const DEFAULT_TITLE: &str = "Financial report";
/// Default footer text.
pub const DEFAULT_FOOTER: &str = "Generated by Finance Dashboard";

/// Options shared by every document a generator produces.
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    locale: Locale,
    table: TableOptions,
    title: String,
    footer_text: String,
    generated_at: Option<NaiveDateTime>,
    bookmarks: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            table: TableOptions::default(),
            title: DEFAULT_TITLE.to_owned(),
            footer_text: DEFAULT_FOOTER.to_owned(),
            generated_at: None,
            bookmarks: false,
        }
    }
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the locale used for amounts, percentages and dates.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the number of transaction rows printed before the rest is summarized.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.table.max_rows = max_rows;
        self
    }

    /// Sets the number of description characters kept per table row.
    pub fn with_description_chars(mut self, description_chars: usize) -> Self {
        self.table.description_chars = description_chars;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_footer_text(mut self, footer_text: impl Into<String>) -> Self {
        self.footer_text = footer_text.into();
        self
    }

    /// Pins the generation timestamp instead of reading the local clock.
    pub fn with_generated_at(mut self, generated_at: impl Into<Option<NaiveDateTime>>) -> Self {
        self.generated_at = generated_at.into();
        self
    }

    /// Requests PDF outline entries for the report sections. Only effective
    /// with the `bookmarks` feature.
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn table(&self) -> TableOptions {
        self.table
    }
}

/// Which strategy produced a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStrategy {
    Snapshot,
    Programmatic,
}

/// First page of a named report section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionMark {
    pub title: String,
    /// 1-based page number.
    pub page_number: usize,
}

/// Pages produced by a renderer, before conversion to PDF.
#[derive(Debug)]
pub struct LaidOutDocument {
    pub pages: Vec<Page>,
    pub sections: Vec<SectionMark>,
}

/// Inputs available to a renderer.
pub struct RenderContext<'a> {
    pub report: &'a ReportData,
    pub formatter: &'a NumericFormatter,
    pub options: &'a GeneratorOptions,
    pub geometry: PageGeometry,
    pub generated_at: NaiveDateTime,
}

/// A strategy that lays out a report into pages.
pub trait DocumentRenderer {
    type Error: std::error::Error;

    fn render(&self, context: &RenderContext<'_>) -> Result<LaidOutDocument, Self::Error>;
}

/// Draws the report with text and rule primitives on a [`DocumentCanvas`].
#[derive(Clone, Debug, Default)]
pub struct ProgrammaticRenderer {
    table: TableRenderer,
}

impl ProgrammaticRenderer {
    pub fn new(table: TableOptions) -> Self {
        Self {
            table: TableRenderer::new(table),
        }
    }
}

impl DocumentRenderer for ProgrammaticRenderer {
    type Error = ReportError;

    fn render(&self, context: &RenderContext<'_>) -> Result<LaidOutDocument, ReportError> {
        let report = context.report;
        report.validate()?;

        let mut canvas = DocumentCanvas::new(context.geometry);
        let formatter = context.formatter;
        sections::render_header(
            &mut canvas,
            &HeaderInfo {
                title: &context.options.title,
                report_type: report.report_type,
                period: report.period,
                generated_at: context.generated_at,
            },
            formatter,
        );

        let summary_page = match &report.variant {
            ReportVariant::MonthlySummary(summary) => {
                sections::render_monthly_summary(&mut canvas, summary, formatter)
            }
            ReportVariant::CategoryBreakdown(categories) => {
                sections::render_category_breakdown(&mut canvas, categories, formatter)
            }
            ReportVariant::BudgetVsActual(budgets) => {
                sections::render_budget_vs_actual(&mut canvas, budgets, formatter)
            }
        };

        let table = self.table.render(&mut canvas, &report.transactions, formatter);
        debug!(
            "programmatic: {} rows, {} omitted, table on {} page(s)",
            table.rows_rendered, table.omitted, table.pages_touched
        );

        sections::render_footer(&mut canvas, &context.options.footer_text);

        Ok(LaidOutDocument {
            pages: canvas.into_pages(),
            sections: vec![
                SectionMark {
                    title: report.report_type.label().to_owned(),
                    page_number: summary_page,
                },
                SectionMark {
                    title: TABLE_TITLE.to_owned(),
                    page_number: table.start_page,
                },
            ],
        })
    }
}

/// Paginates a captured [`VisualElement`].
pub struct SnapshotRenderer<'e> {
    element: &'e dyn VisualElement,
}

impl<'e> SnapshotRenderer<'e> {
    pub fn new(element: &'e dyn VisualElement) -> Self {
        Self { element }
    }
}

impl DocumentRenderer for SnapshotRenderer<'_> {
    type Error = CaptureError;

    fn render(&self, context: &RenderContext<'_>) -> Result<LaidOutDocument, CaptureError> {
        let pages = snapshot::capture_and_paginate(self.element, &context.geometry)?;
        Ok(LaidOutDocument {
            pages,
            sections: Vec::new(),
        })
    }
}

/// A finished PDF report.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub page_count: usize,
    pub strategy: RenderStrategy,
    pub sections: Vec<SectionMark>,
}

impl RenderedReport {
    /// Writes the PDF into `directory` under [`RenderedReport::file_name`].
    pub fn write_to(&self, directory: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let path = directory.as_ref().join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!("saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Output file name: `report-{type}-{YYYY-MM-DD}.pdf`.
pub fn report_file_name(report_type: ReportType, generated_on: NaiveDate) -> String {
    format!(
        "report-{}-{}.pdf",
        report_type.as_str(),
        generated_on.format("%Y-%m-%d")
    )
}

/// Produces PDF documents from [`ReportData`].
#[derive(Clone, Debug, Default)]
pub struct ReportGenerator {
    options: GeneratorOptions,
}

impl ReportGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Lays out `report` without producing PDF bytes.
    ///
    /// With a visual element the snapshot strategy is tried first; when the
    /// capture fails the programmatic strategy is used instead.
    pub fn layout(
        &self,
        report: &ReportData,
        element: Option<&dyn VisualElement>,
    ) -> Result<(LaidOutDocument, RenderStrategy), ReportError> {
        self.layout_at(report, element, self.generated_at())
    }

    fn layout_at(
        &self,
        report: &ReportData,
        element: Option<&dyn VisualElement>,
        generated_at: NaiveDateTime,
    ) -> Result<(LaidOutDocument, RenderStrategy), ReportError> {
        report.validate()?;

        let formatter = NumericFormatter::new(self.options.locale.clone());
        let context = RenderContext {
            report,
            formatter: &formatter,
            options: &self.options,
            geometry: PageGeometry::A4,
            generated_at,
        };

        if let Some(element) = element {
            match SnapshotRenderer::new(element).render(&context) {
                Ok(document) => return Ok((document, RenderStrategy::Snapshot)),
                Err(err) => warn!(
                    "snapshot rendering failed, falling back to programmatic rendering: {}",
                    err
                ),
            }
        }

        let renderer = ProgrammaticRenderer::new(self.options.table);
        Ok((renderer.render(&context)?, RenderStrategy::Programmatic))
    }

    /// Lays out and renders `report` into PDF bytes.
    pub fn generate(
        &self,
        report: &ReportData,
        element: Option<&dyn VisualElement>,
    ) -> Result<RenderedReport, ReportError> {
        let generated_at = self.generated_at();
        let (document, strategy) = self.layout_at(report, element, generated_at)?;

        let page_count = document.pages.len();
        let bytes = DocumentBuilder::new(self.options.title.clone(), PageGeometry::A4)
            .with_pages(document.pages)
            .render()?;
        let bytes = self.apply_bookmarks(bytes, &document.sections)?;

        info!(
            "generated {} report: {} page(s) via {:?} rendering",
            report.report_type, page_count, strategy
        );
        Ok(RenderedReport {
            bytes,
            file_name: report_file_name(report.report_type, generated_at.date()),
            page_count,
            strategy,
            sections: document.sections,
        })
    }

    /// Generates the report and writes it into `directory`.
    pub fn save(
        &self,
        report: &ReportData,
        element: Option<&dyn VisualElement>,
        directory: impl AsRef<Path>,
    ) -> Result<PathBuf, ReportError> {
        self.generate(report, element)?.write_to(directory)
    }

    fn generated_at(&self) -> NaiveDateTime {
        self.options
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local())
    }

    #[cfg(feature = "bookmarks")]
    fn apply_bookmarks(&self, bytes: Vec<u8>, sections: &[SectionMark]) -> Result<Vec<u8>, ReportError> {
        if self.options.bookmarks {
            Ok(crate::bookmarks::apply_section_bookmarks(&bytes, sections)?)
        } else {
            Ok(bytes)
        }
    }

    #[cfg(not(feature = "bookmarks"))]
    fn apply_bookmarks(&self, bytes: Vec<u8>, _sections: &[SectionMark]) -> Result<Vec<u8>, ReportError> {
        if self.options.bookmarks {
            warn!("bookmarks requested but the `bookmarks` feature is disabled");
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_type_and_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
        assert_eq!(
            report_file_name(ReportType::BudgetVsActual, date),
            "report-budget_vs_actual-2024-07-03.pdf"
        );
    }

    #[test]
    fn options_builder_updates_table_limits() {
        let options = GeneratorOptions::new()
            .with_max_rows(10)
            .with_description_chars(15);
        assert_eq!(
            options.table(),
            TableOptions {
                max_rows: 10,
                description_chars: 15,
            }
        );
    }

    #[test]
    fn generator_keeps_configured_locale() {
        let generator = ReportGenerator::new(GeneratorOptions::new().with_locale(Locale::en_us()));
        assert_eq!(generator.options().locale().tag(), "en-US");
        assert_eq!(ReportGenerator::default().options().locale().tag(), "fr-FR");
    }
}
