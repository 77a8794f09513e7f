//! Turns laid-out pages into PDF bytes through `genpdf`.

use genpdf::{self, Size};

use crate::canvas::{Page, PageGeometry};
use crate::elements::{mm_from_f64, RecordedPages};
use crate::error::ReportError;
use crate::fonts;

/// Builder for the final PDF of a report.
pub struct DocumentBuilder {
    title: String,
    geometry: PageGeometry,
    pages: Vec<Page>,
}

impl DocumentBuilder {
    /// Creates a builder for a document with the given metadata title.
    pub fn new(title: impl Into<String>, geometry: PageGeometry) -> Self {
        Self {
            title: title.into(),
            geometry,
            pages: Vec::new(),
        }
    }

    /// Appends pages and returns the updated builder.
    pub fn with_pages(mut self, pages: impl IntoIterator<Item = Page>) -> Self {
        self.pages.extend(pages);
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Builds the `genpdf` document. Fonts are resolved here.
    fn build(self) -> Result<genpdf::Document, ReportError> {
        let font_family = fonts::default_font_family().map_err(ReportError::FontLoad)?;
        let mut document = genpdf::Document::new(font_family);

        document.set_title(self.title);
        document.set_paper_size(Size::new(
            mm_from_f64(self.geometry.width),
            mm_from_f64(self.geometry.height),
        ));
        document.set_minimal_conformance();
        document.push(RecordedPages::new(self.pages, self.geometry));
        Ok(document)
    }

    /// Renders the document into memory.
    pub fn render(self) -> Result<Vec<u8>, ReportError> {
        let page_count = self.page_count();
        let document = self.build()?;

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(ReportError::Pdf)?;
        log::debug!("builder: rendered {} page(s), {} bytes", page_count, bytes.len());
        Ok(bytes)
    }
}
