//! Page geometry, the vertical layout cursor and the pages it produces.
//!
//! [`DocumentCanvas`] is the only place that decides whether content still fits
//! on the current page. Renderers record [`DrawCommand`]s at the cursor and move
//! the cursor explicitly with [`DocumentCanvas::advance`], which lets several
//! columns share one row. The recorded pages are independent of the PDF backend
//! and are converted into `genpdf` elements by [`crate::elements`].

use std::fmt;

use image::GenericImageView;

use crate::format::Rgb;

/// Fixed page dimensions in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    /// ISO A4 portrait with a 20 mm margin on every side.
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 20.0,
    };

    /// Lowest y position content may reach.
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.margin
    }

    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Height available between the top and bottom margins.
    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// x coordinate of the right margin.
    pub fn right_edge(&self) -> f64 {
        self.width - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Horizontal anchoring of a text command relative to its x coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Text starts at x.
    #[default]
    Left,
    /// Text is centered on x.
    Center,
    /// Text ends at x.
    Right,
}

/// Font attributes of a text command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: u8,
    pub bold: bool,
    pub color: Option<Rgb>,
    pub align: TextAlign,
}

impl TextStyle {
    pub const fn new(font_size: u8) -> Self {
        Self {
            font_size,
            bold: false,
            color: None,
            align: TextAlign::Left,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn colored(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub const fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(10)
    }
}

/// A single drawing primitive positioned in page coordinates (origin top-left).
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// A single line of text whose top edge sits at `y`.
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
    /// A horizontal rule from `x1` to `x2` at `y`.
    Rule { x1: f64, x2: f64, y: f64 },
}

impl DrawCommand {
    /// The text of a text command, `None` for other primitives.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Rule { .. } => None,
        }
    }
}

/// Slice of a captured raster image, placed at the page origin at full page width.
#[derive(Clone)]
pub struct ImageSlice {
    pub image: image::DynamicImage,
    /// Offset of the slice within the captured image, in pixels.
    pub source_offset: u32,
}

impl fmt::Debug for ImageSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.image.dimensions();
        f.debug_struct("ImageSlice")
            .field("width", &width)
            .field("height", &height)
            .field("source_offset", &self.source_offset)
            .finish()
    }
}

/// Content of one output page.
#[derive(Clone, Debug)]
pub enum Page {
    Drawn(Vec<DrawCommand>),
    Raster(ImageSlice),
}

impl Page {
    /// Draw commands of a programmatic page; empty for raster pages.
    pub fn commands(&self) -> &[DrawCommand] {
        match self {
            Self::Drawn(commands) => commands,
            Self::Raster(_) => &[],
        }
    }

    /// Iterates over the text of every text command on the page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands().iter().filter_map(DrawCommand::text)
    }
}

/// Signal returned by cursor movements telling whether a new page was started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum PageBreak {
    None,
    Occurred,
}

impl PageBreak {
    pub fn occurred(self) -> bool {
        matches!(self, Self::Occurred)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cursor {
    page_index: usize,
    y: f64,
}

/// Layout surface tracking the current page and vertical write position.
///
/// After every operation the cursor satisfies
/// `margin <= y <= page height - margin`.
#[derive(Debug)]
pub struct DocumentCanvas {
    geometry: PageGeometry,
    cursor: Cursor,
    pages: Vec<Vec<DrawCommand>>,
}

impl DocumentCanvas {
    /// Creates a canvas with one empty page and the cursor at the top margin.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            cursor: Cursor {
                page_index: 0,
                y: geometry.margin,
            },
            pages: vec![Vec::new()],
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Current vertical position in millimetres from the top edge.
    pub fn y(&self) -> f64 {
        self.cursor.y
    }

    /// Zero-based index of the page being written.
    pub fn page_index(&self) -> usize {
        self.cursor.page_index
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Left margin, the default x for left-aligned content.
    pub fn left(&self) -> f64 {
        self.geometry.margin
    }

    /// Records left-aligned body text at the cursor.
    pub fn write(&mut self, text: impl Into<String>, x: f64) {
        self.write_styled(text, x, TextStyle::default());
    }

    /// Records text at the cursor with explicit style. The cursor does not move.
    pub fn write_styled(&mut self, text: impl Into<String>, x: f64, style: TextStyle) {
        let y = self.cursor.y;
        self.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            style,
        });
    }

    /// Records a horizontal rule at the cursor.
    pub fn rule(&mut self, x1: f64, x2: f64) {
        let y = self.cursor.y;
        self.push(DrawCommand::Rule { x1, x2, y });
    }

    /// Records text at a fixed distance above the bottom edge of the current
    /// page, outside the cursor flow.
    pub fn write_at_bottom(&mut self, text: impl Into<String>, x: f64, offset: f64, style: TextStyle) {
        let y = self.geometry.height - offset;
        self.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            style,
        });
    }

    /// Whether moving down by `delta` would cross the bottom margin.
    pub fn will_overflow(&self, delta: f64) -> bool {
        self.cursor.y + delta > self.geometry.bottom_limit()
    }

    /// Moves the cursor down by `delta`, starting a new page instead when the
    /// move would cross the bottom margin.
    pub fn advance(&mut self, delta: f64) -> PageBreak {
        if self.will_overflow(delta) {
            self.new_page();
            PageBreak::Occurred
        } else {
            self.cursor.y += delta;
            PageBreak::None
        }
    }

    /// Inserts vertical whitespace, stopping at the bottom margin instead of
    /// starting a page that would only hold the gap.
    pub fn gap(&mut self, delta: f64) {
        self.cursor.y = (self.cursor.y + delta).min(self.geometry.bottom_limit());
    }

    /// Starts a new page when `delta` does not fit below the cursor, so that a
    /// block of that height can be written without splitting.
    pub fn ensure_space(&mut self, delta: f64) -> PageBreak {
        if self.will_overflow(delta) {
            self.new_page();
            PageBreak::Occurred
        } else {
            PageBreak::None
        }
    }

    /// Unconditionally starts a new page with the cursor at the top margin.
    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = Cursor {
            page_index: self.cursor.page_index + 1,
            y: self.geometry.margin,
        };
        log::trace!("canvas: started page {}", self.cursor.page_index + 1);
    }

    /// Commands recorded so far on the page at `index`.
    pub fn page(&self, index: usize) -> Option<&[DrawCommand]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    /// Consumes the canvas and returns its pages in order.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages.into_iter().map(Page::Drawn).collect()
    }

    fn push(&mut self, command: DrawCommand) {
        // The cursor always points at an existing page.
        if let Some(page) = self.pages.get_mut(self.cursor.page_index) {
            page.push(command);
        }
    }
}

impl Default for DocumentCanvas {
    fn default() -> Self {
        Self::new(PageGeometry::A4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cursor_in_bounds(canvas: &DocumentCanvas) {
        let geometry = canvas.geometry();
        assert!(canvas.y() >= geometry.margin, "cursor above top margin");
        assert!(
            canvas.y() <= geometry.bottom_limit(),
            "cursor below bottom margin"
        );
    }

    #[test]
    fn advance_moves_within_page() {
        let mut canvas = DocumentCanvas::default();
        assert_eq!(canvas.advance(10.0), PageBreak::None);
        assert_eq!(canvas.y(), 30.0);
        assert_eq!(canvas.page_index(), 0);
    }

    #[test]
    fn advance_past_bottom_starts_new_page() {
        let mut canvas = DocumentCanvas::default();
        assert_eq!(canvas.advance(250.0), PageBreak::None);
        assert!(canvas.will_overflow(10.0));
        assert_eq!(canvas.advance(10.0), PageBreak::Occurred);
        assert_eq!(canvas.page_index(), 1);
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.y(), 20.0);
        assert_cursor_in_bounds(&canvas);
    }

    #[test]
    fn reaching_bottom_limit_exactly_does_not_break() {
        let mut canvas = DocumentCanvas::default();
        assert!(!canvas.will_overflow(257.0));
        assert_eq!(canvas.advance(257.0), PageBreak::None);
        assert_eq!(canvas.y(), 277.0);
        assert_cursor_in_bounds(&canvas);
    }

    #[test]
    fn will_overflow_does_not_mutate() {
        let canvas = DocumentCanvas::default();
        assert!(canvas.will_overflow(300.0));
        assert_eq!(canvas.y(), 20.0);
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn ensure_space_keeps_cursor_when_block_fits() {
        let mut canvas = DocumentCanvas::default();
        let _ = canvas.advance(100.0);
        assert_eq!(canvas.ensure_space(50.0), PageBreak::None);
        assert_eq!(canvas.y(), 120.0);
        assert_eq!(canvas.ensure_space(200.0), PageBreak::Occurred);
        assert_eq!(canvas.y(), 20.0);
    }

    #[test]
    fn writes_share_the_cursor_row() {
        let mut canvas = DocumentCanvas::default();
        canvas.write("left", 20.0);
        canvas.write_styled("right", 190.0, TextStyle::new(10).aligned(TextAlign::Right));
        let commands = canvas.page(0).unwrap();
        let ys: Vec<_> = commands
            .iter()
            .map(|command| match command {
                DrawCommand::Text { y, .. } | DrawCommand::Rule { y, .. } => *y,
            })
            .collect();
        assert_eq!(ys, [20.0, 20.0]);
    }

    #[test]
    fn bottom_text_lands_on_current_page_without_moving_cursor() {
        let mut canvas = DocumentCanvas::default();
        canvas.new_page();
        canvas.write_at_bottom("footer", 105.0, 10.0, TextStyle::default());
        assert!(canvas.page(0).unwrap().is_empty());
        assert_eq!(
            canvas.page(1).unwrap(),
            [DrawCommand::Text {
                text: "footer".into(),
                x: 105.0,
                y: 287.0,
                style: TextStyle::default(),
            }]
        );
        assert_eq!(canvas.y(), 20.0);
    }
}
