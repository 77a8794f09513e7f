//! `genpdf` element that replays laid-out pages onto PDF pages.
//!
//! Layout happens up front on the [`DocumentCanvas`](crate::canvas::DocumentCanvas)
//! or in the snapshot slicer; this element only positions what was recorded.
//! It renders one recorded page per call and reports `has_more` until every
//! page was emitted, which makes `genpdf` start exactly one PDF page per
//! recorded page.

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Scale, Size};

use crate::canvas::{DrawCommand, ImageSlice, Page, PageGeometry, TextAlign, TextStyle};
use crate::format::MUTED_COLOR;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn pdf_style(text_style: &TextStyle) -> Style {
    let mut style = Style::new().with_font_size(text_style.font_size);
    if text_style.bold {
        style.set_bold();
    }
    if let Some(color) = text_style.color {
        style.set_color(color.into());
    }
    style
}

/// Natural width of an image at the default DPI.
fn natural_width(image: &image::DynamicImage) -> f64 {
    let (px_width, _) = image.dimensions();
    MM_PER_INCH * f64::from(px_width) / DEFAULT_IMAGE_DPI
}

/// Renders a sequence of recorded pages, one per `render` call.
pub struct RecordedPages {
    pages: std::vec::IntoIter<Page>,
    geometry: PageGeometry,
}

impl RecordedPages {
    pub fn new(pages: Vec<Page>, geometry: PageGeometry) -> Self {
        Self {
            pages: pages.into_iter(),
            geometry,
        }
    }

    fn render_commands(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        style: Style,
        commands: &[DrawCommand],
    ) -> Result<(), Error> {
        for command in commands {
            match command {
                DrawCommand::Text {
                    text,
                    x,
                    y,
                    style: text_style,
                } => {
                    let merged = style.and(pdf_style(text_style));
                    let width = StyledString::new(text.clone(), merged).width(&context.font_cache);
                    let left = match text_style.align {
                        TextAlign::Left => mm_from_f64(*x),
                        TextAlign::Center => mm_from_f64(*x) - width / 2.0,
                        TextAlign::Right => mm_from_f64(*x) - width,
                    };

                    match area.text_section(
                        &context.font_cache,
                        Position::new(left, mm_from_f64(*y)),
                        merged,
                    ) {
                        Some(mut section) => section.print_str(text, merged)?,
                        None => log::warn!("text `{}` does not fit at y = {:.1} mm", text, y),
                    }
                }
                DrawCommand::Rule { x1, x2, y } => {
                    area.draw_line(
                        vec![
                            Position::new(mm_from_f64(*x1), mm_from_f64(*y)),
                            Position::new(mm_from_f64(*x2), mm_from_f64(*y)),
                        ],
                        Style::new().with_color(MUTED_COLOR.into()),
                    );
                }
            }
        }
        Ok(())
    }

    fn render_slice(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        style: Style,
        slice: ImageSlice,
    ) -> Result<(), Error> {
        let rgb = image::DynamicImage::ImageRgb8(slice.image.to_rgb8());
        let natural = natural_width(&rgb);
        let scale = if natural > f64::EPSILON {
            self.geometry.width / natural
        } else {
            1.0
        };

        let mut element = Image::from_dynamic_image(rgb)?
            .with_position(Position::new(0, 0))
            .with_scale(Scale::new(scale, scale));
        element.render(context, area.clone(), style)?;
        Ok(())
    }
}

impl Element for RecordedPages {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let Some(page) = self.pages.next() else {
            return Ok(result);
        };

        match page {
            Page::Drawn(commands) => self.render_commands(context, &area, style, &commands)?,
            Page::Raster(slice) => self.render_slice(context, &area, style, slice)?,
        }

        let size = area.size();
        result.size = Size::new(size.width, size.height);
        result.has_more = self.pages.len() > 0;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mm_to_f64(value: Mm) -> f64 {
        let mm: printpdf::Mm = value.into();
        mm.0
    }

    #[test]
    fn millimetre_conversion_round_trips() {
        assert!((mm_to_f64(mm_from_f64(123.4)) - 123.4).abs() < 1e-9);
    }

    #[test]
    fn natural_width_uses_default_dpi() {
        let image = image::DynamicImage::ImageRgb8(image::RgbImage::new(300, 10));
        assert!((natural_width(&image) - 25.4).abs() < 1e-9);
    }
}
