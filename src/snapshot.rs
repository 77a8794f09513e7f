//! Snapshot strategy: paginates an already rendered visual representation of a
//! report instead of drawing it with primitives.
//!
//! A [`VisualElement`] yields one raster image. The image is scaled to the full
//! page width and cut into page-height slices, one per output page.

use std::path::{Path, PathBuf};

use image::GenericImageView;

use crate::canvas::{ImageSlice, Page, PageGeometry};
use crate::error::CaptureError;

/// Something that can be rasterized into a single image, such as a pre-rendered
/// dashboard preview.
pub trait VisualElement {
    /// Captures the element. Called at most once per generated document.
    fn capture(&self) -> Result<image::DynamicImage, CaptureError>;
}

/// Loads an image from in-memory bytes with a descriptive error.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<image::DynamicImage, CaptureError> {
    Ok(image::load_from_memory(bytes.as_ref())?)
}

/// Loads an image from `path`, guessing the format from its content.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, CaptureError> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path).map_err(|err| {
        CaptureError::Capture(format!("failed to open image file {}: {}", path.display(), err))
    })?;
    let reader = reader.with_guessed_format().map_err(|err| {
        CaptureError::Capture(format!(
            "unable to determine image format of {}: {}",
            path.display(),
            err
        ))
    })?;
    Ok(reader.decode()?)
}

/// Visual element backed by an encoded image in memory (PNG, JPEG, ...).
#[derive(Clone, Debug)]
pub struct ImageBytesElement {
    bytes: Vec<u8>,
}

impl ImageBytesElement {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl VisualElement for ImageBytesElement {
    fn capture(&self) -> Result<image::DynamicImage, CaptureError> {
        decode_image_from_bytes(&self.bytes)
    }
}

/// Visual element backed by an image file on disk.
#[derive(Clone, Debug)]
pub struct ImageFileElement {
    path: PathBuf,
}

impl ImageFileElement {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VisualElement for ImageFileElement {
    fn capture(&self) -> Result<image::DynamicImage, CaptureError> {
        decode_image_from_path(&self.path)
    }
}

/// Height in pixels of one page-sized slice of an image `image_width` pixels wide.
pub fn slice_height_px(image_width: u32, geometry: &PageGeometry) -> u32 {
    let height = f64::from(image_width) * geometry.height / geometry.width;
    (height.floor() as u32).max(1)
}

/// Captures `element` and cuts the image into page-height slices.
pub fn capture_and_paginate(
    element: &dyn VisualElement,
    geometry: &PageGeometry,
) -> Result<Vec<Page>, CaptureError> {
    let image = element.capture()?;
    paginate_image(&image, geometry)
}

/// Cuts `image` into consecutive slices, each covering at most one page once
/// the image is scaled to the page width.
pub fn paginate_image(
    image: &image::DynamicImage,
    geometry: &PageGeometry,
) -> Result<Vec<Page>, CaptureError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::EmptyImage { width, height });
    }

    let page_height = slice_height_px(width, geometry);
    let mut pages = Vec::with_capacity(((height + page_height - 1) / page_height) as usize);
    let mut offset = 0;
    while offset < height {
        let slice_height = page_height.min(height - offset);
        pages.push(Page::Raster(ImageSlice {
            image: image.crop_imm(0, offset, width, slice_height),
            source_offset: offset,
        }));
        offset += slice_height;
    }

    log::debug!(
        "snapshot: split {}x{} capture into {} page(s)",
        width,
        height,
        pages.len()
    );
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    struct FailingElement;

    impl VisualElement for FailingElement {
        fn capture(&self) -> Result<DynamicImage, CaptureError> {
            Err(CaptureError::Capture("renderer unavailable".into()))
        }
    }

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    fn slice_heights(pages: &[Page]) -> Vec<u32> {
        pages
            .iter()
            .map(|page| match page {
                Page::Raster(slice) => slice.image.height(),
                Page::Drawn(_) => panic!("expected raster page"),
            })
            .collect()
    }

    #[test]
    fn slice_height_follows_page_aspect_ratio() {
        assert_eq!(slice_height_px(210, &PageGeometry::A4), 297);
        assert_eq!(slice_height_px(420, &PageGeometry::A4), 594);
    }

    #[test]
    fn tall_image_spans_several_pages() {
        let pages = paginate_image(&blank(210, 700), &PageGeometry::A4).unwrap();
        assert_eq!(slice_heights(&pages), [297, 297, 106]);
        let offsets: Vec<_> = pages
            .iter()
            .map(|page| match page {
                Page::Raster(slice) => slice.source_offset,
                Page::Drawn(_) => unreachable!(),
            })
            .collect();
        assert_eq!(offsets, [0, 297, 594]);
    }

    #[test]
    fn short_image_fits_one_page() {
        let pages = paginate_image(&blank(800, 100), &PageGeometry::A4).unwrap();
        assert_eq!(slice_heights(&pages), [100]);
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = paginate_image(&blank(0, 0), &PageGeometry::A4).unwrap_err();
        assert!(matches!(err, CaptureError::EmptyImage { .. }));
    }

    #[test]
    fn capture_failure_is_reported() {
        let err = capture_and_paginate(&FailingElement, &PageGeometry::A4).unwrap_err();
        assert!(err.to_string().contains("renderer unavailable"));
    }

    #[test]
    fn undecodable_bytes_fail_capture() {
        let element = ImageBytesElement::new(b"not an image".to_vec());
        assert!(matches!(element.capture(), Err(CaptureError::Decode(_))));
    }
}
