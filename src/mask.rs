//! Mask images telling the service what to inpaint
//!
//! A mask has the same pixel dimensions as the uploaded image and four
//! channels. It is fully transparent except for green regions marking the
//! area of interest and red strokes marking content to remove inside them.
//! Regions are always painted before strokes so red stays on top.

use crate::error::{InpaintError, Result};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, BresenhamLineIter,
};
use imageproc::rect::Rect;
use std::io::Cursor;

/// Untouched background
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Area of interest around the content to remove
pub const REGION_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Content to remove
pub const STROKE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stroke {
    from: (i32, i32),
    to: (i32, i32),
    thickness: u32,
}

/// Builder for inpainting masks
#[derive(Debug, Clone)]
pub struct MaskBuilder {
    width: u32,
    height: u32,
    regions: Vec<Region>,
    strokes: Vec<Stroke>,
}

impl MaskBuilder {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            regions: Vec::new(),
            strokes: Vec::new(),
        }
    }

    /// Size a mask after the image it will be applied to
    ///
    /// # Errors
    /// The format of `reference` is unknown or its header is unreadable
    pub fn for_image(reference: &[u8]) -> Result<Self> {
        let (width, height) = image_dimensions(reference)?;
        Ok(Self::new(width, height))
    }

    /// Mark a green rectangle with top-left corner at (`x`, `y`)
    #[must_use]
    pub fn region(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        self.regions.push(Region {
            x,
            y,
            width,
            height,
        });
        self
    }

    /// Mark a red line from `from` to `to`, both inclusive
    #[must_use]
    pub fn stroke(mut self, from: (i32, i32), to: (i32, i32), thickness: u32) -> Self {
        self.strokes.push(Stroke {
            from,
            to,
            thickness,
        });
        self
    }

    /// Render the mask
    ///
    /// # Errors
    /// - Zero width or height
    /// - A region or stroke with zero size
    pub fn build(&self) -> Result<RgbaImage> {
        if self.width == 0 || self.height == 0 {
            return Err(InpaintError::invalid_config(format!(
                "Mask dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }

        let mut mask = RgbaImage::from_pixel(self.width, self.height, TRANSPARENT);

        for region in &self.regions {
            if region.width == 0 || region.height == 0 {
                return Err(InpaintError::invalid_config(format!(
                    "Region at ({}, {}) has zero size",
                    region.x, region.y
                )));
            }
            let rect = Rect::at(region.x, region.y).of_size(region.width, region.height);
            draw_filled_rect_mut(&mut mask, rect, REGION_COLOR);
        }

        for stroke in &self.strokes {
            draw_stroke(&mut mask, stroke)?;
        }

        Ok(mask)
    }

    /// Render the mask straight to PNG bytes
    pub fn build_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.build()?)
    }
}

fn draw_stroke(mask: &mut RgbaImage, stroke: &Stroke) -> Result<()> {
    let start = (stroke.from.0 as f32, stroke.from.1 as f32);
    let end = (stroke.to.0 as f32, stroke.to.1 as f32);

    match stroke.thickness {
        0 => Err(InpaintError::invalid_config(format!(
            "Stroke from {:?} to {:?} has zero thickness",
            stroke.from, stroke.to
        ))),
        1 => {
            draw_line_segment_mut(mask, start, end, STROKE_COLOR);
            Ok(())
        },
        thickness => {
            let radius = (thickness / 2) as i32;
            for point in BresenhamLineIter::new(start, end) {
                draw_filled_circle_mut(mask, point, radius, STROKE_COLOR);
            }
            Ok(())
        },
    }
}

/// Encode an RGBA image as PNG
pub fn encode_png(mask: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(mask.clone()).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Decode PNG bytes into RGBA pixels
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8())
}

/// Pixel dimensions read from the image header, without decoding pixels
///
/// # Errors
/// The format is unknown or not enabled ([`image::ImageError::Unsupported`]),
/// or the header is malformed
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Check that a mask matches the pixel dimensions of the image it targets
///
/// # Errors
/// Either header cannot be read, or the dimensions differ
pub fn ensure_same_dimensions(mask_png: &[u8], reference: &[u8]) -> Result<()> {
    let mask = image_dimensions(mask_png)?;
    let source = image_dimensions(reference)?;
    if mask == source {
        Ok(())
    } else {
        Err(InpaintError::invalid_config(format!(
            "Mask is {}x{} but the image is {}x{}",
            mask.0, mask.1, source.0, source.1
        )))
    }
}
