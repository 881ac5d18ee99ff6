//! RAM framebuffer the face renders into.
//!
//! Every redraw produces a full raster image here; [`FrameBuffer::flush`]
//! then pushes only the bounding rectangle of changed pixels to the real
//! display. Tests read pixels back with [`FrameBuffer::pixel_at`] instead
//! of attaching a display device.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::trace;

use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

const WIDTH: usize = DISPLAY_WIDTH_PX as usize;
const HEIGHT: usize = DISPLAY_HEIGHT_PX as usize;

/// Bounding box of pixels changed since the last flush.
#[derive(Debug, Clone, Copy)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    fn at(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// Heap-backed `DrawTarget<Color = Rgb565>` covering the whole face.
pub struct FrameBuffer {
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Allocates a framebuffer filled with black pixels.
    pub fn new() -> Self {
        Self {
            pixels: vec![Rgb565::BLACK; WIDTH * HEIGHT],
            dirty: None,
        }
    }

    /// Color currently stored at (x, y).
    ///
    /// Panics when the coordinate is outside the face; only tests and
    /// diagnostics read pixels back.
    pub fn pixel_at(&self, x: u32, y: u32) -> Rgb565 {
        assert!((x as usize) < WIDTH && (y as usize) < HEIGHT);
        self.pixels[y as usize * WIDTH + x as usize]
    }

    /// Write one pixel, growing the dirty rect only when the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * WIDTH + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::at(x, y)),
            }
        }
    }

    /// Pushes the dirty region to `display` and resets the dirty state.
    ///
    /// Only the bounding rectangle of changed pixels is sent, one
    /// `fill_contiguous` call. A flush with nothing changed is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let width = rect.max_x - rect.min_x + 1;
        let height = rect.max_y - rect.min_y + 1;
        trace!(
            "flushing {}x{} dirty region at ({}, {})",
            width, height, rect.min_x, rect.min_y
        );

        let area = Rectangle::new(
            Point::new(rect.min_x as i32, rect.min_y as i32),
            Size::new(width as u32, height as u32),
        );

        let pixels = &self.pixels;
        let rows = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let start = y * WIDTH + rect.min_x;
            pixels[start..start + width].iter().copied()
        });

        display.fill_contiguous(&area, rows)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0
                && coord.y >= 0
                && (coord.x as usize) < WIDTH
                && (coord.y as usize) < HEIGHT
            {
                self.set_pixel(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}
