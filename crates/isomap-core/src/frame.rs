//! Raster frame type
//!
//! Textures going into the renderer and the composited map coming out of it
//! are both plain RGBA8 buffers with straight (non-premultiplied) alpha.

use thiserror::Error;

/// Frame construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("RGBA buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw pixel data, row-major, 4 bytes per pixel
    pub data: Vec<u8>,
}

impl ImageFrame {
    /// Create a fully transparent frame
    pub fn new_rgba8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap an existing RGBA8 buffer
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Get pixel at position
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.index(x, y);
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Set pixel at position. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.index(x, y);
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Fill entire frame with a color
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Mirrored copy about the vertical centerline
    pub fn flipped_horizontal(&self) -> Self {
        let row_len = self.width as usize * 4;
        let mut data = Vec::with_capacity(self.data.len());

        if row_len > 0 {
            for row in self.data.chunks_exact(row_len) {
                for pixel in row.chunks_exact(4).rev() {
                    data.extend_from_slice(pixel);
                }
            }
        }

        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// True if the frame has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
