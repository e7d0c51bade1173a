//! Color + depth surface shared by all rasterizer workers.
//!
//! Every pixel is one `AtomicU64` cell holding the depth in the high 32 bits
//! (`f32` bit pattern) and the packed ARGB color in the low 32 bits, so the
//! depth test and the color write are a single compare-and-swap:
//!
//! ```text
//!   63            32 31             0
//!  ┌────────────────┬────────────────┐
//!  │  depth (f32)   │  0xAARRGGBB    │
//!  └────────────────┴────────────────┘
//! ```
//!
//! Depth follows the projection: 0 at the near plane, 1 at the far plane.
//! Smaller is closer, and the buffer clears to [`FAR_DEPTH`]. Fragments at
//! exactly equal depth are ordered by their packed color, so the surviving
//! fragment never depends on which worker arrived first.

use std::sync::atomic::{AtomicU64, Ordering};

/// Depth value of an empty pixel.
pub const FAR_DEPTH: f32 = 1.0;

#[inline]
fn pack(depth: f32, color: u32) -> u64 {
    ((depth.to_bits() as u64) << 32) | color as u64
}

#[inline]
fn depth_of(cell: u64) -> f32 {
    f32::from_bits((cell >> 32) as u32)
}

#[inline]
fn color_of(cell: u64) -> u32 {
    cell as u32
}

/// Total order on fragments: nearer first, then lower color word.
#[inline]
fn wins(depth: f32, color: u32, cell: u64) -> bool {
    let stored = depth_of(cell);
    depth < stored || (depth == stored && color < color_of(cell))
}

/// Fixed-size pixel surface with an embedded depth buffer.
///
/// All methods take `&self`; concurrent writers from different threads are
/// resolved per pixel by depth, never by arrival order.
pub struct FrameBuffer {
    cells: Vec<AtomicU64>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl FrameBuffer {
    /// Creates a buffer filled with `color` at [`FAR_DEPTH`].
    pub fn new(width: u32, height: u32, color: u32) -> Self {
        let size = width as usize * height as usize;
        let cell = pack(FAR_DEPTH, color);
        Self {
            cells: (0..size).map(|_| AtomicU64::new(cell)).collect(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Resets every pixel to `color` and the depth to [`FAR_DEPTH`].
    pub fn clear(&self, color: u32) {
        let cell = pack(FAR_DEPTH, color);
        for c in &self.cells {
            c.store(cell, Ordering::Relaxed);
        }
    }

    /// Writes a color without touching the depth. Out-of-bounds writes are
    /// ignored.
    #[inline]
    pub fn set_pixel(&self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            let _ = self.cells[idx].fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cell| {
                Some(pack(depth_of(cell), color))
            });
        }
    }

    /// Depth-tested write.
    ///
    /// The pixel is replaced if `depth` is smaller than the stored depth, or
    /// equal to it with a smaller color word. Returns whether the write
    /// happened. Out-of-bounds coordinates and NaN depths never write.
    #[inline]
    pub fn set_pixel_with_depth(&self, x: i32, y: i32, depth: f32, color: u32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        let new_cell = pack(depth, color);
        self.cells[idx]
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cell| {
                wins(depth, color, cell).then_some(new_cell)
            })
            .is_ok()
    }

    /// Whether a fragment at `depth` would currently pass the depth test.
    ///
    /// Lets the rasterizer skip shading of hidden fragments. A `true` is only
    /// a hint: the final decision is made by [`set_pixel_with_depth`].
    ///
    /// [`set_pixel_with_depth`]: Self::set_pixel_with_depth
    #[inline]
    pub fn depth_passes(&self, x: i32, y: i32, depth: f32) -> bool {
        self.index(x, y)
            .is_some_and(|idx| depth <= depth_of(self.cells[idx].load(Ordering::Relaxed)))
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y)
            .map(|idx| color_of(self.cells[idx].load(Ordering::Relaxed)))
    }

    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y)
            .map(|idx| depth_of(self.cells[idx].load(Ordering::Relaxed)))
    }

    /// Colors, row-major from the top-left corner.
    pub fn pixels(&self) -> Vec<u32> {
        self.cells
            .iter()
            .map(|c| color_of(c.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn depths(&self) -> Vec<f32> {
        self.cells
            .iter()
            .map(|c| depth_of(c.load(Ordering::Relaxed)))
            .collect()
    }

    /// Tightly packed `R, G, B` bytes, as expected by `image::RgbImage`.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.cells.len() * 3);
        for color in self.pixels() {
            let [_, r, g, b] = color.to_be_bytes();
            bytes.extend_from_slice(&[r, g, b]);
        }
        bytes
    }

    /// Native-endian `0xAARRGGBB` words, the layout of an SDL `ARGB8888`
    /// streaming texture.
    pub fn to_argb_bytes(&self) -> Vec<u8> {
        self.pixels()
            .into_iter()
            .flat_map(u32::to_ne_bytes)
            .collect()
    }
}
