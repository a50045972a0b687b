/// Trait for reading RGB pixels from the current video frame.
pub trait FrameAccess {
    /// Get the RGB value at (x, y). Returns black for out-of-bounds pixels.
    /// Coordinates are in pixel space (not normalized).
    fn pixel(&self, x: i32, y: i32) -> [u8; 3];

    /// Frame dimensions.
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// A packed RGB8 frame buffer implementing FrameAccess.
#[derive(Debug, Clone)]
pub struct RgbFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RgbFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 3);
        Self {
            data,
            width,
            height,
        }
    }

    /// Build from packed RGBA8 (canvas readback layout), dropping alpha.
    pub fn from_rgba(rgba: &[u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(rgba.len(), width as usize * height as usize * 4);
        let data = rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Self {
            data,
            width,
            height,
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> [u8; 3],
    {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self { data, width, height }
    }
}

impl FrameAccess for RgbFrame {
    fn pixel(&self, x: i32, y: i32) -> [u8; 3] {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return [0, 0, 0];
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        match self.data.get(i..i + 3) {
            Some(px) => [px[0], px[1], px[2]],
            None => [0, 0, 0],
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
