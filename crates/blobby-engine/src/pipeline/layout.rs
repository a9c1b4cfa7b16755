use bytemuck::{Pod, Zeroable};

use super::error::PipelineError;

/// One record of a pixel's list. Matches `ListEntry` in `list.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ListEntry {
    /// Distance along the view ray to the outer sphere.
    pub depth: f32,
    /// Index into the mirror buffer.
    pub primitive: u32,
}

pub const ENTRY_SIZE: u64 = std::mem::size_of::<ListEntry>() as u64;

/// Sizes and indexing of the per-pixel list storage.
///
/// Pixel `(x, y)` owns slots `[pixel * capacity, (pixel + 1) * capacity)` of
/// the flat list buffer, where `pixel = y * width + x`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ListLayout {
    pub width: u32,
    pub height: u32,
    pub capacity: u32,
}

impl ListLayout {
    /// Zero dimensions are clamped to 1 and capacity to at least 1.
    pub fn new(width: u32, height: u32, capacity: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            capacity: capacity.max(1),
        }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn cursor_bytes(&self) -> u64 {
        self.pixel_count() * 4
    }

    pub fn list_len(&self) -> u64 {
        self.pixel_count() * self.capacity as u64
    }

    pub fn list_bytes(&self) -> u64 {
        self.list_len() * ENTRY_SIZE
    }

    pub fn pixel_index(&self, x: u32, y: u32) -> Option<u64> {
        (x < self.width && y < self.height).then(|| y as u64 * self.width as u64 + x as u64)
    }

    pub fn slot_index(&self, pixel: u64, slot: u32) -> u64 {
        pixel * self.capacity as u64 + slot as u64
    }

    /// Fails when either buffer would exceed `max_binding_bytes`.
    pub fn check_limit(&self, max_binding_bytes: u64) -> Result<(), PipelineError> {
        let needed = self.list_bytes().max(self.cursor_bytes());
        if needed > max_binding_bytes {
            return Err(PipelineError::ListTooLarge {
                width: self.width,
                height: self.height,
                capacity: self.capacity,
                bytes: needed,
                limit: max_binding_bytes,
            });
        }
        Ok(())
    }
}
