use std::marker::PhantomData;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use super::error::ResourceError;

/// Typed owner of one `wgpu::Buffer`.
///
/// The element count is fixed at creation. Updates replace the whole contents
/// (`write_all`) and sizes must match exactly. Growing means creating a new
/// buffer.
///
/// One buffer may carry several usages (e.g. `VERTEX | STORAGE`) and be bound
/// to different targets at the same time.
pub struct Buffer<T: Pod> {
    raw: wgpu::Buffer,
    len: usize,
    label: String,
    _marker: PhantomData<T>,
}

impl<T: Pod> Buffer<T> {
    /// Creates a buffer initialized from `contents`.
    pub fn with_contents(
        device: &wgpu::Device,
        label: &str,
        contents: &[T],
        usage: wgpu::BufferUsages,
    ) -> Result<Self, ResourceError> {
        if contents.is_empty() || std::mem::size_of::<T>() == 0 {
            return Err(ResourceError::ZeroSized {
                label: label.to_string(),
            });
        }

        let raw = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(contents),
            usage,
        });

        Ok(Self {
            raw,
            len: contents.len(),
            label: label.to_string(),
            _marker: PhantomData,
        })
    }

    /// Creates a zero-initialized buffer holding `len` elements.
    pub fn zeroed(
        device: &wgpu::Device,
        label: &str,
        len: usize,
        usage: wgpu::BufferUsages,
    ) -> Result<Self, ResourceError> {
        let size = byte_size_of::<T>(len);
        if size == 0 {
            return Err(ResourceError::ZeroSized {
                label: label.to_string(),
            });
        }

        let raw = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        });

        Ok(Self {
            raw,
            len,
            label: label.to_string(),
            _marker: PhantomData,
        })
    }

    /// Replaces the entire contents. `contents` must match the buffer length.
    pub fn write_all(&self, queue: &wgpu::Queue, contents: &[T]) -> Result<(), ResourceError> {
        check_whole_write::<T>(&self.label, self.len, contents.len())?;
        queue.write_buffer(&self.raw, 0, bytemuck::cast_slice(contents));
        Ok(())
    }

    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of `T` elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn byte_size(&self) -> u64 {
        byte_size_of::<T>(self.len)
    }

    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.raw.slice(..)
    }
}

#[inline]
pub(crate) fn byte_size_of<T>(len: usize) -> u64 {
    (len as u64) * (std::mem::size_of::<T>() as u64)
}

fn check_whole_write<T>(label: &str, len: usize, incoming: usize) -> Result<(), ResourceError> {
    if incoming != len {
        return Err(ResourceError::SizeMismatch {
            label: label.to_string(),
            expected: byte_size_of::<T>(len),
            actual: byte_size_of::<T>(incoming),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── whole writes ──────────────────────────────────────────────────────

    #[test]
    fn whole_write_accepts_equal_length() {
        assert!(check_whole_write::<[f32; 4]>("mirror", 10, 10).is_ok());
    }

    #[test]
    fn whole_write_reports_sizes_in_bytes() {
        let err = check_whole_write::<[f32; 4]>("mirror", 10, 9).unwrap_err();
        assert_eq!(
            err,
            ResourceError::SizeMismatch {
                label: "mirror".into(),
                expected: 160,
                actual: 144,
            }
        );
    }

    #[test]
    fn byte_size_scales_with_element() {
        assert_eq!(byte_size_of::<u32>(5), 20);
        assert_eq!(byte_size_of::<[f32; 4]>(3), 48);
    }
}
