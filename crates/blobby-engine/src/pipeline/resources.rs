use crate::framebuffer::{Framebuffer, FramebufferBuilder};
use crate::gpu::{Buffer, Texture, TextureKind};

use super::error::PipelineError;
use super::layout::{ListEntry, ListLayout};

pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Ray distance written to the position target where nothing was hit.
pub const FAR_DEPTH: f32 = 1e20;

/// Clear values of the prepass color targets, by slot.
pub const PREPASS_CLEAR: [wgpu::Color; 2] = [
    wgpu::Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: FAR_DEPTH as f64,
    },
    wgpu::Color::TRANSPARENT,
];

/// Color targets the prepass pipeline writes, by slot.
pub fn prepass_targets() -> Vec<Option<wgpu::ColorTargetState>> {
    [POSITION_FORMAT, NORMAL_FORMAT]
        .into_iter()
        .map(|format| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        })
        .collect()
}

/// Everything sized by the screen. Replaced as a whole on resize.
pub struct ScreenResources {
    layout: ListLayout,
    pub prepass: Framebuffer,
    pub cursors: Buffer<u32>,
    pub lists: Buffer<ListEntry>,
}

impl ScreenResources {
    pub fn new(device: &wgpu::Device, layout: ListLayout, max_binding_bytes: u64) -> Result<Self, PipelineError> {
        layout.check_limit(max_binding_bytes)?;

        let kind = TextureKind::D2 {
            width: layout.width,
            height: layout.height,
        };
        let sampled_target =
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;

        let position = Texture::new(device, "blobby position", kind, POSITION_FORMAT, sampled_target)?;
        let normal = Texture::new(device, "blobby normal", kind, NORMAL_FORMAT, sampled_target)?;
        let depth = Texture::new(
            device,
            "blobby depth",
            kind,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )?;

        let prepass = FramebufferBuilder::new("blobby prepass")
            .color_at(0, position)
            .color_at(1, normal)
            .depth(depth)
            .build()?;

        let cursors = Buffer::zeroed(
            device,
            "blobby list cursors",
            layout.pixel_count() as usize,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        )?;
        let lists = Buffer::zeroed(
            device,
            "blobby lists",
            layout.list_len() as usize,
            wgpu::BufferUsages::STORAGE,
        )?;

        log::debug!(
            "screen resources {}x{} (capacity {}, {} list bytes)",
            layout.width,
            layout.height,
            layout.capacity,
            layout.list_bytes()
        );

        Ok(Self {
            layout,
            prepass,
            cursors,
            lists,
        })
    }

    pub fn layout(&self) -> ListLayout {
        self.layout
    }

    pub fn position(&self) -> Option<&Texture> {
        self.prepass.color(0)
    }

    pub fn normal(&self) -> Option<&Texture> {
        self.prepass.color(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepass_targets_match_slots() {
        let targets = prepass_targets();
        assert_eq!(targets.len(), PREPASS_CLEAR.len());
        assert_eq!(targets[0].as_ref().map(|t| t.format), Some(POSITION_FORMAT));
        assert_eq!(targets[1].as_ref().map(|t| t.format), Some(NORMAL_FORMAT));
    }

    #[test]
    fn position_clear_is_far_sentinel() {
        assert_eq!(PREPASS_CLEAR[0].a, FAR_DEPTH as f64);
        assert_ne!(PREPASS_CLEAR[0].a, 0.0);
    }
}
