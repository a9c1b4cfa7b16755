use std::collections::HashSet;
use std::fmt;

use crate::gpu::{Texture, TextureInfo};

/// Upper bound on color slots (matches the wgpu default limit).
pub const MAX_COLOR_ATTACHMENTS: u32 = 8;

/// Anything that can describe itself as an attachment.
pub trait Attachment {
    fn info(&self) -> &TextureInfo;
}

impl Attachment for Texture {
    fn info(&self) -> &TextureInfo {
        self.describe()
    }
}

impl Attachment for TextureInfo {
    fn info(&self) -> &TextureInfo {
        self
    }
}

/// Specific reason an attachment set cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Incomplete {
    #[error("no color attachment")]
    MissingColorAttachment,

    #[error("no depth attachment")]
    MissingDepthAttachment,

    #[error("{count} color attachments exceed the limit of {max}")]
    TooManyColorAttachments { count: usize, max: u32 },

    #[error("color slot {slot} is outside the {max} available slots")]
    SlotOutOfRange { slot: u32, max: u32 },

    #[error("`{label}` was not created with RENDER_ATTACHMENT usage")]
    NotRenderable { label: String },

    #[error("`{label}` has format {format:?}, which is not a color format")]
    NotColorFormat {
        label: String,
        format: wgpu::TextureFormat,
    },

    #[error("`{label}` has format {format:?}, which has no depth aspect")]
    NotDepthFormat {
        label: String,
        format: wgpu::TextureFormat,
    },

    #[error("`{label}` is {found:?}, expected {expected:?}")]
    SizeMismatch {
        label: String,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("separate stencil `{label}` is unsupported; stencil must share the depth texture")]
    UnsupportedStencil { label: String },

    #[error("depth attachment `{label}` has no stencil aspect")]
    MissingStencilAspect { label: String },
}

/// Result of `assemble()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completeness {
    Complete,
    Incomplete(Incomplete),
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completeness::Complete)
    }

    pub fn into_result(self) -> Result<(), Incomplete> {
        match self {
            Completeness::Complete => Ok(()),
            Completeness::Incomplete(reason) => Err(reason),
        }
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completeness::Complete => f.write_str("complete"),
            Completeness::Incomplete(reason) => write!(f, "incomplete: {reason}"),
        }
    }
}

/// Where the stencil attachment comes from.
pub enum StencilSource<T> {
    /// Use the stencil aspect of the depth attachment.
    FromDepth,
    /// A stand-alone stencil texture. Always reported as unsupported.
    Separate(T),
}

/// Returns the color slot of each attachment, in insertion order.
///
/// Requested slots are honoured only when every attachment names one and no
/// two collide; otherwise slots are `0..n` in insertion order.
pub fn assign_slots(requested: &[Option<u32>]) -> Vec<u32> {
    let mut seen = HashSet::new();
    let honour = requested
        .iter()
        .all(|slot| slot.is_some_and(|s| seen.insert(s)));

    if honour {
        requested.iter().flatten().copied().collect()
    } else {
        (0..requested.len() as u32).collect()
    }
}

pub struct FramebufferBuilder<T> {
    label: String,
    colors: Vec<(Option<u32>, T)>,
    depth: Option<T>,
    stencil: Option<StencilSource<T>>,
    max_color_attachments: u32,
}

impl<T: Attachment> FramebufferBuilder<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            colors: Vec::new(),
            depth: None,
            stencil: None,
            max_color_attachments: MAX_COLOR_ATTACHMENTS,
        }
    }

    /// Adds a color attachment; its slot is assigned during assembly.
    pub fn color(mut self, texture: T) -> Self {
        self.colors.push((None, texture));
        self
    }

    /// Adds a color attachment pinned to `slot`.
    pub fn color_at(mut self, slot: u32, texture: T) -> Self {
        self.colors.push((Some(slot), texture));
        self
    }

    pub fn depth(mut self, texture: T) -> Self {
        self.depth = Some(texture);
        self
    }

    pub fn stencil(mut self, source: StencilSource<T>) -> Self {
        self.stencil = Some(source);
        self
    }

    pub fn max_color_attachments(mut self, max: u32) -> Self {
        self.max_color_attachments = max;
        self
    }

    /// Checks the attachment set. Pure; repeated calls give the same answer.
    pub fn assemble(&self) -> Completeness {
        match self.check() {
            Ok(()) => Completeness::Complete,
            Err(reason) => Completeness::Incomplete(reason),
        }
    }

    /// Assembles and, when complete, moves the textures into a framebuffer.
    pub fn build(self) -> Result<Framebuffer<T>, Incomplete> {
        self.check()?;

        let requested: Vec<Option<u32>> = self.colors.iter().map(|(s, _)| *s).collect();
        let slots = assign_slots(&requested);
        let slot_count = slots.iter().copied().max().map_or(0, |m| m as usize + 1);

        let size = self.colors[0].1.info().kind.size_2d();

        let mut colors: Vec<Option<T>> = (0..slot_count).map(|_| None).collect();
        for (slot, (_, texture)) in slots.into_iter().zip(self.colors) {
            colors[slot as usize] = Some(texture);
        }

        let Some(depth) = self.depth else {
            return Err(Incomplete::MissingDepthAttachment);
        };

        Ok(Framebuffer {
            label: self.label,
            colors,
            depth,
            stencil: matches!(self.stencil, Some(StencilSource::FromDepth)),
            size,
        })
    }

    fn check(&self) -> Result<(), Incomplete> {
        let Some((_, first)) = self.colors.first() else {
            return Err(Incomplete::MissingColorAttachment);
        };

        if self.colors.len() > self.max_color_attachments as usize {
            return Err(Incomplete::TooManyColorAttachments {
                count: self.colors.len(),
                max: self.max_color_attachments,
            });
        }

        let Some(depth) = self.depth.as_ref().map(Attachment::info) else {
            return Err(Incomplete::MissingDepthAttachment);
        };

        let requested: Vec<Option<u32>> = self.colors.iter().map(|(s, _)| *s).collect();
        if let Some(slot) = assign_slots(&requested)
            .into_iter()
            .find(|s| *s >= self.max_color_attachments)
        {
            return Err(Incomplete::SlotOutOfRange {
                slot,
                max: self.max_color_attachments,
            });
        }

        let expected = first.info().kind.size_2d();

        for (_, texture) in &self.colors {
            let info = texture.info();
            check_renderable(info)?;
            if info.format.is_depth_stencil_format() {
                return Err(Incomplete::NotColorFormat {
                    label: info.label.clone(),
                    format: info.format,
                });
            }
            check_size(info, expected)?;
        }

        check_renderable(depth)?;
        if !depth.has_depth() {
            return Err(Incomplete::NotDepthFormat {
                label: depth.label.clone(),
                format: depth.format,
            });
        }
        check_size(depth, expected)?;

        match &self.stencil {
            None => {}
            Some(StencilSource::FromDepth) => {
                if !depth.has_stencil() {
                    return Err(Incomplete::MissingStencilAspect {
                        label: depth.label.clone(),
                    });
                }
            }
            Some(StencilSource::Separate(texture)) => {
                return Err(Incomplete::UnsupportedStencil {
                    label: texture.info().label.clone(),
                });
            }
        }

        Ok(())
    }
}

fn check_renderable(info: &TextureInfo) -> Result<(), Incomplete> {
    if info.is_renderable() {
        Ok(())
    } else {
        Err(Incomplete::NotRenderable {
            label: info.label.clone(),
        })
    }
}

fn check_size(info: &TextureInfo, expected: (u32, u32)) -> Result<(), Incomplete> {
    let found = info.kind.size_2d();
    if found == expected {
        Ok(())
    } else {
        Err(Incomplete::SizeMismatch {
            label: info.label.clone(),
            expected,
            found,
        })
    }
}

/// A validated set of attachments. Owns its textures.
pub struct Framebuffer<T = Texture> {
    label: String,
    colors: Vec<Option<T>>,
    depth: T,
    stencil: bool,
    size: (u32, u32),
}

impl<T: Attachment> Framebuffer<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn color(&self, slot: u32) -> Option<&T> {
        self.colors.get(slot as usize).and_then(Option::as_ref)
    }

    /// Number of color slots, including unused holes.
    pub fn slot_count(&self) -> u32 {
        self.colors.len() as u32
    }

    pub fn depth(&self) -> &T {
        &self.depth
    }

    pub fn has_stencil(&self) -> bool {
        self.stencil
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth.info().format
    }
}

impl Framebuffer<Texture> {
    /// Begins a pass that clears every color slot and the depth (and stencil).
    ///
    /// `clear` is indexed by slot; missing entries clear to transparent black.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        clear: &[wgpu::Color],
        depth_clear: f32,
    ) -> wgpu::RenderPass<'e> {
        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment<'_>>> = self
            .colors
            .iter()
            .enumerate()
            .map(|(slot, c)| {
                c.as_ref().map(|t| wgpu::RenderPassColorAttachment {
                    view: t.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(
                            clear.get(slot).copied().unwrap_or(wgpu::Color::TRANSPARENT),
                        ),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: t.kind().attachment_slice(),
                })
            })
            .collect();

        let stencil_ops = self.stencil.then_some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(0),
            store: wgpu::StoreOp::Store,
        });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(depth_clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    /// Begins a pass with only the depth attachment, bound read-only.
    ///
    /// Used by passes that write storage buffers and need no color output;
    /// a render pass needs at least one attachment.
    pub fn begin_depth_read_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth.view(),
                depth_ops: None,
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
