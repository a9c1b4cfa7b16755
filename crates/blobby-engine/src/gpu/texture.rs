use super::error::ResourceError;

/// Closed set of texture shapes the renderer allocates.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureKind {
    D2 { width: u32, height: u32 },
    D3 { width: u32, height: u32, depth: u32 },
}

impl TextureKind {
    pub fn extent(&self) -> wgpu::Extent3d {
        match *self {
            TextureKind::D2 { width, height } => wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            TextureKind::D3 {
                width,
                height,
                depth,
            } => wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: depth,
            },
        }
    }

    pub fn dimension(&self) -> wgpu::TextureDimension {
        match self {
            TextureKind::D2 { .. } => wgpu::TextureDimension::D2,
            TextureKind::D3 { .. } => wgpu::TextureDimension::D3,
        }
    }

    pub fn view_dimension(&self) -> wgpu::TextureViewDimension {
        match self {
            TextureKind::D2 { .. } => wgpu::TextureViewDimension::D2,
            TextureKind::D3 { .. } => wgpu::TextureViewDimension::D3,
        }
    }

    /// Width and height of one slice.
    pub fn size_2d(&self) -> (u32, u32) {
        match *self {
            TextureKind::D2 { width, height } | TextureKind::D3 { width, height, .. } => {
                (width, height)
            }
        }
    }

    pub fn texel_count(&self) -> u64 {
        let e = self.extent();
        e.width as u64 * e.height as u64 * e.depth_or_array_layers as u64
    }

    /// Slice index used when the texture is a render attachment.
    ///
    /// 3D textures are attached one slice at a time; slice 0 is used.
    pub fn attachment_slice(&self) -> Option<u32> {
        match self {
            TextureKind::D2 { .. } => None,
            TextureKind::D3 { .. } => Some(0),
        }
    }

    fn is_empty(&self) -> bool {
        self.texel_count() == 0
    }
}

/// Immutable description of an allocated texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub label: String,
    pub kind: TextureKind,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

impl TextureInfo {
    pub fn is_renderable(&self) -> bool {
        self.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    }

    pub fn has_depth(&self) -> bool {
        self.format.has_depth_aspect()
    }

    pub fn has_stencil(&self) -> bool {
        self.format.has_stencil_aspect()
    }
}

/// Owner of one `wgpu::Texture` and its default view.
pub struct Texture {
    raw: wgpu::Texture,
    view: wgpu::TextureView,
    info: TextureInfo,
}

impl Texture {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        kind: TextureKind,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Result<Self, ResourceError> {
        if kind.is_empty() {
            return Err(ResourceError::ZeroSized {
                label: label.to_string(),
            });
        }

        let raw = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: kind.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: kind.dimension(),
            format,
            usage,
            view_formats: &[],
        });

        let view = raw.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(kind.view_dimension()),
            ..Default::default()
        });

        Ok(Self {
            raw,
            view,
            info: TextureInfo {
                label: label.to_string(),
                kind,
                format,
                usage,
            },
        })
    }

    pub fn describe(&self) -> &TextureInfo {
        &self.info
    }

    pub fn kind(&self) -> TextureKind {
        self.info.kind
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.info.format
    }

    pub fn raw(&self) -> &wgpu::Texture {
        &self.raw
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(kind: TextureKind, format: wgpu::TextureFormat) -> TextureInfo {
        TextureInfo {
            label: "t".into(),
            kind,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
        }
    }

    // ── kind ──────────────────────────────────────────────────────────────

    #[test]
    fn d2_extent_has_single_layer() {
        let k = TextureKind::D2 { width: 4, height: 3 };
        assert_eq!(k.extent().depth_or_array_layers, 1);
        assert_eq!(k.texel_count(), 12);
        assert_eq!(k.attachment_slice(), None);
    }

    #[test]
    fn d3_extent_uses_depth() {
        let k = TextureKind::D3 { width: 4, height: 3, depth: 2 };
        assert_eq!(k.extent().depth_or_array_layers, 2);
        assert_eq!(k.texel_count(), 24);
        assert_eq!(k.dimension(), wgpu::TextureDimension::D3);
        assert_eq!(k.attachment_slice(), Some(0));
        assert_eq!(k.size_2d(), (4, 3));
    }

    #[test]
    fn zero_extent_is_empty() {
        assert!(TextureKind::D2 { width: 0, height: 3 }.is_empty());
        assert!(TextureKind::D3 { width: 1, height: 1, depth: 0 }.is_empty());
    }

    // ── info ──────────────────────────────────────────────────────────────

    #[test]
    fn depth_stencil_aspects() {
        let d = info(TextureKind::D2 { width: 1, height: 1 }, wgpu::TextureFormat::Depth32Float);
        assert!(d.has_depth());
        assert!(!d.has_stencil());

        let ds = info(TextureKind::D2 { width: 1, height: 1 }, wgpu::TextureFormat::Depth24PlusStencil8);
        assert!(ds.has_depth());
        assert!(ds.has_stencil());
    }
}
