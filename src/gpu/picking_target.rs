//! GPU-based picking target using a dedicated flat-color render pass
//!
//! Records flat-filled triangles during the frame, renders them into an
//! offscreen Rgba8Unorm texture with a depth attachment on the first
//! readback after a change, then copies the requested region to a staging
//! buffer. The result matches exactly what the depth test kept.

use std::sync::mpsc;

use crate::canvas::{Canvas, Color, HiddenTarget, PixelBuffer, PixelRegion};
use crate::error::PickError;
use crate::geometry::Shape;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::{
    RenderTarget, PICKING_COLOR_FORMAT, PICKING_DEPTH_FORMAT,
};
use crate::gpu::vertex_stream::VertexStream;
use crate::transform::{TransformOp, TransformStack};

/// Clip-space vertex with its flat fill.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatVertex {
    /// Position after model-view-projection.
    pub clip_position: [f32; 4],
    /// RGBA8 fill, normalized by the vertex fetch.
    pub color: [u8; 4],
}

impl FlatVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Unorm8x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Hidden picking target rendered by wgpu.
pub struct GpuPickingTarget {
    context: RenderContext,
    width: u32,
    height: u32,
    density: f32,
    buffer_width: u32,
    buffer_height: u32,
    color: RenderTarget,
    depth: RenderTarget,
    pipeline: wgpu::RenderPipeline,
    vertex_stream: VertexStream<FlatVertex>,
    stack: TransformStack,
    fill: Color,
    clear_color: Color,
    vertices: Vec<FlatVertex>,
    /// Recorded geometry has not been rendered yet.
    dirty: bool,
}

impl GpuPickingTarget {
    /// Create a `width × height` target at pixel density 1.
    ///
    /// # Errors
    ///
    /// [`PickError::InvalidDimensions`] if either dimension is zero.
    pub fn new(
        context: RenderContext,
        width: u32,
        height: u32,
    ) -> Result<Self, PickError> {
        if width == 0 || height == 0 {
            return Err(PickError::InvalidDimensions { width, height });
        }
        let device = &context.device;
        let color = RenderTarget::color(device, width, height);
        let depth = RenderTarget::depth(device, width, height);
        let pipeline = create_pipeline(device);
        let vertex_stream =
            VertexStream::new(device, "Picking Vertex Buffer", 1024);
        log::debug!("created {width}x{height} GPU picking target");

        Ok(Self {
            context,
            width,
            height,
            density: 1.0,
            buffer_width: width,
            buffer_height: height,
            color,
            depth,
            pipeline,
            vertex_stream,
            stack: TransformStack::new(width, height),
            fill: Color::WHITE,
            clear_color: Color::BLACK,
            vertices: Vec::new(),
            dirty: true,
        })
    }

    /// Current transform state.
    #[must_use]
    pub fn transform(&self) -> &TransformStack {
        &self.stack
    }

    /// Number of vertices recorded since the last clear.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn resize_buffers(&mut self, width: u32, height: u32) {
        if width == self.buffer_width && height == self.buffer_height {
            return;
        }
        self.buffer_width = width;
        self.buffer_height = height;
        self.color = RenderTarget::color(&self.context.device, width, height);
        self.depth = RenderTarget::depth(&self.context.device, width, height);
        self.dirty = true;
        log::debug!("GPU picking target drawing buffer now {width}x{height}");
    }

    /// Render all recorded geometry into the color/depth attachments.
    fn render(&mut self) {
        self.vertex_stream.upload(
            &self.context.device,
            &self.context.queue,
            &self.vertices,
        );

        let mut encoder = self.context.create_encoder();
        {
            let [r, g, b, a] = self.clear_color.to_array();
            let mut render_pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Picking Render Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &self.color.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: f64::from(r) / 255.0,
                                    g: f64::from(g) / 255.0,
                                    b: f64::from(b) / 255.0,
                                    a: f64::from(a) / 255.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    ..Default::default()
                });

            if let Some(slice) = self.vertex_stream.slice() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, slice);
                render_pass.draw(0..self.vertex_stream.count(), 0..1);
            }
        }
        self.context.submit(encoder);
        self.dirty = false;
    }

    /// Copy `region` to a staging buffer and wait for it to map.
    fn copy_region(
        &self,
        region: PixelRegion,
    ) -> Result<PixelBuffer, PickError> {
        let padded_row = padded_bytes_per_row(region.width);
        let staging = self.context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Picking Staging Buffer"),
            size: u64::from(padded_row) * u64::from(region.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        // Textures are addressed top-down; regions are bottom-up.
        let texture_y = self.buffer_height - region.y - region.height;
        let mut encoder = self.context.create_encoder();
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: texture_y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(region.height),
                },
            },
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
        self.context.submit(encoder);

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            if let Err(e) = tx.send(result) {
                log::error!("failed to deliver picking readback: {e:?}");
            }
        });
        let _ = self
            .context
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| PickError::Readback(e.to_string()))?;
        rx.recv()
            .map_err(|e| PickError::Readback(e.to_string()))?
            .map_err(|e| PickError::Readback(e.to_string()))?;

        let row_bytes = region.width as usize * 4;
        let mut data = Vec::with_capacity(row_bytes * region.height as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks_exact(padded_row as usize).rev() {
                data.extend_from_slice(&row[..row_bytes]);
            }
        }
        staging.unmap();

        Ok(PixelBuffer { region, data })
    }
}

impl Canvas for GpuPickingTarget {
    type Material = Color;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel_density(&self) -> f32 {
        self.density
    }

    fn set_pixel_density(&mut self, density: f32) {
        if !(density.is_finite() && density > 0.0) {
            log::warn!("ignoring invalid pixel density {density}");
            return;
        }
        self.density = density;
        let scaled = |v: u32| ((v as f32 * density).round() as u32).max(1);
        self.resize_buffers(scaled(self.width), scaled(self.height));
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.buffer_width, self.buffer_height)
    }

    fn background(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
        self.dirty = true;
    }

    fn apply_transform(&mut self, op: &TransformOp) {
        if let Err(e) = self.stack.apply(op) {
            log::warn!("GPU picking target ignored {op:?}: {e}");
        }
    }

    fn set_material(&mut self, material: &Color) {
        self.fill = *material;
    }

    fn draw_shape(&mut self, shape: &Shape) {
        let mvp = self.stack.model_view_projection();
        let color = self.fill.to_array();
        let mesh = shape.tessellate();
        self.vertices.reserve(mesh.indices.len());
        for tri in mesh.triangles() {
            for p in tri {
                self.vertices.push(FlatVertex {
                    clip_position: (mvp * p.extend(1.0)).to_array(),
                    color,
                });
            }
        }
        self.dirty = true;
    }
}

impl HiddenTarget for GpuPickingTarget {
    fn read_pixels(
        &mut self,
        region: PixelRegion,
    ) -> Result<PixelBuffer, PickError> {
        if region.width == 0
            || region.height == 0
            || !region.fits_within(self.buffer_width, self.buffer_height)
        {
            return Err(PickError::Readback(format!(
                "region {region:?} outside {}x{} buffer",
                self.buffer_width, self.buffer_height
            )));
        }
        if self.dirty {
            self.render();
        }
        self.copy_region(region)
    }
}

/// Row pitch for texture-to-buffer copies, rounded up to wgpu's alignment.
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

fn create_pipeline(device: &wgpu::Device) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Picking Flat ID Shader"),
        source: wgpu::ShaderSource::Wgsl(
            include_str!("../../assets/shaders/picking/flat_id.wgsl").into(),
        ),
    });

    let layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Picking Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Picking Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[FlatVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: PICKING_COLOR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: PICKING_DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run with `cargo test -- --ignored` on a machine with a GPU.
    const NEEDS_GPU: &str = "needs a GPU adapter";

    fn context() -> RenderContext {
        pollster::block_on(RenderContext::headless())
            .unwrap_or_else(|e| panic!("{NEEDS_GPU}: {e}"))
    }

    fn target(width: u32, height: u32) -> GpuPickingTarget {
        GpuPickingTarget::new(context(), width, height).unwrap()
    }

    #[test]
    fn row_pitch_is_aligned() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
    }

    #[test]
    fn flat_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<FlatVertex>(), 20);
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn gpu_readback_returns_flat_fill() {
        let mut target = target(64, 48);
        target.background(Color::BLACK);
        target.set_material(&Color::rgb(0x12, 0x34, 0x56));
        target.draw_shape(&Shape::cube(10.0));
        let center = target.read_pixels(PixelRegion::pixel(32, 24)).unwrap();
        assert_eq!(center.rgba_at(32, 24), Some(Color::rgb(0x12, 0x34, 0x56)));
        let corner = target.read_pixels(PixelRegion::pixel(0, 0)).unwrap();
        assert_eq!(corner.rgba_at(0, 0), Some(Color::BLACK));
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn gpu_full_readback_is_bottom_up() {
        let mut target = target(32, 32);
        target.background(Color::BLACK);
        target.set_material(&Color::rgb(0, 0, 9));
        // +y is down the screen: this lands in the bottom half.
        target.apply_transform(&TransformOp::Translate {
            x: 0.0,
            y: 8.0,
            z: 0.0,
        });
        target.draw_shape(&Shape::Plane {
            width: 32.0,
            height: 16.0,
        });
        let buffer = target.read_pixels(PixelRegion::full(32, 32)).unwrap();
        assert_eq!(buffer.rgba_at(16, 2), Some(Color::rgb(0, 0, 9)));
        assert_eq!(buffer.rgba_at(16, 29), Some(Color::BLACK));
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn gpu_target_can_share_an_existing_device() {
        let owner = context();
        let shared =
            RenderContext::from_device(owner.device.clone(), owner.queue.clone());
        let mut target = GpuPickingTarget::new(shared, 16, 16).unwrap();
        target.background(Color::rgb(0, 1, 0));
        let pixel = target.read_pixels(PixelRegion::pixel(3, 3)).unwrap();
        assert_eq!(pixel.rgba_at(3, 3), Some(Color::rgb(0, 1, 0)));
        assert_eq!(target.vertex_count(), 0);
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn gpu_region_outside_buffer_is_rejected() {
        let mut target = target(8, 8);
        assert!(matches!(
            target.read_pixels(PixelRegion::pixel(8, 0)),
            Err(PickError::Readback(_))
        ));
    }
}
