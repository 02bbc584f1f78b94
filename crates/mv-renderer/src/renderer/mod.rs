//! wgpu render backend
//!
//! Draws into an offscreen color texture. The host decides how to present
//! it (the desktop app registers it as an egui texture).

pub mod gpu_resources;

use std::sync::Arc;

use mv_core::Color;

use crate::constants::viewport::COLOR_FORMAT;
use crate::context::RenderContext;
use crate::resources::{MaterialData, MaterialHandle, MaterialManager, MeshData, MeshHandle, MeshManager};
use crate::traits::{FrameData, RenderBackend, RenderError};

struct RenderTarget {
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(ctx: &RenderContext, width: u32, height: u32) -> Self {
        let (color_texture, color_view) =
            gpu_resources::create_color_texture(ctx.device(), ctx.color_format(), width, height);
        let (depth_texture, depth_view) = gpu_resources::create_depth_texture(
            ctx.device(),
            ctx.depth_format(),
            ctx.sample_count(),
            width,
            height,
        );
        Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
        }
    }

    fn destroy(&self) {
        self.color_texture.destroy();
        self.depth_texture.destroy();
    }
}

fn to_wgpu_color(color: Color) -> wgpu::Color {
    let linear = color.to_linear();
    wgpu::Color {
        r: linear.r as f64,
        g: linear.g as f64,
        b: linear.b as f64,
        a: linear.a as f64,
    }
}

/// GPU renderer implementing [`RenderBackend`].
pub struct Renderer {
    ctx: RenderContext,
    pipeline: wgpu::RenderPipeline,
    meshes: MeshManager,
    materials: MaterialManager,
    target: Option<RenderTarget>,
    width: u32,
    height: u32,
    target_version: u64,
}

impl Renderer {
    /// Creates a renderer with an offscreen target of the given size.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        width: u32,
        height: u32,
    ) -> Self {
        Self::with_format(device, queue, COLOR_FORMAT, width, height)
    }

    pub fn with_format(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let ctx = RenderContext::new(device, queue, format);
        let pipeline = gpu_resources::create_mesh_pipeline(&ctx);
        let target = RenderTarget::new(&ctx, width, height);

        tracing::info!("Renderer created ({}x{}, {:?})", width, height, format);

        Self {
            ctx,
            pipeline,
            meshes: MeshManager::new(),
            materials: MaterialManager::new(),
            target: Some(target),
            width,
            height,
            target_version: 1,
        }
    }

    /// View of the offscreen color texture, `None` after release.
    pub fn output_view(&self) -> Option<&wgpu::TextureView> {
        self.target.as_ref().map(|t| &t.color_view)
    }

    pub fn output_texture(&self) -> Option<&wgpu::Texture> {
        self.target.as_ref().map(|t| &t.color_texture)
    }

    /// Incremented every time the output texture is recreated.
    pub fn target_version(&self) -> u64 {
        self.target_version
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    fn encode_pass(&self, target: &RenderTarget, frame: Option<&FrameData<'_>>, clear: Color) {
        let mut encoder = self
            .ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewport Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(clear)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(frame) = frame
                && !frame.draws.is_empty()
            {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, self.ctx.frame_bind_group(), &[]);

                for draw in frame.draws {
                    let (Some(mesh), Some(material)) =
                        (self.meshes.get(draw.mesh), self.materials.get(draw.material))
                    else {
                        continue;
                    };
                    pass.set_bind_group(1, &material.bind_group, &[]);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    match &mesh.index_buffer {
                        Some(index_buffer) if mesh.is_indexed() => {
                            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                        }
                        _ => pass.draw(0..mesh.vertex_count, 0..1),
                    }
                }
            }
        }

        self.ctx.queue().submit(std::iter::once(encoder.finish()));
    }
}

impl RenderBackend for Renderer {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn upload_mesh(&mut self, data: &MeshData) -> Result<MeshHandle, RenderError> {
        if self.target.is_none() {
            return Err(RenderError::Released);
        }
        Ok(self.meshes.create(&self.ctx, data))
    }

    fn release_mesh(&mut self, handle: MeshHandle) -> bool {
        self.meshes.release(handle)
    }

    fn upload_material(&mut self, data: &MaterialData) -> Result<MaterialHandle, RenderError> {
        if self.target.is_none() {
            return Err(RenderError::Released);
        }
        Ok(self.materials.create(&self.ctx, data))
    }

    fn release_material(&mut self, handle: MaterialHandle) -> bool {
        self.materials.release(handle)
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        let target = self.target.as_ref().ok_or(RenderError::Released)?;
        self.encode_pass(target, None, color);
        Ok(())
    }

    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), RenderError> {
        let target = self.target.as_ref().ok_or(RenderError::Released)?;

        if let Some(missing) = frame
            .draws
            .iter()
            .find(|d| !self.meshes.contains(d.mesh) || self.materials.get(d.material).is_none())
        {
            return Err(RenderError::Surface(format!(
                "draw references released resources (mesh {}, material {})",
                missing.mesh.raw(),
                missing.material.raw()
            )));
        }

        self.ctx.update_camera(&frame.camera);
        self.ctx.update_lights(&frame.lights);
        self.encode_pass(target, Some(frame), frame.background);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        if let Some(old) = self.target.take() {
            old.destroy();
            self.target = Some(RenderTarget::new(&self.ctx, width, height));
            self.target_version += 1;
            tracing::debug!("Renderer target resized to {}x{}", width, height);
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        let Some(target) = self.target.take() else {
            return;
        };
        self.meshes.clear();
        self.materials.clear();
        target.destroy();
        self.ctx.destroy();
        tracing::info!("Renderer released");
    }

    fn is_released(&self) -> bool {
        self.target.is_none()
    }

    fn live_resources(&self) -> usize {
        self.meshes.len() + self.materials.len()
    }
}
