use super::helpers;
use crate::constants::{PLACEHOLDER_FLAT_DEPTH, PLACEHOLDER_TRANSPARENT};
use fx_core::{AssetRole, BlendMode, EdgePolicy, ParallaxFrame};
use image::RgbaImage;
use wgpu;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ParallaxUniforms {
    pub(crate) pointer_offset: [f32; 2],
    pub(crate) threshold: [f32; 2],
    pub(crate) cover_scale: [f32; 2],
    pub(crate) spotlight_centre: [f32; 2],
    pub(crate) spotlight_radii: [f32; 2],
    pub(crate) aspect: f32,
    pub(crate) edge_discard: f32,
    pub(crate) spotlight: f32,
    pub(crate) depth_ready: f32,
    pub(crate) opacity: f32,
    pub(crate) _pad: f32,
}

impl ParallaxUniforms {
    pub(crate) fn from_frame(frame: &ParallaxFrame, opacity: f32) -> Self {
        let (spotlight, radii) = match frame.blend {
            BlendMode::Spotlight {
                inner_radius,
                outer_radius,
            } if frame.secondary_ready => (1.0, [inner_radius, outer_radius]),
            _ => (0.0, [0.0, 0.0]),
        };
        Self {
            pointer_offset: frame.pointer_offset.to_array(),
            threshold: frame.threshold.to_array(),
            cover_scale: frame.cover_scale.to_array(),
            spotlight_centre: frame.spotlight_centre.to_array(),
            spotlight_radii: radii,
            aspect: frame.aspect,
            edge_discard: if frame.edge == EdgePolicy::Discard { 1.0 } else { 0.0 },
            spotlight,
            depth_ready: if frame.depth_ready { 1.0 } else { 0.0 },
            opacity,
            _pad: 0.0,
        }
    }
}

pub(crate) struct ParallaxPass {
    pipeline: wgpu::RenderPipeline,
    bgl: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    source: (wgpu::Texture, wgpu::TextureView),
    depth: (wgpu::Texture, wgpu::TextureView),
    secondary: (wgpu::Texture, wgpu::TextureView),
    bind_group: wgpu::BindGroup,
}

impl ParallaxPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("parallax_bgl"),
            entries: &[
                helpers::uniform_entry(0),
                helpers::sampler_entry(1),
                helpers::texture_entry(2),
                helpers::texture_entry(3),
                helpers::texture_entry(4),
            ],
        });
        let pipeline = helpers::make_layer_pipeline(
            device,
            "parallax_pipeline",
            &bgl,
            fx_core::PARALLAX_WGSL,
            "fs_parallax",
            format,
        );
        let uniform_buffer =
            helpers::uniform_buffer::<ParallaxUniforms>(device, "parallax_uniforms");
        let sampler = helpers::make_sampler(device, "parallax_sampler", wgpu::FilterMode::Linear);
        let source =
            helpers::placeholder_texture(device, queue, "parallax_source", PLACEHOLDER_TRANSPARENT);
        let depth =
            helpers::placeholder_texture(device, queue, "parallax_depth", PLACEHOLDER_FLAT_DEPTH);
        let secondary = helpers::placeholder_texture(
            device,
            queue,
            "parallax_secondary",
            PLACEHOLDER_TRANSPARENT,
        );
        let bind_group = Self::bind(
            device,
            &bgl,
            &uniform_buffer,
            &sampler,
            [&source.1, &depth.1, &secondary.1],
        );
        Self {
            pipeline,
            bgl,
            uniform_buffer,
            sampler,
            source,
            depth,
            secondary,
            bind_group,
        }
    }

    fn bind(
        device: &wgpu::Device,
        bgl: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
        views: [&wgpu::TextureView; 3],
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("parallax_bg"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(views[1]),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(views[2]),
                },
            ],
        })
    }

    /// Returns false for roles this pass has no slot for.
    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        role: AssetRole,
        image: &RgbaImage,
    ) -> bool {
        let slot = match role {
            AssetRole::Source => &mut self.source,
            AssetRole::Depth => &mut self.depth,
            AssetRole::Secondary => &mut self.secondary,
            AssetRole::Overlay => return false,
        };
        let label = format!("parallax_{role}");
        *slot = helpers::upload_image(device, queue, &label, image);
        self.bind_group = Self::bind(
            device,
            &self.bgl,
            &self.uniform_buffer,
            &self.sampler,
            [&self.source.1, &self.depth.1, &self.secondary.1],
        );
        true
    }

    /// Nothing is drawn until the source image is in; the canvas stays clear.
    pub(crate) fn prepare(&self, queue: &wgpu::Queue, frame: &ParallaxFrame, opacity: f32) -> bool {
        if !frame.source_ready {
            return false;
        }
        let u = ParallaxUniforms::from_frame(frame, opacity);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
        true
    }

    pub(crate) fn record(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}
