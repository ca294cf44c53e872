use super::helpers;
use crate::constants::PLACEHOLDER_TRANSPARENT;
use fx_core::{write_r8, AssetRole, TrailFrame};
use image::RgbaImage;
use wgpu;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct TrailUniforms {
    pub(crate) color: [f32; 3],
    pub(crate) opacity: f32,
    pub(crate) cover_scale: [f32; 2],
    pub(crate) overlay_cover_scale: [f32; 2],
    pub(crate) resolution: f32,
    pub(crate) overlay_ready: f32,
    pub(crate) _pad: [f32; 2],
}

pub(crate) struct TrailPass {
    pipeline: wgpu::RenderPipeline,
    bgl: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    field_sampler: wgpu::Sampler,
    overlay_sampler: wgpu::Sampler,
    field: (wgpu::Texture, wgpu::TextureView),
    field_resolution: u32,
    field_bytes: Vec<u8>,
    overlay: (wgpu::Texture, wgpu::TextureView),
    bind_group: wgpu::BindGroup,
}

impl TrailPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        resolution: u32,
    ) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trail_bgl"),
            entries: &[
                helpers::uniform_entry(0),
                helpers::sampler_entry(1),
                helpers::texture_entry(2),
                helpers::sampler_entry(3),
                helpers::texture_entry(4),
            ],
        });
        let pipeline = helpers::make_layer_pipeline(
            device,
            "trail_pipeline",
            &bgl,
            fx_core::TRAIL_WGSL,
            "fs_trail",
            format,
        );
        let uniform_buffer = helpers::uniform_buffer::<TrailUniforms>(device, "trail_uniforms");
        // hard cell edges
        let field_sampler =
            helpers::make_sampler(device, "trail_field_sampler", wgpu::FilterMode::Nearest);
        let overlay_sampler =
            helpers::make_sampler(device, "trail_overlay_sampler", wgpu::FilterMode::Linear);
        let resolution = resolution.max(1);
        let field = helpers::create_texture(
            device,
            "trail_field",
            resolution,
            resolution,
            wgpu::TextureFormat::R8Unorm,
        );
        let overlay =
            helpers::placeholder_texture(device, queue, "trail_overlay", PLACEHOLDER_TRANSPARENT);
        let bind_group = Self::bind(
            device,
            &bgl,
            &uniform_buffer,
            (&field_sampler, &field.1),
            (&overlay_sampler, &overlay.1),
        );
        Self {
            pipeline,
            bgl,
            uniform_buffer,
            field_sampler,
            overlay_sampler,
            field,
            field_resolution: resolution,
            field_bytes: vec![0; (resolution * resolution) as usize],
            overlay,
            bind_group,
        }
    }

    fn bind(
        device: &wgpu::Device,
        bgl: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        field: (&wgpu::Sampler, &wgpu::TextureView),
        overlay: (&wgpu::Sampler, &wgpu::TextureView),
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trail_bg"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(field.0),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(field.1),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(overlay.0),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(overlay.1),
                },
            ],
        })
    }

    fn rebind(&mut self, device: &wgpu::Device) {
        self.bind_group = Self::bind(
            device,
            &self.bgl,
            &self.uniform_buffer,
            (&self.field_sampler, &self.field.1),
            (&self.overlay_sampler, &self.overlay.1),
        );
    }

    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        role: AssetRole,
        image: &RgbaImage,
    ) -> bool {
        if role != AssetRole::Overlay {
            return false;
        }
        self.overlay = helpers::upload_image(device, queue, "trail_overlay", image);
        self.rebind(device);
        true
    }

    pub(crate) fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &TrailFrame<'_>,
        opacity: f32,
    ) -> bool {
        let res = frame.resolution.max(1);
        if res != self.field_resolution {
            self.field = helpers::create_texture(
                device,
                "trail_field",
                res,
                res,
                wgpu::TextureFormat::R8Unorm,
            );
            self.field_resolution = res;
            self.field_bytes = vec![0; (res * res) as usize];
            self.rebind(device);
        }
        write_r8(frame.field, &mut self.field_bytes);
        helpers::write_texture(queue, &self.field.0, &self.field_bytes, res, res, 1);

        let u = TrailUniforms {
            color: frame.color,
            opacity,
            cover_scale: frame.cover_scale.to_array(),
            overlay_cover_scale: frame.overlay_cover_scale.to_array(),
            resolution: res as f32,
            overlay_ready: if frame.overlay_ready { 1.0 } else { 0.0 },
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
        true
    }

    pub(crate) fn record(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}
