use super::helpers;
use fx_core::TopoFrame;
use wgpu;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct TopoUniforms {
    pub(crate) color: [f32; 3],
    pub(crate) time: f32,
    pub(crate) pointer_uv: [f32; 2],
    pub(crate) resolution: [f32; 2],
    pub(crate) aspect: f32,
    pub(crate) line_count: f32,
    pub(crate) line_width: f32,
    pub(crate) opacity: f32,
}

pub(crate) struct TopoPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl TopoPass {
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("topo_bgl"),
            entries: &[helpers::uniform_entry(0)],
        });
        let pipeline = helpers::make_layer_pipeline(
            device,
            "topo_pipeline",
            &bgl,
            fx_core::TOPO_WGSL,
            "fs_topo",
            format,
        );
        let uniform_buffer = helpers::uniform_buffer::<TopoUniforms>(device, "topo_uniforms");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("topo_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    pub(crate) fn prepare(
        &self,
        queue: &wgpu::Queue,
        frame: &TopoFrame,
        size: (u32, u32),
        opacity: f32,
    ) -> bool {
        let u = TopoUniforms {
            color: frame.color,
            time: frame.time_sec,
            pointer_uv: frame.pointer_uv.to_array(),
            resolution: [size.0 as f32, size.1 as f32],
            aspect: frame.aspect,
            line_count: frame.line_count as f32,
            line_width: frame.line_width,
            opacity,
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
