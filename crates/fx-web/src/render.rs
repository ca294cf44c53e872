mod helpers;
mod parallax;
mod topo;
mod trail;

use crate::dom;
use fx_core::{
    AssetRole, EffectConfig, FxError, LayerConfig, LayerFrameKind, RenderBackend, StackFrame,
    ViewportState,
};
use image::RgbaImage;
use parallax::ParallaxPass;
use topo::TopoPass;
use trail::TrailPass;
use web_sys as web;
use wgpu;

enum LayerPass {
    Parallax(ParallaxPass),
    Trail(TrailPass),
    Topo(TopoPass),
}

/// One canvas with its own surface, drawing a single effect.
struct LayerTarget {
    canvas: web::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pass: LayerPass,
}

impl LayerTarget {
    fn resize_if_needed(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(device, &self.config);
        }
    }
}

/// Shared device plus one surface per layer canvas. Layer `i` of the stack
/// draws into `targets[i]`.
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    targets: Vec<LayerTarget>,
}

fn unsupported(e: impl std::fmt::Debug) -> FxError {
    FxError::UnsupportedContext(format!("{e:?}"))
}

impl Renderer {
    pub async fn new(
        canvases: &[web::HtmlCanvasElement],
        configs: &[LayerConfig],
    ) -> Result<Self, FxError> {
        if canvases.len() != configs.len() {
            return Err(FxError::Render(format!(
                "{} canvases for {} layer configs",
                canvases.len(),
                configs.len()
            )));
        }
        let instance = wgpu::Instance::default();
        let mut surfaces = Vec::with_capacity(canvases.len());
        for canvas in canvases {
            let surface = instance
                .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
                .map_err(unsupported)?;
            surfaces.push(surface);
        }
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surfaces.first(),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| FxError::UnsupportedContext("no WebGPU or WebGL2 adapter".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    label: Some("fx_device"),
                },
                None,
            )
            .await
            .map_err(unsupported)?;
        log::info!("[render] adapter: {:?}", adapter.get_info().backend);

        let mut targets = Vec::with_capacity(canvases.len());
        for ((canvas, surface), layer) in canvases.iter().zip(surfaces).zip(configs) {
            let caps = surface.get_capabilities(&adapter);
            let Some(&fallback) = caps.formats.first() else {
                return Err(FxError::UnsupportedContext(format!(
                    "canvas for layer {:?} has no surface formats",
                    layer.name
                )));
            };
            // non-srgb so image colours reach the page unchanged
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| {
                    matches!(
                        f,
                        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                    )
                })
                .unwrap_or(fallback);
            let alpha_mode = if caps
                .alpha_modes
                .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
            {
                wgpu::CompositeAlphaMode::PreMultiplied
            } else {
                caps.alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
            };
            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: canvas.width().max(1),
                height: canvas.height().max(1),
                present_mode: wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
                desired_maximum_frame_latency: 2,
            };
            surface.configure(&device, &config);

            let pass = match &layer.effect {
                EffectConfig::Parallax(_) => {
                    LayerPass::Parallax(ParallaxPass::new(&device, &queue, format))
                }
                EffectConfig::Trail(c) => {
                    LayerPass::Trail(TrailPass::new(&device, &queue, format, c.resolution))
                }
                EffectConfig::Topo(_) => LayerPass::Topo(TopoPass::new(&device, format)),
            };
            targets.push(LayerTarget {
                canvas: canvas.clone(),
                surface,
                config,
                pass,
            });
        }
        Ok(Self {
            device,
            queue,
            targets,
        })
    }

    fn draw_layer(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &mut LayerTarget,
        kind: &LayerFrameKind<'_>,
        opacity: f32,
    ) -> Result<(), FxError> {
        let size = (target.config.width, target.config.height);
        let visible = match (&mut target.pass, kind) {
            (LayerPass::Parallax(p), LayerFrameKind::Parallax(f)) => p.prepare(queue, f, opacity),
            (LayerPass::Trail(p), LayerFrameKind::Trail(f)) => p.prepare(device, queue, f, opacity),
            (LayerPass::Topo(p), LayerFrameKind::Topo(f)) => p.prepare(queue, f, size, opacity),
            _ => return Err(FxError::Render("layer frame does not match its pass".into())),
        };

        let frame = match target.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                target.surface.configure(device, &target.config);
                return Err(FxError::Render(format!("surface {e}; reconfigured")));
            }
            Err(e) => return Err(FxError::Render(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("layer_encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("layer_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if visible {
                match &target.pass {
                    LayerPass::Parallax(p) => p.record(&mut rpass),
                    LayerPass::Trail(p) => p.record(&mut rpass),
                    LayerPass::Topo(p) => p.record(&mut rpass),
                }
            }
        }
        queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl RenderBackend for Renderer {
    fn resize(&mut self, viewport: &ViewportState) {
        let (w, h) = viewport.backing_size();
        for target in &mut self.targets {
            dom::sync_canvas_backing_size(&target.canvas, viewport);
            target.resize_if_needed(&self.device, w, h);
        }
        log::debug!("[render] resized {} surface(s) to {}x{}", self.targets.len(), w, h);
    }

    fn upload_asset(
        &mut self,
        layer: usize,
        role: AssetRole,
        image: &RgbaImage,
    ) -> Result<(), FxError> {
        let target = self
            .targets
            .get_mut(layer)
            .ok_or(FxError::UnknownLayer(layer))?;
        let accepted = match &mut target.pass {
            LayerPass::Parallax(p) => p.upload(&self.device, &self.queue, role, image),
            LayerPass::Trail(p) => p.upload(&self.device, &self.queue, role, image),
            LayerPass::Topo(_) => false,
        };
        if !accepted {
            return Err(FxError::Render(format!(
                "layer {layer} has no {role} texture"
            )));
        }
        let (w, h) = image.dimensions();
        log::info!("[render] layer {} {} uploaded ({}x{})", layer, role, w, h);
        Ok(())
    }

    /// A failing layer does not stop the others; the first error is returned.
    fn draw(&mut self, frame: &StackFrame<'_>) -> Result<(), FxError> {
        let mut first_err = None;
        for layer in &frame.layers {
            let Some(target) = self.targets.get_mut(layer.index) else {
                first_err.get_or_insert(FxError::UnknownLayer(layer.index));
                continue;
            };
            if let Err(e) =
                Self::draw_layer(&self.device, &self.queue, target, &layer.kind, layer.opacity)
            {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
