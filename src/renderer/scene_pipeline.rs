//! Raymarched WebGPU scene
//!
//! The whole machine is drawn in the fragment shader from signed distance
//! fields. The CPU side only packs uniforms from the game state and camera.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::assets::{DEFAULT_RADIUS, DEFAULT_WIDTH, ReelStrip};
use crate::camera::OrbitCamera;
use crate::consts::*;
use crate::input::StartButton;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState};

/// Maximum coins drawn at once (largest payout plus the attract coin)
pub const MAX_COINS: usize = 32;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2], // offset 0
    pub time: f32,            // offset 8
    pub coin_count: u32,      // offset 12
    /// xyz eye, w tan(fov_y / 2)
    pub eye: [f32; 4], // offset 16
    /// xyz look target, w aspect
    pub look_at: [f32; 4], // offset 32
    /// xyz reel rotations, w 1 when the reels are loaded
    pub reel_angles: [f32; 4], // offset 48
    /// x drum radius, y drum width, z button centre y, w shadows on
    pub reel_shape: [f32; 4], // offset 64
    /// x march steps
    pub march: [u32; 4], // offset 80
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PaletteUniform {
    pub colors: [[f32; 4]; SEGMENT_COUNT as usize],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CoinsUniform {
    /// xyz position, w roll
    pub coins: [[f32; 4]; MAX_COINS],
}

/// Presentation-only state that isn't part of the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneView {
    pub button: StartButton,
    pub show_attract: bool,
}

/// Everything uploaded for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub globals: Globals,
    pub palette: PaletteUniform,
    pub coins: CoinsUniform,
}

/// Pack the frame's uniforms
pub fn frame_uniforms(
    state: &GameState,
    camera: &OrbitCamera,
    strip: Option<&ReelStrip>,
    view: &SceneView,
    settings: &Settings,
    size: (u32, u32),
    elapsed: f32,
) -> FrameUniforms {
    let mut coins = CoinsUniform::zeroed();
    let mut coin_count = 0;
    for coin in state.visible_coins().take(MAX_COINS) {
        let pos = coin.position();
        coins.coins[coin_count] = [pos.x, pos.y, pos.z, coin.spin];
        coin_count += 1;
    }
    if view.show_attract && state.phase == GamePhase::Idle && coin_count < MAX_COINS {
        let pos = state.attract.position();
        coins.coins[coin_count] = [pos.x, pos.y, pos.z, state.attract.spin];
        coin_count += 1;
    }

    let eye = camera.eye();
    let target = camera.target;
    let reels_visible = if strip.is_some() { 1.0 } else { 0.0 };
    let (radius, width) = strip
        .map(|s| (s.radius, s.width))
        .unwrap_or((DEFAULT_RADIUS, DEFAULT_WIDTH));

    let globals = Globals {
        resolution: [size.0 as f32, size.1 as f32],
        time: elapsed,
        coin_count: coin_count as u32,
        eye: [eye.x, eye.y, eye.z, (camera.fov_y() * 0.5).tan()],
        look_at: [target.x, target.y, target.z, camera.aspect],
        reel_angles: [
            state.reels[0].display_angle,
            state.reels[1].display_angle,
            state.reels[2].display_angle,
            reels_visible,
        ],
        reel_shape: [
            radius,
            width,
            view.button.center().y,
            if settings.shadows() { 1.0 } else { 0.0 },
        ],
        march: [settings.quality.march_steps(), 0, 0, 0],
    };

    let palette = PaletteUniform {
        colors: strip
            .map(|s| s.palette())
            .unwrap_or([[1.0; 4]; SEGMENT_COUNT as usize]),
    };

    FrameUniforms {
        globals,
        palette,
        coins,
    }
}

// ============================================================================
// SCENE RENDER STATE
// ============================================================================

pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    // Uniform buffers
    globals_buffer: wgpu::Buffer,
    palette_buffer: wgpu::Buffer,
    coins_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    start_time: f64,
}

impl SceneRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("scene-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let palette_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("palette"),
            contents: bytemuck::bytes_of(&PaletteUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let coins_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("coins"),
            contents: bytemuck::bytes_of(&CoinsUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: palette_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: coins_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            palette_buffer,
            coins_buffer,
            bind_group,
            size: (width, height),
            start_time: 0.0,
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    pub fn render(
        &mut self,
        state: &GameState,
        camera: &OrbitCamera,
        strip: Option<&ReelStrip>,
        view: &SceneView,
        settings: &Settings,
        time: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        let elapsed = ((time - self.start_time) / 1000.0) as f32;
        let uniforms = frame_uniforms(state, camera, strip, view, settings, self.size, elapsed);

        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&uniforms.globals));
        self.queue
            .write_buffer(&self.palette_buffer, 0, bytemuck::bytes_of(&uniforms.palette));
        self.queue
            .write_buffer(&self.coins_buffer, 0, bytemuck::bytes_of(&uniforms.coins));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
