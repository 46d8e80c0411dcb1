//! wgpu quad renderer for the windowed game.
//!
//! The renderer does not own the event loop and knows nothing about entities.
//! Each frame it receives the [`DrawCommand`]s recorded by a
//! [`DrawList`](crate::canvas::DrawList), turns them into a flat triangle
//! list in pixel space and draws it with a single pipeline.
//!
//! | Command  | Geometry                                  |
//! |----------|-------------------------------------------|
//! | `Clear`  | render pass clear color                   |
//! | `Rect`   | two triangles, or four 1px bars if outlined |
//! | `Circle` | [`CIRCLE_SEGMENTS`]-triangle fan            |

use std::sync::Arc;

use coil_ecs::component::Color;
use wgpu::util::DeviceExt;

use crate::canvas::DrawCommand;

// ---------------------------------------------------------------------------
// Vertex
// ---------------------------------------------------------------------------

/// A 2D position in pixels plus an RGBA color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Camera2D
// ---------------------------------------------------------------------------

/// Orthographic camera over pixel space with y pointing down.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    pub width: f32,
    pub height: f32,
    /// Center of the view in pixels.
    pub x: f32,
    pub y: f32,
}

impl Camera2D {
    /// A camera showing exactly `[0, width) x [0, height)`.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1) as f32, height.max(1) as f32);
        Self {
            width,
            height,
            x: width / 2.0,
            y: height / 2.0,
        }
    }

    /// Column-major projection mapping the view to clip space. The top edge
    /// (smallest y) maps to +1.
    pub fn orthographic_matrix(&self) -> [f32; 16] {
        let left = self.x - self.width / 2.0;
        let right = self.x + self.width / 2.0;
        let top = self.y - self.height / 2.0;
        let bottom = self.y + self.height / 2.0;

        let sx = 2.0 / (right - left);
        let sy = 2.0 / (top - bottom);
        let tx = -(right + left) / (right - left);
        let ty = -(top + bottom) / (top - bottom);

        #[rustfmt::skip]
        let m = [
            sx,  0.0, 0.0, 0.0,
            0.0, sy,  0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            tx,  ty,  0.0, 1.0,
        ];
        m
    }
}

// ---------------------------------------------------------------------------
// Tessellation
// ---------------------------------------------------------------------------

pub const CIRCLE_SEGMENTS: usize = 16;
const MAX_VERTICES: usize = 65_536;

/// Flatten a frame into a clear color and a triangle list.
///
/// The clear color comes from the last `Clear` command, black if there is
/// none.
pub fn tessellate(commands: &[DrawCommand]) -> (Color, Vec<Vertex>) {
    let mut clear = Color::BLACK;
    let mut vertices = Vec::new();
    for command in commands {
        match *command {
            DrawCommand::Clear(color) => clear = color,
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color,
                outline,
            } => {
                let c = color.to_rgba_f32();
                let (x, y, w, h) = (x as f32, y as f32, width as f32, height as f32);
                if outline {
                    push_quad(&mut vertices, x, y, w, 1.0, c);
                    push_quad(&mut vertices, x, y + h - 1.0, w, 1.0, c);
                    push_quad(&mut vertices, x, y, 1.0, h, c);
                    push_quad(&mut vertices, x + w - 1.0, y, 1.0, h, c);
                } else {
                    push_quad(&mut vertices, x, y, w, h, c);
                }
            }
            DrawCommand::Circle {
                cx,
                cy,
                radius,
                color,
            } => push_circle(&mut vertices, cx as f32, cy as f32, radius as f32, color.to_rgba_f32()),
        }
    }
    (clear, vertices)
}

fn push_quad(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
    let corners = [[x, y], [x + w, y], [x + w, y + h], [x, y], [x + w, y + h], [x, y + h]];
    out.extend(corners.into_iter().map(|position| Vertex { position, color }));
}

fn push_circle(out: &mut Vec<Vertex>, cx: f32, cy: f32, r: f32, color: [f32; 4]) {
    let step = std::f32::consts::TAU / CIRCLE_SEGMENTS as f32;
    let rim = |i: usize| {
        let a = i as f32 * step;
        [cx + r * a.cos(), cy + r * a.sin()]
    };
    for i in 0..CIRCLE_SEGMENTS {
        for position in [[cx, cy], rim(i), rim(i + 1)] {
            out.push(Vertex { position, color });
        }
    }
}

// ---------------------------------------------------------------------------
// QuadRenderer
// ---------------------------------------------------------------------------

/// GPU state for drawing tessellated frames into a window surface.
pub struct QuadRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    window: Arc<winit::window::Window>,
    pub camera: Camera2D,
}

impl QuadRenderer {
    /// Select an adapter, configure the surface and build the pipeline.
    ///
    /// # Errors
    ///
    /// Fails when no adapter or device is available for the window.
    pub async fn new(window: Arc<winit::window::Window>) -> Result<Self, anyhow::Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no suitable GPU adapter found"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("coil_renderer"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no texture formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("coil_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let camera = Camera2D::for_viewport(width, height);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_uniform"),
            contents: bytemuck::cast_slice(&camera.orthographic_matrix()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("coil_pipeline_layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("coil_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vertex_buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            vertex_buffer,
            camera_buffer,
            camera_bind_group,
            window,
            camera,
        })
    }

    /// Draw one frame and present it.
    ///
    /// # Errors
    ///
    /// Returns the surface error when no output texture is available
    /// (minimized window, lost surface).
    pub fn render(&mut self, commands: &[DrawCommand]) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&self.camera.orthographic_matrix()),
        );

        let (clear, mut vertices) = tessellate(commands);
        if vertices.len() > MAX_VERTICES {
            tracing::warn!(vertices = vertices.len(), max = MAX_VERTICES, "frame truncated");
            vertices.truncate(MAX_VERTICES - MAX_VERTICES % 3);
        }
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("coil_encoder"),
            });

        {
            let [r, g, b, a] = clear.to_rgba_f32();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("coil_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.render_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            if !vertices.is_empty() {
                pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Reconfigure the surface and camera for a new window size. Zero-sized
    /// windows (minimized) are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera = Camera2D::for_viewport(new_size.width, new_size.height);
        }
    }

    pub fn window(&self) -> &winit::window::Window {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: &[f32; 16], x: f32, y: f32) -> (f32, f32) {
        (m[0] * x + m[4] * y + m[12], m[1] * x + m[5] * y + m[13])
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5
    }

    #[test]
    fn camera_maps_corners_with_y_down() {
        let m = Camera2D::for_viewport(900, 600).orthographic_matrix();
        assert!(close(apply(&m, 0.0, 0.0), (-1.0, 1.0)));
        assert!(close(apply(&m, 900.0, 600.0), (1.0, -1.0)));
        assert!(close(apply(&m, 450.0, 300.0), (0.0, 0.0)));
    }

    #[test]
    fn rect_and_outline_vertex_counts() {
        let rect = |outline| DrawCommand::Rect {
            x: 0,
            y: 0,
            width: 20,
            height: 20,
            color: Color::WHITE,
            outline,
        };
        assert_eq!(tessellate(&[rect(false)]).1.len(), 6);
        assert_eq!(tessellate(&[rect(true)]).1.len(), 24);
    }

    #[test]
    fn circle_is_a_fan_around_its_centre() {
        let (_, v) = tessellate(&[DrawCommand::Circle {
            cx: 50,
            cy: 50,
            radius: 10,
            color: Color::WHITE,
        }]);
        assert_eq!(v.len(), CIRCLE_SEGMENTS * 3);
        assert!(v.iter().step_by(3).all(|vx| vx.position == [50.0, 50.0]));
        for vx in &v {
            let (dx, dy) = (vx.position[0] - 50.0, vx.position[1] - 50.0);
            assert!((dx * dx + dy * dy).sqrt() <= 10.0 + 1e-3);
        }
    }

    #[test]
    fn last_clear_wins() {
        let red = Color::rgb(255, 0, 0);
        let (clear, v) = tessellate(&[DrawCommand::Clear(Color::WHITE), DrawCommand::Clear(red)]);
        assert_eq!(clear, red);
        assert!(v.is_empty());
    }
}
