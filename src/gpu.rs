//! Offscreen wgpu presenter for point clouds.
//!
//! [`GpuSink`] owns a headless device and a color target. Each presented
//! frame uploads the displaced points (and any orbiting bodies) as instanced
//! camera-facing quads and draws them additively. Windowed hosts copy or
//! replace the target; the sink itself never touches a surface.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::error::{GpuError, PresentError};
use crate::frame::{BodyInstance, Frame, FrameSink, PresentOutcome};
use crate::sampler::PointVertex;

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// Vertex capacity of a fresh buffer.
const INITIAL_CAPACITY: usize = 4096;
/// Screen pixels per unit of body render radius.
const BODY_PIXELS_PER_UNIT: f32 = 60.0;

const POINT_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    viewport: vec2<f32>,
    time: f32,
    _pad: f32,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position_size: vec4<f32>,
    @location(1) color_fade: vec4<f32>,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    var clip = uniforms.view_proj * uniforms.model * vec4<f32>(position_size.xyz, 1.0);
    let offset = corner * position_size.w / uniforms.viewport * clip.w;
    clip = vec4<f32>(clip.xy + offset, clip.zw);

    var out: VertexOutput;
    out.clip_position = clip;
    out.color = color_fade;
    out.uv = corner;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let alpha = (1.0 - dist * dist) * in.color.a;
    return vec4<f32>(in.color.rgb * alpha, alpha);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    viewport: [f32; 2],
    time: f32,
    _padding: f32,
}

/// Headless device, pipeline and target.
pub struct GpuSink {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    /// Slot 0 uses the frame's model matrix, slot 1 the identity (bodies).
    uniform_buffers: [wgpu::Buffer; 2],
    bind_groups: [wgpu::BindGroup; 2],
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    staging: Vec<PointVertex>,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    width: u32,
    height: u32,
    frames_presented: u64,
}

impl GpuSink {
    /// Blocking constructor.
    pub fn new(width: u32, height: u32) -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async(width, height))
    }

    pub async fn new_async(width: u32, height: u32) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("wavesphere device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
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

        let uniform_buffers = [0, 1].map(|slot| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(if slot == 0 { "Model Uniforms" } else { "World Uniforms" }),
                size: std::mem::size_of::<Uniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        let bind_groups = [0, 1].map(|slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Uniform Bind Group"),
                layout: &bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffers[slot].as_entire_binding(),
                }],
            })
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PointVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &ATTRIBUTES,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent::OVER,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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

        let vertex_buffer = create_vertex_buffer(&device, INITIAL_CAPACITY);
        let (width, height) = (width.max(1), height.max(1));
        let (target, target_view) = create_target(&device, width, height);

        Ok(Self {
            device,
            queue,
            pipeline,
            uniform_buffers,
            bind_groups,
            vertex_buffer,
            vertex_capacity: INITIAL_CAPACITY,
            staging: Vec::with_capacity(INITIAL_CAPACITY),
            target,
            target_view,
            width,
            height,
            frames_presented: 0,
        })
    }

    /// Recreate the target at a new size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        let (target, view) = create_target(&self.device, width, height);
        self.target = target;
        self.target_view = view;
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn target(&self) -> &wgpu::Texture {
        &self.target
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    fn write_uniforms(&self, slot: usize, view_proj: Mat4, model: Mat4, time: f32) {
        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            viewport: [self.width as f32, self.height as f32],
            time,
            _padding: 0.0,
        };
        self.queue
            .write_buffer(&self.uniform_buffers[slot], 0, bytemuck::bytes_of(&uniforms));
    }

    fn ensure_capacity(&mut self, count: usize) {
        if count <= self.vertex_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        tracing::debug!(capacity, "growing point buffer");
        self.vertex_buffer = create_vertex_buffer(&self.device, capacity);
        self.vertex_capacity = capacity;
    }
}

impl FrameSink for GpuSink {
    fn present(&mut self, frame: &Frame<'_>) -> Result<PresentOutcome, PresentError> {
        let mut staging = std::mem::take(&mut self.staging);
        staging.clear();
        staging.extend(frame.points.iter().map(PointVertex::from));
        let point_count = staging.len() as u32;
        staging.extend(frame.bodies.iter().map(body_vertex));
        let total = staging.len() as u32;

        self.ensure_capacity(staging.len());
        if !staging.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&staging));
        }
        self.staging = staging;

        let view_proj = frame.view_projection();
        let time = frame.state.time.elapsed;
        self.write_uniforms(0, view_proj, frame.model, time);
        self.write_uniforms(1, view_proj, Mat4::IDENTITY, time);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            if point_count > 0 {
                pass.set_bind_group(0, &self.bind_groups[0], &[]);
                pass.draw(0..6, 0..point_count);
            }
            if total > point_count {
                pass.set_bind_group(0, &self.bind_groups[1], &[]);
                pass.draw(0..6, point_count..total);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.frames_presented += 1;
        Ok(PresentOutcome::Continue)
    }
}

fn body_vertex(body: &BodyInstance) -> PointVertex {
    PointVertex {
        position_size: [
            body.position.x,
            body.position.y,
            body.position.z,
            body.scale * BODY_PIXELS_PER_UNIT,
        ],
        color_fade: [body.color.x, body.color.y, body.color.z, 1.0],
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Point Buffer"),
        size: (capacity * std::mem::size_of::<PointVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_target(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Point Target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_uniform_layout() {
        // two mat4 + vec2 + two scalars, 16-byte aligned
        assert_eq!(std::mem::size_of::<Uniforms>(), 144);
        assert_eq!(std::mem::size_of::<PointVertex>(), 32);
    }

    #[test]
    fn test_body_vertex() {
        let v = body_vertex(&BodyInstance {
            position: Vec3::new(5.0, 0.0, 0.0),
            orientation: Quat::IDENTITY,
            scale: 0.5,
            color: Vec3::ONE,
        });
        assert_eq!(v.position_size, [5.0, 0.0, 0.0, 30.0]);
        assert_eq!(v.color_fade[3], 1.0);
    }
}
