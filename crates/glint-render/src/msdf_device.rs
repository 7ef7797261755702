//! wgpu-backed [`RenderContext`] that draws MSDF text.
//!
//! Draws submitted through [`RenderContext::draw_instanced`] are recorded and
//! replayed into a render pass by [`MsdfDevice::encode`].

use std::sync::Arc;

use glint_core::alloc::HashMap;
use glint_core::profiling::profile_function;
use glint_test_utils::{GpuBuffer, GpuTexture, InstancedDraw, RenderContext};
use parking_lot::Mutex;
use wgpu::util::DeviceExt;

use crate::vertex::{MsdfVertex, TextInstance};
use crate::GraphicsContext;

/// Technique names paired with the fragment entry point each one uses.
pub const TECHNIQUES: [(&str, &str); 5] = [
    ("msdf_standard", "fs_standard"),
    ("msdf_standard_stroke", "fs_standard_stroke"),
    ("msdf_tiny", "fs_tiny"),
    ("msdf_tiny_stroke", "fs_tiny_stroke"),
    ("msdf_subpixel", "fs_subpixel"),
];

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct MsdfUniforms {
    view_projection: [[f32; 4]; 4],
    zoom: f32,
    _padding: [f32; 3],
}

struct RecordedDraw {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    index_count: u32,
    instance_count: u32,
}

/// GPU device for MSDF text: creates buffers, uploads atlases and owns one
/// pipeline per technique.
pub struct MsdfDevice {
    context: Arc<GraphicsContext>,
    pipelines: HashMap<&'static str, wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    recorded: Mutex<Vec<RecordedDraw>>,
}

impl MsdfDevice {
    /// Create the device and its pipelines for the given color target format.
    pub fn new(context: Arc<GraphicsContext>, target_format: wgpu::TextureFormat) -> Self {
        profile_function!();
        let device = &context.device;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MSDF Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MSDF Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("MSDF Text Shader"),
            source: wgpu::ShaderSource::Wgsl(MSDF_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("MSDF Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::default();
        for (technique, fragment_entry) in TECHNIQUES {
            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(technique),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MsdfVertex::layout(), TextInstance::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
            pipelines.insert(technique, pipeline);
        }

        tracing::debug!("Created MSDF device with {} techniques", pipelines.len());

        Self {
            context,
            pipelines,
            bind_group_layout,
            sampler,
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &Arc<GraphicsContext> {
        &self.context
    }

    /// Upload an RGBA8 atlas image and wrap it for the text renderer.
    pub fn create_atlas_texture(&self, width: u32, height: u32, rgba: &[u8]) -> GpuTexture {
        profile_function!();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSDF Atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Distances are linear data.
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        GpuTexture::from_wgpu(texture)
    }

    /// Number of draws recorded since the last [`encode`](Self::encode).
    pub fn pending_draws(&self) -> usize {
        self.recorded.lock().len()
    }

    /// Replay every recorded draw into `pass` and clear the record.
    pub fn encode(&self, pass: &mut wgpu::RenderPass<'_>) {
        profile_function!();
        let draws = std::mem::take(&mut *self.recorded.lock());
        if draws.is_empty() {
            return;
        }

        pass.push_debug_group("MsdfDevice::encode");
        for draw in &draws {
            pass.set_pipeline(&draw.pipeline);
            pass.set_bind_group(0, &draw.bind_group, &[]);
            pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, draw.instance_buffer.slice(..));
            pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..draw.index_count, 0, 0..draw.instance_count);
        }
        pass.pop_debug_group();
    }
}

impl RenderContext for MsdfDevice {
    fn create_buffer(&self, desc: &wgpu::BufferDescriptor) -> GpuBuffer {
        GpuBuffer::from_wgpu(self.context.device.create_buffer(desc))
    }

    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]) {
        self.context.queue.write_buffer(buffer.as_wgpu(), offset, data);
    }

    fn draw_instanced(&self, draw: &InstancedDraw) {
        let Some(pipeline) = self.pipelines.get(draw.technique) else {
            tracing::warn!("Unknown MSDF technique '{}', draw skipped", draw.technique);
            return;
        };

        let uniforms = MsdfUniforms {
            view_projection: draw.view_projection,
            zoom: draw.zoom,
            _padding: [0.0; 3],
        };
        let uniform_buffer =
            self.context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("MSDF Uniforms"),
                    contents: bytemuck::bytes_of(&uniforms),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
        let atlas_view = draw
            .atlas
            .as_wgpu()
            .create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self
            .context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("MSDF Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&atlas_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

        self.recorded.lock().push(RecordedDraw {
            pipeline: pipeline.clone(),
            bind_group,
            vertex_buffer: draw.vertex_buffer.as_wgpu().clone(),
            index_buffer: draw.index_buffer.as_wgpu().clone(),
            instance_buffer: draw.instance_buffer.as_wgpu().clone(),
            index_count: draw.index_count,
            instance_count: draw.instance_count,
        });
    }
}

/// WGSL shader for MSDF glyph quads.
///
/// Every instance walks the whole index buffer; quads whose `vertex_id` falls
/// outside the instance's vertex range are pushed out of the clip volume.
const MSDF_SHADER: &str = r#"
struct Uniforms {
    view_projection: mat4x4<f32>,
    zoom: f32,
}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
@group(0) @binding(1)
var atlas: texture_2d<f32>;
@group(0) @binding(2)
var atlas_sampler: sampler;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) tex_coords: vec2<f32>,
    @location(2) fill: vec4<f32>,
    @location(3) stroke: vec4<f32>,
    @location(4) vertex_id: u32,
}

struct InstanceInput {
    @location(5) world_0: vec4<f32>,
    @location(6) world_1: vec4<f32>,
    @location(7) world_2: vec4<f32>,
    @location(8) world_3: vec4<f32>,
    @location(9) pixel_ranges: vec2<f32>,
    @location(10) vertex_range: vec2<u32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
    @location(1) fill: vec4<f32>,
    @location(2) stroke: vec4<f32>,
    @location(3) screen_px_range: f32,
}

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    var out: VertexOutput;
    if vertex.vertex_id < instance.vertex_range.x || vertex.vertex_id >= instance.vertex_range.y {
        out.clip_position = vec4<f32>(0.0, 0.0, -2.0, 1.0);
        return out;
    }

    let world = mat4x4<f32>(instance.world_0, instance.world_1, instance.world_2, instance.world_3);
    out.clip_position = uniforms.view_projection * world * vec4<f32>(vertex.position, 0.0, 1.0);
    out.tex_coords = vertex.tex_coords;
    out.fill = vertex.fill;
    out.stroke = vertex.stroke;
    out.screen_px_range = max(instance.pixel_ranges.x * uniforms.zoom, 1.0);
    return out;
}

fn median(r: f32, g: f32, b: f32) -> f32 {
    return max(min(r, g), min(max(r, g), b));
}

fn signed_distance(uv: vec2<f32>) -> f32 {
    let msd = textureSample(atlas, atlas_sampler, uv);
    return median(msd.r, msd.g, msd.b) - 0.5;
}

fn fill_only(in: VertexOutput, px_range: f32, bias: f32) -> vec4<f32> {
    let distance = px_range * (signed_distance(in.tex_coords) + bias);
    let opacity = clamp(distance + 0.5, 0.0, 1.0);
    return vec4<f32>(in.fill.rgb, in.fill.a * opacity);
}

fn fill_with_stroke(in: VertexOutput, px_range: f32, bias: f32) -> vec4<f32> {
    let sd = signed_distance(in.tex_coords) + bias;
    let fill_opacity = clamp(px_range * sd + 0.5, 0.0, 1.0);
    // Outline extends a quarter of the distance range past the glyph edge.
    let stroke_opacity = clamp(px_range * (sd + 0.25) + 0.5, 0.0, 1.0);
    let color = mix(in.stroke, in.fill, fill_opacity);
    return vec4<f32>(color.rgb, color.a * stroke_opacity);
}

@fragment
fn fs_standard(in: VertexOutput) -> @location(0) vec4<f32> {
    return fill_only(in, in.screen_px_range, 0.0);
}

@fragment
fn fs_standard_stroke(in: VertexOutput) -> @location(0) vec4<f32> {
    return fill_with_stroke(in, in.screen_px_range, 0.0);
}

@fragment
fn fs_tiny(in: VertexOutput) -> @location(0) vec4<f32> {
    // Small text thickens slightly and keeps a sharper edge.
    return fill_only(in, max(in.screen_px_range, 2.0), 0.05);
}

@fragment
fn fs_tiny_stroke(in: VertexOutput) -> @location(0) vec4<f32> {
    return fill_with_stroke(in, max(in.screen_px_range, 2.0), 0.05);
}

@fragment
fn fs_subpixel(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = dpdx(in.tex_coords) / 3.0;
    let r = clamp(in.screen_px_range * signed_distance(in.tex_coords - texel) + 0.5, 0.0, 1.0);
    let g = clamp(in.screen_px_range * signed_distance(in.tex_coords) + 0.5, 0.0, 1.0);
    let b = clamp(in.screen_px_range * signed_distance(in.tex_coords + texel) + 0.5, 0.0, 1.0);
    let coverage = vec3<f32>(r, g, b);
    let alpha = max(max(r, g), b);
    return vec4<f32>(in.fill.rgb * coverage / max(alpha, 0.0001), in.fill.a * alpha);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_is_aligned() {
        assert_eq!(std::mem::size_of::<MsdfUniforms>(), 80);
        assert_eq!(std::mem::size_of::<MsdfUniforms>() % 16, 0);
    }

    #[test]
    fn test_every_technique_has_fragment_entry() {
        for (technique, entry) in TECHNIQUES {
            assert!(technique.starts_with("msdf_"));
            assert!(MSDF_SHADER.contains(&format!("fn {}(", entry)));
        }
    }
}
