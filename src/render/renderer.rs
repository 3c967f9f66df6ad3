use anyhow::{anyhow, bail, Result};
use glam::Vec3;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;
use wgpu::util::{BufferInitDescriptor, DeviceExt, TextureDataOrder};
use wgpu::{BindGroup, BindGroupLayout, Device, RenderPipeline, TextureView};
use winit::window::Window;

use crate::assets::AssetId;
use crate::camera::OrbitCamera;
use crate::core::{GpuContext, WindowSurface};
use crate::loaders::{ModelData, TextureData};
use crate::scene::{DrawItem, DrawLayer};
use crate::traits::{AssetPayload, SceneHost};
use crate::types::{DrawUniform, GlobalsUniform, MeshData, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_DRAW_CAPACITY: usize = 64;

/// Scene lights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub directional: f32,
    /// Position the directional light shines from, toward the origin
    pub directional_from: Vec3,
    pub point: f32,
    pub point_position: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            directional: 0.5,
            directional_from: Vec3::new(0.0, 32.0, 64.0),
            point: 1.0,
            point_position: Vec3::ZERO,
        }
    }
}

impl Lighting {
    pub fn uniform(&self, camera: &OrbitCamera) -> GlobalsUniform {
        let sun = self.directional_from.normalize_or(Vec3::Y);
        GlobalsUniform {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_position: camera.position().extend(1.0).to_array(),
            ambient: [1.0, 1.0, 1.0, self.ambient],
            directional: sun.extend(self.directional).to_array(),
            point: self.point_position.extend(self.point).to_array(),
        }
    }
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    texture: Option<usize>,
    base_color: [f32; 4],
    blend: bool,
}

/// GPU side of one attached asset
struct GpuAsset {
    meshes: Vec<Vec<GpuPrimitive>>,
    textures: Vec<Option<BindGroup>>,
}

#[derive(Debug, Clone, Copy)]
struct DrawCall {
    id: AssetId,
    mesh: usize,
    primitive: usize,
    slot: usize,
}

/// Rasterises the draw list into the window surface
pub struct SceneRenderer {
    gpu: GpuContext,
    surface: WindowSurface,
    depth_view: TextureView,
    lighting: Lighting,
    opaque_pipeline: RenderPipeline,
    blend_pipeline: RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: BindGroup,
    draw_layout: BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: BindGroup,
    draw_capacity: usize,
    draw_stride: u64,
    texture_layout: BindGroupLayout,
    sampler: wgpu::Sampler,
    white: BindGroup,
    assets: HashMap<AssetId, GpuAsset>,
}

impl SceneRenderer {
    pub fn new(window: Arc<Window>, lighting: Lighting) -> Result<Self> {
        let (gpu, surface) = pollster::block_on(GpuContext::for_window(window))
            .map_err(|e| anyhow!("GPU initialisation failed: {}", e))?;
        let device = gpu.device();
        let (width, height) = surface.size();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<GlobalsUniform>() as u64),
                },
                count: None,
            }],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &draw_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let opaque_pipeline =
            Self::create_pipeline(device, &pipeline_layout, &shader, surface.format(), false);
        let blend_pipeline =
            Self::create_pipeline(device, &pipeline_layout, &shader, surface.format(), true);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let draw_stride = (std::mem::size_of::<DrawUniform>() as u64).next_multiple_of(alignment);
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(device, &draw_layout, draw_stride, INITIAL_DRAW_CAPACITY);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let depth_view = Self::create_depth_view(device, width, height);

        let renderer = Self {
            white: Self::placeholder_bind_group(&gpu, &texture_layout, &sampler),
            gpu,
            surface,
            depth_view,
            lighting,
            opaque_pipeline,
            blend_pipeline,
            globals_buffer,
            globals_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            draw_stride,
            texture_layout,
            sampler,
            assets: HashMap::new(),
        };

        log::info!("Renderer ready: {}x{} {:?}", width, height, renderer.surface.format());
        Ok(renderer)
    }

    /// Resize the surface and depth buffer together; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.surface.resize(self.gpu.device(), width, height) {
            return false;
        }
        self.depth_view = Self::create_depth_view(self.gpu.device(), width, height);
        true
    }

    /// Recover from a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.surface.reconfigure(self.gpu.device());
    }

    pub fn size(&self) -> (u32, u32) {
        self.surface.size()
    }

    pub fn render(&mut self, camera: &OrbitCamera, items: &[DrawItem]) -> Result<(), wgpu::SurfaceError> {
        self.gpu.queue().write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&self.lighting.uniform(camera)),
        );

        let mut sorted: Vec<&DrawItem> = items.iter().collect();
        sorted.sort_by_key(|item| item.layer);

        let mut uniforms = Vec::new();
        let mut opaque = Vec::new();
        let mut blended = Vec::new();
        for item in sorted {
            let Some(asset) = self.assets.get(&item.id) else {
                continue;
            };
            let lit = item.layer == DrawLayer::Lit;
            for &(mesh, matrix) in &item.instances {
                let Some(primitives) = asset.meshes.get(mesh) else {
                    continue;
                };
                for (primitive, gpu_primitive) in primitives.iter().enumerate() {
                    let call = DrawCall {
                        id: item.id,
                        mesh,
                        primitive,
                        slot: uniforms.len(),
                    };
                    uniforms.push(DrawUniform::new(matrix, gpu_primitive.base_color, lit));
                    if gpu_primitive.blend || item.layer == DrawLayer::Overlay {
                        blended.push(call);
                    } else {
                        opaque.push(call);
                    }
                }
            }
        }

        self.ensure_draw_capacity(uniforms.len());
        if !uniforms.is_empty() {
            let stride = self.draw_stride as usize;
            let mut bytes = vec![0u8; uniforms.len() * stride];
            for (i, uniform) in uniforms.iter().enumerate() {
                let raw = bytemuck::bytes_of(uniform);
                bytes[i * stride..i * stride + raw.len()].copy_from_slice(raw);
            }
            self.gpu.queue().write_buffer(&self.draw_buffer, 0, &bytes);
        }

        let frame = self.surface.current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (pipeline, calls) in [(&self.opaque_pipeline, &opaque), (&self.blend_pipeline, &blended)] {
                pass.set_pipeline(pipeline);
                for call in calls {
                    let Some((primitive, texture)) = self.lookup(call) else {
                        continue;
                    };
                    let offset = (call.slot as u64 * self.draw_stride) as u32;
                    pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                    pass.set_bind_group(2, texture, &[]);
                    pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                    pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..primitive.index_count, 0, 0..1);
                }
            }
        }

        self.gpu.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn lookup(&self, call: &DrawCall) -> Option<(&GpuPrimitive, &BindGroup)> {
        let asset = self.assets.get(&call.id)?;
        let primitive = asset.meshes.get(call.mesh)?.get(call.primitive)?;
        let texture = primitive
            .texture
            .and_then(|t| asset.textures.get(t))
            .and_then(Option::as_ref)
            .unwrap_or(&self.white);
        Some((primitive, texture))
    }

    fn ensure_draw_capacity(&mut self, count: usize) {
        if count <= self.draw_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bind_group) =
            Self::create_draw_buffer(self.gpu.device(), &self.draw_layout, self.draw_stride, capacity);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = capacity;
        log::debug!("Draw uniform buffer grown to {} slots", capacity);
    }

    fn upload_mesh(&self, label: &str, mesh: &MeshData, texture: Option<usize>, base_color: [f32; 4], blend: bool) -> Option<GpuPrimitive> {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return None;
        }
        let device = self.gpu.device();

        let vertex_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice::<Vertex, u8>(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Some(GpuPrimitive {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            texture,
            base_color,
            blend,
        })
    }

    fn upload_texture(&self, label: &str, data: &TextureData) -> Result<BindGroup> {
        let expected = data.width as usize * data.height as usize * 4;
        if data.width == 0 || data.height == 0 || data.rgba.len() != expected {
            bail!(
                "{}: {}x{} texture with {} bytes of pixel data",
                label,
                data.width,
                data.height,
                data.rgba.len()
            );
        }

        let texture = self.gpu.device().create_texture_with_data(
            self.gpu.queue(),
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: data.width,
                    height: data.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &data.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self::texture_bind_group(self.gpu.device(), &self.texture_layout, &self.sampler, &view))
    }

    fn upload_model(&self, id: AssetId, model: &ModelData) -> GpuAsset {
        let textures = model
            .textures
            .iter()
            .enumerate()
            .map(|(i, texture)| {
                let texture = texture.as_ref()?;
                self.upload_texture(&format!("{} image {}", id, i), texture)
                    .map_err(|e| log::warn!("Skipping texture: {:#}", e))
                    .ok()
            })
            .collect();

        let label = id.to_string();
        let meshes = model
            .meshes
            .iter()
            .map(|primitives| {
                primitives
                    .iter()
                    .filter_map(|p| {
                        self.upload_mesh(&label, &p.mesh, p.material.texture, p.material.base_color, p.material.blend)
                    })
                    .collect()
            })
            .collect();

        GpuAsset { meshes, textures }
    }

    fn create_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        blended: bool,
    ) -> RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(if blended { "Overlay Pipeline" } else { "Opaque Pipeline" }),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(if blended {
                        wgpu::BlendState::ALPHA_BLENDING
                    } else {
                        wgpu::BlendState::REPLACE
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: !blended,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_draw_buffer(
        device: &Device,
        layout: &BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn texture_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        sampler: &wgpu::Sampler,
        view: &TextureView,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// 1x1 white texture for untextured primitives
    fn placeholder_bind_group(gpu: &GpuContext, layout: &BindGroupLayout, sampler: &wgpu::Sampler) -> BindGroup {
        let white = TextureData::solid([255, 255, 255, 255]);
        let texture = gpu.device().create_texture_with_data(
            gpu.queue(),
            &wgpu::TextureDescriptor {
                label: Some("White Texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &white.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self::texture_bind_group(gpu.device(), layout, sampler, &view)
    }
}

impl SceneHost for SceneRenderer {
    fn attach(&mut self, id: AssetId, payload: AssetPayload<'_>) -> Result<()> {
        let asset = match payload {
            AssetPayload::Textured { mesh, texture, blend } => {
                let bind_group = self.upload_texture(&format!("{} texture", id), texture)?;
                let primitive = self
                    .upload_mesh(&id.to_string(), &mesh, Some(0), [1.0; 4], blend)
                    .ok_or_else(|| anyhow!("{} has no geometry", id))?;
                GpuAsset {
                    meshes: vec![vec![primitive]],
                    textures: vec![Some(bind_group)],
                }
            }
            AssetPayload::Model(model) => self.upload_model(id, model),
        };

        if self.assets.insert(id, asset).is_some() {
            log::warn!("{} was attached twice; keeping the newer upload", id);
        }
        Ok(())
    }
}
