//! A batched solid-color 2D renderer.
//!
//! Draws a [`Batch2D`] (colored triangles in canvas pixels) with a single pipeline,
//! one uniform (the pixel -> clip matrix) and one indexed draw call.
//!
//! Notes:
//! - Vertex/index buffers are reused and grown on demand.
//! - `Queue::write_buffer` needs sizes that are multiples of `COPY_BUFFER_ALIGNMENT`,
//!   so uploads are padded and only the real range is bound.
//! - No depth buffer; painter's order comes from the batch order.

use std::{borrow::Cow, mem};

use crate::render::gpu::Gpu;
use crate::render::primitives::{Batch2D, Uniforms2D, Vertex2D};
use crate::scene::Canvas;

fn round_up_to(v: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (v + (align - 1)) & !(align - 1)
}

/// Bytes to upload: `raw` padded with zeros to `upload_len`.
fn padded(raw: &[u8], upload_len: u64) -> Cow<'_, [u8]> {
    if raw.len() as u64 == upload_len {
        Cow::Borrowed(raw)
    } else {
        let mut buf = Vec::<u8>::with_capacity(upload_len as usize);
        buf.extend_from_slice(raw);
        buf.resize(upload_len as usize, 0);
        Cow::Owned(buf)
    }
}

pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    // Reusable GPU buffers; resized on demand.
    vertex_buffer: wgpu::Buffer,
    vertex_capacity_bytes: u64,

    index_buffer: wgpu::Buffer,
    index_capacity_bytes: u64,
}

impl MeshRenderer {
    /// Create the renderer targeting `gpu.target_format()`.
    pub fn new(gpu: &Gpu) -> anyhow::Result<Self> {
        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("MeshRenderer Solid Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "shaders/solid_mesh.wgsl"
                ))),
            });

        let uniform_size = wgpu::BufferSize::new(mem::size_of::<Uniforms2D>() as u64)
            .ok_or_else(|| anyhow::anyhow!("MeshRenderer: zero-sized uniform block"))?;

        let uniform_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("MeshRenderer Uniform BGL"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(uniform_size),
                        },
                        count: None,
                    }],
                });

        let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Uniform Buffer"),
            size: uniform_size.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MeshRenderer Uniform BG"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("MeshRenderer Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("MeshRenderer Solid Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex2D::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.target_format(),
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    // Pixel space is y-down, so winding flips; draw both sides.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        // The spiral alone is ~500 quads; start big enough to skip early regrowth.
        let initial_vb = 64 * 1024u64;
        let initial_ib = 64 * 1024u64;

        let vertex_buffer = Self::create_vertex_buffer(gpu, initial_vb);
        let index_buffer = Self::create_index_buffer(gpu, initial_ib);

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity_bytes: initial_vb,
            index_buffer,
            index_capacity_bytes: initial_ib,
        })
    }

    fn create_vertex_buffer(gpu: &Gpu, size: u64) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Vertex Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_index_buffer(gpu: &Gpu, size: u64) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Index Buffer"),
            size,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Ensure the internal buffers can hold at least `vb_bytes` / `ib_bytes`.
    fn ensure_capacity(&mut self, gpu: &Gpu, vb_bytes: u64, ib_bytes: u64) {
        if vb_bytes > self.vertex_capacity_bytes {
            let new_size = vb_bytes.next_power_of_two().max(1024);
            self.vertex_buffer = Self::create_vertex_buffer(gpu, new_size);
            self.vertex_capacity_bytes = new_size;
        }

        if ib_bytes > self.index_capacity_bytes {
            let new_size = ib_bytes.next_power_of_two().max(1024);
            self.index_buffer = Self::create_index_buffer(gpu, new_size);
            self.index_capacity_bytes = new_size;
        }
    }

    /// Upload `batch` and record its draw into `pass`.
    ///
    /// The caller creates the pass (and clears the background).
    pub fn draw_batch(
        &mut self,
        gpu: &Gpu,
        pass: &mut wgpu::RenderPass<'_>,
        canvas: Canvas,
        batch: &Batch2D,
    ) {
        if batch.is_empty() {
            return;
        }

        let vb_bytes = (batch.vertices.len() * mem::size_of::<Vertex2D>()) as u64;
        let ib_bytes = (batch.indices.len() * mem::size_of::<u32>()) as u64;

        let align = wgpu::COPY_BUFFER_ALIGNMENT;
        let vb_upload = round_up_to(vb_bytes, align);
        let ib_upload = round_up_to(ib_bytes, align);

        self.ensure_capacity(gpu, vb_upload, ib_upload);

        gpu.queue.write_buffer(
            &self.vertex_buffer,
            0,
            &padded(bytemuck::cast_slice(&batch.vertices), vb_upload),
        );
        gpu.queue.write_buffer(
            &self.index_buffer,
            0,
            &padded(bytemuck::cast_slice(&batch.indices), ib_upload),
        );

        let uniforms = Uniforms2D::from_mat4(canvas.clip_from_pixel());
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vb_bytes));
        pass.set_index_buffer(
            self.index_buffer.slice(..ib_bytes),
            wgpu::IndexFormat::Uint32,
        );
        pass.draw_indexed(0..(batch.indices.len() as u32), 0, 0..1);
    }
}
