//! Modern GPU backend resources.
//!
//! [`GpuPath`] holds an indexed lyon mesh of [`GpuVertex`] values that can
//! be copied straight into vertex and index buffers. With the `gpu` feature
//! the mesh uploads to a `wgpu::Device`.

use std::any::Any;

use rive_core::{FillRule, RawPath, RenderPath};

use super::{tessellate_fill, tessellate_stroke, Mesh, StrokeStyle};
use crate::resources::Paint;

/// A vertex for path rendering.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    /// Position in path space.
    pub position: [f32; 2],
}

impl GpuVertex {
    /// Vertex buffer layout matching `@location(0) position: vec2<f32>`.
    #[cfg(feature = "gpu")]
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Indexed mesh ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuMesh {
    /// Vertex data.
    pub vertices: Vec<GpuVertex>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl GpuMesh {
    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Vertex bytes.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Upload to GPU buffers. Empty meshes upload nothing.
    #[cfg(feature = "gpu")]
    #[must_use]
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> Option<GpuMeshBuffers> {
        use wgpu::util::DeviceExt;

        if self.is_empty() {
            return None;
        }
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: self.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: self.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        let index_count = u32::try_from(self.indices.len()).ok()?;
        tracing::trace!("Uploaded path mesh '{label}' with {index_count} indices");
        Some(GpuMeshBuffers {
            vertex,
            index,
            index_count,
        })
    }
}

impl From<Mesh> for GpuMesh {
    fn from(mesh: Mesh) -> Self {
        Self {
            vertices: mesh
                .vertices
                .into_iter()
                .map(|position| GpuVertex { position })
                .collect(),
            indices: mesh.indices,
        }
    }
}

/// Uploaded mesh buffers.
#[cfg(feature = "gpu")]
#[derive(Debug)]
pub struct GpuMeshBuffers {
    /// Vertex buffer of [`GpuVertex`].
    pub vertex: wgpu::Buffer,
    /// `u32` index buffer.
    pub index: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

/// Path for the modern GPU backend.
#[derive(Debug, Clone, Default)]
pub struct GpuPath {
    raw: RawPath,
    fill_rule: FillRule,
    tolerance: f32,
    mesh: GpuMesh,
}

impl GpuPath {
    /// Build and tessellate raw geometry.
    #[must_use]
    pub fn new(raw: &RawPath, fill_rule: FillRule, tolerance: f32) -> Self {
        let mut path = Self {
            raw: raw.clone(),
            fill_rule,
            tolerance,
            mesh: GpuMesh::default(),
        };
        path.retessellate();
        path
    }

    /// Fill mesh.
    #[must_use]
    pub fn mesh(&self) -> &GpuMesh {
        &self.mesh
    }

    /// Stroke mesh for `paint`.
    #[must_use]
    pub fn stroke_mesh(&self, paint: &Paint) -> GpuMesh {
        let style = StrokeStyle {
            thickness: paint.thickness(),
            join: paint.join(),
            cap: paint.cap(),
        };
        match tessellate_stroke(&self.raw, style, self.tolerance) {
            Ok(mesh) => mesh.into(),
            Err(e) => {
                tracing::warn!("{e}");
                GpuMesh::default()
            }
        }
    }

    fn retessellate(&mut self) {
        self.mesh = match tessellate_fill(&self.raw, self.fill_rule, self.tolerance) {
            Ok(mesh) => mesh.into(),
            Err(e) => {
                tracing::warn!("{e}");
                GpuMesh::default()
            }
        };
    }
}

impl RenderPath for GpuPath {
    fn rewind(&mut self) {
        self.raw.rewind();
        self.mesh = GpuMesh::default();
    }

    fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    fn set_fill_rule(&mut self, fill_rule: FillRule) {
        if self.fill_rule != fill_rule {
            self.fill_rule = fill_rule;
            self.retessellate();
        }
    }

    fn add_raw_path(&mut self, raw: &RawPath) {
        self.raw.extend_from(raw);
        self.retessellate();
    }

    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
