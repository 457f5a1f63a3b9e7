// GPU mesh types for the instanced box renderer.
//
// Every character mesh and weapon is drawn as a unit cube scaled per instance,
// so a single RenderMesh is uploaded once at startup.

use glam::Vec3;

// ============================================================================
// GPU VERTEX
// ============================================================================

/// GPU-ready vertex with position and normal.
///   @location(0) position: vec3<f32>
///   @location(1) normal:   vec3<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal:   [f32; 3],
}

impl GpuVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

// ============================================================================
// INSTANCE DATA
// ============================================================================

/// Per-instance data: box centre, half extents and color.
///   @location(2) position
///   @location(3) half_extents
///   @location(4) color
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub position:     [f32; 3],
    pub _padding0:    f32,
    pub half_extents: [f32; 3],
    pub _padding1:    f32,
    pub color:        [f32; 4],
}

impl InstanceData {
    pub fn new(position: Vec3, half_extents: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            _padding0: 0.0,
            half_extents: half_extents.to_array(),
            _padding1: 0.0,
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const VEC4: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: VEC4,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: VEC4 * 2,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

// ============================================================================
// RENDER MESH
// ============================================================================

/// GPU-ready triangulated mesh.
/// Upload vertex_bytes() to a VERTEX buffer, index_bytes() to an INDEX buffer.
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices:  Vec<u32>,
}

impl RenderMesh {
    /// Unit cube spanning [-1, 1] on every axis, flat normals (4 vertices per face).
    /// Faces are CCW when viewed from outside.
    pub fn unit_cube() -> Self {
        // (normal, tangent u, tangent v) with u × v = normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(GpuVertex {
                    position: (normal + u * su + v * sv).to_array(),
                    normal: normal.to_array(),
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    /// Cast vertex slice to raw bytes for wgpu buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Cast index slice to raw bytes for wgpu buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> usize  { self.indices.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cube_faces_wind_outward() {
        let cube = RenderMesh::unit_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);

        for tri in cube.indices.chunks(3) {
            let a = Vec3::from(cube.vertices[tri[0] as usize].position);
            let b = Vec3::from(cube.vertices[tri[1] as usize].position);
            let c = Vec3::from(cube.vertices[tri[2] as usize].position);
            let n = Vec3::from(cube.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }
}
