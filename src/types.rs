use glam::{Mat4, Vec3};

/// Mesh vertex as laid out in GPU vertex buffers
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }

    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle list in model space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| Vec3::from_array(v.position))
    }
}

/// Per-frame scene uniforms: camera and lights
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// rgb colour, w intensity
    pub ambient: [f32; 4],
    /// xyz direction toward the light, w intensity
    pub directional: [f32; 4],
    /// xyz position, w intensity
    pub point: [f32; 4],
}

/// Per-draw uniforms, bound with a dynamic offset
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// x: 1.0 when lit, 0.0 when unlit
    pub params: [f32; 4],
}

impl DrawUniform {
    pub fn new(model: Mat4, base_color: [f32; 4], lit: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            base_color,
            params: [if lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawUniform>() % 16, 0);
        assert!(std::mem::size_of::<DrawUniform>() <= 256);
    }

    #[test]
    fn test_draw_uniform_flags() {
        let lit = DrawUniform::new(Mat4::IDENTITY, [1.0; 4], true);
        let unlit = DrawUniform::new(Mat4::IDENTITY, [1.0; 4], false);
        assert_eq!(lit.params[0], 1.0);
        assert_eq!(unlit.params[0], 0.0);
        assert_eq!(lit.normal_matrix, Mat4::IDENTITY.to_cols_array_2d());
    }
}
