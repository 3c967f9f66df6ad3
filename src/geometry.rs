// geometry.rs - Procedural meshes for the background sphere and image planes
use std::f32::consts::{PI, TAU};

use crate::types::{MeshData, Vertex};

/// UV sphere viewed from the inside.
///
/// Normals point toward the centre and U is mirrored so an equirectangular
/// image reads left-to-right when seen from within.
pub fn inside_out_sphere(radius: f32, segments: u32) -> MeshData {
    let width = segments.max(3);
    let height = segments.max(2);

    let vertices = (0..=height)
        .flat_map(|iy| {
            let v = iy as f32 / height as f32;
            (0..=width).map(move |ix| {
                let u = ix as f32 / width as f32;
                let dir = [
                    (u * TAU).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * TAU).sin() * (v * PI).sin(),
                ];
                Vertex::new(
                    [dir[0] * radius, dir[1] * radius, dir[2] * radius],
                    [-dir[0], -dir[1], -dir[2]],
                    [1.0 - u, v],
                )
            })
        })
        .collect();

    let row = width + 1;
    let indices = (0..height)
        .flat_map(|iy| {
            (0..width).flat_map(move |ix| {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                let top = (iy != 0).then_some([a, b, d]);
                let bottom = (iy != height - 1).then_some([b, c, d]);
                top.into_iter().chain(bottom).flatten()
            })
        })
        .collect();

    MeshData { vertices, indices }
}

/// Rectangle in the XY plane facing +Z, centred on the origin
pub fn plane(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let normal = [0.0, 0.0, 1.0];

    MeshData {
        vertices: vec![
            Vertex::new([-hw, hh, 0.0], normal, [0.0, 0.0]),
            Vertex::new([hw, hh, 0.0], normal, [1.0, 0.0]),
            Vertex::new([-hw, -hh, 0.0], normal, [0.0, 1.0]),
            Vertex::new([hw, -hh, 0.0], normal, [1.0, 1.0]),
        ],
        indices: vec![0, 2, 1, 2, 3, 1],
    }
}
