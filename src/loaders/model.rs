use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use std::path::Path;
use std::sync::Arc;

use super::error::LoadError;
use super::texture::{from_gltf_image, TextureData};
use crate::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::math::{Transform, AABB};
use crate::types::{MeshData, Vertex};

/// Surface description for one primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color: [f32; 4],
    /// Index into [`ModelData::textures`]
    pub texture: Option<usize>,
    pub blend: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [0.7, 0.7, 0.7, 1.0],
            texture: None,
            blend: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub mesh: MeshData,
    pub material: Material,
}

/// A node of the model hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub local: Transform,
    pub mesh: Option<usize>,
    pub children: Vec<usize>,
}

/// Everything needed to draw and animate a glTF model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
    /// Primitives grouped by glTF mesh index
    pub meshes: Vec<Vec<Primitive>>,
    /// Textures indexed by glTF image index, `None` where the format is unsupported
    pub textures: Vec<Option<TextureData>>,
    pub clips: Vec<Arc<AnimationClip>>,
}

impl ModelData {
    /// Rest pose of every node
    pub fn rest_pose(&self) -> Vec<Transform> {
        self.nodes.iter().map(|n| n.local).collect()
    }

    /// World matrix of every mesh-carrying node reachable from the roots,
    /// as `(mesh index, matrix)` pairs. `locals` overrides the rest pose.
    pub fn mesh_instances(&self, root: Mat4, locals: &[Transform]) -> Vec<(usize, Mat4)> {
        let mut instances = Vec::new();
        let mut stack: Vec<(usize, Mat4)> = self.roots.iter().rev().map(|&r| (r, root)).collect();
        let mut depth_guard = self.nodes.len() * 4 + 16;

        while let Some((index, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            depth_guard = match depth_guard.checked_sub(1) {
                Some(d) => d,
                None => break,
            };

            let local = locals.get(index).unwrap_or(&node.local);
            let world = parent * local.matrix();
            if let Some(mesh) = node.mesh {
                instances.push((mesh, world));
            }
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }

        instances
    }

    /// Model-space bounds of the rest pose
    pub fn bounds(&self) -> Option<AABB> {
        let rest = self.rest_pose();
        self.mesh_instances(Mat4::IDENTITY, &rest)
            .into_iter()
            .filter_map(|(mesh, world)| {
                let points = self.meshes.get(mesh)?.iter().flat_map(|p| p.mesh.positions());
                AABB::from_points(points.map(|p| world.transform_point3(p)).collect::<Vec<_>>())
            })
            .reduce(|a, b| a.union(&b))
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes
            .iter()
            .flatten()
            .map(|p| p.mesh.triangle_count())
            .sum()
    }
}

/// Load a glTF/GLB file with its hierarchy, materials, textures and clips
pub fn load_model(path: &Path) -> Result<ModelData, LoadError> {
    let model = import_model(path).map_err(|e| LoadError::Gltf {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;

    if model.triangle_count() == 0 {
        return Err(LoadError::EmptyModel {
            path: path.to_path_buf(),
        });
    }

    log::info!(
        "Loaded {}: {} nodes, {} triangles, {} textures, {} clips",
        path.display(),
        model.nodes.len(),
        model.triangle_count(),
        model.textures.len(),
        model.clips.len()
    );
    if let Some(bounds) = model.bounds() {
        log::debug!("  bounds center {:?} size {:?}", bounds.center(), bounds.size());
    }

    Ok(model)
}

fn import_model(path: &Path) -> Result<ModelData> {
    let (document, buffers, images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    let nodes = document
        .nodes()
        .map(|node| {
            let (t, r, s) = node.transform().decomposed();
            Node {
                name: node.name().map(str::to_string),
                local: Transform {
                    translation: Vec3::from_array(t),
                    rotation: Quat::from_array(r),
                    scale: Vec3::from_array(s),
                },
                mesh: node.mesh().map(|m| m.index()),
                children: node.children().map(|c| c.index()).collect(),
            }
        })
        .collect();

    let roots = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .map(|scene| scene.nodes().map(|n| n.index()).collect())
        .unwrap_or_default();

    let meshes = document
        .meshes()
        .map(|mesh| {
            mesh.primitives()
                .map(|primitive| read_primitive(&primitive, &buffers))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let textures = images.iter().map(from_gltf_image).collect();

    let clips = document
        .animations()
        .map(|animation| Arc::new(read_clip(&animation, &buffers)))
        .collect();

    Ok(ModelData {
        nodes,
        roots,
        meshes,
        textures,
        clips,
    })
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Result<Primitive> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("Mesh primitive has no positions")?
        .collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|n| n.collect())
        .unwrap_or_default();
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|uv| uv.into_f32().collect())
        .unwrap_or_default();

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            Vertex::new(
                position,
                normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            )
        })
        .collect::<Vec<_>>();

    let vertex_count = vertices.len() as u32;
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertex_count).collect::<Vec<u32>>(),
    };
    let indices = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| i < vertex_count))
        .flatten()
        .copied()
        .collect();

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();

    Ok(Primitive {
        mesh: MeshData { vertices, indices },
        material: Material {
            base_color: pbr.base_color_factor(),
            texture: pbr.base_color_texture().map(|info| info.texture().source().index()),
            blend: material.alpha_mode() == gltf::material::AlphaMode::Blend,
        },
    })
}

fn read_clip(animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> AnimationClip {
    use gltf::animation::util::ReadOutputs;
    use gltf::animation::Interpolation as GltfInterpolation;

    let channels = animation
        .channels()
        .filter_map(|channel| {
            let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
            let times: Vec<f32> = reader.read_inputs()?.collect();
            let sampler = channel.sampler().interpolation();

            let values = match reader.read_outputs()? {
                ReadOutputs::Translations(v) => ChannelValues::Translation(v.map(Vec3::from_array).collect()),
                ReadOutputs::Scales(v) => ChannelValues::Scale(v.map(Vec3::from_array).collect()),
                ReadOutputs::Rotations(v) => {
                    ChannelValues::Rotation(v.into_f32().map(Quat::from_array).collect())
                }
                ReadOutputs::MorphTargetWeights(_) => return None,
            };

            // cubic spline stores (in-tangent, value, out-tangent) per key
            let values = match sampler {
                GltfInterpolation::CubicSpline => spline_values(values),
                _ => values,
            };

            Some(Channel {
                node: channel.target().node().index(),
                interpolation: match sampler {
                    GltfInterpolation::Step => Interpolation::Step,
                    _ => Interpolation::Linear,
                },
                times,
                values,
            })
        })
        .collect();

    let clip = AnimationClip::new(animation.name().unwrap_or("unnamed"), channels);
    log::debug!("Clip {:?}: {} channels, {:.2}s", clip.name, clip.channels.len(), clip.duration);
    clip
}

fn spline_values(values: ChannelValues) -> ChannelValues {
    fn middle<T: Copy>(v: Vec<T>) -> Vec<T> {
        v.chunks_exact(3).map(|k| k[1]).collect()
    }

    match values {
        ChannelValues::Translation(v) => ChannelValues::Translation(middle(v)),
        ChannelValues::Rotation(v) => ChannelValues::Rotation(middle(v)),
        ChannelValues::Scale(v) => ChannelValues::Scale(middle(v)),
    }
}
