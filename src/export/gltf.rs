//! glTF/GLB export of the skinned page.

use crate::error::{BookError, Result};
use crate::geometry::skeleton;
use crate::geometry::{PageFace, PageGeometry};
use crate::page::PageState;
use crate::texture::PageTextures;
use crate::types::PageSide;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::mem;

/// Glow color of a highlighted page.
const HIGHLIGHT_COLOR: [f32; 3] = [1.0, 0.647, 0.0];

/// Export one page as GLB (binary glTF).
///
/// The file contains the page mesh with a skin over a joint chain that
/// mirrors the bone hierarchy. Edges get a plain paper material; front and
/// back get their face textures when `textures` is given. With a `pose`, the
/// joints carry that page's current rotations, depth offset and glow;
/// otherwise the page is exported flat.
pub fn export_page_glb(
    geometry: &PageGeometry,
    textures: Option<&PageTextures>,
    pose: Option<&PageState>,
) -> Result<Vec<u8>> {
    let mesh = &geometry.mesh;
    if mesh.is_empty() {
        return Err(BookError::Export("Cannot export empty mesh".to_string()));
    }

    let dimensions = &geometry.dimensions;
    let bone_count = dimensions.bone_count();
    if let Some(page) = pose {
        if page.bone_count() != bone_count {
            return Err(BookError::Export(format!(
                "pose has {} bones, geometry expects {}",
                page.bone_count(),
                bone_count
            )));
        }
    }

    // Vertex data, indices and inverse bind matrices
    let mut buffer_data: Vec<u8> = Vec::new();

    let pos_offset = buffer_data.len();
    buffer_data.extend_from_slice(bytemuck_cast_slice(&mesh.positions_flat()));
    let norm_offset = buffer_data.len();
    buffer_data.extend_from_slice(bytemuck_cast_slice(&mesh.normals_flat()));
    let uv_offset = buffer_data.len();
    buffer_data.extend_from_slice(bytemuck_cast_slice(&mesh.uvs_flat()));
    let joints_offset = buffer_data.len();
    buffer_data.extend_from_slice(bytemuck_cast_slice(&mesh.joints_flat()));
    let weights_offset = buffer_data.len();
    buffer_data.extend_from_slice(bytemuck_cast_slice(&mesh.weights_flat()));
    let idx_offset = buffer_data.len();
    buffer_data.extend_from_slice(bytemuck_cast_slice(&mesh.indices));
    let ibm_offset = buffer_data.len();
    let inverse_bind: Vec<f32> = skeleton::inverse_bind_matrices(dimensions)
        .iter()
        .flat_map(|m| m.to_cols_array())
        .collect();
    buffer_data.extend_from_slice(bytemuck_cast_slice(&inverse_bind));
    let vertex_end = buffer_data.len();

    // Face textures (aligned to 4 bytes)
    let mut image_ranges: Vec<(usize, usize)> = Vec::new();
    if let Some(textures) = textures {
        for side in PageSide::all() {
            let png = textures.side(side).to_png()?;
            let padding = (4 - (buffer_data.len() % 4)) % 4;
            buffer_data.extend(std::iter::repeat(0u8).take(padding));
            image_ranges.push((buffer_data.len(), png.len()));
            buffer_data.extend_from_slice(&png);
        }
    }

    let total_buffer_size = buffer_data.len();
    let bounds = geometry.bounds();
    let vertex_count = mesh.vertex_count();

    // Buffer views
    let mut buffer_views = vec![
        create_buffer_view(pos_offset, norm_offset - pos_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(norm_offset, uv_offset - norm_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(uv_offset, joints_offset - uv_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(joints_offset, weights_offset - joints_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(weights_offset, idx_offset - weights_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(idx_offset, ibm_offset - idx_offset, Some(json::buffer::Target::ElementArrayBuffer)),
        create_buffer_view(ibm_offset, vertex_end - ibm_offset, None),
    ];
    const IDX_VIEW: u32 = 5;
    const IBM_VIEW: u32 = 6;

    // Shared vertex accessors 0..5
    let mut accessors = vec![
        create_accessor(0, 0, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, Some(bounds.min), Some(bounds.max)),
        create_accessor(1, 0, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, None, None),
        create_accessor(2, 0, vertex_count, json::accessor::Type::Vec2, json::accessor::ComponentType::F32, None, None),
        create_accessor(3, 0, vertex_count, json::accessor::Type::Vec4, json::accessor::ComponentType::U16, None, None),
        create_accessor(4, 0, vertex_count, json::accessor::Type::Vec4, json::accessor::ComponentType::F32, None, None),
    ];
    let ibm_accessor = accessors.len() as u32;
    accessors.push(create_accessor(IBM_VIEW, 0, bone_count, json::accessor::Type::Mat4, json::accessor::ComponentType::F32, None, None));

    // Images and textures
    let mut images = Vec::new();
    let mut textures_json = Vec::new();
    for (offset, len) in &image_ranges {
        let view = buffer_views.len() as u32;
        buffer_views.push(create_buffer_view(*offset, *len, None));
        images.push(json::Image {
            buffer_view: Some(json::Index::new(view)),
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        textures_json.push(json::Texture {
            sampler: Some(json::Index::new(0)),
            source: json::Index::new(images.len() as u32 - 1),
            extensions: Default::default(),
            extras: Default::default(),
        });
    }

    // Materials: 0 edges, 1 front, 2 back
    let glow = pose.map_or(0.0, |p| p.emissive);
    let emissive = HIGHLIGHT_COLOR.map(|c| c * glow);
    let has_textures = !image_ranges.is_empty();
    let materials = vec![
        create_material(None, emissive),
        create_material(has_textures.then_some(0), emissive),
        create_material(has_textures.then_some(1), emissive),
    ];

    // One primitive per face group, all sharing the vertex accessors
    let mut primitives = Vec::with_capacity(geometry.groups.len());
    for group in &geometry.groups {
        let accessor = accessors.len() as u32;
        accessors.push(create_accessor(
            IDX_VIEW,
            group.start * mem::size_of::<u32>(),
            group.count,
            json::accessor::Type::Scalar,
            json::accessor::ComponentType::U32,
            None,
            None,
        ));
        let material = match group.face {
            PageFace::Front => 1,
            PageFace::Back => 2,
            _ => 0,
        };
        primitives.push(create_primitive(accessor, material));
    }

    // Node 0 holds the mesh, nodes 1..=bone_count form the joint chain
    let mut nodes = vec![json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: Some(json::Index::new(0)),
        rotation: None,
        scale: None,
        translation: None,
        skin: Some(json::Index::new(0)),
        weights: None,
    }];
    for i in 0..bone_count {
        let mut translation = skeleton::bone_offset(i, dimensions).to_array();
        let mut rotation = None;
        if let Some(page) = pose {
            let q = page.bone_angles()[i].to_quat();
            rotation = Some(json::scene::UnitQuaternion(q.to_array()));
            if i == 0 {
                translation[2] += page.z;
            }
        }
        let node_index = nodes.len() as u32;
        nodes.push(json::Node {
            camera: None,
            children: (i + 1 < bone_count).then(|| vec![json::Index::new(node_index + 1)]),
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: None,
            rotation,
            scale: None,
            translation: Some(translation),
            skin: None,
            weights: None,
        });
    }
    let joints: Vec<json::Index<json::Node>> =
        (1..=bone_count as u32).map(json::Index::new).collect();

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        images,
        samplers: vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Linear)),
            min_filter: Some(Valid(json::texture::MinFilter::Linear)),
            wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
            wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures: textures_json,
        materials,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        }],
        skins: vec![json::Skin {
            extensions: Default::default(),
            extras: Default::default(),
            inverse_bind_matrices: Some(json::Index::new(ibm_accessor)),
            joints,
            skeleton: Some(json::Index::new(1)),
        }],
        nodes,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0), json::Index::new(1)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| BookError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    Ok(assemble_glb(json_string.as_bytes(), &buffer_data))
}

/// Wrap a JSON chunk and a BIN chunk into a GLB container.
fn assemble_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend_from_slice(&vec![0x20u8; json_padding]);

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend_from_slice(&vec![0u8; buffer_padding]);

    glb
}

/// Create a buffer view.
fn create_buffer_view(
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    }
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    byte_offset: usize,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(byte_offset as u64)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Create a skinned primitive over the shared vertex accessors 0..5.
fn create_primitive(indices_accessor: u32, material: u32) -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(0));
    attributes.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(1));
    attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(2));
    attributes.insert(Valid(json::mesh::Semantic::Joints(0)), json::Index::new(3));
    attributes.insert(Valid(json::mesh::Semantic::Weights(0)), json::Index::new(4));

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Create a paper material, textured when `texture_idx` is given.
fn create_material(texture_idx: Option<u32>, emissive: [f32; 3]) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: texture_idx.map(|index| json::texture::Info {
                index: json::Index::new(index),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        alpha_cutoff: None,
        double_sided: false,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor(emissive),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Cast a slice of T to a slice of bytes.
fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    // SAFETY: only called with f32, u16 and u32 slices, which have no padding.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}
