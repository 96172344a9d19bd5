/// Wavefront OBJ parser
///
/// Line-oriented: `v`, `vt`, `vn` fill attribute pools, `f` emits triangles.
/// Each distinct face combo (`v`, `v/vt`, `v/vt/vn`, `v//vn`) becomes one
/// output vertex; repeated combos reuse it. Faces are fan-triangulated from
/// their first vertex, which assumes convex planar polygons.

use std::path::Path;
use std::str::SplitWhitespace;
use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::scene::{MeshComponent, SimpleVertex};

const DEFAULT_NORMAL: Vec3 = Vec3::Y;

/// Attribute indices referenced by one face combo (0-based, already resolved)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct ComboIndices {
    position: Option<usize>,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct ObjParser<'a> {
    name: &'a str,
    flip_uv: bool,
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
    vertices: Vec<SimpleVertex>,
    indices: Vec<u32>,
    combo_map: FxHashMap<ComboIndices, u32>,
}

/// Load an OBJ file from disk into a new mesh named after the file
pub fn load_obj(path: &Path, flip_uv: bool) -> Result<MeshComponent> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        crate::engine_err!("monaco::ModelLoader", AssetNotFound:
            "cannot open OBJ file '{}': {}", path.display(), e)
    })?;
    let mut mesh = MeshComponent::new(&path.to_string_lossy());
    parse_obj_into(&mut mesh, &source, flip_uv);
    Ok(mesh)
}

/// Parse OBJ text into a new mesh
pub fn parse_obj(name: &str, source: &str, flip_uv: bool) -> MeshComponent {
    let mut mesh = MeshComponent::new(name);
    parse_obj_into(&mut mesh, source, flip_uv);
    mesh
}

/// Parse OBJ text, replacing the contents of `mesh`
///
/// Malformed numbers and out-of-range references are logged and replaced by
/// defaults; parsing always runs to the end of the input.
pub fn parse_obj_into(mesh: &mut MeshComponent, source: &str, flip_uv: bool) {
    let mut parser = ObjParser {
        name: &mesh.name,
        flip_uv,
        ..Default::default()
    };

    for (line_index, line) in source.lines().enumerate() {
        parser.parse_line(line_index + 1, line);
    }

    let ObjParser { vertices, indices, .. } = parser;

    crate::engine_info!("monaco::ModelLoader",
        "Loaded model '{}': {} unique vertices, {} indices",
        mesh.name, vertices.len(), indices.len());

    mesh.vertices = vertices;
    mesh.indices = indices;
}

impl<'a> ObjParser<'a> {
    fn parse_line(&mut self, line_number: usize, line: &str) {
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return;
        };

        match keyword {
            "v" => {
                let [x, y, z]: [f32; 3] = self.parse_floats(line_number, tokens);
                self.positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v]: [f32; 2] = self.parse_floats(line_number, tokens);
                self.texcoords.push(Vec2::new(u, v));
            }
            "vn" => {
                let [x, y, z]: [f32; 3] = self.parse_floats(line_number, tokens);
                self.normals.push(Vec3::new(x, y, z));
            }
            "f" => self.parse_face(line_number, tokens),
            // comments, groups, smoothing, materials
            _ => {}
        }
    }

    fn parse_floats<const N: usize>(&self, line_number: usize, tokens: SplitWhitespace<'_>) -> [f32; N] {
        let mut values = [0.0; N];
        for (slot, token) in values.iter_mut().zip(tokens) {
            match token.parse::<f32>() {
                Ok(value) => *slot = value,
                Err(_) => crate::engine_warn!("monaco::ModelLoader",
                    "{}:{}: invalid number '{}'", self.name, line_number, token),
            }
        }
        values
    }

    fn parse_face(&mut self, line_number: usize, tokens: SplitWhitespace<'_>) {
        let face: Vec<u32> = tokens
            .map(|combo| self.resolve_combo(line_number, combo))
            .collect();

        if face.len() < 3 {
            crate::engine_warn!("monaco::ModelLoader",
                "{}:{}: face with {} vertices skipped", self.name, line_number, face.len());
            return;
        }

        for i in 1..face.len() - 1 {
            self.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
        }
    }

    /// Map a combo token to an output vertex index, emitting a vertex on first use
    fn resolve_combo(&mut self, line_number: usize, combo: &str) -> u32 {
        // keyed on absolute indices so end-relative combos track the pools
        let refs = self.split_combo(line_number, combo);
        if let Some(&index) = self.combo_map.get(&refs) {
            return index;
        }

        let position = match refs.position.and_then(|i| self.positions.get(i)) {
            Some(&position) => position,
            None => {
                crate::engine_error!("monaco::ModelLoader",
                    "{}:{}: position index out of range in '{}'", self.name, line_number, combo);
                Vec3::ZERO
            }
        };

        let texcoord = match refs.texcoord.and_then(|i| self.texcoords.get(i)) {
            Some(&uv) if self.flip_uv => Vec2::new(uv.x, 1.0 - uv.y),
            Some(&uv) => uv,
            None => Vec2::ZERO,
        };

        let normal = refs
            .normal
            .and_then(|i| self.normals.get(i))
            .copied()
            .unwrap_or(DEFAULT_NORMAL);

        let index = self.vertices.len() as u32;
        self.vertices.push(SimpleVertex::new(position, texcoord, normal));
        self.combo_map.insert(refs, index);
        index
    }

    /// Split `v[/vt[/vn]]` into resolved indices; an empty field means absent
    fn split_combo(&self, line_number: usize, combo: &str) -> ComboIndices {
        let mut fields = combo.split('/');
        let mut next = |pool_len: usize| -> Option<usize> {
            let field = fields.next()?;
            if field.is_empty() {
                return None;
            }
            match field.parse::<i64>() {
                Ok(raw) => resolve_obj_index(raw, pool_len),
                Err(_) => {
                    crate::engine_warn!("monaco::ModelLoader",
                        "{}:{}: invalid index '{}' in '{}'", self.name, line_number, field, combo);
                    None
                }
            }
        };

        ComboIndices {
            position: next(self.positions.len()),
            texcoord: next(self.texcoords.len()),
            normal: next(self.normals.len()),
        }
    }
}

/// Convert a 1-based (or negative, end-relative) OBJ index to 0-based
fn resolve_obj_index(raw: i64, pool_len: usize) -> Option<usize> {
    match raw {
        0 => None,
        r if r > 0 => Some((r - 1) as usize),
        r => {
            let back = r.unsigned_abs() as usize;
            pool_len.checked_sub(back)
        }
    }
}

#[cfg(test)]
#[path = "model_loader_tests.rs"]
mod tests;
