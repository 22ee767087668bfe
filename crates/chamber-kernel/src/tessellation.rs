//! Solid to triangle mesh, keeping track of which B-rep face each
//! triangle came from.

use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

use crate::types::*;

type TruckSolid = truck_modeling::Solid;

/// Tessellate a truck Solid into a RenderMesh with per-face tracking.
///
/// `tolerance` is the maximum chord deviation in millimetres.
pub fn tessellate_solid(
    solid: &TruckSolid,
    tolerance: f64,
    next_id: &mut u64,
) -> Result<RenderMesh, KernelError> {
    if tolerance.is_nan() || tolerance <= 0.0 {
        return Err(KernelError::TessellationFailed {
            reason: format!("tolerance must be positive, got {tolerance}"),
        });
    }
    let meshed_solid = solid.triangulation(tolerance);

    let mut out = RenderMesh::default();
    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let Some(mut face_mesh) = face.surface() else {
                continue;
            };
            if !face.orientation() {
                face_mesh.invert();
            }
            let start_index = out.indices.len() as u32;
            append_mesh(&mut out, &face_mesh);
            let end_index = out.indices.len() as u32;
            if end_index > start_index {
                out.face_ranges.push(FaceRange {
                    face_id: KernelId(bump(next_id)),
                    start_index,
                    end_index,
                });
            }
        }
    }

    if out.indices.is_empty() {
        // Some faces fail per-face meshing; the merged polygon may still work.
        let merged = meshed_solid.to_polygon();
        append_mesh(&mut out, &merged);
        out.face_ranges.push(FaceRange {
            face_id: KernelId(bump(next_id)),
            start_index: 0,
            end_index: out.indices.len() as u32,
        });
    }

    if out.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "triangulation produced no triangles".to_string(),
        });
    }
    Ok(out)
}

fn bump(next_id: &mut u64) -> u64 {
    let id = *next_id;
    *next_id += 1;
    id
}

fn append_mesh(out: &mut RenderMesh, mesh: &PolygonMesh) {
    let base_vertex = out.vertex_count() as u32;
    let positions = mesh.positions();
    let normals = mesh.normals();

    for pos in positions {
        out.vertices
            .extend([pos[0] as f32, pos[1] as f32, pos[2] as f32]);
    }
    if normals.len() == positions.len() {
        for n in normals {
            out.normals.extend([n[0] as f32, n[1] as f32, n[2] as f32]);
        }
    } else {
        out.normals
            .extend(std::iter::repeat([0.0f32, 0.0, 1.0]).take(positions.len()).flatten());
    }
    for tri in mesh.tri_faces() {
        for v in tri.iter() {
            out.indices.push(v.pos as u32 + base_vertex);
        }
    }
}
