//! STL export from RenderMesh, binary and ASCII formats.

use std::fmt::Write as _;

use chamber_kernel::RenderMesh;

use crate::errors::OutputError;

/// Check the mesh has triangles and every index points at a vertex.
fn check_mesh(mesh: &RenderMesh) -> Result<usize, OutputError> {
    let tri_count = mesh.indices.len() / 3;
    if tri_count == 0 {
        return Err(OutputError::Stl {
            reason: "mesh has no triangles".to_string(),
        });
    }
    let vertex_count = mesh.vertex_count();
    if let Some(&idx) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(OutputError::Stl {
            reason: format!("index {idx} out of range (vertex count = {vertex_count})"),
        });
    }
    Ok(tri_count)
}

/// Facet normal from the winding of `tri`; +Z for a degenerate facet.
fn facet_normal(mesh: &RenderMesh, tri: &[u32]) -> [f32; 3] {
    let a = mesh.position(tri[0]);
    let b = mesh.position(tri[1]);
    let c = mesh.position(tri[2]);
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-12 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

/// Export a RenderMesh as a binary STL file.
///
/// Binary STL format:
/// - 80-byte header (arbitrary text)
/// - u32 triangle count (little-endian)
/// - For each triangle: 3×f32 normal + 3×(3×f32 vertex) + u16 attribute = 50 bytes
pub fn export_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, OutputError> {
    let tri_count = check_mesh(mesh)?;
    let tri_count_u32 = u32::try_from(tri_count).map_err(|_| OutputError::Stl {
        reason: format!("{tri_count} triangles do not fit a binary STL"),
    })?;

    let mut buf = Vec::with_capacity(80 + 4 + tri_count * 50);
    let header = format!("binary STL: {name}");
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(80)]);
    buf.resize(80, 0u8);
    buf.extend_from_slice(&tri_count_u32.to_le_bytes());

    for tri in mesh.indices.chunks_exact(3) {
        for c in facet_normal(mesh, tri) {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        for &idx in tri {
            for c in mesh.position(idx) {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        // Attribute byte count (unused)
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    Ok(buf)
}

/// Export a RenderMesh as an ASCII STL string.
pub fn export_ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, OutputError> {
    let tri_count = check_mesh(mesh)?;
    let mut out = String::with_capacity(tri_count * 300);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "solid {name}");
    for tri in mesh.indices.chunks_exact(3) {
        let [nx, ny, nz] = facet_normal(mesh, tri);
        let _ = writeln!(out, "  facet normal {nx} {ny} {nz}");
        out.push_str("    outer loop\n");
        for &idx in tri {
            let [x, y, z] = mesh.position(idx);
            let _ = writeln!(out, "      vertex {x} {y} {z}");
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    let _ = writeln!(out, "endsolid {name}");
    Ok(out)
}
