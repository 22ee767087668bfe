//! Mesh repair run on every tessellated part before it is written out.
//!
//! Each cycle drops out-of-range triangles, welds coincident points,
//! removes degenerate and duplicated facets and makes the winding of
//! neighbouring facets agree. Cycles repeat until one fixes nothing.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{FaceRange, KernelId, RenderMesh};

pub const MAX_CLEANUP_CYCLES: usize = 5;

/// Counts of what `clean_mesh` changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub cycles: usize,
    pub invalid_indices: usize,
    pub merged_points: usize,
    pub degenerate_facets: usize,
    pub duplicate_facets: usize,
    pub flipped_facets: usize,
}

impl CleanupReport {
    pub fn total_fixes(&self) -> usize {
        self.invalid_indices
            + self.merged_points
            + self.degenerate_facets
            + self.duplicate_facets
            + self.flipped_facets
    }

    fn absorb(&mut self, other: &CleanupReport) {
        self.invalid_indices += other.invalid_indices;
        self.merged_points += other.merged_points;
        self.degenerate_facets += other.degenerate_facets;
        self.duplicate_facets += other.duplicate_facets;
        self.flipped_facets += other.flipped_facets;
    }
}

struct Work {
    positions: Vec<[f32; 3]>,
    tris: Vec<[u32; 3]>,
    faces: Vec<KernelId>,
}

impl Work {
    fn from_mesh(mesh: &RenderMesh) -> Self {
        let positions = mesh
            .vertices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let tris: Vec<[u32; 3]> = mesh
            .indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let mut faces = vec![KernelId(0); tris.len()];
        for range in &mesh.face_ranges {
            let (start, end) = (range.start_index as usize / 3, range.end_index as usize / 3);
            for slot in faces.iter_mut().take(end).skip(start) {
                *slot = range.face_id;
            }
        }
        Self {
            positions,
            tris,
            faces,
        }
    }

    fn retain(&mut self, keep: impl Fn(usize, &[u32; 3]) -> bool) -> usize {
        let before = self.tris.len();
        let mut tris = Vec::with_capacity(before);
        let mut faces = Vec::with_capacity(before);
        for (i, (t, f)) in self.tris.iter().zip(&self.faces).enumerate() {
            if keep(i, t) {
                tris.push(*t);
                faces.push(*f);
            }
        }
        self.tris = tris;
        self.faces = faces;
        before - self.tris.len()
    }

    fn drop_invalid_indices(&mut self) -> usize {
        let n = self.positions.len() as u32;
        self.retain(|_, t| t.iter().all(|&i| i < n))
    }

    /// Merge points within `tolerance` of a kept point and drop unreferenced
    /// ones. Points are bucketed on a grid of `tolerance`-sized cells, and a
    /// point is compared against the kept points of its own and the 26
    /// neighbouring cells.
    fn weld(&mut self, tolerance: f32) -> usize {
        let tolerance = tolerance.max(f32::EPSILON);
        let scale = 1.0 / tolerance;
        let mut grid: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
        let mut remap = vec![0u32; self.positions.len()];
        let mut used = vec![false; self.positions.len()];
        for t in &self.tris {
            for &i in t {
                used[i as usize] = true;
            }
        }
        let mut positions: Vec<[f32; 3]> = Vec::with_capacity(self.positions.len());
        for (i, p) in self.positions.iter().enumerate() {
            if !used[i] {
                continue;
            }
            let cell = p.map(|c| (c * scale).floor() as i64);
            let near = neighbour_cells(cell)
                .filter_map(|key| grid.get(&key))
                .flatten()
                .copied()
                .find(|&k| distance_sq(&positions[k as usize], p) <= tolerance * tolerance);
            remap[i] = match near {
                Some(k) => k,
                None => {
                    let k = positions.len() as u32;
                    positions.push(*p);
                    grid.entry(cell).or_default().push(k);
                    k
                }
            };
        }
        let removed = self.positions.len() - positions.len();
        for t in &mut self.tris {
            for i in t.iter_mut() {
                *i = remap[*i as usize];
            }
        }
        self.positions = positions;
        removed
    }

    fn drop_degenerate(&mut self) -> usize {
        let positions = &self.positions;
        let mut tris = std::mem::take(&mut self.tris);
        let mut faces = std::mem::take(&mut self.faces);
        let before = tris.len();
        let mut keep_faces = Vec::with_capacity(before);
        let mut kept = Vec::with_capacity(before);
        for (t, f) in tris.drain(..).zip(faces.drain(..)) {
            if t[0] == t[1] || t[1] == t[2] || t[0] == t[2] {
                continue;
            }
            let n = facet_normal(positions, &t);
            let longest = longest_edge_sq(positions, &t);
            if length(n) <= f32::EPSILON * longest {
                continue;
            }
            kept.push(t);
            keep_faces.push(f);
        }
        self.tris = kept;
        self.faces = keep_faces;
        before - self.tris.len()
    }

    fn drop_duplicates(&mut self) -> usize {
        let mut seen: HashSet<[u32; 3]> = HashSet::new();
        let keys: Vec<[u32; 3]> = self
            .tris
            .iter()
            .map(|t| {
                let mut k = *t;
                k.sort_unstable();
                k
            })
            .collect();
        let keep: Vec<bool> = keys.iter().map(|k| seen.insert(*k)).collect();
        self.retain(|i, _| keep[i])
    }

    /// Flip facets so every shared edge is traversed in opposite directions,
    /// then turn each closed patch outward by its signed volume.
    fn harmonise(&mut self) -> usize {
        let mut by_edge: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (ti, t) in self.tris.iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                by_edge.entry((a.min(b), a.max(b))).or_default().push(ti);
            }
        }

        let original = self.tris.clone();
        let mut visited = vec![false; self.tris.len()];
        for seed in 0..self.tris.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            let mut component = vec![seed];
            let mut closed = true;
            let mut queue = VecDeque::from([seed]);
            while let Some(ti) = queue.pop_front() {
                let t = self.tris[ti];
                for k in 0..3 {
                    let (a, b) = (t[k], t[(k + 1) % 3]);
                    let Some(neighbours) = by_edge.get(&(a.min(b), a.max(b))) else {
                        continue;
                    };
                    if neighbours.len() != 2 {
                        closed = false;
                        continue;
                    }
                    for &ni in neighbours {
                        if ni == ti || visited[ni] {
                            continue;
                        }
                        if traverses(&self.tris[ni], a, b) {
                            self.tris[ni].swap(1, 2);
                        }
                        visited[ni] = true;
                        component.push(ni);
                        queue.push_back(ni);
                    }
                }
            }
            if closed && signed_volume(&self.positions, &self.tris, &component) < 0.0 {
                for &ti in &component {
                    self.tris[ti].swap(1, 2);
                }
            }
        }
        self.tris
            .iter()
            .zip(&original)
            .filter(|(now, before)| now != before)
            .count()
    }

    fn into_mesh(self, mesh: &mut RenderMesh) {
        let mut normals = vec![[0.0f32; 3]; self.positions.len()];
        for t in &self.tris {
            let n = facet_normal(&self.positions, t);
            for &i in t {
                let slot = &mut normals[i as usize];
                for c in 0..3 {
                    slot[c] += n[c];
                }
            }
        }
        mesh.normals = normals
            .iter()
            .flat_map(|n| {
                let len = length(*n);
                if len > 0.0 {
                    [n[0] / len, n[1] / len, n[2] / len]
                } else {
                    [0.0, 0.0, 1.0]
                }
            })
            .collect();
        mesh.vertices = self.positions.iter().flatten().copied().collect();
        mesh.indices = self.tris.iter().flatten().copied().collect();

        mesh.face_ranges.clear();
        let mut start = 0usize;
        for i in 1..=self.faces.len() {
            if i == self.faces.len() || self.faces[i] != self.faces[start] {
                mesh.face_ranges.push(FaceRange {
                    face_id: self.faces[start],
                    start_index: (start * 3) as u32,
                    end_index: (i * 3) as u32,
                });
                start = i;
            }
        }
    }
}

fn traverses(t: &[u32; 3], a: u32, b: u32) -> bool {
    (0..3).any(|k| t[k] == a && t[(k + 1) % 3] == b)
}

fn facet_normal(positions: &[[f32; 3]], t: &[u32; 3]) -> [f32; 3] {
    let p0 = positions[t[0] as usize];
    let p1 = positions[t[1] as usize];
    let p2 = positions[t[2] as usize];
    let a = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let b = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn longest_edge_sq(positions: &[[f32; 3]], t: &[u32; 3]) -> f32 {
    (0..3)
        .map(|k| {
            let p = positions[t[k] as usize];
            let q = positions[t[(k + 1) % 3] as usize];
            (0..3).map(|c| (p[c] - q[c]).powi(2)).sum::<f32>()
        })
        .fold(0.0, f32::max)
}

fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn neighbour_cells(cell: [i64; 3]) -> impl Iterator<Item = [i64; 3]> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).map(move |dz| [cell[0] + dx, cell[1] + dy, cell[2] + dz])
        })
    })
}

fn distance_sq(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    (0..3).map(|i| (a[i] - b[i]) * (a[i] - b[i])).sum()
}

fn signed_volume(positions: &[[f32; 3]], tris: &[[u32; 3]], component: &[usize]) -> f64 {
    component
        .iter()
        .map(|&ti| {
            let t = tris[ti];
            let p = |i: u32| positions[i as usize].map(f64::from);
            let (a, b, c) = (p(t[0]), p(t[1]), p(t[2]));
            (a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
                + a[2] * (b[0] * c[1] - b[1] * c[0]))
                / 6.0
        })
        .sum()
}

/// Repair `mesh` in place. Points closer than `weld_tolerance` are merged.
pub fn clean_mesh(mesh: &mut RenderMesh, weld_tolerance: f32) -> CleanupReport {
    let mut work = Work::from_mesh(mesh);
    let mut report = CleanupReport::default();
    for cycle in 1..=MAX_CLEANUP_CYCLES {
        let fixes = CleanupReport {
            invalid_indices: work.drop_invalid_indices(),
            merged_points: work.weld(weld_tolerance),
            degenerate_facets: work.drop_degenerate(),
            duplicate_facets: work.drop_duplicates(),
            flipped_facets: work.harmonise(),
            ..Default::default()
        };
        report.absorb(&fixes);
        report.cycles = cycle;
        debug!(cycle, fixes = fixes.total_fixes(), "mesh cleanup cycle");
        if fixes.total_fixes() == 0 {
            break;
        }
    }
    work.into_mesh(mesh);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit cube as 12 outward triangles over 8 shared vertices.
    fn cube() -> RenderMesh {
        let vertices: Vec<f32> = vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0,
            1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // z = 0
            4, 5, 6, 4, 6, 7, // z = 1
            0, 1, 5, 0, 5, 4, // y = 0
            3, 7, 6, 3, 6, 2, // y = 1
            0, 4, 7, 0, 7, 3, // x = 0
            1, 2, 6, 1, 6, 5, // x = 1
        ];
        RenderMesh {
            normals: vec![0.0; vertices.len()],
            vertices,
            face_ranges: vec![FaceRange {
                face_id: KernelId(1),
                start_index: 0,
                end_index: indices.len() as u32,
            }],
            indices,
        }
    }

    #[test]
    fn clean_cube_needs_one_cycle() {
        let mut mesh = cube();
        let report = clean_mesh(&mut mesh, 1e-5);
        assert_eq!(report.cycles, 1);
        assert_eq!(report.total_fixes(), 0);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
    }

    #[test]
    fn duplicated_points_are_welded() {
        let mut mesh = cube();
        // Give the first facet its own copy of its three corners.
        let extra = mesh.vertex_count() as u32;
        for i in [0u32, 2, 1] {
            let p = mesh.position(i);
            mesh.vertices.extend(p);
        }
        mesh.indices[0..3].copy_from_slice(&[extra, extra + 1, extra + 2]);
        let report = clean_mesh(&mut mesh, 1e-5);
        assert_eq!(report.merged_points, 3);
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn points_either_side_of_a_cell_edge_are_welded() {
        let mut mesh = cube();
        mesh.vertices[0] = 1.99e-5;
        let extra = mesh.vertex_count() as u32;
        mesh.vertices.extend([2.01e-5, 0.0, 0.0]);
        mesh.indices[0] = extra;
        let report = clean_mesh(&mut mesh, 1e-5);
        assert_eq!(report.merged_points, 1);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn points_beyond_tolerance_stay_apart() {
        let mut mesh = cube();
        let extra = mesh.vertex_count() as u32;
        mesh.vertices.extend([3e-5, 0.0, 0.0]);
        mesh.indices[0] = extra;
        let report = clean_mesh(&mut mesh, 1e-5);
        assert_eq!(report.merged_points, 0);
        assert_eq!(mesh.vertex_count(), 9);
    }

    #[test]
    fn bad_and_degenerate_facets_are_dropped() {
        let mut mesh = cube();
        mesh.indices.extend([0, 1, 99]); // out of range
        mesh.indices.extend([0, 0, 1]); // repeated corner
        mesh.indices.extend([0, 1, 2]); // same facet as the first, other winding
        mesh.face_ranges[0].end_index = mesh.indices.len() as u32;
        let report = clean_mesh(&mut mesh, 1e-5);
        assert_eq!(report.invalid_indices, 1);
        assert_eq!(report.degenerate_facets, 1);
        assert_eq!(report.duplicate_facets, 1);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn flipped_facet_is_harmonised() {
        let mut mesh = cube();
        mesh.indices.swap(1, 2);
        let report = clean_mesh(&mut mesh, 1e-5);
        assert_eq!(report.flipped_facets, 1);
        assert_eq!(&mesh.indices[0..3], &[0, 2, 1]);
    }

    #[test]
    fn inside_out_cube_is_turned_outward() {
        let mut mesh = cube();
        for t in mesh.indices.chunks_exact_mut(3) {
            t.swap(1, 2);
        }
        let report = clean_mesh(&mut mesh, 1e-5);
        assert_eq!(report.flipped_facets, 12);
        assert_eq!(&mesh.indices[0..3], &[0, 2, 1]);
    }

    #[test]
    fn face_ranges_follow_surviving_triangles() {
        let mut mesh = cube();
        mesh.face_ranges = vec![
            FaceRange {
                face_id: KernelId(1),
                start_index: 0,
                end_index: 18,
            },
            FaceRange {
                face_id: KernelId(2),
                start_index: 18,
                end_index: 36,
            },
        ];
        mesh.indices.extend([0, 0, 1]);
        clean_mesh(&mut mesh, 1e-5);
        assert_eq!(mesh.face_ranges.len(), 2);
        assert_eq!(mesh.face_ranges[1].end_index, 36);
    }

    proptest::proptest! {
        #[test]
        fn cleaning_twice_changes_nothing_more(
            shift in proptest::array::uniform3(-100.0f32..100.0),
            flips in proptest::collection::vec(proptest::bool::ANY, 12),
        ) {
            let mut mesh = cube();
            for v in mesh.vertices.chunks_exact_mut(3) {
                for (c, s) in v.iter_mut().zip(shift) {
                    *c += s;
                }
            }
            for (t, flip) in mesh.indices.chunks_exact_mut(3).zip(&flips) {
                if *flip {
                    t.swap(1, 2);
                }
            }
            clean_mesh(&mut mesh, 1e-5);
            proptest::prop_assert_eq!(mesh.triangle_count(), 12);
            let again = clean_mesh(&mut mesh, 1e-5);
            proptest::prop_assert_eq!(again.total_fixes(), 0);
        }
    }
}
