//! Marching-cubes mesh derivation.
//!
//! Pure DOP: [`triangulate_cell`] takes the eight corner densities of one
//! 2x2x2 voxel lattice cell and the iso-surface threshold and returns the
//! triangle vertices for that cell. [`rebuild_chunk_mesh`] walks every cell
//! of a chunk (sampling across the three axis-positive neighbors and the
//! diagonal corner neighbor so seams are watertight, per spec.md §4.2) and
//! fills the chunk's vertex cache. No normals are stored — the renderer
//! derives them, per spec.md §1.

use super::chunk::ChunkData;
use super::core::voxel::Density;
use super::grid::ChunkGrid;
use crate::constants::CHUNK_EDGE;
use cgmath::{Point3, Vector3};

/// Offsets, in voxel-local space, of the eight corners of a lattice cell,
/// in the canonical marching-cubes corner order.
const CORNER_OFFSETS: [(u32, u32, u32); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (1, 1, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (1, 1, 1),
    (0, 1, 1),
];

/// The twelve edges of a cube, indexing into `CORNER_OFFSETS`.
const EDGE_CORNERS: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Lattice-cell corner densities, sampled once per cell per rebuild.
pub struct CellCorners {
    pub densities: [Density; 8],
    pub positions: [Point3<f32>; 8],
}

/// Triangulate one lattice cell. Returns a flat list of triangle vertices
/// (length is always a multiple of 3, up to 15 per cell per spec.md §4.5).
pub fn triangulate_cell(cell: &CellCorners, threshold: u8) -> Vec<Point3<f32>> {
    let mut case_index = 0u8;
    for (i, d) in cell.densities.iter().enumerate() {
        if d.0 > threshold {
            case_index |= 1 << i;
        }
    }

    if case_index == 0 || case_index == 0xFF {
        return Vec::new();
    }

    let mut edge_vertex = [None; 12];
    let row = &TRI_TABLE[case_index as usize];
    let mut out = Vec::with_capacity(row.iter().take_while(|e| **e >= 0).count());

    for &edge in row.iter() {
        if edge < 0 {
            break;
        }
        let edge = edge as usize;
        if edge_vertex[edge].is_none() {
            let (a, b) = EDGE_CORNERS[edge];
            edge_vertex[edge] = Some(interpolate_edge(
                cell.positions[a],
                cell.densities[a].0,
                cell.positions[b],
                cell.densities[b].0,
                threshold,
            ));
        }
        out.push(edge_vertex[edge].unwrap());
    }

    out
}

/// Linearly interpolate the iso-surface crossing point along one cube edge.
fn interpolate_edge(
    pa: Point3<f32>,
    da: u8,
    pb: Point3<f32>,
    db: u8,
    threshold: u8,
) -> Point3<f32> {
    let da = da as f32;
    let db = db as f32;
    let t = if (db - da).abs() < f32::EPSILON {
        0.5
    } else {
        (threshold as f32 - da) / (db - da)
    };
    let t = t.clamp(0.0, 1.0);
    pa + (pb - pa) * t
}

/// Rebuild the vertex cache of one chunk, sampling density from its own
/// grid plus the three axis-positive neighbors and the diagonal corner
/// neighbor. A lattice cell whose required neighbor chunk is absent is
/// skipped entirely (spec.md §4.2) rather than treated as empty space, so
/// a later-loaded neighbor never leaves a permanent seam crack.
pub fn rebuild_chunk_mesh(grid: &ChunkGrid, coord: super::core::ChunkCoord) -> Vec<Point3<f32>> {
    let edge = CHUNK_EDGE;
    let mut vertices = Vec::new();

    for lz in 0..edge {
        for ly in 0..edge {
            for lx in 0..edge {
                let Some(cell) = sample_cell(grid, coord, lx, ly, lz) else {
                    continue;
                };
                vertices.extend(triangulate_cell(&cell, grid.surface_threshold));
            }
        }
    }

    vertices
}

/// Sample the eight corner densities of the cell whose min corner is the
/// local voxel `(lx, ly, lz)` within chunk `coord`. Corners past the edge
/// of the chunk are fetched from the appropriate positive neighbor (or the
/// diagonal corner neighbor); returns `None` if a required neighbor chunk
/// isn't loaded.
fn sample_cell(
    grid: &ChunkGrid,
    coord: super::core::ChunkCoord,
    lx: u32,
    ly: u32,
    lz: u32,
) -> Option<CellCorners> {
    let edge = CHUNK_EDGE;
    let mut densities = [Density::EMPTY; 8];
    let mut positions = [Point3::new(0.0, 0.0, 0.0); 8];

    for (i, (ox, oy, oz)) in CORNER_OFFSETS.iter().enumerate() {
        let (gx, gy, gz) = (lx + ox, ly + oy, lz + oz);
        let (neighbor_coord, nx, ny, nz) = resolve_corner(coord, gx, gy, gz, edge);
        let chunk = grid.chunk(neighbor_coord)?;
        densities[i] = chunk.density(nx, ny, nz);
        positions[i] = grid.voxel_world_position(coord, lx as f32 + *ox as f32, ly as f32 + *oy as f32, lz as f32 + *oz as f32);
    }

    Some(CellCorners { densities, positions })
}

/// Resolve a corner coordinate that may spill past `CHUNK_EDGE` into the
/// appropriate axis-positive or diagonal-corner neighbor chunk.
fn resolve_corner(
    coord: super::core::ChunkCoord,
    gx: u32,
    gy: u32,
    gz: u32,
    edge: u32,
) -> (super::core::ChunkCoord, u32, u32, u32) {
    let (dx, nx) = if gx >= edge { (1, gx - edge) } else { (0, gx) };
    let (dy, ny) = if gy >= edge { (1, gy - edge) } else { (0, gy) };
    let (dz, nz) = if gz >= edge { (1, gz - edge) } else { (0, gz) };
    (
        super::core::ChunkCoord::new(coord.x + dx, coord.y + dy, coord.z + dz),
        nx,
        ny,
        nz,
    )
}

include!("mesh_tables.rs");

#[cfg(test)]
mod tests {
    use super::*;

    fn corners(values: [u8; 8]) -> CellCorners {
        let mut positions = [Point3::new(0.0, 0.0, 0.0); 8];
        for (i, (ox, oy, oz)) in CORNER_OFFSETS.iter().enumerate() {
            positions[i] = Point3::new(*ox as f32, *oy as f32, *oz as f32);
        }
        CellCorners {
            densities: values.map(Density),
            positions,
        }
    }

    #[test]
    fn empty_cell_produces_no_triangles() {
        let cell = corners([0; 8]);
        assert!(triangulate_cell(&cell, 60).is_empty());
    }

    #[test]
    fn fully_solid_cell_produces_no_triangles() {
        let cell = corners([200; 8]);
        assert!(triangulate_cell(&cell, 60).is_empty());
    }

    #[test]
    fn single_solid_corner_produces_a_triangle() {
        let mut values = [0u8; 8];
        values[0] = 200;
        let cell = corners(values);
        let verts = triangulate_cell(&cell, 60);
        assert_eq!(verts.len() % 3, 0);
        assert!(!verts.is_empty());
    }

    #[test]
    fn edge_interpolation_respects_threshold() {
        let p = interpolate_edge(Point3::new(0.0, 0.0, 0.0), 0, Point3::new(1.0, 0.0, 0.0), 120, 60);
        assert!((p.x - 0.5).abs() < 1e-4);
    }
}
