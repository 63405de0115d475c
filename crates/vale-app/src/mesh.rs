//! CPU ground meshes for streamed tiles.
//!
//! The headless viewer has no GPU, so tiles are built into plain vertex
//! buffers. Every tile shares one grid template (local XZ positions and the
//! index buffer); only heights and normals differ per tile.

use std::sync::Arc;

use glam::{DVec3, Vec3};
use vale_stream::{TileBuilder, TileCoord, TileRequest};
use vale_terrain::WorldConfig;

/// Tile build failures.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// The height grid does not match the mesh grid.
    #[error("tile {coord}: expected {expected} heights, got {found}")]
    FieldSizeMismatch {
        coord: TileCoord,
        expected: usize,
        found: usize,
    },
    /// A height was NaN or infinite.
    #[error("tile {coord}: non-finite height at vertex {index}")]
    NonFiniteHeight { coord: TileCoord, index: usize },
}

/// Shared grid layout for one tile size and subdivision count.
#[derive(Debug)]
struct GridTemplate {
    /// Local `(x, z)` per vertex, relative to the tile centre.
    local_xz: Vec<[f32; 2]>,
    indices: Arc<[u32]>,
}

impl GridTemplate {
    fn new(size: f64, subdivisions: u32) -> Self {
        let width = subdivisions as usize + 1;
        let step = size / f64::from(subdivisions);
        let half = size * 0.5;

        let mut local_xz = Vec::with_capacity(width * width);
        for row in 0..width {
            for col in 0..width {
                local_xz.push([
                    (col as f64 * step - half) as f32,
                    (row as f64 * step - half) as f32,
                ]);
            }
        }

        // Two triangles per cell, split along the (1,0)-(0,1) diagonal so the
        // mesh matches the height sampler.
        let w = width as u32;
        let cells = subdivisions as usize;
        let mut indices = Vec::with_capacity(cells * cells * 6);
        for row in 0..subdivisions {
            for col in 0..subdivisions {
                let i00 = row * w + col;
                let i10 = i00 + 1;
                let i01 = i00 + w;
                let i11 = i01 + 1;
                indices.extend_from_slice(&[i00, i01, i10, i10, i01, i11]);
            }
        }

        Self {
            local_xz,
            indices: indices.into(),
        }
    }
}

/// One tile's vertex data.
#[derive(Debug, Clone)]
pub struct GroundMesh {
    pub name: String,
    pub center: DVec3,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Arc<[u32]>,
    pub enabled: bool,
    /// How many times this buffer has been (re)built.
    pub builds: u32,
}

impl GroundMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Builds and recycles [`GroundMesh`] buffers for the streamer.
#[derive(Debug)]
pub struct MeshPool {
    size: f64,
    subdivisions: u32,
    template: Option<GridTemplate>,
    created: usize,
}

impl MeshPool {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            size: config.size(),
            subdivisions: config.subdivisions(),
            template: None,
            created: 0,
        }
    }

    /// Meshes created over the pool's lifetime.
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    fn template(&mut self) -> &GridTemplate {
        let (size, subdivisions) = (self.size, self.subdivisions);
        self.template.get_or_insert_with(|| {
            tracing::debug!(size, subdivisions, "building grid template");
            GridTemplate::new(size, subdivisions)
        })
    }

    fn fill(&mut self, mesh: &mut GroundMesh, request: &TileRequest<'_>) -> Result<(), MeshError> {
        let template = self.template();
        let heights = request.field.values();
        let expected = template.local_xz.len();
        if heights.len() != expected {
            return Err(MeshError::FieldSizeMismatch {
                coord: request.coord,
                expected,
                found: heights.len(),
            });
        }
        if let Some(index) = heights.iter().position(|h| !h.is_finite()) {
            return Err(MeshError::NonFiniteHeight {
                coord: request.coord,
                index,
            });
        }

        mesh.positions.clear();
        mesh.positions.extend(
            template
                .local_xz
                .iter()
                .zip(heights)
                .map(|(&[x, z], &h)| [x, h, z]),
        );
        mesh.indices = Arc::clone(&template.indices);
        compute_normals(&mesh.positions, &mesh.indices, &mut mesh.normals);

        mesh.name = request.name.to_string();
        mesh.center = request.center;
        mesh.builds += 1;
        Ok(())
    }
}

impl TileBuilder for MeshPool {
    type Handle = GroundMesh;
    type Error = MeshError;

    fn create_tile(&mut self, request: &TileRequest<'_>) -> Result<GroundMesh, MeshError> {
        let mut mesh = GroundMesh {
            name: String::new(),
            center: DVec3::ZERO,
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Arc::from(Vec::new()),
            enabled: false,
            builds: 0,
        };
        self.fill(&mut mesh, request)?;
        self.created += 1;
        Ok(mesh)
    }

    fn refresh_tile(
        &mut self,
        mesh: &mut GroundMesh,
        request: &TileRequest<'_>,
    ) -> Result<(), MeshError> {
        self.fill(mesh, request)
    }

    fn set_enabled(&mut self, mesh: &mut GroundMesh, enabled: bool) {
        mesh.enabled = enabled;
    }

    fn invalidate_templates(&mut self) {
        self.template = None;
    }
}

/// Area-weighted vertex normals.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32], normals: &mut Vec<[f32; 3]>) {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from(positions[a]);
        let face = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    normals.clear();
    normals.extend(acc.into_iter().map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array()));
}
