//! Decorative product placement on shelf layers.
//!
//! Each shelf gets a coarse occupancy grid so products spread out instead of
//! piling up. Placement picks the first free cell (random cell when the grid
//! is full), jitters the position inside the cell, and fits the product's
//! height to the clearance below the next shelf. The presentation layer
//! loads the actual models, applies these placements, and registers the
//! resulting meshes back into the environment.

use rand::Rng;

use crate::types::Vec3;

use super::classify::ShelfLayer;

/// Grid cells are sized relative to the container footprint.
const CELL_WIDTH_FRACTION: f32 = 0.1;
const CELL_DEPTH_FRACTION: f32 = 0.15;

/// Positions are jittered by up to this fraction of the cell size.
const CELL_JITTER_FRACTION: f32 = 0.15;

/// Products sit this far above the shelf surface before the final snap.
const SHELF_REST_OFFSET: f32 = 0.01;

/// Clearance assumed above the topmost shelf, as a fraction of container height.
const TOP_SHELF_CLEARANCE_FRACTION: f32 = 0.20;

/// Default product height as a fraction of the available clearance.
const DEFAULT_HEIGHT_RATIO: f32 = 0.25;

/// Products never exceed this fraction of the clearance.
const MAX_CLEARANCE_RATIO: f32 = 0.9;

/// Minimum product height (meters).
const MIN_PRODUCT_HEIGHT: f32 = 0.05;

/// One decorative model to scatter across the shelves.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    /// Asset path of the model, relative to the asset root.
    pub file: &'static str,
    /// How many instances to place.
    pub count: u32,
    /// Exact target height, overriding the clearance-derived one.
    pub target_height: Option<f32>,
    /// Product height as a fraction of shelf clearance when no exact height
    /// is given.
    pub height_ratio: f32,
}

/// The shipped catalog. Empty for now: the fridge starts bare, but the
/// placement machinery stays live for level variants that fill it.
pub const PRODUCT_CATALOG: &[CatalogEntry] = &[];

/// A resolved spot for one product instance.
#[derive(Clone, Debug)]
pub struct DecorPlacement {
    pub file: &'static str,
    pub shelf_index: usize,
    pub x: f32,
    pub z: f32,
    /// Resting height before the presentation layer's final downward snap.
    pub y: f32,
    /// World height the model should be scaled to.
    pub target_height: f32,
}

/// Per-shelf occupancy grid.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    grid_x: usize,
    grid_z: usize,
    occupied: Vec<bool>,
}

impl OccupancyGrid {
    pub fn for_shelf(shelf: &ShelfLayer, container_size: Vec3) -> Self {
        let cell_w = (container_size.x * CELL_WIDTH_FRACTION).max(f32::EPSILON);
        let cell_d = (container_size.z * CELL_DEPTH_FRACTION).max(f32::EPSILON);
        let grid_x = ((shelf.usable_width() / cell_w).round() as usize).max(3);
        let grid_z = ((shelf.usable_depth() / cell_d).round() as usize).max(2);
        Self {
            grid_x,
            grid_z,
            occupied: vec![false; grid_x * grid_z],
        }
    }

    /// Claim the first free cell, or a random cell when the grid is full.
    pub fn alloc(&mut self, rng: &mut impl Rng) -> usize {
        if let Some(idx) = self.occupied.iter().position(|taken| !taken) {
            self.occupied[idx] = true;
            return idx;
        }
        rng.gen_range(0..self.occupied.len())
    }

    /// Jittered world position of a cell on the given shelf.
    pub fn cell_position(&self, shelf: &ShelfLayer, idx: usize, rng: &mut impl Rng) -> (f32, f32) {
        let cx = idx % self.grid_x;
        let cz = idx / self.grid_x;
        let cell_w = shelf.usable_width() / self.grid_x as f32;
        let cell_d = shelf.usable_depth() / self.grid_z as f32;
        let jitter_x = rng.gen_range(-0.5..0.5f32) * cell_w * CELL_JITTER_FRACTION;
        let jitter_z = rng.gen_range(-0.5..0.5f32) * cell_d * CELL_JITTER_FRACTION;
        (
            shelf.x_min + (cx as f32 + 0.5) * cell_w + jitter_x,
            shelf.z_min + (cz as f32 + 0.5) * cell_d + jitter_z,
        )
    }
}

/// Height a product should be scaled to on shelf `index`, given the clearance
/// to the next shelf up.
pub fn fit_height(
    shelves: &[ShelfLayer],
    index: usize,
    container_height: f32,
    entry: &CatalogEntry,
) -> f32 {
    if let Some(exact) = entry.target_height {
        return exact;
    }
    let shelf_y = shelves[index].top_y;
    let next_y = shelves
        .get(index + 1)
        .map(|s| s.top_y)
        .unwrap_or(shelf_y + container_height * TOP_SHELF_CLEARANCE_FRACTION);
    let clearance = (next_y - shelf_y).max(MIN_PRODUCT_HEIGHT);
    let ratio = if entry.height_ratio > 0.0 {
        entry.height_ratio
    } else {
        DEFAULT_HEIGHT_RATIO
    };
    (clearance * ratio)
        .min(clearance * MAX_CLEARANCE_RATIO)
        .max(MIN_PRODUCT_HEIGHT)
}

/// Plan every instance in `catalog` across `shelves`, round-robin by shelf.
pub fn plan_catalog(
    shelves: &[ShelfLayer],
    container_size: Vec3,
    catalog: &[CatalogEntry],
    rng: &mut impl Rng,
) -> Vec<DecorPlacement> {
    if shelves.is_empty() || catalog.is_empty() {
        return Vec::new();
    }

    let mut grids: Vec<OccupancyGrid> = shelves
        .iter()
        .map(|s| OccupancyGrid::for_shelf(s, container_size))
        .collect();

    let mut placements = Vec::new();
    let mut layer = 0usize;
    for entry in catalog {
        for _ in 0..entry.count.max(1) {
            let shelf = &shelves[layer];
            let idx = grids[layer].alloc(rng);
            let (x, z) = grids[layer].cell_position(shelf, idx, rng);
            placements.push(DecorPlacement {
                file: entry.file,
                shelf_index: layer,
                x,
                z,
                y: shelf.top_y + SHELF_REST_OFFSET,
                target_height: fit_height(shelves, layer, container_size.y, entry),
            });
            layer = (layer + 1) % shelves.len();
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Aabb, MeshId, Point3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn shelf(id: u32, top_y: f32) -> ShelfLayer {
        let aabb = Aabb::new(
            Point3::new(0.0, top_y - 0.2, 0.0),
            Point3::new(8.0, top_y, 6.0),
        );
        ShelfLayer {
            source: MeshId(id),
            aabb,
            top_y,
            x_min: 0.5,
            x_max: 7.5,
            z_min: 0.4,
            z_max: 5.6,
        }
    }

    fn container() -> Vec3 {
        Vec3::new(10.0, 10.0, 8.0)
    }

    #[test]
    fn grid_allocates_every_cell_before_reusing() {
        let s = shelf(0, 1.0);
        let mut grid = OccupancyGrid::for_shelf(&s, container());
        let total = grid.occupied.len();
        let mut rng = StdRng::seed_from_u64(7);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..total {
            assert!(seen.insert(grid.alloc(&mut rng)));
        }
        // Full grid: further allocations reuse existing cells.
        let idx = grid.alloc(&mut rng);
        assert!(idx < total);
    }

    #[test]
    fn cell_positions_stay_inside_the_usable_rectangle() {
        let s = shelf(0, 1.0);
        let mut grid = OccupancyGrid::for_shelf(&s, container());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..grid.occupied.len() {
            let idx = grid.alloc(&mut rng);
            let (x, z) = grid.cell_position(&s, idx, &mut rng);
            assert!(x >= s.x_min && x <= s.x_max);
            assert!(z >= s.z_min && z <= s.z_max);
        }
    }

    #[test]
    fn fit_height_respects_shelf_clearance() {
        let shelves = vec![shelf(0, 1.0), shelf(1, 3.0)];
        let entry = CatalogEntry {
            file: "models/jar.glb",
            count: 1,
            target_height: None,
            height_ratio: 0.5,
        };
        // Clearance between shelves is 2.0; half of it is 1.0.
        let h = fit_height(&shelves, 0, container().y, &entry);
        assert!((h - 1.0).abs() < 1.0e-6);
        // The top shelf uses the container-derived clearance instead.
        let h_top = fit_height(&shelves, 1, container().y, &entry);
        assert!(h_top > 0.0 && h_top <= container().y * 0.2 * 0.9);
    }

    #[test]
    fn exact_target_height_wins() {
        let shelves = vec![shelf(0, 1.0)];
        let entry = CatalogEntry {
            file: "models/jar.glb",
            count: 1,
            target_height: Some(0.42),
            height_ratio: 0.25,
        };
        assert_eq!(fit_height(&shelves, 0, container().y, &entry), 0.42);
    }

    #[test]
    fn catalog_round_robins_across_shelves() {
        let shelves = vec![shelf(0, 1.0), shelf(1, 3.0)];
        let catalog = [CatalogEntry {
            file: "models/jar.glb",
            count: 4,
            target_height: None,
            height_ratio: 0.25,
        }];
        let mut rng = StdRng::seed_from_u64(3);
        let placements = plan_catalog(&shelves, container(), &catalog, &mut rng);
        assert_eq!(placements.len(), 4);
        let indices: Vec<usize> = placements.iter().map(|p| p.shelf_index).collect();
        assert_eq!(indices, vec![0, 1, 0, 1]);
        for p in &placements {
            assert!((p.y - (shelves[p.shelf_index].top_y + 0.01)).abs() < 1.0e-6);
        }
    }
}
