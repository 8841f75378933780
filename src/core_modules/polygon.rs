// THEORY:
// The `polygon` module turns the winning cluster into an editable boundary
// polygon with a fixed vertex count. The extraction is a one-shot candidate:
// a human may later drag, delete, or insert vertices through an external
// editing surface, so the data structure is built for that from the start.
//
// Key architectural principles:
// 1.  **Angular sector sampling**: The full angular range around the cluster
//     centroid is split into N equal sectors. Each sector contributes the
//     boundary pixel farthest from the centroid whose angle falls inside it.
//     An empty sector falls back to a small fixed offset along its center
//     angle, so the result always has exactly N non-degenerate vertices in
//     ascending angular order.
// 2.  **Circular-wrap awareness**: Boundary angles are reduced to [0, 2pi)
//     and sectors are half-open bands around their centers, so the sector
//     straddling the atan2 seam behaves like every other sector and every
//     boundary pixel belongs to exactly one sector.
// 3.  **Outlier clamp**: A single segmentation spike can throw one vertex far
//     outside the region. After all N vertices exist, any vertex beyond 1.8x
//     the mean centroid distance is pulled in along its own angle to 1.3x the
//     mean.
// 4.  **Stable vertex identity**: Every vertex carries an id minted from a
//     monotonic counter, never its position in the sequence. Editing
//     operations (move, remove, insert-on-edge) address vertices by id, so
//     structural changes never renumber neighbors or act on the wrong vertex.

use crate::core_modules::cluster::Point;
use crate::core_modules::raster::Mask;

/// Default number of polygon vertices produced by extraction.
pub const DEFAULT_VERTEX_COUNT: usize = 16;

/// Pixel distance used for vertices in sectors with no boundary pixel.
const EMPTY_SECTOR_OFFSET_PX: f64 = 3.0;

/// Vertices beyond this multiple of the mean centroid distance are outliers.
const OUTLIER_TRIGGER_RATIO: f64 = 1.8;

/// Outliers are pulled in to this multiple of the mean centroid distance.
const OUTLIER_CLAMP_RATIO: f64 = 1.3;

pub type VertexId = u64;

/// One polygon vertex in pixel space with a stable identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
}

/// An ordered closed polygon whose vertices keep their ids across edits.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    vertices: Vec<Vertex>,
    next_id: VertexId,
}

impl BoundaryPolygon {
    /// The empty polygon, the degraded "could not auto-detect" result.
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            next_id: 0,
        }
    }

    /// Builds a polygon from ordered positions, minting fresh ids.
    pub fn from_points(points: Vec<(f64, f64)>) -> Self {
        let vertices = points
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| Vertex {
                id: i as VertexId,
                x,
                y,
            })
            .collect::<Vec<_>>();
        let next_id = vertices.len() as VertexId;
        Self { vertices, next_id }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex positions in sequence order, as the geometry stage consumes them.
    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.vertices.iter().map(|v| (v.x, v.y)).collect()
    }

    /// Moves the vertex with the given id. Returns false for unknown ids.
    pub fn move_vertex(&mut self, id: VertexId, x: f64, y: f64) -> bool {
        match self.vertices.iter_mut().find(|v| v.id == id) {
            Some(vertex) => {
                vertex.x = x;
                vertex.y = y;
                true
            }
            None => false,
        }
    }

    /// Removes a vertex by id. Refuses when the polygon would stop being a
    /// closed shape (fewer than 3 vertices remain).
    pub fn remove_vertex(&mut self, id: VertexId) -> bool {
        if self.vertices.len() <= 3 {
            return false;
        }
        let before = self.vertices.len();
        self.vertices.retain(|v| v.id != id);
        self.vertices.len() != before
    }

    /// Inserts a new vertex on the edge following `id`, returning the fresh
    /// id, or None when `id` is unknown.
    pub fn insert_after(&mut self, id: VertexId, x: f64, y: f64) -> Option<VertexId> {
        let index = self.vertices.iter().position(|v| v.id == id)?;
        let new_id = self.next_id;
        self.next_id += 1;
        self.vertices.insert(index + 1, Vertex { id: new_id, x, y });
        Some(new_id)
    }
}

/// Extracts a fixed-vertex-count boundary polygon for the cluster.
///
/// `mask` is the cleaned mask the cluster was found in; boundary pixels are
/// cluster pixels with at least one 4-neighbor outside the mask or the image.
pub fn extract_polygon(cluster: &[Point], mask: &Mask, vertex_count: usize) -> BoundaryPolygon {
    if cluster.is_empty() || vertex_count == 0 {
        return BoundaryPolygon::empty();
    }

    let boundary = boundary_pixels(cluster, mask);

    // Centroid over ALL cluster pixels, not just the boundary.
    let mut centroid_x = 0.0f64;
    let mut centroid_y = 0.0f64;
    for p in cluster {
        centroid_x += p.x as f64;
        centroid_y += p.y as f64;
    }
    centroid_x /= cluster.len() as f64;
    centroid_y /= cluster.len() as f64;

    let angle_step = std::f64::consts::TAU / vertex_count as f64;

    // Sector i covers the half-open band [center - step/2, center + step/2),
    // wrapped at the seam, so every boundary pixel lands in exactly one
    // sector and no pixel can be emitted as two coincident vertices.
    let mut best: Vec<Option<(f64, (f64, f64))>> = vec![None; vertex_count];
    for p in &boundary {
        let dx = p.x as f64 - centroid_x;
        let dy = p.y as f64 - centroid_y;
        let angle = dy.atan2(dx).rem_euclid(std::f64::consts::TAU);
        let sector =
            (((angle + angle_step / 2.0) / angle_step).floor() as usize) % vertex_count;
        let distance = (dx * dx + dy * dy).sqrt();
        if best[sector].is_none_or(|(held, _)| distance > held) {
            best[sector] = Some((distance, (p.x as f64, p.y as f64)));
        }
    }

    let mut points = Vec::with_capacity(vertex_count);
    for (i, slot) in best.into_iter().enumerate() {
        let sector_center = angle_step * i as f64;
        points.push(match slot {
            Some((_, position)) => position,
            None => (
                centroid_x + sector_center.cos() * EMPTY_SECTOR_OFFSET_PX,
                centroid_y + sector_center.sin() * EMPTY_SECTOR_OFFSET_PX,
            ),
        });
    }

    clamp_outliers(&mut points, centroid_x, centroid_y);
    BoundaryPolygon::from_points(points)
}

fn boundary_pixels(cluster: &[Point], mask: &Mask) -> Vec<Point> {
    let mut boundary = Vec::new();
    for p in cluster {
        let neighbors = [
            (p.x as i64 - 1, p.y as i64),
            (p.x as i64 + 1, p.y as i64),
            (p.x as i64, p.y as i64 - 1),
            (p.x as i64, p.y as i64 + 1),
        ];
        if neighbors.iter().any(|&(nx, ny)| !mask.truthy(nx, ny)) {
            boundary.push(*p);
        }
    }
    boundary
}

fn clamp_outliers(points: &mut [(f64, f64)], centroid_x: f64, centroid_y: f64) {
    let distances: Vec<f64> = points
        .iter()
        .map(|(x, y)| ((x - centroid_x).powi(2) + (y - centroid_y).powi(2)).sqrt())
        .collect();
    let mean = distances.iter().sum::<f64>() / distances.len() as f64;

    for (point, distance) in points.iter_mut().zip(&distances) {
        if *distance > mean * OUTLIER_TRIGGER_RATIO {
            let angle = (point.1 - centroid_y).atan2(point.0 - centroid_x);
            point.0 = centroid_x + angle.cos() * mean * OUTLIER_CLAMP_RATIO;
            point.1 = centroid_y + angle.sin() * mean * OUTLIER_CLAMP_RATIO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::raster::Mask;

    /// Builds a mask plus cluster from a predicate over (x, y).
    fn shape(width: u32, height: u32, inside: impl Fn(i64, i64) -> bool) -> (Mask, Vec<Point>) {
        let mut mask = Mask::new(width, height);
        let mut cluster = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if inside(x as i64, y as i64) {
                    mask.set(x, y, true);
                    cluster.push(Point { x, y });
                }
            }
        }
        (mask, cluster)
    }

    fn centroid(cluster: &[Point]) -> (f64, f64) {
        let n = cluster.len() as f64;
        (
            cluster.iter().map(|p| p.x as f64).sum::<f64>() / n,
            cluster.iter().map(|p| p.y as f64).sum::<f64>() / n,
        )
    }

    #[test]
    fn circular_cluster_yields_exactly_n_vertices_in_angular_order() {
        let (mask, cluster) = shape(21, 21, |x, y| {
            let (dx, dy) = (x - 10, y - 10);
            dx * dx + dy * dy <= 36
        });
        let polygon = extract_polygon(&cluster, &mask, 16);
        assert_eq!(polygon.len(), 16);

        // Vertex i must sit inside sector i (ascending angular order by
        // construction) and at a plausible radius for a radius-6 disk.
        let (cx, cy) = centroid(&cluster);
        let step = std::f64::consts::TAU / 16.0;
        for (i, v) in polygon.vertices().iter().enumerate() {
            let angle = (v.y - cy).atan2(v.x - cx).rem_euclid(std::f64::consts::TAU);
            let center = step * i as f64;
            let mut difference = (angle - center).abs();
            if difference > std::f64::consts::PI {
                difference = std::f64::consts::TAU - difference;
            }
            assert!(difference <= step / 2.0 + 1e-9, "vertex {i} left its sector");
            let distance = ((v.x - cx).powi(2) + (v.y - cy).powi(2)).sqrt();
            assert!((4.0..8.0).contains(&distance));
        }
    }

    #[test]
    fn irregular_star_cluster_still_yields_exactly_n_vertices() {
        // Disk plus spikes along the axes.
        let (mask, cluster) = shape(31, 31, |x, y| {
            let (dx, dy) = (x - 15, y - 15);
            dx * dx + dy * dy <= 16 || (dy == 0 && dx.abs() <= 10) || (dx == 0 && dy.abs() <= 10)
        });
        let polygon = extract_polygon(&cluster, &mask, 16);
        assert_eq!(polygon.len(), 16);
    }

    #[test]
    fn empty_sectors_fall_back_to_the_fixed_offset() {
        // A thin horizontal line has no boundary pixels anywhere near the
        // vertical sector centers.
        let (mask, cluster) = shape(14, 3, |x, y| y == 1 && (1..13).contains(&x));
        let polygon = extract_polygon(&cluster, &mask, 16);
        assert_eq!(polygon.len(), 16);

        let (cx, cy) = centroid(&cluster);
        // Sector 4 of 16 is centered on pi/2, straight down the empty axis.
        let v = polygon.vertices()[4];
        let distance = ((v.x - cx).powi(2) + (v.y - cy).powi(2)).sqrt();
        assert!((distance - EMPTY_SECTOR_OFFSET_PX).abs() < 1e-9);
    }

    #[test]
    fn spike_vertices_are_clamped_toward_the_mean_radius() {
        // Disk of radius 5 with a single-pixel ray out to distance 12.
        let (mask, cluster) = shape(31, 31, |x, y| {
            let (dx, dy) = (x - 15, y - 15);
            dx * dx + dy * dy <= 25 || (dy == 0 && (0..=12).contains(&dx))
        });
        let polygon = extract_polygon(&cluster, &mask, 16);
        assert_eq!(polygon.len(), 16);

        let (cx, cy) = centroid(&cluster);
        for v in polygon.vertices() {
            let distance = ((v.x - cx).powi(2) + (v.y - cy).powi(2)).sqrt();
            assert!(distance < 9.0, "outlier vertex survived at {distance}");
        }
    }

    #[test]
    fn a_pixel_on_a_sector_edge_belongs_to_exactly_one_sector() {
        // A square plus a ray along its main diagonal: the centroid stays on
        // the diagonal, so every ray pixel sits at exactly 45 degrees, the
        // shared edge between the first two of four sectors. The ray tip must
        // be emitted once, never as two coincident vertices.
        let (mask, cluster) = shape(20, 20, |x, y| {
            ((5..=11).contains(&x) && (5..=11).contains(&y)) || (x == y && (12..=14).contains(&x))
        });
        let polygon = extract_polygon(&cluster, &mask, 4);
        assert_eq!(polygon.len(), 4);

        let positions = polygon.positions();
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                let (a, b) = (positions[i], positions[j]);
                let separation = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
                assert!(separation > 0.5, "vertices {i} and {j} coincide at {a:?}");
            }
        }

        // The tip lands in the second sector; the first keeps a square-edge
        // pixel at a much shorter radius.
        let (cx, cy) = centroid(&cluster);
        let radius = |v: &Vertex| ((v.x - cx).powi(2) + (v.y - cy).powi(2)).sqrt();
        assert!(radius(&polygon.vertices()[1]) > 6.0);
        assert!(radius(&polygon.vertices()[0]) < 6.0);
    }

    #[test]
    fn vertex_ids_are_stable_across_edits() {
        let mut polygon = BoundaryPolygon::from_points(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]);
        let ids: Vec<_> = polygon.vertices().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        assert!(polygon.move_vertex(2, 12.0, 9.0));
        assert_eq!(polygon.vertices()[2].x, 12.0);

        let inserted = polygon.insert_after(1, 11.0, 5.0).unwrap();
        assert_eq!(inserted, 4);
        assert_eq!(polygon.vertices()[2].id, inserted);
        // Neighbors keep their ids after the structural change.
        assert_eq!(polygon.vertices()[1].id, 1);
        assert_eq!(polygon.vertices()[3].id, 2);

        assert!(polygon.remove_vertex(0));
        assert_eq!(polygon.len(), 4);
        assert!(!polygon.vertices().iter().any(|v| v.id == 0));
    }

    #[test]
    fn removal_below_a_triangle_is_refused() {
        let mut polygon =
            BoundaryPolygon::from_points(vec![(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)]);
        assert!(!polygon.remove_vertex(1));
        assert_eq!(polygon.len(), 3);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut polygon =
            BoundaryPolygon::from_points(vec![(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)]);
        assert!(!polygon.move_vertex(99, 0.0, 0.0));
        assert!(polygon.insert_after(99, 0.0, 0.0).is_none());
    }
}
