// THEORY:
// The `cluster` module partitions the cleaned mask into its 8-connected
// components and hands the pipeline the single largest one. A breadth-first
// flood fill with a visited grid guarantees every true pixel is visited
// exactly once, so components never overlap. A floor on the winning cluster
// size (default 5 px) turns "a few stray pixels survived the filters" into an
// explicit InsufficientRegion error instead of a meaningless polygon.

use crate::core_modules::raster::Mask;
use crate::error::{DetectionError, Result};
use std::collections::VecDeque;

/// Default minimum pixel count for a reliable region.
pub const DEFAULT_MIN_CLUSTER_PIXELS: usize = 5;

/// A pixel coordinate on the mask grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// Finds the largest 8-connected cluster of true pixels.
///
/// Returns `InsufficientRegion` when the largest cluster (or the whole mask)
/// holds fewer than `minimum_pixels`.
pub fn largest_cluster(mask: &Mask, minimum_pixels: usize) -> Result<Vec<Point>> {
    let (width, height) = (mask.width(), mask.height());
    let mut visited = Mask::new(width, height);
    let mut largest: Vec<Point> = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) || visited.get(x, y) {
                continue;
            }

            let mut cluster = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(Point { x, y });
            visited.set(x, y, true);

            while let Some(current) = queue.pop_front() {
                cluster.push(current);

                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (current.x as i64 + dx, current.y as i64 + dy);
                        if mask.truthy(nx, ny) && !visited.get(nx as u32, ny as u32) {
                            visited.set(nx as u32, ny as u32, true);
                            queue.push_back(Point {
                                x: nx as u32,
                                y: ny as u32,
                            });
                        }
                    }
                }
            }

            if cluster.len() > largest.len() {
                largest = cluster;
            }
        }
    }

    if largest.len() < minimum_pixels {
        return Err(DetectionError::InsufficientRegion {
            found: largest.len(),
            minimum: minimum_pixels,
        });
    }
    Ok(largest)
}
