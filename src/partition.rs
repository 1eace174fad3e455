//! Quadtree partitioning of a point set into bounded regions.
//!
//! A region over the bounding box of the input splits into four quadrants at
//! its midpoint whenever it holds more points than the budget allows, until
//! every leaf is within budget. Only the leaves are returned; interior
//! regions exist during construction only.

use crate::point::{Bounds, Point};
use crate::predicates::EPSILON;
use anyhow::Result;

/// A rectangular region of the plane holding the points that fall inside it.
#[derive(Debug, Clone)]
pub struct Region {
    bounds: Bounds,
    points: Vec<Point>,
}

impl Region {
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Split into four quadrants at the midpoint. Assignment is half-open:
    /// a point exactly on a split line goes to the quadrant on the high side,
    /// so every point lands in exactly one child.
    fn split(self) -> [Region; 4] {
        let mid_x = (self.bounds.min_x + self.bounds.max_x) / 2.0;
        let mid_y = (self.bounds.min_y + self.bounds.max_y) / 2.0;

        let quadrant_bounds = [
            (self.bounds.min_x, self.bounds.min_y, mid_x, mid_y),
            (mid_x, self.bounds.min_y, self.bounds.max_x, mid_y),
            (self.bounds.min_x, mid_y, mid_x, self.bounds.max_y),
            (mid_x, mid_y, self.bounds.max_x, self.bounds.max_y),
        ];
        let mut children = quadrant_bounds.map(|(min_x, min_y, max_x, max_y)| Region {
            bounds: Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            },
            points: Vec::new(),
        });

        for p in self.points {
            let col = usize::from(p.x >= mid_x);
            let row = usize::from(p.y >= mid_y);
            children[2 * row + col].points.push(p);
        }

        children
    }
}

/// Partition `points` into quadtree leaf regions each holding at most
/// `max_points_per_region` points.
///
/// Returns no regions for an empty input. Fails on a budget of zero. A region
/// whose extent has collapsed below working precision is kept over budget
/// rather than split further, since its points are (nearly) coincident.
pub fn partition(points: &[Point], max_points_per_region: usize) -> Result<Vec<Region>> {
    if max_points_per_region == 0 {
        return Err(anyhow::Error::msg(
            "A region must be allowed to hold at least 1 point!",
        ));
    }
    let Some(bounds) = Bounds::of(points) else {
        return Ok(Vec::new());
    };

    let root = Region {
        bounds,
        points: points.to_vec(),
    };

    let mut pending = vec![root];
    let mut leaves = Vec::new();
    while let Some(region) = pending.pop() {
        if region.points.len() <= max_points_per_region {
            if !region.points.is_empty() {
                leaves.push(region);
            }
            continue;
        }
        if region.bounds.width() < EPSILON && region.bounds.height() < EPSILON {
            log::warn!(
                "region at {:?} holds {} (nearly) coincident points, not splitting further",
                region.bounds,
                region.points.len()
            );
            leaves.push(region);
            continue;
        }
        pending.extend(region.split());
    }

    log::debug!(
        "partitioned {} points into {} regions (budget {})",
        points.len(),
        leaves.len(),
        max_points_per_region
    );

    Ok(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_points_2d;
    use std::collections::HashMap;

    #[test]
    fn test_budget_zero_is_an_error() {
        assert!(partition(&[Point::new(0.0, 0.0)], 0).is_err());
    }

    #[test]
    fn test_empty_input_yields_no_regions() {
        let regions = partition(&[], 10).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_input_within_budget_stays_whole() {
        let points = sample_points_2d(10, Some(0.0..=1.0));
        let regions = partition(&points, 10).unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].points().len(), 10);
    }

    #[test]
    fn test_every_point_lands_in_exactly_one_region() {
        let points = sample_points_2d(500, Some(0.0..=100.0));
        let regions = partition(&points, 40).unwrap();

        let mut counts: HashMap<Point, usize> = HashMap::new();
        for region in &regions {
            assert!(region.points().len() <= 40);
            for &p in region.points() {
                *counts.entry(p).or_insert(0) += 1;
            }
        }

        assert_eq!(counts.len(), points.len());
        assert!(counts.values().all(|&c| c == 1));
    }

    #[test]
    fn test_point_on_split_line_goes_to_high_side() {
        // 3 points force a split of the unit square; the midpoint lies on
        // both split lines and must land in exactly one quadrant.
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.5, 0.5),
        ];
        let regions = partition(&points, 2).unwrap();

        let total: usize = regions.iter().map(|r| r.points().len()).sum();
        assert_eq!(total, 3);

        let holder: Vec<_> = regions
            .iter()
            .filter(|r| r.points().contains(&Point::new(0.5, 0.5)))
            .collect();
        assert_eq!(holder.len(), 1);
        assert_eq!(holder[0].bounds().min_x, 0.5);
        assert_eq!(holder[0].bounds().min_y, 0.5);
    }

    #[test]
    fn test_over_budget_input_splits_into_at_least_four_leaves() {
        let points = sample_points_2d(1_000, Some(0.0..=100.0));
        let regions = partition(&points, 200).unwrap();

        assert!(regions.len() >= 4, "only {} leaves", regions.len());
    }

    #[test]
    fn test_coincident_points_do_not_split_forever() {
        let mut points = vec![Point::new(1.0, 1.0); 20];
        points.push(Point::new(1.0 + 1e-12, 1.0));
        let regions = partition(&points, 5).unwrap();

        let total: usize = regions.iter().map(|r| r.points().len()).sum();
        assert_eq!(total, 21);
    }
}
