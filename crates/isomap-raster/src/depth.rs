//! Depth sorting
//!
//! Objects are drawn back to front. Two objects whose sprites overlap are
//! ordered by which side of the other's divider line they stand on; every
//! other pair falls back to the grid depth key `x + y`.
//!
//! The relation is a heuristic and is not guaranteed to be transitive: three
//! mutually overlapping objects with conflicting dividers can form a cycle.
//! Such inputs still sort deterministically, just not consistently.

use crate::placer::PlacedObject;
use crate::projector::ScreenPoint;
use isomap_core::DepthPoint;
use std::cmp::Ordering;

/// Occlusion line in screen space, running from the leftmost to the
/// rightmost depth point of an object type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divider {
    pub start: ScreenPoint,
    pub end: ScreenPoint,
}

impl Divider {
    /// Build the divider for an object anchored at `anchor`.
    ///
    /// Only the minimum-x and maximum-x points are used; interior points of
    /// the polyline do not take part. Returns `None` for fewer than two points.
    pub fn from_depth_points(anchor: ScreenPoint, points: &[DepthPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

        let left = sorted.first()?;
        let right = sorted.last()?;

        Some(Self {
            start: anchor.offset(left.x, left.y),
            end: anchor.offset(right.x, right.y),
        })
    }

    /// 2-D cross product of the line direction with `point - start`.
    ///
    /// With y growing downward, a positive value means `point` lies below
    /// (in front of) a left-to-right line.
    pub fn side(&self, point: ScreenPoint) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let qx = point.x - self.start.x;
        let qy = point.y - self.start.y;
        dx * qy - dy * qx
    }
}

/// Draw-order relation: `Less` means `a` is drawn before (behind) `b`.
pub fn order(a: &PlacedObject<'_>, b: &PlacedObject<'_>) -> Ordering {
    if std::ptr::eq(a, b) {
        return Ordering::Equal;
    }

    if a.bbox.intersects(&b.bbox) {
        if let Some(line) = &a.divider {
            let cross = line.side(b.representative);
            if cross > 0.0 {
                return Ordering::Less;
            }
            if cross < 0.0 {
                return Ordering::Greater;
            }
        }

        if let Some(line) = &b.divider {
            let cross = line.side(a.representative);
            if cross > 0.0 {
                return Ordering::Greater;
            }
            if cross < 0.0 {
                return Ordering::Less;
            }
        }
    }

    a.depth_key().cmp(&b.depth_key())
}

/// Sort placed objects into back-to-front draw order. Objects that compare
/// equal keep their input order.
pub fn sort_back_to_front<'a>(objects: Vec<PlacedObject<'a>>) -> Vec<PlacedObject<'a>> {
    merge_sort_by(objects, &order)
}

/// Stable top-down merge sort.
///
/// `slice::sort_by` may panic when the comparator is not a total order, which
/// [`order`] does not guarantee.
fn merge_sort_by<T, F>(mut items: Vec<T>, cmp: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(r, l) == Ordering::Less,
            _ => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged.extend(left);
    merged.extend(right);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomap_core::{ImageFrame, MapObjectInstance, MapObjectType};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn placed<'a>(
        instance: &'a MapObjectInstance,
        object_type: &'a MapObjectType,
        anchor: (f64, f64),
        position: (i64, i64),
    ) -> PlacedObject<'a> {
        PlacedObject::new(
            instance,
            object_type,
            Arc::new(ImageFrame::new_rgba8(40, 40)),
            ScreenPoint::new(anchor.0, anchor.1),
            position,
        )
    }

    fn ids(objects: &[PlacedObject<'_>]) -> Vec<String> {
        objects
            .iter()
            .map(|o| o.instance.object_type.clone())
            .collect()
    }

    fn horizontal_fence() -> MapObjectType {
        MapObjectType::new("fence", 0.5, 1.0)
            .with_depth_points(vec![DepthPoint::new(-10.0, 0.0), DepthPoint::new(10.0, 0.0)])
    }

    #[test]
    fn test_divider_uses_extreme_x_points() {
        let points = [
            DepthPoint::new(0.0, -50.0),
            DepthPoint::new(10.0, 0.0),
            DepthPoint::new(-10.0, 0.0),
        ];
        let divider = Divider::from_depth_points(ScreenPoint::new(100.0, 100.0), &points).unwrap();

        assert_eq!(divider.start, ScreenPoint::new(90.0, 100.0));
        assert_eq!(divider.end, ScreenPoint::new(110.0, 100.0));

        assert!(Divider::from_depth_points(ScreenPoint::default(), &points[..1]).is_none());
        assert!(Divider::from_depth_points(ScreenPoint::default(), &[]).is_none());
    }

    #[test]
    fn test_point_below_divider_is_drawn_later() {
        // line (90,100) -> (110,100); B's representative point (105,110)
        // lies below it: cross = 20 * 10 - 0 * 15 = 200
        let fence = horizontal_fence();
        let post = MapObjectType::new("post", 0.5, 1.0);
        // grid depth alone would put the fence in front
        let a_inst = MapObjectInstance::new("fence", 5, 5);
        let b_inst = MapObjectInstance::new("post", 0, 0);

        let a = placed(&a_inst, &fence, (100.0, 100.0), (80, 70));
        let b = placed(&b_inst, &post, (105.0, 110.0), (85, 80));

        assert_eq!(a.divider.unwrap().side(b.representative), 200.0);
        assert_eq!(order(&a, &b), Ordering::Less);
        assert_eq!(order(&b, &a), Ordering::Greater);

        let sorted = sort_back_to_front(vec![b, a]);
        assert_eq!(ids(&sorted), vec!["fence", "post"]);
    }

    #[test]
    fn test_point_above_divider_is_drawn_first() {
        let fence = horizontal_fence();
        let post = MapObjectType::new("post", 0.5, 1.0);
        let a_inst = MapObjectInstance::new("fence", 0, 0);
        let b_inst = MapObjectInstance::new("post", 5, 5);

        let a = placed(&a_inst, &fence, (100.0, 100.0), (80, 70));
        let b = placed(&b_inst, &post, (95.0, 92.0), (75, 60));

        assert_eq!(order(&a, &b), Ordering::Greater);
        assert_eq!(order(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_interior_points_do_not_change_the_divider() {
        // first two points by x would be (-10,0),(0,-50) and flip the result
        let fence = MapObjectType::new("fence", 0.5, 1.0).with_depth_points(vec![
            DepthPoint::new(-10.0, 0.0),
            DepthPoint::new(0.0, -50.0),
            DepthPoint::new(10.0, 0.0),
        ]);
        let post = MapObjectType::new("post", 0.5, 1.0);
        let a_inst = MapObjectInstance::new("fence", 0, 0);
        let b_inst = MapObjectInstance::new("post", 0, 0);

        let a = placed(&a_inst, &fence, (100.0, 100.0), (80, 70));
        let b = placed(&b_inst, &post, (105.0, 90.0), (85, 60));

        assert_eq!(order(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_representative_point_averages_depth_points() {
        // B's own polyline is vertical and centered 12px below its anchor
        let fence = horizontal_fence();
        let pole = MapObjectType::new("pole", 0.5, 1.0)
            .with_depth_points(vec![DepthPoint::new(0.0, 8.0), DepthPoint::new(0.0, 16.0)]);
        let a_inst = MapObjectInstance::new("fence", 3, 3);
        let b_inst = MapObjectInstance::new("pole", 0, 0);

        // B's anchor is above the line but its representative point is below
        let a = placed(&a_inst, &fence, (100.0, 100.0), (80, 70));
        let b = placed(&b_inst, &pole, (100.0, 95.0), (80, 65));

        assert_eq!(b.representative, ScreenPoint::new(100.0, 107.0));
        assert_eq!(order(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_collinear_falls_through_to_other_divider() {
        let fence = horizontal_fence();
        let wall = MapObjectType::new("wall", 0.5, 1.0)
            .with_depth_points(vec![DepthPoint::new(0.0, 0.0), DepthPoint::new(10.0, 10.0)]);
        let a_inst = MapObjectInstance::new("fence", 9, 9);
        let b_inst = MapObjectInstance::new("wall", 0, 0);

        // B's representative point lies on the extension of A's line
        let a = placed(&a_inst, &fence, (100.0, 100.0), (80, 70));
        let b = placed(&b_inst, &wall, (115.0, 95.0), (85, 70));

        assert_eq!(b.representative, ScreenPoint::new(120.0, 100.0));
        assert_eq!(a.divider.unwrap().side(b.representative), 0.0);

        // A's anchor (100,100) relative to B's line (115,95)->(125,105):
        // cross = 10 * 5 - 10 * -15 = 200, so A is in front of B
        assert_eq!(order(&a, &b), Ordering::Greater);
        assert_eq!(order(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_disjoint_boxes_use_grid_depth() {
        let fence = horizontal_fence();
        let post = MapObjectType::new("post", 0.5, 1.0);
        let a_inst = MapObjectInstance::new("fence", 2, 2);
        let b_inst = MapObjectInstance::new("post", 1, 1);
        let c_inst = MapObjectInstance::new("post", 3, 1);

        // far apart on screen, divider would otherwise put B in front
        let a = placed(&a_inst, &fence, (100.0, 100.0), (80, 70));
        let b = placed(&b_inst, &post, (105.0, 310.0), (85, 300));
        let c = placed(&c_inst, &post, (500.0, 500.0), (480, 460));

        assert_eq!(order(&a, &b), Ordering::Greater);
        assert_eq!(order(&b, &a), Ordering::Less);
        assert_eq!(order(&a, &c), Ordering::Equal);
        assert_eq!(order(&c, &a), Ordering::Equal);
        assert_eq!(order(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_disjoint_pairs_always_use_grid_depth() {
        let mut rng = StdRng::seed_from_u64(0x1507_0b1e);

        let mut types = Vec::new();
        for i in 0..8 {
            let mut points = Vec::new();
            for _ in 0..rng.gen_range(0..4) {
                points.push(DepthPoint::new(
                    rng.gen_range(-30.0..30.0),
                    rng.gen_range(-30.0..30.0),
                ));
            }
            types.push(MapObjectType::new(format!("t{i}"), 0.5, 1.0).with_depth_points(points));
        }

        let instances: Vec<MapObjectInstance> = (0..60)
            .map(|i| {
                MapObjectInstance::new(
                    format!("t{}", i % 8),
                    rng.gen_range(0..20),
                    rng.gen_range(0..20),
                )
            })
            .collect();

        let objects: Vec<PlacedObject<'_>> = instances
            .iter()
            .enumerate()
            .map(|(i, instance)| {
                let x: i64 = rng.gen_range(0..600);
                let y: i64 = rng.gen_range(0..600);
                placed(instance, &types[i % 8], ((x + 20) as f64, (y + 40) as f64), (x, y))
            })
            .collect();

        let mut checked = 0;
        for a in &objects {
            for b in &objects {
                if std::ptr::eq(a, b) || a.bbox.intersects(&b.bbox) {
                    continue;
                }
                assert_eq!(order(a, b), a.depth_key().cmp(&b.depth_key()));
                checked += 1;
            }
        }
        assert!(checked > 1000);
    }

    #[test]
    fn test_equal_depth_keeps_input_order() {
        let t2 = MapObjectType::new("2", 0.5, 1.0);
        let t1 = MapObjectType::new("1", 0.5, 1.0);
        let i2 = MapObjectInstance::new("2", 3, 4);
        let i1 = MapObjectInstance::new("1", 5, 2);
        let i0 = MapObjectInstance::new("1", 0, 0);

        let objects = vec![
            placed(&i2, &t2, (0.0, 0.0), (0, 0)),
            placed(&i1, &t1, (300.0, 0.0), (300, 0)),
        ];
        assert_eq!(ids(&sort_back_to_front(objects)), vec!["2", "1"]);

        let objects = vec![
            placed(&i2, &t2, (0.0, 0.0), (0, 0)),
            placed(&i1, &t1, (300.0, 0.0), (300, 0)),
            placed(&i0, &t1, (600.0, 0.0), (600, 0)),
        ];
        let sorted = sort_back_to_front(objects);
        let keys: Vec<i32> = sorted.iter().map(|o| o.depth_key()).collect();
        assert_eq!(keys, vec![0, 7, 7]);
        assert_eq!(ids(&sorted[1..]), vec!["2", "1"]);
    }

    #[test]
    fn test_merge_sort_is_stable() {
        let items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd'), (2, 'e'), (1, 'f')];
        let sorted = merge_sort_by(items, &|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));

        assert_eq!(
            sorted,
            vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c'), (1, 'f'), (2, 'e')]
        );
    }

    #[test]
    fn test_cyclic_relation_does_not_panic() {
        // rock-paper-scissors: every element beats the next
        let beats = |a: &u8, b: &u8| match (a + 3 - b) % 3 {
            0 => Ordering::Equal,
            1 => Ordering::Greater,
            _ => Ordering::Less,
        };

        let input: Vec<u8> = (0..30).map(|i| i % 3).collect();
        let sorted = merge_sort_by(input.clone(), &beats);

        assert_eq!(sorted.len(), input.len());
        assert_eq!(sorted.iter().filter(|&&v| v == 0).count(), 10);
    }
}
