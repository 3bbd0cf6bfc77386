//! Hit testing: pointer → overlay target.
//!
//! All proximity tests compare squared distance against a squared radius,
//! strictly less-than.

use sk_core::{Handle, HandleRole, Point, PoseSubject, SquareRect};

#[inline]
fn within(p: Point, target: Point, radius: f32) -> bool {
    p.distance_sq(target) < radius * radius
}

/// First handle within `radius`, in handle order.
pub fn hit_handle(handles: &[Handle], p: Point, radius: f32) -> Option<HandleRole> {
    handles
        .iter()
        .find(|h| within(p, h.pos, radius))
        .map(|h| h.role)
}

/// Inclusive test against the square body.
pub fn hit_square(rect: &SquareRect, p: Point) -> bool {
    rect.contains(p)
}

/// A draggable pose point under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointHit {
    pub subject: usize,
    pub point: usize,
    pub pos: Point,
}

/// First pose point within `radius`, subject-then-point order.
/// Indices below `first_draggable` are never hit.
pub fn hit_pose_point(
    poses: &[PoseSubject],
    p: Point,
    radius: f32,
    first_draggable: usize,
) -> Option<PointHit> {
    poses.iter().enumerate().find_map(|(subject, pose)| {
        pose.points
            .iter()
            .enumerate()
            .skip(first_draggable)
            .find(|(_, pt)| within(p, pt.pos, radius))
            .map(|(point, pt)| PointHit {
                subject,
                point,
                pos: pt.pos,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_core::PosePoint;

    fn pose(points: &[(f32, f32)]) -> PoseSubject {
        PoseSubject {
            points: points
                .iter()
                .map(|&(x, y)| PosePoint {
                    pos: Point::new(x, y),
                    visibility: None,
                })
                .collect(),
        }
    }

    #[test]
    fn handle_ties_go_to_first_role() {
        // Tiny square: every handle sits within radius of the center.
        let rect = SquareRect::new(100.0, 100.0, 4.0);
        let hit = hit_handle(&rect.handles(), Point::new(102.0, 102.0), 15.0);
        assert_eq!(hit, Some(HandleRole::Tl));
    }

    #[test]
    fn handle_radius_is_strict() {
        let rect = SquareRect::new(0.0, 0.0, 100.0);
        assert_eq!(hit_handle(&rect.handles(), Point::new(15.0, 0.0), 15.0), None);
        assert_eq!(
            hit_handle(&rect.handles(), Point::new(14.9, 0.0), 15.0),
            Some(HandleRole::Tl)
        );
        assert_eq!(
            hit_handle(&rect.handles(), Point::new(100.0, 55.0), 15.0),
            Some(HandleRole::Mr)
        );
    }

    #[test]
    fn square_edges_are_inside() {
        let rect = SquareRect::new(10.0, 10.0, 20.0);
        assert!(hit_square(&rect, Point::new(10.0, 30.0)));
        assert!(!hit_square(&rect, Point::new(30.1, 20.0)));
    }

    #[test]
    fn face_indices_are_skipped() {
        let mut pts = vec![(50.0, 50.0); 11];
        pts.push((200.0, 200.0));
        let poses = vec![pose(&pts)];
        assert_eq!(hit_pose_point(&poses, Point::new(50.0, 50.0), 7.5, 11), None);
        let hit = hit_pose_point(&poses, Point::new(203.0, 203.0), 7.5, 11).unwrap();
        assert_eq!((hit.subject, hit.point), (0, 11));
    }

    #[test]
    fn first_subject_wins() {
        let mut a = vec![(0.0, 0.0); 11];
        a.push((60.0, 60.0));
        let poses = vec![pose(&a), pose(&a)];
        let hit = hit_pose_point(&poses, Point::new(61.0, 61.0), 7.5, 11).unwrap();
        assert_eq!(hit.subject, 0);
    }
}
