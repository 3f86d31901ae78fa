//! Collision detection and response
//!
//! Two passes per frame, boundary first:
//! - the circular wall, tested one step ahead (`pos + vel`) so fast balls
//!   cannot tunnel out;
//! - every unordered ball pair, tested at current positions, resolved as an
//!   equal-mass elastic exchange along the line of centers.
//!
//! Impulses and position corrections are applied immediately, so a ball
//! touched by several pairs in one frame sees the earlier results.

use glam::DVec2;

use super::state::{Ball, Boundary};

/// Centers closer than this are treated as coincident
pub const DEGENERATE_DISTANCE: f64 = 1e-9;

/// Result of a collision check
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit normal at the contact (outward from the arena center for walls,
    /// from the second ball toward the first for pairs)
    pub normal: DVec2,
    /// Penetration depth (for position correction)
    pub penetration: f64,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: DVec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Collisions resolved during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub boundary_hits: usize,
    pub pair_hits: usize,
    /// Pairs with coincident centers (separated without an impulse)
    pub degenerate: usize,
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check whether a ball's next position would leave the boundary
///
/// `penetration` is how far the predicted position overshoots the
/// reachable radius (`boundary.radius - radius`).
pub fn ball_boundary_collision(pos: DVec2, vel: DVec2, radius: f64, boundary: &Boundary) -> CollisionResult {
    let predicted = (pos + vel).distance(boundary.center);
    if predicted <= boundary.radius - radius {
        return CollisionResult::miss();
    }

    let offset = pos - boundary.center;
    let normal = if offset.length() > DEGENERATE_DISTANCE {
        offset / offset.length()
    } else {
        // Ball sits on the center: the only outward direction is its heading
        vel.normalize_or_zero()
    };

    CollisionResult {
        hit: true,
        normal,
        penetration: predicted + radius - boundary.radius,
    }
}

/// Reflect a ball off the wall and pull it back inside
///
/// The correction uses the penetration computed before the reflection.
pub fn resolve_boundary(ball: &mut Ball, boundary: &Boundary) -> bool {
    let result = ball_boundary_collision(ball.pos, ball.vel, ball.radius, boundary);
    if !result.hit {
        return false;
    }

    ball.vel = reflect_velocity(ball.vel, result.normal);
    ball.pos -= result.penetration * result.normal;
    true
}

/// Check overlap between two balls
pub fn ball_ball_collision(a: &Ball, b: &Ball) -> CollisionResult {
    let offset = a.pos - b.pos;
    let dist = offset.length();
    let reach = a.radius + b.radius;
    if dist >= reach {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: if dist > DEGENERATE_DISTANCE {
            offset / dist
        } else {
            DVec2::ZERO
        },
        penetration: reach - dist,
    }
}

/// Outcome of resolving one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    Miss,
    Hit,
    /// Coincident centers; pushed apart along +x with no velocity change
    Degenerate,
}

/// Resolve an overlapping pair in place
///
/// Equal masses: the normal component of the relative velocity moves from
/// `a` to `b`, tangential components are untouched. The overlap is then
/// split between the balls in proportion to their radii.
pub fn resolve_pair(a: &mut Ball, b: &mut Ball) -> PairOutcome {
    let result = ball_ball_collision(a, b);
    if !result.hit {
        return PairOutcome::Miss;
    }

    let total = a.radius + b.radius;
    if result.normal == DVec2::ZERO {
        a.pos.x += result.penetration * (a.radius / total);
        b.pos.x -= result.penetration * (b.radius / total);
        return PairOutcome::Degenerate;
    }

    let normal = result.normal;
    let impulse = (a.vel - b.vel).dot(normal);
    a.vel -= impulse * normal;
    b.vel += impulse * normal;

    a.pos += normal * result.penetration * (a.radius / total);
    b.pos -= normal * result.penetration * (b.radius / total);
    PairOutcome::Hit
}

/// Boundary pass over every ball; returns the number of wall hits
pub fn resolve_boundary_all(balls: &mut [Ball], boundary: &Boundary) -> usize {
    balls
        .iter_mut()
        .map(|ball| resolve_boundary(ball, boundary))
        .filter(|&hit| hit)
        .count()
}

/// Single pass over all unordered pairs `(i, j)`, `i < j`
pub fn resolve_pairs(balls: &mut [Ball], stats: &mut CollisionStats) {
    for j in 1..balls.len() {
        let (head, tail) = balls.split_at_mut(j);
        let b = &mut tail[0];
        for a in head.iter_mut() {
            match resolve_pair(a, b) {
                PairOutcome::Miss => {}
                PairOutcome::Hit => stats.pair_hits += 1,
                PairOutcome::Degenerate => stats.degenerate += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Category;
    use proptest::prelude::*;

    const CENTER: DVec2 = DVec2::new(275.0, 375.0);

    fn arena() -> Boundary {
        Boundary::new(CENTER, 200.0)
    }

    fn ball(pos: DVec2, vel: DVec2) -> Ball {
        Ball {
            id: 0,
            pos,
            vel,
            radius: 6.0,
            category: Category::Male,
        }
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let reflected = reflect_velocity(DVec2::new(100.0, 0.0), DVec2::new(-1.0, 0.0));
        assert!((reflected.x + 100.0).abs() < 1e-9);
        assert!(reflected.y.abs() < 1e-9);
    }

    #[test]
    fn test_boundary_miss_inside() {
        let result = ball_boundary_collision(CENTER + DVec2::new(100.0, 0.0), DVec2::new(3.0, 3.0), 6.0, &arena());
        assert!(!result.hit);
    }

    #[test]
    fn test_boundary_reflects_and_corrects() {
        let mut b = ball(CENTER + DVec2::new(192.0, 0.0), DVec2::new(3.0, 0.0));
        assert!(resolve_boundary(&mut b, &arena()));

        // Predicted 195 > 194: reflected and pushed back by 195 + 6 - 200 = 1
        assert_eq!(b.vel, DVec2::new(-3.0, 0.0));
        assert!((b.pos - (CENTER + DVec2::new(191.0, 0.0))).length() < 1e-9);
        assert!((b.pos + b.vel).distance(CENTER) <= 200.0);
    }

    #[test]
    fn test_boundary_keeps_tangential_component() {
        let mut b = ball(CENTER + DVec2::new(0.0, -193.0), DVec2::new(3.0, -3.0));
        assert!(resolve_boundary(&mut b, &arena()));
        assert!((b.vel.x - 3.0).abs() < 1e-9);
        assert!((b.vel.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_ball_on_center_uses_heading() {
        // Tiny arena so a ball at the center can overshoot in one step
        let boundary = Boundary::new(CENTER, 8.0);
        let mut b = ball(CENTER, DVec2::new(3.0, 0.0));
        assert!(resolve_boundary(&mut b, &boundary));
        assert_eq!(b.vel, DVec2::new(-3.0, 0.0));
        assert!(b.pos.is_finite());
    }

    #[test]
    fn test_pair_head_on_exchange() {
        let mut a = ball(DVec2::new(100.0, 100.0), DVec2::new(-3.0, 0.0));
        let mut b = ball(DVec2::new(90.0, 100.0), DVec2::new(3.0, 0.0));
        assert_eq!(resolve_pair(&mut a, &mut b), PairOutcome::Hit);

        assert!((a.vel - DVec2::new(3.0, 0.0)).length() < 1e-9);
        assert!((b.vel - DVec2::new(-3.0, 0.0)).length() < 1e-9);
        // Overlap 2 split evenly
        assert!((a.pos.x - 101.0).abs() < 1e-9);
        assert!((b.pos.x - 89.0).abs() < 1e-9);
        assert!((a.pos.distance(b.pos) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_pair_overlap_split_by_radius() {
        let mut a = ball(DVec2::new(10.0, 0.0), DVec2::ZERO);
        a.radius = 9.0;
        let mut b = ball(DVec2::new(0.0, 0.0), DVec2::ZERO);
        b.radius = 3.0;
        resolve_pair(&mut a, &mut b);
        // Overlap 2: a moves 2 * 9/12, b moves 2 * 3/12
        assert!((a.pos.x - 11.5).abs() < 1e-9);
        assert!((b.pos.x + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pair_touching_is_miss() {
        let mut a = ball(DVec2::new(12.0, 0.0), DVec2::new(-3.0, 0.0));
        let mut b = ball(DVec2::ZERO, DVec2::new(3.0, 0.0));
        assert_eq!(resolve_pair(&mut a, &mut b), PairOutcome::Miss);
        assert_eq!(a.vel, DVec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_coincident_pair_is_separated() {
        let mut a = ball(DVec2::new(50.0, 50.0), DVec2::new(3.0, 3.0));
        let mut b = ball(DVec2::new(50.0, 50.0), DVec2::new(-3.0, 3.0));
        assert_eq!(resolve_pair(&mut a, &mut b), PairOutcome::Degenerate);

        assert!(a.pos.is_finite() && b.pos.is_finite());
        assert_eq!(a.vel, DVec2::new(3.0, 3.0));
        assert_eq!(b.vel, DVec2::new(-3.0, 3.0));
        assert!((a.pos.distance(b.pos) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_pairs_counts() {
        let mut balls = vec![
            ball(DVec2::new(0.0, 0.0), DVec2::new(3.0, 0.0)),
            ball(DVec2::new(10.0, 0.0), DVec2::new(-3.0, 0.0)),
            ball(DVec2::new(100.0, 100.0), DVec2::new(3.0, 3.0)),
            ball(DVec2::new(100.0, 100.0), DVec2::new(3.0, 3.0)),
        ];
        let mut stats = CollisionStats::default();
        resolve_pairs(&mut balls, &mut stats);
        assert_eq!(stats.pair_hits, 1);
        assert_eq!(stats.degenerate, 1);
    }

    proptest! {
        #[test]
        fn prop_pair_conserves_momentum(
            ax in -20.0f64..20.0, ay in -20.0f64..20.0,
            bx in -20.0f64..20.0, by in -20.0f64..20.0,
            dx in -11.0f64..11.0, dy in -11.0f64..11.0,
        ) {
            prop_assume!((dx * dx + dy * dy).sqrt() > 1e-3);
            let mut a = ball(DVec2::new(100.0 + dx, 100.0 + dy), DVec2::new(ax, ay));
            let mut b = ball(DVec2::new(100.0, 100.0), DVec2::new(bx, by));
            let before = a.vel + b.vel;
            let energy_before = a.vel.length_squared() + b.vel.length_squared();

            resolve_pair(&mut a, &mut b);

            let after = a.vel + b.vel;
            prop_assert!((before - after).length() < 1e-9);
            let energy_after = a.vel.length_squared() + b.vel.length_squared();
            prop_assert!((energy_before - energy_after).abs() < 1e-6);
        }

        #[test]
        fn prop_boundary_no_escape(
            angle in 0.0f64..std::f64::consts::TAU,
            depth in 0.0f64..1.0,
            sx in prop::bool::ANY,
            sy in prop::bool::ANY,
        ) {
            let boundary = arena();
            let pos = CENTER + crate::polar_to_cartesian(194.0 - depth, angle);
            let vel = DVec2::new(if sx { 3.0 } else { -3.0 }, if sy { 3.0 } else { -3.0 });
            let normal = (pos - CENTER).normalize();
            prop_assume!(vel.dot(normal) >= 0.0);
            prop_assume!((pos + vel).distance(CENTER) > 194.0);

            let mut b = ball(pos, vel);
            prop_assert!(resolve_boundary(&mut b, &boundary));
            prop_assert!((b.pos + b.vel).distance(CENTER) <= 200.0 + 1e-9);
        }
    }
}
