//! Collision detection and response
//!
//! The paddle art is curved and rotates with the paddle, so bounding boxes
//! alone are far too generous: a hit needs a rect overlap first and then a
//! shared solid pixel between the paddle and ball masks.

use glam::Vec2;

use super::mask::{Mask, Rect};
use super::state::{Ball, Paddle, PowerUp};
use crate::reflect_velocity;

/// True once the ball's center is strictly farther than `radius` from `center`
pub fn check_boundary(ball_pos: Vec2, center: Vec2, radius: f32) -> bool {
    (ball_pos - center).length_squared() > radius * radius
}

/// Pixel-exact overlap of two sprites given their rects and masks
pub fn sprites_overlap(a_rect: &Rect, a_mask: &Mask, b_rect: &Rect, b_mask: &Mask) -> bool {
    a_rect.overlaps(b_rect) && a_mask.overlaps(b_mask, (b_rect.x - a_rect.x, b_rect.y - a_rect.y))
}

/// Surface normal for a paddle bounce: from the paddle back toward the center.
/// `None` if the paddle sits on the center (no direction to reflect about).
pub fn paddle_normal(paddle: &Paddle) -> Option<Vec2> {
    let n = -paddle.radial_offset.normalize_or_zero();
    if n == Vec2::ZERO { None } else { Some(n) }
}

/// Contact test without side effects; returns the bounce normal on contact
pub fn paddle_ball_contact(paddle: &Paddle, ball: &Ball, cooling_down: bool) -> Option<Vec2> {
    if cooling_down {
        return None;
    }
    if !sprites_overlap(&paddle.rect(), paddle.mask(), &ball.rect(), ball.mask()) {
        return None;
    }
    paddle_normal(paddle)
}

/// Check the ball against the paddle and bounce it on contact.
///
/// Returns false while `cooling_down`, whatever the overlap.
pub fn check_paddle_ball_collision(paddle: &Paddle, ball: &mut Ball, cooling_down: bool) -> bool {
    match paddle_ball_contact(paddle, ball, cooling_down) {
        Some(normal) => {
            ball.velocity = reflect_velocity(ball.velocity, normal);
            true
        }
        None => false,
    }
}

/// Power-up pickup uses plain bounding boxes
pub fn check_powerup_pickup(ball: &Ball, powerup: &PowerUp) -> bool {
    powerup.alive && ball.rect().overlaps(&powerup.rect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::ManualClock;
    use crate::sim::context::{SessionContext, Tick, Update};
    use crate::sim::state::PowerUpKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx() -> SessionContext {
        SessionContext::new(Box::new(ManualClock::new(0)), Config::default())
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let center = Vec2::new(360.0, 640.0);
        assert!(!check_boundary(Vec2::new(360.0, 960.0), center, 320.0));
        assert!(check_boundary(Vec2::new(360.0, 960.5), center, 320.0));
        assert!(!check_boundary(center, center, 320.0));
    }

    #[test]
    fn test_ball_on_paddle_bounces_back_inward() {
        let ctx = ctx();
        let paddle = Paddle::new(&ctx);
        let mut ball = Ball::new(&ctx);
        // Ball resting on the inner edge of the paddle, moving outward
        ball.position = Vec2::new(360.0, 960.0 - 30.0);
        ball.velocity = Vec2::new(30.0, 240.0);

        assert!(check_paddle_ball_collision(&paddle, &mut ball, false));
        assert!((ball.velocity - Vec2::new(30.0, -240.0)).length() < 1e-3);
    }

    #[test]
    fn test_cooldown_blocks_collision() {
        let ctx = ctx();
        let paddle = Paddle::new(&ctx);
        let mut ball = Ball::new(&ctx);
        ball.position = paddle.center;
        let before = ball.velocity;
        assert!(!check_paddle_ball_collision(&paddle, &mut ball, true));
        assert_eq!(ball.velocity, before);
    }

    #[test]
    fn test_rect_overlap_without_pixels_is_a_miss() {
        let ctx = ctx();
        let paddle = Paddle::new(&ctx);
        let mut ball = Ball::new(&ctx);
        // Inside the paddle's box but above the curved band
        ball.position = Vec2::new(360.0, 960.0 - 58.0);
        assert!(paddle.rect().overlaps(&ball.rect()));
        assert!(!check_paddle_ball_collision(&paddle, &mut ball, false));
    }

    #[test]
    fn test_rotated_paddle_collides_where_it_is_drawn() {
        let ctx = ctx();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut paddle = Paddle::new(&ctx);
        paddle.is_moving = true;
        for _ in 0..45 {
            paddle.update(&mut Tick::new(0.016, &ctx, &mut rng));
        }
        // Paddle now on the right; the old bottom spot is empty
        let mut ball = Ball::new(&ctx);
        ball.position = Vec2::new(360.0, 930.0);
        assert!(!check_paddle_ball_collision(&paddle, &mut ball, false));

        ball.position = Vec2::new(680.0 - 30.0, 640.0);
        ball.velocity = Vec2::new(240.0, 0.0);
        assert!(check_paddle_ball_collision(&paddle, &mut ball, false));
        assert!(ball.velocity.x < 0.0);
    }

    #[test]
    fn test_powerup_pickup_by_rect() {
        let ctx = ctx();
        let ball = Ball::new(&ctx);
        let mut pu = PowerUp::new(PowerUpKind::SlowDown, ball.position + Vec2::new(50.0, 0.0), 55, 0);
        assert!(check_powerup_pickup(&ball, &pu));
        pu.position = ball.position + Vec2::new(58.0, 0.0);
        assert!(!check_powerup_pickup(&ball, &pu));
        pu.position = ball.position;
        pu.alive = false;
        assert!(!check_powerup_pickup(&ball, &pu));
    }

    proptest! {
        #[test]
        fn reflection_preserves_speed(
            vx in -500.0f32..500.0,
            vy in -500.0f32..500.0,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let v = Vec2::new(vx, vy);
            let n = Vec2::from_angle(angle);
            let r = reflect_velocity(v, n);
            prop_assert!((r.length() - v.length()).abs() < 1e-2);
            prop_assert!((r - (v - 2.0 * v.dot(n) * n)).length() < 1e-3);
        }

        #[test]
        fn boundary_matches_distance(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            radius in 1.0f32..600.0,
        ) {
            let p = Vec2::new(x, y);
            let d2 = p.length_squared();
            prop_assert_eq!(check_boundary(p, Vec2::ZERO, radius), d2 > radius * radius);
        }
    }
}
