//! Opponent controller
//!
//! Greedy pursuit: head for the nearest uncollected pickup, grab it once it is
//! inside the pickup radius. Runs on its own cadence (5 Hz by default), faster
//! than the 1 Hz countdown.

use glam::Vec2;

use super::agent::Agent;
use super::field::Collectible;
use crate::{clamp_position, distance};

/// What the opponent wants to do this control step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpponentDecision {
    /// Nothing left to chase
    Idle,
    /// Nearest pickup is within reach; the session should attempt collection
    Collect { target: u32 },
    /// Step toward the nearest pickup
    Move { to: Vec2 },
}

/// Nearest uncollected pickup to `pos` (first found wins ties)
pub fn nearest_uncollected(field: &[Collectible], pos: Vec2) -> Option<&Collectible> {
    field.iter().filter(|c| !c.collected).min_by(|a, b| {
        distance(a.pos, pos)
            .partial_cmp(&distance(b.pos, pos))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Decide the opponent's next step.
///
/// Moves `speed` units along the unit vector to the target, never past it,
/// clamped to the field.
pub fn decide(opponent: &Agent, field: &[Collectible], speed: f32, pickup_radius: f32) -> OpponentDecision {
    let Some(target) = nearest_uncollected(field, opponent.pos) else {
        return OpponentDecision::Idle;
    };

    let delta = target.pos - opponent.pos;
    let dist = delta.length();
    if dist < pickup_radius {
        return OpponentDecision::Collect { target: target.id };
    }

    let step = speed.min(dist);
    let to = clamp_position(opponent.pos + delta / dist * step);
    OpponentDecision::Move { to }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PICKUP_RADIUS;
    use crate::sim::agent::AgentRole;
    use crate::sim::field::{CollectibleKind, try_collect};
    use proptest::prelude::*;

    fn item(id: u32, x: f32, y: f32) -> Collectible {
        Collectible {
            id,
            pos: Vec2::new(x, y),
            value: 10,
            kind: CollectibleKind::Safety,
            collected: false,
        }
    }

    #[test]
    fn test_idle_when_field_empty() {
        let opp = Agent::new(AgentRole::Opponent, Vec2::new(30.0, 80.0));
        assert_eq!(decide(&opp, &[], 2.0, PICKUP_RADIUS), OpponentDecision::Idle);

        let mut done = item(0, 40.0, 40.0);
        done.collected = true;
        assert_eq!(decide(&opp, &[done], 2.0, PICKUP_RADIUS), OpponentDecision::Idle);
    }

    #[test]
    fn test_moves_toward_nearest() {
        let opp = Agent::new(AgentRole::Opponent, Vec2::new(30.0, 80.0));
        let field = [item(0, 90.0, 10.0), item(1, 30.0, 60.0)];
        match decide(&opp, &field, 2.0, PICKUP_RADIUS) {
            OpponentDecision::Move { to } => {
                assert!((to.x - 30.0).abs() < 1e-5);
                assert!((to.y - 78.0).abs() < 1e-5);
            }
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn test_tie_breaks_on_first_found() {
        let opp = Agent::new(AgentRole::Opponent, Vec2::new(50.0, 50.0));
        let field = [item(3, 60.0, 50.0), item(4, 40.0, 50.0)];
        assert_eq!(nearest_uncollected(&field, opp.pos).map(|c| c.id), Some(3));
    }

    #[test]
    fn test_collects_within_radius() {
        let opp = Agent::new(AgentRole::Opponent, Vec2::new(50.0, 50.0));
        let field = [item(7, 53.0, 50.0)];
        assert_eq!(
            decide(&opp, &field, 2.0, PICKUP_RADIUS),
            OpponentDecision::Collect { target: 7 }
        );
    }

    proptest! {
        #[test]
        fn prop_opponent_converges(
            ox in 0.0f32..100.0, oy in 0.0f32..100.0,
            tx in 10.0f32..90.0, ty in 10.0f32..70.0,
            speed in 0.5f32..10.0,
        ) {
            let mut opp = Agent::new(AgentRole::Opponent, Vec2::new(ox, oy));
            let mut field = vec![item(0, tx, ty)];
            let mut last = distance(opp.pos, field[0].pos);
            for _ in 0..1000 {
                match decide(&opp, &field, speed, PICKUP_RADIUS) {
                    OpponentDecision::Move { to } => opp.set_position(to),
                    OpponentDecision::Collect { .. } => {
                        prop_assert!(try_collect(&mut field, opp.pos, PICKUP_RADIUS).is_some());
                        break;
                    }
                    OpponentDecision::Idle => break,
                }
                let now = distance(opp.pos, field[0].pos);
                prop_assert!(now <= last + 1e-4);
                last = now;
            }
            prop_assert!(field[0].collected);
        }
    }
}
