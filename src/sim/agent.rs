//! Agents: the player's avatar and the simulated opponent share one shape.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_position;

/// Who drives an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    /// Position set by the input channel
    Human,
    /// Position set by the opponent controller
    Opponent,
}

/// Mutable position/score record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub role: AgentRole,
    pub pos: Vec2,
    pub score: u32,
}

impl Agent {
    pub fn new(role: AgentRole, start: Vec2) -> Self {
        Self {
            role,
            pos: clamp_position(start),
            score: 0,
        }
    }

    /// Move to a position, clamped to the field
    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = clamp_position(pos);
    }

    pub fn credit(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_position_clamped() {
        let mut agent = Agent::new(AgentRole::Human, Vec2::new(120.0, -4.0));
        assert_eq!(agent.pos, Vec2::new(100.0, 0.0));
        agent.set_position(Vec2::new(33.0, 250.0));
        assert_eq!(agent.pos, Vec2::new(33.0, 100.0));
    }

    #[test]
    fn test_agent_credit() {
        let mut agent = Agent::new(AgentRole::Opponent, Vec2::new(30.0, 80.0));
        agent.credit(12);
        agent.credit(8);
        assert_eq!(agent.score, 20);
        agent.credit(u32::MAX);
        assert_eq!(agent.score, u32::MAX);
    }
}
