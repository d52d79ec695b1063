//! Read-only rigid body state consumed by contact assembly.

use glam::Vec3;

use super::rows::JacobianBlock;

/// Snapshot of the body quantities a contact reads during one step.
///
/// The integrator owns the real body; contact assembly never writes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Center of mass in world space.
    pub position: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl BodyState {
    /// A body at rest at `position`.
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Builder-style setter for the linear velocity.
    pub fn with_linear_velocity(mut self, linear_velocity: Vec3) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }

    /// Builder-style setter for the angular velocity.
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Lever arm from the center of mass to a world-space point.
    pub fn lever_arm(&self, point: Vec3) -> Vec3 {
        point - self.position
    }

    /// Velocity of the material point at `point`: v + w x r.
    pub fn point_velocity(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(self.lever_arm(point))
    }

    /// Rate of change of a constraint row contributed by this body: J . v.
    pub fn project(&self, block: &JacobianBlock) -> f32 {
        block.linear.dot(self.linear_velocity) + block.angular.dot(self.angular_velocity)
    }
}
