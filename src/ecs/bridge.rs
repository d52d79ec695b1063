//! Bridge between ECS rigid bodies and contact joints.
//!
//! Collision detection reports contacts between entities; this module reads
//! the body state each contact needs from the world and assembles its rows.

use tracing::debug;

use crate::ecs::components::physics::RigidBody;
use crate::ecs::components::transform::Transform;
use crate::physics::{
    BodyState, Capabilities, ConstraintRows, Contact, ContactConfig, ContactJoint, StepInfo,
};

/// How an entity participates in a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodySlot {
    /// A body whose velocity the solver may change.
    Body(BodyState),
    /// A static body, treated as the fixed world anchor.
    World,
}

/// Contact reported by collision detection between two entities.
#[derive(Debug, Clone, Copy)]
pub struct EntityContact {
    pub entity_a: hecs::Entity,
    pub entity_b: hecs::Entity,
    /// Normal points from `entity_b` into `entity_a`.
    pub contact: Contact,
}

/// Rows assembled for an entity contact.
///
/// `entity_a` is always a non-static body. When the reported first entity was
/// static the bodies are swapped and the normal flipped.
#[derive(Debug, Clone, Copy)]
pub struct EntityRows {
    pub entity_a: hecs::Entity,
    pub entity_b: Option<hecs::Entity>,
    pub rows: ConstraintRows,
}

/// Read an entity's body state. Returns `None` if it lacks a rigid body or
/// transform.
pub fn body_slot(world: &hecs::World, entity: hecs::Entity) -> Option<BodySlot> {
    let rb = world.get::<&RigidBody>(entity).ok()?;
    if rb.is_static() {
        return Some(BodySlot::World);
    }
    let transform = world.get::<&Transform>(entity).ok()?;

    Some(BodySlot::Body(BodyState {
        position: transform.transform_point(rb.local_center_of_mass),
        linear_velocity: rb.linear_velocity,
        angular_velocity: rb.angular_velocity,
    }))
}

/// Assemble rows for every contact whose entities carry body state.
///
/// Contacts between two static bodies, or with entities missing components,
/// produce no rows.
pub fn assemble_world_contacts(
    world: &hecs::World,
    contacts: &[EntityContact],
    config: &ContactConfig,
    step: &StepInfo,
    capabilities: Capabilities,
) -> Vec<EntityRows> {
    let mut assembled = Vec::with_capacity(contacts.len());

    for contact in contacts {
        let (Some(slot_a), Some(slot_b)) = (
            body_slot(world, contact.entity_a),
            body_slot(world, contact.entity_b),
        ) else {
            debug!(
                entity_a = ?contact.entity_a,
                entity_b = ?contact.entity_b,
                "skipping contact without rigid body state"
            );
            continue;
        };

        let (entity_a, body_a, entity_b, body_b, swapped) = match (slot_a, slot_b) {
            (BodySlot::Body(a), BodySlot::Body(b)) => {
                (contact.entity_a, a, Some(contact.entity_b), Some(b), false)
            }
            (BodySlot::Body(a), BodySlot::World) => (contact.entity_a, a, None, None, false),
            (BodySlot::World, BodySlot::Body(b)) => (contact.entity_b, b, None, None, true),
            (BodySlot::World, BodySlot::World) => {
                debug!(
                    entity_a = ?contact.entity_a,
                    entity_b = ?contact.entity_b,
                    "skipping contact between static bodies"
                );
                continue;
            }
        };

        // Flip the geometry itself so every capability set sees the swap
        let mut reported = contact.contact;
        if swapped {
            reported.geom.normal = -reported.geom.normal;
        }
        let joint = ContactJoint::new(reported, config);
        let rows = joint.assemble_with(step, &body_a, body_b.as_ref(), capabilities);
        assembled.push(EntityRows {
            entity_a,
            entity_b,
            rows,
        });
    }

    assembled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{ContactGeometry, SurfaceParameters};
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    fn ground_contact(depth: f32) -> Contact {
        Contact::new(
            ContactGeometry::new(Vec3::ZERO, Vec3::Y, depth),
            SurfaceParameters::with_friction(0.5),
        )
    }

    #[test]
    fn test_body_slot_reads_center_of_mass() {
        let mut world = hecs::World::new();
        let entity = world.spawn((Transform::from_position(Vec3::new(1.0, 2.0, 3.0)), {
            let mut rb = RigidBody::new_dynamic()
                .with_linear_velocity(Vec3::X)
                .with_angular_velocity(Vec3::Z);
            rb.local_center_of_mass = Vec3::new(0.0, 0.5, 0.0);
            rb
        }));

        let Some(BodySlot::Body(state)) = body_slot(&world, entity) else {
            panic!("expected a dynamic body");
        };
        assert_abs_diff_eq!(state.position, Vec3::new(1.0, 2.5, 3.0), epsilon = 1e-6);
        assert_eq!(state.linear_velocity, Vec3::X);
        assert_eq!(state.angular_velocity, Vec3::Z);
    }

    #[test]
    fn test_body_slot_static_and_missing() {
        let mut world = hecs::World::new();
        let ground = world.spawn((Transform::identity(), RigidBody::new_static()));
        let bare = world.spawn((Transform::identity(),));
        assert_eq!(body_slot(&world, ground), Some(BodySlot::World));
        assert_eq!(body_slot(&world, bare), None);
    }

    #[test]
    fn test_assemble_against_static_ground() {
        let mut world = hecs::World::new();
        let falling = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
            RigidBody::new_dynamic(),
        ));
        let ground = world.spawn((Transform::identity(), RigidBody::new_static()));

        let contacts = [EntityContact {
            entity_a: falling,
            entity_b: ground,
            contact: ground_contact(0.01),
        }];
        let assembled = assemble_world_contacts(
            &world,
            &contacts,
            &ContactConfig::default(),
            &StepInfo::default(),
            Capabilities::FULL,
        );

        assert_eq!(assembled.len(), 1);
        let entry = &assembled[0];
        assert_eq!(entry.entity_a, falling);
        assert_eq!(entry.entity_b, None);
        assert_eq!(entry.rows.m(), 3);
        assert!(!entry.rows.is_two_body());
        assert_abs_diff_eq!(entry.rows.normal().bias, 0.12, epsilon = 1e-5);
    }

    #[test]
    fn test_static_first_entity_is_swapped_and_flipped() {
        let mut world = hecs::World::new();
        let ground = world.spawn((Transform::identity(), RigidBody::new_static()));
        let body = world.spawn((
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
            RigidBody::new_kinematic(),
        ));

        let contacts = [EntityContact {
            entity_a: ground,
            entity_b: body,
            contact: ground_contact(0.0),
        }];
        let assembled = assemble_world_contacts(
            &world,
            &contacts,
            &ContactConfig::default(),
            &StepInfo::default(),
            Capabilities::SIMPLE,
        );

        assert_eq!(assembled[0].entity_a, body);
        assert_eq!(assembled[0].rows.normal().body_a.linear, -Vec3::Y);
    }

    #[test]
    fn test_two_dynamic_bodies_and_skipped_pairs() {
        let mut world = hecs::World::new();
        let a = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
            RigidBody::new_dynamic(),
        ));
        let b = world.spawn((
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
            RigidBody::new_dynamic(),
        ));
        let wall = world.spawn((Transform::identity(), RigidBody::new_static()));
        let floor = world.spawn((Transform::identity(), RigidBody::new_static()));
        let ghost = world.spawn((Transform::identity(),));

        let contacts = [
            EntityContact {
                entity_a: a,
                entity_b: b,
                contact: ground_contact(0.0),
            },
            EntityContact {
                entity_a: wall,
                entity_b: floor,
                contact: ground_contact(0.0),
            },
            EntityContact {
                entity_a: a,
                entity_b: ghost,
                contact: ground_contact(0.0),
            },
        ];
        let assembled = assemble_world_contacts(
            &world,
            &contacts,
            &ContactConfig::default(),
            &StepInfo::default(),
            Capabilities::FULL,
        );

        assert_eq!(assembled.len(), 1);
        assert_eq!(assembled[0].entity_b, Some(b));
        assert!(assembled[0].rows.is_two_body());
    }
}
