//! Shared setup helpers for rein-contact benchmarks.
//!
//! ## Running
//!
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench contact
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench contact -- assemble

use glam::Vec3;
use rein_contact::ecs::components::{RigidBody, Transform};
use rein_contact::ecs::bridge::EntityContact;
use rein_contact::physics::{
    BodyState, Contact, ContactConfig, ContactGeometry, ContactJoint, SurfaceMode,
    SurfaceParameters,
};

/// Deterministic pseudo-random unit normals, roughly uniform on the sphere.
pub fn sample_normals(n: usize) -> Vec<Vec3> {
    let golden = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f32 + 0.5) / n as f32;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f32;
            Vec3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

/// Resting contact with isotropic friction.
pub fn resting_contact(normal: Vec3) -> Contact {
    Contact::new(
        ContactGeometry::new(Vec3::new(0.1, 0.0, -0.2), normal, 0.01),
        SurfaceParameters::with_friction(0.5),
    )
}

/// Contact exercising every optional surface behavior.
pub fn featureful_contact(normal: Vec3) -> Contact {
    let mut surface = SurfaceParameters::with_friction(0.5)
        .with_mu2(0.3)
        .with_bounce(0.4, 0.1)
        .with_mode(SurfaceMode::APPROX_1 | SurfaceMode::SOFT_CFM | SurfaceMode::MOTION_1);
    surface.soft_cfm = 1e-4;
    surface.motion1 = 0.5;
    Contact::new(
        ContactGeometry::new(Vec3::new(0.1, 0.0, -0.2), normal, 0.01),
        surface,
    )
    .with_friction_direction(Vec3::X)
}

/// `n` joints with varied normals.
pub fn setup_joints(n: usize, featureful: bool) -> Vec<ContactJoint> {
    let config = ContactConfig::default();
    sample_normals(n)
        .into_iter()
        .map(|normal| {
            let contact = if featureful {
                featureful_contact(normal)
            } else {
                resting_contact(normal)
            };
            ContactJoint::new(contact, &config)
        })
        .collect()
}

/// A moving body pair used by assembly benchmarks.
pub fn body_pair() -> (BodyState, BodyState) {
    (
        BodyState::at_rest(Vec3::new(0.0, 0.5, 0.0))
            .with_linear_velocity(Vec3::new(0.2, -3.0, 0.0))
            .with_angular_velocity(Vec3::new(0.0, 1.0, 0.5)),
        BodyState::at_rest(Vec3::new(0.0, -0.5, 0.0)),
    )
}

/// Spawn `n` dynamic bodies resting on one static ground entity and the
/// contacts between them.
pub fn setup_ground_world(n: usize) -> (hecs::World, Vec<EntityContact>) {
    let mut world = hecs::World::new();
    let ground = world.spawn((Transform::identity(), RigidBody::new_static()));
    let cols = (n as f32).sqrt().ceil() as usize;

    let contacts = (0..n)
        .map(|i| {
            let x = (i % cols) as f32 * 1.5;
            let z = (i / cols) as f32 * 1.5;
            let body = world.spawn((
                Transform::from_position(Vec3::new(x, 0.49, z)),
                RigidBody::new_dynamic().with_linear_velocity(Vec3::new(0.0, -0.1, 0.0)),
            ));
            EntityContact {
                entity_a: body,
                entity_b: ground,
                contact: Contact::new(
                    ContactGeometry::new(Vec3::new(x, 0.0, z), Vec3::Y, 0.01),
                    SurfaceParameters::with_friction(0.6),
                ),
            }
        })
        .collect();

    (world, contacts)
}
