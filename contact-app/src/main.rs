use glam::Vec3;
use rein_contact::ecs::bridge::{assemble_world_contacts, EntityContact};
use rein_contact::ecs::components::{RigidBody, Transform};
use rein_contact::physics::{
    BodyState, Capabilities, ConstraintRows, Contact, ContactConfig, ContactGeometry,
    ContactJoint, StepInfo, StridedRows, SurfaceMode, SurfaceParameters, INFINITE_FRICTION,
};

fn log_rows(label: &str, rows: &ConstraintRows) {
    log::info!(
        "{label}: m={} nub={} two_body={}",
        rows.m(),
        rows.nub(),
        rows.is_two_body()
    );
    for (i, row) in rows.rows().iter().enumerate() {
        log::info!(
            "  row {i}: J1l={:?} J1a={:?} c={:.4} cfm={:e} lo={} hi={} findex={:?}",
            row.body_a.linear,
            row.body_a.angular,
            row.bias,
            row.cfm,
            row.lo,
            row.hi,
            row.depends_on.map(|index| index.get()),
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ContactConfig::default();
    config.validate()?;
    let step = StepInfo::from_timestep(1.0 / 100.0)?;

    // Frictionless resting contact
    let resting = Contact::new(
        ContactGeometry::new(Vec3::ZERO, Vec3::Y, 0.01),
        SurfaceParameters::with_friction(0.0),
    );
    let joint = ContactJoint::new(resting, &config);
    log_rows(
        "frictionless",
        &joint.assemble(&step, &BodyState::at_rest(Vec3::new(0.0, 0.5, 0.0)), None),
    );

    // Bouncing ball
    let bouncing = Contact::new(
        ContactGeometry::new(Vec3::ZERO, Vec3::Y, 0.0),
        SurfaceParameters::with_friction(0.0).with_bounce(0.5, 0.1),
    );
    let ball = BodyState::at_rest(Vec3::new(0.0, 0.5, 0.0))
        .with_linear_velocity(Vec3::new(0.0, -2.0, 0.0));
    let approach = ball.point_velocity(bouncing.geom.position).dot(bouncing.geom.normal);
    log::info!("bounce: approach speed {:.2} m/s", -approach);
    let joint = ContactJoint::new(bouncing, &config);
    log_rows("bounce", &joint.assemble(&step, &ball, None));

    // Anisotropic friction between two boxes, sticking along the secondary axis
    let anisotropic = Contact::new(
        ContactGeometry::new(Vec3::ZERO, Vec3::Y, 0.005),
        SurfaceParameters::with_friction(0.4)
            .with_mu2(INFINITE_FRICTION)
            .with_mode(SurfaceMode::APPROX_1),
    )
    .with_friction_direction(Vec3::X);
    let upper = BodyState::at_rest(Vec3::new(0.0, 0.5, 0.0))
        .with_linear_velocity(Vec3::new(1.0, 0.0, 0.0));
    let lower = BodyState::at_rest(Vec3::new(0.0, -0.5, 0.0));
    let joint = ContactJoint::new(anisotropic, &config);
    let rows = joint.assemble(&step, &upper, Some(&lower));
    log_rows("anisotropic", &rows);

    let rowskip = 4;
    let len = rows.m() * rowskip;
    let (mut j1l, mut j1a, mut j2l, mut j2a) =
        (vec![0.0; len], vec![0.0; len], vec![0.0; len], vec![0.0; len]);
    let (mut c, mut cfm, mut lo, mut hi) = (
        vec![0.0; rows.m()],
        vec![0.0; rows.m()],
        vec![0.0; rows.m()],
        vec![0.0; rows.m()],
    );
    let mut findex = vec![0; rows.m()];
    rows.write_strided(&mut StridedRows {
        rowskip,
        j1l: &mut j1l,
        j1a: &mut j1a,
        body_b: Some((&mut j2l, &mut j2a)),
        c: &mut c,
        cfm: &mut cfm,
        lo: &mut lo,
        hi: &mut hi,
        findex: &mut findex,
    })?;
    log::info!("strided export: c={c:?} findex={findex:?}");

    // Same contacts driven from an ECS world
    let mut world = hecs::World::new();
    let ground = world.spawn((Transform::identity(), RigidBody::new_static()));
    let crate_box = world.spawn((
        Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
        RigidBody::new_dynamic()
            .with_linear_velocity(Vec3::new(0.3, -1.0, 0.0))
            .with_angular_velocity(Vec3::new(0.0, 0.0, 0.5)),
    ));
    let contacts = [EntityContact {
        entity_a: ground,
        entity_b: crate_box,
        contact: Contact::new(
            ContactGeometry::new(Vec3::ZERO, -Vec3::Y, 0.02),
            SurfaceParameters::with_friction(0.6),
        ),
    }];
    for entry in assemble_world_contacts(&world, &contacts, &config, &step, Capabilities::SIMPLE)
    {
        log_rows(&format!("world {:?}", entry.entity_a), &entry.rows);
    }

    Ok(())
}
