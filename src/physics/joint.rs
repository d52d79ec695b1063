//! Contact joint: turns one contact into LCP rows for a single step.
//!
//! # Row layout
//!
//! | Row | Direction | Bounds | Present when |
//! |-----|-----------|--------|--------------|
//! | 0 | normal | `[0, inf)` | always |
//! | 1 | first active tangent | `[-mu, mu]` | `mu > 0` (or `mu2 > 0` with `MU2`) |
//! | 2 | second tangent | `[-mu2, mu2]` or `[-mu, mu]` | both axes active |
//!
//! The row count is decided once per contact by [`ContactJoint::compute_row_count`]
//! and reused by every call to [`ContactJoint::assemble`].

use bitflags::bitflags;
use glam::Vec3;
use tracing::trace;

use super::basis::{friction_basis, FrictionAxis};
use super::contact::{Contact, SurfaceMode, SurfaceParameters, INFINITE_FRICTION};
use super::rigid_body::BodyState;
use super::rows::{
    ConstraintRow, ConstraintRows, JacobianBlock, RowCount, RowIndex, MAX_CONTACT_ROWS,
};
use super::{ContactConfig, StepInfo};

bitflags! {
    /// Optional stages of row assembly.
    ///
    /// [`Capabilities::FULL`] runs everything. [`Capabilities::SIMPLE`] is the
    /// fast path for callers that know none of the optional stages apply: the
    /// normal is taken as reported, both friction rows are bounded by `mu`, and
    /// the bias is exactly `step_frequency * world_erp * max(depth, 0)`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// Honor soft ERP/CFM, target motion and slip surface flags.
        const SURFACE_OVERRIDES  = 1 << 0;
        /// Honor a caller-supplied primary friction direction.
        const FRICTION_DIRECTION = 1 << 1;
        /// Subtract the world minimum depth before error correction.
        const MIN_DEPTH          = 1 << 2;
        /// Clamp the penetration bias to the maximum correcting velocity.
        const VELOCITY_CAP       = 1 << 3;
        /// Apply restitution when the surface requests it.
        const BOUNCE             = 1 << 4;
        /// Give the secondary axis its own `mu2` bounds and drop inactive axes.
        const TWO_AXIS_FRICTION  = 1 << 5;
        /// Flip the normal of reversed joints.
        const REVERSE            = 1 << 6;
        /// Use ERP/CFM set on the joint instead of the world defaults.
        const JOINT_PARAMS       = 1 << 7;
    }
}

impl Capabilities {
    pub const FULL: Self = Self::all();
    pub const SIMPLE: Self = Self::empty();

    /// Surface flags that stay in effect under these capabilities.
    fn surface_mask(self) -> SurfaceMode {
        let mut mask = SurfaceMode::APPROX_1;
        if self.contains(Self::TWO_AXIS_FRICTION) {
            mask |= SurfaceMode::MU2;
        }
        if self.contains(Self::SURFACE_OVERRIDES) {
            mask |= SurfaceMode::SOFT_ERP
                | SurfaceMode::SOFT_CFM
                | SurfaceMode::MOTION_N
                | SurfaceMode::MOTION_1
                | SurfaceMode::MOTION_2
                | SurfaceMode::SLIP_1
                | SurfaceMode::SLIP_2;
        }
        if self.contains(Self::FRICTION_DIRECTION) {
            mask |= SurfaceMode::FDIR1;
        }
        if self.contains(Self::BOUNCE) {
            mask |= SurfaceMode::BOUNCE;
        }
        mask
    }
}

/// Tunable joint parameters exposed to scripting callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactParam {
    Erp,
    Cfm,
}

/// Row count plus the friction axes backing rows 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowLayout {
    count: RowCount,
    axes: [Option<FrictionAxis>; 2],
}

/// Decide the rows a surface contributes, clamping negative coefficients.
///
/// Negative `mu` (and `mu2` in two-axis mode) is treated as zero without
/// complaint.
pub fn count_rows(surface: &mut SurfaceParameters) -> RowCount {
    row_layout(surface).count
}

fn row_layout(surface: &mut SurfaceParameters) -> RowLayout {
    let mut m = 1;
    let mut nub = 0;
    let mut axes = [None; 2];
    let mut push_axis = |axis: FrictionAxis, m: &mut usize| {
        axes[*m - 1] = Some(axis);
        *m += 1;
    };

    if surface.mu < 0.0 {
        surface.mu = 0.0;
    }

    if surface.mode.contains(SurfaceMode::MU2) {
        if surface.mu2 < 0.0 {
            surface.mu2 = 0.0;
        }
        if surface.mu > 0.0 {
            push_axis(FrictionAxis::Primary, &mut m);
        }
        if surface.mu2 > 0.0 {
            push_axis(FrictionAxis::Secondary, &mut m);
        }
        if surface.mu == INFINITE_FRICTION {
            nub += 1;
        }
        if surface.mu2 == INFINITE_FRICTION {
            nub += 1;
        }
    } else {
        if surface.mu > 0.0 {
            push_axis(FrictionAxis::Primary, &mut m);
            push_axis(FrictionAxis::Secondary, &mut m);
        }
        if surface.mu == INFINITE_FRICTION {
            nub += 2;
        }
    }

    RowLayout {
        count: RowCount { m, nub },
        axes,
    }
}

/// A contact between body A and body B (or the static world) for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactJoint {
    contact: Contact,
    erp: f32,
    cfm: f32,
    world_erp: f32,
    world_cfm: f32,
    min_depth: f32,
    max_correcting_velocity: f32,
    reverse: bool,
    layout: RowLayout,
}

impl ContactJoint {
    /// Create a joint with ERP/CFM taken from the world defaults.
    ///
    /// The row count is computed immediately, which also clamps negative
    /// friction coefficients on the stored contact.
    pub fn new(contact: Contact, config: &ContactConfig) -> Self {
        let mut joint = Self {
            contact,
            erp: config.erp,
            cfm: config.cfm,
            world_erp: config.erp,
            world_cfm: config.cfm,
            min_depth: config.min_depth,
            max_correcting_velocity: config.max_correcting_velocity,
            reverse: false,
            layout: RowLayout {
                count: RowCount::NORMAL_ONLY,
                axes: [None; 2],
            },
        };
        joint.compute_row_count();
        joint
    }

    /// Flip the contact normal, for when the bodies were attached in the
    /// opposite order to the one collision detection reported.
    ///
    /// Only honored under [`Capabilities::REVERSE`]; the simple path takes the
    /// normal as reported.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Replace the contact and recompute the row count.
    pub fn set_contact(&mut self, contact: Contact) -> RowCount {
        self.contact = contact;
        self.compute_row_count()
    }

    /// Rows a contact can ever produce, usable before the count is known.
    pub const fn max_rows() -> usize {
        MAX_CONTACT_ROWS
    }

    /// Run the row-count policy and cache the result.
    pub fn compute_row_count(&mut self) -> RowCount {
        self.layout = row_layout(&mut self.contact.surface);
        trace!(
            m = self.layout.count.m,
            nub = self.layout.count.nub,
            "contact row count"
        );
        self.layout.count
    }

    /// The cached row count.
    pub fn row_count(&self) -> RowCount {
        self.layout.count
    }

    pub fn erp(&self) -> f32 {
        self.erp
    }

    pub fn cfm(&self) -> f32 {
        self.cfm
    }

    pub fn param(&self, param: ContactParam) -> f32 {
        match param {
            ContactParam::Erp => self.erp,
            ContactParam::Cfm => self.cfm,
        }
    }

    /// Override ERP or CFM for this joint. The simple path keeps using the
    /// world defaults the joint was created with.
    pub fn set_param(&mut self, param: ContactParam, value: f32) {
        debug_assert!(value.is_finite(), "contact {param:?} must be finite");
        match param {
            ContactParam::Erp => self.erp = value,
            ContactParam::Cfm => self.cfm = value,
        }
    }

    /// Assemble rows with every optional stage enabled.
    pub fn assemble(
        &self,
        step: &StepInfo,
        body_a: &BodyState,
        body_b: Option<&BodyState>,
    ) -> ConstraintRows {
        self.assemble_with(step, body_a, body_b, Capabilities::FULL)
    }

    /// Assemble rows on the reduced path (see [`Capabilities::SIMPLE`]).
    pub fn assemble_simple(
        &self,
        step: &StepInfo,
        body_a: &BodyState,
        body_b: Option<&BodyState>,
    ) -> ConstraintRows {
        self.assemble_with(step, body_a, body_b, Capabilities::SIMPLE)
    }

    /// Build Jacobians, bias, bounds and CFM for the cached row count.
    ///
    /// `body_b` is `None` when the contact is against the static world; body
    /// B blocks are then omitted from every row.
    pub fn assemble_with(
        &self,
        step: &StepInfo,
        body_a: &BodyState,
        body_b: Option<&BodyState>,
        capabilities: Capabilities,
    ) -> ConstraintRows {
        let surface = &self.contact.surface;
        let geom = &self.contact.geom;
        let mode = surface.mode & capabilities.surface_mask();

        let normal = if self.reverse && capabilities.contains(Capabilities::REVERSE) {
            -geom.normal
        } else {
            geom.normal
        };

        let c1 = body_a.lever_arm(geom.position);
        let c2 = body_b.map(|b| b.lever_arm(geom.position));
        let jacobian = |direction: Vec3| {
            (
                JacobianBlock::along(direction, c1),
                c2.map(|c2| JacobianBlock::reaction(direction, c2)),
            )
        };

        let (joint_erp, joint_cfm) = if capabilities.contains(Capabilities::JOINT_PARAMS) {
            (self.erp, self.cfm)
        } else {
            (self.world_erp, self.world_cfm)
        };

        let mut rows = [ConstraintRow::default(); MAX_CONTACT_ROWS];

        // Normal row
        let (normal_a, normal_b) = jacobian(normal);
        let erp = if mode.contains(SurfaceMode::SOFT_ERP) {
            surface.soft_erp
        } else {
            joint_erp
        };
        let k = step.step_frequency * erp;

        let mut depth = geom.depth;
        if capabilities.contains(Capabilities::MIN_DEPTH) {
            depth -= self.min_depth;
        }
        let depth = depth.max(0.0);

        let motion_n = if mode.contains(SurfaceMode::MOTION_N) {
            surface.motion_n
        } else {
            0.0
        };

        let mut bias = k * depth + motion_n;
        if capabilities.contains(Capabilities::VELOCITY_CAP) {
            // The cap limits pushout only; bounce below may exceed it.
            bias = bias.min(self.max_correcting_velocity);
        }

        if mode.contains(SurfaceMode::BOUNCE) {
            // Negative for approaching bodies
            let mut outgoing = body_a.project(&normal_a);
            if let (Some(b), Some(block)) = (body_b, &normal_b) {
                outgoing += b.project(block);
            }
            outgoing -= motion_n;

            if surface.bounce_vel >= 0.0 && -outgoing > surface.bounce_vel {
                bias = bias.max(-surface.bounce * outgoing + motion_n);
            }
        }

        rows[0] = ConstraintRow {
            body_a: normal_a,
            body_b: normal_b,
            bias,
            lo: 0.0,
            hi: f32::INFINITY,
            cfm: if mode.contains(SurfaceMode::SOFT_CFM) {
                surface.soft_cfm
            } else {
                joint_cfm
            },
            depends_on: None,
        };

        // Friction rows
        if self.layout.count.m > 1 {
            let direction = mode
                .contains(SurfaceMode::FDIR1)
                .then_some(self.contact.fdir1);
            let basis = friction_basis(normal, direction);

            // Without two-axis friction rows follow t1, t2 positionally
            let axes = if capabilities.contains(Capabilities::TWO_AXIS_FRICTION) {
                self.layout.axes
            } else {
                [Some(FrictionAxis::Primary), Some(FrictionAxis::Secondary)]
            };
            let active = self.layout.count.m - 1;

            for (slot, axis) in axes.iter().flatten().take(active).enumerate() {
                let (block_a, block_b) = jacobian(basis.tangent(*axis));
                let friction = FrictionTerms::for_axis(*axis, surface, mode);
                rows[slot + 1] = ConstraintRow {
                    body_a: block_a,
                    body_b: block_b,
                    bias: friction.motion.unwrap_or(0.0),
                    lo: -friction.mu,
                    hi: friction.mu,
                    cfm: friction.slip.unwrap_or(joint_cfm),
                    depends_on: friction.coupled.then_some(RowIndex::NORMAL),
                };
            }
        }

        ConstraintRows::new(rows, self.layout.count)
    }
}

/// Surface values feeding one friction row.
struct FrictionTerms {
    mu: f32,
    motion: Option<f32>,
    slip: Option<f32>,
    coupled: bool,
}

impl FrictionTerms {
    fn for_axis(axis: FrictionAxis, surface: &SurfaceParameters, mode: SurfaceMode) -> Self {
        match axis {
            FrictionAxis::Primary => Self {
                mu: surface.mu,
                motion: mode.contains(SurfaceMode::MOTION_1).then_some(surface.motion1),
                slip: mode.contains(SurfaceMode::SLIP_1).then_some(surface.slip1),
                coupled: mode.contains(SurfaceMode::APPROX_1_1),
            },
            FrictionAxis::Secondary => Self {
                mu: if mode.contains(SurfaceMode::MU2) {
                    surface.mu2
                } else {
                    surface.mu
                },
                motion: mode.contains(SurfaceMode::MOTION_2).then_some(surface.motion2),
                slip: mode.contains(SurfaceMode::SLIP_2).then_some(surface.slip2),
                coupled: mode.contains(SurfaceMode::APPROX_1_2),
            },
        }
    }
}
