//! Contact data handed over by collision detection and the scene.

use bitflags::bitflags;
use glam::Vec3;

/// Friction coefficient meaning "no limit": the row becomes unbounded.
pub const INFINITE_FRICTION: f32 = f32::INFINITY;

/// Geometric description of a single contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeometry {
    /// Contact point in world space.
    pub position: Vec3,
    /// Unit contact normal, pointing from body B into body A.
    pub normal: Vec3,
    /// Penetration depth. Positive values mean overlap.
    pub depth: f32,
}

impl ContactGeometry {
    pub fn new(position: Vec3, normal: Vec3, depth: f32) -> Self {
        Self {
            position,
            normal,
            depth,
        }
    }
}

impl Default for ContactGeometry {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            depth: 0.0,
        }
    }
}

bitflags! {
    /// Bitflags selecting optional surface behavior for a contact.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SurfaceMode: u32 {
        /// Use `mu2` for the secondary friction axis instead of `mu`.
        const MU2        = 1 << 0;
        /// Take the primary friction axis from `Contact::fdir1`.
        const FDIR1      = 1 << 1;
        /// Restitution is applied to the normal row.
        const BOUNCE     = 1 << 2;
        /// Use `soft_erp` instead of the joint ERP.
        const SOFT_ERP   = 1 << 3;
        /// Use `soft_cfm` for the normal row instead of the joint CFM.
        const SOFT_CFM   = 1 << 4;
        /// Target surface velocity along the primary friction axis.
        const MOTION_1   = 1 << 5;
        /// Target surface velocity along the secondary friction axis.
        const MOTION_2   = 1 << 6;
        /// Target separation velocity along the normal.
        const MOTION_N   = 1 << 7;
        /// Use `slip1` as CFM of the primary friction row.
        const SLIP_1     = 1 << 8;
        /// Use `slip2` as CFM of the secondary friction row.
        const SLIP_2     = 1 << 9;
        /// Primary friction bounds scale with the solved normal force.
        const APPROX_1_1 = 1 << 12;
        /// Secondary friction bounds scale with the solved normal force.
        const APPROX_1_2 = 1 << 13;
        /// Both friction axes are coupled to the normal force.
        const APPROX_1   = Self::APPROX_1_1.bits() | Self::APPROX_1_2.bits();
    }
}

/// Per-pair surface properties chosen by the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceParameters {
    pub mode: SurfaceMode,
    /// Coulomb coefficient of the primary axis (both axes unless `MU2`).
    pub mu: f32,
    /// Coulomb coefficient of the secondary axis, read only with `MU2`.
    pub mu2: f32,
    /// Restitution coefficient in [0, 1], read only with `BOUNCE`.
    pub bounce: f32,
    /// Minimum incoming speed for restitution to apply.
    pub bounce_vel: f32,
    pub soft_erp: f32,
    pub soft_cfm: f32,
    pub motion1: f32,
    pub motion2: f32,
    pub motion_n: f32,
    pub slip1: f32,
    pub slip2: f32,
}

impl SurfaceParameters {
    /// Isotropic Coulomb friction with no optional behavior.
    pub fn with_friction(mu: f32) -> Self {
        Self {
            mu,
            ..Self::default()
        }
    }

    /// Builder-style setter adding mode flags.
    pub fn with_mode(mut self, mode: SurfaceMode) -> Self {
        self.mode |= mode;
        self
    }

    /// Enable restitution with the given coefficient and velocity threshold.
    pub fn with_bounce(mut self, bounce: f32, bounce_vel: f32) -> Self {
        self.mode |= SurfaceMode::BOUNCE;
        self.bounce = bounce;
        self.bounce_vel = bounce_vel;
        self
    }

    /// Enable two-axis friction with a separate secondary coefficient.
    pub fn with_mu2(mut self, mu2: f32) -> Self {
        self.mode |= SurfaceMode::MU2;
        self.mu2 = mu2;
        self
    }
}

impl Default for SurfaceParameters {
    fn default() -> Self {
        Self {
            mode: SurfaceMode::empty(),
            mu: 0.0,
            mu2: 0.0,
            bounce: 0.0,
            bounce_vel: 0.0,
            soft_erp: 0.0,
            soft_cfm: 0.0,
            motion1: 0.0,
            motion2: 0.0,
            motion_n: 0.0,
            slip1: 0.0,
            slip2: 0.0,
        }
    }
}

/// Everything a contact joint needs from collision and scene setup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contact {
    pub surface: SurfaceParameters,
    pub geom: ContactGeometry,
    /// Primary friction direction, read only with `SurfaceMode::FDIR1`.
    pub fdir1: Vec3,
}

impl Contact {
    pub fn new(geom: ContactGeometry, surface: SurfaceParameters) -> Self {
        Self {
            surface,
            geom,
            fdir1: Vec3::ZERO,
        }
    }

    /// Supply the primary friction direction and set `FDIR1`.
    pub fn with_friction_direction(mut self, fdir1: Vec3) -> Self {
        self.surface.mode |= SurfaceMode::FDIR1;
        self.fdir1 = fdir1;
        self
    }
}
