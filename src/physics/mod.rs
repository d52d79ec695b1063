//! Contact constraint generation for a velocity-level LCP solver.
//!
//! # Architecture
//!
//! Each contact reported by collision detection becomes a [`ContactJoint`].
//! Once per step the joint produces up to three scalar rows:
//!
//! 1. Decide the row count (normal row plus active friction rows)
//! 2. Build the friction basis around the contact normal
//! 3. Assemble Jacobian blocks for body A and, if dynamic, body B
//! 4. Fill in bias, bounds, friction coupling and CFM
//!
//! The global solver consumes the resulting [`ConstraintRows`] either
//! directly or through [`ConstraintRows::write_strided`].

pub mod basis;
pub mod contact;
pub mod error;
pub mod joint;
pub mod rigid_body;
pub mod rows;

pub use self::basis::{friction_basis, plane_space, FrictionAxis, FrictionBasis};
pub use self::contact::{
    Contact, ContactGeometry, SurfaceMode, SurfaceParameters, INFINITE_FRICTION,
};
pub use self::error::{ConfigError, RowBufferError};
pub use self::joint::{count_rows, Capabilities, ContactJoint, ContactParam};
pub use self::rigid_body::BodyState;
pub use self::rows::{
    ConstraintRow, ConstraintRows, JacobianBlock, RowCount, RowIndex, StridedRows,
    MAX_CONTACT_ROWS,
};

/// World-level defaults applied to every new contact joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactConfig {
    /// Error reduction parameter. Default: 0.2.
    pub erp: f32,
    /// Constraint force mixing. Default: 1e-5.
    pub cfm: f32,
    /// Penetration tolerated before error correction starts. Default: 0.
    pub min_depth: f32,
    /// Upper bound on the penetration-correction velocity. Default: infinite
    /// (no cap). Restitution is not limited by this value.
    pub max_correcting_velocity: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            erp: 0.2,
            cfm: 1e-5,
            min_depth: 0.0,
            max_correcting_velocity: f32::INFINITY,
        }
    }
}

impl ContactConfig {
    pub fn with_erp(mut self, erp: f32) -> Self {
        self.erp = erp;
        self
    }

    pub fn with_cfm(mut self, cfm: f32) -> Self {
        self.cfm = cfm;
        self
    }

    pub fn with_min_depth(mut self, min_depth: f32) -> Self {
        self.min_depth = min_depth;
        self
    }

    pub fn with_max_correcting_velocity(mut self, max_correcting_velocity: f32) -> Self {
        self.max_correcting_velocity = max_correcting_velocity;
        self
    }

    /// Check that every value is physically meaningful.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.erp) {
            return Err(ConfigError::InvalidErp(self.erp));
        }
        if !self.cfm.is_finite() || self.cfm < 0.0 {
            return Err(ConfigError::InvalidCfm(self.cfm));
        }
        if !self.min_depth.is_finite() || self.min_depth < 0.0 {
            return Err(ConfigError::InvalidMinDepth(self.min_depth));
        }
        if self.max_correcting_velocity.is_nan() || self.max_correcting_velocity < 0.0 {
            return Err(ConfigError::InvalidMaxCorrectingVelocity(
                self.max_correcting_velocity,
            ));
        }
        Ok(())
    }
}

/// Per-step timing shared by all contacts of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    /// Inverse of the step size, in Hz.
    pub step_frequency: f32,
}

impl StepInfo {
    pub fn new(step_frequency: f32) -> Result<Self, ConfigError> {
        if !step_frequency.is_finite() || step_frequency <= 0.0 {
            return Err(ConfigError::InvalidStepFrequency(step_frequency));
        }
        Ok(Self { step_frequency })
    }

    /// Build from a step size in seconds.
    pub fn from_timestep(dt: f32) -> Result<Self, ConfigError> {
        Self::new(dt.recip())
    }
}

impl Default for StepInfo {
    fn default() -> Self {
        Self {
            step_frequency: 60.0,
        }
    }
}
