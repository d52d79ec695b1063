//! Rein contact constraints
//!
//! Turns contacts reported by collision detection into the scalar LCP rows a
//! velocity-level rigid body solver consumes.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **physics::basis** - Friction basis around a contact normal
//! 2. **physics::rows** - Row table, Jacobian blocks and strided export
//! 3. **physics::joint** - Row-count policy and row assembly per contact
//! 4. **ecs** - hecs ECS integration (feature = "ecs")

pub mod physics;

#[cfg(feature = "ecs")]
pub mod ecs;

// Re-export commonly used types
pub use physics::{
    BodyState, Capabilities, ConfigError, ConstraintRow, ConstraintRows, Contact, ContactConfig,
    ContactGeometry, ContactJoint, ContactParam, RowBufferError, RowCount, RowIndex, StepInfo,
    SurfaceMode, SurfaceParameters,
};

#[cfg(feature = "ecs")]
pub use ecs::prelude::*;

// Re-export glam for convenience
pub use glam;
