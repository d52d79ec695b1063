//! Friction basis construction.
//!
//! Both tangents returned here satisfy `t1 x t2 = n`, so together with the
//! contact normal they form a right-handed orthonormal frame.

use glam::Vec3;

/// Squared length below which a projected friction direction is unusable.
const DEGENERATE_DIRECTION_SQ: f32 = 1e-12;

/// Two unit vectors spanning the plane orthogonal to a contact normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionBasis {
    pub t1: Vec3,
    pub t2: Vec3,
}

/// One of the two friction directions of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrictionAxis {
    Primary,
    Secondary,
}

impl FrictionBasis {
    pub fn tangent(&self, axis: FrictionAxis) -> Vec3 {
        match axis {
            FrictionAxis::Primary => self.t1,
            FrictionAxis::Secondary => self.t2,
        }
    }
}

/// Derive a tangent frame from the normal alone.
///
/// The tangent plane is built in the coordinate plane that excludes the
/// dominant normal component: for `|n.z| > 1/sqrt(2)` the first tangent lies
/// in the y-z plane, otherwise in the x-y plane. The output depends only on
/// the bits of `n`, so a static normal gives the same frame every step.
pub fn plane_space(n: Vec3) -> FrictionBasis {
    if n.z.abs() > std::f32::consts::FRAC_1_SQRT_2 {
        let a = n.y * n.y + n.z * n.z;
        let k = a.sqrt().recip();
        let t1 = Vec3::new(0.0, -n.z * k, n.y * k);
        let t2 = Vec3::new(a * k, -n.x * t1.z, n.x * t1.y);
        FrictionBasis { t1, t2 }
    } else {
        let a = n.x * n.x + n.y * n.y;
        let k = a.sqrt().recip();
        let t1 = Vec3::new(-n.y * k, n.x * k, 0.0);
        let t2 = Vec3::new(-n.z * t1.y, n.z * t1.x, a * k);
        FrictionBasis { t1, t2 }
    }
}

/// Build the frame around a caller-supplied primary direction.
///
/// `direction` is projected onto the tangent plane and normalized. Falls back
/// to [`plane_space`] when the projection vanishes.
pub fn from_direction(n: Vec3, direction: Vec3) -> FrictionBasis {
    let projected = direction - n * n.dot(direction);
    let length_sq = projected.length_squared();
    if !length_sq.is_finite() || length_sq <= DEGENERATE_DIRECTION_SQ {
        return plane_space(n);
    }
    let t1 = projected / length_sq.sqrt();
    FrictionBasis {
        t1,
        t2: n.cross(t1),
    }
}

/// Friction frame for a contact, honoring an optional primary direction.
pub fn friction_basis(n: Vec3, direction: Option<Vec3>) -> FrictionBasis {
    match direction {
        Some(direction) => from_direction(n, direction),
        None => plane_space(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const EPS: f32 = 1e-5;

    fn assert_right_handed_frame(n: Vec3, basis: FrictionBasis) {
        assert_abs_diff_eq!(basis.t1.length(), 1.0, epsilon = EPS);
        assert_abs_diff_eq!(basis.t2.length(), 1.0, epsilon = EPS);
        assert_abs_diff_eq!(basis.t1.dot(n), 0.0, epsilon = EPS);
        assert_abs_diff_eq!(basis.t2.dot(n), 0.0, epsilon = EPS);
        assert_abs_diff_eq!(basis.t1.dot(basis.t2), 0.0, epsilon = EPS);
        assert_abs_diff_eq!(basis.t1.cross(basis.t2), n, epsilon = EPS);
    }

    fn unit_normal() -> impl Strategy<Value = Vec3> {
        (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
            .prop_filter("non-degenerate", |(x, y, z)| x * x + y * y + z * z > 1e-3)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z).normalize())
    }

    #[test]
    fn test_plane_space_axis_aligned_normals() {
        for n in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
            assert_right_handed_frame(n, plane_space(n));
        }
    }

    #[test]
    fn test_plane_space_up_normal() {
        let basis = plane_space(Vec3::Y);
        assert_abs_diff_eq!(basis.t1, Vec3::new(-1.0, 0.0, 0.0), epsilon = EPS);
        assert_abs_diff_eq!(basis.t2, Vec3::new(0.0, 0.0, 1.0), epsilon = EPS);
    }

    #[test]
    fn test_plane_space_near_branch_boundary() {
        let z = std::f32::consts::FRAC_1_SQRT_2;
        for n in [
            Vec3::new(0.0, 0.7071, z).normalize(),
            Vec3::new(0.7071, 0.0, -z).normalize(),
            Vec3::new(0.5, 0.5, z).normalize(),
        ] {
            assert_right_handed_frame(n, plane_space(n));
        }
    }

    #[test]
    fn test_from_direction_projects_onto_plane() {
        let n = Vec3::Y;
        let basis = from_direction(n, Vec3::new(2.0, 5.0, 0.0));
        assert_abs_diff_eq!(basis.t1, Vec3::X, epsilon = EPS);
        assert_right_handed_frame(n, basis);
    }

    #[test]
    fn test_from_direction_parallel_falls_back_to_plane_space() {
        let n = Vec3::Z;
        assert_eq!(from_direction(n, Vec3::new(0.0, 0.0, 3.0)), plane_space(n));
        assert_eq!(from_direction(n, Vec3::ZERO), plane_space(n));
        assert_eq!(from_direction(n, Vec3::NAN), plane_space(n));
    }

    #[test]
    fn test_friction_basis_dispatch() {
        let n = Vec3::Y;
        assert_eq!(friction_basis(n, None), plane_space(n));
        assert_eq!(
            friction_basis(n, Some(Vec3::Z)),
            from_direction(n, Vec3::Z)
        );
    }

    proptest! {
        #[test]
        fn plane_space_is_right_handed_orthonormal(n in unit_normal()) {
            assert_right_handed_frame(n, plane_space(n));
        }

        #[test]
        fn plane_space_is_deterministic(n in unit_normal()) {
            let first = plane_space(n);
            let second = plane_space(n);
            prop_assert_eq!(first.t1.to_array().map(f32::to_bits), second.t1.to_array().map(f32::to_bits));
            prop_assert_eq!(first.t2.to_array().map(f32::to_bits), second.t2.to_array().map(f32::to_bits));
        }

        #[test]
        fn supplied_direction_gives_right_handed_frame(n in unit_normal(), d in unit_normal()) {
            prop_assume!(n.cross(d).length_squared() > 1e-4);
            assert_right_handed_frame(n, from_direction(n, d));
        }
    }
}
