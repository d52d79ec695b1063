//! Constraint row table handed to the global LCP solver.
//!
//! A contact produces up to [`MAX_CONTACT_ROWS`] scalar rows. Row 0 is always
//! the normal row; friction rows follow in axis order. Rows live in a fixed
//! array so assembly never allocates.

use glam::Vec3;

use super::error::RowBufferError;

/// Upper bound on the rows a single contact can produce.
pub const MAX_CONTACT_ROWS: usize = 3;

/// Position of a row inside a contact's row table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowIndex(usize);

impl RowIndex {
    /// The non-penetration row.
    pub const NORMAL: Self = Self(0);

    pub fn new(index: usize) -> Self {
        debug_assert!(index < MAX_CONTACT_ROWS, "row index {index} out of range");
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// Linear and angular Jacobian entries of one row for one body.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct JacobianBlock {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl JacobianBlock {
    pub fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }

    /// Block for a force along `direction` applied at `lever_arm` from the
    /// center of mass.
    pub fn along(direction: Vec3, lever_arm: Vec3) -> Self {
        Self {
            linear: direction,
            angular: lever_arm.cross(direction),
        }
    }

    /// Block for the reaction body, which receives the opposite force.
    pub fn reaction(direction: Vec3, lever_arm: Vec3) -> Self {
        Self {
            linear: -direction,
            angular: -lever_arm.cross(direction),
        }
    }
}

/// One scalar constraint row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintRow {
    pub body_a: JacobianBlock,
    /// `None` when body B is the static world.
    pub body_b: Option<JacobianBlock>,
    /// Right-hand side: desired constraint velocity.
    pub bias: f32,
    pub lo: f32,
    pub hi: f32,
    pub cfm: f32,
    /// Row whose solved magnitude scales `lo` and `hi`.
    pub depends_on: Option<RowIndex>,
}

impl ConstraintRow {
    /// Bounds the solver must use once row forces are known.
    ///
    /// Coupled friction rows scale their coefficient box by the magnitude of
    /// the row they depend on; all other rows return `lo` and `hi` unchanged.
    pub fn effective_bounds(&self, solved: &[f32]) -> (f32, f32) {
        match self.depends_on.and_then(|row| solved.get(row.get())) {
            Some(force) => {
                let scale = force.abs();
                (self.lo * scale, self.hi * scale)
            }
            None => (self.lo, self.hi),
        }
    }

    /// Is this row free of complementarity limits?
    pub fn is_unbounded(&self) -> bool {
        self.lo == f32::NEG_INFINITY && self.hi == f32::INFINITY
    }
}

impl Default for ConstraintRow {
    fn default() -> Self {
        Self {
            body_a: JacobianBlock::default(),
            body_b: None,
            bias: 0.0,
            lo: 0.0,
            hi: 0.0,
            cfm: 0.0,
            depends_on: None,
        }
    }
}

/// Number of active rows and how many of them are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCount {
    pub m: usize,
    pub nub: usize,
}

impl RowCount {
    /// A frictionless contact: only the normal row.
    pub const NORMAL_ONLY: Self = Self { m: 1, nub: 0 };
}

/// Rows assembled for one contact during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintRows {
    rows: [ConstraintRow; MAX_CONTACT_ROWS],
    count: RowCount,
}

impl ConstraintRows {
    pub(crate) fn new(rows: [ConstraintRow; MAX_CONTACT_ROWS], count: RowCount) -> Self {
        debug_assert!((1..=MAX_CONTACT_ROWS).contains(&count.m));
        Self { rows, count }
    }

    pub fn count(&self) -> RowCount {
        self.count
    }

    pub fn m(&self) -> usize {
        self.count.m
    }

    pub fn nub(&self) -> usize {
        self.count.nub
    }

    /// The active rows, normal row first.
    pub fn rows(&self) -> &[ConstraintRow] {
        &self.rows[..self.count.m]
    }

    pub fn row(&self, index: RowIndex) -> Option<&ConstraintRow> {
        self.rows().get(index.get())
    }

    pub fn normal(&self) -> &ConstraintRow {
        &self.rows[RowIndex::NORMAL.get()]
    }

    /// Friction rows in axis order; empty for frictionless contacts.
    pub fn friction(&self) -> &[ConstraintRow] {
        &self.rows()[1..]
    }

    /// Whether the rows carry blocks for a second dynamic body.
    pub fn is_two_body(&self) -> bool {
        self.normal().body_b.is_some()
    }

    /// Write the rows into flat solver buffers addressed by
    /// `row * rowskip + component`.
    ///
    /// Scalar buffers (`c`, `cfm`, `lo`, `hi`, `findex`) are indexed by row.
    /// A missing friction index is written as `-1`. Body B buffers are left
    /// untouched for one-body contacts.
    pub fn write_strided(&self, out: &mut StridedRows<'_>) -> Result<(), RowBufferError> {
        out.check(self)?;

        let s = out.rowskip;
        for (i, row) in self.rows().iter().enumerate() {
            write_block(&mut out.j1l, &mut out.j1a, i * s, &row.body_a);
            if let (Some(block), Some((j2l, j2a))) = (&row.body_b, out.body_b.as_mut()) {
                write_block(j2l, j2a, i * s, block);
            }
            out.c[i] = row.bias;
            out.cfm[i] = row.cfm;
            out.lo[i] = row.lo;
            out.hi[i] = row.hi;
            out.findex[i] = row.depends_on.map_or(-1, |r| r.get() as i32);
        }
        Ok(())
    }
}

fn write_block(linear: &mut [f32], angular: &mut [f32], offset: usize, block: &JacobianBlock) {
    let values: &[f32; 6] = bytemuck::cast_ref(block);
    linear[offset..offset + 3].copy_from_slice(&values[..3]);
    angular[offset..offset + 3].copy_from_slice(&values[3..]);
}

/// Caller-owned flat buffers in the layout of a stride-addressed LCP solver.
#[derive(Debug)]
pub struct StridedRows<'a> {
    /// Distance between consecutive rows in the Jacobian buffers.
    pub rowskip: usize,
    pub j1l: &'a mut [f32],
    pub j1a: &'a mut [f32],
    /// Linear and angular buffers of body B.
    pub body_b: Option<(&'a mut [f32], &'a mut [f32])>,
    pub c: &'a mut [f32],
    pub cfm: &'a mut [f32],
    pub lo: &'a mut [f32],
    pub hi: &'a mut [f32],
    pub findex: &'a mut [i32],
}

impl StridedRows<'_> {
    fn check(&self, rows: &ConstraintRows) -> Result<(), RowBufferError> {
        if self.rowskip < 3 {
            return Err(RowBufferError::StrideTooSmall {
                rowskip: self.rowskip,
            });
        }

        let m = rows.m();
        let jacobian_len = (m - 1) * self.rowskip + 3;
        check_len("J1l", self.j1l.len(), jacobian_len)?;
        check_len("J1a", self.j1a.len(), jacobian_len)?;

        if rows.is_two_body() {
            let (j2l, j2a) = self.body_b.as_ref().ok_or(RowBufferError::MissingBodyB)?;
            check_len("J2l", j2l.len(), jacobian_len)?;
            check_len("J2a", j2a.len(), jacobian_len)?;
        }

        check_len("c", self.c.len(), m)?;
        check_len("cfm", self.cfm.len(), m)?;
        check_len("lo", self.lo.len(), m)?;
        check_len("hi", self.hi.len(), m)?;
        check_len("findex", self.findex.len(), m)
    }
}

fn check_len(buffer: &'static str, len: usize, required: usize) -> Result<(), RowBufferError> {
    if len < required {
        Err(RowBufferError::BufferTooShort {
            buffer,
            len,
            required,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows(two_body: bool) -> ConstraintRows {
        let block_b = two_body.then(|| JacobianBlock::reaction(Vec3::Y, Vec3::new(0.0, 1.0, 0.0)));
        let normal = ConstraintRow {
            body_a: JacobianBlock::along(Vec3::Y, Vec3::new(1.0, 0.0, 0.0)),
            body_b: block_b,
            bias: 0.12,
            lo: 0.0,
            hi: f32::INFINITY,
            cfm: 1e-5,
            depends_on: None,
        };
        let friction = ConstraintRow {
            body_a: JacobianBlock::along(Vec3::X, Vec3::new(1.0, 0.0, 0.0)),
            body_b: two_body.then(|| JacobianBlock::reaction(Vec3::X, Vec3::Y)),
            lo: -0.5,
            hi: 0.5,
            cfm: 1e-5,
            depends_on: Some(RowIndex::NORMAL),
            ..ConstraintRow::default()
        };
        ConstraintRows::new(
            [normal, friction, ConstraintRow::default()],
            RowCount { m: 2, nub: 0 },
        )
    }

    #[test]
    fn test_reaction_block_negates_both_parts() {
        let lever = Vec3::new(0.3, -0.2, 0.9);
        let action = JacobianBlock::along(Vec3::Z, lever);
        let reaction = JacobianBlock::reaction(Vec3::Z, lever);
        assert_eq!(reaction.linear, -action.linear);
        assert_eq!(reaction.angular, -action.angular);
    }

    #[test]
    fn test_jacobian_block_is_contiguous() {
        let block = JacobianBlock::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        let values: &[f32; 6] = bytemuck::cast_ref(&block);
        assert_eq!(values, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_effective_bounds_follow_normal_force() {
        let rows = sample_rows(false);
        let friction = &rows.friction()[0];
        assert_eq!(friction.effective_bounds(&[2.0, 0.0]), (-1.0, 1.0));
        assert_eq!(friction.effective_bounds(&[-4.0, 0.0]), (-2.0, 2.0));
        assert_eq!(rows.normal().effective_bounds(&[2.0]), (0.0, f32::INFINITY));
    }

    #[test]
    fn test_rows_slice_matches_count() {
        let rows = sample_rows(true);
        assert_eq!(rows.m(), 2);
        assert_eq!(rows.rows().len(), 2);
        assert_eq!(rows.friction().len(), 1);
        assert!(rows.row(RowIndex::new(2)).is_none());
        assert!(rows.is_two_body());
    }

    #[test]
    fn test_write_strided_respects_rowskip() {
        let rows = sample_rows(false);
        let rowskip = 8;
        let mut j1l = [0.0; 16];
        let mut j1a = [0.0; 16];
        let mut c = [9.0; 3];
        let mut cfm = [0.0; 3];
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        let mut findex = [7; 3];
        let mut out = StridedRows {
            rowskip,
            j1l: &mut j1l,
            j1a: &mut j1a,
            body_b: None,
            c: &mut c,
            cfm: &mut cfm,
            lo: &mut lo,
            hi: &mut hi,
            findex: &mut findex,
        };
        rows.write_strided(&mut out).unwrap();

        assert_eq!(&j1l[0..3], &[0.0, 1.0, 0.0]);
        assert_eq!(&j1l[rowskip..rowskip + 3], &[1.0, 0.0, 0.0]);
        assert_eq!(&j1l[3..rowskip], &[0.0; 5]);
        // (1,0,0) x (0,1,0) = (0,0,1)
        assert_eq!(&j1a[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(c, [0.12, 0.0, 9.0]);
        assert_eq!(lo[1], -0.5);
        assert_eq!(hi[1], 0.5);
        assert_eq!(findex, [-1, 0, 7]);
    }

    #[test]
    fn test_write_strided_two_body_blocks() {
        let rows = sample_rows(true);
        let rowskip = 4;
        let mut j1l = [0.0; 8];
        let mut j1a = [0.0; 8];
        let mut j2l = [5.0; 8];
        let mut j2a = [5.0; 8];
        let mut c = [0.0; 2];
        let mut cfm = [0.0; 2];
        let mut lo = [0.0; 2];
        let mut hi = [0.0; 2];
        let mut findex = [0; 2];
        let mut out = StridedRows {
            rowskip,
            j1l: &mut j1l,
            j1a: &mut j1a,
            body_b: Some((&mut j2l, &mut j2a)),
            c: &mut c,
            cfm: &mut cfm,
            lo: &mut lo,
            hi: &mut hi,
            findex: &mut findex,
        };
        rows.write_strided(&mut out).unwrap();

        assert_eq!(&j2l[0..3], &[0.0, -1.0, 0.0]);
        assert_eq!(&j2l[rowskip..rowskip + 3], &[-1.0, 0.0, 0.0]);
        // -(Y x Y) = 0, -(Y x X) = Z
        assert_eq!(&j2a[0..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&j2a[rowskip..rowskip + 3], &[0.0, 0.0, 1.0]);
        // Padding between rows and after the last row is untouched
        assert_eq!(j2l[3], 5.0);
        assert_eq!(j2a[3], 5.0);
        assert_eq!(j2l[7], 5.0);
        assert_eq!(findex, [-1, 0]);
    }

    #[test]
    fn test_write_strided_rejects_bad_buffers() {
        let rows = sample_rows(true);
        let mut j1l = [0.0; 6];
        let mut j1a = [0.0; 6];
        let mut c = [0.0; 2];
        let mut cfm = [0.0; 2];
        let mut lo = [0.0; 2];
        let mut hi = [0.0; 2];
        let mut findex = [0; 2];
        let mut out = StridedRows {
            rowskip: 2,
            j1l: &mut j1l,
            j1a: &mut j1a,
            body_b: None,
            c: &mut c,
            cfm: &mut cfm,
            lo: &mut lo,
            hi: &mut hi,
            findex: &mut findex,
        };
        assert_eq!(
            rows.write_strided(&mut out),
            Err(RowBufferError::StrideTooSmall { rowskip: 2 })
        );

        out.rowskip = 4;
        assert_eq!(
            rows.write_strided(&mut out),
            Err(RowBufferError::BufferTooShort {
                buffer: "J1l",
                len: 6,
                required: 7
            })
        );

        out.rowskip = 3;
        assert_eq!(rows.write_strided(&mut out), Err(RowBufferError::MissingBodyB));
    }
}
