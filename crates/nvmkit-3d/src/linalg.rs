use serde::{Deserialize, Serialize};

/// A row-major 3x3 matrix.
///
/// All operations return a new value and never mutate `self`, so the same
/// rotation can be reused across several conversion steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix3(pub [[f64; 3]; 3]);

/// A row-major 4x4 homogeneous matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4(pub [[f64; 4]; 4]);

impl Matrix3 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// Create a matrix from its rows.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self(rows)
    }

    /// Get the element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row][col]
    }

    /// Get the rows of the matrix.
    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.0
    }

    /// Return the transposed matrix.
    pub fn transpose(&self) -> Self {
        let m = &self.0;
        Self([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    /// Return the matrix product `self * rhs`.
    pub fn matmul(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, val) in row.iter_mut().enumerate() {
                *val = (0..3).map(|k| self.0[i][k] * rhs.0[k][j]).sum();
            }
        }
        Self(out)
    }

    /// Multiply the matrix with a column vector.
    pub fn mul_vec(&self, v: &[f64; 3]) -> [f64; 3] {
        let m = &self.0;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    /// Compute the determinant.
    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Check that `M * M^T` is the identity within `tolerance` and that the
    /// determinant is positive, i.e. the matrix is a proper rotation.
    pub fn is_rotation(&self, tolerance: f64) -> bool {
        let mmt = self.matmul(&self.transpose());
        let max_err = (0..3)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .map(|(i, j)| (mmt.0[i][j] - Self::IDENTITY.0[i][j]).abs())
            .fold(0.0, f64::max);
        max_err <= tolerance && self.determinant() > 0.0
    }

    /// Negate rows 1 and 2.
    ///
    /// Equivalent to premultiplying by a 180 degree rotation about the x axis,
    /// which maps the y-down/z-forward vision frame onto the y-up/z-back
    /// graphics frame.
    pub fn flip_yz_rows(&self) -> Self {
        let m = &self.0;
        Self([m[0], m[1].map(|x| -x), m[2].map(|x| -x)])
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Compose a rigid transform from a rotation block and a translation column.
    pub fn from_rotation_translation(rotation: &Matrix3, translation: &[f64; 3]) -> Self {
        let r = rotation.rows();
        Self([
            [r[0][0], r[0][1], r[0][2], translation[0]],
            [r[1][0], r[1][1], r[1][2], translation[1]],
            [r[2][0], r[2][1], r[2][2], translation[2]],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Get the element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row][col]
    }

    /// Get the rows of the matrix.
    pub fn rows(&self) -> &[[f64; 4]; 4] {
        &self.0
    }

    /// Extract the upper-left 3x3 block.
    pub fn rotation(&self) -> Matrix3 {
        let m = &self.0;
        Matrix3([
            [m[0][0], m[0][1], m[0][2]],
            [m[1][0], m[1][1], m[1][2]],
            [m[2][0], m[2][1], m[2][2]],
        ])
    }

    /// Extract the translation column.
    pub fn translation(&self) -> [f64; 3] {
        [self.0[0][3], self.0[1][3], self.0[2][3]]
    }

    /// Return the matrix product `self * rhs`.
    pub fn matmul(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, val) in row.iter_mut().enumerate() {
                *val = (0..4).map(|k| self.0[i][k] * rhs.0[k][j]).sum();
            }
        }
        Self(out)
    }

    /// Transform a 3D point, treating it as homogeneous with `w = 1`.
    pub fn transform_point(&self, p: &[f64; 3]) -> [f64; 3] {
        let rotated = self.rotation().mul_vec(p);
        let t = self.translation();
        [rotated[0] + t[0], rotated[1] + t[1], rotated[2] + t[2]]
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Negate the y and z components of a vector.
pub fn flip_yz(v: &[f64; 3]) -> [f64; 3] {
    [v[0], -v[1], -v[2]]
}

/// Negate every component of a vector.
pub fn negate(v: &[f64; 3]) -> [f64; 3] {
    v.map(|x| -x)
}
