use crate::linalg::Matrix3;

/// Quaternions with a norm below this value are considered degenerate.
pub const QUATERNION_NORM_EPS: f64 = 1e-10;

/// Normalize a quaternion stored as `[w, x, y, z]`.
///
/// Returns `None` when the quaternion norm is below [`QUATERNION_NORM_EPS`].
pub fn normalize_quaternion(q: &[f64; 4]) -> Option<[f64; 4]> {
    let norm = q.iter().map(|v| v * v).sum::<f64>().sqrt();
    match norm < QUATERNION_NORM_EPS || !norm.is_finite() {
        true => None,
        false => Some(q.map(|v| v / norm)),
    }
}

/// Compute the rotation matrix from a quaternion.
///
/// # Arguments
///
/// * `q` - The quaternion as `[w, x, y, z]`. It does not need to be unit length.
///
/// # Returns
///
/// The rotation matrix of the normalized quaternion.
///
/// Example:
///
/// ```
/// use nvmkit_3d::transforms::quaternion_to_rotation_matrix;
///
/// let rotation = quaternion_to_rotation_matrix(&[1.0, 0.0, 0.0, 0.0]).unwrap();
/// assert_eq!(rotation.rows(), &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn quaternion_to_rotation_matrix(q: &[f64; 4]) -> Result<Matrix3, &'static str> {
    let [w, x, y, z] =
        normalize_quaternion(q).ok_or("cannot compute rotation matrix from a zero quaternion")?;

    let xx = x * x;
    let yy = y * y;
    let zz = z * z;
    let xy = x * y;
    let xz = x * z;
    let yz = y * z;
    let wx = w * x;
    let wy = w * y;
    let wz = w * z;

    Ok(Matrix3([
        [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
        [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
        [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
    ]))
}

/// Compute the unit quaternion `[w, x, y, z]` of a rotation matrix.
///
/// PRECONDITION: `rotation` is orthonormal with determinant +1.
///
/// The returned quaternion always has a non-negative `w`.
pub fn rotation_matrix_to_quaternion(rotation: &Matrix3) -> [f64; 4] {
    let m = rotation.rows();
    let trace = m[0][0] + m[1][1] + m[2][2];

    // pick the numerically largest component first
    let q = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        [
            0.25 * s,
            (m[2][1] - m[1][2]) / s,
            (m[0][2] - m[2][0]) / s,
            (m[1][0] - m[0][1]) / s,
        ]
    } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
        let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
        [
            (m[2][1] - m[1][2]) / s,
            0.25 * s,
            (m[0][1] + m[1][0]) / s,
            (m[0][2] + m[2][0]) / s,
        ]
    } else if m[1][1] > m[2][2] {
        let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
        [
            (m[0][2] - m[2][0]) / s,
            (m[0][1] + m[1][0]) / s,
            0.25 * s,
            (m[1][2] + m[2][1]) / s,
        ]
    } else {
        let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
        [
            (m[1][0] - m[0][1]) / s,
            (m[0][2] + m[2][0]) / s,
            (m[1][2] + m[2][1]) / s,
            0.25 * s,
        ]
    };

    let q = normalize_quaternion(&q).unwrap_or([1.0, 0.0, 0.0, 0.0]);
    match q[0] < 0.0 {
        true => q.map(|v| -v),
        false => q,
    }
}
