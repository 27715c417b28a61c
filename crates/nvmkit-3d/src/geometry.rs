use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::linalg::{self, Matrix3, Matrix4};

/// Error types for the camera geometry module.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    /// The focal length is zero or negative.
    #[error("Focal length must be positive, got {0}")]
    NonPositiveFocalLength(f64),

    /// The image width or height has not been resolved yet.
    #[error("Image size of camera {0} is unknown")]
    MissingImageSize(String),
}

/// Axis convention of the camera frame in the produced world matrices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateConvention {
    /// Computer vision frame: x right, y down, z forward.
    Vision,
    /// Computer graphics frame: x right, y up, z back.
    #[default]
    Graphics,
}

/// Camera-to-world transform in the graphics convention.
///
/// See [`world_matrix_in`].
pub fn world_matrix(camera: &Camera) -> Matrix4 {
    world_matrix_in(camera, CoordinateConvention::Graphics)
}

/// Camera-to-world transform of a camera.
///
/// The stored rotation `R` is world-to-camera. For the graphics convention
/// rows 1 and 2 of `R` and of the translation `t = -R * C` are negated
/// first. The orientation block is the transpose of the (flipped) rotation
/// and the translation column is `-R'^T * t'`, which is the camera center
/// in world coordinates for both conventions.
///
/// # Arguments
///
/// * `camera` - The camera to place in the scene.
/// * `convention` - Axis convention of the camera frame.
///
/// # Returns
///
/// A rigid transform with an orthonormal rotation block and determinant +1.
pub fn world_matrix_in(camera: &Camera, convention: CoordinateConvention) -> Matrix4 {
    let translation = camera.translation();
    let (rotation, translation) = match convention {
        CoordinateConvention::Vision => (camera.rotation, translation),
        CoordinateConvention::Graphics => (
            camera.rotation.flip_yz_rows(),
            linalg::flip_yz(&translation),
        ),
    };

    // the inverse of a rotation is its transpose
    let camera_to_world = rotation.transpose();
    let position = linalg::negate(&camera_to_world.mul_vec(&translation));

    Matrix4::from_rotation_translation(&camera_to_world, &position)
}

/// Horizontal and vertical field of view in radians.
///
/// `angle = 2 * atan(size / (2 * focal_length))`.
///
/// # Errors
///
/// Fails when the focal length is not positive or the image size has not
/// been resolved.
pub fn field_of_view(camera: &Camera) -> Result<(f64, f64), GeometryError> {
    if camera.focal_length <= 0.0 || camera.focal_length.is_nan() {
        return Err(GeometryError::NonPositiveFocalLength(camera.focal_length));
    }

    let (width, height) = camera
        .image_size()
        .ok_or_else(|| GeometryError::MissingImageSize(camera.file_name.clone()))?;

    let angle = |size: u32| 2.0 * (size as f64 / (2.0 * camera.focal_length)).atan();
    Ok((angle(width), angle(height)))
}

/// Orientation block of the camera-to-world transform.
pub fn camera_to_world_rotation(camera: &Camera, convention: CoordinateConvention) -> Matrix3 {
    world_matrix_in(camera, convention).rotation()
}
