use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::linalg::{self, Matrix3};

/// Suffix appended to the image file stem to name a camera in a scene.
pub const CAMERA_NAME_SUFFIX: &str = "_cam";

/// A reconstructed view, as stored in a structure-from-motion model.
///
/// The rotation maps world coordinates into the camera frame
/// (`x_cam = R * (X - C)`), and `center` is the camera position `C` in
/// world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Image path as recorded in the model file. May be relative.
    pub file_name: String,
    /// Focal length in pixels. Zero means the intrinsics are unknown.
    pub focal_length: f64,
    /// Unit quaternion `[w, x, y, z]` of the world-to-camera rotation.
    pub quaternion: [f64; 4],
    /// World-to-camera rotation matrix. Always a proper rotation.
    pub rotation: Matrix3,
    /// Camera position in world coordinates.
    pub center: [f64; 3],
    /// Single-parameter radial distortion coefficient.
    pub radial_distortion: f64,
    /// Reserved trailing field of the camera record, kept for fidelity.
    pub reserved: i64,
    /// Image width in pixels, once known.
    pub width: Option<u32>,
    /// Image height in pixels, once known.
    pub height: Option<u32>,
}

impl Camera {
    /// Translation of the world-to-camera transform, `t = -R * C`.
    pub fn translation(&self) -> [f64; 3] {
        linalg::negate(&self.rotation.mul_vec(&self.center))
    }

    /// Whether both image dimensions are known.
    pub fn has_image_size(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Image size as `(width, height)` if both are known.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    /// Whether the camera carries everything needed to build a pinhole model.
    pub fn has_intrinsics(&self) -> bool {
        self.focal_length > 0.0 && self.has_image_size()
    }

    /// Scene name of the camera: the image file stem followed by `_cam`.
    pub fn name(&self) -> String {
        let stem = Path::new(&self.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.clone());
        format!("{stem}{CAMERA_NAME_SUFFIX}")
    }

    /// Pinhole calibration matrix `K`.
    ///
    /// # Arguments
    ///
    /// * `principal_point` - Optional `(cx, cy)`. Defaults to the image center.
    ///
    /// # Returns
    ///
    /// `None` when no principal point is given and the image size is unknown.
    pub fn calibration_matrix(&self, principal_point: Option<(f64, f64)>) -> Option<Matrix3> {
        let (cx, cy) = match principal_point {
            Some(pp) => pp,
            None => {
                let (w, h) = self.image_size()?;
                (w as f64 / 2.0, h as f64 / 2.0)
            }
        };
        let f = self.focal_length;
        Some(Matrix3([[f, 0.0, cx], [0.0, f, cy], [0.0, 0.0, 1.0]]))
    }
}
