use serde::{Deserialize, Serialize};

use crate::{camera::Camera, point::Point};

/// Signature of the classic quaternion-based NVM file.
pub const NVM_V3_SIGNATURE: &str = "NVM_V3";

/// Signature of the NVM variant storing rotation matrices and translations.
pub const NVM_V3_R9T_SIGNATURE: &str = "NVM_V3_R9T";

/// Annotation on the header line introducing shared intrinsics.
pub const FIXED_K_ANNOTATION: &str = "FixedK";

/// Layout of the camera records, selected by the header signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NvmFormat {
    /// `file focal qw qx qy qz cx cy cz k1 0`
    Quaternion,
    /// `file focal r00 r01 .. r22 tx ty tz k1 0`
    RotationTranslation,
}

impl NvmFormat {
    /// Number of tokens in a camera record, file name included.
    pub fn camera_record_len(&self) -> usize {
        match self {
            NvmFormat::Quaternion => 11,
            NvmFormat::RotationTranslation => 16,
        }
    }

    /// Header signature of the format.
    pub fn signature(&self) -> &'static str {
        match self {
            NvmFormat::Quaternion => NVM_V3_SIGNATURE,
            NvmFormat::RotationTranslation => NVM_V3_R9T_SIGNATURE,
        }
    }
}

/// Intrinsics shared by all cameras, from a `FixedK` header annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NvmCalibration {
    /// Focal length along x
    pub fx: f64,
    /// Principal point x
    pub cx: f64,
    /// Focal length along y
    pub fy: f64,
    /// Principal point y
    pub cy: f64,
}

/// The first model of an NVM file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NvmModel {
    /// Camera record layout
    pub format: NvmFormat,
    /// Shared intrinsics, if the header declares them
    pub calibration: Option<NvmCalibration>,
    /// Cameras in file order
    pub cameras: Vec<Camera>,
    /// Points in file order
    pub points: Vec<Point>,
    /// Whether further models follow the first one. They are not read.
    pub has_additional_models: bool,
}
