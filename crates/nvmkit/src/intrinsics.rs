use std::path::Path;

use nvmkit_3d::camera::Camera;
use nvmkit_io::{
    error::IoError,
    metadata::{read_image_size, ImageSize},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Width used when the image of a camera cannot be found.
pub const DEFAULT_WIDTH: u32 = 1920;

/// Height used when the image of a camera cannot be found.
pub const DEFAULT_HEIGHT: u32 = 1080;

/// How the image size of each camera was obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    /// Cameras whose size was read from the image file.
    pub probed: usize,
    /// Cameras that received the default size.
    pub defaulted: usize,
    /// Cameras that already had a size.
    pub skipped: usize,
}

impl ResolveReport {
    fn record(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Probed => self.probed += 1,
            Outcome::Defaulted => self.defaulted += 1,
            Outcome::Skipped => self.skipped += 1,
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            probed: self.probed + other.probed,
            defaulted: self.defaulted + other.defaulted,
            skipped: self.skipped + other.skipped,
        }
    }

    /// Total number of cameras visited.
    pub fn total(&self) -> usize {
        self.probed + self.defaulted + self.skipped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Probed,
    Defaulted,
    Skipped,
}

/// Fill in the image size of every camera that lacks one.
///
/// The image of each camera is looked up as `images_dir / file_name` and only
/// its header is read. Missing or unreadable images never fail the call: a
/// warning is logged and the default size is used instead.
///
/// Cameras are probed in parallel. Each task writes only to its own camera,
/// so the order of `cameras` is left untouched.
///
/// # Arguments
///
/// * `cameras` - The parsed cameras, updated in place.
/// * `images_dir` - Directory the camera file names are relative to.
/// * `default_width` - Width assigned when the image cannot be read.
/// * `default_height` - Height assigned when the image cannot be read.
///
/// # Returns
///
/// Counts of probed, defaulted and skipped cameras.
pub fn resolve_intrinsics(
    cameras: &mut [Camera],
    images_dir: impl AsRef<Path>,
    default_width: u32,
    default_height: u32,
) -> ResolveReport {
    let images_dir = images_dir.as_ref();
    let default_size = ImageSize {
        width: default_width,
        height: default_height,
    };

    cameras
        .par_iter_mut()
        .map(|camera| resolve_camera(camera, images_dir, default_size))
        .fold(ResolveReport::default, ResolveReport::record)
        .reduce(ResolveReport::default, ResolveReport::merge)
}

/// Single-threaded version of [`resolve_intrinsics`].
pub fn resolve_intrinsics_sequential(
    cameras: &mut [Camera],
    images_dir: impl AsRef<Path>,
    default_width: u32,
    default_height: u32,
) -> ResolveReport {
    let images_dir = images_dir.as_ref();
    let default_size = ImageSize {
        width: default_width,
        height: default_height,
    };

    cameras
        .iter_mut()
        .map(|camera| resolve_camera(camera, images_dir, default_size))
        .fold(ResolveReport::default(), ResolveReport::record)
}

fn resolve_camera(camera: &mut Camera, images_dir: &Path, default_size: ImageSize) -> Outcome {
    if camera.has_image_size() {
        return Outcome::Skipped;
    }

    let image_path = images_dir.join(&camera.file_name);
    let (size, outcome) = match read_image_size(&image_path) {
        Ok(size) => {
            log::debug!(
                "Read size {}x{} from {}",
                size.width,
                size.height,
                image_path.display()
            );
            (size, Outcome::Probed)
        }
        Err(IoError::FileDoesNotExist(path)) => {
            log::warn!(
                "Image {} not found, using default size {}x{}",
                path.display(),
                default_size.width,
                default_size.height
            );
            (default_size, Outcome::Defaulted)
        }
        Err(e) => {
            log::warn!(
                "Cannot read size of {} ({e}), using default size {}x{}",
                image_path.display(),
                default_size.width,
                default_size.height
            );
            (default_size, Outcome::Defaulted)
        }
    };

    camera.width.get_or_insert(size.width);
    camera.height.get_or_insert(size.height);
    outcome
}
