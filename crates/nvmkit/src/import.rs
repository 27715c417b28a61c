use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use nvmkit_3d::{
    geometry::{self, CoordinateConvention},
    io::nvm::{self, NvmError},
};
use serde::{Deserialize, Serialize};

use crate::{
    intrinsics::{self, ResolveReport, DEFAULT_HEIGHT, DEFAULT_WIDTH},
    scene::SceneSink,
};

/// An error type for the import pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The NVM file could not be read or parsed.
    #[error(transparent)]
    Nvm(#[from] NvmError),

    /// The scene sink rejected an object.
    #[error("Scene sink error: {0}")]
    Sink(Box<dyn std::error::Error + Send + Sync>),
}

/// Options of an NVM import.
///
/// Deserializes from a partial document, missing fields take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Add the cameras to the scene.
    pub import_cameras: bool,
    /// Add the point cloud to the scene.
    pub import_points: bool,
    /// Width used for cameras whose image is not found.
    pub default_width: u32,
    /// Height used for cameras whose image is not found.
    pub default_height: u32,
    /// Axis convention of the camera frames handed to the sink.
    pub convention: CoordinateConvention,
    /// Probe the images in parallel.
    pub parallel: bool,
    /// Directory of the images. Defaults to the directory of the NVM file.
    pub images_dir: Option<PathBuf>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            import_cameras: true,
            import_points: true,
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
            convention: CoordinateConvention::Graphics,
            parallel: true,
            images_dir: None,
        }
    }
}

/// What an import added to the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Number of cameras in the model
    pub num_cameras: usize,
    /// Number of points in the model
    pub num_points: usize,
    /// How the image sizes were obtained
    pub resolve: ResolveReport,
    /// Cameras added without a field of view, e.g. with an unknown focal length
    pub cameras_without_fov: usize,
    /// Whether the file holds models that were not imported
    pub has_additional_models: bool,
}

/// Import the first model of an NVM file into a scene.
///
/// The file is parsed, the image size of every camera is resolved, then the
/// point cloud and the cameras are handed to `sink`. Nothing reaches the
/// sink if the file is malformed. Cameras without a usable focal length are
/// still placed, with a warning.
///
/// # Arguments
///
/// * `path` - The path to the .nvm file.
/// * `options` - What to import and how.
/// * `sink` - The scene receiving the objects.
pub fn import_nvm<S: SceneSink>(
    path: impl AsRef<Path>,
    options: &ImportOptions,
    sink: &mut S,
) -> Result<ImportSummary, ImportError> {
    let path = path.as_ref();
    log::info!("Importing {}", path.display());

    let mut model = nvm::read_nvm(path)?;
    log::info!("Number cameras: {}", model.cameras.len());
    log::info!("Number points: {}", model.points.len());

    let images_dir = match &options.images_dir {
        Some(dir) => dir.clone(),
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let resolve = match options.parallel {
        true => intrinsics::resolve_intrinsics(
            &mut model.cameras,
            &images_dir,
            options.default_width,
            options.default_height,
        ),
        false => intrinsics::resolve_intrinsics_sequential(
            &mut model.cameras,
            &images_dir,
            options.default_width,
            options.default_height,
        ),
    };
    if resolve.defaulted > 0 {
        log::warn!(
            "{} of {} cameras use the default image size",
            resolve.defaulted,
            resolve.total()
        );
    }

    if options.import_points {
        let start = Instant::now();
        sink.add_point_cloud(&model.points)
            .map_err(|e| ImportError::Sink(Box::new(e)))?;
        log::info!("Adding points took {:?}", start.elapsed());
    }

    let mut cameras_without_fov = 0;
    if options.import_cameras {
        let start = Instant::now();
        for camera in &model.cameras {
            if let Err(e) = geometry::field_of_view(camera) {
                log::warn!("{}: {e}", camera.file_name);
                cameras_without_fov += 1;
            }
            let world_matrix = geometry::world_matrix_in(camera, options.convention);
            sink.add_camera(&camera.name(), camera, &world_matrix)
                .map_err(|e| ImportError::Sink(Box::new(e)))?;
        }
        log::info!("Adding cameras took {:?}", start.elapsed());
    }

    Ok(ImportSummary {
        num_cameras: model.cameras.len(),
        num_points: model.points.len(),
        resolve,
        cameras_without_fov,
        has_additional_models: model.has_additional_models,
    })
}

/// Import several NVM files into the same scene, in order.
///
/// Stops at the first file that fails.
pub fn import_nvm_files<S, P>(
    paths: impl IntoIterator<Item = P>,
    options: &ImportOptions,
    sink: &mut S,
) -> Result<Vec<ImportSummary>, ImportError>
where
    S: SceneSink,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|path| import_nvm(path, options, &mut *sink))
        .collect()
}
