use std::convert::Infallible;

use nvmkit_3d::{camera::Camera, linalg::Matrix4, point::Point};
use serde::{Deserialize, Serialize};

/// A scene graph that receives the imported reconstruction.
///
/// Each host environment provides its own adapter. The importer never
/// mutates anything but the sink it is handed.
pub trait SceneSink {
    /// Error returned by the host when an object cannot be created.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Add a camera placed at `world_matrix` (camera-to-world).
    fn add_camera(
        &mut self,
        name: &str,
        camera: &Camera,
        world_matrix: &Matrix4,
    ) -> Result<(), Self::Error>;

    /// Add the sparse point cloud.
    fn add_point_cloud(&mut self, points: &[Point]) -> Result<(), Self::Error>;
}

/// A camera as handed to a [`SceneRecorder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCamera {
    /// Scene object name
    pub name: String,
    /// Camera-to-world transform
    pub world_matrix: Matrix4,
    /// Horizontal field of view in radians, if it can be computed
    pub angle_x: Option<f64>,
    /// Vertical field of view in radians, if it can be computed
    pub angle_y: Option<f64>,
    /// The camera record
    pub camera: Camera,
}

/// In-memory sink that keeps everything it receives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneRecorder {
    /// Cameras in the order they were added
    pub cameras: Vec<SceneCamera>,
    /// Points of every added point cloud
    pub points: Vec<Point>,
}

impl SceneSink for SceneRecorder {
    type Error = Infallible;

    fn add_camera(
        &mut self,
        name: &str,
        camera: &Camera,
        world_matrix: &Matrix4,
    ) -> Result<(), Self::Error> {
        let fov = nvmkit_3d::geometry::field_of_view(camera).ok();
        self.cameras.push(SceneCamera {
            name: name.to_string(),
            world_matrix: *world_matrix,
            angle_x: fov.map(|(x, _)| x),
            angle_y: fov.map(|(_, y)| y),
            camera: camera.clone(),
        });
        Ok(())
    }

    fn add_point_cloud(&mut self, points: &[Point]) -> Result<(), Self::Error> {
        self.points.extend_from_slice(points);
        Ok(())
    }
}
