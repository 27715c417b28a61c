use std::path::Path;

use approx::assert_relative_eq;
use nvmkit::{
    import::{import_nvm, import_nvm_files, ImportError, ImportOptions},
    intrinsics::ResolveReport,
    k3d::{
        camera::Camera,
        geometry::{self, CoordinateConvention},
        linalg::Matrix4,
        point::Point,
    },
    scene::{SceneRecorder, SceneSink},
};

const MODEL: &str = "NVM_V3

2
a.png 800 1 0 0 0 0 0 0 0 0
missing/b.jpg 1000 0.7071067811865476 0 0.7071067811865476 0 1 2 3 -0.05 0

2
0.0 0.0 5.0 255 0 0 2 0 1 3.5 4.5 1 2 -1.0 0.5
1.0 1.0 6.0 0 255 0 1 1 9 0 0

0
";

fn write_model(dir: &Path, content: &str) -> Result<std::path::PathBuf, std::io::Error> {
    let path = dir.join("model.nvm");
    std::fs::write(&path, content)?;
    Ok(path)
}

#[test]
fn import_model_into_recorder() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    image::RgbImage::new(64, 48).save(dir.path().join("a.png"))?;
    let path = write_model(dir.path(), MODEL)?;

    let mut scene = SceneRecorder::default();
    let summary = import_nvm(&path, &ImportOptions::default(), &mut scene)?;

    assert_eq!(summary.num_cameras, 2);
    assert_eq!(summary.num_points, 2);
    assert!(!summary.has_additional_models);
    assert_eq!(
        summary.resolve,
        ResolveReport {
            probed: 1,
            defaulted: 1,
            skipped: 0
        }
    );

    assert_eq!(scene.points.len(), 2);
    assert_eq!(scene.points[1].color, [0, 255, 0]);

    let names = scene.cameras.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["a_cam", "b_cam"]);

    let a = &scene.cameras[0];
    assert_eq!(a.camera.image_size(), Some((64, 48)));
    assert_relative_eq!(a.angle_x.unwrap_or_default(), 2.0 * (64.0f64 / 1600.0).atan());
    assert_relative_eq!(a.angle_y.unwrap_or_default(), 2.0 * (48.0f64 / 1600.0).atan());

    let b = &scene.cameras[1];
    assert_eq!(b.camera.image_size(), Some((1920, 1080)));
    let t = b.world_matrix.translation();
    for i in 0..3 {
        assert_relative_eq!(t[i], b.camera.center[i], epsilon = 1e-12);
    }
    assert!(b.world_matrix.rotation().is_rotation(1e-9));

    // cameras keep their file order and index the point visibility lists
    for point in &scene.points {
        assert!(point.camera_indices().all(|i| i < scene.cameras.len()));
    }
    Ok(())
}

#[test]
fn vision_convention_keeps_identity() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_model(dir.path(), "NVM_V3\n1\nimg.jpg 1000.0 1 0 0 0 0 0 0 0.0 0\n0\n")?;

    let options = ImportOptions {
        convention: CoordinateConvention::Vision,
        ..Default::default()
    };
    let mut scene = SceneRecorder::default();
    import_nvm(&path, &options, &mut scene)?;
    assert_eq!(scene.cameras[0].world_matrix, Matrix4::IDENTITY);

    let mut scene = SceneRecorder::default();
    import_nvm(&path, &ImportOptions::default(), &mut scene)?;
    let m = scene.cameras[0].world_matrix;
    assert_relative_eq!(m.get(1, 1), -1.0);
    assert_relative_eq!(m.get(2, 2), -1.0);
    assert_relative_eq!(m.rotation().determinant(), 1.0);
    Ok(())
}

#[test]
fn malformed_file_reaches_no_sink() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_model(dir.path(), "NVM_V2\n1\nimg.jpg 1000.0 1 0 0 0 0 0 0 0.0 0\n0\n")?;

    let mut scene = SceneRecorder::default();
    let result = import_nvm(&path, &ImportOptions::default(), &mut scene);
    assert!(matches!(result, Err(ImportError::Nvm(_))));
    assert_eq!(scene, SceneRecorder::default());
    Ok(())
}

#[test]
fn unknown_focal_length_degrades() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_model(
        dir.path(),
        "NVM_V3\n2\nimg.jpg 0 1 0 0 0 0 0 0 0.0 0\nok.jpg 1000 1 0 0 0 1 2 3 0.0 0\n\
         1\n0 0 0 1 2 3 2 0 0 1 0\n",
    )?;

    let mut scene = SceneRecorder::default();
    let summary = import_nvm(&path, &ImportOptions::default(), &mut scene)?;
    assert_eq!(summary.num_cameras, 2);
    assert_eq!(summary.num_points, 1);
    assert_eq!(summary.cameras_without_fov, 1);

    // the point cloud and every camera reach the sink
    assert_eq!(scene.points.len(), 1);
    assert_eq!(scene.cameras.len(), 2);

    let unknown = &scene.cameras[0];
    assert_eq!(unknown.name, "img_cam");
    assert_eq!(unknown.angle_x, None);
    assert_eq!(unknown.angle_y, None);
    assert!(unknown.world_matrix.rotation().is_rotation(1e-9));

    let known = &scene.cameras[1];
    assert_eq!(known.name, "ok_cam");
    assert_relative_eq!(
        known.angle_x.unwrap_or_default(),
        2.0 * (1920.0f64 / 2000.0).atan()
    );
    assert_eq!(known.world_matrix.translation(), [1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn images_dir_override() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let images = tempfile::tempdir()?;
    image::GrayImage::new(10, 20).save(images.path().join("img.png"))?;
    let path = write_model(dir.path(), "NVM_V3\n1\nimg.png 50 1 0 0 0 0 0 0 0.0 0\n0\n")?;

    let options = ImportOptions {
        images_dir: Some(images.path().to_path_buf()),
        parallel: false,
        import_points: false,
        ..Default::default()
    };
    let mut scene = SceneRecorder::default();
    let summary = import_nvm(&path, &options, &mut scene)?;
    assert_eq!(summary.resolve.probed, 1);
    assert_eq!(scene.cameras[0].camera.image_size(), Some((10, 20)));
    Ok(())
}

#[test]
fn multiple_files_and_additional_models() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("first.nvm");
    let second = dir.path().join("second.nvm");
    std::fs::write(&first, MODEL)?;
    std::fs::write(
        &second,
        "NVM_V3\n1\nc.jpg 900 1 0 0 0 0 0 0 0 0\n0\n\n1\nd.jpg 900 1 0 0 0 0 0 0 0 0\n0\n",
    )?;

    let mut scene = SceneRecorder::default();
    let summaries = import_nvm_files([&first, &second], &ImportOptions::default(), &mut scene)?;
    assert_eq!(summaries.len(), 2);
    assert!(!summaries[0].has_additional_models);
    assert!(summaries[1].has_additional_models);
    assert_eq!(scene.cameras.len(), 3);
    assert_eq!(scene.cameras[2].name, "c_cam");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("scene is read-only")]
struct ReadOnly;

struct ReadOnlyScene;

impl SceneSink for ReadOnlyScene {
    type Error = ReadOnly;

    fn add_camera(&mut self, _: &str, _: &Camera, _: &Matrix4) -> Result<(), ReadOnly> {
        Err(ReadOnly)
    }

    fn add_point_cloud(&mut self, _: &[Point]) -> Result<(), ReadOnly> {
        Err(ReadOnly)
    }
}

#[test]
fn sink_errors_are_propagated() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_model(dir.path(), MODEL)?;

    let result = import_nvm(&path, &ImportOptions::default(), &mut ReadOnlyScene);
    match result {
        Err(ImportError::Sink(e)) => assert_eq!(e.to_string(), "scene is read-only"),
        other => panic!("expected a sink error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn field_of_view_after_resolution() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_model(dir.path(), MODEL)?;

    let (mut cameras, _) = nvmkit::k3d::io::nvm::parse_nvm_file(&path)?;
    assert!(geometry::field_of_view(&cameras[0]).is_err());

    nvmkit::intrinsics::resolve_intrinsics(&mut cameras, dir.path(), 2000, 1000);
    let (ax, _) = geometry::field_of_view(&cameras[1])?;
    assert_relative_eq!(ax, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    Ok(())
}
