use argh::FromArgs;
use serde::Serialize;
use std::path::PathBuf;

use nvmkit::{
    import::{self, ImportOptions, ImportSummary},
    k3d::geometry::CoordinateConvention,
    scene::SceneRecorder,
};

#[derive(FromArgs)]
/// Import VisualSFM NVM files and dump the resulting scene as JSON
struct Args {
    /// path to the input .nvm files
    #[argh(positional)]
    nvm_paths: Vec<PathBuf>,

    /// path to a JSON file with the import options
    #[argh(option)]
    config: Option<PathBuf>,

    /// directory of the images, defaults to the directory of each file
    #[argh(option)]
    images_dir: Option<PathBuf>,

    /// width used when an image is not found
    #[argh(option)]
    default_width: Option<u32>,

    /// height used when an image is not found
    #[argh(option)]
    default_height: Option<u32>,

    /// keep the computer vision camera frame (y down, z forward)
    #[argh(switch)]
    vision: bool,

    /// skip the point cloud
    #[argh(switch)]
    no_points: bool,

    /// skip the cameras
    #[argh(switch)]
    no_cameras: bool,

    /// write the scene to this file instead of stdout
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    files: Vec<ImportSummary>,
    scene: &'a SceneRecorder,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.nvm_paths.is_empty() {
        return Err("no input .nvm file given".into());
    }

    // file options first, command line flags override them
    let mut options: ImportOptions = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => ImportOptions::default(),
    };
    if let Some(dir) = args.images_dir {
        options.images_dir = Some(dir);
    }
    if let Some(width) = args.default_width {
        options.default_width = width;
    }
    if let Some(height) = args.default_height {
        options.default_height = height;
    }
    if args.vision {
        options.convention = CoordinateConvention::Vision;
    }
    options.import_points &= !args.no_points;
    options.import_cameras &= !args.no_cameras;
    log::debug!("Import options: {options:?}");

    let mut scene = SceneRecorder::default();
    let files = import::import_nvm_files(&args.nvm_paths, &options, &mut scene)?;

    // keep stdout for the JSON document
    for (path, summary) in args.nvm_paths.iter().zip(&files) {
        eprintln!(
            "{}: #{} cameras ({} probed, {} defaulted), #{} points{}",
            path.display(),
            summary.num_cameras,
            summary.resolve.probed,
            summary.resolve.defaulted,
            summary.num_points,
            if summary.has_additional_models {
                ", further models skipped"
            } else {
                ""
            }
        );
    }

    let report = Report {
        files,
        scene: &scene,
    };
    match args.output {
        Some(path) => std::fs::write(path, serde_json::to_string_pretty(&report)?)?,
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
