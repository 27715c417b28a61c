use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IoError;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Read the dimensions of an image file without decoding its pixels.
///
/// The format is guessed from the file content, so the extension does not
/// need to match.
///
/// # Arguments
///
/// * `path` - Path to an image file in any format supported by `image`.
///
/// # Returns
///
/// The image width and height.
///
/// # Example
///
/// ```no_run
/// use nvmkit_io::metadata::read_image_size;
///
/// let size = read_image_size("photo.jpg")?;
/// println!("{}x{}", size.width, size.height);
/// # Ok::<(), nvmkit_io::error::IoError>(())
/// ```
pub fn read_image_size<P: AsRef<Path>>(path: P) -> Result<ImageSize, IoError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(IoError::FileDoesNotExist(path.to_path_buf()));
    }

    // only the header is parsed here
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;

    Ok(ImageSize { width, height })
}
