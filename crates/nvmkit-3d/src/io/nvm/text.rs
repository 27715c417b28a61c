use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::Path,
};

use super::{
    NvmCalibration, NvmError, NvmFormat, NvmModel, FIXED_K_ANNOTATION, NVM_V3_R9T_SIGNATURE,
    NVM_V3_SIGNATURE,
};
use crate::{
    camera::Camera,
    linalg::{self, Matrix3},
    point::{Measurement, Point},
    transforms,
};

/// Upper bound on the capacity reserved up front from a declared count.
const MAX_PREALLOCATED_RECORDS: usize = 1 << 20;

/// Tolerance on `R * R^T - I` for rotation matrices stored in the file.
const ROTATION_TOLERANCE: f64 = 1e-3;

/// Number of tokens before the measurements of a point record.
const POINT_HEADER_LEN: usize = 7;

/// Read an NVM file and return its cameras and points.
///
/// Only the first model of the file is read.
///
/// # Arguments
///
/// * `path` - The path to the .nvm file.
///
/// # Returns
///
/// The cameras and the points of the first model, in file order.
pub fn parse_nvm_file(path: impl AsRef<Path>) -> Result<(Vec<Camera>, Vec<Point>), NvmError> {
    let model = read_nvm(path)?;
    Ok((model.cameras, model.points))
}

/// Read the first model of an NVM file.
///
/// # Arguments
///
/// * `path` - The path to the .nvm file.
///
/// # Returns
///
/// The parsed model. Nothing is returned if any record is malformed.
pub fn read_nvm(path: impl AsRef<Path>) -> Result<NvmModel, NvmError> {
    // open the file and create a buffered reader
    let file = File::open(path)?;
    read_nvm_from_reader(BufReader::new(file))
}

/// Read the first model of an NVM file from a buffered reader.
///
/// The header line selects the camera record layout, an optional `FixedK`
/// annotation declares shared intrinsics. Any further model in the stream
/// is detected and reported through [`NvmModel::has_additional_models`]
/// but never parsed.
pub fn read_nvm_from_reader<R: BufRead>(reader: R) -> Result<NvmModel, NvmError> {
    let mut records = Records::new(reader);

    let (line, header) = records.expect_record("NVM header")?;
    let (format, calibration) = parse_header(line, &header)?;
    log::debug!("NVM header: {} (fixed calibration: {:?})", format.signature(), calibration);

    // cameras
    let num_cameras = records.expect_count("camera count")?;
    let mut cameras = Vec::with_capacity(num_cameras.min(MAX_PREALLOCATED_RECORDS));
    for index in 0..num_cameras {
        let (line, record) = records.expect_record(&format!("camera {index}"))?;
        cameras.push(parse_camera_line(format, index, line, &record)?);
    }

    // points
    let num_points = records.expect_count("point count")?;
    let mut points = Vec::with_capacity(num_points.min(MAX_PREALLOCATED_RECORDS));
    for index in 0..num_points {
        let (line, record) = records.expect_record(&format!("point {index}"))?;
        points.push(parse_point_line(index, line, &record, num_cameras)?);
    }

    // a positive count here is the camera count of a further model
    let has_additional_models = match records.next_record()? {
        Some((_, record)) => record
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<i64>().ok())
            .is_some_and(|count| count > 0),
        None => false,
    };
    if has_additional_models {
        log::warn!("NVM file contains more than one model, only the first one is read");
    }

    Ok(NvmModel {
        format,
        calibration,
        cameras,
        points,
        has_additional_models,
    })
}

/// Non-empty lines of the input along with their 1-based line numbers.
struct Records<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> Records<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    fn next_record(&mut self) -> Result<Option<(usize, String)>, NvmError> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            if !line.trim().is_empty() {
                return Ok(Some((self.line_no, line)));
            }
        }
        Ok(None)
    }

    fn expect_record(&mut self, what: &str) -> Result<(usize, String), NvmError> {
        self.next_record()?.ok_or_else(|| {
            NvmError::format(self.line_no, format!("unexpected end of file, expected {what}"))
        })
    }

    fn expect_count(&mut self, what: &str) -> Result<usize, NvmError> {
        let (line, record) = self.expect_record(what)?;
        let parts = record.split_whitespace().collect::<Vec<_>>();
        if parts.len() != 1 {
            return Err(NvmError::format(
                line,
                format!("{what}: expected a single integer, found {} tokens", parts.len()),
            ));
        }
        parse_count(parts[0], line, what)
    }
}

/// Parse a token, naming the record and field on failure.
fn parse_part<T: std::str::FromStr>(s: &str, line: usize, field: &str) -> Result<T, NvmError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| NvmError::format(line, format!("{field}: invalid value \"{s}\": {e}")))
}

/// Parse a signed integer token that must fit in `0..=usize::MAX`.
fn parse_count(s: &str, line: usize, field: &str) -> Result<usize, NvmError> {
    let value = parse_part::<i64>(s, line, field)?;
    usize::try_from(value)
        .map_err(|_| NvmError::format(line, format!("{field}: out of range value {value}")))
}

/// Parse a float token, rejecting `inf`, `nan` and values that overflow to infinity.
fn parse_float(s: &str, line: usize, field: &str) -> Result<f64, NvmError> {
    let value = parse_part::<f64>(s, line, field)?;
    match value.is_finite() {
        true => Ok(value),
        false => Err(NvmError::format(
            line,
            format!("{field}: non-finite value \"{s}\""),
        )),
    }
}

fn parse_floats<const N: usize>(
    parts: &[&str],
    line: usize,
    field: &str,
) -> Result<[f64; N], NvmError> {
    let mut out = [0.0; N];
    for (i, (dst, s)) in out.iter_mut().zip(parts).enumerate() {
        *dst = parse_float(s, line, &format!("{field}[{i}]"))?;
    }
    Ok(out)
}

/// Parse the header line: `NVM_V3[_R9T] [FixedK fx cx fy cy]`.
fn parse_header(
    line: usize,
    header: &str,
) -> Result<(NvmFormat, Option<NvmCalibration>), NvmError> {
    let parts = header.split_whitespace().collect::<Vec<_>>();

    let format = match parts.first().copied() {
        Some(NVM_V3_SIGNATURE) => NvmFormat::Quaternion,
        Some(NVM_V3_R9T_SIGNATURE) => NvmFormat::RotationTranslation,
        Some(other) => {
            return Err(NvmError::format(
                line,
                format!("invalid NVM signature \"{other}\""),
            ))
        }
        None => return Err(NvmError::format(line, "missing NVM signature")),
    };

    let calibration = match &parts[1..] {
        [] => None,
        [FIXED_K_ANNOTATION, params @ ..] => {
            if params.len() != 4 {
                return Err(NvmError::format(
                    line,
                    format!("FixedK: expected 4 values, found {}", params.len()),
                ));
            }
            let [fx, cx, fy, cy] = parse_floats::<4>(params, line, "FixedK")?;
            Some(NvmCalibration { fx, cx, fy, cy })
        }
        [other, ..] => {
            return Err(NvmError::format(
                line,
                format!("unexpected header token \"{other}\""),
            ))
        }
    };

    Ok((format, calibration))
}

/// Parse a camera line and return a Camera struct.
/// NOTE: The layout depends on the header signature.
///       NVM_V3:     FILE, FOCAL, QW, QX, QY, QZ, CX, CY, CZ, K1, 0
///       NVM_V3_R9T: FILE, FOCAL, R00 .. R22, TX, TY, TZ, K1, 0
fn parse_camera_line(
    format: NvmFormat,
    index: usize,
    line: usize,
    record: &str,
) -> Result<Camera, NvmError> {
    // split the line into parts by whitespace
    let parts = record.split_whitespace().collect::<Vec<_>>();
    let what = format!("camera {index}");

    if parts.len() != format.camera_record_len() {
        return Err(NvmError::format(
            line,
            format!(
                "{what}: expected {} tokens, found {}",
                format.camera_record_len(),
                parts.len()
            ),
        ));
    }

    let file_name = parts[0].to_string();
    let focal_length = parse_float(parts[1], line, &format!("{what} focal length"))?;

    let (quaternion, rotation, center, tail) = match format {
        NvmFormat::Quaternion => {
            let q = parse_floats::<4>(&parts[2..6], line, &format!("{what} quaternion"))?;
            let quaternion = transforms::normalize_quaternion(&q).ok_or_else(|| {
                NvmError::format(line, format!("{what}: degenerate quaternion {q:?}"))
            })?;
            let rotation = transforms::quaternion_to_rotation_matrix(&quaternion)
                .map_err(|e| NvmError::format(line, format!("{what}: {e}")))?;
            let center = parse_floats::<3>(&parts[6..9], line, &format!("{what} center"))?;
            (quaternion, rotation, center, &parts[9..])
        }
        NvmFormat::RotationTranslation => {
            let r = parse_floats::<9>(&parts[2..11], line, &format!("{what} rotation"))?;
            let rotation = Matrix3([[r[0], r[1], r[2]], [r[3], r[4], r[5]], [r[6], r[7], r[8]]]);
            if !rotation.is_rotation(ROTATION_TOLERANCE) {
                return Err(NvmError::format(
                    line,
                    format!("{what}: rotation matrix is not orthonormal"),
                ));
            }
            let translation =
                parse_floats::<3>(&parts[11..14], line, &format!("{what} translation"))?;
            // re-orthonormalize through the quaternion
            let quaternion = transforms::rotation_matrix_to_quaternion(&rotation);
            let rotation = transforms::quaternion_to_rotation_matrix(&quaternion)
                .map_err(|e| NvmError::format(line, format!("{what}: {e}")))?;
            // C = -R^T * t
            let center = linalg::negate(&rotation.transpose().mul_vec(&translation));
            (quaternion, rotation, center, &parts[14..])
        }
    };

    Ok(Camera {
        file_name,
        focal_length,
        quaternion,
        rotation,
        center,
        radial_distortion: parse_float(tail[0], line, &format!("{what} radial distortion"))?,
        reserved: parse_part(tail[1], line, &format!("{what} reserved field"))?,
        width: None,
        height: None,
    })
}

/// Parse a point line and return a Point struct.
/// NOTE: The number of tokens depends on the number of measurements.
///       X, Y, Z, R, G, B, N, MEASUREMENT[0], MEASUREMENT[1], ...
///       where each measurement is IMAGE_INDEX, FEATURE_INDEX[, U, V]
fn parse_point_line(
    index: usize,
    line: usize,
    record: &str,
    num_cameras: usize,
) -> Result<Point, NvmError> {
    // split the line into parts by whitespace
    let parts = record.split_whitespace().collect::<Vec<_>>();
    let what = format!("point {index}");

    if parts.len() < POINT_HEADER_LEN {
        return Err(NvmError::format(
            line,
            format!(
                "{what}: expected at least {POINT_HEADER_LEN} tokens, found {}",
                parts.len()
            ),
        ));
    }

    let coord = parse_floats::<3>(&parts[0..3], line, &format!("{what} coord"))?;

    let mut color = [0u8; 3];
    for (i, (dst, s)) in color.iter_mut().zip(&parts[3..6]).enumerate() {
        let field = format!("{what} color[{i}]");
        let value = parse_part::<i64>(s, line, &field)?;
        *dst = u8::try_from(value)
            .map_err(|_| NvmError::format(line, format!("{field}: out of range value {value}")))?;
    }

    let num_views = parse_count(parts[6], line, &format!("{what} measurement count"))?;
    let measurements = &parts[POINT_HEADER_LEN..];

    // each measurement has 4 tokens with image locations, 2 without
    let stride = match measurements.len() {
        n if num_views == 0 && n == 0 => 2,
        n if num_views.checked_mul(4) == Some(n) => 4,
        n if num_views.checked_mul(2) == Some(n) => 2,
        n => {
            return Err(NvmError::format(
                line,
                format!("{what}: {num_views} measurements do not match {n} remaining tokens"),
            ))
        }
    };

    let view_list = measurements
        .chunks_exact(stride)
        .enumerate()
        .map(|(k, chunk)| -> Result<Measurement, NvmError> {
            let field = format!("{what} measurement {k}");
            let camera_index = parse_count(chunk[0], line, &format!("{field} camera index"))?;
            if camera_index >= num_cameras {
                return Err(NvmError::format(
                    line,
                    format!("{field}: camera index {camera_index} out of range 0..{num_cameras}"),
                ));
            }
            let feature_index = parse_count(chunk[1], line, &format!("{field} feature index"))?;
            let image_point = match stride {
                4 => Some(parse_floats::<2>(&chunk[2..4], line, &format!("{field} image point"))?),
                _ => None,
            };
            Ok(Measurement {
                camera_index,
                feature_index,
                image_point,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Point {
        coord,
        color,
        view_list,
    })
}
