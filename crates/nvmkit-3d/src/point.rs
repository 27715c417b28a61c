use serde::{Deserialize, Serialize};

/// One observation of a 3D point in a reconstructed view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Index into the camera list of the model.
    pub camera_index: usize,
    /// Index of the SIFT feature in that image.
    pub feature_index: usize,
    /// Feature location in the image, if the file records it.
    pub image_point: Option<[f64; 2]>,
}

/// A sparse reconstructed point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// World position.
    pub coord: [f64; 3],
    /// RGB color.
    pub color: [u8; 3],
    /// Views observing the point, in file order.
    pub view_list: Vec<Measurement>,
}

impl Point {
    /// Color with each channel scaled to `[0, 1]`.
    pub fn normalized_color(&self) -> [f32; 3] {
        self.color.map(|c| c as f32 / 255.0)
    }

    /// Camera indices of the views observing the point.
    pub fn camera_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.view_list.iter().map(|m| m.camera_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point() {
        let point = Point {
            coord: [0.5, -1.0, 2.0],
            color: [255, 0, 51],
            view_list: vec![
                Measurement {
                    camera_index: 2,
                    feature_index: 10,
                    image_point: None,
                },
                Measurement {
                    camera_index: 0,
                    feature_index: 7,
                    image_point: Some([1.5, -3.0]),
                },
            ],
        };

        assert_eq!(point.normalized_color(), [1.0, 0.0, 0.2]);
        assert_eq!(point.camera_indices().collect::<Vec<_>>(), vec![2, 0]);
    }
}
