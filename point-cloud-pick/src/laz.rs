use constants::coordinate_system::{survey_to_local, survey_to_scene};
use indicatif::{ProgressBar, ProgressStyle};
use las::Reader;
use point_cloud_hit_test::engine::point_set::PointSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Create LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
pub fn create_reader(file_path: &Path) -> Result<Reader, Box<dyn std::error::Error>> {
    let file = File::open(file_path)?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}

/// Positions of a survey file in local scene space, plus what is needed to map
/// query input and results back to survey coordinates.
pub struct LoadedCloud {
    pub points: PointSet,
    /// Survey coordinates as read, by point index.
    pub survey: Vec<[f64; 3]>,
    /// Scene-space position that local coordinates are relative to.
    pub origin: [f64; 3],
}

impl LoadedCloud {
    /// Survey-space point to local scene space.
    pub fn to_local(&self, survey: [f64; 3]) -> [f32; 3] {
        survey_to_local(survey[0], survey[1], survey[2], self.origin)
    }

    /// Survey-space direction to scene space (no translation).
    pub fn direction_to_local(&self, survey: [f64; 3]) -> [f32; 3] {
        survey_to_scene(survey[0], survey[1], survey[2]).map(|v| v as f32)
    }
}

/// Read every point, keeping f32 precision by expressing positions relative
/// to the header's minimum corner.
pub fn load_cloud(file_path: &Path) -> Result<LoadedCloud, Box<dyn std::error::Error>> {
    let mut reader = create_reader(file_path)?;
    let total_points = reader.header().number_of_points() as usize;
    let min = reader.header().bounds().min;
    let origin = survey_to_scene(min.x, min.y, min.z);

    let pb = ProgressBar::new(total_points as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} points ({percent}%) {msg}")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Loading points");

    let mut survey = Vec::with_capacity(total_points);
    let mut coordinates = Vec::with_capacity(total_points * 3);
    for (idx, point_result) in reader.points().enumerate() {
        let point = point_result?;
        survey.push([point.x, point.y, point.z]);
        coordinates.extend_from_slice(&survey_to_local(point.x, point.y, point.z, origin));

        if idx % 50_000 == 0 {
            pb.set_position(idx as u64);
        }
    }
    pb.finish_with_message("Points loaded");

    Ok(LoadedCloud {
        points: PointSet::new(coordinates)?,
        survey,
        origin,
    })
}
