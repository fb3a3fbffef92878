//! Recorded-frame loading.
//!
//! A frame file is JSON holding either one [`SensorFrame`] object or an
//! array of them.  Frames from several files are concatenated in argument
//! order and then sorted by `timestamp_s`.

use pathsense_types::{PathSenseError, SensorFrame};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameFile {
    Many(Vec<SensorFrame>),
    One(Box<SensorFrame>),
}

/// Parse the contents of one frame file.
pub fn parse_frames(raw: &str) -> Result<Vec<SensorFrame>, PathSenseError> {
    let file: FrameFile = serde_json::from_str(raw)
        .map_err(|e| PathSenseError::Serialization(format!("Failed to parse frames: {}", e)))?;
    Ok(match file {
        FrameFile::Many(frames) => frames,
        FrameFile::One(frame) => vec![*frame],
    })
}

/// Read and parse one frame file.
pub fn load_frames(path: &Path) -> Result<Vec<SensorFrame>, PathSenseError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        PathSenseError::Io(format!("Failed to read frames at {}: {}", path.display(), e))
    })?;
    parse_frames(&raw)
}

/// Load every file and return the frames in capture order.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SensorFrame>, PathSenseError> {
    let mut frames = Vec::new();
    for path in paths {
        frames.extend(load_frames(path.as_ref())?);
    }
    frames.sort_by(|a, b| a.timestamp_s.total_cmp(&b.timestamp_s));
    Ok(frames)
}
