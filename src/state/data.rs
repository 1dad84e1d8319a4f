/// Shared data structures for the gallery
///
/// These structs represent the data model that flows between
/// the persistence layer, the view controller and the UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable image identifier derived from manifest position (index + 1).
///
/// Persisted as a decimal string so stored maps read `{"1": ..., "2": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u32);

impl ImageId {
    /// Id for the manifest entry at `index` (0-based)
    pub fn from_position(index: usize) -> Self {
        ImageId(index as u32 + 1)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single comment attached to an image. Never edited once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    /// RFC 3339 timestamp in UTC
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    /// Create a comment stamped with the current time
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Represents a single image in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Position-derived id, never changes once assigned
    pub id: ImageId,
    /// Filename relative to the images directory (e.g., "cat_park.jpg")
    pub filename: String,
    /// Display name derived from the filename
    pub name: String,
    /// Free-text description, empty when none has been saved
    pub description: String,
    /// Comments in the order they were added
    pub comments: Vec<Comment>,
}

impl ImageRecord {
    /// Create a record with a blank description and no comments
    pub fn new(id: ImageId, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let name = display_name(&filename);
        Self {
            id,
            filename,
            name,
            description: String::new(),
            comments: Vec::new(),
        }
    }

    /// Lower-cased text searched by the view controller
    pub fn searchable_text(&self) -> String {
        [
            self.id.to_string(),
            self.name.to_lowercase(),
            self.description.to_lowercase(),
            self.filename.to_lowercase(),
        ]
        .join(" ")
    }
}

/// Derive a display name: the file stem with `_` and `-` turned into spaces
pub fn display_name(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    };
    stem.replace(['_', '-'], " ")
}

/// Display rotation in degrees, always a multiple of 90 in `[0, 360)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Rotation(u16);

impl Rotation {
    /// Normalize any multiple of 90 into `[0, 360)`
    pub fn from_degrees(degrees: i32) -> Self {
        let snapped = (degrees / 90) * 90;
        Rotation(snapped.rem_euclid(360) as u16)
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Rotate counter-clockwise by a quarter turn
    pub fn left(self) -> Self {
        Self::from_degrees(self.0 as i32 - 90)
    }

    /// Rotate clockwise by a quarter turn
    pub fn right(self) -> Self {
        Self::from_degrees(self.0 as i32 + 90)
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.0 as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_extension_and_separators() {
        assert_eq!(display_name("cat_park.jpg"), "cat park");
        assert_eq!(display_name("sunset-over-lake.final.png"), "sunset over lake.final");
        assert_eq!(display_name("README"), "README");
        assert_eq!(display_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_ids_follow_manifest_position() {
        assert_eq!(ImageId::from_position(0), ImageId(1));
        assert_eq!(ImageId::from_position(2).to_string(), "3");
    }

    #[test]
    fn test_rotation_normalizes_negative_angles() {
        assert_eq!(Rotation::from_degrees(-90).degrees(), 270);
        assert_eq!(Rotation::from_degrees(450).degrees(), 90);
        assert_eq!(Rotation::default().left().degrees(), 270);
    }

    #[test]
    fn test_four_right_turns_return_to_start() {
        let mut rotation = Rotation::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            rotation = rotation.right();
            seen.push(rotation.degrees());
        }
        assert_eq!(seen, vec![90, 180, 270, 0]);
    }

    #[test]
    fn test_searchable_text_is_lowercase() {
        let mut record = ImageRecord::new(ImageId(7), "Beach_Day.JPG");
        record.description = "Waves AND sand".to_string();
        assert_eq!(record.searchable_text(), "7 beach day waves and sand beach_day.jpg");
    }

    #[test]
    fn test_comment_parses_iso_timestamp() {
        let json = r#"{"text":"hi","timestamp":"2024-03-01T10:15:30.000Z"}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.text, "hi");
        assert_eq!(comment.timestamp.to_rfc3339(), "2024-03-01T10:15:30+00:00");
    }
}
