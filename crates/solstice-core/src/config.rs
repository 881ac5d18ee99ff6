use serde::{Deserialize, Serialize};

/// Physical shape of the watch display. Round faces inset their content
/// slightly to clear the bezel.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FaceShape {
    #[default]
    Square,
    Round,
}

/// Face configuration, decoded by the platform shell from a postcard blob.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceConfig {
    pub shape: FaceShape,
    /// Redraw cadence while visible and interactive, in seconds.
    pub interactive_update_secs: u32,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            shape: FaceShape::Square,
            interactive_update_secs: 10,
        }
    }
}

impl FaceConfig {
    pub fn interactive_update_ms(&self) -> u64 {
        u64::from(self.interactive_update_secs) * 1000
    }
}
