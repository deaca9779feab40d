use serde::{Deserialize, Serialize};

/// A named mantra audio source. `url` is a file path or URL; the app never
/// decodes it, it only hands it to the playback driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sound {
    pub name: String,
    pub url: String,
    pub selected: bool,
}
