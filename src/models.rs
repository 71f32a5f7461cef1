use serde::{Deserialize, Serialize};

use crate::catalog::{AspectRatio, DurationPreset, Language, NarratorTone, VisualStyle};

/// Parameters for one storyboard generation, as posted by the form.
/// Every field except the premise narrows to a fixed catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub premise: String,
    #[serde(default)]
    pub duration: DurationPreset,
    #[serde(default)]
    pub style: VisualStyle,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub narrator: NarratorTone,
    #[serde(default)]
    pub ratio: AspectRatio,
}

/// The complete result of one successful generation. Replaced wholesale,
/// never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    pub summary: String,
    pub full_narrative: String,
    pub shots: Vec<Shot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// 1-based sequence number as produced by the model, never renumbered.
    pub shot_number: u32,
    /// Free-text timing label, e.g. "0-3s".
    pub timing_sec: String,
    pub camera_angle: String,
    pub visual_prompt: String,
    pub audio_data: AudioData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_options: Option<CameraOptions>,
}

/// `mode` and `sfx_ambience` are mandatory: a response missing either must
/// fail to parse rather than be patched up with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    pub mode: AudioMode,
    pub sfx_ambience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_analysis: Option<ProductionAnalysis>,
}

/// Audio mode, classified once at the wire boundary. The provider emits free
/// text here, so anything that matches none of the known modes is carried
/// through as `Unknown` with the raw text intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AudioMode {
    Dialogue,
    Voiceover,
    AmbienceOnly,
    Unknown(String),
}

impl From<String> for AudioMode {
    fn from(raw: String) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("voiceover") {
            AudioMode::Voiceover
        } else if lower.contains("ambience") {
            AudioMode::AmbienceOnly
        } else if lower.contains("dialogue") {
            AudioMode::Dialogue
        } else {
            AudioMode::Unknown(raw)
        }
    }
}

impl From<AudioMode> for String {
    fn from(mode: AudioMode) -> Self {
        match mode {
            AudioMode::Dialogue => "Dialogue".to_string(),
            AudioMode::Voiceover => "Voiceover".to_string(),
            AudioMode::AmbienceOnly => "Ambience Only".to_string(),
            AudioMode::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intonation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gesture: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    #[serde(default)]
    pub is_handheld_shake: bool,
    #[serde(default)]
    pub is_multi_camera: bool,
}
