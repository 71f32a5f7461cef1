//! Pure projections of project state into what the cards display. No I/O,
//! no state: everything here is derived per render.

use crate::models::{AudioMode, Shot};
use crate::store::{ErrorReport, ProjectState};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fixed suffix appended to a shot's visual prompt for the copy action.
pub const IMAGE_PROMPT_SUFFIX: &str = "--ar 9:16 --v 6.0";

/// Badge shown on a card. Unknown modes fall back to the dialogue badge
/// rather than erroring, since the mode text is provider-controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AudioBadge {
    Dialogue,
    Voiceover,
    Ambience,
}

impl AudioBadge {
    pub fn from_mode(mode: &AudioMode) -> Self {
        match mode {
            AudioMode::Voiceover => AudioBadge::Voiceover,
            AudioMode::AmbienceOnly => AudioBadge::Ambience,
            AudioMode::Dialogue | AudioMode::Unknown(_) => AudioBadge::Dialogue,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AudioBadge::Dialogue => "DIALOGUE",
            AudioBadge::Voiceover => "VOICEOVER",
            AudioBadge::Ambience => "AMBIENCE",
        }
    }
}

/// Copy-ready prompt for forwarding to an external image generator.
pub fn image_prompt(shot: &Shot) -> String {
    format!("{} {}", shot.visual_prompt, IMAGE_PROMPT_SUFFIX)
}

#[derive(Debug, Clone, Serialize)]
pub struct ShotCard {
    pub shot_number: u32,
    pub timing_sec: String,
    pub camera_angle: String,
    pub visual_prompt: String,
    pub image_prompt: String,
    pub badge: AudioBadge,
    pub sfx_ambience: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intonation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gesture: Option<String>,
    pub is_handheld_shake: bool,
    pub is_multi_camera: bool,
}

pub fn shot_card(shot: &Shot) -> ShotCard {
    let analysis = shot.audio_data.production_analysis.as_ref();
    ShotCard {
        shot_number: shot.shot_number,
        timing_sec: shot.timing_sec.clone(),
        camera_angle: shot.camera_angle.clone(),
        visual_prompt: shot.visual_prompt.clone(),
        image_prompt: image_prompt(shot),
        badge: AudioBadge::from_mode(&shot.audio_data.mode),
        sfx_ambience: shot.audio_data.sfx_ambience.clone(),
        transcript: shot.audio_data.transcript.clone(),
        voice_gender: shot.audio_data.voice_gender.clone(),
        intonation: analysis.and_then(|a| a.intonation.clone()),
        gesture: analysis.and_then(|a| a.gesture.clone()),
        is_handheld_shake: shot.camera_options.map_or(false, |o| o.is_handheld_shake),
        is_multi_camera: shot.camera_options.map_or(false, |o| o.is_multi_camera),
    }
}

/// Everything the page needs to draw itself.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub loading: bool,
    pub progress: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_narrative: Option<String>,
    pub shot_count: usize,
    pub shots: Vec<ShotCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

pub fn project_view(state: &ProjectState) -> ProjectView {
    ProjectView {
        loading: state.generation.is_some(),
        progress: state.progress.floor() as u32,
        error: state.error.clone(),
        summary: state.data.summary.clone(),
        full_narrative: state.data.full_narrative.clone(),
        shot_count: state.data.shots.len(),
        shots: state.data.shots.iter().map(shot_card).collect(),
        generated_at: state.generated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioData, CameraOptions};
    use pretty_assertions::assert_eq;

    fn shot_with_mode(mode: AudioMode) -> Shot {
        Shot {
            shot_number: 1,
            timing_sec: "0-3s".to_string(),
            camera_angle: "Wide".to_string(),
            visual_prompt: "A lone figure in fog".to_string(),
            audio_data: AudioData {
                mode,
                sfx_ambience: "wind".to_string(),
                transcript: None,
                voice_gender: None,
                production_analysis: None,
            },
            camera_options: Some(CameraOptions {
                is_handheld_shake: true,
                is_multi_camera: false,
            }),
        }
    }

    #[test]
    fn badge_maps_each_mode() {
        assert_eq!(
            AudioBadge::from_mode(&AudioMode::Voiceover),
            AudioBadge::Voiceover
        );
        assert_eq!(
            AudioBadge::from_mode(&AudioMode::AmbienceOnly),
            AudioBadge::Ambience
        );
        assert_eq!(
            AudioBadge::from_mode(&AudioMode::Dialogue),
            AudioBadge::Dialogue
        );
    }

    #[test]
    fn unknown_mode_falls_back_to_dialogue_badge() {
        let badge = AudioBadge::from_mode(&AudioMode::Unknown("Music Bed".to_string()));
        assert_eq!(badge, AudioBadge::Dialogue);
        assert_eq!(badge.label(), "DIALOGUE");
    }

    #[test]
    fn image_prompt_appends_the_fixed_suffix() {
        let shot = shot_with_mode(AudioMode::Dialogue);
        assert_eq!(
            image_prompt(&shot),
            "A lone figure in fog --ar 9:16 --v 6.0"
        );
    }

    #[test]
    fn card_carries_camera_flags() {
        let card = shot_card(&shot_with_mode(AudioMode::Dialogue));
        assert!(card.is_handheld_shake);
        assert!(!card.is_multi_camera);
    }

    #[test]
    fn view_floors_the_progress_percentage() {
        let mut state = ProjectState::default();
        state.progress = 70.7;
        state.generation = Some(crate::store::GenerationTicket::new());
        let view = project_view(&state);
        assert_eq!(view.progress, 70);
        assert!(view.loading);
    }

    #[test]
    fn view_counts_match_the_held_result() {
        let mut state = ProjectState::default();
        state.data.shots = vec![
            shot_with_mode(AudioMode::Dialogue),
            shot_with_mode(AudioMode::Voiceover),
        ];
        state.data.summary = Some("vision".to_string());
        let view = project_view(&state);
        assert_eq!(view.shot_count, 2);
        assert_eq!(view.shots.len(), 2);
        assert_eq!(view.summary.as_deref(), Some("vision"));
        assert!(!view.loading);
    }
}
