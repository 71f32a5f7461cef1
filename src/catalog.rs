//! Fixed production-option catalogs. The form can only ever narrow a choice
//! to one of these entries; there are no free-text overrides.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationPreset {
    #[default]
    #[serde(rename = "20s")]
    Short,
    #[serde(rename = "35s")]
    Medium,
    #[serde(rename = "60s")]
    Long,
}

impl DurationPreset {
    pub const ALL: [DurationPreset; 3] = [
        DurationPreset::Short,
        DurationPreset::Medium,
        DurationPreset::Long,
    ];

    pub fn value(self) -> &'static str {
        match self {
            DurationPreset::Short => "20s",
            DurationPreset::Medium => "35s",
            DurationPreset::Long => "60s",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationPreset::Short => "20 Detik (Super Hook / TikTok)",
            DurationPreset::Medium => "35 Detik (Storytelling Padat)",
            DurationPreset::Long => "60 Detik (Full Narrative)",
        }
    }
}

impl fmt::Display for DurationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualStyle {
    #[default]
    RainforestNoir,
    Cinematic,
    Real,
    Anime,
    Dark,
    #[serde(rename = "3d")]
    ThreeD,
    Claymotion,
}

impl VisualStyle {
    pub const ALL: [VisualStyle; 7] = [
        VisualStyle::RainforestNoir,
        VisualStyle::Cinematic,
        VisualStyle::Real,
        VisualStyle::Anime,
        VisualStyle::Dark,
        VisualStyle::ThreeD,
        VisualStyle::Claymotion,
    ];

    pub fn id(self) -> &'static str {
        match self {
            VisualStyle::RainforestNoir => "rainforest_noir",
            VisualStyle::Cinematic => "cinematic",
            VisualStyle::Real => "real",
            VisualStyle::Anime => "anime",
            VisualStyle::Dark => "dark",
            VisualStyle::ThreeD => "3d",
            VisualStyle::Claymotion => "claymotion",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisualStyle::RainforestNoir => "Rainforest Noir (Dark & Sad)",
            VisualStyle::Cinematic => "Cinematic Movie (Netflix Look)",
            VisualStyle::Real => "Ultra Realistis HD (Live Action)",
            VisualStyle::Anime => "Anime Masterpiece (Shinkai Style)",
            VisualStyle::Dark => "Dark / Horror / Mystery",
            VisualStyle::ThreeD => "3D Animation (Pixar/Disney)",
            VisualStyle::Claymotion => "Claymotion",
        }
    }

    /// The mandatory style text interpolated into every generation request.
    pub fn prompt(self) -> &'static str {
        match self {
            VisualStyle::RainforestNoir => "Cinematic Rainforest, dark moody atmosphere, thick fog, ancient soldiers, damp environment, sad emotional lighting, muted colors, teal and orange highlights, 8k masterpiece, photorealistic, epic scale, hyper-detailed moss and rain droplets.",
            VisualStyle::Cinematic => "Cinematic Movie Still, Arri Alexa LF, Anamorphic Lens, Professional Film Look, Netflix Aesthetic, Sophisticated Color Grading, High Dynamic Range, Volumetric Lighting, 8K Masterpiece, depth of field.",
            VisualStyle::Real => "Photorealistic 8K, Live Action Movie Still, Hyper-detailed textures, Realistic Skin Pores and Fabrics, Natural Cinematic Lighting, No CGI effect, Shot on iPhone 15 Pro Max 4K, RAW photo, Sharp Focus, authentic atmosphere.",
            VisualStyle::Anime => "Anime Masterpiece, Makoto Shinkai Style, CoMix Wave Films aesthetic, highly detailed background art, ethereal lighting, vibrant color palette, emotional atmosphere, 4k hand-drawn style, breathtaking scenery.",
            VisualStyle::Dark => "Dark moody atmosphere, thriller cinematic aesthetic, high contrast shadows, film noir influence, volumetric fog, unsettling lighting, eerie textures, grainy film stock look, intense suspenseful visuals.",
            VisualStyle::ThreeD => "High-end 3D Render, Pixar and Disney Animation Style, Subsurface Scattering, Expressive Character Faces, Soft Cinematic Lighting, Octane Render, 8k Resolution, Vibrant and Clean Textures, Masterpiece 3D Art.",
            VisualStyle::Claymotion => "Claymation style, stop-motion animation aesthetic, handcrafted clay textures, finger-molded details, Aardman style, playful tactile feel, studio lighting, 8k masterpiece.",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Indonesia,
    English,
    Korean,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Indonesia, Language::English, Language::Korean];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Indonesia => "Indonesia",
            Language::English => "English",
            Language::Korean => "Korean",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarratorTone {
    #[default]
    #[serde(rename = "Cinematic Narrator")]
    Cinematic,
    #[serde(rename = "Casual / Teman Curhat")]
    Casual,
    #[serde(rename = "Energetic / Hype")]
    Energetic,
    #[serde(rename = "Horror / Seram")]
    Horror,
    #[serde(rename = "Inspirational")]
    Inspirational,
    #[serde(rename = "Poetic / Sad")]
    Poetic,
}

impl NarratorTone {
    pub const ALL: [NarratorTone; 6] = [
        NarratorTone::Cinematic,
        NarratorTone::Casual,
        NarratorTone::Energetic,
        NarratorTone::Horror,
        NarratorTone::Inspirational,
        NarratorTone::Poetic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NarratorTone::Cinematic => "Cinematic Narrator",
            NarratorTone::Casual => "Casual / Teman Curhat",
            NarratorTone::Energetic => "Energetic / Hype",
            NarratorTone::Horror => "Horror / Seram",
            NarratorTone::Inspirational => "Inspirational",
            NarratorTone::Poetic => "Poetic / Sad",
        }
    }
}

impl fmt::Display for NarratorTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "16:9")]
    Horizontal,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 2] = [AspectRatio::Vertical, AspectRatio::Horizontal];

    pub fn value(self) -> &'static str {
        match self {
            AspectRatio::Vertical => "9:16",
            AspectRatio::Horizontal => "16:9",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Vertical => "Vertical (9:16) - TikTok/Reels",
            AspectRatio::Horizontal => "Horizontal (16:9) - YouTube",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duration_serializes_to_its_value() {
        let json = serde_json::to_string(&DurationPreset::Short).unwrap();
        assert_eq!(json, "\"20s\"");
        let back: DurationPreset = serde_json::from_str("\"60s\"").unwrap();
        assert_eq!(back, DurationPreset::Long);
    }

    #[test]
    fn style_serializes_to_its_id() {
        for style in VisualStyle::ALL {
            let json = serde_json::to_string(&style).unwrap();
            assert_eq!(json, format!("\"{}\"", style.id()));
            let back: VisualStyle = serde_json::from_str(&json).unwrap();
            assert_eq!(back, style);
        }
    }

    #[test]
    fn narrator_tone_round_trips_exact_labels() {
        let back: NarratorTone = serde_json::from_str("\"Casual / Teman Curhat\"").unwrap();
        assert_eq!(back, NarratorTone::Casual);
        assert_eq!(
            serde_json::to_string(&NarratorTone::Horror).unwrap(),
            "\"Horror / Seram\""
        );
    }

    #[test]
    fn defaults_are_the_first_catalog_entries() {
        assert_eq!(DurationPreset::default(), DurationPreset::Short);
        assert_eq!(VisualStyle::default(), VisualStyle::RainforestNoir);
        assert_eq!(Language::default(), Language::Indonesia);
        assert_eq!(NarratorTone::default(), NarratorTone::Cinematic);
        assert_eq!(AspectRatio::default(), AspectRatio::Vertical);
    }

    #[test]
    fn every_style_carries_a_prompt() {
        for style in VisualStyle::ALL {
            assert!(!style.prompt().is_empty(), "{} has no prompt", style.id());
        }
    }

    #[test]
    fn unknown_catalog_values_are_rejected() {
        assert!(serde_json::from_str::<AspectRatio>("\"4:3\"").is_err());
        assert!(serde_json::from_str::<Language>("\"Klingon\"").is_err());
    }
}
