use crate::render::{image_prompt, AudioBadge};
use crate::store::ProjectData;
use printpdf::*;
use std::io::BufWriter;

/// Printable storyboard document: a treatment page (summary + full script)
/// followed by one page per shot.
pub fn generate_pdf(data: &ProjectData) -> Vec<u8> {
    let (doc, page, layer) = PdfDocument::new(
        "VerticalCine Storyboard",
        Mm(210.0),
        Mm(297.0),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();

    let cover = doc.get_page(page).get_layer(layer);
    cover.use_text("VerticalCine Storyboard", 20.0, Mm(15.0), Mm(275.0), &font);
    let mut y = 260.0;
    if let Some(summary) = &data.summary {
        cover.use_text("Director's Treatment", 12.0, Mm(15.0), Mm(y), &font);
        y -= 8.0;
        for line in wrap(summary, 95) {
            cover.use_text(line, 10.0, Mm(15.0), Mm(y), &font);
            y -= 6.0;
        }
        y -= 6.0;
    }
    if let Some(narrative) = &data.full_narrative {
        cover.use_text("Full Production Script", 12.0, Mm(15.0), Mm(y), &font);
        y -= 8.0;
        for line in wrap(narrative, 95) {
            if y < 15.0 {
                break;
            }
            cover.use_text(line, 9.0, Mm(15.0), Mm(y), &font);
            y -= 5.0;
        }
    }

    for shot in &data.shots {
        let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), format!("Shot {}", shot.shot_number));
        let layer_ref = doc.get_page(page).get_layer(layer);
        layer_ref.use_text(
            format!("Shot #{}  ({})", shot.shot_number, shot.timing_sec),
            16.0,
            Mm(15.0),
            Mm(275.0),
            &font,
        );
        layer_ref.use_text(
            format!("Camera: {}", truncate(&shot.camera_angle, 110)),
            10.0,
            Mm(15.0),
            Mm(264.0),
            &font,
        );
        layer_ref.use_text(
            format!(
                "Audio: {}  |  SFX: {}",
                AudioBadge::from_mode(&shot.audio_data.mode).label(),
                truncate(&shot.audio_data.sfx_ambience, 90)
            ),
            9.0,
            Mm(15.0),
            Mm(256.0),
            &font,
        );
        let mut y = 244.0;
        if let Some(transcript) = &shot.audio_data.transcript {
            layer_ref.use_text(
                format!("\"{}\"", truncate(transcript, 160)),
                10.0,
                Mm(15.0),
                Mm(y),
                &font,
            );
            y -= 10.0;
        }
        for line in wrap(&image_prompt(shot), 100) {
            layer_ref.use_text(line, 9.0, Mm(15.0), Mm(y), &font);
            y -= 5.0;
        }
    }

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buf);
        doc.save(&mut writer).ok();
    }
    buf
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max).collect::<String>())
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + word.chars().count() + 1 > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wrap_respects_the_width() {
        let lines = wrap("one two three four five six seven", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "one two three four five six seven");
    }

    #[test]
    fn empty_project_still_produces_a_document() {
        let bytes = generate_pdf(&ProjectData::default());
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..5], b"%PDF-");
    }
}
