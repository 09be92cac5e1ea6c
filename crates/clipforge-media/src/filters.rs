//! FFmpeg filter graph fragments used by the compositing operations.

use clipforge_models::{
    HorizontalAnchor, HorizontalPosition, Position, VerticalAnchor, VerticalPosition,
};

/// Sample rate every audio branch is converted to before mixing.
pub const MIX_SAMPLE_RATE: u32 = 44_100;

/// Common audio format for all branches of a graph.
pub const AUDIO_FORMAT: &str = "aformat=sample_fmts=fltp:sample_rates=44100:channel_layouts=stereo";

/// `x` expression for an overlay placed at `position`.
pub fn overlay_x(position: HorizontalPosition) -> String {
    match position {
        HorizontalPosition::Anchor(HorizontalAnchor::Left) => "0".to_string(),
        HorizontalPosition::Anchor(HorizontalAnchor::Center) => "(main_w-overlay_w)/2".to_string(),
        HorizontalPosition::Anchor(HorizontalAnchor::Right) => "main_w-overlay_w".to_string(),
        HorizontalPosition::Pixels(x) => x.to_string(),
    }
}

/// `y` expression for an overlay placed at `position`.
pub fn overlay_y(position: VerticalPosition) -> String {
    match position {
        VerticalPosition::Anchor(VerticalAnchor::Top) => "0".to_string(),
        VerticalPosition::Anchor(VerticalAnchor::Center) => "(main_h-overlay_h)/2".to_string(),
        VerticalPosition::Anchor(VerticalAnchor::Bottom) => "main_h-overlay_h".to_string(),
        VerticalPosition::Pixels(y) => y.to_string(),
    }
}

/// Overlay `[overlay_label]` on `[base_label]` from t=0 for `duration`
/// seconds, writing `[output_label]`.
pub fn overlay_chain(
    base_label: &str,
    overlay_label: &str,
    position: Position,
    duration: f64,
    output_label: &str,
) -> String {
    format!(
        "[{base}][{over}]overlay=x={x}:y={y}:enable='between(t,0,{dur:.3})':eof_action=pass[{out}]",
        base = base_label,
        over = overlay_label,
        x = overlay_x(position.horizontal()),
        y = overlay_y(position.vertical()),
        dur = duration,
        out = output_label,
    )
}

/// Scale and letterbox input `index` to `width`x`height` at `fps`.
pub fn normalize_video_chain(index: usize, width: u32, height: u32, fps: f64, output_label: &str) -> String {
    format!(
        "[{index}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps:.3},format=yuv420p[{out}]",
        index = index,
        w = width,
        h = height,
        fps = fps,
        out = output_label,
    )
}

/// Audio of input `index` fitted to exactly `duration` seconds.
pub fn fitted_audio_chain(index: usize, duration: f64, output_label: &str) -> String {
    format!(
        "[{index}:a]{fmt},apad=whole_dur={dur:.3},atrim=duration={dur:.3},asetpts=N/SR/TB[{out}]",
        index = index,
        fmt = AUDIO_FORMAT,
        dur = duration,
        out = output_label,
    )
}

/// `duration` seconds of stereo silence.
pub fn silence_chain(duration: f64, output_label: &str) -> String {
    format!(
        "anullsrc=r={rate}:cl=stereo,atrim=duration={dur:.3}[{out}]",
        rate = MIX_SAMPLE_RATE,
        dur = duration,
        out = output_label,
    )
}

/// Audio of input `index` cut to `duration` seconds (padded with silence when
/// the source is shorter) and shifted to start at `start` seconds.
pub fn delayed_clip_chain(index: usize, start: f64, duration: f64, output_label: &str) -> String {
    let delay_ms = (start * 1000.0).round() as u64;
    format!(
        "[{index}:a]{fmt},atrim=duration={dur:.3},asetpts=PTS-STARTPTS,\
         apad=whole_dur={dur:.3},adelay={ms}|{ms}[{out}]",
        index = index,
        fmt = AUDIO_FORMAT,
        dur = duration,
        ms = delay_ms,
        out = output_label,
    )
}

/// Sum `labels` without level normalisation; the first input sets the length.
pub fn mix_chain(labels: &[String], output_label: &str) -> String {
    let inputs: String = labels.iter().map(|l| format!("[{}]", l)).collect();
    format!(
        "{inputs}amix=inputs={n}:duration=first:dropout_transition=0:normalize=0[{out}]",
        inputs = inputs,
        n = labels.len(),
        out = output_label,
    )
}

/// Join `segments` (video label, optional audio label) end to end.
pub fn concat_chain(segments: &[(String, Option<String>)], output_video: &str, output_audio: Option<&str>) -> String {
    let mut graph = String::new();
    for (video, audio) in segments {
        graph.push_str(&format!("[{}]", video));
        if let Some(audio) = audio {
            graph.push_str(&format!("[{}]", audio));
        }
    }

    let with_audio = output_audio.is_some();
    graph.push_str(&format!(
        "concat=n={}:v=1:a={}[{}]",
        segments.len(),
        u8::from(with_audio),
        output_video
    ));
    if let Some(audio) = output_audio {
        graph.push_str(&format!("[{}]", audio));
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_expressions() {
        let pos = Position::anchored(HorizontalAnchor::Right, VerticalAnchor::Top);
        assert_eq!(overlay_x(pos.horizontal()), "main_w-overlay_w");
        assert_eq!(overlay_y(pos.vertical()), "0");

        let centered = Position::anchored(HorizontalAnchor::Center, VerticalAnchor::Center);
        assert_eq!(overlay_x(centered.horizontal()), "(main_w-overlay_w)/2");
        assert_eq!(overlay_y(centered.vertical()), "(main_h-overlay_h)/2");

        assert_eq!(
            overlay_y(VerticalPosition::Anchor(VerticalAnchor::Bottom)),
            "main_h-overlay_h"
        );
        assert_eq!(overlay_x(HorizontalPosition::Anchor(HorizontalAnchor::Left)), "0");
    }

    #[test]
    fn test_pixel_expressions() {
        let pos = Position::pixels(40, -12);
        assert_eq!(overlay_x(pos.horizontal()), "40");
        assert_eq!(overlay_y(pos.vertical()), "-12");
    }

    #[test]
    fn test_overlay_chain() {
        let chain = overlay_chain("0:v", "1:v", Position::default(), 2.5, "ov1");
        assert_eq!(
            chain,
            "[0:v][1:v]overlay=x=main_w-overlay_w:y=0:enable='between(t,0,2.500)':eof_action=pass[ov1]"
        );
    }

    #[test]
    fn test_delayed_clip_chain() {
        let chain = delayed_clip_chain(2, 1.5, 3.0, "a2");
        assert!(chain.starts_with("[2:a]aformat="));
        assert!(chain.contains("atrim=duration=3.000"));
        assert!(chain.contains("apad=whole_dur=3.000"));
        assert!(chain.ends_with("adelay=1500|1500[a2]"));
    }

    #[test]
    fn test_mix_chain() {
        let labels = vec!["bed".to_string(), "a1".to_string(), "a2".to_string()];
        assert_eq!(
            mix_chain(&labels, "mix"),
            "[bed][a1][a2]amix=inputs=3:duration=first:dropout_transition=0:normalize=0[mix]"
        );
    }

    #[test]
    fn test_concat_chain_with_and_without_audio() {
        let segments = vec![
            ("v0".to_string(), Some("a0".to_string())),
            ("v1".to_string(), Some("a1".to_string())),
        ];
        assert_eq!(
            concat_chain(&segments, "vout", Some("aout")),
            "[v0][a0][v1][a1]concat=n=2:v=1:a=1[vout][aout]"
        );

        let silent = vec![("v0".to_string(), None), ("v1".to_string(), None)];
        assert_eq!(concat_chain(&silent, "vout", None), "[v0][v1]concat=n=2:v=1:a=0[vout]");
    }

    #[test]
    fn test_silence_chain() {
        assert_eq!(
            silence_chain(2.0, "s0"),
            "anullsrc=r=44100:cl=stereo,atrim=duration=2.000[s0]"
        );
    }
}
