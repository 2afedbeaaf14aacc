//! FFprobe wrapper module
//!
//! Probes the input once per run for the two values the bitrate math
//! needs: container duration and, when an audio stream exists, its
//! bit rate. Output is requested as JSON and parsed with serde into
//! typed structs; ffprobe reports numeric fields as strings, which are
//! parsed with `str::parse` (decimal point, never locale-dependent).

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::errors::{Result, VidFitError};

/// Reported audio bit rates below this are clamped up (kbps).
pub const AUDIO_PROBE_FLOOR_KBPS: u32 = 32;

/// Metadata extracted from one probe of the input file.
///
/// `audio_bitrate_kbps` is `None` when the file has no audio stream or
/// the stream carries no bit_rate field; downstream allocation
/// substitutes its own default in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMetadata {
    pub duration_secs: f64,
    pub audio_bitrate_kbps: Option<u32>,
    pub has_audio: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ProbeFormat {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    bit_rate: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// Run the prober against `input` and extract [`MediaMetadata`].
///
/// A missing or non-positive duration is fatal: no bitrate computation
/// can proceed without it.
pub fn probe_media(prober: &Path, input: &Path) -> Result<MediaMetadata> {
    let input_str = input.to_str().ok_or_else(|| {
        VidFitError::PathError(format!("Invalid path encoding: {}", input.display()))
    })?;

    let output = Command::new(prober)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "--",
            input_str,
        ])
        .output()
        .map_err(|e| {
            VidFitError::FFprobeError(format!("Failed to run {}: {}", prober.display(), e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let msg = if stderr.trim().is_empty() {
            format!(
                "ffprobe failed to analyze {} (exit code: {:?})",
                input.display(),
                output.status.code()
            )
        } else {
            format!("ffprobe error for '{}': {}", input.display(), stderr.trim())
        };
        return Err(VidFitError::FFprobeError(msg));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&json_str, input)
}

/// Parse raw ffprobe JSON into [`MediaMetadata`].
pub fn parse_probe_output(json_str: &str, input: &Path) -> Result<MediaMetadata> {
    let parsed: ProbeOutput = serde_json::from_str(json_str)
        .map_err(|e| VidFitError::FFprobeError(format!("JSON parse error: {}", e)))?;

    let duration_secs = parsed
        .format
        .duration
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| *d > 0.0)
        .ok_or_else(|| VidFitError::DurationUnavailable(input.to_path_buf()))?;

    let audio_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));
    let has_audio = audio_stream.is_some();

    // bit_rate is bits/second; kbps with a floor of 32 when present.
    let audio_bitrate_kbps = audio_stream
        .and_then(|s| s.bit_rate.as_deref())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|bps| ((bps / 1000) as u32).max(AUDIO_PROBE_FLOOR_KBPS));

    debug!(
        duration_secs,
        has_audio,
        audio_bitrate_kbps,
        input = %input.display(),
        "Probe complete"
    );

    Ok(MediaMetadata {
        duration_secs,
        audio_bitrate_kbps,
        has_audio,
    })
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_any_positive_duration_parses(d in 0.001f64..1e7) {
            let json = format!(
                r#"{{"streams": [], "format": {{"duration": "{:.6}"}}}}"#,
                d
            );
            let meta = parse_probe_output(&json, Path::new("p.mp4")).unwrap();
            prop_assert!((meta.duration_secs - d).abs() < 1e-3);
        }

        #[test]
        fn prop_audio_kbps_never_below_floor(bps in 0u64..10_000_000) {
            let json = format!(
                r#"{{"streams": [{{"codec_type": "audio", "bit_rate": "{}"}}], "format": {{"duration": "10.0"}}}}"#,
                bps
            );
            let meta = parse_probe_output(&json, Path::new("p.mp4")).unwrap();
            let kbps = meta.audio_bitrate_kbps.unwrap();
            prop_assert!(kbps >= AUDIO_PROBE_FLOOR_KBPS);
            if bps / 1000 >= AUDIO_PROBE_FLOOR_KBPS as u64 {
                prop_assert_eq!(kbps as u64, bps / 1000);
            }
        }

        #[test]
        fn prop_arbitrary_input_no_panic(s in ".*") {
            let _ = parse_probe_output(&s, Path::new("p.mp4"));
        }
    }
}
