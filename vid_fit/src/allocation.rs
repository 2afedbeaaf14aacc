//! Bitrate budget allocation
//!
//! Converts a target file size and a duration into an audio/video
//! bitrate split. Pure arithmetic, no side effects: same inputs, same
//! split. The kbps convention here is 1024 bits/s, fixed by the 8192
//! factor (8 * 1024 bits per MB-second).

use shared_utils::errors::{Result, VidFitError};

/// kbps available per (megabyte of target / second of duration).
pub const TOTAL_KBPS_FACTOR: f64 = 8192.0;

/// Audio bitrate assumed when the probe reports none.
pub const DEFAULT_AUDIO_KBPS: u32 = 128;

/// Baseline audio bitrate clamp range.
pub const AUDIO_BASELINE_MIN_KBPS: u32 = 64;
pub const AUDIO_BASELINE_MAX_KBPS: u32 = 192;

/// Audio may not take more than this share of the total budget.
pub const AUDIO_SHARE_CAP: f64 = 0.25;

/// Share granted to audio once the cap trips.
pub const AUDIO_CAPPED_SHARE: f64 = 0.20;

/// Audio never drops below this, however small the budget.
pub const AUDIO_FLOOR_KBPS: u32 = 48;

/// Fixed reservation for container/muxing overhead.
pub const CONTAINER_OVERHEAD_KBPS: u32 = 16;

/// Minimum acceptable video bitrate; below this the target is infeasible.
pub const MIN_VIDEO_KBPS: u32 = 100;

/// The audio/video split for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitrateBudget {
    pub total_kbps: f64,
    pub audio_kbps: u32,
    pub video_kbps: u32,
}

/// Total bitrate budget for hitting `target_mb` over `duration_secs`.
///
/// Exact, no rounding: allocation decides where the flooring happens.
pub fn total_bitrate_kbps(target_mb: f64, duration_secs: f64) -> f64 {
    target_mb * TOTAL_KBPS_FACTOR / duration_secs
}

/// Split `total_kbps` between audio and video.
///
/// The baseline audio bitrate (probed value, or the 128 kbps default)
/// is clamped to [64, 192] *before* the 25%-of-total cap check; the
/// order matters at the boundary. When the cap trips, audio falls back
/// to 20% of the total with a hard floor of 48 kbps so a small budget
/// is not starved of video bits.
///
/// Errors with [`VidFitError::InfeasibleTarget`] when the leftover
/// video bitrate lands under 100 kbps; the caller must abort before
/// any encoder invocation.
pub fn allocate(total_kbps: f64, original_audio_kbps: Option<u32>) -> Result<BitrateBudget> {
    let baseline = original_audio_kbps
        .unwrap_or(DEFAULT_AUDIO_KBPS)
        .clamp(AUDIO_BASELINE_MIN_KBPS, AUDIO_BASELINE_MAX_KBPS);

    let audio_kbps = if (baseline as f64) > total_kbps * AUDIO_SHARE_CAP {
        ((total_kbps * AUDIO_CAPPED_SHARE).floor() as u32).max(AUDIO_FLOOR_KBPS)
    } else {
        baseline
    };

    let video = (total_kbps - audio_kbps as f64 - CONTAINER_OVERHEAD_KBPS as f64).floor();

    if video < MIN_VIDEO_KBPS as f64 {
        return Err(VidFitError::InfeasibleTarget {
            video_kbps: video as i64,
        });
    }

    Ok(BitrateBudget {
        total_kbps,
        audio_kbps,
        video_kbps: video as u32,
    })
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_allocation_deterministic(
            total in 1.0f64..100_000.0,
            probed in proptest::option::of(1u32..1000)
        ) {
            let a = allocate(total, probed);
            let b = allocate(total, probed);
            match (a, b) {
                (Ok(x), Ok(y)) => prop_assert_eq!(x, y),
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "determinism violated"),
            }
        }

        #[test]
        fn prop_budget_invariants(
            total in 1.0f64..100_000.0,
            probed in proptest::option::of(1u32..1000)
        ) {
            if let Ok(budget) = allocate(total, probed) {
                // Split plus overhead never exceeds the total
                prop_assert!(
                    budget.audio_kbps as f64
                        + budget.video_kbps as f64
                        + CONTAINER_OVERHEAD_KBPS as f64
                        <= total
                );
                prop_assert!(budget.video_kbps >= MIN_VIDEO_KBPS);
                prop_assert!(budget.audio_kbps >= AUDIO_FLOOR_KBPS);
                prop_assert!(budget.audio_kbps <= AUDIO_BASELINE_MAX_KBPS);
            }
        }

        #[test]
        fn prop_uncapped_audio_equals_clamped_baseline(probed in 64u32..=192) {
            // Budget large enough that the cap can never trip
            let total = 10_000.0;
            let budget = allocate(total, Some(probed)).unwrap();
            prop_assert_eq!(budget.audio_kbps, probed);
        }
    }
}
