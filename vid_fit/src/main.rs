use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use shared_utils::errors::{Result, VidFitError};
use shared_utils::types::FileSize;
use vid_fit::{allocation, convergence, TwoPassEncoder};

#[derive(Parser)]
#[command(name = "vid-fit")]
#[command(version, about = "Compress a video toward a target file size - two-pass H.264", long_about = None)]
struct Cli {
    /// Input media file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Target output size in megabytes
    #[arg(value_name = "SIZE_MB")]
    target_mb: f64,

    /// Output path (defaults to <input>_compressed.mp4)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Prober executable (defaults to ffprobe on PATH)
    #[arg(value_name = "FFPROBE")]
    ffprobe: Option<PathBuf>,

    /// Encoder executable (defaults to ffmpeg on PATH)
    #[arg(value_name = "FFMPEG")]
    ffmpeg: Option<PathBuf>,
}

fn main() {
    let _ = shared_utils::logging::init_logging(
        "vid_fit",
        shared_utils::logging::LogConfig::default(),
    );

    // Bad arguments are fatal input errors: exit 1, not clap's 2.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        };
        let _ = e.print();
        std::process::exit(code);
    });

    if let Err(e) = run(&cli) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.target_mb.is_finite() || cli.target_mb <= 0.0 {
        return Err(VidFitError::InvalidTargetSize(format!(
            "{} (must be a positive number of megabytes)",
            cli.target_mb
        )));
    }

    shared_utils::validate_input_file(&cli.input)?;

    let output = match &cli.output {
        Some(path) => {
            let (forced, changed) = shared_utils::force_output_extension(path);
            if changed {
                warn!(
                    "⚠️ Output extension rewritten to .{}: {}",
                    shared_utils::OUTPUT_EXTENSION,
                    forced.display()
                );
            }
            forced
        }
        None => shared_utils::default_output_path(&cli.input),
    };
    shared_utils::check_input_output_conflict(&cli.input, &output)?;

    let ffprobe = shared_utils::resolve_tool(cli.ffprobe.as_deref(), "ffprobe")?;
    let ffmpeg = shared_utils::resolve_tool(cli.ffmpeg.as_deref(), "ffmpeg")?;

    info!("🎬 Target-Size Compression");
    info!("   📁 Input:  {}", cli.input.display());
    info!("   📁 Output: {}", output.display());
    info!("   🎯 Target: {:.2} MB", cli.target_mb);

    let metadata = shared_utils::probe_media(&ffprobe, &cli.input)?;
    info!(
        "   ⏱️  Duration: {:.2}s, audio: {}",
        metadata.duration_secs,
        match metadata.audio_bitrate_kbps {
            Some(kbps) => format!("{} kbps", kbps),
            None if metadata.has_audio => "unknown bitrate".to_string(),
            None => "none".to_string(),
        }
    );

    let total_kbps = allocation::total_bitrate_kbps(cli.target_mb, metadata.duration_secs);
    let budget = allocation::allocate(total_kbps, metadata.audio_bitrate_kbps)?;
    info!(
        "   📊 Budget: {:.1} kbps total → video {} + audio {} kbps",
        budget.total_kbps, budget.video_kbps, budget.audio_kbps
    );

    let target = FileSize::from_megabytes(cli.target_mb);
    let mut encoder = TwoPassEncoder::new(&ffmpeg, &cli.input, &output);
    let report = convergence::converge_on_size(&mut encoder, &budget, target)?;

    let last = report.final_attempt();
    let status = match report.state {
        convergence::ConvergenceState::Converged => "✅ Converged",
        convergence::ConvergenceState::Exhausted => "⚠️ Best effort",
    };
    info!("");
    info!(
        "{}: {} ({}, {:+.1}% of target, {} attempt{})",
        status,
        output.display(),
        last.actual_size.display(),
        last.deviation * 100.0,
        report.attempts.len(),
        if report.attempts.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
