//! CLI for generating passport photo print sheets.
//!
//! Usage:
//!   passfoto portrait.jpg                      # 10x15cm sheet, EU profile
//!   passfoto portrait.jpg --format 13x18
//!   passfoto portrait.jpg --format 20x30      # custom paper in cm
//!   passfoto portrait.jpg --count 4 --json

use clap::Parser;
use passfoto::{paper_preset, profile, SheetBuilder, PAPER_PRESETS};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "passfoto")]
#[command(author, version, about = "Passport photo print-sheet generator", long_about = None)]
struct Args {
    /// Input portrait image
    #[arg(required = true)]
    image: PathBuf,

    /// Paper format: a preset code (10x15, 13x18) or custom WxH in cm
    #[arg(short, long, default_value = "10x15")]
    format: String,

    /// Document profile code
    #[arg(short, long, default_value = "eu-35x45")]
    profile: String,

    /// Cap the number of photos on the sheet
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// SeetaFace model path (requires the rustface feature)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Output file (default: derived from the input name and format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the diagnostics record as JSON
    #[arg(long)]
    json: bool,
}

/// Diagnostics record for --json output.
#[derive(Serialize)]
struct Output {
    input: String,
    output: String,
    profile: String,
    paper_mm: (u32, u32),
    grid: (u32, u32),
    placed: u32,
    orientation_swapped: bool,
    used_fallback_crop: bool,
    alignment: Option<passfoto::AlignmentReport>,
}

/// Resolve a preset code or a custom `WxH` size in cm to paper mm.
fn parse_paper(format: &str) -> Result<(u32, u32), String> {
    if let Ok(preset) = paper_preset(format) {
        return Ok(preset);
    }
    let custom = format
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
        .filter(|&(w, h)| w > 0 && h > 0);
    match custom {
        // cm → mm, fed landscape like the presets
        Some((w_cm, h_cm)) => Ok((w_cm.max(h_cm) * 10, w_cm.min(h_cm) * 10)),
        None => Err(format!(
            "unknown format '{format}' (presets: {})",
            PAPER_PRESETS
                .iter()
                .map(|(code, _, _)| *code)
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn run(args: &Args) -> Result<(), String> {
    let input = std::fs::read(&args.image)
        .map_err(|e| format!("cannot read {}: {e}", args.image.display()))?;

    let (paper_w_mm, paper_h_mm) = parse_paper(&args.format)?;
    let document = profile::lookup(&args.profile).map_err(|e| e.to_string())?;

    let mut builder = SheetBuilder::new(input)
        .map_err(|e| e.to_string())?
        .profile(document)
        .paper_mm(paper_w_mm, paper_h_mm);
    if let Some(count) = args.count {
        builder = builder.requested_count(count);
    }

    #[cfg(feature = "rustface")]
    if let Some(model) = &args.model {
        let detector =
            passfoto::RustfaceDetector::from_model_file(model).map_err(|e| e.to_string())?;
        builder = builder.face_detector(Box::new(detector));
    }
    #[cfg(not(feature = "rustface"))]
    if args.model.is_some() {
        return Err("built without the rustface feature; --model is unavailable".into());
    }

    let sheet = builder.generate().map_err(|e| e.to_string())?;

    let output_path = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".into());
        args.image
            .with_file_name(format!("{stem}_passport_{}.jpg", args.format))
    });
    std::fs::write(&output_path, &sheet.data)
        .map_err(|e| format!("cannot write {}: {e}", output_path.display()))?;

    if args.json {
        let record = Output {
            input: args.image.display().to_string(),
            output: output_path.display().to_string(),
            profile: args.profile.clone(),
            paper_mm: (paper_w_mm, paper_h_mm),
            grid: (sheet.plan.columns, sheet.plan.rows),
            placed: sheet.placed_count,
            orientation_swapped: sheet.plan.orientation_swapped,
            used_fallback_crop: sheet.used_fallback_crop,
            alignment: sheet.alignment,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&record).map_err(|e| e.to_string())?
        );
    } else {
        println!(
            "{}x{} grid on {}x{} cm{} — {} photos placed",
            sheet.plan.columns,
            sheet.plan.rows,
            paper_w_mm / 10,
            paper_h_mm / 10,
            if sheet.plan.orientation_swapped {
                " (rotated)"
            } else {
                ""
            },
            sheet.placed_count,
        );
        if let Some(report) = &sheet.alignment {
            println!(
                "head {} px, eyes {} px from top, headspace {} px{}{}",
                report.head_height_px,
                report.eye_from_top_px,
                report.headspace_px,
                if report.headspace_adjusted {
                    " [headspace corrected]"
                } else {
                    ""
                },
                if report.downscaled {
                    " [crop downscaled]"
                } else {
                    ""
                },
            );
        } else {
            println!("no usable face — heuristic center crop");
        }
        println!("saved to {}", output_path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
