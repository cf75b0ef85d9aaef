// Still-image runner: treats a list of image files as consecutive frames,
// marks the brightest region of each, and optionally writes the annotated
// frames as PNGs. Files that cannot be read are skipped with a warning.

use brightspot::Frame;
use brightspot::cli::SearchArgs;
use brightspot::core_modules::utils::image_helper::image_helper;
use brightspot::parallel_pipeline::ParallelPipeline;
use brightspot::pipeline::{BrightSpotPipeline, FrameSource, ImageSequenceSource, Report};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "brightspot")]
#[command(version, about = "Find and mark the brightest region of each frame", long_about = None)]
struct Cli {
    /// Image files, processed in order as frames of one stream
    #[arg(value_name = "FRAME", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for annotated frames
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Score cells on a pool of worker threads
    #[arg(long)]
    parallel: bool,

    #[command(flatten)]
    search: SearchArgs,
}

fn output_path(out_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    out_dir.join(format!("{stem}_brightspot.png"))
}

fn describe(input: &Path, report: &Report) {
    match report.hit() {
        Some(hit) => println!(
            "{}: cell ({}, {}) at ({}, {}), score {:.1}",
            input.display(),
            hit.cell.0,
            hit.cell.1,
            hit.point.0,
            hit.point.1,
            hit.score
        ),
        None => println!("{}: no region found", input.display()),
    }
}

/// Next readable frame and the file it came from, skipping recoverable failures.
fn next_frame(source: &mut ImageSequenceSource) -> anyhow::Result<Option<(Frame, PathBuf)>> {
    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                let input = source.last_path().map(Path::to_path_buf).unwrap_or_default();
                return Ok(Some((frame, input)));
            }
            Ok(None) => return Ok(None),
            Err(err) if !err.is_fatal() => log::warn!("skipping frame: {}", err),
            Err(err) => return Err(err.into()),
        }
    }
}

fn run_sequential(cli: &Cli) -> anyhow::Result<()> {
    let mut pipeline = BrightSpotPipeline::new(cli.search.to_config());
    let mut source = ImageSequenceSource::new(cli.inputs.iter().cloned());
    let mut processed = 0;

    while let Some((mut frame, input)) = next_frame(&mut source)? {
        let report = pipeline.process_frame(&mut frame)?;
        describe(&input, &report);
        if let Some(out_dir) = &cli.out {
            image_helper::save(output_path(out_dir, &input), &frame)?;
        }
        processed += 1;
    }

    log::info!("{} of {} frames processed", processed, cli.inputs.len());
    Ok(())
}

async fn run_parallel(cli: &Cli) -> anyhow::Result<()> {
    let mut pipeline = ParallelPipeline::new(cli.search.to_config());
    let mut source = ImageSequenceSource::new(cli.inputs.iter().cloned());
    let mut processed = 0;

    while let Some((frame, input)) = next_frame(&mut source)? {
        let (annotated, report) = pipeline.process_frame(frame).await?;
        describe(&input, &report);
        if let Some(out_dir) = &cli.out {
            image_helper::save(output_path(out_dir, &input), &annotated)?;
        }
        processed += 1;
    }

    log::info!("{} of {} frames processed", processed, cli.inputs.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(out_dir) = &cli.out {
        std::fs::create_dir_all(out_dir)?;
    }

    if cli.parallel {
        run_parallel(&cli).await
    } else {
        run_sequential(&cli)
    }
}
