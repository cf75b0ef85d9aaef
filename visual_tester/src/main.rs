use brightspot::cli::SearchArgs;
use brightspot::pipeline::{BrightSpotPipeline, FrameSource, Report};
use brightspot::{BrightSpotError, Frame};
use clap::Parser;
use opencv::{
    core::{self, Mat},
    highgui,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::ops::ControlFlow;
use std::path::PathBuf;

const WINDOW_NAME: &str = "Object Tracking";
const KEY_ESCAPE: i32 = 27;
const KEY_QUIT: i32 = 'q' as i32;

#[derive(Parser)]
#[command(name = "visual_tester")]
#[command(about = "Live brightest-region tracking on a camera or video file", long_about = None)]
struct Cli {
    /// Camera device index, used when no input file is given
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// Read frames from a video file instead of a camera
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Also write the annotated stream to this video file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Do not open a preview window
    #[arg(long)]
    headless: bool,

    #[command(flatten)]
    search: SearchArgs,
}

fn to_engine_error(err: opencv::Error) -> BrightSpotError {
    BrightSpotError::Io(std::io::Error::other(err.to_string()))
}

/// Pulls BGR frames from an OpenCV capture device.
struct CaptureSource {
    cap: VideoCapture,
    mat: Mat,
}

impl CaptureSource {
    fn open(cli: &Cli) -> opencv::Result<Self> {
        let mut cap = match &cli.input {
            Some(path) => VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?,
            None => VideoCapture::new(cli.camera, videoio::CAP_ANY)?,
        };
        cap.set(videoio::CAP_PROP_FORMAT, core::CV_8UC3 as f64)?;
        Ok(Self {
            cap,
            mat: Mat::default(),
        })
    }

    fn is_opened(&self) -> opencv::Result<bool> {
        self.cap.is_opened()
    }

    fn fps(&self) -> opencv::Result<f64> {
        let fps = self.cap.get(videoio::CAP_PROP_FPS)?;
        Ok(if fps > 0.0 { fps } else { 30.0 })
    }
}

impl FrameSource for CaptureSource {
    fn next_frame(&mut self) -> brightspot::Result<Option<Frame>> {
        if !self.cap.read(&mut self.mat).map_err(to_engine_error)? || self.mat.empty() {
            return Ok(None);
        }

        // `data_bytes` needs one contiguous block; ROI views and padded rows are copied first.
        let continuous;
        let mat = if self.mat.is_continuous() {
            &self.mat
        } else {
            continuous = self.mat.try_clone().map_err(to_engine_error)?;
            &continuous
        };

        let bytes = mat.data_bytes().map_err(to_engine_error)?.to_vec();
        Frame::from_raw(mat.cols() as u32, mat.rows() as u32, bytes).map(Some)
    }
}

/// Copies an annotated frame back into a BGR `Mat` for display and encoding.
fn to_mat(frame: &Frame, mat: &mut Mat) -> opencv::Result<()> {
    let (width, height) = (frame.width() as i32, frame.height() as i32);
    if mat.cols() != width || mat.rows() != height {
        *mat = Mat::new_rows_cols_with_default(height, width, core::CV_8UC3, core::Scalar::all(0.0))?;
    }
    mat.data_bytes_mut()?.copy_from_slice(frame.as_bytes());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // --- 1. Video I/O Initialization ---
    let mut source = CaptureSource::open(&cli)?;
    if !source.is_opened()? {
        eprintln!("Video device not opened.");
        return Ok(());
    }
    let fps = source.fps()?;

    if !cli.headless {
        highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE)?;
    }

    // --- 2. Pipeline Initialization ---
    let mut pipeline = BrightSpotPipeline::new(cli.search.to_config());
    let mut display = Mat::default();
    let mut writer: Option<VideoWriter> = None;
    let mut display_error: Option<opencv::Error> = None;

    // --- 3. Main Processing Loop ---
    let summary = pipeline.run_session(&mut source, |frame, report| {
        if let Report::NoRegionFound = report {
            log::debug!("frame skipped: no region");
        }

        let step = (|| -> opencv::Result<ControlFlow<()>> {
            to_mat(frame, &mut display)?;

            if let Some(path) = &cli.output {
                if writer.is_none() {
                    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
                    writer = Some(VideoWriter::new(
                        &path.to_string_lossy(),
                        fourcc,
                        fps,
                        core::Size::new(display.cols(), display.rows()),
                        true,
                    )?);
                }
                if let Some(writer) = writer.as_mut() {
                    writer.write(&display)?;
                }
            }

            if cli.headless {
                return Ok(ControlFlow::Continue(()));
            }
            highgui::imshow(WINDOW_NAME, &display)?;
            match highgui::wait_key(1)? {
                KEY_ESCAPE | KEY_QUIT => Ok(ControlFlow::Break(())),
                _ => Ok(ControlFlow::Continue(())),
            }
        })();

        step.unwrap_or_else(|err| {
            display_error = Some(err);
            ControlFlow::Break(())
        })
    })?;

    if let Some(err) = display_error {
        return Err(err.into());
    }

    println!(
        "Processing complete: {} frames, {} regions found.",
        summary.frames_processed, summary.regions_found
    );
    Ok(())
}
