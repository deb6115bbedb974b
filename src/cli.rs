use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "barscope",
    about = "VGA-timed FFT bar-graph spectrum analyzer simulator"
)]
pub struct Cli {
    /// Input WAV file used as the sample stimulus (patterns used if omitted)
    pub input: Option<PathBuf>,

    /// Output video file
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,

    /// Render a single PNG snapshot instead of a video
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Stimulus pattern when no input file is given (zero, sine, sweep)
    #[arg(short, long, default_value = "sine")]
    pub pattern: String,

    /// Tone position for sine/sweep patterns, in FFT bins
    #[arg(long, default_value_t = 8.0)]
    pub tone_bin: f32,

    /// Number of video frames to render
    #[arg(long, default_value_t = 300)]
    pub frames: u32,

    /// Output frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Capture bursts per second
    #[arg(long, default_value_t = 60.0)]
    pub burst_hz: f64,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
