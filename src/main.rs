mod capture;
mod cli;
mod config;
mod encode;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use capture::engine::CaptureEngine;
use capture::stimulus::{SampleRom, Stimulus};
use capture::transform::RadixFft;
use cli::Cli;
use encode::ffmpeg::FfmpegEncoder;
use render::bins::BinStore;
use render::compositor::BarCompositor;
use render::scanout::FrameScanner;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect barscope.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("barscope.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("barscope").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        None
    });
    let mut display = config::DisplayConfig::default();
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.fps == 60 { cli.fps = cfg.output.fps; }
            if cli.crf == 18 { cli.crf = cfg.output.crf; }
            if cli.codec == "libx264" { cli.codec = cfg.output.codec; }
            if cli.pattern == "sine" { cli.pattern = cfg.stimulus.pattern; }
            if cli.tone_bin == 8.0 { cli.tone_bin = cfg.stimulus.tone_bin; }
            if cli.burst_hz == 60.0 { cli.burst_hz = cfg.stimulus.burst_hz; }
            display = cfg.display;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    // 1. Stimulus: decoded WAV windows, or a synthetic pattern
    let stimulus = match cli.input {
        Some(ref path) => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            Stimulus::from_wav(path)?
        }
        None => Stimulus::from_pattern(&cli.pattern, cli.tone_bin)
            .context("Invalid --pattern")?,
    };

    log::info!("barscope - VGA spectrum analyzer simulator");
    log::info!(
        "Stimulus: {}",
        match cli.input {
            Some(ref p) => p.display().to_string(),
            None => cli.pattern.clone(),
        }
    );

    // 2. Shared height store and the scanout side
    let bins = Arc::new(BinStore::new());
    let compositor = BarCompositor::new(display.foreground, display.background);
    let mut scanner = FrameScanner::new(compositor);

    // Snapshot mode: one burst, one frame, done
    if let Some(ref path) = cli.snapshot {
        let mut engine = CaptureEngine::new(
            SampleRom::new(stimulus.table(0)),
            Box::new(RadixFft::new()),
            bins.clone(),
        );
        engine.run_burst();
        let pixels = scanner.scan_frame(&bins);
        return render::scanout::save_png(path, &pixels);
    }

    log::info!("Output: {}", cli.output.display());
    log::info!("Frames: {} @ {}fps, capture {} bursts/s", cli.frames, cli.fps, cli.burst_hz);

    // 3. Capture domain: its own thread, paced by the burst clock,
    // coupled to the scanout only through the bin store
    let running = Arc::new(AtomicBool::new(true));
    let capture_thread = {
        let bins = bins.clone();
        let running = running.clone();
        let burst_period = Duration::from_secs_f64(1.0 / cli.burst_hz.max(1e-3));
        thread::spawn(move || {
            let mut engine = CaptureEngine::new(
                SampleRom::new(stimulus.table(0)),
                Box::new(RadixFft::new()),
                bins,
            );
            let mut burst: u64 = 0;
            while running.load(Ordering::Relaxed) {
                engine.load_table(stimulus.table(burst));
                engine.run_burst();
                burst += 1;
                thread::sleep(burst_period);
            }
            log::debug!(
                "Capture thread stopping after {} bursts",
                engine.bursts_completed()
            );
        })
    };

    // 4. Encoder
    let mut encoder = FfmpegEncoder::new(
        &cli.output,
        cli.fps,
        &cli.codec,
        &cli.pix_fmt,
        cli.crf,
        cli.bitrate.as_deref(),
    )?;

    // 5. Scanout loop, real-time paced so the capture domain keeps up
    let pb = ProgressBar::new(cli.frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let frame_period = Duration::from_secs_f64(1.0 / cli.fps.max(1) as f64);
    let start = Instant::now();
    for frame_idx in 0..cli.frames {
        let deadline = start + frame_period * frame_idx;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }

        let pixels = scanner.scan_frame(&bins);
        encoder.write_frame(&pixels)?;
        pb.set_position(frame_idx as u64 + 1);
    }
    pb.finish_with_message("Rendering complete");

    // 6. Shut down the capture domain, then flush the encoder
    running.store(false, Ordering::Relaxed);
    if capture_thread.join().is_err() {
        log::warn!("Capture thread exited abnormally");
    }

    log::info!("Finishing encoding...");
    encoder.finish()?;

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}
