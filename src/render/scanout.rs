use anyhow::{Context, Result};
use std::path::Path;

use super::bins::BinStore;
use super::compositor::BarCompositor;
use super::timing::{RasterTiming, H_DISPLAY, H_TOTAL, V_DISPLAY, V_TOTAL};

pub const FRAME_BYTES: usize = (H_DISPLAY * V_DISPLAY * 4) as usize;

/// Sweeps the raster generator across one full period and packs the
/// visible pixel decisions into an RGBA frame.
pub struct FrameScanner {
    timing: RasterTiming,
    compositor: BarCompositor,
}

impl FrameScanner {
    pub fn new(compositor: BarCompositor) -> Self {
        Self {
            timing: RasterTiming::new(),
            compositor,
        }
    }

    /// Scan one frame. The generator starts each call at (0,0) and
    /// wraps back there after exactly one period, so frames stay
    /// aligned without any external synchronization.
    pub fn scan_frame(&mut self, bins: &BinStore) -> Vec<u8> {
        let mut pixels = vec![0u8; FRAME_BYTES];
        for _ in 0..H_TOTAL * V_TOTAL {
            let pt = self.timing.current();
            if pt.visible {
                let idx = ((pt.y * H_DISPLAY + pt.x) * 4) as usize;
                pixels[idx..idx + 4].copy_from_slice(&self.compositor.shade(pt, bins));
            }
            self.timing.tick();
        }
        pixels
    }
}

/// Write one scanned frame as a PNG.
pub fn save_png(path: &Path, pixels: &[u8]) -> Result<()> {
    image::save_buffer(
        path,
        pixels,
        H_DISPLAY,
        V_DISPLAY,
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("Failed to write PNG: {}", path.display()))?;
    log::info!("Wrote snapshot: {}", path.display());
    Ok(())
}
