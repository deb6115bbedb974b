use super::bins::{BinStore, NUM_BINS};
use super::timing::{RasterPoint, H_DISPLAY, V_DISPLAY};

/// Columns per bar; NUM_BINS bars span the display width exactly.
pub const BAR_WIDTH: u32 = 5;

pub type Rgba = [u8; 4];

/// Maps the current raster point to an on/off color decision. Pure
/// arithmetic on one slot read, so it always completes within the tick.
pub struct BarCompositor {
    foreground: Rgba,
    background: Rgba,
}

impl BarCompositor {
    pub fn new(foreground: [u8; 3], background: [u8; 3]) -> Self {
        Self {
            foreground: [foreground[0], foreground[1], foreground[2], 255],
            background: [background[0], background[1], background[2], 255],
        }
    }

    pub fn shade(&self, pt: RasterPoint, bins: &BinStore) -> Rgba {
        if !pt.visible {
            return self.background;
        }
        let bar = (pt.x / BAR_WIDTH) as usize;
        // Bin order is reversed relative to column order. This mirrors
        // the transform's natural output ordering; keep it bit-exact.
        let height = bins.get(NUM_BINS - 1 - bar) as u32;
        if pt.y + height > V_DISPLAY {
            self.foreground
        } else {
            self.background
        }
    }
}

// Compile-time check that the bars tile the display exactly.
const _: () = assert!(BAR_WIDTH * NUM_BINS as u32 == H_DISPLAY);
