use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::collections::VecDeque;
use std::sync::Arc;

/// Samples per capture burst, and therefore frequency bins per frame.
pub const BURST_LEN: usize = 128;

/// One complex bin delivered by the transform, in submission order.
/// `last` marks the final bin of a burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformResult {
    pub re: i16,
    pub im: i16,
    pub last: bool,
}

/// The external frequency-transform capability. Push samples one at a
/// time while `in_ready` holds, tagging the final one; pull results as
/// they become valid, FIFO relative to submission. Implementations may
/// withhold readiness indefinitely; callers stall rather than time out.
pub trait StreamingTransform {
    fn in_ready(&self) -> bool;
    fn push(&mut self, sample: i16, last: bool);
    fn pull(&mut self) -> Option<TransformResult>;
}

/// Production transform on rustfft. Collects the burst, runs a forward
/// FFT on the tagged last push, and hands back quantized bins one per
/// pull. Not ready again until the previous burst is fully drained.
pub struct RadixFft {
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    window: Vec<Complex<f32>>,
    out: VecDeque<TransformResult>,
}

impl RadixFft {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(BURST_LEN);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft,
            scratch,
            window: Vec::with_capacity(BURST_LEN),
            out: VecDeque::new(),
        }
    }
}

impl Default for RadixFft {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingTransform for RadixFft {
    fn in_ready(&self) -> bool {
        self.out.is_empty() && self.window.len() < BURST_LEN
    }

    fn push(&mut self, sample: i16, last: bool) {
        self.window.push(Complex::new(sample as f32, 0.0));
        if last || self.window.len() == BURST_LEN {
            // A short burst is zero-padded to the transform size.
            self.window.resize(BURST_LEN, Complex::new(0.0, 0.0));
            self.fft
                .process_with_scratch(&mut self.window, &mut self.scratch);
            // 1/N scaling keeps full-scale inputs inside the i16 lanes.
            let scale = 1.0 / BURST_LEN as f32;
            for (i, c) in self.window.iter().enumerate() {
                self.out.push_back(TransformResult {
                    re: quantize(c.re * scale),
                    im: quantize(c.im * scale),
                    last: i == BURST_LEN - 1,
                });
            }
            self.window.clear();
        }
    }

    fn pull(&mut self) -> Option<TransformResult> {
        self.out.pop_front()
    }
}

fn quantize(v: f32) -> i16 {
    v.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
