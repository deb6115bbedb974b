use anyhow::{Context, Result};
use std::f32::consts::PI;
use std::path::Path;

use super::transform::BURST_LEN;

const SINE_AMPLITUDE: f32 = 12000.0;

/// Fixed playback table feeding the burst client, one sample per request.
/// Exhausting the table stops the index from advancing until `reset`.
pub struct SampleRom {
    table: Vec<i16>,
    pos: usize,
    done: bool,
}

impl SampleRom {
    pub fn new(mut table: Vec<i16>) -> Self {
        if table.is_empty() {
            table.push(0);
        }
        Self {
            table,
            pos: 0,
            done: false,
        }
    }

    pub fn next(&mut self) -> i16 {
        let value = self.table[self.pos];
        if self.pos + 1 < self.table.len() {
            self.pos += 1;
        } else {
            self.done = true;
        }
        value
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.done = false;
    }

    /// Swap in a fresh burst table and rewind.
    pub fn load(&mut self, table: Vec<i16>) {
        if !table.is_empty() {
            self.table = table;
        }
        self.reset();
    }
}

/// Source of per-burst sample tables. The analyzer core does not care
/// where the samples come from; patterns and decoded WAV windows are
/// interchangeable.
pub enum Stimulus {
    /// All-zero bursts.
    Zero,
    /// Sinusoid at a fixed bin position, amplitude breathing per burst.
    Sine { bin: f32 },
    /// Sinusoid whose bin position steps per burst.
    Sweep { start_bin: f32 },
    /// Successive windows of a decoded mono WAV file, wrapping at the end.
    Wav { samples: Vec<i16> },
}

impl Stimulus {
    pub fn from_pattern(pattern: &str, tone_bin: f32) -> Result<Self> {
        match pattern {
            "zero" => Ok(Stimulus::Zero),
            "sine" => Ok(Stimulus::Sine { bin: tone_bin }),
            "sweep" => Ok(Stimulus::Sweep { start_bin: tone_bin }),
            other => anyhow::bail!("Unknown stimulus pattern: {}", other),
        }
    }

    pub fn from_wav(path: &Path) -> Result<Self> {
        let samples = load_wav_mono(path)?;
        Ok(Stimulus::Wav { samples })
    }

    /// Produce the sample table for the given burst number.
    pub fn table(&self, burst: u64) -> Vec<i16> {
        match self {
            Stimulus::Zero => vec![0; BURST_LEN],
            Stimulus::Sine { bin } => {
                let amp = SINE_AMPLITUDE * (0.55 + 0.45 * (burst as f32 * 0.08).sin());
                sine_table(*bin, amp)
            }
            Stimulus::Sweep { start_bin } => {
                let bin = (start_bin + burst as f32 * 0.25) % (BURST_LEN as f32 / 2.0);
                sine_table(bin, SINE_AMPLITUDE)
            }
            Stimulus::Wav { samples } => {
                let start = (burst as usize * BURST_LEN) % samples.len().max(1);
                (0..BURST_LEN)
                    .map(|i| samples[(start + i) % samples.len()])
                    .collect()
            }
        }
    }
}

fn sine_table(bin: f32, amplitude: f32) -> Vec<i16> {
    (0..BURST_LEN)
        .map(|n| {
            let phase = 2.0 * PI * bin * n as f32 / BURST_LEN as f32;
            (amplitude * phase.sin()).round() as i16
        })
        .collect()
}

/// Decode a WAV file to mono i16, downmixing interleaved channels.
pub fn load_wav_mono(path: &Path) -> Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read float samples")?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .context("Failed to read integer samples")?
        }
    };

    if samples.is_empty() {
        anyhow::bail!("WAV file contains no samples: {}", path.display());
    }

    // Downmix to mono
    let mut mono: Vec<i16> = Vec::with_capacity(samples.len() / channels.max(1));
    for frame in samples.chunks(channels.max(1)) {
        let avg: f32 = frame.iter().sum::<f32>() / frame.len() as f32;
        mono.push((avg * i16::MAX as f32).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16);
    }

    log::info!(
        "Decoded WAV stimulus: {} samples, {}Hz, {} channel(s)",
        mono.len(),
        spec.sample_rate,
        channels
    );

    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_walks_table_in_order() {
        let mut rom = SampleRom::new(vec![1, 2, 3]);
        assert_eq!(rom.next(), 1);
        assert_eq!(rom.next(), 2);
        assert!(!rom.is_done());
        assert_eq!(rom.next(), 3);
        assert!(rom.is_done());
    }

    #[test]
    fn rom_stops_advancing_when_exhausted() {
        let mut rom = SampleRom::new(vec![7, 8]);
        rom.next();
        rom.next();
        assert!(rom.is_done());
        // Past the end the last value repeats; the index stays put.
        assert_eq!(rom.next(), 8);
        assert_eq!(rom.next(), 8);
    }

    #[test]
    fn rom_reset_rewinds() {
        let mut rom = SampleRom::new(vec![5, 6]);
        rom.next();
        rom.next();
        rom.reset();
        assert!(!rom.is_done());
        assert_eq!(rom.next(), 5);
    }

    #[test]
    fn rom_load_swaps_table_and_rewinds() {
        let mut rom = SampleRom::new(vec![1]);
        rom.next();
        rom.load(vec![9, 10]);
        assert!(!rom.is_done());
        assert_eq!(rom.next(), 9);
        assert_eq!(rom.next(), 10);
        assert!(rom.is_done());
    }

    #[test]
    fn zero_stimulus_is_all_zero() {
        let table = Stimulus::Zero.table(3);
        assert_eq!(table.len(), BURST_LEN);
        assert!(table.iter().all(|&s| s == 0));
    }

    #[test]
    fn sine_stimulus_fills_a_full_burst() {
        let stim = Stimulus::Sine { bin: 8.0 };
        let table = stim.table(0);
        assert_eq!(table.len(), BURST_LEN);
        assert!(table.iter().any(|&s| s != 0));
    }

    #[test]
    fn wav_stimulus_windows_wrap() {
        let stim = Stimulus::Wav {
            samples: vec![1, 2, 3],
        };
        let table = stim.table(0);
        assert_eq!(table.len(), BURST_LEN);
        assert_eq!(&table[..4], &[1, 2, 3, 1]);
    }

    #[test]
    fn unknown_pattern_is_rejected() {
        assert!(Stimulus::from_pattern("triangle", 8.0).is_err());
    }
}
