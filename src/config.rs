use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub stimulus: StimulusConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

#[derive(Debug, Deserialize)]
pub struct StimulusConfig {
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default = "default_tone_bin")]
    pub tone_bin: f32,
    #[serde(default = "default_burst_hz")]
    pub burst_hz: f64,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_foreground")]
    pub foreground: [u8; 3],
    #[serde(default = "default_background")]
    pub background: [u8; 3],
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            tone_bin: default_tone_bin(),
            burst_hz: default_burst_hz(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            foreground: default_foreground(),
            background: default_background(),
        }
    }
}

fn default_fps() -> u32 { 60 }
fn default_crf() -> u32 { 18 }
fn default_codec() -> String { "libx264".into() }
fn default_pattern() -> String { "sine".into() }
fn default_tone_bin() -> f32 { 8.0 }
fn default_burst_hz() -> f64 { 60.0 }
fn default_foreground() -> [u8; 3] { [0, 255, 96] }
fn default_background() -> [u8; 3] { [0, 0, 0] }

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
