use std::sync::Arc;

use super::client::BurstClient;
use super::reduce::reduce;
use super::stimulus::SampleRom;
use super::transform::StreamingTransform;
use crate::render::bins::BinStore;

/// Ties the write side together: ROM -> handshake -> reduction -> bin
/// store. This engine is the store's single producer.
pub struct CaptureEngine {
    rom: SampleRom,
    client: BurstClient,
    transform: Box<dyn StreamingTransform + Send>,
    bins: Arc<BinStore>,
}

impl CaptureEngine {
    pub fn new(
        rom: SampleRom,
        transform: Box<dyn StreamingTransform + Send>,
        bins: Arc<BinStore>,
    ) -> Self {
        Self {
            rom,
            client: BurstClient::new(),
            transform,
            bins,
        }
    }

    /// Swap the ROM contents for the next burst.
    pub fn load_table(&mut self, table: Vec<i16>) {
        self.rom.load(table);
    }

    pub fn trigger(&mut self) {
        self.client.trigger();
    }

    pub fn is_idle(&self) -> bool {
        self.client.is_idle()
    }

    pub fn bursts_completed(&self) -> u64 {
        self.client.bursts_completed()
    }

    /// Advance one capture cycle, landing any forwarded result in the
    /// store.
    pub fn tick(&mut self) {
        if let Some(out) = self.client.tick(&mut self.rom, self.transform.as_mut()) {
            self.bins.write(out.bin, reduce(out.result.re, out.result.im));
        }
    }

    /// Run one complete capture-to-store burst. Stalls for as long as
    /// the transform withholds readiness or results.
    pub fn run_burst(&mut self) {
        self.trigger();
        self.tick();
        while !self.client.is_idle() {
            self.tick();
        }
    }
}
