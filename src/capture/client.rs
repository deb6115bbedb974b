use super::stimulus::SampleRom;
use super::transform::{StreamingTransform, TransformResult, BURST_LEN};

/// Burst state machine phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a latched start.
    Idle,
    /// One cycle to arm the stream.
    LatchStart,
    /// Submitting samples, gated by transform readiness.
    Streaming,
    /// Consuming results as they become valid.
    Draining,
}

/// One `(bin, result)` pair forwarded downstream with its validity pulse.
#[derive(Clone, Copy, Debug)]
pub struct BurstOutput {
    pub bin: usize,
    pub result: TransformResult,
}

/// Drives the push/pull handshake against the transform: exactly
/// BURST_LEN samples out, exactly BURST_LEN results back, one burst in
/// flight at a time. A start trigger is edge-latched while idle;
/// triggers during an active burst are ignored.
pub struct BurstClient {
    phase: Phase,
    start_latched: bool,
    sent: usize,
    received: usize,
    bursts_completed: u64,
}

impl BurstClient {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            start_latched: false,
            sent: 0,
            received: 0,
            bursts_completed: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && !self.start_latched
    }

    pub fn bursts_completed(&self) -> u64 {
        self.bursts_completed
    }

    /// Latch a start request. A single call suffices regardless of how
    /// long the caller holds it; calls while a burst is in flight do
    /// nothing.
    pub fn trigger(&mut self) {
        if self.phase == Phase::Idle {
            self.start_latched = true;
        }
    }

    /// Advance one cycle. At most one sample is submitted or one result
    /// consumed per call; a not-ready transform stalls the stream
    /// indefinitely.
    pub fn tick(
        &mut self,
        rom: &mut SampleRom,
        transform: &mut dyn StreamingTransform,
    ) -> Option<BurstOutput> {
        match self.phase {
            Phase::Idle => {
                if self.start_latched {
                    self.start_latched = false;
                    self.phase = Phase::LatchStart;
                }
                None
            }
            Phase::LatchStart => {
                rom.reset();
                self.sent = 0;
                self.received = 0;
                self.phase = Phase::Streaming;
                None
            }
            Phase::Streaming => {
                if transform.in_ready() {
                    let sample = rom.next();
                    // A ROM that runs short ends the stream early; the
                    // transform sees the end-of-burst tag either way.
                    let last = self.sent == BURST_LEN - 1 || rom.is_done();
                    transform.push(sample, last);
                    self.sent += 1;
                    if last {
                        self.phase = Phase::Draining;
                    }
                }
                None
            }
            Phase::Draining => {
                let result = transform.pull()?;
                let bin = self.received;
                self.received += 1;
                if result.last || self.received == BURST_LEN {
                    self.phase = Phase::Idle;
                    self.bursts_completed += 1;
                }
                Some(BurstOutput { bin, result })
            }
        }
    }
}

impl Default for BurstClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scriptable transform double: records accepted samples, echoes a
    /// full result set once the tagged last sample arrives.
    struct MockTransform {
        ready: bool,
        accepted: Vec<(i16, bool)>,
        results: VecDeque<TransformResult>,
    }

    impl MockTransform {
        fn new() -> Self {
            Self {
                ready: true,
                accepted: Vec::new(),
                results: VecDeque::new(),
            }
        }
    }

    impl StreamingTransform for MockTransform {
        fn in_ready(&self) -> bool {
            self.ready
        }

        fn push(&mut self, sample: i16, last: bool) {
            self.accepted.push((sample, last));
            if last {
                for i in 0..BURST_LEN {
                    self.results.push_back(TransformResult {
                        re: i as i16,
                        im: 0,
                        last: i == BURST_LEN - 1,
                    });
                }
            }
        }

        fn pull(&mut self) -> Option<TransformResult> {
            self.results.pop_front()
        }
    }

    fn table() -> Vec<i16> {
        (0..BURST_LEN as i16).collect()
    }

    fn run_to_idle(
        client: &mut BurstClient,
        rom: &mut SampleRom,
        transform: &mut MockTransform,
    ) -> Vec<BurstOutput> {
        let mut outputs = Vec::new();
        for _ in 0..10 * BURST_LEN {
            if let Some(out) = client.tick(rom, transform) {
                outputs.push(out);
            }
            if client.is_idle() {
                break;
            }
        }
        outputs
    }

    #[test]
    fn one_burst_submits_and_drains_exactly_n() {
        let mut client = BurstClient::new();
        let mut rom = SampleRom::new(table());
        let mut transform = MockTransform::new();

        client.trigger();
        let outputs = run_to_idle(&mut client, &mut rom, &mut transform);

        assert_eq!(transform.accepted.len(), BURST_LEN);
        for (i, &(sample, last)) in transform.accepted.iter().enumerate() {
            assert_eq!(sample, i as i16);
            assert_eq!(last, i == BURST_LEN - 1);
        }
        assert_eq!(outputs.len(), BURST_LEN);
        for (i, out) in outputs.iter().enumerate() {
            assert_eq!(out.bin, i);
            assert_eq!(out.result.re, i as i16);
        }
        assert!(client.is_idle());
        assert_eq!(client.bursts_completed(), 1);
    }

    #[test]
    fn single_call_trigger_latches() {
        let mut client = BurstClient::new();
        let mut rom = SampleRom::new(table());
        let mut transform = MockTransform::new();

        client.trigger();
        // The latch survives until the idle cycle consumes it.
        client.tick(&mut rom, &mut transform);
        assert_eq!(client.phase(), Phase::LatchStart);
    }

    #[test]
    fn triggers_during_burst_are_ignored() {
        let mut client = BurstClient::new();
        let mut rom = SampleRom::new(table());
        let mut transform = MockTransform::new();

        client.trigger();
        client.tick(&mut rom, &mut transform); // Idle -> LatchStart
        client.tick(&mut rom, &mut transform); // LatchStart -> Streaming
        client.trigger();
        client.trigger();
        run_to_idle(&mut client, &mut rom, &mut transform);

        assert_eq!(client.bursts_completed(), 1);
        // No second burst pending.
        client.tick(&mut rom, &mut transform);
        assert!(client.is_idle());
        assert_eq!(transform.accepted.len(), BURST_LEN);
    }

    #[test]
    fn backpressure_stalls_without_submitting() {
        let mut client = BurstClient::new();
        let mut rom = SampleRom::new(table());
        let mut transform = MockTransform::new();
        transform.ready = false;

        client.trigger();
        for _ in 0..50 {
            client.tick(&mut rom, &mut transform);
        }
        assert_eq!(client.phase(), Phase::Streaming);
        assert!(transform.accepted.is_empty());

        // Readiness returning releases the stall.
        transform.ready = true;
        run_to_idle(&mut client, &mut rom, &mut transform);
        assert_eq!(transform.accepted.len(), BURST_LEN);
        assert!(client.is_idle());
    }

    #[test]
    fn retrigger_after_idle_runs_second_burst() {
        let mut client = BurstClient::new();
        let mut rom = SampleRom::new(table());
        let mut transform = MockTransform::new();

        client.trigger();
        run_to_idle(&mut client, &mut rom, &mut transform);
        client.trigger();
        run_to_idle(&mut client, &mut rom, &mut transform);

        assert_eq!(client.bursts_completed(), 2);
        assert_eq!(transform.accepted.len(), 2 * BURST_LEN);
    }
}
