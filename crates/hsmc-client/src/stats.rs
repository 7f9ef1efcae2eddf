//! Lightweight counters exposed alongside the driver, not part of the wire
//! protocol.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HsmStats {
    pub requests_sent: u64,
    pub responses_ok: u64,
    pub responses_aborted: u64,
}

impl HsmStats {
    pub(crate) fn record_sent(&mut self) {
        self.requests_sent += 1;
    }

    pub(crate) fn record_ok(&mut self) {
        self.responses_ok += 1;
    }

    pub(crate) fn record_aborted(&mut self) {
        self.responses_aborted += 1;
    }
}
