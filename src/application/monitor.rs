//! Operation timing.
//!
//! Purely informational: timings feed the `seodeck_op_duration_ms`
//! histogram and a debug event, nothing reads them back.

use std::time::Instant;

use metrics::histogram;
use tracing::debug;

pub struct OpTimer {
    op: &'static str,
    started: Instant,
}

impl OpTimer {
    pub fn start(op: &'static str) -> Self {
        Self {
            op,
            started: Instant::now(),
        }
    }
}

impl Drop for OpTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        histogram!("seodeck_op_duration_ms", "op" => self.op).record(elapsed_ms);
        debug!(op = self.op, elapsed_ms, "operation timed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_drop_does_not_panic_without_recorder() {
        let timer = OpTimer::start("tests.noop");
        drop(timer);
    }
}
