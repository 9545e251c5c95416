//! Stock render sinks for headless runs.

use std::io::{self, Write};

use super::{FrameSnapshot, RenderSink};

/// Logs a one-line frame summary every `every` frames.
#[derive(Debug, Clone)]
pub struct LogSink {
    every: u64,
}

impl LogSink {
    pub fn new(every: u64) -> Self {
        Self { every }
    }
}

impl RenderSink for LogSink {
    fn render(&mut self, frame: &FrameSnapshot<'_>) {
        if self.every == 0 || frame.frame % self.every != 0 {
            return;
        }
        let summary = frame.summary();
        log::info!(
            "[Render] frame={} mode={} scheme={:?} particles={} mean_trail={:.1} blobs={}",
            summary.frame,
            summary.mode,
            summary.scheme,
            summary.particle_count,
            summary.mean_trail_len,
            summary.blob_count
        );
    }
}

/// Writes one JSON `FrameSummary` per frame.
///
/// Write failures are logged once and further output is dropped; rendering
/// never stops the driver. [`RenderSink::finish`] flushes the writer and
/// reports an earlier write failure.
pub struct JsonLinesSink<W: Write> {
    out: W,
    failed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for JsonLinesSink<W> {
    fn render(&mut self, frame: &FrameSnapshot<'_>) {
        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, &frame.summary())
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"));
        if let Err(err) = result {
            log::warn!("[Render] Frame output disabled after write error: {}", err);
            self.failed = true;
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.failed {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "frame output was disabled after a write error",
            ));
        }
        self.out.flush()
    }
}
