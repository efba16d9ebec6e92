//! Log output that stays clear of live spinners

use indicatif::MultiProgress;
use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;

/// Wraps a tracing writer so every write runs with the spinners hidden
pub struct SuspendWriter<M> {
    bars: MultiProgress,
    inner: M,
}

impl<M> SuspendWriter<M> {
    pub fn new(bars: MultiProgress, inner: M) -> Self {
        Self { bars, inner }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for SuspendWriter<M> {
    type Writer = Suspended<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        Suspended {
            bars: self.bars.clone(),
            inner: self.inner.make_writer(),
        }
    }
}

pub struct Suspended<W> {
    bars: MultiProgress,
    inner: W,
}

impl<W: Write> Write for Suspended<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bars.suspend(|| self.inner.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.bars.suspend(|| self.inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.bars.suspend(|| self.inner.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::{ProgressBar, ProgressDrawTarget};
    use std::sync::Mutex;

    #[test]
    fn test_writes_pass_through_while_spinner_is_live() {
        let bars = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let spinner = bars.add(ProgressBar::new_spinner());
        spinner.set_message("Downloading");

        let writer = SuspendWriter::new(bars, Mutex::new(Vec::new()));
        writeln!(writer.make_writer(), "INFO Processing video").unwrap();
        writeln!(writer.make_writer(), "WARN Skipping invalid URL").unwrap();
        spinner.finish();

        let written = writer.inner.lock().unwrap().clone();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "INFO Processing video\nWARN Skipping invalid URL\n"
        );
    }
}
