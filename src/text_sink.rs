use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::error;

/// Where rendered caption text goes.
///
/// An engine calls `set_text` whenever its rendered text changes; an empty string clears the
/// display. Closures taking `&str` are sinks too.
pub trait TextSink {
    fn set_text(&mut self, text: &str);
}

impl<F> TextSink for F
where
    F: FnMut(&str),
{
    fn set_text(&mut self, text: &str) {
        self(text)
    }
}

/// A `TextSink` that writes each text change as one line to a writer.
///
/// A cleared display is written as an empty line. Write failures are logged and otherwise
/// ignored so a broken output never stalls playback.
pub struct WriterSink<W: Write> {
    w: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> TextSink for WriterSink<W> {
    fn set_text(&mut self, text: &str) {
        // Flush so streaming consumers (stdout, pipes) see each change promptly.
        let res = writeln!(&mut self.w, "{text}").and_then(|()| self.w.flush());
        if let Err(err) = res {
            error!(error = %err, "failed to write caption text");
        }
    }
}

/// A `TextSink` that records every text it receives.
///
/// Clones share the record, so one clone can be handed to an engine while another is kept to
/// inspect what was rendered.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    history: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently received text; empty if nothing was received yet.
    pub fn text(&self) -> String {
        self.history.borrow().last().cloned().unwrap_or_default()
    }

    /// Every text received, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.history.borrow().len()
    }
}

impl TextSink for RecordingSink {
    fn set_text(&mut self, text: &str) {
        self.history.borrow_mut().push(text.to_owned());
    }
}
