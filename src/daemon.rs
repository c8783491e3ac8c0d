use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, trace, warn};

use crate::{
    error::{DecodeError, EventLoopError},
    event::Event,
    publish::Sink,
    state::State,
};

/// What happened to a single line of the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Published,
    /// The state was updated but the sink rejected the write.
    PublishFailed,
    Ignored,
}

pub struct Daemon<S> {
    state: State,
    sink: S,
}

impl<S: Sink> Daemon<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: State::new(),
            sink,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn handle_line(&mut self, line: &str) -> Result<LineOutcome, DecodeError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Ignored);
        }

        let Some(event) = Event::decode(line)? else {
            return Ok(LineOutcome::Ignored);
        };

        info!("Received event of type {:?}", event.event_type());
        trace!("Event Payload: {line}");

        self.state.apply(event);

        // A failing sink must not stop the feed, the next event writes again
        match self.sink.publish(self.state.snapshot()) {
            Ok(()) => Ok(LineOutcome::Published),
            Err(e) => {
                warn!("Error publishing snapshot: {e}");
                Ok(LineOutcome::PublishFailed)
            }
        }
    }

    /// Processes lines until the source reaches end of stream.
    #[tracing::instrument(skip_all)]
    pub async fn run(&mut self, mut source: impl AsyncBufRead + Unpin) -> Result<(), EventLoopError> {
        info!("Starting event loop");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if source.read_until(b'\n', &mut buf).await? == 0 {
                info!("Event source closed its output");
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            match self.handle_line(&line) {
                Ok(outcome) => debug!(?outcome, "Handled line"),
                Err(e) => warn!("Could not decode event: {e}"),
            }
        }

        Ok(())
    }
}
