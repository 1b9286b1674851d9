use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Terminal events
#[derive(Clone, Debug)]
pub enum Event {
    /// Periodic tick, drives spinners
    Tick,
    /// Key press event
    Key(KeyEvent),
    /// Bracketed paste (e.g. a file path dropped into the terminal)
    Paste(String),
    /// Terminal resize
    Resize(u16, u16),
    /// Error reading the terminal
    Error(String),
}

/// Event handler managing terminal input
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(read_events(sender, cancel.clone(), tick_rate));

        Self {
            receiver,
            cancel,
            task,
        }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Shutdown the event handler
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn read_events(
    sender: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
) {
    let mut reader = EventStream::new();
    let mut tick_interval = tokio::time::interval(tick_rate);

    loop {
        let tick = tick_interval.tick();
        let crossterm_event = reader.next().fuse();

        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick => Some(Event::Tick),
            maybe_event = crossterm_event => match maybe_event {
                Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                    Some(Event::Key(key))
                }
                Some(Ok(CrosstermEvent::Paste(text))) => Some(Event::Paste(text)),
                Some(Ok(CrosstermEvent::Resize(w, h))) => Some(Event::Resize(w, h)),
                // Key releases (Windows), mouse and focus events
                Some(Ok(_)) => None,
                Some(Err(e)) => Some(Event::Error(e.to_string())),
                None => break,
            },
        };

        if let Some(event) = event {
            if sender.send(event).is_err() {
                break;
            }
        }
    }
}
