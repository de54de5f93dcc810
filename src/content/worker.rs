use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, error, warn};

use crate::content::{ContentError, ContentProvider, ContentRequest, ModeContent};
use crate::event::AppEvent;
use crate::session::cycle::ContentTicket;

#[derive(Debug)]
pub struct ContentReply {
    pub ticket: ContentTicket,
    pub result: Result<ModeContent, ContentError>,
}

/// Runs provider calls off the UI thread and posts the outcome back onto the
/// event channel, so the session is only ever mutated from the event loop.
pub struct ContentWorker {
    provider: Arc<dyn ContentProvider>,
    tx: Sender<AppEvent>,
}

impl ContentWorker {
    pub fn new(provider: Arc<dyn ContentProvider>, tx: Sender<AppEvent>) -> Self {
        Self { provider, tx }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn dispatch(&self, ticket: ContentTicket, request: ContentRequest) {
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        debug!(?ticket, "dispatching content request");

        thread::spawn(move || {
            let result = provider.fetch(&request);
            match &result {
                Err(err) if err.is_fetch_error() => {
                    error!(mode = %request.mode(), %err, "content request failed")
                }
                Err(err) => warn!(mode = %request.mode(), %err, "content rejected"),
                Ok(_) => debug!(mode = %request.mode(), "content ready"),
            }
            // Receiver gone means the app is shutting down.
            let _ = tx.send(AppEvent::Content(ContentReply { ticket, result }));
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::content::sample::SampleProvider;
    use crate::session::state::Mode;

    #[test]
    fn test_reply_posted_with_ticket() {
        let (tx, rx) = mpsc::channel();
        let worker = ContentWorker::new(Arc::new(SampleProvider::with_seed(9)), tx);
        let ticket = ContentTicket {
            session: 4,
            serial: 1,
            mode: Mode::Diagnostic,
        };
        worker.dispatch(ticket, ContentRequest::Diagnostic { topic: "Rust".to_string() });

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Content(reply) => {
                assert_eq!(reply.ticket, ticket);
                assert!(matches!(reply.result, Ok(ModeContent::Diagnostic(ref qs)) if qs.len() == 3));
            }
            _ => panic!("expected content reply"),
        }
    }
}
