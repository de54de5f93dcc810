use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::content::sample::SampleProvider;
use crate::content::worker::{ContentReply, ContentWorker};
use crate::content::ContentProvider;
use crate::event::AppEvent;
use crate::session::cycle::{Fetch, LearningSession};
use crate::session::state::{Mode, Topic};
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

const TOPIC_MAX_CHARS: usize = 120;
const REFLECTION_MAX_CHARS: usize = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Home,
    Session,
}

/// Pick the content source: Gemini when a key is configured and the network
/// feature is built, the bundled sample content otherwise. The returned notice
/// explains a fallback.
pub fn select_provider(config: &Config, offline: bool) -> (Arc<dyn ContentProvider>, Option<String>) {
    if offline {
        return (Arc::new(SampleProvider::new()), None);
    }
    network_provider(config)
}

#[cfg(feature = "network")]
fn network_provider(config: &Config) -> (Arc<dyn ContentProvider>, Option<String>) {
    use crate::content::ContentError;
    use crate::content::gemini::GeminiProvider;

    let Some(api_key) = config.api_key() else {
        let err = ContentError::MissingApiKey(config.api_key_env.clone());
        warn!(%err, "falling back to sample content");
        return (
            Arc::new(SampleProvider::new()),
            Some(format!("{err}; using sample content")),
        );
    };
    match GeminiProvider::new(config, api_key) {
        Ok(provider) => (Arc::new(provider), None),
        Err(err) => {
            warn!(%err, "gemini client unavailable");
            (
                Arc::new(SampleProvider::new()),
                Some(format!("{err}; using sample content")),
            )
        }
    }
}

#[cfg(not(feature = "network"))]
fn network_provider(_config: &Config) -> (Arc<dyn ContentProvider>, Option<String>) {
    (
        Arc::new(SampleProvider::new()),
        Some("built without network support; using sample content".to_string()),
    )
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub topic_input: LineInput,
    pub reflection_input: LineInput,
    pub session: Option<LearningSession>,
    /// One-line message for the status area (fallbacks, locked gate).
    pub notice: Option<String>,
    pub should_quit: bool,
    worker: ContentWorker,
    next_session_id: u64,
}

impl App {
    pub fn new(config: Config, provider: Arc<dyn ContentProvider>, tx: Sender<AppEvent>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        Self {
            screen: AppScreen::Home,
            config,
            theme,
            topic_input: LineInput::new("").with_limit(TOPIC_MAX_CHARS),
            reflection_input: LineInput::new("").with_limit(REFLECTION_MAX_CHARS),
            session: None,
            notice: None,
            should_quit: false,
            worker: ContentWorker::new(provider, tx),
            next_session_id: 1,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.worker.provider_name()
    }

    /// Start a fresh session for `query`, discarding any previous one.
    /// Blank queries are refused.
    pub fn start_session(&mut self, query: &str) -> bool {
        let Some(topic) = Topic::new(query) else {
            return false;
        };
        let id = self.next_session_id;
        self.next_session_id += 1;

        let (session, fetch) = LearningSession::start(id, topic);
        self.session = Some(session);
        self.reflection_input.clear();
        self.notice = None;
        self.screen = AppScreen::Session;
        self.dispatch(Some(fetch));
        true
    }

    pub fn exit_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(session = session.id(), mode = %session.mode(), "session exited");
        }
        self.notice = None;
        self.screen = AppScreen::Home;
    }

    fn dispatch(&self, fetch: Option<Fetch>) {
        if let Some(Fetch { ticket, request }) = fetch {
            self.worker.dispatch(ticket, request);
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        let fetch = self.session.as_mut().and_then(|s| s.tick(now));
        self.dispatch(fetch);
    }

    pub fn on_content(&mut self, reply: ContentReply) {
        match self.session.as_mut() {
            Some(session) if session.id() == reply.ticket.session => {
                session.apply_content(reply.ticket, reply.result);
            }
            _ => debug!(ticket = ?reply.ticket, "reply for a session that no longer exists"),
        }
    }

    pub fn answer(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut() {
            if session.answer(index).is_some() {
                self.notice = None;
            }
        }
    }

    pub fn proceed(&mut self) {
        let fetch = self.session.as_mut().and_then(|s| s.proceed());
        self.dispatch(fetch);
    }

    pub fn next_slide(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.next_slide();
        }
    }

    pub fn previous_slide(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.previous_slide();
        }
    }

    pub fn finish_explanation(&mut self) {
        let fetch = self.session.as_mut().and_then(|s| s.finish_explanation());
        self.dispatch(fetch);
    }

    pub fn request_verification(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.request_verification() {
            Ok(fetch) => {
                self.notice = None;
                self.dispatch(Some(fetch));
            }
            Err(err) => {
                debug!(%err, "verification refused");
                self.notice = Some(err.to_string());
            }
        }
    }

    pub fn retry(&mut self) {
        let fetch = self.session.as_mut().and_then(|s| s.retry());
        self.dispatch(fetch);
    }

    /// Feed a key to the reflection editor; `Enter` commits when allowed.
    pub fn reflection_key(&mut self, key: crossterm::event::KeyEvent) {
        let result = self.reflection_input.handle(key);
        if result == InputResult::Cancel {
            self.exit_session();
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if result == InputResult::Submit {
            session.commit_reflection();
        } else {
            session.set_reflection_text(self.reflection_input.value());
        }
    }

    pub fn session_mode(&self) -> Option<Mode> {
        self.session.as_ref().map(|s| s.mode())
    }
}
