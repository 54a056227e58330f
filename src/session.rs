/// Page session handling
///
/// A `PageSession` supplies the rendered document the table is read from.
/// Optional interactions (cookie consent, "expand all") report a
/// `StepOutcome` and never fail the run. Readiness is a condition wait with
/// a bounded timeout, and `SessionGuard` releases the session on every
/// exit path.
use crate::error::RunError;
use lazy_static::lazy_static;
use log::debug;
use scraper::{Html, Selector};
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

/// Floor for the readiness poll interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a").expect("static selector");
}

/// Result of a best-effort page interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Performed,
    NotApplicable(String),
    Failed(String),
}

/// Capability: load a page and expose its DOM
pub trait PageSession {
    /// Load `url` as the current page
    fn navigate(&mut self, url: &str) -> Result<(), RunError>;

    /// Reload the current page
    fn refresh(&mut self) -> Result<(), RunError>;

    /// The currently loaded document
    fn document(&self) -> Result<&Html, RunError>;

    /// Accept the cookie banner matched by `selector`, if any
    fn dismiss_cookies(&mut self, selector: &str) -> StepOutcome;

    /// Activate the link whose text is `link_text` to load every row
    fn expand_all(&mut self, link_text: &str) -> StepOutcome;

    /// Release the session. Must be idempotent.
    fn close(&mut self);

    /// True when refreshing can never change the document (a saved file)
    fn is_static(&self) -> bool {
        false
    }
}

/// Owns a session and closes it when dropped
pub struct SessionGuard<S: PageSession> {
    session: S,
}

impl<S: PageSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: PageSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: PageSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        debug!("releasing page session");
        self.session.close();
    }
}

/// Poll the session until `ready` holds for the current document.
///
/// The document is refreshed between polls, never more often than
/// `MIN_POLL_INTERVAL`. Exceeding `timeout` is a `RunError::Timeout`.
pub fn wait_until<S, P>(
    session: &mut S,
    what: &str,
    timeout: Duration,
    poll: Duration,
    ready: P,
) -> Result<(), RunError>
where
    S: PageSession + ?Sized,
    P: Fn(&Html) -> bool,
{
    let poll = poll.max(MIN_POLL_INTERVAL);
    let started = Instant::now();
    loop {
        if ready(session.document()?) {
            debug!("{} ready after {:?}", what, started.elapsed());
            return Ok(());
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(RunError::Timeout { what: what.to_string(), waited });
        }

        thread::sleep(poll.min(timeout - waited));
        session.refresh()?;
    }
}

/// Settings for the built-in static session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Read the page from this file instead of fetching it
    pub snapshot: Option<PathBuf>,
}

/// Session over server-rendered HTML, fetched with ureq or read from disk.
///
/// No script runs, so the cookie banner never blocks anything and "expand
/// all" only works when the link has a real href.
pub struct StaticPageSession {
    agent: ureq::Agent,
    snapshot: Option<PathBuf>,
    current_url: Option<Url>,
    document: Option<Html>,
    closed: bool,
}

impl StaticPageSession {
    /// Acquire a session. A missing snapshot file is an acquisition failure.
    pub fn open(options: &SessionOptions) -> Result<Self, RunError> {
        if let Some(path) = &options.snapshot {
            if !path.is_file() {
                return Err(RunError::Session(format!("snapshot {} does not exist", path.display())));
            }
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(options.request_timeout)
            .user_agent(&options.user_agent)
            .build();

        Ok(Self { agent, snapshot: options.snapshot.clone(), current_url: None, document: None, closed: false })
    }

    fn fetch(&self, url: &str) -> Result<String, RunError> {
        if self.closed {
            return Err(RunError::Session("session already closed".to_string()));
        }

        if let Some(path) = &self.snapshot {
            debug!("reading snapshot {}", path.display());
            return fs::read_to_string(path)
                .map_err(|e| RunError::Session(format!("cannot read snapshot {}: {}", path.display(), e)));
        }

        debug!("GET {}", url);
        let response =
            self.agent.get(url).call().map_err(|e| RunError::Session(format!("GET {} failed: {}", url, e)))?;
        response.into_string().map_err(|e| RunError::Session(format!("cannot read body of {}: {}", url, e)))
    }

    fn load(&mut self, url: &str) -> Result<(), RunError> {
        let body = self.fetch(url)?;
        self.document = Some(Html::parse_document(&body));
        self.current_url = Url::parse(url).ok();
        Ok(())
    }

    /// Navigable target of the anchor whose text equals `link_text`
    fn expand_target(&self, link_text: &str) -> Result<Option<String>, String> {
        let document = self.document.as_ref().ok_or_else(|| "no page loaded".to_string())?;
        let anchor = document.select(&ANCHOR).find(|a| a.text().collect::<String>().trim() == link_text);
        let Some(anchor) = anchor else {
            return Ok(None);
        };

        let href = anchor.value().attr("href").map(str::trim).unwrap_or("");
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return Err(format!("`{}` link has no navigable href", link_text));
        }
        if self.snapshot.is_some() {
            return Err("cannot follow links from a local snapshot".to_string());
        }

        let base = self.current_url.as_ref().ok_or_else(|| "current page has no base URL".to_string())?;
        let target = base.join(href).map_err(|e| format!("bad href {:?}: {}", href, e))?;
        Ok(Some(target.to_string()))
    }
}

impl PageSession for StaticPageSession {
    fn navigate(&mut self, url: &str) -> Result<(), RunError> {
        self.load(url)
    }

    fn refresh(&mut self) -> Result<(), RunError> {
        let url = self.current_url.as_ref().map(|u| u.to_string()).unwrap_or_default();
        self.load(&url)
    }

    fn document(&self) -> Result<&Html, RunError> {
        self.document.as_ref().ok_or_else(|| RunError::Session("no page loaded".to_string()))
    }

    fn dismiss_cookies(&mut self, selector: &str) -> StepOutcome {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => parsed,
            Err(e) => return StepOutcome::Failed(format!("invalid cookie selector `{}`: {}", selector, e)),
        };
        match &self.document {
            Some(doc) if doc.select(&parsed).next().is_some() => {
                StepOutcome::NotApplicable("consent dialog is inert in a static document".to_string())
            }
            Some(_) => StepOutcome::NotApplicable("no cookie dialog present".to_string()),
            None => StepOutcome::Failed("no page loaded".to_string()),
        }
    }

    fn expand_all(&mut self, link_text: &str) -> StepOutcome {
        let target = match self.expand_target(link_text) {
            Ok(Some(target)) => target,
            Ok(None) => return StepOutcome::NotApplicable(format!("no `{}` link on the page", link_text)),
            Err(reason) => return StepOutcome::Failed(reason),
        };

        match self.load(&target) {
            Ok(()) => StepOutcome::Performed,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            debug!("closing static page session");
        }
        self.document = None;
        self.closed = true;
    }

    fn is_static(&self) -> bool {
        self.snapshot.is_some()
    }
}
