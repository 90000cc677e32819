//! Newsletter sign-up. A [`SubscriptionService`] takes a validated
//! [`EmailAddress`] and the page it was entered on and submits it to the
//! newsletter provider. Submission is fire-and-forget: the caller gets
//! [`Outcome::Submitted`] straight away and never learns whether the provider
//! accepted the address.

use std::fmt;
use std::str::FromStr;
use std::thread::JoinHandle;
use std::time::Duration;
use url::Url;

/// The provider's embed-subscribe endpoint used when a project doesn't
/// configure one.
pub const DEFAULT_ENDPOINT: &str =
    "https://buttondown.com/api/emails/embed-subscribe/responsibleai";

/// An email address that passed the basic syntax check a `type="email"`
/// input would apply: no whitespace, a non-empty local part, and a domain
/// containing a dot with no empty labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EmailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<EmailAddress> {
        let s = s.trim();
        let invalid = || Error::InvalidEmail(s.to_owned());
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (local, domain) = match s.split_once('@') {
            Some(parts) => parts,
            None => return Err(invalid()),
        };
        if local.is_empty()
            || domain.contains('@')
            || !domain.contains('.')
            || domain.split('.').any(str::is_empty)
        {
            return Err(invalid());
        }
        Ok(EmailAddress(s.to_owned()))
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the caller learns from a submission. The single variant means
/// delivery is never observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Submitted,
}

/// Something that can sign an address up for the newsletter.
pub trait SubscriptionService {
    /// Submits `email`, entered on the page at `page_context`.
    fn submit(&mut self, email: &EmailAddress, page_context: &str) -> Outcome;
}

/// The form submission the provider expects: a POST to `action` carrying the
/// address and the page it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormPost {
    pub action: Url,
    pub fields: Vec<(String, String)>,
}

impl FormPost {
    pub fn new(action: &Url, email: &EmailAddress, page_context: &str) -> FormPost {
        FormPost {
            action: action.clone(),
            fields: vec![
                ("email".to_owned(), email.to_string()),
                ("first_url".to_owned(), page_context.to_owned()),
                ("referrer".to_owned(), page_context.to_owned()),
            ],
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Carries a [`FormPost`] to the provider. Errors returned here are only the
/// ones noticed before the request leaves; anything after that is invisible.
pub trait Transport {
    fn dispatch(&mut self, form: FormPost) -> Result<()>;
}

/// How long a single post may take before it is abandoned.
const POST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts forms over HTTP on a background thread, so the caller never waits
/// for or reads the provider's response. Posts still in flight are finished
/// by [`HttpTransport::flush`], which also runs on drop.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    in_flight: Vec<JoinHandle<()>>,
}

impl HttpTransport {
    pub fn new() -> Result<HttpTransport> {
        let client = reqwest::blocking::Client::builder()
            .timeout(POST_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(HttpTransport::with_client(client))
    }

    pub fn with_client(client: reqwest::blocking::Client) -> HttpTransport {
        HttpTransport {
            client,
            in_flight: Vec::new(),
        }
    }

    /// Waits for every post still in flight. Returns the number waited on.
    pub fn flush(&mut self) -> usize {
        let pending = self.in_flight.len();
        for handle in self.in_flight.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("subscription thread panicked");
            }
        }
        pending
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        let pending = self.in_flight.iter().filter(|h| !h.is_finished()).count();
        if pending > 0 {
            tracing::debug!(pending, "waiting for subscription posts");
        }
        self.flush();
    }
}

impl Transport for HttpTransport {
    fn dispatch(&mut self, form: FormPost) -> Result<()> {
        self.in_flight.retain(|handle| !handle.is_finished());
        let client = self.client.clone();
        let handle = std::thread::Builder::new()
            .name("subscribe".to_owned())
            .spawn(move || {
                let action = form.action.to_string();
                match client.post(form.action).form(&form.fields).send() {
                    Ok(response) if response.status().is_success() => {
                        tracing::debug!(%action, status = %response.status(), "subscription posted")
                    }
                    Ok(response) => {
                        tracing::warn!(%action, status = %response.status(), "subscription rejected")
                    }
                    Err(err) => tracing::warn!(%action, error = %err, "subscription post failed"),
                }
            })
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.in_flight.push(handle);
        Ok(())
    }
}

/// Keeps every dispatched form instead of sending it. Useful for dry runs and
/// tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<FormPost>,
}

impl Transport for RecordingTransport {
    fn dispatch(&mut self, form: FormPost) -> Result<()> {
        tracing::info!(action = %form.action, email = ?form.field("email"), "recorded subscription");
        self.sent.push(form);
        Ok(())
    }
}

/// The form-post [`SubscriptionService`]: builds the provider's form, hands it
/// to a [`Transport`], and reports [`Outcome::Submitted`] whatever happens.
pub struct FormDispatcher<T> {
    endpoint: Url,
    transport: T,
}

impl<T: Transport> FormDispatcher<T> {
    pub fn new(endpoint: Url, transport: T) -> FormDispatcher<T> {
        FormDispatcher {
            endpoint,
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> SubscriptionService for FormDispatcher<T> {
    fn submit(&mut self, email: &EmailAddress, page_context: &str) -> Outcome {
        let form = FormPost::new(&self.endpoint, email, page_context);
        if let Err(err) = self.transport.dispatch(form) {
            tracing::warn!(error = %err, "subscription dispatch failed");
        }
        Outcome::Submitted
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem with a subscription before it is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when an address fails the basic syntax check.
    InvalidEmail(String),

    /// Returned when a transport can't start sending a form.
    Transport(String),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidEmail(email) => write!(f, "Invalid email address `{}`", email),
            Error::Transport(err) => write!(f, "Dispatching subscription: {}", err),
        }
    }
}

impl std::error::Error for Error {}
