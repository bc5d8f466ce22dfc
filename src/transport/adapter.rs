//! Request/response adapter between wire frames and the broker.
//!
//! Validates a `ClientRequest`, turns it into an `Event`, dispatches it and
//! maps the result onto one of the status classes below. Codes follow the
//! HTTP conventions of the messaging protocol.

use tracing::debug;

use crate::broker::event::META_TIMEOUT;
use crate::broker::{Broker, Event, EventKind, Outcome};
use crate::transport::message::{ClientRequest, ServerResponse};
use crate::utils::error::{BrokerError, QueueError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Accepted,
    BadRequest,
    NotFound,
    NotAcceptable,
    InternalError,
}

impl StatusClass {
    pub fn code(self) -> u16 {
        match self {
            StatusClass::Ok => 200,
            StatusClass::Accepted => 202,
            StatusClass::BadRequest => 400,
            StatusClass::NotFound => 404,
            StatusClass::NotAcceptable => 406,
            StatusClass::InternalError => 500,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusClass::Ok => "StatusOK",
            StatusClass::Accepted => "StatusAccepted",
            StatusClass::BadRequest => "BadRequest",
            StatusClass::NotFound => "ErrorMissing",
            StatusClass::NotAcceptable => "ErrorUnacceptable",
            StatusClass::InternalError => "InternalError",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        [
            StatusClass::Ok,
            StatusClass::Accepted,
            StatusClass::BadRequest,
            StatusClass::NotFound,
            StatusClass::NotAcceptable,
            StatusClass::InternalError,
        ]
        .into_iter()
        .find(|class| class.code() == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("No 'method' field provided.")]
    MissingMethod,

    #[error("Method is not supported: {0}")]
    UnsupportedMethod(String),

    #[error("No 'Type' field provided.")]
    MissingType,

    #[error("'Type' must be either 'Topic' or 'Personal', got '{0}'.")]
    InvalidType(String),

    #[error("No 'To' field provided.")]
    MissingTarget,

    #[error("No 'Timeout' field provided for topic message.")]
    MissingTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Read,
    Write,
}

fn parse_verb(method: Option<&str>) -> Result<Verb, RequestError> {
    let method = method.map(str::trim).ok_or(RequestError::MissingMethod)?;
    if method.eq_ignore_ascii_case("GET") {
        Ok(Verb::Read)
    } else if method.eq_ignore_ascii_case("POST") || method.eq_ignore_ascii_case("PUT") {
        Ok(Verb::Write)
    } else {
        Err(RequestError::UnsupportedMethod(method.to_string()))
    }
}

/// Validate `request` and build the event the broker should see.
///
/// A present but unparsable `Timeout` is passed through untouched; the topic
/// queue falls back to its default TTL for it.
pub fn build_event(request: &ClientRequest) -> Result<Event, RequestError> {
    let verb = parse_verb(request.method.as_deref())?;

    let raw_kind = request.kind.as_deref().ok_or(RequestError::MissingType)?;
    let kind =
        EventKind::parse(raw_kind).ok_or_else(|| RequestError::InvalidType(raw_kind.to_string()))?;

    let to = request
        .to
        .as_deref()
        .map(str::trim)
        .filter(|to| !to.is_empty())
        .ok_or(RequestError::MissingTarget)?;

    let event = match verb {
        Verb::Read if request.all => Event::read_all(kind, to),
        Verb::Read => Event::read(kind, to),
        Verb::Write => {
            let body = request.body.clone().unwrap_or_default();
            let event = Event::write(kind, to, body);
            match kind {
                EventKind::Topic => {
                    let timeout = request.timeout.as_deref().ok_or(RequestError::MissingTimeout)?;
                    event.with_meta(META_TIMEOUT, timeout)
                }
                EventKind::Personal => event,
            }
        }
    };
    Ok(event)
}

/// Map a dispatch result onto a response.
pub fn respond(result: Result<Outcome, BrokerError>) -> ServerResponse {
    match result {
        Ok(outcome @ Outcome::Accepted { .. }) => decorated(StatusClass::Accepted, &outcome.to_string()),
        Ok(Outcome::Delivered(payload)) => ServerResponse {
            status: StatusClass::Ok.code(),
            body: payload,
        },
        Ok(Outcome::Batch(payloads)) => match serde_json::to_string(&payloads) {
            Ok(body) => ServerResponse {
                status: StatusClass::Ok.code(),
                body,
            },
            Err(e) => decorated(StatusClass::InternalError, &e.to_string()),
        },
        Ok(outcome @ Outcome::Empty { .. }) => decorated(StatusClass::NotFound, &outcome.to_string()),
        Err(BrokerError::Queue(err @ QueueError::Full { .. })) => {
            decorated(StatusClass::NotAcceptable, &err.to_string())
        }
        Err(err @ BrokerError::Queue(QueueError::Empty { .. }))
        | Err(err @ BrokerError::TargetNotProvisioned { .. }) => {
            decorated(StatusClass::NotFound, &err.to_string())
        }
        Err(err @ BrokerError::NoHandler { .. }) => {
            decorated(StatusClass::InternalError, &err.to_string())
        }
    }
}

pub fn reject(err: &RequestError) -> ServerResponse {
    decorated(StatusClass::BadRequest, &err.to_string())
}

/// Validate, dispatch and answer one request.
pub fn handle_request(broker: &Broker, request: &ClientRequest) -> ServerResponse {
    match build_event(request) {
        Ok(event) => respond(broker.dispatch(&event)),
        Err(err) => {
            debug!("rejected request: {err}");
            reject(&err)
        }
    }
}

/// Parse one text frame and answer it.
pub fn handle_frame(broker: &Broker, text: &str) -> ServerResponse {
    match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => handle_request(broker, &request),
        Err(e) => reject(&RequestError::Malformed(e.to_string())),
    }
}

/// `"<code> : <label> :: <message>"`
fn decorated(class: StatusClass, message: &str) -> ServerResponse {
    ServerResponse {
        status: class.code(),
        body: format!("{} : {} :: {}", class.code(), class.label(), message),
    }
}
