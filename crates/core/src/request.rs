//! Login ticket request (TRA) construction.

use jiff::{SignedDuration, Timestamp};
use quick_xml::escape::escape;

/// Service name of the electronic invoicing web service.
pub const WSFE: &str = "wsfe";

/// Half-width of the requested validity window, absorbing clock skew between
/// client and issuer.
pub const REQUEST_WINDOW: SignedDuration = SignedDuration::from_mins(10);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Document asking the issuer for a ticket to `service`.
///
/// Built fresh for every refresh and discarded once signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTicketRequest {
    /// Request identifier, the epoch second it was built at.
    pub unique_id: i64,

    /// Earliest instant the request is acceptable.
    pub generation_time: Timestamp,

    /// Latest instant the request is acceptable.
    pub expiration_time: Timestamp,

    /// Service the ticket is requested for.
    pub service: String,
}

impl LoginTicketRequest {
    /// Build a request centred on `now`.
    ///
    /// The unique id is the epoch second of `now`; two requests built within
    /// the same second share it and the issuer decides which one wins.
    #[must_use]
    pub fn build(service: &str, now: Timestamp) -> Self {
        Self {
            unique_id: now.as_second(),
            generation_time: now - REQUEST_WINDOW,
            expiration_time: now + REQUEST_WINDOW,
            service: service.to_string(),
        }
    }

    /// Render the canonical `loginTicketRequest` document that gets signed.
    #[must_use]
    pub fn to_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<loginTicketRequest version="1.0">"#,
                "<header>",
                "<uniqueId>{}</uniqueId>",
                "<generationTime>{}</generationTime>",
                "<expirationTime>{}</expirationTime>",
                "</header>",
                "<service>{}</service>",
                "</loginTicketRequest>",
            ),
            self.unique_id,
            self.generation_time.strftime(TIMESTAMP_FORMAT),
            self.expiration_time.strftime(TIMESTAMP_FORMAT),
            escape(&self.service),
        )
    }
}
