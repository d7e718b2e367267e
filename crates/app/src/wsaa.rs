//! WSAA `LoginCms` client.

use arca::{
    login::{LoginError, LoginExchange},
    signer::SignedRequest,
    ticket::{LoginResponse, TicketCredentials, TicketHeader},
};
use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::xml::{self, XmlError};

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

const TICKET_FIELDS: [&str; 7] = [
    "source",
    "destination",
    "uniqueId",
    "generationTime",
    "expirationTime",
    "token",
    "sign",
];

/// Transport failures specific to the `LoginCms` endpoint.
#[derive(Debug, Error)]
pub enum WsaaError {
    /// The endpoint answered with a non-success status and no SOAP fault.
    #[error("LoginCms request failed with status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

/// HTTP client for the authentication service.
#[derive(Debug, Clone)]
pub struct WsaaClient {
    endpoint: String,
    http: Client,
}

impl WsaaClient {
    /// Client posting to `endpoint` through `http`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }
}

#[async_trait]
impl LoginExchange for WsaaClient {
    async fn login(&self, request: &SignedRequest) -> Result<LoginResponse, LoginError> {
        debug!(endpoint = %self.endpoint, "calling LoginCms");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", "\"\"")
            .body(login_cms_envelope(request))
            .send()
            .await
            .map_err(LoginError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LoginError::transport)?;

        parse_login_cms_response(&interpret(status, body)?)
    }
}

/// Decide what a `LoginCms` reply means before parsing its payload.
///
/// A SOAP fault is a rejection whatever the status. Any other non-success
/// status is a transport failure, even when the body is not XML.
///
/// # Errors
///
/// Returns [`LoginError::AuthRejected`] for faults, [`LoginError::Transport`]
/// for other non-success statuses and [`LoginError::MalformedResponse`] for a
/// success status with a body that is not well-formed XML.
pub fn interpret(status: StatusCode, body: String) -> Result<String, LoginError> {
    match xml::soap_fault(&body) {
        Ok(Some(fault)) => Err(LoginError::AuthRejected {
            code: fault.code,
            message: fault.message,
        }),
        _ if !status.is_success() => Err(LoginError::transport(WsaaError::UnexpectedStatus {
            status,
            body,
        })),
        Ok(None) => Ok(body),
        Err(error) => Err(malformed(error)),
    }
}

/// SOAP envelope submitting `request` to `loginCms`.
#[must_use]
pub fn login_cms_envelope(request: &SignedRequest) -> String {
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"xmlns:wsaa="http://wsaa.view.sua.dvadac.desein.afip.gov">"#,
            "<soapenv:Header/>",
            "<soapenv:Body><wsaa:loginCms><wsaa:in0>{}</wsaa:in0></wsaa:loginCms></soapenv:Body>",
            "</soapenv:Envelope>",
        ),
        xml::escape(request.as_str())
    )
}

/// Parse the `loginCmsResponse` envelope into a login response.
///
/// # Errors
///
/// Returns [`LoginError::MalformedResponse`] when the envelope or the embedded
/// `loginTicketResponse` is missing fields or carries invalid timestamps.
pub fn parse_login_cms_response(body: &str) -> Result<LoginResponse, LoginError> {
    let mut envelope = xml::element_texts(body, &["loginCmsReturn"]).map_err(malformed)?;

    let ticket_xml = envelope
        .remove("loginCmsReturn")
        .ok_or_else(|| LoginError::MalformedResponse("missing loginCmsReturn".to_string()))?;

    parse_login_ticket_response(&ticket_xml)
}

/// Parse a `loginTicketResponse` document.
///
/// # Errors
///
/// Returns [`LoginError::MalformedResponse`] when a header or credential
/// field is missing or a timestamp does not parse.
pub fn parse_login_ticket_response(document: &str) -> Result<LoginResponse, LoginError> {
    let mut fields = xml::element_texts(document, &TICKET_FIELDS).map_err(malformed)?;

    Ok(LoginResponse {
        header: TicketHeader {
            source: take(&mut fields, "source")?,
            destination: take(&mut fields, "destination")?,
            unique_id: take(&mut fields, "uniqueId")?,
            generation_time: take_timestamp(&mut fields, "generationTime")?,
            expiration_time: take_timestamp(&mut fields, "expirationTime")?,
        },
        credentials: TicketCredentials {
            token: take(&mut fields, "token")?,
            sign: take(&mut fields, "sign")?,
        },
    })
}

fn take(fields: &mut FxHashMap<&str, String>, name: &str) -> Result<String, LoginError> {
    fields
        .remove(name)
        .ok_or_else(|| LoginError::MalformedResponse(format!("missing {name}")))
}

fn take_timestamp(
    fields: &mut FxHashMap<&str, String>,
    name: &str,
) -> Result<Timestamp, LoginError> {
    let raw = take(fields, name)?;

    raw.parse().map_err(|error| {
        LoginError::MalformedResponse(format!("invalid {name} {raw:?}: {error}"))
    })
}

fn malformed(error: XmlError) -> LoginError {
    LoginError::MalformedResponse(error.to_string())
}
