//! Electronic invoicing (WSFE v1) client.

use arca::AuthorizationPayload;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::xml::{self, XmlError};

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";
const NAMESPACE: &str = "http://ar.gov.afip.dif.FEV1/";

/// Errors returned by [`WsfeClient`].
#[derive(Debug, Error)]
pub enum WsfeError {
    /// The request did not complete.
    #[error("WSFE request failed")]
    Http(#[from] reqwest::Error),

    /// The service answered with a SOAP fault.
    #[error("WSFE fault {code}: {message}")]
    Fault { code: String, message: String },

    /// Non-success status without a fault.
    #[error("WSFE responded with status {status}: {body}")]
    UnexpectedResponse { status: StatusCode, body: String },

    /// The response body is not well-formed XML.
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// HTTP client for the invoicing service.
#[derive(Debug, Clone)]
pub struct WsfeClient {
    endpoint: String,
    http: Client,
}

impl WsfeClient {
    /// Client posting to `endpoint` through `http`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    /// List the voucher types the service accepts.
    ///
    /// Returns the raw SOAP response body.
    ///
    /// # Errors
    ///
    /// Returns a [`WsfeError`] when the request fails or the service answers
    /// with a fault or an unexpected status.
    #[instrument(skip_all, fields(cuit = %auth.cuit))]
    pub async fn param_get_tipos_cbte(
        &self,
        auth: &AuthorizationPayload,
    ) -> Result<String, WsfeError> {
        self.call("FEParamGetTiposCbte", &auth_envelope("FEParamGetTiposCbte", auth))
            .await
    }

    async fn call(&self, operation: &str, envelope: &str) -> Result<String, WsfeError> {
        debug!(endpoint = %self.endpoint, operation, "calling WSFE");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", format!("{NAMESPACE}{operation}"))
            .body(envelope.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        interpret(status, body)
    }
}

/// Map a WSFE reply to its body or to the failure it reports.
///
/// A SOAP fault wins over the status; any other non-success status is an
/// unexpected response whether or not the body is XML.
///
/// # Errors
///
/// Returns [`WsfeError::Fault`], [`WsfeError::UnexpectedResponse`], or
/// [`WsfeError::Xml`] for a success status with an ill-formed body.
pub fn interpret(status: StatusCode, body: String) -> Result<String, WsfeError> {
    match xml::soap_fault(&body) {
        Ok(Some(fault)) => Err(WsfeError::Fault {
            code: fault.code,
            message: fault.message,
        }),
        _ if !status.is_success() => Err(WsfeError::UnexpectedResponse { status, body }),
        Ok(None) => Ok(body),
        Err(error) => Err(WsfeError::Xml(error)),
    }
}

/// SOAP envelope for an operation whose only argument is the `Auth` block.
#[must_use]
pub fn auth_envelope(operation: &str, auth: &AuthorizationPayload) -> String {
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"xmlns:ar="{namespace}">"#,
            "<soapenv:Header/>",
            "<soapenv:Body><ar:{operation}><ar:Auth>",
            "<ar:Token>{token}</ar:Token>",
            "<ar:Sign>{sign}</ar:Sign>",
            "<ar:Cuit>{cuit}</ar:Cuit>",
            "</ar:Auth></ar:{operation}></soapenv:Body>",
            "</soapenv:Envelope>",
        ),
        namespace = NAMESPACE,
        operation = operation,
        token = xml::escape(&auth.token),
        sign = xml::escape(&auth.sign),
        cuit = auth.cuit,
    )
}
