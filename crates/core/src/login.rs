//! Remote login exchange contract.

use std::error::Error as StdError;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{signer::SignedRequest, ticket::LoginResponse};

/// Errors raised by a login exchange.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Network or protocol failure before the issuer answered.
    #[error("login transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The issuer refused the request.
    #[error("login rejected ({code}): {message}")]
    AuthRejected { code: String, message: String },

    /// The issuer answered with something that is not a ticket.
    #[error("malformed login response: {0}")]
    MalformedResponse(String),
}

impl LoginError {
    /// Wrap a transport-level failure.
    pub fn transport(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(error))
    }
}

/// Trades a signed ticket request for a ticket.
#[automock]
#[async_trait]
pub trait LoginExchange: Send + Sync {
    /// Submit `request` to the issuer.
    async fn login(&self, request: &SignedRequest) -> Result<LoginResponse, LoginError>;
}
