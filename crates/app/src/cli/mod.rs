use std::error::Error;

use arca_app::{config::AppConfig, context::AppContext, observability};
use clap::{Parser, Subcommand};

mod login;
mod voucher_types;

#[derive(Debug, Parser)]
#[command(name = "arca-app", about = "ARCA web services CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the authorization payload, requesting a new ticket when needed
    Login,

    /// List voucher types accepted by the invoicing service
    VoucherTypes,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_subscriber(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let context = AppContext::from_config(&self.config).map_err(|error| describe(&error))?;

        match self.command {
            Commands::Login => login::run(&context).await,
            Commands::VoucherTypes => voucher_types::run(&context).await,
        }
    }
}

/// Render `error` followed by its source chain.
pub(crate) fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
