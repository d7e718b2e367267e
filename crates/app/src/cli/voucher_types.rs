use arca_app::context::AppContext;

use super::{describe, login::valid_ticket};

pub(crate) async fn run(context: &AppContext) -> Result<(), String> {
    let ticket = valid_ticket(context).await?;

    let body = context
        .wsfe
        .param_get_tipos_cbte(&ticket.to_authorization_payload(context.cuit))
        .await
        .map_err(|error| describe(&error))?;

    println!("{body}");

    Ok(())
}
