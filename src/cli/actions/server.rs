use crate::{api, cli::actions::Action};
use anyhow::Result;
use url::Url;

/// Handle the server action
///
/// # Errors
/// Returns an error if the DSN does not parse or the server fails to start.
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Reject an unparseable DSN before the pool ever sees it.
            let dsn = Url::parse(&dsn)?;

            api::new(port, dsn.as_str()).await?;
        }
    }

    Ok(())
}
