use chrono::Utc;
use dotenvy::dotenv;
use stockcontrol::{
    config::{codes, database},
    core::{DocumentKind, SequenceStore, SequencedEntity},
    entities::{IngoingAlbaran, OutgoingAlbaran, RequestStock},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load code templates (config.toml, then STORAGE_CODE_* overrides)
    let config = codes::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Validate templates by building the store
    let store = SequenceStore::new(db, &config)?;

    let now = Utc::now();
    log_next_code::<RequestStock>(&store, now).await?;
    log_next_code::<OutgoingAlbaran>(&store, now).await?;
    log_next_code::<IngoingAlbaran>(&store, now).await?;

    info!(
        "Stock control store ready for {} document kinds",
        DocumentKind::ALL.len()
    );
    Ok(())
}

async fn log_next_code<E>(store: &SequenceStore, at: chrono::DateTime<Utc>) -> Result<()>
where
    E: SequencedEntity,
{
    let next = store.peek_next_code::<E>(at).await?;
    info!(
        "Next {} code: {} (format '{}')",
        E::KIND,
        next.code,
        store.format(E::KIND)
    );
    Ok(())
}
