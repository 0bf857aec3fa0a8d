use std::sync::Arc;

use console::style;
use tokio::sync::watch;

use innsync::{connect_and_migrate, store, AppConfig, SyncService, UpstreamClient};

/// Run one synchronization pass and print the result.
pub(crate) async fn handle_sync(ids: Option<Vec<i64>>, config: &AppConfig) -> anyhow::Result<()> {
    let db = connect_and_migrate(&config.database_url()).await?;
    store::sweep_stale_runs(&db).await?;

    let client = UpstreamClient::new(config.upstream_config())?;
    let sync_config = store::effective_config(&db).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to configured sync settings");
        config.sync_config().unwrap_or_default()
    });

    let mut service = SyncService::new(client, db, sync_config);
    if let Some(ids) = ids {
        service = service.with_property_ids(ids);
    }
    let service = Arc::new(service);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancellation requested, draining in-flight work...");
            let _ = cancel_tx.send(true);
        }
    });

    println!("Starting synchronization...");
    let result = service.sync_now(cancel_rx, "manual").await?;

    let status = if result.is_successful() {
        style(result.status.to_string()).green()
    } else {
        style(result.status.to_string()).red()
    };

    println!();
    println!("Sync {} ({})", result.sync_id, status);
    println!("  total:    {}", result.total_properties);
    println!("  updated:  {}", result.updated_properties);
    println!("  failed:   {}", result.failed_properties);
    println!("  duration: {} ms", result.duration_ms);
    if let Some(error) = &result.error {
        println!("  error:    {}", style(error).red());
    }

    if result.is_successful() {
        Ok(())
    } else {
        anyhow::bail!("sync run did not complete successfully")
    }
}
