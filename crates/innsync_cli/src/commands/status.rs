use std::sync::Arc;

use console::style;

use innsync::{connect_and_migrate, store, AppConfig, SyncService, UpstreamClient};

/// Print the sync status and health snapshot.
pub(crate) async fn handle_status(config: &AppConfig) -> anyhow::Result<()> {
    let db = connect_and_migrate(&config.database_url()).await?;
    store::sweep_stale_runs(&db).await?;

    let client = UpstreamClient::new(config.upstream_config())?;
    let sync_config = store::effective_config(&db).await?;
    let service = Arc::new(SyncService::new(client, db, sync_config));

    // A fresh process has no in-memory run history; show the persisted one.
    let status = service.status();
    let health = service.health();
    let last_log = store::latest_sync_log(service.db()).await?;

    println!("Sync status");
    println!("  running:   {}", status.is_running);
    println!("  interval:  {}", status.sync_interval);
    println!(
        "  health:    {}",
        if health.is_healthy {
            style(health.status).green()
        } else {
            style(health.status).red()
        }
    );
    println!("  summary:   {}", health.summary);

    match last_log {
        Some(log) => {
            println!();
            println!("Last run {} ({})", log.sync_id, log.status);
            println!("  started:  {}", log.started_at);
            if let Some(completed) = log.completed_at {
                println!("  finished: {completed}");
            }
            println!("  total:    {}", log.total_properties);
            println!("  updated:  {}", log.updated_properties);
            println!("  failed:   {}", log.failed_properties);
            if let Some(error) = &log.error_message {
                println!("  error:    {}", style(error).red());
            }
        }
        None => println!("\nNo sync runs recorded yet."),
    }

    Ok(())
}
