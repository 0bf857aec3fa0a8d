use console::style;

use innsync::{connect_and_migrate, store, AppConfig};

/// Print recent sync run logs, newest first.
pub(crate) async fn handle_logs(limit: u64, offset: u64, config: &AppConfig) -> anyhow::Result<()> {
    anyhow::ensure!(
        (1..=100).contains(&limit),
        "limit must be between 1 and 100"
    );

    let db = connect_and_migrate(&config.database_url()).await?;
    let logs = store::list_sync_logs(&db, limit, offset).await?;

    if logs.is_empty() {
        println!("No sync runs recorded.");
        return Ok(());
    }

    for log in logs {
        let status = if log.is_successful() {
            style(log.status.to_string()).green()
        } else {
            style(log.status.to_string()).red()
        };
        println!(
            "{}  {}  [{}]  total={} updated={} failed={}",
            log.started_at, log.sync_id, status, log.total_properties, log.updated_properties,
            log.failed_properties,
        );
        if let Some(error) = &log.error_message {
            println!("    error: {error}");
        }
    }

    Ok(())
}
