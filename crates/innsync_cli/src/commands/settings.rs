use innsync::{connect_and_migrate, store, AppConfig};

use crate::SettingsAction;

/// Inspect or update the persisted sync settings.
pub(crate) async fn handle_settings(
    action: SettingsAction,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let db = connect_and_migrate(&config.database_url()).await?;

    match action {
        SettingsAction::Get => {
            for setting in store::load_settings(&db).await? {
                println!(
                    "{:<28} {:<12} {}",
                    setting.setting_key, setting.setting_value, setting.description
                );
            }
        }
        SettingsAction::Set { key, value } => {
            store::update_settings(
                &db,
                &[store::SettingEntry {
                    key: key.clone(),
                    value: value.clone(),
                    description: None,
                }],
            )
            .await?;
            println!("Updated {key} = {value}");
        }
    }

    Ok(())
}
