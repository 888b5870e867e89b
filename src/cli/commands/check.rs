//! Check command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    println!("✓ Configuration is valid");

    let store = Store::new(&config.general.database_url).await?;
    store.ping().await?;
    println!("✓ Database reachable at {}", config.general.database_url);

    if config.asset_store.enabled {
        println!("  Asset store: cloudinary ({})", config.asset_store.cloud_name);
    } else {
        println!("  Asset store: local ({})", config.general.uploads_path);
    }
    println!("  Face recognition: {}", config.face_recognition.url);

    Ok(())
}
