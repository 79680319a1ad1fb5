use std::path::Path;

use crate::config::Config;
use crate::services::settings;

pub fn cmd_init(config: &Config) -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml");
    } else {
        println!("config.toml already exists");
    }

    let settings_path = Path::new(&config.general.settings_path);
    if settings::create_default_if_missing(settings_path)? {
        println!("Created {}", settings_path.display());
    } else {
        println!("{} already exists", settings_path.display());
    }

    Ok(())
}
