use std::path::Path;

use crate::config::Config;

pub fn cmd_init(path: Option<&Path>) -> anyhow::Result<()> {
    let target = path.unwrap_or_else(|| Path::new("config.toml"));

    if Config::create_default_if_missing(Some(target))? {
        println!("✓ Config file created at {}. Edit it and run again.", target.display());
    } else {
        println!("Config file already exists at {}, leaving it untouched.", target.display());
    }

    Ok(())
}
