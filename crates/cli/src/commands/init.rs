//! `dualchat init`: Print or write a default config.toml.

use dualchat_config::AppConfig;
use std::path::Path;

pub fn run(config_path: Option<&Path>, write: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_toml = AppConfig::default_toml();

    if !write {
        print!("{default_toml}");
        return Ok(());
    }

    let path = super::config_path(config_path);
    if path.exists() {
        println!("Config already exists at: {}", path.display());
        println!("   Edit it manually or delete it and re-run `dualchat init --write`.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &default_toml)?;
    println!("Created config.toml at: {}", path.display());
    println!("\nNext steps:");
    println!("   1. Set DUALCHAT_API_KEY (or api_key in {})", path.display());
    println!("   2. Run: dualchat ingest <files> --source-url <url>");
    println!("   3. Run: dualchat serve");

    Ok(())
}
