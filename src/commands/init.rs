use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::config::{DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TEMPLATE};

/// Write a starter `cobmap.toml` in the working directory.
pub fn init_config(force: bool) -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite",
            path.display()
        );
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    println!("Created {}", path.display());
    Ok(())
}
