//! `huddle set`, `huddle unset` and `huddle config`.

use std::error::Error;
use std::path::Path;

use crate::core::config::{path_display, Config, ConfigKey};

pub fn set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let path = Config::config_path()?;
    let stored = set_at(&path, key, value)?;
    println!("✅ Set {key} to: {stored}");
    Ok(())
}

pub fn unset(key: &str) -> Result<(), Box<dyn Error>> {
    let path = Config::config_path()?;
    let key = unset_at(&path, key)?;
    println!("✅ Unset {}", key.name());
    Ok(())
}

pub fn show() -> Result<(), Box<dyn Error>> {
    let path = Config::config_path()?;
    let config = Config::load_from_path(&path)?;
    println!("Config file: {}", path_display(&path));
    config.print_all();
    Ok(())
}

fn set_at(path: &Path, key: &str, value: &str) -> Result<String, Box<dyn Error>> {
    let key: ConfigKey = key.parse()?;
    let mut config = Config::load_from_path(path)?;
    let stored = key.set(&mut config, value)?;
    config.save_to_path(path)?;
    Ok(stored)
}

fn unset_at(path: &Path, key: &str) -> Result<ConfigKey, Box<dyn Error>> {
    let key: ConfigKey = key.parse()?;
    let mut config = Config::load_from_path(path)?;
    key.unset(&mut config);
    config.save_to_path(path)?;
    Ok(key)
}
