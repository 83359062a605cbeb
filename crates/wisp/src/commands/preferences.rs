//! `wisp preferences`: git-config-backed operator preferences

use wisp_core::error::WispError;
use wisp_core::preferences;

use crate::output;

pub fn run_preferences_set(key: String, value: String) -> Result<(), WispError> {
    preferences::set_preference(&key, &value)?;
    output::log(&format!("Set wisp.{} = {}", key, value));
    Ok(())
}

pub fn run_preferences_get(key: String) -> Result<(), WispError> {
    match preferences::get_preference(&key)? {
        Some(value) => {
            output::log(&value);
            Ok(())
        }
        None => Err(WispError::Preferences(format!("wisp.{} is not set", key))),
    }
}

pub fn run_preferences_remove(key: String) -> Result<(), WispError> {
    preferences::remove_preference(&key)?;
    output::log(&format!("Removed wisp.{}", key));
    Ok(())
}
