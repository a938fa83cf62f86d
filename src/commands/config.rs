//! Config command handlers: show effective configuration.

use anyhow::Result;

use crate::app_config::LoadedConfig;
use crate::runtime::EffectiveConfig;

pub fn run_config_show_command(loaded_config: &LoadedConfig, effective: &EffectiveConfig) -> Result<()> {
    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded_config.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("relay_url = {}", effective.resolver.relay_endpoint);
    println!("github_policy = {}", effective.resolver.github_policy);
    println!("connect_timeout_secs = {}", effective.fetch.connect_timeout_secs);
    println!("read_timeout_secs = {}", effective.fetch.read_timeout_secs);
    println!("min_book_bytes = {}", effective.fetch.min_bytes);
    println!("output_dir = {}", effective.output_dir.display());
    println!("verbosity = {}", effective.verbosity.as_str());

    let preferences = &effective.preferences;
    println!("theme = {}", preferences.theme);
    println!("font_family = {}", preferences.font_family);
    println!("font_size_percent = {}", preferences.font_size_percent);
    println!("flow = {}", preferences.flow);
    println!("eye_care = {}", preferences.eye_care);
    println!(
        "rendition = {}",
        serde_json::to_string(&preferences.rendition_options())?
    );
    println!(
        "theme_rules = {}",
        serde_json::to_string(&preferences.theme_rules())?
    );

    Ok(())
}
