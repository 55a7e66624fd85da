//! Configuration view and validation commands — `barcode-intake config`.

use anyhow::Result;

use barcode_intake::config::AppConfig;

use super::super::ConfigCommands;

pub fn cmd_config(config: &AppConfig, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            print!("{}", config.to_toml()?);
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid");
            } else {
                for warning in &warnings {
                    println!("warning: {}", warning);
                }
            }
        }
    }
    Ok(())
}
