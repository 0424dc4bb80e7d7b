use authgate::server::load_token_config;
use authgate::settings::*;

fn main() -> anyhow::Result<()> {
    // Load settings from the default location
    let project_settings = parse_settings(None)?;
    println!("Loaded settings: {:?}", project_settings);

    // Attempt to load from an invalid path (expected to fail)
    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {:?}", is_err);

    // Attempt to load from a custom path
    // $ cargo run --bin settings_demo -- --settings=settings/release
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    println!("Loaded settings: {:?}", project_settings);

    // Fails unless the signing key variable is exported with at least 32 bytes
    match load_token_config(&project_settings.token) {
        Ok(cfg) => println!("Token config: {:?}", cfg),
        Err(e) => println!("Token config rejected: {}", e),
    }

    Ok(())
}
