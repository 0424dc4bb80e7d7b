use authgate::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    debug!("bootstrap debug log (hidden unless RUST_LOG says otherwise)");
    info!("bootstrap info log");

    let config = LogConfig {
        filter: "authgate=trace,info".to_string(),
    };
    logger.reload_from_config(&config)?;
    trace!("application trace log");
    debug!(member_id = "00000000-0000-0000-0000-000000000000", "structured field");
    info!("application info log");

    let bad = LogConfig {
        filter: "authgate=nonsense-level".to_string(),
    };
    println!("invalid filter rejected: {}", logger.reload_from_config(&bad).is_err());

    Ok(())
}
