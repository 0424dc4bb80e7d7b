use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Token issuance and validation service")]
pub struct Cli {
    /// Path to a settings file, without extension.
    #[arg(long)]
    pub settings: Option<String>,
    /// Load and validate settings and the signing key, then exit.
    #[arg(long)]
    pub check_config: bool,
}
