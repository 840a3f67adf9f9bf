use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password, verify_password, AuthError};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Print a bcrypt hash suitable for APP_PASSWORD_HASH")]
    Hash {
        #[arg(help = "Plain-text password")]
        password: String,
    },

    #[command(about = "Check a password against a bcrypt hash")]
    Verify {
        #[arg(help = "Plain-text password")]
        password: String,
        #[arg(help = "bcrypt hash")]
        hash: String,
    },
}

pub async fn handle(cmd: PasswordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PasswordCommands::Hash { password } => {
            let hash = hash_password(&password)?;
            match output_format {
                OutputFormat::Text => println!("{}", hash),
                OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash })))?,
            }
            Ok(())
        }
        PasswordCommands::Verify { password, hash } => match verify_password(&password, Some(&hash)) {
            Ok(()) => output_success(&output_format, "Password matches", Some(json!({ "matches": true }))),
            Err(AuthError::InvalidPassword) => {
                output_error(&output_format, "Password does not match")?;
                std::process::exit(1);
            }
            Err(err) => Err(err.into()),
        },
    }
}
