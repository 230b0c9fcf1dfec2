use clap::Args;
use serde_json::json;

use crate::auth::{issue_session_token, session_lifetime, Identity};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Identity provider subject, e.g. auth0|123")]
    pub subject: String,

    #[arg(long, help = "Email claim")]
    pub email: String,

    #[arg(long, help = "Display name claim")]
    pub name: Option<String>,

    #[arg(long, help = "Avatar URL claim")]
    pub avatar: Option<String>,

    #[arg(long, help = "Lifetime in hours (defaults to SESSION_TOKEN_TTL_HOURS)")]
    pub ttl_hours: Option<u64>,
}

impl TokenArgs {
    fn identity(&self) -> Identity {
        Identity {
            subject_id: self.subject.clone(),
            email: self.email.clone(),
            display_name: self.name.clone(),
            avatar_url: self.avatar.clone(),
        }
    }
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let ttl_hours = args.ttl_hours.unwrap_or(config.session.token_ttl_hours);
    let ttl = session_lifetime(ttl_hours)?;
    let token = issue_session_token(&args.identity(), &config.session, ttl)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "subject": args.subject, "expires_in_hours": ttl_hours })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
