use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::models::RegisterRequest;
use crate::services::ServiceFactory;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the session")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Show the logged-in user")]
    Whoami,

    #[command(about = "Register new user and log in as them")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Full name")]
        name: String,
        #[arg(long, help = "Password")]
        password: String,
    },
}

pub async fn handle(cmd: AuthCommands, factory: &ServiceFactory, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let user = factory.user_service().login(&email, &password).await?;
            utils::output_success(
                &output_format,
                &format!("Logged in as {} ({})", user.full_name, user.role),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            factory.session().clear()?;
            utils::output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Whoami => match factory.session().current()? {
            Some(user) => match output_format {
                OutputFormat::Json => utils::print_json(&json!({ "current_user": user })),
                OutputFormat::Text => {
                    println!("{} <{}> [{}] id={}", user.full_name, user.email, user.role, user.id);
                    Ok(())
                }
            },
            None => match output_format {
                OutputFormat::Json => utils::print_json(&json!({ "current_user": null })),
                OutputFormat::Text => {
                    println!("Not logged in");
                    Ok(())
                }
            },
        },
        AuthCommands::Register { email, name, password } => {
            let request = RegisterRequest {
                email,
                password,
                full_name: name,
            };
            let user = factory.user_service().register(&request).await?;
            utils::output_success(
                &output_format,
                &format!("Registered {} with id {}", user.email, user.id),
                Some(json!({ "user": user })),
            )
        }
    }
}
