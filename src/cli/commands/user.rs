use clap::Subcommand;
use serde_json::json;

use super::target_user;
use crate::cli::{utils, OutputFormat};
use crate::models::{ChangePasswordRequest, ProfileUpdate};
use crate::services::ServiceFactory;
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Show a profile")]
    Show {
        #[arg(help = "User id (defaults to the logged-in user)")]
        id: Option<i32>,
    },

    #[command(about = "Change name or (admins only) role")]
    Update {
        #[arg(help = "User id (defaults to the logged-in user)")]
        id: Option<i32>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, help = "user or admin")]
        role: Option<Role>,
    },

    #[command(about = "Change a password")]
    Password {
        #[arg(help = "User id (defaults to the logged-in user)")]
        id: Option<i32>,
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

pub async fn handle(cmd: UserCommands, factory: &ServiceFactory, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = factory.user_service();

    match cmd {
        UserCommands::Show { id } => {
            let profile = users.get_user_profile(target_user(factory, id)?).await?;
            utils::output_profile(&output_format, &profile)
        }
        UserCommands::Update { id, name, role } => {
            let update = ProfileUpdate { full_name: name, role };
            let profile = users.update_user_profile(target_user(factory, id)?, &update).await?;
            utils::output_success(
                &output_format,
                &format!("Updated profile of user {}", profile.id),
                Some(json!({ "profile": profile })),
            )
        }
        UserCommands::Password { id, current, new } => {
            let user_id = target_user(factory, id)?;
            let request = ChangePasswordRequest {
                current_password: current,
                new_password: new,
            };
            users.change_password(user_id, &request).await?;
            utils::output_success(&output_format, &format!("Password changed for user {}", user_id), None)
        }
    }
}
