use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde_json::json;

use super::target_user;
use crate::cli::{utils, OutputFormat};
use crate::filter::TenderQuery;
use crate::models::TenderInput;
use crate::seed::CATEGORIES;
use crate::services::ServiceFactory;

#[derive(Subcommand)]
pub enum TenderCommands {
    #[command(about = "List all tenders")]
    List,

    #[command(about = "Show one tender")]
    Show {
        #[arg(help = "Tender id")]
        id: i32,
    },

    #[command(about = "Free-text search with optional refinements")]
    Search {
        #[arg(help = "Matched against title, description and company")]
        term: Option<String>,
        #[command(flatten)]
        refine: Refinements,
        #[arg(long, help = "Only tenders with a deadline on or after this date")]
        deadline_after: Option<NaiveDate>,
        #[arg(long, help = "Only tenders created on or after this date")]
        created_after: Option<NaiveDate>,
    },

    #[command(about = "Filter by category, status and budget")]
    Filter {
        #[command(flatten)]
        refine: Refinements,
    },

    #[command(about = "Create a tender owned by the logged-in user")]
    Create {
        #[command(flatten)]
        fields: TenderFields,
    },

    #[command(about = "Change fields of a tender")]
    Update {
        #[arg(help = "Tender id")]
        id: i32,
        #[command(flatten)]
        fields: TenderFields,
    },

    #[command(about = "Delete a tender and its subscriptions")]
    Delete {
        #[arg(help = "Tender id")]
        id: i32,
    },

    #[command(about = "Subscribe to a tender")]
    Subscribe {
        #[arg(help = "Tender id")]
        id: i32,
        #[arg(long, help = "User to subscribe (defaults to the logged-in user)")]
        user: Option<i32>,
    },

    #[command(about = "Remove a subscription")]
    Unsubscribe {
        #[arg(help = "Tender id")]
        id: i32,
        #[arg(long, help = "User to unsubscribe (defaults to the logged-in user)")]
        user: Option<i32>,
    },

    #[command(about = "List a user's subscriptions")]
    Subscriptions {
        #[arg(long, help = "User id (defaults to the logged-in user)")]
        user: Option<i32>,
    },

    #[command(about = "Check whether a user is subscribed to a tender")]
    Subscribed {
        #[arg(help = "Tender id")]
        id: i32,
        #[arg(long, help = "User id (defaults to the logged-in user)")]
        user: Option<i32>,
    },

    #[command(about = "List suggested categories")]
    Categories,
}

#[derive(Args, Debug, Default)]
pub struct Refinements {
    #[arg(long, help = "Category, or \"All\"")]
    pub category: Option<String>,
    #[arg(long, help = "open, closed, in_progress, awarded, or \"All\"")]
    pub status: Option<String>,
    #[arg(long)]
    pub min_budget: Option<f64>,
    #[arg(long)]
    pub max_budget: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub struct TenderFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub budget: Option<f64>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub deadline: Option<String>,
    #[arg(long, help = "open, closed, in_progress or awarded")]
    pub status: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long = "requirement", help = "Repeat for each requirement")]
    pub requirements: Vec<String>,
    #[arg(long)]
    pub contact: Option<String>,
}

impl TenderFields {
    fn into_input(self) -> TenderInput {
        TenderInput {
            title: self.title,
            description: self.description,
            budget: self.budget,
            deadline: self.deadline,
            status: self.status,
            category: self.category,
            company: self.company,
            location: self.location,
            requirements: (!self.requirements.is_empty()).then_some(self.requirements),
            contact: self.contact,
        }
    }
}

impl Refinements {
    fn into_query(self) -> TenderQuery {
        TenderQuery {
            category: self.category,
            status: self.status,
            min_budget: self.min_budget,
            max_budget: self.max_budget,
            ..Default::default()
        }
    }
}

pub async fn handle(cmd: TenderCommands, factory: &ServiceFactory, output_format: OutputFormat) -> anyhow::Result<()> {
    let tenders = factory.tender_service();

    match cmd {
        TenderCommands::List => {
            let all = tenders.get_all_tenders().await?;
            utils::output_tenders(&output_format, &all)
        }
        TenderCommands::Show { id } => {
            let tender = tenders.get_tender_by_id(id).await?;
            utils::output_tender(&output_format, &tender)
        }
        TenderCommands::Search {
            term,
            refine,
            deadline_after,
            created_after,
        } => {
            let query = TenderQuery {
                search_term: term,
                deadline_after,
                created_after,
                ..refine.into_query()
            };
            let found = tenders.search_tenders(&query).await?;
            utils::output_tenders(&output_format, &found)
        }
        TenderCommands::Filter { refine } => {
            let found = tenders.filter_tenders(&refine.into_query()).await?;
            utils::output_tenders(&output_format, &found)
        }
        TenderCommands::Create { fields } => {
            let tender = tenders.create_tender(&fields.into_input()).await?;
            utils::output_success(
                &output_format,
                &format!("Created tender #{}", tender.id),
                Some(json!({ "tender": tender })),
            )
        }
        TenderCommands::Update { id, fields } => {
            let tender = tenders.update_tender(id, &fields.into_input()).await?;
            utils::output_success(
                &output_format,
                &format!("Updated tender #{}", tender.id),
                Some(json!({ "tender": tender })),
            )
        }
        TenderCommands::Delete { id } => {
            tenders.delete_tender(id).await?;
            utils::output_success(&output_format, &format!("Deleted tender #{}", id), None)
        }
        TenderCommands::Subscribe { id, user } => {
            let user_id = target_user(factory, user)?;
            let subscription = tenders.subscribe_tender(id, user_id).await?;
            utils::output_success(
                &output_format,
                &format!("User {} subscribed to tender #{}", user_id, id),
                Some(json!({ "subscription": subscription })),
            )
        }
        TenderCommands::Unsubscribe { id, user } => {
            let user_id = target_user(factory, user)?;
            tenders.unsubscribe_tender(id, user_id).await?;
            utils::output_success(
                &output_format,
                &format!("User {} unsubscribed from tender #{}", user_id, id),
                None,
            )
        }
        TenderCommands::Subscriptions { user } => {
            let user_id = target_user(factory, user)?;
            let entries = tenders.get_user_subscriptions(user_id).await?;
            utils::output_subscriptions(&output_format, &entries)
        }
        TenderCommands::Subscribed { id, user } => {
            let user_id = target_user(factory, user)?;
            let subscribed = tenders.is_user_subscribed(id, user_id).await?;
            match output_format {
                OutputFormat::Json => utils::print_json(&json!({ "subscribed": subscribed })),
                OutputFormat::Text => {
                    println!("{}", if subscribed { "subscribed" } else { "not subscribed" });
                    Ok(())
                }
            }
        }
        TenderCommands::Categories => match output_format {
            OutputFormat::Json => utils::print_json(&CATEGORIES),
            OutputFormat::Text => {
                for category in CATEGORIES {
                    println!("{}", category);
                }
                Ok(())
            }
        },
    }
}
