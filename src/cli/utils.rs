use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::models::{Profile, SubscribedTender, Tender};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }
            print_json(&response)
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            Ok(())
        }
    }
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });
            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }
            print_json(&response)
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            Ok(())
        }
    }
}

pub fn tender_line(tender: &Tender) -> String {
    format!(
        "#{:<4} {:<10} {:>15.2}  due {}  {} | {}",
        tender.id, tender.status.as_str(), tender.budget, tender.deadline, tender.title, tender.category
    )
}

pub fn output_tenders(output_format: &OutputFormat, tenders: &[Tender]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(tenders),
        OutputFormat::Text => {
            if tenders.is_empty() {
                println!("No tenders found");
            }
            for tender in tenders {
                println!("{}", tender_line(tender));
            }
            Ok(())
        }
    }
}

pub fn output_tender(output_format: &OutputFormat, tender: &Tender) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(tender),
        OutputFormat::Text => {
            println!("{}", tender_line(tender));
            println!("  {}", tender.description);
            println!("  {} - {}", tender.company, tender.location);
            println!("  contact: {}", tender.contact);
            for requirement in &tender.requirements {
                println!("  - {}", requirement);
            }
            Ok(())
        }
    }
}

pub fn output_subscriptions(output_format: &OutputFormat, entries: &[SubscribedTender]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No subscriptions");
            }
            for entry in entries {
                match &entry.tender {
                    Some(tender) => println!("{}", tender_line(tender)),
                    None => println!("#{:<4} (tender removed)", entry.subscription.tender_id),
                }
            }
            Ok(())
        }
    }
}

pub fn output_profile(output_format: &OutputFormat, profile: &Profile) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Text => {
            println!("{} <{}> [{}] id={}", profile.full_name, profile.email, profile.role, profile.id);
            Ok(())
        }
    }
}
