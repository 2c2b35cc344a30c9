//! Fixtures shared by unit tests

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{Profile, Tender, TenderInput};
use crate::types::{Role, TenderStatus};

/// Fully populated create payload; callers tweak individual fields
pub fn tender_input(title: &str, budget: f64, deadline: &str) -> TenderInput {
    TenderInput {
        title: Some(title.to_string()),
        description: Some(format!("{} description", title)),
        budget: Some(budget),
        deadline: Some(deadline.to_string()),
        status: Some("open".to_string()),
        category: Some("Construction".to_string()),
        company: Some("Test Company".to_string()),
        location: Some("Almaty".to_string()),
        requirements: Some(vec!["License".to_string()]),
        contact: Some("test@example.com".to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn tender(
    id: i32,
    title: &str,
    description: &str,
    company: &str,
    category: &str,
    status: TenderStatus,
    budget: f64,
    deadline: (i32, u32, u32),
    created: (i32, u32, u32),
) -> Tender {
    let created_at = Utc
        .with_ymd_and_hms(created.0, created.1, created.2, 9, 0, 0)
        .single()
        .unwrap();
    Tender {
        id,
        title: title.to_string(),
        description: description.to_string(),
        budget,
        deadline: NaiveDate::from_ymd_opt(deadline.0, deadline.1, deadline.2).unwrap(),
        status,
        category: category.to_string(),
        company: company.to_string(),
        location: "Kazakhstan".to_string(),
        requirements: vec![],
        contact: "tenders@example.com".to_string(),
        created_by: Some(1),
        created_at: created_at.date_naive(),
        updated_at: Some(created_at),
    }
}

/// Five tenders with distinct text, categories, statuses, budgets and dates
pub fn sample_tenders() -> Vec<Tender> {
    vec![
        tender(
            1,
            "Road repair in Almaty",
            "Repair of the main road surface",
            "Ministry of Transport",
            "Construction",
            TenderStatus::Open,
            45_000_000.0,
            (2023, 12, 31),
            (2023, 5, 15),
        ),
        tender(
            2,
            "Medical equipment for city hospital",
            "Supply of diagnostic equipment",
            "Almaty Health Department",
            "Healthcare",
            TenderStatus::InProgress,
            120_000_000.0,
            (2024, 2, 15),
            (2023, 7, 1),
        ),
        tender(
            3,
            "Office software licenses",
            "Annual licenses for office software",
            "Ministry of Finance",
            "IT",
            TenderStatus::Closed,
            150_000_000.0,
            (2023, 9, 30),
            (2023, 3, 10),
        ),
        tender(
            4,
            "Мектеп салу",
            "New school building for 600 pupils in Shymkent",
            "Shymkent Akimat",
            "Construction",
            TenderStatus::Open,
            300_000_000.0,
            (2024, 6, 30),
            (2023, 8, 20),
        ),
        tender(
            5,
            "Park landscaping",
            "Landscaping of the central park",
            "Astana Green",
            "Services",
            TenderStatus::Awarded,
            200_000_000.0,
            (2023, 11, 15),
            (2023, 4, 1),
        ),
    ]
}

pub fn profile(id: i32, role: Role) -> Profile {
    Profile {
        id,
        email: format!("user{}@example.com", id),
        full_name: format!("User {}", id),
        role,
    }
}
