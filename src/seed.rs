//! Demo accounts and tenders, shared by the local store and `tenders seed`

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::auth::hash_password;
use crate::database::{TenderRepository, UserRepository};
use crate::filter::{Filter, QueryMode, TenderQuery};
use crate::models::{Tender, TenderInput, ValidationError};
use crate::types::Role;

pub struct DemoUser {
    pub email: &'static str,
    pub password: &'static str,
    pub full_name: &'static str,
    pub role: Role,
}

pub const DEMO_USERS: [DemoUser; 2] = [
    DemoUser {
        email: "admin@example.com",
        password: "admin123",
        full_name: "Admin User",
        role: Role::Admin,
    },
    DemoUser {
        email: "user@example.com",
        password: "user123",
        full_name: "Regular User",
        role: Role::User,
    },
];

struct DemoTender {
    title: &'static str,
    description: &'static str,
    budget: f64,
    deadline: &'static str,
    status: &'static str,
    category: &'static str,
    created_on: (i32, u32, u32),
    company: &'static str,
    location: &'static str,
    requirements: &'static [&'static str],
    contact: &'static str,
}

const DEMO_TENDERS: [DemoTender; 5] = [
    DemoTender {
        title: "Мемлекеттік ақпараттық жүйелерді әзірлеу",
        description: "Мемлекеттік қызметтерді көрсету үшін ақпараттық жүйелерді әзірлеу және енгізу",
        budget: 45_000_000.0,
        deadline: "2023-12-31",
        status: "open",
        category: "IT және цифрландыру",
        created_on: (2023, 5, 15),
        company: "Цифрлық даму министрлігі",
        location: "Астана, Қазақстан",
        requirements: &[
            "5+ жыл IT саласындағы тәжірибе",
            "Мемлекеттік жобаларда жұмыс тәжірибесі",
            "Ақпараттық қауіпсіздік стандарттарын білу",
        ],
        contact: "it-projects@gov.kz",
    },
    DemoTender {
        title: "Мектеп ғимаратын жаңғырту",
        description: "Алматы қаласындағы №123 мектеп ғимаратын толық жаңғырту жұмыстары",
        budget: 350_000_000.0,
        deadline: "2024-03-15",
        status: "open",
        category: "Құрылыс",
        created_on: (2023, 6, 10),
        company: "Алматы қаласы әкімдігі",
        location: "Алматы, Қазақстан",
        requirements: &[
            "Құрылыс лицензиясы",
            "Білім беру нысандарын салу тәжірибесі",
            "Жоба мерзімінде аяқтау мүмкіндігі",
        ],
        contact: "construction@almaty.gov.kz",
    },
    DemoTender {
        title: "Қоғамдық көлік жүйесін жаңарту",
        description: "Қарағанды қаласында автобус паркін жаңарту және көлік маршруттарын оңтайландыру",
        budget: 420_000_000.0,
        deadline: "2023-10-01",
        status: "closed",
        category: "Көлік және логистика",
        created_on: (2023, 4, 20),
        company: "Қарағанды қаласы әкімдігі",
        location: "Қарағанды, Қазақстан",
        requirements: &[
            "Көлік жүйелерін басқару тәжірибесі",
            "Логистикалық шешімдер тәжірибесі",
            "Жобаларды басқару сертификаты",
        ],
        contact: "transport@karaganda.gov.kz",
    },
    DemoTender {
        title: "Электронды денсаулық сақтау жүйесін құру",
        description: "Медициналық қызметтерді басқару және пациенттерді тіркеу үшін мобильді қосымша әзірлеу",
        budget: 120_000_000.0,
        deadline: "2024-01-15",
        status: "open",
        category: "IT және цифрландыру",
        created_on: (2023, 7, 5),
        company: "Денсаулық сақтау министрлігі",
        location: "Астана, Қазақстан",
        requirements: &[
            "Мобильді қосымшаларды әзірлеу тәжірибесі",
            "Медициналық ақпараттық жүйелерді білу",
            "Деректерді қорғау стандарттарын сақтау",
        ],
        contact: "healthit@gov.kz",
    },
    DemoTender {
        title: "Ауыл шаруашылығын қолдау бағдарламасын әзірлеу",
        description: "Ауыл шаруашылығы өндірісін жаңғырту және инновациялық технологияларды енгізу бағдарламасын әзірлеу",
        budget: 250_000_000.0,
        deadline: "2024-04-30",
        status: "open",
        category: "Ауыл шаруашылығы",
        created_on: (2023, 8, 12),
        company: "Ауыл шаруашылығы министрлігі",
        location: "Астана, Қазақстан",
        requirements: &[
            "Ауыл шаруашылығы саласындағы тәжірибе",
            "Мемлекеттік бағдарламаларды әзірлеу тәжірибесі",
            "Экономикалық талдау дағдылары",
        ],
        contact: "agri@gov.kz",
    },
];

/// Suggested categories for new tenders; any string is accepted
pub const CATEGORIES: [&str; 8] = [
    "IT және цифрландыру",
    "Құрылыс",
    "Көлік және логистика",
    "Денсаулық сақтау",
    "Ауыл шаруашылығы",
    "Білім беру",
    "Экология",
    "Басқа",
];

impl DemoTender {
    fn input(&self) -> TenderInput {
        TenderInput {
            title: Some(self.title.to_string()),
            description: Some(self.description.to_string()),
            budget: Some(self.budget),
            deadline: Some(self.deadline.to_string()),
            status: Some(self.status.to_string()),
            category: Some(self.category.to_string()),
            company: Some(self.company.to_string()),
            location: Some(self.location.to_string()),
            requirements: Some(self.requirements.iter().map(|r| r.to_string()).collect()),
            contact: Some(self.contact.to_string()),
        }
    }

    fn created_on(&self) -> Option<NaiveDate> {
        let (y, m, d) = self.created_on;
        NaiveDate::from_ymd_opt(y, m, d)
    }
}

/// Demo tenders with ids 1..=5, owned by `owner`
pub fn demo_tenders(owner: i32) -> Result<Vec<Tender>, ValidationError> {
    DEMO_TENDERS
        .iter()
        .zip(1..)
        .map(|(demo, id)| -> Result<Tender, ValidationError> {
            let created_at = demo
                .created_on()
                .and_then(|date| date.and_hms_opt(9, 0, 0))
                .map(|naive| naive.and_utc())
                .unwrap_or_else(Utc::now);
            Ok(Tender::from_draft(id, demo.input().into_draft()?, Some(owner), created_at))
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub tenders_created: usize,
}

/// Creates missing demo users, then the demo tenders if the tenders table
/// is empty. Safe to run repeatedly.
pub async fn seed_database(pool: &PgPool) -> anyhow::Result<SeedReport> {
    let users = UserRepository::new(pool.clone());
    let mut report = SeedReport::default();
    let mut admin_id = None;

    for demo in &DEMO_USERS {
        let row = match users.find_by_email(demo.email).await? {
            Some(row) => row,
            None => {
                let hash = hash_password(demo.password)?;
                report.users_created += 1;
                users.create(demo.email, &hash, demo.full_name, demo.role).await?
            }
        };
        if demo.role.is_admin() {
            admin_id = Some(row.id);
        }
    }
    let admin_id = admin_id.ok_or_else(|| anyhow::anyhow!("no admin account in demo users"))?;

    let tenders = TenderRepository::new(pool.clone());
    let existing = tenders
        .select_any(Filter::new(&TenderQuery::default(), QueryMode::Search))
        .await?;
    if existing.is_empty() {
        for demo in &DEMO_TENDERS {
            tenders.create(&demo.input().into_draft()?, admin_id).await?;
            report.tenders_created += 1;
        }
    } else {
        tracing::info!("{} tenders already present, skipping demo tenders", existing.len());
    }

    tracing::info!(
        "seeded {} users and {} tenders",
        report.users_created,
        report.tenders_created
    );
    Ok(report)
}
