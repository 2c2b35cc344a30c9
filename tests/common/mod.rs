#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Schema plus demo accounts, so the admin login below works
        let status = Command::new(env!("CARGO_BIN_EXE_tenders"))
            .args(["seed", "--bootstrap"])
            .stdin(Stdio::null())
            .status()
            .context("failed to run seed command")?;
        anyhow::ensure!(status.success(), "seeding failed: {}", status);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tenders-api"));
        cmd.env("TENDERS_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherits DATABASE_URL and JWT_SECRET from the environment
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn api(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

/// Starts the server once per test binary. `None` when no database is
/// configured; callers return early in that case.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(None);
    }
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// Identity returned by register/login
pub struct Account {
    pub id: i64,
    pub email: String,
    pub token: String,
}

fn account(body: &Value) -> Result<Account> {
    Ok(Account {
        id: body["id"].as_i64().context("id missing")?,
        email: body["email"].as_str().context("email missing")?.to_string(),
        token: body["token"].as_str().context("token missing")?.to_string(),
    })
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn register(server: &TestServer, prefix: &str) -> Result<Account> {
    let res = reqwest::Client::new()
        .post(server.api("/auth/register"))
        .json(&json!({
            "email": unique_email(prefix),
            "password": "secret123",
            "full_name": format!("{} tester", prefix),
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register returned {}", res.status());
    account(&res.json().await?)
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> Result<Account> {
    let res = reqwest::Client::new()
        .post(server.api("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login returned {}", res.status());
    account(&res.json().await?)
}

pub async fn admin(server: &TestServer) -> Result<Account> {
    login(server, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

pub fn tender_body(title: &str, budget: f64) -> Value {
    json!({
        "title": title,
        "description": "Integration test tender",
        "budget": budget,
        "deadline": "2030-01-31",
        "category": "Construction",
        "company": "Test Company",
        "location": "Almaty",
        "requirements": ["License"],
        "contact": "test@example.com"
    })
}

pub async fn create_tender(server: &TestServer, token: &str, title: &str, budget: f64) -> Result<Value> {
    let res = reqwest::Client::new()
        .post(server.api("/tenders"))
        .bearer_auth(token)
        .json(&tender_body(title, budget))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create returned {}", res.status());
    Ok(res.json().await?)
}
