#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const ADMIN_EMAIL: &str = "admin@e2e.enjoytrip.test";
pub const ADMIN_PASSWORD: &str = "admin-password-e2e";
pub const TEST_JWT_SECRET: &str = "enjoytrip-e2e-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the binary before integration tests run. The static
        // handle is never dropped, so the server is tied to this process.
        let mut cmd = supervised(std::process::id(), env!("CARGO_BIN_EXE_enjoytrip-api"), &["serve"]);
        cmd.env("APP_HOST", "127.0.0.1")
            .env("APP_PORT", port.to_string())
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .env("ADMIN_EMAIL", ADMIN_EMAIL)
            .env("ADMIN_PASSWORD", ADMIN_PASSWORD)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited from the test environment
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Watchdog that runs `program` until `watch_pid` exits, then sends it SIGTERM.
const WATCHDOG: &str = r#"
"$@" &
server=$!
trap 'kill "$server" 2>/dev/null' EXIT
while kill -0 "$WATCH_PID" 2>/dev/null && kill -0 "$server" 2>/dev/null; do
    sleep 1
done
"#;

/// Build a command that runs `program args..` for as long as `watch_pid` lives.
pub fn supervised(watch_pid: u32, program: &str, args: &[&str]) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(WATCHDOG)
        .arg("sh")
        .arg(program)
        .args(args)
        .env("WATCH_PID", watch_pid.to_string());
    cmd
}

/// Start the shared server, or `None` when no database is configured.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping end-to-end test");
        return Ok(None);
    }
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(Some(server))
}

/// A signed-up account with a live token
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> Result<String> {
    let res = Client::new()
        .post(server.url("/api/v1/users/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["access_token"]
        .as_str()
        .map(str::to_string)
        .context("login response carries no access_token")
}

pub async fn signup(server: &TestServer) -> Result<TestUser> {
    let email = format!("{}@e2e.enjoytrip.test", unique("user"));
    let password = "correct-horse-battery";

    let res = Client::new()
        .post(server.url("/api/v1/users/join"))
        .json(&json!({ "email": email, "password": password, "nickname": unique("nick") }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed with {}", res.status());
    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_i64().context("signup response carries no id")?;

    let token = login(server, &email, password).await?;
    Ok(TestUser { id, email, token })
}

pub async fn admin_token(server: &TestServer) -> Result<String> {
    login(server, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// POST `body` to `path` as `token` and return the created id.
pub async fn create(server: &TestServer, token: &str, path: &str, body: Value) -> Result<i64> {
    let res = Client::new()
        .post(server.url(path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "POST {} failed with {}", path, res.status());
    let body: Value = res.json().await?;
    body["data"]["id"].as_i64().context("create response carries no id")
}

pub async fn get_json(server: &TestServer, token: &str, path: &str) -> Result<(StatusCode, Value)> {
    let res = Client::new().get(server.url(path)).bearer_auth(token).send().await?;
    let status = res.status();
    let body = res.json().await.unwrap_or(Value::Null);
    Ok((status, body))
}
