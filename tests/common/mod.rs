#![allow(dead_code)]

use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use marketing_cms::config::AppConfig;
use marketing_cms::database::models::{Blog, CaseStudy};
use marketing_cms::services::AccountService;
use marketing_cms::store::{ContentStore, MemoryStore};
use marketing_cms::{app, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "member-password";

static TRACING: Once = Once::new();

/// A logged-in account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub user_type_id: Uuid,
    pub email: String,
    pub token: String,
}

/// One server per test, bound to an ephemeral port over a fresh in-memory store
pub struct TestApp {
    pub base_url: String,
    pub state: AppState,
    pub admin: Account,
    client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        TRACING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });

        let state = AppState::new(AppConfig::development(), MemoryStore::new());
        AccountService::new(Arc::clone(&state.accounts), state.config.security.min_password_length)
            .bootstrap_admin("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let client = reqwest::Client::new();
        let placeholder = Account {
            id: Uuid::nil(),
            user_type_id: Uuid::nil(),
            email: String::new(),
            token: String::new(),
        };
        let mut test_app = Self {
            base_url,
            state,
            admin: placeholder,
            client,
        };
        test_app.admin = test_app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await?;
        Ok(test_app)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Account> {
        let (status, body) = self
            .send(Method::POST, "/api/auth/login", None, Some(json!({ "email": email, "password": password })))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login for {} failed: {} {}", email, status, body);

        let data = &body["data"];
        Ok(Account {
            id: data["user"]["id"].as_str().context("user id")?.parse()?,
            user_type_id: data["user"]["user_type_id"].as_str().context("user type id")?.parse()?,
            email: email.to_string(),
            token: data["token"].as_str().context("token")?.to_string(),
        })
    }

    /// Create a user type granting exactly `permissions`, a member account in
    /// it, and log that account in
    pub async fn account_with(&self, email: &str, permissions: &[&str]) -> Result<Account> {
        let (status, body) = self
            .post(
                "/api/admin/user-types",
                &self.admin.token,
                json!({ "name": format!("Role for {}", email), "permissions": permissions }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "user type create failed: {} {}", status, body);
        let type_id = body["data"]["id"].as_str().context("type id")?.to_string();

        let (status, body) = self
            .post(
                "/api/admin/users",
                &self.admin.token,
                json!({ "name": "Member", "email": email, "password": PASSWORD, "user_type_id": type_id }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "user create failed: {} {}", status, body);

        self.login(email, PASSWORD).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    pub async fn insert_blog(&self, blog: Blog) -> Result<Blog> {
        Ok(self.state.blogs.insert(&blog).await?)
    }

    pub async fn insert_case_study(&self, case_study: CaseStudy) -> Result<CaseStudy> {
        Ok(self.state.case_studies.insert(&case_study).await?)
    }
}

pub fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn blog(slug: &str, tags: &[&str], days_ago: i64) -> Blog {
    let published = base_date() - Duration::days(days_ago);
    Blog {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: format!("Post {}", slug),
        excerpt: format!("About {}", slug),
        content: "Body".to_string(),
        author: "Staff".to_string(),
        image_url: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        publish_date: published,
        active: true,
        created_at: published,
        updated_at: published,
    }
}

/// Case study created `days_ago` days before [`base_date`]
pub fn case_study(slug: &str, tags: &[&str], days_ago: i64) -> CaseStudy {
    let created = base_date() - Duration::days(days_ago);
    CaseStudy {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: format!("Case {}", slug),
        client: "Acme".to_string(),
        summary: String::new(),
        content: "Body".to_string(),
        image_url: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        active: true,
        created_at: created,
        updated_at: created,
    }
}

/// Slugs of a list payload, in order
pub fn slugs(items: &Value) -> Vec<String> {
    items
        .as_array()
        .map(|a| a.iter().filter_map(|i| i["slug"].as_str().map(String::from)).collect())
        .unwrap_or_default()
}
