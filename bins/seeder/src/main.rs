//! Seeds the default roles and the administrator account.
//!
//! Safe to run repeatedly: existing roles and users are left untouched.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, anyhow};
use kontor_core::auth::{ADMIN_ROLE, DEFAULT_ROLES, NewUser};
use kontor_db::{RoleRepository, UserRepository, connect};
use kontor_shared::AppConfig;
use tracing::info;

const ADMIN_EMAIL: &str = "admin@erp.com";
const ADMIN_PASSWORD: &str = "admin123";
const ADMIN_NAME: &str = "Administrador";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kontor=info".into()),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let roles = RoleRepository::new(db.clone());
    let created = roles.ensure(&DEFAULT_ROLES).await?;
    info!(created, "Roles seeded");

    let users = UserRepository::new(db);
    if users.email_exists(ADMIN_EMAIL).await? {
        info!(email = ADMIN_EMAIL, "Administrator already exists, skipping");
        return Ok(());
    }

    let admin_role = roles
        .find_by_name(ADMIN_ROLE)
        .await?
        .ok_or_else(|| anyhow!("role '{ADMIN_ROLE}' is missing after seeding"))?;

    let input = NewUser {
        email: Some(ADMIN_EMAIL.into()),
        password: Some(ADMIN_PASSWORD.into()),
        name: Some(ADMIN_NAME.into()),
        role_id: Some(admin_role.id),
    }
    .validate()?;
    let admin = users.create(input).await?;
    info!(user_id = %admin.user.id, email = ADMIN_EMAIL, "Administrator created");

    Ok(())
}
