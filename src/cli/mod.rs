// gigctl: operator tooling for the gateway. Seeds admin accounts, hashes
// passwords the way the gateway stores them, and probes a running
// instance's health endpoint.
use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::auth::password;
use crate::config::AppConfig;
use crate::database;
use crate::database::models::{NewClient, Role};
use crate::database::postgres::PgDirectory;
use crate::database::store::ClientDirectory;

#[derive(Parser)]
#[command(name = "gigctl")]
#[command(about = "Operator tooling for the gigboard gateway")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create an admin account directly in the client directory")]
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "Account")]
        last_name: String,
    },

    #[command(about = "Hash a password with the gateway's storage parameters")]
    HashPassword {
        #[arg(help = "Plaintext password to hash")]
        password: String,
    },

    #[command(about = "Check a running gateway's health endpoint")]
    Health {
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        url: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::CreateAdmin {
            email,
            password,
            first_name,
            last_name,
        } => create_admin(email, password, first_name, last_name).await,
        Commands::HashPassword { password } => {
            let hash = password::hash_password(&password).context("hashing failed")?;
            println!("{hash}");
            Ok(())
        }
        Commands::Health { url } => health(url).await,
    }
}

/// Registration only ever creates regular clients, so the first admin has
/// to be written straight into the directory.
async fn create_admin(
    email: String,
    password: String,
    first_name: String,
    last_name: String,
) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let pool = database::connect(&config.database)
        .await
        .context("failed to open database pool")?;
    let directory = PgDirectory::new(pool);

    let new = NewClient {
        id: Uuid::new_v4(),
        role: Role::Admin,
        first_name,
        last_name,
        email,
        password_hash: password::hash_password(&password).context("hashing failed")?,
        refresh_token_hash: None,
    };
    let client = directory
        .create_client(new)
        .await
        .context("failed to create admin account")?;
    println!("created admin {} ({})", client.email, client.id);
    Ok(())
}

async fn health(url: String) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", url.trim_end_matches('/'));
    let response = reqwest::get(&endpoint)
        .await
        .with_context(|| format!("request to {endpoint} failed"))?;
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .unwrap_or_else(|_| serde_json::json!({}));

    if status.is_success() {
        println!(
            "{endpoint}: {} {}",
            status.as_u16(),
            body["status"].as_str().unwrap_or("ok")
        );
        Ok(())
    } else {
        anyhow::bail!("{endpoint} answered {status}: {body}")
    }
}
