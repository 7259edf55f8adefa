use std::io::Write;

use crate::config::Config;
use crate::db::Store;
use crate::services::mailer::mailer_from_config;
use crate::services::{AuthError, AuthService, SeaOrmAuthService};

pub async fn cmd_create_admin(
    config: &Config,
    email: &str,
    full_name: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let auth = SeaOrmAuthService::new(
        store,
        config.security.clone(),
        mailer_from_config(&config.mail)?,
    );

    match auth.create_admin(full_name, email, &password).await {
        Ok(person) => {
            println!("✓ Admin created: {} <{}> (ID: {})", person.full_name, person.email, person.id);
            Ok(())
        }
        Err(AuthError::Conflict(_)) => {
            anyhow::bail!("A person with email '{email}' already exists")
        }
        Err(AuthError::Validation(_)) => {
            anyhow::bail!("Email, full name and password must all be non-empty")
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create admin: {e}")),
    }
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password for the new admin: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
