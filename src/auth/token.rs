//! Token management implementation for catalog API authentication
//!
//! This module handles secure storage, retrieval, and verification of the
//! bearer token used against the catalog API. The token is stored in a .env
//! file with appropriate security permissions and is attached to individual
//! requests by the caller, never held by the client itself.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::app::CatalogClient;
use crate::constants::{auth, env as env_constants};
use crate::errors::{ApiError, AuthError, AuthResult};

/// Authentication status information
#[derive(Debug, Clone)]
pub struct AuthStatus {
    /// Whether the token environment variable carries a usable value
    pub token_set: bool,
    /// Whether .env file exists in current directory
    pub dotenv_file_exists: bool,
    /// Whether the token has been verified (None = not tested)
    pub token_valid: Option<bool>,
}

impl AuthStatus {
    /// Check if a token is available in the environment
    pub fn has_token(&self) -> bool {
        self.token_set
    }

    /// Get descriptive status message for display
    pub fn status_message(&self) -> String {
        match (self.token_set, self.token_valid) {
            (false, _) => "Missing token - run 'auth setup' to configure".to_string(),
            (true, None) => "Token configured but not verified".to_string(),
            (true, Some(true)) => "Token configured and verified".to_string(),
            (true, Some(false)) => "Token configured but rejected by the API".to_string(),
        }
    }
}

/// Check current authentication status
pub fn get_auth_status() -> AuthStatus {
    AuthStatus {
        token_set: load_token().is_some(),
        dotenv_file_exists: Path::new(".env").exists(),
        token_valid: None,
    }
}

/// Check if a token exists in the environment
pub fn check_token() -> bool {
    load_token().is_some()
}

/// Load the token from the environment, treating blank values as unset
pub fn load_token() -> Option<String> {
    env::var(env_constants::API_TOKEN)
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Prompt user for a token interactively
///
/// The token is read without echo. Input is trimmed and rejected when it
/// cannot plausibly be a bearer token.
pub fn prompt_token() -> AuthResult<String> {
    let token = rpassword::prompt_password("Catalog API token: ")?;
    let token = token.trim().to_string();

    if token.is_empty() {
        return Err(AuthError::InvalidToken {
            reason: "Token cannot be empty".to_string(),
        });
    }

    if !is_plausible_token(&token) {
        return Err(AuthError::InvalidToken {
            reason: format!(
                "Token should be at least {} characters with no whitespace",
                auth::MIN_TOKEN_LENGTH
            ),
        });
    }

    Ok(token)
}

/// Validate token shape before storage, catching paste accidents
fn is_plausible_token(token: &str) -> bool {
    token.len() >= auth::MIN_TOKEN_LENGTH && !token.chars().any(|c| c.is_whitespace())
}

/// Save the token to a .env file with secure permissions
pub fn save_token(token: &str) -> AuthResult<()> {
    rewrite_env_file(Path::new(".env"), Some(token))?;

    // Update current environment so the token is usable immediately
    env::set_var(env_constants::API_TOKEN, token);

    println!("Token saved to .env file");

    #[cfg(unix)]
    println!("File permissions set to owner-only (600)");

    #[cfg(not(unix))]
    println!(
        "Warning: File permissions not set (non-Unix system). Please ensure .env file is protected."
    );

    Ok(())
}

/// Remove the stored token from the environment and the .env file
pub fn clear_token() -> AuthResult<()> {
    let env_path = Path::new(".env");
    if env_path.exists() {
        rewrite_env_file(env_path, None)?;
    }

    env::remove_var(env_constants::API_TOKEN);

    println!("Token cleared");
    Ok(())
}

/// Rewrite the .env file, replacing or removing the token line while
/// preserving every other entry
fn rewrite_env_file(env_path: &Path, token: Option<&str>) -> AuthResult<()> {
    let prefix = format!("{}=", env_constants::API_TOKEN);
    let mut lines = Vec::new();
    let mut token_written = false;

    // Read existing .env file if it exists
    if env_path.exists() {
        let file = File::open(env_path)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;

            if line.trim().starts_with(&prefix) {
                if let Some(token) = token {
                    if !token_written {
                        lines.push(format!("{}={}", env_constants::API_TOKEN, token));
                        token_written = true;
                    }
                }
            } else {
                lines.push(line);
            }
        }
    }

    if let Some(token) = token {
        if !token_written {
            lines.push(format!("{}={}", env_constants::API_TOKEN, token));
        }
    }

    // Write back to .env file
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(env_path)?;

    for line in &lines {
        writeln!(file, "{}", line)?;
    }

    // Set restrictive permissions (Unix-like systems only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(auth::ENV_FILE_PERMISSIONS);
        file.set_permissions(perms)?;
    }

    Ok(())
}

/// Verify a token by issuing a minimal authenticated catalog request
///
/// Returns `Ok(false)` when the API rejects the token, and an error when
/// the verification request could not be completed at all.
pub async fn verify_token(client: &CatalogClient, token: &str) -> AuthResult<bool> {
    match client.list_feeds(Some(1), None, Some(token)).await {
        Ok(_) => Ok(true),
        Err(ApiError::Status {
            status: 401 | 403, ..
        }) => Ok(false),
        Err(e) => {
            tracing::warn!("Token verification request failed: {}", e);
            Err(AuthError::VerificationFailed)
        }
    }
}

/// Interactive token setup workflow
pub async fn setup_token(client: &CatalogClient) -> AuthResult<()> {
    println!("Catalog API Authentication Setup");
    println!("================================");
    println!();
    println!("This will configure the bearer token used for catalog API requests.");
    println!("The token will be stored in a .env file in the current directory.");
    println!();

    // Check if a token already exists
    let status = get_auth_status();
    if status.has_token() {
        println!("Warning: A token is already configured.");
        print!("Do you want to replace it? [y/N]: ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().to_lowercase().starts_with('y') {
            println!("Setup cancelled.");
            return Ok(());
        }
        println!();
    }

    let token = prompt_token()?;

    println!();
    println!("Saving token...");
    save_token(&token)?;

    println!();
    println!("Verifying token...");
    let is_valid = verify_token(client, &token).await?;

    if is_valid {
        println!();
        println!("Setup complete! You can now use authenticated catalog commands.");
    } else {
        println!();
        println!("Setup failed: the catalog API rejected the token.");
        println!("   You can run 'auth setup' again to re-enter it.");
    }

    Ok(())
}

/// Show current authentication status
pub async fn show_auth_status(client: &CatalogClient) -> AuthResult<()> {
    let mut status = get_auth_status();

    println!("Catalog API Authentication Status");
    println!("=================================");
    println!();

    println!(
        "Token: {}",
        if status.token_set { "Set" } else { "Not set" }
    );

    println!(
        ".env file: {}",
        if status.dotenv_file_exists {
            "Exists"
        } else {
            "Not found"
        }
    );

    println!();

    if let Some(token) = load_token() {
        println!("Testing token...");
        let is_valid = verify_token(client, &token).await?;
        status.token_valid = Some(is_valid);

        println!();
    }

    println!("Status: {}", status.status_message());

    if !status.has_token() {
        println!();
        println!("To configure a token, run: transit-catalog auth setup");
    } else if status.token_valid == Some(false) {
        println!();
        println!("To update the token, run: transit-catalog auth setup");
    }

    Ok(())
}
