//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use recurwise_server::{JwtConfig, ServerConfig};

use super::open_db;

/// Split a comma-separated list, dropping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn join_networks(networks: &[ipnet::IpNet]) -> String {
    networks
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the server configuration from `RECURWISE_*` environment variables
pub fn server_config_from_env(no_auth: bool) -> ServerConfig {
    let api_keys = parse_api_keys(&env_value("RECURWISE_API_KEYS").unwrap_or_default());
    let trusted_networks = recurwise_server::parse_trusted_networks(
        &env_value("RECURWISE_TRUSTED_NETWORKS").unwrap_or_default(),
    );
    let trusted_proxies = recurwise_server::parse_trusted_networks(
        &env_value("RECURWISE_TRUSTED_PROXIES").unwrap_or_default(),
    );

    ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
        jwt: JwtConfig {
            secret: env_value("RECURWISE_JWT_SECRET"),
            audience: env_value("RECURWISE_JWT_AUDIENCE"),
        },
        trusted_networks,
        trusted_proxies,
    }
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Recurwise web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = server_config_from_env(no_auth);

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        if config.jwt.is_enabled() {
            println!("   🔐 Authentication: bearer JWT (RECURWISE_JWT_SECRET)");
            if let Some(aud) = &config.jwt.audience {
                println!("      Expected audience: {}", aud);
            }
        } else {
            println!("   🔒 JWT authentication off");
            println!("      Set RECURWISE_JWT_SECRET to accept signed bearer tokens");
        }
        if !config.api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (RECURWISE_API_KEYS)",
                config.api_keys.len()
            );
        }
        if !config.trusted_networks.is_empty() {
            println!(
                "   🏠 Trusted networks: {} (RECURWISE_TRUSTED_NETWORKS)",
                join_networks(&config.trusted_networks)
            );
        }
        if !config.trusted_proxies.is_empty() {
            println!(
                "   🔀 Trusted proxies: {} (RECURWISE_TRUSTED_PROXIES)",
                join_networks(&config.trusted_proxies)
            );
        }
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let static_dir_str = static_dir
        .map(|p| {
            p.to_str()
                .with_context(|| format!("Static dir path is not valid UTF-8: {}", p.display()))
        })
        .transpose()?;
    recurwise_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
