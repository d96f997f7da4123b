//! Tradedesk CLI: drive the client session against a live backend.
//!
//! # Usage
//!
//! ```bash
//! # Log in; the token is kept in TRADEDESK_TOKEN_PATH
//! tradedesk login -e owner@example.com
//!
//! # Who am I? (restores the persisted session first)
//! tradedesk whoami
//!
//! # Any API call, authenticated with the current session
//! tradedesk request GET /orders
//! tradedesk request PATCH /orders/12 --data '{"status":"dispatched"}'
//!
//! # Would a route guarded for accountants render?
//! tradedesk guard --roles accountant,admin --route /accountant/reports
//!
//! tradedesk logout
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tradedesk::prelude::*;
use tradedesk::protocol::ProtocolError;
use tradedesk::{
    DEFAULT_API_BASE, DEFAULT_API_HOST, DEFAULT_TOKEN_PATH, ENV_API_BASE, ENV_API_HOST,
    ENV_HTTP_TIMEOUT, ENV_TOKEN_PATH,
};

#[derive(Parser)]
#[command(name = "tradedesk")]
#[command(author, version, about = "Tradedesk session tools")]
struct Cli {
    /// Backend host
    #[arg(long, env = ENV_API_HOST, default_value = DEFAULT_API_HOST, global = true)]
    api_host: String,

    /// API path prefix
    #[arg(long, env = ENV_API_BASE, default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,

    /// Where the session token is kept
    #[arg(long, env = ENV_TOKEN_PATH, default_value = DEFAULT_TOKEN_PATH, global = true)]
    token_path: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, env = ENV_HTTP_TIMEOUT, default_value_t = 30, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "TRADEDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Send an authenticated request and print the JSON response
    Request {
        /// GET, POST, PUT, PATCH or DELETE
        method: Method,

        /// Path under the API root, e.g. `/orders`
        path: String,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Change the logged-in user's password
    ChangePassword {
        #[arg(long, env = "TRADEDESK_OLD_PASSWORD", hide_env_values = true)]
        old: String,

        #[arg(long, env = "TRADEDESK_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
    /// Evaluate a route guard against the current session
    Guard {
        /// Roles the route admits (comma separated); all when omitted
        #[arg(long, value_delimiter = ',')]
        roles: Vec<Role>,

        /// Where anonymous visitors are sent
        #[arg(long, default_value = tradedesk::guard::DEFAULT_REDIRECT)]
        redirect: String,

        /// The path being guarded
        #[arg(long)]
        route: Option<String>,
    },
}

impl Commands {
    /// Whether the persisted session must be restored before running.
    /// Logout only forgets the token, so it never contacts the backend.
    fn needs_restore(&self) -> bool {
        !matches!(self, Commands::Logout)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tradedesk::init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("command failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), TradedeskError> {
    let config = ClientConfig {
        api_host: cli.api_host,
        api_base: cli.api_base,
        token_path: cli.token_path,
        timeout_secs: cli.timeout,
    };
    let app = Tradedesk::builder().config(config).build()?;
    if cli.command.needs_restore() {
        app.start().await;
    }

    match cli.command {
        Commands::Login { email, password } => {
            let user = app.session().login(&email, &password).await?;
            println!("logged in as {} <{}> ({})", user.name, user.email, user.role);
            match landing_for(&user) {
                Landing::Dashboard(path) => println!("landing: {path}"),
                Landing::InactiveNotice => {
                    println!("your account is inactive, contact an administrator")
                }
            }
        }
        Commands::Logout => {
            app.session().logout();
            println!("logged out");
        }
        Commands::Whoami => match app.session().current_user() {
            Some(user) => print_json(&to_value(&user)?)?,
            None => println!("not logged in"),
        },
        Commands::Request { method, path, data } => {
            let body = data
                .as_deref()
                .map(serde_json::from_str::<Value>)
                .transpose()
                .map_err(|e| TradedeskError::Config(format!("--data is not JSON: {e}")))?;
            let response = app.api().request(method, &path, body.as_ref()).await?;
            print_json(&response)?;
        }
        Commands::ChangePassword { old, new } => {
            app.session().change_password(&old, &new).await?;
            println!("password changed");
        }
        Commands::Guard {
            roles,
            redirect,
            route,
        } => {
            let mut guard = RouteGuard::new().redirect_to(redirect);
            if !roles.is_empty() {
                guard = guard.allow_roles(roles);
            }
            if let Some(route) = route {
                guard = guard.at(route);
            }
            match app.settle(&guard).await? {
                GuardDecision::Allow(user) => println!("allow: {} ({})", user.name, user.role),
                GuardDecision::Inactive(user) => println!("inactive: {}", user.email),
                GuardDecision::Forbidden(user) => {
                    println!("forbidden: {} ({})", user.name, user.role)
                }
                GuardDecision::Redirect { to } => println!("redirect: {to}"),
                GuardDecision::Loading => println!("loading"),
            }
        }
    }
    Ok(())
}

fn to_value(user: &User) -> Result<Value, TradedeskError> {
    Ok(serde_json::to_value(user).map_err(ProtocolError::Encode)?)
}

fn print_json(value: &Value) -> Result<(), TradedeskError> {
    let pretty = serde_json::to_string_pretty(value).map_err(ProtocolError::Encode)?;
    println!("{pretty}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rand::Rng;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_request_with_body() {
        let cli = Cli::try_parse_from([
            "tradedesk",
            "request",
            "patch",
            "/orders/12",
            "--data",
            r#"{"status":"dispatched"}"#,
        ])
        .unwrap();

        match cli.command {
            Commands::Request { method, path, data } => {
                assert_eq!(method, Method::Patch);
                assert_eq!(path, "/orders/12");
                assert!(data.is_some());
            }
            _ => panic!("expected request"),
        }
    }

    #[test]
    fn test_parse_guard_roles_list() {
        let cli =
            Cli::try_parse_from(["tradedesk", "guard", "--roles", "accountant,admin"]).unwrap();

        match cli.command {
            Commands::Guard {
                roles,
                redirect,
                route,
            } => {
                assert_eq!(roles, vec![Role::Accountant, Role::Admin]);
                assert_eq!(redirect, "/login");
                assert_eq!(route, None);
            }
            _ => panic!("expected guard"),
        }
    }

    #[test]
    fn test_parse_guard_route() {
        let cli = Cli::try_parse_from(["tradedesk", "guard", "--route", "/dashboard"]).unwrap();

        match cli.command {
            Commands::Guard { route, .. } => assert_eq!(route.as_deref(), Some("/dashboard")),
            _ => panic!("expected guard"),
        }
    }

    #[test]
    fn test_needs_restore_logout_skips_restore() {
        let cli = Cli::try_parse_from(["tradedesk", "logout"]).unwrap();
        assert!(!cli.command.needs_restore());
    }

    #[test]
    fn test_needs_restore_whoami_restores() {
        let cli = Cli::try_parse_from(["tradedesk", "whoami"]).unwrap();
        assert!(cli.command.needs_restore());
    }

    #[tokio::test]
    async fn test_run_logout_with_unreachable_backend_clears_token() {
        let suffix: u64 = rand::rng().random();
        let dir = std::env::temp_dir().join(format!("tradedesk-cli-{suffix:016x}"));
        let token_path = dir.join("session.json");
        FileTokenStore::new(&token_path).save("persisted").unwrap();

        let cli = Cli::try_parse_from([
            "tradedesk",
            "--api-host",
            "http://127.0.0.1:9",
            "--timeout",
            "1",
            "--token-path",
            token_path.to_str().unwrap(),
            "logout",
        ])
        .unwrap();

        run(cli).await.unwrap();

        assert!(!token_path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parse_guard_unknown_role_is_rejected() {
        assert!(Cli::try_parse_from(["tradedesk", "guard", "--roles", "pirate"]).is_err());
    }
}
