// Command handlers

use crate::cli::{Args, Command};
use anyhow::{Context, Result};
use colored::Colorize;
use nexus_client::{CredentialManager, HttpMethod, ProcessEnv, SetupOptions, TerminalPrompter};
use nexus_config::StoreLocation;
use nexus_core::user_paths::{default_config_path, expand_path};
use nexus_core::{nexus_error, nexus_println};
use nexus_messages::{msg, MESSAGES};
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use tracing::debug;

/// Main command dispatcher
pub fn execute_command(args: Args) -> Result<()> {
    let location = store_location(&args)?;
    let options = SetupOptions {
        clear: args.clear,
        force_password: args.password,
        encrypt: args.encrypt,
    };
    let mut manager =
        CredentialManager::new(location, options, TerminalPrompter::new(), Box::new(ProcessEnv))?;

    match &args.command {
        Command::Setup => {
            debug!("Handling setup command");
            handle_setup(&mut manager)
        }
        Command::Push { gem } => {
            debug!(gem = %gem.display(), "Handling push command");
            handle_push(&mut manager, gem, args.verbose)
        }
        Command::Request { method, path } => {
            debug!(%method, %path, "Handling request command");
            handle_request(&mut manager, method, path, args.verbose)
        }
        Command::Decrypt => {
            debug!("Handling decrypt command");
            manager.disable_encryption()?;
            Ok(())
        }
    }
}

fn store_location(args: &Args) -> Result<StoreLocation> {
    let config_path = match &args.config {
        Some(path) => expand_path(path)?,
        None => default_config_path()?,
    };
    let mut location = StoreLocation::new(config_path);
    if let Some(repo) = &args.repo {
        location = location.with_scope(repo.as_str());
    }
    if let Some(secrets) = &args.secrets {
        location = location.with_secrets(expand_path(secrets)?);
    }
    Ok(location)
}

fn handle_setup(manager: &mut CredentialManager<TerminalPrompter>) -> Result<()> {
    manager.setup()?;
    if let Some(url) = manager.url()? {
        nexus_println!("{}", msg!(MESSAGES.common.setup_complete, url = url));
    }
    Ok(())
}

fn handle_push(
    manager: &mut CredentialManager<TerminalPrompter>,
    gem: &Path,
    verbosity: u8,
) -> Result<()> {
    let file_name = gem
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("not a gem file: {}", gem.display()))?
        .to_string();
    let body = std::fs::read(gem).with_context(|| format!("failed to read {}", gem.display()))?;

    manager.setup()?;
    let builder = manager.request_builder(verbosity)?;
    let path = format!("gems/{}", file_name);
    nexus_println!(
        "{}",
        msg!(
            MESSAGES.common.push_uploading,
            file = file_name.as_str(),
            url = builder.target_url(&path)
        )
    );

    let response = builder.make_request_with(HttpMethod::Post, &path, |req| {
        builder
            .authorize(req)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
    })?;
    print_response(response)
}

fn handle_request(
    manager: &mut CredentialManager<TerminalPrompter>,
    method: &str,
    path: &str,
    verbosity: u8,
) -> Result<()> {
    let method: HttpMethod = method.parse()?;
    manager.setup()?;
    let builder = manager.request_builder(verbosity)?;
    let response = builder.make_request_with(method, path, |req| builder.authorize(req))?;
    print_response(response)
}

fn print_response(response: Response) -> Result<()> {
    let status = response.status();
    let text = response.text().context("failed to read response body")?;

    let line = msg!(MESSAGES.common.response_status, status = status.to_string());
    if status.is_success() {
        nexus_println!("{}", line.green());
    } else {
        nexus_println!("{}", line.red());
        nexus_error!(
            "{}",
            msg!(
                MESSAGES.common.warning_generic,
                warning = format!("server answered {}", status)
            )
        );
    }
    if !text.is_empty() {
        nexus_println!("{}", text);
    }
    Ok(())
}
