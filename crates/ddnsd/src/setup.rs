//! Interactive setup
//!
//! Prompts for the token, domain, subdomain, TTL and proxied flag, then writes the TOML
//! config file. Existing values are offered as defaults; pressing enter keeps them.
//! Fields the wizard does not ask about are carried over unchanged.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use ddns_core::config::{ConfigLayer, DEFAULT_TTL};

/// Run the wizard on stdin/stdout and save the result to `path`
pub fn run(path: &Path) -> Result<()> {
    let existing = ConfigLayer::from_file(path)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let layer = prompt(&mut stdin.lock(), &mut stdout.lock(), existing)?;

    layer
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// Ask for each setup field, starting from `existing`
pub fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    existing: ConfigLayer,
) -> Result<ConfigLayer> {
    writeln!(output, "Cloudflare DDNS setup")?;

    let api_token = loop {
        let hint = if existing.api_token.is_some() {
            " [keep existing]"
        } else {
            ""
        };
        match ask(input, output, &format!("API token{hint}"))? {
            Some(token) => break Some(token),
            None if existing.api_token.is_some() => break existing.api_token.clone(),
            None => writeln!(output, "An API token is required.")?,
        }
    };

    let domain = ask_with_default(input, output, "Domain (e.g. example.com)", &existing.domain)?;
    let subdomain = ask_with_default(
        input,
        output,
        "Subdomain (blank to update the domain itself)",
        &existing.subdomain,
    )?;

    let current_ttl = existing.ttl.unwrap_or(DEFAULT_TTL);
    let ttl = loop {
        match ask(input, output, &format!("TTL in seconds [{current_ttl}]"))? {
            None => break current_ttl,
            Some(value) => match value.parse::<u32>() {
                Ok(ttl) if ttl >= 60 => break ttl,
                _ => writeln!(output, "TTL must be a number of at least 60.")?,
            },
        }
    };

    let current_proxied = existing.proxied.unwrap_or(false);
    let proxied = loop {
        let default = if current_proxied { "Y/n" } else { "y/N" };
        match ask(input, output, &format!("Proxy through Cloudflare? [{default}]"))? {
            None => break current_proxied,
            Some(answer) => match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => break true,
                "n" | "no" => break false,
                _ => writeln!(output, "Please answer y or n.")?,
            },
        }
    };

    let answers = ConfigLayer {
        api_token,
        domain,
        subdomain,
        ttl: Some(ttl),
        proxied: Some(proxied),
        ..Default::default()
    };
    Ok(answers.or(existing))
}

/// One line of input; `None` when blank
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<Option<String>> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Setup aborted: input closed");
    }
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

fn ask_with_default<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    current: &Option<String>,
) -> Result<Option<String>> {
    let label = match current {
        Some(value) => format!("{label} [{value}]"),
        None => label.to_string(),
    };
    Ok(ask(input, output, &label)?.or_else(|| current.clone()))
}
