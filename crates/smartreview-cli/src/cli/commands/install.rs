//! GitHub App installation commands.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use smartreview_core::api::BackendClient;
use smartreview_core::redirect;
use smartreview_core::session::SessionStore;

/// Starts the App installation flow. Installing requires a signed-in user;
/// unauthenticated attempts are routed to login instead.
pub async fn start(backend: &BackendClient, session: &mut SessionStore) -> Result<()> {
    if session.bootstrap(backend).await.is_none() {
        anyhow::bail!("Please sign in first: run `smartreview login`");
    }

    let install_url = backend.install_url();
    println!("Continue the installation on GitHub:");
    println!("  {install_url}");
    println!();

    if std::env::var("SMARTREVIEW_NO_BROWSER").is_err() {
        let _ = open::that(&install_url);
    }

    print!("Paste the redirect URL when you're back (or press Enter to skip): ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let url = url::Url::parse(trimmed).context("That doesn't look like a URL")?;
    let (result, _cleaned) = redirect::consume(&url, session)?;
    match result.and_then(|r| r.install) {
        Some(ret) if ret.installed => {
            println!(
                "✓ SmartReview installed successfully for {} repository(ies).",
                ret.repo_count
            );
            Ok(())
        }
        Some(ret) => anyhow::bail!(
            "Installation failed: {}",
            ret.error.unwrap_or_else(|| "Unknown error".to_string())
        ),
        None => {
            println!("That URL carries no installation result.");
            Ok(())
        }
    }
}

/// Lists the user's App installations.
pub async fn list(backend: &BackendClient, session: &mut SessionStore) -> Result<()> {
    if session.bootstrap(backend).await.is_none() {
        anyhow::bail!("Please sign in first: run `smartreview login`");
    }

    let installations = backend.fetch_installations(session.token()).await?;
    if installations.is_empty() {
        println!("No installations yet. Run `smartreview install` to add one.");
        return Ok(());
    }

    for inst in installations {
        println!(
            "Installed on {}'s repositories ({})",
            inst.account.login, inst.repository_selection
        );
        for repo in &inst.repos {
            let visibility = if repo.private { " (private)" } else { "" };
            println!("    {}{}", repo.full_name, visibility);
        }
    }
    Ok(())
}
