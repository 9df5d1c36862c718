//! Sign-in, sign-out, and identity commands.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use smartreview_core::api::BackendClient;
use smartreview_core::redirect;
use smartreview_core::session::{SessionStore, mask_token};

pub async fn login(backend: &BackendClient, session: &mut SessionStore) -> Result<()> {
    let login_url = backend.login_url();

    println!("To sign in to SmartReview with GitHub:");
    println!();
    println!("  1. A browser window will open (or visit the URL below)");
    println!("  2. Authorize SmartReview with your GitHub account");
    println!("  3. Paste the URL your browser lands on back here");
    println!();
    println!("Sign-in URL:");
    println!("  {login_url}");
    println!();

    // Try to open browser (best effort, skip in tests)
    if std::env::var("SMARTREVIEW_NO_BROWSER").is_err() {
        let _ = open::that(&login_url);
    }

    print!("Paste the redirect URL: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let url = url::Url::parse(input.trim()).context("That doesn't look like a URL")?;
    // The token is durable before the URL would be rewritten; pasting the
    // same URL twice re-applies the same token harmlessly.
    let (result, _cleaned) = redirect::consume(&url, session)?;
    let auth = result
        .and_then(|r| r.auth)
        .ok_or_else(|| anyhow::anyhow!("The URL carries no sign-in result"))?;
    if !auth.succeeded {
        anyhow::bail!("GitHub sign-in failed");
    }

    let Some(user) = session.bootstrap(backend).await else {
        anyhow::bail!("Signed-in identity could not be confirmed");
    };

    println!();
    match session.token() {
        Some(token) => println!(
            "✓ Signed in as {} (token: {})",
            user.display_name(),
            mask_token(token)
        ),
        None => println!("✓ Signed in as {}", user.display_name()),
    }
    Ok(())
}

pub async fn logout(backend: &BackendClient, session: &mut SessionStore) -> Result<()> {
    let had_session = session.token().is_some() || session.snapshot().is_some();
    session.sign_out(backend).await;

    if had_session {
        println!("✓ Signed out");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn whoami(backend: &BackendClient, session: &mut SessionStore) -> Result<()> {
    if let Some(user) = session.bootstrap(backend).await {
        println!("{} ({})", user.display_name(), user.login);
        return Ok(());
    }

    // The snapshot is display-only; make that unmistakable.
    if let Some(snapshot) = session.snapshot() {
        println!("Not signed in (last known identity: {}).", snapshot.login);
    } else {
        println!("Not signed in.");
    }
    Ok(())
}
