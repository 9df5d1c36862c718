//! API key lifecycle commands.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use smartreview_core::api::BackendClient;
use smartreview_core::credential::{CredentialController, KeyStatus};
use smartreview_core::notice;
use smartreview_core::session::SessionStore;

use super::drain_notices;

async fn ensure_signed_in(backend: &BackendClient, session: &mut SessionStore) -> Result<()> {
    if session.bootstrap(backend).await.is_none() {
        anyhow::bail!("Please sign in first: run `smartreview login`");
    }
    Ok(())
}

pub async fn status(backend: &BackendClient, session: &mut SessionStore) -> Result<()> {
    ensure_signed_in(backend, session).await?;

    let (tx, mut rx) = notice::channel();
    let mut ctrl = CredentialController::new(tx);
    ctrl.check_status(backend, session.token()).await;
    drain_notices(&mut rx);

    if ctrl.status() == KeyStatus::Present {
        println!("An API key is configured.");
    } else {
        println!("No API key configured. Run `smartreview key set` to add one.");
    }
    Ok(())
}

pub async fn set(
    backend: &BackendClient,
    session: &mut SessionStore,
    key: Option<String>,
) -> Result<()> {
    ensure_signed_in(backend, session).await?;

    let raw = match key {
        Some(key) => key,
        None => prompt_for_key()?,
    };

    let (tx, mut rx) = notice::channel();
    let mut ctrl = CredentialController::new(tx).with_on_complete(|| {
        println!("You can now install SmartReview on your repositories: `smartreview install`");
    });

    let saved = ctrl.save(backend, session.token(), raw).await;
    drain_notices(&mut rx);
    if !saved {
        anyhow::bail!("API key was not saved");
    }
    Ok(())
}

pub async fn delete(
    backend: &BackendClient,
    session: &mut SessionStore,
    yes: bool,
) -> Result<()> {
    ensure_signed_in(backend, session).await?;

    let (tx, mut rx) = notice::channel();
    let mut ctrl = CredentialController::new(tx);
    ctrl.check_status(backend, session.token()).await;
    if ctrl.status() == KeyStatus::Unset {
        println!("No API key configured.");
        return Ok(());
    }

    ctrl.request_delete();
    if !yes {
        print!("Delete the stored API key? You won't get reviews until you set a new one. [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;
        if !response.trim().eq_ignore_ascii_case("y") {
            ctrl.cancel_delete();
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    let deleted = ctrl.confirm_delete(backend, session.token()).await;
    drain_notices(&mut rx);
    if !deleted {
        anyhow::bail!("API key was not deleted");
    }
    Ok(())
}

fn prompt_for_key() -> Result<String> {
    print!("Groq API key (gsk_...): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input)
}
