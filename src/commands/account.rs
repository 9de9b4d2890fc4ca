use anyhow::Result;
use std::io::Write;

use super::safe;
use crate::app::App;

/// Log in (or sign up; there is no difference). Only the username is kept.
pub async fn login(app: &App, out: &mut impl Write, username: &str, password: &str) -> Result<()> {
    let username = app.db.login(username, password).await?;
    writeln!(out, "Welcome, {}!", safe(&username))?;
    Ok(())
}

pub async fn logout(app: &App, out: &mut impl Write) -> Result<()> {
    if app.db.logout().await? {
        writeln!(out, "Logged out.")?;
    } else {
        writeln!(out, "Not logged in.")?;
    }
    Ok(())
}

pub async fn whoami(app: &App, out: &mut impl Write) -> Result<()> {
    match app.db.current_user().await? {
        Some(user) => writeln!(out, "{}", safe(&user))?,
        None => writeln!(out, "Not logged in.")?,
    }
    Ok(())
}
