//! Generic username/password form login.

use anyhow::{Result, anyhow};
use log::{debug, info};

use crate::browser::BrowsingContext;
use crate::monitor::Monitor;
use crate::utils::same_resource;

/// Username field candidates, most likely first.
pub const USERNAME_SELECTORS: &[&str] = &[
    r#"input[type="text"]"#,
    r#"input[type="email"]"#,
    r#"input[name="user"]"#,
    r#"input[name="username"]"#,
    r#"input[name="acct"]"#,
];

pub const PASSWORD_SELECTORS: &[&str] = &[r#"input[type="password"]"#];

/// Navigate to the monitor URL, fill the first matching credential fields,
/// submit with Enter and return to the monitor URL if the login redirected
/// elsewhere.
///
/// On success the context shows the monitor URL.
pub async fn perform_login(context: &dyn BrowsingContext, monitor: &Monitor) -> Result<()> {
    let (username, password) = monitor
        .credentials()
        .ok_or_else(|| anyhow!("login required but credentials are missing"))?;

    context.goto(&monitor.url).await?;

    let user_selector = fill_first(context, USERNAME_SELECTORS, username)
        .await?
        .ok_or_else(|| anyhow!("no username field found"))?;
    let password_selector = fill_first(context, PASSWORD_SELECTORS, password)
        .await?
        .ok_or_else(|| anyhow!("no password field found"))?;
    debug!(
        target: "webwatcher::session",
        "Filled {user_selector} and {password_selector}, submitting"
    );

    context.submit(password_selector).await?;

    let landed = context.current_url().await?;
    if !same_resource(&landed, &monitor.url) {
        info!(
            target: "webwatcher::session",
            "Login landed on {landed}, returning to {}",
            monitor.url
        );
        context.goto(&monitor.url).await?;
    }
    Ok(())
}

/// Fill the first selector that matches; returns which one did.
async fn fill_first(
    context: &dyn BrowsingContext,
    selectors: &[&'static str],
    value: &str,
) -> Result<Option<&'static str>> {
    for selector in selectors {
        if context.fill(selector, value).await? {
            return Ok(Some(selector));
        }
    }
    Ok(None)
}
