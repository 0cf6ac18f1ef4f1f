//! User agent handling for HTTP requests.

/// Identifying user agent sent by default.
pub const USER_AGENT: &str = "Mr Robot";

/// Browser user agents for impersonate mode.
pub const IMPERSONATE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
];

fn random_user_agent() -> &'static str {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as usize)
        .unwrap_or(0);
    IMPERSONATE_USER_AGENTS[nanos % IMPERSONATE_USER_AGENTS.len()]
}

/// Resolve the user agent from its configured value.
///
/// Blank values fall back to the default.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some("impersonate") => random_user_agent().to_string(),
        Some(custom) => custom.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_agent() {
        assert_eq!(resolve_user_agent(None), "Mr Robot");
        assert_eq!(resolve_user_agent(Some("  ")), "Mr Robot");
    }

    #[test]
    fn test_impersonate_agent() {
        let ua = resolve_user_agent(Some("impersonate"));
        assert!(IMPERSONATE_USER_AGENTS.contains(&ua.as_str()));
    }

    #[test]
    fn test_custom_agent() {
        assert_eq!(resolve_user_agent(Some("MyBot/1.0")), "MyBot/1.0");
    }
}
