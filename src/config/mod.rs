//! Process configuration resolution.

pub const DEFAULT_PORT: u16 = 8000;

/// Resolve the listen port: CLI flag, then `PORT` env var, then default.
/// An unparseable `PORT` value is ignored with a warning.
pub fn resolve_port(explicit: Option<u16>) -> u16 {
    if let Some(port) = explicit {
        return port;
    }

    if let Ok(raw) = std::env::var("PORT") {
        match raw.parse() {
            Ok(port) => return port,
            Err(_) => {
                tracing::warn!("Ignoring unparseable PORT value: {raw:?}");
            }
        }
    }

    DEFAULT_PORT
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var cases are not exercised here: cargo runs tests in
    // parallel and process-wide env mutation races across them.

    #[test]
    fn explicit_port_wins() {
        assert_eq!(resolve_port(Some(9100)), 9100);
    }
}
