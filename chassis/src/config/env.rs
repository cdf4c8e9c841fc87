use std::path::Path;

/// Name of the environment variable carrying the deployment label.
pub const DEPLOYMENT_VAR: &str = "DEPLOYMENT";

/// Fallback deployment label when the environment does not supply one.
pub const DEFAULT_DEPLOYMENT: &str = "default";

/// Read the deployment label from the environment
///
/// Absent or empty `DEPLOYMENT` yields the literal `"default"`, so the
/// returned label is never empty.
pub fn deployment() -> String {
    match std::env::var(DEPLOYMENT_VAR) {
        Ok(value) if !value.is_empty() => value,
        _ => DEFAULT_DEPLOYMENT.to_string(),
    }
}

/// Load environment variables from .env files with proper precedence
///
/// Files are keyed by the deployment label. Precedence (later overrides
/// earlier):
/// 1. .env (base defaults)
/// 2. .env.local (local overrides, not committed)
/// 3. .env.{deployment}
/// 4. .env.{deployment}.local
/// 5. Actual system environment variables (highest priority)
///
/// Returns the deployment label the files were keyed on.
pub fn load_dotenv(project_root: &Path) -> String {
    let deployment = deployment();

    // Load in REVERSE order of precedence because dotenvy doesn't overwrite
    // existing vars, so the most specific file wins.
    let _ = dotenvy::from_path(project_root.join(format!(".env.{}.local", deployment)));
    let _ = dotenvy::from_path(project_root.join(format!(".env.{}", deployment)));
    let _ = dotenvy::from_path(project_root.join(".env.local"));
    let _ = dotenvy::from_path(project_root.join(".env"));

    deployment
}

/// Get an environment variable with a default value
///
/// # Example
/// ```
/// use chassis_rs::config::env::env;
///
/// let port: u16 = env("SERVER_PORT", 8080);
/// let host = env("SERVER_HOST", "127.0.0.1".to_string());
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get an optional environment variable
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_deployment_falls_back_to_default() {
        std::env::remove_var(DEPLOYMENT_VAR);
        assert_eq!(deployment(), "default");

        std::env::set_var(DEPLOYMENT_VAR, "");
        assert_eq!(deployment(), "default");
        std::env::remove_var(DEPLOYMENT_VAR);
    }

    #[test]
    #[serial]
    fn test_deployment_reads_env() {
        std::env::set_var(DEPLOYMENT_VAR, "prod");
        assert_eq!(deployment(), "prod");
        std::env::remove_var(DEPLOYMENT_VAR);
    }

    #[test]
    #[serial]
    fn test_env_helper_defaults_and_parses() {
        std::env::remove_var("CHASSIS_TEST_PORT");
        assert_eq!(env("CHASSIS_TEST_PORT", 8080u16), 8080);

        std::env::set_var("CHASSIS_TEST_PORT", "9000");
        assert_eq!(env("CHASSIS_TEST_PORT", 8080u16), 9000);

        std::env::set_var("CHASSIS_TEST_PORT", "not-a-port");
        assert_eq!(env("CHASSIS_TEST_PORT", 8080u16), 8080);
        std::env::remove_var("CHASSIS_TEST_PORT");
    }

    #[test]
    #[serial]
    fn test_env_optional() {
        std::env::remove_var("CHASSIS_TEST_FLAG");
        assert_eq!(env_optional::<bool>("CHASSIS_TEST_FLAG"), None);

        std::env::set_var("CHASSIS_TEST_FLAG", "true");
        assert_eq!(env_optional::<bool>("CHASSIS_TEST_FLAG"), Some(true));
        std::env::remove_var("CHASSIS_TEST_FLAG");
    }
}
