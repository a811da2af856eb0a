//! Connection settings resolution.
//!
//! Precedence (first hit wins):
//!   CLI flag > environment (LIFX_URL, LIFX_API_TOKEN, LIFX_INSECURE, LIFX_PROXY)
//!   > invocation params > --config file (JSON / YAML) > defaults
//!
//! Params and config files use the host's parameter names:
//!   url (alias base_url), api_token, insecure, proxy

use anyhow::{Context, Result};

use crate::cmd::shared::{ArgMap, bool_arg};
use crate::lifx::{Config, DEFAULT_BASE_URL};

/// Connection flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
    /// `--insecure` given
    pub insecure: bool,
    /// `--proxy` given
    pub proxy: bool,
    /// `--config PATH`
    pub config_path: Option<String>,
}

/// Resolve against the process environment.
pub fn resolve(overrides: &Overrides, params: &ArgMap) -> Result<Config> {
    resolve_with(overrides, params, |key| std::env::var(key).ok())
}

/// Resolve with an explicit environment lookup.
pub fn resolve_with(
    overrides: &Overrides,
    params: &ArgMap,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut layered = params.clone();
    if let Some(path) = &overrides.config_path {
        let file = ArgMap::load_file(path)
            .with_context(|| format!("failed to load config file: {path}"))?;
        layered.merge_missing(file);
    }

    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let base_url = overrides
        .url
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env("LIFX_URL"))
        .or_else(|| layered.get("url").map(str::to_string))
        .or_else(|| layered.get("base_url").map(str::to_string))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let api_token = overrides
        .token
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env("LIFX_API_TOKEN"))
        .or_else(|| layered.get("api_token").map(str::to_string))
        .unwrap_or_default();

    let insecure = overrides.insecure
        || bool_arg(env("LIFX_INSECURE").as_deref())
            .or_else(|| layered.flag("insecure"))
            .unwrap_or(false);

    let proxy = overrides.proxy
        || bool_arg(env("LIFX_PROXY").as_deref())
            .or_else(|| layered.flag("proxy"))
            .unwrap_or(false);

    if api_token.trim().is_empty() {
        tracing::warn!("no LIFX API token configured; the API will reject requests");
    }
    if insecure {
        tracing::warn!("TLS certificate verification disabled");
    }

    Ok(Config {
        base_url,
        api_token,
        insecure,
        proxy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_given() {
        let cfg = resolve_with(&Overrides::default(), &ArgMap::new(), env_of(&[])).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn precedence_cli_env_params() {
        let params = ArgMap::new()
            .with("url", "https://params.example/v1")
            .with("api_token", "from-params")
            .with("insecure", "true");
        let env = env_of(&[("LIFX_API_TOKEN", "from-env"), ("LIFX_INSECURE", "no")]);
        let overrides = Overrides {
            url: Some("https://cli.example/v1".into()),
            ..Overrides::default()
        };
        let cfg = resolve_with(&overrides, &params, env).unwrap();
        assert_eq!(cfg.base_url, "https://cli.example/v1");
        assert_eq!(cfg.api_token, "from-env");
        assert!(!cfg.insecure, "env 'no' beats params 'true'");
        assert!(!cfg.proxy);
    }

    #[test]
    fn params_used_when_env_blank() {
        let params = ArgMap::new()
            .with("base_url", "https://alias.example/v1")
            .with("proxy", "yes");
        let env = env_of(&[("LIFX_URL", "  ")]);
        let cfg = resolve_with(&Overrides::default(), &params, env).unwrap();
        assert_eq!(cfg.base_url, "https://alias.example/v1");
        assert!(cfg.proxy);
    }

    #[test]
    fn blank_cli_token_falls_through() {
        let overrides = Overrides {
            token: Some("   ".into()),
            ..Overrides::default()
        };
        let env = env_of(&[("LIFX_API_TOKEN", "from-env")]);
        let cfg = resolve_with(&overrides, &ArgMap::new(), env).unwrap();
        assert_eq!(cfg.api_token, "from-env");
    }

    #[test]
    fn cli_flags_force_true() {
        let overrides = Overrides {
            insecure: true,
            proxy: true,
            ..Overrides::default()
        };
        let env = env_of(&[("LIFX_INSECURE", "false")]);
        let cfg = resolve_with(&overrides, &ArgMap::new(), env).unwrap();
        assert!(cfg.insecure);
        assert!(cfg.proxy);
    }

    #[test]
    fn config_file_sits_under_params() {
        let path = std::env::temp_dir().join("lifx_adapter_config_test.yml");
        std::fs::write(
            &path,
            "url: https://file.example/v1\napi_token: file-token\ninsecure: true\n",
        )
        .unwrap();
        let overrides = Overrides {
            config_path: Some(path.to_string_lossy().into_owned()),
            ..Overrides::default()
        };
        let params = ArgMap::new().with("api_token", "param-token");
        let cfg = resolve_with(&overrides, &params, env_of(&[])).unwrap();
        assert_eq!(cfg.base_url, "https://file.example/v1");
        assert_eq!(cfg.api_token, "param-token");
        assert!(cfg.insecure);
    }

    #[test]
    fn missing_config_file_errors() {
        let overrides = Overrides {
            config_path: Some("/definitely/not/here.yaml".into()),
            ..Overrides::default()
        };
        let err = resolve_with(&overrides, &ArgMap::new(), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("failed to load config file"));
    }
}
