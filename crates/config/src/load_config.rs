// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::FhevmConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use path_clean::clean;
use std::env;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_CONFIG_NAME: &str = "fhevm.config.yaml";
pub const ENV_PREFIX: &str = "FHEVM_";

pub type FindInParent = fn(&PathBuf, &str) -> Option<PathBuf>;

pub fn find_in_parent(path: &PathBuf, filename: &str) -> Option<PathBuf> {
    let mut current = PathBuf::from(path);

    loop {
        let file_path = current.join(filename);
        if file_path.exists() {
            return Some(file_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

pub fn resolve_config_path<P: Into<PathBuf>>(
    find_in_parent: FindInParent,
    cwd: P,
    default_config_dir: P,
    default_filename: &str,
    cli_file: Option<P>,
) -> PathBuf {
    let cli_file: Option<PathBuf> = cli_file.map(Into::into);
    let default_config_dir = default_config_dir.into();
    let cwd = cwd.into();

    if let Some(cli_file) = cli_file {
        if cli_file.is_absolute() {
            return cli_file;
        }
        return clean(cwd.join(cli_file));
    }

    if let Some(found) = find_in_parent(&cwd, default_filename) {
        return found;
    }

    clean(default_config_dir.join(default_filename))
}

pub struct OsDirs;

impl OsDirs {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("fhevm")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join("fhevm")
    }
}

/// Load the configuration.
///
/// An explicitly passed file must exist. Otherwise the nearest `fhevm.config.yaml` above the
/// cwd or in the OS config dir is used when present and defaults apply when it is not.
/// `FHEVM_` prefixed environment variables override file values; nested keys use `__`
/// (eg. `FHEVM_SIGNATURE__DURATION_DAYS=7`).
pub fn load_config(config_file: Option<String>) -> Result<FhevmConfig> {
    let explicit = config_file.is_some();
    let path = resolve_config_path(
        find_in_parent,
        env::current_dir()?,
        OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        config_file.map(PathBuf::from),
    );

    let mut figment = Figment::from(Serialized::defaults(FhevmConfig::default()));

    if path.exists() {
        info!("Loading configuration from {:?}", path);
        let yaml = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read configuration file {:?}", path))?;
        figment = figment.merge(Yaml::string(&yaml));
    } else if explicit {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Configuration file {:?} not found", path),
        )
        .into());
    }

    let config: FhevmConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use figment::Jail;

    #[test]
    fn test_resolve_cli() -> Result<()> {
        fn not_found(_: &PathBuf, _: &str) -> Option<PathBuf> {
            None
        }
        fn found(_: &PathBuf, _: &str) -> Option<PathBuf> {
            Some(PathBuf::from("/foo/fhevm.config.yaml"))
        }
        let path = resolve_config_path(
            not_found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(path, PathBuf::from("/my/config/fhevm.config.yaml"));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            DEFAULT_CONFIG_NAME,
            Some(PathBuf::from("../conf.yaml")),
        );
        assert_eq!(path, PathBuf::from("/foo/conf.yaml"));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(path, PathBuf::from("/foo/fhevm.config.yaml"));
        Ok(())
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config(Some("/nope/fhevm.config.yaml".to_string())) else {
            bail!("error expected");
        };
        let Some(e) = err.downcast_ref::<std::io::Error>() else {
            bail!("io error expected");
        };
        assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_NAME,
                r#"
rpc_url: "http://localhost:8545"
chain_id: 31337
signature:
  duration_days: 30
"#,
            )?;
            jail.set_env("FHEVM_SIGNATURE__EXPIRY_MARGIN_SECS", "60");
            jail.set_env("FHEVM_RESOLVE_TIMEOUT_MS", "2500");

            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:8545"));
            assert_eq!(config.chain_id, Some(31337));
            assert_eq!(config.signature.duration_days, 30);
            assert_eq!(config.signature.expiry_margin_secs, 60);
            assert_eq!(config.resolve_timeout_ms, 2500);
            assert!(config.mock_chains.contains_key("31337"));
            Ok(())
        });
    }
}
