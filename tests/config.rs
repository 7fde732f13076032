// ABOUTME: Integration tests for configuration parsing and discovery.
// ABOUTME: Tests YAML parsing, defaults, validation and NEPH_CONFIG lookup.

use neph::config::*;
use neph::error::Error;
use neph::exit::ExitCode;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
product: ACME
scripts_dir: /opt/acme/scripts
conf_dir: /opt/acme/conf
remote_binary: /usr/local/bin/neph

ssh:
  user: fleet
  port: 2222
  key_path: /home/fleet/.ssh/id_ed25519
  connect_timeout: 10s
  command_timeout: 2m

keyscan:
  tool: /usr/bin/ssh-keyscan
  key_type: ed25519
  package: openssh
  install_command: [apt-get, install, -y]
  timeout: 5s

hosts:
  nk024: 165.227.3.8
  nk025: 165.227.11.3
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.product, "ACME");
        assert_eq!(config.scripts_dir, PathBuf::from("/opt/acme/scripts"));
        assert_eq!(config.remote_binary, "/usr/local/bin/neph");
        assert_eq!(config.ssh.user, "fleet");
        assert_eq!(config.ssh.port, 2222);
        assert_eq!(config.ssh.command_timeout, Duration::from_secs(120));
        assert_eq!(config.keyscan.install_command, ["apt-get", "install", "-y"]);
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.hosts["nk025"], "165.227.11.3");
    }

    #[test]
    fn converts_into_component_settings() {
        let yaml = r#"
ssh:
  user: fleet
  connect_timeout: 10s
keyscan:
  key_type: ed25519
  timeout: 5s
"#;
        let config = Config::from_yaml(yaml).unwrap();

        let session = config.session_config();
        assert_eq!(session.user, "fleet");
        assert_eq!(session.connect_timeout, Duration::from_secs(10));
        assert_eq!(session.command_timeout, Duration::from_secs(300));

        let keyscan = config.keyscan_config();
        assert_eq!(keyscan.key_type, "ed25519");
        assert_eq!(keyscan.timeout, Duration::from_secs(5));
        assert_eq!(keyscan.package, "openssh-clients");

        let markers = config.block_store().markers().clone();
        assert_eq!(markers.begin(), "#-----BEGIN NEPH-----");
    }
}

mod validation {
    use super::*;

    #[test]
    fn rejects_zero_port() {
        let err = Config::from_yaml("ssh:\n  port: 0\n").unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::ConfigInvalid);
    }

    #[test]
    fn rejects_empty_host_address() {
        let err = Config::from_yaml("hosts:\n  nk024: \"\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_bad_duration() {
        let err = Config::from_yaml("ssh:\n  connect_timeout: soon\n").unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::ConfigInvalid);
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = Config::from_yaml("hosts: [unclosed\n").unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::ConfigInvalid);
    }
}

mod discovery {
    use super::*;

    fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("neph.yml");
        fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn explicit_path_wins_over_environment() {
        let dir = TempDir::new().unwrap();
        let explicit = write_config(&dir, "product: EXPLICIT\n");
        let other = dir.path().join("other.yml");
        fs::write(&other, "product: ENV\n").unwrap();

        temp_env::with_var(CONFIG_ENV_VAR, Some(&other), || {
            let config = Config::discover(Some(explicit.as_path())).unwrap();
            assert_eq!(config.product, "EXPLICIT");
        });
    }

    #[test]
    fn environment_variable_is_used() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "product: FROMENV\n");

        temp_env::with_var(CONFIG_ENV_VAR, Some(&path), || {
            let config = Config::discover(None).unwrap();
            assert_eq!(config.product, "FROMENV");
        });
    }

    #[test]
    fn missing_explicit_file_is_config_missing() {
        let dir = TempDir::new().unwrap();
        let err = Config::discover(Some(dir.path().join("absent.yml").as_path())).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
        assert_eq!(err.exit_code().code(), 7);
    }

    #[test]
    fn missing_environment_file_is_config_missing() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent.yml");

        temp_env::with_var(CONFIG_ENV_VAR, Some(&absent), || {
            let err = Config::discover(None).unwrap_err();
            assert_eq!(err.exit_code(), ExitCode::ConfigMissing);
        });
    }

    #[test]
    fn default_location_falls_back_to_defaults() {
        // Only meaningful where the default file is not installed.
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return;
        }
        temp_env::with_var_unset(CONFIG_ENV_VAR, || {
            let config = Config::discover(None).unwrap();
            assert_eq!(config.product, "NEPH");
            assert_eq!(config.scripts_dir, PathBuf::from("/var/neph/scripts"));
        });
    }
}
