// ABOUTME: Integration tests for configuration parsing, discovery and overrides.
// ABOUTME: Tests YAML parsing, file discovery, environment overrides and SourceConfig resolution.

use berth::config::*;
use berth::error::Error;
use berth::types::Source;
use std::fs;
use std::time::Duration;

const ENV_VARS: [&str; 5] = [
    "BERTH_SOURCE",
    "BERTH_BRIDGE_PROFILE",
    "WSL_DISTRO",
    "BERTH_ENGINE",
    "DOCKER_HOST",
];

/// Run `f` with every override variable unset except `set`.
fn with_env<F: FnOnce()>(set: &[(&str, &str)], f: F) {
    let vars: Vec<(&str, Option<&str>)> = ENV_VARS
        .iter()
        .map(|name| {
            let value = set.iter().find(|(k, _)| k == name).map(|(_, v)| *v);
            (*name, value)
        })
        .collect();
    temp_env::with_vars(vars, f);
}

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = Config::from_yaml("source: local\n").unwrap();
        assert_eq!(config.source, Source::Local);
        assert_eq!(config.bridge.launcher, "wsl.exe");
        assert_eq!(config.bridge.profile, "Ubuntu");
        assert_eq!(config.bridge.mount_prefix, "/mnt");
        assert_eq!(config.engine.binary, "docker");
        assert_eq!(config.enrichment_concurrency, 8);
    }

    #[test]
    fn parse_bridged_with_profile() {
        let config = Config::from_yaml("source: bridged:Debian\n").unwrap();
        assert_eq!(config.source, Source::bridged_profile("Debian"));
        assert_eq!(config.to_source_config().profile(), "Debian");
    }

    #[test]
    fn humantime_durations() {
        let yaml = r#"
timeouts:
  exec: 2m 30s
  info: 500ms
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.timeouts.exec, Duration::from_secs(150));
        assert_eq!(config.timeouts.info, Duration::from_millis(500));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = Config::from_yaml("source: mainframe\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
        assert!(err.to_string().contains("mainframe"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::from_yaml("engine:\n  runtime: podman\n").is_err());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = Config::from_yaml("timeouts:\n  exec: 0s\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("berth.yml"), "engine:\n  binary: podman\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.engine.binary, "podman");
    }

    #[test]
    fn finds_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".berth")).unwrap();
        fs::write(dir.path().join(".berth/config.yml"), "source: wsl2\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.source, Source::bridged());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));

        let config = Config::discover_or_default(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn init_writes_loadable_template() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("bridged"), Some("Alpine"), false).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.source, Source::bridged());
        assert_eq!(config.bridge.profile, "Alpine");
        assert_eq!(config.timeouts.exec, Duration::from_secs(30));

        let err = init_config(dir.path(), None, None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        init_config(dir.path(), None, None, true).unwrap();
    }
}

mod overrides {
    use super::*;

    #[test]
    fn no_variables_leaves_config_alone() {
        with_env(&[], || {
            let config = Config::default().with_env_overrides().unwrap();
            assert_eq!(config, Config::default());
        });
    }

    #[test]
    fn source_and_engine_from_environment() {
        with_env(
            &[
                ("BERTH_SOURCE", "wsl2"),
                ("BERTH_ENGINE", "podman"),
                ("DOCKER_HOST", "tcp://127.0.0.1:2375"),
            ],
            || {
                let config = Config::default().with_env_overrides().unwrap();
                assert_eq!(config.source, Source::bridged());
                assert_eq!(config.engine.binary, "podman");
                assert_eq!(config.engine.socket.as_deref(), Some("tcp://127.0.0.1:2375"));
            },
        );
    }

    #[test]
    fn wsl_distro_sets_profile() {
        with_env(&[("WSL_DISTRO", "Ubuntu-22.04")], || {
            let config = Config::from_yaml("source: bridged\n")
                .unwrap()
                .with_env_overrides()
                .unwrap();
            assert_eq!(config.to_source_config().profile(), "Ubuntu-22.04");
        });
    }

    #[test]
    fn explicit_profile_wins() {
        with_env(
            &[("WSL_DISTRO", "Ubuntu-22.04"), ("BERTH_BRIDGE_PROFILE", "Alpine")],
            || {
                let config = Config::default().with_env_overrides().unwrap();
                assert_eq!(config.bridge.profile, "Alpine");
            },
        );
    }

    #[test]
    fn empty_values_are_ignored() {
        with_env(&[("BERTH_ENGINE", "  ")], || {
            let config = Config::default().with_env_overrides().unwrap();
            assert_eq!(config.engine.binary, "docker");
        });
    }

    #[test]
    fn bad_source_variable_is_invalid() {
        with_env(&[("BERTH_SOURCE", "cloud")], || {
            let err = Config::default().with_env_overrides().unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)));
        });
    }
}

mod resolution {
    use super::*;

    #[test]
    fn source_config_carries_settings() {
        let yaml = r#"
source: bridged
bridge:
  launcher: C:\Windows\System32\wsl.exe
  profile: Debian
  mount_prefix: /media
engine:
  binary: docker
timeouts:
  exec: 45s
enrichment_concurrency: 3
"#;
        let resolved = Config::from_yaml(yaml).unwrap().to_source_config();

        assert_eq!(resolved.profile(), "Debian");
        assert_eq!(resolved.timeouts.exec, Duration::from_secs(45));
        assert_eq!(resolved.timeouts.info, Duration::from_secs(10));
        assert_eq!(resolved.concurrency(), 3);

        let bridge = resolved.bridge_config();
        assert_eq!(bridge.launcher.as_deref(), Some(r"C:\Windows\System32\wsl.exe"));
        assert_eq!(bridge.profile, "Debian");
        assert_eq!(bridge.mount_prefix, "/media");
    }

    #[test]
    fn local_source_has_no_launcher() {
        let resolved = Config::default().to_source_config();
        assert!(resolved.bridge_config().launcher.is_none());
    }
}
