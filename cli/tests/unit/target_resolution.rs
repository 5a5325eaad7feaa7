//! Building a `Target` from command-line flags.

use std::collections::HashMap;
use std::path::PathBuf;

use shaddox_cli::commands::{TargetArgs, default_identity, resolve_target};
use shaddox_cli::domain::{ShaddoxConfig, SshAuth, Target, TargetError};

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn remote(target: Target) -> shaddox_cli::domain::RemoteTarget {
    match target {
        Target::Remote(r) => r,
        Target::Local => panic!("expected a remote target"),
    }
}

#[test]
fn test_no_host_means_local() {
    let target = resolve_target(
        &TargetArgs::default(),
        &ShaddoxConfig::default(),
        env_of(&[]),
        None,
    )
    .expect("local");
    assert_eq!(target, Target::Local);
}

#[test]
fn test_address_user_and_port_win() {
    let args = TargetArgs {
        host: Some("deploy@db1:2222".to_string()),
        user: Some("ignored".to_string()),
        identity: Some(PathBuf::from("/keys/id")),
        ..TargetArgs::default()
    };
    let r = remote(
        resolve_target(&args, &ShaddoxConfig::default(), env_of(&[("USER", "me")]), None)
            .expect("remote"),
    );
    assert_eq!(r.user, "deploy");
    assert_eq!(r.host, "db1");
    assert_eq!(r.port, 2222);
    assert_eq!(
        r.auth,
        SshAuth::Key {
            path: PathBuf::from("/keys/id"),
            passphrase: None
        }
    );
}

#[test]
fn test_defaults_come_from_flags_env_and_config() {
    let mut config = ShaddoxConfig::default();
    config.ssh.port = 2200;
    let args = TargetArgs {
        host: Some("db1".to_string()),
        identity: Some(PathBuf::from("/keys/id")),
        passphrase_env: Some("KEY_PASS".to_string()),
        ..TargetArgs::default()
    };
    let r = remote(
        resolve_target(
            &args,
            &config,
            env_of(&[("USER", "me"), ("KEY_PASS", "s3cret")]),
            None,
        )
        .expect("remote"),
    );
    assert_eq!(r.user, "me");
    assert_eq!(r.port, 2200);
    assert_eq!(
        r.auth,
        SshAuth::Key {
            path: PathBuf::from("/keys/id"),
            passphrase: Some("s3cret".to_string())
        }
    );
}

#[test]
fn test_password_env_is_read_from_environment() {
    let args = TargetArgs {
        host: Some("root@db1".to_string()),
        password_env: Some("DB1_PASSWORD".to_string()),
        ..TargetArgs::default()
    };
    let r = remote(
        resolve_target(
            &args,
            &ShaddoxConfig::default(),
            env_of(&[("DB1_PASSWORD", "hunter2")]),
            None,
        )
        .expect("remote"),
    );
    assert_eq!(r.auth, SshAuth::Password("hunter2".to_string()));
}

#[test]
fn test_unset_password_env_is_an_error() {
    let args = TargetArgs {
        host: Some("root@db1".to_string()),
        password_env: Some("DB1_PASSWORD".to_string()),
        ..TargetArgs::default()
    };
    let err = resolve_target(&args, &ShaddoxConfig::default(), env_of(&[]), None).unwrap_err();
    assert!(err.to_string().contains("DB1_PASSWORD"), "got: {err}");
}

#[test]
fn test_missing_user_is_an_error() {
    let args = TargetArgs {
        host: Some("db1".to_string()),
        identity: Some(PathBuf::from("/keys/id")),
        ..TargetArgs::default()
    };
    let err = resolve_target(&args, &ShaddoxConfig::default(), env_of(&[]), None).unwrap_err();
    assert!(err.to_string().contains("--user"), "got: {err}");
}

#[test]
fn test_bad_address_is_invalid_address() {
    let args = TargetArgs {
        host: Some("db1:notaport".to_string()),
        ..TargetArgs::default()
    };
    let err = resolve_target(&args, &ShaddoxConfig::default(), env_of(&[]), None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TargetError>(),
        Some(TargetError::InvalidAddress(_))
    ));
}

#[test]
fn test_default_identity_prefers_ed25519() {
    let home = tempfile::tempdir().expect("tempdir");
    let ssh = home.path().join(".ssh");
    std::fs::create_dir(&ssh).expect("mkdir");
    std::fs::write(ssh.join("id_rsa"), "rsa").expect("write");
    assert_eq!(default_identity(Some(home.path())), Some(ssh.join("id_rsa")));
    std::fs::write(ssh.join("id_ed25519"), "ed").expect("write");
    assert_eq!(
        default_identity(Some(home.path())),
        Some(ssh.join("id_ed25519"))
    );
}

#[test]
fn test_no_identity_found_is_an_error() {
    let home = tempfile::tempdir().expect("tempdir");
    let args = TargetArgs {
        host: Some("me@db1".to_string()),
        ..TargetArgs::default()
    };
    let err = resolve_target(
        &args,
        &ShaddoxConfig::default(),
        env_of(&[]),
        Some(home.path()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("--identity"), "got: {err}");
}

#[test]
fn test_tmpdir_flag_overrides_config_and_is_validated() {
    let config = ShaddoxConfig::default();
    let args = TargetArgs::default();
    assert_eq!(args.tmpdir(&config).expect("default"), "/tmp/shaddox");

    let args = TargetArgs {
        tmpdir: Some("/var/tmp/x".to_string()),
        ..TargetArgs::default()
    };
    assert_eq!(args.tmpdir(&config).expect("flag"), "/var/tmp/x");

    let args = TargetArgs {
        tmpdir: Some("relative".to_string()),
        ..TargetArgs::default()
    };
    assert!(args.tmpdir(&config).is_err());
}
