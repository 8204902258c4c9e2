//! Argument construction of the process-backed adapters.
//!
//! Each adapter runs against `MockCommandRunner`, so these tests pin the
//! exact `ssh`, `terragrunt` and `git` invocations without spawning them.

use std::time::Duration;

use hoster_cli::application::ports::{
    CommitResolver, RemoteShell, SessionConnector, TargetResolver,
};
use hoster_cli::domain::{KeySource, PrivateKey};
use hoster_cli::infra::git::GitLsRemote;
use hoster_cli::infra::ip_cache::IpCacheFile;
use hoster_cli::infra::ssh::OpenSshConnector;
use hoster_cli::infra::terragrunt::{CachedTargets, TerragruntResolver};

use crate::mocks::{MockCommandRunner, err_output, ok_output};

fn key() -> PrivateKey {
    PrivateKey::new("KEY", KeySource::Env("SSH_PRIVATE_KEY"))
}

fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
    args.windows(2).any(|w| w[0] == flag && w[1] == value)
}

// ── OpenSSH ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_starts_persistent_master() {
    let runner = MockCommandRunner::default();
    let connector = OpenSshConnector::new(runner.clone(), "ubuntu", Duration::from_secs(12));

    let session = connector.connect("203.0.113.7", &key()).await.expect("connects");
    session.close().await.expect("closes");

    let calls = runner.calls();
    let (program, args, _) = &calls[0];
    assert_eq!(program, "ssh");
    assert!(has_pair(args, "-o", "ControlMaster=yes"));
    assert!(has_pair(args, "-o", "ControlPersist=yes"));
    assert!(has_pair(args, "-o", "BatchMode=yes"));
    assert!(has_pair(args, "-o", "ConnectTimeout=12"));
    assert_eq!(&args[args.len() - 2..], ["ubuntu@203.0.113.7", "true"]);
}

#[tokio::test]
async fn test_exec_reuses_control_socket_with_single_command_argument() {
    let runner = MockCommandRunner::default();
    let connector = OpenSshConnector::new(runner.clone(), "ubuntu", Duration::from_secs(5));
    let session = connector.connect("h", &key()).await.expect("connects");

    session
        .exec("/mnt/data/agent/cli list-services  --json")
        .await
        .expect("exec");
    session.close().await.expect("closes");

    let calls = runner.calls();
    let connect_args = &calls[0].1;
    let exec_args = &calls[1].1;
    let control = connect_args
        .iter()
        .find(|a| a.starts_with("ControlPath="))
        .expect("control path");
    assert!(exec_args.contains(control));
    assert!(has_pair(exec_args, "-o", "ControlMaster=no"));
    assert_eq!(
        &exec_args[exec_args.len() - 3..],
        ["ubuntu@h", "--", "/mnt/data/agent/cli list-services  --json"]
    );
}

#[tokio::test]
async fn test_close_is_idempotent_and_rejects_later_exec() {
    let runner = MockCommandRunner::default();
    let connector = OpenSshConnector::new(runner.clone(), "ubuntu", Duration::from_secs(5));
    let session = connector.connect("h", &key()).await.expect("connects");

    session.close().await.expect("first close");
    session.close().await.expect("second close is a no-op");
    assert!(session.exec("true").await.is_err());

    let exits = runner
        .calls()
        .iter()
        .filter(|(_, args, _)| has_pair(args, "-O", "exit"))
        .count();
    assert_eq!(exits, 1);
}

#[tokio::test]
async fn test_failed_master_is_connection_error() {
    let runner = MockCommandRunner::replying(vec![err_output(255, "Permission denied (publickey).")]);
    let connector = OpenSshConnector::new(runner, "ubuntu", Duration::from_secs(5));

    let Err(err) = connector.connect("h", &key()).await else {
        panic!("connect should fail");
    };
    assert!(err.to_string().contains("Permission denied"), "got: {err}");
}

// ── Terragrunt ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_terragrunt_runs_in_region_directory() {
    let root = tempfile::TempDir::new().expect("tempdir");
    let region_dir = root.path().join("terraform/main/regions/us-east-1");
    std::fs::create_dir_all(&region_dir).expect("mkdir");
    let runner = MockCommandRunner::replying(vec![ok_output("\"203.0.113.7\"")]);
    let resolver = TerragruntResolver::new(runner.clone(), root.path());

    let ip = resolver.resolve("us-east-1").await.expect("resolves");

    assert_eq!(ip, "203.0.113.7");
    let (program, args, dir) = &runner.calls()[0];
    assert_eq!(program, "terragrunt");
    assert_eq!(args, &["output", "-raw", "public_ip"]);
    assert_eq!(dir.as_deref(), Some(region_dir.display().to_string().as_str()));
}

#[tokio::test]
async fn test_terragrunt_failure_and_empty_output_are_errors() {
    let root = tempfile::TempDir::new().expect("tempdir");
    std::fs::create_dir_all(root.path().join("terraform/main/regions/eu")).expect("mkdir");

    let failing = MockCommandRunner::replying(vec![err_output(1, "no state")]);
    let err = TerragruntResolver::new(failing, root.path())
        .resolve("eu")
        .await
        .expect_err("non-zero exit");
    assert!(err.to_string().contains("no state"));

    let empty = MockCommandRunner::replying(vec![ok_output("")]);
    assert!(
        TerragruntResolver::new(empty, root.path())
            .resolve("eu")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_unknown_region_directory_is_an_error_without_running_terragrunt() {
    let root = tempfile::TempDir::new().expect("tempdir");
    let runner = MockCommandRunner::default();
    let err = TerragruntResolver::new(runner.clone(), root.path())
        .resolve("nowhere")
        .await
        .expect_err("missing dir");
    assert!(err.to_string().contains("nowhere"));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_cached_targets_prefer_cache_unless_disabled() {
    let root = tempfile::TempDir::new().expect("tempdir");
    std::fs::create_dir_all(root.path().join("terraform/main/regions/us")).expect("mkdir");
    std::fs::write(root.path().join("tmp_cache.json"), r#"{"ips": {"us": "10.0.0.1"}}"#)
        .expect("seed cache");

    let runner = MockCommandRunner::replying(vec![ok_output("10.0.0.2")]);
    let cached = CachedTargets::new(
        TerragruntResolver::new(runner.clone(), root.path()),
        IpCacheFile::in_root(root.path()),
        true,
    );
    assert_eq!(cached.resolve("us").await.expect("cached"), "10.0.0.1");
    assert!(runner.calls().is_empty());

    let fresh = CachedTargets::new(
        TerragruntResolver::new(runner.clone(), root.path()),
        IpCacheFile::in_root(root.path()),
        false,
    );
    assert_eq!(fresh.resolve("us").await.expect("fresh"), "10.0.0.2");
    let cache = IpCacheFile::in_root(root.path()).load().expect("load");
    assert_eq!(cache.get("us"), Some("10.0.0.2"));
}

// ── git ───────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ls_remote_takes_first_token() {
    let sha = "0123456789abcdef0123456789abcdef01234567";
    let runner = MockCommandRunner::replying(vec![ok_output(&format!("{sha}\tHEAD\n"))]);
    let git = GitLsRemote::new(runner.clone());

    assert_eq!(git.head_commit("https://g/blog").await.expect("head"), sha);
    let (program, args, _) = &runner.calls()[0];
    assert_eq!(program, "git");
    assert_eq!(args, &["ls-remote", "https://g/blog", "HEAD"]);
}

#[tokio::test]
async fn test_ls_remote_failure_is_an_error() {
    let runner = MockCommandRunner::replying(vec![err_output(128, "repository not found")]);
    let err = GitLsRemote::new(runner)
        .head_commit("https://g/missing")
        .await
        .expect_err("fails");
    assert!(err.to_string().contains("repository not found"));
}
