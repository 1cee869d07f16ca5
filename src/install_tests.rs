//! Unit tests for the INSTALL phase.

use super::{HostArchive, RemoteInstaller, update_apply_command, upgrade_apply_command};
use crate::archive::pack_files;
use crate::error::FerryError;
use crate::report::HostStatus;
use crate::routine::Routine;
use crate::test_utils::{StubExecutor, test_config};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 path");
    (dir, path)
}

/// Build an aggregate bundle holding one tiny archive per member name.
fn bundle_with_members(root: &Utf8Path, members: &[&str]) -> Utf8PathBuf {
    let src = root.join("bundle-src");
    fs::create_dir_all(&src).expect("create src");
    let mut files = Vec::new();
    for name in members {
        let inner = src.join(name);
        // Content just needs to be a readable file; the stub executor
        // never inspects it.
        pack_files(&inner, &[]).expect("pack inner");
        files.push((inner, (*name).to_owned()));
    }
    let bundle = root.join("bundle.tar");
    pack_files(&bundle, &files).expect("pack bundle");
    bundle
}

#[test]
fn each_archive_is_applied_to_the_host_in_its_stem() {
    let (_guard, root) = temp_root();
    let config = test_config(&root, &["host1", "host2"]);
    // Members deliberately out of topology order: targeting must come
    // from the stem, not from position.
    let bundle = bundle_with_members(&root, &["upgrade-host2.tar", "upgrade-host1.tar"]);
    let executor = StubExecutor::default();

    let installer = RemoteInstaller::new(&config, Routine::Upgrade, &executor);
    let summary = installer.run(&bundle).expect("run");

    assert_eq!(summary.outcomes.len(), 2);
    for outcome in &summary.outcomes {
        assert_eq!(outcome.status, HostStatus::Succeeded);
    }
    let calls = executor.calls();
    assert!(calls.iter().any(|c| c.starts_with("transfer_out host2:")
        && c.ends_with("/tmp/upgrade-host2.tar")));
    assert!(calls.iter().any(|c| c.starts_with("transfer_out host1:")
        && c.ends_with("/tmp/upgrade-host1.tar")));
}

#[test]
fn transfer_failure_does_not_abort_remaining_hosts() {
    let (_guard, root) = temp_root();
    let config = test_config(&root, &["host1", "host2"]);
    let bundle = bundle_with_members(&root, &["update-host1.tar", "update-host2.tar"]);
    let mut executor = StubExecutor::default();
    executor.fail_transfer.insert("host1".to_owned());

    let installer = RemoteInstaller::new(&config, Routine::Update, &executor);
    let summary = installer.run(&bundle).expect("run");

    assert_eq!(summary.failed_hosts(), ["host1"]);
    // host2 was still transferred and applied.
    assert!(executor
        .calls()
        .iter()
        .any(|c| c.starts_with("execute host2: sudo sh -c")));
}

#[test]
fn remote_apply_failure_is_recorded_per_host() {
    let (_guard, root) = temp_root();
    let config = test_config(&root, &["host1"]);
    let bundle = bundle_with_members(&root, &["upgrade-host1.tar"]);
    let mut executor = StubExecutor::default();
    executor.fail_execute.insert("host1".to_owned());

    let installer = RemoteInstaller::new(&config, Routine::Upgrade, &executor);
    let summary = installer.run(&bundle).expect("run");

    assert_eq!(summary.failed_hosts(), ["host1"]);
}

#[test]
fn unrecognized_member_is_skipped_not_fatal() {
    let (_guard, root) = temp_root();
    let config = test_config(&root, &["host1"]);
    let bundle = bundle_with_members(&root, &["stray.tar", "update-host1.tar"]);
    let executor = StubExecutor::default();

    let installer = RemoteInstaller::new(&config, Routine::Update, &executor);
    let summary = installer.run(&bundle).expect("run");

    assert_eq!(summary.skipped_hosts(), ["stray.tar"]);
    assert_eq!(summary.outcomes[1].host, "host1");
    assert_eq!(summary.outcomes[1].status, HostStatus::Succeeded);
}

#[test]
fn missing_bundle_is_fatal() {
    let (_guard, root) = temp_root();
    let config = test_config(&root, &["host1"]);
    let executor = StubExecutor::default();

    let installer = RemoteInstaller::new(&config, Routine::Update, &executor);
    let result = installer.run(&root.join("no-such.tar"));
    assert!(matches!(result, Err(FerryError::ArchiveUnpack { .. })));
}

#[test]
fn host_archive_binds_host_once_from_stem() {
    let archive =
        HostArchive::from_path(Routine::Upgrade, Utf8Path::new("/stage/upgrade-web-01.tar"))
            .expect("parse");
    assert_eq!(archive.host, "web-01");
    assert_eq!(archive.file_name(), "upgrade-web-01.tar");
}

#[test]
fn update_apply_clears_decompresses_and_removes_originals() {
    let command = update_apply_command("/tmp/update-host1.tar");
    assert!(command.contains("rm -rf /var/lib/apt/lists/*"));
    assert!(command.contains("tar -xf /tmp/update-host1.tar -C /var/lib/apt/lists"));
    assert!(command.contains("gunzip -f /var/lib/apt/lists/*.gz"));
    assert!(command.contains("rm -f /var/lib/apt/lists/*.gz"));
}

#[test]
fn upgrade_apply_installs_twice_then_cleans_up() {
    let command = upgrade_apply_command("/tmp/upgrade-host1.tar");
    assert_eq!(command.matches("dpkg -i").count(), 2);
    assert!(command.contains("apt-get -y autoremove"));
    assert!(command.contains("apt-get clean"));
}
