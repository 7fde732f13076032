// ABOUTME: Integration tests for the neph CLI binary.
// ABOUTME: Validates exit codes, local exec, apply/examine and info listings.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch neph installation: config, scripts dir and conf dir.
struct Fleet {
    dir: TempDir,
}

impl Fleet {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::create_dir_all(root.join("conf")).unwrap();
        fs::write(
            root.join("neph.yml"),
            format!(
                "scripts_dir: {}\nconf_dir: {}\nhosts:\n  nk024: 165.227.3.8\n  nk025: 165.227.11.3\n",
                root.join("scripts").display(),
                root.join("conf").display()
            ),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn script(&self, name: &str, body: &str, mode: u32) {
        let path = self.path("scripts").join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    fn neph(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("neph"));
        cmd.env_remove("NEPH_CONFIG")
            .arg("--config")
            .arg(self.path("neph.yml"));
        cmd
    }
}

fn neph_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("neph"))
}

mod arguments {
    use super::*;

    #[test]
    fn help_shows_commands() {
        neph_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("exec"))
            .stdout(predicate::str::contains("apply"))
            .stdout(predicate::str::contains("examine"))
            .stdout(predicate::str::contains("info"));
    }

    #[test]
    fn version_succeeds() {
        neph_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn unknown_subcommand_is_bad_arguments() {
        neph_cmd().arg("frobnicate").assert().code(12);
    }

    #[test]
    fn missing_arguments_are_bad_arguments() {
        neph_cmd().args(["exec", "localhost"]).assert().code(12);
    }

    #[test]
    fn invalid_script_name_is_bad_arguments() {
        let fleet = Fleet::new();
        fleet
            .neph()
            .args(["exec", "localhost", "../../bin/sh"])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("invalid script name"));
    }

    #[test]
    fn missing_config_file_is_config_missing() {
        let dir = TempDir::new().unwrap();
        neph_cmd()
            .arg("--config")
            .arg(dir.path().join("absent.yml"))
            .args(["info", "hosts"])
            .assert()
            .code(7);
    }

    #[test]
    fn invalid_config_file_is_config_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("neph.yml");
        fs::write(&path, "ssh:\n  port: 0\n").unwrap();
        neph_cmd()
            .arg("--config")
            .arg(&path)
            .args(["info", "hosts"])
            .assert()
            .code(8);
    }
}

mod exec {
    use super::*;

    #[test]
    fn runs_local_script_between_banners() {
        let fleet = Fleet::new();
        fleet.script("hello", "#!/bin/sh\necho \"hi $1\"\n", 0o755);

        fleet
            .neph()
            .args(["exec", "localhost", "hello", "there"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--- Begin script hello ---"))
            .stdout(predicate::str::contains("hi there"))
            .stdout(predicate::str::contains("--- End script hello ---"));
    }

    #[test]
    fn script_exit_code_passes_through() {
        let fleet = Fleet::new();
        fleet.script("fail", "#!/bin/sh\nexit 42\n", 0o755);

        fleet
            .neph()
            .args(["exec", "localhost", "fail"])
            .assert()
            .code(42);
    }

    #[test]
    fn quiet_mode_prints_only_script_output() {
        let fleet = Fleet::new();
        fleet.script("hello", "#!/bin/sh\necho hi\n", 0o755);

        fleet
            .neph()
            .args(["-q", "exec", "localhost", "hello"])
            .assert()
            .success()
            .stdout("hi\n");
    }

    #[test]
    fn missing_script_exits_nine() {
        let fleet = Fleet::new();
        fleet
            .neph()
            .args(["exec", "localhost", "absent"])
            .assert()
            .code(9)
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn non_executable_script_exits_ten() {
        let fleet = Fleet::new();
        fleet.script("plain", "#!/bin/sh\necho hi\n", 0o644);

        fleet
            .neph()
            .args(["exec", "localhost", "plain"])
            .assert()
            .code(10);
    }

    #[test]
    fn unresolvable_target_is_logic_error() {
        let fleet = Fleet::new();
        fleet
            .neph()
            .args(["exec", "no-such-host.invalid", "hello"])
            .assert()
            .code(11);
    }
}

mod blocks {
    use super::*;

    #[test]
    fn apply_then_examine() {
        let fleet = Fleet::new();
        fs::write(fleet.path("conf/app.conf"), "keep=1\n").unwrap();
        fs::write(fleet.path("block.txt"), "managed=yes\n").unwrap();

        fleet
            .neph()
            .args(["apply", "localhost", "app.conf"])
            .arg(fleet.path("block.txt"))
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(fleet.path("conf/app.conf")).unwrap(),
            "keep=1\n#-----BEGIN NEPH-----\nmanaged=yes\n#-----END NEPH-----\n"
        );
        assert_eq!(
            fs::read_to_string(fleet.path("conf/app.conf.bak")).unwrap(),
            "keep=1\n"
        );

        fleet
            .neph()
            .args(["examine", "localhost", "app.conf"])
            .assert()
            .success()
            .stdout("managed=yes\n");
    }

    #[test]
    fn apply_reads_block_from_stdin() {
        let fleet = Fleet::new();
        fs::write(fleet.path("conf/app.conf"), "keep=1\n").unwrap();

        fleet
            .neph()
            .args(["apply", "localhost", "app.conf", "-"])
            .write_stdin("managed=yes\n")
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(fleet.path("conf/app.conf")).unwrap(),
            "keep=1\n#-----BEGIN NEPH-----\nmanaged=yes\n#-----END NEPH-----\n"
        );
    }

    #[test]
    fn apply_to_missing_config_file_exits_seven() {
        let fleet = Fleet::new();
        fs::write(fleet.path("block.txt"), "x\n").unwrap();

        fleet
            .neph()
            .args(["apply", "localhost", "absent.conf"])
            .arg(fleet.path("block.txt"))
            .assert()
            .code(7);
    }

    #[test]
    fn apply_with_missing_block_file_fails() {
        let fleet = Fleet::new();
        fs::write(fleet.path("conf/app.conf"), "keep=1\n").unwrap();

        fleet
            .neph()
            .args(["apply", "localhost", "app.conf"])
            .arg(fleet.path("absent-block.txt"))
            .assert()
            .code(1);

        assert_eq!(
            fs::read_to_string(fleet.path("conf/app.conf")).unwrap(),
            "keep=1\n"
        );
    }

    #[test]
    fn examine_without_region_prints_nothing() {
        let fleet = Fleet::new();
        fs::write(fleet.path("conf/app.conf"), "keep=1\n").unwrap();

        fleet
            .neph()
            .args(["examine", "localhost", "app.conf"])
            .assert()
            .success()
            .stdout("");
    }
}

mod info {
    use super::*;

    #[test]
    fn hosts_lists_registry() {
        let fleet = Fleet::new();
        fleet
            .neph()
            .args(["info", "hosts"])
            .assert()
            .success()
            .stdout("nk024 165.227.3.8\nnk025 165.227.11.3\n");
    }

    #[test]
    fn scripts_lists_files_recursively_skipping_hidden() {
        let fleet = Fleet::new();
        fleet.script("backup", "#!/bin/sh\n", 0o755);
        fleet.script(".hidden", "#!/bin/sh\n", 0o755);
        fs::create_dir_all(fleet.path("scripts/nested")).unwrap();
        fs::write(fleet.path("scripts/nested/rotate"), "").unwrap();
        fs::create_dir_all(fleet.path("scripts/.git")).unwrap();
        fs::write(fleet.path("scripts/.git/config"), "").unwrap();

        let expected = format!(
            "{}\n{}\n",
            fleet.path("scripts/backup").display(),
            fleet.path("scripts/nested/rotate").display()
        );
        fleet
            .neph()
            .args(["info", "scripts"])
            .assert()
            .success()
            .stdout(expected);
    }

    #[test]
    fn configs_in_json_mode() {
        let fleet = Fleet::new();
        fs::write(fleet.path("conf/app.conf"), "").unwrap();

        fleet
            .neph()
            .args(["--json", "info", "configs"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""event":"entry""#))
            .stdout(predicate::str::contains("app.conf"));
    }

    #[test]
    fn missing_directory_is_filesystem_failure() {
        let fleet = Fleet::new();
        fs::remove_dir(fleet.path("conf")).unwrap();

        fleet.neph().args(["info", "configs"]).assert().code(1);
    }
}
