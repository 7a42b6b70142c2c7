/*!
CLI behavior tests driven through the compiled binary.
*/

use assert_cmd::Command;
use predicates::prelude::*;

fn packshell() -> Command {
    Command::cargo_bin("packshell").unwrap()
}

#[test]
fn test_help_lists_the_subcommands() {
    packshell()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("backends"));
}

#[test]
fn test_version_flag() {
    packshell()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("packshell"));
}

#[test]
fn test_create_requires_member_paths() {
    packshell().args(["create", "out.zip"]).assert().failure();
}

#[test]
fn test_unknown_backend_is_rejected() {
    packshell()
        .args(["--backend", "winrar", "list", "a.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn test_unrecognized_extension_has_no_backend() {
    packshell()
        .args(["list", "notes.7z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No supported archiver backend"));
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("broken.json");
    std::fs::write(&config, "{ not json").unwrap();

    packshell()
        .arg("--config")
        .arg(&config)
        .args(["list", "a.zip"])
        .assert()
        .failure();
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    const FAKE_ZIP: &str = "#!/bin/sh\necho \"Zip 3.0 (July 5th 2008). Usage:\"\nexit 0\n";

    const FAKE_UNZIP: &str = r#"#!/bin/sh
case "$1" in
-h)
    echo "UnZip 6.00 of 20 April 2009, by Info-ZIP."
    ;;
-lv)
    echo "Archive:  $2"
    echo " Length   Method    Size  Cmpr    Date    Time   CRC-32   Name"
    echo "--------  ------  ------- ---- ---------- ----- --------  ----"
    echo "     120  Defl:N       95  21% 2020-01-01 10:30 a1b2c3d4  notes.txt"
    echo "--------          -------  ---                            -------"
    echo "     120                95  21%                            1 file"
    ;;
esac
exit 0
"#;

    const BROKEN_ZIP: &str = "#!/bin/sh\necho \"zip error: Nothing to do!\" >&2\nexit 12\n";

    fn install(dir: &Path, name: &str, script: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn write_config(dir: &Path, config: serde_json::Value) -> String {
        let path = dir.join("packshell.json");
        fs::write(&path, config.to_string()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_create_and_list_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            serde_json::json!({
                "zip": {
                    "deflator": install(dir.path(), "zip", FAKE_ZIP),
                    "inflator": install(dir.path(), "unzip", FAKE_UNZIP),
                }
            }),
        );
        let archive = dir.path().join("out.zip");

        packshell()
            .args(["--config", config.as_str(), "create"])
            .arg(&archive)
            .arg("notes.txt")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        packshell()
            .args(["--config", config.as_str(), "list"])
            .arg(&archive)
            .assert()
            .success()
            .stdout(predicate::str::contains("notes.txt"))
            .stdout(predicate::str::contains("1 member(s)"));

        packshell()
            .args(["--config", config.as_str(), "list", "--json"])
            .arg(&archive)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"notes.txt\""));
    }

    #[test]
    fn test_tool_failure_bubbles_up_the_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            serde_json::json!({
                "zip": {
                    "deflator": install(dir.path(), "zip", BROKEN_ZIP),
                    "inflator": install(dir.path(), "unzip", FAKE_UNZIP),
                }
            }),
        );

        packshell()
            .args(["--config", config.as_str(), "create"])
            .arg(dir.path().join("out.zip"))
            .arg("src")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unable to execute the following command"))
            .stderr(predicate::str::contains("Nothing to do!"));
    }

    #[test]
    fn test_backends_reports_availability_and_version() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            serde_json::json!({
                "zip": {
                    "deflator": install(dir.path(), "zip", FAKE_ZIP),
                    "inflator": install(dir.path(), "unzip", FAKE_UNZIP),
                },
                "preference": ["zip"],
            }),
        );

        packshell()
            .args(["--config", config.as_str(), "backends"])
            .assert()
            .success()
            .stdout(predicate::str::contains("zip"))
            .stdout(predicate::str::contains("yes"))
            .stdout(predicate::str::contains("Zip 3.0"));
    }
}
