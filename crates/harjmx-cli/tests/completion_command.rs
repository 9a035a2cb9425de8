use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_harjmx_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("harjmx")
}

#[test]
fn test_completion_command_help() {
    let mut cmd = Command::new(get_harjmx_bin());
    cmd.arg("completion").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("powershell"))
        .stdout(predicate::str::contains("INSTALLATION"))
        .stdout(predicate::str::contains("~/.bashrc"))
        .stdout(predicate::str::contains("~/.zshrc"));
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_harjmx_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_harjmx()"))
        .stdout(predicate::str::contains("complete -F _harjmx"));
}

#[test]
fn test_completion_zsh_generates_script() {
    let mut cmd = Command::new(get_harjmx_bin());
    cmd.arg("completion").arg("--shell").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef harjmx"))
        .stdout(predicate::str::contains("_harjmx()"));
}

#[test]
fn test_completion_fish_lists_convert_flags() {
    let mut cmd = Command::new(get_harjmx_bin());
    cmd.arg("completion").arg("--shell").arg("fish");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("complete -c harjmx"))
        .stdout(predicate::str::contains("pause-ms"));
}

#[test]
fn test_completion_invalid_shell() {
    let mut cmd = Command::new(get_harjmx_bin());
    cmd.arg("completion").arg("--shell").arg("invalid-shell");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completion_requires_shell_flag() {
    let mut cmd = Command::new(get_harjmx_bin());
    cmd.arg("completion");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_completion_appears_in_main_help() {
    let mut cmd = Command::new(get_harjmx_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("completion"))
        .stdout(predicate::str::contains("Generate shell completion"));
}
