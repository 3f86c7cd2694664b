use assert_cmd::Command;
use predicates::prelude::*;

fn cmdtree() -> Command {
    let mut cmd = Command::cargo_bin("cmdtree").unwrap();
    cmd.env_remove("RUST_LOG").arg("--no-color");
    cmd
}

#[test]
fn test_root_help_without_arguments() {
    cmdtree()
        .assert()
        .success()
        .stdout(predicate::str::starts_with("cmdtree 0.3.2\n"))
        .stdout(predicate::str::contains("USAGE\n    cmdtree GROUP|COMMAND\n"))
        .stdout(predicate::str::contains("math (m)"))
        .stdout(predicate::str::contains("COMMANDS\n    version"));
}

#[test]
fn test_help_for_a_method() {
    cmdtree()
        .args(["help", "math", "add"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME\n    cmdtree.math.add - Adds two numbers\n"))
        .stdout(predicate::str::contains("USAGE\n    cmdtree math add a [b]\n"))
        .stdout(predicate::str::contains("(Optional)"))
        .stdout(predicate::str::contains("[default: 0]"))
        .stdout(predicate::str::contains("[e.g. 2]"));
}

#[test]
fn test_help_keyword_is_case_insensitive_and_follows_aliases() {
    cmdtree()
        .args(["HELP", "m"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cmdtree.math"))
        .stdout(predicate::str::contains("divide (div)"));
}

#[test]
fn test_hidden_members_are_not_listed_but_still_run() {
    cmdtree()
        .args(["help", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repeat"))
        .stdout(predicate::str::contains("alphabet").not());

    cmdtree()
        .args(["text", "alphabet"])
        .assert()
        .success()
        .stdout("abcdefghijklmnopqrstuvwxyz\n");
}

#[test]
fn test_group_without_command_shows_its_help() {
    cmdtree()
        .arg("env")
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMANDS\n    describe"));
}

#[test]
fn test_method_result_is_printed() {
    cmdtree()
        .args(["math", "add", "2", "3"])
        .assert()
        .success()
        .stdout("5\n");

    cmdtree()
        .args(["m", "add", "2"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_array_argument_is_split() {
    cmdtree()
        .args(["math", "sum", "1,2,3.5"])
        .assert()
        .success()
        .stdout("6.5\n");
}

#[test]
fn test_flags_do_not_become_arguments() {
    cmdtree()
        .args(["text", "repeat", "--loud", "ab", "--times=9", "3", "-"])
        .assert()
        .success()
        .stdout("ab-ab-ab\n");
}

#[test]
fn test_oversized_repeat_count_fails_cleanly() {
    cmdtree()
        .args(["text", "repeat", "hi", "1e18"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("times must be at most 10000"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_record_and_date_arguments() {
    cmdtree()
        .args(["env", "describe", "retries=3,timeout=1.5", "2024-05-01", "yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"retries\": 3"))
        .stdout(predicate::str::contains("\"timeout\": 1.5"))
        .stdout(predicate::str::contains("\"since\": \"2024-05-01T00:00:00+00:00\""))
        .stdout(predicate::str::contains("\"strict\": true"));
}

#[test]
fn test_bad_boolean_is_reported() {
    cmdtree()
        .args(["env", "describe", "a=1", "2024-05-01", "maybe"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid boolean value 'maybe'"));
}

#[test]
fn test_bad_number_is_reported() {
    cmdtree()
        .args(["math", "add", "two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid number value: 'two'"));
}

#[test]
fn test_unknown_command_fails() {
    cmdtree()
        .args(["math", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: No such command or group 'nope' in 'math'",
        ));
}

#[test]
fn test_command_failure_uses_its_exit_code() {
    cmdtree()
        .args(["math", "div", "1", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("division by zero"));

    cmdtree()
        .args(["--debug", "math", "div", "1", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_command_name_override() {
    cmdtree()
        .args(["--name", "tool", "help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME\n    tool - Demo command tree\n"));
}

#[test]
fn test_version_scalar() {
    cmdtree()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0.3.2"));
}
