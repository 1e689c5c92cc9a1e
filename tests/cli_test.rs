//! Exit status and output of the binary.

use std::process::Command;

fn pagestats_bin() -> &'static str {
    env!("CARGO_BIN_EXE_pagestats")
}

fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(pagestats_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

fn log_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("statistics.log"),
        "Rendered /home|GET in 0.0453 secs\n\
         Rendered /home|GET in 0.0453 secs\n\
         Rendered /login|POST in 0.25 secs\n\
         junk line\n",
    )
    .unwrap();
    dir
}

#[test]
fn empty_directory_exits_non_zero_without_table() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run(&["--path", dir.path().to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty(), "stdout: {stdout}");
    assert!(stderr.contains("No files found"), "stderr: {stderr}");
}

#[test]
fn times_view_is_default() {
    let dir = log_dir();
    let (code, stdout, _) = run(&["--path", dir.path().to_str().unwrap()]);
    assert_eq!(code, 0);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "msec/page (pages/sec):");
    assert!(lines[3].contains("/home") && lines[3].contains("45.30 (22)"));
    assert!(lines[4].contains("/login") && lines[4].contains("250.00 (4)"));
    assert_eq!(lines.len(), 5);
}

#[test]
fn count_view() {
    let dir = log_dir();
    let (code, stdout, _) = run(&["--path", dir.path().to_str().unwrap(), "-c"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("count (outliers):"));
    assert!(stdout.contains("2 (    0)"));
}

#[test]
fn ci_view() {
    let dir = log_dir();
    let (code, stdout, _) = run(&["--path", dir.path().to_str().unwrap(), "--ci"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("msec/page ± 95% CI:"));
    assert!(stdout.contains("250.00 ± 0.00"));
}
