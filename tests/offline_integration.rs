/// Offline integration tests for mercado-report
///
/// These tests run the binary against saved pages so no network access
/// or SMTP relay is needed.
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Helper to get the saved pages directory
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

// Helper to run the binary with a config file isolated from the user's one
fn run_report(config: &str, args: &[&str], dir: &Path) -> Output {
    let config_path = dir.join("config.toml");
    std::fs::write(&config_path, config).expect("write config");

    Command::new(env!("CARGO_BIN_EXE_mercado-report"))
        .arg("--config")
        .arg(&config_path)
        .args(args)
        .env_remove("MERCADO_SMTP_SECRET")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run mercado-report {}: {}", args.join(" "), e))
}

fn assert_success(output: &Output, context: &str) {
    assert!(
        output.status.success(),
        "{} failed with status: {:?}\nstdout: {}\nstderr: {}",
        context,
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_fixtures_exist() {
    assert!(fixtures_dir().join("mercado_continuo.html").is_file());
    assert!(fixtures_dir().join("no_table.html").is_file());
}

#[test]
fn test_dry_run_from_saved_page() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let json = dir.path().join("summary.json");
    let page = fixtures_dir().join("mercado_continuo.html");

    let output = run_report(
        "",
        &[
            "--html-file",
            page.to_str().unwrap(),
            "--dry-run",
            "--date",
            "2026-10-19",
            "-o",
            out.to_str().unwrap(),
            "--json",
            json.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_success(&output, "dry run");

    let artifact = out.join("19-10-2026_mercado_continuo.xlsx");
    let bytes = std::fs::read(&artifact).expect("artifact should exist");
    assert_eq!(&bytes[..2], b"PK");

    let summary: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(summary["as_of"], "19-10-2026");
    assert_eq!(summary["quotes"], 4);
    assert_eq!(summary["dropped_rows"], 0);
    assert_eq!(summary["notified"], false);

    let suspended: Vec<&str> = summary["suspensions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["security_name"].as_str().unwrap())
        .collect();
    assert_eq!(suspended, vec!["AMPER", "NYESA"]);
    assert_eq!(summary["suspensions"][0]["detail"], "Suspendido (Pendiente de información relevante)");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mercado: 2 suspended:"), "stdout: {}", stdout);
}

#[test]
fn test_date_last_naming_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let page = fixtures_dir().join("mercado_continuo.html");

    let output = run_report(
        "[artifact]\ndate_order = \"date_last\"\n",
        &[
            "--html-file",
            page.to_str().unwrap(),
            "--dry-run",
            "--date",
            "2026-10-19",
            "-o",
            dir.path().to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_success(&output, "date-last run");
    assert!(dir.path().join("mercado_continuo_19-10-2026.xlsx").is_file());
}

#[test]
fn test_missing_table_fails_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let page = fixtures_dir().join("no_table.html");

    let output = run_report(
        "",
        &["--html-file", page.to_str().unwrap(), "--dry-run", "-o", out.to_str().unwrap()],
        dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("table not found"), "stdout: {}", stdout);
    assert!(!out.exists(), "no artifact directory should be created");
}

#[test]
fn test_missing_mail_settings_fail_fast() {
    let dir = tempfile::tempdir().unwrap();
    let page = fixtures_dir().join("mercado_continuo.html");

    let args = ["--html-file", page.to_str().unwrap(), "-o", dir.path().to_str().unwrap()];
    let output = run_report("", &args, dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Missing mail setting"), "stdout: {}", stdout);
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_report("[page]\nselector = \".x\"\n", &["--dry-run"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration error"), "stdout: {}", stdout);
}
