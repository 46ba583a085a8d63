use std::process::{Command, Output};
use std::str;

use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_stock-view"))
        .args(args)
        .env_remove("STOCK_VIEW_CONFIG")
        .output()
        .expect("spawn stock-view");
    if !output.status.success() {
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
    }
    output
}

#[test]
fn watchlist_creates_then_reuses_cache_file() {
    let dir = TempDir::new().unwrap();
    let remote = dir.path().join("remote.json");
    let cache = dir.path().join("cache.json");
    std::fs::write(&remote, r#"["aapl", "MSFT"]"#).unwrap();

    let args = [
        "watchlist",
        "--remote",
        remote.to_str().unwrap(),
        "--cache",
        cache.to_str().unwrap(),
    ];

    let first = run(&args);
    assert!(first.status.success());
    let stdout = str::from_utf8(&first.stdout).unwrap();
    assert!(stdout.contains("AAPL"));
    assert!(stdout.contains("2 written to cache"));

    let stored: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&cache).unwrap()).unwrap();
    assert_eq!(stored, vec!["AAPL", "MSFT"]);

    let second = run(&args);
    assert!(second.status.success());
    assert!(str::from_utf8(&second.stdout).unwrap().contains("0 written to cache"));
}

#[test]
fn watchlist_dry_run_leaves_cache_alone() {
    let dir = TempDir::new().unwrap();
    let remote = dir.path().join("remote.json");
    let cache = dir.path().join("cache.json");
    std::fs::write(&remote, r#"["TSLA"]"#).unwrap();

    let out = run(&[
        "watchlist",
        "--remote",
        remote.to_str().unwrap(),
        "--cache",
        cache.to_str().unwrap(),
        "--dry-run",
    ]);
    assert!(out.status.success());
    assert!(str::from_utf8(&out.stdout).unwrap().contains("+ TSLA"));
    assert!(!cache.exists());
}

#[test]
fn search_prints_matching_rows() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("instruments.json");
    std::fs::write(
        &file,
        r#"[
            {"symbol": "AAPL", "name": "Apple", "industry": "Technology"},
            {"symbol": "AMZN", "name": "Amazon", "industry": "Retail"},
            {"symbol": "MSFT", "name": "Microsoft", "industry": "Technology"}
        ]"#,
    )
    .unwrap();

    let out = run(&["search", "--instruments", file.to_str().unwrap(), "--query", "a"]);
    assert!(out.status.success());
    let stdout = str::from_utf8(&out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 2);
    assert!(!stdout.contains("MSFT"));
}

#[test]
fn negative_days_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("series.json");
    std::fs::write(&file, "[]").unwrap();

    let out = run(&["series", "--file", file.to_str().unwrap(), "--days", "-3"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid filter argument"));
}
