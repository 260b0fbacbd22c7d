// ABOUTME: Integration tests for the pricewatch CLI binary.
// ABOUTME: Tests local extraction, batch polling against a mocked edge, and CSV sites import.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const PRODUCT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<script type="application/ld+json">[{"@type":"Product","offers":[{"price":"899.00","priceCurrency":"CHF"}]}]</script>
</head>
<body><p>CHF 949.00</p></body>
</html>"#;

fn pricewatch_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pricewatch").unwrap();
    cmd.env_remove("CF_EDGE_URL");
    cmd
}

#[test]
fn extract_jsonld_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("product.html");
    fs::write(&html_path, PRODUCT_PAGE).unwrap();

    pricewatch_cmd()
        .arg("extract")
        .arg("--html")
        .arg(&html_path)
        .arg("--selector")
        .arg(r#"script[type="application/ld+json"]"#)
        .assert()
        .success()
        .stdout(predicate::eq("{\"price\":\"899.00\"}\n"));
}

#[test]
fn extract_pattern_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("product.html");
    fs::write(&html_path, PRODUCT_PAGE).unwrap();

    pricewatch_cmd()
        .args(["extract", "--selector", "span.price", "--html"])
        .arg(&html_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"price":"949.00"}"#));
}

#[test]
fn extract_not_found_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("empty.html");
    fs::write(&html_path, "<html><body>sold out</body></html>").unwrap();

    pricewatch_cmd()
        .args(["extract", "--selector", "div.price", "--html"])
        .arg(&html_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No match for selector div.price"));
}

#[test]
fn extract_raw_from_url() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/p/1");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(PRODUCT_PAGE);
    });

    pricewatch_cmd()
        .arg("extract")
        .arg(server.url("/p/1"))
        .arg("--raw")
        .arg("--selector")
        .arg("script")
        .assert()
        .success()
        .stdout(predicate::eq(PRODUCT_PAGE));

    mock.assert();
}

#[test]
fn extract_requires_url_or_html() {
    pricewatch_cmd().arg("extract").assert().failure();
}

#[test]
fn batch_polls_edge_for_each_sku() {
    let edge = MockServer::start();
    let first = edge.mock(|when, then| {
        when.method(GET)
            .path("/")
            .query_param("url", "https://www.interdiscount.ch/de/p/1")
            .query_param("selector", "script");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"price":1299}"#);
    });
    let second = edge.mock(|when, then| {
        when.method(GET)
            .path("/")
            .query_param("url", "https://www.interdiscount.ch/de/p/2");
        then.status(404).body("Price not found in JSON-LD");
    });

    let temp_dir = TempDir::new().unwrap();
    let sites_path = temp_dir.path().join("sites.toml");
    fs::write(
        &sites_path,
        r#"
[interdiscount.p1]
url = "https://www.interdiscount.ch/de/p/1"
selector = "script"
ean = "0194253401000"

[interdiscount.p2]
url = "https://www.interdiscount.ch/de/p/2"
selector = "script"
"#,
    )
    .unwrap();

    let output = pricewatch_cmd()
        .arg("batch")
        .arg("--sites")
        .arg(&sites_path)
        .arg("--edge")
        .arg(edge.url("/"))
        .arg("--compact")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    first.assert();
    second.assert();

    let stdout = String::from_utf8(output).unwrap();
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["code"], "p1");
    assert_eq!(records[0]["ean"], "0194253401000");
    assert_eq!(records[0]["price"], 1299);
    assert!(records[0]["error"].is_null());
    assert!(records[0]["ts"].as_i64().unwrap() > 0);

    assert_eq!(records[1]["code"], "p2");
    assert!(records[1]["price"].is_null());
    assert_eq!(
        records[1]["error"],
        "edge returned 404: Price not found in JSON-LD"
    );
}

#[test]
fn batch_reads_edge_url_from_env() {
    let edge = MockServer::start();
    let mock = edge.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(r#"{"price":"5.00"}"#);
    });

    let temp_dir = TempDir::new().unwrap();
    let sites_path = temp_dir.path().join("sites.toml");
    fs::write(
        &sites_path,
        "[brack.x1]\nurl = \"https://www.brack.ch/p/x1\"\nselector = \"script\"\n\n[interdiscount.y1]\nurl = \"https://www.interdiscount.ch/p/y1\"\nselector = \"script\"\n",
    )
    .unwrap();

    pricewatch_cmd()
        .env("CF_EDGE_URL", edge.url("/"))
        .arg("batch")
        .arg("--sites")
        .arg(&sites_path)
        .arg("--shop")
        .arg("brack")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"shop\": \"brack\""))
        .stdout(predicate::str::contains("interdiscount").not());

    mock.assert();
}

#[test]
fn batch_missing_sites_file_fails() {
    pricewatch_cmd()
        .args(["batch", "--edge", "http://127.0.0.1:1/", "--sites", "/nonexistent/sites.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read sites file"));
}

#[test]
fn sites_import_writes_toml_usable_by_batch() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");
    let sites_path = temp_dir.path().join("sites.toml");
    fs::write(
        &csv_path,
        "code,url,selector,ean\n0001873415,https://www.interdiscount.ch/de/p/0001873415,script,0195949038488\n0001000001,https://www.interdiscount.ch/de/p/0001000001,script,\n",
    )
    .unwrap();

    pricewatch_cmd()
        .args(["sites", "import", "--out"])
        .arg(&sites_path)
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&sites_path).unwrap();
    let parsed: toml::Value = toml::from_str(&written).unwrap();
    let entry = &parsed["interdiscount"]["0001873415"];
    assert_eq!(entry["url"].as_str(), Some("https://www.interdiscount.ch/de/p/0001873415"));
    assert_eq!(entry["ean"].as_str(), Some("0195949038488"));
    assert!(parsed["interdiscount"]["0001000001"].get("ean").is_none());

    let edge = MockServer::start();
    let mock = edge.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(r#"{"price":"5.00"}"#);
    });

    pricewatch_cmd()
        .args(["batch", "--compact", "--sites"])
        .arg(&sites_path)
        .arg("--edge")
        .arg(edge.url("/"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"code\":\"0001873415\""));

    assert_eq!(mock.calls(), 2);
}

#[test]
fn sites_import_to_stdout_with_shop() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("products.csv");
    fs::write(&csv_path, "code,url\nx1,https://www.brack.ch/p/x1\n").unwrap();

    let output = pricewatch_cmd()
        .args(["sites", "import", "--shop", "brack"])
        .arg(&csv_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: toml::Value = toml::from_str(&String::from_utf8(output).unwrap()).unwrap();
    assert_eq!(parsed["brack"]["x1"]["url"].as_str(), Some("https://www.brack.ch/p/x1"));
    assert!(parsed.get("interdiscount").is_none());
}

#[test]
fn sites_import_missing_csv_fails() {
    pricewatch_cmd()
        .args(["sites", "import", "/nonexistent/products.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read CSV file"));
}
