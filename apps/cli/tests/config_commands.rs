use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle} missing from {haystack}"))
}

#[test]
fn sort_writes_patterns_case_insensitively() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("analyse.xml");
    let sorted = dir.path().join("sorted.xml");
    fs::write(
        &config,
        r#"<AnalyseDoc>
  <Pattern searchText="b"/>
  <Pattern searchText="A"/>
  <Pattern searchText="c"/>
</AnalyseDoc>"#,
    )?;

    Command::cargo_bin("analyse-cli")?
        .args([
            "sort",
            "--config",
            config.to_str().unwrap(),
            "--key",
            "search",
            "--output",
            sorted.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sorted 3 patterns"));

    let xml = fs::read_to_string(&sorted)?;
    let a = position(&xml, r#"searchText="A""#);
    let b = position(&xml, r#"searchText="b""#);
    let c = position(&xml, r#"searchText="c""#);
    assert!(a < b && b < c, "{xml}");

    let untouched = fs::read_to_string(&config)?;
    assert!(position(&untouched, r#"searchText="b""#) < position(&untouched, r#"searchText="A""#));
    Ok(())
}

#[test]
fn sort_descending_overwrites_config() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("analyse.xml");
    fs::write(
        &config,
        r#"<AnalyseDoc>
  <Pattern searchText="x" group="alpha"/>
  <Pattern searchText="y" group="Beta"/>
</AnalyseDoc>"#,
    )?;

    Command::cargo_bin("analyse-cli")?
        .args([
            "sort",
            "--config",
            config.to_str().unwrap(),
            "--key",
            "group",
            "--descending",
        ])
        .assert()
        .success();

    let xml = fs::read_to_string(&config)?;
    assert!(position(&xml, r#"group="Beta""#) < position(&xml, r#"group="alpha""#));
    Ok(())
}

#[test]
fn number_assigns_sequential_labels() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("analyse.xml");
    fs::write(
        &config,
        r#"<AnalyseDoc>
  <Pattern searchText="one"/>
  <Pattern searchText="two"/>
</AnalyseDoc>"#,
    )?;

    Command::cargo_bin("analyse-cli")?
        .args(["number", "--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Numbered 2 patterns"));

    let xml = fs::read_to_string(&config)?;
    assert!(xml.contains(r#"order="1""#));
    assert!(xml.contains(r#"order="2""#));
    Ok(())
}

#[test]
fn number_refuses_to_overwrite_without_force() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("analyse.xml");
    let original = r#"<AnalyseDoc>
  <Pattern order="z" searchText="one"/>
  <Pattern searchText="two"/>
</AnalyseDoc>"#;
    fs::write(&config, original)?;

    Command::cargo_bin("analyse-cli")?
        .args(["number", "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(&config)?, original);

    Command::cargo_bin("analyse-cli")?
        .args(["number", "--config", config.to_str().unwrap(), "--force"])
        .assert()
        .success();
    let xml = fs::read_to_string(&config)?;
    assert!(!xml.contains(r#"order="z""#));
    assert!(xml.contains(r#"order="1""#));
    Ok(())
}

#[test]
fn group_toggles_only_its_members() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("analyse.xml");
    fs::write(
        &config,
        r#"<AnalyseDoc>
  <Pattern searchText="ERROR" group="alerts"/>
  <Pattern searchText="WARN" group="alerts"/>
  <Pattern searchText="INFO" group="noise"/>
</AnalyseDoc>"#,
    )?;

    Command::cargo_bin("analyse-cli")?
        .args([
            "group",
            "--config",
            config.to_str().unwrap(),
            "alerts",
            "--disable",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Disabled 2 patterns of group 'alerts'"));

    let xml = fs::read_to_string(&config)?;
    assert_eq!(xml.matches(r#"doSearch="0""#).count(), 2);
    assert_eq!(xml.matches(r#"doSearch="1""#).count(), 1);

    Command::cargo_bin("analyse-cli")?
        .args(["group", "--config", config.to_str().unwrap(), "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("group 'missing' not found"));
    Ok(())
}

#[test]
fn export_writes_hit_counts() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("analyse.xml");
    let log = dir.path().join("app.log");
    let export = dir.path().join("out").join("export.xml");
    fs::write(
        &config,
        r#"<AnalyseDoc>
  <Pattern searchText="ERROR"/>
  <Pattern searchText="missing"/>
</AnalyseDoc>"#,
    )?;
    fs::write(&log, "ERROR a\nINFO b\nERROR c\n")?;

    Command::cargo_bin("analyse-cli")?
        .args([
            "export",
            "--config",
            config.to_str().unwrap(),
            log.to_str().unwrap(),
            "--output",
            export.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 patterns (2 hits)"));

    let xml = fs::read_to_string(&export)?;
    assert!(xml.contains(r#"hits="2""#));
    assert!(xml.contains(r#"hits="0""#));
    Ok(())
}
