mod common;

use common::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_help() {
    hssp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("hits"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_convert_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);
    let output = dir.path().join("query.hssp");

    hssp()
        .args(["convert", "--date", "2024-05-17", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("HSSP       HOMOLOGY DERIVED SECONDARY STRUCTURE OF PROTEINS"));
    assert!(text.contains("DATE       file generated on 2024-05-17\n"));
    assert!(text.contains("NALIGN     0003\n"));
    assert!(text.contains(" 00002 00016 00016 00002 vGSk\n"));
    assert!(text.ends_with("//\n"));
}

#[test]
fn test_convert_to_stdout_with_max_hits() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);

    hssp()
        .args(["convert", "-m", "1"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("NALIGN     0001\n"))
        .stdout(predicate::str::contains("SAME_HUMAN"))
        .stdout(predicate::str::contains("MUT_YEAST").not());
}

#[test]
fn test_convert_compressed() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);
    let output = dir.path().join("query.hssp.gz");

    hssp()
        .args(["convert", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
}

#[test]
fn test_hits_json() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);

    let output = hssp()
        .args(["hits", "--json"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["SAME_HUMAN", "INS_MOUSE", "MUT_YEAST"]);
    assert_eq!(hits[0]["nr"], 1);
    assert_eq!(hits[1]["insertions"], 1);
}

#[test]
fn test_hits_table() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);

    hssp()
        .arg("hits")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("ACCNUM"))
        .stdout(predicate::str::contains("P00002"));
}

#[test]
fn test_accession_list_filters_hits() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);
    let known = write_file(dir.path(), "known.txt", "P00003\n");

    hssp()
        .args(["convert", "--accessions"])
        .arg(&known)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("NALIGN     0001\n"))
        .stdout(predicate::str::contains("MUT_YEAST"));
}

#[test]
fn test_config_roundtrip_through_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("hssp.toml");

    hssp()
        .args(["config", "-o"])
        .arg(&config)
        .assert()
        .success();

    let text = fs::read_to_string(&config).unwrap();
    assert!(text.contains("max_hits = 1500"));

    let input = write_file(dir.path(), "query.fa", FASTA);
    fs::write(&config, text.replace("max_hits = 1500", "max_hits = 2")).unwrap();

    hssp()
        .args(["convert", "-c"])
        .arg(&config)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("NALIGN     0002\n"));
}

#[test]
fn test_config_stdout() {
    hssp()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[conversion]"))
        .stdout(predicate::str::contains("threshold = 0.05"));
}

#[test]
fn test_config_threads_size_the_aggregation_pool() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);
    let config = write_file(dir.path(), "hssp.toml", "[performance]\nthreads = 3\n");

    hssp()
        .args(["-v", "hits", "--json", "-c"])
        .arg(&config)
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Using 3 threads"));

    hssp()
        .args(["-v", "-j", "2", "hits", "--json", "-c"])
        .arg(&config)
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Using 2 threads"));
}

#[test]
fn test_convert_to_bzip2() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);
    let output = dir.path().join("query.hssp.bz2");

    hssp()
        .args(["convert", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    assert_eq!(&fs::read(&output).unwrap()[..3], b"BZh");
}
