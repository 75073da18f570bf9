mod common;

use common::*;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_invalid_residue_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "bad.fa", FASTA_BAD_RESIDUE);
    let output = dir.path().join("bad.hssp");

    hssp()
        .args(["-j", "4", "convert", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid residue '1'"));

    assert!(!output.exists());
}

#[test]
fn test_no_hits() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "lonely.fa", FASTA_REFERENCE_ONLY);
    let output = dir.path().join("lonely.hssp");

    hssp()
        .args(["convert", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("No hits"));

    assert!(!output.exists());
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();

    hssp()
        .arg("convert")
        .arg(dir.path().join("absent.fa"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_threshold_out_of_range() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);

    hssp()
        .args(["convert", "-t", "-2.5"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("threshold"));
}

#[test]
fn test_unknown_format() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);

    hssp()
        .args(["hits", "-f", "clustal"])
        .arg(&input)
        .assert()
        .code(2);
}

#[test]
fn test_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "query.fa", FASTA);
    let config = write_file(dir.path(), "hssp.toml", "[conversion]\nmax_hits = \"many\"\n");

    hssp()
        .args(["convert", "-c"])
        .arg(&config)
        .arg(&input)
        .assert()
        .code(2);
}
