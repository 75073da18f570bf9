#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// 30 reference residues with a two-column insertion after residue 15
pub const FASTA: &str = "\
>query test protein
MKTAYIAKQRQISFV--KSHFSRQLEERLGLI
>sp|P00001|SAME_HUMAN identical copy
MKTAYIAKQRQISFV--KSHFSRQLEERLGLI
>sp|P00002|INS_MOUSE carries an insertion
MKTAYIAKQRQISFVGSKSHFSRQLEERLGLI
>sp|P00003|MUT_YEAST two substitutions
MKTAYWAKQRQISFV--KSHFSRQLEEWLGLI
";

/// Same alignment with a digit in the third hit
pub const FASTA_BAD_RESIDUE: &str = "\
>query test protein
MKTAYIAKQRQISFV--KSHFSRQLEERLGLI
>sp|P00001|SAME_HUMAN identical copy
MKTAYIAKQRQISFV--KSHFSRQLEERLGLI
>sp|P00003|MUT_YEAST two substitutions
MKTAYWAKQRQI1FV--KSHFSRQLEEWLGLI
";

/// Only the reference; nothing can become a hit
pub const FASTA_REFERENCE_ONLY: &str = "\
>query test protein
MKTAYIAKQRQISFVKSHFSRQLEERLGLI
";

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn hssp() -> Command {
    let mut cmd = Command::cargo_bin("hssp").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("HSSP_LOG");
    cmd
}
