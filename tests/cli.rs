use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn bundler() -> Command {
    let mut cmd = Command::cargo_bin("file-bundler").unwrap();
    cmd.env_remove("FILE_BUNDLER_ZSTD_LEVEL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_bundle_list_extract() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("teste_data");
    fs::create_dir_all(input.join("dir")).unwrap();
    fs::write(input.join("a.txt"), "hello").unwrap();
    fs::write(input.join("dir").join("b.txt"), "world").unwrap();
    let bundle = work.path().join("pacote.bundle");
    let output = work.path().join("saida");

    bundler()
        .args(["bundle", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&bundle)
        .args(["-c", "zstd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files, 1 directories"));

    bundler()
        .args(["list", "-i"])
        .arg(&bundle)
        .assert()
        .success()
        .stdout("a.txt\ndir\ndir/b.txt\n");

    bundler()
        .args(["list", "-v", "-i"])
        .arg(&bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("zstd").and(predicate::str::contains("2 files")));

    bundler()
        .args(["extract", "-q", "-i"])
        .arg(&bundle)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(output.join("a.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(output.join("dir").join("b.txt")).unwrap(), "world");
}

#[test]
fn test_pipe_selected_file() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("in");
    fs::create_dir_all(input.join("dir")).unwrap();
    fs::write(input.join("a.txt"), "hello").unwrap();
    fs::write(input.join("dir").join("b.txt"), "world").unwrap();
    let bundle = work.path().join("x.bundle");

    bundler()
        .args(["bundle", "-q", "-c", "lz4", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&bundle)
        .assert()
        .success();

    bundler()
        .args(["extract", "-p", "-i"])
        .arg(&bundle)
        .arg("b.txt")
        .assert()
        .success()
        .stdout("world");
}

#[test]
fn test_incompatible_version_is_reported() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("in");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("a.txt"), "hello").unwrap();
    let bundle = work.path().join("old.bundle");

    bundler()
        .args(["bundle", "-q", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&bundle)
        .assert()
        .success();

    // version is the last field of the manifest, right before the trailer
    let mut bytes = fs::read(&bundle).unwrap();
    let len = bytes.len();
    bytes[len - 12..len - 8].copy_from_slice(&1u32.to_le_bytes());
    fs::write(&bundle, bytes).unwrap();

    let output = work.path().join("out");
    bundler()
        .args(["extract", "-i"])
        .arg(&bundle)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Incompatible bundle version 1"));
    assert!(!output.exists());
}

#[test]
fn test_missing_bundle_fails() {
    let work = tempfile::tempdir().unwrap();
    bundler()
        .args(["extract", "-i"])
        .arg(work.path().join("nope.bundle"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read bundle"));
}
