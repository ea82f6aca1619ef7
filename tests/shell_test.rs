use std::io::{Cursor, Write};
use std::process::Command;

use blockfs::{FileSystem, FsConfig, Shell};
use tempfile::NamedTempFile;

fn run_script(config: FsConfig, script: &str) -> String {
    let fs = FileSystem::new(config).unwrap();
    let mut shell = Shell::new(fs, Cursor::new(script.as_bytes().to_vec()), Vec::new());
    shell.run().unwrap();
    let (_, out) = shell.into_parts();
    String::from_utf8(out).unwrap()
}

#[test]
fn session_matches_expected_messages() {
    let out = run_script(
        FsConfig::default(),
        "mkdir docs\ncreate f1\nls\nwrite f1 \"Hi\\tthere\"\nread f1\ncd docs\npwd\ncd ..\ndf\nexit\n",
    );
    let expected = [
        "Compact VFS - ready. Type 'exit' to quit.",
        "/ > Directory 'docs' created successfully.",
        "/ > File 'f1' created successfully.",
        "/ > docs/",
        "f1",
        "/ > Data written successfully (size=8 bytes).",
        "/ > Hi\tthere",
        "/ > Moved to /docs",
        "docs > /docs",
        "docs > Moved to /",
        "/ > Total Blocks: 5000",
        "Used Blocks: 1",
        "Free Blocks: 4999",
        "Disk Usage: 0.02%",
        "/ > ",
    ]
    .join("\n");
    assert_eq!(out, expected);
}

#[test]
fn failures_are_reported_and_the_loop_continues() {
    let out = run_script(
        FsConfig::default(),
        "read nope\ncd ..\nfrobnicate\nmkdir\n\ncreate ok\nread ok\nexit\n",
    );
    assert!(out.contains("Error: not found: nope"));
    assert!(out.contains("Already at root"));
    assert!(out.contains("Error: unknown command: frobnicate"));
    assert!(out.contains("Error: Usage: mkdir <name>"));
    assert!(out.contains("File 'ok' created successfully."));
    assert!(out.contains("(empty file)"));
}

#[test]
fn end_of_input_stops_the_shell() {
    let out = run_script(FsConfig::default(), "ls\n");
    assert!(out.contains("(empty)"));
    assert!(out.ends_with("\nEOF received. Exiting shell.\n"));
}

#[test]
fn df_json_reports_usage() {
    let config = FsConfig {
        total_blocks: 10,
        block_size: 4,
        max_name_len: 50,
    };
    let out = run_script(config, "create f\nwrite f \"abcde\"\ndf --json\nexit\n");
    assert!(out.contains(
        r#"{"total_blocks":10,"used_blocks":2,"free_blocks":8,"usage_percent":20.0}"#
    ));
}

#[test]
fn greeting_and_farewell() {
    let fs = FileSystem::new(FsConfig::default()).unwrap();
    let mut shell = Shell::new(fs, Cursor::new(b"create f\nwrite f x\nexit\n".to_vec()), Vec::new());
    shell.greet().unwrap();
    shell.run().unwrap();
    assert_eq!(shell.fs().free_block_count(), 4999);
    shell.farewell().unwrap();
    assert_eq!(shell.fs().free_block_count(), 5000);
    let (_, out) = shell.into_parts();
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("Initializing Virtual File System....\nVFS initialized successfully.\nTotal Blocks: 5000 | Free Blocks: 5000\n"));
    assert!(out.ends_with("Memory released. Exiting program...\n"));
}

#[test]
fn binary_runs_a_script_file() {
    let mut script = NamedTempFile::new().unwrap();
    writeln!(script, "mkdir a").unwrap();
    writeln!(script, "cd a").unwrap();
    writeln!(script, "pwd").unwrap();
    writeln!(script, "exit").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_blockfs"))
        .arg("--quiet")
        .arg("--script")
        .arg(script.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Directory 'a' created successfully."));
    assert!(stdout.contains("a > /a"));
    assert!(!stdout.contains("Memory released"));
}
