//! End-to-end checks of the `huffcode` binary.

use std::fs;
use std::process::Command;

use tempfile::tempdir;

/// Run huffcode and return (stdout, stderr, success)
fn run_huffcode(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_huffcode"))
        .args(args)
        .output()
        .expect("Failed to execute huffcode");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn round_trip(contents: &[u8], no_eof: bool) {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let code = dir.path().join("input.code");
    let packed = dir.path().join("input.short");
    let unpacked = dir.path().join("input.new");
    fs::write(&input, contents).unwrap();

    let input_str = input.to_str().unwrap();
    let code_str = code.to_str().unwrap();
    let packed_str = packed.to_str().unwrap();
    let unpacked_str = unpacked.to_str().unwrap();

    let steps: [&[&str]; 3] = [
        &["code", input_str, code_str],
        &["compress", input_str, code_str, packed_str],
        &["decompress", packed_str, code_str, unpacked_str],
    ];
    for step in steps {
        let mut args = step.to_vec();
        if no_eof {
            args.push("--no-eof");
        }
        let (_, stderr, success) = run_huffcode(&args);
        assert!(success, "{} failed: {stderr}", step[0]);
    }

    assert_eq!(fs::read(&unpacked).unwrap(), contents);
}

#[test]
fn round_trips_text_with_eof_symbol() {
    round_trip(b"she sells sea shells by the sea shore\n", false);
}

#[test]
fn round_trips_text_with_bit_length_header() {
    round_trip(b"abracadabra", true);
}

#[test]
fn round_trips_a_single_repeated_byte() {
    round_trip(b"zzzzzzzz", true);
}

#[test]
fn round_trips_an_empty_file() {
    round_trip(b"", false);
}

#[test]
fn compression_shrinks_skewed_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let code = dir.path().join("input.code");
    let packed = dir.path().join("input.short");
    let contents = "a".repeat(900) + &"b".repeat(90) + "cdefghij";
    fs::write(&input, &contents).unwrap();

    let (input, code, packed) = (
        input.to_str().unwrap(),
        code.to_str().unwrap(),
        packed.to_str().unwrap(),
    );
    assert!(run_huffcode(&["code", input, code]).2);
    assert!(run_huffcode(&["compress", input, code, packed]).2);

    let size = fs::metadata(packed).unwrap().len();
    assert!(size < contents.len() as u64 / 4, "packed to {size} bytes");
}

#[test]
fn show_lists_every_symbol() {
    let dir = tempdir().unwrap();
    let code = dir.path().join("table.code");
    fs::write(&code, "65\n0\n66\n10\n256\n11\n").unwrap();

    let (stdout, _, success) = run_huffcode(&["show", code.to_str().unwrap()]);
    assert!(success);
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("'A'"));
    assert!(stdout.contains("EOF"));
}

#[test]
fn malformed_table_is_reported() {
    let dir = tempdir().unwrap();
    let code = dir.path().join("bad.code");
    fs::write(&code, "65\n01\n66\n0\n").unwrap();

    let (_, stderr, success) = run_huffcode(&["show", code.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("malformed code table"), "{stderr}");
}

#[test]
fn truncated_input_is_reported() {
    let dir = tempdir().unwrap();
    let code = dir.path().join("table.code");
    let packed = dir.path().join("packed");
    let out = dir.path().join("out");
    // Eight zero bits decode as 65 and the stream ends before the EOF symbol.
    fs::write(&code, "65\n0\n256\n1\n").unwrap();
    fs::write(&packed, [0u8]).unwrap();

    let (_, stderr, success) = run_huffcode(&[
        "decompress",
        packed.to_str().unwrap(),
        code.to_str().unwrap(),
        out.to_str().unwrap(),
    ]);
    assert!(!success);
    assert!(stderr.contains("ended in the middle"), "{stderr}");
    assert!(!out.exists(), "failed decode left {} behind", out.display());
}

#[test]
fn missing_branch_leaves_no_output() {
    let dir = tempdir().unwrap();
    let code = dir.path().join("table.code");
    let packed = dir.path().join("packed");
    let out = dir.path().join("out");
    // 65 decodes from the first two zero bits, then bit 1 has no branch.
    fs::write(&code, "65
00
256
01
").unwrap();
    fs::write(&packed, [0b0000_0100u8]).unwrap();

    let (_, stderr, success) = run_huffcode(&[
        "decompress",
        packed.to_str().unwrap(),
        code.to_str().unwrap(),
        out.to_str().unwrap(),
    ]);
    assert!(!success);
    assert!(stderr.contains("no branch for bit 1"), "{stderr}");
    assert!(!out.exists(), "failed decode left {} behind", out.display());
}
