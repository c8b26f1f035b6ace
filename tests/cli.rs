use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn selpg(args: &[&str], stdin: &[u8]) -> Output {
    selpg_with_env(args, stdin, &[])
}

fn selpg_with_env<A: AsRef<OsStr>>(args: &[A], stdin: &[u8], env: &[(&str, &str)]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_selpg"))
        .args(args)
        .envs(env.iter().copied())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut child_stdin = child.stdin.take().unwrap();
        // The process may exit before reading stdin when the arguments are bad
        let _ = child_stdin.write_all(stdin);
    }
    child.wait_with_output().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn numbered_lines(count: usize) -> String {
    (1..=count).map(|n| format!("line {}\n", n)).collect()
}

fn assert_fails(args: &[&str], code: i32) {
    let output = selpg(args, b"some input\n");
    assert_eq!(output.status.code(), Some(code), "args: {:?}", args);
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("USAGE: selpg"), "args: {:?}", args);
}

#[test]
fn test_first_page_from_stdin() {
    let output = selpg(&["-s1", "-e1", "-l5"], numbered_lines(10).as_bytes());
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout.clone()).unwrap(), numbered_lines(5));
    assert!(stderr(&output).contains("selpg: done"));
}

#[test]
fn test_form_feed_page_from_stdin() {
    let output = selpg(&["-s2", "-e2", "-f"], b"a\nb\x0c c\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"\x0c c\n");
}

#[test]
fn test_start_beyond_total_pages() {
    let output = selpg(&["-s5", "-e10", "-l2"], numbered_lines(6).as_bytes());
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.contains("start_page (5) greater than total pages (3), no output written"));
    assert!(stderr.contains("done"));
}

#[test]
fn test_end_beyond_total_pages() {
    let output = selpg(&["-s2", "-e4", "-l2"], numbered_lines(6).as_bytes());
    assert!(output.status.success());
    assert_eq!(output.stdout, b"line 3\nline 4\nline 5\nline 6\n");
    assert!(stderr(&output).contains("less output than expected"));
}

#[test]
fn test_reads_named_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(numbered_lines(8).as_bytes()).unwrap();
    let path = file.path().to_str().unwrap();

    let output = selpg(&["-s2", "-e2", "-l4", path], b"");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"line 5\nline 6\nline 7\nline 8\n");
}

#[test]
fn test_same_output_every_run() {
    let input = numbered_lines(100);
    let first = selpg(&["-s2", "-e3", "-l13"], input.as_bytes());
    let second = selpg(&["-s2", "-e3", "-l13"], input.as_bytes());
    assert_eq!(first.stdout, second.stdout);
    assert!(!first.stdout.is_empty());
}

#[test]
fn test_exit_codes() {
    assert_fails(&[], 1);
    assert_fails(&["-s1"], 1);
    assert_fails(&["-x1", "-e1"], 2);
    assert_fails(&["--", "-s1", "-e1"], 2);
    assert_fails(&["-s0", "-e1"], 3);
    assert_fails(&["-s1", "-x1"], 4);
    assert_fails(&["-s3", "-e2"], 5);
    assert_fails(&["-s1", "-e1", "-lzero"], 6);
    assert_fails(&["-s1", "-e1", "-form"], 7);
    assert_fails(&["-s1", "-e1", "-d"], 8);
    assert_fails(&["-s1", "-e1", "-q"], 9);
    assert_fails(&["-s1", "-e1", "-l1"], 88);
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_file_name() {
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(OsStr::from_bytes(b"\xffpages.txt"));
    std::fs::write(&path, numbered_lines(4)).unwrap();

    let output = selpg_with_env(
        &[OsStr::new("-s2"), OsStr::new("-e2"), OsStr::new("-l2"), path.as_os_str()],
        b"",
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(output.stdout, b"line 3\nline 4\n");
}

#[test]
fn test_help_and_version() {
    let help = selpg(&["--help"], b"");
    assert!(help.status.success());
    assert!(String::from_utf8_lossy(&help.stdout).contains("-sstart_page -eend_page"));

    let version = selpg(&["--version"], b"");
    assert!(version.status.success());
    assert!(String::from_utf8_lossy(&version.stdout).starts_with("selpg "));
}

#[test]
fn test_missing_end_page_argument() {
    let output = selpg(&["-s1", "input.txt"], b"");
    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("2nd arg should be -eend_page"));
}

#[test]
fn test_unreadable_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    assert_fails(&["-s1", "-e1", missing.to_str().unwrap()], 10);
}

#[test]
fn test_print_command_cannot_start() {
    let output = selpg_with_env(
        &["-s1", "-e1", "-dlp0"],
        b"text\n",
        &[("SELPG_PRINT_CMD", "selpg-no-such-print-command")],
    );
    assert_eq!(output.status.code(), Some(13));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output)
        .contains("could not open pipe to \"selpg-no-such-print-command -dlp0\""));
}

#[cfg(unix)]
fn write_print_script(dir: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-lp");
    std::fs::write(&script, "#!/bin/sh\nprintf '[%s]\\n' \"$1\"\ncat\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script.to_str().unwrap().to_string()
}

#[cfg(unix)]
#[test]
fn test_output_goes_only_to_print_command() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_print_script(dir.path());

    let output = selpg_with_env(
        &["-s2", "-e2", "-l2", "-dlp0"],
        numbered_lines(6).as_bytes(),
        &[("SELPG_PRINT_CMD", script.as_str())],
    );
    assert!(output.status.success());
    // The script inherits stdout, so everything there came through it
    assert_eq!(
        String::from_utf8(output.stdout.clone()).unwrap(),
        "[-dlp0]\nline 3\nline 4\n"
    );
    assert!(stderr(&output).contains("done"));
}
