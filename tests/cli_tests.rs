use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `quickedit` with tool checks off and an isolated working directory
fn quickedit(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("quickedit").unwrap();
    cmd.current_dir(workdir.path())
        .env("QUICKEDIT_VERIFY_TOOLS", "false")
        .env("QUICKEDIT_SCRATCH_DIR", workdir.path().join("scratch"))
        .env("QUICKEDIT_LOG_LEVEL", "off")
        .env_remove("QUICKEDIT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let workdir = TempDir::new().unwrap();
    quickedit(&workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("trim"))
        .stdout(predicate::str::contains("jpegify"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_same_format_convert_prints_message() {
    let workdir = TempDir::new().unwrap();
    quickedit(&workdir)
        .args([
            "convert",
            "--url",
            "http://127.0.0.1:9/photo.png",
            "--content-type",
            "image/png",
            "--format",
            ".png",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Silly, you are converting from .png to .png.",
        ));
}

#[test]
fn test_trim_without_bounds_prints_message() {
    let workdir = TempDir::new().unwrap();
    quickedit(&workdir)
        .args([
            "trim",
            "--url",
            "http://127.0.0.1:9/clip.mp4",
            "--content-type",
            "video/mp4",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "You must provide a start or end time to trim the video.",
        ))
        .stderr(predicate::str::contains("[ephemeral]"));
}

#[test]
fn test_fetch_failure_prints_generic_message() {
    let workdir = TempDir::new().unwrap();
    quickedit(&workdir)
        .args([
            "jpegify",
            "--url",
            "http://127.0.0.1:9/cat.png",
            "--content-type",
            "image/png",
            "--strength",
            "80",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "An error occurred while processing the file.",
        ))
        .stderr(predicate::str::contains("127.0.0.1").not());

    let leftovers = std::fs::read_dir(workdir.path().join("scratch"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[test]
fn test_missing_tool_is_fatal() {
    let workdir = TempDir::new().unwrap();
    quickedit(&workdir)
        .env("QUICKEDIT_VERIFY_TOOLS", "true")
        .env("QUICKEDIT_FFMPEG_PATH", "/nonexistent/quickedit/ffmpeg")
        .args([
            "convert",
            "--url",
            "http://127.0.0.1:9/clip.mp4",
            "--content-type",
            "video/mp4",
            "--format",
            ".gif",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ffmpeg not found"));
}

#[test]
fn test_invalid_config_file_is_fatal() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(
        workdir.path().join("quickedit.toml"),
        "[quickedit]\nffmpeg_log_level = \"loud\"\n",
    )
    .unwrap();

    quickedit(&workdir)
        .args([
            "trim",
            "--url",
            "http://127.0.0.1:9/clip.mp4",
            "--content-type",
            "video/mp4",
            "--start",
            "5s",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ffmpeg_log_level"));
}

#[test]
fn test_batch_reports_each_reply() {
    let workdir = TempDir::new().unwrap();
    let batch = workdir.path().join("requests.yaml");
    std::fs::write(
        &batch,
        r#"
- operation: convert
  attachment:
    url: http://127.0.0.1:9/photo.png
    filename: photo.png
    content_type: image/png
  output_format: .png
- operation: convert
  attachment:
    url: http://127.0.0.1:9/clip.mp4
    filename: clip.mp4
    content_type: video/mp4
  output_format: .xyz
"#,
    )
    .unwrap();

    quickedit(&workdir)
        .args(["batch", "--file"])
        .arg(&batch)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Silly, you are converting"))
        .stderr(predicate::str::contains("Unsupported conversion type."));
}
