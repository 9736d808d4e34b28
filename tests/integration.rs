//! End-to-end integration tests for the grading harness
//!
//! These tests verify the complete grading workflow by:
//! 1. Standing up a scratch origin server and a mock subject proxy
//! 2. Running the harness binary against them
//! 3. Verifying verdicts, diagnostics, scores, and subject teardown

use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::process::Command;

fn harness_bin() -> &'static str {
    env!("CARGO_BIN_EXE_proxy-grader")
}

fn mock_proxy_bin() -> &'static str {
    env!("CARGO_BIN_EXE_mock_proxy")
}

/// Write an executable shell script fixture
fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write script");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
    }

    path
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("harness.toml");
    std::fs::write(&path, contents).expect("write config");
    path
}

/// Reserve a port for the subject to listen on
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}

/// Serve a fixed body to every GET on a fresh port; returns the port
async fn spawn_origin(body: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind origin");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                continue;
            };

            // Read the request head, then answer and close
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    port
}

async fn run_harness(args: &[&str]) -> Output {
    Command::new(harness_bin())
        .args(args)
        .output()
        .await
        .expect("run harness")
}

#[test]
fn test_missing_arguments_exit_with_code_2() {
    let output = std::process::Command::new(harness_bin())
        .output()
        .expect("run harness");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_non_executable_subject_exits_with_usage() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_binary = dir.path().join("proxy.txt");
    std::fs::write(&not_a_binary, "not code").unwrap();

    let output = std::process::Command::new(harness_bin())
        .arg(&not_a_binary)
        .arg("8888")
        .output()
        .expect("run harness");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"), "stderr was: {stderr}");
}

#[tokio::test]
async fn test_subject_is_signaled_and_reaped_after_run() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("subject.pid");

    // Subject that records its pid and then just sits there
    let subject = write_script(
        dir.path(),
        "subject.sh",
        &format!("#!/bin/sh\necho $$ > {}\nexec sleep 30\n", pid_file.display()),
    );

    let config = write_config(
        dir.path(),
        "urls = []\n\n[timing]\nwarmup_secs = 0\ncooldown_secs = 0\n",
    );

    let output = run_harness(&[
        subject.to_str().unwrap(),
        "8888",
        "--config",
        config.to_str().unwrap(),
    ])
    .await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 of 0 tests passed."), "stdout was: {stdout}");
    assert!(stdout.contains("Base Score: 0/10"), "stdout was: {stdout}");

    // The subject must not outlive the harness
    let pid: i32 = std::fs::read_to_string(&pid_file)
        .expect("pid file written")
        .trim()
        .parse()
        .expect("numeric pid");

    #[cfg(unix)]
    {
        let rc = unsafe { libc::kill(pid, 0) };
        assert_ne!(rc, 0, "subject pid {pid} still alive after the run");
    }
}

#[tokio::test]
async fn test_identical_responses_score_eight() {
    let dir = tempfile::tempdir().unwrap();
    let origin_port = spawn_origin("hello grader\n").await;
    let proxy_port = free_port();

    let config = write_config(
        dir.path(),
        &format!(
            "urls = [\"http://127.0.0.1:{origin_port}/index.html\"]\n\n\
             [fetch]\nproxy_host = \"127.0.0.1\"\n\n\
             [timing]\nwarmup_secs = 1\ncooldown_secs = 0\n"
        ),
    );

    let output = run_harness(&[
        mock_proxy_bin(),
        &proxy_port.to_string(),
        "--config",
        config.to_str().unwrap(),
    ])
    .await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Binary:"), "stdout was: {stdout}");
    assert!(
        stdout.contains(&format!("Running on port {proxy_port}")),
        "stdout was: {stdout}"
    );
    assert!(
        stdout.contains("Basic HTTP transactions: 1 of 1 tests passed"),
        "stdout was: {stdout}"
    );
    assert!(stdout.contains("Base Score: 8/10"), "stdout was: {stdout}");
}

#[tokio::test]
async fn test_unreachable_proxy_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();

    // Subject that never listens; every proxied fetch is refused
    let subject = write_script(dir.path(), "subject.sh", "#!/bin/sh\nexec sleep 30\n");
    let proxy_port = free_port();

    let config = write_config(
        dir.path(),
        "urls = [\"http://127.0.0.1:9/\"]\n\n\
         [fetch]\nproxy_host = \"127.0.0.1\"\n\n\
         [timing]\nwarmup_secs = 0\ncooldown_secs = 0\n",
    );

    let output = run_harness(&[
        subject.to_str().unwrap(),
        &proxy_port.to_string(),
        "--config",
        config.to_str().unwrap(),
    ])
    .await;

    assert!(output.status.success(), "test failures are not a harness error");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("No data received for http://127.0.0.1:9/"),
        "stdout was: {stdout}"
    );
    assert!(
        stdout.contains("Basic HTTP transactions: 0 of 1 tests passed"),
        "stdout was: {stdout}"
    );
    assert!(stdout.contains("Base Score: 0/10"), "stdout was: {stdout}");
}

#[tokio::test]
async fn test_log_capture_mode_writes_both_artifacts_and_no_score() {
    let dir = tempfile::tempdir().unwrap();
    let origin_port = spawn_origin("captured body\n").await;
    let proxy_port = free_port();

    let proxy_log = dir.path().join("log1.txt");
    let direct_log = dir.path().join("log2.txt");

    let config = write_config(
        dir.path(),
        &format!(
            "urls = [\"http://127.0.0.1:{origin_port}/\"]\n\n\
             [fetch]\nproxy_host = \"127.0.0.1\"\n\n\
             [compare]\nmode = \"log_capture\"\n\
             proxy_log = \"{}\"\ndirect_log = \"{}\"\n\n\
             [timing]\nwarmup_secs = 1\ncooldown_secs = 0\n",
            proxy_log.display(),
            direct_log.display()
        ),
    );

    let output = run_harness(&[
        mock_proxy_bin(),
        &proxy_port.to_string(),
        "--config",
        config.to_str().unwrap(),
    ])
    .await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Base Score"), "capture mode must not score");

    let proxy_side = std::fs::read_to_string(&proxy_log).expect("proxy artifact");
    let direct_side = std::fs::read_to_string(&direct_log).expect("direct artifact");
    assert!(proxy_side.contains("captured body"), "got: {proxy_side}");
    assert!(direct_side.contains("captured body"), "got: {direct_side}");
}

#[tokio::test]
async fn test_spawn_failure_prints_no_summary() {
    let dir = tempfile::tempdir().unwrap();

    // Executable bit set, but the interpreter line is garbage, so exec fails
    let subject = write_script(dir.path(), "subject.sh", "#!/nonexistent/interp\n");

    let config = write_config(
        dir.path(),
        "urls = []\n\n[timing]\nwarmup_secs = 0\ncooldown_secs = 0\n",
    );

    let output = run_harness(&[
        subject.to_str().unwrap(),
        "8888",
        "--config",
        config.to_str().unwrap(),
    ])
    .await;

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Base Score"), "stdout was: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to launch subject binary"),
        "stderr was: {stderr}"
    );
}
