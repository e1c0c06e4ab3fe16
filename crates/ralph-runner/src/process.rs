//! The Subprocess Supervisor: launches one child per invocation, streams its
//! stdout/stderr concurrently to memory and an optional tee file, and
//! enforces a wall-clock timeout by killing the child.

use ralph_utils::error::RunnerError;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Result of one subprocess invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Invoke `argv[0]` with `argv[1..]`, capturing stdout/stderr and, if
/// `tee_path` is given, tee-ing each line (interleaved, mutex-guarded) to
/// that file as it is produced. `tee_path` is truncated before the child
/// starts so each iteration gets a fresh live log.
pub fn invoke(
    agent_name: &str,
    argv: &[String],
    timeout: Duration,
    tee_path: Option<&Path>,
) -> Result<ProcessOutput, RunnerError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| RunnerError::SpawnFailed {
            agent: agent_name.to_string(),
            source: std::io::Error::other("empty argv"),
        })?;

    let tee_file = match tee_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::File::create(path).map_err(|source| RunnerError::SpawnFailed {
                agent: agent_name.to_string(),
                source,
            })?;
            Some(Arc::new(Mutex::new(file)))
        }
        None => None,
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child: Child = command.spawn().map_err(|source| RunnerError::SpawnFailed {
        agent: agent_name.to_string(),
        source,
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::StreamCaptureFailed {
            agent: agent_name.to_string(),
        })?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::StreamCaptureFailed {
            agent: agent_name.to_string(),
        })?;

    let stdout_buf = Arc::new(Mutex::new(String::new()));
    let stderr_buf = Arc::new(Mutex::new(String::new()));

    let stdout_thread = spawn_drainer(stdout, stdout_buf.clone(), tee_file.clone());
    let stderr_thread = spawn_drainer(stderr, stderr_buf.clone(), tee_file.clone());

    let start = Instant::now();
    let timed_out = loop {
        match child.try_wait() {
            Ok(Some(_status)) => break false,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child.id());
                    let _ = child.wait();
                    break true;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(_) => break false,
        }
    };

    let exit_code = if timed_out {
        -1
    } else {
        child
            .wait()
            .ok()
            .and_then(|status| status.code())
            .unwrap_or(-1)
    };

    let _ = stdout_thread.join();
    let _ = stderr_thread.join();

    Ok(ProcessOutput {
        stdout: Arc::try_unwrap(stdout_buf)
            .map(|m| m.into_inner().unwrap_or_default())
            .unwrap_or_default(),
        stderr: Arc::try_unwrap(stderr_buf)
            .map(|m| m.into_inner().unwrap_or_default())
            .unwrap_or_default(),
        exit_code,
        timed_out,
    })
}

fn spawn_drainer(
    stream: impl std::io::Read + Send + 'static,
    buf: Arc<Mutex<String>>,
    tee_file: Option<Arc<Mutex<std::fs::File>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if let Ok(mut b) = buf.lock() {
                b.push_str(&line);
                b.push('\n');
            }
            if let Some(tee) = &tee_file {
                if let Ok(mut f) = tee.lock() {
                    let _ = writeln!(f, "{line}");
                    let _ = f.flush();
                }
            }
        }
    })
}

#[cfg(unix)]
fn kill_process(pid: u32) {
    unsafe {
        libc::kill(pid as i32, libc::SIGKILL);
    }
}

#[cfg(windows)]
fn kill_process(pid: u32) {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_TERMINATE, TerminateProcess};

    unsafe {
        if let Ok(handle) = OpenProcess(PROCESS_TERMINATE, false, pid) {
            let _ = TerminateProcess(handle, 1);
            let _ = CloseHandle(handle);
        }
    }
}

#[cfg(not(any(unix, windows)))]
fn kill_process(_pid: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn captures_stdout_and_exit_code() {
        let argv = vec!["echo".to_string(), "hello world".to_string()];
        let result = invoke("test", &argv, Duration::from_secs(5), None).unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("hello world"));
        assert!(result.success());
    }

    #[test]
    fn tees_output_to_file() {
        let dir = TempDir::new().unwrap();
        let tee = dir.path().join("live.log");
        let argv = vec!["echo".to_string(), "teed".to_string()];
        invoke("test", &argv, Duration::from_secs(5), Some(&tee)).unwrap();

        let content = std::fs::read_to_string(&tee).unwrap();
        assert!(content.contains("teed"));
    }

    #[test]
    fn nonzero_exit_is_captured() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()];
        let result = invoke("test", &argv, Duration::from_secs(5), None).unwrap();
        assert_eq!(result.exit_code, 7);
        assert!(!result.success());
    }

    #[test]
    fn timeout_kills_process_and_reports_timed_out() {
        let argv = vec!["sleep".to_string(), "5".to_string()];
        let result = invoke("test", &argv, Duration::from_millis(200), None).unwrap();
        assert!(result.timed_out);
        assert_eq!(result.exit_code, -1);
    }
}
