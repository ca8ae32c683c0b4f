//! Thin access layer for small kernel pseudo-files and the external
//! GPU vendor query tool. All fallible host I/O funnels through here so
//! the samplers can degrade uniformly.

use crate::error::{CoreError, Result};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Read a small pseudo-file (sysfs/procfs attribute) as a trimmed string.
pub fn read_trimmed<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

/// Read a pseudo-file holding a single integer (e.g. a millidegree
/// temperature input). Returns `None` on any read or parse failure.
pub fn read_i64<P: AsRef<Path>>(path: P) -> Option<i64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Run an external query tool and capture its stdout, killing it if it
/// does not finish before the deadline. Stdout is drained on a separate
/// thread while the child runs, so output larger than the pipe buffer
/// never stalls the child into the timeout.
pub fn run_query_tool(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| CoreError::query_tool("child stdout not captured"))?;
    let reader = thread::spawn(move || {
        let mut out = String::new();
        stdout.read_to_string(&mut out).map(|_| out)
    });

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait()? {
            Some(status) if status.success() => {
                let out = reader
                    .join()
                    .map_err(|_| CoreError::query_tool("stdout reader panicked"))??;
                return Ok(out);
            }
            Some(status) => {
                let _ = reader.join();
                return Err(CoreError::query_tool(format!(
                    "{} exited with {}",
                    program, status
                )));
            }
            None if Instant::now() >= deadline => {
                // Killing the child closes the pipe and unblocks the reader.
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader.join();
                return Err(CoreError::query_tool(format!(
                    "{} timed out after {:?}",
                    program, timeout
                )));
            }
            None => thread::sleep(Duration::from_millis(10)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_trimmed_strips_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  active  ").unwrap();
        assert_eq!(read_trimmed(file.path()).unwrap(), "active");
    }

    #[test]
    fn read_i64_parses_millidegrees() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "45000").unwrap();
        assert_eq!(read_i64(file.path()), Some(45000));
    }

    #[test]
    fn read_i64_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a number").unwrap();
        assert_eq!(read_i64(file.path()), None);
    }

    #[test]
    fn query_tool_captures_stdout() {
        let out = run_query_tool("echo", &["37, 54"], Duration::from_secs(5)).unwrap();
        assert_eq!(out.trim(), "37, 54");
    }

    #[test]
    fn query_tool_missing_program_is_an_error() {
        let err = run_query_tool(
            "/definitely/not/a/real/binary",
            &[],
            Duration::from_secs(1),
        );
        assert!(err.is_err());
    }

    #[test]
    fn query_tool_drains_output_larger_than_the_pipe_buffer() {
        // 256 KiB exceeds the default 64 KiB pipe buffer; the child must
        // not be stalled into the timeout while writing it.
        let start = Instant::now();
        let out = run_query_tool(
            "head",
            &["-c", "262144", "/dev/zero"],
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(out.len(), 262144);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn query_tool_kills_on_timeout() {
        let start = Instant::now();
        let err = run_query_tool("sleep", &["30"], Duration::from_millis(200));
        assert!(err.is_err());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
