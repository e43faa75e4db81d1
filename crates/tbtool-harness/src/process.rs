use anyhow::{Context, Result, bail};
use std::fmt;
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A child process that outlived its timeout and was killed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTimeout {
    pub program: String,
    pub timeout: Duration,
}

impl fmt::Display for CommandTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command timed out after {:?}: {}", self.timeout, self.program)
    }
}

impl std::error::Error for CommandTimeout {}

/// Reads a pipe to the end on its own thread so the child never blocks on a
/// full pipe buffer.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn collect(reader: JoinHandle<Vec<u8>>, program: &str) -> Result<Vec<u8>> {
    match reader.join() {
        Ok(buf) => Ok(buf),
        Err(_) => bail!("Output reader for {} panicked", program),
    }
}

/// Runs `cmd` to completion, capturing stdout and stderr.
///
/// The child is killed once `timeout` elapses and a [`CommandTimeout`] is
/// returned. A zero timeout disables the limit. A non-zero exit status is
/// returned in the [`Output`], not as an error.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output> {
    let program = cmd.get_program().to_string_lossy().to_string();
    tracing::debug!(program = %program, ?timeout, "spawning");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to execute command: {}", program))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if !timeout.is_zero() && start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Readers are left detached: a grandchild may still hold the pipes.
                    return Err(CommandTimeout { program, timeout }.into());
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => bail!("Error waiting for command {}: {}", program, e),
        }
    };

    Ok(Output {
        status,
        stdout: collect(stdout, &program)?,
        stderr: collect(stderr, &program)?,
    })
}

/// Trimmed stderr, or stdout when stderr is empty.
pub fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
