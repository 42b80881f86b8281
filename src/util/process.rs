//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            timeout: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion, capturing stdout and stderr.
    ///
    /// With a timeout set, the child is killed once the deadline passes and
    /// an error is returned. Only the direct child is terminated: processes
    /// it spawned (e.g. `make` under node-gyp) keep running, and the pipe
    /// readers are detached rather than joined so they cannot stall the
    /// caller.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        match self.timeout {
            None => child
                .wait_with_output()
                .with_context(|| format!("failed to wait for `{}`", self.program.display())),
            Some(timeout) => self.wait_with_deadline(child, timeout),
        }
    }

    fn wait_with_deadline(&self, mut child: Child, timeout: Duration) -> Result<Output> {
        // Drain pipes on their own threads so a chatty child can't block on a full pipe.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child
                .try_wait()
                .with_context(|| format!("failed to wait for `{}`", self.program.display()))?
            {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                // A grandchild may still hold the pipes; leave the readers detached.
                drop((stdout, stderr));
                bail!(
                    "`{}` did not finish within {}s",
                    self.display_command(),
                    timeout.as_secs()
                );
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok(Output {
            status,
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        })
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_process_builder() {
        let output = ProcessBuilder::new("echo").arg("hello").exec().unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.trim() == "hello" || stdout.contains("hello"));
    }

    #[test]
    #[cfg(unix)]
    fn test_exec_with_timeout_completes() {
        let output = ProcessBuilder::new("echo")
            .arg("done")
            .timeout(Some(Duration::from_secs(10)))
            .exec()
            .unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("done"));
    }

    #[test]
    #[cfg(unix)]
    fn test_exec_timeout_kills_child() {
        let err = ProcessBuilder::new("sleep")
            .arg("5")
            .timeout(Some(Duration::from_millis(200)))
            .exec()
            .unwrap_err();

        assert!(err.to_string().contains("did not finish"));
    }

    #[test]
    #[cfg(unix)]
    fn test_exec_timeout_returns_while_grandchild_holds_pipes() {
        let started = Instant::now();
        let err = ProcessBuilder::new("sh")
            .args(["-c", "sleep 5 & sleep 5"])
            .timeout(Some(Duration::from_millis(200)))
            .exec()
            .unwrap_err();

        assert!(err.to_string().contains("did not finish"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("node").args(["node-gyp.js", "configure", "--debug"]);

        assert_eq!(pb.display_command(), "node node-gyp.js configure --debug");
    }
}
