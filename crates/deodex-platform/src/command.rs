use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fmt;
use std::process::{Command as StdCommand, ExitStatus};

/// Builder around [`std::process::Command`] that keeps a printable form of
/// the invocation for logs and errors.
#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    line:  String,
}

/// Captured result of a finished command.
#[derive(Clone, Debug)]
pub struct Output {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool { self.status.success() }
}

impl Command {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let program = program.as_ref();
        Self {
            inner: StdCommand::new(program),
            line:  program.to_string_lossy().into_owned(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        let arg = arg.as_ref();
        self.line.push(' ');
        self.line.push_str(&arg.to_string_lossy());
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, |cmd, arg| cmd.arg(arg))
    }

    /// Run to completion, capturing stdout and stderr. A non-zero exit is
    /// not an error here; see [`Command::run`].
    pub fn output(mut self) -> Result<Output> {
        tracing::debug!(cmd = %self.line, "running");
        let output = self.inner.output().map_err(|source| Error::CommandFailed {
            cmd: self.line.clone(),
            source,
        })?;

        let output = Output {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        for line in output.stdout.lines().chain(output.stderr.lines()) {
            tracing::debug!(cmd = %self.line, "{line}");
        }
        Ok(output)
    }

    /// Run to completion and require a zero exit status.
    pub fn run(self) -> Result<Output> {
        let line = self.line.clone();
        let output = self.output()?;
        if !output.success() {
            return Err(Error::ExitStatus {
                cmd:    line,
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.line) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new() {
        let cmd = Command::new("zipalign");
        assert_eq!(cmd.to_string(), "zipalign");
    }

    #[test]
    fn test_command_args() {
        let cmd = Command::new("zipalign").arg("-c").arg("4").arg("app.apk");
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args.len(), 3);
        assert_eq!(cmd.to_string(), "zipalign -c 4 app.apk");
    }

    #[test]
    fn test_command_args_iter() {
        let cmd = Command::new("vdexExtractor").args(["-i", "a.vdex", "-o", "out"]);
        assert_eq!(cmd.inner.get_args().count(), 4);
    }

    #[test]
    fn test_command_arg_with_spaces() {
        let cmd = Command::new("echo").arg("hello world");
        assert_eq!(cmd.inner.get_args().count(), 1);
    }

    #[test]
    fn test_command_not_found() {
        let err = Command::new("nonexistent_binary_12345").run().unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_captured() {
        let output = Command::new("sh").args(["-c", "echo out; echo err >&2"]).run().unwrap();
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_nonzero_exit() {
        let err = Command::new("sh")
            .args(["-c", "echo broken vdex >&2; exit 3"])
            .run()
            .unwrap_err();
        match err {
            Error::ExitStatus { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr.trim(), "broken vdex");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_keeps_failure() {
        let output = Command::new("sh").args(["-c", "exit 1"]).output().unwrap();
        assert!(!output.success());
    }
}
