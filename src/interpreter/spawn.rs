use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Result of one external invocation: the exit code and, when capture was
/// requested, the child's stdout bytes.
#[derive(Debug, Default)]
pub struct SpawnOutcome {
    pub code: i32,
    pub stdout: Vec<u8>,
}

impl SpawnOutcome {
    fn failed() -> Self {
        Self {
            code: 127,
            stdout: Vec::new(),
        }
    }
}

/// Try `argv[0]` against each prefix left to right; the first invocation
/// that exits zero wins. When every prefix fails, the last outcome is
/// returned, non-zero exit code included.
pub fn spawn(
    prefixes: &[PathBuf],
    argv: &[String],
    stdin_bytes: Option<&[u8]>,
    capture_stdout: bool,
) -> SpawnOutcome {
    let mut last = SpawnOutcome::failed();
    for prefix in prefixes {
        match spawn_in(prefix, argv, stdin_bytes, capture_stdout) {
            Ok(outcome) => {
                if outcome.code == 0 {
                    return outcome;
                }
                last = outcome;
            }
            Err(_) => last = SpawnOutcome::failed(),
        }
    }
    last
}

/// One fork/exec/wait against a single prefix directory, with the child's
/// standard streams wired as requested. An empty prefix means the current
/// directory.
pub fn spawn_in(
    prefix: &Path,
    argv: &[String],
    stdin_bytes: Option<&[u8]>,
    capture_stdout: bool,
) -> io::Result<SpawnOutcome> {
    let Some(name) = argv.first() else {
        return Ok(SpawnOutcome::failed());
    };
    let program = if prefix.as_os_str().is_empty() {
        Path::new(".").join(name)
    } else {
        prefix.join(name)
    };

    let mut command = Command::new(program);
    command.args(&argv[1..]);
    command.stdin(if stdin_bytes.is_some() {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    if capture_stdout {
        command.stdout(Stdio::piped());
    }

    let mut child = command.spawn()?;
    if let Some(bytes) = stdin_bytes {
        if let Some(mut stdin) = child.stdin.take() {
            // dropping the handle closes the pipe so the child sees EOF
            stdin.write_all(bytes)?;
        }
    }
    let output = child.wait_with_output()?;
    Ok(SpawnOutcome {
        code: output.status.code().unwrap_or(1),
        stdout: output.stdout,
    })
}
