//! Process module.
//!
//! This module contains helpers to run the external command through
//! which secrets are encoded before being stored.

use log::{debug, trace};
use std::{
    env,
    io::{self, prelude::*},
    process::{Command, Stdio},
    result,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot spawn process for command {1:?}")]
    SpawnProcessError(#[source] io::Error, String),
    #[error("cannot get standard input")]
    GetStdinError,
    #[error("cannot write data to standard input")]
    WriteStdinError(#[source] io::Error),
    #[error("cannot wait for command {1:?}")]
    WaitProcessError(#[source] io::Error, String),
    #[error("command {0:?} exited with status {1:?}: {2}")]
    ExitStatusError(String, Option<i32>, String),
}

pub type Result<T> = result::Result<T, Error>;

fn shell(cmd: &str) -> Command {
    let windows = cfg!(target_os = "windows")
        && env::var("MSYSTEM")
            .map(|env| !env.starts_with("MINGW"))
            .unwrap_or(true);

    if windows {
        let mut command = Command::new("cmd");
        command.args(&["/C", cmd]);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg("-c").arg(cmd);
        command
    }
}

/// Runs the given command, feeding it the input through its standard
/// input, and returns its raw standard output.
pub fn run(cmd: &str, input: &[u8]) -> Result<Vec<u8>> {
    debug!("running command: {}", cmd);

    let mut child = shell(cmd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| Error::SpawnProcessError(err, cmd.to_owned()))?;

    // stdin is closed once dropped, at the end of the statement
    child
        .stdin
        .take()
        .ok_or(Error::GetStdinError)?
        .write_all(input)
        .map_err(Error::WriteStdinError)?;

    let output = child
        .wait_with_output()
        .map_err(|err| Error::WaitProcessError(err, cmd.to_owned()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        return Err(Error::ExitStatusError(
            cmd.to_owned(),
            output.status.code(),
            stderr,
        ));
    }

    trace!("command output: {} bytes", output.stdout.len());
    Ok(output.stdout)
}
