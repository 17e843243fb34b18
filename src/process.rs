use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use crate::Result;
use crate::error::AppError;

/// Run an external command and return its stdout on success.
pub async fn run_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<String> {
    run_command_env(program, args, &[]).await
}

/// Run an external command with extra environment variables and return its
/// stdout on success.
pub async fn run_command_env<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    envs: &[(&str, &str)],
) -> Result<String> {
    debug!(
        "Running {} {}",
        program,
        args.iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    );
    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::MissingDependency {
                    program: program.to_string(),
                }
            } else {
                AppError::IoError(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match output.status.code() {
            Some(code) => format!("exit status {}: {}", code, stderr.trim()),
            None => format!("terminated by signal: {}", stderr.trim()),
        };
        return Err(AppError::Command {
            program: program.to_string(),
            message,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Resolve a program name to an executable path the way a shell would.
///
/// Names containing a path separator are checked as given, bare names are
/// looked up in every `PATH` entry.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Fail with a missing-dependency error for the first program that cannot be
/// resolved.
pub fn require_executables(programs: &[&str]) -> Result<()> {
    for program in programs {
        match find_executable(program) {
            Some(path) => debug!("Found {} at {}", program, path.display()),
            None => {
                return Err(AppError::MissingDependency {
                    program: program.to_string(),
                });
            }
        }
    }
    Ok(())
}
