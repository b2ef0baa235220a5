use std::{ffi, io};

use nix::unistd::Pid;
use thiserror::Error;

use crate::queue::QueueFull;

/// Malformed pipe or redirection placement, found before anything is spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
	#[error("no command before '|'")]
	LeadingPipe,
	#[error("no command after '|'")]
	TrailingPipe,
	#[error("empty command between pipes")]
	EmptySegment,
	#[error("no command before '{0}'")]
	MissingCommand(String),
	#[error("missing file name after '{0}'")]
	MissingFilename(char),
	#[error("input redirection is only allowed on the first command")]
	MisplacedInput,
	#[error("output redirection is only allowed on the last command")]
	MisplacedOutput,
	#[error("unexpected '{0}' after a redirection")]
	TrailingToken(String),
	#[error("more than one '{0}' redirection")]
	DuplicateRedirection(char),
	#[error("cd cannot be part of a pipeline")]
	CdInPipeline,
	#[error("cd cannot be redirected")]
	CdRedirected,
}

#[derive(Debug, Error)]
pub enum RedirectError {
	#[error("{path}: no such file or directory")]
	NotFound { path: String, source: io::Error },
	#[error("{path}: cannot open file for output redirection")]
	Open { path: String, source: io::Error },
}

#[derive(Debug, Error)]
pub enum CdError {
	#[error("too many arguments")]
	TooManyArguments,
	#[error("HOME not set")]
	NoHome,
	#[error("{dir}: no such file or directory")]
	NoSuchDirectory { dir: String, source: nix::Error },
}

#[derive(Debug, Error)]
pub enum ShellError {
	#[error("syntax error: {0}")]
	Syntax(#[from] SyntaxError),
	#[error("environment variable {0} does not exist")]
	UnknownVariable(String),
	#[error(transparent)]
	QueueFull(#[from] QueueFull),
	#[error(transparent)]
	Redirect(#[from] RedirectError),
	#[error("cd: {0}")]
	Cd(#[from] CdError),
	#[error("argument contains a nul byte: {0}")]
	Nul(#[from] ffi::NulError),
	#[error("{op} failed: {source}")]
	Os { op: &'static str, source: nix::Error },
	#[error("{op} failed: {source}")]
	Io { op: &'static str, source: io::Error },
	#[error("waiting for process {pid} failed: {source}")]
	Wait { pid: Pid, source: nix::Error },
}

impl ShellError {
	/// Tags a failed system call with the operation name, for use with `map_err`.
	pub fn os(op: &'static str) -> impl FnOnce(nix::Error) -> ShellError {
		move |source| ShellError::Os { op: op, source: source }
	}

	pub fn io(op: &'static str) -> impl FnOnce(io::Error) -> ShellError {
		move |source| ShellError::Io { op: op, source: source }
	}
}
