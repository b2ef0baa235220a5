//! Owned descriptors for one pipeline run: the pipes between stages and the
//! shell's own stdin/stdout saved across redirection.

use std::io::{self, Write};
use std::os::fd::{AsFd, AsRawFd, OwnedFd, RawFd};

use log::{debug, warn};
use nix::fcntl::OFlag;
use nix::unistd;

/// `count` pipes, all created before the first fork. Every end is closed
/// exactly once, either by `close_all` or on drop.
#[derive(Debug)]
pub struct PipeSet {
	pipes: Vec<(OwnedFd, OwnedFd)>,
}

impl PipeSet {
	pub fn new(count: usize) -> nix::Result<PipeSet> {
		let mut pipes = Vec::with_capacity(count);
		for _ in 0 .. count {
			pipes.push(unistd::pipe2(OFlag::O_CLOEXEC)?);
		}
		debug!("created {} pipes", count);
		Ok(PipeSet { pipes: pipes })
	}

	pub fn len(&self) -> usize {
		self.pipes.len()
	}

	pub fn read_end(&self, i: usize) -> RawFd {
		self.pipes[i].0.as_raw_fd()
	}

	pub fn write_end(&self, i: usize) -> RawFd {
		self.pipes[i].1.as_raw_fd()
	}

	pub fn close_all(&mut self) {
		self.pipes.clear();
	}
}

/// Duplicates of the shell's stdin/stdout. Restores them onto 0/1 when
/// `restore` is called, or on drop if a run bails out early.
#[derive(Debug)]
pub struct SavedStdio {
	stdin: OwnedFd,
	stdout: OwnedFd,
	restored: bool,
}

impl SavedStdio {
	pub fn save() -> io::Result<SavedStdio> {
		let stdin = io::stdin().as_fd().try_clone_to_owned()?;
		let stdout = io::stdout().as_fd().try_clone_to_owned()?;
		Ok(SavedStdio { stdin: stdin, stdout: stdout, restored: false })
	}

	fn put_back(&self) -> nix::Result<()> {
		let _ = io::stdout().flush();
		unistd::dup2(self.stdin.as_raw_fd(), libc::STDIN_FILENO)?;
		unistd::dup2(self.stdout.as_raw_fd(), libc::STDOUT_FILENO)?;
		Ok(())
	}

	pub fn restore(mut self) -> nix::Result<()> {
		self.restored = true;
		self.put_back()
	}
}

impl Drop for SavedStdio {
	fn drop(&mut self) {
		if !self.restored {
			if let Err(e) = self.put_back() {
				warn!("could not restore standard descriptors: {}", e);
			}
		}
	}
}
