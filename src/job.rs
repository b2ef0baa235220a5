use log::debug;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::{self, Pid};

use crate::error::ShellError;

/// How a reaped process ended, when it did not exit cleanly.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Failure {
	Exited(i32),
	Signaled(Signal),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Pid,
	pub status: WaitStatus,
}

impl Process {
	pub fn failure(&self) -> Option<Failure> {
		match self.status {
			WaitStatus::Exited(_, 0) => None,
			WaitStatus::Exited(_, code) => Some(Failure::Exited(code)),
			// A writer whose reader finished early.
			WaitStatus::Signaled(_, Signal::SIGPIPE, _) => None,
			WaitStatus::Signaled(_, signal, _) => Some(Failure::Signaled(signal)),
			_ => None,
		}
	}

	fn is_reaped(&self) -> bool {
		matches!(self.status, WaitStatus::Exited(..) | WaitStatus::Signaled(..))
	}
}

/// The processes spawned for one line, in spawn order.
#[derive(Debug, Default)]
pub struct Job {
	pub processes: Vec<Process>,
}

impl Job {
	fn reap(pid: Pid) -> Result<WaitStatus, ShellError> {
		loop {
			match wait::waitpid(pid, None) {
				Ok(status @ WaitStatus::Exited(..)) | Ok(status @ WaitStatus::Signaled(..)) => return Ok(status),
				Ok(_) | Err(Errno::EINTR) => continue,
				Err(source) => return Err(ShellError::Wait { pid: pid, source: source }),
			}
		}
	}

	/// Blocks until every process is reaped, in spawn order. A failed wait
	/// does not stop the remaining processes from being reaped; the first
	/// such failure is returned.
	pub fn wait_all(&mut self) -> Result<(), ShellError> {
		let mut first_error = None;
		for pr in self.processes.iter_mut().filter(|pr| !pr.is_reaped()) {
			match Job::reap(pr.pid) {
				Ok(status) => {
					debug!("reaped {:?}", status);
					pr.status = status;
				},
				Err(e) => {
					first_error.get_or_insert(e);
				},
			}
		}
		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}

	pub fn failures(&self) -> impl Iterator<Item = (Pid, Failure)> + '_ {
		self.processes.iter().filter_map(|pr| pr.failure().map(|f| (pr.pid, f)))
	}
}

#[derive(Debug)]
pub struct JobBuilder {
	imp: Job,
}

impl JobBuilder {
	pub fn new(size_hint: usize) -> JobBuilder {
		JobBuilder {
			imp: Job { processes: Vec::with_capacity(size_hint) }
		}
	}

	/// Forks and, in the parent, records the child.
	pub fn push_fork(&mut self) -> nix::Result<unistd::ForkResult> {
		// Safety: the shell is single-threaded, and the child only rewires
		// descriptors before it execs or `_exit`s.
		let r = unsafe { unistd::fork() }?;
		if let unistd::ForkResult::Parent { child: pid } = r {
			debug!("forked process {}", pid);
			self.imp.processes.push(Process { pid: pid, status: WaitStatus::StillAlive });
		}
		Ok(r)
	}

	pub fn is_empty(&self) -> bool {
		self.imp.processes.is_empty()
	}

	pub fn build(self) -> Job {
		self.imp
	}
}
