use std::env;
use std::ffi::CString;
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::AsRawFd;

use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd;

use crate::builtin;
use crate::error::ShellError;
use crate::fd::{PipeSet, SavedStdio};
use crate::job::{Job, JobBuilder};
use crate::parser;
use crate::redirect;
use crate::types::*;
use crate::validate;

fn flush_stdio() {
	let _ = io::stdout().flush();
	let _ = io::stderr().flush();
}

/// Terminates a child whose setup or exec failed. Never returns into the
/// parent's logic.
fn child_exit(message: &str) -> ! {
	let _ = writeln!(&mut io::stderr(), "ubash: {}", message);
	unsafe { libc::_exit(libc::EXIT_FAILURE) }
}

/// Restores the default SIGPIPE disposition, which the Rust runtime ignores
/// and `execvp` would otherwise pass on.
fn reset_signals() -> nix::Result<()> {
	// Safety: SIG_DFL installs no handler code.
	unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }?;
	Ok(())
}

fn exec_command(argv: &[CString]) -> ! {
	let name = argv[0].to_string_lossy().into_owned();
	if let Err(e) = reset_signals() {
		child_exit(&format!("{}: resetting signals: {}", name, e));
	}
	let e = match unistd::execvp(&argv[0], argv) {
		Err(e) => e,
		Ok(never) => match never {},
	};
	if e == Errno::ENOENT {
		child_exit(&format!("{}: command not found", name))
	} else {
		child_exit(&format!("{}: {}", name, e))
	}
}

/// Runs one external command in a child, with optional replacements for its
/// stdin/stdout, and waits for it.
pub fn run_single(command: &Command, input: Option<&File>, output: Option<&File>) -> Result<Job, ShellError> {
	let argv = command.argv()?;
	flush_stdio();

	let mut job_builder = JobBuilder::new(1);
	match job_builder.push_fork().map_err(ShellError::os("fork"))? {
		unistd::ForkResult::Parent { .. } => {},
		unistd::ForkResult::Child => {
			if let Some(file) = input {
				if let Err(e) = unistd::dup2(file.as_raw_fd(), libc::STDIN_FILENO) {
					child_exit(&format!("redirecting input: {}", e));
				}
			}
			if let Some(file) = output {
				if let Err(e) = unistd::dup2(file.as_raw_fd(), libc::STDOUT_FILENO) {
					child_exit(&format!("redirecting output: {}", e));
				}
			}
			exec_command(&argv);
		},
	}

	let mut job = job_builder.build();
	job.wait_all()?;
	Ok(job)
}

fn wire_stage(stage: usize, last: usize, pipes: &PipeSet, output: Option<&File>) -> nix::Result<()> {
	if stage == last {
		if let Some(file) = output {
			unistd::dup2(file.as_raw_fd(), libc::STDOUT_FILENO)?;
		}
	} else {
		unistd::dup2(pipes.write_end(stage), libc::STDOUT_FILENO)?;
	}
	if stage > 0 {
		unistd::dup2(pipes.read_end(stage - 1), libc::STDIN_FILENO)?;
	}
	Ok(())
}

fn spawn_stages(argvs: &[Vec<CString>], pipes: &mut PipeSet, output: &mut Option<File>,
                job_builder: &mut JobBuilder) -> Result<(), ShellError> {
	let last = argvs.len() - 1;
	for (stage, argv) in argvs.iter().enumerate() {
		flush_stdio();
		match job_builder.push_fork().map_err(ShellError::os("fork"))? {
			unistd::ForkResult::Parent { .. } => {},
			unistd::ForkResult::Child => {
				let wired = wire_stage(stage, last, pipes, output.as_ref());
				pipes.close_all();
				drop(output.take());
				if let Err(e) = wired {
					child_exit(&format!("connecting pipeline stage {}: {}", stage, e));
				}
				exec_command(argv);
			},
		}
	}
	Ok(())
}

/// Runs a multi-stage pipeline: every stage is forked before any is waited
/// for, stages are chained through `pipeline.pipe_count()` pipes, and the
/// shell's stdin/stdout are back in place when this returns.
pub fn run_pipeline(pipeline: &Pipeline) -> Result<Job, ShellError> {
	let argvs = pipeline.commands.iter()
		.map(|command| command.argv())
		.collect::<Result<Vec<_>, _>>()?;

	flush_stdio();
	let saved = SavedStdio::save().map_err(ShellError::io("saving standard descriptors"))?;
	let mut pipes = PipeSet::new(pipeline.pipe_count()).map_err(ShellError::os("pipe"))?;

	if let Some(name) = &pipeline.input {
		let file = redirect::open_input(name)?;
		unistd::dup2(file.as_raw_fd(), libc::STDIN_FILENO).map_err(ShellError::os("dup2"))?;
	}
	let mut output = match &pipeline.output {
		Some(name) => Some(redirect::open_output(name)?),
		None => None,
	};

	debug!("spawning {} stages over {} pipes", argvs.len(), pipes.len());
	let mut job_builder = JobBuilder::new(argvs.len());
	let spawned = spawn_stages(&argvs, &mut pipes, &mut output, &mut job_builder);
	if spawned.is_err() && !job_builder.is_empty() {
		warn!("pipeline setup failed, reaping the stages already started");
	}
	drop(output);
	pipes.close_all();

	let mut job = job_builder.build();
	let waited = job.wait_all();
	saved.restore().map_err(ShellError::os("restoring standard descriptors"))?;
	spawned?;
	waited?;
	Ok(job)
}

/// Runs a parsed pipeline: builtins in-process, a single command through
/// `run_single`, anything longer through `run_pipeline`.
pub fn eval(pipeline: &Pipeline) -> Result<Job, ShellError> {
	if let [command] = pipeline.commands.as_slice() {
		if let Some(func) = builtin::match_builtin(&command.name) {
			func(&command.arguments)?;
			return Ok(Job::default());
		}
		let input = match &pipeline.input {
			Some(name) => Some(redirect::open_input(name)?),
			None => None,
		};
		let output = match &pipeline.output {
			Some(name) => Some(redirect::open_output(name)?),
			None => None,
		};
		return run_single(command, input.as_ref(), output.as_ref());
	}
	run_pipeline(pipeline)
}

/// Tokenizes, validates and runs one input line.
pub fn execute_line(line: &str, max_tokens: usize) -> Result<Job, ShellError> {
	let mut queue = parser::tokenize(line, max_tokens, |name| env::var(name).ok())?;
	if queue.is_empty() {
		return Ok(Job::default());
	}
	validate::validate(&queue)?;
	let pipes = queue.pipe_count();
	let pipeline = parser::build_pipeline(&mut queue)?;
	info!("running {} command(s) over {} pipe(s){}", pipeline.commands.len(), pipes,
		if pipeline.is_redirected() { " with redirection" } else { "" });
	debug!("{:?}", pipeline);
	eval(&pipeline)
}
