//! Terminal presentation: colours, the prompt and diagnostic lines.

use std::path::Path;

use nix::unistd::Pid;

use crate::error::ShellError;
use crate::job::Failure;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const LIGHT_BLUE: &str = "\x1b[94m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct Painter {
	color: bool,
}

impl Painter {
	pub fn new(color: bool) -> Painter {
		Painter { color: color }
	}

	fn paint(&self, code: &str, text: &str) -> String {
		if self.color {
			format!("{}{}{}", code, text, RESET)
		} else {
			text.to_string()
		}
	}

	pub fn prompt(&self, cwd: Option<&Path>, symbol: &str) -> String {
		match cwd {
			Some(cwd) => format!("{}{}", self.paint(GREEN, &cwd.display().to_string()), symbol),
			None => symbol.to_string(),
		}
	}

	pub fn error(&self, e: &ShellError) -> String {
		self.paint(RED, &format!("ubash: {}", e))
	}

	pub fn exit_report(&self, pid: Pid, failure: Failure) -> String {
		let text = match failure {
			Failure::Exited(code) => format!("process {} exited with status {}", pid, code),
			Failure::Signaled(signal) => format!("process {} killed by {}", pid, signal),
		};
		self.paint(LIGHT_BLUE, &text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::SyntaxError;
	use nix::sys::signal::Signal;

	#[test]
	fn plain_output_has_no_escapes() {
		let painter = Painter::new(false);
		assert_eq!(painter.prompt(Some(Path::new("/tmp")), "$ "), "/tmp$ ");
		assert_eq!(painter.prompt(None, "> "), "> ");
		assert_eq!(painter.error(&SyntaxError::LeadingPipe.into()), "ubash: syntax error: no command before '|'");
		assert_eq!(painter.exit_report(Pid::from_raw(42), Failure::Exited(2)), "process 42 exited with status 2");
		assert_eq!(painter.exit_report(Pid::from_raw(7), Failure::Signaled(Signal::SIGKILL)), "process 7 killed by SIGKILL");
	}

	#[test]
	fn coloured_output_is_wrapped() {
		let painter = Painter::new(true);
		assert_eq!(painter.prompt(Some(Path::new("/")), "$ "), "\x1b[32m/\x1b[0m$ ");
		assert!(painter.error(&SyntaxError::TrailingPipe.into()).starts_with(RED));
	}
}
