use std::ffi::{CString, NulError};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectType { Input, Output }

impl RedirectType {
	pub fn symbol(self) -> char {
		match self {
			RedirectType::Input => '<',
			RedirectType::Output => '>',
		}
	}
}

/// A raw token seen through its role in the pipeline.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token<'a> {
	Pipe,
	/// `<name` or `>name`; the name is empty when nothing follows the operator.
	Redirect(RedirectType, &'a str),
	Word(&'a str),
}

impl<'a> Token<'a> {
	pub fn classify(raw: &'a str) -> Token<'a> {
		if raw == "|" {
			Token::Pipe
		} else if let Some(name) = raw.strip_prefix('<') {
			Token::Redirect(RedirectType::Input, name)
		} else if let Some(name) = raw.strip_prefix('>') {
			Token::Redirect(RedirectType::Output, name)
		} else {
			Token::Word(raw)
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Command {
	pub name: String,
	pub arguments: Vec<String>,
}

impl Command {
	pub fn from_words(mut words: Vec<String>) -> Option<Command> {
		if words.is_empty() {
			return None;
		}
		let name = words.remove(0);
		Some(Command { name: name, arguments: words })
	}

	/// Program name followed by the arguments, ready for `execvp`.
	pub fn argv(&self) -> Result<Vec<CString>, NulError> {
		let mut argv = Vec::with_capacity(self.arguments.len() + 1);
		argv.push(CString::new(self.name.as_str())?);
		for arg in &self.arguments {
			argv.push(CString::new(arg.as_str())?);
		}
		Ok(argv)
	}
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pipeline {
	pub commands: Vec<Command>,
	pub input: Option<String>,
	pub output: Option<String>,
}

impl Pipeline {
	pub fn pipe_count(&self) -> usize {
		self.commands.len().saturating_sub(1)
	}

	pub fn is_redirected(&self) -> bool {
		self.input.is_some() || self.output.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_special_tokens() {
		assert_eq!(Token::classify("|"), Token::Pipe);
		assert_eq!(Token::classify("<in.txt"), Token::Redirect(RedirectType::Input, "in.txt"));
		assert_eq!(Token::classify(">"), Token::Redirect(RedirectType::Output, ""));
		assert_eq!(Token::classify("ls"), Token::Word("ls"));
		assert_eq!(Token::classify("a|b"), Token::Word("a|b"));
	}

	#[test]
	fn argv_starts_with_program_name() {
		let command = Command::from_words(vec!["ls".to_string(), "-l".to_string()]).unwrap();
		let argv = command.argv().unwrap();
		assert_eq!(argv, vec![CString::new("ls").unwrap(), CString::new("-l").unwrap()]);
		assert!(Command::from_words(vec![]).is_none());
	}
}
