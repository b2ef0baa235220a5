use std::mem;

use log::trace;

use crate::error::{ShellError, SyntaxError};
use crate::queue::TokenQueue;
use crate::types::*;

struct Tokenizer<'a> {
	line: &'a str,
	i: usize,
}

impl<'a> Tokenizer<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(&c) = self.line.as_bytes().get(self.i) {
			if !f(c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n' | b'\r')
	}

	fn is_letter(c: u8) -> bool {
		c != b'|' && !Tokenizer::is_whitespace(c)
	}

	fn peek(&self) -> Option<u8> {
		self.line.as_bytes().get(self.i).cloned()
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Tokenizer::is_whitespace);
	}

	// Word boundaries are ASCII, so the slice always lands on char boundaries.
	fn read_word(&mut self) -> &'a str {
		let orig = self.i;
		self.proceed_while(Tokenizer::is_letter);
		&self.line[orig .. self.i]
	}
}

fn expand<F>(word: &str, lookup: &F) -> Result<String, ShellError> where F: Fn(&str) -> Option<String> {
	match word.strip_prefix('$') {
		Some(name) => {
			let name = name.to_uppercase();
			lookup(&name).ok_or(ShellError::UnknownVariable(name))
		},
		None => Ok(word.to_owned()),
	}
}

/// Splits a line into words and `|` separators, expanding `$NAME` tokens
/// through `lookup`. An empty or blank line yields an empty queue.
pub fn tokenize<F>(line: &str, capacity: usize, lookup: F) -> Result<TokenQueue, ShellError>
	where F: Fn(&str) -> Option<String>
{
	let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
	let mut tokenizer = Tokenizer { line: line, i: 0 };
	let mut queue = TokenQueue::new(capacity);
	let mut segment_len = 0;

	loop {
		tokenizer.skip_whitespaces();
		match tokenizer.peek() {
			Some(b'|') => {
				tokenizer.i += 1;
				if queue.is_empty() {
					return Err(SyntaxError::LeadingPipe.into());
				}
				if segment_len == 0 {
					return Err(SyntaxError::EmptySegment.into());
				}
				queue.enqueue("|")?;
				segment_len = 0;
			},
			Some(_) => {
				let word = tokenizer.read_word();
				queue.enqueue(expand(word, &lookup)?)?;
				segment_len += 1;
			},
			None => {
				if !queue.is_empty() && segment_len == 0 {
					return Err(SyntaxError::TrailingPipe.into());
				}
				break;
			},
		}
	}
	trace!("tokenized {} tokens: {:?}", queue.len(), queue);
	Ok(queue)
}

/// Drains a validated queue into a `Pipeline`.
pub fn build_pipeline(queue: &mut TokenQueue) -> Result<Pipeline, SyntaxError> {
	let mut commands: Vec<Command> = vec![];
	let mut words: Vec<String> = vec![];
	let mut input = None;
	let mut output = None;

	while let Some(token) = queue.dequeue() {
		match Token::classify(&token) {
			Token::Pipe => match Command::from_words(mem::take(&mut words)) {
				Some(command) => commands.push(command),
				None => {
					queue.reset();
					return Err(SyntaxError::EmptySegment);
				},
			},
			Token::Redirect(RedirectType::Input, name) => input = Some(name.to_owned()),
			Token::Redirect(RedirectType::Output, name) => output = Some(name.to_owned()),
			Token::Word(word) => words.push(word.to_owned()),
		}
	}
	let last = Command::from_words(words).ok_or(SyntaxError::TrailingPipe)?;
	commands.push(last);

	Ok(Pipeline { commands: commands, input: input, output: output })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn no_env(_: &str) -> Option<String> {
		None
	}

	fn tokens(line: &str) -> Vec<String> {
		tokenize(line, 64, no_env).unwrap().iter().cloned().collect()
	}

	#[test]
	fn splits_on_whitespace_and_pipes() {
		assert_eq!(tokens("ls -l\t/tmp\n"), vec!["ls", "-l", "/tmp"]);
		assert_eq!(tokens("ls|wc -l"), vec!["ls", "|", "wc", "-l"]);
		assert_eq!(tokens("  cat <in.txt |  sort >out.txt  "), vec!["cat", "<in.txt", "|", "sort", ">out.txt"]);
		assert!(tokens("   ").is_empty());
	}

	#[test]
	fn rejects_dangling_pipes() {
		assert!(matches!(tokenize("|foo", 64, no_env), Err(ShellError::Syntax(SyntaxError::LeadingPipe))));
		assert!(matches!(tokenize("foo|", 64, no_env), Err(ShellError::Syntax(SyntaxError::TrailingPipe))));
		assert!(matches!(tokenize("foo | ", 64, no_env), Err(ShellError::Syntax(SyntaxError::TrailingPipe))));
		assert!(matches!(tokenize("foo || bar", 64, no_env), Err(ShellError::Syntax(SyntaxError::EmptySegment))));
	}

	#[test]
	fn expands_uppercased_variables() {
		let lookup = |name: &str| if name == "HOME" { Some("/home/me".to_string()) } else { None };
		let q = tokenize("cd $home", 64, lookup).unwrap();
		assert_eq!(q.iter().cloned().collect::<Vec<_>>(), vec!["cd", "/home/me"]);
		match tokenize("echo $NOPE", 64, lookup) {
			Err(ShellError::UnknownVariable(name)) => assert_eq!(name, "NOPE"),
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn enforces_queue_capacity() {
		assert!(matches!(tokenize("a b c", 2, no_env), Err(ShellError::QueueFull(_))));
	}

	#[test]
	fn builds_pipeline_with_redirections() {
		let mut q = tokenize("sort <in.txt | uniq -c | head >out.txt", 64, no_env).unwrap();
		let pipeline = build_pipeline(&mut q).unwrap();
		assert!(q.is_empty());
		assert_eq!(pipeline.commands.len(), 3);
		assert_eq!(pipeline.pipe_count(), 2);
		assert_eq!(pipeline.commands[1], Command { name: "uniq".to_string(), arguments: vec!["-c".to_string()] });
		assert_eq!(pipeline.input.as_deref(), Some("in.txt"));
		assert_eq!(pipeline.output.as_deref(), Some("out.txt"));
	}

	#[test]
	fn builds_single_command() {
		let mut q = tokenize("echo hello world", 64, no_env).unwrap();
		let pipeline = build_pipeline(&mut q).unwrap();
		assert_eq!(pipeline.commands, vec![Command {
			name: "echo".to_string(),
			arguments: vec!["hello".to_string(), "world".to_string()],
		}]);
		assert!(!pipeline.is_redirected());
	}
}
