//! Structural checks over a tokenized line, run before anything is opened or
//! spawned. Both checks only read the queue.

use crate::error::SyntaxError;
use crate::queue::TokenQueue;
use crate::types::{RedirectType, Token};

fn segments(queue: &TokenQueue) -> Vec<Vec<&str>> {
	let mut segments = vec![vec![]];
	for raw in queue.iter() {
		if raw == "|" {
			segments.push(vec![]);
		} else if let Some(segment) = segments.last_mut() {
			segment.push(raw.as_str());
		}
	}
	segments
}

/// Every segment after the first may end with `>file` and nothing else; `<`
/// never appears there.
pub fn check_segments(queue: &TokenQueue) -> Result<(), SyntaxError> {
	for segment in segments(queue).iter().skip(1) {
		for (i, &raw) in segment.iter().enumerate() {
			match Token::classify(raw) {
				Token::Redirect(RedirectType::Input, _) => return Err(SyntaxError::MisplacedInput),
				Token::Redirect(RedirectType::Output, name) => {
					if name.is_empty() {
						return Err(SyntaxError::MissingFilename('>'));
					}
					if let Some(&next) = segment.get(i + 1) {
						return Err(SyntaxError::TrailingToken(next.to_owned()));
					}
				},
				_ => {},
			}
		}
	}
	Ok(())
}

/// Whole-line rules: redirections trail their command, at most one of each
/// kind, `<` on the first stage and `>` on the last, and `cd` stands alone.
pub fn check_aggregate(queue: &TokenQueue) -> Result<(), SyntaxError> {
	let segments = segments(queue);
	let last = segments.len() - 1;
	let mut inputs = 0;
	let mut outputs = 0;

	for (s, segment) in segments.iter().enumerate() {
		let first = match segment.first() {
			Some(&first) => first,
			None => return Err(SyntaxError::EmptySegment),
		};
		if let Token::Redirect(..) = Token::classify(first) {
			return Err(SyntaxError::MissingCommand(first.to_owned()));
		}

		let mut redirected = false;
		for &raw in segment {
			match Token::classify(raw) {
				Token::Word(_) if redirected => return Err(SyntaxError::TrailingToken(raw.to_owned())),
				Token::Redirect(typ, name) => {
					redirected = true;
					if name.is_empty() {
						return Err(SyntaxError::MissingFilename(typ.symbol()));
					}
					match typ {
						RedirectType::Input => {
							inputs += 1;
							if s != 0 {
								return Err(SyntaxError::MisplacedInput);
							}
						},
						RedirectType::Output => {
							outputs += 1;
							if s != last {
								return Err(SyntaxError::MisplacedOutput);
							}
						},
					}
				},
				_ => {},
			}
		}

		if first == "cd" {
			if segments.len() > 1 {
				return Err(SyntaxError::CdInPipeline);
			}
			if redirected {
				return Err(SyntaxError::CdRedirected);
			}
		}
	}

	if inputs > 1 {
		return Err(SyntaxError::DuplicateRedirection('<'));
	}
	if outputs > 1 {
		return Err(SyntaxError::DuplicateRedirection('>'));
	}
	Ok(())
}

pub fn validate(queue: &TokenQueue) -> Result<(), SyntaxError> {
	check_segments(queue)?;
	check_aggregate(queue)
}
