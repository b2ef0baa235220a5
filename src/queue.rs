use std::collections::VecDeque;
use std::collections::vec_deque;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("too many tokens on one line (limit {capacity})")]
pub struct QueueFull {
	pub capacity: usize,
}

/// FIFO of the tokens of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenQueue {
	tokens: VecDeque<String>,
	capacity: usize,
}

impl TokenQueue {
	pub fn new(capacity: usize) -> TokenQueue {
		TokenQueue { tokens: VecDeque::with_capacity(capacity), capacity: capacity }
	}

	pub fn enqueue<S: Into<String>>(&mut self, token: S) -> Result<(), QueueFull> {
		if self.tokens.len() >= self.capacity {
			return Err(QueueFull { capacity: self.capacity });
		}
		self.tokens.push_back(token.into());
		Ok(())
	}

	pub fn dequeue(&mut self) -> Option<String> {
		self.tokens.pop_front()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn iter(&self) -> vec_deque::Iter<'_, String> {
		self.tokens.iter()
	}

	pub fn pipe_count(&self) -> usize {
		self.tokens.iter().filter(|t| *t == "|").count()
	}

	pub fn reset(&mut self) {
		self.tokens.clear();
	}
}
