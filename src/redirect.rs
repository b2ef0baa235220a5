use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;

use log::debug;

use crate::error::RedirectError;

pub fn open_input(name: &str) -> Result<File, RedirectError> {
	debug!("redirecting input from {}", name);
	File::open(name).map_err(|source| RedirectError::NotFound { path: name.to_owned(), source: source })
}

pub fn open_output(name: &str) -> Result<File, RedirectError> {
	debug!("redirecting output to {}", name);
	OpenOptions::new()
		.write(true)
		.create(true)
		.truncate(true)
		.mode(0o666)
		.open(name)
		.map_err(|source| RedirectError::Open { path: name.to_owned(), source: source })
}
