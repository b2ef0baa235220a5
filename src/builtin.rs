use std::env;

use log::debug;
use nix::unistd;

use crate::error::{CdError, ShellError};

fn home() -> Result<String, CdError> {
	env::var("HOME").map_err(|_| CdError::NoHome)
}

pub fn builtin_cd(arguments: &[String]) -> Result<(), ShellError> {
	let dir = match arguments {
		[] => home()?,
		[dir] if dir == "-" || dir == "~" => home()?,
		[dir] => dir.clone(),
		_ => return Err(CdError::TooManyArguments.into()),
	};
	debug!("changing directory to {}", dir);
	unistd::chdir(dir.as_str()).map_err(|source| CdError::NoSuchDirectory { dir: dir.clone(), source: source })?;
	Ok(())
}

pub fn match_builtin(name: &str) -> Option<fn(&[String]) -> Result<(), ShellError>> {
	match name {
		"cd" => Some(builtin_cd),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cd_is_the_only_builtin() {
		assert!(match_builtin("cd").is_some());
		assert!(match_builtin("ls").is_none());
	}

	#[test]
	fn cd_rejects_extra_arguments_before_touching_the_filesystem() {
		let before = env::current_dir().unwrap();
		let r = builtin_cd(&["/".to_string(), "/tmp".to_string()]);
		assert!(matches!(r, Err(ShellError::Cd(CdError::TooManyArguments))));
		assert_eq!(env::current_dir().unwrap(), before);
	}

	#[test]
	fn cd_into_missing_directory_fails() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("missing").to_str().unwrap().to_string();
		match builtin_cd(&[missing.clone()]) {
			Err(ShellError::Cd(CdError::NoSuchDirectory { dir, .. })) => assert_eq!(dir, missing),
			other => panic!("unexpected {:?}", other),
		}
	}
}
