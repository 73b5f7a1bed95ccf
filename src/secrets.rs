use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
	sync::Mutex,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
	#[error("secret store I/O failed: {0}")]
	Io(#[from] std::io::Error),
	#[error("secret store is corrupt: {0}")]
	Format(#[from] serde_json::Error),
	#[error("secret store lock poisoned")]
	Poisoned,
}

/// Named credential strings. Nothing beyond store, retrieve and delete.
pub trait SecretStore: Send + Sync {
	fn store(&self, name: &str, secret: &str) -> Result<(), SecretError>;
	fn retrieve(&self, name: &str) -> Result<Option<String>, SecretError>;
	/// Deleting a missing secret is not an error.
	fn delete(&self, name: &str) -> Result<(), SecretError>;
}

#[derive(Debug, Default)]
pub struct MemorySecretStore {
	secrets: Mutex<BTreeMap<String, String>>,
}

impl SecretStore for MemorySecretStore {
	fn store(&self, name: &str, secret: &str) -> Result<(), SecretError> {
		self.secrets.lock().map_err(|_| SecretError::Poisoned)?.insert(name.to_owned(), secret.to_owned());
		Ok(())
	}

	fn retrieve(&self, name: &str) -> Result<Option<String>, SecretError> {
		Ok(self.secrets.lock().map_err(|_| SecretError::Poisoned)?.get(name).cloned())
	}

	fn delete(&self, name: &str) -> Result<(), SecretError> {
		self.secrets.lock().map_err(|_| SecretError::Poisoned)?.remove(name);
		Ok(())
	}
}

/// JSON map on disk, readable by the owner only.
#[derive(Debug)]
pub struct FileSecretStore {
	path: PathBuf,
	lock: Mutex<()>,
}

impl FileSecretStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), lock: Mutex::new(()) }
	}

	/// `secrets.json` in the XDG state directory.
	pub fn default_location() -> Result<Self, SecretError> {
		let xdg_dirs = xdg::BaseDirectories::with_prefix(env!("CARGO_PKG_NAME"));
		Ok(Self::new(xdg_dirs.place_state_file("secrets.json")?))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read(&self) -> Result<BTreeMap<String, String>, SecretError> {
		match std::fs::read_to_string(&self.path) {
			Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
			Ok(s) => Ok(serde_json::from_str(&s)?),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
			Err(e) => Err(e.into()),
		}
	}

	/// Replace the file in one rename. The temp file is created 0600, so the secrets are never readable by others.
	fn write(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretError> {
		let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
		std::fs::create_dir_all(dir)?;
		let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
		serde_json::to_writer_pretty(&mut tmp, secrets)?;
		tmp.as_file().sync_all()?;
		tmp.persist(&self.path).map_err(|e| e.error)?;
		Ok(())
	}
}

impl SecretStore for FileSecretStore {
	fn store(&self, name: &str, secret: &str) -> Result<(), SecretError> {
		let _guard = self.lock.lock().map_err(|_| SecretError::Poisoned)?;
		let mut secrets = self.read()?;
		secrets.insert(name.to_owned(), secret.to_owned());
		self.write(&secrets)
	}

	fn retrieve(&self, name: &str) -> Result<Option<String>, SecretError> {
		let _guard = self.lock.lock().map_err(|_| SecretError::Poisoned)?;
		Ok(self.read()?.remove(name))
	}

	fn delete(&self, name: &str) -> Result<(), SecretError> {
		let _guard = self.lock.lock().map_err(|_| SecretError::Poisoned)?;
		let mut secrets = self.read()?;
		if secrets.remove(name).is_some() {
			self.write(&secrets)?;
		}
		Ok(())
	}
}
