use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File holding the session token between CLI invocations.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to access session file {}: {source}", .path.display())]
pub struct SessionError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored token, or `None` when signed out.
    pub fn load(&self) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.error(source)),
        }
    }

    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.error(source))?;
        }
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|source| self.error(source))?;
        // `mode` only applies on creation; tighten a file left by an older save.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|source| self.error(source))?;
        }
        file.write_all(token.trim().as_bytes())
            .map_err(|source| self.error(source))?;
        Ok(())
    }

    /// Removes the token. Clearing an absent session succeeds.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.error(source)),
        }
    }

    fn error(&self, source: std::io::Error) -> SessionError {
        SessionError {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear_cycle() {
        let dir = tempfile::tempdir().expect("temp dir");
        let session = SessionFile::new(dir.path().join(".jobtrack").join("session"));

        assert_eq!(session.load().expect("load"), None);

        session.save("token-123\n").expect("save");
        assert_eq!(session.load().expect("load").as_deref(), Some("token-123"));

        session.clear().expect("clear");
        session.clear().expect("clear twice");
        assert_eq!(session.load().expect("load"), None);
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private_to_the_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session");
        fs::write(&path, "stale").expect("write fixture");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod fixture");

        let session = SessionFile::new(&path);
        session.save("token-456").expect("save");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(session.load().expect("load").as_deref(), Some("token-456"));

        let fresh = SessionFile::new(dir.path().join("nested").join("session"));
        fresh.save("token-789").expect("save");
        let mode = fs::metadata(fresh.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn blank_file_counts_as_signed_out() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session");
        fs::write(&path, "  \n").expect("write fixture");

        assert_eq!(SessionFile::new(path).load().expect("load"), None);
    }
}
