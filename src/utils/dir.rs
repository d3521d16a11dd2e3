use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};

const APPLICATION_DIR: &str = "awstatus";

/// Returns the state directory used for logs, creating it when missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let base = {
        #[cfg(windows)]
        {
            env::var("APPDATA").map(PathBuf::from)
        }
        #[cfg(not(windows))]
        {
            env::var("XDG_STATE_HOME").map(PathBuf::from).or_else(|_| {
                env::var("HOME").map(|home| {
                    let mut path = PathBuf::from(home);
                    path.push(".local/state");
                    path
                })
            })
        }
    }
    .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))?;

    create_application_path_in(&base)
}

pub fn create_application_path_in(base: &Path) -> Result<PathBuf> {
    let path = base.join(APPLICATION_DIR);
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
