//! Loading and storing the local organization layout.

use std::path::Path;

use tracing::{debug, info};

use crate::errors::StateError;
use crate::models::Organization;

/// Load an [`Organization`] from the TOML file at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Organization, StateError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading organization state");

    if !path.exists() {
        return Err(StateError::NotFound(path.display().to_string()));
    }

    let contents = std::fs::read_to_string(path)?;
    let org: Organization = toml::from_str(&contents).map_err(|e| StateError::ParseError {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    debug!(
        teams = org.teams.len(),
        members = org.members.len(),
        "organization state parsed"
    );
    Ok(org)
}

/// Write `org` to `path` as TOML, replacing any existing file.
///
/// The file is written next to its destination first and renamed into
/// place, so an interrupted write never leaves a truncated layout behind.
pub fn store<P: AsRef<Path>>(path: P, org: &Organization) -> Result<(), StateError> {
    let path = path.as_ref();
    let contents =
        toml::to_string_pretty(org).map_err(|e| StateError::SerializeError(e.to_string()))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;

    info!(path = %path.display(), teams = org.teams.len(), "stored organization state");
    Ok(())
}
