use git2::Repository;
use std::path::{Path, PathBuf};

/// find the working tree root of the repository containing `start`
pub fn discover_root(start: &Path) -> Result<PathBuf, String> {
    // can be anywhere within the repo
    let repo = Repository::discover(start)
        .map_err(|e| format!("not in a git repository: {}", e.message()))?;

    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| format!("{} is a bare repository", repo.path().display()))
}
