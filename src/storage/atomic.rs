// ClipGuardian - Ecriture atomique
//
// Ecrit un fichier complet dans `<nom>.tmp`, le synchronise sur disque
// puis le renomme sur la cible. La cible n'est jamais ecrasee en place :
// un crash laisse soit l'ancien fichier, soit le nouveau.
//
// Sous Unix, le fichier temporaire est cree en 0600.

use crate::error::CgResult;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Remplace atomiquement le contenu de `path` par `data`.
pub fn write_atomic(path: &Path, data: &[u8]) -> CgResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = tmp_path_for(path);
    let _ = fs::remove_file(&tmp_path);

    let written = open_private(&tmp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Chemin du fichier temporaire associe a `path`.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}
