use std::{
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

use crate::RenderError;

pub trait PathExtension {
    /// Resolve `.` and `..` without touching the filesystem
    fn canonicalize_nonexistent_path(&self) -> PathBuf;
    fn filestem_from_path(&self) -> Result<String, RenderError>;
    /// Append `.{extension}` to the full file name, keeping any dots already in it
    fn with_appended_extension(&self, extension: &str) -> PathBuf;
}

impl PathExtension for Path {
    fn canonicalize_nonexistent_path(&self) -> PathBuf {
        let mut canonicalized_path = PathBuf::new();
        for component in self.components() {
            match component {
                Component::CurDir => continue,
                Component::ParentDir => {
                    if !canonicalized_path.pop() {
                        canonicalized_path.push(component);
                    }
                }
                c => canonicalized_path.push(c),
            }
        }
        canonicalized_path
    }

    fn filestem_from_path(&self) -> Result<String, RenderError> {
        Ok(self
            .file_stem()
            .ok_or(RenderError::io(format!("{self:?} does not have a filename")))?
            .to_str()
            .ok_or(RenderError::io(format!("{self:?} is non unicode")))?
            .to_owned())
    }

    fn with_appended_extension(&self, extension: &str) -> PathBuf {
        let mut path: OsString = self.as_os_str().to_owned();
        path.push(".");
        path.push(extension);
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_removes_relative_components() {
        let path = Path::new("build/./en/../fr/about");
        assert_eq!(path.canonicalize_nonexistent_path(), PathBuf::from("build/fr/about"));
    }

    #[test]
    fn appended_extension_keeps_dots() {
        let path = Path::new("fr/release-1.2");
        assert_eq!(
            path.with_appended_extension("html"),
            PathBuf::from("fr/release-1.2.html")
        );
    }
}
