//! Path resolution logic
//!
//! The volume is flat, so a "directory" is nothing more than a name prefix.
//! This module keeps the session's current-directory cursor and turns user
//! paths into the absolute names the driver stores.

use thiserror::Error;

/// The only directory that exists without a backing object
pub const ROOT: &str = "/";

/// Errors that can occur during path resolution
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The resolved path buffer could not be allocated
    #[error("Allocation failed for a {requested}-byte path")]
    Allocation { requested: usize },
}

/// Returns true if `path` names the volume root
pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char
fn clamp(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Current-directory cursor
///
/// Always starts with `/` and ends with exactly one `/`. Its length never
/// exceeds the volume's maximum object-name length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentDirectory {
    path: String,
    max_len: usize,
}

impl CurrentDirectory {
    /// Creates a cursor at the root; `max_len` is clamped to at least 2
    pub fn new(max_len: usize) -> Self {
        Self {
            path: String::from(ROOT),
            max_len: max_len.max(2),
        }
    }

    /// The cursor path
    pub fn get(&self) -> &str {
        &self.path
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Returns the cursor to the root
    pub fn reset(&mut self) {
        self.path.clear();
        self.path.push_str(ROOT);
    }

    /// Moves the cursor
    ///
    /// Absolute input replaces the cursor, relative input is appended to it.
    /// Either way the input is cut to fit, and the result does not have to
    /// name an existing object.
    ///
    /// ```
    /// use fs_view::CurrentDirectory;
    ///
    /// let mut cwd = CurrentDirectory::new(32);
    /// cwd.change("a");
    /// assert_eq!(cwd.get(), "/a/");
    /// cwd.change("/b");
    /// assert_eq!(cwd.get(), "/b/");
    /// ```
    pub fn change(&mut self, input: &str) {
        if input.starts_with('/') {
            let kept = clamp(input, self.max_len - 1);
            self.path.clear();
            self.path.push_str(kept);
        } else {
            let room = self
                .max_len
                .saturating_sub(self.path.len())
                .saturating_sub(1);
            let kept = clamp(input, room);
            self.path.push_str(kept);
        }

        let bounded = clamp(&self.path, self.max_len).len();
        self.path.truncate(bounded);

        let trimmed = self.path.trim_end_matches('/').len();
        self.path.truncate(trimmed);
        self.path.push('/');
    }
}

/// Path resolver
///
/// Combines user paths with the current-directory cursor.
pub struct PathResolver;

impl PathResolver {
    /// Produces the absolute form of `path_in`
    ///
    /// Absolute input is returned as is; anything else is appended to the
    /// cursor verbatim (no `.`/`..` processing, the volume has no tree).
    ///
    /// ```
    /// use fs_view::{CurrentDirectory, PathResolver};
    ///
    /// let mut cwd = CurrentDirectory::new(32);
    /// cwd.change("lib");
    /// assert_eq!(PathResolver::resolve(&cwd, "util.py").unwrap(), "/lib/util.py");
    /// assert_eq!(PathResolver::resolve(&cwd, "/boot.py").unwrap(), "/boot.py");
    /// ```
    pub fn resolve(cwd: &CurrentDirectory, path_in: &str) -> Result<String, PathError> {
        let prefix = if path_in.starts_with('/') {
            ""
        } else {
            cwd.get()
        };

        let requested = prefix.len() + path_in.len();
        let mut path = String::new();
        path.try_reserve_exact(requested)
            .map_err(|_| PathError::Allocation { requested })?;
        path.push_str(prefix);
        path.push_str(path_in);
        Ok(path)
    }
}
