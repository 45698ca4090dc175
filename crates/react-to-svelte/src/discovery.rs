//! Component file discovery.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

/// Extensions of component sources.
pub const COMPONENT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Globs that are always ignored.
const DEFAULT_IGNORES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/__tests__/**",
    "**/*.test.*",
    "**/*.spec.*",
    "**/*.stories.*",
    "**/*.d.ts",
];

/// A file selected for conversion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    pub path: Utf8PathBuf,
    /// Named on the command line rather than found in a directory. Explicit
    /// files without a component are failures; discovered ones are skipped.
    pub explicit: bool,
}

/// Finds component sources under the given paths.
#[derive(Debug)]
pub struct Discovery {
    ignore: GlobSet,
    style_suffix: String,
}

impl Discovery {
    /// Builds the ignore set from user patterns plus the defaults.
    pub fn new(patterns: &[String], style_suffix: &str) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        for pattern in DEFAULT_IGNORES {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            ignore: builder.build()?,
            style_suffix: style_suffix.to_string(),
        })
    }

    /// Expands `paths` into a sorted, deduplicated list of sources.
    /// Directories are walked; files are taken as given.
    pub fn discover(&self, paths: &[Utf8PathBuf]) -> Vec<SourceFile> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                files.extend(self.walk(path).into_iter().map(|path| SourceFile {
                    path,
                    explicit: false,
                }));
            } else {
                files.push(SourceFile {
                    path: path.clone(),
                    explicit: true,
                });
            }
        }

        files.sort();
        // Keep the explicit entry when a file is both named and discovered.
        files.dedup_by(|later, earlier| {
            if later.path == earlier.path {
                earlier.explicit |= later.explicit;
                true
            } else {
                false
            }
        });
        tracing::debug!(count = files.len(), "discovered component files");
        files
    }

    fn walk(&self, root: &Utf8Path) -> Vec<Utf8PathBuf> {
        WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
            .filter(|p| {
                let relative = p.strip_prefix(root).unwrap_or(p);
                self.is_candidate(relative)
            })
            .collect()
    }

    /// Whether a path relative to a walked root looks like a component.
    pub fn is_candidate(&self, relative: &Utf8Path) -> bool {
        let has_extension = relative
            .extension()
            .is_some_and(|ext| COMPONENT_EXTENSIONS.contains(&ext));
        if !has_extension || self.ignore.is_match(relative.as_str()) {
            return false;
        }
        let is_style_module = relative
            .file_stem()
            .is_some_and(|stem| !self.style_suffix.is_empty() && stem.ends_with(&self.style_suffix));
        !is_style_module
    }
}
