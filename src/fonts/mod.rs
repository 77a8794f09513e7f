//! Font discovery for report rendering.
//!
//! The Roboto family is looked up in, in order: `FINREPORT_FONTS_DIR`,
//! `assets/fonts` next to the running executable, and `assets/fonts` in the
//! crate directory. When none of them holds the four Roboto files the loader
//! falls back to a system family: Liberation Sans on Linux, Arial on Windows
//! (`FINREPORT_WINDOWS_FONTS_DIR` overrides the Windows font directory).

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable pointing at a directory with the Roboto files.
pub const FONTS_DIR_ENV: &str = "FINREPORT_FONTS_DIR";

/// Environment variable overriding the Windows font directory.
pub const WINDOWS_FONTS_DIR_ENV: &str = "FINREPORT_WINDOWS_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

/// File names of a system font family used when Roboto is unavailable.
struct SystemFamily {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const ARIAL: SystemFamily = SystemFamily {
    name: "Arial",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

const LIBERATION_SANS: SystemFamily = SystemFamily {
    name: "Liberation Sans",
    regular: "LiberationSans-Regular.ttf",
    bold: "LiberationSans-Bold.ttf",
    italic: "LiberationSans-Italic.ttf",
    bold_italic: "LiberationSans-BoldItalic.ttf",
};

const LINUX_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
];

/// Directory holding the Roboto files shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            candidates.push(bin_dir.join("assets/fonts"));
        }
    }

    candidates.push(bundled_fonts_source_dir());
    candidates.dedup();
    candidates
}

fn missing_font_files(path: &Path) -> Vec<&'static str> {
    FONT_FILES
        .iter()
        .copied()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_font_files(&candidate);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} font directory. Checked: {}. Set {} or see assets/fonts/README.md.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_bundled_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory()?;
    debug!("fonts: loading {} from {}", DEFAULT_FONT_FAMILY_NAME, directory.display());

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn system_font_directories() -> Vec<(PathBuf, &'static SystemFamily)> {
    let mut directories = Vec::new();

    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        directories.push((path, &ARIAL));
    }

    #[cfg(windows)]
    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env_path(var) {
            directories.push((root.join("Fonts"), &ARIAL));
        }
    }

    #[cfg(not(windows))]
    for directory in LINUX_FONT_DIRECTORIES {
        directories.push((PathBuf::from(directory), &LIBERATION_SANS));
    }

    directories
}

fn load_font_file(directory: &Path, file: &str, family: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load {} font at {}: {}", family, path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn load_system_family(directory: &Path, family: &SystemFamily) -> Result<FontFamily<FontData>, Error> {
    Ok(FontFamily {
        regular: load_font_file(directory, family.regular, family.name)?,
        bold: load_font_file(directory, family.bold, family.name)?,
        italic: load_font_file(directory, family.italic, family.name)?,
        bold_italic: load_font_file(directory, family.bold_italic, family.name)?,
    })
}

fn system_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let mut last_error = None;
    for (directory, family) in system_font_directories() {
        match load_system_family(&directory, family) {
            Ok(loaded) => {
                warn!(
                    "Bundled fonts unavailable; falling back to system '{}' family from {}.",
                    family.name,
                    directory.display()
                );
                return Ok(loaded);
            }
            Err(err) => last_error = Some(err),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::new(
            "No system font directory available for fallback",
            io::Error::new(io::ErrorKind::NotFound, "system fonts directory not found"),
        )
    }))
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns the Roboto family if available and otherwise a system fallback family.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family() {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => system_fallback_font_family().map_err(|fallback_err| {
            warn!(
                "Bundled fonts unavailable ({}); system fallback failed: {}",
                err, fallback_err
            );
            Error::new(
                format!(
                    "Bundled fonts unavailable and system fallback failed: {}",
                    fallback_err
                ),
                io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
            )
        }),
        Err(err) => Err(err),
    }
}

/// Whether a usable font family (bundled or system fallback) can be loaded.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
        || system_font_directories()
            .iter()
            .any(|(directory, family)| directory.join(family.regular).is_file())
}
