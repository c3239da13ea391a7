//! Migration script generation.
//!
//! Instead of applying a change set, the engine can write it down as a
//! versioned SQL file with an `up` section (current to desired) and a `down`
//! section (desired back to current).

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::diff::Comparator;
use crate::error::{Result, SchemaError};
use crate::platform::Platform;
use crate::render::SqlRenderer;
use crate::schema::Schema;

/// Marker line opening the forward section of a script.
pub const UP_MARKER: &str = "-- +up";
/// Marker line opening the reverse section of a script.
pub const DOWN_MARKER: &str = "-- +down";

/// Builds a migration version name from a timestamp.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use dbschema_core::migration::version_from;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
/// assert_eq!(version_from(at), "Version20240301123005");
/// ```
#[must_use]
pub fn version_from(timestamp: DateTime<Utc>) -> String {
    format!("Version{}", timestamp.format("%Y%m%d%H%M%S"))
}

/// Builds a migration version name from the current time.
#[must_use]
pub fn version_now() -> String {
    version_from(Utc::now())
}

/// A generated migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    /// Version name, also used as the file stem.
    pub version: String,
    /// Statements taking the current schema to the desired one.
    pub up: Vec<String>,
    /// Statements taking the desired schema back to the current one.
    pub down: Vec<String>,
}

impl MigrationScript {
    /// Returns whether the migration has nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    /// The file name this script is written to.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.sql", self.version)
    }

    /// Serializes the script with its section markers.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut out = format!("-- {}\n\n{UP_MARKER}\n", self.version);
        for statement in &self.up {
            let _ = writeln!(out, "{statement};");
        }
        let _ = write!(out, "\n{DOWN_MARKER}\n");
        for statement in &self.down {
            let _ = writeln!(out, "{statement};");
        }
        out
    }

    /// Writes the script into `dir`, creating the directory if needed.
    ///
    /// Fails with [`SchemaError::MigrationExists`] rather than overwrite an
    /// existing file.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(SchemaError::MigrationExists(path));
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(self.to_sql().as_bytes())?;

        info!(path = %path.display(), "Wrote migration");
        Ok(path)
    }
}

/// Diffs two schemas into a [`MigrationScript`].
pub struct MigrationGenerator<'p> {
    platform: &'p dyn Platform,
}

impl<'p> MigrationGenerator<'p> {
    /// Creates a generator for the given platform.
    #[must_use]
    pub fn new(platform: &'p dyn Platform) -> Self {
        Self { platform }
    }

    /// Renders `current -> desired` as `up` and `desired -> current` as
    /// `down`.
    pub fn generate(
        &self,
        current: &Schema,
        desired: &Schema,
        version: impl Into<String>,
    ) -> Result<MigrationScript> {
        let comparator = Comparator::new(self.platform);
        let renderer = SqlRenderer::new(self.platform);

        let up = renderer.render_all(&comparator.compare(current, desired)?)?;
        let down = renderer.render_all(&comparator.compare(desired, current)?)?;

        Ok(MigrationScript {
            version: version.into(),
            up,
            down,
        })
    }
}
