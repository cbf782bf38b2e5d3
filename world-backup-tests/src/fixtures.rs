//! Test fixtures and sample data
//!
//! Provides world directory layouts, config templates and helpers for
//! reading produced archives back.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::{CompressionMethod, ZipArchive};

/// Files every fixture world contains, relative to the world directory
pub const WORLD_FILES: &[(&str, &[u8])] = &[
    ("level.dat", b"level-data"),
    ("region/r.0.0.mca", b"region-zero"),
    ("region/r.0.1.mca", b"region-one"),
    ("playerdata/steve.dat", b"player"),
];

/// Files every fixture world contains that must never be archived
pub const WORLD_EXCLUDED_FILES: &[&str] = &["session.lock", "playerdata/steve.dat.tmp"];

/// Create a world directory with a few nested files plus excluded ones.
/// Returns the world path.
pub fn create_world(parent: &Path, name: &str) -> PathBuf {
    let world = parent.join(name);
    for (relative, content) in WORLD_FILES {
        write_file(&world.join(relative), content);
    }
    for relative in WORLD_EXCLUDED_FILES {
        write_file(&world.join(relative), b"transient");
    }
    world
}

/// Write a file, creating parents as needed
pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Entry names of a zip archive, in the order they were written
pub fn archive_names(path: &Path) -> Vec<String> {
    let mut archive = open_archive(path);
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("Failed to read entry").name().to_string())
        .collect()
}

/// Decompressed content of one archive entry
pub fn archive_entry_bytes(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = open_archive(path);
    let mut entry = archive.by_name(name).expect("Entry not found");
    let mut content = Vec::new();
    entry.read_to_end(&mut content).expect("Failed to read entry");
    content
}

/// Compression method recorded for one archive entry
pub fn archive_entry_compression(path: &Path, name: &str) -> CompressionMethod {
    let mut archive = open_archive(path);
    let entry = archive.by_name(name).expect("Entry not found");
    entry.compression()
}

fn open_archive(path: &Path) -> ZipArchive<File> {
    let file = File::open(path).expect("Failed to open archive");
    ZipArchive::new(file).expect("Failed to read ZIP archive")
}

/// Minimal valid config TOML template
pub fn minimal_config_toml() -> &'static str {
    r#"
[global]
log_directory = "{log_dir}"
log_level = "info"

[backup]
directory = "{backup_dir}"
retention_count = {retention}
worlds = ["{world}"]
"#
}

/// Fill the placeholders of [`minimal_config_toml`]
pub fn render_minimal_config(log_dir: &Path, backup_dir: &Path, world: &Path, retention: i64) -> String {
    minimal_config_toml()
        .replace("{log_dir}", &toml_path(log_dir))
        .replace("{backup_dir}", &toml_path(backup_dir))
        .replace("{world}", &toml_path(world))
        .replace("{retention}", &retention.to_string())
}

/// Paths inside TOML basic strings need escaped backslashes on Windows
fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}
