/// Separator between path segments. Never allowed inside an entry name.
pub const SEPARATOR: char = '/';

pub const CURRENT_DIR: &str = ".";
pub const PARENT_DIR: &str = "..";
pub const ROOT_DIR: &str = "/";

/// Returns true for the names that denote navigation targets rather than entries.
pub fn is_reserved(name: &str) -> bool {
    matches!(name, CURRENT_DIR | PARENT_DIR | ROOT_DIR)
}

/// Returns true when `name` cannot be stored as a single path segment.
pub fn is_malformed(name: &str) -> bool {
    name.is_empty() || name.contains(SEPARATOR)
}
