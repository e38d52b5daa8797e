/*!
 * Utility functions for codedump
 */

use std::path::{Component, Path};

use once_cell::sync::Lazy;

/// Default output file name, written at the root of the scanned directory
pub const DEFAULT_OUTPUT_FILE: &str = "codebase.xml";

/// Default size bound for included files (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Path of `path` relative to `root`, joined with `/` whatever the host uses.
/// Returns `None` when `path` is not under `root` or when a segment is not
/// valid UTF-8, since a lossy conversion could make two paths collide.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        if let Component::Normal(name) = component {
            segments.push(name.to_str()?);
        }
    }

    Some(segments.join("/"))
}

/// Whether `c` may appear in an XML 1.0 document at all, escaped or not
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// First character of `text` that XML 1.0 cannot carry
pub fn find_non_xml_char(text: &str) -> Option<char> {
    text.chars().find(|&c| !is_xml_char(c))
}

/// Default ignore patterns
pub static DEFAULT_IGNORE_PATTERNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Build output
        "**/dist/**",
        "**/build/**",
        "**/out/**",
        "**/target/**",
        "**/.next/**",
        "**/.nuxt/**",
        "**/.output/**",
        // Version control
        "**/.git/**",
        "**/.svn/**",
        "**/.hg/**",
        // Dependencies
        "**/node_modules/**",
        "**/bower_components/**",
        "**/vendor/**",
        "**/__pycache__/**",
        "**/.venv/**",
        "**/venv/**",
        // Minified & bundled
        "**/*.min.js",
        "**/*.min.css",
        "**/*.bundle.js",
        "**/*.chunk.js",
        // Coverage
        "**/coverage/**",
        "**/.nyc_output/**",
        // Editors & tools
        "**/.vscode/**",
        "**/.idea/**",
        "**/.cache/**",
        // Lockfiles
        "**/package-lock.json",
        "**/yarn.lock",
        "**/pnpm-lock.yaml",
        "**/Cargo.lock",
        "**/Gemfile.lock",
        "**/composer.lock",
        // OS metadata
        "**/.DS_Store",
        "**/Thumbs.db",
        // Tests
        "**/*.test.*",
        "**/*.spec.*",
        "**/__tests__/**",
        // Type declarations
        "**/*.d.ts",
        // Config files
        "**/*.config.*",
        "**/.eslintrc*",
        "**/.prettierrc*",
        // Generated
        "**/*.generated.*",
        "**/*.gen.*",
        "**/generated/**",
    ]
});
