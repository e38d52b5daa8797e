/*!
 * Source extension allow-list and the extension to language table
 */

use std::path::Path;

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

/// Extensions (lowercase, without the dot) of files the scanner will pick up.
/// Anything else is invisible to the pipeline.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "py", "rb", "java", "kt", "go", "rs", "c", "h", "cpp",
    "hpp", "cc", "cs", "php", "swift", "scala", "sh", "lua", "dart", "vue", "svelte",
];

/// Language tag attached to every file record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Ruby,
    Java,
    Kotlin,
    Go,
    Rust,
    C,
    Cpp,
    CSharp,
    Php,
    Swift,
    Scala,
    Shell,
    Lua,
    Dart,
    Vue,
    Svelte,
    /// Fallback for any extension without a dedicated entry
    PlainText,
}

impl Language {
    /// Map an extension (without the dot, any case) to a language.
    /// Total: unknown extensions yield [`Language::PlainText`].
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "py" => Self::Python,
            "rb" => Self::Ruby,
            "java" => Self::Java,
            "kt" => Self::Kotlin,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "c" | "h" => Self::C,
            "cpp" | "hpp" | "cc" => Self::Cpp,
            "cs" => Self::CSharp,
            "php" => Self::Php,
            "swift" => Self::Swift,
            "scala" => Self::Scala,
            "sh" => Self::Shell,
            "lua" => Self::Lua,
            "dart" => Self::Dart,
            "vue" => Self::Vue,
            "svelte" => Self::Svelte,
            _ => Self::PlainText,
        }
    }

    /// Language of a path, judged by its extension alone
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|ext| Self::from_extension(&ext.to_string_lossy()))
            .unwrap_or(Self::PlainText)
    }

    /// The tag written into the `language` attribute
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Check whether a path carries one of the allow-listed source extensions
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            SOURCE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
