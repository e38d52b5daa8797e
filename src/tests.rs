/*!
 * End-to-end tests for discovery, reading and serialization
 */

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tempfile::tempdir;

use crate::config::ConfigOverrides;
use crate::matcher::PathMatcher;
use crate::pipeline::{IngestionOutcome, Pipeline};
use crate::scanner::Scanner;
use crate::types::DiagnosticKind;
use crate::utils::DEFAULT_IGNORE_PATTERNS;

fn write_file(root: &Path, relative: &str, content: &str) -> io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())
}

// The example project: one real source file plus things that must be left out
fn setup_example_directory() -> io::Result<tempfile::TempDir> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    write_file(root, "src/a.ts", "x\n y\n z")?;
    write_file(root, "node_modules/dep.js", "module.exports = 1;\n")?;
    write_file(root, "build/out.js", "console.log('built');\n")?;
    write_file(root, "README.md", "# Readme\n")?;

    Ok(temp_dir)
}

// A richer project touching most of the default ignore categories
fn setup_project_directory() -> io::Result<tempfile::TempDir> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    write_file(root, "src/main.rs", "fn main() {\n    lib::run();\n}\n")?;
    write_file(root, "src/lib.rs", "pub fn run() {}\n")?;
    write_file(root, "src/util/helpers.py", "def helper():\n    return 1\n")?;
    write_file(root, "web/app.tsx", "export const App = () => <div/>;\n")?;
    write_file(root, "scripts/deploy.sh", "#!/bin/sh\necho deploy\n")?;

    write_file(root, ".git/hooks/pre-commit.sh", "#!/bin/sh\n")?;
    write_file(root, "packages/ui/node_modules/react/index.js", "x")?;
    write_file(root, "dist/bundle.js", "x")?;
    write_file(root, "target/debug/build.rs", "x")?;
    write_file(root, "web/app.test.tsx", "test('x', () => {});\n")?;
    write_file(root, "web/vendor.min.js", "x")?;
    write_file(root, "types/index.d.ts", "declare const x: number;\n")?;
    write_file(root, "vite.config.ts", "export default {};\n")?;
    write_file(root, "coverage/lcov-report/a.js", "x")?;
    write_file(root, "src/schema.generated.ts", "x")?;
    write_file(root, "Cargo.toml", "[package]\n")?;
    write_file(root, "notes.txt", "notes\n")?;

    Ok(temp_dir)
}

fn run(root: &Path, overrides: ConfigOverrides) -> IngestionOutcome {
    Pipeline::new(root).with_overrides(overrides).run()
}

// quick-xml's reader does not check characters, roxmltree does
fn assert_well_formed(xml: &str) {
    let document = roxmltree::Document::parse(xml)
        .unwrap_or_else(|e| panic!("Artifact is not well-formed XML: {}", e));
    assert_eq!(document.root_element().tag_name().name(), "codebase");
}

fn file_paths(outcome: &IngestionOutcome) -> BTreeSet<String> {
    outcome
        .result
        .as_ref()
        .map(|r| r.files.iter().map(|f| f.path.clone()).collect())
        .unwrap_or_default()
}

// Test the example scenario end to end
#[test]
fn test_example_scenario() -> io::Result<()> {
    let temp_dir = setup_example_directory()?;
    let outcome = run(temp_dir.path(), ConfigOverrides::default());

    assert!(outcome.is_success(), "{:?}", outcome.artifact.error);
    let result = outcome.result.as_ref().unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].path, "src/a.ts");
    assert_eq!(result.tree, "└── src\n    └── a.ts");
    assert_eq!(result.total_files, 1);
    assert_eq!(result.total_lines, 3);

    let xml = &outcome.artifact.xml;
    assert_eq!(xml.matches("<file ").count(), 1);
    assert!(xml.contains(r#"<file path="src/a.ts" language="typescript" lines="3">"#));
    assert!(xml.contains("     1|x\n     2| y\n     3| z"));
    assert!(!xml.contains("dep.js"));
    assert!(!xml.contains("out.js"));
    assert!(!xml.contains("README.md"));

    Ok(())
}

// Test default ignore patterns across categories
#[test]
fn test_default_ignores() -> io::Result<()> {
    let temp_dir = setup_project_directory()?;
    let outcome = run(temp_dir.path(), ConfigOverrides::default());

    let expected: BTreeSet<String> = [
        "src/main.rs",
        "src/lib.rs",
        "src/util/helpers.py",
        "web/app.tsx",
        "scripts/deploy.sh",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(file_paths(&outcome), expected);

    Ok(())
}

// Test that ignore patterns win over the extension allow-list
#[test]
fn test_ignore_precedence() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(temp_dir.path(), "node_modules/dep.js", "x")?;
    write_file(temp_dir.path(), "lib/node_modules/nested/dep.ts", "x")?;
    write_file(temp_dir.path(), "index.js", "x")?;

    let outcome = run(
        temp_dir.path(),
        ConfigOverrides {
            ignore_patterns: Some(vec!["**/node_modules/**".to_string()]),
            ..Default::default()
        },
    );

    let expected: BTreeSet<String> = ["index.js".to_string()].into_iter().collect();
    assert_eq!(file_paths(&outcome), expected);

    Ok(())
}

// Ignored directories are pruned, not merely filtered
#[test]
fn test_ignored_directories_are_not_descended() -> io::Result<()> {
    let temp_dir = setup_project_directory()?;
    let matcher = PathMatcher::new(DEFAULT_IGNORE_PATTERNS.as_slice());
    let scanner = Scanner::new(fs::canonicalize(temp_dir.path())?, matcher);

    let root = fs::canonicalize(temp_dir.path())?;
    assert!(scanner.should_ignore(&root.join("dist")));
    assert!(scanner.should_ignore(&root.join("packages/ui/node_modules")));
    assert!(!scanner.should_ignore(&root.join("packages/ui")));
    assert!(!scanner.should_ignore(&root));

    Ok(())
}

// Test the size bound: maxFileSize bytes is in, one more byte is out
#[test]
fn test_size_bound() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(temp_dir.path(), "exact.rs", &"a".repeat(64))?;
    write_file(temp_dir.path(), "over.rs", &"a".repeat(65))?;

    let outcome = run(
        temp_dir.path(),
        ConfigOverrides {
            max_file_size: Some(64),
            ..Default::default()
        },
    );

    assert!(outcome.is_success());
    let expected: BTreeSet<String> = ["exact.rs".to_string()].into_iter().collect();
    assert_eq!(file_paths(&outcome), expected);

    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Oversized);
    assert_eq!(outcome.diagnostics[0].path, "over.rs");

    Ok(())
}

// Test XML structure validity
#[test]
fn test_xml_validity() -> io::Result<()> {
    let temp_dir = setup_project_directory()?;
    write_file(temp_dir.path(), "src/weird.rs", "a < b && c > d; \"'\"; ]]> <!-- -->")?;
    let outcome = run(temp_dir.path(), ConfigOverrides::default());

    let mut reader = Reader::from_str(&outcome.artifact.xml);
    let mut depth = 0;
    let mut roots = Vec::new();
    let mut children = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match depth {
                    0 => roots.push(name),
                    1 => children.push(name),
                    _ => (),
                }
                depth += 1;
            }
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Err(e) => panic!("Error parsing XML: {}", e),
            _ => (),
        }
    }

    // If XML is well-formed, depth should be 0 at the end
    assert_eq!(depth, 0, "XML structure is not well-balanced");
    assert_well_formed(&outcome.artifact.xml);
    assert_eq!(roots, vec!["codebase"]);
    assert_eq!(
        children,
        vec!["file_summary", "directory_structure", "files"]
    );

    Ok(())
}

// Test that two runs over the same tree agree byte for byte
#[test]
fn test_determinism() -> io::Result<()> {
    let temp_dir = setup_project_directory()?;

    let first = run(temp_dir.path(), ConfigOverrides::default());
    let second = run(temp_dir.path(), ConfigOverrides::default());

    let (a, b) = (first.result.unwrap(), second.result.unwrap());
    assert_eq!(a.tree, b.tree);
    assert_eq!(a.summary, b.summary);
    assert_eq!(
        (a.total_files, a.total_lines, a.total_chars),
        (b.total_files, b.total_lines, b.total_chars)
    );
    assert_eq!(file_paths_of(&a.files), file_paths_of(&b.files));

    Ok(())
}

fn file_paths_of(files: &[crate::types::FileRecord]) -> BTreeSet<&str> {
    files.iter().map(|f| f.path.as_str()).collect()
}

// Test that totals are always the sum over the records
#[test]
fn test_totals_match_records() -> io::Result<()> {
    let temp_dir = setup_project_directory()?;
    let outcome = run(temp_dir.path(), ConfigOverrides::default());
    let result = outcome.result.unwrap();

    let lines: usize = result.files.iter().map(|f| f.line_count).sum();
    let chars: usize = result.files.iter().map(|f| f.content.chars().count()).sum();
    assert_eq!(result.total_lines, lines);
    assert_eq!(result.total_chars, chars);
    assert!(result.summary.contains(&format!("Total lines: {}", lines)));

    Ok(())
}

// Character totals include the line-number prefixes when they are enabled
#[test]
fn test_character_count_follows_line_numbering() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(temp_dir.path(), "a.rb", "puts 1\nputs 2")?;

    let numbered = run(temp_dir.path(), ConfigOverrides::default());
    let plain = run(
        temp_dir.path(),
        ConfigOverrides {
            show_line_numbers: Some(false),
            ..Default::default()
        },
    );

    assert_eq!(plain.result.as_ref().unwrap().total_chars, 13);
    // Two lines, each with a 7 character prefix
    assert_eq!(numbered.result.as_ref().unwrap().total_chars, 13 + 14);
    assert!(plain.artifact.xml.contains(">puts 1\nputs 2</file>"));

    Ok(())
}

// Test that undecodable files are skipped with a warning
#[test]
fn test_undecodable_file_is_skipped() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(temp_dir.path(), "ok.go", "package main\n")?;
    File::create(temp_dir.path().join("bad.go"))?.write_all(&[0xc3, 0x28, 0xff])?;

    let outcome = run(temp_dir.path(), ConfigOverrides::default());

    assert!(outcome.is_success());
    let expected: BTreeSet<String> = ["ok.go".to_string()].into_iter().collect();
    assert_eq!(file_paths(&outcome), expected);
    assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Undecodable);
    assert_eq!(outcome.diagnostics[0].path, "bad.go");

    Ok(())
}

// Test that an unreadable subdirectory does not stop its siblings
#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempdir()?;
    write_file(temp_dir.path(), "locked/secret.rs", "x")?;
    write_file(temp_dir.path(), "open/visible.rs", "x")?;

    let locked = temp_dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Privileged users can list the directory anyway; nothing to check then
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let outcome = run(temp_dir.path(), ConfigOverrides::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

    assert!(outcome.is_success());
    let expected: BTreeSet<String> = ["open/visible.rs".to_string()].into_iter().collect();
    assert_eq!(file_paths(&outcome), expected);
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::UnreadableDirectory && d.path == "locked"));

    Ok(())
}

// Test that replacing the defaults brings ignored files back
#[test]
fn test_custom_patterns_replace_defaults() -> io::Result<()> {
    let temp_dir = setup_example_directory()?;
    let outcome = run(
        temp_dir.path(),
        ConfigOverrides {
            ignore_patterns: Some(vec!["**/build/**".to_string()]),
            ..Default::default()
        },
    );

    let expected: BTreeSet<String> = ["src/a.ts", "node_modules/dep.js"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(file_paths(&outcome), expected);

    Ok(())
}

// Test that an empty root still yields a complete document
#[test]
fn test_empty_directory() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let outcome = run(temp_dir.path(), ConfigOverrides::default());

    assert!(outcome.is_success());
    let result = outcome.result.as_ref().unwrap();
    assert_eq!(result.total_files, 0);
    assert_eq!(result.tree, "");
    assert!(outcome.artifact.xml.contains("<files>"));
    assert!(outcome.artifact.xml.contains("</files>"));

    Ok(())
}

// Test that valid UTF-8 holding characters XML 1.0 forbids is skipped
#[test]
fn test_non_xml_characters_are_skipped() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(temp_dir.path(), "a.c", "int a;\n\x0c\nint b;\x1b[0m\n")?;
    write_file(temp_dir.path(), "b.c", "int b;\r\n\tint c;\n")?;

    let outcome = run(temp_dir.path(), ConfigOverrides::default());

    assert!(outcome.is_success());
    let expected: BTreeSet<String> = ["b.c".to_string()].into_iter().collect();
    assert_eq!(file_paths(&outcome), expected);
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Undecodable && d.path == "a.c"));
    assert_well_formed(&outcome.artifact.xml);

    Ok(())
}

// Test that names which are not UTF-8 are skipped rather than merged
#[cfg(unix)]
#[test]
fn test_non_utf8_names_are_skipped() -> io::Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    write_file(root, "b.rs", "fn b() {}\n")?;

    // Some filesystems refuse such names outright; nothing to check then
    let first = root.join(OsStr::from_bytes(b"a\xff.rs"));
    if fs::write(&first, "fn a() {}\n").is_err() {
        return Ok(());
    }
    fs::write(root.join(OsStr::from_bytes(b"a\xfe.rs")), "fn a() {}\n")?;
    let dir = root.join(OsStr::from_bytes(b"d\xff"));
    fs::create_dir(&dir)?;
    fs::write(dir.join("inner.rs"), "fn inner() {}\n")?;

    let outcome = run(root, ConfigOverrides::default());

    assert!(outcome.is_success());
    let result = outcome.result.as_ref().unwrap();
    let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["b.rs"]);
    assert_eq!(
        outcome
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::InvalidPathName)
            .count(),
        3
    );
    assert_eq!(result.tree, "└── b.rs");
    assert_well_formed(&outcome.artifact.xml);

    Ok(())
}

// Test that a pattern which cannot compile matches nothing and the rest still apply
#[test]
fn test_invalid_pattern_does_not_abort_discovery() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(temp_dir.path(), "src/app.js", "run();\n")?;
    write_file(temp_dir.path(), "src/app.min.js", "run();")?;
    write_file(temp_dir.path(), "aaaa.rs", "fn main() {}\n")?;

    // Large enough to exceed the regex size limit
    let oversized = "a*".repeat(200_000);
    let outcome = run(
        temp_dir.path(),
        ConfigOverrides {
            ignore_patterns: Some(vec![oversized.clone(), "**/*.min.js".to_string()]),
            ..Default::default()
        },
    );

    assert!(outcome.is_success());
    let expected: BTreeSet<String> = ["src/app.js", "aaaa.rs"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(file_paths(&outcome), expected);

    let rejected: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::InvalidPattern)
        .collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].path, oversized);

    Ok(())
}
