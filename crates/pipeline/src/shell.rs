//! Credential helper expression construction
//!
//! git runs a helper value starting with `!` through the shell, so the
//! binding path embedded in it must survive word splitting and expansion.

use shell_escape::unix::escape;
use std::path::Path;

/// File inside a binding holding the credential helper's output
pub const CREDENTIALS_FILE: &str = "credentials";

/// Quotes `path` for interpolation into a POSIX shell command line.
///
/// Paths made only of safe characters are returned unchanged; anything else
/// is single-quoted with embedded single quotes escaped.
pub fn quote_path(path: &Path) -> String {
    escape(path.to_string_lossy()).into_owned()
}

/// Helper value that prints `<binding_path>/credentials` when git invokes it
pub fn credential_helper_expression(binding_path: &Path) -> String {
    format!(
        "!f() {{ cat {}; }}; f",
        quote_path(&binding_path.join(CREDENTIALS_FILE))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_unquoted() {
        assert_eq!(
            credential_helper_expression(Path::new("some-path")),
            "!f() { cat some-path/credentials; }; f"
        );
    }

    #[test]
    fn test_path_with_spaces() {
        assert_eq!(
            credential_helper_expression(Path::new("/bindings/my creds")),
            "!f() { cat '/bindings/my creds/credentials'; }; f"
        );
    }

    #[test]
    fn test_path_with_single_quote() {
        assert_eq!(
            quote_path(Path::new("/bindings/it's")),
            "'/bindings/it'\\''s'"
        );
    }

    #[test]
    fn test_metacharacters_are_quoted() {
        for raw in [
            "/b/$HOME",
            "/b/`id`",
            "/b/a;rm -rf x",
            "/b/a|b",
            "/b/a&b",
            "/b/\"quoted\"",
            "/b/line\nbreak",
            "/b/glob*",
        ] {
            let quoted = quote_path(Path::new(raw));
            assert!(quoted.starts_with('\''), "{raw:?} -> {quoted}");
            assert!(quoted.ends_with('\''), "{raw:?} -> {quoted}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_expression_reads_file_through_the_shell() {
        use std::process::Command;

        let temp = tempfile::TempDir::new().unwrap();
        let binding = temp.path().join("we'ird $dir `x` ; name");
        std::fs::create_dir(&binding).unwrap();
        std::fs::write(binding.join(CREDENTIALS_FILE), "username=u\npassword=p\n").unwrap();

        let expression = credential_helper_expression(&binding);
        // git strips the leading `!` before handing the rest to the shell
        let script = expression.trim_start_matches('!');
        let output = Command::new("sh").arg("-c").arg(script).output().unwrap();

        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "username=u\npassword=p\n"
        );
    }
}
