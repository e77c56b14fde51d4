//! Textual `{{include <path>}}` substitution.
//!
//! Expansion is a single, non-recursive pass: text pulled in by a directive
//! is copied verbatim, even if it contains directives of its own. Paths
//! resolve against the directory of the file holding the directive.

use std::fs;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Chainable, Result};

const MARKER: &[u8] = b"{{include ";

static INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{include ([^}]+)\}\}").expect("include pattern is valid")
});

/// Replaces every include directive in `body` with the contents of the file
/// it names, resolved relative to `dir`. A directive naming an unreadable
/// file is an error.
pub fn expand(body: &str, dir: &Path) -> Result<String> {
    if memchr::memmem::find(body.as_bytes(), MARKER).is_none() {
        return Ok(body.to_owned());
    }

    let mut output = String::with_capacity(body.len());
    let mut last = 0;
    for captures in INCLUDE.captures_iter(body) {
        let (Some(directive), Some(target)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let path = resolve(dir, target.as_str());
        let included = fs::read_to_string(&path).chain_with(|| error! {
            "failed to read included file",
            "directive" => directive.as_str(),
            "resolved path" => path.display(),
        })?;

        log::trace!("including {} into {}", path.display(), dir.display());
        output.push_str(&body[last..directive.start()]);
        output.push_str(&included);
        last = directive.end();
    }

    output.push_str(&body[last..]);
    Ok(output)
}

/// Joins `target` onto `dir`. Root and prefix components are dropped, so a
/// leading `/` still resolves inside `dir`.
fn resolve(dir: &Path, target: &str) -> PathBuf {
    Path::new(target).components().fold(dir.to_path_buf(), |mut path, component| {
        if let Component::Normal(_) | Component::ParentDir = component {
            path.push(component);
        }

        path
    })
}

/// Reads the file at `path` and expands its includes relative to its own
/// directory.
pub fn read_expanded(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).chain_with(|| error! {
        "failed to read file",
        "path" => path.display(),
    })?;

    let dir = path.parent().unwrap_or(Path::new(""));
    expand(&text, dir).chain_with(|| error! {
        "include expansion failed",
        "file" => path.display(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{expand, read_expanded};

    #[test]
    fn replaces_directive_and_nothing_else() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("partial.html"), "<b>Hi</b>").unwrap();

        let body = "<p>before {{include partial.html}} after</p>\n";
        let expanded = expand(body, dir.path()).unwrap();
        assert_eq!(expanded, "<p>before <b>Hi</b> after</p>\n");
    }

    #[test]
    fn leading_slash_stays_in_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("partial.html"), "<b>Hi</b>").unwrap();

        let expanded = expand("a {{include /partial.html}} b", dir.path()).unwrap();
        assert_eq!(expanded, "a <b>Hi</b> b");

        let e = expand("{{include /etc/hostname}}", dir.path()).unwrap_err();
        let resolved = dir.path().join("etc/hostname");
        assert!(e.to_string().contains(&format!("resolved path: {}", resolved.display())));
    }

    #[test]
    fn parent_directories_are_followed() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("_footer.html"), "F").unwrap();

        let expanded = expand("{{include ../_footer.html}}", &dir.path().join("docs")).unwrap();
        assert_eq!(expanded, "F");
    }

    #[test]
    fn expands_every_directive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("parts/head.html"), "H").unwrap();
        fs::write(dir.path().join("foot.html"), "F").unwrap();

        let body = "{{include parts/head.html}}-{{include foot.html}}-{{include parts/head.html}}";
        assert_eq!(expand(body, dir.path()).unwrap(), "H-F-H");
    }

    #[test]
    fn included_text_is_not_rescanned() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("outer.html"), "[{{include inner.html}}]").unwrap();

        let expanded = expand("{{include outer.html}}", dir.path()).unwrap();
        assert_eq!(expanded, "[{{include inner.html}}]");
    }

    #[test]
    fn text_without_directives_is_untouched() {
        let dir = TempDir::new().unwrap();
        let body = "{{ Title }} {{include}} {{ markdown(Content) }}";
        assert_eq!(expand(body, dir.path()).unwrap(), body);
    }

    #[test]
    fn missing_include_is_an_error() {
        let dir = TempDir::new().unwrap();
        let e = expand("x {{include nope.html}} y", dir.path()).unwrap_err();
        assert_eq!(e.message(), "failed to read included file");
        assert!(e.to_string().contains("directive: {{include nope.html}}"));
    }

    #[test]
    fn reads_relative_to_the_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/_nav.html"), "<nav/>").unwrap();
        fs::write(dir.path().join("docs/page.html"), "{{include _nav.html}}<main/>").unwrap();

        let text = read_expanded(&dir.path().join("docs/page.html")).unwrap();
        assert_eq!(text, "<nav/><main/>");
    }
}
