use std::fs;
use std::path::{Component, Path, PathBuf};

/// What a request target points at inside the served tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// An on-disk file to stream back.
    File(PathBuf),
    /// A directory with no index file; render a generated listing.
    Listing(PathBuf),
    /// A directory requested without a trailing slash; relative links
    /// only resolve correctly against the slash-terminated form.
    Redirect(String),
    /// The target stepped outside the served tree.
    Forbidden,
    NotFound,
}

impl Resolved {
    pub(crate) fn status(&self) -> u16 {
        match self {
            Self::File(_) | Self::Listing(_) => 200,
            Self::Redirect(_) => 301,
            Self::Forbidden => 403,
            Self::NotFound => 404,
        }
    }
}

/// Map a request target onto the served tree.
///
/// The caller is expected to have stripped any query string. A
/// directory resolves to its `index.html` when one exists, otherwise to
/// a listing.
pub(crate) fn resolve(root: &Path, target: &str) -> Resolved {
    let Some(rel) = sandboxed(target) else {
        return Resolved::Forbidden;
    };

    let path = root.join(rel);
    if path.is_file() {
        return Resolved::File(path);
    }
    if path.is_dir() {
        if !target.ends_with('/') {
            return Resolved::Redirect(format!("{target}/"));
        }
        let index = path.join("index.html");
        if index.is_file() {
            return Resolved::File(index);
        }
        return Resolved::Listing(path);
    }
    Resolved::NotFound
}

/// Reduce a request path to a relative path that cannot escape the
/// served root. Parent-directory and root segments are rejected rather
/// than normalized away.
fn sandboxed(target: &str) -> Option<PathBuf> {
    let rel = target.strip_prefix('/').unwrap_or(target);
    let mut clean = PathBuf::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(segment) => clean.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(clean)
}

/// Render the fallback directory listing as an HTML page.
///
/// Entries are sorted by name, directories marked with a trailing
/// slash, matching what browsers get from stock development servers.
pub(crate) fn listing(dir: &Path, target: &str) -> std::io::Result<String> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            name.push('/');
        }
        entries.push(name);
    }
    entries.sort();

    let title = format!("Directory listing for {}", escape_html(target));
    let mut page = String::new();
    page.push_str("<!DOCTYPE HTML>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    page.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for name in &entries {
        let href = escape_html(name);
        let label = escape_html(name);
        page.push_str(&format!("<li><a href=\"{href}\">{label}</a></li>\n"));
    }
    page.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(page)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("hello.txt"), "hello\n").unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub/page.html"), "<p>page</p>").unwrap();
        root
    }

    #[test]
    fn file_targets_resolve_to_the_file() {
        let root = fixture();
        assert_eq!(
            resolve(root.path(), "/hello.txt"),
            Resolved::File(root.path().join("hello.txt"))
        );
        assert_eq!(
            resolve(root.path(), "/sub/page.html"),
            Resolved::File(root.path().join("sub/page.html"))
        );
    }

    #[test]
    fn directories_prefer_their_index_file() {
        let root = fixture();
        fs::write(root.path().join("sub/index.html"), "<p>index</p>").unwrap();
        assert_eq!(
            resolve(root.path(), "/sub/"),
            Resolved::File(root.path().join("sub/index.html"))
        );
    }

    #[test]
    fn directories_without_an_index_list_their_entries() {
        let root = fixture();
        assert_eq!(
            resolve(root.path(), "/sub/"),
            Resolved::Listing(root.path().join("sub"))
        );
    }

    #[test]
    fn bare_directory_targets_redirect_to_the_slash_form() {
        let root = fixture();
        assert_eq!(
            resolve(root.path(), "/sub"),
            Resolved::Redirect("/sub/".to_owned())
        );
    }

    #[test]
    fn parent_segments_are_forbidden() {
        let root = fixture();
        assert_eq!(resolve(root.path(), "/../hello.txt"), Resolved::Forbidden);
        assert_eq!(resolve(root.path(), "/sub/../../etc"), Resolved::Forbidden);
    }

    #[test]
    fn unknown_targets_are_not_found() {
        let root = fixture();
        assert_eq!(resolve(root.path(), "/missing.txt"), Resolved::NotFound);
        assert_eq!(resolve(root.path(), "/sub/missing/"), Resolved::NotFound);
    }

    #[test]
    fn listing_is_sorted_and_marks_directories() {
        let root = fixture();
        let page = listing(root.path(), "/").unwrap();
        let hello = page.find("hello.txt").unwrap();
        let sub = page.find("sub/").unwrap();
        assert!(hello < sub);
    }

    #[test]
    fn listing_escapes_markup_in_names() {
        let root = fixture();
        fs::write(root.path().join("a&b.txt"), "").unwrap();
        let page = listing(root.path(), "/").unwrap();
        assert!(page.contains("a&amp;b.txt"));
        assert!(!page.contains("a&b.txt"));
    }
}
