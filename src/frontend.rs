use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

#[cfg(feature = "embed-frontend")]
#[derive(rust_embed::RustEmbed)]
#[folder = "frontend/"]
struct BundledFiles;

#[derive(Debug)]
pub struct Asset {
    pub bytes: Cow<'static, [u8]>,
    pub content_type: mime::Mime,
}

/// Where the login/register pages and their css/js come from.
#[derive(Debug, Clone)]
pub enum Frontend {
    #[cfg(feature = "embed-frontend")]
    Embedded,
    Directory(PathBuf),
}

impl Default for Frontend {
    #[cfg(feature = "embed-frontend")]
    fn default() -> Self {
        Frontend::Embedded
    }

    #[cfg(not(feature = "embed-frontend"))]
    fn default() -> Self {
        Frontend::Directory(PathBuf::from("frontend"))
    }
}

impl Frontend {
    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        dir.map(Frontend::Directory).unwrap_or_default()
    }

    /// Look up a relative asset path such as `css/styles.css`.
    pub fn get(&self, path: &str) -> Option<Asset> {
        let rel = sanitize(path)?;
        let bytes: Cow<'static, [u8]> = match self {
            #[cfg(feature = "embed-frontend")]
            Frontend::Embedded => BundledFiles::get(&rel)?.data,
            Frontend::Directory(dir) => Cow::Owned(std::fs::read(dir.join(&rel)).ok()?),
        };
        Some(Asset { bytes, content_type: content_type(&rel) })
    }
}

// Only plain relative segments; anything that could leave the asset root is refused.
fn sanitize(path: &str) -> Option<String> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    for c in Path::new(path).components() {
        match c {
            Component::Normal(p) => parts.push(p.to_str()?),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

fn content_type(path: &str) -> mime::Mime {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("html") => mime::TEXT_HTML_UTF_8,
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("json") => mime::APPLICATION_JSON,
        Some("png") => mime::IMAGE_PNG,
        Some("svg") => mime::IMAGE_SVG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_refused() {
        assert_eq!(sanitize("../secret"), None);
        assert_eq!(sanitize("css/../../etc/passwd"), None);
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("/css/styles.css").as_deref(), Some("css/styles.css"));
    }

    #[test]
    fn directory_frontend_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("js")).unwrap();
        std::fs::write(dir.path().join("js/app.js"), "console.log(1)").unwrap();
        let fe = Frontend::Directory(dir.path().to_path_buf());

        let asset = fe.get("js/app.js").unwrap();
        assert_eq!(asset.bytes.as_ref(), b"console.log(1)");
        assert_eq!(asset.content_type, mime::APPLICATION_JAVASCRIPT_UTF_8);
        assert!(fe.get("js/missing.js").is_none());
    }

    #[test]
    fn bundled_pages_are_available() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("frontend");
        let fe = Frontend::from_dir(Some(dir));
        for page in ["login.html", "register.html", "css/styles.css", "js/auth.js"] {
            assert!(fe.get(page).is_some(), "{page} missing");
        }
        assert_eq!(fe.get("login.html").unwrap().content_type, mime::TEXT_HTML_UTF_8);
    }

    #[cfg(feature = "embed-frontend")]
    #[test]
    fn embedded_pages_are_compiled_in() {
        let fe = Frontend::default();
        assert!(matches!(fe, Frontend::Embedded));
        assert!(fe.get("register.html").is_some());
        assert!(fe.get("../Cargo.toml").is_none());
    }
}
