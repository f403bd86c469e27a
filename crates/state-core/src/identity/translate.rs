//! URI translation between a recorded workspace and the current one
//!
//! A [`UriTranslation`] is built once per restore from the matched folder
//! pairs and then applied to every stored value. It walks arbitrary JSON
//! trees and rewrites three kinds of references:
//!
//! - URI strings (`file:///repo/src/main.rs`, `vscode-remote://host/repo`)
//! - absolute filesystem path strings (`/repo/src/main.rs`, `C:\repo\x`)
//! - marshalled URI objects (`{"$mid": 1, "scheme": "file", "path": "/repo/x"}`)
//!
//! Everything else passes through untouched.

use serde_json::{Map, Value};
use state_fs::NormalizedPath;
use url::Url;

/// Recursion limit applied when none is configured.
pub const DEFAULT_TRANSLATION_DEPTH: usize = 200;

/// `$mid` marker identifying a marshalled URI object
const MARSHALLED_URI: u64 = 1;

/// Cached fields of a marshalled URI that go stale once its path changes
const DERIVED_URI_FIELDS: [&str; 4] = ["fsPath", "external", "_formatted", "_sep"];

/// One recorded folder and where it lives in the current workspace
#[derive(Debug, Clone)]
struct FolderMapping {
    from: Url,
    to: Url,
    from_authority: String,
    /// Percent-encoded URI paths without a trailing slash
    from_uri_path: String,
    to_uri_path: String,
    /// Decoded URI paths, as carried by marshalled URIs
    from_path: NormalizedPath,
    to_path: NormalizedPath,
    /// Native paths, for `file` URIs only
    from_fs: Option<NormalizedPath>,
    to_fs: Option<NormalizedPath>,
}

impl FolderMapping {
    fn new(from: Url, to: Url) -> Self {
        Self {
            from_authority: authority(&from),
            from_uri_path: from.path().trim_end_matches('/').to_string(),
            to_uri_path: to.path().trim_end_matches('/').to_string(),
            from_path: decoded_path(&from),
            to_path: decoded_path(&to),
            from_fs: fs_path(&from),
            to_fs: fs_path(&to),
            from,
            to,
        }
    }

    fn covers(&self, scheme: &str, authority: &str) -> bool {
        self.from.scheme().eq_ignore_ascii_case(scheme) && self.from_authority == authority
    }
}

/// Rewrites references into recorded folders so they point into the
/// matching current folders.
#[derive(Debug, Clone)]
pub struct UriTranslation {
    /// Most specific (longest) recorded folder first
    mappings: Vec<FolderMapping>,
    max_depth: usize,
}

impl UriTranslation {
    /// Build a translation from `(recorded folder, current folder)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (Url, Url)>) -> Self {
        let mut mappings: Vec<FolderMapping> = pairs
            .into_iter()
            .map(|(from, to)| FolderMapping::new(from, to))
            .collect();
        mappings.sort_by(|a, b| b.from_uri_path.len().cmp(&a.from_uri_path.len()));

        Self {
            mappings,
            max_depth: DEFAULT_TRANSLATION_DEPTH,
        }
    }

    /// Limit how deep [`Self::translate`] descends; deeper nodes are kept as-is.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The matched `(recorded, current)` folder pairs.
    pub fn folders(&self) -> impl Iterator<Item = (&Url, &Url)> {
        self.mappings.iter().map(|m| (&m.from, &m.to))
    }

    /// Rewrite every folder reference inside `value`.
    pub fn translate(&self, value: Value) -> Value {
        self.walk(value, 0)
    }

    /// Rewrite a single URI, or `None` if it is outside every recorded folder.
    ///
    /// Only the folder prefix changes. The rest of the path keeps its
    /// percent-encoding as is, and query and fragment are kept.
    pub fn translate_uri(&self, uri: &Url) -> Option<Url> {
        let authority = authority(uri);
        let (mapping, path) = self
            .mappings
            .iter()
            .filter(|m| m.covers(uri.scheme(), &authority))
            .find_map(|m| {
                rebase_encoded(uri.path(), &m.from_uri_path, &m.to_uri_path).map(|p| (m, p))
            })?;

        let mut translated = mapping.to.clone();
        translated.set_path(&path);
        translated.set_query(uri.query());
        translated.set_fragment(uri.fragment());
        Some(translated)
    }

    /// Rewrite an absolute filesystem path, or `None` if it is outside every
    /// recorded `file` folder. The result uses forward slashes.
    pub fn translate_path(&self, path: &str) -> Option<String> {
        let normalized = NormalizedPath::new(path);
        if !normalized.is_absolute() {
            return None;
        }

        let mut translated = self
            .mappings
            .iter()
            .find_map(|m| normalized.rebase(m.from_fs.as_ref()?, m.to_fs.as_ref()?))?
            .to_string();
        if path.len() > 1 && path.ends_with(['/', '\\']) && !translated.ends_with('/') {
            translated.push('/');
        }
        Some(translated)
    }

    /// Rebase a decoded path, as found in marshalled URI objects.
    fn rebase_decoded(
        &self,
        scheme: &str,
        authority: &str,
        path: &NormalizedPath,
    ) -> Option<(&FolderMapping, NormalizedPath)> {
        self.mappings
            .iter()
            .filter(|m| m.covers(scheme, authority))
            .find_map(|m| path.rebase(&m.from_path, &m.to_path).map(|p| (m, p)))
    }

    fn walk(&self, value: Value, depth: usize) -> Value {
        if depth > self.max_depth {
            return value;
        }

        match value {
            Value::String(s) => match self.translate_str(&s) {
                Some(translated) => Value::String(translated),
                None => Value::String(s),
            },
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.walk(item, depth + 1))
                    .collect(),
            ),
            Value::Object(map) if is_marshalled_uri(&map) => {
                Value::Object(self.translate_marshalled(map))
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, item)| (key, self.walk(item, depth + 1)))
                    .collect(),
            ),
            other => other,
        }
    }

    fn translate_str(&self, s: &str) -> Option<String> {
        match parse_uri(s) {
            Some(uri) => self.translate_uri(&uri).map(|translated| translated.to_string()),
            None => self.translate_path(s),
        }
    }

    fn translate_marshalled(&self, mut map: Map<String, Value>) -> Map<String, Value> {
        let target = {
            let scheme = map.get("scheme").and_then(Value::as_str).unwrap_or("file");
            let authority = map.get("authority").and_then(Value::as_str).unwrap_or("");
            map.get("path")
                .and_then(Value::as_str)
                .and_then(|path| self.rebase_decoded(scheme, authority, &NormalizedPath::new(path)))
                .map(|(m, path)| (m.to.scheme().to_string(), self::authority(&m.to), path))
        };

        if let Some((scheme, authority, path)) = target {
            map.insert("scheme".into(), Value::String(scheme));
            map.insert("authority".into(), Value::String(authority));
            map.insert("path".into(), Value::String(path.to_string()));
            for field in DERIVED_URI_FIELDS {
                map.remove(field);
            }
        }
        map
    }
}

/// Move an encoded URI path from under `from` to under `to`, keeping the
/// encoded remainder untouched. Both prefixes lack a trailing slash.
fn rebase_encoded(path: &str, from: &str, to: &str) -> Option<String> {
    let rest = path.strip_prefix(from)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let rebased = format!("{to}{rest}");
    Some(if rebased.is_empty() { "/".to_string() } else { rebased })
}

/// Parse `s` as an absolute URI.
///
/// Single-letter schemes are rejected so drive paths (`C:/x`) fall through
/// to path handling.
fn parse_uri(s: &str) -> Option<Url> {
    let (scheme, _) = s.split_once(':')?;
    if scheme.len() < 2 {
        return None;
    }
    Url::parse(s).ok()
}

fn is_marshalled_uri(map: &Map<String, Value>) -> bool {
    map.get("$mid").and_then(Value::as_u64) == Some(MARSHALLED_URI)
        && map.get("path").is_some_and(Value::is_string)
}

fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

fn decoded_path(url: &Url) -> NormalizedPath {
    match urlencoding::decode(url.path()) {
        Ok(path) => NormalizedPath::new(&*path),
        Err(_) => NormalizedPath::new(url.path()),
    }
}

fn fs_path(url: &Url) -> Option<NormalizedPath> {
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok().map(NormalizedPath::new)
}
