//! Resource registry
//!
//! Retrievable values addressed by URI: inline text, inline binary,
//! dynamically produced values, file-backed values, and URI templates that
//! expand a single trailing `{param}` into a family of resources.
//!
//! Lookup order for `resources/read` is exact static match first, then
//! templates in registration order (first hit wins) - when both would
//! match, static wins. File access is funneled through a safety predicate:
//! no absolute paths, no `..` segments, no dotfiles, regular files only,
//! bounded size. Every violation is reported to the caller as plain
//! not-found so the error channel leaks nothing about the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use embermcp_protocol::types::{
    ReadResourceResult, Resource, ResourceContents, ResourceTemplate,
};

use crate::error::{ServerError, ServerResult};

/// Placeholder text returned for binary content until a binary-aware
/// response encoding lands.
const BINARY_PLACEHOLDER: &str = "[Binary content not supported yet]";

/// Producer closure for dynamic text resources
pub type TextProducer = Arc<dyn Fn() -> ServerResult<String> + Send + Sync>;

/// Producer closure for dynamic binary resources
pub type BinaryProducer = Arc<dyn Fn() -> ServerResult<Vec<u8>> + Send + Sync>;

/// Handler closure invoked with the extracted template parameter
pub type TemplateHandler = Arc<dyn Fn(&str) -> ServerResult<ResourceValue> + Send + Sync>;

/// A produced resource value, before response shaping
#[derive(Debug, Clone)]
pub enum ResourceValue {
    /// Text content
    Text {
        /// MIME type of the content
        mime_type: String,
        /// The content itself
        text: String,
    },
    /// Binary content
    Binary {
        /// MIME type of the content
        mime_type: String,
        /// The raw bytes
        data: Vec<u8>,
    },
}

impl ResourceValue {
    /// The MIME type of this value
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Text { mime_type, .. } | Self::Binary { mime_type, .. } => mime_type,
        }
    }

    fn into_contents(self, uri: &str) -> ResourceContents {
        match self {
            Self::Text { mime_type, text } => ResourceContents {
                uri: uri.to_string(),
                mime_type,
                text,
            },
            Self::Binary { mime_type, .. } => ResourceContents {
                uri: uri.to_string(),
                mime_type,
                text: BINARY_PLACEHOLDER.to_string(),
            },
        }
    }
}

enum ResourceKind {
    Text(String),
    Binary(Vec<u8>),
    DynamicText(TextProducer),
    DynamicBinary(BinaryProducer),
    File(PathBuf),
}

struct RegisteredResource {
    descriptor: Resource,
    kind: ResourceKind,
}

struct RegisteredTemplate {
    descriptor: ResourceTemplate,
    // Literal part of the pattern up to the `{param}` token.
    prefix: String,
    handler: TemplateHandler,
}

#[derive(Default)]
struct ResourceTable {
    entries: HashMap<String, Arc<RegisteredResource>>,
    order: Vec<String>,
    templates: Vec<Arc<RegisteredTemplate>>,
}

/// Registry of URI-addressed resources and templates
pub struct ResourceRegistry {
    table: RwLock<ResourceTable>,
    max_file_size: u64,
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.read();
        f.debug_struct("ResourceRegistry")
            .field("resources", &table.order)
            .field("templates", &table.templates.len())
            .finish()
    }
}

impl ResourceRegistry {
    /// Create a registry with the given file-size ceiling
    pub fn new(max_file_size: u64) -> Self {
        Self {
            table: RwLock::new(ResourceTable::default()),
            max_file_size,
        }
    }

    fn add_entry(&self, descriptor: Resource, kind: ResourceKind) -> ServerResult<()> {
        let uri = descriptor.uri.clone();
        let mut table = self.table.write();
        if table.entries.contains_key(&uri) {
            return Err(ServerError::Registration(format!(
                "resource '{uri}' is already registered"
            )));
        }
        table
            .entries
            .insert(uri.clone(), Arc::new(RegisteredResource { descriptor, kind }));
        table.order.push(uri.clone());
        drop(table);
        info!(uri = %uri, "resource registered");
        Ok(())
    }

    /// Register an inline text resource
    pub fn add_text(
        &self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        content: impl Into<String>,
    ) -> ServerResult<()> {
        self.add_entry(
            Resource {
                uri: uri.into(),
                name: name.into(),
                description,
                mime_type: mime_type.unwrap_or_else(|| "text/plain".to_string()),
            },
            ResourceKind::Text(content.into()),
        )
    }

    /// Register an inline binary resource
    pub fn add_binary(
        &self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        data: Vec<u8>,
    ) -> ServerResult<()> {
        self.add_entry(
            Resource {
                uri: uri.into(),
                name: name.into(),
                description,
                mime_type: mime_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            },
            ResourceKind::Binary(data),
        )
    }

    /// Register a dynamic text resource whose producer runs on every read
    pub fn add_dynamic_text(
        &self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        producer: TextProducer,
    ) -> ServerResult<()> {
        self.add_entry(
            Resource {
                uri: uri.into(),
                name: name.into(),
                description,
                mime_type: mime_type.unwrap_or_else(|| "text/plain".to_string()),
            },
            ResourceKind::DynamicText(producer),
        )
    }

    /// Register a dynamic binary resource whose producer runs on every read
    pub fn add_dynamic_binary(
        &self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        producer: BinaryProducer,
    ) -> ServerResult<()> {
        self.add_entry(
            Resource {
                uri: uri.into(),
                name: name.into(),
                description,
                mime_type: mime_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            },
            ResourceKind::DynamicBinary(producer),
        )
    }

    /// Register a file-backed resource.
    ///
    /// The MIME type is detected from the extension when not supplied. The
    /// path is checked against the safety predicate at read time, not here.
    pub fn add_file(
        &self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        path: impl Into<PathBuf>,
    ) -> ServerResult<()> {
        let path = path.into();
        let mime_type =
            mime_type.unwrap_or_else(|| detect_mime_type(&path.to_string_lossy()).to_string());
        self.add_entry(
            Resource {
                uri: uri.into(),
                name: name.into(),
                description,
                mime_type,
            },
            ResourceKind::File(path),
        )
    }

    /// Register a URI template.
    ///
    /// The pattern must contain exactly one `{param}` placeholder, at the
    /// tail. Template names live in their own namespace.
    pub fn add_template(
        &self,
        uri_template: impl Into<String>,
        name: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
        mime_type: Option<String>,
        handler: TemplateHandler,
    ) -> ServerResult<()> {
        let uri_template = uri_template.into();
        let prefix = template_prefix(&uri_template)?;
        let name = name.into();

        let mut table = self.table.write();
        if table.templates.iter().any(|t| t.descriptor.name == name) {
            return Err(ServerError::Registration(format!(
                "template '{name}' is already registered"
            )));
        }
        table.templates.push(Arc::new(RegisteredTemplate {
            descriptor: ResourceTemplate {
                uri_template: uri_template.clone(),
                name,
                title,
                description,
                mime_type,
            },
            prefix,
            handler,
        }));
        drop(table);
        info!(template = %uri_template, "resource template registered");
        Ok(())
    }

    /// Number of registered static resources
    pub fn len(&self) -> usize {
        self.table.read().entries.len()
    }

    /// Whether no static resources are registered
    pub fn is_empty(&self) -> bool {
        self.table.read().entries.is_empty()
    }

    /// Number of registered templates
    pub fn template_count(&self) -> usize {
        self.table.read().templates.len()
    }

    /// Whether anything (static or template) is registered
    pub fn has_registrations(&self) -> bool {
        let table = self.table.read();
        !table.entries.is_empty() || !table.templates.is_empty()
    }

    /// Resource descriptors for `resources/list`, most recently registered
    /// first
    pub fn list(&self) -> Vec<Resource> {
        let table = self.table.read();
        table
            .order
            .iter()
            .rev()
            .filter_map(|uri| table.entries.get(uri))
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Template descriptors for `resources/templates/list`, in registration
    /// order
    pub fn list_templates(&self) -> Vec<ResourceTemplate> {
        self.table
            .read()
            .templates
            .iter()
            .map(|t| t.descriptor.clone())
            .collect()
    }

    /// Read a URI: exact static match first, then templates in registration
    /// order.
    pub fn read(&self, uri: &str) -> ServerResult<ReadResourceResult> {
        enum Hit {
            Entry(Arc<RegisteredResource>),
            Template(Arc<RegisteredTemplate>),
        }

        let hit = {
            let table = self.table.read();
            if let Some(entry) = table.entries.get(uri) {
                Some(Hit::Entry(Arc::clone(entry)))
            } else {
                table
                    .templates
                    .iter()
                    .find(|t| uri.starts_with(&t.prefix))
                    .map(|t| Hit::Template(Arc::clone(t)))
            }
        };

        let value = match hit {
            Some(Hit::Entry(entry)) => self.read_entry(&entry)?,
            Some(Hit::Template(template)) => {
                let param = &uri[template.prefix.len()..];
                debug!(template = %template.descriptor.name, param, "template matched");
                (template.handler)(param)?
            }
            None => return Err(ServerError::ResourceNotFound(uri.to_string())),
        };

        Ok(ReadResourceResult {
            contents: vec![value.into_contents(uri)],
        })
    }

    fn read_entry(&self, entry: &RegisteredResource) -> ServerResult<ResourceValue> {
        let mime_type = entry.descriptor.mime_type.clone();
        match &entry.kind {
            ResourceKind::Text(content) => Ok(ResourceValue::Text {
                mime_type,
                text: content.clone(),
            }),
            ResourceKind::Binary(data) => Ok(ResourceValue::Binary {
                mime_type,
                data: data.clone(),
            }),
            ResourceKind::DynamicText(producer) => Ok(ResourceValue::Text {
                mime_type,
                text: producer()?,
            }),
            ResourceKind::DynamicBinary(producer) => Ok(ResourceValue::Binary {
                mime_type,
                data: producer()?,
            }),
            ResourceKind::File(path) => {
                read_file_value(&path.to_string_lossy(), Some(&mime_type), self.max_file_size)
            }
        }
    }
}

/// Extract the literal prefix of a template pattern, validating that it
/// carries exactly one `{param}` placeholder at the tail.
fn template_prefix(pattern: &str) -> ServerResult<String> {
    let open = pattern.find('{');
    let close = pattern.find('}');
    let (Some(open), Some(close)) = (open, close) else {
        return Err(ServerError::Registration(format!(
            "template '{pattern}' has no {{param}} placeholder"
        )));
    };
    let valid = close == pattern.len() - 1
        && close > open + 1
        && pattern.matches('{').count() == 1
        && pattern.matches('}').count() == 1;
    if !valid {
        return Err(ServerError::Registration(format!(
            "template '{pattern}' must end with a single {{param}} placeholder"
        )));
    }
    Ok(pattern[..open].to_string())
}

/// Reduce a raw path to a safe relative form, or reject it.
///
/// Strips a `file://` scheme and leading slashes, then refuses `..`
/// segments and leading-dot names other than `./`.
fn sanitize_relative_path(raw: &str) -> Option<&str> {
    let stripped = raw.strip_prefix("file://").unwrap_or(raw);
    let stripped = stripped.trim_start_matches('/');
    if stripped.is_empty() {
        return None;
    }
    if Path::new(stripped).is_absolute() {
        return None;
    }
    if stripped.split('/').any(|segment| segment == "..") {
        return None;
    }
    if stripped.starts_with('.') && !stripped.starts_with("./") {
        return None;
    }
    Some(stripped)
}

/// Read a file under the safety predicate and classify it as text or
/// binary by MIME type.
fn read_file_value(
    raw_path: &str,
    declared_mime: Option<&str>,
    max_size: u64,
) -> ServerResult<ResourceValue> {
    let Some(relative) = sanitize_relative_path(raw_path) else {
        warn!(path = raw_path, "unsafe resource path rejected");
        return Err(ServerError::ResourceAccess(format!(
            "path '{raw_path}' fails the safety rules"
        )));
    };
    read_file_at(Path::new(relative), declared_mime, max_size)
}

fn read_file_at(
    path: &Path,
    declared_mime: Option<&str>,
    max_size: u64,
) -> ServerResult<ResourceValue> {
    let deny = |reason: &str| {
        warn!(path = %path.display(), reason, "file resource rejected");
        ServerError::ResourceAccess(format!("{}: {reason}", path.display()))
    };

    let metadata = std::fs::metadata(path).map_err(|e| deny(&e.to_string()))?;
    if !metadata.is_file() {
        return Err(deny("not a regular file"));
    }
    if metadata.len() > max_size {
        return Err(deny("exceeds the size ceiling"));
    }

    let mime_type = declared_mime
        .map(str::to_string)
        .unwrap_or_else(|| detect_mime_type(&path.to_string_lossy()).to_string());
    let data = std::fs::read(path).map_err(|e| deny(&e.to_string()))?;

    if is_text_mime(&mime_type) {
        Ok(ResourceValue::Text {
            mime_type,
            text: String::from_utf8_lossy(&data).into_owned(),
        })
    } else {
        Ok(ResourceValue::Binary { mime_type, data })
    }
}

fn is_text_mime(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json" | "application/xml" | "application/javascript"
        )
}

/// Detect a MIME type from a file extension, defaulting to
/// `application/octet-stream`.
pub(crate) fn detect_mime_type(path: &str) -> &'static str {
    let Some(ext) = path.rsplit('.').next().filter(|e| !e.contains('/')) else {
        return "application/octet-stream";
    };
    match ext.to_ascii_lowercase().as_str() {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "c" | "h" => "text/x-c",
        "cpp" | "hpp" => "text/x-c++",
        "py" => "text/x-python",
        "rs" => "text/x-rust",
        "go" => "text/x-go",
        "java" => "text/x-java",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Template handler resolving the parameter as a file path under a root
/// directory, subject to the safety predicate.
#[derive(Debug, Clone)]
pub struct SafeFileHandler {
    root: PathBuf,
    max_file_size: u64,
}

impl SafeFileHandler {
    /// A handler rooted at `root` with a 1 MiB size ceiling
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size: 1024 * 1024,
        }
    }

    /// Override the size ceiling
    pub fn with_max_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Resolve and read the parameter as a relative path under the root
    pub fn read(&self, param: &str) -> ServerResult<ResourceValue> {
        let Some(relative) = sanitize_relative_path(param) else {
            warn!(param, "unsafe template path rejected");
            return Err(ServerError::ResourceAccess(format!(
                "path '{param}' fails the safety rules"
            )));
        };
        read_file_at(&self.root.join(relative), None, self.max_file_size)
    }

    /// Convert into a [`TemplateHandler`] closure
    pub fn into_handler(self) -> TemplateHandler {
        Arc::new(move |param: &str| self.read(param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> ResourceRegistry {
        ResourceRegistry::new(1024 * 1024)
    }

    #[test]
    fn inline_text_roundtrip() {
        let registry = registry();
        registry
            .add_text("embed://info", "info", Some("About".into()), None, "hello")
            .unwrap();
        let result = registry.read("embed://info").unwrap();
        assert_eq!(result.contents[0].uri, "embed://info");
        assert_eq!(result.contents[0].mime_type, "text/plain");
        assert_eq!(result.contents[0].text, "hello");
    }

    #[test]
    fn inline_binary_reads_as_placeholder() {
        let registry = registry();
        registry
            .add_binary("embed://blob", "blob", None, None, vec![0, 159, 146, 150])
            .unwrap();
        let result = registry.read("embed://blob").unwrap();
        assert_eq!(result.contents[0].mime_type, "application/octet-stream");
        assert_eq!(result.contents[0].text, BINARY_PLACEHOLDER);
    }

    #[test]
    fn dynamic_text_runs_the_producer() {
        let registry = registry();
        registry
            .add_dynamic_text(
                "embed://status",
                "status",
                None,
                Some("application/json".into()),
                Arc::new(|| -> ServerResult<String> { Ok(r#"{"ok":true}"#.to_string()) }),
            )
            .unwrap();
        let result = registry.read("embed://status").unwrap();
        assert_eq!(result.contents[0].text, r#"{"ok":true}"#);
    }

    #[test]
    fn duplicate_uri_is_rejected() {
        let registry = registry();
        registry
            .add_text("embed://x", "x", None, None, "1")
            .unwrap();
        assert!(
            registry
                .add_text("embed://x", "other", None, None, "2")
                .is_err()
        );
    }

    #[test]
    fn unknown_uri_is_not_found() {
        let registry = registry();
        assert!(matches!(
            registry.read("embed://missing"),
            Err(ServerError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn listing_is_most_recent_first() {
        let registry = registry();
        registry.add_text("embed://a", "a", None, None, "1").unwrap();
        registry.add_text("embed://b", "b", None, None, "2").unwrap();
        let uris: Vec<String> = registry.list().into_iter().map(|r| r.uri).collect();
        assert_eq!(uris, vec!["embed://b", "embed://a"]);
    }

    #[test]
    fn template_pattern_rules() {
        assert_eq!(template_prefix("file:///./{path}").unwrap(), "file:///./");
        assert!(template_prefix("no-placeholder").is_err());
        assert!(template_prefix("two/{a}/{b}").is_err());
        assert!(template_prefix("mid/{a}/tail").is_err());
        assert!(template_prefix("empty/{}").is_err());
    }

    #[test]
    fn static_match_wins_over_template() {
        let registry = registry();
        registry
            .add_template(
                "embed://{key}",
                "catchall",
                None,
                None,
                None,
                Arc::new(|param: &str| -> ServerResult<ResourceValue> {
                    Ok(ResourceValue::Text {
                        mime_type: "text/plain".into(),
                        text: format!("template:{param}"),
                    })
                }),
            )
            .unwrap();
        registry
            .add_text("embed://static", "static", None, None, "static wins")
            .unwrap();

        let result = registry.read("embed://static").unwrap();
        assert_eq!(result.contents[0].text, "static wins");

        let result = registry.read("embed://other").unwrap();
        assert_eq!(result.contents[0].text, "template:other");
    }

    #[test]
    fn first_matching_template_wins() {
        let registry = registry();
        for (name, text) in [("first", "1"), ("second", "2")] {
            let text = text.to_string();
            registry
                .add_template(
                    "dup://{key}",
                    name,
                    None,
                    None,
                    None,
                    Arc::new(move |_: &str| -> ServerResult<ResourceValue> {
                        Ok(ResourceValue::Text {
                            mime_type: "text/plain".into(),
                            text: text.clone(),
                        })
                    }),
                )
                .unwrap();
        }
        let result = registry.read("dup://anything").unwrap();
        assert_eq!(result.contents[0].text, "1");
    }

    #[test]
    fn path_safety_predicate() {
        assert_eq!(sanitize_relative_path("./x"), Some("./x"));
        assert_eq!(sanitize_relative_path("a/b.txt"), Some("a/b.txt"));
        assert_eq!(sanitize_relative_path("file:///./a.md"), Some("./a.md"));
        assert_eq!(sanitize_relative_path("/etc/passwd"), Some("etc/passwd"));
        assert_eq!(sanitize_relative_path("../etc/passwd"), None);
        assert_eq!(sanitize_relative_path("a/../../b"), None);
        assert_eq!(sanitize_relative_path(".hidden"), None);
        assert_eq!(sanitize_relative_path(""), None);
        assert_eq!(sanitize_relative_path("file:///"), None);
    }

    #[test]
    fn safe_file_handler_reads_and_rejects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme").unwrap();

        let handler = SafeFileHandler::new(dir.path());
        let value = handler.read("README.md").unwrap();
        assert_eq!(value.mime_type(), "text/markdown");
        match value {
            ResourceValue::Text { text, .. } => assert_eq!(text, "# readme"),
            other => panic!("expected text, got {other:?}"),
        }

        assert!(matches!(
            handler.read("../etc/passwd"),
            Err(ServerError::ResourceAccess(_))
        ));
        assert!(matches!(
            handler.read("missing.md"),
            Err(ServerError::ResourceAccess(_))
        ));
    }

    #[test]
    fn safe_file_handler_enforces_the_size_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.txt"), vec![b'x'; 64]).unwrap();

        let handler = SafeFileHandler::new(dir.path()).with_max_size(32);
        assert!(matches!(
            handler.read("big.txt"),
            Err(ServerError::ResourceAccess(_))
        ));
    }

    #[test]
    fn directories_are_not_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let handler = SafeFileHandler::new(dir.path());
        assert!(matches!(
            handler.read("sub"),
            Err(ServerError::ResourceAccess(_))
        ));
    }

    #[test]
    fn file_template_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "# hello").unwrap();

        let registry = registry();
        registry
            .add_template(
                "file:///./{path}",
                "project-files",
                Some("Project files".into()),
                None,
                None,
                SafeFileHandler::new(dir.path()).into_handler(),
            )
            .unwrap();

        let result = registry.read("file:///./README.md").unwrap();
        assert_eq!(result.contents[0].uri, "file:///./README.md");
        assert_eq!(result.contents[0].mime_type, "text/markdown");
        assert_eq!(result.contents[0].text, "# hello");

        assert!(matches!(
            registry.read("file:///./../etc/passwd"),
            Err(ServerError::ResourceAccess(_))
        ));
    }

    #[test]
    fn mime_detection_table() {
        assert_eq!(detect_mime_type("a.txt"), "text/plain");
        assert_eq!(detect_mime_type("a.md"), "text/markdown");
        assert_eq!(detect_mime_type("a.HTML"), "text/html");
        assert_eq!(detect_mime_type("a.json"), "application/json");
        assert_eq!(detect_mime_type("a.xml"), "application/xml");
        assert_eq!(detect_mime_type("a.js"), "application/javascript");
        assert_eq!(detect_mime_type("src/main.rs"), "text/x-rust");
        assert_eq!(detect_mime_type("a.py"), "text/x-python");
        assert_eq!(detect_mime_type("a.java"), "text/x-java");
        assert_eq!(detect_mime_type("a.png"), "image/png");
        assert_eq!(detect_mime_type("a.jpeg"), "image/jpeg");
        assert_eq!(detect_mime_type("noext"), "application/octet-stream");
        assert_eq!(detect_mime_type("weird.bin"), "application/octet-stream");
    }

    #[test]
    fn file_backed_resource_applies_the_predicate() {
        let registry = registry();
        registry
            .add_file(
                "file://secrets",
                "secrets",
                None,
                None,
                "../outside.txt",
            )
            .unwrap();
        assert!(matches!(
            registry.read("file://secrets"),
            Err(ServerError::ResourceAccess(_))
        ));
    }

    #[test]
    fn template_listing_keeps_registration_order() {
        let registry = registry();
        let noop: TemplateHandler = Arc::new(|_: &str| -> ServerResult<ResourceValue> {
            Ok(ResourceValue::Text {
                mime_type: "text/plain".into(),
                text: String::new(),
            })
        });
        registry
            .add_template("a://{x}", "alpha", None, None, None, noop.clone())
            .unwrap();
        registry
            .add_template("b://{x}", "beta", None, None, None, noop)
            .unwrap();
        let names: Vec<String> = registry
            .list_templates()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }
}
