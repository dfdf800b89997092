use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::errors::BenchError;
use super::models::{is_plain_name, Target, ToolProfile};

/// Placeholders a command template may reference.
pub const PLACEHOLDERS: &[&str] = &["url", "filename", "filepath", "server", "scheme"];

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

struct Entry {
    profile: ToolProfile,
    error_pattern: Option<Regex>,
}

/// Validated set of tool command templates, kept in declaration order.
pub struct ToolCatalog {
    entries: Vec<Entry>,
    filename_suffix: String,
}

/// Fully rendered invocation for one (tool, target) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub command: String,
    pub filename: String,
}

impl ToolCatalog {
    pub fn new(
        tools: Vec<ToolProfile>,
        filename_suffix: impl Into<String>,
    ) -> Result<Self, BenchError> {
        let filename_suffix = filename_suffix.into();
        if !filename_suffix.is_empty() && !is_plain_name(&filename_suffix) {
            return Err(BenchError::InvalidName {
                kind: "filename suffix",
                name: filename_suffix,
            });
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(tools.len());

        for profile in tools.into_iter().filter(|t| t.enabled) {
            if !is_plain_name(&profile.name) {
                return Err(BenchError::InvalidName {
                    kind: "tool",
                    name: profile.name,
                });
            }
            if !seen.insert(profile.name.clone()) {
                return Err(BenchError::DuplicateTool(profile.name));
            }
            validate_template(&profile)?;

            let error_pattern = profile
                .error_pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|e| BenchError::InvalidPattern {
                    tool: profile.name.clone(),
                    reason: e.to_string(),
                })?;

            entries.push(Entry {
                profile,
                error_pattern,
            });
        }

        if entries.is_empty() {
            return Err(BenchError::NoTools);
        }

        Ok(Self {
            entries,
            filename_suffix,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.profile.name.as_str())
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ToolProfile> {
        self.entries.iter().map(|e| &e.profile)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn error_pattern(&self, tool: &str) -> Option<&Regex> {
        self.entry(tool).and_then(|e| e.error_pattern.as_ref())
    }

    /// `{tool}_{target}{suffix}`
    pub fn filename(&self, tool: &str, target: &Target) -> String {
        format!("{}_{}{}", tool, target.name, self.filename_suffix)
    }

    pub fn render(&self, tool: &str, target: &Target) -> Result<RenderedCommand, BenchError> {
        let entry = self
            .entry(tool)
            .ok_or_else(|| BenchError::UnknownTool(tool.to_string()))?;
        let url = target.parsed_url()?;

        let filename = self.filename(tool, target);
        let server = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let command = PLACEHOLDER_RE
            .replace_all(&entry.profile.command, |caps: &regex::Captures| {
                match &caps[1] {
                    "url" => target.url.clone(),
                    "filename" => filename.clone(),
                    "filepath" => url.path().to_string(),
                    "server" => server.clone(),
                    "scheme" => url.scheme().to_string(),
                    // validated at construction
                    other => format!("{{{}}}", other),
                }
            })
            .into_owned();

        Ok(RenderedCommand { command, filename })
    }

    fn entry(&self, tool: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.profile.name == tool)
    }
}

fn validate_template(profile: &ToolProfile) -> Result<(), BenchError> {
    let mut has_url = false;
    for caps in PLACEHOLDER_RE.captures_iter(&profile.command) {
        let name = &caps[1];
        if !PLACEHOLDERS.contains(&name) {
            return Err(BenchError::UnknownPlaceholder {
                tool: profile.name.clone(),
                placeholder: name.to_string(),
            });
        }
        has_url |= name == "url";
    }
    if !has_url {
        return Err(BenchError::MissingUrlPlaceholder(profile.name.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::default_tools;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn catalog() -> ToolCatalog {
        ToolCatalog::new(default_tools(), ".download").unwrap()
    }

    #[test]
    fn test_render_curl() {
        let target = Target::new("https", "https://ftp.example.org/pub/data.fasta.gz");
        let rendered = catalog().render("curl", &target).unwrap();
        assert_eq!(rendered.filename, "curl_https.download");
        assert_eq!(
            rendered.command,
            r#"curl -v -L --max-time 300 "https://ftp.example.org/pub/data.fasta.gz" -o "curl_https.download""#
        );
    }

    #[test]
    fn test_render_decomposed_parts() {
        let tools = vec![ToolProfile::new(
            "fetch",
            "fetch --scheme {scheme} --server {server} --path {filepath} --src {url} --dst {filename}",
        )];
        let catalog = ToolCatalog::new(tools, ".bin").unwrap();
        let target = Target::new("ftp", "ftp://mirror.example.org:2121/a/b.gz");

        let rendered = catalog.render("fetch", &target).unwrap();
        assert_eq!(
            rendered.command,
            "fetch --scheme ftp --server mirror.example.org:2121 --path /a/b.gz \
             --src ftp://mirror.example.org:2121/a/b.gz --dst fetch_ftp.bin"
        );
    }

    #[test]
    fn test_unknown_tool() {
        let target = Target::new("https", "https://example.org/x");
        assert_eq!(
            catalog().render("aria2c", &target),
            Err(BenchError::UnknownTool("aria2c".to_string()))
        );
    }

    #[test]
    fn test_unknown_placeholder_fails_fast() {
        let tools = vec![ToolProfile::new("bad", "bad {url} {output}")];
        assert!(matches!(
            ToolCatalog::new(tools, ".x"),
            Err(BenchError::UnknownPlaceholder { placeholder, .. }) if placeholder == "output"
        ));
    }

    #[test]
    fn test_template_without_url_rejected() {
        let tools = vec![ToolProfile::new("lftp", "lftp -e 'get {filepath}' {server}")];
        assert_eq!(
            ToolCatalog::new(tools, ".x").err(),
            Some(BenchError::MissingUrlPlaceholder("lftp".to_string()))
        );
    }

    #[test]
    fn test_duplicate_and_disabled_tools() {
        let tools = vec![
            ToolProfile::new("curl", "curl {url}"),
            ToolProfile::new("curl", "curl -v {url}"),
        ];
        assert_eq!(
            ToolCatalog::new(tools, ".x").err(),
            Some(BenchError::DuplicateTool("curl".to_string()))
        );

        let mut disabled = ToolProfile::new("wget", "wget {url}");
        disabled.enabled = false;
        assert_eq!(
            ToolCatalog::new(vec![disabled], ".x").err(),
            Some(BenchError::NoTools)
        );
    }

    #[test]
    fn test_unsafe_tool_name_and_suffix_rejected() {
        let tools = vec![ToolProfile::new("my tool", "curl {url}")];
        assert!(matches!(
            ToolCatalog::new(tools, ".x"),
            Err(BenchError::InvalidName { kind: "tool", .. })
        ));

        let tools = vec![ToolProfile::new("curl", "curl {url} -o {filename}")];
        assert!(matches!(
            ToolCatalog::new(tools, ".d; rm -rf x"),
            Err(BenchError::InvalidName { kind: "filename suffix", .. })
        ));
    }

    #[test]
    fn test_render_never_splices_shell_syntax() {
        let target = Target::new("x", "https://a.example/x;touch pwned");
        assert!(matches!(
            catalog().render("wget", &target),
            Err(BenchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_invalid_error_pattern() {
        let tools = vec![ToolProfile::new("curl", "curl {url}").with_error_pattern("(")];
        assert!(matches!(
            ToolCatalog::new(tools, ".x"),
            Err(BenchError::InvalidPattern { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_render_contains_url_or_unknown_tool(
            host in "[a-z]{1,12}\\.(org|net|example)",
            path in "(/[a-zA-Z0-9._-]{1,10}){0,4}",
            tool in prop::sample::select(vec!["wget", "curl", "lftp", "rsync"]),
        ) {
            let url = format!("https://{}{}", host, path);
            let target = Target::new("t", url.clone());
            match catalog().render(tool, &target) {
                Ok(rendered) => prop_assert!(rendered.command.contains(&url)),
                Err(e) => prop_assert_eq!(e, BenchError::UnknownTool(tool.to_string())),
            }
        }
    }
}
