use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use super::errors::BenchError;
use super::models::{is_plain_name, Target};

/// Named download targets for one run, in input order.
#[derive(Debug, Clone)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    pub fn new(targets: Vec<Target>) -> Result<Self, BenchError> {
        if targets.is_empty() {
            return Err(BenchError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &targets {
            if !is_plain_name(&target.name) {
                return Err(BenchError::InvalidName {
                    kind: "target",
                    name: target.name.clone(),
                });
            }
            if !seen.insert(target.name.as_str()) {
                return Err(BenchError::DuplicateTarget(target.name.clone()));
            }
            target.parsed_url()?;
        }

        Ok(Self { targets })
    }

    /// Reads `name<TAB>url` lines. Blank lines, `#` comments and a
    /// `name url` header row are skipped.
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read targets file: {:?}", path))?;
        let targets = parse_tsv(&content)
            .with_context(|| format!("Failed to parse targets file: {:?}", path))?;
        Ok(Self::new(targets)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

fn parse_tsv(content: &str) -> Result<Vec<Target>> {
    let mut targets = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut cols = line.split('\t').map(str::trim);
        let (Some(name), Some(url)) = (cols.next(), cols.next()) else {
            anyhow::bail!("line {}: expected 'name<TAB>url'", idx + 1);
        };

        if name.eq_ignore_ascii_case("name") && url.eq_ignore_ascii_case("url") {
            continue;
        }

        targets.push(Target::new(name, url));
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_tsv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("targets.tsv");
        fs::write(
            &path,
            "name\turl\n# mirrors\nhttps\thttps://www.example.org/a.gz\n\nftp\tftp://ftp.example.org/a.gz\n",
        )
        .unwrap();

        let set = TargetSet::from_tsv(&path).unwrap();
        let names: Vec<_> = set.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["https", "ftp"]);
    }

    #[test]
    fn test_malformed_line() {
        let err = parse_tsv("https https://example.org/a.gz\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_empty_and_duplicate() {
        assert_eq!(TargetSet::new(vec![]).err(), Some(BenchError::NoTargets));

        let dup = vec![
            Target::new("a", "https://example.org/1"),
            Target::new("a", "https://example.org/2"),
        ];
        assert_eq!(
            TargetSet::new(dup).err(),
            Some(BenchError::DuplicateTarget("a".to_string()))
        );
    }

    #[test]
    fn test_names_unsafe_for_filenames_rejected() {
        for name in ["x; touch pwned", "my mirror"] {
            assert_eq!(
                TargetSet::new(vec![Target::new(name, "https://a.example/x")]).err(),
                Some(BenchError::InvalidName {
                    kind: "target",
                    name: name.to_string(),
                })
            );
        }
    }

    #[test]
    fn test_invalid_url() {
        let bad = vec![Target::new("a", "not a url")];
        assert!(matches!(
            TargetSet::new(bad),
            Err(BenchError::InvalidUrl { .. })
        ));
    }
}
