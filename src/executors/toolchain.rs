use crate::core::catalog::ToolCatalog;
use which::which;

/// Warns about tools whose program is not on PATH. Never fails: a missing
/// tool still gets its trials, which then record the failure.
pub fn warn_missing(catalog: &ToolCatalog) -> Vec<String> {
    let mut missing = Vec::new();

    for profile in catalog.profiles() {
        let Some(program) = profile.program() else {
            continue;
        };
        match which(&program) {
            Ok(path) => tracing::debug!("Found {}: {:?}", program, path),
            Err(_) => {
                tracing::warn!("Tool '{}' not found on PATH ({})", profile.name, program);
                missing.push(profile.name.clone());
            }
        }
    }

    if missing.is_empty() {
        tracing::info!("All {} tools found", catalog.len());
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ToolProfile;

    #[test]
    fn test_reports_missing_program() {
        let catalog = ToolCatalog::new(
            vec![
                ToolProfile::new("shell", "sh -c 'true {url}'"),
                ToolProfile::new("ghost", "definitely-not-a-real-binary-xyz {url}"),
            ],
            ".bin",
        )
        .unwrap();

        assert_eq!(warn_missing(&catalog), vec!["ghost".to_string()]);
    }
}
