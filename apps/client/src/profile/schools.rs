//! Region → school lookup for the profile editor.
//!
//! The table ships with a built-in default and can be replaced by a JSON
//! file (`SCHOOLS_FILE`) so adding a region or institution needs no rebuild.
//! File shape: `{ "AZ": ["Arizona State University", ...], "CA": [...] }`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::resource::Region;

pub struct SchoolDirectory {
    // Keyed by uppercased region code.
    regions: BTreeMap<String, Vec<String>>,
}

impl SchoolDirectory {
    /// The built-in table used when no schools file is configured.
    pub fn builtin() -> SchoolDirectory {
        let mut regions = BTreeMap::new();
        regions.insert(
            "AZ".to_string(),
            vec![
                "Arizona State University".to_string(),
                "University of Arizona".to_string(),
                "Northern Arizona University".to_string(),
            ],
        );
        regions.insert(
            "CA".to_string(),
            vec![
                "University of California, Los Angeles".to_string(),
                "University of Southern California".to_string(),
                "University of California, Berkeley".to_string(),
                "San Diego State University".to_string(),
            ],
        );
        SchoolDirectory { regions }
    }

    pub fn from_file(path: &Path) -> Result<SchoolDirectory> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schools file {}", path.display()))?;
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(&contents)
            .with_context(|| format!("invalid schools file {}", path.display()))?;
        let regions = raw
            .into_iter()
            .map(|(code, schools)| (code.trim().to_uppercase(), schools))
            .collect();
        Ok(SchoolDirectory { regions })
    }

    /// Loads from the configured file, or falls back to the built-in table.
    pub fn load(schools_file: Option<&str>) -> Result<SchoolDirectory> {
        match schools_file {
            Some(path) => {
                let directory = SchoolDirectory::from_file(Path::new(path))?;
                info!(path, regions = directory.regions.len(), "schools loaded from file");
                Ok(directory)
            }
            None => Ok(SchoolDirectory::builtin()),
        }
    }

    /// Schools selectable under `region`. The ALL sentinel (and any unknown
    /// region) has none.
    pub fn schools_for(&self, region: &Region) -> &[String] {
        match region {
            Region::All => &[],
            Region::Code(code) => self
                .regions
                .get(code)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }

    pub fn is_valid_school(&self, region: &Region, school: &str) -> bool {
        self.schools_for(region).iter().any(|s| s == school)
    }

    pub fn region_codes(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_has_two_regions() {
        let directory = SchoolDirectory::builtin();
        let codes: Vec<&str> = directory.region_codes().collect();
        assert_eq!(codes, vec!["AZ", "CA"]);
        assert!(directory.schools_for(&Region::parse("AZ")).len() >= 3);
    }

    #[test]
    fn test_unknown_region_and_all_have_no_schools() {
        let directory = SchoolDirectory::builtin();
        assert!(directory.schools_for(&Region::parse("TX")).is_empty());
        assert!(directory.schools_for(&Region::All).is_empty());
    }

    #[test]
    fn test_school_from_another_region_is_invalid() {
        let directory = SchoolDirectory::builtin();
        let az = Region::parse("AZ");
        assert!(directory.is_valid_school(&az, "Arizona State University"));
        assert!(!directory.is_valid_school(&az, "University of Southern California"));
    }

    #[test]
    fn test_loads_from_json_file_with_normalized_codes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "wa": ["University of Washington"] }}"#).unwrap();

        let directory = SchoolDirectory::from_file(file.path()).unwrap();
        assert_eq!(
            directory.schools_for(&Region::parse("WA")),
            ["University of Washington".to_string()]
        );
    }

    #[test]
    fn test_load_falls_back_to_builtin_when_unconfigured() {
        let directory = SchoolDirectory::load(None).unwrap();
        assert!(directory.is_valid_school(&Region::parse("CA"), "University of California, Berkeley"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(SchoolDirectory::from_file(file.path()).is_err());
    }
}
