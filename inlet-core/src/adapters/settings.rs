//! Settings-file template cache
//!
//! Implements the TemplateCache port over the settings.json file in the
//! inlet directory, so confirmed mappings survive across sessions and are
//! shared with the desktop app.

use std::path::PathBuf;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::ColumnMapping;
use crate::ports::TemplateCache;

/// Template cache persisted in the inlet directory's settings.json
pub struct SettingsTemplateCache {
    inlet_dir: PathBuf,
}

impl SettingsTemplateCache {
    pub fn new(inlet_dir: impl Into<PathBuf>) -> Self {
        Self {
            inlet_dir: inlet_dir.into(),
        }
    }
}

impl TemplateCache for SettingsTemplateCache {
    fn get(&self, signature: &str) -> Result<Option<ColumnMapping>> {
        let config = Config::load(&self.inlet_dir).map_err(|e| Error::config(e.to_string()))?;
        Ok(config.mapping_templates.get(signature).cloned())
    }

    fn put(&self, signature: &str, mapping: &ColumnMapping) -> Result<()> {
        let mut config = Config::load(&self.inlet_dir).map_err(|e| Error::config(e.to_string()))?;
        config
            .mapping_templates
            .insert(signature.to_string(), mapping.clone());
        config
            .save(&self.inlet_dir)
            .map_err(|e| Error::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_then_get() {
        let dir = tempdir().unwrap();
        let cache = SettingsTemplateCache::new(dir.path());

        let mapping = ColumnMapping {
            date: Some("TransactionDate".to_string()),
            description: Some("Merchant".to_string()),
            amount: Some("Debit".to_string()),
            category: None,
        };

        assert_eq!(cache.get("TransactionDate,Merchant,Debit").unwrap(), None);

        cache.put("TransactionDate,Merchant,Debit", &mapping).unwrap();
        assert_eq!(
            cache.get("TransactionDate,Merchant,Debit").unwrap(),
            Some(mapping)
        );
    }

    #[test]
    fn test_put_overwrites() {
        let dir = tempdir().unwrap();
        let cache = SettingsTemplateCache::new(dir.path());

        let first = ColumnMapping {
            date: Some("Date".to_string()),
            description: Some("Description".to_string()),
            amount: Some("Amount".to_string()),
            category: None,
        };
        let second = ColumnMapping {
            category: Some("Amount".to_string()),
            ..first.clone()
        };

        cache.put("Sig", &first).unwrap();
        cache.put("Sig", &second).unwrap();
        assert_eq!(cache.get("Sig").unwrap(), Some(second));
    }
}
