use crate::domain::application::ApplicationStatus;
use crate::error::{KisekiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration for a kanban board column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub status: ApplicationStatus,
}

impl Column {
    pub fn new(name: impl Into<String>, status: ApplicationStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

impl From<ApplicationStatus> for Column {
    fn from(status: ApplicationStatus) -> Self {
        Self::new(status.to_string(), status)
    }
}

/// Board configuration: visible columns in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Job Applications".to_string(),
            columns: ApplicationStatus::COLUMNS
                .into_iter()
                .map(Column::from)
                .collect(),
        }
    }
}

impl BoardConfig {
    /// Rejects empty boards, the sentinel status and duplicate columns
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(KisekiError::ConfigError(
                "board must have at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !column.status.is_specified() {
                return Err(KisekiError::ConfigError(format!(
                    "column '{}' uses the unspecified status",
                    column.name
                )));
            }
            if !seen.insert(column.status) {
                return Err(KisekiError::ConfigError(format!(
                    "status {} is mapped to more than one column",
                    column.status.as_db_str()
                )));
            }
        }
        Ok(())
    }

    /// Gets the column configuration for a status
    pub fn get_column_for_status(&self, status: ApplicationStatus) -> Option<&Column> {
        self.columns.iter().find(|col| col.status == status)
    }

    /// Checks if a status has a visible column
    pub fn has_column(&self, status: ApplicationStatus) -> bool {
        self.get_column_for_status(status).is_some()
    }

    /// Parses and validates a JSON board configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_columns() {
        let config = BoardConfig::default();

        assert_eq!(config.columns.len(), 7);
        assert_eq!(config.columns[0].name, "Applied");
        assert_eq!(config.columns[2].name, "Interviewing");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_get_column_for_status() {
        let config = BoardConfig::default();

        let column = config.get_column_for_status(ApplicationStatus::Offer).unwrap();
        assert_eq!(column.name, "Offered");
        assert!(!config.has_column(ApplicationStatus::Unspecified));
    }

    #[test]
    fn test_validate_rejects_sentinel() {
        let config = BoardConfig {
            name: "Broken".to_string(),
            columns: vec![Column::new("Limbo", ApplicationStatus::Unspecified)],
        };

        assert!(matches!(config.validate(), Err(KisekiError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let config = BoardConfig {
            name: "Dupes".to_string(),
            columns: vec![
                Column::new("Applied", ApplicationStatus::Applied),
                Column::new("Also applied", ApplicationStatus::Applied),
            ],
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let config = BoardConfig {
            name: "Empty".to_string(),
            columns: Vec::new(),
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "name": "Short board",
            "columns": [
                {"name": "Sent", "status": "APPLIED"},
                {"name": "Talking", "status": "INTERVIEW"}
            ]
        }"#;

        let config = BoardConfig::from_json(json).unwrap();
        assert_eq!(config.columns.len(), 2);
        assert_eq!(config.columns[1].status, ApplicationStatus::Interview);

        let bad = r#"{"name": "x", "columns": [{"name": "?", "status": "UNSPECIFIED"}]}"#;
        assert!(BoardConfig::from_json(bad).is_err());
    }
}
