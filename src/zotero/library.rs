use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomLibraryType {
    MyLibrary,
}

/// Scopes every stored object. Persisted as a `(library_type, library_id)`
/// column pair; the custom "My Library" uses id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LibraryIdentifier {
    Custom(CustomLibraryType),
    Group(i64),
}

impl LibraryIdentifier {
    pub fn library_type(&self) -> &'static str {
        match self {
            LibraryIdentifier::Custom(_) => "custom",
            LibraryIdentifier::Group(_) => "group",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            LibraryIdentifier::Custom(CustomLibraryType::MyLibrary) => 0,
            LibraryIdentifier::Group(id) => *id,
        }
    }

    pub fn from_columns(library_type: &str, id: i64) -> Result<Self> {
        match library_type {
            "custom" if id == 0 => Ok(LibraryIdentifier::Custom(CustomLibraryType::MyLibrary)),
            "group" => Ok(LibraryIdentifier::Group(id)),
            other => Err(Error::InvalidData(format!(
                "unknown library {}:{}",
                other, id
            ))),
        }
    }

    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let library_type: String = row.try_get("library_type")?;
        let id: i64 = row.try_get("library_id")?;
        Self::from_columns(&library_type, id)
    }
}

impl std::fmt::Display for LibraryIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryIdentifier::Custom(CustomLibraryType::MyLibrary) => write!(f, "My Library"),
            LibraryIdentifier::Group(id) => write!(f, "Group #{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_round_trip() {
        let my = LibraryIdentifier::Custom(CustomLibraryType::MyLibrary);
        let group = LibraryIdentifier::Group(17);

        assert_eq!(LibraryIdentifier::from_columns(my.library_type(), my.id()).unwrap(), my);
        assert_eq!(LibraryIdentifier::from_columns(group.library_type(), group.id()).unwrap(), group);
    }

    #[test]
    fn unknown_columns_are_rejected() {
        assert!(LibraryIdentifier::from_columns("custom", 3).is_err());
        assert!(LibraryIdentifier::from_columns("feed", 1).is_err());
    }

    #[test]
    fn json_shape() {
        let group: LibraryIdentifier = serde_json::from_str(r#"{"group":5}"#).unwrap();
        let my: LibraryIdentifier = serde_json::from_str(r#"{"custom":"myLibrary"}"#).unwrap();

        assert_eq!(group, LibraryIdentifier::Group(5));
        assert_eq!(my, LibraryIdentifier::Custom(CustomLibraryType::MyLibrary));
        assert_eq!(group.to_string(), "Group #5");
    }
}
