use serde::{Deserialize, Serialize};
use super::{CustomLibraryType, LibraryIdentifier};

// The API reports trashed searches as `true` or `1` and omits the flag otherwise
fn deserialize_trash<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;

    match value {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_i64().map(|n| n != 0).unwrap_or(false)),
        _ => Ok(false),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryResponse {
    #[serde(rename = "type")]
    pub library_type: String,
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<serde_json::Value>,
}

impl LibraryResponse {
    /// Local library for this payload, `None` for library types that are not stored.
    pub fn library_id(&self) -> Option<LibraryIdentifier> {
        match self.library_type.as_str() {
            "user" => Some(LibraryIdentifier::Custom(CustomLibraryType::MyLibrary)),
            "group" => Some(LibraryIdentifier::Group(self.id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionResponse {
    pub condition: String,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<ConditionResponse>,
    #[serde(rename = "deleted", default, deserialize_with = "deserialize_trash")]
    pub is_trash: bool,
}

// API response structure for saved searches from Zotero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub key: String,
    pub version: i64,
    pub library: LibraryResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<serde_json::Value>,
    pub data: SearchDataResponse,
}
