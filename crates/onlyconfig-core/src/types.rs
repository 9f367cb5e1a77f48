//! Wire types of the `OnlyConfig` REST API.
//!
//! The backend renders empty Go slices as `null`, so every list field
//! tolerates `null` and missing values and reads them as empty.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier. The backend sends some ids as numbers and
/// some as strings; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An organization the current user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub org_id: Id,
    pub org_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub owner_list: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_list: Vec<String>,
}

/// Global lists of valid environment and datacenter names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvDcRegistry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub env: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dc: Vec<String>,
}

/// Which registry list a new name goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvDcKind {
    Env,
    Dc,
}

impl EnvDcKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Dc => "dc",
        }
    }
}

/// Datacenters an application is deployed to within one environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvAndDc {
    pub env: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dc_list: Vec<String>,
}

/// A deployable unit owned by an organization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Application {
    pub app_id: Id,
    pub app_name: String,
    #[serde(default)]
    pub app_desc: String,
    #[serde(default)]
    pub app_owner_org_id: Option<Id>,
    #[serde(default)]
    pub app_owner_org_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub env_and_dc: Vec<EnvAndDc>,
}

impl Application {
    /// Whether `(env, dc)` is attached to this application.
    pub fn has_env_dc(&self, env: &str, dc: &str) -> bool {
        self.env_and_dc
            .iter()
            .any(|e| e.env == env && e.dc_list.iter().any(|d| d == dc))
    }
}

/// Namespace visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceType {
    /// Private to the owning application.
    #[default]
    Application,
    /// Shared with other applications.
    Public,
}

impl NamespaceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Public => "public",
        }
    }
}

impl std::str::FromStr for NamespaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" => Ok(Self::Application),
            "public" => Ok(Self::Public),
            other => Err(format!("unknown namespace type '{other}' (expected application or public)")),
        }
    }
}

/// Content type of a configuration value. Only general text exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    General,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            other => Err(format!("unknown content type '{other}' (expected general)")),
        }
    }
}

/// The compound key a configuration entry is created and listed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigureKey {
    pub app_id: Id,
    pub env: String,
    pub dc: String,
    pub namespace: String,
    pub key: String,
}

/// One key of a namespace listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigureRef {
    pub key: String,
    pub configure_id: Id,
}

/// Configuration keys of one namespace for an (application, env, dc).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamespaceConfigures {
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub configure_list: Vec<ConfigureRef>,
}

/// Stored configuration value as returned by `GET /configures/configure/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigureDetail {
    pub cfg_id: Option<Id>,
    pub cfg_ns: String,
    pub cfg_key: String,
    pub cfg_env: String,
    pub cfg_dc: String,
    pub cfg_status: Option<serde_json::Value>,
    pub cfg_ct: String,
    pub cfg_content: String,
}

/// Registration form body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub display_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn id_accepts_numbers_and_strings() {
        let n: Id = serde_json::from_str("42").unwrap();
        let s: Id = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(n, s);
        assert_eq!(n.to_string(), "42");
    }

    #[test]
    fn null_lists_read_as_empty() {
        let org: Organization = serde_json::from_str(
            r#"{"org_id":"o1","org_name":"acme","owner_list":null,"user_list":["bob"]}"#,
        )
        .unwrap();
        assert!(org.owner_list.is_empty());
        assert_eq!(org.user_list, vec!["bob".to_owned()]);

        let reg: EnvDcRegistry = serde_json::from_str(r#"{"env":null}"#).unwrap();
        assert_eq!(reg, EnvDcRegistry::default());
    }

    #[test]
    fn application_env_dc_membership() {
        let app: Application = serde_json::from_str(
            r#"{"app_id":7,"app_name":"web","env_and_dc":[{"env":"prod","dc_list":["us1","eu1"]},{"env":"dev","dc_list":null}]}"#,
        )
        .unwrap();
        assert_eq!(app.app_id.as_str(), "7");
        assert!(app.has_env_dc("prod", "eu1"));
        assert!(!app.has_env_dc("dev", "eu1"));
        assert!(!app.has_env_dc("staging", "us1"));
    }

    #[test]
    fn namespace_type_parses() {
        assert_eq!("public".parse::<NamespaceType>().unwrap(), NamespaceType::Public);
        assert!("shared".parse::<NamespaceType>().is_err());
    }
}
