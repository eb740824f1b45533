//! Extraction of the language catalog from the service's discovery document.
//!
//! The catalog is read from the `enum` of a parameter looked up by name:
//! `language` on `GET /gen/clients/{language}` and `framework` on
//! `GET /gen/servers/{framework}`. Anything else in the document is ignored.
//! A missing step fails with [`DiscoveryError::MissingField`] and a targeted
//! field of the wrong type with [`DiscoveryError::InvalidField`]; there is no
//! positional fallback.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use oagp_core::LanguageCatalog;
use oagp_core::error::DiscoveryError;

pub const CLIENTS_PATH: &str = "/gen/clients/{language}";
pub const SERVERS_PATH: &str = "/gen/servers/{framework}";

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    #[serde(default)]
    paths: IndexMap<String, Value>,
}

/// The two levels of a path item the lookup reads. Everything below the
/// targeted parameter stays untyped until it is found.
#[derive(Debug, Deserialize)]
struct PathItem {
    get: Option<Operation>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(default)]
    parameters: Vec<Value>,
}

/// Parse a discovery document body into a [`LanguageCatalog`].
pub fn parse_catalog(body: &str) -> Result<LanguageCatalog, DiscoveryError> {
    let doc: DiscoveryDocument = serde_json::from_str(body)?;
    Ok(LanguageCatalog {
        client: enum_of(&doc, CLIENTS_PATH, "language")?,
        server: enum_of(&doc, SERVERS_PATH, "framework")?,
    })
}

fn enum_of(
    doc: &DiscoveryDocument,
    path: &str,
    parameter: &str,
) -> Result<Vec<String>, DiscoveryError> {
    let field = |suffix: &str| format!("paths[\"{path}\"]{suffix}");
    let missing = |suffix: &str| DiscoveryError::MissingField(field(suffix));

    let item = doc.paths.get(path).ok_or_else(|| missing(""))?;
    let item: PathItem =
        serde_json::from_value(item.clone()).map_err(|e| DiscoveryError::InvalidField {
            field: field(""),
            reason: e.to_string(),
        })?;
    let get = item.get.ok_or_else(|| missing(".get"))?;
    let param = get
        .parameters
        .iter()
        .find(|p| p.get("name").and_then(Value::as_str) == Some(parameter))
        .ok_or_else(|| missing(&format!(".get.parameters[name={parameter}]")))?;

    let suffix = format!(".get.parameters[name={parameter}].enum");
    let values = param.get("enum").ok_or_else(|| missing(&suffix))?;
    serde_json::from_value(values.clone()).map_err(|e| DiscoveryError::InvalidField {
        field: field(&suffix),
        reason: e.to_string(),
    })
}
