//! Read-only, URI-addressed views of platform data.

use muav_client::PlatformClient;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::GatewayError;

const MIME_JSON: &str = "application/json";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateInfo {
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub fn list() -> Vec<ResourceInfo> {
    vec![
        ResourceInfo {
            uri: "devices://all",
            name: "devices",
            description: "List of all UAV devices",
            mime_type: MIME_JSON,
        },
        ResourceInfo {
            uri: "positions://all",
            name: "positions",
            description: "Current positions of all UAV devices",
            mime_type: MIME_JSON,
        },
        ResourceInfo {
            uri: "missions://all",
            name: "missions",
            description: "List of all missions",
            mime_type: MIME_JSON,
        },
        ResourceInfo {
            uri: "server://config",
            name: "server_config",
            description: "Current server configuration",
            mime_type: MIME_JSON,
        },
    ]
}

pub fn templates() -> Vec<ResourceTemplateInfo> {
    vec![
        ResourceTemplateInfo {
            uri_template: "device://{id}",
            name: "device",
            description: "Information for a specific UAV device",
            mime_type: MIME_JSON,
        },
        ResourceTemplateInfo {
            uri_template: "position://{deviceId}",
            name: "position",
            description: "Current position of a specific UAV device",
            mime_type: MIME_JSON,
        },
        ResourceTemplateInfo {
            uri_template: "routes://{missionId}",
            name: "routes",
            description: "Routes for a specific mission",
            mime_type: MIME_JSON,
        },
    ]
}

/// Platform call backing a resource URI.
#[derive(Debug, PartialEq, Eq)]
struct Backing<'a> {
    path: &'static str,
    query: Option<(&'static str, &'a str)>,
}

fn resolve(uri: &str) -> Option<Backing<'_>> {
    let fixed = match uri {
        "devices://all" => Some("/devices"),
        "positions://all" => Some("/positions"),
        "missions://all" => Some("/missions/"),
        "server://config" => Some("/server"),
        _ => None,
    };
    if let Some(path) = fixed {
        return Some(Backing { path, query: None });
    }

    let (scheme, param) = uri.split_once("://")?;
    if param.is_empty() {
        return None;
    }
    let (path, key) = match scheme {
        "device" => ("/devices", "id"),
        "position" => ("/positions", "deviceId"),
        "routes" => ("/missions/routes", "missionId"),
        _ => return None,
    };
    Some(Backing {
        path,
        query: Some((key, param)),
    })
}

/// Read a resource and return the `resources/read` result body.
pub async fn read(client: &PlatformClient, uri: &str) -> Result<Value, GatewayError> {
    let backing = resolve(uri).ok_or_else(|| GatewayError::UnknownResource(uri.to_string()))?;
    let query: Vec<(&str, &str)> = backing.query.into_iter().collect();
    let data = client.get(backing.path, &query).await?;

    Ok(json!({
        "contents": [{
            "uri": uri,
            "mimeType": MIME_JSON,
            "text": serde_json::to_string_pretty(&data)?,
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_uris_map_to_platform_paths() {
        assert_eq!(resolve("missions://all").unwrap().path, "/missions/");
        assert_eq!(resolve("server://config").unwrap().path, "/server");
    }

    #[test]
    fn templates_carry_their_parameter() {
        assert_eq!(
            resolve("position://7"),
            Some(Backing {
                path: "/positions",
                query: Some(("deviceId", "7"))
            })
        );
        assert_eq!(
            resolve("routes://m-3").unwrap().query,
            Some(("missionId", "m-3"))
        );
    }

    #[test]
    fn unknown_or_empty_uris_do_not_resolve() {
        assert!(resolve("weather://today").is_none());
        assert!(resolve("device://").is_none());
        assert!(resolve("devices").is_none());
    }

    #[test]
    fn every_listed_resource_resolves() {
        for info in list() {
            assert!(resolve(info.uri).is_some(), "{}", info.uri);
        }
    }
}
