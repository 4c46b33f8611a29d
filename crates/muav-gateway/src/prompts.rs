//! Parameterless prompt templates that embed live platform data.

use muav_client::PlatformClient;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::GatewayError;

#[derive(Debug, Clone, Serialize)]
pub struct PromptInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub arguments: Vec<Value>,
}

struct PromptSpec {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    intro: &'static str,
    /// (section heading, platform path) pairs, fetched in order.
    sections: &'static [(&'static str, &'static str)],
}

const PROMPTS: &[PromptSpec] = &[
    PromptSpec {
        name: "analyze_status",
        title: "Analyze Device Statuses",
        description: "Summarize the status of all UAV devices",
        intro: "Analyze the following UAV device statuses:",
        sections: &[("", "/devices")],
    },
    PromptSpec {
        name: "find_low_battery",
        title: "Find Low Battery Devices",
        description: "List UAVs with battery below 20%",
        intro: "Which UAVs have battery below 20%?",
        sections: &[("", "/positions")],
    },
    PromptSpec {
        name: "mission_planning",
        title: "Mission Planning",
        description: "Help plan a mission for UAV devices",
        intro: "Help me plan a mission using the following available devices and current missions:",
        sections: &[("Devices", "/devices"), ("Current Missions", "/missions/")],
    },
    PromptSpec {
        name: "safety_check",
        title: "Flight Safety Check",
        description: "Perform a safety check on UAV devices before flight",
        intro: "Perform a safety check on the UAV devices. Check battery levels, connection status, and any alarms:",
        sections: &[("Devices", "/devices"), ("Positions", "/positions")],
    },
    PromptSpec {
        name: "mission_status",
        title: "Mission Status Report",
        description: "Generate a report on current mission status",
        intro: "Generate a mission status report based on the following data:",
        sections: &[("Missions", "/missions/"), ("Current Positions", "/positions")],
    },
    PromptSpec {
        name: "analyze_flight_data",
        title: "Analyze Flight Data",
        description: "Analyze flight data and performance metrics",
        intro: "Analyze the flight data and performance metrics:",
        sections: &[("Position Data", "/positions"), ("Mission Files", "/files/get")],
    },
];

pub fn list() -> Vec<PromptInfo> {
    PROMPTS
        .iter()
        .map(|p| PromptInfo {
            name: p.name,
            title: p.title,
            description: p.description,
            arguments: Vec::new(),
        })
        .collect()
}

/// Build the `prompts/get` result for `name`.
pub async fn get(client: &PlatformClient, name: &str) -> Result<Value, GatewayError> {
    let spec = PROMPTS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| GatewayError::UnknownPrompt(name.to_string()))?;

    let mut text = String::from(spec.intro);
    for (heading, path) in spec.sections {
        let data = client.get(path, &[]).await?;
        let body = serde_json::to_string_pretty(&data)?;
        if heading.is_empty() {
            text.push_str(&format!("\n\n{}", body));
        } else {
            text.push_str(&format!("\n\n{}:\n{}", heading, body));
        }
    }

    Ok(json!({
        "description": spec.description,
        "messages": [{
            "role": "user",
            "content": {"type": "text", "text": text}
        }]
    }))
}
