//! JSON schemas attached to POST/PUT controls.

use serde_json::{Value, json};

pub fn user() -> Value {
    json!({
        "type": "object",
        "required": ["name", "password"],
        "properties": {
            "name": {
                "description": "User's name",
                "type": "string",
                "pattern": "^[A-Za-z0-9_.-]{1,64}$"
            },
            "password": {"description": "User's password", "type": "string"}
        }
    })
}

pub fn location() -> Value {
    json!({
        "type": "object",
        "required": ["name", "latitude", "longitude"],
        "properties": {
            "name": {"description": "Location's name", "type": "string"},
            "latitude": {
                "description": "Location's latitude",
                "type": "number",
                "minimum": -90,
                "maximum": 90
            },
            "longitude": {
                "description": "Location's longitude",
                "type": "number",
                "minimum": -180,
                "maximum": 180
            }
        }
    })
}

pub fn favourite() -> Value {
    json!({
        "type": "object",
        "required": ["title", "location_id"],
        "properties": {
            "title": {"description": "Favourite's title", "type": "string"},
            "description": {"description": "Favourite's description", "type": "string"},
            "location_id": {"description": "Favourite's location_id", "type": "integer"}
        }
    })
}
