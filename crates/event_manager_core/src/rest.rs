//! Read-only event resource for the REST surface.
//!
//! # Invariants
//! - Registered REST fields are always present: strings default to `""`,
//!   integers to `0`.

use crate::model::event::Event;
use crate::registry::{
    ContentRegistry, RestFieldType, EVENT_CONTENT_TYPE, FIELD_ATTENDEE_COUNT, FIELD_EVENT_DATE,
    FIELD_EVENT_LOCATION,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// JSON shape of one published event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventResource {
    pub id: String,
    pub title: String,
    pub status: String,
    pub link: String,
    /// Category slugs.
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EventResource {
    pub fn build(
        registry: &ContentRegistry,
        event: &Event,
        link: String,
        categories: Vec<String>,
        attendee_count: u64,
    ) -> Self {
        let mut fields = Map::new();
        for field in registry.rest_fields(EVENT_CONTENT_TYPE) {
            let value = match field.name.as_str() {
                FIELD_EVENT_DATE => Value::from(event.date_text()),
                FIELD_EVENT_LOCATION => Value::from(event.location_text()),
                FIELD_ATTENDEE_COUNT => Value::from(attendee_count),
                _ => match field.schema_type {
                    RestFieldType::String => Value::from(""),
                    RestFieldType::Integer => Value::from(0),
                },
            };
            fields.insert(field.name.clone(), value);
        }

        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            status: event.status.as_str().to_string(),
            link,
            categories,
            fields,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Declared type of every registered field, keyed by field name.
pub fn field_schema(registry: &ContentRegistry) -> Value {
    let properties: Map<String, Value> = registry
        .rest_fields(EVENT_CONTENT_TYPE)
        .into_iter()
        .map(|field| {
            let mut property = Map::new();
            property.insert("type".to_string(), Value::from(field.schema_type.as_str()));
            (field.name.clone(), Value::Object(property))
        })
        .collect();
    Value::Object(properties)
}
