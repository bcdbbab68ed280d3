//! Startup content registry.
//!
//! # Responsibility
//! - Declare the `event` content type, the `event_category` taxonomy, the
//!   computed REST fields, admin list columns and the `event_list` directive.
//! - Validate declarations once when the composition root starts.
//!
//! # Invariants
//! - Registry contents are immutable after `builtin()` returns; handlers only
//!   read from it.
//! - Names are unique per kind; taxonomies, REST fields and columns may only
//!   attach to a registered content type.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EVENT_CONTENT_TYPE: &str = "event";
pub const EVENT_TAXONOMY: &str = "event_category";
pub const EVENT_LIST_DIRECTIVE: &str = "event_list";

pub const FIELD_EVENT_DATE: &str = "event_date";
pub const FIELD_EVENT_LOCATION: &str = "event_location";
pub const FIELD_ATTENDEE_COUNT: &str = "attendee_count";

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,31}$").expect("valid registry name regex"));
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid registry slug regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeDefinition {
    pub name: String,
    pub label: String,
    /// Path segment for archive and single permalinks.
    pub archive_slug: String,
    pub supports: Vec<String>,
    pub show_in_rest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyDefinition {
    pub name: String,
    pub label: String,
    pub object_type: String,
    pub hierarchical: bool,
    pub rewrite_slug: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestFieldType {
    String,
    Integer,
}

impl RestFieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestFieldDefinition {
    pub object_type: String,
    pub name: String,
    pub schema_type: RestFieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminColumn {
    pub object_type: String,
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDefinition {
    pub tag: String,
    /// Attribute defaults, applied before operator-supplied values.
    pub defaults: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName(String),
    InvalidSlug(String),
    Duplicate { kind: &'static str, name: String },
    UnknownContentType(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "registry name is invalid: `{value}`"),
            Self::InvalidSlug(value) => write!(f, "registry slug is invalid: `{value}`"),
            Self::Duplicate { kind, name } => write!(f, "{kind} already registered: `{name}`"),
            Self::UnknownContentType(value) => write!(f, "content type not registered: `{value}`"),
        }
    }
}

impl Error for RegistryError {}

/// Declarations built once by the composition root.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    content_types: BTreeMap<String, ContentTypeDefinition>,
    taxonomies: BTreeMap<String, TaxonomyDefinition>,
    rest_fields: Vec<RestFieldDefinition>,
    admin_columns: Vec<AdminColumn>,
    directives: BTreeMap<String, DirectiveDefinition>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every event-manager declaration.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_content_type(ContentTypeDefinition {
            name: EVENT_CONTENT_TYPE.to_string(),
            label: "Events".to_string(),
            archive_slug: "events".to_string(),
            supports: ["title", "editor", "thumbnail"].map(String::from).to_vec(),
            show_in_rest: true,
        })?;
        registry.register_taxonomy(TaxonomyDefinition {
            name: EVENT_TAXONOMY.to_string(),
            label: "Event Categories".to_string(),
            object_type: EVENT_CONTENT_TYPE.to_string(),
            hierarchical: true,
            rewrite_slug: "event-category".to_string(),
        })?;
        for (name, schema_type) in [
            (FIELD_EVENT_DATE, RestFieldType::String),
            (FIELD_EVENT_LOCATION, RestFieldType::String),
            (FIELD_ATTENDEE_COUNT, RestFieldType::Integer),
        ] {
            registry.register_rest_field(RestFieldDefinition {
                object_type: EVENT_CONTENT_TYPE.to_string(),
                name: name.to_string(),
                schema_type,
            })?;
        }
        for (key, label) in [(FIELD_EVENT_DATE, "Event Date"), (FIELD_EVENT_LOCATION, "Location")] {
            registry.register_admin_column(AdminColumn {
                object_type: EVENT_CONTENT_TYPE.to_string(),
                key: key.to_string(),
                label: label.to_string(),
            })?;
        }
        registry.register_directive(DirectiveDefinition {
            tag: EVENT_LIST_DIRECTIVE.to_string(),
            defaults: [("posts_per_page", "5"), ("event_type", ""), ("upcoming", "false")]
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        })?;
        Ok(registry)
    }

    pub fn register_content_type(
        &mut self,
        definition: ContentTypeDefinition,
    ) -> Result<(), RegistryError> {
        validate_name(&definition.name)?;
        validate_slug(&definition.archive_slug)?;
        if self.content_types.contains_key(&definition.name) {
            return Err(RegistryError::Duplicate {
                kind: "content type",
                name: definition.name,
            });
        }
        self.content_types
            .insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn register_taxonomy(&mut self, definition: TaxonomyDefinition) -> Result<(), RegistryError> {
        validate_name(&definition.name)?;
        validate_slug(&definition.rewrite_slug)?;
        self.require_content_type(&definition.object_type)?;
        if self.taxonomies.contains_key(&definition.name) {
            return Err(RegistryError::Duplicate {
                kind: "taxonomy",
                name: definition.name,
            });
        }
        self.taxonomies.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn register_rest_field(
        &mut self,
        definition: RestFieldDefinition,
    ) -> Result<(), RegistryError> {
        validate_name(&definition.name)?;
        self.require_content_type(&definition.object_type)?;
        let duplicate = self.rest_fields.iter().any(|field| {
            field.object_type == definition.object_type && field.name == definition.name
        });
        if duplicate {
            return Err(RegistryError::Duplicate {
                kind: "rest field",
                name: definition.name,
            });
        }
        self.rest_fields.push(definition);
        Ok(())
    }

    pub fn register_admin_column(&mut self, column: AdminColumn) -> Result<(), RegistryError> {
        validate_name(&column.key)?;
        self.require_content_type(&column.object_type)?;
        let duplicate = self
            .admin_columns
            .iter()
            .any(|existing| existing.object_type == column.object_type && existing.key == column.key);
        if duplicate {
            return Err(RegistryError::Duplicate {
                kind: "admin column",
                name: column.key,
            });
        }
        self.admin_columns.push(column);
        Ok(())
    }

    pub fn register_directive(&mut self, definition: DirectiveDefinition) -> Result<(), RegistryError> {
        validate_name(&definition.tag)?;
        if self.directives.contains_key(&definition.tag) {
            return Err(RegistryError::Duplicate {
                kind: "directive",
                name: definition.tag,
            });
        }
        self.directives.insert(definition.tag.clone(), definition);
        Ok(())
    }

    pub fn content_type(&self, name: &str) -> Option<&ContentTypeDefinition> {
        self.content_types.get(name)
    }

    pub fn taxonomy(&self, name: &str) -> Option<&TaxonomyDefinition> {
        self.taxonomies.get(name)
    }

    /// REST fields of one content type in registration order.
    pub fn rest_fields(&self, object_type: &str) -> Vec<&RestFieldDefinition> {
        self.rest_fields
            .iter()
            .filter(|field| field.object_type == object_type)
            .collect()
    }

    /// Admin list columns of one content type in registration order.
    pub fn admin_columns(&self, object_type: &str) -> Vec<&AdminColumn> {
        self.admin_columns
            .iter()
            .filter(|column| column.object_type == object_type)
            .collect()
    }

    pub fn directive(&self, tag: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(tag)
    }

    /// Builds the public link of one entry: `<site_url>/<archive_slug>/<id>/`.
    pub fn permalink(&self, site_url: &str, object_type: &str, id: &str) -> Option<String> {
        self.content_type(object_type).map(|definition| {
            format!(
                "{}/{}/{}/",
                site_url.trim_end_matches('/'),
                definition.archive_slug,
                id
            )
        })
    }

    fn require_content_type(&self, name: &str) -> Result<(), RegistryError> {
        if self.content_types.contains_key(name) {
            Ok(())
        } else {
            Err(RegistryError::UnknownContentType(name.to_string()))
        }
    }
}

fn validate_name(value: &str) -> Result<(), RegistryError> {
    if NAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(value.to_string()))
    }
}

fn validate_slug(value: &str) -> Result<(), RegistryError> {
    if SLUG_RE.is_match(value) {
        Ok(())
    } else {
        Err(RegistryError::InvalidSlug(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AdminColumn, ContentRegistry, ContentTypeDefinition, RegistryError, RestFieldType,
        EVENT_CONTENT_TYPE, EVENT_LIST_DIRECTIVE, EVENT_TAXONOMY,
    };

    #[test]
    fn builtin_registry_declares_event_schema() {
        let registry = ContentRegistry::builtin().unwrap();

        let content_type = registry.content_type(EVENT_CONTENT_TYPE).unwrap();
        assert_eq!(content_type.archive_slug, "events");
        assert!(content_type.show_in_rest);

        let taxonomy = registry.taxonomy(EVENT_TAXONOMY).unwrap();
        assert!(taxonomy.hierarchical);
        assert_eq!(taxonomy.object_type, EVENT_CONTENT_TYPE);

        let fields: Vec<(&str, RestFieldType)> = registry
            .rest_fields(EVENT_CONTENT_TYPE)
            .into_iter()
            .map(|field| (field.name.as_str(), field.schema_type))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("event_date", RestFieldType::String),
                ("event_location", RestFieldType::String),
                ("attendee_count", RestFieldType::Integer),
            ]
        );

        let directive = registry.directive(EVENT_LIST_DIRECTIVE).unwrap();
        assert_eq!(directive.defaults.get("posts_per_page").map(String::as_str), Some("5"));
    }

    #[test]
    fn permalink_uses_archive_slug() {
        let registry = ContentRegistry::builtin().unwrap();
        assert_eq!(
            registry.permalink("https://example.com/", EVENT_CONTENT_TYPE, "abc"),
            Some("https://example.com/events/abc/".to_string())
        );
        assert_eq!(registry.permalink("https://example.com", "page", "abc"), None);
    }

    #[test]
    fn duplicate_content_type_is_rejected() {
        let mut registry = ContentRegistry::builtin().unwrap();
        let err = registry
            .register_content_type(ContentTypeDefinition {
                name: EVENT_CONTENT_TYPE.to_string(),
                label: "Again".to_string(),
                archive_slug: "again".to_string(),
                supports: Vec::new(),
                show_in_rest: false,
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { kind: "content type", .. }));
    }

    #[test]
    fn columns_require_registered_content_type() {
        let mut registry = ContentRegistry::new();
        let err = registry
            .register_admin_column(AdminColumn {
                object_type: "event".to_string(),
                key: "event_date".to_string(),
                label: "Event Date".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownContentType("event".to_string()));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut registry = ContentRegistry::new();
        let err = registry
            .register_content_type(ContentTypeDefinition {
                name: "Event Type".to_string(),
                label: "Events".to_string(),
                archive_slug: "events".to_string(),
                supports: Vec::new(),
                show_in_rest: true,
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::InvalidName("Event Type".to_string()));
    }
}
