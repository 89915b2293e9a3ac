//! Component registry: the read-only catalog of component types.
//!
//! The tree layer never consults the registry. Callers use it to create
//! instances (fresh id + default props) before dispatching an add, to check
//! whether a type accepts children, and to validate props edited through a
//! generated form.

use crate::codec::LoadError;
use crate::id::ComponentId;
use crate::model::{Color, ComponentInstance, PropValue, Props};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Palette grouping for a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Content,
    Form,
    Media,
}

/// The editor widget / value shape of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Color,
    Select,
    Spacing,
    Typography,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub default_value: PropValue,
    /// Allowed values for `select` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub category: Category,
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
    #[serde(default)]
    pub can_have_children: bool,
    #[serde(default)]
    pub default_props: Props,
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropError {
    #[error("component type `{0}` not found")]
    UnknownType(String),
    #[error("{0} is required")]
    Required(String),
    #[error("{name} must be at least {min}")]
    BelowMin { name: String, min: f64 },
    #[error("{name} must be at most {max}")]
    AboveMax { name: String, max: f64 },
    #[error("{0} format is invalid")]
    Pattern(String),
    #[error("{name} must be one of: {}", .options.join(", "))]
    NotInOptions { name: String, options: Vec<String> },
    #[error("{name} expects a {expected} value")]
    WrongType { name: String, expected: &'static str },
    #[error("{name} declares an unusable pattern: {message}")]
    BadPattern { name: String, message: String },
}

impl PropertySchema {
    fn check(&self, value: Option<&PropValue>, errors: &mut Vec<PropError>) {
        let rules = self.validation.as_ref();
        let name = || self.name.clone();

        let Some(value) = value.filter(|v| !v.is_blank()) else {
            if rules.is_some_and(|r| r.required) {
                errors.push(PropError::Required(name()));
            }
            return;
        };

        let expected = match (self.kind, value) {
            (PropertyKind::Number, PropValue::Number(_)) => None,
            (PropertyKind::Number, _) => Some("number"),
            (PropertyKind::Boolean, PropValue::Bool(_)) => None,
            (PropertyKind::Boolean, _) => Some("boolean"),
            (PropertyKind::Color, PropValue::Text(s))
                if !s.starts_with('#') || Color::from_hex(s).is_some() =>
            {
                None
            }
            (PropertyKind::Color, _) => Some("color"),
            (_, PropValue::Text(_)) => None,
            (_, _) => Some("text"),
        };
        if let Some(expected) = expected {
            errors.push(PropError::WrongType {
                name: name(),
                expected,
            });
            return;
        }

        if let (PropertyKind::Select, Some(options), Some(text)) =
            (self.kind, self.options.as_ref(), value.as_str())
        {
            if !options.iter().any(|o| o == text) {
                errors.push(PropError::NotInOptions {
                    name: name(),
                    options: options.clone(),
                });
            }
        }

        let Some(rules) = rules else { return };
        if let Some(n) = value.as_f64() {
            if let Some(min) = rules.min.filter(|&min| n < min) {
                errors.push(PropError::BelowMin { name: name(), min });
            }
            if let Some(max) = rules.max.filter(|&max| n > max) {
                errors.push(PropError::AboveMax { name: name(), max });
            }
        }
        if let (Some(pattern), Some(text)) = (rules.pattern.as_deref(), value.as_str()) {
            match Regex::new(pattern) {
                Ok(re) if re.is_match(text) => {}
                Ok(_) => errors.push(PropError::Pattern(name())),
                Err(e) => errors.push(PropError::BadPattern {
                    name: name(),
                    message: e.to_string(),
                }),
            }
        }
    }
}

impl ComponentDefinition {
    /// Build a new instance with a fresh id and a copy of the default props.
    pub fn instantiate(&self) -> ComponentInstance {
        let mut instance = ComponentInstance::new(ComponentId::generate(), &self.component_type);
        instance.props = self.default_props.clone();
        instance
    }

    /// Check `props` against every declared property. Undeclared props are
    /// ignored.
    pub fn validate(&self, props: &Props) -> Result<(), Vec<PropError>> {
        let mut errors = Vec::new();
        for schema in &self.properties {
            schema.check(props.get(&schema.name), &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Read-only catalog of component types.
pub trait ComponentRegistry {
    fn definition(&self, component_type: &str) -> Option<&ComponentDefinition>;

    /// `None` for unknown types.
    fn create_instance(&self, component_type: &str) -> Option<ComponentInstance> {
        self.definition(component_type)
            .map(ComponentDefinition::instantiate)
    }

    fn can_have_children(&self, component_type: &str) -> bool {
        self.definition(component_type)
            .is_some_and(|d| d.can_have_children)
    }

    fn validate_props(&self, component_type: &str, props: &Props) -> Result<(), Vec<PropError>> {
        match self.definition(component_type) {
            Some(def) => def.validate(props),
            None => Err(vec![PropError::UnknownType(component_type.to_string())]),
        }
    }
}

/// Registry backed by a list of definitions held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    definitions: Vec<ComponentDefinition>,
    by_type: HashMap<String, usize>,
}

impl InMemoryRegistry {
    /// Later definitions replace earlier ones with the same type.
    pub fn new(definitions: Vec<ComponentDefinition>) -> Self {
        let mut registry = Self::default();
        for def in definitions {
            registry.register(def);
        }
        registry
    }

    /// Load a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let definitions: Vec<ComponentDefinition> = serde_json::from_str(json)?;
        Ok(Self::new(definitions))
    }

    pub fn register(&mut self, def: ComponentDefinition) {
        match self.by_type.get(&def.component_type) {
            Some(&i) => self.definitions[i] = def,
            None => {
                self.by_type
                    .insert(def.component_type.clone(), self.definitions.len());
                self.definitions.push(def);
            }
        }
    }

    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.definitions
    }

    /// Definitions grouped by palette category, in registration order.
    pub fn by_category(&self) -> BTreeMap<Category, Vec<&ComponentDefinition>> {
        let mut grouped: BTreeMap<Category, Vec<&ComponentDefinition>> = BTreeMap::new();
        for def in &self.definitions {
            grouped.entry(def.category).or_default().push(def);
        }
        grouped
    }
}

impl ComponentRegistry for InMemoryRegistry {
    fn definition(&self, component_type: &str) -> Option<&ComponentDefinition> {
        self.by_type
            .get(component_type)
            .map(|&i| &self.definitions[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(name: &str, kind: PropertyKind, default: PropValue) -> PropertySchema {
        PropertySchema {
            name: name.into(),
            kind,
            default_value: default,
            options: None,
            validation: None,
        }
    }

    fn button() -> ComponentDefinition {
        let mut label = schema("label", PropertyKind::String, "Click Me".into());
        label.validation = Some(Validation {
            required: true,
            ..Default::default()
        });
        let mut size = schema("size", PropertyKind::Select, "md".into());
        size.options = Some(vec!["sm".into(), "md".into(), "lg".into()]);
        let mut width = schema("width", PropertyKind::Number, 120.0.into());
        width.validation = Some(Validation {
            min: Some(10.0),
            max: Some(400.0),
            ..Default::default()
        });
        let mut slug = schema("slug", PropertyKind::String, "".into());
        slug.validation = Some(Validation {
            pattern: Some("^[a-z-]+$".into()),
            ..Default::default()
        });

        let mut default_props = Props::new();
        default_props.insert("label".into(), "Click Me".into());
        default_props.insert("size".into(), "md".into());
        ComponentDefinition {
            component_type: "button".into(),
            name: "Button".into(),
            icon: String::new(),
            category: Category::Form,
            properties: vec![
                label,
                size,
                width,
                slug,
                schema("background", PropertyKind::Color, "#007bff".into()),
            ],
            can_have_children: false,
            default_props,
        }
    }

    fn container() -> ComponentDefinition {
        ComponentDefinition {
            component_type: "container".into(),
            name: "Container".into(),
            icon: String::new(),
            category: Category::Layout,
            properties: vec![],
            can_have_children: true,
            default_props: Props::new(),
        }
    }

    #[test]
    fn create_instance_copies_defaults() {
        let registry = InMemoryRegistry::new(vec![button(), container()]);
        let a = registry.create_instance("button").unwrap();
        let b = registry.create_instance("button").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.component_type, "button");
        assert_eq!(a.prop("label"), Some(&PropValue::from("Click Me")));
        assert!(a.children.is_empty());
        assert_eq!(a.order, 0);
        assert!(registry.create_instance("carousel").is_none());
    }

    #[test]
    fn can_have_children_by_type() {
        let registry = InMemoryRegistry::new(vec![button(), container()]);
        assert!(registry.can_have_children("container"));
        assert!(!registry.can_have_children("button"));
        assert!(!registry.can_have_children("unknown"));
    }

    #[test]
    fn validate_accepts_defaults() {
        let def = button();
        assert_eq!(def.validate(&def.default_props), Ok(()));
    }

    #[test]
    fn validate_reports_each_rule() {
        let def = button();
        let mut props = Props::new();
        props.insert("label".into(), "".into());
        props.insert("size".into(), "xl".into());
        props.insert("width".into(), 5.0.into());
        props.insert("slug".into(), "Not A Slug".into());
        props.insert("background".into(), "#12".into());

        let errors = def.validate(&props).unwrap_err();
        assert_eq!(
            errors,
            vec![
                PropError::Required("label".into()),
                PropError::NotInOptions {
                    name: "size".into(),
                    options: vec!["sm".into(), "md".into(), "lg".into()],
                },
                PropError::BelowMin {
                    name: "width".into(),
                    min: 10.0
                },
                PropError::Pattern("slug".into()),
                PropError::WrongType {
                    name: "background".into(),
                    expected: "color"
                },
            ]
        );
        assert_eq!(errors[0].to_string(), "label is required");
        assert_eq!(errors[1].to_string(), "size must be one of: sm, md, lg");
    }

    #[test]
    fn validate_rejects_wrong_value_shape() {
        let def = button();
        let mut props = def.default_props.clone();
        props.insert("width".into(), "wide".into());
        let errors = def.validate(&props).unwrap_err();
        assert_eq!(
            errors,
            vec![PropError::WrongType {
                name: "width".into(),
                expected: "number"
            }]
        );
    }

    #[test]
    fn unknown_type_fails_validation() {
        let registry = InMemoryRegistry::new(vec![button()]);
        assert_eq!(
            registry.validate_props("slider", &Props::new()),
            Err(vec![PropError::UnknownType("slider".into())])
        );
    }

    #[test]
    fn register_replaces_same_type() {
        let mut registry = InMemoryRegistry::new(vec![button(), container()]);
        let mut renamed = button();
        renamed.name = "Action".into();
        registry.register(renamed);
        assert_eq!(registry.definitions().len(), 2);
        assert_eq!(registry.definition("button").unwrap().name, "Action");
    }

    #[test]
    fn groups_by_category() {
        let registry = InMemoryRegistry::new(vec![button(), container()]);
        let grouped = registry.by_category();
        assert_eq!(grouped[&Category::Layout][0].component_type, "container");
        assert_eq!(grouped[&Category::Form][0].component_type, "button");
        assert!(!grouped.contains_key(&Category::Media));
    }
}
