//! Metadata shapes describing a program's callable surface.
//!
//! These are produced by an external analyzer and loaded once at startup, typically from JSON:
//!
//! ```json
//! {
//!   "package": { "name": "demo", "version": "1.0.0" },
//!   "summary": "Demo tool",
//!   "members": [
//!     { "kind": "method", "name": "greet",
//!       "parameters": [ { "name": "who", "dataType": { "type": { "kind": "scalar", "name": "string" } } } ] }
//!   ]
//! }
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Root of the metadata tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub package: PackageInfo,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Interface {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        find_member(&self.members, name)
    }
}

/// Finds a member by name first, then by alias.
pub fn find_member<'a>(members: &'a [Member], name: &str) -> Option<&'a Member> {
    members
        .iter()
        .find(|m| m.name() == name)
        .or_else(|| members.iter().find(|m| m.doc().aliases.iter().any(|a| a == name)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Hidden,
}

/// Documentation and naming shared by every member kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Member {
    /// A nested group; its data type is an object or collection.
    Object(ObjectProperty),
    /// A value-returning property.
    Scalar(ScalarProperty),
    /// A callable.
    Method(Method),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProperty {
    #[serde(flatten)]
    pub doc: MemberDoc,
    pub data_type: MetaTypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarProperty {
    #[serde(flatten)]
    pub doc: MemberDoc,
    pub data_type: MetaTypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    #[serde(flatten)]
    pub doc: MemberDoc,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Absent for void or unknown returns.
    #[serde(default)]
    pub returns: Option<MetaTypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    pub data_type: MetaTypeRef,
}

impl Member {
    pub fn doc(&self) -> &MemberDoc {
        match self {
            Member::Object(p) => &p.doc,
            Member::Scalar(p) => &p.doc,
            Member::Method(m) => &m.doc,
        }
    }

    pub fn name(&self) -> &str {
        &self.doc().name
    }

    pub fn is_hidden(&self) -> bool {
        self.doc().visibility == Visibility::Hidden
    }

    /// The declared data type, for properties.
    pub fn data_type(&self) -> Option<&MetaTypeRef> {
        match self {
            Member::Object(p) => Some(&p.data_type),
            Member::Scalar(p) => Some(&p.data_type),
            Member::Method(_) => None,
        }
    }

    /// Whether this member lists as a group: its declared type resolves to an object type.
    pub fn is_group(&self) -> bool {
        self.data_type()
            .map(|t| matches!(t.resolved(), MetaType::Object { .. }))
            .unwrap_or(false)
    }

    /// Child members when the declared type is an object type.
    pub fn children(&self) -> &[Member] {
        self.data_type()
            .and_then(|t| t.object_members())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTypeRef {
    #[serde(rename = "type")]
    pub ty: MetaType,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKey {
    String,
    Number,
}

impl RecordKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKey::String => "string",
            RecordKey::Number => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MetaType {
    Scalar {
        name: String,
    },
    Object {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        members: Vec<Member>,
    },
    Array {
        element: Box<MetaTypeRef>,
    },
    Record {
        key: RecordKey,
        value: Box<MetaTypeRef>,
    },
    /// A named alias for another type.
    Reference {
        name: String,
        target: Box<MetaTypeRef>,
    },
}

impl MetaTypeRef {
    pub fn new(ty: MetaType) -> Self {
        Self {
            ty,
            nullable: false,
        }
    }

    pub fn scalar(name: &str) -> Self {
        Self::new(MetaType::Scalar {
            name: name.to_string(),
        })
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Follows references down to the underlying type.
    pub fn resolved(&self) -> &MetaType {
        match &self.ty {
            MetaType::Reference { target, .. } => target.resolved(),
            other => other,
        }
    }

    pub fn object_members(&self) -> Option<&[Member]> {
        match self.resolved() {
            MetaType::Object { members, .. } => Some(members),
            _ => None,
        }
    }

    /// Type-name text understood by the coercion registry, or `None` for composite object
    /// types that cannot be built from a single argument.
    pub fn coercion_name(&self) -> Option<String> {
        match self.resolved() {
            MetaType::Scalar { name } => Some(name.clone()),
            MetaType::Object { .. } => None,
            MetaType::Array { element } => Some(format!("Array<{}>", element.coercion_name()?)),
            MetaType::Record { key, value } => Some(format!(
                "Record<{},{}>",
                key.as_str(),
                value.coercion_name()?
            )),
            MetaType::Reference { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "package": { "name": "demo", "version": "1.2.3" },
            "summary": "Demo tool",
            "members": [
                {
                    "kind": "object",
                    "name": "foo",
                    "aliases": ["f"],
                    "dataType": { "type": { "kind": "object", "name": "Foo", "members": [
                        {
                            "kind": "method",
                            "name": "bar",
                            "description": "Does bar things",
                            "parameters": [
                                { "name": "a", "dataType": { "type": { "kind": "scalar", "name": "string" } } },
                                { "name": "b", "dataType": { "type": { "kind": "scalar", "name": "number" }, "nullable": true } }
                            ]
                        }
                    ] } }
                },
                {
                    "kind": "scalar",
                    "name": "version",
                    "visibility": "hidden",
                    "dataType": { "type": { "kind": "scalar", "name": "string" } }
                }
            ]
        })
    }

    #[test]
    fn test_deserializes_nested_interface() {
        let interface: Interface = serde_json::from_value(sample()).unwrap();
        assert_eq!(interface.package.name, "demo");
        assert_eq!(interface.package.version.as_deref(), Some("1.2.3"));

        let foo = interface.member("foo").unwrap();
        assert!(foo.is_group());
        let bar = &foo.children()[0];
        match bar {
            Member::Method(m) => {
                assert_eq!(m.parameters.len(), 2);
                assert!(m.parameters[1].data_type.nullable);
                assert!(m.returns.is_none());
            }
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_member_lookup_falls_back_to_aliases() {
        let interface: Interface = serde_json::from_value(sample()).unwrap();
        assert_eq!(interface.member("f").map(|m| m.name()), Some("foo"));
        assert!(interface.member("missing").is_none());
    }

    #[test]
    fn test_visibility_defaults_to_public() {
        let interface: Interface = serde_json::from_value(sample()).unwrap();
        assert!(!interface.member("foo").unwrap().is_hidden());
        assert!(interface.member("version").unwrap().is_hidden());
    }

    #[test]
    fn test_references_resolve_to_target() {
        let alias = MetaTypeRef::new(MetaType::Reference {
            name: "Ids".into(),
            target: Box::new(MetaTypeRef::new(MetaType::Array {
                element: Box::new(MetaTypeRef::scalar("number")),
            })),
        });
        assert!(matches!(alias.resolved(), MetaType::Array { .. }));
        assert_eq!(alias.coercion_name().as_deref(), Some("Array<number>"));
    }

    #[test]
    fn test_coercion_name_for_records_and_objects() {
        let record = MetaTypeRef::new(MetaType::Record {
            key: RecordKey::String,
            value: Box::new(MetaTypeRef::scalar("boolean")),
        });
        assert_eq!(
            record.coercion_name().as_deref(),
            Some("Record<string,boolean>")
        );

        let object = MetaTypeRef::new(MetaType::Object {
            name: None,
            members: vec![],
        });
        assert_eq!(object.coercion_name(), None);
    }

    #[test]
    fn test_load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, sample().to_string()).unwrap();

        let interface = Interface::load(&path).unwrap();
        assert_eq!(interface.members.len(), 2);
    }

    #[test]
    fn test_malformed_metadata_is_reported() {
        let err = Interface::from_json("{\"members\": []}").unwrap_err();
        assert!(matches!(err, crate::error::CliError::Metadata(_)));
    }
}
