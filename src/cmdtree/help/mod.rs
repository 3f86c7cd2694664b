//! # Help
//!
//! Help is built in two steps. [`build_page`] turns a resolved metadata context into a
//! [`HelpPage`]: plain data with every column width and truncation already worked out.
//! [`render::HelpRenderer`] then feeds the page to a template that only decides layout and
//! style names.
//!
//! Layout math stays in Rust because it needs Unicode-aware widths; the template stays free of
//! arithmetic.

pub mod render;
pub mod styles;
pub mod templates;

use crate::error::{CliError, Result};
use crate::model::{find_member, Interface, Member, MetaType, MetaTypeRef};
use serde::Serialize;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width budget for one-line summaries derived from descriptions.
pub const SUMMARY_WIDTH: usize = 72;

const GROUP_PLACEHOLDER: &str = "GROUP";
const COMMAND_PLACEHOLDER: &str = "COMMAND";

/// The metadata a help page is built from.
#[derive(Debug, Clone, Copy)]
pub enum HelpSubject<'a> {
    Interface(&'a Interface),
    Member(&'a Member),
    /// A live member with no declared metadata.
    Undeclared,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HelpRow {
    pub name: String,
    pub name_pad: String,
    pub kind: String,
    pub kind_pad: String,
    pub optional: bool,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HelpPage {
    pub header: Option<String>,
    pub name: String,
    pub summary: Option<String>,
    pub usage: String,
    pub description: Vec<String>,
    pub value_type: Option<String>,
    pub parameters: Vec<HelpRow>,
    pub returns: Option<String>,
    pub groups: Vec<HelpRow>,
    pub commands: Vec<HelpRow>,
}

/// Walks the metadata tree along `path`, returning the subject and the canonical names.
///
/// Walking stops at the first scalar or method; anything after it is ignored.
pub fn resolve_path<'a>(
    interface: &'a Interface,
    path: &[String],
) -> Result<(HelpSubject<'a>, Vec<String>)> {
    let mut subject = HelpSubject::Interface(interface);
    let mut members: &[Member] = &interface.members;
    let mut names = Vec::new();

    for (i, token) in path.iter().enumerate() {
        let member = find_member(members, token).ok_or_else(|| CliError::NoSuchCommand {
            token: token.clone(),
            path: names.clone(),
        })?;
        names.push(member.name().to_string());
        subject = HelpSubject::Member(member);
        if !matches!(member, Member::Object(_)) {
            if i + 1 < path.len() {
                debug!(ignored = ?&path[i + 1..], "help path continues past a command");
            }
            break;
        }
        members = member.children();
    }
    Ok((subject, names))
}

/// Builds the help page for a subject reached through `path`.
pub fn build_page(subject: HelpSubject<'_>, command_name: &str, path: &[String]) -> HelpPage {
    let mut dotted = vec![command_name.to_string()];
    dotted.extend(path.iter().cloned());
    let mut usage = dotted.join(" ");

    let mut page = HelpPage {
        header: None,
        name: dotted.join("."),
        summary: None,
        usage: String::new(),
        description: Vec::new(),
        value_type: None,
        parameters: Vec::new(),
        returns: None,
        groups: Vec::new(),
        commands: Vec::new(),
    };

    let children: &[Member] = match subject {
        HelpSubject::Interface(interface) => {
            page.header = Some(match &interface.package.version {
                Some(version) => format!("{} {}", interface.package.name, version),
                None => interface.package.name.clone(),
            });
            page.summary = one_line(interface.summary.as_deref(), interface.description.as_deref());
            page.description = paragraph(interface.description.as_deref());
            &interface.members
        }
        HelpSubject::Member(member) => {
            let doc = member.doc();
            page.summary = one_line(doc.summary.as_deref(), doc.description.as_deref());
            page.description = paragraph(doc.description.as_deref());
            match member {
                Member::Method(method) => {
                    for param in &method.parameters {
                        usage.push(' ');
                        if param.data_type.nullable {
                            usage.push_str(&format!("[{}]", param.name));
                        } else {
                            usage.push_str(&param.name);
                        }
                    }
                    page.parameters = aligned(
                        method
                            .parameters
                            .iter()
                            .map(|p| {
                                let mut note =
                                    one_line(p.summary.as_deref(), p.description.as_deref())
                                        .unwrap_or_default();
                                append_extras(&mut note, &p.default, &p.example);
                                (
                                    p.name.clone(),
                                    display_type(&p.data_type),
                                    p.data_type.nullable,
                                    note,
                                )
                            })
                            .collect(),
                    );
                    page.returns = method.returns.as_ref().map(display_type);
                    &[]
                }
                Member::Scalar(property) => {
                    page.value_type = Some(display_type(&property.data_type));
                    &[]
                }
                Member::Object(_) => member.children(),
            }
        }
        HelpSubject::Undeclared => &[],
    };

    let visible: Vec<&Member> = {
        let mut v: Vec<&Member> = children.iter().filter(|m| !m.is_hidden()).collect();
        v.sort_by(|a, b| a.name().cmp(b.name()));
        v
    };
    let (groups, commands): (Vec<&Member>, Vec<&Member>) =
        visible.into_iter().partition(|m| m.is_group());

    let placeholders: Vec<&str> = [
        (!groups.is_empty()).then_some(GROUP_PLACEHOLDER),
        (!commands.is_empty()).then_some(COMMAND_PLACEHOLDER),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !placeholders.is_empty() {
        usage.push(' ');
        usage.push_str(&placeholders.join("|"));
    }
    page.usage = usage;

    page.groups = aligned(groups.into_iter().map(child_row).collect());
    page.commands = aligned(commands.into_iter().map(child_row).collect());
    page
}

fn child_row(member: &Member) -> (String, String, bool, String) {
    let doc = member.doc();
    let mut name = doc.name.clone();
    if !doc.aliases.is_empty() {
        name.push_str(&format!(" ({})", doc.aliases.join(", ")));
    }
    let note = one_line(doc.summary.as_deref(), doc.description.as_deref()).unwrap_or_default();
    (name, String::new(), false, note)
}

fn append_extras(note: &mut String, default: &Option<String>, example: &Option<String>) {
    let extras: Vec<String> = [
        default.as_ref().map(|d| format!("default: {}", d)),
        example.as_ref().map(|e| format!("e.g. {}", e)),
    ]
    .into_iter()
    .flatten()
    .collect();
    if extras.is_empty() {
        return;
    }
    if !note.is_empty() {
        note.push(' ');
    }
    note.push_str(&format!("[{}]", extras.join("; ")));
}

/// Pads the name and type columns so notes line up.
fn aligned(rows: Vec<(String, String, bool, String)>) -> Vec<HelpRow> {
    let name_width = rows.iter().map(|r| r.0.width()).max().unwrap_or(0);
    let kind_width = rows.iter().map(|r| r.1.width()).max().unwrap_or(0);
    rows.into_iter()
        .map(|(name, kind, optional, note)| HelpRow {
            name_pad: " ".repeat(name_width - name.width()),
            kind_pad: " ".repeat(kind_width - kind.width()),
            name,
            kind,
            optional,
            note,
        })
        .collect()
}

/// Human-readable rendering of a declared type.
pub fn display_type(type_ref: &MetaTypeRef) -> String {
    match &type_ref.ty {
        MetaType::Scalar { name } => name.clone(),
        MetaType::Object { name: Some(name), .. } => name.clone(),
        MetaType::Object { name: None, .. } => "unknown".to_string(),
        MetaType::Array { element } => format!("{}[]", display_type(element)),
        MetaType::Record { key, value } => {
            format!("Map<{},{}>", key.as_str(), display_type(value))
        }
        MetaType::Reference { target, .. } => display_type(target),
    }
}

/// An explicit summary, else the description's first line cut to [`SUMMARY_WIDTH`].
pub fn one_line(summary: Option<&str>, description: Option<&str>) -> Option<String> {
    if let Some(summary) = summary.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(summary.to_string());
    }
    let first = description?.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(truncate_to_width(first, SUMMARY_WIDTH))
}

fn paragraph(description: Option<&str>) -> Vec<String> {
    description
        .map(|d| d.trim().lines().map(|l| l.trim_end().to_string()).collect())
        .unwrap_or_default()
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordKey;
    use serde_json::json;

    fn interface() -> Interface {
        serde_json::from_value(json!({
            "package": { "name": "demo", "version": "2.0.0" },
            "summary": "A demo tool",
            "members": [
                { "kind": "object", "name": "foo", "summary": "Foo things",
                  "dataType": { "type": { "kind": "object", "name": "Foo", "members": [
                      { "kind": "method", "name": "bar",
                        "description": "Runs bar.\nLonger explanation here.",
                        "parameters": [
                            { "name": "a", "description": "First input",
                              "dataType": { "type": { "kind": "scalar", "name": "string" } } },
                            { "name": "b", "default": "1,2", "example": "3,4",
                              "dataType": { "type": { "kind": "array",
                                  "element": { "type": { "kind": "scalar", "name": "number" } } },
                                  "nullable": true } }
                        ],
                        "returns": { "type": { "kind": "scalar", "name": "string" } } },
                      { "kind": "object", "name": "nested",
                        "dataType": { "type": { "kind": "object", "members": [] } } }
                  ] } } },
                { "kind": "scalar", "name": "version", "aliases": ["v"],
                  "description": "Tool version",
                  "dataType": { "type": { "kind": "scalar", "name": "string" } } },
                { "kind": "method", "name": "secret", "visibility": "hidden" },
                { "kind": "method", "name": "apply" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_root_page_lists_groups_and_commands_sorted() {
        let interface = interface();
        let page = build_page(HelpSubject::Interface(&interface), "demo", &[]);

        assert_eq!(page.header.as_deref(), Some("demo 2.0.0"));
        assert_eq!(page.name, "demo");
        assert_eq!(page.summary.as_deref(), Some("A demo tool"));
        assert_eq!(page.usage, "demo GROUP|COMMAND");

        let groups: Vec<_> = page.groups.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(groups, vec!["foo"]);
        let commands: Vec<_> = page.commands.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(commands, vec!["apply", "version (v)"]);
    }

    #[test]
    fn test_hidden_members_are_not_listed() {
        let interface = interface();
        let page = build_page(HelpSubject::Interface(&interface), "demo", &[]);
        assert!(page.commands.iter().all(|r| !r.name.starts_with("secret")));
    }

    #[test]
    fn test_method_page_has_parameters_and_usage() {
        let interface = interface();
        let path = vec!["foo".to_string(), "bar".to_string()];
        let (subject, names) = resolve_path(&interface, &path).unwrap();
        let page = build_page(subject, "demo", &names);

        assert_eq!(page.name, "demo.foo.bar");
        assert_eq!(page.summary.as_deref(), Some("Runs bar."));
        assert_eq!(page.usage, "demo foo bar a [b]");
        assert_eq!(
            page.description,
            vec!["Runs bar.".to_string(), "Longer explanation here.".to_string()]
        );
        assert_eq!(page.returns.as_deref(), Some("string"));

        let a = &page.parameters[0];
        assert_eq!((a.name.as_str(), a.kind.as_str()), ("a", "string"));
        assert!(!a.optional);
        assert_eq!(a.note, "First input");

        let b = &page.parameters[1];
        assert_eq!(b.kind, "number[]");
        assert!(b.optional);
        assert_eq!(b.note, "[default: 1,2; e.g. 3,4]");
        assert!(page.groups.is_empty() && page.commands.is_empty());
    }

    #[test]
    fn test_group_page_uses_group_placeholder_only() {
        let interface = interface();
        let (subject, names) = resolve_path(&interface, &["foo".to_string()]).unwrap();
        let page = build_page(subject, "demo", &names);
        assert_eq!(page.usage, "demo foo GROUP|COMMAND");
        assert_eq!(page.groups[0].name, "nested");
        assert_eq!(page.commands[0].name, "bar");
        assert_eq!(page.commands[0].note, "Runs bar.");
        assert!(page.header.is_none());
    }

    #[test]
    fn test_scalar_page_shows_type() {
        let interface = interface();
        let (subject, names) = resolve_path(&interface, &["v".to_string()]).unwrap();
        assert_eq!(names, vec!["version"]);
        let page = build_page(subject, "demo", &names);
        assert_eq!(page.value_type.as_deref(), Some("string"));
        assert_eq!(page.usage, "demo version");
    }

    #[test]
    fn test_unknown_help_path_is_structural_error() {
        let interface = interface();
        let err = resolve_path(&interface, &["foo".to_string(), "nope".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::NoSuchCommand { token, path } if token == "nope" && path == vec!["foo"]));
    }

    #[test]
    fn test_help_path_stops_at_a_command() {
        let interface = interface();
        let path = vec!["apply".to_string(), "more".to_string()];
        let (_, names) = resolve_path(&interface, &path).unwrap();
        assert_eq!(names, vec!["apply"]);
    }

    #[test]
    fn test_rows_are_padded_to_common_width() {
        let interface = interface();
        let page = build_page(HelpSubject::Interface(&interface), "demo", &[]);
        let widths: Vec<usize> = page
            .commands
            .iter()
            .map(|r| r.name.width() + r.name_pad.len())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_display_type_rendering() {
        let record = MetaTypeRef::new(MetaType::Record {
            key: RecordKey::String,
            value: Box::new(MetaTypeRef::new(MetaType::Array {
                element: Box::new(MetaTypeRef::scalar("number")),
            })),
        });
        assert_eq!(display_type(&record), "Map<string,number[]>");

        let reference = MetaTypeRef::new(MetaType::Reference {
            name: "Alias".into(),
            target: Box::new(MetaTypeRef::new(MetaType::Object {
                name: None,
                members: vec![],
            })),
        });
        assert_eq!(display_type(&reference), "unknown");
    }

    #[test]
    fn test_one_line_prefers_summary_then_truncated_description() {
        assert_eq!(one_line(Some("short"), Some("long")).as_deref(), Some("short"));
        assert_eq!(one_line(None, None), None);

        let long = "x".repeat(SUMMARY_WIDTH + 10);
        let cut = one_line(None, Some(&long)).unwrap();
        assert!(cut.ends_with('…'));
        assert_eq!(cut.width(), SUMMARY_WIDTH);
    }
}
