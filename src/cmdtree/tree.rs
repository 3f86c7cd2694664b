//! # Command Tree
//!
//! Two trees describe a program: the metadata tree ([`Interface`]) says what exists and how it
//! is documented, and the live tree ([`Live`]) holds the actual values and callables. Binding
//! walks both once and produces a [`CommandTree`]:
//!
//! - an arena of [`Node`]s tagged Group / Scalar / Method, each carrying its metadata member
//!   when one was declared, and
//! - a lookup table from [`NodeId`] to the [`LiveEntry`] (value or callable) it dispatches to.
//!
//! The resolver only ever walks this structure; it never inspects the live tree by name.
//!
//! Binding is best-effort. A live member without metadata is still bound (its kind comes from
//! the live shape); a live member whose shape contradicts its metadata kind is skipped with a
//! warning, so resolving it later reports "no such command" instead of dispatching to the
//! wrong thing. Metadata members without a live counterpart simply have no node.

use crate::error::{CommandFailure, Result};
use crate::model::{Interface, Member};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a user command: an optional value to emit.
pub type CommandResult = std::result::Result<Option<Value>, CommandFailure>;

/// A live callable. Receives the (possibly coerced) positional arguments.
pub type Callable = Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, CommandResult> + Send + Sync>;

/// The author-supplied live tree.
#[derive(Clone)]
pub enum Live {
    Group(BTreeMap<String, Live>),
    Scalar(Value),
    Method(Callable),
}

impl fmt::Debug for Live {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Live::Group(children) => f.debug_map().entries(children.iter()).finish(),
            Live::Scalar(value) => write!(f, "Scalar({})", value),
            Live::Method(_) => write!(f, "Method(..)"),
        }
    }
}

impl Live {
    pub fn group() -> Self {
        Live::Group(BTreeMap::new())
    }

    /// Adds a child entry. Has no effect on non-group values.
    pub fn with(mut self, name: &str, child: Live) -> Self {
        if let Live::Group(children) = &mut self {
            children.insert(name.to_string(), child);
        }
        self
    }

    pub fn scalar(self, name: &str, value: impl Into<Value>) -> Self {
        self.with(name, Live::Scalar(value.into()))
    }

    /// Adds an async method.
    pub fn method<F, Fut>(self, name: &str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        let callable: Callable =
            Arc::new(move |args: Vec<Value>| -> BoxFuture<'static, CommandResult> {
                Box::pin(f(args))
            });
        self.with(name, Live::Method(callable))
    }

    /// Adds a method that completes without suspending.
    pub fn sync_method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> CommandResult + Send + Sync + 'static,
    {
        let callable: Callable =
            Arc::new(move |args: Vec<Value>| -> BoxFuture<'static, CommandResult> {
                let result = f(args);
                Box::pin(async move { result })
            });
        self.with(name, Live::Method(callable))
    }

    fn kind(&self) -> NodeKind {
        match self {
            Live::Group(_) => NodeKind::Group,
            Live::Scalar(_) => NodeKind::Scalar,
            Live::Method(_) => NodeKind::Method,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Scalar,
    Method,
}

impl NodeKind {
    fn of_member(member: &Member) -> Self {
        match member {
            Member::Object(_) => NodeKind::Group,
            Member::Scalar(_) => NodeKind::Scalar,
            Member::Method(_) => NodeKind::Method,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Metadata for this node; `None` for the root and for undeclared live members.
    pub meta: Option<Member>,
    children: BTreeMap<String, NodeId>,
    aliases: BTreeMap<String, NodeId>,
}

/// What a Scalar or Method node dispatches to.
#[derive(Clone)]
pub enum LiveEntry {
    Value(Value),
    Callable(Callable),
}

impl fmt::Debug for LiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveEntry::Value(v) => write!(f, "Value({})", v),
            LiveEntry::Callable(_) => write!(f, "Callable(..)"),
        }
    }
}

/// The bound pair of metadata and live trees.
#[derive(Debug)]
pub struct CommandTree {
    interface: Interface,
    nodes: Vec<Node>,
    entries: HashMap<NodeId, LiveEntry>,
}

impl CommandTree {
    /// Walks both trees once, building the node arena and the live lookup table.
    pub fn bind(interface: Interface, live: Live) -> Self {
        let mut tree = CommandTree {
            interface,
            nodes: vec![Node {
                name: String::new(),
                kind: NodeKind::Group,
                parent: None,
                meta: None,
                children: BTreeMap::new(),
                aliases: BTreeMap::new(),
            }],
            entries: HashMap::new(),
        };

        match live {
            Live::Group(children) => {
                let members = tree.interface.members.clone();
                tree.bind_children(NodeId::ROOT, &members, children, &[]);
            }
            other => warn!(live = ?other, "live root is not a group; nothing bound"),
        }
        debug!(nodes = tree.nodes.len(), "command tree bound");
        tree
    }

    fn bind_children(
        &mut self,
        parent: NodeId,
        members: &[Member],
        live: BTreeMap<String, Live>,
        path: &[String],
    ) {
        for (name, child) in live {
            let meta = members.iter().find(|m| m.name() == name).cloned();
            let kind = child.kind();
            let mut child_path = path.to_vec();
            child_path.push(name.clone());

            if let Some(member) = &meta {
                let declared = NodeKind::of_member(member);
                if declared != kind {
                    warn!(
                        path = %child_path.join("."),
                        ?declared,
                        live = ?kind,
                        "live member does not match its metadata; skipping"
                    );
                    continue;
                }
            }

            let id = NodeId(self.nodes.len());
            let aliases = meta
                .as_ref()
                .map(|m| m.doc().aliases.clone())
                .unwrap_or_default();
            let nested = meta.as_ref().map(|m| m.children().to_vec()).unwrap_or_default();
            self.nodes.push(Node {
                name: name.clone(),
                kind,
                parent: Some(parent),
                meta,
                children: BTreeMap::new(),
                aliases: BTreeMap::new(),
            });

            let parent_node = &mut self.nodes[parent.0];
            parent_node.children.insert(name.clone(), id);
            for alias in aliases {
                parent_node.aliases.entry(alias).or_insert(id);
            }

            match child {
                Live::Group(grandchildren) => {
                    self.bind_children(id, &nested, grandchildren, &child_path)
                }
                Live::Scalar(value) => {
                    self.entries.insert(id, LiveEntry::Value(value));
                }
                Live::Method(callable) => {
                    self.entries.insert(id, LiveEntry::Callable(callable));
                }
            }
        }

        for member in members {
            if !self.nodes[parent.0].children.contains_key(member.name()) {
                debug!(
                    path = %path.join("."),
                    member = member.name(),
                    "declared member has no live counterpart"
                );
            }
        }
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Looks up a child of a group by name, then by alias.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(parent);
        node.children
            .get(name)
            .or_else(|| node.aliases.get(name))
            .copied()
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.node(parent)
            .children
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
    }

    pub fn entry(&self, id: NodeId) -> Option<&LiveEntry> {
        self.entries.get(&id)
    }

    /// Names from the root down to the node.
    pub fn path(&self, id: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                names.push(node.name.clone());
            }
            current = node.parent;
        }
        names.reverse();
        names
    }
}

/// Wraps a plain error message as a command failure.
pub fn fail<T>(message: impl Into<String>) -> std::result::Result<T, CommandFailure> {
    Err(CommandFailure::new(message))
}

/// Returns the positional argument at `index` as text, if present.
pub fn arg_str(args: &[Value], index: usize) -> Option<&str> {
    args.get(index).and_then(Value::as_str)
}

/// Convenience for tests and embedders that build an interface programmatically.
pub fn bind_json(metadata: &Value, live: Live) -> Result<CommandTree> {
    let interface: Interface = serde_json::from_value(metadata.clone())?;
    Ok(CommandTree::bind(interface, live))
}
