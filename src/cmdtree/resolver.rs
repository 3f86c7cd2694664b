//! # Command Resolution
//!
//! Walks an argument vector against a bound [`CommandTree`] and decides what the invocation
//! means. Resolution is a small state machine:
//!
//! ```text
//!   Navigating ──(group token)──▶ Navigating
//!       │
//!       ├──(scalar / method token)──▶ Dispatching
//!       ├──(help keyword at depth 0)──▶ Dispatching (help path collects the rest)
//!       │
//!       └──(end of input)──▶ Done
//! ```
//!
//! While navigating, a token that names a child of the current group descends into it. Tokens
//! that name nothing are flags when they carry the flag prefix and an error otherwise. Once a
//! scalar, a method or the help keyword is reached, no more tree lookups happen: every remaining
//! token is a flag or a positional (or, for help, part of the help path).
//!
//! Resolution itself is synchronous and side-effect free; [`crate::app`] performs the dispatch.

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::tree::{CommandTree, NodeId, NodeKind};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Navigating,
    Dispatching,
    Done,
}

/// The terminal context of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Input ended at a group: show its help.
    Group(NodeId),
    Scalar(NodeId),
    Method(NodeId),
    /// Explicit help request for the given path.
    Help(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: Target,
    /// Command names consumed to reach the target.
    pub path: Vec<String>,
    pub positionals: Vec<String>,
    pub flags: BTreeMap<String, String>,
}

/// Splits a flag token (prefix already removed) into name and value.
///
/// Only the first `=` separates; a flag without one has an empty value.
pub fn split_flag(body: &str) -> (String, String) {
    match body.split_once('=') {
        Some((name, value)) => (name.to_string(), value.to_string()),
        None => (body.to_string(), String::new()),
    }
}

pub struct CommandResolver<'a> {
    tree: &'a CommandTree,
    config: &'a CliConfig,
    state: State,
    current: NodeId,
    depth: usize,
    path: Vec<String>,
    help_path: Option<Vec<String>>,
    positionals: Vec<String>,
    flags: BTreeMap<String, String>,
}

impl<'a> CommandResolver<'a> {
    pub fn new(tree: &'a CommandTree, config: &'a CliConfig) -> Self {
        Self {
            tree,
            config,
            state: State::Navigating,
            current: NodeId::ROOT,
            depth: 0,
            path: Vec::new(),
            help_path: None,
            positionals: Vec::new(),
            flags: BTreeMap::new(),
        }
    }

    /// Resolves a whole argument vector.
    pub fn resolve<S: AsRef<str>>(mut self, args: &[S]) -> Result<Resolution> {
        for arg in args {
            self.step(arg.as_ref())?;
        }
        self.finish()
    }

    /// Consumes one token.
    pub fn step(&mut self, token: &str) -> Result<()> {
        match self.state {
            State::Navigating => self.navigate(token),
            State::Dispatching => {
                if let Some(help_path) = self.help_path.as_mut() {
                    help_path.push(token.to_string());
                } else {
                    self.classify(token);
                }
                Ok(())
            }
            State::Done => Ok(()),
        }
    }

    fn navigate(&mut self, token: &str) -> Result<()> {
        if self.depth == 0 && self.config.is_help_keyword(token) {
            debug!(token, "help keyword");
            self.help_path = Some(Vec::new());
            self.state = State::Dispatching;
            return Ok(());
        }

        if let Some(child) = self.tree.child(self.current, token) {
            let node = self.tree.node(child);
            self.current = child;
            self.depth += 1;
            self.path.push(node.name.clone());
            if node.kind != NodeKind::Group {
                self.state = State::Dispatching;
            }
            debug!(token, kind = ?node.kind, depth = self.depth, "descended");
            return Ok(());
        }

        if token.starts_with(self.config.flag_prefix.as_str()) {
            self.classify(token);
            return Ok(());
        }

        Err(CliError::NoSuchCommand {
            token: token.to_string(),
            path: self.path.clone(),
        })
    }

    fn classify(&mut self, token: &str) {
        match token.strip_prefix(self.config.flag_prefix.as_str()) {
            Some(body) => {
                let (name, value) = split_flag(body);
                debug!(flag = %name, value = %value, "flag");
                self.flags.insert(name, value);
            }
            None => {
                debug!(positional = token, "positional");
                self.positionals.push(token.to_string());
            }
        }
    }

    /// Ends input and produces the resolution.
    pub fn finish(mut self) -> Result<Resolution> {
        let target = if let Some(help_path) = self.help_path.take() {
            Target::Help(help_path)
        } else {
            match self.tree.node(self.current).kind {
                NodeKind::Scalar => Target::Scalar(self.current),
                NodeKind::Method => Target::Method(self.current),
                NodeKind::Group if self.config.auto_help => Target::Group(self.current),
                NodeKind::Group => {
                    return Err(CliError::MissingCommand {
                        path: self.path.clone(),
                    })
                }
            }
        };
        self.state = State::Done;
        debug!(?target, state = ?self.state, "resolved");

        Ok(Resolution {
            target,
            path: self.path,
            positionals: self.positionals,
            flags: self.flags,
        })
    }
}
