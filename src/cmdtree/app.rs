//! # Application Context
//!
//! [`App`] ties the pieces together: it holds the configuration, the coercion registry, the
//! output streams and exactly one bound [`CommandTree`]. A run is
//!
//! 1. resolve the argument vector ([`CommandResolver`]),
//! 2. dispatch on the target: emit a scalar, invoke a method, or render help,
//! 3. on failure hand the error to the [`ErrorHandler`] (only in [`App::main`]).
//!
//! [`App::run`] returns errors to the caller; [`App::main`] is the process entry point that turns
//! them into an exit status.

use crate::coerce::CoercionRegistry;
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::help::render::HelpRenderer;
use crate::help::{build_page, resolve_path, HelpSubject};
use crate::model::{Interface, Member, MetaType, Parameter};
use crate::output::{DumpSink, ErrorHandler, FatalHandler, Notice, OutputSink, ValueSink};
use crate::resolver::{CommandResolver, Target};
use crate::tree::{CommandTree, Live, LiveEntry, NodeId};
use crate::typename::{self, TypeShape};
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::{debug, info};

/// What a successful run did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A scalar's value was emitted.
    Value(Value),
    /// A method ran; its result, emitted when non-null.
    Returned(Option<Value>),
    /// Help text was printed.
    Help(String),
}

pub struct App {
    config: CliConfig,
    registry: CoercionRegistry,
    output: OutputSink,
    values: Box<dyn ValueSink>,
    errors: Box<dyn ErrorHandler>,
    tree: OnceCell<CommandTree>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(CliConfig::default())
    }
}

impl App {
    pub fn new(config: CliConfig) -> Self {
        let registry = CoercionRegistry::new().with_options(config.separators.clone());
        Self {
            config,
            registry,
            output: OutputSink::stdio(),
            values: Box::new(DumpSink),
            errors: Box::new(FatalHandler),
            tree: OnceCell::new(),
        }
    }

    pub fn with_output(mut self, output: OutputSink) -> Self {
        self.output = output;
        self
    }

    pub fn with_value_sink(mut self, sink: impl ValueSink + 'static) -> Self {
        self.values = Box::new(sink);
        self
    }

    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.errors = Box::new(handler);
        self
    }

    /// Replaces the registry. The configured separators are applied to it.
    pub fn with_registry(mut self, registry: CoercionRegistry) -> Self {
        self.registry = registry.with_options(self.config.separators.clone());
        self
    }

    /// Mutable access for registering extra coercers before running.
    pub fn registry_mut(&mut self) -> &mut CoercionRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    pub fn tree(&self) -> Option<&CommandTree> {
        self.tree.get()
    }

    /// Binds the metadata and live trees. Only the first call succeeds.
    pub fn bind(&self, interface: Interface, live: Live) -> Result<&CommandTree> {
        if self.tree.get().is_some() {
            return Err(CliError::AlreadyBound);
        }
        self.tree
            .set(CommandTree::bind(interface, live))
            .map_err(|_| CliError::AlreadyBound)?;
        self.tree.get().ok_or(CliError::NotBound)
    }

    /// Resolves and dispatches one argument vector.
    pub async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<Outcome> {
        let tree = self.tree.get().ok_or(CliError::NotBound)?;
        let resolution = CommandResolver::new(tree, &self.config).resolve(args)?;
        if !resolution.flags.is_empty() {
            debug!(flags = ?resolution.flags, "flags collected");
        }

        let id = match resolution.target {
            Target::Help(path) => return self.explicit_help(tree, &path),
            Target::Group(id) | Target::Scalar(id) | Target::Method(id) => id,
        };

        match tree.entry(id) {
            Some(LiveEntry::Value(value)) => {
                debug!(path = %resolution.path.join("."), "emitting scalar");
                self.values.emit(value, &self.output)?;
                Ok(Outcome::Value(value.clone()))
            }
            Some(LiveEntry::Callable(callable)) => {
                let parameters: &[Parameter] = match &tree.node(id).meta {
                    Some(Member::Method(method)) => method.parameters.as_slice(),
                    _ => &[],
                };
                let args = self.coerce_arguments(parameters, resolution.positionals)?;
                info!(command = %resolution.path.join("."), args = args.len(), "invoking");

                let result = callable(args).await?;
                if let Some(value) = result.as_ref().filter(|v| !v.is_null()) {
                    self.values.emit(value, &self.output)?;
                }
                Ok(Outcome::Returned(result))
            }
            None => self.group_help(tree, id),
        }
    }

    /// Runs and converts failures into an exit status through the error handler.
    pub async fn main<S: AsRef<str>>(&self, args: &[S]) -> i32 {
        match self.run(args).await {
            Ok(_) => 0,
            Err(error) => self.errors.handle(&error, &self.output, self.config.debug),
        }
    }

    fn coerce_arguments(&self, parameters: &[Parameter], positionals: Vec<String>) -> Result<Vec<Value>> {
        positionals
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let param = match parameters.get(i) {
                    Some(param) if self.config.coerce_arguments => param,
                    _ => return Ok(Value::String(text)),
                };
                if text.is_empty() && param.data_type.nullable {
                    return Ok(Value::Null);
                }
                if let MetaType::Scalar { name } = param.data_type.resolved() {
                    if self.registry.has(name) || !is_plain_type(name) {
                        return self.registry.coerce(name, &text);
                    }
                    debug!(param = %param.name, type_name = %name, "no coercer; passing text");
                    return Ok(Value::String(text));
                }
                match param.data_type.coercion_name() {
                    Some(type_name) => self.registry.coerce(&type_name, &text),
                    None => Ok(Value::String(text)),
                }
            })
            .collect()
    }

    fn explicit_help(&self, tree: &CommandTree, path: &[String]) -> Result<Outcome> {
        let (subject, names) = resolve_path(tree.interface(), path)?;
        self.print_help(subject, &names)
    }

    fn group_help(&self, tree: &CommandTree, id: NodeId) -> Result<Outcome> {
        let node = tree.node(id);
        let path = tree.path(id);
        let subject = match &node.meta {
            _ if id == NodeId::ROOT => HelpSubject::Interface(tree.interface()),
            Some(member) => HelpSubject::Member(member),
            None => {
                let text = format!("no documentation for '{}'", path.join(" "));
                self.output.notice(Notice::Text(&text))?;
                HelpSubject::Undeclared
            }
        };
        self.print_help(subject, &path)
    }

    fn print_help(&self, subject: HelpSubject<'_>, path: &[String]) -> Result<Outcome> {
        let page = build_page(subject, &self.config.command_name(), path);
        let renderer = match self.config.color {
            Some(color) => HelpRenderer::with_color(color)?,
            None => HelpRenderer::detect()?,
        };
        let text = renderer.render(&page)?;
        self.output.print(&text)?;
        Ok(Outcome::Help(text))
    }
}

/// Whether a type name is a single non-collection name, which text can stand in for.
///
/// Unparsable names are not plain, so their grammar error surfaces through the registry.
fn is_plain_type(type_name: &str) -> bool {
    typename::parse(type_name)
        .map(|descriptor| matches!(descriptor.shape(), Ok(TypeShape::Plain)))
        .unwrap_or(false)
}
