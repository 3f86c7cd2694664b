//! # Cmdtree Architecture
//!
//! Cmdtree turns a program's **typed description of itself** into a command-line interface. The
//! description (an [`model::Interface`], usually loaded from JSON produced by a source analyzer)
//! says which groups, values and methods exist, how they are documented and what their parameters
//! are. The program supplies a matching **live tree** ([`tree::Live`]) of actual values and
//! callables. Cmdtree binds the two once and then maps argument vectors onto them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  App (app.rs)                                               │
//! │  - Owns config, coercion registry, output, the bound tree   │
//! │  - Dispatches: emit scalar / invoke method / render help    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Resolution (resolver.rs)                                   │
//! │  - Navigating → Dispatching → Done                          │
//! │  - Splits tokens into path, flags and positionals           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Tree (tree.rs)                                     │
//! │  - Node arena tagged Group / Scalar / Method                │
//! │  - NodeId → live value or callable                          │
//! └─────────────────────────────────────────────────────────────┘
//!            │                                    │
//!            ▼                                    ▼
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │  Metadata (model.rs)     │      │  Coercion (coerce.rs,    │
//! │  - Interface / Member    │      │  typename.rs)            │
//! │  - MetaType / MetaTypeRef│      │  - text → typed values   │
//! └──────────────────────────┘      └──────────────────────────┘
//! ```
//!
//! Help (help/) reads only the metadata; it never looks at the live tree.
//!
//! ## Key Principle: No Process Assumptions in the Library
//!
//! Everything below [`app::App::main`] returns `Result` and writes through an
//! [`output::OutputSink`]. Nothing calls `std::process::exit` except the default
//! [`output::FatalHandler`], and debug mode disables even that. Tests run whole invocations
//! against captured output.
//!
//! ## Minimal Use
//!
//! ```no_run
//! use cmdtree::{App, CliConfig, Interface, Live};
//! use serde_json::json;
//!
//! # async fn demo() -> cmdtree::Result<()> {
//! let interface = Interface::from_json(r#"{
//!     "package": { "name": "greeter" },
//!     "members": [ { "kind": "method", "name": "hello", "parameters": [
//!         { "name": "who", "dataType": { "type": { "kind": "scalar", "name": "string" } } }
//!     ] } ]
//! }"#)?;
//! let live = Live::group().sync_method("hello", |args| {
//!     let who = args.first().and_then(|v| v.as_str()).unwrap_or("world").to_string();
//!     Ok(Some(json!(format!("hello, {}", who))))
//! });
//!
//! let app = App::new(CliConfig::default());
//! app.bind(interface, live)?;
//! let code = app.main(&["hello", "there"]).await;
//! # let _ = code;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod coerce;
pub mod config;
pub mod error;
pub mod help;
pub mod model;
pub mod output;
pub mod resolver;
pub mod tree;
pub mod typename;

pub use app::{App, Outcome};
pub use coerce::{CoerceOptions, CoercionRegistry};
pub use config::CliConfig;
pub use error::{CliError, CommandFailure, ErrorKind, Result};
pub use model::Interface;
pub use output::{Notice, OutputSink};
pub use tree::{CommandResult, Live};
pub use typename::TypeDescriptor;
