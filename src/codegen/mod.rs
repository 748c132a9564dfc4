//! Script generation from a populated world
//!
//! Each instance is rendered by expanding its class's patterns: inline tags
//! delimited by the configured separator are replaced by resolved values,
//! conditional patterns pick their branch, and instances on arrays are
//! wrapped in loops. The assembled script orders instances so that
//! topology comes before what depends on it.
//!
//! # Example
//!
//! ```text
//! entity Node node 0 : begin set #name# [new Node]; end
//! ```
//!
//! An instance `n1` on array `{i, 5}` generates:
//!
//! ```text
//! for {set i 0} {$i<5} {incr i} {
//! set n1($i) [new Node]
//! }
//! ```

mod config;
mod generator;
mod hooks;
mod loops;
mod precedence;
mod resolver;
mod substitute;

pub use config::{GeneratorConfig, LoopStyle};
pub use generator::Generator;
pub use hooks::{DistinctColors, PrePass, PALETTE};
pub use loops::LoopFrame;
pub use precedence::{ordered, rank, IconClass};
pub use resolver::ValueResolver;
pub use substitute::{expand, UnterminatedTag};
