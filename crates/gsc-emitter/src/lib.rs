//! Backends: translate the typed IR into target source text.
//!
//! An emitter is a pure consumer of the IR: given a module, it produces an
//! insertion-ordered map of file names to file contents. All state (the
//! anonymous-struct registry, writer buffers, namespace names) is owned by
//! the emitter instance and reset per module; nothing global.

use gsc_common::{CompilerOptions, EmitTarget, SourceLoc};
use gsc_ir::Module;
use indexmap::IndexMap;

pub mod cpp;
pub mod gs;
pub mod sanitize;
pub mod structs;
pub mod writer;

pub use cpp::CppEmitter;
pub use gs::GoodScriptEmitter;

/// Emitted artifacts for one module, in emission order.
pub type EmitOutput = IndexMap<String, String>;

/// A fatal backend failure (unhandled IR shape). Like lowering errors,
/// these abandon the current module only.
#[derive(Clone, Debug)]
pub struct EmitError {
    pub message: String,
    pub loc: Option<SourceLoc>,
}

impl EmitError {
    pub(crate) fn new(message: impl Into<String>, loc: Option<SourceLoc>) -> Self {
        EmitError {
            message: message.into(),
            loc,
        }
    }
}

impl std::fmt::Display for EmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            Some(loc) => write!(f, "{}: {}", loc, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for EmitError {}

/// The backend contract: one module in, named artifacts out.
pub trait Emitter {
    fn emit_module(&mut self, module: &Module) -> Result<EmitOutput, EmitError>;
}

/// Construct the emitter selected by the compiler options. The target set
/// is open; these are the two the compiler ships with.
pub fn emitter_for(options: &CompilerOptions) -> Box<dyn Emitter> {
    match options.target {
        EmitTarget::Cpp => Box::new(CppEmitter::new(options.memory_mode, options.source_map)),
        EmitTarget::GoodScript => Box::new(GoodScriptEmitter::new()),
    }
}
