//! Editor module: byte buffer, command language, search and scripting

pub mod address;
pub mod bitops;
pub mod buffer;
pub mod command;
mod execute;
mod expr;
pub mod file;
pub mod host;
pub mod literal;
pub mod marks;
pub mod script;
pub mod search;
pub mod session;

pub use command::{CommandError, Flow};
pub use host::{ProcessRunner, Status, StatusSink};
pub use script::ScriptFlags;
pub use session::EditorSession;
