mod env;
mod intp;
mod value;

pub use env::{Env, Frame, FrameId, Scope, ScopeId};
pub use intp::{ExecError, Interpreter, PROGRAM_FRAME};
pub use value::{Fault, Num, Number};
