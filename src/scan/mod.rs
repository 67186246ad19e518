mod scanner;
mod token;

pub use scanner::{ScanError, ScanErrorKind, Scanner};
pub use token::{Keyword, Lexeme, Token};
