mod codequest;

pub use codequest::codequest_cli;
