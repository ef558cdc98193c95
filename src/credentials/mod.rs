// src/credentials/mod.rs
mod material;
pub mod path;
mod refresh;

pub use material::material_for;
pub use path::FieldPath;
pub use refresh::{parse_expiry, CommandRunner, HelperOutput, ShellCommandRunner, TokenRefresher};
