//! Console output: theme, verbosity modes, progress reporting, hints.

pub mod hints;
pub mod output;
pub mod reporter;
pub mod theme;

pub use output::OutputMode;
pub use reporter::Reporter;
pub use theme::{should_use_colors, BerthTheme};
