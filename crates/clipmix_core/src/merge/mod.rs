//! Final concatenation with music overlay.
//!
//! # Encoder selection
//!
//! | music            | StreamCopy                 | HardwareTranscode            |
//! |------------------|----------------------------|------------------------------|
//! | duration > 0     | trim+fade, software encode | trim+fade, hardware encode   |
//! | duration unknown | `-shortest`, `copy`        | `-shortest`, hardware encode |
//! | none             | `copy`                     | hardware encode              |
//!
//! A filtered video stream can never be passed through untouched, so
//! `copy` only appears when no trim/fade filter is applied.

mod command;
mod fade;
mod merger;

pub use command::MergeCommandBuilder;
pub use fade::FadeWindow;
pub use merger::{MergeError, MergeOutput, MergeResult, Merger};
