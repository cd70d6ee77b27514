//! RockPaint: the drawing engine behind the "paint a rock" widget.
//!
//! A [`project::Project`] owns a 500×350 [`canvas::Surface`], the tool
//! modes and brush, a recent-color palette, a round-robin stamp carousel and
//! a bounded snapshot history with undo. Pointer input goes in through the
//! project; pixels, palette and [`project::PainterEvent`]s come out for
//! whatever presentation layer hosts it.

pub mod logger;

pub mod assets;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod error;
pub mod gallery;
pub mod io;
pub mod project;
pub mod settings;

pub use error::PaintError;
pub use project::{CommittedOp, PainterEvent, Project};
pub use settings::PainterSettings;
