#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod aspect_ratio;
mod carousel;
mod post;
mod principal;

pub use aspect_ratio::*;
pub use carousel::*;
pub use post::*;
pub use principal::*;
