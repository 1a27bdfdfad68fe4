#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Media ingestion pipeline: compress selected images, stage them as an
//! editable draft carousel, upload them to the media cdn and persist the
//! resulting post record.

mod compress;
mod preview;
mod staging;
mod submission;
mod utils;

pub use compress::*;
pub use preview::*;
pub use staging::*;
pub use submission::*;
pub use utils::*;
