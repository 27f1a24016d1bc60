//! Identity resolution and the component data model
//!
//! This module contains:
//! - [`ComponentRecord`] and the first-writer-wins merge
//! - [`Catalog`], the one-record-per-identity mapping
//! - [`RecordStage`], the per-record pipeline state machine
//! - Display-name normalization

mod normalize;
mod record;
mod stage;

pub use normalize::display_name_from_package;
pub use record::{Catalog, ComponentRecord, RecordPatch};
pub use stage::RecordStage;
