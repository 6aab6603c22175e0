//! [`HpoTerm`]s are the main building block of the Ontology.
//!
//! Each term is identified by an [`HpoTermId`] and references other
//! vocabularies, most importantly UMLS, through [`Cui`] cross references.

mod cui;
mod group;
mod hpoterm;
mod hpotermid;
pub(crate) mod internal;

pub use cui::{Cui, UMLS_PREFIX};
pub use group::{HpoGroup, HpoTermIds};
pub use hpoterm::HpoTerm;
pub use hpotermid::HpoTermId;
