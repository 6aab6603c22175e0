#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
use std::num::ParseIntError;
use thiserror::Error;

pub mod config;
pub mod fetch;
pub mod lookup;
pub mod mapper;
mod ontology;
mod parser;
pub mod term;
pub mod xmi;

pub use config::Config;
pub use lookup::{LookupRow, LookupTable};
pub use mapper::{MappedTerm, MappedTerms, Mapper, Summary};
pub use ontology::Ontology;
pub use term::{Cui, HpoGroup, HpoTerm, HpoTermId};

const DEFAULT_NUM_PARENTS: usize = 10;
const DEFAULT_NUM_XREFS: usize = 4;

/// Default location of the HPO master data in obo format
pub const OBO_URL: &str = "http://purl.obolibrary.org/obo/hp.obo";
/// Default filename of the flattened lookup table
pub const TABLE_FILENAME: &str = "HPO.tsv";
/// `HP:0000118` | Phenotypic abnormality
pub const PHENOTYPIC_ABNORMALITY: u32 = 118;

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HpoError {
    /// Indicates that a term does not exist in the ontology
    #[error("term does not exist")]
    DoesNotExist,
    /// Parsing of an integer failed
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Failed to parse obo, table or xmi data
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// Failed to open, read or write a file
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Failed to download the ontology
    #[error("unable to download {0}")]
    Download(String),
}

impl From<ParseIntError> for HpoError {
    fn from(_: ParseIntError) -> Self {
        HpoError::ParseIntError
    }
}

/// Shortcut for `Result<T, HpoError>`
pub type HpoResult<T> = Result<T, HpoError>;

/// Reads a UTF-8 text file
///
/// Content that is not valid UTF-8 is [`HpoError::InvalidInput`],
/// all other IO failures are [`HpoError::CannotOpenFile`]
pub(crate) fn read_text_file(filename: &std::path::Path) -> HpoResult<String> {
    std::fs::read_to_string(filename).map_err(|err| match err.kind() {
        std::io::ErrorKind::InvalidData => {
            HpoError::InvalidInput(format!("{} is not valid UTF-8", filename.display()))
        }
        _ => HpoError::CannotOpenFile(filename.display().to_string()),
    })
}
