//! Settings of a mapping run
use std::path::PathBuf;

use tracing::info;

use crate::fetch::OboSource;
use crate::{HpoResult, HpoTermId, LookupTable, Mapper, Summary};
use crate::{OBO_URL, PHENOTYPIC_ABNORMALITY, TABLE_FILENAME};

/// All settings required to map a folder of `.xmi` files
///
/// # Examples
///
/// ```no_run
/// use xmi2hpo::Config;
///
/// let config = Config::new("ctakes_output", "hpo_terms");
/// let summary = config.run().unwrap();
/// println!("Mapped {} files", summary.files);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Folder containing the `.xmi` files
    pub input_path: PathBuf,
    /// Folder for the `.HPO.txt` result files, created if missing
    pub output_path: PathBuf,
    /// Location of the `hp.obo` file. Default: [`OBO_URL`]
    pub obo: OboSource,
    /// Location of the lookup table file. Default: [`TABLE_FILENAME`]
    pub table: PathBuf,
    /// Load an existing lookup table instead of building a new one
    pub reuse_table: bool,
    /// Root term of the category. Default: `HP:0000118`
    pub root: HpoTermId,
    /// Include all descendants of the root term. Default: `true`
    pub include_descendants: bool,
}

impl Config {
    /// Constructs a new [`Config`] with default settings
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_path: P, output_path: Q) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            obo: OboSource::Url(OBO_URL.to_string()),
            table: PathBuf::from(TABLE_FILENAME),
            reuse_table: false,
            root: PHENOTYPIC_ABNORMALITY.into(),
            include_descendants: true,
        }
    }

    /// Returns the lookup table
    ///
    /// The table is loaded from [`Config::table`] if `reuse_table` is set
    /// and the file exists. Otherwise it is built from the obo data and
    /// saved to [`Config::table`].
    ///
    /// # Errors
    ///
    /// See [`LookupTable::from_tsv`], [`OboSource::ontology`],
    /// [`LookupTable::from_ontology`] and [`LookupTable::write_tsv`]
    pub fn lookup_table(&self) -> HpoResult<LookupTable> {
        if self.reuse_table && self.table.is_file() {
            return LookupTable::from_tsv(&self.table);
        }

        let ontology = self.obo.ontology()?;
        let table = LookupTable::from_ontology(&ontology, self.root, self.include_descendants)?;
        table.write_tsv(&self.table)?;
        info!("Saved lookup table to {}", self.table.display());
        Ok(table)
    }

    /// Builds the lookup table and maps all input files
    ///
    /// # Errors
    ///
    /// See [`Config::lookup_table`] and [`Mapper::run`]
    pub fn run(&self) -> HpoResult<Summary> {
        let table = self.lookup_table()?;
        Mapper::new(&table).run(&self.input_path, &self.output_path)
    }
}
