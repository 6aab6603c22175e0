//! The flattened HPO - UMLS lookup table
//!
//! The [`LookupTable`] contains one [`LookupRow`] per HPO term of a category
//! and an index to resolve a UMLS [`Cui`] to all terms referencing it.
//!
//! The table can be stored as a tab separated file:
//!
//! ```text
//! hpo_id      name                        umls_xrefs
//! HP:0000118  Phenotypic abnormality      UMLS:C4021819
//! HP:0001250  Seizure                     UMLS:C0014544|UMLS:C0036572
//! ```
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::mapper::{MappedTerm, MappedTerms};
use crate::term::{Cui, UMLS_PREFIX};
use crate::{HpoError, HpoResult, HpoTermId, Ontology};

const ID_COLUMNS: [&str; 3] = ["hpo_id", "id", "hpo"];
const NAME_COLUMNS: [&str; 3] = ["name", "label", "hpo_name"];
const XREF_COLUMNS: [&str; 4] = ["umls_xrefs", "xrefs", "xref", "umls"];

/// A single HPO term with its UMLS cross references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRow {
    id: HpoTermId,
    name: String,
    cuis: Vec<Cui>,
}

impl LookupRow {
    /// Constructs a new [`LookupRow`]
    pub fn new(id: HpoTermId, name: String, cuis: Vec<Cui>) -> Self {
        Self { id, name, cuis }
    }

    /// The [`HpoTermId`] of the term
    pub fn id(&self) -> HpoTermId {
        self.id
    }

    /// The name of the term
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All UMLS concepts referenced by the term
    pub fn cuis(&self) -> &[Cui] {
        &self.cuis
    }
}

/// In-memory lookup of HPO terms by their UMLS cross references
///
/// The table is built once per run, either from the [`Ontology`] or
/// from a previously written table file, and is immutable afterwards.
///
/// # Examples
///
/// ```
/// use xmi2hpo::{Cui, LookupRow, LookupTable};
///
/// let mut table = LookupTable::default();
/// table.push(LookupRow::new(
///     1u32.into(),
///     "Abnormal finding".to_string(),
///     vec![Cui::try_from("UMLS:C000").unwrap()],
/// )).unwrap();
///
/// let cui = Cui::try_from("C000").unwrap();
/// let mapped = table.map([&cui]);
/// assert_eq!(mapped.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LookupTable {
    rows: Vec<LookupRow>,
    by_id: HashMap<HpoTermId, usize>,
    by_cui: HashMap<Cui, Vec<usize>>,
}

impl LookupTable {
    /// Builds the table from all terms of the `root` category
    ///
    /// See [`Ontology::category`] for the selection of terms
    ///
    /// # Errors
    ///
    /// [`HpoError::DoesNotExist`] if `root` is not part of the Ontology
    pub fn from_ontology<I: Into<HpoTermId>>(
        ontology: &Ontology,
        root: I,
        include_descendants: bool,
    ) -> HpoResult<Self> {
        let mut table = LookupTable::default();
        for term in ontology.category(root, include_descendants)? {
            table.push(LookupRow::new(
                term.id(),
                term.name().to_string(),
                term.xrefs().to_vec(),
            ))?;
        }
        info!(
            "Created lookup table with {} terms and {} UMLS concepts",
            table.len(),
            table.by_cui.len()
        );
        Ok(table)
    }

    /// Loads the table from a tab separated file
    ///
    /// # Errors
    ///
    /// - file not present or readable: [`HpoError::CannotOpenFile`]
    /// - see [`LookupTable::from_reader`]
    pub fn from_tsv<P: AsRef<Path>>(filename: P) -> HpoResult<Self> {
        let filename = filename.as_ref();
        let file = File::open(filename)
            .map_err(|_| HpoError::CannotOpenFile(filename.display().to_string()))?;
        let table = Self::from_reader(file)?;
        info!(
            "Loaded lookup table with {} terms from {}",
            table.len(),
            filename.display()
        );
        Ok(table)
    }

    /// Loads the table from tab separated data
    ///
    /// The first line must be a header. The id, name and xref columns
    /// are identified by their header name. Xrefs are separated by
    /// `|` or `,` and can be given with or without the `UMLS:` prefix.
    /// Non-UMLS xrefs are ignored.
    ///
    /// # Errors
    ///
    /// [`HpoError::InvalidInput`] if a column is missing or a row is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use xmi2hpo::{Cui, LookupTable};
    ///
    /// let data = "hpo_id\tname\tumls_xrefs\nHP:0001250\tSeizure\tUMLS:C0014544|MSH:D012640\n";
    /// let table = LookupTable::from_reader(data.as_bytes()).unwrap();
    ///
    /// let cui = Cui::try_from("C0014544").unwrap();
    /// assert_eq!(table.rows_for(&cui).next().unwrap().name(), "Seizure");
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> HpoResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|err| HpoError::InvalidInput(format!("invalid table header: {err}")))?
            .clone();
        let id_col = find_column(&headers, &ID_COLUMNS)?;
        let name_col = find_column(&headers, &NAME_COLUMNS)?;
        let xref_col = find_column(&headers, &XREF_COLUMNS)?;

        let mut table = LookupTable::default();
        for record in reader.records() {
            let record =
                record.map_err(|err| HpoError::InvalidInput(format!("invalid table row: {err}")))?;

            let Some(id) = record.get(id_col) else {
                return Err(HpoError::InvalidInput(format!("missing id: {record:?}")));
            };
            let Some(name) = record.get(name_col) else {
                return Err(HpoError::InvalidInput(format!("missing name: {record:?}")));
            };
            let cuis = parse_xrefs(record.get(xref_col).unwrap_or_default())?;

            table.push(LookupRow::new(
                HpoTermId::try_from(id)?,
                name.to_string(),
                cuis,
            ))?;
        }
        Ok(table)
    }

    /// Writes the table as tab separated file
    ///
    /// # Errors
    ///
    /// [`HpoError::CannotOpenFile`] if the file cannot be created or written
    pub fn write_tsv<P: AsRef<Path>>(&self, filename: P) -> HpoResult<()> {
        let filename = filename.as_ref();
        let file = File::create(filename)
            .map_err(|_| HpoError::CannotOpenFile(filename.display().to_string()))?;
        self.write_to(file)
            .map_err(|_| HpoError::CannotOpenFile(filename.display().to_string()))?;
        debug!("Saved lookup table to {}", filename.display());
        Ok(())
    }

    /// Writes the table as tab separated data, rows sorted by [`HpoTermId`]
    ///
    /// # Errors
    ///
    /// Returns the underlying `csv` error if writing fails
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        writer.write_record(["hpo_id", "name", "umls_xrefs"])?;

        let mut rows: Vec<&LookupRow> = self.rows.iter().collect();
        rows.sort_by_key(|row| row.id);
        for row in rows {
            let xrefs = row
                .cuis
                .iter()
                .map(Cui::to_string)
                .collect::<Vec<String>>()
                .join("|");
            writer.write_record([row.id.to_string().as_str(), row.name(), xrefs.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Adds a row to the table
    ///
    /// # Errors
    ///
    /// [`HpoError::InvalidInput`] if the table already contains the term
    pub fn push(&mut self, row: LookupRow) -> HpoResult<()> {
        if self.by_id.contains_key(&row.id) {
            return Err(HpoError::InvalidInput(format!(
                "duplicate term {} in lookup table",
                row.id
            )));
        }
        let idx = self.rows.len();
        self.by_id.insert(row.id, idx);
        for cui in &row.cuis {
            let rows = self.by_cui.entry(cui.clone()).or_default();
            if !rows.contains(&idx) {
                rows.push(idx);
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns the number of terms in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row of the term, if present
    pub fn get<I: Into<HpoTermId>>(&self, id: I) -> Option<&LookupRow> {
        self.by_id.get(&id.into()).map(move |idx| &self.rows[*idx])
    }

    /// Returns an iterator of all rows in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, LookupRow> {
        self.rows.iter()
    }

    /// Returns all rows that reference the [`Cui`]
    pub fn rows_for<'a>(&'a self, cui: &Cui) -> impl Iterator<Item = &'a LookupRow> + 'a {
        self.by_cui
            .get(cui)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |idx| &self.rows[*idx])
    }

    /// Resolves the [`Cui`]s to their HPO terms
    ///
    /// Every term is only returned once, sorted by id and name.
    /// Concepts without a matching term are ignored.
    pub fn map<'c, I: IntoIterator<Item = &'c Cui>>(&self, cuis: I) -> MappedTerms {
        let mut mapped = MappedTerms::default();
        for cui in cuis {
            for row in self.rows_for(cui) {
                mapped.insert(MappedTerm::new(row.id, row.name.clone()));
            }
        }
        mapped
    }
}

impl<'a> IntoIterator for &'a LookupTable {
    type Item = &'a LookupRow;
    type IntoIter = std::slice::Iter<'a, LookupRow>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> HpoResult<usize> {
    headers
        .iter()
        .position(|header| {
            names
                .iter()
                .any(|name| header.trim().eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| {
            HpoError::InvalidInput(format!("lookup table requires a column {}", names[0]))
        })
}

/// Parses `|` or `,` separated UMLS xrefs, skipping other vocabularies
fn parse_xrefs(field: &str) -> HpoResult<Vec<Cui>> {
    let mut cuis = Vec::new();
    for token in field.split(['|', ',']).map(str::trim) {
        if token.is_empty() {
            continue;
        }
        if token.contains(':') && !token.starts_with(UMLS_PREFIX) {
            continue;
        }
        let cui = Cui::try_from(token)?;
        if cuis.contains(&cui) {
            warn!("Duplicate xref {cui} in lookup table");
        } else {
            cuis.push(cui);
        }
    }
    Ok(cuis)
}
