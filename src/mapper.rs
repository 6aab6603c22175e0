//! Map cTAKES `.xmi` files to HPO terms and write the results
//!
//! Every input file `<name>.txt.xmi` is converted into an output file
//! `<name>.HPO.txt` with one HPO term per line:
//!
//! ```text
//! HP:0001250	Seizure
//! HP:0002315	Headache
//! ```
use std::collections::btree_set::Iter;
use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{xmi, HpoError, HpoResult, HpoTermId, LookupTable};

const XMI_SUFFIX: &str = ".xmi";
const TXT_SUFFIX: &str = ".txt";
const OUTPUT_SUFFIX: &str = ".HPO.txt";

/// An HPO term that was resolved from a UMLS concept
///
/// Terms are ordered by their id first, then by their name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappedTerm {
    id: HpoTermId,
    name: String,
}

impl MappedTerm {
    /// Constructs a new [`MappedTerm`]
    pub fn new(id: HpoTermId, name: String) -> Self {
        Self { id, name }
    }

    /// The [`HpoTermId`] of the term
    pub fn id(&self) -> HpoTermId {
        self.id
    }

    /// The name of the term
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The unique, sorted HPO terms of a single annotation file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MappedTerms {
    terms: BTreeSet<MappedTerm>,
}

impl MappedTerms {
    /// Adds the term, returns `false` if it was already present
    pub fn insert(&mut self, term: MappedTerm) -> bool {
        self.terms.insert(term)
    }

    /// Returns the number of unique terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if no terms were mapped
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns an iterator of the terms in sorted order
    pub fn iter(&self) -> Iter<'_, MappedTerm> {
        self.terms.iter()
    }

    /// Writes one `id<TAB>name` line per term
    ///
    /// All whitespace inside the name is collapsed into single spaces,
    /// so every line has exactly two columns.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if writing fails
    ///
    /// # Examples
    ///
    /// ```
    /// use xmi2hpo::{MappedTerm, MappedTerms};
    ///
    /// let mut terms = MappedTerms::default();
    /// terms.insert(MappedTerm::new(1u32.into(), "Abnormal\tfinding ".to_string()));
    ///
    /// let mut out = Vec::new();
    /// terms.write_to(&mut out).unwrap();
    /// assert_eq!(out, b"HP:0000001\tAbnormal finding\n");
    /// ```
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for term in &self.terms {
            writeln!(writer, "{}\t{}", term.id, normalize_whitespace(&term.name))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a MappedTerms {
    type Item = &'a MappedTerm;
    type IntoIter = Iter<'a, MappedTerm>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Counts of a mapping run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Number of processed annotation files
    pub files: usize,
    /// Number of non-disambiguated UMLS concepts in all files
    pub concepts: usize,
    /// Number of written HPO terms in all files
    pub mapped_terms: usize,
    /// Number of files whose result overwrote the result of an earlier
    /// file with the same output filename, e.g. `a.xmi` and `a.txt.xmi`
    pub overwritten: usize,
}

/// Maps annotation files to HPO terms using a [`LookupTable`]
#[derive(Debug)]
pub struct Mapper<'a> {
    table: &'a LookupTable,
}

impl<'a> Mapper<'a> {
    /// Constructs a new [`Mapper`]
    pub fn new(table: &'a LookupTable) -> Self {
        Self { table }
    }

    /// Maps all `.xmi` files of `input_dir` and writes one result file
    /// per input file into `output_dir`
    ///
    /// The output directory is created if it does not exist yet.
    /// Files are processed in alphabetical order, the first failing
    /// file stops the run.
    ///
    /// # Errors
    ///
    /// - Directories cannot be read or created: [`HpoError::CannotOpenFile`]
    /// - see [`Mapper::map_file`]
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> HpoResult<Summary> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)
            .map_err(|_| HpoError::CannotOpenFile(output_dir.display().to_string()))?;

        let mut summary = Summary::default();
        let mut written = HashSet::new();
        for input in xmi_files(input_dir.as_ref())? {
            let output = output_filename(&input)?;
            if !written.insert(output.clone()) {
                warn!(
                    "{} overwrites the results of a previous file in {}",
                    input.display(),
                    output_dir.join(&output).display()
                );
                summary.overwritten += 1;
            }
            let (concepts, mapped_terms) = self.map_file(&input, output_dir)?;
            summary.files += 1;
            summary.concepts += concepts;
            summary.mapped_terms += mapped_terms;
        }

        info!(
            "Mapped {} UMLS concepts from {} files to {} HPO terms",
            summary.concepts, summary.files, summary.mapped_terms
        );
        Ok(summary)
    }

    /// Maps a single `.xmi` file and writes the result into `output_dir`
    ///
    /// Returns the number of concepts in the file and the number of
    /// written HPO terms
    ///
    /// # Errors
    ///
    /// - File cannot be read or written: [`HpoError::CannotOpenFile`]
    /// - Malformed xmi data: [`HpoError::InvalidInput`]
    pub fn map_file(&self, input: &Path, output_dir: &Path) -> HpoResult<(usize, usize)> {
        let concepts = xmi::read_concepts(input)?;
        let mapped = self.table.map(&concepts);

        let output = output_dir.join(output_filename(input)?);
        let file = File::create(&output)
            .map_err(|_| HpoError::CannotOpenFile(output.display().to_string()))?;
        let mut writer = BufWriter::new(file);
        mapped
            .write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|_| HpoError::CannotOpenFile(output.display().to_string()))?;

        debug!(
            "Mapped {} to {} HPO terms in {}",
            input.display(),
            mapped.len(),
            output.display()
        );
        Ok((concepts.len(), mapped.len()))
    }
}

/// Derives the output filename from an input path
///
/// Removes the `.xmi` and an optional `.txt` suffix and appends `.HPO.txt`
///
/// # Errors
///
/// [`HpoError::InvalidInput`] if the path has no valid UTF-8 filename
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use xmi2hpo::mapper::output_filename;
///
/// assert_eq!(output_filename(Path::new("in/patient1.txt.xmi")).unwrap(), "patient1.HPO.txt");
/// assert_eq!(output_filename(Path::new("patient2.xmi")).unwrap(), "patient2.HPO.txt");
/// ```
pub fn output_filename(input: &Path) -> HpoResult<String> {
    let Some(name) = input.file_name().and_then(|name| name.to_str()) else {
        return Err(HpoError::InvalidInput(format!(
            "invalid filename {}",
            input.display()
        )));
    };
    let name = name.strip_suffix(XMI_SUFFIX).unwrap_or(name);
    let name = name.strip_suffix(TXT_SUFFIX).unwrap_or(name);
    Ok(format!("{name}{OUTPUT_SUFFIX}"))
}

/// Returns all regular `.xmi` files of the directory, sorted by path
fn xmi_files(input_dir: &Path) -> HpoResult<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .map_err(|_| HpoError::CannotOpenFile(input_dir.display().to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|_| HpoError::CannotOpenFile(input_dir.display().to_string()))?
            .path();
        let is_xmi = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(XMI_SUFFIX));
        if is_xmi && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Cui, LookupRow};

    const XMI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:refsem="http:///org/apache/ctakes/typesystem/type/refsem.ecore" xmlns:xmi="http://www.omg.org/XMI" xmi:version="2.0">
    <refsem:UmlsConcept xmi:id="10" disambiguated="false" cui="C000"/>
</xmi:XMI>"#;

    fn table() -> LookupTable {
        let mut table = LookupTable::default();
        for (id, name, cuis) in [
            (1u32, "Abnormal finding", vec!["UMLS:C000"]),
            (1250u32, "Seizure", vec!["UMLS:C0036572", "UMLS:C0014544"]),
            (2315u32, "Headache", vec!["UMLS:C0018681"]),
            (12531u32, "Pain", vec!["UMLS:C0030193"]),
        ] {
            let cuis = cuis
                .into_iter()
                .map(|cui| Cui::try_from(cui).unwrap())
                .collect();
            table
                .push(LookupRow::new(id.into(), name.to_string(), cuis))
                .unwrap();
        }
        table
    }

    fn concept(cui: &str, disambiguated: bool) -> String {
        format!(r#"    <refsem:UmlsConcept disambiguated="{disambiguated}" cui="{cui}"/>"#)
    }

    fn xmi(concepts: &[String]) -> String {
        format!(
            "<xmi:XMI xmlns:refsem=\"http:///org/apache/ctakes/typesystem/type/refsem.ecore\">\n{}\n</xmi:XMI>",
            concepts.join("\n")
        )
    }

    #[test]
    fn single_match() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("patient1.txt.xmi"), XMI).unwrap();

        let summary = Mapper::new(&table)
            .run(input.path(), output.path())
            .unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.mapped_terms, 1);

        let result = fs::read_to_string(output.path().join("patient1.HPO.txt")).unwrap();
        assert_eq!(result, "HP:0000001\tAbnormal finding\n");
    }

    #[test]
    fn skip_disambiguated_and_unknown() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let content = xmi(&[
            concept("C0018681", true),
            concept("C0030193", false),
            concept("C7777777", false),
        ]);
        fs::write(input.path().join("a.xmi"), content).unwrap();

        let summary = Mapper::new(&table)
            .run(input.path(), output.path())
            .unwrap();
        assert_eq!(summary.concepts, 2);
        assert_eq!(summary.mapped_terms, 1);

        let result = fs::read_to_string(output.path().join("a.HPO.txt")).unwrap();
        assert_eq!(result, "HP:0012531\tPain\n");
    }

    #[test]
    fn duplicates_collapse_and_sort() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let content = xmi(&[
            concept("C0030193", false),
            concept("C0036572", false),
            concept("C0014544", false),
            concept("C0036572", false),
            concept("C0018681", false),
        ]);
        fs::write(input.path().join("b.txt.xmi"), content).unwrap();

        Mapper::new(&table)
            .run(input.path(), output.path())
            .unwrap();

        let result = fs::read_to_string(output.path().join("b.HPO.txt")).unwrap();
        assert_eq!(
            result,
            "HP:0001250\tSeizure\nHP:0002315\tHeadache\nHP:0012531\tPain\n"
        );
    }

    #[test]
    fn no_matches_create_empty_file() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("c.xmi"), xmi(&[concept("C1", false)])).unwrap();

        Mapper::new(&table)
            .run(input.path(), output.path())
            .unwrap();
        let result = fs::read_to_string(output.path().join("c.HPO.txt")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn output_directory_is_created() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let nested = output.path().join("results").join("hpo");
        fs::write(input.path().join("patient1.txt.xmi"), XMI).unwrap();

        Mapper::new(&table).run(input.path(), &nested).unwrap();
        assert!(nested.join("patient1.HPO.txt").is_file());

        // running again reuses the existing directory
        let summary = Mapper::new(&table).run(input.path(), &nested).unwrap();
        assert_eq!(summary.files, 1);
    }

    #[test]
    fn ignore_other_files() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("patient1.txt.xmi"), XMI).unwrap();
        fs::write(input.path().join("patient1.txt"), "Patient had a seizure").unwrap();
        fs::write(input.path().join("notes.xml"), XMI).unwrap();
        fs::create_dir(input.path().join("nested.xmi")).unwrap();

        let summary = Mapper::new(&table)
            .run(input.path(), output.path())
            .unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 1);
    }

    #[test]
    fn colliding_output_names() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("a.txt.xmi"), xmi(&[concept("C0030193", false)])).unwrap();
        fs::write(input.path().join("a.xmi"), xmi(&[concept("C0018681", false)])).unwrap();

        let summary = Mapper::new(&table)
            .run(input.path(), output.path())
            .unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.overwritten, 1);
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 1);

        // `a.xmi` sorts last and wins
        let result = fs::read_to_string(output.path().join("a.HPO.txt")).unwrap();
        assert_eq!(result, "HP:0002315\tHeadache\n");
    }

    #[test]
    fn failing_file_stops_run() {
        let table = table();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("a.xmi"), "<xmi:XMI><a></b></xmi:XMI>").unwrap();

        assert!(Mapper::new(&table)
            .run(input.path(), output.path())
            .is_err());
    }

    #[test]
    fn missing_input_directory() {
        let table = table();
        let output = tempfile::tempdir().unwrap();
        assert!(matches!(
            Mapper::new(&table).run("does/not/exist", output.path()),
            Err(HpoError::CannotOpenFile(_))
        ));
    }

    #[test]
    fn filenames() {
        let name = |s: &str| output_filename(Path::new(s)).unwrap();
        assert_eq!(name("patient1.txt.xmi"), "patient1.HPO.txt");
        assert_eq!(name("dir/patient.xmi"), "patient.HPO.txt");
        assert_eq!(name("text.xmi"), "text.HPO.txt");
        assert_eq!(name("notes.txt"), "notes.HPO.txt");
    }

    #[test]
    fn whitespace_in_names() {
        let mut terms = MappedTerms::default();
        terms.insert(MappedTerm::new(2u32.into(), "  Abnormality \n of\tbody  height".to_string()));
        let mut out = Vec::new();
        terms.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "HP:0000002\tAbnormality of body height\n"
        );
    }
}
