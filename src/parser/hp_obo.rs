use std::path::Path;

use tracing::{debug, trace, warn};

use crate::term::internal::HpoTermInternal;
use crate::term::{Cui, UMLS_PREFIX};
use crate::{read_text_file, HpoError, HpoResult, HpoTermId, Ontology};

/// Tuples of Term - Parent
type Connections = Vec<(HpoTermId, HpoTermId)>;

/// A single `[Header]` block of the obo file and its `tag: value` lines
///
/// Lines before the first header belong to a stanza with an empty header.
struct Stanza<'a> {
    header: &'a str,
    lines: Vec<&'a str>,
}

pub(crate) fn read_obo_file<P: AsRef<Path>>(filename: P, ontology: &mut Ontology) -> HpoResult<()> {
    let filename = filename.as_ref();
    let file_content = read_text_file(filename)?;
    read_obo_str(&file_content, ontology)
}

pub(crate) fn read_obo_str(content: &str, ontology: &mut Ontology) -> HpoResult<()> {
    let mut connections: Connections = Vec::new();

    for stanza in stanzas(content) {
        if stanza.header != "[Term]" {
            trace!("Ignoring stanza: {}", stanza.header);
            continue;
        }
        if let Some(raw_term) = term_from_obo(&stanza.lines)? {
            let id = ontology.add_term(raw_term);
            add_connections(&mut connections, &stanza.lines, id)?;
        } else {
            warn!("Unable to parse term: {:?}", stanza.lines);
        }
    }

    for (child, parent) in connections {
        ontology.add_parent(parent, child).map_err(|_| {
            HpoError::InvalidInput(format!("{child} is_a non-existing term {parent}"))
        })?;
    }

    ontology.create_cache();
    debug!("Parsed {} terms from obo data", ontology.len());
    Ok(())
}

fn stanzas(content: &str) -> Vec<Stanza<'_>> {
    let mut stanzas = vec![Stanza {
        header: "",
        lines: Vec::new(),
    }];
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            stanzas.push(Stanza {
                header: line,
                lines: Vec::new(),
            });
        } else if let Some(stanza) = stanzas.last_mut() {
            stanza.lines.push(line);
        }
    }
    stanzas
}

/// Builds the term from its `id`, `name`, `xref` and `is_obsolete` lines
///
/// Returns `None` if the `id` or `name` is missing
fn term_from_obo(lines: &[&str]) -> HpoResult<Option<HpoTermInternal>> {
    let mut id: Option<&str> = None;
    let mut name: Option<&str> = None;
    let mut xrefs: Vec<Cui> = Vec::new();
    let mut obsolete = false;

    for line in lines {
        match parse_line(line) {
            Some(("id", value)) => id = Some(value),
            Some(("name", value)) => name = Some(value),
            Some(("is_obsolete", value)) => obsolete = value == "true",
            Some(("xref", value)) => {
                if let Some(cui) = umls_xref(value)? {
                    xrefs.push(cui);
                }
            }
            _ => (),
        }
    }

    let (Some(id), Some(name)) = (id, name) else {
        return Ok(None);
    };
    let mut term = HpoTermInternal::try_new(id, name)?;
    *term.obsolete_mut() = obsolete;
    for cui in xrefs {
        term.add_xref(cui);
    }
    Ok(Some(term))
}

fn add_connections(connections: &mut Connections, lines: &[&str], id: HpoTermId) -> HpoResult<()> {
    for line in lines {
        if let Some(("is_a", value)) = parse_line(line) {
            connections.push((id, HpoTermId::try_from(first_token(value))?));
        }
    }
    Ok(())
}

/// Parses the `UMLS:C0000000` part of an xref value
///
/// Non-UMLS xrefs return `None`.
fn umls_xref(value: &str) -> HpoResult<Option<Cui>> {
    let token = first_token(value);
    if token.starts_with(UMLS_PREFIX) {
        Cui::try_from(token).map(Some)
    } else {
        Ok(None)
    }
}

/// Returns the value up to the first whitespace, dropping
/// trailing `! comments`, `"descriptions"` and `{qualifiers}`
fn first_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or_default()
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(':')
        .map(|(tag, value)| (tag.trim(), value.trim()))
}

#[cfg(test)]
mod test {
    use super::*;

    const SMALL_OBO: &str = "format-version: 1.2
data-version: hp/releases/2023-04-05
ontology: hp

[Term]
id: HP:0000001
name: All
xref: UMLS:C0444868

[Term]
id: HP:0000118
name: Phenotypic abnormality
def: \"A phenotypic abnormality.\" [HPO:probinson]
xref: UMLS:C4021819
is_a: HP:0000001 ! All

[Term]
id: HP:0001250
name: Seizure
xref: MSH:D012640
xref: SNOMEDCT_US:91175000
xref: UMLS:C0014544 {source=\"NCIT\"}
xref: UMLS:C0036572
is_a: HP:0000118 ! Phenotypic abnormality

[Term]
id: HP:0000005
name: Mode of inheritance
is_a: HP:0000001 ! All

[Term]
id: HP:0000489
name: obsolete Abnormality of globe location or size
is_obsolete: true
replaced_by: HP:0000001

[Typedef]
id: part_of
name: part of
";

    #[test]
    fn split_terms() {
        let mut ont = Ontology::default();
        read_obo_str(SMALL_OBO, &mut ont).unwrap();

        assert_eq!(ont.len(), 5);
        assert!(ont.hpo(2u32).is_none());

        let seizure = ont.hpo(1250u32).unwrap();
        assert_eq!(seizure.name(), "Seizure");
        assert_eq!(seizure.parent_ids().count(), 1);
        assert_eq!(seizure.all_parent_ids().count(), 2);

        assert!(ont.hpo(489u32).unwrap().is_obsolete());
        assert!(!ont.hpo(118u32).unwrap().is_obsolete());
    }

    #[test]
    fn umls_xrefs_only() {
        let mut ont = Ontology::default();
        read_obo_str(SMALL_OBO, &mut ont).unwrap();

        let xrefs: Vec<&str> = ont
            .hpo(1250u32)
            .unwrap()
            .xrefs()
            .iter()
            .map(Cui::as_str)
            .collect();
        assert_eq!(xrefs, vec!["C0014544", "C0036572"]);
        assert!(ont.hpo(5u32).unwrap().xrefs().is_empty());
    }

    #[test]
    fn windows_line_endings() {
        let obo = SMALL_OBO.replace('\n', "\r\n");
        let mut ont = Ontology::default();
        read_obo_str(&obo, &mut ont).unwrap();
        assert_eq!(ont.len(), 5);
        assert_eq!(ont.hpo(118u32).unwrap().name(), "Phenotypic abnormality");
    }

    #[test]
    fn skip_terms_without_name() {
        let obo = "[Term]\nid: HP:0000001\n\n[Term]\nid: HP:0000002\nname: Foo\n";
        let mut ont = Ontology::default();
        read_obo_str(obo, &mut ont).unwrap();
        assert_eq!(ont.len(), 1);
    }

    #[test]
    fn invalid_term_id() {
        let obo = "[Term]\nid: HP:000000X\nname: Foo\n";
        let mut ont = Ontology::default();
        assert!(read_obo_str(obo, &mut ont).is_err());
    }

    #[test]
    fn missing_parent() {
        let obo = "[Term]\nid: HP:0000002\nname: Foo\nis_a: HP:0000001 ! All\n";
        let mut ont = Ontology::default();
        assert!(matches!(
            read_obo_str(obo, &mut ont),
            Err(HpoError::InvalidInput(_))
        ));
    }

    #[test]
    fn missing_file() {
        let mut ont = Ontology::default();
        assert!(matches!(
            read_obo_file("does/not/exist.obo", &mut ont),
            Err(HpoError::CannotOpenFile(_))
        ));
    }

    #[test]
    fn file_not_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hp.obo");
        std::fs::write(&path, b"[Term]\nid: HP:0000001\nname: Caf\xE9\n").unwrap();

        let mut ont = Ontology::default();
        assert!(matches!(
            read_obo_file(&path, &mut ont),
            Err(HpoError::InvalidInput(_))
        ));
    }

    #[test]
    fn first_token_strips_comments() {
        assert_eq!(first_token("HP:0000001 ! All"), "HP:0000001");
        assert_eq!(first_token("UMLS:C0000001 \"desc\""), "UMLS:C0000001");
        assert_eq!(first_token(""), "");
    }
}
