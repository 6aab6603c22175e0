//! Extract UMLS concepts from cTAKES `.xmi` files
//!
//! cTAKES writes every recognized concept as an element like
//!
//! ```text
//! <refsem:UmlsConcept xmi:id="7371" codingScheme="SNOMEDCT_US" code="91175000"
//!     score="0.0" disambiguated="false" cui="C0036572" tui="T184" preferredText="Seizures"/>
//! ```
//!
//! Only concepts with `disambiguated="false"` are used.
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::{read_text_file, Cui, HpoError, HpoResult};

const UMLS_CONCEPT: &[u8] = b"refsem:UmlsConcept";
const CUI_ATTRIBUTE: &str = "cui";
const DISAMBIGUATED_ATTRIBUTE: &str = "disambiguated";

/// Returns the [`Cui`]s of all non-disambiguated concepts of the file
///
/// The concepts are returned in document order and may contain duplicates
///
/// # Errors
///
/// - file not present or readable: [`HpoError::CannotOpenFile`]
/// - malformed XML: [`HpoError::InvalidInput`]
pub fn read_concepts<P: AsRef<Path>>(filename: P) -> HpoResult<Vec<Cui>> {
    let filename = filename.as_ref();
    let content = read_text_file(filename)?;
    let concepts = concepts_from_str(&content)?;
    debug!(
        "Found {} UMLS concepts in {}",
        concepts.len(),
        filename.display()
    );
    Ok(concepts)
}

/// Returns the [`Cui`]s of all non-disambiguated concepts of the xmi data
///
/// # Errors
///
/// [`HpoError::InvalidInput`] if the data is not well-formed XML
///
/// # Examples
///
/// ```
/// use xmi2hpo::xmi::concepts_from_str;
///
/// let xmi = r#"<xmi:XMI xmlns:refsem="http:///org/apache/ctakes/typesystem/type/refsem.ecore">
///     <refsem:UmlsConcept cui="C0036572" disambiguated="false"/>
///     <refsem:UmlsConcept cui="C0014544" disambiguated="true"/>
/// </xmi:XMI>"#;
///
/// let concepts = concepts_from_str(xmi).unwrap();
/// assert_eq!(concepts.len(), 1);
/// assert_eq!(concepts[0].as_str(), "C0036572");
/// ```
pub fn concepts_from_str(content: &str) -> HpoResult<Vec<Cui>> {
    let mut reader = Reader::from_str(content);
    let mut concepts = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element))
                if element.name().as_ref() == UMLS_CONCEPT =>
            {
                if let Some(cui) = concept_from_element(&element)? {
                    concepts.push(cui);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(HpoError::InvalidInput(format!(
                    "invalid xmi data at position {}: {err}",
                    reader.buffer_position()
                )))
            }
            _ => (),
        }
    }
    Ok(concepts)
}

/// Returns the [`Cui`] of the element, unless it is disambiguated
fn concept_from_element(element: &BytesStart) -> HpoResult<Option<Cui>> {
    if attribute(element, DISAMBIGUATED_ATTRIBUTE)?.as_deref() != Some("false") {
        return Ok(None);
    }

    match attribute(element, CUI_ATTRIBUTE)? {
        Some(value) => match Cui::try_from(value.as_str()) {
            Ok(cui) => Ok(Some(cui)),
            Err(_) => {
                warn!("Skipping UmlsConcept with invalid cui {value:?}");
                Ok(None)
            }
        },
        None => {
            warn!("Skipping UmlsConcept without cui");
            Ok(None)
        }
    }
}

fn attribute(element: &BytesStart, name: &str) -> HpoResult<Option<String>> {
    let attr = element
        .try_get_attribute(name)
        .map_err(|err| HpoError::InvalidInput(format!("invalid attribute: {err}")))?;
    attr.map(|attr| {
        attr.unescape_value()
            .map(|value| value.into_owned())
            .map_err(|err| HpoError::InvalidInput(format!("invalid attribute value: {err}")))
    })
    .transpose()
}
