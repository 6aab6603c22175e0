use crate::term::internal::HpoTermInternal;
use crate::term::{Cui, HpoGroup, HpoTermId, HpoTermIds};
use crate::{HpoError, HpoResult, Ontology};

/// The `HpoTerm` represents a single term from the HP Ontology
///
/// The term is a cheap view into the [`Ontology`] and holds
/// references to its data and parent relationships.
#[derive(Debug, Clone, Copy)]
pub struct HpoTerm<'a> {
    id: &'a HpoTermId,
    name: &'a str,
    parents: &'a HpoGroup,
    all_parents: &'a HpoGroup,
    xrefs: &'a [Cui],
    obsolete: bool,
}

impl<'a> HpoTerm<'a> {
    /// Constructs a new [`HpoTerm`]
    ///
    /// # Errors
    ///
    /// If the given [`HpoTermId`] does not match an existing term
    /// it returns an Error
    pub fn try_new(ontology: &'a Ontology, term: HpoTermId) -> HpoResult<HpoTerm<'a>> {
        let term = ontology.get(term).ok_or(HpoError::DoesNotExist)?;
        Ok(HpoTerm::new(term))
    }

    pub(crate) fn new(term: &'a HpoTermInternal) -> HpoTerm<'a> {
        HpoTerm {
            id: term.id(),
            name: term.name(),
            parents: term.parents(),
            all_parents: term.all_parents(),
            xrefs: term.xrefs(),
            obsolete: term.obsolete(),
        }
    }

    /// Returns the [`HpoTermId`] of the term
    ///
    /// e.g.: `HP:0012345`
    pub fn id(&self) -> HpoTermId {
        *self.id
    }

    /// Returns the name of the term
    ///
    /// e.g.: `Abnormality of the nervous system`
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the UMLS cross references of the term
    pub fn xrefs(&self) -> &'a [Cui] {
        self.xrefs
    }

    /// Returns `true` if the term is flagged `is_obsolete`
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// Returns the [`HpoTermId`]s of the direct parents
    pub fn parent_ids(&self) -> HpoTermIds<'a> {
        self.parents.iter()
    }

    /// Returns the [`HpoTermId`]s of all direct and indirect parents
    ///
    /// This is only populated after [`Ontology::create_cache`]
    pub fn all_parent_ids(&self) -> HpoTermIds<'a> {
        self.all_parents.iter()
    }

    /// Returns `true` if `self` is a direct or indirect child of `other`
    pub fn child_of(&self, other: &HpoTerm) -> bool {
        self.all_parents.contains(other.id)
    }
}

impl PartialEq for HpoTerm<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HpoTerm<'_> {}
