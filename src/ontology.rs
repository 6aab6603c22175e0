use core::fmt::Debug;
use std::collections::hash_map::Values;
use std::ops::BitOr;
use std::path::Path;

use tracing::debug;

use crate::parser;
use crate::term::internal::HpoTermInternal;
use crate::term::{HpoGroup, HpoTerm};
use crate::{HpoError, HpoResult, HpoTermId};

mod termarena;
use termarena::Arena;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Ontology` holds all [`HpoTerm`]s of the HPO and their relationships
///
/// The ontology is only an intermediate step when building the
/// [`LookupTable`](crate::LookupTable): the terms of a single category
/// (usually `HP:0000118 | Phenotypic abnormality`) are selected and
/// flattened into rows of `(id, name, UMLS xrefs)`.
///
/// # Examples
///
/// ```
/// use xmi2hpo::{Ontology, HpoTermId};
///
/// let obo = "\
/// [Term]
/// id: HP:0000001
/// name: All
///
/// [Term]
/// id: HP:0000118
/// name: Phenotypic abnormality
/// is_a: HP:0000001 ! All
/// ";
///
/// let ontology = Ontology::from_obo_str(obo).unwrap();
/// assert_eq!(ontology.len(), 2);
///
/// let term = ontology.hpo(118u32).unwrap();
/// assert_eq!(term.name(), "Phenotypic abnormality");
///
/// let absent_term = HpoTermId::try_from("HP:9999999").unwrap();
/// assert!(ontology.hpo(absent_term).is_none());
/// ```
///
/// # Layout
///
/// ```mermaid
/// erDiagram
///     ONTOLOGY ||--|{ HPOTERM : contains
///     HPOTERM ||--|{ HPOTERM : is_a
///     HPOTERM ||--o{ CUI : xref
///     HPOTERM {
///         HpoTermId id
///         str name
///         HpoGroup parents
///         HpoGroup all_parents
///         bool obsolete
///     }
///     CUI {
///         str inner
///     }
/// ```
#[derive(Default)]
pub struct Ontology {
    hpo_terms: Arena,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ontology with {} terms", self.hpo_terms.len())
    }
}

/// Public API of the Ontology
impl Ontology {
    /// Initialize the [`Ontology`] from an `hp.obo` file
    ///
    /// # Errors
    ///
    /// - obo file not present or readable: [`HpoError::CannotOpenFile`]
    /// - malformed term data or `is_a` to a missing term: [`HpoError::InvalidInput`]
    pub fn from_obo<P: AsRef<Path>>(filename: P) -> HpoResult<Self> {
        let mut ont = Ontology::default();
        parser::hp_obo::read_obo_file(filename, &mut ont)?;
        Ok(ont)
    }

    /// Initialize the [`Ontology`] from the content of an `hp.obo` file
    ///
    /// # Errors
    ///
    /// malformed term data or `is_a` to a missing term: [`HpoError::InvalidInput`]
    pub fn from_obo_str(content: &str) -> HpoResult<Self> {
        let mut ont = Ontology::default();
        parser::hp_obo::read_obo_str(content, &mut ont)?;
        Ok(ont)
    }

    /// Returns the number of terms in the Ontology
    pub fn len(&self) -> usize {
        self.hpo_terms.len()
    }

    /// Returns `true` if the Ontology does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.hpo_terms.is_empty()
    }

    /// Returns the [`HpoTerm`] of the provided [`HpoTermId`]
    ///
    /// If no such term is present in the Ontology, `None` is returned
    pub fn hpo<I: Into<HpoTermId>>(&self, term_id: I) -> Option<HpoTerm<'_>> {
        HpoTerm::try_new(self, term_id.into()).ok()
    }

    /// Returns an Iterator of all [`HpoTerm`]s in arbitrary order
    pub fn hpos(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Returns all terms of a category, sorted by [`HpoTermId`]
    ///
    /// The category consists of the `root` term itself and, if
    /// `include_descendants` is set, all of its direct and indirect
    /// children. Obsolete terms are never part of a category.
    ///
    /// # Errors
    ///
    /// [`HpoError::DoesNotExist`] if `root` is not part of the Ontology
    ///
    /// # Examples
    ///
    /// ```
    /// use xmi2hpo::Ontology;
    ///
    /// let obo = "\
    /// [Term]
    /// id: HP:0000001
    /// name: All
    ///
    /// [Term]
    /// id: HP:0000118
    /// name: Phenotypic abnormality
    /// is_a: HP:0000001 ! All
    ///
    /// [Term]
    /// id: HP:0001250
    /// name: Seizure
    /// is_a: HP:0000118 ! Phenotypic abnormality
    /// ";
    /// let ontology = Ontology::from_obo_str(obo).unwrap();
    ///
    /// let terms = ontology.category(118u32, true).unwrap();
    /// assert_eq!(terms.len(), 2);
    ///
    /// let terms = ontology.category(118u32, false).unwrap();
    /// assert_eq!(terms.len(), 1);
    /// ```
    pub fn category<I: Into<HpoTermId>>(
        &self,
        root: I,
        include_descendants: bool,
    ) -> HpoResult<Vec<HpoTerm<'_>>> {
        let root = self.hpo(root).ok_or(HpoError::DoesNotExist)?;

        let mut terms: Vec<HpoTerm> = if include_descendants {
            self.hpos()
                .filter(|term| term == &root || term.child_of(&root))
                .filter(|term| !term.is_obsolete())
                .collect()
        } else if root.is_obsolete() {
            Vec::new()
        } else {
            vec![root]
        };
        terms.sort_by_key(HpoTerm::id);
        debug!("Category {} contains {} terms", root.id(), terms.len());
        Ok(terms)
    }

    /// Adds an [`HpoTerm`] with the given name and id
    ///
    /// An existing term with the same id is replaced
    pub fn insert_term<I: Into<HpoTermId>>(&mut self, name: String, id: I) {
        let term = HpoTermInternal::new(name, id.into());
        self.hpo_terms.insert(term);
    }

    /// Add a connection from an [`HpoTerm`] to its parent
    ///
    /// This method is called once for every `is_a` relationship
    /// during the initialization.
    ///
    /// # Errors
    ///
    /// [`HpoError::DoesNotExist`] if either term is not present in the Ontology
    ///
    /// # Examples
    ///
    /// ```
    /// use xmi2hpo::{HpoTermId, Ontology};
    ///
    /// let mut ontology = Ontology::default();
    /// ontology.insert_term("Foo".into(), 1u32);
    /// ontology.insert_term("Bar".into(), 2u32);
    ///
    /// ontology.add_parent(1u32, 2u32).unwrap();
    ///
    /// assert!(ontology.hpo(2u32).unwrap().parent_ids().any(|id| id == HpoTermId::from(1u32)));
    /// assert!(ontology.add_parent(3u32, 2u32).is_err());
    /// ```
    pub fn add_parent<I: Into<HpoTermId>, J: Into<HpoTermId>>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) -> HpoResult<()> {
        let parent_id = parent_id.into();
        let child_id = child_id.into();
        if !self.hpo_terms.contains(parent_id) || !self.hpo_terms.contains(child_id) {
            return Err(HpoError::DoesNotExist);
        }

        if let Some(child) = self.get_mut(child_id) {
            child.add_parent(parent_id);
        }
        Ok(())
    }

    /// Creates and caches the `all_parents` values for every term
    ///
    /// This method must be called once after all terms and parent
    /// connections are added. Rerunning it will not cause a new calculation.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmi2hpo::Ontology;
    ///
    /// let mut ontology = Ontology::default();
    /// ontology.insert_term("Root".into(), 1u32);
    /// ontology.insert_term("Foo".into(), 2u32);
    /// ontology.insert_term("Bar".into(), 3u32);
    ///
    /// ontology.add_parent(1u32, 2u32).unwrap();
    /// ontology.add_parent(2u32, 3u32).unwrap();
    ///
    /// // At this point #3 does not have info about grandparents
    /// assert_eq!(ontology.hpo(3u32).unwrap().all_parent_ids().count(), 0);
    ///
    /// ontology.create_cache();
    /// assert_eq!(ontology.hpo(3u32).unwrap().all_parent_ids().count(), 2);
    /// ```
    pub fn create_cache(&mut self) {
        for id in self.hpo_terms.keys() {
            self.all_grandparents(id);
        }
    }
}

/// Crate-only functions for building the Ontology
impl Ontology {
    /// Adds the term and returns its ID
    pub(crate) fn add_term(&mut self, term: HpoTermInternal) -> HpoTermId {
        self.hpo_terms.insert(term)
    }

    pub(crate) fn get(&self, term_id: HpoTermId) -> Option<&HpoTermInternal> {
        self.hpo_terms.get(term_id)
    }

    fn get_mut(&mut self, term_id: HpoTermId) -> Option<&mut HpoTermInternal> {
        self.hpo_terms.get_mut(term_id)
    }

    /// Returns all direct and indirect parents of the term and caches them
    ///
    /// The recursion bubbles up to the top of the ontology and caches
    /// the list of direct and indirect parents for every term on the way
    /// back down. It stops early at every term that is already cached.
    fn all_grandparents(&mut self, term_id: HpoTermId) -> HpoGroup {
        let parents = match self.get_mut(term_id) {
            None => return HpoGroup::default(),
            Some(term) if term.parents_cached() => return term.all_parents().clone(),
            Some(term) => {
                // marks the term as visited, in case of cyclic `is_a` chains
                term.set_all_parents(HpoGroup::default());
                term.parents().clone()
            }
        };

        let mut res = parents.clone();
        for parent in &parents {
            let grandparents = self.all_grandparents(parent);
            res = res.bitor(&grandparents);
        }

        if let Some(term) = self.get_mut(term_id) {
            term.set_all_parents(res.clone());
        }
        res
    }
}

/// An iterator of [`HpoTerm`]s
pub struct Iter<'a> {
    inner: Values<'a, HpoTermId, HpoTermInternal>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = HpoTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(HpoTerm::new)
    }
}

impl<'a> IntoIterator for &'a Ontology {
    type Item = HpoTerm<'a>;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.hpo_terms.values(),
        }
    }
}
