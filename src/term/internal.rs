use smallvec::SmallVec;

use crate::term::{Cui, HpoGroup, HpoTermId};
use crate::HpoResult;
use crate::DEFAULT_NUM_XREFS;

pub(crate) type Xrefs = SmallVec<[Cui; DEFAULT_NUM_XREFS]>;

#[derive(Debug)]
pub(crate) struct HpoTermInternal {
    id: HpoTermId,
    name: String,
    parents: HpoGroup,
    all_parents: HpoGroup,
    xrefs: Xrefs,
    obsolete: bool,
    parents_cached: bool,
}

impl HpoTermInternal {
    pub fn new(name: String, id: HpoTermId) -> HpoTermInternal {
        HpoTermInternal {
            id,
            name,
            parents: HpoGroup::default(),
            all_parents: HpoGroup::default(),
            xrefs: Xrefs::new(),
            obsolete: false,
            parents_cached: false,
        }
    }

    pub fn try_new(id: &str, name: &str) -> HpoResult<HpoTermInternal> {
        let id = HpoTermId::try_from(id)?;
        Ok(HpoTermInternal::new(name.to_string(), id))
    }

    pub fn id(&self) -> &HpoTermId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &HpoGroup {
        &self.parents
    }

    pub fn all_parents(&self) -> &HpoGroup {
        &self.all_parents
    }

    pub fn xrefs(&self) -> &[Cui] {
        &self.xrefs
    }

    pub fn obsolete(&self) -> bool {
        self.obsolete
    }

    pub fn parents_cached(&self) -> bool {
        self.parents_cached
    }

    pub fn add_parent<I: Into<HpoTermId>>(&mut self, parent_id: I) {
        self.parents.insert(parent_id);
    }

    /// Adds a UMLS cross reference, ignoring duplicates
    pub fn add_xref(&mut self, cui: Cui) {
        if !self.xrefs.contains(&cui) {
            self.xrefs.push(cui);
        }
    }

    pub fn obsolete_mut(&mut self) -> &mut bool {
        &mut self.obsolete
    }

    pub fn set_all_parents(&mut self, all_parents: HpoGroup) {
        self.all_parents = all_parents;
        self.parents_cached = true;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicate_xrefs() {
        let mut term = HpoTermInternal::try_new("HP:0000001", "All").unwrap();
        term.add_xref(Cui::try_from("UMLS:C0000001").unwrap());
        term.add_xref(Cui::try_from("C0000001").unwrap());
        term.add_xref(Cui::try_from("C0000002").unwrap());
        assert_eq!(term.xrefs().len(), 2);
    }

    #[test]
    fn invalid_id() {
        assert!(HpoTermInternal::try_new("HP0000001", "All").is_err());
    }
}
