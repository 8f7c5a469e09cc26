use crate::address::Address;

/// The (street, postcode) text the user searched with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub street_name: String,
    pub zip_code: String,
}

impl SearchKey {
    pub fn new(street_name: impl Into<String>, zip_code: impl Into<String>) -> Self {
        Self {
            street_name: street_name.into(),
            zip_code: zip_code.into(),
        }
    }
}

/// Which candidates count as the same one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupPolicy {
    /// same search input, whatever the result
    #[default]
    SearchKey,
    /// same resulting address id
    AddressId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Added,
    RejectedDuplicate,
}

#[derive(Debug, Clone)]
struct Candidate {
    address: Address,
    key: SearchKey,
}

/// Candidates produced by the searches of one session, in arrival order
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: Vec<Candidate>,
    policy: DedupPolicy,
}

impl CandidateSet {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    pub fn insert(&mut self, address: Address, key: SearchKey) -> InsertOutcome {
        let duplicate = self.entries.iter().any(|entry| match self.policy {
            DedupPolicy::SearchKey => entry.key == key,
            DedupPolicy::AddressId => entry.address.id == address.id,
        });
        if duplicate {
            return InsertOutcome::RejectedDuplicate;
        }
        self.entries.push(Candidate { address, key });
        InsertOutcome::Added
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// move the entries out, leaving this set empty with the same policy
    pub fn take(&mut self) -> CandidateSet {
        Self {
            entries: std::mem::take(&mut self.entries),
            policy: self.policy,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &Address> {
        self.entries.iter().map(|entry| &entry.address)
    }

    pub fn find(&self, id: &str) -> Option<&Address> {
        self.all().find(|address| address.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }
}
