//! Search, pick, attach a person, commit: one address book entry at a time.

use std::fmt;
use log::{info, warn};
use crate::address::{normalize_with, Address, ClockRandomIds, IdSource};
use crate::book::AddressBookStore;
use crate::candidates::{CandidateSet, DedupPolicy, InsertOutcome, SearchKey};
use crate::error::WorkflowError;
use crate::fields::FieldStore;
use crate::geocode::{AddressLookup, LookupOutcome, SearchQuery};
use crate::record::PersonAddressRecord;
use crate::storage::Storage;

pub const STREET_NAME: &str = "streetName";
pub const ZIP_CODE: &str = "zipCode";
pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const SELECTED_ADDRESS: &str = "selectedAddress";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Searching,
    CandidatesShown,
    PersonFormOpen,
    Committing,
    Error,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Idle => write!(f, "idle"),
            WorkflowState::Searching => write!(f, "searching"),
            WorkflowState::CandidatesShown => write!(f, "candidates shown"),
            WorkflowState::PersonFormOpen => write!(f, "person form open"),
            WorkflowState::Committing => write!(f, "committing"),
            WorkflowState::Error => write!(f, "error"),
        }
    }
}

/// Handed out when a search starts, required to deliver its result.
///
/// A ticket goes stale once the form is reset or another search starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    key: SearchKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCompletion {
    /// the result became a new candidate
    Added(Address),
    /// the result belonged to an abandoned search and was dropped
    Stale,
}

fn default_fields() -> FieldStore {
    FieldStore::new([
        (STREET_NAME, ""),
        (ZIP_CODE, ""),
        (FIRST_NAME, ""),
        (LAST_NAME, ""),
        (SELECTED_ADDRESS, ""),
    ])
}

/// One user session of the address acquisition workflow
pub struct CompositionWorkflow<L, I = ClockRandomIds> {
    lookup: L,
    ids: I,
    search_limit: u32,
    candidates: CandidateSet,
    /// candidates set aside while a search is in flight
    previous: CandidateSet,
    fields: FieldStore,
    state: WorkflowState,
    error: Option<WorkflowError>,
    generation: u64,
}

impl<L: AddressLookup> CompositionWorkflow<L> {
    pub fn new(lookup: L, policy: DedupPolicy) -> Self {
        Self::with_ids(lookup, policy, ClockRandomIds)
    }
}

impl<L: AddressLookup, I: IdSource> CompositionWorkflow<L, I> {
    pub fn with_ids(lookup: L, policy: DedupPolicy, ids: I) -> Self {
        Self {
            lookup,
            ids,
            search_limit: 1,
            candidates: CandidateSet::new(policy),
            previous: CandidateSet::new(policy),
            fields: default_fields(),
            state: WorkflowState::Idle,
            error: None,
            generation: 0,
        }
    }

    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Look up `street_name` in `zip_code` and keep the first result as a candidate.
    pub async fn submit_search(&mut self, street_name: &str, zip_code: &str) -> Result<SearchCompletion, WorkflowError> {
        let ticket = self.begin_search(street_name, zip_code)?;
        let query = SearchQuery::new(&ticket.key.street_name, &ticket.key.zip_code)
            .with_limit(self.search_limit);
        let outcome = self.lookup.lookup(&query).await;
        self.complete_search(ticket, outcome)
    }

    /// Start a search: empties the candidate list and the selection.
    ///
    /// The emptied candidates are kept aside until the result arrives: a
    /// result repeating one of them is rejected and the list comes back,
    /// an accepted result replaces them.
    pub fn begin_search(&mut self, street_name: &str, zip_code: &str) -> Result<SearchTicket, WorkflowError> {
        let street_name = street_name.trim();
        let zip_code = zip_code.trim();
        if street_name.is_empty() || zip_code.is_empty() {
            return Err(self.fail(WorkflowError::EmptySearch));
        }

        // a search still in flight already holds the list aside
        let previous = if self.candidates.is_empty() {
            self.previous.take()
        } else {
            self.candidates.take()
        };
        self.clear_session();
        self.previous = previous;
        self.fields.set(STREET_NAME, street_name);
        self.fields.set(ZIP_CODE, zip_code);
        self.enter(WorkflowState::Searching);
        Ok(
            SearchTicket {
                generation: self.generation,
                key: SearchKey::new(street_name, zip_code),
            }
        )
    }

    /// Deliver the lookup result of a search started with [`Self::begin_search`].
    pub fn complete_search(&mut self, ticket: SearchTicket, outcome: LookupOutcome) -> Result<SearchCompletion, WorkflowError> {
        if ticket.generation != self.generation {
            info!("discarding result of abandoned search [{}, {}]", ticket.key.street_name, ticket.key.zip_code);
            return Ok(SearchCompletion::Stale);
        }

        let mut previous = self.previous.take();
        let results = match outcome {
            LookupOutcome::Found(results) => results,
            LookupOutcome::NotFound => return Err(self.fail(WorkflowError::LookupNotFound)),
            LookupOutcome::TransportError(reason) => return Err(self.fail(WorkflowError::LookupUnavailable(reason))),
        };
        let Some(raw) = results.first() else {
            return Err(self.fail(WorkflowError::LookupNotFound));
        };
        if results.len() > 1 {
            info!("keeping the best of [{}] results", results.len());
        }

        let address = normalize_with(raw, &self.ids);
        match previous.insert(address.clone(), ticket.key.clone()) {
            InsertOutcome::Added => {
                info!("new candidate [{}]", address.id);
                self.candidates.clear();
                self.candidates.insert(address.clone(), ticket.key);
                self.enter(WorkflowState::CandidatesShown);
                Ok(SearchCompletion::Added(address))
            }
            InsertOutcome::RejectedDuplicate => {
                self.candidates = previous;
                Err(self.fail(WorkflowError::DuplicateCandidate))
            }
        }
    }

    /// Mark the candidate with `id` as the one to attach a person to.
    pub fn select_candidate(&mut self, id: &str) -> Result<(), WorkflowError> {
        if self.candidates.find(id).is_none() {
            return Err(self.fail(WorkflowError::NoSelection));
        }
        self.fields.set(SELECTED_ADDRESS, id);
        self.enter(WorkflowState::PersonFormOpen);
        Ok(())
    }

    /// Merge the selected candidate with the person's names and store it in `book`.
    pub async fn submit_person<S: Storage>(
        &mut self,
        book: &mut AddressBookStore<S>,
        first_name: &str,
        last_name: &str,
    ) -> Result<PersonAddressRecord, WorkflowError> {
        self.fields.set(FIRST_NAME, first_name);
        self.fields.set(LAST_NAME, last_name);

        let selected = self.fields.get(SELECTED_ADDRESS).to_string();
        if selected.is_empty() || self.candidates.is_empty() {
            return Err(self.fail(WorkflowError::NoSelection));
        }
        let Some(address) = self.candidates.find(&selected).cloned() else {
            return Err(self.fail(WorkflowError::NoSelection));
        };

        self.enter(WorkflowState::Committing);
        let record = PersonAddressRecord::from_address_and_person(
            address,
            self.fields.get(FIRST_NAME),
            self.fields.get(LAST_NAME),
        );
        if let Err(e) = book.add(record.clone()).await {
            return Err(self.fail(e.into()));
        }

        self.clear_session();
        self.enter(WorkflowState::Idle);
        Ok(record)
    }

    /// Back to an empty form, whatever the current state.
    pub fn reset_form(&mut self) {
        self.clear_session();
        self.enter(WorkflowState::Idle);
    }

    pub async fn remove_from_book<S: Storage>(
        &mut self,
        book: &mut AddressBookStore<S>,
        id: &str,
    ) -> Result<Option<PersonAddressRecord>, WorkflowError> {
        match book.remove(id).await {
            Ok(removed) => {
                if self.state == WorkflowState::Error {
                    self.enter(WorkflowState::Idle);
                }
                self.error = None;
                Ok(removed)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Address> {
        self.candidates.all()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldStore {
        &mut self.fields
    }

    /// every pending search becomes stale
    fn clear_session(&mut self) {
        self.candidates.clear();
        self.previous.clear();
        self.fields.reset();
        self.generation += 1;
    }

    fn enter(&mut self, state: WorkflowState) {
        self.state = state;
        self.error = None;
    }

    fn fail(&mut self, err: WorkflowError) -> WorkflowError {
        warn!("{} ({:?})", err, err);
        self.state = WorkflowState::Error;
        self.error = Some(err.clone());
        err
    }
}
