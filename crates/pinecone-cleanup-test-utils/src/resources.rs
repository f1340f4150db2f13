//! Scripted in-memory resources
//!
//! Each `FakeEntry` replays a script of describe, delete and protection
//! replies. The last reply of a script repeats forever, so a one-step script
//! describes a resource that never changes.

use pinecone_cleanup::api::ApiError;
use pinecone_cleanup::eraser::{
    ApiOutcome, DeletableResource, ProjectResources, ProtectedResource, ResourceRef,
};
use pinecone_cleanup_common::{ResourceKind, ResourceState};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted answer to `describe_state`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Describe {
    State(String),
    NotFound,
    Error,
}

impl Describe {
    pub fn state(state: &str) -> Self {
        Describe::State(state.to_string())
    }
}

/// Scripted answer to `delete` and `configure_deletion_protection`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    NotFound,
    Error,
}

/// Call received by a `FakeResource`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    ListProtected,
    Describe(String),
    Delete(String),
    Configure(String, bool),
}

/// One scripted resource
#[derive(Debug, Clone)]
pub struct FakeEntry {
    name: String,
    describes: VecDeque<Describe>,
    deletes: VecDeque<Reply>,
    configures: VecDeque<Reply>,
    protected: bool,
}

impl FakeEntry {
    /// A resource that is `Ready` and deletes cleanly
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            describes: VecDeque::from([Describe::state("Ready")]),
            deletes: VecDeque::from([Reply::Ok]),
            configures: VecDeque::from([Reply::Ok]),
            protected: false,
        }
    }

    /// Describe replies, in order
    pub fn describes(mut self, steps: impl IntoIterator<Item = Describe>) -> Self {
        self.describes = steps.into_iter().collect();
        self
    }

    /// Always report `state`
    pub fn in_state(self, state: &str) -> Self {
        self.describes([Describe::state(state)])
    }

    /// Delete replies, in order
    pub fn deletes(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.deletes = replies.into_iter().collect();
        self
    }

    /// Deletion protection replies, in order
    pub fn configures(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.configures = replies.into_iter().collect();
        self
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }
}

fn next<T: Clone>(script: &mut VecDeque<T>) -> Option<T> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

fn scripted_error(kind: ResourceKind, call: &str) -> ApiError {
    ApiError::Http {
        status: 500,
        message: format!("scripted {call} failure for {kind}"),
    }
}

/// In-memory resource kind. Deleted entries disappear from listings and
/// protected entries refuse deletion.
#[derive(Debug)]
pub struct FakeResource {
    kind: ResourceKind,
    entries: Mutex<Vec<FakeEntry>>,
    list_failures: Mutex<u32>,
    rejects_credentials: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeResource {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            entries: Mutex::new(Vec::new()),
            list_failures: Mutex::new(0),
            rejects_credentials: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(self, entry: FakeEntry) -> Self {
        self.entries.lock().unwrap().push(entry);
        self
    }

    /// Make the next `n` list calls fail
    pub fn failing_lists(self, n: u32) -> Self {
        *self.list_failures.lock().unwrap() = n;
        self
    }

    /// Make every list call fail with 401
    pub fn rejecting_credentials(mut self) -> Self {
        self.rejects_credentials = true;
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn describe_count(&self, name: &str) -> usize {
        self.count(|c| matches!(c, Call::Describe(n) if n == name))
    }

    pub fn delete_count(&self, name: &str) -> usize {
        self.count(|c| matches!(c, Call::Delete(n) if n == name))
    }

    pub fn configure_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Configure(..)))
    }

    pub fn list_count(&self) -> usize {
        self.count(|c| matches!(c, Call::List))
    }

    /// Names still present
    pub fn remaining(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.name == name && e.protected)
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_list_failure(&self) -> Result<(), ApiError> {
        if self.rejects_credentials {
            return Err(ApiError::Unauthorized {
                status: 401,
                message: "Invalid API key".to_string(),
            });
        }
        let mut failures = self.list_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(scripted_error(self.kind, "list"));
        }
        Ok(())
    }

    fn list_where(&self, pred: impl Fn(&FakeEntry) -> bool) -> Vec<ResourceRef> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| pred(e))
            .map(|e| ResourceRef::new(e.name.clone()))
            .collect()
    }
}

impl DeletableResource for FakeResource {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn list(&self) -> Result<Vec<ResourceRef>, ApiError> {
        self.record(Call::List);
        self.take_list_failure()?;
        Ok(self.list_where(|_| true))
    }

    async fn describe_state(&self, name: &str) -> ApiOutcome<ResourceState> {
        self.record(Call::Describe(name.to_string()));
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.iter_mut().find(|e| e.name == name) else {
            return ApiOutcome::NotFound;
        };

        match next(&mut entry.describes) {
            Some(Describe::State(state)) => ApiOutcome::Done(ResourceState::new(state)),
            Some(Describe::NotFound) | None => ApiOutcome::NotFound,
            Some(Describe::Error) => ApiOutcome::Failed(scripted_error(self.kind, "describe")),
        }
    }

    async fn delete(&self, name: &str) -> ApiOutcome<()> {
        self.record(Call::Delete(name.to_string()));
        let mut entries = self.entries.lock().unwrap();
        let Some(pos) = entries.iter().position(|e| e.name == name) else {
            return ApiOutcome::NotFound;
        };
        if entries[pos].protected {
            return ApiOutcome::Failed(ApiError::Conflict {
                message: format!("deletion protection is enabled for {name}"),
            });
        }

        match next(&mut entries[pos].deletes) {
            Some(Reply::Ok) => {
                entries.remove(pos);
                ApiOutcome::Done(())
            }
            Some(Reply::NotFound) | None => {
                entries.remove(pos);
                ApiOutcome::NotFound
            }
            Some(Reply::Error) => ApiOutcome::Failed(ApiError::Throttled {
                message: format!("scripted delete failure for {}", self.kind),
            }),
        }
    }
}

impl ProtectedResource for FakeResource {
    async fn list_protected(&self) -> Result<Vec<ResourceRef>, ApiError> {
        self.record(Call::ListProtected);
        self.take_list_failure()?;
        Ok(self.list_where(|e| e.protected))
    }

    async fn configure_deletion_protection(&self, name: &str, enabled: bool) -> ApiOutcome<()> {
        self.record(Call::Configure(name.to_string(), enabled));
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.iter_mut().find(|e| e.name == name) else {
            return ApiOutcome::NotFound;
        };

        match next(&mut entry.configures) {
            Some(Reply::Ok) => {
                entry.protected = enabled;
                ApiOutcome::Done(())
            }
            Some(Reply::NotFound) | None => ApiOutcome::NotFound,
            Some(Reply::Error) => ApiOutcome::Failed(ApiError::Conflict {
                message: format!("scripted protection failure for {name}"),
            }),
        }
    }
}

/// A project made of three fake resource kinds
#[derive(Debug)]
pub struct FakeProject {
    pub indexes: FakeResource,
    pub collections: FakeResource,
    pub backups: FakeResource,
}

impl Default for FakeProject {
    fn default() -> Self {
        Self {
            indexes: FakeResource::new(ResourceKind::Index),
            collections: FakeResource::new(ResourceKind::Collection),
            backups: FakeResource::new(ResourceKind::Backup),
        }
    }
}

impl FakeProject {
    pub fn with_indexes(mut self, indexes: FakeResource) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn with_collections(mut self, collections: FakeResource) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_backups(mut self, backups: FakeResource) -> Self {
        self.backups = backups;
        self
    }

    /// True when every kind is empty
    pub fn is_empty(&self) -> bool {
        self.indexes.remaining().is_empty()
            && self.collections.remaining().is_empty()
            && self.backups.remaining().is_empty()
    }
}

impl ProjectResources for FakeProject {
    type Indexes = FakeResource;
    type Collections = FakeResource;
    type Backups = FakeResource;

    fn indexes(&self) -> &FakeResource {
        &self.indexes
    }

    fn collections(&self) -> &FakeResource {
        &self.collections
    }

    fn backups(&self) -> &FakeResource {
        &self.backups
    }
}
