//! Recording admin API fake

use pinecone_cleanup::api::{AdminOperations, ApiError, ScopedApiKey};
use std::sync::Mutex;

/// Call received by a `FakeAdmin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    CreateKey { project_id: String, name: String },
    DeleteKey(String),
    DeleteProject(String),
}

/// Admin API that records every call and fails on request
#[derive(Debug, Default)]
pub struct FakeAdmin {
    calls: Mutex<Vec<AdminCall>>,
    fail_create_key: bool,
    fail_delete_key: bool,
    fail_delete_project: bool,
}

impl FakeAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create_key(mut self) -> Self {
        self.fail_create_key = true;
        self
    }

    pub fn failing_delete_key(mut self) -> Self {
        self.fail_delete_key = true;
        self
    }

    pub fn failing_delete_project(mut self) -> Self {
        self.fail_delete_project = true;
        self
    }

    pub fn calls(&self) -> Vec<AdminCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Ids of keys minted so far
    pub fn created_keys(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|c| matches!(c, AdminCall::CreateKey { .. }))
            .enumerate()
            .map(|(i, _)| key_id(i))
            .collect()
    }

    /// Ids of keys revoked so far
    pub fn revoked_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AdminCall::DeleteKey(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn project_deleted(&self, project_id: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, AdminCall::DeleteProject(id) if id == project_id))
    }

    fn record(&self, call: AdminCall) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len() - 1
    }
}

fn key_id(n: usize) -> String {
    format!("key-{n}")
}

impl AdminOperations for FakeAdmin {
    async fn create_api_key(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<ScopedApiKey, ApiError> {
        let minted = self.created_keys().len();
        self.record(AdminCall::CreateKey {
            project_id: project_id.to_string(),
            name: name.to_string(),
        });
        if self.fail_create_key {
            return Err(ApiError::Unauthorized {
                status: 403,
                message: "scripted key creation failure".to_string(),
            });
        }
        Ok(ScopedApiKey {
            id: key_id(minted),
            name: name.to_string(),
            value: format!("secret-{minted}"),
        })
    }

    async fn delete_api_key(&self, key_id: &str) -> Result<(), ApiError> {
        self.record(AdminCall::DeleteKey(key_id.to_string()));
        if self.fail_delete_key {
            return Err(ApiError::Http {
                status: 500,
                message: "scripted key revocation failure".to_string(),
            });
        }
        Ok(())
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.record(AdminCall::DeleteProject(project_id.to_string()));
        if self.fail_delete_project {
            return Err(ApiError::Conflict {
                message: "project still contains resources".to_string(),
            });
        }
        Ok(())
    }
}
