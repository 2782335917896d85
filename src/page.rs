use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

use crate::api::DocumentBackend;
use crate::docs::intake::{DropOutcome, UploadIntake};
use crate::docs::types::{Document, UploadFile};
use crate::qa::{AskOutcome, QaSection};

/// Page container for one session. Owns the uploaded document list and the
/// upload-in-progress flag; the intake and the Q&A section keep their own state.
pub struct Page {
    backend: Arc<dyn DocumentBackend>,
    documents: RwLock<Vec<Document>>,
    is_uploading: AtomicBool,
    intake: Mutex<UploadIntake>,
    qa: QaSection,
}

impl Page {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            documents: RwLock::new(Vec::new()),
            is_uploading: AtomicBool::new(false),
            intake: Mutex::new(UploadIntake::new()),
            qa: QaSection::new(),
        }
    }

    pub fn backend(&self) -> &dyn DocumentBackend {
        self.backend.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading.load(Ordering::SeqCst)
    }

    /// Documents uploaded this session, oldest first.
    pub async fn documents(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }

    /// Current intake error. A drop in progress has already cleared it.
    pub fn intake_error(&self) -> Option<String> {
        self.intake
            .try_lock()
            .ok()
            .and_then(|intake| intake.error().map(str::to_string))
    }

    pub fn qa(&self) -> &QaSection {
        &self.qa
    }

    /// Claim the intake surface for one drop. `None` while an upload is in
    /// flight or another drop is being processed: the surface is disabled.
    pub fn open_intake(&self) -> Option<IntakeSurface<'_>> {
        let Ok(intake) = self.intake.try_lock() else {
            debug!("intake busy");
            return None;
        };
        if self.is_uploading() {
            debug!("intake disabled, upload in progress");
            return None;
        }
        Some(IntakeSurface { page: self, intake })
    }

    /// Drop files on the intake surface. While it is disabled the event is
    /// dropped without touching any state.
    pub async fn drop_files(&self, files: Vec<UploadFile>) -> DropOutcome {
        match self.open_intake() {
            Some(surface) => surface.drop_files(files).await,
            None => DropOutcome::Disabled,
        }
    }

    /// Upload callback handed to the intake.
    async fn upload(&self, file: UploadFile) -> Result<Document> {
        self.is_uploading.store(true, Ordering::SeqCst);
        let result = self.backend.upload_document(file).await;
        if let Ok(doc) = &result {
            let mut documents = self.documents.write().await;
            documents.push(doc.clone());
            info!(doc_id = %doc.id, total = documents.len(), "document added to session");
        }
        self.is_uploading.store(false, Ordering::SeqCst);
        result
    }

    pub async fn ask(&self, input: &str) -> AskOutcome {
        self.qa.ask(self.backend.as_ref(), input).await
    }
}

/// An enabled intake surface, held by exactly one drop at a time.
pub struct IntakeSurface<'a> {
    page: &'a Page,
    intake: MutexGuard<'a, UploadIntake>,
}

impl IntakeSurface<'_> {
    pub async fn drop_files(mut self, files: Vec<UploadFile>) -> DropOutcome {
        let page = self.page;
        self.intake.on_drop(files, |file| page.upload(file)).await
    }
}
