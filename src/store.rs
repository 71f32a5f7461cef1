use crate::gemini::GenerationError;
use crate::models::{Shot, Storyboard};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Fixed key for the durable project blob; the persistence adapter derives
/// its file name from it.
pub const STORAGE_KEY: &str = "verticalcine_v4_data";

/// The durable slice of project state. Serialized shape is the storage
/// contract: `{ shots, summary, fullNarrative }`, round-tripped losslessly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub shots: Vec<Shot>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, rename = "fullNarrative")]
    pub full_narrative: Option<String>,
}

impl ProjectData {
    pub fn is_empty(&self) -> bool {
        self.shots.is_empty() && self.summary.is_none() && self.full_narrative.is_none()
    }
}

/// Ownership token for the single generation slot. Starting a generation
/// claims the slot; completion must present the same ticket to release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationTicket {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl GenerationTicket {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }
}

impl Default for GenerationTicket {
    fn default() -> Self {
        Self::new()
    }
}

/// Classified generation error as held in state and shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl From<&GenerationError> for ErrorReport {
    fn from(err: &GenerationError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            hint: err.hint(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectState {
    pub data: ProjectData,
    pub generation: Option<GenerationTicket>,
    pub progress: f32,
    pub error: Option<ErrorReport>,
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum Transition {
    GenerationStarted {
        ticket: GenerationTicket,
    },
    ProgressTicked,
    GenerationSucceeded {
        ticket: GenerationTicket,
        storyboard: Storyboard,
        at: DateTime<Utc>,
    },
    GenerationFailed {
        ticket: GenerationTicket,
        error: ErrorReport,
    },
    ProjectCleared,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a generation is already in flight")]
    GenerationBusy,
    #[error("no generation is in flight")]
    NotGenerating,
    #[error("generation ticket does not match the in-flight generation")]
    StaleTicket,
}

/// Synthetic progress easing: fast to 30, medium to 70, slow to 95, then
/// hold until completion. Purely cosmetic; the remote call offers no
/// incremental signal.
pub fn advance_progress(progress: f32) -> f32 {
    if progress < 30.0 {
        progress + 1.0
    } else if progress < 70.0 {
        progress + 0.5
    } else if progress < 95.0 {
        (progress + 0.2).min(95.0)
    } else {
        progress
    }
}

/// Pure state-transition function. Returns the next state without touching
/// storage; the store invokes the persistence adapter after a transition is
/// accepted.
pub fn apply_transition(
    state: &ProjectState,
    transition: Transition,
) -> Result<ProjectState, TransitionError> {
    let mut next = state.clone();
    match transition {
        Transition::GenerationStarted { ticket } => {
            if state.generation.is_some() {
                return Err(TransitionError::GenerationBusy);
            }
            next.generation = Some(ticket);
            next.progress = 0.0;
            next.error = None;
        }
        Transition::ProgressTicked => {
            if state.generation.is_none() {
                return Err(TransitionError::NotGenerating);
            }
            next.progress = advance_progress(state.progress);
        }
        Transition::GenerationSucceeded {
            ticket,
            storyboard,
            at,
        } => {
            check_ticket(state, ticket)?;
            next.data = ProjectData {
                shots: storyboard.shots,
                summary: Some(storyboard.summary),
                full_narrative: Some(storyboard.full_narrative),
            };
            next.generation = None;
            next.progress = 100.0;
            next.error = None;
            next.generated_at = Some(at);
        }
        Transition::GenerationFailed { ticket, error } => {
            check_ticket(state, ticket)?;
            // Previous successful data stays untouched; only the attempt is
            // discarded.
            next.generation = None;
            next.progress = 100.0;
            next.error = Some(error);
        }
        Transition::ProjectCleared => {
            if state.generation.is_some() {
                return Err(TransitionError::GenerationBusy);
            }
            next = ProjectState::default();
        }
    }
    Ok(next)
}

fn check_ticket(state: &ProjectState, ticket: GenerationTicket) -> Result<(), TransitionError> {
    match state.generation {
        None => Err(TransitionError::NotGenerating),
        Some(current) if current.id != ticket.id => Err(TransitionError::StaleTicket),
        Some(_) => Ok(()),
    }
}

/// Storage adapter for the durable project blob. Load failures are
/// swallowed (empty state); save/clear failures are reported to the host,
/// which logs them without disturbing state logic.
#[async_trait]
pub trait StatePersistence: Send + Sync {
    async fn load(&self) -> ProjectData;
    async fn save(&self, data: &ProjectData) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

/// JSON file under the state directory, named after the fixed storage key.
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatePersistence for FilePersistence {
    async fn load(&self) -> ProjectData {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return ProjectData::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!("⚠️ Ignoring corrupt project file {:?}: {}", self.path, e);
                ProjectData::default()
            }
        }
    }

    async fn save(&self, data: &ProjectData) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(data)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Holds the single project's state and runs every change through the pure
/// transition function, persisting the durable slice after each accepted
/// transition that altered it.
pub struct ProjectStore {
    state: RwLock<ProjectState>,
    persistence: Box<dyn StatePersistence>,
}

impl ProjectStore {
    pub fn new(persistence: Box<dyn StatePersistence>) -> Self {
        Self {
            state: RwLock::new(ProjectState::default()),
            persistence,
        }
    }

    /// One-time rehydration at startup. Never fails: a missing or corrupt
    /// blob leaves the project empty.
    pub async fn restore(&self) {
        let data = self.persistence.load().await;
        if !data.is_empty() {
            info!("💾 Restored saved project: {} shots", data.shots.len());
            self.state.write().data = data;
        }
    }

    pub fn snapshot(&self) -> ProjectState {
        self.state.read().clone()
    }

    pub async fn apply(&self, transition: Transition) -> Result<ProjectState, TransitionError> {
        let was_reset = matches!(transition, Transition::ProjectCleared);
        let (next, data_changed) = {
            let mut guard = self.state.write();
            let next = apply_transition(&guard, transition)?;
            let data_changed = next.data != guard.data;
            *guard = next.clone();
            (next, data_changed)
        };

        if was_reset {
            if let Err(e) = self.persistence.clear().await {
                warn!("⚠️ Failed to remove project file: {}", e);
            }
        } else if data_changed {
            if let Err(e) = self.persistence.save(&next.data).await {
                warn!("⚠️ Failed to persist project: {}", e);
            }
        }
        Ok(next)
    }
}
