use crate::ident::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("{kind} not found: {path}")]
    NotFound { kind: EntityKind, path: String },
    #[error("{kind} name already in use: {path}")]
    NameConflict { kind: EntityKind, path: String },
    #[error("Empty {0} name")]
    EmptyName(EntityKind),
    #[error("No drag in progress")]
    DragInactive,
}

impl EditError {
    pub fn not_found(kind: EntityKind, path: impl ToString) -> Self {
        Self::NotFound {
            kind,
            path: path.to_string(),
        }
    }

    pub fn conflict(kind: EntityKind, path: impl ToString) -> Self {
        Self::NameConflict {
            kind,
            path: path.to_string(),
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;
