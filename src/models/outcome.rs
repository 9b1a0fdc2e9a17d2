use serde::Serialize;

/// Result of loading something meant for display. Kept distinct from
/// `Result` so an empty load and a failed load render differently.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    Loaded(T),
    Empty,
    Failed(String),
}

impl<T> LoadOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadOutcome<U> {
        match self {
            LoadOutcome::Loaded(value) => LoadOutcome::Loaded(f(value)),
            LoadOutcome::Empty => LoadOutcome::Empty,
            LoadOutcome::Failed(reason) => LoadOutcome::Failed(reason),
        }
    }

    pub fn loaded(self) -> Option<T> {
        match self {
            LoadOutcome::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<Vec<T>, E>> for LoadOutcome<Vec<T>> {
    fn from(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(items) if items.is_empty() => LoadOutcome::Empty,
            Ok(items) => LoadOutcome::Loaded(items),
            Err(e) => LoadOutcome::Failed(e.to_string()),
        }
    }
}
