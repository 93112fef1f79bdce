//! Single-level undo over a snapshotted state.
//!
//! The buffer keeps the current state and, after a recorded action, the state
//! just before it. Undo swaps back once; a second consecutive undo does
//! nothing.

/// Holds the current state and at most one snapshot to return to.
#[derive(Debug, Clone, Default)]
pub struct UndoBuffer<T: Clone> {
    current: T,
    past: Option<T>,
}

impl<T: Clone> UndoBuffer<T> {
    /// Starts with `state` and nothing to undo.
    pub fn new(state: T) -> Self {
        Self {
            current: state,
            past: None,
        }
    }

    /// The current state.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Returns true if an action can be undone.
    pub fn can_undo(&self) -> bool {
        self.past.is_some()
    }

    /// Records an action: snapshots the current state, then mutates it.
    pub fn apply<R>(&mut self, action: impl FnOnce(&mut T) -> R) -> R {
        self.past = Some(self.current.clone());
        action(&mut self.current)
    }

    /// Like [`UndoBuffer::apply`], but the action may fail. On failure neither
    /// the state nor the history changes.
    ///
    /// # Arguments
    ///
    /// * `action` - Mutation to run against a working copy of the current state
    pub fn try_apply<R, E>(&mut self, action: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut next = self.current.clone();
        let result = action(&mut next)?;
        self.past = Some(std::mem::replace(&mut self.current, next));
        Ok(result)
    }

    /// Extends the last recorded action so that one undo reverts both.
    ///
    /// On failure nothing changes.
    pub fn try_amend<R, E>(&mut self, action: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut next = self.current.clone();
        let result = action(&mut next)?;
        self.current = next;
        Ok(result)
    }

    /// Mutates state that is not part of the undo history.
    ///
    /// The change is applied to the snapshot as well, so undoing an earlier
    /// action does not revert it.
    pub fn apply_untracked(&mut self, mut action: impl FnMut(&mut T)) {
        action(&mut self.current);
        if let Some(past) = self.past.as_mut() {
            action(past);
        }
    }

    /// Returns to the snapshot taken by the last recorded action.
    ///
    /// # Returns
    ///
    /// `true` if there was something to undo
    pub fn undo(&mut self) -> bool {
        match self.past.take() {
            Some(past) => {
                self.current = past;
                true
            }
            None => false,
        }
    }
}
