// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::BTreeMap;

/// Every kind of user-visible operation the controller runs.
///
/// The declaration order is the order errors are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    FetchTasks,
    FetchCurrentUser,
    RequestOtp,
    LoginOtp,
    CreateTask,
    UpdateSession,
}

impl Operation {
    /// Label shown while the operation is in flight.
    pub fn busy_label(self) -> &'static str {
        match self {
            Operation::FetchTasks => "Loading...",
            Operation::FetchCurrentUser => "Checking session...",
            Operation::RequestOtp => "Requesting OTP...",
            Operation::LoginOtp => "Logging in...",
            Operation::CreateTask => "Saving...",
            Operation::UpdateSession => "Updating session...",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Slot {
    loading: bool,
    error: Option<String>,
}

/// Loading flag and last error, one slot per [`Operation`].
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    slots: BTreeMap<Operation, Slot>,
}

impl StatusBoard {
    /// Marks `op` as running and forgets its previous error.
    pub fn start(&mut self, op: Operation) {
        let slot = self.slots.entry(op).or_default();
        slot.loading = true;
        slot.error = None;
    }

    pub fn succeed(&mut self, op: Operation) {
        self.slots.entry(op).or_default().loading = false;
    }

    /// Records a failure. Also used for validation failures that never
    /// started a request.
    pub fn fail(&mut self, op: Operation, message: impl Into<String>) {
        let slot = self.slots.entry(op).or_default();
        slot.loading = false;
        slot.error = Some(message.into());
    }

    pub fn clear(&mut self, op: Operation) {
        self.slots.remove(&op);
    }

    pub fn is_loading(&self, op: Operation) -> bool {
        self.slots.get(&op).is_some_and(|slot| slot.loading)
    }

    pub fn error(&self, op: Operation) -> Option<&str> {
        self.slots.get(&op).and_then(|slot| slot.error.as_deref())
    }

    /// All recorded errors in operation order.
    pub fn errors(&self) -> impl Iterator<Item = (Operation, &str)> {
        self.slots
            .iter()
            .filter_map(|(op, slot)| slot.error.as_deref().map(|error| (*op, error)))
    }
}
