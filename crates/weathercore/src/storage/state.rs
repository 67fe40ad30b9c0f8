//! Per-chat conversation state.
//!
//! The table keeps the historical string encoding (`"None"`,
//! `"waiting_value"`, a number as text). That encoding never leaves this
//! file: the rest of the crate works with `Slot` and `CitySlot`.

use serde::Serialize;

use crate::core::config;

/// Stored value of a prompt that is waiting for the user's answer.
pub const WAITING: &str = "waiting_value";
/// Stored value of a cleared slot.
pub const NONE: &str = "None";

/// A numeric slot that may be empty, waiting for input or filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Slot {
    Empty,
    Waiting,
    Value(i64),
}

impl Slot {
    pub fn encode(&self) -> String {
        match self {
            Slot::Empty => NONE.to_string(),
            Slot::Waiting => WAITING.to_string(),
            Slot::Value(n) => n.to_string(),
        }
    }

    /// Unknown values (e.g. legacy `"waiting value"`) decode as `Empty` so the
    /// chat can recover with the next command.
    pub fn decode(column: &str, raw: &str) -> Self {
        match raw {
            NONE | "" => Slot::Empty,
            WAITING => Slot::Waiting,
            other => other.parse().map(Slot::Value).unwrap_or_else(|_| {
                log::warn!("Unexpected {} value {:?}, treated as empty", column, other);
                Slot::Empty
            }),
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, Slot::Waiting)
    }
}

/// The chat's city, or a pending `/change_city` prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CitySlot {
    Waiting,
    Named(String),
}

impl CitySlot {
    pub fn encode(&self) -> String {
        match self {
            CitySlot::Waiting => WAITING.to_string(),
            CitySlot::Named(name) => name.clone(),
        }
    }

    pub fn decode(raw: &str) -> Self {
        match raw {
            WAITING => CitySlot::Waiting,
            name => CitySlot::Named(name.to_string()),
        }
    }
}

/// Which prompt the next message answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    City,
    Date,
    DayCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatState {
    pub chat_id: i64,
    pub city: CitySlot,
    pub date_difference: Slot,
    pub qty_days: Slot,
}

impl ChatState {
    /// The row inserted on first contact.
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            city: CitySlot::Named(config::chat::DEFAULT_CITY.clone()),
            date_difference: Slot::Empty,
            qty_days: Slot::Empty,
        }
    }

    /// Builds the state from the stored columns.
    pub fn from_columns(chat_id: i64, city: &str, date_difference: &str, qty_days: &str) -> Self {
        Self {
            chat_id,
            city: CitySlot::decode(city),
            date_difference: Slot::decode("date_difference", date_difference),
            qty_days: Slot::decode("qty_days", qty_days),
        }
    }

    /// The pending prompt, city first, then date, then day count.
    ///
    /// Rows written before prompts cleared each other can have several
    /// flags set; only the first one is answered per message.
    pub fn pending(&self) -> Option<PendingInput> {
        if self.city == CitySlot::Waiting {
            Some(PendingInput::City)
        } else if self.date_difference.is_waiting() {
            Some(PendingInput::Date)
        } else if self.qty_days.is_waiting() {
            Some(PendingInput::DayCount)
        } else {
            None
        }
    }

    /// The city to query, if one is set.
    pub fn city_name(&self) -> Option<&str> {
        match &self.city {
            CitySlot::Named(name) => Some(name),
            CitySlot::Waiting => None,
        }
    }

    /// Marks `input` as pending and clears the other numeric prompts.
    pub fn await_input(&mut self, input: PendingInput) {
        self.date_difference = Slot::Empty;
        self.qty_days = Slot::Empty;
        match input {
            PendingInput::City => self.city = CitySlot::Waiting,
            PendingInput::Date => self.date_difference = Slot::Waiting,
            PendingInput::DayCount => self.qty_days = Slot::Waiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slot_encoding() {
        assert_eq!(Slot::Empty.encode(), "None");
        assert_eq!(Slot::Waiting.encode(), "waiting_value");
        assert_eq!(Slot::Value(7).encode(), "7");

        assert_eq!(Slot::decode("qty_days", "None"), Slot::Empty);
        assert_eq!(Slot::decode("qty_days", "waiting_value"), Slot::Waiting);
        assert_eq!(Slot::decode("qty_days", "12"), Slot::Value(12));
    }

    #[test]
    fn test_unknown_stored_values_decode_as_empty() {
        assert_eq!(Slot::decode("qty_days", "twelve"), Slot::Empty);

        let state = ChatState::from_columns(1, "Kazan", "waiting value", "-");
        assert_eq!(state.date_difference, Slot::Empty);
        assert_eq!(state.qty_days, Slot::Empty);
        assert_eq!(state.pending(), None);
    }

    #[test]
    fn test_new_state_defaults() {
        let state = ChatState::new(42);
        assert_eq!(state.city_name(), Some(config::chat::DEFAULT_CITY.as_str()));
        assert_eq!(state.date_difference, Slot::Empty);
        assert_eq!(state.qty_days, Slot::Empty);
        assert_eq!(state.pending(), None);
    }

    #[test]
    fn test_pending_priority() {
        let state = ChatState::from_columns(1, "waiting_value", "waiting_value", "waiting_value");
        assert_eq!(state.pending(), Some(PendingInput::City));

        let state = ChatState::from_columns(1, "Kazan", "waiting_value", "waiting_value");
        assert_eq!(state.pending(), Some(PendingInput::Date));

        let state = ChatState::from_columns(1, "Kazan", "None", "waiting_value");
        assert_eq!(state.pending(), Some(PendingInput::DayCount));
    }

    #[test]
    fn test_await_input_clears_other_prompts() {
        let mut state = ChatState::new(1);
        state.await_input(PendingInput::Date);
        state.await_input(PendingInput::DayCount);
        assert_eq!(state.date_difference, Slot::Empty);
        assert_eq!(state.qty_days, Slot::Waiting);

        state.await_input(PendingInput::City);
        assert_eq!(state.qty_days, Slot::Empty);
        assert_eq!(state.pending(), Some(PendingInput::City));
    }
}
