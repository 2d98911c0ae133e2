mod definition;
mod exception;
mod occurrence;
mod recurrence;
mod scope;
mod sync;
mod timespan;

pub use definition::{
    validate_window, EventDefinition, EventDefinitionData, InvalidWindow,
    MAX_EVENT_DURATION_MILLIS,
};
pub use exception::OccurrenceException;
pub use occurrence::{format_iso, InvalidOccurrenceId, Occurrence, OccurrenceId};
pub use recurrence::{expand, expand_series};
pub use scope::{
    resolve_delete_scope, resolve_mutation_scope, DeleteScope, InvalidScope, KeepOccurrence,
    MutationScope, ScopeChoice,
};
pub use sync::{SyncFrame, SyncMessage, SyncMessageType};
pub use timespan::TimeSpan;
