use crate::definition::EventDefinition;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The user's decision to apply a mutation to one occurrence or to the whole series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScopeChoice {
    #[serde(rename = "this")]
    ThisOccurrence,
    #[serde(rename = "all")]
    AllOccurrences,
}

/// Which occurrence survives when a recurring series is turned into a single booking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KeepOccurrence {
    /// The occurrence the user was editing
    #[serde(rename = "this")]
    ThisOccurrence,
    /// The first occurrence of the series, i.e. the stored `start` of the definition
    #[serde(rename = "anchor")]
    AnchorOccurrence,
}

/// How a create or update request is carried out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationScope {
    Create,
    UpdateNonRecurring,
    UpdateSingleOccurrence,
    UpdateAllOccurrences,
    ConvertToSingle(KeepOccurrence),
}

/// How a delete request is carried out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteScope {
    /// Cancel one weekly occurrence with an exception
    SingleOccurrence,
    /// Remove the definition and all of its exceptions
    WholeDefinition,
}

/// Decides how a mutation on `target` is carried out.
///
/// * no target: `Create`
/// * non recurring target: `UpdateNonRecurring`, the scope choice is irrelevant
/// * recurring target and a stop recurring request: `ConvertToSingle`
/// * recurring target otherwise: depends on the scope choice
pub fn resolve_mutation_scope(
    target: Option<&EventDefinition>,
    choice: ScopeChoice,
    stop_recurring: Option<KeepOccurrence>,
) -> MutationScope {
    let target = match target {
        Some(target) => target,
        None => return MutationScope::Create,
    };
    if !target.repeat_weekly {
        return MutationScope::UpdateNonRecurring;
    }
    if let Some(keep) = stop_recurring {
        return MutationScope::ConvertToSingle(keep);
    }
    match choice {
        ScopeChoice::ThisOccurrence => MutationScope::UpdateSingleOccurrence,
        ScopeChoice::AllOccurrences => MutationScope::UpdateAllOccurrences,
    }
}

pub fn resolve_delete_scope(target: &EventDefinition, choice: ScopeChoice) -> DeleteScope {
    match choice {
        ScopeChoice::ThisOccurrence if target.repeat_weekly => DeleteScope::SingleOccurrence,
        _ => DeleteScope::WholeDefinition,
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidScope {
    #[error("Invalid scope: {0}, expected `this` or `all`")]
    Malformed(String),
}

impl FromStr for ScopeChoice {
    type Err = InvalidScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "this" => Ok(Self::ThisOccurrence),
            "all" => Ok(Self::AllOccurrences),
            _ => Err(InvalidScope::Malformed(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn definition(repeat_weekly: bool) -> EventDefinition {
        EventDefinition {
            id: 1,
            title: "Lesson".into(),
            start: "2024-06-03T18:00:00Z".parse().unwrap(),
            end: "2024-06-03T19:00:00Z".parse().unwrap(),
            members: "".into(),
            repeat_weekly,
        }
    }

    #[test]
    fn resolves_mutation_scopes() {
        let single = definition(false);
        let series = definition(true);

        assert_eq!(
            resolve_mutation_scope(None, ScopeChoice::AllOccurrences, None),
            MutationScope::Create
        );
        for choice in [ScopeChoice::ThisOccurrence, ScopeChoice::AllOccurrences] {
            assert_eq!(
                resolve_mutation_scope(Some(&single), choice, None),
                MutationScope::UpdateNonRecurring
            );
            assert_eq!(
                resolve_mutation_scope(Some(&single), choice, Some(KeepOccurrence::AnchorOccurrence)),
                MutationScope::UpdateNonRecurring
            );
        }
        assert_eq!(
            resolve_mutation_scope(Some(&series), ScopeChoice::ThisOccurrence, None),
            MutationScope::UpdateSingleOccurrence
        );
        assert_eq!(
            resolve_mutation_scope(Some(&series), ScopeChoice::AllOccurrences, None),
            MutationScope::UpdateAllOccurrences
        );
        assert_eq!(
            resolve_mutation_scope(
                Some(&series),
                ScopeChoice::ThisOccurrence,
                Some(KeepOccurrence::ThisOccurrence)
            ),
            MutationScope::ConvertToSingle(KeepOccurrence::ThisOccurrence)
        );
    }

    #[test]
    fn resolves_delete_scopes() {
        assert_eq!(
            resolve_delete_scope(&definition(true), ScopeChoice::ThisOccurrence),
            DeleteScope::SingleOccurrence
        );
        assert_eq!(
            resolve_delete_scope(&definition(true), ScopeChoice::AllOccurrences),
            DeleteScope::WholeDefinition
        );
        assert_eq!(
            resolve_delete_scope(&definition(false), ScopeChoice::ThisOccurrence),
            DeleteScope::WholeDefinition
        );
    }

    #[test]
    fn parses_scope_choice() {
        assert_eq!("this".parse::<ScopeChoice>(), Ok(ScopeChoice::ThisOccurrence));
        assert_eq!("ALL".parse::<ScopeChoice>(), Ok(ScopeChoice::AllOccurrences));
        assert!("some".parse::<ScopeChoice>().is_err());
    }
}
