//! Workflow definitions rendered by the diagram views.
//!
//! States and transitions are displayed as returned by the backend; the graph
//! is not checked for reachability or orphaned final states here.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub id: i64,
    pub state_name: String,
    #[serde(default)]
    pub state_description: Option<String>,
    #[serde(default)]
    pub is_initial: bool,
    #[serde(default)]
    pub is_final: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTransition {
    pub id: i64,
    pub event_name: String,
    pub source_state_id: i64,
    pub target_state_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub states: Vec<WorkflowState>,
    #[serde(default)]
    pub transitions: Vec<WorkflowTransition>,
}

/// Transition offered from a given state, resolved to its target state.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AvailableTransition {
    pub event_name: String,
    pub target_state_id: i64,
    pub target_state_name: String,
}

impl Workflow {
    pub fn state(&self, id: i64) -> Option<&WorkflowState> {
        self.states.iter().find(|state| state.id == id)
    }

    /// Outgoing transitions of `state_id` whose target state is known.
    pub fn transitions_from(&self, state_id: i64) -> Vec<AvailableTransition> {
        self.transitions
            .iter()
            .filter(|transition| transition.source_state_id == state_id)
            .filter_map(|transition| {
                self.state(transition.target_state_id)
                    .map(|target| AvailableTransition {
                        event_name: transition.event_name.clone(),
                        target_state_id: target.id,
                        target_state_name: target.state_name.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> Workflow {
        serde_json::from_str(
            r#"{
                "id": 1,
                "name": "Support",
                "states": [
                    {"id": 10, "stateName": "New", "isInitial": true},
                    {"id": 11, "stateName": "In progress"},
                    {"id": 12, "stateName": "Done", "isFinal": true}
                ],
                "transitions": [
                    {"id": 1, "eventName": "Start", "sourceStateId": 10, "targetStateId": 11},
                    {"id": 2, "eventName": "Finish", "sourceStateId": 11, "targetStateId": 12},
                    {"id": 3, "eventName": "Dangling", "sourceStateId": 11, "targetStateId": 99}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_outgoing_transitions() {
        let workflow = workflow();
        assert_eq!(workflow.state(10).map(|s| s.is_initial), Some(true));

        let next = workflow.transitions_from(11);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].target_state_name, "Done");
        assert!(workflow.transitions_from(12).is_empty());
    }
}
