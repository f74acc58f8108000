use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::scene::SceneId;

/// Newtype wrapper for choice ids. Minted by the owning story graph and
/// stable for the lifetime of an authoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceId(pub u64);

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a choice sends the player.
///
/// `End` is the reserved destination that finishes the story on purpose. A
/// choice whose `next` field is still `None` has simply never been wired
/// up; a playthrough treats it like `End`, but the two states stay
/// distinct so authoring surfaces can tell "ends here" from "not written
/// yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    End,
    Scene(SceneId),
}

/// A player-facing option attached to a scene.
///
/// Consequences are signed deltas applied to the stat sheet when the
/// choice is taken. Requirements are minimum stat thresholds (inclusive);
/// every entry must hold for the choice to be selectable. A destination
/// pointing at a scene that no longer exists is legal during authoring and
/// resolves to an ending at playthrough time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
    #[serde(default)]
    pub next: Option<Destination>,
    #[serde(default)]
    pub consequences: HashMap<String, i64>,
    #[serde(default)]
    pub requirements: HashMap<String, i64>,
    /// Position within the owning scene's choice list. Kept as a
    /// permutation of 0..n-1 by the reorder engine.
    pub order_index: usize,
}

impl Choice {
    /// True when taking this choice ends the story: the explicit `End`
    /// sentinel or a destination that was never set.
    pub fn is_ending(&self) -> bool {
        matches!(self.next, None | Some(Destination::End))
    }

    /// The scene this choice leads to, when it leads to one at all.
    pub fn next_scene(&self) -> Option<SceneId> {
        match self.next {
            Some(Destination::Scene(id)) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_choice(next: Option<Destination>) -> Choice {
        Choice {
            id: ChoiceId(1),
            text: "Go on".to_string(),
            next,
            consequences: HashMap::new(),
            requirements: HashMap::new(),
            order_index: 0,
        }
    }

    #[test]
    fn unset_and_end_both_count_as_endings() {
        assert!(make_choice(None).is_ending());
        assert!(make_choice(Some(Destination::End)).is_ending());
        assert!(!make_choice(Some(Destination::Scene(SceneId(2)))).is_ending());
    }

    #[test]
    fn next_scene_only_for_scene_destinations() {
        assert_eq!(make_choice(None).next_scene(), None);
        assert_eq!(make_choice(Some(Destination::End)).next_scene(), None);
        assert_eq!(
            make_choice(Some(Destination::Scene(SceneId(7)))).next_scene(),
            Some(SceneId(7))
        );
    }

    #[test]
    fn omitted_fields_deserialize_to_defaults() {
        let choice: Choice = ron::from_str(r#"(id: 3, text: "Wait", order_index: 0)"#).unwrap();
        assert_eq!(choice.id, ChoiceId(3));
        assert_eq!(choice.next, None);
        assert!(choice.consequences.is_empty());
        assert!(choice.requirements.is_empty());
    }

    #[test]
    fn ron_round_trip_keeps_destination_shape() {
        let choice = Choice {
            next: Some(Destination::Scene(SceneId(9))),
            ..make_choice(None)
        };
        let text = ron::to_string(&choice).unwrap();
        let back: Choice = ron::from_str(&text).unwrap();
        assert_eq!(back, choice);
        assert_eq!(back.next, Some(Destination::Scene(SceneId(9))));
    }
}
