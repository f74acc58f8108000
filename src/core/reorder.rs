//! Drag-and-drop reordering for a scene's choice list.
//!
//! Everything here is a pure list transformation: the UI reports row
//! indices and pointer geometry, this module decides whether a drag has
//! earned a move yet and applies it. Out-of-range indices are clamped
//! rather than rejected, so there are no failure modes.

use crate::schema::choice::Choice;

/// Decide whether a drag gesture should commit a move.
///
/// `pointer_y` is the pointer's vertical offset inside the hovered row,
/// measured from the row's top edge, and `row_height` is that row's
/// height. The rule is midpoint hysteresis: dragging downward commits only
/// once the pointer is past the hovered row's midpoint, dragging upward
/// only while it is still above the midpoint. Sitting exactly on the
/// midpoint commits nothing in either direction, and hovering the dragged
/// row itself never moves.
pub fn should_move(drag_index: usize, hover_index: usize, pointer_y: f32, row_height: f32) -> bool {
    if drag_index == hover_index {
        return false;
    }
    let midpoint = row_height / 2.0;
    if drag_index < hover_index {
        pointer_y > midpoint
    } else {
        pointer_y < midpoint
    }
}

/// Move the choice at `from` so it lands at `to`, then renumber the whole
/// list. Indices are clamped to the list bounds; a move that resolves to
/// its own position leaves the list untouched. Returns whether anything
/// changed.
pub fn move_choice(choices: &mut Vec<Choice>, from: usize, to: usize) -> bool {
    if choices.is_empty() {
        return false;
    }
    let last = choices.len() - 1;
    let from = from.min(last);
    let to = to.min(last);
    if from == to {
        return false;
    }
    let moved = choices.remove(from);
    choices.insert(to, moved);
    renumber(choices);
    true
}

/// Rewrite `order_index` to match list position across the whole list.
///
/// Mandatory after any structural change. Deletion in particular leaves a
/// hole in the indices until the caller invokes this.
pub fn renumber(choices: &mut [Choice]) {
    for (position, choice) in choices.iter_mut().enumerate() {
        choice.order_index = position;
    }
}

/// Feed one drag-move event through the hysteresis rule, committing the
/// move when it passes. Returns whether the list changed.
pub fn drag_update(
    choices: &mut Vec<Choice>,
    drag_index: usize,
    hover_index: usize,
    pointer_y: f32,
    row_height: f32,
) -> bool {
    if !should_move(drag_index, hover_index, pointer_y, row_height) {
        return false;
    }
    move_choice(choices, drag_index, hover_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::choice::ChoiceId;

    fn make_choices(count: usize) -> Vec<Choice> {
        (0..count)
            .map(|i| Choice {
                id: ChoiceId(i as u64 + 1),
                text: format!("Choice {}", i + 1),
                next: None,
                consequences: Default::default(),
                requirements: Default::default(),
                order_index: i,
            })
            .collect()
    }

    fn ids(choices: &[Choice]) -> Vec<u64> {
        choices.iter().map(|choice| choice.id.0).collect()
    }

    #[test]
    fn downward_drag_commits_only_past_the_midpoint() {
        assert!(!should_move(0, 1, 10.0, 40.0));
        assert!(!should_move(0, 1, 20.0, 40.0));
        assert!(should_move(0, 1, 25.0, 40.0));
    }

    #[test]
    fn upward_drag_commits_only_above_the_midpoint() {
        assert!(should_move(2, 1, 10.0, 40.0));
        assert!(!should_move(2, 1, 20.0, 40.0));
        assert!(!should_move(2, 1, 30.0, 40.0));
    }

    #[test]
    fn hovering_the_dragged_row_never_moves() {
        assert!(!should_move(1, 1, 0.0, 40.0));
        assert!(!should_move(1, 1, 39.0, 40.0));
    }

    #[test]
    fn move_down_and_up_land_at_the_target() {
        let mut choices = make_choices(3);
        assert!(move_choice(&mut choices, 0, 2));
        assert_eq!(ids(&choices), vec![2, 3, 1]);

        let mut choices = make_choices(3);
        assert!(move_choice(&mut choices, 2, 0));
        assert_eq!(ids(&choices), vec![3, 1, 2]);
    }

    #[test]
    fn move_renumbers_to_list_position() {
        let mut choices = make_choices(4);
        move_choice(&mut choices, 3, 1);
        let indices: Vec<usize> = choices.iter().map(|c| c.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(ids(&choices), vec![1, 4, 2, 3]);
    }

    #[test]
    fn out_of_range_indices_clamp_to_the_last_row() {
        let mut choices = make_choices(3);
        assert!(move_choice(&mut choices, 0, 99));
        assert_eq!(ids(&choices), vec![2, 3, 1]);

        // Both out of range: they clamp to the same row, so nothing moves.
        let mut choices = make_choices(3);
        assert!(!move_choice(&mut choices, 7, 99));
        assert_eq!(ids(&choices), vec![1, 2, 3]);

        let mut empty: Vec<Choice> = Vec::new();
        assert!(!move_choice(&mut empty, 0, 1));
    }

    #[test]
    fn moving_onto_itself_changes_nothing() {
        let mut choices = make_choices(3);
        choices[1].order_index = 7; // a stale index survives a no-op move
        assert!(!move_choice(&mut choices, 1, 1));
        assert_eq!(choices[1].order_index, 7);
    }

    #[test]
    fn every_move_keeps_indices_a_permutation() {
        for from in 0..5 {
            for to in 0..5 {
                let mut choices = make_choices(5);
                move_choice(&mut choices, from, to);
                let mut indices: Vec<usize> =
                    choices.iter().map(|choice| choice.order_index).collect();
                indices.sort_unstable();
                assert_eq!(indices, vec![0, 1, 2, 3, 4], "from {from} to {to}");
            }
        }
    }

    #[test]
    fn deletion_leaves_a_hole_until_renumbered() {
        let mut choices = make_choices(3);
        choices.retain(|choice| choice.id != ChoiceId(2));
        let indices: Vec<usize> = choices.iter().map(|c| c.order_index).collect();
        assert_eq!(indices, vec![0, 2]);

        renumber(&mut choices);
        let indices: Vec<usize> = choices.iter().map(|c| c.order_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn stepwise_downward_drag_matches_the_pointer() {
        // Dragging the first row toward the bottom of a three-row list, one
        // hover event at a time, with 40px rows.
        let mut choices = make_choices(3);

        // Pointer enters row 1 but has not crossed its midpoint.
        assert!(!drag_update(&mut choices, 0, 1, 12.0, 40.0));
        assert_eq!(ids(&choices), vec![1, 2, 3]);

        // Past the midpoint of row 1: the drag commits one step.
        assert!(drag_update(&mut choices, 0, 1, 28.0, 40.0));
        assert_eq!(ids(&choices), vec![2, 1, 3]);

        // The dragged choice now sits at index 1; crossing row 2's midpoint
        // commits the second step.
        assert!(!drag_update(&mut choices, 1, 2, 15.0, 40.0));
        assert!(drag_update(&mut choices, 1, 2, 31.0, 40.0));
        assert_eq!(ids(&choices), vec![2, 3, 1]);
    }
}
