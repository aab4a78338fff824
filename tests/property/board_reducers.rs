//! Property-based tests for the board reducers.
//!
//! Uses proptest to verify, for arbitrary boards:
//! 1. Creating a task adds exactly one task, in the named column.
//! 2. Deleting removes the id everywhere and is idempotent.
//! 3. Moving leaves the task in exactly the target column.
//! 4. A rejected reducer produces nothing and the input board never changes.
//! 5. Any sequence of operations keeps task ids unique.

use std::collections::HashSet;

use proptest::prelude::*;
use taskgrid::board::Board;
use taskgrid_proto::{Column, ColumnId, NewTask, TaskId};

const COLUMN_IDS: [&str; 4] = ["todo", "doing", "done", "review"];

/// Strategy for a board with 1..=4 columns and up to 12 uniquely-named tasks.
fn arb_board() -> impl Strategy<Value = Board> {
    (1usize..=4, prop::collection::vec(0usize..4, 0..12)).prop_map(|(n_columns, placements)| {
        let mut columns: Vec<Column> = COLUMN_IDS[..n_columns]
            .iter()
            .map(|id| Column::new(*id, id.to_uppercase()))
            .collect();
        for (i, slot) in placements.into_iter().enumerate() {
            let column = &mut columns[slot % n_columns];
            let task = NewTask::new(format!("Task {i}"), column.id.clone())
                .into_task(TaskId::new(i.to_string()));
            column.tasks.push(task);
        }
        Board::new(columns)
    })
}

fn task_ids(board: &Board) -> Vec<TaskId> {
    board
        .columns()
        .iter()
        .flat_map(|c| c.tasks.iter().map(|t| t.id.clone()))
        .collect()
}

fn holders(board: &Board, id: &TaskId) -> usize {
    board.columns().iter().filter(|c| c.contains(id)).count()
}

#[derive(Debug, Clone)]
enum Op {
    Create(usize),
    Delete(usize),
    Move(usize, usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Create),
        (0usize..16).prop_map(Op::Delete),
        (0usize..16, 0usize..4).prop_map(|(t, c)| Op::Move(t, c)),
    ]
}

proptest! {
    #[test]
    fn create_adds_one_task_to_named_column(board in arb_board(), slot in 0usize..4) {
        let column = board.columns()[slot % board.columns().len()].id.clone();
        let task = NewTask::new("New", column.clone()).into_task(TaskId::from("new"));

        let next = board.with_task_created(task).unwrap();

        prop_assert_eq!(next.task_count(), board.task_count() + 1);
        prop_assert_eq!(next.column_of(&TaskId::from("new")), Some(&column));
        prop_assert_eq!(
            next.column(&column).unwrap().tasks.last().map(|t| t.id.as_str()),
            Some("new")
        );
    }

    #[test]
    fn delete_removes_everywhere_and_is_idempotent(board in arb_board(), pick in 0usize..16) {
        let id = TaskId::new(pick.to_string());
        let once = board.without_task(&id);
        prop_assert_eq!(holders(&once, &id), 0);
        prop_assert_eq!(
            once.task_count(),
            board.task_count() - usize::from(board.task(&id).is_some())
        );
        prop_assert_eq!(once.without_task(&id), once);
    }

    #[test]
    fn move_lands_in_exactly_the_target(
        board in arb_board(),
        pick in 0usize..16,
        slot in 0usize..4,
    ) {
        let id = TaskId::new(pick.to_string());
        let target = board.columns()[slot % board.columns().len()].id.clone();
        let next = board.with_task_moved(&id, &target).unwrap();

        prop_assert_eq!(next.task_count(), board.task_count());
        if board.task(&id).is_some() {
            prop_assert_eq!(holders(&next, &id), 1);
            prop_assert_eq!(next.column_of(&id), Some(&target));
            prop_assert_eq!(&next.task(&id).unwrap().column_id, &target);
            prop_assert_eq!(
                next.column(&target).unwrap().tasks.last().map(|t| &t.id),
                Some(&id)
            );
        } else {
            prop_assert_eq!(next, board);
        }
    }

    #[test]
    fn rejected_reducers_change_nothing(board in arb_board(), pick in 0usize..16) {
        let before = board.clone();
        let archive = ColumnId::from("archive");
        let id = TaskId::new(pick.to_string());

        prop_assert!(board.with_task_moved(&id, &archive).is_err());
        let orphan = NewTask::new("Orphan", archive).into_task(TaskId::from("orphan"));
        prop_assert!(board.with_task_created(orphan).is_err());
        prop_assert_eq!(board, before);
    }

    #[test]
    fn ids_stay_unique(board in arb_board(), ops in prop::collection::vec(arb_op(), 0..24)) {
        let mut board = board;
        let mut fresh = 100usize;
        for op in ops {
            let n_columns = board.columns().len();
            if n_columns == 0 {
                break;
            }
            board = match op {
                Op::Create(slot) => {
                    fresh += 1;
                    let column = board.columns()[slot % n_columns].id.clone();
                    let task = NewTask::new("Generated", column)
                        .into_task(TaskId::new(fresh.to_string()));
                    board.with_task_created(task).unwrap()
                }
                Op::Delete(pick) => board.without_task(&TaskId::new(pick.to_string())),
                Op::Move(pick, slot) => {
                    let target = board.columns()[slot % n_columns].id.clone();
                    board.with_task_moved(&TaskId::new(pick.to_string()), &target).unwrap()
                }
            };

            let ids = task_ids(&board);
            let unique: HashSet<&TaskId> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
            for column in board.columns() {
                for task in &column.tasks {
                    prop_assert_eq!(&task.column_id, &column.id);
                }
            }
        }
    }
}
