//! Property tests over random games, stakes and payouts.

use std::collections::HashSet;

use proptest::prelude::*;

use crowd_connect_four::game::DropResult;
use crowd_connect_four::ledger::StakeLedger;
use crowd_connect_four::payout::{PayoutCalculator, UnbackedPoolPolicy};
use crowd_connect_four::{
    Board, Cell, GameOutcome, MoveId, Notification, Participant, RoundCoordinator, Side, COLS, ROWS,
};

/// 42 moves that fill the board without either side connecting four.
const DRAW_SEQUENCE: [usize; 42] = [
    5, 3, 2, 3, 1, 5, 3, 1, 0, 1, 4, 1, 2, 5, 0, 5, 6, 6, 2, 0, 6, 0, 4, 2, 3, 0, 3, 4, 2, 3, 2,
    6, 0, 4, 1, 1, 5, 4, 4, 5, 6, 6,
];

/// Brute force: any four equal non-empty cells in a row, column or diagonal.
fn has_four(board: &Board) -> bool {
    let dirs: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
    for r in 0..ROWS as isize {
        for c in 0..COLS as isize {
            let first = board.get(r as usize, c as usize);
            if first == Cell::Empty {
                continue;
            }
            for (dr, dc) in dirs {
                let all = (1..4).all(|k| {
                    let (rr, cc) = (r + dr * k, c + dc * k);
                    (0..ROWS as isize).contains(&rr)
                        && (0..COLS as isize).contains(&cc)
                        && board.get(rr as usize, cc as usize) == first
                });
                if all {
                    return true;
                }
            }
        }
    }
    false
}

/// Pieces of the drawn final position, bottom first, optionally mirrored.
fn drawn_stacks(mirror: bool) -> [Vec<Side>; COLS] {
    let mut stacks: [Vec<Side>; COLS] = Default::default();
    let mut side = Side::A;
    for col in DRAW_SEQUENCE {
        let col = if mirror { COLS - 1 - col } else { col };
        stacks[col].push(side);
        side = side.other();
    }
    stacks
}

/// Find an alternating move order that builds `stacks`, steering each choice
/// with `picks`. Every prefix of such an order is a subset of a position
/// with no four in a row, so the whole game is win-free.
fn draw_order(stacks: &[Vec<Side>; COLS], picks: &[usize]) -> Option<Vec<usize>> {
    fn search(
        stacks: &[Vec<Side>; COLS],
        picks: &[usize],
        heights: &mut [usize; COLS],
        order: &mut Vec<usize>,
        dead: &mut HashSet<[usize; COLS]>,
    ) -> bool {
        if order.len() == ROWS * COLS {
            return true;
        }
        if dead.contains(&*heights) {
            return false;
        }
        let side = if order.len() % 2 == 0 { Side::A } else { Side::B };
        let candidates: Vec<usize> = (0..COLS)
            .filter(|&c| stacks[c].get(heights[c]) == Some(&side))
            .collect();
        let offset = picks[order.len() % picks.len()];
        for i in 0..candidates.len() {
            let col = candidates[(offset + i) % candidates.len()];
            heights[col] += 1;
            order.push(col);
            if search(stacks, picks, heights, order, dead) {
                return true;
            }
            order.pop();
            heights[col] -= 1;
        }
        dead.insert(*heights);
        false
    }

    let mut heights = [0; COLS];
    let mut order = Vec::with_capacity(ROWS * COLS);
    let mut dead = HashSet::new();
    search(stacks, picks, &mut heights, &mut order, &mut dead).then_some(order)
}

fn stake_strategy() -> impl Strategy<Value = Vec<(u8, u8, u64)>> {
    prop::collection::vec((0u8..6, 0u8..2, 1u64..1_000_000_000), 0..40)
}

fn ledger_from(stakes: &[(u8, u8, u64)]) -> StakeLedger {
    let mut ledger = StakeLedger::new();
    for &(who, side, amount) in stakes {
        let side = Side::from_index(side).unwrap();
        ledger
            .stake(Participant::new(format!("p{who}")), side, amount)
            .unwrap();
    }
    ledger
}

proptest! {
    #[test]
    fn prop_drop_detects_first_win(cols in prop::collection::vec(0usize..COLS, 0..120)) {
        let mut board = Board::new();
        let mut side = Side::A;
        for col in cols {
            if board.is_column_full(col) {
                prop_assert!(board.drop_piece(col, side).is_err());
                continue;
            }
            let DropResult { triggers_win, .. } = board.drop_piece(col, side).unwrap();
            prop_assert_eq!(triggers_win, has_four(&board));
            if triggers_win {
                return Ok(());
            }
            side = side.other();
        }
        if board.is_full() {
            prop_assert_eq!(board.piece_count(), ROWS * COLS);
            prop_assert!(board.valid_columns().is_empty());
        }
    }

    #[test]
    fn prop_engine_games_end_once(cols in prop::collection::vec(0usize..COLS, 0..200)) {
        let mut engine = RoundCoordinator::default();
        let first = engine.current_round_id();
        for col in cols {
            let round_id = engine.current_round_id();
            let eligible = engine.valid_moves(round_id).unwrap();
            let result = engine.vote(round_id, col, Participant::from("crowd"));
            prop_assert_eq!(result.is_ok(), eligible[col]);
        }
        for round in engine.closed_rounds() {
            prop_assert!(round.outcome().is_some());
            match round.outcome() {
                Some(GameOutcome::Draw) => prop_assert!(round.board().is_full()),
                _ => prop_assert!(round.moves_played() >= 7),
            }
        }
        let finished = engine.current_round_id().0 - first.0;
        prop_assert_eq!(engine.closed_rounds().count() as u64, finished);
    }

    #[test]
    fn prop_side_totals_sum_to_pool(stakes in stake_strategy()) {
        let ledger = ledger_from(&stakes);
        let sum: u64 = stakes.iter().map(|s| s.2).sum();
        prop_assert_eq!(ledger.side_total(Side::A) + ledger.side_total(Side::B), ledger.total_pool());
        prop_assert_eq!(ledger.total_pool(), sum);
    }

    #[test]
    fn prop_payouts_conserve_pool(
        stakes in stake_strategy(),
        winner in 0u8..3,
        refund in any::<bool>(),
    ) {
        let ledger = ledger_from(&stakes);
        let outcome = match winner {
            0 => GameOutcome::Winner(Side::A),
            1 => GameOutcome::Winner(Side::B),
            _ => GameOutcome::Draw,
        };
        let policy = if refund { UnbackedPoolPolicy::Refund } else { UnbackedPoolPolicy::Retain };
        let payouts = PayoutCalculator::new(policy).compute(&ledger, outcome);

        prop_assert_eq!(payouts.total_paid() + payouts.dust + payouts.retained, ledger.total_pool());
        prop_assert!(payouts.dust < payouts.amounts.len().max(1) as u64);

        if let GameOutcome::Winner(side) = outcome {
            if ledger.side_total(side) > 0 {
                for (participant, amount) in &payouts.amounts {
                    prop_assert!(*amount >= ledger.staked_by(participant, side));
                    prop_assert!(ledger.staked_by(participant, side) > 0);
                }
            }
        }
    }

    #[test]
    fn prop_win_free_orders_fill_the_board(
        mirror in any::<bool>(),
        picks in prop::collection::vec(0usize..COLS, 1..42),
    ) {
        let stacks = drawn_stacks(mirror);
        let order = draw_order(&stacks, &picks).unwrap();

        let mut board = Board::new();
        let mut side = Side::A;
        for (i, &col) in order.iter().enumerate() {
            prop_assert!(!board.is_full());
            let DropResult { triggers_win, .. } = board.drop_piece(col, side).unwrap();
            prop_assert!(!triggers_win, "win at move {}", i);
            prop_assert!(!has_four(&board));
            side = side.other();
        }
        prop_assert!(board.is_full());
        prop_assert_eq!(board.piece_count(), ROWS * COLS);
        prop_assert!(board.valid_columns().is_empty());
        for col in 0..COLS {
            prop_assert!(board.drop_piece(col, side).is_err());
        }

        let mut engine = RoundCoordinator::default();
        let round_id = engine.current_round_id();
        let mut last = Vec::new();
        for &col in &order {
            last = engine.vote(round_id, col, Participant::from("crowd")).unwrap();
        }
        let expected_drawn = Notification::GameDrawn { round_id, move_id: MoveId(41) };
        prop_assert!(last.contains(&expected_drawn));
        prop_assert_eq!(engine.round(round_id).unwrap().outcome(), Some(GameOutcome::Draw));
    }
}
