use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use crate::board::Board;
use crate::solution::Solution;
use crate::solver::{solve_area, Propagator, SolveFailure};

/// How long a blocked thread waits on a queue before rechecking the stop flag.
const POLL: Duration = Duration::from_millis(10);

/// Shared coordination state for one search: the work queue of pending partial
/// solutions, the result slot holding at most one final solution, the count of
/// branches queued or in flight, and the cooperative stop flag.
struct Pool<'a> {
    board: &'a Board,
    work_tx: Sender<Solution>,
    work_rx: Receiver<Solution>,
    result_tx: Sender<Solution>,
    outstanding: AtomicUsize,
    stop: AtomicBool,
}

/// Complete a partial solution that propagation could not finish, distributing
/// branch exploration over a fixed pool of worker threads.
///
/// The first worker to certify a complete solution publishes it and raises the
/// stop flag; the flag is checked at every loop iteration, so siblings wind
/// down cooperatively rather than being killed. If the queue drains with no
/// result, the whole search is unsatisfiable.
pub(crate) fn search(board: &Board, seed: Solution) -> Result<Solution, SolveFailure> {
    let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
    let (work_tx, work_rx) = unbounded();
    let (result_tx, result_rx) = bounded(1);

    let pool = Pool {
        board,
        work_tx,
        work_rx,
        result_tx,
        outstanding: AtomicUsize::new(1),
        stop: AtomicBool::new(false),
    };

    if pool.work_tx.send(seed).is_err() {
        return Err(SolveFailure::Unsatisfiable);
    }

    debug!(workers, "starting parallel search");

    let found = thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| worker(&pool));
        }

        loop {
            match result_rx.recv_timeout(POLL) {
                Ok(solution) => {
                    pool.stop.store(true, Ordering::SeqCst);
                    break Some(solution);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if pool.stop.load(Ordering::SeqCst) {
                        // either the queue drained dry, or a result landed
                        // between our poll and the flag; drain to be sure
                        break result_rx.try_recv().ok();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break None,
            }
        }
    });

    found.ok_or(SolveFailure::Unsatisfiable)
}

fn worker(pool: &Pool<'_>) {
    while !pool.stop.load(Ordering::SeqCst) {
        let solution = match pool.work_rx.recv_timeout(POLL) {
            Ok(solution) => solution,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        };

        // a fault in one branch must not take down its siblings; the branch
        // simply yields nothing
        if catch_unwind(AssertUnwindSafe(|| explore(pool, solution))).is_err() {
            warn!("search worker panicked; branch abandoned");
        }

        if pool.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            // queue exhausted with nothing published
            pool.stop.store(true, Ordering::SeqCst);
        }
    }
}

/// Process one branch: publish it if it is done, otherwise split on the
/// unsolved area with the fewest unknown cells and requeue the survivors.
fn explore(pool: &Pool<'_>, solution: Solution) {
    let board = pool.board;

    if solution.is_complete() {
        if solution.verify(board) {
            publish(pool, solution);
        }
        return;
    }

    let Some(area) = (0..board.areas().len())
        .filter(|id| solution.count_in_area(board, *id, None) > 0)
        .min_by_key(|id| solution.count_in_area(board, *id, None))
    else {
        return;
    };

    let mut base = solution;
    let candidates = solve_area(board, area, &mut base);
    let propagator = Propagator::new(board);

    for candidate in candidates {
        if pool.stop.load(Ordering::SeqCst) {
            return;
        }

        let mut branch = base.clone();
        branch.apply_known_cells(board, &candidate);

        if propagator.propagate(&mut branch).is_err() {
            // dead branch; discarded, not requeued
            continue;
        }

        if branch.is_complete() {
            if branch.verify(board) {
                publish(pool, branch);
                return;
            }
            continue;
        }

        pool.outstanding.fetch_add(1, Ordering::SeqCst);
        if pool.work_tx.send(branch).is_err() {
            pool.outstanding.fetch_sub(1, Ordering::SeqCst);
            return;
        }
    }
}

fn publish(pool: &Pool<'_>, solution: Solution) {
    // first writer wins; the slot never holds more than one solution
    let _ = pool.result_tx.try_send(solution);
    pool.stop.store(true, Ordering::SeqCst);
}
