mod common;

use common::assert_well_formed;
use pathsim::{CellStatus, Coord, SessionController, SessionPhase};
use std::time::{Duration, Instant};

fn session_with_endpoints(
    cols: i32,
    rows: i32,
    start: Coord,
    goal: Coord,
    delay_ms: u64,
) -> SessionController {
    let mut session =
        SessionController::new(cols, rows).with_visit_delay(Duration::from_millis(delay_ms));
    session.select_endpoint(start).unwrap();
    session.select_endpoint(goal).unwrap();
    session
}

/// Poll like the frame loop does until the run ends
fn poll_until_settled(session: &mut SessionController) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while session.phase() == SessionPhase::Running {
        assert!(Instant::now() < deadline, "search did not finish in time");
        session.poll();
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn completed_search_keeps_only_the_route_on_screen() {
    let mut session = session_with_endpoints(5, 5, Coord::new(0, 0), Coord::new(4, 4), 0);
    session.start_search().unwrap();
    assert_eq!(session.phase(), SessionPhase::Running);
    poll_until_settled(&mut session);

    assert_eq!(session.phase(), SessionPhase::Completed);
    assert_eq!(session.route(), &(0..5).map(|i| Coord::new(i, i)).collect::<Vec<_>>()[..]);
    assert!(session.frontier().is_empty());
    let cost = session.route_cost().unwrap();
    assert!((cost - 4.0 * std::f64::consts::SQRT_2).abs() < 1e-9);

    let cells = session.renderable_cells();
    assert_eq!(cells.len(), 25);
    assert!(cells.iter().all(|c| !c.is_frontier));
    assert_eq!(cells.iter().filter(|c| c.is_route).count(), 5);
}

#[test]
fn painting_while_running_is_ignored() {
    let mut session = session_with_endpoints(50, 50, Coord::new(0, 0), Coord::new(49, 49), 1);
    session.paint_cell(Coord::new(10, 10), true).unwrap();
    session.start_search().unwrap();
    let revision = session.grid().revision();
    let before = session.grid().clone();

    for i in 0..20 {
        assert!(!session.paint_cell(Coord::new(20 + i, 25), true).unwrap());
        assert!(!session.paint_cell(Coord::new(10, 10), false).unwrap());
        session.poll();
    }
    // Render state can be read mid-run
    assert_eq!(session.renderable_cells().len(), 2500);

    assert_eq!(session.phase(), SessionPhase::Running);
    assert_eq!(session.grid(), &before);
    assert_eq!(session.grid().revision(), revision);
    assert!(!session.is_painted(Coord::new(20, 25)));
    assert!(session.is_painted(Coord::new(10, 10)));

    assert!(session.cancel());
    assert_eq!(session.phase(), SessionPhase::Cancelled);
    assert!(session.paint_cell(Coord::new(20, 25), true).unwrap());
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[test]
fn cancel_discards_partial_frontier() {
    let mut session = session_with_endpoints(30, 30, Coord::new(0, 0), Coord::new(29, 29), 2);
    session.start_search().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    session.poll();
    assert_eq!(session.phase(), SessionPhase::Running);
    assert!(!session.frontier().is_empty());

    assert!(session.cancel());
    assert_eq!(session.phase(), SessionPhase::Cancelled);
    assert!(session.frontier().is_empty());
    assert!(session.route().is_empty());
    assert!(session.renderable_cells().iter().all(|c| !c.is_frontier && !c.is_route));
    assert!(!session.cancel());
}

#[test]
fn restart_while_running_uses_new_endpoints() {
    let mut session = session_with_endpoints(12, 12, Coord::new(0, 0), Coord::new(11, 11), 1);
    session.start_search().unwrap();

    // Re-selection is allowed mid-run; the old run keeps its own endpoints
    session.select_endpoint(Coord::new(0, 5)).unwrap();
    assert_eq!(session.phase(), SessionPhase::Running);
    assert_eq!(session.endpoints(), vec![Coord::new(11, 11), Coord::new(0, 5)]);

    session.start_search().unwrap();
    session.wait();
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert_well_formed(session.route(), Coord::new(11, 11), Coord::new(0, 5), session.grid());
}

#[test]
fn endpoint_change_mid_run_drops_the_stale_route() {
    let mut session = session_with_endpoints(12, 12, Coord::new(0, 0), Coord::new(11, 11), 1);
    session.start_search().unwrap();
    session.select_endpoint(Coord::new(0, 5)).unwrap();
    assert_eq!(session.phase(), SessionPhase::Running);

    // The old run finishes with a route between endpoints no longer selected
    session.wait();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.route().is_empty());
    assert!(session.frontier().is_empty());
    assert_eq!(session.route_cost(), None);
    assert!(session.renderable_cells().iter().all(|c| !c.is_frontier && !c.is_route));
    assert_eq!(session.endpoints(), vec![Coord::new(11, 11), Coord::new(0, 5)]);
    assert_eq!(session.grid().status(Coord::new(0, 0)).unwrap(), CellStatus::Open);

    session.start_search().unwrap();
    session.wait();
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert_well_formed(session.route(), Coord::new(11, 11), Coord::new(0, 5), session.grid());
}

#[test]
fn wall_gap_detour_end_to_end() {
    let mut session = SessionController::new(5, 5);
    for row in 0..4 {
        session.paint_cell(Coord::new(2, row), true).unwrap();
    }
    session.select_endpoint(Coord::new(0, 0)).unwrap();
    session.select_endpoint(Coord::new(4, 0)).unwrap();
    session.start_search().unwrap();
    session.wait();
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert!(session.route().contains(&Coord::new(2, 4)));
}

#[test]
fn walled_off_goal_is_unreachable() {
    let mut session = SessionController::new(6, 6);
    for coord in [(3, 3), (4, 3), (5, 3), (3, 4), (3, 5)] {
        session.paint_cell(Coord::new(coord.0, coord.1), true).unwrap();
    }
    session.select_endpoint(Coord::new(0, 0)).unwrap();
    session.select_endpoint(Coord::new(5, 5)).unwrap();
    session.start_search().unwrap();
    session.wait();
    assert_eq!(session.phase(), SessionPhase::Unreachable);
    assert!(session.route().is_empty());
    assert!(session.frontier().is_empty());
}

#[test]
fn painted_endpoint_reports_unreachable() {
    let mut session = SessionController::new(5, 5);
    session.paint_cell(Coord::new(1, 1), true).unwrap();
    session.select_endpoint(Coord::new(1, 1)).unwrap();
    session.select_endpoint(Coord::new(3, 3)).unwrap();
    session.start_search().unwrap();
    assert_eq!(session.phase(), SessionPhase::Unreachable);
}

#[test]
fn repaint_after_completion_clears_route() {
    let mut session = session_with_endpoints(6, 6, Coord::new(0, 0), Coord::new(5, 0), 0);
    session.start_search().unwrap();
    session.wait();
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert!(!session.route().is_empty());

    // Painting a fresh cell drops the finished result
    session.paint_cell(Coord::new(3, 4), true).unwrap();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.route().is_empty());
    assert_eq!(session.grid().status(Coord::new(3, 4)).unwrap(), CellStatus::Blocked);
}

#[test]
fn endpoint_change_after_completion_clears_route() {
    let mut session = session_with_endpoints(6, 6, Coord::new(0, 0), Coord::new(5, 5), 0);
    session.start_search().unwrap();
    session.wait();
    assert!(session.paint_cell(Coord::new(5, 5), true).is_ok());
    assert_eq!(session.phase(), SessionPhase::Completed, "painting an endpoint is a no-op");

    session.select_endpoint(Coord::new(2, 4)).unwrap();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.route().is_empty());
    assert_eq!(session.endpoints(), vec![Coord::new(5, 5), Coord::new(2, 4)]);
}

#[test]
fn render_text_marks_route_and_endpoints() {
    let mut session = session_with_endpoints(3, 2, Coord::new(0, 0), Coord::new(2, 0), 0);
    session.paint_cell(Coord::new(0, 1), true).unwrap();
    session.start_search().unwrap();
    session.wait();
    assert_eq!(session.render_text(), "x*x\n■□□\n");
}
