use quokka::sim::{ALPHA_DECAY, ALPHA_RESTART, MAX_STEP};
use quokka::{Activation, Blocking, Charge, FrameBudget, Node, Simulation, Tick};
use std::cell::RefCell;
use std::rc::Rc;

fn started(nodes: Vec<Node>) -> Simulation {
    let mut sim = Simulation::default().with_nodes(nodes);
    assert_eq!(sim.start(), Activation::Started);
    sim
}

#[test]
fn single_node_does_not_move() {
    let mut sim = started(vec![Node::new(2.5, -1.0)]);
    assert!(matches!(sim.step_once(), Tick::Moved { .. }));
    let n = &sim.nodes()[0];
    assert_eq!((n.x, n.y), (2.5, -1.0));
}

#[test]
fn two_equal_charges_repel_within_the_clamp() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0)]);
    sim.step_once();
    let [a, b] = sim.nodes() else {
        panic!("expected two nodes");
    };
    assert!(b.x - a.x > 1.0, "separation: {}", b.x - a.x);
    assert!(a.x.abs() <= MAX_STEP);
    assert!((b.x - 1.0).abs() <= MAX_STEP);
    assert_eq!(a.y, 0.0);
    assert_eq!(b.y, 0.0);
}

#[test]
fn two_nodes_spread_along_x_only() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0)]);
    let ticks = sim.run_to_convergence();
    assert_eq!(ticks, 68);
    let [a, b] = sim.nodes() else {
        panic!("expected two nodes");
    };
    assert!(b.x - a.x > 1.0);
    assert!(a.y.abs() < 1e-9);
    assert!(b.y.abs() < 1e-9);
    assert!(!sim.is_running());
}

#[test]
fn pinned_node_stays_put_and_still_repels() {
    let mut sim = started(vec![Node::pinned(5.0, 5.0), Node::new(0.0, 0.0)]);
    sim.run_to_convergence();
    let [pinned, free] = sim.nodes() else {
        panic!("expected two nodes");
    };
    assert_eq!((pinned.x, pinned.y), (5.0, 5.0));
    assert!(free.x < 0.0 && free.y < 0.0, "free node at ({}, {})", free.x, free.y);
}

#[test]
fn pinned_nodes_never_move_between_ticks() {
    let mut sim = started(vec![
        Node::pinned(0.0, 0.0),
        Node::new(0.5, 0.2),
        Node::pinned(3.0, 1.0),
        Node::new(2.0, 2.0),
    ]);
    while let Tick::Moved { .. } = sim.step_once() {
        let n = sim.nodes();
        assert_eq!((n[0].x, n[0].y), (0.0, 0.0));
        assert_eq!((n[2].x, n[2].y), (3.0, 1.0));
    }
}

#[test]
fn alpha_decays_geometrically_until_convergence() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(3.0, 4.0)]);
    let mut prev = sim.alpha();
    assert_eq!(prev, ALPHA_RESTART);
    let mut moved = 0;
    loop {
        match sim.step_once() {
            Tick::Moved { alpha } => {
                assert_eq!(alpha, prev * ALPHA_DECAY);
                assert!(alpha < prev);
                prev = alpha;
                moved += 1;
            }
            Tick::Converged => break,
        }
    }
    assert_eq!(moved, 68);
    assert_eq!(sim.alpha(), 0.0);
}

#[test]
fn synchronous_run_terminates_with_finite_positions() {
    let mut nodes: Vec<Node> = (0..60)
        .map(|i| Node::new((i % 8) as f64 * 3.0, (i / 8) as f64 * 2.0))
        .collect();
    // A few exact duplicates exercise the coincident-point path.
    nodes.push(Node::new(0.0, 0.0));
    nodes.push(Node::new(0.0, 0.0));
    nodes.push(Node::new(9.0, 4.0));

    let mut sim = started(nodes);
    assert_eq!(sim.run_to_convergence(), 68);
    assert!(
        sim.nodes()
            .iter()
            .all(|n| n.x.is_finite() && n.y.is_finite() && n.px.is_finite() && n.py.is_finite())
    );
}

#[test]
fn reheating_keeps_the_run_going() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(1.0, 1.0)]);
    for _ in 0..50 {
        sim.step_once();
    }
    assert_eq!(sim.resume(), Activation::Reheated);
    assert_eq!(sim.alpha(), ALPHA_RESTART);
    assert_eq!(sim.run_to_convergence(), 68);
    assert_eq!(sim.ticks(), 118);
}

#[test]
fn restart_after_convergence_starts_a_new_run() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0)]);
    sim.run_to_convergence();
    let spread = sim.nodes()[1].x - sim.nodes()[0].x;
    assert_eq!(sim.start(), Activation::Started);
    assert_eq!(sim.run_to_convergence(), 68);
    assert!(sim.nodes()[1].x - sim.nodes()[0].x > spread);
}

#[test]
fn zero_charge_leaves_nodes_at_rest() {
    let mut sim = Simulation::default().with_nodes(vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0)]);
    sim.set_charge(0.0);
    sim.start();
    sim.run_to_convergence();
    let n = sim.nodes();
    assert_eq!((n[0].x, n[1].x), (0.0, 1.0));
}

#[test]
fn initial_velocity_carries_through_friction() {
    let mut n = Node::new(0.0, 0.0);
    n.px = -1.0;
    n.py = 0.0;
    let mut sim = started(vec![n]);
    sim.set_friction(0.5);
    sim.step_once();
    assert_eq!(sim.nodes()[0].x, 0.5);
}

#[test]
fn tick_callback_sees_every_moving_tick() {
    let seen: Rc<RefCell<Vec<(f64, usize)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let mut sim = Simulation::default().with_nodes(vec![Node::new(0.0, 0.0), Node::new(0.0, 2.0)]);
    sim.on_tick(move |alpha, nodes| sink.borrow_mut().push((alpha, nodes.len())));
    sim.start();
    sim.run_to_convergence();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 68);
    assert!(seen.iter().all(|&(_, n)| n == 2));
    assert!(seen.windows(2).all(|w| w[1].0 < w[0].0));
}

#[test]
fn frame_budget_driver_needs_several_invocations() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0)]);
    let mut driver = FrameBudget::new(10);
    let mut invocations = 1;
    while !sim.drive(&mut driver) {
        invocations += 1;
    }
    // 68 moving ticks plus the converging one.
    assert_eq!(invocations, 7);
    assert_eq!(sim.ticks(), 68);
}

#[test]
fn blocking_driver_matches_run_to_convergence() {
    let nodes = vec![Node::new(0.0, 0.0), Node::new(1.0, 0.5), Node::pinned(-2.0, 1.0)];
    let mut a = started(nodes.clone());
    let mut b = started(nodes);
    a.run_to_convergence();
    assert!(b.drive(&mut Blocking));
    assert_eq!(a.nodes(), b.nodes());
}

#[test]
fn larger_theta_still_repels() {
    let nodes: Vec<Node> = (0..30)
        .map(|i| Node::new((i as f64 * 0.7).sin() * 5.0, (i as f64 * 1.3).cos() * 5.0))
        .collect();
    let before = spread(&nodes);
    let mut sim = started(nodes);
    sim.set_theta(2.0);
    sim.run_to_convergence();
    assert!(spread(sim.nodes()) > before);
}

#[test]
fn gravity_is_reported_but_not_applied() {
    let nodes = vec![Node::new(0.0, 0.0), Node::new(1.0, 0.5), Node::new(-2.0, 1.0)];
    let mut plain = started(nodes.clone());
    let mut heavy = Simulation::default().with_nodes(nodes);
    heavy.set_gravity(2.0);
    assert_eq!(heavy.gravity(), 2.0);
    assert_eq!(plain.gravity(), 0.1);

    heavy.start();
    assert_eq!(plain.run_to_convergence(), heavy.run_to_convergence());
    assert_eq!(plain.into_nodes(), heavy.into_nodes());
}

#[test]
fn set_nodes_then_start_refreshes_indices_and_charges() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0)]);
    sim.run_to_convergence();

    sim.set_charge(Charge::from_fn(|_, i| -10.0 * (i + 1) as f64));
    sim.set_nodes(vec![Node::new(0.0, 0.0), Node::new(2.0, 0.0), Node::new(0.0, 2.0)]);
    assert!(sim.charges().is_empty());
    let indices: Vec<usize> = sim.nodes().iter().map(|n| n.index).collect();
    assert_eq!(indices, [0, 1, 2]);

    assert_eq!(sim.start(), Activation::Started);
    assert_eq!(sim.charges(), [-10.0, -20.0, -30.0]);
    assert_eq!(sim.charge().of(&sim.nodes()[2], 2), -30.0);
    assert_eq!(sim.run_to_convergence(), 68);
    assert!(sim.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
}

#[test]
fn set_nodes_mid_run_leaves_new_nodes_uncharged_until_start() {
    let mut sim = started(vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0)]);
    sim.step_once();

    let fresh = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
    sim.set_nodes(fresh.iter().map(|&(x, y)| Node::new(x, y)).collect());
    assert!(matches!(sim.step_once(), Tick::Moved { .. }));
    assert!(sim.charges().is_empty());
    for (n, &(x, y)) in sim.nodes().iter().zip(&fresh) {
        assert_eq!((n.x, n.y), (x, y));
        assert_eq!((n.px, n.py), (x, y));
    }

    assert_eq!(sim.start(), Activation::Reheated);
    sim.step_once();
    assert!(sim.nodes()[1].x > 1.0);
}

fn spread(nodes: &[Node]) -> f64 {
    let n = nodes.len() as f64;
    let cx = nodes.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = nodes.iter().map(|p| p.y).sum::<f64>() / n;
    nodes
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n
}
