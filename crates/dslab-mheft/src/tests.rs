use crate::allocation::{Allocation, TaskSlot};
use crate::eft::{earliest_start, find_earliest_slot, insert_task};
use crate::error::{GraphError, ParseError, RegistrationError, ScheduleError};
use crate::graph::{Position, TaskGraph};
use crate::rank::{average_cost, upward_ranks};
use crate::scheduler::{Applications, Makespans, Scheduler};
use crate::schedulers::fmheft::FmheftScheduler;
use crate::schedulers::ppmheft::{PpmheftScheduler, PurgePolicy};
use crate::schedulers::wpmheft::WpmheftScheduler;
use crate::summary::{lateness, summarize};

/// Linear chain of tasks with the same cost on every processor.
fn chain(id: &str, processors: usize, costs: &[u64], link: u64) -> TaskGraph {
    let mut graph = TaskGraph::new(id, processors);
    let mut prev = None;
    for (i, &cost) in costs.iter().enumerate() {
        let task = graph.add_task(&format!("{}{}", id, i), vec![cost; processors]);
        graph.add_level(vec![vec![task]]).unwrap();
        if let Some(prev) = prev {
            graph.connect(prev, task, link).unwrap();
        }
        prev = Some(task);
    }
    graph
}

/// Application of a single task with the given cost on each processor.
fn single(id: &str, costs: &[u64]) -> TaskGraph {
    let mut graph = TaskGraph::new(id, costs.len());
    let task = graph.add_task(id, costs.to_vec());
    graph.add_level(vec![vec![task]]).unwrap();
    graph
}

fn app(mut graph: TaskGraph, priority: u32, deadline: u64) -> TaskGraph {
    let processors = graph.processors();
    graph.set_processor_count(processors).unwrap();
    graph.set_priority(priority);
    graph.set_deadline(deadline);
    graph
}

/// a -> {b, c, e} -> d, where e does not reach the exit d.
fn diamond() -> TaskGraph {
    let mut graph = TaskGraph::new("diamond", 2);
    let a = graph.add_task("a", vec![3, 5]);
    let b = graph.add_task("b", vec![4, 4]);
    let c = graph.add_task("c", vec![1, 2]);
    let e = graph.add_task("e", vec![50, 50]);
    let d = graph.add_task("d", vec![6, 7]);
    graph.add_level(vec![vec![a]]).unwrap();
    graph.add_level(vec![vec![b, c], vec![e]]).unwrap();
    graph.add_level(vec![vec![d]]).unwrap();
    graph.connect(a, b, 2).unwrap();
    graph.connect(a, c, 10).unwrap();
    graph.connect(a, e, 100).unwrap();
    graph.connect(b, d, 1).unwrap();
    graph.connect(c, d, 3).unwrap();
    graph.set_processor_count(2).unwrap();
    graph
}

#[test]
fn test_average_cost() {
    assert_eq!(average_cost(&[4, 4]), 4);
    assert_eq!(average_cost(&[1, 2]), 2);
    assert_eq!(average_cost(&[6, 7, 7]), 7);
    assert_eq!(average_cost(&[]), 0);
}

#[test]
fn test_upward_ranks() {
    let graph = diamond();
    assert_eq!(upward_ranks(&graph), vec![26, 12, 12, 50, 7]);

    let order = graph.rank().iter().map(|ranked| ranked.task).collect::<Vec<_>>();
    // e does not reach the exit, so it adds nothing to the rank of a
    assert_eq!(order, vec![3, 0, 1, 2, 4]);
    assert_eq!(graph.rank().last().unwrap().rank, average_cost(graph.evaluated_costs(4)));
}

#[test]
fn test_ranks_follow_processor_count() {
    let mut graph = diamond();
    graph.set_processor_count(1).unwrap();
    // costs of the first processor only
    assert_eq!(upward_ranks(&graph), vec![3 + 10 + 1 + 3 + 6, 4 + 1 + 6, 1 + 3 + 6, 50, 6]);
    assert_eq!(
        graph.set_processor_count(3),
        Err(GraphError::NotEnoughCosts {
            graph: "diamond".to_string(),
            task: "a".to_string(),
            available: 2,
            required: 3,
        })
    );
    assert!(matches!(graph.set_processor_count(0), Err(GraphError::NoProcessors { .. })));
}

#[test]
fn test_link_cost() {
    let graph = diamond();
    assert_eq!(graph.link_cost(0, 2), 10);
    assert_eq!(graph.link_cost(2, 0), 0);
    assert_eq!(graph.link_cost(1, 2), 0);
    assert_eq!(graph.position(3), Some(Position::new(1, 1, 0)));
    assert_eq!(graph.task_at(Position::new(1, 0, 1)), Some(2));
    assert!(graph
        .clone()
        .add_link(Position::new(5, 0, 0), Position::new(0, 0, 0), 1)
        .is_err());
}

#[test]
fn test_earliest_start() {
    let timeline = vec![TaskSlot::new("x", 0, 0, 10), TaskSlot::new("x", 1, 20, 30)];
    assert_eq!(earliest_start(&timeline, 0, 5), 10);
    assert_eq!(earliest_start(&timeline, 0, 10), 10);
    assert_eq!(earliest_start(&timeline, 12, 10), 30);
    assert_eq!(earliest_start(&timeline, 40, 1), 40);
    assert_eq!(earliest_start(&[], 7, 3), 7);
}

#[test]
fn test_earliest_slot() {
    let allocation = Allocation::new(2);
    let placement = find_earliest_slot(&allocation, "x", &[], &[5, 5]).unwrap();
    assert_eq!((placement.processor, placement.start, placement.end), (0, 0, 5));
    // costs must cover every processor
    assert_eq!(find_earliest_slot(&allocation, "x", &[], &[5]), None);
    assert_eq!(find_earliest_slot(&Allocation::new(0), "x", &[], &[5]), None);

    let mut allocation = Allocation::new(2);
    allocation.insert(0, TaskSlot::new("x", 0, 0, 10));
    // parent on processor 0, the child is cheaper on processor 1 even with the link cost
    let placement = find_earliest_slot(&allocation, "x", &[(0, 5)], &[10, 1]).unwrap();
    assert_eq!((placement.processor, placement.start, placement.end), (1, 15, 16));
    let placement = find_earliest_slot(&allocation, "x", &[(0, 5)], &[3, 10]).unwrap();
    assert_eq!((placement.processor, placement.start, placement.end), (0, 10, 13));
    // slots of another application are not parents
    let placement = find_earliest_slot(&allocation, "y", &[(0, 5)], &[3, 10]).unwrap();
    assert_eq!((placement.processor, placement.start, placement.end), (1, 0, 10));
}

#[test]
fn test_insert_keeps_order() {
    let graph = app(chain("c", 1, &[10, 10], 0), 1, 0);
    let mut allocation = Allocation::new(1);
    allocation.insert(0, TaskSlot::new("other", 0, 20, 30));
    insert_task(&mut allocation, &graph, 0).unwrap();
    insert_task(&mut allocation, &graph, 1).unwrap();
    assert_eq!(insert_task(&mut Allocation::new(0), &graph, 0), None);
    let starts = allocation.timeline(0).iter().map(|slot| slot.start).collect::<Vec<_>>();
    assert_eq!(starts, vec![0, 10, 20]);
    assert_eq!(allocation.makespan("c"), 20);
    assert_eq!(allocation.makespan("missing"), 0);
    assert_eq!(allocation.total_makespan(), 30);
    assert_eq!(allocation.remove_application("c"), 2);
    assert_eq!(allocation.slot_count(), 1);
}

#[test]
fn test_allocation_index() {
    let mut allocation = Allocation::new(2);
    allocation.insert(1, TaskSlot::new("x", 0, 0, 5));
    allocation.insert(0, TaskSlot::new("y", 0, 0, 5));
    allocation.insert(0, TaskSlot::new("x", 1, 0, 5));
    allocation.insert(1, TaskSlot::new("x", 2, 5, 8));

    // slots with the same interval are told apart by application and task
    assert_eq!(allocation.find("x", 1), Some((0, &TaskSlot::new("x", 1, 0, 5))));
    assert_eq!(allocation.find("y", 0), Some((0, &TaskSlot::new("y", 0, 0, 5))));
    assert!(allocation.contains("x", 2));
    assert!(!allocation.contains("y", 1));
    assert!(!allocation.contains("z", 0));

    let snapshot = allocation.clone();
    assert_eq!(allocation.remove_application("y"), 1);
    assert_eq!(allocation.remove_application("y"), 0);
    assert_eq!(allocation.find("y", 0), None);
    assert!(!allocation.contains("y", 0));
    assert_eq!(allocation.find("x", 1), Some((0, &TaskSlot::new("x", 1, 0, 5))));
    assert!(snapshot.contains("y", 0));

    let json = serde_json::to_string(&allocation).unwrap();
    let restored: Allocation = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, allocation);
    assert_eq!(restored.find("x", 2), Some((1, &TaskSlot::new("x", 2, 5, 8))));
    assert!(restored.contains("x", 0));
    assert!(!restored.contains("y", 0));
}

#[test]
fn test_lower_bound() {
    let graph = app(chain("c", 1, &[10, 10, 10], 5), 1, 0);
    assert_eq!(graph.lowerbound(), 30);

    let mut graph = chain("c", 2, &[10, 10, 10], 5);
    graph.set_processor_count(2).unwrap();
    assert_eq!(graph.lowerbound(), 30);
    graph.set_deadline_ratio(3);
    assert_eq!(graph.deadline(), 40);
    graph.set_deadline_ratio(0);
    assert_eq!(graph.deadline(), 30);
}

#[test]
fn test_chains_on_single_processor() {
    let apps = (1..=3)
        .map(|i| app(chain(&format!("app{}", i), 1, &[10, 10, 10], 5), i, 100))
        .collect::<Vec<_>>();
    for graph in apps.iter() {
        assert_eq!(graph.lowerbound(), 30);
    }

    let mut wpmheft = WpmheftScheduler::new(1);
    for graph in apps.iter() {
        wpmheft.register_application(graph.clone()).unwrap();
    }
    let makespans = wpmheft.compute_schedule().unwrap();
    assert_eq!(makespans.values().copied().collect::<Vec<_>>(), vec![30, 60, 90]);
    // no link cost is paid on a single processor
    for timeline in wpmheft.allocation().timelines() {
        for pair in timeline.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    let mut fmheft = FmheftScheduler::new(1);
    for graph in apps.iter() {
        fmheft.register_application(graph.clone()).unwrap();
    }
    let makespans = fmheft.compute_schedule().unwrap();
    assert_eq!(makespans.values().copied().collect::<Vec<_>>(), vec![70, 80, 90]);
    assert_eq!(fmheft.allocation().total_makespan(), 90);
}

#[test]
fn test_duplicate_priority() {
    let mut applications = Applications::new();
    applications.register(app(chain("first", 1, &[1], 0), 1, 10), 1).unwrap();
    let result = applications.register(app(chain("second", 1, &[1], 0), 1, 10), 1);
    assert_eq!(
        result,
        Err(RegistrationError::DuplicatePriority {
            priority: 1,
            existing: "first".to_string(),
            rejected: "second".to_string(),
        })
    );
    assert_eq!(applications.len(), 1);
    assert_eq!(applications.get(1).unwrap().id(), "first");

    let mut scheduler = FmheftScheduler::new(1);
    scheduler
        .register_application(app(chain("first", 1, &[1], 0), 1, 10))
        .unwrap();
    assert!(scheduler
        .register_application(app(chain("second", 1, &[5], 0), 1, 10))
        .is_err());
    let makespans = scheduler.compute_schedule().unwrap();
    assert_eq!(makespans.len(), 1);
    assert_eq!(makespans["first"], 1);
}

#[test]
fn test_duplicate_id() {
    let mut scheduler = PpmheftScheduler::new(2);
    scheduler
        .register_application(app(chain("x", 2, &[10, 10], 0), 1, 100))
        .unwrap();
    assert_eq!(
        scheduler.register_application(app(chain("x", 2, &[10, 10], 0), 2, 100)),
        Err(RegistrationError::DuplicateId { id: "x".to_string() })
    );
    assert_eq!(scheduler.applications().len(), 1);
    assert_eq!(scheduler.applications().get(1).unwrap().id(), "x");
    assert!(scheduler.applications().get(2).is_none());

    let makespans = scheduler.compute_schedule().unwrap();
    assert_eq!(makespans.len(), 1);
    assert_eq!(makespans["x"], 20);
    assert_eq!(scheduler.allocation().slot_count(), 2);
}

#[test]
fn test_registration_computes_lower_bound() {
    let mut same = chain("same", 1, &[10, 10], 0);
    same.set_priority(1);
    let mut diff = chain("diff", 2, &[10, 10], 0);
    diff.set_priority(2);
    assert!(!same.is_evaluated());
    assert_eq!(same.lowerbound(), 0);

    let mut scheduler = WpmheftScheduler::new(1);
    scheduler.register_application(same).unwrap();
    scheduler.register_application(diff).unwrap();
    for priority in [1, 2] {
        let registered = scheduler.applications().get(priority).unwrap();
        assert!(registered.is_evaluated());
        assert_eq!(registered.lowerbound(), 20, "{}", registered.id());
    }

    // a stored lowerbound is kept when the processor count matches
    let mut stored = chain("stored", 1, &[10, 10], 0);
    stored.set_lower_bound(15);
    let mut applications = Applications::new();
    applications.register(stored, 1).unwrap();
    assert_eq!(applications.get(0).unwrap().lowerbound(), 15);
}

#[test]
fn test_new_link_invalidates_ranks() {
    let mut graph = app(chain("c", 1, &[10, 10, 10], 0), 1, 0);
    assert!(graph.is_evaluated());
    assert_eq!(graph.rank()[0].rank, 30);
    graph.connect(0, 2, 50).unwrap();
    assert!(!graph.is_evaluated());
    graph.evaluate(1).unwrap();
    assert_eq!(graph.rank()[0].rank, 70);
}

#[test]
fn test_zero_processors() {
    let mut fmheft = FmheftScheduler::new(0);
    assert!(fmheft.compute_schedule().unwrap().is_empty());
    assert!(fmheft.allocation().is_empty());

    let mut wpmheft = WpmheftScheduler::new(0);
    assert_eq!(
        wpmheft.register_application(app(chain("c", 1, &[1], 0), 1, 10)),
        Err(RegistrationError::Graph(GraphError::NoProcessors {
            graph: "c".to_string()
        }))
    );
    assert!(wpmheft.compute_schedule().unwrap().is_empty());

    let mut ppmheft = PpmheftScheduler::new(0);
    assert!(ppmheft.register_application(app(chain("c", 1, &[1], 0), 1, 10)).is_err());
    assert!(ppmheft.compute_schedule().unwrap().is_empty());
}

#[test]
fn test_registration_reevaluates() {
    let mut graph = TaskGraph::new("g", 3);
    let a = graph.add_task("a", vec![10, 20, 30]);
    graph.add_level(vec![vec![a]]).unwrap();
    graph.set_processor_count(3).unwrap();
    assert_eq!(graph.rank()[0].rank, 20);

    let mut scheduler = WpmheftScheduler::new(1);
    scheduler.register_application(graph).unwrap();
    let registered = scheduler.applications().get(0).unwrap();
    assert_eq!(registered.processors(), 1);
    assert_eq!(registered.rank()[0].rank, 10);
    assert_eq!(registered.lowerbound(), 10);
}

#[test]
fn test_wpmheft_priority_strictness() {
    let first = app(chain("first", 2, &[10, 20, 5], 3), 1, 100);
    let slots = |second: TaskGraph| {
        let mut scheduler = WpmheftScheduler::new(2);
        scheduler.register_application(second).unwrap();
        scheduler.register_application(first.clone()).unwrap();
        scheduler.compute_schedule().unwrap();
        scheduler
            .allocation()
            .slots()
            .filter(|(_, slot)| slot.application == "first")
            .map(|(processor, slot)| (processor, slot.clone()))
            .collect::<Vec<_>>()
    };
    let alone = {
        let mut scheduler = WpmheftScheduler::new(2);
        scheduler.register_application(first.clone()).unwrap();
        scheduler.compute_schedule().unwrap();
        scheduler.allocation().slots().map(|(p, s)| (p, s.clone())).collect::<Vec<_>>()
    };
    assert_eq!(slots(app(chain("second", 2, &[1], 0), 2, 100)), alone);
    assert_eq!(slots(app(chain("second", 2, &[40, 40, 40, 40], 1), 2, 100)), alone);
}

#[test]
fn test_fmheft_seed_allocation() {
    let graph = app(chain("c", 1, &[10, 10], 0), 1, 100);
    let mut seed = Allocation::new(1);
    seed.insert(0, TaskSlot::new("c", 0, 5, 15));
    let mut scheduler = FmheftScheduler::new(1).with_allocation(seed).unwrap();
    scheduler.register_application(graph).unwrap();
    let makespans = scheduler.compute_schedule().unwrap();
    assert_eq!(makespans["c"], 25);
    assert_eq!(scheduler.allocation().slot_count(), 2);

    assert_eq!(
        scheduler.set_allocated_tasks(Allocation::new(2)),
        Err(ScheduleError::ProcessorMismatch { expected: 1, actual: 2 })
    );
    assert!(FmheftScheduler::new(3).with_allocation(Allocation::new(1)).is_err());
}

#[test]
fn test_ppmheft_meets_high_priority_deadline() {
    let first = app(chain("first", 1, &[10, 10], 0), 1, 20);
    let second = app(chain("second", 1, &[30, 1], 0), 2, 100);
    assert_eq!(second.lowerbound(), 31);

    let mut fmheft = FmheftScheduler::new(1);
    fmheft.register_application(first.clone()).unwrap();
    fmheft.register_application(second.clone()).unwrap();
    let fair = fmheft.compute_schedule().unwrap();
    assert_eq!(fair["first"], 50);
    assert_eq!(fair["second"], 51);

    let mut ppmheft = PpmheftScheduler::new(1);
    ppmheft.register_application(first).unwrap();
    ppmheft.register_application(second).unwrap();
    let makespans = ppmheft.compute_schedule().unwrap();
    assert_eq!(makespans["first"], 20);
    assert_eq!(makespans["second"], 51);

    let summary = ppmheft.summary().unwrap();
    assert_eq!(summary.missed_count(), 0);
    assert_eq!(summary.deadline_miss_ratio, 0.);
}

#[test]
fn test_ppmheft_tradeoff() {
    let apps = vec![
        app(single("app1", &[1, 3]), 1, 1),
        app(single("app2", &[9, 9]), 2, 15),
        app(single("app3", &[1, 5]), 3, 1),
    ];
    assert_eq!(apps.iter().map(|app| app.lowerbound()).collect::<Vec<_>>(), vec![1, 9, 1]);

    let mut fmheft = FmheftScheduler::new(2);
    for graph in apps.iter() {
        fmheft.register_application(graph.clone()).unwrap();
    }
    let fair = fmheft.compute_schedule().unwrap();
    // app2 has the highest rank and takes processor 0, app1 and app3 queue up on processor 1
    assert_eq!(fair.values().copied().collect::<Vec<_>>(), vec![8, 9, 5]);

    for policy in [PurgePolicy::Infeasible, PurgePolicy::AllRemaining, PurgePolicy::Keep] {
        let mut ppmheft = PpmheftScheduler::new(2).with_purge_policy(policy);
        for graph in apps.iter() {
            ppmheft.register_application(graph.clone()).unwrap();
        }
        let makespans = ppmheft.compute_schedule().unwrap();
        assert_eq!(makespans.values().copied().collect::<Vec<_>>(), vec![1, 9, 2], "{:?}", policy);
        assert!(makespans["app1"] <= apps[0].deadline() && fair["app1"] > apps[0].deadline());
        assert!(makespans["app2"] <= apps[1].deadline() && fair["app2"] <= apps[1].deadline());
        assert!(makespans["app3"] < fair["app3"]);
        assert_eq!(
            ppmheft.allocation().find("app1", 0),
            Some((0, &TaskSlot::new("app1", 0, 0, 1)))
        );

        let summary = ppmheft.summary().unwrap();
        assert_eq!(summary.missed_count(), 1);
        assert_eq!(summary.deadline_miss_ratio, 0.33);
    }
}

#[test]
fn test_ppmheft_purge_policies() {
    let apps = vec![
        app(chain("app1", 1, &[10, 10], 0), 1, 40),
        app(chain("app2", 1, &[10, 10], 0), 2, 50),
        app(chain("app3", 1, &[1, 1], 0), 3, 10),
    ];
    let count = |allocation: &Allocation, id: &str| {
        allocation
            .slots()
            .filter(|(_, slot)| slot.application == id)
            .count()
    };

    for (policy, expected) in [
        (PurgePolicy::Infeasible, [2usize, 2, 0]),
        (PurgePolicy::AllRemaining, [2, 0, 0]),
        (PurgePolicy::Keep, [2, 2, 2]),
    ] {
        let mut scheduler = PpmheftScheduler::new(1).with_purge_policy(policy);
        for graph in apps.iter() {
            scheduler.register_application(graph.clone()).unwrap();
        }

        // the first trial schedule meets the deadline of app1 and is committed,
        // app2 is feasible in it and app3 is not
        let (mut allocation, makespans) = scheduler.trial_schedule(&Allocation::new(1), &[1, 2, 3]).unwrap();
        assert_eq!(makespans.values().copied().collect::<Vec<_>>(), vec![31, 41, 42]);
        scheduler.purge(&mut allocation, &[2, 3], &makespans);
        let placed = ["app1", "app2", "app3"].map(|id| count(&allocation, id));
        assert_eq!(placed, expected, "{:?}", policy);
        assert_eq!(allocation.makespan("app1"), 31);

        let makespans = scheduler.compute_schedule().unwrap();
        assert_eq!(makespans.len(), 3);
        assert!(makespans["app1"] <= 40, "{:?}", policy);
        // every task is placed exactly once
        assert_eq!(scheduler.allocation().slot_count(), 6, "{:?}", policy);
    }
}

#[test]
fn test_ppmheft_zero_deadline() {
    let mut scheduler = PpmheftScheduler::new(1);
    scheduler
        .register_application(app(chain("zero", 1, &[1], 0), 1, 0))
        .unwrap();
    assert_eq!(
        scheduler.compute_schedule(),
        Err(ScheduleError::ZeroDeadline {
            application: "zero".to_string()
        })
    );
    assert!(scheduler.summary().is_none());

    let mut scheduler = PpmheftScheduler::new(1);
    scheduler
        .register_application(app(chain("free", 1, &[0], 0), 1, 0))
        .unwrap();
    let makespans = scheduler.compute_schedule().unwrap();
    assert_eq!(makespans["free"], 0);
}

#[test]
fn test_determinism() {
    let build = || {
        let mut scheduler = PpmheftScheduler::new(2);
        scheduler.register_application(app(diamond(), 1, 40)).unwrap();
        scheduler
            .register_application(app(chain("c", 2, &[7, 3, 9], 4), 2, 20))
            .unwrap();
        scheduler.compute_schedule().unwrap();
        scheduler.allocation().clone()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_summary() {
    let mut applications = Applications::new();
    applications.register(app(chain("A", 1, &[50, 50], 0), 1, 100), 1).unwrap();
    applications.register(app(chain("B", 1, &[20], 0), 2, 30), 1).unwrap();
    let mut makespans = Makespans::new();
    makespans.insert("A".to_string(), 110);
    makespans.insert("B".to_string(), 20);

    let summary = summarize("F_MHEFT", applications.iter(), &makespans);
    assert_eq!(summary.application("A").unwrap().lateness, 0.1);
    assert_eq!(summary.application("B").unwrap().lateness, -0.3333);
    assert_eq!(summary.deadline_miss_ratio, 0.5);
    assert_eq!(summary.overall_lateness, -0.2333);
    assert_eq!(summary.total_makespan, 110);
    assert_eq!(
        summary.to_string(),
        "F_MHEFT\n\
         Applications : 2\n\
         app: A; app priority: 1; nodes: 2; lowerbound: 100; deadline: 100; makespan: 110; lateness: 0.1\n\
         app: B; app priority: 2; nodes: 1; lowerbound: 20; deadline: 30; makespan: 20; lateness: -0.3333\n\
         DMRs: 0.5; overall lateness: -0.2333; total makespan: 110\n"
    );

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["applications"][0]["makespan"], 110);
    assert_eq!(json["applications"][0]["lateness"], 0.1);
}

#[test]
fn test_lateness_zero_deadline() {
    assert_eq!(lateness(0, 0), 0.);
    assert_eq!(lateness(5, 0), f64::INFINITY);
    assert_eq!(lateness(15, 10), 0.5);
}

fn sample_representation() -> &'static str {
    "Graph {
\tId: sample
\tProcessors: 2
\tNodes: ('a', 'b', 'c')
\tNodeCosts: {'a': (3, 5), 'b': (4, 4), 'c': (6, 7)}
\tLevels: [[['a']], [['b']], [['c']]]
\tLinks: (0,0,0)|(1,0,0)|(2);(1,0,0)|(2,0,0)|(1)
\tLowerBound: 14
\tDeadline: 20
}
"
}

#[test]
fn test_parse_representation() {
    let graph = TaskGraph::from_representation(sample_representation()).unwrap();
    assert_eq!(graph.id(), "sample");
    assert_eq!(graph.processors(), 2);
    assert_eq!(graph.nodes(), &vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    assert_eq!(graph.costs(1), &[4, 4]);
    assert_eq!(graph.link_cost(0, 1), 2);
    assert_eq!(graph.link_cost(1, 2), 1);
    assert_eq!(graph.lowerbound(), 14);
    assert_eq!(graph.deadline(), 20);
    assert_eq!(upward_ranks(&graph), vec![4 + 2 + 4 + 1 + 7, 4 + 1 + 7, 7]);
}

#[test]
fn test_representation_round_trip() {
    let mut graph = diamond();
    graph.set_deadline(77);
    let restored = TaskGraph::from_representation(&graph.to_representation()).unwrap();
    assert_eq!(restored.id(), graph.id());
    assert_eq!(restored.nodes(), graph.nodes());
    for task in 0..graph.task_count() {
        assert_eq!(restored.costs(task), graph.costs(task));
    }
    assert_eq!(restored.levels(), graph.levels());
    assert_eq!(restored.links(), graph.links());
    assert_eq!(restored.lowerbound(), graph.lowerbound());
    assert_eq!(restored.deadline(), 77);
    assert_eq!(restored.rank(), graph.rank());
}

#[test]
fn test_representation_errors() {
    let without_deadline = sample_representation().replace("\tDeadline: 20\n", "");
    assert!(matches!(
        TaskGraph::from_representation(&without_deadline),
        Err(ParseError::MissingField("Deadline"))
    ));

    let bad_link = sample_representation().replace("|(2);", "|2;");
    assert!(matches!(
        TaskGraph::from_representation(&bad_link),
        Err(ParseError::InvalidValue { field: "Links", .. })
    ));

    let unknown_position = sample_representation().replace("(2,0,0)|(1)", "(3,0,0)|(1)");
    assert!(matches!(
        TaskGraph::from_representation(&unknown_position),
        Err(ParseError::Graph(GraphError::UnknownPosition { .. }))
    ));

    let narrow_costs = sample_representation().replace("'b': (4, 4)", "'b': (4,)");
    assert!(matches!(
        TaskGraph::from_representation(&narrow_costs),
        Err(ParseError::Graph(GraphError::NotEnoughCosts { .. }))
    ));

    assert!(matches!(
        TaskGraph::from_file("missing.dag"),
        Err(ParseError::Io { .. })
    ));
}
