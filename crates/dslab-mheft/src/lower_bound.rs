use crate::allocation::Allocation;
use crate::eft::insert_task;
use crate::graph::TaskGraph;

/// Makespan of the application scheduled alone by HEFT on an otherwise empty set of processors.
pub fn makespan_lower_bound(graph: &TaskGraph) -> u64 {
    if graph.processors() == 0 {
        return 0;
    }
    let mut allocation = Allocation::new(graph.processors());
    for ranked in graph.rank().iter() {
        // costs are validated against the processor count on evaluation
        if insert_task(&mut allocation, graph, ranked.task).is_none() {
            return 0;
        }
    }
    allocation.makespan(graph.id())
}
