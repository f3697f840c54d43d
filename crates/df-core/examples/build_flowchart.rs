//! Build a small order-processing flowchart in memory and print each
//! snapshot revision as it evolves.
//!
//! Run with logging: `RUST_LOG=debug cargo run --example build_flowchart`

use df_core::model::{Connection, HandleSide, Position, ShapeKind};
use df_core::patch::EdgeStylePatch;
use df_core::store::FlowStore;

fn main() {
    env_logger::init();

    let mut store = FlowStore::new();
    store.subscribe(Box::new(|snapshot| {
        println!(
            "rev {:>3}: {} nodes, {} edges",
            snapshot.revision,
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
    }));

    let start = store.add_node(ShapeKind::StartEnd, Position::new(200.0, 40.0));
    let check = store.add_node(ShapeKind::Decision, Position::new(200.0, 160.0));
    let ship = store.add_node(ShapeKind::Process, Position::new(80.0, 280.0));
    let reject = store.add_node(ShapeKind::Process, Position::new(320.0, 280.0));

    store.update_node_label(start, "Order received");
    store.update_node_label(check, "In stock?");
    store.update_node_label(ship, "Ship it");
    store.update_node_label(reject, "Back-order");

    let yes = store.connect(Connection {
        source: check,
        source_handle: HandleSide::Left,
        target: ship,
        target_handle: HandleSide::Top,
    });
    store.connect(Connection {
        source: start,
        source_handle: HandleSide::Bottom,
        target: check,
        target_handle: HandleSide::Top,
    });
    store.connect(Connection {
        source: check,
        source_handle: HandleSide::Right,
        target: reject,
        target_handle: HandleSide::Top,
    });

    store.update_edge_style(yes, EdgeStylePatch::dotted());

    // Drop the back-order branch: the incident edge goes with it.
    store.delete_node(reject);

    let final_state = store.snapshot();
    println!("---");
    for node in &final_state.nodes {
        println!(
            "{} [{}] \"{}\" at ({}, {})",
            node.id,
            node.kind.as_str(),
            node.label,
            node.position.x,
            node.position.y
        );
    }
    for edge in &final_state.edges {
        println!("{} : {} -> {}", edge.id, edge.source, edge.target);
    }
}
