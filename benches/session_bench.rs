//! Criterion benchmarks for the warehouse layout engine.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion};
use warehouse_engine::session::{run_session, Command, SessionScript};
use warehouse_engine::types::{EntityId, LayoutConfig, WarehouseParams};
use warehouse_engine::Warehouse;

// -- JSON fixtures --

/// One shelf, a handful of products dropped onto it and onto the floor.
const SMALL_SESSION_JSON: &str = r#"{
  "warehouse": { "width": 50.0, "height": 10.0, "depth": 50.0 },
  "seed": 42,
  "approval": "always",
  "commands": [
    { "op": "add_shelf", "id": "S1", "bin_columns": 4, "bin_rows": 3 },
    { "op": "hover", "x": 10.0, "z": 0.0 },
    { "op": "click", "x": 10.0, "z": 0.0 },
    { "op": "add_product", "name": "P1", "width": 1.5, "height": 1.5, "depth": 1.5 },
    { "op": "hover", "x": 10.0, "z": 0.0 },
    { "op": "click", "x": 10.0, "z": 0.0 },
    { "op": "add_product", "name": "P2", "width": 1.0, "height": 1.0, "depth": 1.0 },
    { "op": "hover", "x": -5.0, "z": 5.0 },
    { "op": "click", "x": -5.0, "z": 5.0 },
    { "op": "move_request", "product": "P2", "shelf": "S1", "column": 3, "row": 2 },
    { "op": "click", "x": 10.0, "z": 0.0 },
    { "op": "input", "event": "rotate_clockwise" },
    { "op": "hover", "x": -15.0, "z": -15.0 },
    { "op": "tick" },
    { "op": "click", "x": -15.0, "z": -15.0 }
  ]
}"#;

/// A grid of shelves, each filled through drag-and-drop.
fn crowded_script(shelves: usize) -> SessionScript {
    let mut commands = Vec::new();
    for i in 0..shelves {
        let x = -20.0 + (i % 5) as f64 * 10.0;
        let z = -20.0 + (i / 5) as f64 * 8.0;
        commands.push(Command::AddShelf {
            id: format!("S{i}"),
            bin_columns: 3,
            bin_rows: 2,
        });
        commands.push(Command::Hover { x, z });
        commands.push(Command::Click { x, z });
        for j in 0..6 {
            commands.push(Command::AddProduct {
                name: format!("P{i}_{j}"),
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            });
            commands.push(Command::Hover { x, z });
            commands.push(Command::Click { x, z });
            commands.push(Command::Cancel);
        }
    }
    SessionScript {
        warehouse: WarehouseParams::default(),
        config: LayoutConfig::default(),
        seed: 7,
        approval: Default::default(),
        commands,
    }
}

fn bench_small_session(c: &mut Criterion) {
    let script: SessionScript = serde_json::from_str(SMALL_SESSION_JSON).unwrap();
    c.bench_function("session_small", |b| {
        b.iter(|| run_session(&script));
    });
}

fn bench_crowded_session(c: &mut Criterion) {
    let script = crowded_script(25);
    c.bench_function("session_crowded_25_shelves", |b| {
        b.iter(|| run_session(&script));
    });
}

fn bench_collision_scan(c: &mut Criterion) {
    let mut warehouse = Warehouse::new(WarehouseParams::default(), LayoutConfig::default()).unwrap();
    for i in 0..25 {
        let id = format!("S{i}");
        warehouse.add_shelf(&id, 3, 2).unwrap();
        warehouse
            .move_shelf_to(&id, -20.0 + (i % 5) as f64 * 10.0, -20.0 + (i / 5) as f64 * 8.0)
            .unwrap();
    }
    let probe = EntityId::Shelf("S12".into());
    c.bench_function("collision_scan_25_shelves", |b| {
        b.iter(|| warehouse.collisions_for(&probe).unwrap());
    });
}

criterion_group!(
    benches,
    bench_small_session,
    bench_crowded_session,
    bench_collision_scan
);
criterion_main!(benches);
