use warehouse_engine::placement::{AlwaysApprove, BinInsertion, LayoutEditor};
use warehouse_engine::session::{run_session_json, SessionReport};
use warehouse_engine::types::{LayoutConfig, Ray, Rotation, WarehouseParams};
use warehouse_engine::{EventOutcome, InputEvent, LayoutError, PlacementState, Refusal, Warehouse};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn warehouse() -> Warehouse {
    Warehouse::new(
        WarehouseParams {
            width: 50.0,
            height: 10.0,
            depth: 50.0,
        },
        LayoutConfig::default(),
    )
    .expect("valid warehouse")
}

fn select(x: f64, z: f64) -> InputEvent {
    InputEvent::Select {
        ray: Ray::vertical(x, z),
    }
}

fn pointer(x: f64, z: f64) -> InputEvent {
    InputEvent::PointerMove {
        ray: Ray::vertical(x, z),
    }
}

#[test]
fn direct_assignment_and_unassignment() {
    init();
    let mut ed = LayoutEditor::new(warehouse(), AlwaysApprove);

    ed.add_shelf("S1", 2, 2).expect("add shelf");
    ed.handle(pointer(8.0, 0.0)).expect("drag shelf");
    ed.handle(select(8.0, 0.0)).expect("drop shelf");
    ed.add_product("P1", 1.5, 1.5, 1.5).expect("add product");
    ed.handle(select(0.0, 0.0)).expect("drop product");
    assert!(ed.state().is_idle());

    ed.request_move("P1", "S1", 0, 0).expect("approved move");
    let p1 = ed.warehouse().product("P1").expect("P1");
    assert_eq!(p1.binding().map(|b| b.shelf.as_str()), Some("S1"));
    let bin = ed.warehouse().shelf("S1").expect("S1").bins().get(0, 0).expect("bin");
    assert!(bin.is_occupied());

    ed.unassign("P1").expect("unassign");
    let bin = ed.warehouse().shelf("S1").expect("S1").bins().get(0, 0).expect("bin");
    assert!(!bin.is_occupied());
    assert!(!ed.warehouse().product("P1").expect("P1").is_bound());
}

#[test]
fn full_drag_session() {
    init();
    let mut ed = LayoutEditor::with_seed(warehouse(), AlwaysApprove, 5);

    ed.add_shelf("S1", 3, 2).expect("add S1");
    ed.handle(pointer(-10.0, 0.0)).expect("drag");
    ed.handle(InputEvent::RotateCounterclockwise).expect("rotate");
    ed.tick().expect("tick");
    ed.handle(select(-10.0, 0.0)).expect("drop");
    assert_eq!(
        ed.warehouse().shelf("S1").expect("S1").rotation(),
        Rotation::Deg90
    );

    // Six bins, six drops: every one lands.
    for i in 0..6 {
        let name = format!("P{i}");
        ed.add_product(&name, 1.0, 1.0, 1.0).expect("add product");
        ed.handle(pointer(-10.0, 0.5)).expect("drag");
        let outcome = ed.handle(select(-10.0, 0.5)).expect("drop");
        assert!(matches!(outcome, EventOutcome::Inserted { .. }), "{outcome:?}");
    }
    assert_eq!(
        ed.warehouse().shelf("S1").expect("S1").bins().free_count(),
        0
    );

    ed.add_product("extra", 1.0, 1.0, 1.0).expect("add extra");
    ed.handle(pointer(-10.0, 0.5)).expect("drag");
    assert_eq!(
        ed.handle(select(-10.0, 0.5)).expect("drop"),
        EventOutcome::Refused {
            refusal: Refusal::NoFreeSlot { shelf: "S1".into() }
        }
    );
    ed.handle(pointer(10.0, 10.0)).expect("drag away");
    ed.handle(select(10.0, 10.0)).expect("drop on floor");
    assert!(ed.state().is_idle());

    // A full shelf cannot be removed; moving it carries all six products.
    assert_eq!(
        ed.remove_shelf("S1"),
        Err(LayoutError::ShelfNotEmpty("S1".into()))
    );
    ed.handle(select(-10.0, 0.0)).expect("pick S1");
    ed.handle(pointer(-20.0, 0.0)).expect("drag S1");
    ed.handle(select(-20.0, 0.0)).expect("drop S1");
    let snapshot = ed.snapshot();
    for product in snapshot.products.iter().filter(|p| p.binding.is_some()) {
        assert!((product.position.x + 20.0).abs() <= 1.0, "{product:?}");
    }
}

#[test]
fn every_bound_product_points_at_its_own_bin() {
    init();
    let mut coin = false;
    let policy = move |_: &BinInsertion<'_>| {
        coin = !coin;
        coin
    };
    let mut ed = LayoutEditor::with_seed(warehouse(), policy, 11);
    ed.add_shelf("S1", 2, 2).expect("add S1");
    ed.handle(select(0.0, 0.0)).expect("drop S1");
    for i in 0..8 {
        let name = format!("P{i}");
        ed.add_product(&name, 1.0, 1.0, 1.0).expect("add");
        ed.handle(pointer(0.0, 0.0)).expect("drag");
        if !matches!(
            ed.handle(select(0.0, 0.0)).expect("drop"),
            EventOutcome::Inserted { .. }
        ) {
            ed.cancel().expect("cancel");
        }
    }
    let snapshot = ed.snapshot();
    let shelf = &snapshot.shelves[0];
    for product in &snapshot.products {
        let binding = product.binding.as_ref().expect("only inserted products survive");
        let bin = shelf
            .bins
            .iter()
            .find(|b| b.column == binding.column && b.row == binding.row)
            .expect("bin exists");
        assert_eq!(bin.content.as_deref(), Some(product.id.as_str()));
    }
    assert_eq!(snapshot.products.len(), 4);
    assert_eq!(snapshot.session, PlacementState::Idle);
}

#[test]
fn json_session_round_trip() {
    init();
    let script = r#"{
      "warehouse": { "width": 50.0, "height": 10.0, "depth": 50.0 },
      "approval": "always",
      "commands": [
        { "op": "add_shelf", "id": "S1", "bin_columns": 2, "bin_rows": 2 },
        { "op": "hover", "x": 5.0, "z": 5.0 },
        { "op": "click", "x": 5.0, "z": 5.0 },
        { "op": "add_product", "name": "P1", "width": 1.5, "height": 1.5, "depth": 1.5 },
        { "op": "click", "x": 0.0, "z": 0.0 },
        { "op": "move_request", "product": "P1", "shelf": "S1", "column": 0, "row": 0 },
        { "op": "remove_shelf", "id": "S1" },
        { "op": "add_shelf", "id": "S2", "bin_columns": 2, "bin_rows": 2 },
        { "op": "input", "event": "rotate_clockwise" }
      ]
    }"#;
    let report: SessionReport =
        serde_json::from_str(&run_session_json(script).expect("run")).expect("report");
    let ok: Vec<bool> = report.outcomes.iter().map(|o| o.ok).collect();
    assert_eq!(ok, vec![true, true, true, true, true, true, false, true, true]);
    assert_eq!(
        report.outcomes[8].event,
        Some(EventOutcome::Rotated {
            shelf: "S2".into(),
            rotation: Rotation::Deg90
        })
    );
    assert_eq!(report.layout.session, PlacementState::DraggingShelf("S2".into()));
    let s1 = &report.layout.shelves[0];
    assert_eq!(s1.id, "S1");
    assert_eq!(s1.bins.iter().filter(|b| b.content.is_some()).count(), 1);
    assert!(report.layout.shelves[1].dragging);
}

#[test]
fn invalid_warehouse_falls_back_to_default() {
    let report: SessionReport = serde_json::from_str(
        &run_session_json(r#"{"warehouse": {"width": 0.0}}"#).expect("run"),
    )
    .expect("report");
    assert_eq!(report.layout.warehouse, WarehouseParams::default());
}
