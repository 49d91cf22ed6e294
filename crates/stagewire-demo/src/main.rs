//! Scripted stagewire walkthrough.
//!
//! Builds a stage with a panel and two cards, wires wireframe proxies
//! over the cards, then replays a drag and a corner resize against one
//! wireframe while mirroring geometry back to its card.

use kurbo::{Point, Size};
use stagewire_core::{
    BoxRect, GeometryStore, MemoryStore, PointerEvent, PointerId, ResizableBox, ResizeCallbacks,
    ResizeOptions, Stage, WireframeMirror, make_wireframe_resizable, marker,
};
use std::rc::Rc;

fn main() {
    env_logger::init();
    log::info!("Starting stagewire demo");

    if let Err(err) = run() {
        log::error!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut stage = Stage::new(Size::new(800.0, 600.0));
    let root = stage.root();
    let panel = stage
        .insert(root, BoxRect::new(40.0, 40.0, 640.0, 480.0))
        .ok_or("panel insert failed")?;
    let card = stage
        .insert(panel, BoxRect::new(20.0, 30.0, 160.0, 120.0))
        .ok_or("card insert failed")?;
    let note = stage
        .insert(panel, BoxRect::new(60.0, 240.0, 200.0, 90.0))
        .ok_or("note insert failed")?;

    let mut mirror = WireframeMirror::new();
    let wires = mirror.create_wireframes(&mut stage, &[card, note])?;
    log::info!("created {} wireframes", wires.len());

    let options = ResizeOptions::from_json(
        r#"{ "min_width": 24.0, "min_height": 24.0, "invert_on_container_edge": true }"#,
    )?;
    let mut card_box = make_wireframe_resizable(&mut stage, &mirror, wires[0], options)?;
    card_box.set_callbacks(
        ResizeCallbacks::default()
            .on_start(|event| log::info!("gesture started at {:?}", event.position()))
            .on_end(|event| log::info!("gesture ended at {:?}", event.position())),
    );

    let store = Rc::new(MemoryStore::new());
    card_box.bind_store(&mut stage, Box::new(Rc::clone(&store)));

    // Drag the card by its wireframe body.
    drive(
        &mut stage,
        &mut mirror,
        &mut card_box,
        &[
            PointerEvent::Down {
                pointer: PointerId(1),
                position: Point::new(100.0, 100.0),
                target: wires[0],
            },
            PointerEvent::Move {
                pointer: PointerId(1),
                position: Point::new(220.0, 160.0),
            },
            PointerEvent::Up {
                pointer: PointerId(1),
                position: Point::new(220.0, 160.0),
            },
        ],
    );
    log::info!("card after drag: {:?}", stage.rect(card));

    // Grow the card from its bottom-right handle.
    let handle = stage
        .children(wires[0])
        .iter()
        .copied()
        .find(|&node| stage.marker(node, marker::HANDLE) == Some("bottom-right"))
        .ok_or("missing bottom-right handle")?;
    drive(
        &mut stage,
        &mut mirror,
        &mut card_box,
        &[
            PointerEvent::Down {
                pointer: PointerId(1),
                position: Point::new(300.0, 250.0),
                target: handle,
            },
            PointerEvent::Move {
                pointer: PointerId(1),
                position: Point::new(380.0, 300.0),
            },
            PointerEvent::Up {
                pointer: PointerId(1),
                position: Point::new(380.0, 300.0),
            },
        ],
    );
    log::info!("card after resize: {:?}", stage.rect(card));
    log::info!(
        "stored geometry: {:?}",
        store.load(&card_box.box_id().to_string())?
    );

    // Mirroring also runs target to wireframe.
    stage.set_rect(note, BoxRect::new(80.0, 260.0, 220.0, 100.0));
    mirror.sync(&mut stage);
    log::info!("note wireframe follows: {:?}", stage.rect(wires[1]));

    mirror.dispose(&mut stage);
    log::info!("mirror disposed, {} pairs left", mirror.pair_count());
    Ok(())
}

/// Replay events against one controller, mirroring after each step.
fn drive(
    stage: &mut Stage,
    mirror: &mut WireframeMirror,
    rb: &mut ResizableBox,
    events: &[PointerEvent],
) {
    for event in events {
        rb.handle_event(stage, event);
        mirror.sync(stage);
    }
}
