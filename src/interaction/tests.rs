use super::*;
use crate::config::EditorConfig;
use crate::constants::*;
use crate::error::EditorError;
use crate::geometry::ResizeControl;
use crate::mapper::{CoordinateMapper, PageMapper};
use crate::scene::{share, Scene, SceneGraph, SceneHandle};
use crate::sheet::{Coordinate, Diagram, Label, Line, Page};
use crate::types::*;
use egui::{pos2, vec2, Rect};

fn diagram(coordinates: &[(u32, (f32, f32))], lines: &[(u32, [u32; 2])], labels: &[(&str, u32, (f32, f32))]) -> Diagram {
    Diagram {
        id: "A".into(),
        origin: (0.0, 0.0),
        zoom: 1.0,
        ground_origin: (0.0, 0.0),
        ground_size: (100.0, 100.0),
        coordinates: coordinates
            .iter()
            .map(|&(id, position)| Coordinate { id, position })
            .collect(),
        lines: lines
            .iter()
            .map(|&(id, ids)| Line {
                id,
                coordinate_ids: ids.to_vec(),
            })
            .collect(),
        labels: labels
            .iter()
            .map(|&(id, feature, position)| Label {
                id: id.into(),
                text: id.into(),
                feature_id: Some(feature),
                position,
                rotation: 0.0,
            })
            .collect(),
    }
}

/// Line 7 from ground (10,-10) to (50,-50) with its label at (30,-30).
///
/// At 4 px/mm and zoom 1 these sit at screen (40,40), (200,200) and (120,120).
fn single_line_page() -> Page {
    let mut page = Page::new(1);
    page.diagrams.push(diagram(
        &[(1, (10.0, -10.0)), (2, (50.0, -50.0))],
        &[(7, [1, 2])],
        &[("L7", 7, (30.0, -30.0))],
    ));
    page
}

/// Adds line 8 from coordinate 2 to coordinate 3 at screen (360,40), labelled
/// at screen (280,120).
fn two_line_page() -> Page {
    let mut page = Page::new(1);
    page.diagrams.push(diagram(
        &[(1, (10.0, -10.0)), (2, (50.0, -50.0)), (3, (90.0, -10.0))],
        &[(7, [1, 2]), (8, [2, 3])],
        &[("L7", 7, (30.0, -30.0)), ("L8", 8, (70.0, -30.0))],
    ));
    page
}

fn setup(page: &Page) -> (SceneHandle<Scene>, PageMapper) {
    crate::init_test_logging();
    let mapper = PageMapper::new(page, &EditorConfig::default());
    (share(Scene::from_page(page, &mapper)), mapper)
}

fn position(scene: &SceneHandle<Scene>, id: &str) -> egui::Pos2 {
    scene.borrow().position(id).unwrap()
}

#[test]
fn line_move_emits_endpoints_and_label() {
    let (scene, mapper) = setup(&single_line_page());
    let limits = mapper.area_limits(Some("A"));
    let mut mover = MoveController::new(scene.clone(), vec!["7".into()], Some(limits)).unwrap();

    mover.begin(pos2(120.0, 120.0)).unwrap();
    assert_eq!(mover.phase(), GesturePhase::Armed);
    assert_eq!(mover.update(pos2(130.0, 130.0)), Some(vec2(10.0, 10.0)));
    assert_eq!(mover.phase(), GesturePhase::Dragging);
    let event = mover.end(pos2(140.0, 140.0)).unwrap();

    assert_eq!(event.len(), 3);
    assert_eq!(event.get("1").map(|n| n.position), Some(pos2(60.0, 60.0)));
    assert_eq!(event.get("2").map(|n| n.position), Some(pos2(220.0, 220.0)));
    assert_eq!(event.get("L7").map(|n| n.position), Some(pos2(140.0, 140.0)));
    assert_eq!(mover.phase(), GesturePhase::Idle);
    assert_eq!(scene.borrow().transient_count(), 0);
}

#[test]
fn click_without_drag_leaves_scene_untouched() {
    let (scene, _) = setup(&two_line_page());
    let before = scene.borrow().clone();
    let mut mover = MoveController::new(scene.clone(), vec!["7".into()], None).unwrap();

    mover.begin(pos2(120.0, 120.0)).unwrap();
    assert!(scene.borrow().transient_count() > 0);
    assert!(mover.end(pos2(120.0, 120.0)).is_none());

    assert_eq!(*scene.borrow(), before);
}

#[test]
fn adjacent_edges_are_ghosted_and_their_labels_follow() {
    let (scene, _) = setup(&two_line_page());
    let mut mover = MoveController::new(scene.clone(), vec!["7".into()], None).unwrap();

    mover.begin(pos2(120.0, 120.0)).unwrap();
    {
        let scene = scene.borrow();
        assert!(scene.has_class("8", HIDDEN_CLASS));
        assert!(!scene.has_class("7", HIDDEN_CLASS));
        let clone = scene.edge(&format!("8{EDGE_CLONE_SUFFIX}")).unwrap();
        assert_eq!((clone.source.as_str(), clone.target.as_str()), ("2__origin", "3"));
        let vector = scene.edge(&format!("8{ADJACENT_VECTOR_SUFFIX}")).unwrap();
        assert_eq!((vector.source.as_str(), vector.target.as_str()), ("3", "2"));
        assert_eq!(scene.position("2__origin"), Some(pos2(200.0, 200.0)));
    }

    let event = mover.end(pos2(140.0, 140.0)).unwrap();
    // Line 8's midpoint moved by half the drag.
    assert_eq!(event.len(), 4);
    assert_eq!(event.get("L8").map(|n| n.position), Some(pos2(290.0, 130.0)));
    assert_eq!(position(&scene, "3"), pos2(360.0, 40.0));
    assert!(!scene.borrow().has_class("8", HIDDEN_CLASS));
    assert_eq!(scene.borrow().transient_count(), 0);
}

#[test]
fn gesture_locks_and_restores_scene_flags() {
    let (scene, _) = setup(&single_line_page());
    scene.borrow_mut().set_panning_enabled(false);
    let mut mover = MoveController::new(scene.clone(), vec!["1".into()], None).unwrap();

    mover.begin(pos2(40.0, 40.0)).unwrap();
    {
        let scene = scene.borrow();
        assert!(!scene.box_selection_enabled());
        assert_eq!(scene.cursor(), Cursor::Move);
        assert!(scene.has_listener(MOVE_LISTENER, PointerEventKind::Move));
        assert!(scene.has_listener(MOVE_LISTENER, PointerEventKind::Up));
        assert!(scene.node(MOVE_CONTROL_ID).is_some());
    }
    mover.end(pos2(50.0, 40.0));

    let scene = scene.borrow();
    assert!(scene.box_selection_enabled());
    // Panning was already off before the gesture.
    assert!(!scene.panning_enabled());
    assert_eq!(scene.cursor(), Cursor::Default);
    assert!(!scene.has_listener(MOVE_LISTENER, PointerEventKind::Move));
    assert!(!scene.has_listener(MOVE_LISTENER, PointerEventKind::Up));
}

#[test]
fn cancel_puts_everything_back() {
    let (scene, _) = setup(&two_line_page());
    let before = scene.borrow().clone();
    let mut mover = MoveController::new(scene.clone(), vec!["7".into()], None).unwrap();

    mover.begin(pos2(120.0, 120.0)).unwrap();
    mover.update(pos2(300.0, 10.0));
    assert_eq!(position(&scene, "1"), pos2(220.0, -70.0));
    mover.cancel();

    assert_eq!(*scene.borrow(), before);
    assert!(mover.update(pos2(0.0, 0.0)).is_none());
    assert!(mover.end(pos2(0.0, 0.0)).is_none());
}

#[test]
fn dropping_mid_gesture_cleans_up() {
    let (scene, _) = setup(&two_line_page());
    let before = scene.borrow().clone();
    {
        let mut mover = MoveController::new(scene.clone(), vec!["2".into()], None).unwrap();
        mover.begin(pos2(200.0, 200.0)).unwrap();
        mover.update(pos2(210.0, 190.0));
        assert!(scene.borrow().has_class("7", HIDDEN_CLASS));
    }
    assert_eq!(*scene.borrow(), before);
}

#[test]
fn updates_are_computed_from_the_start_snapshot() {
    let (scene, _) = setup(&single_line_page());
    let mut mover = MoveController::new(scene.clone(), vec!["1".into()], None).unwrap();

    mover.begin(pos2(40.0, 40.0)).unwrap();
    for step in 1..=25 {
        mover.update(pos2(40.0 + step as f32 * 0.4, 40.0));
    }
    mover.update(pos2(43.0, 41.0));
    assert_eq!(position(&scene, "1"), pos2(43.0, 41.0));
    mover.end(pos2(43.0, 41.0));
}

#[test]
fn multi_select_keeps_every_selected_element_inside_the_limits() {
    let (scene, _) = setup(&two_line_page());
    let limits = Rect::from_min_max(pos2(0.0, 0.0), pos2(400.0, 400.0));
    let selected = ["1", "3"];
    let mut mover = MoveController::new(scene.clone(), selected.map(String::from).to_vec(), Some(limits)).unwrap();
    let inside = |scene: &SceneHandle<Scene>| selected.iter().all(|id| limits.contains(position(scene, id)));

    mover.begin(pos2(40.0, 40.0)).unwrap();
    // Coordinate 3 at x=360 stops the drag to the right.
    assert_eq!(mover.update(pos2(140.0, 40.0)), Some(vec2(40.0, 0.0)));
    assert_eq!(position(&scene, "3"), pos2(400.0, 40.0));
    assert!(inside(&scene));

    // Coordinate 1 at x=40 stops the drag to the left.
    assert_eq!(mover.update(pos2(-60.0, 40.0)), Some(vec2(-40.0, 0.0)));
    assert!(inside(&scene));
    let event = mover.end(pos2(-60.0, 40.0)).unwrap();

    assert_eq!(event.get("1").map(|n| n.position), Some(pos2(0.0, 40.0)));
    assert_eq!(event.get("3").map(|n| n.position), Some(pos2(320.0, 40.0)));
}

#[test]
fn busy_scene_is_reported_instead_of_panicking() {
    let (scene, _) = setup(&single_line_page());
    let mut mover = MoveController::new(scene.clone(), vec!["1".into()], None).unwrap();

    {
        let _held = scene.borrow();
        assert!(matches!(mover.begin(pos2(40.0, 40.0)), Err(EditorError::SceneBusy)));
    }
    mover.begin(pos2(40.0, 40.0)).unwrap();
    {
        let _held = scene.borrow();
        assert!(mover.update(pos2(50.0, 40.0)).is_none());
    }
    assert_eq!(mover.phase(), GesturePhase::Armed);
    assert_eq!(position(&scene, "1"), pos2(40.0, 40.0));

    assert_eq!(mover.update(pos2(50.0, 40.0)), Some(vec2(10.0, 0.0)));
    let event = mover.end(pos2(50.0, 40.0)).unwrap();
    assert_eq!(event.get("1").map(|n| n.position), Some(pos2(50.0, 40.0)));
}

#[test]
fn broken_line_vector_starts_at_the_break_point() {
    crate::init_test_logging();
    let mut graph = Scene::new();
    graph.add_node(SceneNode::new("a", ElementKind::Coordinate, pos2(0.0, 0.0)));
    graph.add_node(SceneNode::new("b", ElementKind::Coordinate, pos2(10.0, 0.0)));
    graph.add_node(SceneNode::new("c", ElementKind::Coordinate, pos2(20.0, 0.0)));
    let data = ElementData {
        broken_coordinate_id: Some("c".into()),
        ..ElementData::with_line("9")
    };
    graph.add_edge(SceneEdge::new(format!("9{BROKEN_LINE_SUFFIX}"), ElementKind::Line, "a", "b").with_data(data));
    let scene = share(graph);

    let mut mover = MoveController::new(scene.clone(), vec!["b".into()], None).unwrap();
    mover.begin(pos2(10.0, 0.0)).unwrap();
    {
        let scene = scene.borrow();
        let vector = scene.edge(&format!("9_B{ADJACENT_VECTOR_SUFFIX}")).unwrap();
        assert_eq!(vector.source, "c");
        assert_eq!(vector.target, "b");
    }
    mover.cancel();
    assert_eq!(scene.borrow().transient_count(), 0);
}

#[test]
fn label_moves_alone() {
    let (scene, _) = setup(&two_line_page());
    let mut mover = MoveController::new(scene.clone(), vec!["L7".into()], None).unwrap();

    mover.begin(pos2(120.0, 120.0)).unwrap();
    // origin clone, move vector and the move control
    assert_eq!(scene.borrow().transient_count(), 3);
    assert!(scene.borrow().edges().all(|e| !e.classes.contains(HIDDEN_CLASS)));
    let event = mover.end(pos2(125.0, 110.0)).unwrap();

    assert_eq!(event.len(), 1);
    assert_eq!(event.elements[0].position, pos2(125.0, 110.0));
    assert_eq!(position(&scene, "1"), pos2(40.0, 40.0));
}

#[test]
fn restarting_a_gesture_cancels_the_first() {
    let (scene, _) = setup(&single_line_page());
    let mut mover = MoveController::new(scene.clone(), vec!["1".into()], None).unwrap();

    mover.begin(pos2(40.0, 40.0)).unwrap();
    mover.update(pos2(80.0, 80.0));
    mover.begin(pos2(0.0, 0.0)).unwrap();
    assert_eq!(position(&scene, "1"), pos2(40.0, 40.0));
    assert_eq!(mover.phase(), GesturePhase::Armed);

    let event = mover.end(pos2(5.0, 0.0)).unwrap();
    assert_eq!(event.get("1").map(|n| n.position), Some(pos2(45.0, 40.0)));
}

#[test]
fn unknown_selection_fails_before_any_gesture() {
    let (scene, _) = setup(&single_line_page());
    let result = MoveController::new(scene.clone(), vec!["1".into(), "nope".into()], None);
    assert!(matches!(result, Err(EditorError::UnknownElement(id)) if id == "nope"));
    assert_eq!(scene.borrow().transient_count(), 0);
}

#[test]
fn update_without_gesture_is_ignored() {
    let (scene, _) = setup(&single_line_page());
    let mut mover = MoveController::new(scene, vec!["1".into()], None).unwrap();
    assert_eq!(mover.phase(), GesturePhase::Idle);
    assert!(mover.update(pos2(10.0, 10.0)).is_none());
    assert!(mover.end(pos2(10.0, 10.0)).is_none());
}

/// Page 58 mm wide at 1 px/mm with diagram B at (10,10)-(34,22): 24 units of
/// room to the right of its east edge.
fn diagram_setup() -> (SceneHandle<Scene>, PageMapper, EditorConfig) {
    crate::init_test_logging();
    let config = EditorConfig {
        page_width_mm: 58.0,
        page_height_mm: 260.0,
        pixels_per_mm: 1.0,
        min_diagram_height_mm: 10.0,
        screen_offset: (0.0, 0.0),
    };
    let mut page = Page::new(1);
    page.diagrams.push(Diagram {
        id: "B".into(),
        origin: (10.0, 10.0),
        zoom: 2.0,
        ground_origin: (0.0, 0.0),
        ground_size: (12.0, 6.0),
        coordinates: Vec::new(),
        lines: Vec::new(),
        labels: Vec::new(),
    });
    let mapper = PageMapper::new(&page, &config);
    (share(Scene::from_page(&page, &mapper)), mapper, config)
}

#[test]
fn diagram_controls_live_as_long_as_the_controller() {
    let (scene, mapper, config) = diagram_setup();
    {
        let controls = DiagramController::new(scene.clone(), "B", &mapper, &config).unwrap();
        assert_eq!(scene.borrow().transient_count(), 9);
        let se = scene.borrow().position(&controls.handle_id(ResizeControl::SE));
        assert_eq!(se, Some(pos2(34.0, 22.0)));
        assert_eq!(scene.borrow().position(&controls.body_id()), Some(pos2(22.0, 16.0)));
    }
    assert_eq!(scene.borrow().transient_count(), 0);
}

#[test]
fn diagram_resize_is_clamped_to_the_page() {
    let (scene, mapper, config) = diagram_setup();
    let mut controls = DiagramController::new(scene.clone(), "B", &mapper, &config).unwrap();
    let handle = controls.handle_id(ResizeControl::SE);

    controls.begin(&handle, pos2(34.0, 22.0)).unwrap();
    assert_eq!(scene.borrow().cursor(), Cursor::Resize(ResizeControl::SE));
    let placement = controls.end(pos2(134.0, 32.0), &mapper).unwrap();

    assert_eq!(controls.extent(), Rect::from_min_max(pos2(10.0, 10.0), pos2(58.0, 34.0)));
    assert_eq!(placement.diagram_id, "B");
    assert_eq!(placement.origin, (10.0, 10.0));
    assert_eq!(placement.zoom, 4.0);
    assert_eq!(scene.borrow().position(&handle), Some(pos2(58.0, 34.0)));
    assert_eq!(scene.borrow().cursor(), Cursor::Default);
    assert!(!scene.borrow().has_listener(DIAGRAM_LISTENER, PointerEventKind::Up));
}

#[test]
fn diagram_never_shrinks_below_minimum_height() {
    let (scene, mapper, config) = diagram_setup();
    let mut controls = DiagramController::new(scene, "B", &mapper, &config).unwrap();
    let handle = controls.handle_id(ResizeControl::SE);

    controls.begin(&handle, pos2(34.0, 22.0)).unwrap();
    let placement = controls.end(pos2(-66.0, -78.0), &mapper).unwrap();

    let extent = controls.extent();
    assert!((extent.height() - 10.0).abs() < 1e-4, "{extent:?}");
    assert!((extent.width() - 20.0).abs() < 1e-4, "{extent:?}");
    assert_eq!(extent.min, pos2(10.0, 10.0));
    assert!((placement.zoom - 2.0 * 20.0 / 24.0).abs() < 1e-5);
}

#[test]
fn diagram_body_moves_within_the_page() {
    let (scene, mapper, config) = diagram_setup();
    let mut controls = DiagramController::new(scene.clone(), "B", &mapper, &config).unwrap();
    let body = controls.body_id();

    controls.begin(&body, pos2(22.0, 16.0)).unwrap();
    assert_eq!(controls.phase(), GesturePhase::Armed);
    assert_eq!(scene.borrow().cursor(), Cursor::Move);
    let placement = controls.end(pos2(-100.0, 20.0), &mapper).unwrap();

    assert_eq!(placement.origin, (0.0, 14.0));
    assert_eq!(placement.zoom, 2.0);
    assert_eq!(scene.borrow().position(&body), Some(pos2(12.0, 20.0)));
}

#[test]
fn diagram_cancel_restores_box_and_controls() {
    let (scene, mapper, config) = diagram_setup();
    let mut controls = DiagramController::new(scene.clone(), "B", &mapper, &config).unwrap();
    let before = scene.borrow().clone();
    let handle = controls.handle_id(ResizeControl::E);

    controls.begin(&handle, pos2(34.0, 16.0)).unwrap();
    assert!(controls.update(pos2(40.0, 16.0)).is_some());
    controls.cancel();

    assert_eq!(controls.extent(), Rect::from_min_max(pos2(10.0, 10.0), pos2(34.0, 22.0)));
    assert_eq!(*scene.borrow(), before);
    assert!(controls.end(pos2(40.0, 16.0), &mapper).is_none());
}

#[test]
fn diagram_release_without_change_emits_nothing() {
    let (scene, mapper, config) = diagram_setup();
    let mut controls = DiagramController::new(scene, "B", &mapper, &config).unwrap();
    let body = controls.body_id();
    controls.begin(&body, pos2(22.0, 16.0)).unwrap();
    assert!(controls.end(pos2(22.0, 16.0), &mapper).is_none());
    assert_eq!(controls.phase(), GesturePhase::Idle);
}

#[test]
fn diagram_errors() {
    let (scene, mapper, config) = diagram_setup();
    assert!(matches!(
        DiagramController::new(scene.clone(), "Z", &mapper, &config),
        Err(EditorError::UnknownDiagram(id)) if id == "Z"
    ));
    let mut controls = DiagramController::new(scene.clone(), "B", &mapper, &config).unwrap();
    assert!(matches!(
        controls.begin("B__handle_x", pos2(0.0, 0.0)),
        Err(EditorError::UnknownElement(_))
    ));
    let body = controls.body_id();
    {
        let _held = scene.borrow();
        assert!(matches!(controls.begin(&body, pos2(22.0, 16.0)), Err(EditorError::SceneBusy)));
    }
    assert_eq!(controls.phase(), GesturePhase::Idle);
}
