//! End-to-end navigation scenarios on a headless environment
//!
//! The tree used throughout:
//!
//! ```text
//! root (tabs)
//! ├── A
//! ├── B (stack)
//! │   ├── B1
//! │   └── B2
//! └── C
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use waypoint::{
    Component, Content, Environment, HeadlessHost, HeadlessPresenter, InteractiveTransition,
    NavigationError, Navigator, NavigatorConfig, NavigatorEvent, Path, PendingCommit, PresenterOp, Step,
    TransitionDirection, TransitionPhase,
};

fn tree() -> Component {
    Component::tabs("root")
        .child(Component::leaf("A"))
        .child(
            Component::stack("B")
                .child(Component::leaf("B1"))
                .child(Component::leaf("B2")),
        )
        .child(Component::leaf("C"))
        .build()
}

struct Fixture {
    navigator: Navigator,
    host: Arc<HeadlessHost>,
    presenter: Arc<HeadlessPresenter>,
}

fn setup() -> Fixture {
    let host = Arc::new(HeadlessHost::new());
    let presenter = Arc::new(HeadlessPresenter::new());
    let env = Environment::new(host.clone(), presenter.clone());
    let navigator = Navigator::spawn(tree(), env, NavigatorConfig::default());
    Fixture {
        navigator,
        host,
        presenter,
    }
}

/// Live children of the container named `id` under the root
fn container(navigator: &Navigator, id: &str) -> Content {
    navigator
        .root_content()
        .live_children()
        .into_iter()
        .find(|c| c.tag().as_str() == id)
        .unwrap()
}

fn tags(list: &[Content]) -> Vec<String> {
    list.iter().map(|c| c.tag().to_string()).collect()
}

#[tokio::test]
async fn test_navigate_into_nested_stack() {
    let fx = setup();
    assert_eq!(fx.navigator.current_location(), Path::from(["A"]));
    // root, A, B, B1, C
    assert_eq!(fx.host.created_count(), 5);

    let b1_before = container(&fx.navigator, "B").live_children()[0].clone();

    let fired = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = tokio::sync::oneshot::channel();
    {
        let fired = Arc::clone(&fired);
        fx.navigator
            .navigate_with(Path::from(["B", "B2"]), move |result| {
                fired.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(result);
            });
    }
    let report = rx.await.unwrap().unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(report.location, Path::from(["B", "B2"]));
    assert_eq!(report.created, 1);
    assert_eq!(fx.navigator.current_location(), Path::from(["B", "B2"]));

    let root_surface = fx.navigator.root_content().surface().unwrap();
    assert_eq!(root_surface.active_index(), Some(1));

    let stack = container(&fx.navigator, "B").live_children();
    assert_eq!(tags(&stack), vec!["B1", "B2"]);
    assert!(stack[0].same_instance(&b1_before));
    assert_eq!(fx.host.created_count(), 6);
}

#[tokio::test]
async fn test_unreachable_step_changes_nothing() {
    let fx = setup();
    let before = tags(&fx.navigator.root_content().live_children());

    let err = fx.navigator.navigate(Path::from(["Z"])).await.unwrap_err();
    assert_eq!(err, NavigationError::unreachable(&"Z".into()));

    assert_eq!(tags(&fx.navigator.root_content().live_children()), before);
    assert_eq!(fx.navigator.current_location(), Path::from(["A"]));
    assert!(fx.presenter.ops().is_empty());
    assert_eq!(fx.host.created_count(), 5);
}

#[tokio::test]
async fn test_unreachable_tail_leaves_prefix_untouched() {
    let fx = setup();

    let err = fx
        .navigator
        .navigate(Path::from(["B", "B9"]))
        .await
        .unwrap_err();
    assert_eq!(err, NavigationError::unreachable(&"B9".into()));

    // B was never activated.
    assert_eq!(fx.navigator.current_location(), Path::from(["A"]));
    assert!(fx.presenter.ops().is_empty());
}

#[tokio::test]
async fn test_repeat_navigation_is_idempotent() {
    let fx = setup();
    fx.navigator.navigate(Path::from(["B", "B2"])).await.unwrap();
    let created = fx.host.created_count();
    fx.presenter.take_ops();

    let report = fx.navigator.navigate(Path::from(["B", "B2"])).await.unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(fx.host.created_count(), created);
    assert!(fx.presenter.ops().is_empty());
    assert_eq!(fx.navigator.current_location(), Path::from(["B", "B2"]));
}

#[tokio::test]
async fn test_identity_preserved_across_pop_and_push() {
    let fx = setup();
    fx.navigator.navigate(Path::from(["B", "B2"])).await.unwrap();
    let first = container(&fx.navigator, "B").live_children();

    fx.navigator.navigate(Path::from(["B", "B1"])).await.unwrap();
    let popped = container(&fx.navigator, "B").live_children();
    assert_eq!(tags(&popped), vec!["B1"]);
    assert!(popped[0].same_instance(&first[0]));

    fx.navigator.navigate(Path::from(["B", "B2"])).await.unwrap();
    let pushed = container(&fx.navigator, "B").live_children();
    assert!(pushed[0].same_instance(&first[0]));
    // The dropped B2 is gone for good; a fresh one takes its place.
    assert!(!pushed[1].same_instance(&first[1]));
}

#[tokio::test]
async fn test_tab_switch_keeps_stack_state() {
    let fx = setup();
    fx.navigator.navigate(Path::from(["B", "B2"])).await.unwrap();
    fx.navigator.navigate(Path::from(["C"])).await.unwrap();
    assert_eq!(fx.navigator.current_location(), Path::from(["C"]));

    fx.navigator.navigate(Path::from(["B"])).await.unwrap();
    assert_eq!(fx.navigator.current_location(), Path::from(["B", "B2"]));
}

#[tokio::test]
async fn test_step_relative_to_active_container() {
    let fx = setup();
    fx.navigator.navigate(Path::from(["B", "B1"])).await.unwrap();

    // B2 is only reachable through B, which is already active.
    let report = fx.navigator.navigate(Path::from(["B2"])).await.unwrap();
    assert_eq!(report.location, Path::from(["B", "B2"]));
}

#[tokio::test]
async fn test_payload_delivered_to_target() {
    let fx = setup();
    let path: Path = vec![
        Step::new("B"),
        Step::new("B2").with_payload(json!({ "post": 42 })),
    ]
    .into();
    fx.navigator.navigate(path).await.unwrap();

    let b2 = container(&fx.navigator, "B").live_children()[1].clone();
    assert_eq!(fx.host.payload(b2.screen()), Some(json!({ "post": 42 })));
}

#[tokio::test]
async fn test_inanimate_step_commits_without_animation() {
    let fx = setup();
    let path: Path = vec![Step::new("B"), Step::new("B2").animated(false)].into();
    fx.navigator.navigate(path).await.unwrap();

    assert!(fx.presenter.ops().contains(&PresenterOp::SetStack {
        container: "B".into(),
        screens: vec!["B1".into(), "B2".into()],
        animated: false,
    }));
}

#[tokio::test]
async fn test_finished_back_gesture_publishes_location() {
    let fx = setup();
    fx.navigator.navigate(Path::from(["B", "B2"])).await.unwrap();
    let b2 = container(&fx.navigator, "B").live_children()[1].clone();
    let mut events = fx.navigator.subscribe();

    let surface = container(&fx.navigator, "B").surface().unwrap().clone();
    let transition = InteractiveTransition::new();
    let pending = PendingCommit::back(surface, true).unwrap();

    transition.begin(TransitionDirection::Hide, pending).unwrap();
    transition.update(0.6).unwrap();
    assert_eq!(
        transition.phase(),
        TransitionPhase::Interacting {
            direction: TransitionDirection::Hide,
            progress: 0.6
        }
    );

    let report = fx.navigator.finish_transition(&transition).await.unwrap();
    assert_eq!(transition.phase(), TransitionPhase::Idle);
    assert_eq!(report.location, Path::from(["B", "B1"]));
    assert_eq!(fx.navigator.current_location(), Path::from(["B", "B1"]));
    assert_eq!(
        fx.navigator.history(),
        vec![Path::from(["A"]), Path::from(["B", "B2"]), Path::from(["B", "B1"])]
    );

    assert!(matches!(events.recv().await.unwrap(), NavigatorEvent::Started { .. }));
    assert!(matches!(
        events.recv().await.unwrap(),
        NavigatorEvent::Completed { location, .. } if location == Path::from(["B", "B1"])
    ));
    assert_eq!(fx.presenter.released(), vec![b2.tag().clone()]);
}

#[tokio::test]
async fn test_cancelled_gesture_keeps_stack() {
    let fx = setup();
    fx.navigator.navigate(Path::from(["B", "B2"])).await.unwrap();
    fx.presenter.take_ops();

    let surface = container(&fx.navigator, "B").surface().unwrap().clone();
    let transition = InteractiveTransition::new();
    transition
        .begin(TransitionDirection::Hide, PendingCommit::back(surface, true).unwrap())
        .unwrap();
    transition.update(0.3).unwrap();

    let restored = transition.cancel().unwrap();
    assert_eq!(tags(&restored), vec!["B1", "B2"]);
    assert!(fx.presenter.ops().is_empty());

    let report = fx.navigator.navigate(Path::new()).await.unwrap();
    assert_eq!(report.location, Path::from(["B", "B2"]));
}

#[tokio::test]
async fn test_overlay_presents_and_unwinds() {
    let root = Component::overlay("root")
        .child(Component::leaf("main"))
        .child(Component::leaf("compose"))
        .child(Component::leaf("confirm"))
        .build();
    let presenter = Arc::new(HeadlessPresenter::new());
    let env = Environment::new(Arc::new(HeadlessHost::new()), presenter.clone());
    let navigator = Navigator::spawn(root, env, NavigatorConfig::default());

    navigator.navigate(Path::from(["confirm"])).await.unwrap();
    assert_eq!(navigator.current_location(), Path::from(["confirm"]));
    assert_eq!(
        tags(&navigator.root_content().live_children()),
        vec!["main", "compose", "confirm"]
    );

    presenter.take_ops();
    navigator.navigate(Path::from(["main"])).await.unwrap();
    assert_eq!(navigator.current_location(), Path::from(["main"]));

    let ops = presenter.ops();
    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[0], PresenterOp::Dismiss { screen, .. } if screen.as_str() == "confirm"));
    assert!(matches!(&ops[1], PresenterOp::Dismiss { screen, .. } if screen.as_str() == "compose"));
    assert_eq!(
        presenter.released(),
        vec![waypoint::Identity::from("compose"), waypoint::Identity::from("confirm")]
    );
}
