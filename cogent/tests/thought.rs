mod common;

use common::{Log, state};
use cogent::{
    ListenerOptions, Middleware, Registry, State, StepResult, Thought, listeners::Listeners, stage,
    testing::{RecordingStep, SpyListener},
};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_named_stages_process_registered_middleware() {
    let registry = Registry::new();
    let steps: Vec<_> = stage::ALL.iter().map(|_| RecordingStep::new()).collect();
    registry.hear_middleware(steps[0].clone());
    registry.listen_middleware(steps[1].clone());
    registry.understand_middleware(steps[2].clone());
    registry.act_middleware(steps[3].clone());
    registry.respond_middleware(steps[4].clone());
    registry.remember_middleware(steps[5].clone());

    for (name, step) in stage::ALL.into_iter().zip(&steps) {
        let mut state = state();
        let completed = Thought::builder(name)
            .build(&registry)
            .unwrap()
            .process(&mut state)
            .await
            .unwrap();

        assert!(completed, "{name} should complete");
        assert_eq!(step.count(), 1, "{name} middleware should run once");
        assert!(state.processed().contains(name));
    }
}

#[tokio::test]
async fn test_listener_callback_runs_between_middleware_and_action() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let (v, m, l, a) = (order.clone(), order.clone(), order.clone(), order.clone());

    let mut middleware = Middleware::new("test");
    middleware.register(move |_: &mut State| {
        m.lock().unwrap().push("middleware");
        StepResult::Continue
    });
    let mut listeners = Listeners::new();
    listeners.custom(
        |_| true,
        move |_| l.lock().unwrap().push("listener"),
        ListenerOptions::new(),
    );

    let completed = Thought::builder("test")
        .validate(move |_| {
            v.lock().unwrap().push("validate");
            true
        })
        .middleware(middleware)
        .listeners(listeners)
        .action(move |_| a.lock().unwrap().push("action"))
        .build(&Registry::new())
        .unwrap()
        .process(&mut state())
        .await
        .unwrap();

    assert!(completed);
    assert_eq!(
        *order.lock().unwrap(),
        vec!["validate", "middleware", "listener", "action"]
    );
}

#[tokio::test]
async fn test_forced_listener_runs_after_match() {
    let log = Log::new();
    let mut listeners = Listeners::new();
    listeners.custom(|_| true, log.push("A"), ListenerOptions::new());
    listeners.custom(|_| true, log.push("B"), ListenerOptions::forced());

    Thought::builder("test")
        .middleware(Middleware::new("test"))
        .listeners(listeners)
        .build(&Registry::new())
        .unwrap()
        .process(&mut state())
        .await
        .unwrap();

    assert_eq!(log.entries(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_finish_stops_listeners_and_timestamp() {
    let log = Log::new();
    let mut listeners = Listeners::new();
    listeners.custom(|_| true, |state| state.finish(), ListenerOptions::new());
    listeners.custom(|_| true, log.push("B"), ListenerOptions::forced());

    let mut state = state();
    let completed = Thought::builder("test")
        .middleware(Middleware::new("test"))
        .listeners(listeners)
        .build(&Registry::new())
        .unwrap()
        .process(&mut state)
        .await
        .unwrap();

    assert!(!completed);
    assert!(log.entries().is_empty());
    assert!(!state.processed().contains("test"));
}

#[tokio::test]
async fn test_action_called_once_on_completion() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = calls.clone();

    Thought::builder("test")
        .middleware(Middleware::new("test"))
        .action(move |completed| seen.lock().unwrap().push(completed))
        .build(&Registry::new())
        .unwrap()
        .process(&mut state())
        .await
        .unwrap();

    assert_eq!(*calls.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn test_unmatched_listeners_give_false() {
    let spy = SpyListener::new(false);
    let mut listeners = Listeners::new();
    listeners.add(spy.clone(), ListenerOptions::new());

    let mut state = state();
    let completed = Thought::builder("test")
        .middleware(Middleware::new("test"))
        .listeners(listeners)
        .build(&Registry::new())
        .unwrap()
        .process(&mut state)
        .await
        .unwrap();

    assert!(!completed);
    assert_eq!(spy.match_count(), 1);
    assert_eq!(spy.call_count(), 0);
    assert!(state.processed().is_empty());
}

#[tokio::test]
async fn test_listener_error_reports_false_to_action() {
    let spy = SpyListener::new(true);
    spy.set_error("matcher exploded");
    let mut listeners = Listeners::new();
    listeners.insert("spy", spy, ListenerOptions::new());
    let flag = Arc::new(Mutex::new(None));
    let seen = flag.clone();

    let err = Thought::builder("test")
        .middleware(Middleware::new("test"))
        .listeners(listeners)
        .action(move |completed| *seen.lock().unwrap() = Some(completed))
        .build(&Registry::new())
        .unwrap()
        .process(&mut state())
        .await
        .unwrap_err();

    assert!(matches!(err, cogent::CogentError::Listener { ref name, .. } if name == "spy"));
    assert_eq!(*flag.lock().unwrap(), Some(false));
}
