/*!
 * Process Facade Tests
 * Introspection surface of the guest-visible process object
 */

use pretty_assertions::assert_eq;
use script_host::{
    bind_process, GuestFailure, GuestValue, ProcessContext, TickQueue, RUNTIME_VERSION,
};
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn context_with_queue() -> (Arc<ProcessContext>, Arc<TickQueue>) {
    let queue = Arc::new(TickQueue::new());
    let ctx = Arc::new(ProcessContext::builder().with_scheduler(&queue).build());
    (ctx, queue)
}

#[test]
fn version_and_platform_are_bound_properties() {
    let (ctx, _queue) = context_with_queue();
    let process = bind_process(ctx);

    assert_eq!(
        process.get("version"),
        Some(GuestValue::Str(RUNTIME_VERSION.to_string()))
    );
    assert_eq!(
        process.get("platform"),
        Some(GuestValue::Str(std::env::consts::OS.to_string()))
    );
    // Documented absences: no argv, no stdin
    assert_eq!(process.get("argv"), None);
    assert!(process.child("stdin").is_none());
}

#[test]
fn binding_table_is_exactly_the_documented_surface() {
    let (ctx, _queue) = context_with_queue();
    let process = bind_process(ctx);

    assert_eq!(
        process.method_names(),
        vec![
            "abort",
            "exit",
            "getenv",
            "hrtime",
            "memoryUsage",
            "nextTick",
            "uptime",
            "versions",
        ]
    );
    assert_eq!(
        process.property_names(),
        vec!["execPath", "platform", "version"]
    );
    assert!(process.child("stdout").is_some());
    assert!(process.child("stderr").is_some());
}

#[test]
fn versions_includes_the_runtime_itself() {
    let (ctx, _queue) = context_with_queue();
    let versions = ctx.versions();
    let map = versions.as_map().unwrap();
    assert_eq!(
        map.get("script-host"),
        Some(&GuestValue::Str(RUNTIME_VERSION.to_string()))
    );
    assert!(map.contains_key("process-abi"));
}

#[test]
#[serial]
fn getenv_returns_every_live_variable_exactly() {
    std::env::set_var("SCRIPT_HOST_TEST_VAR", "round-trip ✓");
    let (ctx, _queue) = context_with_queue();

    let env = ctx.getenv();
    let map = env.as_map().unwrap();
    for (key, value) in std::env::vars() {
        assert_eq!(map.get(&key), Some(&GuestValue::Str(value)));
    }
    std::env::remove_var("SCRIPT_HOST_TEST_VAR");
}

#[test]
#[serial]
fn getenv_is_a_snapshot_not_a_live_view() {
    std::env::set_var("SCRIPT_HOST_SNAPSHOT_VAR", "before");
    let (ctx, _queue) = context_with_queue();

    let snapshot = ctx.getenv();
    std::env::set_var("SCRIPT_HOST_SNAPSHOT_VAR", "after");

    let map = snapshot.as_map().unwrap();
    assert_eq!(
        map.get("SCRIPT_HOST_SNAPSHOT_VAR"),
        Some(&GuestValue::Str("before".to_string()))
    );
    std::env::remove_var("SCRIPT_HOST_SNAPSHOT_VAR");
}

#[test]
fn memory_usage_total_covers_used() {
    let (ctx, _queue) = context_with_queue();
    let usage = ctx.memory_usage();
    let map = usage.as_map().unwrap();
    let total = map.get("heapTotal").and_then(GuestValue::as_int).unwrap();
    let used = map.get("heapUsed").and_then(GuestValue::as_int).unwrap();
    assert!(total >= used);
    assert!(used >= 0);
}

#[test]
fn uptime_is_monotonic_and_hrtime_strictly_increases() {
    let (ctx, _queue) = context_with_queue();

    let up_first = ctx.uptime();
    let hr_first = ctx.hrtime();
    thread::sleep(Duration::from_millis(5));
    let hr_second = ctx.hrtime();
    let up_second = ctx.uptime();

    assert!(up_second >= up_first);
    assert!(hr_second > hr_first);
}

#[test]
fn exit_with_bad_argument_is_a_catchable_error() {
    let (ctx, _queue) = context_with_queue();
    let process = bind_process(ctx);

    let outcome = process.call("exit", &[GuestValue::Str("not a code".into())]);
    match outcome {
        Err(failure) => assert!(failure.catchable()),
        Ok(_) => panic!("exit must not return a value"),
    }
}

#[test]
fn exit_truncates_float_codes_toward_zero() {
    let (ctx, _queue) = context_with_queue();
    let process = bind_process(ctx);

    match process.call("exit", &[GuestValue::Float(7.9)]) {
        Err(GuestFailure::Exit(signal)) => {
            assert_eq!(signal.code, 7);
            assert!(!signal.fatal);
        }
        other => panic!("expected a termination signal, got {:?}", other),
    }
}

#[test]
fn unknown_member_calls_are_rejected() {
    let (ctx, _queue) = context_with_queue();
    let process = bind_process(ctx);

    let outcome = process.call("kill", &[]);
    assert!(matches!(outcome, Err(failure) if failure.catchable()));
}

#[test]
fn exec_path_is_best_effort_string() {
    let (ctx, _queue) = context_with_queue();
    match ctx.exec_path() {
        GuestValue::Str(path) => assert!(!path.is_empty()),
        GuestValue::Undefined => (), // acceptable on hosts without a resolvable exe
        other => panic!("unexpected execPath value: {:?}", other),
    }
}

#[test]
fn next_tick_after_queue_teardown_is_catchable() {
    let queue = Arc::new(TickQueue::new());
    let ctx = ProcessContext::builder().with_scheduler(&queue).build();
    drop(queue);

    let outcome = ctx.next_tick(Box::new(|| Ok(())));
    assert!(matches!(outcome, Err(failure) if failure.catchable()));
}

#[test]
fn emit_delegates_to_the_composed_capability() {
    let (ctx, _queue) = context_with_queue();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    ctx.events().on(
        "exit",
        Arc::new(move |payload: &GuestValue| {
            sink.lock().push(payload.clone());
        }),
    );

    assert!(ctx.events().emit("exit", &GuestValue::Int(3)));
    assert!(!ctx.events().emit("unheard", &GuestValue::Undefined));
    assert_eq!(&*seen.lock(), &vec![GuestValue::Int(3)]);
}
