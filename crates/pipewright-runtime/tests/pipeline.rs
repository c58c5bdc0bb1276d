//! End-to-end pipeline execution.

mod common;

use common::*;
use pipewright_runtime::executor::Stage;
use pipewright_runtime::prelude::*;
use serde_json::{Value, json};

#[tokio::test]
async fn series_stops_at_first_failure() {
    let first = Calls::new();
    let second = Calls::new();
    let third = Calls::new();

    let pipeline = Pipeline::builder("series")
        .unwrap()
        .add_series(counted("first", &first), None)
        .then(failing("second", &second, "disk full"), None)
        .end(counted("third", &third), None)
        .build();

    let error = pipeline.execute(Payload::empty()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transform);
    assert_eq!(error.transform.as_deref(), Some("second"));
    assert_eq!(error.message.as_deref(), Some("disk full"));
    assert_eq!((first.count(), second.count(), third.count()), (1, 1, 0));
}

#[tokio::test]
async fn pipeline_stops_issuing_stages_after_failure() {
    let later = Calls::new();
    let pipeline = Pipeline::builder("stages")
        .unwrap()
        .add_step(failing("broken", &Calls::new(), "nope"), None)
        .add_step(counted("later", &later), None)
        .build();

    assert!(pipeline.execute(Payload::empty()).await.is_err());
    assert_eq!(later.count(), 0);
}

#[tokio::test]
async fn series_threads_output_to_next_step() {
    let pipeline = Pipeline::builder("threaded")
        .unwrap()
        .add_series(Transform::in_out(Append("a")), None)
        .then(Transform::in_out(Append("b")), None)
        .end(Transform::in_out(Append("c")), None)
        .add_step(Transform::in_out(Append("d")), None)
        .build();

    let output = pipeline.execute(Payload::empty()).await.unwrap();
    assert_eq!(output, Payload::new(json!(["a", "b", "c", "d"])));
}

#[tokio::test]
async fn parallel_runs_every_branch_despite_failures() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("fan-out")
        .unwrap()
        .add_parallel(delayed_failure(30, &calls, "slow failure").with_name("slow"), None)
        .also(delayed(0, &calls).with_name("fast"), Some(json!(1)))
        .also(delayed_failure(10, &calls, "quick failure").with_name("quick"), None)
        .end(delayed(20, &calls).with_name("steady"), MergePolicy::merged(), Some(json!(2)))
        .build();

    let error = pipeline.execute(Payload::empty()).await.unwrap_err();

    assert_eq!(calls.count(), 4);
    assert!(error.is_composite());
    let failed: Vec<_> = error
        .causes()
        .iter()
        .map(|cause| cause.transform.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(failed, ["slow", "quick"]);
}

#[tokio::test]
async fn attributes_skip_branches_without_output() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("attributes")
        .unwrap()
        .add_parallel_keyed("A", delayed(20, &calls), Some(json!({ "x": 1 })))
        .also_keyed("B", delayed(0, &calls), None)
        .end_keyed("C", delayed(10, &calls), MergePolicy::attributes(), Some(json!({ "y": 2 })))
        .build();

    let output = pipeline.execute(Payload::empty()).await.unwrap();
    assert_eq!(output, Payload::new(json!({ "A": { "x": 1 }, "C": { "y": 2 } })));
}

#[tokio::test]
async fn attributes_suffix_repeated_transforms_in_declaration_order() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("suffixes")
        .unwrap()
        .add_parallel(delayed(30, &calls), Some(json!("first")))
        .also(delayed(15, &calls), Some(json!("second")))
        .end(delayed(0, &calls), MergeMode::AsAttributes, Some(json!("third")))
        .build();

    let output = pipeline.execute(Payload::empty()).await.unwrap();
    assert_eq!(
        output,
        Payload::new(json!({
            "Delayed": "first",
            "Delayed_1": "second",
            "Delayed_2": "third",
        }))
    );
}

#[tokio::test]
async fn explicit_keys_are_never_overwritten_by_suffixes() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("collisions")
        .unwrap()
        .add_parallel_keyed("Lint_1", delayed(0, &calls), Some(json!("explicit")))
        .also_keyed("Lint", delayed(0, &calls), Some(json!("first")))
        .end_keyed("Lint", delayed(0, &calls), MergePolicy::attributes(), Some(json!("second")))
        .build();

    let output = pipeline.execute(Payload::empty()).await.unwrap();
    assert_eq!(
        output,
        Payload::new(json!({
            "Lint_1": "explicit",
            "Lint": "first",
            "Lint_2": "second",
        }))
    );
}

#[tokio::test]
async fn merged_outputs_let_later_branches_win() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("merged")
        .unwrap()
        .add_parallel(delayed(20, &calls), Some(json!({ "x": 1 })))
        .end(delayed(0, &calls), MergePolicy::merged(), Some(json!({ "x": 2, "y": 3 })))
        .build();

    let output = pipeline.execute(Payload::empty()).await.unwrap();
    assert_eq!(output, Payload::new(json!({ "x": 2, "y": 3 })));
}

#[tokio::test]
async fn merge_function_receives_defined_outputs_in_declaration_order() {
    let calls = Calls::new();
    let policy = MergePolicy::function(|outputs: Vec<Value>| async move {
        Ok(Payload::new(Value::Array(outputs)))
    });

    let pipeline = Pipeline::builder("merge-function")
        .unwrap()
        .add_parallel(delayed(20, &calls), Some(json!("a")))
        .also(delayed(10, &calls), None)
        .end(delayed(0, &calls), policy, Some(json!("c")))
        .build();

    let output = pipeline.execute(Payload::empty()).await.unwrap();
    assert_eq!(output, Payload::new(json!(["a", "c"])));
}

#[tokio::test]
async fn merge_function_mode_without_function_always_fails() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("no-function")
        .unwrap()
        .add_parallel(counted("a", &calls), None)
        .end(counted("b", &calls), MergeMode::AsMergeFunction, None)
        .build();

    for run in 1..=2 {
        let error = pipeline.execute(Payload::new(json!(1))).await.unwrap_err();
        assert!(error.is_configuration());
        assert_eq!(calls.count(), 2 * run);
    }
}

#[tokio::test]
async fn branch_failures_take_precedence_over_missing_merge_function() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("no-function")
        .unwrap()
        .add_parallel(failing("broken", &calls, "lint failed"), None)
        .end(counted("fine", &calls), MergeMode::AsMergeFunction, None)
        .build();

    let error = pipeline.execute(Payload::empty()).await.unwrap_err();
    assert!(error.is_composite());
    assert_eq!(error.causes().len(), 1);
    assert_eq!(error.causes()[0].transform.as_deref(), Some("broken"));
    assert_eq!(calls.count(), 2);
}

#[tokio::test]
async fn void_and_piped_in_ignore_branch_outputs() {
    let calls = Calls::new();
    let input = Payload::new(json!({ "root": "src" }));

    let build = |policy: MergePolicy| {
        Pipeline::builder("ignore")
            .unwrap()
            .add_parallel(delayed(0, &calls), Some(json!({ "a": 1 })))
            .end(delayed(0, &calls), policy, Some(json!({ "b": 2 })))
            .build()
    };

    let output = build(MergePolicy::void()).execute(input.clone()).await.unwrap();
    assert!(output.is_empty());

    let output = build(MergePolicy::piped_in()).execute(input.clone()).await.unwrap();
    assert_eq!(output, input);
    assert_eq!(calls.count(), 4);
}

#[tokio::test]
async fn empty_pipeline_round_trips_payload() {
    let pipeline = Pipeline::builder("empty").unwrap().build();
    let payload = Payload::new(json!({ "nested": { "list": [1, 2, 3] } }));

    assert_eq!(pipeline.execute(payload.clone()).await.unwrap(), payload);
}

#[tokio::test]
async fn read_only_profiles_do_not_leak_mutations() {
    let payload = Payload::new(json!({ "keep": 1, "also": 2 }));

    let pipeline = Pipeline::builder("isolation")
        .unwrap()
        .add_step(Transform::input(Vandal), None)
        .add_parallel(Transform::input(Vandal), None)
        .end(Transform::payload_in(KeyedVandal), MergePolicy::piped_in(), Some(json!("keep")))
        .add_step(Transform::payload_in(KeyedVandal), Some(json!("also")))
        .build();

    assert_eq!(pipeline.execute(payload.clone()).await.unwrap(), payload);
}

#[tokio::test]
async fn bulk_helpers_fail_at_assembly() {
    let calls = Calls::new();

    let error = Pipeline::builder("bulk")
        .unwrap()
        .series(vec![counted("a", &calls), counted("b", &calls)], vec![None])
        .unwrap_err();
    assert!(error.is_configuration());

    let error = Pipeline::builder("bulk")
        .unwrap()
        .parallels(vec![counted("a", &calls)], MergePolicy::void(), vec![None])
        .unwrap_err();
    assert!(error.is_configuration());

    let error = Pipeline::builder("bulk")
        .unwrap()
        .add_steps(
            vec![counted("a", &calls)],
            Overrides::Each(vec![None, Some(json!(1))]),
        )
        .unwrap_err();
    assert!(error.is_configuration());

    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn bulk_parallels_merge_like_fluent_ones() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("bulk")
        .unwrap()
        .parallels(
            vec![delayed(10, &calls), delayed(0, &calls)],
            MergePolicy::attributes(),
            vec![Some(json!(1)), Some(json!(2))],
        )
        .unwrap()
        .build();

    let output = pipeline.execute(Payload::empty()).await.unwrap();
    assert_eq!(output, Payload::new(json!({ "Delayed": 1, "Delayed_1": 2 })));
}

#[tokio::test]
async fn nested_pipeline_runs_as_one_stage() {
    let inner = Pipeline::builder("inner")
        .unwrap()
        .add_step(Transform::in_out(Append("inner-1")), None)
        .add_step(Transform::in_out(Append("inner-2")), None)
        .build();

    let outer = Pipeline::builder("outer")
        .unwrap()
        .add_step(Transform::in_out(Append("before")), None)
        .add_pipeline(inner)
        .add_step(Transform::in_out(Append("after")), None)
        .build();

    assert!(matches!(outer.stages()[1], Stage::Pipeline(_)));
    let output = outer.execute(Payload::empty()).await.unwrap();
    assert_eq!(
        output,
        Payload::new(json!(["before", "inner-1", "inner-2", "after"]))
    );
}

#[tokio::test]
async fn panicking_branch_is_reported_with_siblings() {
    let calls = Calls::new();

    let pipeline = Pipeline::builder("panics")
        .unwrap()
        .add_parallel(Transform::independent(Panicky), None)
        .end(counted("survivor", &calls), MergePolicy::void(), None)
        .build();

    let error = pipeline.execute(Payload::empty()).await.unwrap_err();
    assert_eq!(calls.count(), 1);
    assert_eq!(error.causes().len(), 1);
    assert_eq!(error.causes()[0].kind(), ErrorKind::Unknown);
    assert_eq!(error.causes()[0].message.as_deref(), Some("branch exploded"));
}

#[tokio::test]
async fn concurrent_executions_are_independent() {
    let pipeline = Pipeline::builder("shared")
        .unwrap()
        .add_step(Transform::in_out(Append("step")), None)
        .build();

    let (left, right) = tokio::join!(
        pipeline.execute(Payload::new(json!(["left"]))),
        pipeline.execute(Payload::new(json!(["right"]))),
    );

    assert_eq!(left.unwrap(), Payload::new(json!(["left", "step"])));
    assert_eq!(right.unwrap(), Payload::new(json!(["right", "step"])));
}
