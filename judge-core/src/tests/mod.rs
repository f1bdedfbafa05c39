
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

use crate::{
    engine::Prepared,
    job::JobId,
    judge::Judge,
    languages,
    types::{Language, OutcomeStatus, Submission, TestCase},
    workspace::Workspace,
};
use utils::{short_timeout_engine, skip_if_not_available, test_engine};

fn submission(language: Language, code: &str) -> Submission {
    Submission {
        language,
        code: code.to_string(),
    }
}

fn case(input: &str, expected: &str) -> TestCase {
    TestCase {
        input: input.to_string(),
        expected: expected.to_string(),
    }
}

async fn run_once(
    engine: &crate::engine::ExecutionEngine,
    sub: &Submission,
    input: &str,
) -> crate::types::ExecutionOutcome {
    let job = match engine.prepare(sub).await.unwrap() {
        Prepared::Runnable(job) => job,
        Prepared::CompileFailed(outcome) => return outcome,
    };
    let input = engine.materialize_input(input).await.unwrap();
    engine.run(&job, &input).await.unwrap()
}

#[tokio::test]
async fn python_echoes_stdin() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path()).await;

    let outcome = run_once(
        &engine,
        &submission(Language::Python, fixtures::PYTHON_ECHO),
        "judge input\n",
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(outcome.stdout.trim(), "judge input");
}

#[tokio::test]
async fn python_sums_two_integers() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path()).await;

    let outcome = run_once(
        &engine,
        &submission(Language::Python, fixtures::PYTHON_SUM),
        "2 3",
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.stdout.trim(), "5");
}

#[tokio::test]
async fn python_runtime_failure_is_classified() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path()).await;

    let outcome = run_once(
        &engine,
        &submission(Language::Python, fixtures::PYTHON_FAIL),
        "",
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::RuntimeFailed);
    assert_eq!(outcome.exit_code, Some(3));
    assert!(outcome.stderr.contains("boom"));
}

#[tokio::test]
async fn sleeping_program_times_out_within_budget() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = short_timeout_engine(dir.path(), 1).await;

    let started = Instant::now();
    let outcome = run_once(
        &engine,
        &submission(Language::Python, fixtures::PYTHON_SLEEP),
        "",
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::Timeout);
    assert_eq!(outcome.duration, Duration::from_secs(1));
    // the caller gets control back shortly after the deadline, never hangs
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn cpp_compiles_once_and_runs_per_case() {
    if skip_if_not_available(&["g++"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path()).await;

    let job = match engine
        .prepare(&submission(Language::Cpp, fixtures::CPP_ECHO))
        .await
        .unwrap()
    {
        Prepared::Runnable(job) => job,
        Prepared::CompileFailed(outcome) => panic!("unexpected compile failure: {:?}", outcome),
    };

    // the prepared binary is reused for both runs, no recompilation
    for payload in ["first", "second"] {
        let input = engine.materialize_input(payload).await.unwrap();
        let outcome = engine.run(&job, &input).await.unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Succeeded);
        assert_eq!(outcome.stdout.trim(), payload);
    }
}

#[tokio::test]
async fn cpp_prints_hello_with_empty_input() {
    if skip_if_not_available(&["g++"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path()).await;

    let outcome = run_once(&engine, &submission(Language::Cpp, fixtures::CPP_HELLO), "").await;

    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.stdout.trim(), "Hello");
}

#[tokio::test]
async fn cpp_compile_error_carries_compiler_stderr() {
    if skip_if_not_available(&["g++"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path()).await;

    let outcome = match engine
        .prepare(&submission(Language::Cpp, fixtures::CPP_BROKEN))
        .await
        .unwrap()
    {
        Prepared::CompileFailed(outcome) => outcome,
        Prepared::Runnable(_) => panic!("broken program compiled"),
    };

    assert_eq!(outcome.status, OutcomeStatus::CompileFailed);
    assert!(!outcome.stderr.is_empty());
}

#[tokio::test]
async fn java_infinite_loop_times_out() {
    if skip_if_not_available(&["java"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = short_timeout_engine(dir.path(), 2).await;

    let outcome = run_once(&engine, &submission(Language::Java, fixtures::JAVA_LOOP), "").await;

    assert_eq!(outcome.status, OutcomeStatus::Timeout);
    assert_eq!(outcome.duration, Duration::from_secs(2));
}

#[tokio::test]
async fn java_echoes_stdin() {
    if skip_if_not_available(&["java"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path()).await;

    let outcome = run_once(
        &engine,
        &submission(Language::Java, fixtures::JAVA_ECHO),
        "judge input\n",
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.stdout.trim(), "judge input");
}

#[tokio::test]
async fn judge_reports_every_case_in_order() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let judge = Judge::new(test_engine(dir.path()).await);

    let verdict = judge
        .judge(
            &submission(Language::Python, fixtures::PYTHON_SUM),
            &[case("2 3", "5"), case("10 20", "31")],
        )
        .await
        .unwrap();

    assert!(!verdict.passed_all);
    assert_eq!(verdict.results.len(), 2);
    assert_eq!(verdict.results[0].input, "2 3");
    assert!(verdict.results[0].passed);
    assert_eq!(verdict.results[1].input, "10 20");
    assert!(!verdict.results[1].passed);
    // a wrong answer is a mismatch, not an execution error
    assert!(!verdict.results[1].error);
    assert_eq!(verdict.results[1].output, "30");
}

#[tokio::test]
async fn judge_trims_outer_whitespace_before_comparing() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let judge = Judge::new(test_engine(dir.path()).await);

    let trailing = judge
        .judge(
            &submission(Language::Python, fixtures::PYTHON_TRAILING_WHITESPACE),
            &[case("", "5")],
        )
        .await
        .unwrap();
    assert!(trailing.passed_all);

    let internal = judge
        .judge(
            &submission(Language::Python, fixtures::PYTHON_TWO_LINES),
            &[case("", "5")],
        )
        .await
        .unwrap();
    assert!(!internal.passed_all);
}

#[tokio::test]
async fn judge_marks_timed_out_case_as_errored() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let judge = Judge::new(short_timeout_engine(dir.path(), 1).await);

    let verdict = judge
        .judge(
            &submission(Language::Python, fixtures::PYTHON_SLEEP),
            &[case("", "done")],
        )
        .await
        .unwrap();

    assert!(!verdict.passed_all);
    assert_eq!(verdict.results.len(), 1);
    assert!(!verdict.results[0].passed);
    assert!(verdict.results[0].error);
    assert!(verdict.results[0].output.contains("Timeout"));
}

#[tokio::test]
async fn compile_failure_marks_every_case() {
    if skip_if_not_available(&["g++"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let judge = Judge::new(test_engine(dir.path()).await);

    let verdict = judge
        .judge(
            &submission(Language::Cpp, fixtures::CPP_BROKEN),
            &[case("1", "1"), case("2", "2")],
        )
        .await
        .unwrap();

    assert!(!verdict.passed_all);
    assert_eq!(verdict.results.len(), 2);
    for result in &verdict.results {
        assert!(!result.passed);
        assert!(result.error);
    }
}

#[tokio::test]
async fn empty_case_list_is_vacuously_accepted() {
    // resolved before any artifact or process is created
    let dir = tempdir().unwrap();
    let judge = Judge::new(test_engine(dir.path()).await);

    let verdict = judge
        .judge(&submission(Language::Python, fixtures::PYTHON_HELLO), &[])
        .await
        .unwrap();

    assert!(verdict.passed_all);
    assert!(verdict.results.is_empty());
}

#[tokio::test]
async fn custom_run_surfaces_program_output() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let dir = tempdir().unwrap();
    let judge = Judge::new(test_engine(dir.path()).await);

    let outcome = judge
        .run_custom(&submission(Language::Python, fixtures::PYTHON_SUM), "4 7")
        .await
        .unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.stdout.trim(), "11");
}

#[tokio::test]
async fn concurrent_jobs_get_distinct_artifacts() {
    let dir = tempdir().unwrap();
    let workspace = Arc::new(Workspace::new(dir.path()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..8 {
        let workspace = workspace.clone();
        handles.push(tokio::spawn(async move {
            let toolchain = languages::lookup(Language::Python);
            let code = format!("print({})", i);
            let artifact = workspace
                .materialize_source(JobId::new(), toolchain.as_ref(), &code)
                .await
                .unwrap();
            (artifact, code)
        }));
    }

    let mut artifacts = Vec::new();
    for handle in handles {
        artifacts.push(handle.await.unwrap());
    }

    let mut paths: Vec<_> = artifacts
        .iter()
        .map(|(artifact, _)| artifact.path().to_path_buf())
        .collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 8);

    for (artifact, code) in &artifacts {
        assert_eq!(&std::fs::read_to_string(artifact.path()).unwrap(), code);
    }
}
