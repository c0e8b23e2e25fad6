use super::*;
use chrono::Duration as ChronoDuration;

fn now() -> DateTime<Utc> {
    // Deterministic, arbitrary instant; tests only compare relative deltas.
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn new_run_starts_pending_with_no_results() {
    let run = PipelineRun::new(RunId::new("r1"), "demo", now());
    assert_eq!(run.status, RunStatus::Pending);
    assert!(run.step_results.is_empty());
    assert_eq!(run.success_count(), 0);
    assert!(!run.has_failures());
}

#[test]
fn elapsed_uses_completion_time_when_set() {
    let mut run = PipelineRun::new(RunId::new("r1"), "demo", now());
    run.completed_at = Some(now() + ChronoDuration::seconds(5));
    assert_eq!(run.elapsed(now() + ChronoDuration::seconds(100)), ChronoDuration::seconds(5));
}

#[test]
fn elapsed_uses_now_when_still_running() {
    let run = PipelineRun::new(RunId::new("r1"), "demo", now());
    assert_eq!(run.elapsed(now() + ChronoDuration::seconds(7)), ChronoDuration::seconds(7));
}

#[test]
fn counts_reflect_step_statuses() {
    let mut run = PipelineRun::new(RunId::new("r1"), "demo", now());
    let mut ok = StepResult::new("a", "s", now());
    ok.status = StepStatus::Success;
    let mut bad = StepResult::new("b", "s", now());
    bad.status = StepStatus::Failed;
    let mut skipped = StepResult::new("c", "s", now());
    skipped.status = StepStatus::Skipped;
    run.step_results.extend([ok, bad, skipped]);

    assert_eq!(run.success_count(), 1);
    assert_eq!(run.failed_count(), 1);
    assert_eq!(run.skipped_count(), 1);
    assert!(run.has_failures());
}

#[test]
fn last_running_and_completed_steps_found_from_tail() {
    let mut run = PipelineRun::new(RunId::new("r1"), "demo", now());
    let mut done = StepResult::new("a", "s", now());
    done.status = StepStatus::Success;
    let mut running = StepResult::new("b", "s", now());
    running.status = StepStatus::Running;
    run.step_results.extend([done, running]);

    assert_eq!(run.last_running_step().unwrap().step_name, "b");
    assert_eq!(run.last_completed_step().unwrap().step_name, "a");
}

#[test]
fn error_summary_only_present_when_failed() {
    let mut step = StepResult::new("a", "s", now());
    assert!(step.error_summary().is_none());

    step.status = StepStatus::Failed;
    step.exit_code = 3;
    assert!(step.error_summary().unwrap().contains('3'));
}

#[test]
fn combined_output_is_chronological() {
    let mut step = StepResult::new("a", "s", now());
    step.stdout.push(OutputLine {
        timestamp: now() + ChronoDuration::milliseconds(20),
        text: "out-2".into(),
        source: OutputSource::StdOut,
    });
    step.stderr.push(OutputLine {
        timestamp: now() + ChronoDuration::milliseconds(10),
        text: "err-1".into(),
        source: OutputSource::StdErr,
    });

    let combined = step.combined_output();
    assert_eq!(combined[0].text, "err-1");
    assert_eq!(combined[1].text, "out-2");
}

#[test]
fn last_stderr_lines_caps_at_n() {
    let mut step = StepResult::new("a", "s", now());
    for i in 0..15 {
        step.stderr.push(OutputLine {
            timestamp: now(),
            text: format!("line-{i}"),
            source: OutputSource::StdErr,
        });
    }
    let tail = step.last_stderr_lines(DEFAULT_ERROR_TAIL_LINES);
    assert_eq!(tail.len(), DEFAULT_ERROR_TAIL_LINES);
    assert_eq!(tail.last().unwrap().text, "line-14");
}
