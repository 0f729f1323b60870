use std::{
    fs,
    os::unix::fs::PermissionsExt,
    sync::atomic::{AtomicBool, AtomicI32},
    thread,
    time::Duration,
};

use process_supervisor::{
    app::cli::supervise,
    config::{parse, SupervisorConfig},
    manager::{MonitorSettings, Supervisor},
    models::{
        message::StopReason,
        process::{ProcessSpec, ProcessState},
    },
    monitor::monitor,
    report::Reporter,
    sampler::{ResourceSampler, ResourceUsage},
    signal::SignalBridge,
};

const TICK: Duration = Duration::from_millis(50);

struct FixedSampler;

impl ResourceSampler for FixedSampler {
    fn sample(&mut self, _pid: u32) -> Option<ResourceUsage> {
        Some(ResourceUsage {
            cpu_percent: 42,
            memory_mb: 3.0,
        })
    }
}

fn settings(report_period: u64) -> MonitorSettings {
    MonitorSettings {
        tick: TICK,
        report_period,
    }
}

fn sh(script: &str) -> ProcessSpec {
    ProcessSpec::from_argv(vec!["/bin/sh".into(), "-c".into(), script.into()]).unwrap()
}

fn missing() -> ProcessSpec {
    ProcessSpec::from_argv(vec!["./programs/does_not_exist".into(), "1".into()]).unwrap()
}

type TestReporter = Reporter<Vec<u8>, FixedSampler>;

fn launched(specs: Vec<ProcessSpec>, report_period: u64) -> (Supervisor, TestReporter) {
    let mut reporter = Reporter::new(Vec::new(), FixedSampler);
    let mut supervisor = Supervisor::new(settings(report_period));
    supervisor.launch_all(specs, &mut reporter).unwrap();
    (supervisor, reporter)
}

fn text(reporter: TestReporter) -> String {
    String::from_utf8(reporter.into_inner()).unwrap()
}

#[test]
fn short_process_ends_the_run_early() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) = launched(vec![sh("sleep 0.1")], 1000);

    let outcome = monitor(&mut supervisor, 200, &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::AllExited);
    assert!(outcome.elapsed >= 1 && outcome.elapsed < 200, "elapsed {}", outcome.elapsed);
    let record = &supervisor.records()[0];
    assert_eq!(record.state, ProcessState::ExitedNormally);
    assert_eq!(record.exit_code, Some(0));
    assert!(!record.was_terminated);
    assert_eq!(supervisor.running_count(), 0);
    assert!(text(reporter).contains("Final report, all processes finished"));
}

#[test]
fn time_limit_kills_a_process_that_never_ends() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) = launched(vec![sh("exec sleep 30")], 1000);

    let outcome = monitor(&mut supervisor, 3, &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::TimeLimit);
    assert_eq!(outcome.elapsed, 3);
    let record = &supervisor.records()[0];
    assert_eq!(record.state, ProcessState::Terminated);
    assert!(record.was_terminated);
    assert!(record.pid().is_none());

    let output = text(reporter);
    assert!(output.contains("Final report, time limit reached"));
    assert!(output.contains("[0] Terminated"));
}

#[test]
fn missing_executable_alone_ends_immediately() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) = launched(vec![missing()], 1000);

    assert_eq!(supervisor.running_count(), 0);
    let outcome = monitor(&mut supervisor, 10, &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::AllExited);
    assert_eq!(outcome.elapsed, 0);
    assert_eq!(supervisor.records()[0].state, ProcessState::FailedToStart);

    let output = text(reporter);
    assert!(output.contains("[0] ./programs/does_not_exist, failed to start"));
    assert!(output.contains("[0] Exited"));
}

#[test]
fn missing_executable_does_not_stop_the_others() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) = launched(vec![missing(), sh("exit 0")], 1000);

    assert_eq!(supervisor.running_count(), 1);
    let outcome = monitor(&mut supervisor, 100, &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::AllExited);
    assert_eq!(supervisor.records()[0].state, ProcessState::FailedToStart);
    assert_eq!(supervisor.records()[1].state, ProcessState::ExitedNormally);
}

#[test]
fn interrupt_terminates_all_running_processes() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) =
        launched(vec![sh("exec sleep 30"), sh("exec sleep 30")], 1000);

    let trigger = thread::spawn(move || {
        thread::sleep(TICK * 4 + TICK / 2);
        signals.request_shutdown(libc::SIGINT);
    });
    let outcome = monitor(&mut supervisor, 100, &signals, &mut reporter).unwrap();
    trigger.join().unwrap();

    assert_eq!(outcome.reason, StopReason::Signal(libc::SIGINT));
    assert!(outcome.elapsed >= 3 && outcome.elapsed <= 6, "elapsed {}", outcome.elapsed);
    for record in supervisor.records() {
        assert_eq!(record.state, ProcessState::Terminated);
        assert!(record.was_terminated);
    }
    assert_eq!(supervisor.running_count(), 0);
    assert!(text(reporter).contains("Signal received (SIGINT), terminating"));
}

#[test]
fn no_periodic_report_after_shutdown_request() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) = launched(vec![sh("exec sleep 30")], 1);

    signals.request_shutdown(libc::SIGABRT);
    let outcome = monitor(&mut supervisor, 100, &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::Signal(libc::SIGABRT));
    assert_eq!(outcome.elapsed, 0);
    let output = text(reporter);
    assert!(!output.contains("Normal report"));
    assert!(output.contains("Signal received (SIGABRT), terminating"));
}

#[test]
fn periodic_reports_show_running_usage() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) = launched(vec![sh("exec sleep 30")], 2);

    let outcome = monitor(&mut supervisor, 5, &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::TimeLimit);
    let output = text(reporter);
    // Reports at ticks 2 and 4; tick 5 is the final one.
    assert_eq!(output.matches("Normal report").count(), 2);
    assert!(output.contains("[0] Running, cpu usage: 42%, mem usage: 3.00 MB"));
}

#[test]
fn exit_codes_and_signal_deaths_are_classified() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let (mut supervisor, mut reporter) =
        launched(vec![sh("exit 3"), sh("kill -9 $$"), sh("exit 0")], 1000);

    let outcome = monitor(&mut supervisor, 100, &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::AllExited);
    let records = supervisor.records();
    assert_eq!(records[0].state, ProcessState::ExitedNormally);
    assert_eq!(records[0].exit_code, Some(3));
    assert_eq!(records[1].state, ProcessState::Terminated);
    assert!(records[1].was_terminated);
    assert_eq!(records[2].state, ProcessState::ExitedNormally);
    assert!(supervisor.records().iter().all(|r| r.state.is_terminal()));

    let output = text(reporter);
    assert!(output.contains("[0] Exited (status 3)"));
    assert!(output.contains("[1] Terminated"));
}

#[test]
fn full_run_prints_start_launches_and_summary() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("sleeper.sh");
    fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let config: SupervisorConfig = parse(&format!(
        "timelimit 2\n/bin/sh -c true\n./programs/does_not_exist\n{} --forever\n",
        script.display()
    ))
    .unwrap();
    let mut reporter = Reporter::new(Vec::new(), FixedSampler);

    let outcome = supervise(config, settings(1000), &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::TimeLimit);
    assert_eq!(outcome.elapsed, 2);
    let output = text(reporter);
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].ends_with("Starting report"));
    assert!(lines[1].starts_with("[0] sh /bin/sh -c true, started successfully (pid: "));
    assert_eq!(lines[2], "[1] ./programs/does_not_exist, failed to start");
    assert!(lines[3].starts_with("[2] sleeper.sh "));
    assert!(lines[3].contains("--forever, started successfully"));
    assert_eq!(lines.last(), Some(&"Exiting (total time: 2 seconds)"));
}

#[test]
fn unrunnable_entries_do_not_end_the_run() {
    static SHUTDOWN: AtomicBool = AtomicBool::new(false);
    static SIGNAL: AtomicI32 = AtomicI32::new(0);
    let signals = SignalBridge::from_flags(&SHUTDOWN, &SIGNAL);
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes.txt");
    fs::write(&data, "plain text\n").unwrap();
    let config = parse(&format!(
        "timelimit 2\n/bin/sh -c true\n{}\n{}\n/bin/sh -c true\n",
        dir.path().display(),
        data.display()
    ))
    .unwrap();
    let mut reporter = Reporter::new(Vec::new(), FixedSampler);

    let outcome = supervise(config, settings(1000), &signals, &mut reporter).unwrap();

    assert_eq!(outcome.reason, StopReason::AllExited);
    let output = text(reporter);
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[1].starts_with("[0] sh /bin/sh -c true, started successfully"));
    assert_eq!(
        lines[2],
        format!("[1] {}, failed to start", dir.path().display())
    );
    assert_eq!(lines[3], format!("[2] {}, failed to start", data.display()));
    assert!(lines[4].starts_with("[3] sh /bin/sh -c true, started successfully"));
    assert!(output.contains("Final report, all processes finished"));
    assert!(lines.last().unwrap().starts_with("Exiting (total time: "));
}
