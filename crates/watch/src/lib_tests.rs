use super::*;
use std::fs;

fn collecting_trigger(dir: &Path, debounce_ms: u64) -> (Trigger, Arc<Mutex<Vec<WatchEvent>>>) {
    let trigger = Trigger {
        path: dir.to_path_buf(),
        filter: "*.txt".to_string(),
        include_subdirectories: false,
        debounce_ms,
    };
    (trigger, Arc::new(Mutex::new(Vec::new())))
}

#[tokio::test]
async fn single_write_eventually_triggers_once() {
    let dir = tempfile::tempdir().unwrap();
    let (trigger, events) = collecting_trigger(dir.path(), 100);
    let events_for_callback = Arc::clone(&events);

    let handle = start(
        vec![trigger],
        Duration::from_millis(50),
        move |event| events_for_callback.lock().push(event),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(events.lock().len(), 1);
    handle.stop();
}

#[tokio::test]
async fn burst_of_writes_collapses_into_one_callback_with_the_last_path() {
    let dir = tempfile::tempdir().unwrap();
    let (trigger, events) = collecting_trigger(dir.path(), 200);
    let events_for_callback = Arc::clone(&events);

    let handle = start(
        vec![trigger],
        Duration::from_millis(10),
        move |event| events_for_callback.lock().push(event),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut last_path = dir.path().join("a.txt");
    for i in 0..5 {
        last_path = dir.path().join(format!("burst-{i}.txt"));
        fs::write(&last_path, format!("{i}")).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
    tokio::time::sleep(Duration::from_millis(700)).await;

    let fired = events.lock();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].path, last_path);
    handle.stop();
}

#[tokio::test]
async fn events_within_min_trigger_interval_of_the_last_emission_are_suppressed() {
    let dir = tempfile::tempdir().unwrap();
    let (trigger, events) = collecting_trigger(dir.path(), 20);
    let events_for_callback = Arc::clone(&events);

    let handle = start(
        vec![trigger],
        Duration::from_millis(500),
        move |event| events_for_callback.lock().push(event),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(dir.path().join("first.txt"), b"1").unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    fs::write(dir.path().join("second.txt"), b"2").unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(events.lock().len(), 1);
    assert_eq!(events.lock()[0].path, dir.path().join("first.txt"));
    handle.stop();
}

#[test]
fn trigger_key_combines_path_and_filter() {
    let trigger = Trigger {
        path: PathBuf::from("/tmp/x"),
        filter: "*.rs".to_string(),
        include_subdirectories: false,
        debounce_ms: 500,
    };
    assert_eq!(trigger_key(&trigger), "/tmp/x:*.rs");
}
