//! End-to-end intro playback on a paused clock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use karion::intro::{
    Element, IntroOutcome, IntroStatus, Phase, Sequencer, TargetTable, Timeline, TOTAL_RUNTIME,
};

#[tokio::test(start_paused = true)]
async fn host_gets_control_back_after_full_runtime() {
    let sequencer = Sequencer::new();
    let phases = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&phases);
    sequencer.on_phase(move |p| sink.lock().unwrap().push(p));

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let began = tokio::time::Instant::now();
    let handle = sequencer
        .start(move || {
            let _ = done_tx.send(());
        })
        .unwrap();

    done_rx.await.expect("on_complete fired");
    assert!(began.elapsed() >= TOTAL_RUNTIME);
    assert_eq!(handle.wait().await, IntroOutcome::Completed);
    assert_eq!(*phases.lock().unwrap(), Phase::ALL.to_vec());
}

#[tokio::test(start_paused = true)]
async fn every_rendered_phase_has_a_full_frame() {
    let sequencer = Sequencer::new();
    let table = TargetTable::resolve();
    let mut rx = sequencer.subscribe();
    let handle = sequencer.start(|| {}).unwrap();

    let mut rendered = Vec::new();
    loop {
        let status = *rx.borrow_and_update();
        if let IntroStatus::Playing(phase) = status {
            if rendered.last() != Some(&phase) {
                let frame = table.frame(phase);
                assert_eq!(frame.len(), Element::ALL.len());
                rendered.push(phase);
            }
        }
        if status == IntroStatus::Completed {
            break;
        }
        rx.changed().await.unwrap();
    }

    assert_eq!(rendered, Phase::ALL.to_vec());
    assert_eq!(handle.wait().await, IntroOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn unmount_mid_sequence_is_silent() {
    let sequencer = Sequencer::new();
    let published = Arc::new(AtomicU32::new(0));
    let p = Arc::clone(&published);
    sequencer.on_phase(move |_| {
        p.fetch_add(1, Ordering::SeqCst);
    });
    let completed = Arc::new(AtomicU32::new(0));
    let c = Arc::clone(&completed);

    let handle = sequencer
        .start(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    // erase_1 begins at 5500ms
    tokio::time::sleep(Duration::from_millis(6000)).await;
    assert_eq!(sequencer.status(), IntroStatus::Playing(Phase::Erase1));
    drop(handle);

    let at_unmount = published.load(Ordering::SeqCst);
    assert_eq!(at_unmount, 4);
    tokio::time::sleep(TOTAL_RUNTIME * 2).await;
    assert_eq!(published.load(Ordering::SeqCst), at_unmount);
    assert_eq!(completed.load(Ordering::SeqCst), 0);
    assert_eq!(sequencer.status(), IntroStatus::Cancelled);
}

#[test]
fn timeline_fast_forward_matches_runtime_constant() {
    let mut timeline = Timeline::new();
    assert_eq!(timeline.time_to_finish(), TOTAL_RUNTIME);
    let steps = timeline.advance(TOTAL_RUNTIME);
    assert_eq!(steps.len(), Phase::ALL.len());
    assert!(timeline.is_finished());
}
