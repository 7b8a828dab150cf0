use crate::device::{EncoderEvent, EncoderSink};

use tokio::sync::mpsc;

/// WHAT: Sink callbacks arrive in the order they were raised
/// WHY: The session relies on chunks preceding finalization
#[test]
#[allow(clippy::unwrap_used)]
fn given_attached_sink_when_raising_callbacks_then_queued_in_order() {
    // Given: A sink with a live receiver
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = EncoderSink::new(tx);

    // When: Raising a chunk then finalizing
    assert!(sink.data_available(vec![1, 2, 3]));
    assert!(sink.finalized());

    // Then: Both queued in order
    assert!(matches!(rx.try_recv().unwrap(), EncoderEvent::DataAvailable(chunk) if chunk == [1, 2, 3]));
    assert!(matches!(rx.try_recv().unwrap(), EncoderEvent::Finalized));
}

/// WHAT: A detached sink drops callbacks
/// WHY: Encoders may keep calling after the session tore down
#[test]
fn given_detached_sink_when_raising_callbacks_then_rejected() {
    // Given: A sink whose receiver was dropped
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = EncoderSink::new(tx);
    drop(rx);

    // When / Then: Every callback reports the detachment
    assert!(!sink.is_attached());
    assert!(!sink.data_available(vec![0]));
    assert!(!sink.finalized());
    assert!(!sink.fault("late"));
}
