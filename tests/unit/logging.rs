use super::*;

fn writer(tx: Sender<String>) -> PanelWriter {
    PanelWriter {
        pending: Vec::new(),
        tx,
    }
}

#[test]
fn panel_writer_sends_lines_once_the_event_is_complete() {
    let (tx, rx) = mpsc::channel();
    let mut w = writer(tx);

    w.write_all(b" INFO compose sp").unwrap();
    w.write_all(b"awn command=up\r\n  extra \n\n").unwrap();
    assert!(rx.try_recv().is_err());

    drop(w);
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        [" INFO compose spawn command=up", "  extra"]
    );
}

#[test]
fn panel_writer_decodes_invalid_utf8_lossily() {
    let (tx, rx) = mpsc::channel();
    let mut w = writer(tx);
    w.write_all(b"bad \xff byte\n").unwrap();
    drop(w);

    assert_eq!(rx.try_iter().collect::<Vec<_>>(), ["bad \u{FFFD} byte"]);
}
