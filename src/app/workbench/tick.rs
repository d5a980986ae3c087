use super::Workbench;
use std::sync::mpsc;

impl Workbench {
    /// Drains tracing lines teed to the UI; returns whether anything changed.
    pub fn poll_logs(&mut self) -> bool {
        let Some(rx) = self.log_rx.take() else {
            return false;
        };

        let mut changed = false;
        let mut drained = 0usize;
        let mut disconnected = false;

        loop {
            if drained >= super::MAX_LOG_DRAIN_PER_TICK {
                break;
            }
            match rx.try_recv() {
                Ok(line) => {
                    changed = true;
                    drained += 1;
                    super::push_capped(&mut self.logs, line, super::LOG_BUFFER_CAP);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if !disconnected {
            self.log_rx = Some(rx);
        }
        changed
    }
}
