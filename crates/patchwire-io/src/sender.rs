//! Message sequencing with device pauses.

use std::time::Duration;

use patchwire_core::{Message, Timing};
use tracing::debug;

use crate::{Result, SysexTransport};

/// Sleep function used for pauses.
///
/// Boxed so tests can swap in a recorder and run instantly.
pub type Sleeper = Box<dyn FnMut(Duration) + Send>;

/// Plays codec message lists into a transport.
///
/// SysEx and program-change messages go to the transport in order;
/// [`Message::Pause`] sleeps. Each whole operation is followed by the pause
/// the device's [`Timing`] asks for. All pauses are multiplied by the pause
/// scale, so a slow interface can be given more room.
pub struct Sender<T: SysexTransport> {
    transport: T,
    timing: Timing,
    scale: f64,
    sleeper: Sleeper,
    paused: Duration,
}

impl<T: SysexTransport> Sender<T> {
    /// Create a sender that sleeps on the calling thread.
    pub fn new(transport: T, timing: Timing) -> Self {
        Self {
            transport,
            timing,
            scale: 1.0,
            sleeper: Box::new(std::thread::sleep),
            paused: Duration::ZERO,
        }
    }

    /// Replace the sleep function.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Multiply every pause by `scale` (negative values act as zero).
    pub fn with_pause_scale(mut self, scale: f64) -> Self {
        self.scale = scale.max(0.0);
        self
    }

    /// The device timing in use, already scaled.
    pub fn timing(&self) -> Timing {
        self.timing.scaled(self.scale)
    }

    /// Total time spent pausing so far.
    pub fn paused(&self) -> Duration {
        self.paused
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give back the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send `messages` with their inline pauses and nothing after.
    ///
    /// Returns the number of messages handed to the transport.
    pub fn play(&mut self, messages: &[Message]) -> Result<usize> {
        let mut sent = 0;
        for message in messages {
            match message {
                Message::Pause(d) => self.pause(*d),
                other => {
                    let bytes = other.to_bytes();
                    debug!(len = bytes.len(), first = ?bytes.get(..3), "sending message");
                    self.transport.send(&bytes)?;
                    sent += 1;
                }
            }
        }
        Ok(sent)
    }

    /// Send a single-parameter change, then wait the parameter pause.
    pub fn send_parameter(&mut self, messages: &[Message]) -> Result<usize> {
        let sent = self.play(messages)?;
        self.pause(self.timing.after_parameter);
        Ok(sent)
    }

    /// Send a whole patch, then wait the send-all pause.
    pub fn send_all(&mut self, messages: &[Message]) -> Result<usize> {
        let sent = self.play(messages)?;
        self.pause(self.timing.after_send_all);
        Ok(sent)
    }

    /// Send a patch change, then wait the change-patch pause.
    pub fn change_patch(&mut self, messages: &[Message]) -> Result<usize> {
        let sent = self.play(messages)?;
        self.pause(self.timing.after_change_patch);
        Ok(sent)
    }

    fn pause(&mut self, duration: Duration) {
        let scaled = duration.mul_f64(self.scale);
        if scaled.is_zero() {
            return;
        }
        (self.sleeper)(scaled);
        self.paused += scaled;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use patchwire_core::{Destination, PatchLocation, SysexCodec};
    use patchwire_devices::{Fb01, Venom};

    use super::*;
    use crate::MemoryTransport;

    fn recording() -> (Sleeper, Arc<Mutex<Vec<Duration>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let sleeper: Sleeper = Box::new(move |d| sink.lock().unwrap().push(d));
        (sleeper, log)
    }

    #[test]
    fn test_send_all_applies_timing() {
        let venom = Venom::default();
        let (sleeper, log) = recording();
        let mut sender = Sender::new(MemoryTransport::new(), venom.timing()).with_sleeper(sleeper);

        let messages = venom.emit(&venom.init_patch(), Destination::WorkingMemory);
        assert_eq!(sender.send_all(&messages).unwrap(), 1);
        assert_eq!(sender.transport().sent()[0], messages[0].to_bytes());
        assert_eq!(*log.lock().unwrap(), vec![Duration::from_millis(750)]);
    }

    #[test]
    fn test_inline_pauses_and_change_patch() {
        let fb = Fb01::default();
        let (sleeper, log) = recording();
        let mut sender = Sender::new(MemoryTransport::new(), fb.timing()).with_sleeper(sleeper);

        let sent = sender.change_patch(&fb.change_patch(PatchLocation::new(1, 3))).unwrap();
        assert_eq!(sent, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![Duration::from_millis(150), Duration::from_millis(150)]
        );
        assert_eq!(sender.paused(), Duration::from_millis(300));
    }

    #[test]
    fn test_pause_scale() {
        let venom = Venom::default();
        let (sleeper, log) = recording();
        let mut sender = Sender::new(MemoryTransport::new(), venom.timing())
            .with_sleeper(sleeper)
            .with_pause_scale(0.5);
        assert_eq!(sender.timing().after_change_patch, Duration::from_millis(250));

        sender.change_patch(&[]).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![Duration::from_millis(250)]);

        let mut silent = Sender::new(MemoryTransport::new(), venom.timing())
            .with_sleeper(Box::new(|_| panic!("no pause expected")))
            .with_pause_scale(0.0);
        silent.send_all(&[Message::Pause(Duration::from_secs(1))]).unwrap();
        assert_eq!(silent.paused(), Duration::ZERO);
    }

    #[test]
    fn test_program_change_bytes() {
        let mut sender = Sender::new(MemoryTransport::new(), Timing::default())
            .with_sleeper(Box::new(|_| {}));
        sender.play(&[Message::program_change(2, 40)]).unwrap();
        assert_eq!(sender.into_inner().bytes(), vec![0xC2, 40]);
    }
}
