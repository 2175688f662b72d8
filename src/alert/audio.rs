use rodio::{OutputStream, Sink};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex, PoisonError,
};
use std::thread;

use super::{chime::AlertChime, Alert, AlertSink};

#[derive(Debug, PartialEq, Eq)]
enum AudioCommand {
    Chime,
    Silence,
}

/// Plays a chime for every alert on a dedicated audio thread.
///
/// rodio's output stream is not `Send`, so the stream and sink live on the
/// `audio-alert` thread and are driven through a command channel. The device
/// is opened lazily on the first alert.
pub struct AudioAlertSink {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    chimes_queued: Arc<AtomicU64>,
}

impl AudioAlertSink {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            chimes_queued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Drives an existing command channel instead of the audio thread.
    #[cfg(test)]
    fn with_sender(tx: Sender<AudioCommand>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            chimes_queued: Arc::new(AtomicU64::new(0)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        let mut guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("audio-alert".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to open audio output: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Chime => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                log::warn!("alert chime skipped: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(AlertChime::new());
                            }
                        }
                        AudioCommand::Silence => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    /// Stops any chime in progress and releases the output device.
    pub fn silence(&self) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(tx) = tx {
            let _ = tx.send(AudioCommand::Silence);
        }
    }

    pub fn chimes_queued(&self) -> u64 {
        self.chimes_queued.load(Ordering::SeqCst)
    }
}

impl Default for AudioAlertSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for AudioAlertSink {
    fn emit(&self, alert: &Alert) {
        log::warn!("ALERT ({}, score {}): {}", alert.status.as_str(), alert.score, alert.message);

        let sent = self
            .ensure_thread()
            .and_then(|tx| tx.send(AudioCommand::Chime).map_err(|e| e.to_string()));
        match sent {
            Ok(()) => {
                self.chimes_queued.fetch_add(1, Ordering::SeqCst);
            }
            Err(err) => log::warn!("could not queue alert chime: {err}"),
        }
    }
}

impl Drop for AudioAlertSink {
    fn drop(&mut self) {
        self.silence();
    }
}
