use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::{HearsayError, Result};
use crate::config::SpeechConfig;
use crate::speech::{split_sentences, EventSender, SessionId, SpeechEngine, SpeechEvent};

/// Known speech programs and how they take voice and rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Espeak,
    Say,
    SpdSay,
    Custom,
}

impl EngineKind {
    pub fn from_program(program: &Path) -> Self {
        match program.file_name().and_then(|n| n.to_str()) {
            Some("espeak-ng") | Some("espeak") => EngineKind::Espeak,
            Some("say") => EngineKind::Say,
            Some("spd-say") => EngineKind::SpdSay,
            _ => EngineKind::Custom,
        }
    }

    /// Arguments placed before the sentence text.
    pub fn args(self, config: &SpeechConfig) -> Vec<String> {
        let (voice_flag, rate_flag) = match self {
            EngineKind::Espeak => ("-v", "-s"),
            EngineKind::Say => ("-v", "-r"),
            EngineKind::SpdSay => ("-t", "-r"),
            EngineKind::Custom => {
                if config.voice.is_some() || config.rate.is_some() {
                    warn!("speech.voice and speech.rate are ignored for a custom command; pass them in speech.args");
                }
                return config.args.clone();
            }
        };

        let mut args = Vec::new();
        // spd-say returns immediately unless told to wait
        if self == EngineKind::SpdSay {
            args.push("-w".to_string());
        }
        if let Some(voice) = &config.voice {
            args.extend([voice_flag.to_string(), voice.clone()]);
        }
        if let Some(rate) = config.rate {
            args.extend([rate_flag.to_string(), rate.to_string()]);
        }
        args.extend(config.args.iter().cloned());
        args
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Play,
    Pause,
    Cancel,
}

struct Narration {
    session: SessionId,
    control: watch::Sender<Control>,
    task: JoinHandle<()>,
}

/// Runs an external program once per sentence.
///
/// Pausing interrupts the current sentence; resuming speaks it again and
/// carries on from there.
pub struct CommandSpeechEngine {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    events: EventSender,
    current: Mutex<Option<Narration>>,
}

impl CommandSpeechEngine {
    pub fn new(program: PathBuf, config: &SpeechConfig, events: EventSender) -> Self {
        let kind = EngineKind::from_program(&program);
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());

        Self {
            name,
            args: kind.args(config),
            program,
            events,
            current: Mutex::new(None),
        }
    }

    async fn stop(current: &mut Option<Narration>) {
        if let Some(narration) = current.take() {
            narration.control.send_replace(Control::Cancel);
            if let Err(e) = narration.task.await {
                warn!("Narration {} ended abnormally: {}", narration.session, e);
            }
        }
    }

    async fn send(&self, control: Control) -> Result<()> {
        let current = self.current.lock().await;
        match current.as_ref() {
            Some(narration) if !narration.task.is_finished() => {
                narration.control.send_if_modified(|state| {
                    let changed = *state != control;
                    *state = control;
                    changed
                });
                Ok(())
            }
            _ => Err(HearsayError::SpeechFailure("nothing is being read".into())),
        }
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeechEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn speak(&self, session: SessionId, text: &str) -> Result<()> {
        let sentences = split_sentences(text);

        let mut current = self.current.lock().await;
        Self::stop(&mut current).await;

        if sentences.is_empty() {
            let _ = self.events.send(SpeechEvent::Finished(session));
            return Ok(());
        }

        info!(
            "Narration {} started: {} sentences via {}",
            session,
            sentences.len(),
            self.name
        );

        let (control, control_rx) = watch::channel(Control::Play);
        let runner = SentenceRunner {
            program: self.program.clone(),
            args: self.args.clone(),
            sentences,
            session,
            events: self.events.clone(),
        };
        let task = tokio::spawn(runner.run(control_rx));

        *current = Some(Narration {
            session,
            control,
            task,
        });
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.send(Control::Pause).await
    }

    async fn resume(&self) -> Result<()> {
        self.send(Control::Play).await
    }

    async fn cancel(&self) -> Result<()> {
        let mut current = self.current.lock().await;
        Self::stop(&mut current).await;
        Ok(())
    }
}

struct SentenceRunner {
    program: PathBuf,
    args: Vec<String>,
    sentences: Vec<String>,
    session: SessionId,
    events: EventSender,
}

impl SentenceRunner {
    async fn run(self, mut control: watch::Receiver<Control>) {
        let event = self.narrate(&mut control).await;
        debug!("Narration {} ended: {:?}", self.session, event);
        let _ = self.events.send(event);
    }

    fn failed(&self, message: String) -> SpeechEvent {
        SpeechEvent::Failed {
            session: self.session,
            message,
        }
    }

    async fn narrate(&self, control: &mut watch::Receiver<Control>) -> SpeechEvent {
        let mut index = 0;

        while index < self.sentences.len() {
            loop {
                let state = *control.borrow_and_update();
                match state {
                    Control::Play => break,
                    Control::Cancel => return SpeechEvent::Cancelled(self.session),
                    Control::Pause => {
                        if control.changed().await.is_err() {
                            return SpeechEvent::Cancelled(self.session);
                        }
                    }
                }
            }

            let sentence = &self.sentences[index];
            let spawned = Command::new(&self.program)
                .args(&self.args)
                .arg(sentence)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn();

            let mut child = match spawned {
                Ok(child) => child,
                Err(e) => {
                    return self.failed(format!(
                        "could not start {}: {}",
                        self.program.display(),
                        e
                    ))
                }
            };

            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => index += 1,
                    Ok(status) => {
                        return self.failed(format!("{} exited with {}", self.program.display(), status))
                    }
                    Err(e) => return self.failed(format!("{} failed: {}", self.program.display(), e)),
                },
                changed = control.changed() => {
                    if let Err(e) = child.kill().await {
                        debug!("Could not stop sentence {}: {}", index + 1, e);
                    }
                    if changed.is_err() {
                        return SpeechEvent::Cancelled(self.session);
                    }
                }
            }
        }

        SpeechEvent::Finished(self.session)
    }
}
