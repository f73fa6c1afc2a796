//! Sound cue players

use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::{Mutex, PoisonError},
};
use anyhow::Context;
use tokio::{
    process::{Child, Command},
    runtime::Handle,
};
use tracing::{debug, info, warn};

use crate::state::SoundPlayer;

/// Plays cue files through an external audio program such as `paplay`
#[derive(Debug)]
pub struct CommandSoundPlayer {
    program: String,
    click: PathBuf,
    alarm: PathBuf,
    runtime: Handle,
    alarm_child: Mutex<Option<Child>>,
}

impl CommandSoundPlayer {
    pub fn new(program: String, click: PathBuf, alarm: PathBuf, runtime: Handle) -> Self {
        Self {
            program,
            click,
            alarm,
            runtime,
            alarm_child: Mutex::new(None),
        }
    }

    fn spawn(&self, file: &Path) -> anyhow::Result<Child> {
        // Child processes are reaped by the runtime that owns them.
        let _guard = self.runtime.enter();
        Command::new(&self.program)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .with_context(|| format!("Failed to execute {} {}", self.program, file.display()))
    }

    /// Track `child` as the playing alarm, killing and returning any previous one
    fn install_alarm(&self, child: Child) -> Option<Child> {
        let mut previous = self
            .alarm_child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(child)?;
        if let Err(e) = previous.start_kill() {
            debug!("Previous alarm cue already gone: {}", e);
        }
        Some(previous)
    }

    /// Kill the playing alarm, handing back the killed process
    fn silence_alarm(&self) -> anyhow::Result<Option<Child>> {
        let child = self
            .alarm_child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(mut child) = child else {
            debug!("No alarm cue to stop");
            return Ok(None);
        };
        if let Ok(Some(status)) = child.try_wait() {
            debug!("Alarm cue already finished ({})", status);
            return Ok(Some(child));
        }
        child.start_kill().context("Failed to kill alarm player")?;
        info!("Alarm cue stopped");
        Ok(Some(child))
    }
}

impl SoundPlayer for CommandSoundPlayer {
    fn play_click(&self) -> anyhow::Result<()> {
        self.spawn(&self.click)?;
        Ok(())
    }

    fn play_alarm(&self) -> anyhow::Result<()> {
        let child = self.spawn(&self.alarm)?;
        self.install_alarm(child);
        info!("Alarm cue playing");
        Ok(())
    }

    /// Kill the alarm process; the next alarm plays from the start.
    fn stop_alarm(&self) -> anyhow::Result<()> {
        self.silence_alarm()?;
        Ok(())
    }
}

/// Player for hosts without audio: cues only show up in the log
#[derive(Debug, Default)]
pub struct LogSoundPlayer;

impl SoundPlayer for LogSoundPlayer {
    fn play_click(&self) -> anyhow::Result<()> {
        debug!("click");
        Ok(())
    }

    fn play_alarm(&self) -> anyhow::Result<()> {
        warn!("ALARM: workout complete");
        Ok(())
    }

    fn stop_alarm(&self) -> anyhow::Result<()> {
        debug!("alarm silenced");
        Ok(())
    }
}
