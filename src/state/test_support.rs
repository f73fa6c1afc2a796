//! Test doubles for the engine's collaborators

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use anyhow::anyhow;

use super::timer_engine::{Scheduler, SoundPlayer, TickCallback, TickHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Click,
    Alarm,
    StopAlarm,
}

/// Records every cue request. A failing player records and then errors.
#[derive(Default)]
pub struct RecordingSoundPlayer {
    cues: Mutex<Vec<Cue>>,
    fail: bool,
}

impl RecordingSoundPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            cues: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.cues.lock().unwrap().clear();
    }

    fn record(&self, cue: Cue) -> anyhow::Result<()> {
        self.cues.lock().unwrap().push(cue);
        if self.fail {
            Err(anyhow!("audio device unavailable"))
        } else {
            Ok(())
        }
    }
}

impl SoundPlayer for RecordingSoundPlayer {
    fn play_click(&self) -> anyhow::Result<()> {
        self.record(Cue::Click)
    }

    fn play_alarm(&self) -> anyhow::Result<()> {
        self.record(Cue::Alarm)
    }

    fn stop_alarm(&self) -> anyhow::Result<()> {
        self.record(Cue::StopAlarm)
    }
}

type SharedCallback = Arc<dyn Fn() + Send + Sync>;

/// Scheduler driven by hand. Keeps every callback it ever handed out so
/// tests can replay a cancelled one.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    issued: Mutex<BTreeMap<u64, SharedCallback>>,
    active: Mutex<Vec<u64>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    pub fn active_handles(&self) -> Vec<TickHandle> {
        self.active.lock().unwrap().iter().map(|id| TickHandle(*id)).collect()
    }

    /// One second passes for every live cadence
    pub fn fire_active(&self) {
        let callbacks: Vec<SharedCallback> = {
            let active = self.active.lock().unwrap();
            let issued = self.issued.lock().unwrap();
            active.iter().filter_map(|id| issued.get(id).cloned()).collect()
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Invoke every callback ever issued, cancelled or not
    pub fn fire_all_issued(&self) {
        let callbacks: Vec<SharedCallback> = self.issued.lock().unwrap().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    pub fn fire_issued(&self, handle: TickHandle) {
        let callback = self.issued.lock().unwrap().get(&handle.0).cloned();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_every_second(&self, on_tick: TickCallback) -> TickHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.issued.lock().unwrap().insert(id, Arc::from(on_tick));
        self.active.lock().unwrap().push(id);
        TickHandle(id)
    }

    fn cancel(&self, handle: TickHandle) {
        self.active.lock().unwrap().retain(|id| *id != handle.0);
    }
}
