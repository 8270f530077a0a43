//! Unattended follow-ups requested on the command line.
use linkpilot_core::{AppViewModel, Msg, Phase, StreamPhase};

#[derive(Debug, Clone, Copy, Default)]
pub struct Autopilot {
    auto_open: bool,
    export: bool,
    exit_when_done: bool,
    started: bool,
    exported: bool,
    submitted: bool,
}

impl Autopilot {
    pub fn new(auto_open: bool, export: bool, exit_when_done: bool) -> Self {
        Self {
            auto_open,
            export,
            exit_when_done,
            ..Self::default()
        }
    }

    /// Messages to dispatch after `view` was produced. Each follow-up fires
    /// once per completed job.
    pub fn follow_up(&mut self, view: &AppViewModel, epoch_millis: i64) -> Vec<Msg> {
        match view.stream {
            StreamPhase::Submitting => {
                self.submitted = true;
                self.started = false;
                self.exported = false;
                return Vec::new();
            }
            StreamPhase::Completed => {}
            _ => return Vec::new(),
        }

        let mut msgs = Vec::new();
        if self.export && !self.exported {
            self.exported = true;
            msgs.push(Msg::ExportClicked { epoch_millis });
        }
        if self.auto_open && !self.started {
            self.started = true;
            if view.nav.auto_open {
                msgs.push(Msg::AutoOpenStartClicked);
            }
        }
        msgs
    }

    /// With `--exit-when-done`, true once the job ended and automatic
    /// opening, if requested, has stopped.
    pub fn is_done(&self, view: &AppViewModel) -> bool {
        if !self.exit_when_done || !self.submitted {
            return false;
        }
        match view.stream {
            StreamPhase::Failed | StreamPhase::Idle => true,
            StreamPhase::Completed => {
                !self.auto_open
                    || !view.nav.auto_open
                    || view.auto_open.phase == Phase::Stopped
            }
            StreamPhase::Submitting | StreamPhase::Streaming => false,
        }
    }
}
