use crate::{ExportArtifact, JobHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitJob { links: Vec<String> },
    Subscribe { job: JobHandle },
    CloseSubscription { job: JobHandle },
    OpenExternal { uri: String },
    ArmCountdown { generation: u64 },
    CancelCountdown { generation: u64 },
    WriteExport { artifact: ExportArtifact },
}
