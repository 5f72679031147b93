pub mod events;
pub mod installer;
pub mod pipeline;

pub use events::{event_channel, EventSink, InstallEvent};
pub use installer::{GameInstaller, InstallRequest};
pub use pipeline::{run_pipeline, InstallVariant, PipelineSignal, PipelineState};
