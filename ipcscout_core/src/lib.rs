pub mod catalog;
pub mod command;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod permission;
pub mod prober;
pub mod sink;
pub mod wordlist;

pub use catalog::{
    Catalog, CatalogError, ComponentDescriptor, ComponentKind, HostIdentity, ManifestIndex,
    MetadataSource, PackageManifest,
};
pub use config::ScoutConfig;
pub use discovery::{
    DiscoveryEngine, DiscoveryError, DiscoveryEvent, DiscoveryHandle, DiscoveryJob,
    DiscoveryOptions, DiscoveryReport, JobState, Progress,
};
pub use dispatch::{
    CommandInvoker, ComponentInvoker, Dispatcher, Invocation, InvocationError, InvocationRequest,
};
pub use permission::{GateError, GrantedPermissions, PermissionGate, PermissionHolder};
pub use prober::{CommandProber, InProcessProber, ProbeError, ProbeResult, Prober, probe};
pub use sink::{FileSink, InMemorySink, ResultSink, SinkError, read_persisted};
pub use wordlist::Wordlist;
