//! Detect and build phases of the git buildpack.
//!
//! - [`phases::detect`] decides whether the buildpack takes part in a build.
//! - [`phases::build`] exports the HEAD revision as `REVISION` and an image
//!   label, then configures git credential helpers from service bindings.
//!
//! External collaborators sit behind traits so the phases can be driven with
//! fakes: [`bindings::BindingResolver`], [`exec::Executable`] and
//! [`credentials::CredentialManager`].

pub mod bindings;
pub mod context;
pub mod credentials;
pub mod exec;
pub mod phase_trait;
pub mod phases;
pub mod revision;
pub mod shell;

pub use bindings::{Binding, BindingError, BindingResolver, FsBindingResolver};
pub use context::{BuildContext, BuildpackInfo, DetectContext};
pub use credentials::{CredentialManager, GitCredentialManager, ProvisionError, ScopeKey};
pub use exec::{ExecError, Executable, Execution, GitExecutable};
pub use phase_trait::BuildpackPhase;
pub use phases::{BuildError, BuildPhase, DetectError, DetectPhase};
pub use revision::{Revision, RevisionError, RevisionExtractor};
