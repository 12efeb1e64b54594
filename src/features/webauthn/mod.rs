pub mod capability;
pub mod ceremony;
pub mod platform;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use capability::{biometric_label, detect, device_info, CapabilityDescriptor, CapabilityProbe};
pub use ceremony::CeremonyClient;
pub use platform::{CommandPlatform, CredentialPlatform, HeadlessPlatform, PlatformError};
pub use types::{CeremonyKind, CeremonyState, RegistrationOutcome};
