use crate::{
    app_lib::ApiClient,
    cli::{
        actions::{finish, open_store, operator_error, print_json},
        globals::GlobalArgs,
    },
    features::{
        auth::{
            registration::{self, RegistrationForm},
            Identity,
        },
        webauthn::{biometric_label, capability::DeviceInfo, device_info, CapabilityDescriptor},
    },
};
use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

#[derive(Debug)]
pub enum Command {
    Login { email: String, password: SecretString },
    LoginAdmin { email: String, password: SecretString },
    Register(RegistrationForm),
    Whoami,
    Logout,
    GoogleUrl,
    GoogleCallback { url: String },
    Capabilities,
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CapabilityReport {
    passkeys_supported: bool,
    capabilities: CapabilityDescriptor,
    biometric: &'static str,
    device: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// # Errors
/// Returns the operator-facing message of the failed flow.
pub async fn execute(args: Args) -> Result<()> {
    let Args { globals, command } = args;
    match command {
        Command::Login { email, password } => {
            let store = open_store(&globals).await?;
            let identity = store
                .login(&email, password.expose_secret())
                .await
                .map_err(operator_error)?;
            finish(&store).await;
            print_identity(&globals, &identity)
        }
        Command::LoginAdmin { email, password } => {
            let store = open_store(&globals).await?;
            let identity = store
                .login_admin(&email, password.expose_secret())
                .await
                .map_err(operator_error)?;
            finish(&store).await;
            print_identity(&globals, &identity)
        }
        Command::Register(form) => {
            let api = ApiClient::new(&globals.config).map_err(operator_error)?;
            let message = registration::register(&api, &form)
                .await
                .map_err(operator_error)?;
            println!("{message}");
            Ok(())
        }
        Command::Whoami => {
            let store = open_store(&globals).await?;
            let identity = store
                .identity()
                .ok_or_else(|| anyhow!("Not signed in. Run `identihub login` first."))?;
            print_identity(&globals, &identity)
        }
        Command::Logout => {
            let store = open_store(&globals).await?;
            let was_signed_in = store.is_authenticated();
            store.logout().await;
            if was_signed_in {
                println!("Signed out.");
            } else {
                println!("No active session.");
            }
            Ok(())
        }
        Command::GoogleUrl => {
            let store = globals.store().map_err(operator_error)?;
            println!("{}", store.login_with_google());
            Ok(())
        }
        Command::GoogleCallback { url } => {
            let store = globals.store().map_err(operator_error)?;
            let identity = store
                .handle_google_callback(&url)
                .await
                .map_err(operator_error)?;
            finish(&store).await;
            print_identity(&globals, &identity)
        }
        Command::Capabilities => {
            let store = globals.store().map_err(operator_error)?;
            let probe = store.probe_capabilities().await;
            let report = CapabilityReport {
                passkeys_supported: probe.descriptor.passkeys_supported(),
                capabilities: probe.descriptor,
                biometric: biometric_label(&probe.descriptor),
                device: device_info(globals.config.user_agent()),
                error: probe.failure.map(|err| err.user_message()),
            };
            debug!(supported = report.passkeys_supported, "capability report");

            if globals.json {
                return print_json(&report);
            }

            println!(
                "Passkeys:               {}",
                if report.passkeys_supported { "supported" } else { "not supported" }
            );
            println!("Verification:           {}", report.biometric);
            println!(
                "Conditional mediation:  {}",
                yes_no(report.capabilities.conditional_mediation)
            );
            println!(
                "Device:                 {} ({})",
                report.device.name, report.device.device_type
            );
            if let Some(error) = report.error {
                println!("Detection error:        {error}");
            }
            Ok(())
        }
    }
}

fn print_identity(globals: &GlobalArgs, identity: &Identity) -> Result<()> {
    if globals.json {
        return print_json(identity);
    }
    println!("{} ({}) id {}", identity.email, identity.role, identity.id);
    Ok(())
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
