use crate::error::AppError;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use std::path::{Path, PathBuf};

/// Environment variable selecting the optional `config/<name>.yaml` overlay.
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Resolve `<service>/config` whether the process runs from the workspace
/// root or from inside the service directory.
pub fn configuration_directory(base_path: &Path, service_name: &str) -> PathBuf {
    if base_path.ends_with(service_name) {
        base_path.join("config")
    } else {
        base_path.join(service_name).join("config")
    }
}

/// Layered configuration: `base.yaml`, then `<APP_ENVIRONMENT>.yaml` if present,
/// then `APP_` prefixed environment variables (`APP_SERVER__PORT=9000`).
///
/// The builder is returned unbuilt so services can add their own overrides.
pub fn builder(service_name: &str) -> Result<ConfigBuilder<DefaultState>, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let configuration_directory = configuration_directory(&base_path, service_name);

    let mut builder = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(true));

    if let Ok(environment) = std::env::var(ENVIRONMENT_VAR) {
        builder = builder.add_source(
            File::from(configuration_directory.join(format!("{}.yaml", environment)))
                .required(false),
        );
    }

    Ok(builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("_")
            .separator("__"),
    ))
}
