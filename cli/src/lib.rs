mod browse_cmd;
mod oracle;

pub use browse_cmd::BrowseArgs;
pub use browse_cmd::Cli;
pub use browse_cmd::Command;
pub use browse_cmd::TaxonomyArgs;
pub use oracle::EnvOracle;
pub use oracle::PRINCIPAL_ENV_VAR;
