// src/config/mod.rs
// Startup configuration: command line flags with HTREST_* environment fallbacks

use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

use crate::coercion::ValuePolicy;
use crate::device::{ParamCatalog, SimulatedHeatPump};
use crate::error::Result;

/// Baud rates supported by the heat pump's serial interface
pub const SUPPORTED_BAUDRATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

// "<username>:<password>"
static USER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:]+):([^:]+)$").expect("user pattern is a valid regex"));

const DISCLAIMER: &str = "\
DISCLAIMER
----------

  Please note that any incorrect or careless usage of this program as well as
  errors in the implementation can damage your heat pump!

  Therefore, the author does not provide any guarantee or warranty concerning
  to correctness, functionality or performance and does not accept any liability
  for damage caused by this program or mentioned information.

  Thus, use it on your own risk!";

/// Basic access authentication credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

impl FromStr for Credentials {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let caps = USER_PATTERN.captures(s).ok_or_else(|| {
            format!("'{s}' is not a valid user statement in form of '<username>:<password>'")
        })?;
        Ok(Self {
            username: caps[1].to_string(),
            password: caps[2].to_string(),
        })
    }
}

fn parse_baudrate(s: &str) -> std::result::Result<u32, String> {
    let baudrate: u32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if SUPPORTED_BAUDRATES.contains(&baudrate) {
        Ok(baudrate)
    } else {
        Err(format!(
            "unsupported baudrate {baudrate} (possible values: {:?})",
            SUPPORTED_BAUDRATES
        ))
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "htrest")]
#[command(about = "Heliotherm heat pump REST API server")]
#[command(version, after_help = DISCLAIMER)]
pub struct HtRestConfig {
    /// The serial device on which the heat pump is connected
    #[arg(short, long, env = "HTREST_DEVICE", default_value = "/dev/ttyUSB0")]
    pub device: String,

    /// Baudrate of the serial connection (same as configured on the heat pump)
    #[arg(short, long, env = "HTREST_BAUDRATE", default_value_t = 115200, value_parser = parse_baudrate)]
    pub baudrate: u32,

    /// The hostname to listen on, "0.0.0.0" makes the server available externally
    #[arg(long, env = "HTREST_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// The port of the web server
    #[arg(long, env = "HTREST_PORT", default_value_t = 8888)]
    pub port: u16,

    /// Username and password for basic access authentication, "<username>:<password>"
    #[arg(short, long, env = "HTREST_USER")]
    pub user: Option<Credentials>,

    /// Treat boolean values as integers (false = 0, true = 1)
    #[arg(long, env = "HTREST_BOOL_AS_INT")]
    pub bool_as_int: bool,

    /// Disable write access to the heat pump
    #[arg(long, env = "HTREST_READ_ONLY")]
    pub read_only: bool,

    /// Disable all parameter verification actions
    #[arg(long, env = "HTREST_NO_PARAM_VERIFICATION")]
    pub no_param_verification: bool,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, env = "HTREST_LOG_LEVEL", default_value = "info")]
    pub log_level: Level,

    /// TOML file replacing the built-in parameter catalog
    #[arg(long, env = "HTREST_PARAM_CATALOG")]
    pub param_catalog: Option<PathBuf>,
}

impl HtRestConfig {
    pub fn policy(&self) -> ValuePolicy {
        ValuePolicy::new(self.bool_as_int, self.read_only)
    }

    pub fn verify_params(&self) -> bool {
        !self.no_param_verification
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// In-memory heat pump configured with the serial settings it replaces
    pub fn simulated_device(&self, catalog: ParamCatalog) -> SimulatedHeatPump {
        SimulatedHeatPump::new(catalog).with_transport(&self.device, self.baudrate)
    }

    pub fn load_catalog(&self) -> Result<ParamCatalog> {
        match &self.param_catalog {
            Some(path) => ParamCatalog::load(path),
            None => ParamCatalog::builtin(),
        }
    }
}
