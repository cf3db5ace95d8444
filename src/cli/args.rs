//! Command-line argument structures for the lsnmpvs tools.
//!
//! Reusable clap structures shared by `lsnmpvs-agent`, `lsnmpvs-get` and
//! `lsnmpvs-set`.

use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::agent::{AgentBuilder, DEFAULT_BIND, DEFAULT_DEDUP_WINDOW};
use crate::device::RecordSpec;
use crate::mib::DEFAULT_BEACON_RATE;
use crate::timestamp::DateStamp;
use crate::value::Value;

/// Port assumed when a target has none.
pub const DEFAULT_AGENT_PORT: u16 = 16100;

/// Port assumed for a manager address without one.
pub const DEFAULT_MANAGER_PORT: u16 = 16200;

/// Logging flags shared by every tool.
#[derive(Debug, Parser)]
pub struct LogArgs {
    /// Enable debug logging (lsnmpvs=debug).
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable trace logging (lsnmpvs=trace).
    #[arg(short = 'D', long = "trace")]
    pub trace: bool,
}

impl LogArgs {
    /// Initialize tracing based on debug/trace flags.
    ///
    /// `default` is the level used when neither flag is set.
    pub fn init_tracing(&self, default: &str) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.trace {
            "lsnmpvs=trace".to_string()
        } else if self.debug {
            "lsnmpvs=debug".to_string()
        } else {
            format!("lsnmpvs={}", default)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Target and timeout for the manager tools.
#[derive(Debug, Parser)]
pub struct TargetArgs {
    /// Agent host or host:port (default port 16100).
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Request timeout in seconds.
    #[arg(short = 't', long = "timeout", default_value = "5")]
    pub timeout: f64,
}

impl TargetArgs {
    /// The target with the default port appended when it has none.
    pub fn target_addr(&self) -> String {
        with_default_port(&self.target, DEFAULT_AGENT_PORT)
    }

    /// Get the timeout as a Duration.
    pub fn timeout_duration(&self) -> Result<Duration, String> {
        Duration::try_from_secs_f64(self.timeout)
            .map_err(|_| format!("invalid timeout: {}", self.timeout))
    }
}

fn with_default_port(target: &str, port: u16) -> String {
    // bracketed IPv6 literals carry their own colons
    let has_port = match target.rsplit_once(']') {
        Some((_, rest)) => rest.starts_with(':'),
        None => target.contains(':'),
    };
    if has_port {
        target.to_string()
    } else {
        format!("{}:{}", target, port)
    }
}

/// Agent configuration.
#[derive(Debug, Parser)]
pub struct AgentArgs {
    /// Address to listen on.
    #[arg(short = 'b', long = "bind", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Manager address receiving beacons (default port 16200).
    #[arg(short = 'm', long = "manager")]
    pub manager: Option<String>,

    /// Device id.
    #[arg(long = "device-id", default_value = "lsnmpvs-agent")]
    pub device_id: String,

    /// Device type.
    #[arg(long = "device-type", default_value = "generic")]
    pub device_type: String,

    /// Seconds between beacons (0 disables them).
    #[arg(long = "beacon-rate", default_value_t = DEFAULT_BEACON_RATE)]
    pub beacon_rate: i64,

    /// Sensor as id:type:min:max. Repeatable.
    #[arg(short = 's', long = "sensor", value_name = "SPEC")]
    pub sensors: Vec<RecordSpec>,

    /// Actuator as id:type:min:max. Repeatable.
    #[arg(short = 'a', long = "actuator", value_name = "SPEC")]
    pub actuators: Vec<RecordSpec>,

    /// Seed for sensor sampling.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Request ids remembered for duplicate detection (0 disables).
    #[arg(long = "dedup-window", default_value_t = DEFAULT_DEDUP_WINDOW)]
    pub dedup_window: usize,
}

impl AgentArgs {
    /// Apply these arguments to an agent builder.
    pub fn builder(&self) -> AgentBuilder {
        let mut builder = AgentBuilder::new()
            .bind(&self.bind)
            .device_id(&self.device_id)
            .device_type(&self.device_type)
            .beacon_rate(self.beacon_rate)
            .dedup_window(self.dedup_window);
        if let Some(manager) = &self.manager {
            builder = builder.manager(with_default_port(manager, DEFAULT_MANAGER_PORT));
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        for spec in &self.sensors {
            builder = builder.sensor(spec.clone());
        }
        for spec in &self.actuators {
            builder = builder.actuator(spec.clone());
        }
        builder
    }
}

/// Value type specifier for set.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ValueType {
    /// Integer
    #[value(name = "i")]
    Integer,
    /// Text
    #[value(name = "s")]
    Text,
    /// Date as d:m:yyyy:h:m:s:ms
    #[value(name = "d")]
    Date,
}

impl std::str::FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "i" => Ok(ValueType::Integer),
            "s" => Ok(ValueType::Text),
            "d" => Ok(ValueType::Date),
            _ => Err(format!("invalid type specifier: {}", s)),
        }
    }
}

impl ValueType {
    /// Parse a string value according to the type specifier.
    pub fn parse_value(&self, s: &str) -> Result<Value, String> {
        match self {
            ValueType::Integer => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| format!("invalid integer value: {}", s)),
            ValueType::Text => {
                if s.contains('\0') {
                    return Err("text must not contain NUL".into());
                }
                Ok(Value::from(s))
            }
            ValueType::Date => DateStamp::parse(s)
                .map(Value::from)
                .ok_or_else(|| format!("invalid date value: {}", s)),
        }
    }
}
