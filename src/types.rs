use std::fmt;
use std::net::IpAddr;

/// Classified result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The address answered with an HTTP status line.
    Http { code: u16, reason: String },
    /// The request never produced a status. `marker` is a space-free token
    /// used in tally keys; `detail` is the human-readable cause.
    Failed { marker: &'static str, detail: String },
}

impl ProbeStatus {
    /// The status part of a tally key: the numeric code or the failure marker.
    pub fn key_part(&self) -> String {
        match self {
            ProbeStatus::Http { code, .. } => code.to_string(),
            ProbeStatus::Failed { marker, .. } => (*marker).to_string(),
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Http { code, reason } if reason.is_empty() => write!(f, "{code}"),
            ProbeStatus::Http { code, reason } => write!(f, "{code} {reason}"),
            ProbeStatus::Failed { marker, detail } => write!(f, "{marker} {detail}"),
        }
    }
}

/// One address probed in one cycle, together with what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub ip: IpAddr,
    pub status: ProbeStatus,
}

impl Outcome {
    pub fn http(ip: IpAddr, code: u16, reason: impl Into<String>) -> Self {
        Self {
            ip,
            status: ProbeStatus::Http {
                code,
                reason: reason.into(),
            },
        }
    }

    pub fn failed(ip: IpAddr, marker: &'static str, detail: impl Into<String>) -> Self {
        Self {
            ip,
            status: ProbeStatus::Failed {
                marker,
                detail: detail.into(),
            },
        }
    }

    /// Composite `address|status` key this outcome is counted under.
    pub fn tally_key(&self) -> String {
        format!("{}|{}", self.ip, self.status.key_part())
    }
}
