//! Ping transport that shells out to the system `ping` binary.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use super::{PingReply, Pinger, ProbeError};

/// Pinger backed by `ping -c 1 -W <secs>`.
///
/// One packet per probe; the exit code decides reachability and the stdout
/// timing line, when present, supplies the round-trip time.
#[derive(Debug, Default)]
pub struct CommandPinger;

/// Headroom on top of the reply timeout for process startup and name
/// resolution, which `-W` does not bound.
const PROCESS_GRACE: Duration = Duration::from_millis(500);

#[async_trait]
impl Pinger for CommandPinger {
    async fn ping(&self, address: &str, timeout: Duration) -> Result<PingReply, ProbeError> {
        let timeout_secs = timeout.as_secs().max(1);

        let mut command = Command::new("ping");
        command
            .args(["-c", "1", "-W", &timeout_secs.to_string(), address])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = run_with_deadline(command, timeout + PROCESS_GRACE).await?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.contains("100% packet loss") || stdout.contains("100.0% packet loss") {
                return Err(ProbeError::Timeout(timeout));
            }
            return Err(ProbeError::Unreachable(format!("ping failed for {}", address)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(PingReply {
            rtt_ms: parse_rtt_ms(&stdout),
        })
    }
}

/// Run a command to completion under a hard deadline.
///
/// The deadline holds regardless of what the child does; an overrun kills
/// the process (via `kill_on_drop`) and reports a probe timeout.
async fn run_with_deadline(
    mut command: Command,
    deadline: Duration,
) -> Result<std::process::Output, ProbeError> {
    match tokio::time::timeout(deadline, command.output()).await {
        Ok(result) => {
            result.map_err(|e| ProbeError::Command(format!("failed to execute ping: {}", e)))
        }
        Err(_) => Err(ProbeError::Timeout(deadline)),
    }
}

/// Extract the round-trip time in milliseconds from ping stdout.
///
/// Returns `None` when no recognizable timing line is present.
fn parse_rtt_ms(output: &str) -> Option<f64> {
    // Per-packet response "time=X.XXX ms" (Linux, some macOS)
    static PER_PACKET: OnceLock<Regex> = OnceLock::new();
    let per_packet =
        PER_PACKET.get_or_init(|| Regex::new(r"time[=<](?P<val>[0-9.]+)\s*ms").unwrap());

    if let Some(caps) = per_packet.captures(output) {
        if let Ok(ms) = caps["val"].parse::<f64>() {
            return Some(ms);
        }
    }

    // Summary lines "rtt min/avg/max/mdev = ..." (Linux) and
    // "round-trip min/avg/max/stddev = ..." (macOS); use the average.
    static SUMMARY: OnceLock<Regex> = OnceLock::new();
    let summary = SUMMARY.get_or_init(|| {
        Regex::new(r"(?:rtt|round-trip)\s+min/avg/max\S*\s*=\s*[0-9.]+/(?P<avg>[0-9.]+)/").unwrap()
    });

    if let Some(caps) = summary.captures(output) {
        if let Ok(ms) = caps["avg"].parse::<f64>() {
            return Some(ms);
        }
    }

    None
}
