//! ICMP echo via the system `ping` binary.
//!
//! Raw ICMP sockets need CAP_NET_RAW; the system binary is already
//! privileged, so we shell out and parse its RTT line.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

/// Send one echo request and return the round-trip time.
pub async fn icmp_rtt(address: IpAddr, deadline: Duration) -> Option<Duration> {
    let mut cmd = Command::new("ping");
    if address.is_ipv6() {
        cmd.arg("-6");
    }
    cmd.args(["-n", "-c", "1", "-W", &wait_arg(deadline), &address.to_string()])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let start = Instant::now();
    match timeout(deadline, cmd.output()).await {
        Ok(Ok(out)) if out.status.success() => {
            let rtt = parse_ping_rtt(&String::from_utf8_lossy(&out.stdout))
                .unwrap_or_else(|| start.elapsed());
            Some(rtt)
        }
        Ok(Ok(_)) => {
            tracing::debug!(%address, "ICMP echo got no reply");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(%address, error = %e, "Failed to spawn ping");
            None
        }
        Err(_) => {
            tracing::debug!(%address, "ICMP echo timed out");
            None
        }
    }
}

/// Reply wait for `-W`: milliseconds on macOS, whole seconds (at least one) elsewhere.
fn wait_arg(deadline: Duration) -> String {
    if cfg!(target_os = "macos") {
        deadline.as_millis().max(1).to_string()
    } else {
        (deadline.as_secs_f64().ceil().max(1.0) as u64).to_string()
    }
}

/// Extract the RTT from ping output.
///
/// Linux and macOS print `time=1.23 ms`; sub-millisecond replies on some
/// platforms print `time<1 ms`.
pub fn parse_ping_rtt(output: &str) -> Option<Duration> {
    let (start, skip) = match (output.find("time="), output.find("time<")) {
        (Some(i), _) => (i, 5),
        (None, Some(i)) => (i, 5),
        (None, None) => return None,
    };
    let rest = &output[start + skip..];
    let end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let ms: f64 = rest[..end].parse().ok()?;
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    Some(Duration::from_micros((ms * 1000.0).round() as u64))
}
