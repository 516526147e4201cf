//! Connection lifecycle phases of a single probe

use crate::error::{AppError, Result};
use std::fmt;
use std::time::Instant;

/// Lifecycle phases in the order they occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Started,
    DnsResolved,
    TcpConnected,
    TlsConnected,
    FirstByte,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Started => "started",
            Phase::DnsResolved => "dns-resolved",
            Phase::TcpConnected => "tcp-connected",
            Phase::TlsConnected => "tls-connected",
            Phase::FirstByte => "first-byte",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Timestamps of one completed probe
///
/// DNS, TCP and TLS marks are optional: an IP-literal host skips DNS and a
/// plaintext endpoint skips TLS. First byte and end are always present on a
/// completed probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTimestamps {
    pub started: Instant,
    pub dns_resolved: Option<Instant>,
    pub tcp_connected: Option<Instant>,
    pub tls_connected: Option<Instant>,
    pub first_byte: Instant,
    pub ended: Instant,
    /// Server-reported processing time in milliseconds, 0 when not reported
    pub server_timing_ms: f64,
}

fn millis_between(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_secs_f64() * 1000.0
}

impl PhaseTimestamps {
    /// Start of the request until the response head arrived
    pub fn time_to_first_byte_ms(&self) -> f64 {
        millis_between(self.started, self.first_byte)
    }

    /// Response head until the body was fully received
    pub fn transfer_ms(&self) -> f64 {
        millis_between(self.first_byte, self.ended)
    }

    /// Whole request lifecycle
    pub fn total_ms(&self) -> f64 {
        millis_between(self.started, self.ended)
    }

    pub fn dns_ms(&self) -> Option<f64> {
        self.dns_resolved.map(|at| millis_between(self.started, at))
    }

    /// Time spent in the TCP handshake, measured from DNS completion when present
    pub fn tcp_ms(&self) -> Option<f64> {
        let from = self.dns_resolved.unwrap_or(self.started);
        self.tcp_connected.map(|at| millis_between(from, at))
    }

    pub fn tls_ms(&self) -> Option<f64> {
        match (self.tcp_connected, self.tls_connected) {
            (Some(tcp), Some(tls)) => Some(millis_between(tcp, tls)),
            _ => None,
        }
    }
}

/// Stamps phases of an in-flight probe, in order
#[derive(Debug, Clone)]
pub struct PhaseRecorder {
    started: Instant,
    dns_resolved: Option<Instant>,
    tcp_connected: Option<Instant>,
    tls_connected: Option<Instant>,
    first_byte: Option<Instant>,
    ended: Option<Instant>,
    server_timing_ms: f64,
    current: Phase,
}

impl PhaseRecorder {
    /// Begin recording; the request start is stamped now
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    pub fn start_at(started: Instant) -> Self {
        Self {
            started,
            dns_resolved: None,
            tcp_connected: None,
            tls_connected: None,
            first_byte: None,
            ended: None,
            server_timing_ms: 0.0,
            current: Phase::Started,
        }
    }

    /// Stamp `phase` now
    pub fn mark(&mut self, phase: Phase) -> Result<()> {
        self.mark_at(phase, Instant::now())
    }

    /// Stamp `phase` at a given instant; phases only move forward
    pub fn mark_at(&mut self, phase: Phase, at: Instant) -> Result<()> {
        if phase <= self.current {
            return Err(AppError::internal(format!(
                "Phase {} recorded after {}",
                phase, self.current
            )));
        }

        let slot = match phase {
            Phase::Started => unreachable!("Started is never after another phase"),
            Phase::DnsResolved => &mut self.dns_resolved,
            Phase::TcpConnected => &mut self.tcp_connected,
            Phase::TlsConnected => &mut self.tls_connected,
            Phase::FirstByte => &mut self.first_byte,
            Phase::Ended => &mut self.ended,
        };
        *slot = Some(at);
        self.current = phase;
        Ok(())
    }

    pub fn set_server_timing_ms(&mut self, millis: f64) {
        self.server_timing_ms = millis;
    }

    /// Close the record; the probe must have reached `Ended`
    pub fn finish(self) -> Result<PhaseTimestamps> {
        match (self.first_byte, self.ended) {
            (Some(first_byte), Some(ended)) => Ok(PhaseTimestamps {
                started: self.started,
                dns_resolved: self.dns_resolved,
                tcp_connected: self.tcp_connected,
                tls_connected: self.tls_connected,
                first_byte,
                ended,
                server_timing_ms: self.server_timing_ms,
            }),
            _ => Err(AppError::internal(format!(
                "Probe finished while still in phase {}",
                self.current
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_full_lifecycle() {
        let base = Instant::now();
        let mut recorder = PhaseRecorder::start_at(base);
        recorder.mark_at(Phase::DnsResolved, at(base, 5)).unwrap();
        recorder.mark_at(Phase::TcpConnected, at(base, 15)).unwrap();
        recorder.mark_at(Phase::TlsConnected, at(base, 35)).unwrap();
        recorder.mark_at(Phase::FirstByte, at(base, 60)).unwrap();
        recorder.mark_at(Phase::Ended, at(base, 160)).unwrap();
        recorder.set_server_timing_ms(12.5);
        assert_eq!(recorder.current, Phase::Ended);

        let phases = recorder.finish().unwrap();
        assert_eq!(phases.dns_ms(), Some(5.0));
        assert_eq!(phases.tcp_ms(), Some(10.0));
        assert_eq!(phases.tls_ms(), Some(20.0));
        assert_eq!(phases.time_to_first_byte_ms(), 60.0);
        assert_eq!(phases.transfer_ms(), 100.0);
        assert_eq!(phases.total_ms(), 160.0);
        assert_eq!(phases.server_timing_ms, 12.5);
    }

    #[test]
    fn test_skipped_phases_are_none() {
        let base = Instant::now();
        let mut recorder = PhaseRecorder::start_at(base);
        recorder.mark_at(Phase::TcpConnected, at(base, 2)).unwrap();
        recorder.mark_at(Phase::FirstByte, at(base, 4)).unwrap();
        recorder.mark_at(Phase::Ended, at(base, 9)).unwrap();

        let phases = recorder.finish().unwrap();
        assert_eq!(phases.dns_resolved, None);
        assert_eq!(phases.tls_connected, None);
        assert_eq!(phases.dns_ms(), None);
        assert_eq!(phases.tls_ms(), None);
        assert_eq!(phases.tcp_ms(), Some(2.0));
        assert_eq!(phases.server_timing_ms, 0.0);
    }

    #[test]
    fn test_out_of_order_mark_rejected() {
        let mut recorder = PhaseRecorder::start();
        recorder.mark(Phase::FirstByte).unwrap();

        assert!(matches!(recorder.mark(Phase::TcpConnected), Err(AppError::Internal(_))));
        assert!(matches!(recorder.mark(Phase::FirstByte), Err(AppError::Internal(_))));
        assert!(matches!(recorder.mark(Phase::Started), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_finish_before_end_fails() {
        let mut recorder = PhaseRecorder::start();
        recorder.mark(Phase::TcpConnected).unwrap();
        assert!(recorder.finish().is_err());
    }
}
